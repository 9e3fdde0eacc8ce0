// Static HTML page assembly for the two dashboard panels.

use crate::figure::{FigureConfig, MapFigure};
use anyhow::Result;
use std::fmt::Write;

const PLOTLY_CDN: &str = "https://cdn.plot.ly/plotly-2.32.0.min.js";
const MAP_DIV_ID: &str = "ndvi-map";

pub const DEFAULT_PAGE_TITLE: &str = "Syrian agriculture dashboard";

const CROP_SECTION_HEADING: &str = "Crop production";
const CROP_SECTION_TEXT: &str = "Total production volumes of the five largest crops \
by cumulative tonnage, for crops reported in every year of the dataset's \
six-decade time span. Crops with incomplete time series are excluded.";

const MAP_SECTION_HEADING: &str = "Vegetation health (NDVI)";
const MAP_SECTION_TEXT: &str = "Choropleth map of the Normalized Difference \
Vegetation Index, a remote-sensing measure of vegetation greenness, shaded \
per region from a precomputed figure.";

#[derive(Debug, Clone)]
pub struct PageOptions {
    /// Wrap panels in titled sections with explanatory text
    pub chrome: bool,
    pub title: String,
}

impl Default for PageOptions {
    fn default() -> Self {
        Self {
            chrome: true,
            title: DEFAULT_PAGE_TITLE.to_string(),
        }
    }
}

/// Assemble the full-width page around the rendered chart SVG and the
/// loaded map figure
pub fn render_page(
    chart_svg: &str,
    figure: &MapFigure,
    config: &FigureConfig,
    options: &PageOptions,
) -> Result<String> {
    let mut html = String::new();

    write!(
        html,
        "<!DOCTYPE html>\n\
         <html lang=\"en\">\n\
         <head>\n\
         <meta charset=\"utf-8\">\n\
         <title>{}</title>\n\
         <style>\n\
         body {{ margin: 0 auto; padding: 0 1rem; font-family: sans-serif; }}\n\
         .panel {{ width: 100%; }}\n\
         .panel svg {{ width: 100%; height: auto; }}\n\
         section {{ margin-bottom: 2rem; }}\n\
         </style>\n\
         <script src=\"{}\"></script>\n\
         </head>\n\
         <body>\n",
        escape_html(&options.title),
        PLOTLY_CDN,
    )?;

    if options.chrome {
        write!(html, "<h1>{}</h1>\n", escape_html(&options.title))?;
        write!(
            html,
            "<section>\n<h2>{}</h2>\n<p>{}</p>\n",
            escape_html(CROP_SECTION_HEADING),
            escape_html(CROP_SECTION_TEXT),
        )?;
    }
    write!(html, "<div class=\"panel\">\n{}\n</div>\n", chart_svg)?;
    if options.chrome {
        html.push_str("</section>\n");
        write!(
            html,
            "<section>\n<h2>{}</h2>\n<p>{}</p>\n",
            escape_html(MAP_SECTION_HEADING),
            escape_html(MAP_SECTION_TEXT),
        )?;
    }

    write!(
        html,
        "<div id=\"{}\" class=\"panel\"></div>\n\
         <script>\n\
         const figure = {};\n\
         Plotly.newPlot(\"{}\", figure.data, figure.layout, {});\n\
         </script>\n",
        MAP_DIV_ID,
        escape_script_json(&figure.to_json()),
        MAP_DIV_ID,
        escape_script_json(&config.to_json()?),
    )?;

    if options.chrome {
        html.push_str("</section>\n");
    }
    html.push_str("</body>\n</html>\n");

    Ok(html)
}

/// Escape text interpolated into HTML element content or attributes
fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

/// JSON embedded in a script block must not contain a closing tag sequence
fn escape_script_json(json: &str) -> String {
    json.replace("</", "<\\/")
}
