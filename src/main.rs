use agridash::chart::LineChart;
use agridash::data::CropTable;
use agridash::figure::{FigureConfig, MapFigure};
use agridash::page::{self, PageOptions};
use agridash::pipeline::{self, SelectionOptions};
use agridash::RenderOptions;

use anyhow::{Context, Result};
use clap::Parser;
use std::fs;
use std::io::{self, Write};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "agridash")]
#[command(about = "Render a crop production and NDVI dashboard as a static HTML page", long_about = None)]
struct Args {
    /// Path to the cleaned crop statistics CSV
    #[arg(long, default_value = "data/syria_crop_data_cleaned.csv")]
    data: PathBuf,

    /// Path to the pre-serialized NDVI choropleth figure JSON
    #[arg(long, default_value = "figures/ndvi-mapbox-choropleth-map.json")]
    figure: PathBuf,

    /// Output path for the HTML page ('-' for stdout)
    #[arg(long, default_value = "-")]
    output: String,

    /// Number of top crops to chart
    #[arg(long, default_value_t = pipeline::DEFAULT_TOP_N)]
    top: usize,

    /// Completeness span in years; derived from the data when omitted
    #[arg(long)]
    years: Option<usize>,

    /// Emit only the two panels, without page title and section text
    #[arg(long)]
    bare: bool,

    /// Also export the standalone line chart (.png or .svg)
    #[arg(long)]
    chart_out: Option<PathBuf>,

    /// Chart width in pixels
    #[arg(long, default_value_t = 960)]
    width: u32,

    /// Chart height in pixels
    #[arg(long, default_value_t = 600)]
    height: u32,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let table = CropTable::from_path(&args.data).context("Failed to load crop dataset")?;

    let options = SelectionOptions {
        top_n: args.top,
        completeness_span: args.years,
    };
    let selection =
        pipeline::select_top_crops(&table, &options).context("Failed to select top crops")?;

    let render_options = RenderOptions {
        width: args.width,
        height: args.height,
    };
    let chart = LineChart::from_selection(&selection, render_options);
    let chart_svg = chart.render_svg().context("Failed to render crop chart")?;

    if let Some(path) = &args.chart_out {
        let bytes = match path.extension().and_then(|e| e.to_str()) {
            Some("png") => chart.render_png()?,
            Some("svg") => chart_svg.clone().into_bytes(),
            _ => anyhow::bail!(
                "Unsupported chart export extension (use .png or .svg): {}",
                path.display()
            ),
        };
        fs::write(path, bytes)
            .with_context(|| format!("Failed to write chart to '{}'", path.display()))?;
    }

    let figure = MapFigure::from_path(&args.figure).context("Failed to load map figure")?;

    let page_options = PageOptions {
        chrome: !args.bare,
        ..PageOptions::default()
    };
    let html = page::render_page(&chart_svg, &figure, &FigureConfig::default(), &page_options)
        .context("Failed to render page")?;

    if args.output == "-" {
        let stdout = io::stdout();
        let mut handle = stdout.lock();
        handle
            .write_all(html.as_bytes())
            .context("Failed to write page to stdout")?;
        handle.flush().context("Failed to flush stdout")?;
    } else {
        fs::write(&args.output, html)
            .with_context(|| format!("Failed to write page to '{}'", args.output))?;
    }

    Ok(())
}
