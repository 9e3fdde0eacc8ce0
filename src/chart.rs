use crate::palette::ColorPalette;
use crate::pipeline::CropSelection;
use crate::RenderOptions;
use anyhow::{anyhow, Context, Result};
use image::ImageEncoder;
use plotters::coord::Shift;
use plotters::prelude::*;
use std::cmp::Ordering;
use std::ops::Range;

/// Fixed title of the production chart
pub const CHART_TITLE: &str = "Yearly crop production data (measured in tonnes)";

/// One line per crop item
#[derive(Debug, Clone)]
pub struct Series {
    pub name: String,
    pub points: Vec<(f64, f64)>,
}

/// Multi-series line chart (x = year, y = value, one series per item)
pub struct LineChart {
    title: String,
    x_label: String,
    y_label: String,
    options: RenderOptions,
    series: Vec<Series>,
}

impl LineChart {
    pub fn new(title: &str, options: RenderOptions) -> Self {
        Self {
            title: title.to_string(),
            x_label: "Year".to_string(),
            y_label: "Value".to_string(),
            options,
            series: Vec::new(),
        }
    }

    /// Build the chart from a pipeline selection, one series per selected
    /// item in ranking order, points sorted by year
    pub fn from_selection(selection: &CropSelection, options: RenderOptions) -> Self {
        let mut chart = Self::new(CHART_TITLE, options);
        for item in &selection.items {
            let mut points: Vec<(f64, f64)> = selection
                .rows
                .iter()
                .filter(|r| &r.item == item)
                .map(|r| (f64::from(r.year), r.value))
                .collect();
            points.sort_by(|a, b| a.0.partial_cmp(&b.0).unwrap_or(Ordering::Equal));
            chart.add_series(item.clone(), points);
        }
        chart
    }

    pub fn add_series(&mut self, name: String, points: Vec<(f64, f64)>) {
        self.series.push(Series { name, points });
    }

    pub fn series_count(&self) -> usize {
        self.series.len()
    }

    /// Calculate padded global axis ranges over all series
    fn ranges(&self) -> Result<(Range<f64>, Range<f64>)> {
        let mut x_min = f64::INFINITY;
        let mut x_max = f64::NEG_INFINITY;
        let mut y_min = f64::INFINITY;
        let mut y_max = f64::NEG_INFINITY;
        let mut any_points = false;

        for series in &self.series {
            for &(x, y) in &series.points {
                any_points = true;
                x_min = x_min.min(x);
                x_max = x_max.max(x);
                y_min = y_min.min(y);
                y_max = y_max.max(y);
            }
        }

        if !any_points {
            anyhow::bail!("Cannot build a chart with no data points");
        }

        Ok((pad_range(x_min, x_max), pad_range(y_min, y_max)))
    }

    fn draw<DB: DrawingBackend>(&self, root: &DrawingArea<DB, Shift>) -> Result<()> {
        root.fill(&WHITE)
            .map_err(|e| anyhow!("Failed to fill background: {}", e))?;

        let (x_range, y_range) = self.ranges()?;

        let mut chart = ChartBuilder::on(root)
            .margin(10)
            .caption(&self.title, ("sans-serif", 20))
            .x_label_area_size(40)
            .y_label_area_size(70)
            .build_cartesian_2d(x_range, y_range)
            .map_err(|e| anyhow!("Failed to build chart: {}", e))?;

        chart
            .configure_mesh()
            .x_desc(self.x_label.as_str())
            .y_desc(self.y_label.as_str())
            .x_label_formatter(&|x| format!("{:.0}", x))
            .draw()
            .map_err(|e| anyhow!("Failed to draw mesh: {}", e))?;

        let names: Vec<String> = self.series.iter().map(|s| s.name.clone()).collect();
        let colors = ColorPalette::category10().assign_colors(&names);

        for (idx, series) in self.series.iter().enumerate() {
            let color = colors
                .get(&series.name)
                .copied()
                .unwrap_or_else(|| ColorPalette::category10().color(idx));

            chart
                .draw_series(LineSeries::new(
                    series.points.iter().copied(),
                    color.stroke_width(2),
                ))
                .map_err(|e| anyhow!("Failed to draw line series: {}", e))?
                .label(series.name.as_str())
                .legend(move |(x, y)| {
                    PathElement::new(vec![(x, y), (x + 18, y)], color.stroke_width(2))
                });
        }

        chart
            .configure_series_labels()
            .position(SeriesLabelPosition::UpperRight)
            .background_style(&WHITE.mix(0.85))
            .border_style(&BLACK)
            .draw()
            .map_err(|e| anyhow!("Failed to draw legend: {}", e))?;

        root.present()
            .map_err(|e| anyhow!("Failed to present drawing: {}", e))?;

        Ok(())
    }

    /// Render to an SVG document string (used for page embedding)
    pub fn render_svg(&self) -> Result<String> {
        let (width, height) = (self.options.width, self.options.height);
        let mut svg = String::new();
        {
            let root = SVGBackend::with_string(&mut svg, (width, height)).into_drawing_area();
            self.draw(&root)?;
        }
        Ok(svg)
    }

    /// Render to PNG bytes
    pub fn render_png(&self) -> Result<Vec<u8>> {
        let (width, height) = (self.options.width, self.options.height);
        let mut buffer = vec![0u8; (width * height * 3) as usize];
        {
            let root =
                BitMapBackend::with_buffer(&mut buffer, (width, height)).into_drawing_area();
            self.draw(&root)?;
        }

        let mut png_bytes = Vec::new();
        {
            let encoder = image::codecs::png::PngEncoder::new(&mut png_bytes);
            encoder
                .write_image(&buffer, width, height, image::ColorType::Rgb8)
                .context("Failed to encode PNG")?;
        }

        Ok(png_bytes)
    }
}

fn pad_range(min: f64, max: f64) -> Range<f64> {
    if min == max {
        (min - 1.0)..(max + 1.0)
    } else {
        let padding = (max - min) * 0.05;
        (min - padding)..(max + padding)
    }
}
