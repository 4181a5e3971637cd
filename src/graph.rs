use crate::{OutputFormat, RenderOptions};
use anyhow::{Context, Result};
use image::ImageEncoder;
use plotters::coord::Shift;
use plotters::prelude::*;
use plotters::style::text_anchor::{HPos, Pos, VPos};
use std::ops::Range;

/// Qualitative palette for bars and series
pub const PALETTE: [RGBColor; 8] = [
    RGBColor(102, 194, 165),
    RGBColor(252, 141, 98),
    RGBColor(141, 160, 203),
    RGBColor(231, 138, 195),
    RGBColor(166, 216, 84),
    RGBColor(255, 217, 47),
    RGBColor(229, 196, 148),
    RGBColor(179, 179, 179),
];

/// Heatmap gradient endpoints (light yellow to dark blue)
const HEAT_LOW: RGBColor = RGBColor(255, 255, 217);
const HEAT_HIGH: RGBColor = RGBColor(8, 29, 88);

/// Title and axis descriptions of a chart
#[derive(Debug, Clone, Default)]
pub struct ChartLabels {
    pub title: String,
    pub x: String,
    pub y: String,
}

/// Half the width of a bar, in category units
const BAR_HALF_WIDTH: f64 = 0.4;

/// Something that can be drawn onto a prepared drawing area
pub trait Figure {
    fn draw<DB>(&self, root: &DrawingArea<DB, Shift>, labels: &ChartLabels) -> Result<()>
    where
        DB: DrawingBackend,
        DB::ErrorType: 'static;
}

/// One bar per category
pub struct BarFigure<'a> {
    pub categories: &'a [String],
    pub values: &'a [f64],
}

/// Side-by-side bars: one series per legend entry, one group per category
pub struct GroupedBarFigure<'a> {
    pub categories: &'a [String],
    pub series: &'a [(String, Vec<f64>)],
}

/// Values over ordered, labelled x positions
pub struct LineFigure<'a> {
    pub x_labels: &'a [String],
    pub values: &'a [f64],
    /// Radius of point markers; `None` draws no markers
    pub marker_size: Option<u32>,
}

/// Grid of annotated cells; `cells[r][c]` belongs to `rows[r]` × `columns[c]`
pub struct HeatmapFigure<'a> {
    pub rows: &'a [String],
    pub columns: &'a [String],
    pub cells: &'a [Vec<f64>],
}

/// Output surface configured from [`RenderOptions`]
pub struct Canvas {
    width: u32,
    height: u32,
    format: OutputFormat,
}

impl Canvas {
    pub fn new(options: &RenderOptions) -> Self {
        Self {
            width: options.width,
            height: options.height,
            format: options.format,
        }
    }

    /// Draw `figure` on a white background and encode it as PNG or SVG bytes
    pub fn render<F: Figure>(&self, figure: &F, labels: &ChartLabels) -> Result<Vec<u8>> {
        match self.format {
            OutputFormat::Png => {
                let len = (self.width as usize)
                    .checked_mul(self.height as usize)
                    .and_then(|pixels| pixels.checked_mul(3))
                    .with_context(|| {
                        format!("Canvas size {}x{} is too large", self.width, self.height)
                    })?;
                let mut buffer = vec![0u8; len];
                {
                    let root = BitMapBackend::with_buffer(&mut buffer, (self.width, self.height))
                        .into_drawing_area();
                    root.fill(&WHITE).context("Failed to fill background")?;
                    figure.draw(&root, labels)?;
                    root.present().context("Failed to present drawing")?;
                }
                encode_png(&buffer, self.width, self.height)
            }
            OutputFormat::Svg => {
                let mut svg = String::new();
                {
                    let root = SVGBackend::with_string(&mut svg, (self.width, self.height))
                        .into_drawing_area();
                    root.fill(&WHITE).context("Failed to fill background")?;
                    figure.draw(&root, labels)?;
                    root.present().context("Failed to present drawing")?;
                }
                Ok(svg.into_bytes())
            }
        }
    }
}

impl Figure for BarFigure<'_> {
    fn draw<DB>(&self, root: &DrawingArea<DB, Shift>, labels: &ChartLabels) -> Result<()>
    where
        DB: DrawingBackend,
        DB::ErrorType: 'static,
    {
        if self.categories.len() != self.values.len() {
            anyhow::bail!(
                "Categories and Y data must have the same length (categories: {}, y: {})",
                self.categories.len(),
                self.values.len()
            );
        }
        if self.categories.is_empty() {
            anyhow::bail!("Cannot create bar chart with no data");
        }

        let n = self.categories.len();
        let mut chart = ChartBuilder::on(root)
            .margin(10)
            .caption(&labels.title, ("sans-serif", 20))
            .x_label_area_size(40)
            .y_label_area_size(60)
            .build_cartesian_2d(category_range(n), bar_value_range(self.values))
            .context("Failed to build chart")?;

        let categories = self.categories;
        chart
            .configure_mesh()
            .disable_x_mesh()
            .x_labels(n)
            .x_label_formatter(&|x| category_label(categories, *x))
            .x_desc(labels.x.as_str())
            .y_desc(labels.y.as_str())
            .draw()
            .context("Failed to draw mesh")?;

        for (idx, &y_val) in self.values.iter().enumerate() {
            let color = PALETTE[idx % PALETTE.len()];
            let x_center = idx as f64;
            chart
                .draw_series(std::iter::once(Rectangle::new(
                    [(x_center - BAR_HALF_WIDTH, 0.0), (x_center + BAR_HALF_WIDTH, y_val)],
                    color.filled(),
                )))
                .context("Failed to draw bar")?;
        }

        Ok(())
    }
}

impl Figure for GroupedBarFigure<'_> {
    fn draw<DB>(&self, root: &DrawingArea<DB, Shift>, labels: &ChartLabels) -> Result<()>
    where
        DB: DrawingBackend,
        DB::ErrorType: 'static,
    {
        if self.categories.is_empty() {
            anyhow::bail!("Cannot create bar chart with no categories");
        }
        if self.series.is_empty() {
            anyhow::bail!("Cannot create bar chart with no series");
        }
        if let Some((name, values)) = self
            .series
            .iter()
            .find(|(_, v)| v.len() != self.categories.len())
        {
            anyhow::bail!(
                "Series '{}' has {} values for {} categories",
                name,
                values.len(),
                self.categories.len()
            );
        }

        let n = self.categories.len();
        let all_values: Vec<f64> = self.series.iter().flat_map(|(_, v)| v.iter().copied()).collect();
        let mut chart = ChartBuilder::on(root)
            .margin(10)
            .caption(&labels.title, ("sans-serif", 20))
            .x_label_area_size(40)
            .y_label_area_size(60)
            .build_cartesian_2d(category_range(n), bar_value_range(&all_values))
            .context("Failed to build chart")?;

        let categories = self.categories;
        chart
            .configure_mesh()
            .disable_x_mesh()
            .x_labels(n)
            .x_label_formatter(&|x| category_label(categories, *x))
            .x_desc(labels.x.as_str())
            .y_desc(labels.y.as_str())
            .draw()
            .context("Failed to draw mesh")?;

        // Side-by-side bars
        let num_series = self.series.len();
        let bar_width = 0.8 / num_series as f64;

        for (series_idx, (name, values)) in self.series.iter().enumerate() {
            let color = PALETTE[series_idx % PALETTE.len()];
            let x_offset = (series_idx as f64 - (num_series as f64 - 1.0) / 2.0) * bar_width;

            chart
                .draw_series(values.iter().enumerate().map(|(cat_idx, &y_val)| {
                    let x_center = cat_idx as f64 + x_offset;
                    Rectangle::new(
                        [
                            (x_center - bar_width / 2.0, 0.0),
                            (x_center + bar_width / 2.0, y_val),
                        ],
                        color.filled(),
                    )
                }))
                .context("Failed to draw bar")?
                .label(name.as_str())
                .legend(move |(x, y)| Rectangle::new([(x, y - 5), (x + 10, y + 5)], color.filled()));
        }

        chart
            .configure_series_labels()
            .background_style(WHITE.mix(0.8))
            .border_style(BLACK)
            .draw()
            .context("Failed to draw legend")?;

        Ok(())
    }
}

impl Figure for LineFigure<'_> {
    fn draw<DB>(&self, root: &DrawingArea<DB, Shift>, labels: &ChartLabels) -> Result<()>
    where
        DB: DrawingBackend,
        DB::ErrorType: 'static,
    {
        if self.x_labels.len() != self.values.len() {
            anyhow::bail!(
                "X and Y data must have the same length (x: {}, y: {})",
                self.x_labels.len(),
                self.values.len()
            );
        }
        if self.values.is_empty() {
            anyhow::bail!("Cannot create line chart with no data points");
        }

        let n = self.values.len();
        let mut chart = ChartBuilder::on(root)
            .margin(10)
            .caption(&labels.title, ("sans-serif", 20))
            .x_label_area_size(40)
            .y_label_area_size(60)
            .build_cartesian_2d(category_range(n), padded_range(self.values))
            .context("Failed to build chart")?;

        let x_labels = self.x_labels;
        chart
            .configure_mesh()
            .x_labels(n)
            .x_label_formatter(&|x| category_label(x_labels, *x))
            .x_desc(labels.x.as_str())
            .y_desc(labels.y.as_str())
            .draw()
            .context("Failed to draw mesh")?;

        let points: Vec<(f64, f64)> = self
            .values
            .iter()
            .enumerate()
            .map(|(i, &y)| (i as f64, y))
            .collect();

        let color = PALETTE[0];
        chart
            .draw_series(LineSeries::new(points.clone(), color.stroke_width(2)))
            .context("Failed to draw line series")?;

        if let Some(size) = self.marker_size {
            chart
                .draw_series(
                    points
                        .iter()
                        .map(|&(x, y)| Circle::new((x, y), size, color.filled())),
                )
                .context("Failed to draw point series")?;
        }

        Ok(())
    }
}

impl Figure for HeatmapFigure<'_> {
    fn draw<DB>(&self, root: &DrawingArea<DB, Shift>, labels: &ChartLabels) -> Result<()>
    where
        DB: DrawingBackend,
        DB::ErrorType: 'static,
    {
        if self.rows.is_empty() || self.columns.is_empty() {
            anyhow::bail!("Cannot create heatmap with no cells");
        }
        if self.cells.len() != self.rows.len()
            || self.cells.iter().any(|r| r.len() != self.columns.len())
        {
            anyhow::bail!(
                "Heatmap cells must be {} rows of {} values",
                self.rows.len(),
                self.columns.len()
            );
        }

        let n_rows = self.rows.len();
        let n_cols = self.columns.len();
        let mut chart = ChartBuilder::on(root)
            .margin(10)
            .caption(&labels.title, ("sans-serif", 20))
            .x_label_area_size(40)
            .y_label_area_size(100)
            .build_cartesian_2d(category_range(n_cols), category_range(n_rows))
            .context("Failed to build chart")?;

        // First row is drawn at the top
        let columns = self.columns;
        let top_down: Vec<String> = self.rows.iter().rev().cloned().collect();
        chart
            .configure_mesh()
            .disable_mesh()
            .x_labels(n_cols)
            .y_labels(n_rows)
            .x_label_formatter(&|x| category_label(columns, *x))
            .y_label_formatter(&|y| category_label(&top_down, *y))
            .x_desc(labels.x.as_str())
            .y_desc(labels.y.as_str())
            .draw()
            .context("Failed to draw mesh")?;

        let max = self
            .cells
            .iter()
            .flatten()
            .copied()
            .fold(0.0f64, f64::max);

        for (r, row) in self.cells.iter().enumerate() {
            let y = (n_rows - 1 - r) as f64;
            for (c, &value) in row.iter().enumerate() {
                let x = c as f64;
                let t = if max > 0.0 { value / max } else { 0.0 };
                chart
                    .draw_series(std::iter::once(Rectangle::new(
                        [(x - 0.5, y - 0.5), (x + 0.5, y + 0.5)],
                        heat_color(t).filled(),
                    )))
                    .context("Failed to draw cell")?;

                let text_color = if t > 0.5 { WHITE } else { BLACK };
                let style = ("sans-serif", 16)
                    .into_font()
                    .color(&text_color)
                    .pos(Pos::new(HPos::Center, VPos::Center));
                chart
                    .draw_series(std::iter::once(Text::new(
                        format_cell(value),
                        (x, y),
                        style,
                    )))
                    .context("Failed to annotate cell")?;
            }
        }

        Ok(())
    }
}

/// Finalize a raw RGB buffer as PNG
fn encode_png(buffer: &[u8], width: u32, height: u32) -> Result<Vec<u8>> {
    let mut png_bytes = Vec::new();
    {
        let encoder = image::codecs::png::PngEncoder::new(&mut png_bytes);
        encoder
            .write_image(buffer, width, height, image::ColorType::Rgb8)
            .context("Failed to encode PNG")?;
    }
    Ok(png_bytes)
}

/// Axis range that centers `n` categories on the integers `0..n`
fn category_range(n: usize) -> Range<f64> {
    -0.5..(n as f64 - 0.5)
}

/// Label for an integer tick; ticks between categories stay blank
fn category_label(categories: &[String], x: f64) -> String {
    let rounded = x.round();
    if (x - rounded).abs() > 1e-6 || rounded < 0.0 {
        return String::new();
    }
    categories.get(rounded as usize).cloned().unwrap_or_default()
}

/// Bars always start at zero
fn bar_value_range(values: &[f64]) -> Range<f64> {
    let max = values.iter().copied().fold(0.0f64, f64::max);
    if max <= 0.0 {
        0.0..1.0
    } else {
        0.0..(max * 1.1)
    }
}

/// Data range with 5% padding on both sides
fn padded_range(values: &[f64]) -> Range<f64> {
    let min = values.iter().copied().fold(f64::INFINITY, f64::min);
    let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    if min == max {
        (min - 1.0)..(max + 1.0)
    } else {
        let padding = (max - min) * 0.05;
        (min - padding)..(max + padding)
    }
}

fn heat_color(t: f64) -> RGBColor {
    let t = t.clamp(0.0, 1.0);
    let lerp = |a: u8, b: u8| (a as f64 + (b as f64 - a as f64) * t).round() as u8;
    RGBColor(
        lerp(HEAT_LOW.0, HEAT_HIGH.0),
        lerp(HEAT_LOW.1, HEAT_HIGH.1),
        lerp(HEAT_LOW.2, HEAT_HIGH.2),
    )
}

fn format_cell(value: f64) -> String {
    if value.fract() == 0.0 {
        format!("{}", value as i64)
    } else {
        format!("{:.1}", value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PNG_MAGIC: [u8; 8] = [137, 80, 78, 71, 13, 10, 26, 10];

    fn labels() -> ChartLabels {
        ChartLabels {
            title: "Test".to_string(),
            x: "x".to_string(),
            y: "y".to_string(),
        }
    }

    fn strings(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_category_label() {
        let cats = strings(&["A", "B"]);
        assert_eq!(category_label(&cats, 0.0), "A");
        assert_eq!(category_label(&cats, 1.0), "B");
        assert_eq!(category_label(&cats, 0.5), "");
        assert_eq!(category_label(&cats, 2.0), "");
        assert_eq!(category_label(&cats, -1.0), "");
    }

    #[test]
    fn test_bar_value_range() {
        assert_eq!(bar_value_range(&[0.0]), 0.0..1.0);
        let r = bar_value_range(&[10.0, 5.0]);
        assert_eq!(r.start, 0.0);
        assert!((r.end - 11.0).abs() < 1e-9);
    }

    #[test]
    fn test_padded_range_flat() {
        assert_eq!(padded_range(&[3.0, 3.0]), 2.0..4.0);
    }

    #[test]
    fn test_heat_color_endpoints() {
        assert_eq!(heat_color(0.0), HEAT_LOW);
        assert_eq!(heat_color(1.0), HEAT_HIGH);
        assert_eq!(heat_color(7.0), HEAT_HIGH);
    }

    #[test]
    fn test_format_cell() {
        assert_eq!(format_cell(5.0), "5");
        assert_eq!(format_cell(2.25), "2.2");
    }

    #[test]
    fn test_render_bar_png() {
        let cats = strings(&["A", "B", "C"]);
        let values = [1.0, 3.0, 2.0];
        let figure = BarFigure {
            categories: &cats,
            values: &values,
        };
        let bytes = Canvas::new(&RenderOptions::default())
            .render(&figure, &labels())
            .unwrap();
        assert_eq!(&bytes[0..8], &PNG_MAGIC);
    }

    #[test]
    fn test_render_oversized_canvas_fails() {
        let cats = strings(&["A"]);
        let values = [1.0];
        let figure = BarFigure {
            categories: &cats,
            values: &values,
        };
        let options = RenderOptions {
            width: u32::MAX,
            height: u32::MAX,
            ..RenderOptions::default()
        };
        let err = Canvas::new(&options).render(&figure, &labels()).unwrap_err();
        assert!(err.to_string().contains("too large"));
    }

    #[test]
    fn test_render_bar_length_mismatch() {
        let cats = strings(&["A", "B"]);
        let values = [1.0];
        let figure = BarFigure {
            categories: &cats,
            values: &values,
        };
        assert!(Canvas::new(&RenderOptions::default())
            .render(&figure, &labels())
            .is_err());
    }

    #[test]
    fn test_render_grouped_bars_svg() {
        let cats = strings(&["Female", "Male"]);
        let series = vec![
            ("Beauty".to_string(), vec![2.0, 0.0]),
            ("Fashion".to_string(), vec![1.0, 2.0]),
        ];
        let figure = GroupedBarFigure {
            categories: &cats,
            series: &series,
        };
        let options = RenderOptions {
            format: OutputFormat::Svg,
            ..RenderOptions::default()
        };
        let bytes = Canvas::new(&options).render(&figure, &labels()).unwrap();
        let svg = String::from_utf8(bytes).unwrap();
        assert!(svg.contains("<svg"));
    }

    #[test]
    fn test_render_grouped_bars_ragged_series() {
        let cats = strings(&["Female", "Male"]);
        let series = vec![("Beauty".to_string(), vec![2.0])];
        let figure = GroupedBarFigure {
            categories: &cats,
            series: &series,
        };
        let err = Canvas::new(&RenderOptions::default())
            .render(&figure, &labels())
            .unwrap_err();
        assert!(err.to_string().contains("Beauty"));
    }

    #[test]
    fn test_render_line_with_markers() {
        let xs = strings(&["06-10", "06-11", "06-12"]);
        let values = [3000.0, 800.0, 3600.0];
        let figure = LineFigure {
            x_labels: &xs,
            values: &values,
            marker_size: Some(4),
        };
        let bytes = Canvas::new(&RenderOptions::default())
            .render(&figure, &labels())
            .unwrap();
        assert_eq!(&bytes[0..8], &PNG_MAGIC);
    }

    #[test]
    fn test_render_line_empty() {
        let figure = LineFigure {
            x_labels: &[],
            values: &[],
            marker_size: None,
        };
        assert!(Canvas::new(&RenderOptions::default())
            .render(&figure, &labels())
            .is_err());
    }

    #[test]
    fn test_render_heatmap() {
        let rows = strings(&["Beauty", "Groceries"]);
        let columns = strings(&["20-25", "26-30"]);
        let cells = vec![vec![3.0, 1.0], vec![5.0, 0.0]];
        let figure = HeatmapFigure {
            rows: &rows,
            columns: &columns,
            cells: &cells,
        };
        let bytes = Canvas::new(&RenderOptions::default())
            .render(&figure, &labels())
            .unwrap();
        assert_eq!(&bytes[0..8], &PNG_MAGIC);
    }

    #[test]
    fn test_render_heatmap_shape_mismatch() {
        let rows = strings(&["Beauty"]);
        let columns = strings(&["20-25", "26-30"]);
        let cells = vec![vec![3.0]];
        let figure = HeatmapFigure {
            rows: &rows,
            columns: &columns,
            cells: &cells,
        };
        assert!(Canvas::new(&RenderOptions::default())
            .render(&figure, &labels())
            .is_err());
    }
}
