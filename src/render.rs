// Chart rendering: one chart per aggregate, fed through named-column frames

use crate::aggregate::Aggregates;
use crate::data::Frame;
use crate::graph::{BarFigure, Canvas, ChartLabels, GroupedBarFigure, HeatmapFigure, LineFigure};
use crate::RenderOptions;
use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChartKind {
    CategoryRevenue,
    GenderDemand,
    DailyRevenue,
    BasketSize,
    AgeCategoryHeatmap,
}

impl ChartKind {
    pub const ALL: [ChartKind; 5] = [
        ChartKind::CategoryRevenue,
        ChartKind::GenderDemand,
        ChartKind::DailyRevenue,
        ChartKind::BasketSize,
        ChartKind::AgeCategoryHeatmap,
    ];

    pub fn file_stem(&self) -> &'static str {
        match self {
            ChartKind::CategoryRevenue => "category_revenue",
            ChartKind::GenderDemand => "gender_demand",
            ChartKind::DailyRevenue => "daily_revenue",
            ChartKind::BasketSize => "basket_size",
            ChartKind::AgeCategoryHeatmap => "age_category_heatmap",
        }
    }

    fn labels(&self) -> ChartLabels {
        let (title, x, y) = match self {
            ChartKind::CategoryRevenue => {
                ("Total Sales by Product Category", "Product Category", "Total Sales")
            }
            ChartKind::GenderDemand => ("Gender-wise Product Demand", "Gender", "Number of Orders"),
            ChartKind::DailyRevenue => ("Daily Sales Trend", "Order Date", "Sales"),
            ChartKind::BasketSize => {
                ("Average Basket Size per User", "User ID", "Average Items per Order")
            }
            ChartKind::AgeCategoryHeatmap => (
                "Age Group vs Product Category (Items Bought)",
                "Age Group",
                "Product Category",
            ),
        };
        ChartLabels {
            title: title.to_string(),
            x: x.to_string(),
            y: y.to_string(),
        }
    }

    /// The aggregate this chart is drawn from
    pub fn frame(&self, aggregates: &Aggregates) -> Frame {
        match self {
            ChartKind::CategoryRevenue => aggregates.category_revenue_frame(),
            ChartKind::GenderDemand => aggregates.gender_demand_frame(),
            ChartKind::DailyRevenue => aggregates.daily_revenue_frame(),
            ChartKind::BasketSize => aggregates.basket_size_frame(),
            ChartKind::AgeCategoryHeatmap => aggregates.age_category_frame(),
        }
    }
}

/// Render a single chart to encoded bytes
pub fn render_chart(kind: ChartKind, frame: &Frame, options: &RenderOptions) -> Result<Vec<u8>> {
    let canvas = Canvas::new(options);
    let labels = kind.labels();

    match kind {
        ChartKind::CategoryRevenue => {
            let categories = frame.text_column("ProductCategory")?;
            let values = frame.numeric_column("TotalAmount")?;
            canvas.render(
                &BarFigure {
                    categories: &categories,
                    values: &values,
                },
                &labels,
            )
        }
        ChartKind::BasketSize => {
            let users = frame.text_column("UserID")?;
            let values = frame.numeric_column("Quantity")?;
            canvas.render(
                &BarFigure {
                    categories: &users,
                    values: &values,
                },
                &labels,
            )
        }
        ChartKind::DailyRevenue => {
            let dates = frame.text_column("OrderDate")?;
            let values = frame.numeric_column("TotalAmount")?;
            canvas.render(
                &LineFigure {
                    x_labels: &dates,
                    values: &values,
                    marker_size: Some(4),
                },
                &labels,
            )
        }
        ChartKind::GenderDemand => {
            let (genders, series) = wide_columns(frame, "Gender")?;
            canvas.render(
                &GroupedBarFigure {
                    categories: &genders,
                    series: &series,
                },
                &labels,
            )
        }
        ChartKind::AgeCategoryHeatmap => {
            let (categories, series) = wide_columns(frame, "ProductCategory")?;
            let columns: Vec<String> = series.iter().map(|(name, _)| name.clone()).collect();
            let cells: Vec<Vec<f64>> = (0..categories.len())
                .map(|r| series.iter().map(|(_, values)| values[r]).collect())
                .collect();
            canvas.render(
                &HeatmapFigure {
                    rows: &categories,
                    columns: &columns,
                    cells: &cells,
                },
                &labels,
            )
        }
    }
}

/// Split a wide frame into its index column and one numeric series per other column
fn wide_columns(frame: &Frame, index: &str) -> Result<(Vec<String>, Vec<(String, Vec<f64>)>)> {
    let labels = frame.text_column(index)?;
    let series = frame
        .headers
        .iter()
        .filter(|h| h.as_str() != index)
        .map(|h| -> Result<(String, Vec<f64>)> { Ok((h.clone(), frame.numeric_column(h)?)) })
        .collect::<Result<Vec<_>>>()?;
    Ok((labels, series))
}

/// Render every chart into `out_dir`, returning the written paths in chart order
pub fn render_all(
    aggregates: &Aggregates,
    options: &RenderOptions,
    out_dir: &Path,
) -> Result<Vec<PathBuf>> {
    fs::create_dir_all(out_dir)
        .with_context(|| format!("Failed to create chart directory '{}'", out_dir.display()))?;

    let mut written = Vec::new();
    for kind in ChartKind::ALL {
        let frame = kind.frame(aggregates);
        debug!(chart = kind.file_stem(), rows = frame.rows.len(), "rendering chart");

        let bytes = render_chart(kind, &frame, options)
            .with_context(|| format!("Failed to render {} chart", kind.file_stem()))?;
        let path = out_dir.join(format!("{}.{}", kind.file_stem(), options.format.extension()));
        fs::write(&path, bytes)
            .with_context(|| format!("Failed to write chart '{}'", path.display()))?;
        info!(path = %path.display(), "wrote chart");
        written.push(path);
    }
    Ok(written)
}
