// Pipeline executor: table → aggregates → report and charts

use crate::aggregate::Aggregates;
use crate::config::Config;
use crate::order::sample_orders;
use crate::render::{self, ChartKind};
use crate::report::Report;
use crate::table::OrderTable;
use anyhow::{Context, Result};
use serde_json::{Map, Value};
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// What a run produced besides the report text
#[derive(Debug, Clone, Default)]
pub struct RunSummary {
    pub rows: usize,
    pub saved: Option<PathBuf>,
    pub charts: Vec<PathBuf>,
    pub aggregates_json: Option<PathBuf>,
}

/// Build the canonical table described by `config`
pub fn load_table(config: &Config) -> Result<OrderTable> {
    let buckets = config.age_buckets()?;
    debug!(buckets = %buckets, "age buckets");

    match &config.input {
        Some(path) => OrderTable::load(path, buckets)
            .with_context(|| format!("Failed to load orders from '{}'", path.display())),
        None => {
            info!("no input file given, using the built-in sample dataset");
            Ok(OrderTable::build(sample_orders(), buckets)?)
        }
    }
}

/// Run the whole pipeline, writing the report to `out`
pub fn run<W: Write>(config: &Config, out: W) -> Result<RunSummary> {
    let table = load_table(config)?;

    let saved = match config.save_path() {
        Some(path) => {
            table.save(&path).context("Failed to persist orders")?;
            Some(path)
        }
        None => None,
    };

    let aggregates = Aggregates::compute(&table)?;

    Report::build(&table, &aggregates)
        .write_to(out)
        .context("Failed to write report")?;

    let charts = if config.render_charts {
        render::render_all(&aggregates, &config.render, &config.charts_dir)?
    } else {
        debug!("chart rendering disabled");
        Vec::new()
    };

    if let Some(path) = &config.aggregates_json {
        write_aggregates_json(&aggregates, path)?;
    }

    Ok(RunSummary {
        rows: table.len(),
        saved,
        charts,
        aggregates_json: config.aggregates_json.clone(),
    })
}

/// Dump every chart frame as `{ "<chart>": [ {column: value, ...}, ... ] }`
pub fn write_aggregates_json(aggregates: &Aggregates, path: &Path) -> Result<()> {
    let mut doc = Map::new();
    for kind in ChartKind::ALL {
        doc.insert(kind.file_stem().to_string(), kind.frame(aggregates).to_json());
    }
    doc.insert(
        "average_basket_size".to_string(),
        serde_json::json!(aggregates.average_basket_size),
    );

    let json = serde_json::to_string_pretty(&Value::Object(doc))
        .context("Failed to serialize aggregates")?;
    std::fs::write(path, json)
        .with_context(|| format!("Failed to write aggregates to '{}'", path.display()))?;
    info!(path = %path.display(), "wrote aggregates");
    Ok(())
}
