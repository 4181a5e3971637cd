use anyhow::{Context, Result};
use clap::Parser;
use orderlens::config::Config;
use orderlens::{runtime, OutputFormat};
use std::io;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "orderlens")]
#[command(about = "Summarize and chart online shopping orders", long_about = None)]
struct Args {
    /// Orders CSV (OrderID,UserID,Gender,Age,ProductCategory,Quantity,Price,OrderDate);
    /// the built-in sample dataset is used when omitted
    #[arg(short, long)]
    input: Option<PathBuf>,

    /// Persist the canonical table to this CSV file
    #[arg(long)]
    save: Option<PathBuf>,

    /// Directory for the rendered charts
    #[arg(long)]
    charts: Option<PathBuf>,

    /// Skip chart rendering
    #[arg(long)]
    no_charts: bool,

    /// JSON configuration file; flags override its values
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Age buckets, e.g. '20-25=[20,25]; 26-30=(25,30]'
    #[arg(long)]
    age_buckets: Option<String>,

    /// Chart image format
    #[arg(long, value_enum)]
    format: Option<OutputFormat>,

    /// Write every aggregate as JSON to this file
    #[arg(long)]
    aggregates_json: Option<PathBuf>,
}

impl Args {
    fn into_config(self) -> Result<Config> {
        let mut config = match &self.config {
            Some(path) => Config::load(path)?,
            None => Config::default(),
        };

        if let Some(input) = self.input {
            config.input = Some(input);
        }
        if let Some(save) = self.save {
            config.save = Some(save);
        }
        if let Some(charts) = self.charts {
            config.charts_dir = charts;
        }
        if self.no_charts {
            config.render_charts = false;
        }
        if let Some(spec) = self.age_buckets {
            config.age_buckets = Some(spec);
        }
        if let Some(format) = self.format {
            config.render.format = format;
        }
        if let Some(path) = self.aggregates_json {
            config.aggregates_json = Some(path);
        }
        Ok(config)
    }
}

fn main() -> Result<()> {
    // Logs go to stderr; stdout carries the report
    tracing_subscriber::fmt()
        .with_target(false)
        .with_writer(io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("orderlens=info,warn")),
        )
        .init();

    let config = Args::parse().into_config()?;

    let stdout = io::stdout();
    let summary = runtime::run(&config, stdout.lock()).context("Analysis failed")?;

    if let Some(path) = &summary.saved {
        eprintln!("Dataset saved as '{}'", path.display());
    }
    for chart in &summary.charts {
        eprintln!("Chart written: {}", chart.display());
    }

    Ok(())
}
