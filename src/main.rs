use anyhow::{Context, Result};
use clap::Parser;
use dashgraph::csv_reader;
use dashgraph::parser;
use dashgraph::{ChartOptions, Dashboard, Dataset, EngineOptions, Renderer, WidgetId};
use indexmap::IndexMap;
use std::io::{self, Read, Write};
use std::sync::Arc;

#[derive(Parser, Debug)]
#[command(name = "dashgraph")]
#[command(about = "Aggregate tabular data into chart option objects", long_about = None)]
struct Args {
    /// Widget expressions (e.g., 'bar(x: city, y: [sales, cost], agg: avg) | pie(x: city)')
    dsl: String,

    /// Read stdin as a JSON array of row objects instead of CSV
    #[arg(long)]
    json: bool,

    /// JSON file with engine options (row_limit, palette, ...)
    #[arg(long, value_name = "FILE")]
    config: Option<String>,

    /// Pretty-print the output
    #[arg(long)]
    pretty: bool,
}

/// Keeps the latest options per widget, in creation order
#[derive(Default)]
struct CollectingRenderer {
    charts: IndexMap<WidgetId, ChartOptions>,
}

impl Renderer for CollectingRenderer {
    fn render(&mut self, id: WidgetId, options: &ChartOptions) {
        self.charts.insert(id, options.clone());
    }

    fn release(&mut self, id: WidgetId) {
        self.charts.shift_remove(&id);
    }
}

fn load_options(path: Option<&str>) -> Result<EngineOptions> {
    let Some(path) = path else {
        return Ok(EngineOptions::default());
    };
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file '{}'", path))?;
    serde_json::from_str(&text).with_context(|| format!("Invalid config file '{}'", path))
}

fn read_dataset(json: bool) -> Result<Dataset> {
    if !json {
        return csv_reader::read_csv_from_stdin().context("Failed to read CSV from stdin");
    }
    let mut text = String::new();
    io::stdin()
        .read_to_string(&mut text)
        .context("Failed to read JSON from stdin")?;
    let value: serde_json::Value = serde_json::from_str(&text).context("Invalid JSON input")?;
    Dataset::from_json(&value)
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    let options = load_options(args.config.as_deref())?;

    let dataset = read_dataset(args.json)?;
    log::info!("read {} rows, {} columns", dataset.len(), dataset.columns.len());

    let widgets = match parser::parse_dashboard(&args.dsl) {
        Ok(widgets) => widgets,
        Err(e) => {
            eprintln!("{}", e);
            std::process::exit(1);
        }
    };

    let mut dashboard = Dashboard::new(CollectingRenderer::default(), options);
    dashboard.load_dataset(Arc::new(dataset));

    for decl in &widgets {
        let id = dashboard.add_widget(decl.kind);
        if !decl.patch.is_empty() {
            dashboard
                .apply_patch(id, &decl.patch)
                .with_context(|| format!("Failed to configure {}", id))?;
        }
    }

    let charts: Vec<ChartOptions> = dashboard.into_renderer().charts.into_values().collect();
    let output = if args.pretty {
        serde_json::to_string_pretty(&charts)
    } else {
        serde_json::to_string(&charts)
    }
    .context("Failed to serialize chart options")?;

    let stdout = io::stdout();
    let mut handle = stdout.lock();
    writeln!(handle, "{}", output).context("Failed to write to stdout")?;
    handle.flush().context("Failed to flush stdout")?;

    Ok(())
}
