//! Stock insight command-line entry point
//!
//! # Usage
//!
//! ```bash
//! # Serve the dashboard on 0.0.0.0:8501
//! stock-insight serve
//!
//! # One-shot analysis with an Excel export
//! stock-insight analyze 600519 --years 2 --output 600519_report.xlsx
//! ```

use clap::{Parser, Subcommand};
use comfy_table::presets::UTF8_FULL;
use comfy_table::{ContentArrangement, Table};
use insight_utils::{LogFormat, init_tracing};
use std::path::PathBuf;
use stock_insight::report::ExcelReport;
use stock_insight::valuation::format_metric;
use stock_insight::{AnalysisEngine, AnalysisReport, InsightConfig};
use tracing::info;

#[derive(Parser)]
#[command(name = "stock-insight")]
#[command(about = "Stock market insight dashboard", long_about = None)]
struct Cli {
    /// Log output format
    #[arg(long, global = true, env = "STOCK_INSIGHT_LOG_FORMAT", default_value = "pretty")]
    log_format: LogFormat,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Serve the web dashboard
    Serve {
        /// Bind host (overrides STOCK_INSIGHT_HOST)
        #[arg(long)]
        host: Option<String>,
        /// Bind port (overrides STOCK_INSIGHT_PORT)
        #[arg(long)]
        port: Option<u16>,
    },
    /// Analyze one ticker and print a summary
    Analyze {
        /// Ticker or six-digit A-share code
        code: String,
        /// Years of history (1-5)
        #[arg(long, default_value_t = 1)]
        years: u32,
        /// Write the Excel report to this path
        #[arg(long, short)]
        output: Option<PathBuf>,
    },
}

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.log_format);

    match cli.command {
        Commands::Serve { host, port } => {
            let mut builder = InsightConfig::builder();
            if let Some(host) = host {
                builder = builder.host(host);
            }
            if let Some(port) = port {
                builder = builder.port(port);
            }
            let config = builder.with_env()?.build()?;
            stock_insight::server::run(config).await?;
        }
        Commands::Analyze { code, years, output } => {
            let config = InsightConfig::from_env()?;
            let engine = AnalysisEngine::new(&config);
            let report = engine.analyze(&code, years).await?;

            println!("{}", summary_table(&report));
            for warning in &report.warnings {
                println!("⚠ {warning}");
            }

            if let Some(path) = output {
                let bytes = ExcelReport::build(&report)?;
                std::fs::write(&path, bytes)?;
                info!(path = %path.display(), "excel report written");
                println!("Report written to {}", path.display());
            }
        }
    }

    Ok(())
}

fn summary_table(report: &AnalysisReport) -> Table {
    let perf = &report.performance;
    let metrics = &report.valuation;
    let percent = |v: Option<f64>| v.map_or_else(|| "—".to_string(), |v| format!("{v:+.2}%"));

    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec!["指标 / Metric", "值 / Value"]);

    table.add_row(vec!["Symbol".to_string(), report.symbol.to_string()]);
    table.add_row(vec!["Bars".to_string(), report.prices.len().to_string()]);
    table.add_row(vec!["Prices".to_string(), report.prices.origin.label()]);
    table.add_row(vec!["Close".to_string(), format_metric(perf.latest_close)]);
    table.add_row(vec!["1M".to_string(), percent(perf.change_1m)]);
    table.add_row(vec!["3M".to_string(), percent(perf.change_3m)]);
    table.add_row(vec!["Period".to_string(), percent(perf.change_1y)]);
    table.add_row(vec!["PE (TTM)".to_string(), format_metric(metrics.pe_ttm)]);
    table.add_row(vec!["PB".to_string(), format_metric(metrics.pb)]);
    table.add_row(vec!["ROE (%)".to_string(), format_metric(metrics.roe)]);
    table.add_row(vec!["Industry avg PE".to_string(), format_metric(metrics.industry_avg_pe)]);

    if let Some(point) = report.macd.last() {
        table.add_row(vec![
            "MACD (DIF / DEA)".to_string(),
            format!("{:.3} / {:.3}", point.values.dif, point.values.dea),
        ]);
    }
    if let Some(point) = report.kdj.last() {
        table.add_row(vec![
            "KDJ (K / D / J)".to_string(),
            format!(
                "{} / {} / {}",
                format_metric(point.values.k),
                format_metric(point.values.d),
                format_metric(point.values.j)
            ),
        ]);
    }

    let signals = if report.signals.is_empty() {
        "无明确信号 (no clear signal)".to_string()
    } else {
        report
            .signals
            .iter()
            .map(|s| s.label())
            .collect::<Vec<_>>()
            .join("\n")
    };
    table.add_row(vec!["Signals".to_string(), signals]);
    table.add_row(vec!["News".to_string(), report.news.summary.clone()]);

    table
}
