use std::fs::File;
use std::path::PathBuf;

use anyhow::{anyhow, bail, Context, Result};
use clap::{Parser, ValueHint};
use log::info;

use pacelens_core::{
    analyze_session_with_metrics, config::load_cfg, print_session_report, Cfg, EngineMetrics,
    RawTable, ZoneTable,
};

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "Training telemetry analytics for one session",
    long_about = None
)]
struct Cli {
    /// Raw-sample table exported by the file parser (.csv or .json records)
    #[arg(value_hint = ValueHint::FilePath)]
    input: PathBuf,

    /// Analysis config (JSON); defaults when omitted
    #[arg(long, value_hint = ValueHint::FilePath)]
    config: Option<PathBuf>,

    /// Zone table preset, overrides the config (`coros` or `even`)
    #[arg(long)]
    zones: Option<String>,

    /// Print the full JSON report instead of the text summary
    #[arg(long)]
    json: bool,

    /// Print prometheus counters after the report
    #[arg(long)]
    metrics: bool,
}

fn read_table(path: &PathBuf) -> Result<RawTable> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
        .unwrap_or_default();
    let table = match ext.as_str() {
        "csv" => {
            let file = File::open(path).with_context(|| format!("open {}", path.display()))?;
            RawTable::from_csv_reader(file)?
        }
        "json" => {
            let text = std::fs::read_to_string(path)
                .with_context(|| format!("read {}", path.display()))?;
            RawTable::from_json_records(&text)?
        }
        other => bail!("unsupported input format `{other}` (expected .csv or .json)"),
    };
    info!("{}: {} rows, columns {:?}", path.display(), table.len(), table.columns());
    Ok(table)
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    let cli = Cli::parse();

    let mut cfg = match &cli.config {
        Some(p) => load_cfg(p).with_context(|| format!("config {}", p.display()))?,
        None => Cfg::default(),
    };
    if let Some(name) = &cli.zones {
        cfg.zone_table =
            ZoneTable::preset(name).ok_or_else(|| anyhow!("unknown zone table `{name}`"))?;
    }

    let table = read_table(&cli.input)?;
    let metrics = EngineMetrics::new()?;
    let report = analyze_session_with_metrics(&table, &cfg, Some(&metrics))
        .with_context(|| format!("analyze {}", cli.input.display()))?;

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_session_report(&report);
    }
    if cli.metrics {
        print!("{}", metrics.encode_text()?);
    }
    Ok(())
}
