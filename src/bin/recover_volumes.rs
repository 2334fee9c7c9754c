use anyhow::{Context, Result};
use clap::Parser;
use datanode::{load_recovery_config, recover_volumes};
use env_logger::Env;
use log::{info, warn};
use std::io::Write;
use std::path::PathBuf;

const DEFAULT_LOG_FILTER: &str = "info,datanode=info";

#[derive(Parser, Debug, Clone)]
struct Cli {
    /// Path to the node recovery configuration YAML
    #[arg(long)]
    config: PathBuf,

    /// env_logger-style filter string (e.g. "info,datanode::volume=debug");
    /// overrides the config file
    #[arg(long)]
    log_filter: Option<String>,

    /// Print the full recovery report as JSON on stdout
    #[arg(long)]
    json: bool,
}

fn init_logging(filter: Option<&str>) {
    let env = Env::default().default_filter_or(DEFAULT_LOG_FILTER);
    let mut builder = env_logger::Builder::from_env(env);
    if let Some(filter) = filter {
        builder.parse_filters(filter);
    }
    builder.format_timestamp_secs();
    builder.format(|buf, record| {
        let ts = buf.timestamp();
        writeln!(
            buf,
            "[{} {:<5} {}] {}",
            ts,
            record.level(),
            record.target(),
            record.args()
        )
    });
    builder.init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = load_recovery_config(&cli.config)
        .with_context(|| format!("loading {}", cli.config.display()))?;
    init_logging(cli.log_filter.as_deref().or(config.log_filter.as_deref()));
    info!(
        "event=recovery_start config={} volumes={}",
        cli.config.display(),
        config.volumes.len()
    );

    let outcome = recover_volumes(&config);
    for root in outcome.report.failed_volumes() {
        warn!("event=volume_unusable root={}", root.display());
    }
    if cli.json {
        let stdout = std::io::stdout();
        serde_json::to_writer_pretty(stdout.lock(), &outcome.report)
            .context("writing recovery report")?;
        println!();
    } else {
        println!(
            "recovered {} containers from {} volumes ({} skipped, {} volumes failed)",
            outcome.catalog.len(),
            outcome.report.volumes.len(),
            outcome.report.total_skipped(),
            outcome.registry.failed_roots().len()
        );
    }
    Ok(())
}
