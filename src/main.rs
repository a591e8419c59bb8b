use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use chrono::{DateTime, Utc};
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

mod clock;
mod config;
mod engine;
mod explain;
mod guidance;
mod ingest;
mod models;
mod report;
mod risk;
mod stream;
mod vocabulary;
mod window;

use clock::FixedClock;
use config::EngineConfig;
use engine::RiskEngine;

#[derive(Parser)]
#[command(name = "bloomguard")]
#[command(about = "Pregnancy symptom and vitals risk assessment", long_about = None)]
struct Cli {
    /// JSON config file (falls back to BLOOMGUARD_CONFIG)
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    /// Override the trailing window, in hours
    #[arg(long, global = true)]
    horizon_hours: Option<i64>,
    /// Pin "now" (RFC 3339) for reproducible as-of and generated-at stamps
    #[arg(long, global = true)]
    now: Option<DateTime<Utc>>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Write a sample event file
    Seed {
        #[arg(long, default_value = "events.jsonl")]
        out: PathBuf,
    },
    /// Assess one patient's current risk
    Assess {
        #[arg(long)]
        events: PathBuf,
        #[arg(long)]
        patient: String,
    },
    /// Show guidance cards for one patient
    Guidance {
        #[arg(long)]
        events: PathBuf,
        #[arg(long)]
        patient: String,
    },
    /// Rank every patient by risk
    Dashboard {
        #[arg(long)]
        events: PathBuf,
        #[arg(long)]
        limit: Option<usize>,
    },
    /// Generate a markdown report
    Report {
        #[arg(long)]
        events: PathBuf,
        #[arg(long, default_value = "report.md")]
        out: PathBuf,
    },
    /// Replay an event file at a fixed pace
    Stream {
        #[arg(long)]
        events: PathBuf,
        #[arg(long, default_value_t = 500)]
        interval_ms: u64,
        #[arg(long, default_value_t = 5)]
        every: usize,
    },
}

fn build_engine(config: EngineConfig, now: Option<DateTime<Utc>>) -> RiskEngine {
    match now {
        Some(now) => RiskEngine::with_clock(config, Arc::new(FixedClock(now))),
        None => RiskEngine::new(config),
    }
}

fn load_engine(
    config: EngineConfig,
    now: Option<DateTime<Utc>>,
    events: &std::path::Path,
) -> anyhow::Result<RiskEngine> {
    let engine = build_engine(config, now);
    ingest::import_file(&engine, events)?;
    tracing::info!(patients = engine.patient_ids().len(), "engine ready");
    Ok(engine)
}

fn print_json(value: &impl serde::Serialize) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    let config = EngineConfig::load(cli.config.as_deref(), cli.horizon_hours)
        .context("failed to load configuration")?;

    match cli.command {
        Commands::Seed { out } => {
            let written = ingest::write_seed(&out)?;
            println!("Wrote {written} sample events to {}.", out.display());
        }
        Commands::Assess { events, patient } => {
            let engine = load_engine(config, cli.now, &events)?;
            print_json(&engine.current_assessment(&patient))?;
        }
        Commands::Guidance { events, patient } => {
            let engine = load_engine(config, cli.now, &events)?;
            print_json(&engine.guidance(&patient))?;
        }
        Commands::Dashboard { events, limit } => {
            let engine = load_engine(config, cli.now, &events)?;
            let mut overview = engine.dashboard();
            if let Some(limit) = limit {
                overview.patients.truncate(limit);
            }
            print_json(&overview)?;
        }
        Commands::Report { events, out } => {
            let engine = load_engine(config, cli.now, &events)?;
            let report = report::build_report(&engine);
            std::fs::write(&out, report)
                .with_context(|| format!("failed to write {}", out.display()))?;
            println!("Report written to {}.", out.display());
        }
        Commands::Stream {
            events,
            interval_ms,
            every,
        } => {
            let events = ingest::read_events(&events)?;
            tracing::info!(count = events.len(), interval_ms, "starting replay");
            let engine = Arc::new(build_engine(config, cli.now));
            let overview =
                stream::replay(engine, events, Duration::from_millis(interval_ms), every).await;
            print_json(&overview)?;
        }
    }

    Ok(())
}
