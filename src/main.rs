// Copyright (c) 2026 bad-antics
// Licensed under the MIT License. See LICENSE file in the project root.
// https://github.com/bad-antics/sensorpoll-rs

//! sensorpoll - poll sensors on their own intervals and queue every reading

use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn, Level};
use tracing_subscriber::FmtSubscriber;

use sensorpoll::{Config, LoopExit, PollingEngine, ReadingQueue, SqliteStore, VERSION};

/// Poll sensors and store their readings
#[derive(Parser, Debug)]
#[command(name = "sensorpoll")]
#[command(version = VERSION)]
#[command(about = "Periodic sensor polling into a durable reading queue")]
struct Args {
    /// Configuration file path
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long)]
    debug: bool,

    /// Enable trace-level logging
    #[arg(long)]
    trace: bool,

    /// Demo mode with simulated sensors
    #[arg(long)]
    demo: bool,

    /// Database file
    #[arg(long)]
    database: Option<PathBuf>,

    /// Stop after this many seconds instead of waiting for Ctrl+C
    #[arg(long)]
    duration: Option<f64>,

    /// Print stored readings as JSON lines and exit
    #[arg(long)]
    dump: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();

    // Load or create configuration; nothing is logged until the subscriber is up
    let config_path = args.config.clone().unwrap_or_else(Config::default_path);
    let (mut config, origin) = Config::open(&config_path)?;
    let config_level = config.parsed_log_level();

    // Initialize logging
    let log_level = if args.trace {
        Level::TRACE
    } else if args.debug {
        Level::DEBUG
    } else {
        config_level.unwrap_or(Level::INFO)
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_target(false)
        .with_thread_ids(true)
        .with_file(args.debug)
        .with_line_number(args.debug)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    info!("sensorpoll v{}", VERSION);
    info!("Configuration {} {:?}", origin, config_path);
    if config_level.is_none() {
        warn!(
            log_level = %config.log_level,
            "Unrecognized log_level in configuration, using {}",
            log_level
        );
    }

    // Override with command line args
    if args.demo {
        config.demo_mode = true;
    }
    if let Some(database) = args.database.clone() {
        config.database.path = database;
    }

    let store = Arc::new(SqliteStore::open(&config.database)?);

    if args.dump {
        return dump(&store);
    }

    let duration = args
        .duration
        .map(Duration::try_from_secs_f64)
        .transpose()?;

    let rt = tokio::runtime::Runtime::new()?;
    rt.block_on(run(config, store, duration))
}

fn dump(store: &SqliteStore) -> Result<()> {
    for reading in store.all_readings()? {
        println!("{}", serde_json::to_string(&reading)?);
    }
    let stats = store.stats()?;
    info!(
        readings = stats.reading_count,
        sensors = stats.sensor_count,
        queued = store.len()?,
        "Dump complete"
    );
    Ok(())
}

async fn run(config: Config, store: Arc<SqliteStore>, duration: Option<Duration>) -> Result<()> {
    let engine = PollingEngine::new(store);

    for spec in config.active_sensors() {
        engine.add_sensor(spec.build()?);
    }
    if engine.sensor_count() == 0 {
        warn!("No sensors configured; add [[sensors]] entries or run with --demo");
    }

    engine.start_polling().await?;
    info!("Polling {} sensor(s)", engine.sensor_count());

    match duration {
        Some(limit) => {
            info!("Running for {:?}", limit);
            tokio::select! {
                _ = tokio::time::sleep(limit) => {}
                res = tokio::signal::ctrl_c() => res?,
            }
        }
        None => {
            info!("Press Ctrl+C to stop");
            tokio::signal::ctrl_c().await?;
        }
    }

    info!("Shutdown requested, stopping sensors...");
    for report in engine.stop_polling().await {
        match &report.exit {
            LoopExit::Stopped => info!(
                sensor_id = %report.sensor_id,
                samples = report.samples,
                "Sensor stopped"
            ),
            exit => warn!(
                sensor_id = %report.sensor_id,
                samples = report.samples,
                exit = ?exit,
                "Sensor ended early"
            ),
        }
    }

    info!("sensorpoll shutdown complete");
    Ok(())
}
