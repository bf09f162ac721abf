//! # WX Ingest
//!
//! Receive weather sensor frames over a serial port and record them.
//!
//! This application validates ASCII weather frames, converts them to
//! engineering units, and forwards the readings to a storage adapter. A frame
//! simulator can stand in for the sensor.

use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::{error, info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

use wx_ingest::config::{Config, LoggingConfig};
use wx_ingest::frame::FrameSynchronizer;
use wx_ingest::ingest::{ingestion_queue, spawn_worker, ByteReceiver};
use wx_ingest::processor::FrameProcessor;
use wx_ingest::serial::WeatherSerial;
use wx_ingest::simulator::{ConsoleReader, FrameSimulator, SimulatorRunner, HELP_TEXT};
use wx_ingest::telemetry::logger::JsonlLogger;
use wx_ingest::telemetry::{StorageAdapter, TracingStorage};

/// Configuration file used when none is given on the command line
const DEFAULT_CONFIG_PATH: &str = "config/default.toml";

/// Prefix for daily rolling application log files
const LOG_FILE_PREFIX: &str = "wx-ingest.log";

/// Set up the tracing subscriber
///
/// Logs go to stdout unless `file_dir` is set, in which case they go to a
/// daily rolling file. The returned guard must be held until exit.
fn init_logging(config: &LoggingConfig) -> Option<WorkerGuard> {
    let filter = EnvFilter::from_default_env().add_directive(tracing::Level::INFO.into());

    if config.file_dir.is_empty() {
        tracing_subscriber::fmt().with_env_filter(filter).init();
        return None;
    }

    let appender = tracing_appender::rolling::daily(&config.file_dir, LOG_FILE_PREFIX);
    let (writer, guard) = tracing_appender::non_blocking(appender);
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(writer)
        .with_ansi(false)
        .init();
    Some(guard)
}

fn build_storage(config: &Config) -> Result<Arc<dyn StorageAdapter>> {
    if !config.storage.enabled {
        return Ok(Arc::new(TracingStorage));
    }

    let logger = JsonlLogger::new(
        &config.storage.log_dir,
        config.storage.max_records_per_file,
        config.storage.max_files_to_keep,
    )
    .context("failed to initialise telemetry storage")?;
    Ok(Arc::new(logger))
}

/// Main entry point for WX Ingest
///
/// # Control Flow
///
/// 1. **Initialization**
///    - Load configuration (first argument, or `config/default.toml`)
///    - Set up logging
///    - Create the ingestion queue and start the processing worker
///
/// 2. **Running**
///    - Serial task: bytes → synchronizer → checksum → queue
///    - Simulator task: console commands, periodic synthetic frames
///
/// 3. **Shutdown** on Ctrl+C or when every source has ended
///    - Stop the tasks, let the worker drain the queue, log totals
///
/// # Errors
///
/// Returns error if:
/// - Configuration cannot be loaded or is invalid
/// - The queue or storage cannot be created
/// - The serial port cannot be opened
#[tokio::main]
async fn main() -> Result<()> {
    let config_path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| DEFAULT_CONFIG_PATH.to_string());
    let config = Config::load(&config_path)
        .with_context(|| format!("failed to load configuration from {}", config_path))?;

    let _log_guard = init_logging(&config.logging);

    info!("WX Ingest v{} starting...", env!("CARGO_PKG_VERSION"));
    info!("Configuration loaded from {}", config_path);

    let (sender, receiver) = ingestion_queue(config.queue.slots, config.queue.message_size)
        .context("failed to create ingestion queue")?;

    let storage = build_storage(&config)?;
    let epoch = Instant::now();

    let worker = spawn_worker(
        receiver,
        FrameProcessor::with_epoch(Arc::clone(&storage), &config.sensor.identity, epoch),
    )?;

    let serial_task = if config.serial.enabled {
        let mut port = WeatherSerial::open(&config.serial.port, config.serial.baud_rate)?;
        info!("Sensor serial port opened at: {}", port.device_path());

        let sync =
            FrameSynchronizer::new().with_resync(config.sync.resync_on_start_marker);
        let mut byte_receiver = ByteReceiver::new(sync, sender);
        let read_buffer_size = config.serial.read_buffer_size;

        Some(tokio::spawn(async move {
            match byte_receiver.run(&mut port, read_buffer_size).await {
                Ok(stats) => info!(
                    "Serial input ended ({} bytes, {} frames queued, {} dropped)",
                    stats.bytes, stats.queued, stats.dropped
                ),
                Err(e) => error!("Serial input failed: {}", e),
            }
        }))
    } else {
        info!("Serial input disabled");
        drop(sender);
        None
    };

    let rng = match config.simulator.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    let runner = SimulatorRunner::new(
        FrameSimulator::new(rng),
        FrameProcessor::with_epoch(Arc::clone(&storage), &config.sensor.identity, epoch),
        config.simulator.enabled,
        Duration::from_millis(config.simulator.interval_ms),
    );
    let console = ConsoleReader::spawn_stdin()?;
    let simulator_task = tokio::spawn(runner.run(console));

    println!("{}", HELP_TEXT);
    info!("Press Ctrl+C to exit");

    match serial_task {
        Some(serial_task) => {
            let serial_abort = serial_task.abort_handle();
            tokio::select! {
                _ = serial_task => {
                    if !config.simulator.enabled {
                        warn!("Serial input ended and simulator is off; press s to start it or Ctrl+C to exit");
                    }
                    tokio::signal::ctrl_c().await?;
                }
                result = tokio::signal::ctrl_c() => {
                    result?;
                    serial_abort.abort();
                }
            }
        }
        None => tokio::signal::ctrl_c().await?,
    }

    info!("Received Ctrl+C, shutting down...");
    simulator_task.abort();

    let stats = tokio::task::spawn_blocking(move || worker.join())
        .await?
        .map_err(|_| anyhow::anyhow!("processing worker panicked"))?;
    info!(
        "Total frames processed: {} ({} parse errors, {} storage errors)",
        stats.processed, stats.parse_errors, stats.storage_errors
    );

    Ok(())
}
