//! # JSONL Telemetry Logger
//!
//! Storage adapter writing one JSON object per line, with file rotation.
//!
//! - A new file is started after `max_records_per_file` records
//! - Only the newest `max_files_to_keep` files are retained
//! - Files are named `wx_<YYYYMMDD_HHMMSS>_<seq>.jsonl` so that lexical order
//!   is creation order

use std::fs::{self, File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use serde::Serialize;
use tracing::{debug, info, warn};

use super::{StorageAdapter, StorageRecord};
use crate::error::{Result, WxIngestError};

const FILE_PREFIX: &str = "wx_";
const FILE_EXTENSION: &str = "jsonl";

/// One line of the log file
#[derive(Serialize)]
struct LogLine<'a> {
    /// Wall-clock time the record was written (RFC 3339)
    recorded_at: String,
    #[serde(flatten)]
    record: &'a StorageRecord,
}

struct LoggerState {
    writer: Option<BufWriter<File>>,
    records_in_file: usize,
    sequence: u64,
}

/// Rotating JSONL storage adapter
pub struct JsonlLogger {
    log_dir: PathBuf,
    max_records_per_file: usize,
    max_files_to_keep: usize,
    state: Mutex<LoggerState>,
}

impl std::fmt::Debug for JsonlLogger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JsonlLogger")
            .field("log_dir", &self.log_dir)
            .field("max_records_per_file", &self.max_records_per_file)
            .field("max_files_to_keep", &self.max_files_to_keep)
            .finish_non_exhaustive()
    }
}

impl JsonlLogger {
    /// Create a logger writing into `log_dir`
    ///
    /// The directory is created if it does not exist. No file is opened until
    /// the first record arrives.
    ///
    /// # Errors
    ///
    /// Returns `Io` if the directory cannot be created
    pub fn new<P: AsRef<Path>>(
        log_dir: P,
        max_records_per_file: usize,
        max_files_to_keep: usize,
    ) -> Result<Self> {
        let log_dir = log_dir.as_ref().to_path_buf();
        fs::create_dir_all(&log_dir)?;

        info!("Telemetry logging to {}", log_dir.display());

        Ok(Self {
            log_dir,
            max_records_per_file: max_records_per_file.max(1),
            max_files_to_keep: max_files_to_keep.max(1),
            state: Mutex::new(LoggerState {
                writer: None,
                records_in_file: 0,
                sequence: 0,
            }),
        })
    }

    /// Directory receiving the log files
    pub fn log_dir(&self) -> &Path {
        &self.log_dir
    }

    fn open_next_file(&self, state: &mut LoggerState) -> Result<()> {
        if let Some(mut writer) = state.writer.take() {
            writer.flush()?;
        }

        let name = format!(
            "{}{}_{:04}.{}",
            FILE_PREFIX,
            chrono::Local::now().format("%Y%m%d_%H%M%S"),
            state.sequence,
            FILE_EXTENSION
        );
        state.sequence += 1;

        let path = self.log_dir.join(name);
        let file = OpenOptions::new().create(true).append(true).open(&path)?;
        debug!("Opened telemetry file {}", path.display());

        state.writer = Some(BufWriter::new(file));
        state.records_in_file = 0;

        self.prune_old_files()
    }

    /// Delete the oldest log files beyond the retention limit
    fn prune_old_files(&self) -> Result<()> {
        let mut files: Vec<PathBuf> = fs::read_dir(&self.log_dir)?
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|path| is_log_file(path))
            .collect();

        if files.len() <= self.max_files_to_keep {
            return Ok(());
        }

        files.sort();
        let excess = files.len() - self.max_files_to_keep;

        for path in files.into_iter().take(excess) {
            if let Err(e) = fs::remove_file(&path) {
                warn!("Failed to remove old telemetry file {}: {}", path.display(), e);
            } else {
                debug!("Removed old telemetry file {}", path.display());
            }
        }

        Ok(())
    }
}

fn is_log_file(path: &Path) -> bool {
    let has_prefix = path
        .file_name()
        .and_then(|name| name.to_str())
        .is_some_and(|name| name.starts_with(FILE_PREFIX));
    let has_extension = path.extension().and_then(|ext| ext.to_str()) == Some(FILE_EXTENSION);

    has_prefix && has_extension
}

impl StorageAdapter for JsonlLogger {
    fn insert(&self, record: &StorageRecord) -> Result<()> {
        let mut state = self
            .state
            .lock()
            .map_err(|_| WxIngestError::Storage("telemetry logger lock poisoned".to_string()))?;

        if state.writer.is_none() || state.records_in_file >= self.max_records_per_file {
            self.open_next_file(&mut state)?;
        }

        let line = LogLine {
            recorded_at: chrono::Utc::now().to_rfc3339(),
            record,
        };
        let json = serde_json::to_string(&line)
            .map_err(|e| WxIngestError::Storage(format!("Failed to serialize record: {}", e)))?;

        let writer = state
            .writer
            .as_mut()
            .ok_or_else(|| WxIngestError::Storage("no open telemetry file".to_string()))?;
        writeln!(writer, "{}", json)?;
        writer.flush()?;

        state.records_in_file += 1;
        Ok(())
    }
}
