//! JSON-based exchange history storage.
//!
//! Stores each exchange as a separate JSON file for simplicity and durability.

use crate::error::{ControlError, ControlResult, StorageError, StorageResult};
use crate::instrument::Confirmation;
use crate::types::{PortId, Quantity, RecordId, Setpoint};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

/// How an exchange ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExchangeOutcome {
    Confirmed,
    PortUnavailable,
    Unconfirmed,
    CommunicationError,
}

impl fmt::Display for ExchangeOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Confirmed => write!(f, "confirmed"),
            Self::PortUnavailable => write!(f, "port unavailable"),
            Self::Unconfirmed => write!(f, "unconfirmed"),
            Self::CommunicationError => write!(f, "communication error"),
        }
    }
}

/// A persisted exchange.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExchangeRecord {
    /// Unique identifier for this exchange.
    pub id: RecordId,
    /// When the exchange was started.
    pub started_at: DateTime<Utc>,
    /// Total duration in milliseconds.
    pub duration_ms: u64,
    pub port: PortId,
    pub quantity: Quantity,
    /// Value as entered by the operator.
    pub commanded: String,
    pub outcome: ExchangeOutcome,
    /// Reading returned by the instrument, when one was parsed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub observed: Option<f64>,
    /// Failure description for anything but a confirmation.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

impl ExchangeRecord {
    /// Build a record from the result of an exchange.
    ///
    /// Input rejections never reach the port and are not recorded.
    pub fn from_result(
        started_at: DateTime<Utc>,
        duration_ms: u64,
        port: &PortId,
        setpoint: &Setpoint,
        result: &ControlResult<Confirmation>,
    ) -> Option<Self> {
        let (outcome, observed, detail) = match result {
            Ok(confirmation) => (ExchangeOutcome::Confirmed, Some(confirmation.observed), None),
            Err(e) if e.is_input_rejection() => return None,
            Err(e @ ControlError::PortUnavailable { .. }) => {
                (ExchangeOutcome::PortUnavailable, None, Some(e.to_string()))
            }
            Err(e @ ControlError::Unconfirmed { observed, .. }) => {
                (ExchangeOutcome::Unconfirmed, Some(*observed), Some(e.to_string()))
            }
            Err(e) => (ExchangeOutcome::CommunicationError, None, Some(e.to_string())),
        };

        Some(Self {
            id: RecordId::new(),
            started_at,
            duration_ms,
            port: port.clone(),
            quantity: setpoint.quantity(),
            commanded: setpoint.text().to_string(),
            outcome,
            observed,
            detail,
        })
    }

    /// Get a short summary of the exchange.
    pub fn summary(&self) -> String {
        format!(
            "{} {} on {} - {} [{:.2}s]",
            self.quantity,
            self.commanded,
            self.port,
            self.outcome,
            self.duration_ms as f64 / 1000.0
        )
    }
}

/// JSON file-based history storage.
pub struct HistoryStore {
    dir: PathBuf,
}

impl HistoryStore {
    /// Open (and create if needed) a history store in `dir`.
    pub fn open(dir: impl AsRef<Path>) -> StorageResult<Self> {
        let dir = dir.as_ref().to_path_buf();
        fs::create_dir_all(&dir).map_err(|e| StorageError::DirectoryError(e.to_string()))?;
        Ok(Self { dir })
    }

    /// Save a record.
    pub fn save(&self, record: &ExchangeRecord) -> StorageResult<()> {
        let file = self.record_file(&record.id);
        let content = serde_json::to_string_pretty(record)?;

        fs::write(&file, content).map_err(|e| StorageError::SaveFailed(e.to_string()))
    }

    /// List all records, most recent first. Unreadable files are skipped.
    pub fn list(&self) -> StorageResult<Vec<ExchangeRecord>> {
        let mut records: Vec<ExchangeRecord> = self
            .json_files()?
            .iter()
            .filter_map(|path| Self::load_file(path).ok())
            .collect();

        records.sort_by(|a, b| b.started_at.cmp(&a.started_at));

        Ok(records)
    }

    /// List recent records (last n).
    pub fn list_recent(&self, count: usize) -> StorageResult<Vec<ExchangeRecord>> {
        let mut records = self.list()?;
        records.truncate(count);
        Ok(records)
    }

    /// Load a record by ID.
    pub fn load(&self, id: &RecordId) -> StorageResult<ExchangeRecord> {
        let file = self.record_file(id);

        if !file.exists() {
            return Err(StorageError::RecordNotFound(id.to_string()));
        }

        Self::load_file(&file)
    }

    /// Find a record by short ID prefix.
    pub fn find_by_prefix(&self, prefix: &str) -> StorageResult<ExchangeRecord> {
        let matches: Vec<_> = self
            .list_ids()?
            .into_iter()
            .filter(|id| id.to_string().starts_with(prefix))
            .collect();

        match matches.len() {
            0 => Err(StorageError::RecordNotFound(prefix.to_string())),
            1 => self.load(&matches[0]),
            n => Err(StorageError::LoadFailed(format!(
                "ambiguous prefix '{}': {} matches",
                prefix, n
            ))),
        }
    }

    /// IDs of every stored record.
    pub fn list_ids(&self) -> StorageResult<Vec<RecordId>> {
        Ok(self
            .json_files()?
            .iter()
            .filter_map(|path| path.file_stem()?.to_string_lossy().parse().ok())
            .collect())
    }

    /// Delete every `*.json` file in the store, readable or not. Returns how
    /// many were removed.
    pub fn clear(&self) -> StorageResult<usize> {
        let files = self.json_files()?;
        for file in &files {
            fs::remove_file(file).map_err(|e| StorageError::SaveFailed(e.to_string()))?;
        }
        Ok(files.len())
    }

    fn json_files(&self) -> StorageResult<Vec<PathBuf>> {
        let mut files = Vec::new();

        for entry in fs::read_dir(&self.dir).map_err(|e| StorageError::DirectoryError(e.to_string()))? {
            let entry = entry.map_err(|e| StorageError::DirectoryError(e.to_string()))?;
            let path = entry.path();

            if path.extension().map_or(false, |ext| ext == "json") {
                files.push(path);
            }
        }

        Ok(files)
    }

    fn load_file(path: &Path) -> StorageResult<ExchangeRecord> {
        let content = fs::read_to_string(path).map_err(|e| StorageError::LoadFailed(e.to_string()))?;
        serde_json::from_str(&content).map_err(|e| StorageError::LoadFailed(e.to_string()))
    }

    fn record_file(&self, id: &RecordId) -> PathBuf {
        self.dir.join(format!("{}.json", id))
    }
}
