//! Trajectory recorder implementation

use crate::error::{Result, TrajectoryError};
use crate::trajectory::{EntryType, TrajectoryEntry};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::sync::RwLock;

/// Records run transcripts for debugging and analysis
pub struct TrajectoryRecorder {
    id: String,
    entries: RwLock<Vec<TrajectoryEntry>>,
    file_path: Option<PathBuf>,
    auto_save: bool,
}

/// Complete transcript data
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Trajectory {
    pub metadata: TrajectoryMetadata,
    pub entries: Vec<TrajectoryEntry>,
}

/// Metadata for a transcript
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrajectoryMetadata {
    /// Unique identifier, stable for the lifetime of the recorder
    pub id: String,

    pub started_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,

    /// Version of the transcript format
    pub version: String,

    pub agent_type: String,

    /// Number of questions asked
    pub runs: usize,

    /// Outcome of the most recent completed run
    pub last_outcome: Option<String>,

    pub total_entries: usize,
    pub duration_ms: Option<u64>,
}

impl TrajectoryRecorder {
    /// Create an in-memory recorder
    pub fn new() -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            entries: RwLock::new(Vec::new()),
            file_path: None,
            auto_save: false,
        }
    }

    /// Create a recorder that rewrites `path` after every entry
    pub fn with_file<P: AsRef<Path>>(path: P) -> Self {
        Self {
            file_path: Some(path.as_ref().to_path_buf()),
            auto_save: true,
            ..Self::new()
        }
    }

    /// Record a trajectory entry
    pub async fn record(&self, entry: TrajectoryEntry) -> Result<()> {
        {
            let mut entries = self.entries.write().await;
            entries.push(entry);
        }

        if self.auto_save {
            self.save().await?;
        }

        Ok(())
    }

    /// Get all recorded entries
    pub async fn get_entries(&self) -> Vec<TrajectoryEntry> {
        self.entries.read().await.clone()
    }

    pub async fn entry_count(&self) -> usize {
        self.entries.read().await.len()
    }

    /// Save the transcript to file, if one is configured
    pub async fn save(&self) -> Result<()> {
        if let Some(path) = &self.file_path {
            let trajectory = self.build_trajectory().await;
            let json = serde_json::to_string_pretty(&trajectory).map_err(|e| {
                TrajectoryError::RecordingFailed {
                    message: format!("Failed to serialize trajectory: {}", e),
                }
            })?;

            if let Some(parent) = path.parent() {
                if !parent.as_os_str().is_empty() {
                    fs::create_dir_all(parent).await?;
                }
            }

            fs::write(path, json).await?;
        }

        Ok(())
    }

    /// Load a transcript from file
    pub async fn load<P: AsRef<Path>>(path: P) -> Result<Trajectory> {
        let path = path.as_ref();

        if !path.exists() {
            return Err(TrajectoryError::LoadFailed {
                path: path.to_string_lossy().to_string(),
            }
            .into());
        }

        let content = fs::read_to_string(path).await?;
        let trajectory: Trajectory =
            serde_json::from_str(&content).map_err(|_| TrajectoryError::InvalidFormat)?;

        Ok(trajectory)
    }

    async fn build_trajectory(&self) -> Trajectory {
        let entries = self.entries.read().await.clone();

        let started_at = entries
            .first()
            .map(|e| e.timestamp)
            .unwrap_or_else(Utc::now);
        let completed_at = entries.last().map(|e| e.timestamp);
        let duration_ms =
            completed_at.map(|end| (end - started_at).num_milliseconds().max(0) as u64);

        let mut runs = 0;
        let mut last_outcome = None;
        for entry in &entries {
            match &entry.entry_type {
                EntryType::RunStart { .. } => runs += 1,
                EntryType::RunComplete { outcome, .. } => last_outcome = Some(outcome.clone()),
                _ => {}
            }
        }

        let metadata = TrajectoryMetadata {
            id: self.id.clone(),
            started_at,
            completed_at,
            version: "1.0".to_string(),
            agent_type: "scout_agent".to_string(),
            runs,
            last_outcome,
            total_entries: entries.len(),
            duration_ms,
        };

        Trajectory { metadata, entries }
    }

    /// Clear all recorded entries
    pub async fn clear(&self) {
        self.entries.write().await.clear();
    }

    pub fn file_path(&self) -> Option<&Path> {
        self.file_path.as_deref()
    }
}

impl Default for TrajectoryRecorder {
    fn default() -> Self {
        Self::new()
    }
}
