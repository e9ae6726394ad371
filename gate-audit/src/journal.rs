//! Durable audit journal writing newline-delimited JSON.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::fs::{self, OpenOptions};
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;

use crate::AuditResult;
use crate::record::{AgentInteraction, AuditEntry, InvocationRecord};
use crate::sink::AuditLog;

/// File-backed audit log. Entries are only ever appended.
#[derive(Debug)]
pub struct FileAuditLog {
    path: PathBuf,
    file: Mutex<tokio::fs::File>,
}

impl FileAuditLog {
    /// Opens (or creates) a journal file at the provided path.
    ///
    /// # Errors
    ///
    /// Propagates I/O errors encountered while preparing the file.
    pub async fn open(path: impl Into<PathBuf>) -> AuditResult<Self> {
        let path = path.into();
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).await?;
        }

        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .await?;

        Ok(Self {
            path,
            file: Mutex::new(file),
        })
    }

    /// Returns the underlying path of the journal file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Returns the most recent `limit` entries, oldest first.
    ///
    /// # Errors
    ///
    /// Propagates I/O errors and malformed lines.
    pub async fn tail(&self, limit: usize) -> AuditResult<Vec<AuditEntry>> {
        if limit == 0 {
            return Ok(Vec::new());
        }

        let data = fs::read(&self.path).await?;
        let mut entries = Vec::new();
        for line in data
            .split(|byte| *byte == b'\n')
            .filter(|line| !line.is_empty())
        {
            entries.push(serde_json::from_slice::<AuditEntry>(line)?);
        }

        let skip = entries.len().saturating_sub(limit);
        Ok(entries.into_iter().skip(skip).collect())
    }

    async fn append(&self, entry: &AuditEntry) -> AuditResult<()> {
        let mut line = serde_json::to_vec(entry)?;
        line.push(b'\n');
        let mut guard = self.file.lock().await;
        guard.write_all(&line).await?;
        guard.flush().await?;
        Ok(())
    }
}

#[async_trait]
impl AuditLog for FileAuditLog {
    async fn record_invocation(&self, record: &InvocationRecord) -> AuditResult<()> {
        self.append(&AuditEntry::Invocation(record.clone())).await
    }

    async fn record_interaction(&self, interaction: &AgentInteraction) -> AuditResult<()> {
        self.append(&AuditEntry::Interaction(interaction.clone()))
            .await
    }
}
