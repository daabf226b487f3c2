//! Audit Log
//!
//! Append-only sink for security events. Each entry is one tab-separated
//! line: timestamp, entry id, message, method, path, origin. A failed
//! append is logged but never fails the request that triggered it.

use chrono::Utc;
use std::path::PathBuf;
use tokio::io::AsyncWriteExt;
use uuid::Uuid;

const AUDIT_FILE: &str = "auth_audit.log";

/// File-backed audit log
pub struct AuditLog {
    dir: PathBuf,
}

impl AuditLog {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Append one audit entry for a rejected login attempt
    pub async fn record(&self, message: &str, method: &str, path: &str, origin: &str) {
        let line = format!(
            "{}\t{}\t{}\t{}\t{}\t{}\n",
            Utc::now().format("%Y%m%d\t%H:%M:%S"),
            Uuid::new_v4(),
            message,
            method,
            path,
            origin
        );

        if let Err(err) = self.append(&line).await {
            tracing::error!("Failed to write audit log entry: {:?}", err);
        }
    }

    async fn append(&self, line: &str) -> std::io::Result<()> {
        tokio::fs::create_dir_all(&self.dir).await?;

        let mut file = tokio::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(self.dir.join(AUDIT_FILE))
            .await?;

        file.write_all(line.as_bytes()).await?;
        file.flush().await
    }
}
