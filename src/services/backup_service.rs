use anyhow::{Context, Result};
use chrono::Utc;
use serde::Serialize;
use std::path::PathBuf;
use tokio::process::Command;
use uuid::Uuid;

use crate::services::SystemLogService;

/// Database backup via the external `pg_dump` tool.
#[derive(Debug, Clone)]
pub struct BackupService {
    database_url: String,
    backup_dir: PathBuf,
    audit: SystemLogService,
}

#[derive(Debug, Serialize)]
pub struct BackupResult {
    pub file: String,
    pub size_bytes: u64,
    pub created_at: chrono::DateTime<Utc>,
}

impl BackupService {
    pub fn new(database_url: String, backup_dir: impl Into<PathBuf>, audit: SystemLogService) -> Self {
        Self {
            database_url,
            backup_dir: backup_dir.into(),
            audit,
        }
    }

    pub async fn run_backup(&self, acting_admin: Uuid) -> Result<BackupResult> {
        tokio::fs::create_dir_all(&self.backup_dir)
            .await
            .context("failed to create backup directory")?;

        let created_at = Utc::now();
        let file = self
            .backup_dir
            .join(format!("gymdesk-{}.sql", created_at.format("%Y%m%dT%H%M%SZ")));

        let output = Command::new("pg_dump")
            .arg("--no-owner")
            .arg("--file")
            .arg(&file)
            .arg(&self.database_url)
            .output()
            .await
            .context("failed to spawn pg_dump")?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            self.audit
                .record("error", "admin.backup_failed", stderr.trim(), Some(acting_admin))
                .await;
            anyhow::bail!("pg_dump exited with {}: {}", output.status, stderr.trim());
        }

        let size_bytes = tokio::fs::metadata(&file).await?.len();
        let file = file.display().to_string();

        self.audit
            .record("info", "admin.backup_completed", &file, Some(acting_admin))
            .await;

        Ok(BackupResult {
            file,
            size_bytes,
            created_at,
        })
    }
}
