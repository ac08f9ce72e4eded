use std::path::PathBuf;
use std::time::Duration;

use chrono::Days;
use tracing::{debug, info, warn};

use crate::error::AppError;
use crate::export::parse_export_file_name;

/// Background sweep over the export directory.
/// Deletes roster files older than the retention window, using the date
/// embedded in the file name. Anything the naming pattern cannot parse is
/// left alone.
pub struct CleanupScheduler {
    export_dir: PathBuf,
    retention_days: u64,
    interval: Duration,
}

impl CleanupScheduler {
    pub fn new(export_dir: impl Into<PathBuf>, retention_days: u64, interval_secs: u64) -> Self {
        Self {
            export_dir: export_dir.into(),
            retention_days,
            interval: Duration::from_secs(interval_secs),
        }
    }

    /// Sweeps forever at the configured interval.
    pub async fn start(self) {
        info!(
            "Starting export cleanup (retention: {} days, interval: {:?})",
            self.retention_days, self.interval
        );

        loop {
            tokio::time::sleep(self.interval).await;

            match self.sweep().await {
                Ok(removed) if removed > 0 => {
                    info!("Cleanup removed {} stale export(s)", removed);
                }
                Ok(_) => {}
                Err(e) => {
                    // Errors do not stop the loop.
                    warn!("Cleanup sweep failed: {:?}", e);
                }
            }
        }
    }

    /// One pass; returns the number of files removed.
    pub async fn sweep(&self) -> Result<usize, AppError> {
        let cutoff = chrono::Local::now()
            .date_naive()
            .checked_sub_days(Days::new(self.retention_days))
            .ok_or_else(|| AppError::BadRequest("retention window out of range".to_string()))?;

        let mut dir = match tokio::fs::read_dir(&self.export_dir).await {
            Ok(dir) => dir,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(0),
            Err(e) => return Err(AppError::ExternalIo(format!("read export dir: {}", e))),
        };

        let mut removed = 0;
        while let Some(entry) = dir
            .next_entry()
            .await
            .map_err(|e| AppError::ExternalIo(format!("read export dir: {}", e)))?
        {
            let name = entry.file_name();
            let Some(name) = name.to_str() else { continue };
            let Some((_, date)) = parse_export_file_name(name) else {
                debug!("skipping non-export file {}", name);
                continue;
            };
            if date < cutoff {
                match tokio::fs::remove_file(entry.path()).await {
                    Ok(()) => {
                        info!("removed stale export {}", name);
                        removed += 1;
                    }
                    Err(e) => warn!("failed to remove {}: {}", name, e),
                }
            }
        }
        Ok(removed)
    }
}
