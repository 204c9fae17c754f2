use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, SystemTime};

use time::OffsetDateTime;
use time::macros::format_description;
use tokio::task::JoinHandle;
use tokio::time::interval;
use walkdir::WalkDir;

use crate::configs::Retention;
use crate::services::TelemetryService;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SweepReport {
    pub readings_deleted: u64,
    pub files_deleted: u64,
    pub bytes_freed: u64,
    pub directories_removed: u64,
    pub failures: u64,
}

impl SweepReport {
    fn absorb(&mut self, images: SweepReport) {
        self.files_deleted += images.files_deleted;
        self.bytes_freed += images.bytes_freed;
        self.directories_removed += images.directories_removed;
        self.failures += images.failures;
    }
}

/// Periodically removes readings and image files older than the retention horizon.
pub struct RetentionService {
    telemetry: Arc<TelemetryService>,
    days: i64,
    interval: Duration,
    image_path: PathBuf,
}

impl RetentionService {
    pub fn new(telemetry: Arc<TelemetryService>, retention: &Retention) -> Self {
        Self {
            telemetry,
            days: retention.days,
            interval: Duration::from_secs(retention.interval_secs.max(1)),
            image_path: PathBuf::from(&retention.image_path),
        }
    }

    /// Sweeps right away, then once per interval.
    pub fn start(self: &Arc<Self>) -> JoinHandle<()> {
        let service = self.clone();

        tracing::info!(
            days = service.days,
            interval_secs = service.interval.as_secs(),
            "Retention sweeper started"
        );

        tokio::spawn(async move {
            let mut ticker = interval(service.interval);
            loop {
                ticker.tick().await;
                service.sweep().await;
            }
        })
    }

    pub async fn sweep(&self) -> SweepReport {
        self.sweep_at(OffsetDateTime::now_utc()).await
    }

    pub async fn sweep_at(&self, now: OffsetDateTime) -> SweepReport {
        let mut report = SweepReport::default();
        let Some(horizon) = Self::horizon(now, self.days) else {
            tracing::error!(days = self.days, "Retention horizon out of range, sweep skipped");
            report.failures += 1;
            return report;
        };

        let cutoff = Self::cutoff_date(horizon);
        match self.telemetry.purge_reported_before(&cutoff).await {
            Ok(deleted) => report.readings_deleted = deleted,
            Err(e) => {
                tracing::error!(cutoff = %cutoff, "Failed to purge sensor readings: {}", e);
                report.failures += 1;
            }
        }

        let root = self.image_path.clone();
        let horizon = SystemTime::from(horizon);
        match tokio::task::spawn_blocking(move || purge_images(&root, horizon)).await {
            Ok(images) => report.absorb(images),
            Err(e) => {
                tracing::error!("Image purge task failed: {}", e);
                report.failures += 1;
            }
        }

        tracing::info!(
            readings_deleted = report.readings_deleted,
            files_deleted = report.files_deleted,
            freed_mb = %format!("{:.2}", report.bytes_freed as f64 / (1024.0 * 1024.0)),
            directories_removed = report.directories_removed,
            failures = report.failures,
            "Retention sweep finished"
        );

        report
    }

    fn horizon(now: OffsetDateTime, days: i64) -> Option<OffsetDateTime> {
        let seconds = days.checked_mul(86_400)?;
        now.checked_sub(time::Duration::seconds(seconds))
    }

    /// Readings reported before this `YYYY-MM-DD` date are out of retention.
    pub fn cutoff_date(horizon: OffsetDateTime) -> String {
        horizon
            .date()
            .format(format_description!("[year]-[month]-[day]"))
            .unwrap_or_else(|_| horizon.date().to_string())
    }
}

fn purge_images(root: &Path, horizon: SystemTime) -> SweepReport {
    let mut report = SweepReport::default();

    if !root.is_dir() {
        tracing::debug!(path = %root.display(), "Image directory missing, nothing to purge");
        return report;
    }

    for entry in WalkDir::new(root).min_depth(1) {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                tracing::warn!("Failed to walk image directory: {}", e);
                report.failures += 1;
                continue;
            }
        };

        if !entry.file_type().is_file() {
            continue;
        }

        let metadata = match entry.metadata() {
            Ok(metadata) => metadata,
            Err(e) => {
                tracing::warn!(path = %entry.path().display(), "Failed to read file metadata: {}", e);
                report.failures += 1;
                continue;
            }
        };

        match metadata.modified() {
            Ok(modified) if modified < horizon => match fs::remove_file(entry.path()) {
                Ok(()) => {
                    report.files_deleted += 1;
                    report.bytes_freed += metadata.len();
                }
                Err(e) => {
                    tracing::warn!(path = %entry.path().display(), "Failed to delete image: {}", e);
                    report.failures += 1;
                }
            },
            Ok(_) => {}
            Err(e) => {
                tracing::warn!(path = %entry.path().display(), "Failed to read modification time: {}", e);
                report.failures += 1;
            }
        }
    }

    for entry in WalkDir::new(root).min_depth(1).contents_first(true) {
        let Ok(entry) = entry else {
            continue;
        };

        if !entry.file_type().is_dir() {
            continue;
        }

        let is_empty = fs::read_dir(entry.path())
            .map(|mut children| children.next().is_none())
            .unwrap_or(false);
        if !is_empty {
            continue;
        }

        match fs::remove_dir(entry.path()) {
            Ok(()) => report.directories_removed += 1,
            Err(e) => {
                tracing::warn!(path = %entry.path().display(), "Failed to remove directory: {}", e);
                report.failures += 1;
            }
        }
    }

    report
}
