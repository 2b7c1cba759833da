//! Logging system with daily rotation using local timezone.

use anyhow::Result;
use logroller::{LogRollerBuilder, Rotation, RotationAge, TimeZone};
use std::fs;
use std::path::Path;
use time::macros::format_description;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt;
use tracing_subscriber::fmt::time::OffsetTime;
use tracing_subscriber::prelude::*;

use crate::config::Config;

/// How long rotated log files are kept before cleanup.
const KEEP_DAYS: u64 = 7;

/// Initialize the logging system.
pub fn init(config: &Config) -> Result<()> {
    if !config.log_path.exists() {
        fs::create_dir_all(&config.log_path)?;
    }

    cleanup_old_logs(&config.log_path)?;

    // Daily rotation in local time; files named review-sight.YYYY-MM-DD
    let appender = LogRollerBuilder::new(config.log_path.as_path(), Path::new("review-sight"))
        .rotation(Rotation::AgeBased(RotationAge::Daily))
        .time_zone(TimeZone::Local)
        .max_keep_files(KEEP_DAYS)
        .build()
        .map_err(|e| anyhow::anyhow!("Failed to create log roller: {}", e))?;

    let (non_blocking, guard) = tracing_appender::non_blocking(appender);

    let time_format = format_description!("[year]-[month]-[day] [hour]:[minute]:[second]");
    let local_offset = time::UtcOffset::current_local_offset().unwrap_or(time::UtcOffset::UTC);
    let timer = OffsetTime::new(local_offset, time_format);

    let subscriber = tracing_subscriber::registry()
        .with(EnvFilter::from_default_env().add_directive(tracing::Level::DEBUG.into()))
        .with(
            fmt::layer()
                .with_writer(non_blocking)
                .with_ansi(false)
                .with_target(true)
                .with_file(true)
                .with_line_number(true)
                .with_timer(timer),
        );

    tracing::subscriber::set_global_default(subscriber)
        .map_err(|e| anyhow::anyhow!("Failed to set global subscriber: {}", e))?;

    // Keep the guard alive for the duration of the program
    std::mem::forget(guard);

    Ok(())
}

/// Remove review-sight log files older than the retention window.
pub fn cleanup_old_logs(log_path: &Path) -> Result<()> {
    use std::time::{Duration, SystemTime};

    let cutoff = SystemTime::now() - Duration::from_secs(KEEP_DAYS * 24 * 60 * 60);

    if !log_path.exists() {
        return Ok(());
    }

    for entry in fs::read_dir(log_path)? {
        let entry = entry?;
        let path = entry.path();

        if !path.is_file() {
            continue;
        }

        let Some(filename) = path.file_name().and_then(|n| n.to_str()) else {
            continue;
        };
        if !filename.starts_with("review-sight") {
            continue;
        }

        if let Ok(metadata) = entry.metadata()
            && let Ok(modified) = metadata.modified()
            && modified < cutoff
        {
            let _ = fs::remove_file(&path);
        }
    }

    Ok(())
}
