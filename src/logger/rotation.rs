//! Size-based rotation with retention

use std::fs;
use std::path::{Path, PathBuf};

use jiff::Zoned;

use crate::logger::compression::gzip_file;
use crate::logger::config::RotationConfig;
use crate::logger::error::LoggerError;

/// Decides when the active file rotates and prunes old rotations
pub struct RotationManager {
    config: RotationConfig,
}

impl RotationManager {
    pub fn new(config: RotationConfig) -> Self {
        Self { config }
    }

    pub fn should_rotate(&self, current_size: u64) -> bool {
        current_size >= self.config.max_size
    }

    /// Move the active file aside, compress it if configured, and prune.
    ///
    /// The caller reopens `active` afterwards.
    pub fn rotate(&self, active: &Path) -> Result<(), LoggerError> {
        if active.exists() {
            let rotated = rotated_path(active);
            fs::rename(active, &rotated)?;

            if self.config.compress {
                gzip_file(&rotated).map_err(|e| {
                    LoggerError::rotation(format!(
                        "Failed to compress {}: {}",
                        rotated.display(),
                        e
                    ))
                })?;
            }
        }

        self.prune(active)
    }

    /// Keep at most `max_files` rotated files, oldest removed first.
    pub fn prune(&self, active: &Path) -> Result<(), LoggerError> {
        let mut rotated = rotated_files(active)?;
        if rotated.len() <= self.config.max_files {
            return Ok(());
        }

        rotated.sort_by_key(|path| fs::metadata(path).and_then(|m| m.modified()).ok());
        let excess = rotated.len() - self.config.max_files;
        for path in rotated.into_iter().take(excess) {
            fs::remove_file(&path)?;
        }
        Ok(())
    }
}

/// `logs/nudge.log` -> `logs/nudge.20260101_090000.log`, with a counter on collision
fn rotated_path(active: &Path) -> PathBuf {
    let timestamp = Zoned::now().strftime("%Y%m%d_%H%M%S").to_string();
    let stem = active.file_stem().unwrap_or_default().to_string_lossy();
    let ext = active.extension().map(|e| e.to_string_lossy());

    let name_for = |suffix: Option<usize>| {
        let stamp = match suffix {
            Some(n) => format!("{}-{}", timestamp, n),
            None => timestamp.clone(),
        };
        match &ext {
            Some(ext) => format!("{}.{}.{}", stem, stamp, ext),
            None => format!("{}.{}", stem, stamp),
        }
    };

    let mut candidate = active.with_file_name(name_for(None));
    let mut counter = 1;
    while candidate.exists() {
        candidate = active.with_file_name(name_for(Some(counter)));
        counter += 1;
    }
    candidate
}

fn rotated_files(active: &Path) -> Result<Vec<PathBuf>, LoggerError> {
    let parent = match active.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    let prefix = format!("{}.", active.file_stem().unwrap_or_default().to_string_lossy());
    let active_name = active.file_name().unwrap_or_default();

    Ok(fs::read_dir(parent)?
        .filter_map(|entry| entry.ok())
        .filter(|entry| {
            let name = entry.file_name();
            name != active_name && name.to_string_lossy().starts_with(&prefix)
        })
        .map(|entry| entry.path())
        .collect())
}
