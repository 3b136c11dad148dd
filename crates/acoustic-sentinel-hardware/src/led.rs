//! Linux sysfs LED indicator.

use std::fs;
use std::path::{Path, PathBuf};

use acoustic_sentinel_core::AlarmIndicator;
use tracing::warn;

use crate::error::SourceError;

/// Root of the kernel LED class.
pub const SYSFS_LED_ROOT: &str = "/sys/class/leds";

/// Drives an LED through its sysfs `brightness` attribute.
#[derive(Debug)]
pub struct SysfsLedIndicator {
    path: PathBuf,
    active: bool,
    write_failed: bool,
}

impl SysfsLedIndicator {
    /// LED `name` under `/sys/class/leds`, switched off.
    ///
    /// # Errors
    ///
    /// Returns [`SourceError::Led`] if the brightness file cannot be written.
    pub fn open(name: &str) -> Result<Self, SourceError> {
        Self::with_path(Path::new(SYSFS_LED_ROOT).join(name).join("brightness"))
    }

    /// LED controlled by an explicit brightness file, switched off.
    ///
    /// # Errors
    ///
    /// Returns [`SourceError::Led`] if the file cannot be written.
    pub fn with_path(path: impl Into<PathBuf>) -> Result<Self, SourceError> {
        let path = path.into();
        fs::write(&path, b"0").map_err(|source| SourceError::Led {
            path: path.clone(),
            source,
        })?;
        Ok(Self {
            path,
            active: false,
            write_failed: false,
        })
    }

    /// Brightness file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Last level written.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.active
    }
}

impl AlarmIndicator for SysfsLedIndicator {
    fn set_active(&mut self, active: bool) {
        let value: &[u8] = if active { b"1" } else { b"0" };
        match fs::write(&self.path, value) {
            Ok(()) => {
                self.active = active;
                self.write_failed = false;
            }
            Err(e) => {
                // Warn once per failure streak.
                if !self.write_failed {
                    warn!(path = %self.path.display(), error = %e, "LED write failed");
                }
                self.write_failed = true;
            }
        }
    }
}
