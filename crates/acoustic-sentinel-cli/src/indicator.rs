//! Console alarm indicator.

use acoustic_sentinel_core::AlarmIndicator;
use tracing::{debug, info};

/// Logs indicator edges instead of driving hardware.
#[derive(Debug, Default)]
pub struct LogIndicator {
    active: bool,
    pulses: u64,
}

impl LogIndicator {
    /// Indicator that starts off.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Current level.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Off-to-on transitions seen.
    #[must_use]
    pub fn pulses(&self) -> u64 {
        self.pulses
    }
}

impl AlarmIndicator for LogIndicator {
    fn set_active(&mut self, active: bool) {
        if active == self.active {
            return;
        }
        self.active = active;
        if active {
            self.pulses += 1;
            info!(pulse = self.pulses, "ALARM indicator on");
        } else {
            debug!("alarm indicator off");
        }
    }
}
