//! Majority-style hysteresis over the most recent block decisions.

use acoustic_sentinel_core::{AlarmState, DetectionLabel, RingWindow, SentinelConfig};

/// Moving fault count over the last W labels.
///
/// The window starts full of `Normal`, so `fault_count` is the number of
/// anomalies among the last `min(W, frames_seen)` labels.
#[derive(Debug, Clone)]
pub struct HysteresisFilter {
    history: RingWindow<DetectionLabel>,
    threshold: usize,
    fault_count: usize,
    state: AlarmState,
}

impl HysteresisFilter {
    /// Filter over `window_size` labels raising `Alarm` at `threshold` faults.
    ///
    /// Zero values are raised to one.
    #[must_use]
    pub fn new(window_size: usize, threshold: usize) -> Self {
        Self {
            history: RingWindow::new(window_size),
            threshold: threshold.max(1),
            fault_count: 0,
            state: AlarmState::Normal,
        }
    }

    /// Filter using `window_size` and `alarm_threshold` from `config`.
    #[must_use]
    pub fn from_config(config: &SentinelConfig) -> Self {
        Self::new(config.window_size, config.alarm_threshold)
    }

    /// Record a label and return the resulting alarm state.
    pub fn update(&mut self, label: DetectionLabel) -> AlarmState {
        let evicted = self.history.push(label);
        self.fault_count = self.fault_count + label.as_count() - evicted.as_count();
        self.state = AlarmState::from_fault_count(self.fault_count, self.threshold);
        self.state
    }

    /// Anomalies currently in the window.
    #[must_use]
    pub fn fault_count(&self) -> usize {
        self.fault_count
    }

    /// State after the last update.
    #[must_use]
    pub fn state(&self) -> AlarmState {
        self.state
    }

    /// Window size W.
    #[must_use]
    pub fn window_size(&self) -> usize {
        self.history.capacity()
    }

    /// Alarm threshold T.
    #[must_use]
    pub fn threshold(&self) -> usize {
        self.threshold
    }

    /// Labels from oldest to newest.
    pub fn history(&self) -> impl Iterator<Item = DetectionLabel> + '_ {
        self.history.iter().copied()
    }
}

impl Default for HysteresisFilter {
    fn default() -> Self {
        Self::from_config(&SentinelConfig::default())
    }
}
