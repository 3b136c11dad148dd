//! Non-blocking alarm pulse.
//!
//! An alarm raises the indicator for a fixed duration. Instead of sleeping,
//! the pulse stores a deadline and a later [`poll`](PulseTimer::poll) ends it,
//! so the acquisition loop keeps reading samples while the indicator is on.

use std::time::{Duration, Instant};

use acoustic_sentinel_core::AlarmIndicator;

/// Level change requested by the timer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PulseEdge {
    /// No change.
    Hold,
    /// Indicator should switch on.
    Rise,
    /// Indicator should switch off.
    Fall,
}

/// Deadline-based one-shot timer.
#[derive(Debug, Clone)]
pub struct PulseTimer {
    duration: Duration,
    deadline: Option<Instant>,
}

impl PulseTimer {
    /// Timer producing pulses of `duration`.
    #[must_use]
    pub fn new(duration: Duration) -> Self {
        Self {
            duration,
            deadline: None,
        }
    }

    /// Start a pulse at `now`, or extend the running one to `now + duration`.
    pub fn trigger(&mut self, now: Instant) -> PulseEdge {
        let was_active = self.deadline.is_some();
        self.deadline = Some(now + self.duration);
        if was_active {
            PulseEdge::Hold
        } else {
            PulseEdge::Rise
        }
    }

    /// End the pulse once `now` reaches the deadline.
    pub fn poll(&mut self, now: Instant) -> PulseEdge {
        match self.deadline {
            Some(deadline) if now >= deadline => {
                self.deadline = None;
                PulseEdge::Fall
            }
            _ => PulseEdge::Hold,
        }
    }

    /// End the pulse immediately.
    pub fn cancel(&mut self) -> PulseEdge {
        if self.deadline.take().is_some() {
            PulseEdge::Fall
        } else {
            PulseEdge::Hold
        }
    }

    /// Whether a pulse is running.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.deadline.is_some()
    }

    /// Deadline of the running pulse.
    #[must_use]
    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// Pulse length.
    #[must_use]
    pub fn duration(&self) -> Duration {
        self.duration
    }
}

/// An [`AlarmIndicator`] driven by a [`PulseTimer`].
///
/// The indicator is only written on edges.
#[derive(Debug)]
pub struct AlarmPulse<I> {
    indicator: I,
    timer: PulseTimer,
    pulses: u64,
}

impl<I: AlarmIndicator> AlarmPulse<I> {
    /// Wrap `indicator`, driving it low.
    pub fn new(mut indicator: I, duration: Duration) -> Self {
        indicator.set_active(false);
        Self {
            indicator,
            timer: PulseTimer::new(duration),
            pulses: 0,
        }
    }

    /// Start or extend a pulse.
    pub fn fire(&mut self, now: Instant) {
        let edge = self.timer.trigger(now);
        if edge == PulseEdge::Rise {
            self.pulses += 1;
        }
        self.apply(edge);
    }

    /// End an expired pulse.
    pub fn service(&mut self, now: Instant) {
        let edge = self.timer.poll(now);
        self.apply(edge);
    }

    /// Drive the indicator low, ending any running pulse.
    pub fn release(&mut self) {
        let edge = self.timer.cancel();
        self.apply(edge);
    }

    /// Whether the indicator is currently on.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.timer.is_active()
    }

    /// Pulses started since construction. Extensions are not counted.
    #[must_use]
    pub fn pulses(&self) -> u64 {
        self.pulses
    }

    /// The wrapped indicator.
    pub fn indicator(&self) -> &I {
        &self.indicator
    }

    /// Unwrap the indicator.
    pub fn into_inner(self) -> I {
        self.indicator
    }

    fn apply(&mut self, edge: PulseEdge) {
        match edge {
            PulseEdge::Rise => self.indicator.set_active(true),
            PulseEdge::Fall => self.indicator.set_active(false),
            PulseEdge::Hold => {}
        }
    }
}
