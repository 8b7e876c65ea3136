//! Simulated system stability.
//!
//! ```text
//! STABLE --crash--> UNSTABLE --dwell--> CRITICAL --dwell--> REBOOTING --dwell--> STABLE
//!                      any state except REBOOTING --heal--> REBOOTING
//! ```
//!
//! The simulator never sleeps. Each transition hands back a [`HealthTimer`]
//! for the owner to schedule; the timer carries the epoch it was armed in,
//! and healing bumps the epoch so the rest of an interrupted crash sequence
//! is ignored when it fires.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::utilities::config::TimingConfig;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum HealthState {
    Stable,
    Unstable,
    Critical,
    Rebooting,
}

impl Default for HealthState {
    fn default() -> Self {
        Self::Stable
    }
}

impl HealthState {
    pub fn as_str(&self) -> &'static str {
        match self {
            HealthState::Stable => "STABLE",
            HealthState::Unstable => "UNSTABLE",
            HealthState::Critical => "CRITICAL",
            HealthState::Rebooting => "REBOOTING",
        }
    }

    /// The state a timer armed on entry to `self` moves to.
    fn successor(&self) -> Option<HealthState> {
        match self {
            HealthState::Stable => None,
            HealthState::Unstable => Some(HealthState::Critical),
            HealthState::Critical => Some(HealthState::Rebooting),
            HealthState::Rebooting => Some(HealthState::Stable),
        }
    }
}

impl std::fmt::Display for HealthState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A pending timer-driven transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HealthTimer {
    pub epoch: u64,
    /// State the timer expects to find when it fires.
    pub from: HealthState,
    pub to: HealthState,
    /// How long after arming the timer fires.
    pub delay: Duration,
}

/// A committed state change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct HealthTransition {
    pub from: HealthState,
    pub to: HealthState,
}

impl HealthTransition {
    /// Whether this transition finished a reboot.
    pub fn stabilized(&self) -> bool {
        self.from == HealthState::Rebooting && self.to == HealthState::Stable
    }
}

/// Dwell times per intermediate state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HealthDelays {
    pub unstable: Duration,
    pub critical: Duration,
    pub rebooting: Duration,
}

impl Default for HealthDelays {
    fn default() -> Self {
        Self::from(&TimingConfig::default())
    }
}

impl From<&TimingConfig> for HealthDelays {
    fn from(timing: &TimingConfig) -> Self {
        Self {
            unstable: timing.unstable(),
            critical: timing.critical(),
            rebooting: timing.rebooting(),
        }
    }
}

impl HealthDelays {
    fn dwell(&self, state: HealthState) -> Duration {
        match state {
            HealthState::Stable => Duration::ZERO,
            HealthState::Unstable => self.unstable,
            HealthState::Critical => self.critical,
            HealthState::Rebooting => self.rebooting,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct HealthSimulator {
    state: HealthState,
    epoch: u64,
    delays: HealthDelays,
}

impl HealthSimulator {
    pub fn new(delays: HealthDelays) -> Self {
        Self {
            state: HealthState::Stable,
            epoch: 0,
            delays,
        }
    }

    pub fn state(&self) -> HealthState {
        self.state
    }

    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    /// `STABLE → UNSTABLE`. `None` from any other state.
    pub fn trigger_crash(&mut self) -> Option<(HealthTransition, HealthTimer)> {
        if self.state != HealthState::Stable {
            return None;
        }
        Some(self.enter(HealthState::Unstable))
    }

    /// Force `REBOOTING` from anything but `REBOOTING`, superseding any
    /// crash sequence in flight.
    pub fn initiate_self_healing(&mut self) -> Option<(HealthTransition, HealthTimer)> {
        if self.state == HealthState::Rebooting {
            return None;
        }
        self.epoch += 1;
        Some(self.enter(HealthState::Rebooting))
    }

    /// Apply a fired timer. Stale timers (older epoch or unexpected state)
    /// are ignored and return `None`.
    pub fn on_timer(&mut self, timer: HealthTimer) -> Option<(HealthTransition, Option<HealthTimer>)> {
        if timer.epoch != self.epoch || timer.from != self.state {
            log::debug!(
                "Discarding stale health timer {} -> {} (epoch {}, current {})",
                timer.from,
                timer.to,
                timer.epoch,
                self.epoch
            );
            return None;
        }
        if timer.to == HealthState::Stable {
            let transition = HealthTransition { from: self.state, to: HealthState::Stable };
            self.state = HealthState::Stable;
            return Some((transition, None));
        }
        let (transition, next) = self.enter(timer.to);
        Some((transition, Some(next)))
    }

    fn enter(&mut self, to: HealthState) -> (HealthTransition, HealthTimer) {
        let transition = HealthTransition { from: self.state, to };
        self.state = to;
        // every non-stable state has a successor
        let next = to.successor().unwrap_or(HealthState::Stable);
        let timer = HealthTimer {
            epoch: self.epoch,
            from: to,
            to: next,
            delay: self.delays.dwell(to),
        };
        (transition, timer)
    }
}
