//! Tick-driven session timers
//!
//! Timers never read the wall clock themselves. The owner calls `tick()` once
//! per elapsed second while the timer runs, which keeps recorders
//! deterministic and testable.

use crate::error::CollectionError;
use serde::{Deserialize, Serialize};

/// Countdown timer state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimerState {
    Idle,
    Running,
    Paused,
    Expired,
}

/// Result of advancing a countdown by one second
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tick {
    /// Timer was not running; nothing changed
    Stopped,
    /// Seconds left after this tick
    Remaining(u32),
    /// Countdown reached zero on this tick
    Expired,
}

/// Countdown timer with an `idle → running → (expired | paused)` lifecycle
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CountdownTimer {
    duration_secs: u32,
    remaining_secs: u32,
    state: TimerState,
}

impl CountdownTimer {
    pub fn new(duration_secs: u32) -> Self {
        Self {
            duration_secs,
            remaining_secs: duration_secs,
            state: TimerState::Idle,
        }
    }

    /// Build a countdown from a duration in whole minutes
    pub fn from_minutes(minutes: u32) -> Self {
        Self::new(minutes.saturating_mul(60))
    }

    pub fn state(&self) -> TimerState {
        self.state
    }

    pub fn remaining_secs(&self) -> u32 {
        self.remaining_secs
    }

    pub fn duration_secs(&self) -> u32 {
        self.duration_secs
    }

    pub fn is_running(&self) -> bool {
        self.state == TimerState::Running
    }

    pub fn is_expired(&self) -> bool {
        self.state == TimerState::Expired
    }

    /// Start or resume. An expired timer restarts from its full duration.
    pub fn start(&mut self) -> Result<(), CollectionError> {
        match self.state {
            TimerState::Running => Ok(()),
            TimerState::Idle | TimerState::Paused => {
                if self.remaining_secs == 0 {
                    return Err(CollectionError::InvalidTransition(
                        "cannot start a zero-length countdown".to_string(),
                    ));
                }
                self.state = TimerState::Running;
                Ok(())
            }
            TimerState::Expired => {
                if self.duration_secs == 0 {
                    return Err(CollectionError::InvalidTransition(
                        "cannot start a zero-length countdown".to_string(),
                    ));
                }
                self.remaining_secs = self.duration_secs;
                self.state = TimerState::Running;
                Ok(())
            }
        }
    }

    pub fn pause(&mut self) -> Result<(), CollectionError> {
        match self.state {
            TimerState::Running => {
                self.state = TimerState::Paused;
                Ok(())
            }
            TimerState::Paused => Ok(()),
            other => Err(CollectionError::InvalidTransition(format!(
                "cannot pause a timer in state {:?}",
                other
            ))),
        }
    }

    /// Back to idle with the full duration loaded
    pub fn reset(&mut self) {
        self.state = TimerState::Idle;
        self.remaining_secs = self.duration_secs;
    }

    /// Reload the full duration and run. A zero-length countdown stays idle.
    pub fn restart(&mut self) {
        self.remaining_secs = self.duration_secs;
        self.state = if self.duration_secs == 0 {
            TimerState::Idle
        } else {
            TimerState::Running
        };
    }

    /// Reload the full duration without changing state
    pub fn reload(&mut self) {
        self.remaining_secs = self.duration_secs;
    }

    /// Advance one second
    pub fn tick(&mut self) -> Tick {
        if self.state != TimerState::Running {
            return Tick::Stopped;
        }

        if self.remaining_secs <= 1 {
            self.remaining_secs = 0;
            self.state = TimerState::Expired;
            return Tick::Expired;
        }

        self.remaining_secs -= 1;
        Tick::Remaining(self.remaining_secs)
    }

    /// Remaining time as `MM:SS`
    pub fn formatted(&self) -> String {
        format_clock(self.remaining_secs as u64)
    }
}

/// Stopwatch state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StopwatchState {
    Idle,
    Running,
    Paused,
}

/// Elapsed-time counter used by frequency recording
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Stopwatch {
    elapsed_secs: u64,
    state: StopwatchState,
}

impl Default for Stopwatch {
    fn default() -> Self {
        Self::new()
    }
}

impl Stopwatch {
    pub fn new() -> Self {
        Self {
            elapsed_secs: 0,
            state: StopwatchState::Idle,
        }
    }

    /// Idle stopwatch that already counted `elapsed_secs`
    pub fn with_elapsed(elapsed_secs: u64) -> Self {
        Self {
            elapsed_secs,
            state: StopwatchState::Idle,
        }
    }

    pub fn state(&self) -> StopwatchState {
        self.state
    }

    pub fn elapsed_secs(&self) -> u64 {
        self.elapsed_secs
    }

    pub fn is_running(&self) -> bool {
        self.state == StopwatchState::Running
    }

    /// Start when stopped, pause when running
    pub fn toggle(&mut self) {
        self.state = match self.state {
            StopwatchState::Running => StopwatchState::Paused,
            StopwatchState::Idle | StopwatchState::Paused => StopwatchState::Running,
        };
    }

    /// Back to idle, keeping elapsed time
    pub fn stop(&mut self) {
        self.state = StopwatchState::Idle;
    }

    /// Advance one second; returns true if time was counted
    pub fn tick(&mut self) -> bool {
        if self.state != StopwatchState::Running {
            return false;
        }
        self.elapsed_secs += 1;
        true
    }

    pub fn formatted(&self) -> String {
        format_clock(self.elapsed_secs)
    }
}

/// Format seconds as zero-padded `MM:SS`
pub fn format_clock(total_secs: u64) -> String {
    format!("{:02}:{:02}", total_secs / 60, total_secs % 60)
}
