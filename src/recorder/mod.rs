//! In-session recorders
//!
//! One recorder per measurement dimension. Each owns its observations and
//! timer exclusively until the session is saved or cancelled.

mod duration;
mod frequency;
mod interval;
mod latency;
mod percentage;

pub use duration::DurationRecorder;
pub use frequency::FrequencyRecorder;
pub use interval::{IntervalRecorder, IntervalTick};
pub use latency::LatencyRecorder;
pub use percentage::PercentageRecorder;

use crate::config::RecorderConfig;
use crate::error::CollectionError;
use crate::session::SessionData;
use crate::types::{IntervalType, MeasurementDimension, Phase};
use chrono::Utc;

/// Trait implemented by every recorder
pub trait Recorder {
    fn dimension(&self) -> MeasurementDimension;

    /// Err if the session cannot be finalized yet
    fn check_complete(&self) -> Result<(), CollectionError>;

    /// Copy of the observations recorded so far
    fn snapshot(&self) -> SessionData;

    /// Advance any running timer by one second
    fn tick(&mut self) {}

    /// Stop any running timer, keeping recorded data
    fn stop(&mut self) {}
}

/// How to configure a recorder when a session opens
#[derive(Debug, Clone, PartialEq)]
pub enum RecorderSetup {
    Percentage {
        /// Falls back to the configured default
        trials: Option<u32>,
        phase: Phase,
    },
    Frequency,
    Duration,
    Latency,
    Interval {
        interval_type: IntervalType,
        intervals: Option<u32>,
        interval_secs: Option<u32>,
    },
}

impl RecorderSetup {
    /// Default setup for a dimension
    pub fn for_dimension(dimension: MeasurementDimension) -> Self {
        match dimension {
            MeasurementDimension::Percentage => RecorderSetup::Percentage {
                trials: None,
                phase: Phase::default(),
            },
            MeasurementDimension::Frequency => RecorderSetup::Frequency,
            MeasurementDimension::Duration => RecorderSetup::Duration,
            MeasurementDimension::Latency => RecorderSetup::Latency,
            MeasurementDimension::Interval => RecorderSetup::Interval {
                interval_type: IntervalType::default(),
                intervals: None,
                interval_secs: None,
            },
        }
    }

    pub fn dimension(&self) -> MeasurementDimension {
        match self {
            RecorderSetup::Percentage { .. } => MeasurementDimension::Percentage,
            RecorderSetup::Frequency => MeasurementDimension::Frequency,
            RecorderSetup::Duration => MeasurementDimension::Duration,
            RecorderSetup::Latency => MeasurementDimension::Latency,
            RecorderSetup::Interval { .. } => MeasurementDimension::Interval,
        }
    }
}

/// The recorder behind an open session
#[derive(Debug, Clone)]
pub enum ActiveRecorder {
    Percentage(PercentageRecorder),
    Frequency(FrequencyRecorder),
    Duration(DurationRecorder),
    Latency(LatencyRecorder),
    Interval(IntervalRecorder),
}

impl ActiveRecorder {
    /// Build and configure the recorder for a setup
    pub fn configure(
        setup: &RecorderSetup,
        config: &RecorderConfig,
    ) -> Result<Self, CollectionError> {
        let recorder = match setup {
            RecorderSetup::Percentage { trials, phase } => {
                let count = trials.unwrap_or(config.default_trials);
                ActiveRecorder::Percentage(PercentageRecorder::new(config, count, *phase)?)
            }
            RecorderSetup::Frequency => {
                ActiveRecorder::Frequency(FrequencyRecorder::new(Utc::now()))
            }
            RecorderSetup::Duration => ActiveRecorder::Duration(DurationRecorder::new()),
            RecorderSetup::Latency => ActiveRecorder::Latency(LatencyRecorder::new()),
            RecorderSetup::Interval {
                interval_type,
                intervals,
                interval_secs,
            } => ActiveRecorder::Interval(IntervalRecorder::new(
                config,
                *interval_type,
                intervals.unwrap_or(config.default_intervals),
                interval_secs.unwrap_or(config.default_interval_secs),
            )?),
        };
        Ok(recorder)
    }

    /// Rebuild a recorder from saved observations, with timers stopped
    pub fn restore(data: SessionData, config: &RecorderConfig) -> Result<Self, CollectionError> {
        let recorder = match data {
            SessionData::Percentage(r) => {
                ActiveRecorder::Percentage(PercentageRecorder::from_trials(config, r.trials, r.phase)?)
            }
            SessionData::Frequency(r) => ActiveRecorder::Frequency(FrequencyRecorder::from_record(r)),
            SessionData::Duration(r) => ActiveRecorder::Duration(DurationRecorder::from_record(r)),
            SessionData::Latency(r) => ActiveRecorder::Latency(LatencyRecorder::from_record(r)),
            SessionData::Interval(r) => {
                ActiveRecorder::Interval(IntervalRecorder::from_record(config, r)?)
            }
        };
        Ok(recorder)
    }

    fn inner(&self) -> &dyn Recorder {
        match self {
            ActiveRecorder::Percentage(r) => r,
            ActiveRecorder::Frequency(r) => r,
            ActiveRecorder::Duration(r) => r,
            ActiveRecorder::Latency(r) => r,
            ActiveRecorder::Interval(r) => r,
        }
    }

    fn inner_mut(&mut self) -> &mut dyn Recorder {
        match self {
            ActiveRecorder::Percentage(r) => r,
            ActiveRecorder::Frequency(r) => r,
            ActiveRecorder::Duration(r) => r,
            ActiveRecorder::Latency(r) => r,
            ActiveRecorder::Interval(r) => r,
        }
    }

    pub fn as_percentage_mut(&mut self) -> Option<&mut PercentageRecorder> {
        match self {
            ActiveRecorder::Percentage(r) => Some(r),
            _ => None,
        }
    }

    pub fn as_frequency_mut(&mut self) -> Option<&mut FrequencyRecorder> {
        match self {
            ActiveRecorder::Frequency(r) => Some(r),
            _ => None,
        }
    }

    pub fn as_duration_mut(&mut self) -> Option<&mut DurationRecorder> {
        match self {
            ActiveRecorder::Duration(r) => Some(r),
            _ => None,
        }
    }

    pub fn as_latency_mut(&mut self) -> Option<&mut LatencyRecorder> {
        match self {
            ActiveRecorder::Latency(r) => Some(r),
            _ => None,
        }
    }

    pub fn as_interval_mut(&mut self) -> Option<&mut IntervalRecorder> {
        match self {
            ActiveRecorder::Interval(r) => Some(r),
            _ => None,
        }
    }
}

impl Recorder for ActiveRecorder {
    fn dimension(&self) -> MeasurementDimension {
        self.inner().dimension()
    }

    fn check_complete(&self) -> Result<(), CollectionError> {
        self.inner().check_complete()
    }

    fn snapshot(&self) -> SessionData {
        self.inner().snapshot()
    }

    fn tick(&mut self) {
        self.inner_mut().tick()
    }

    fn stop(&mut self) {
        self.inner_mut().stop()
    }
}
