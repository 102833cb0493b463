//! Interval sampling recorder
//!
//! A fixed number of intervals is allocated at configuration time. The
//! countdown runs once per interval and auto-advances to the next one when it
//! reaches zero, stopping after the last.

use crate::aggregate::{Aggregator, IntervalSummary};
use crate::config::RecorderConfig;
use crate::error::CollectionError;
use crate::session::{IntervalRecord, SessionData};
use crate::timer::{CountdownTimer, Tick, TimerState};
use crate::types::{IntervalSample, IntervalType, MeasurementDimension};
use chrono::Utc;

use super::Recorder;

/// Outcome of one timer tick in an interval session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IntervalTick {
    /// Timer not running
    Stopped,
    /// Seconds left in the current interval
    Counting(u32),
    /// Moved on to this (1-based) interval
    Advanced(u32),
    /// Last interval elapsed; timer stopped
    Finished,
}

#[derive(Debug, Clone)]
pub struct IntervalRecorder {
    interval_type: IntervalType,
    interval_secs: u32,
    samples: Vec<IntervalSample>,
    current: usize,
    timer: CountdownTimer,
}

impl IntervalRecorder {
    pub fn new(
        config: &RecorderConfig,
        interval_type: IntervalType,
        intervals: u32,
        interval_secs: u32,
    ) -> Result<Self, CollectionError> {
        if intervals == 0 || !config.interval_range().contains(&intervals) {
            return Err(CollectionError::InvalidConfig(format!(
                "number of intervals must be between {} and {}, got {}",
                config.min_intervals, config.max_intervals, intervals
            )));
        }
        if interval_secs == 0 || !config.interval_secs_range().contains(&interval_secs) {
            return Err(CollectionError::InvalidConfig(format!(
                "interval duration must be between {} and {} seconds, got {}",
                config.min_interval_secs, config.max_interval_secs, interval_secs
            )));
        }

        let now = Utc::now();
        let samples = (1..=intervals)
            .map(|n| IntervalSample {
                interval_number: n,
                occurred: None,
                timestamp: now,
                time_remaining: None,
            })
            .collect();

        Ok(Self {
            interval_type,
            interval_secs,
            samples,
            current: 0,
            timer: CountdownTimer::new(interval_secs),
        })
    }

    /// Continue from a saved record at the first unrecorded interval
    pub fn from_record(
        config: &RecorderConfig,
        record: IntervalRecord,
    ) -> Result<Self, CollectionError> {
        let mut recorder = Self::new(
            config,
            record.interval_type,
            record.intervals.len() as u32,
            record.interval_duration,
        )?;
        recorder.current = record
            .intervals
            .iter()
            .position(|s| s.occurred.is_none())
            .unwrap_or(record.intervals.len() - 1);
        recorder.samples = record.intervals;
        Ok(recorder)
    }

    pub fn interval_type(&self) -> IntervalType {
        self.interval_type
    }

    pub fn samples(&self) -> &[IntervalSample] {
        &self.samples
    }

    /// 1-based number of the interval being observed
    pub fn current_interval(&self) -> u32 {
        self.current as u32 + 1
    }

    pub fn time_remaining(&self) -> u32 {
        self.timer.remaining_secs()
    }

    pub fn timer_state(&self) -> TimerState {
        self.timer.state()
    }

    pub fn formatted_time(&self) -> String {
        self.timer.formatted()
    }

    fn is_last(&self) -> bool {
        self.current + 1 >= self.samples.len()
    }

    pub fn start(&mut self) -> Result<(), CollectionError> {
        if self.timer.is_expired() && self.is_last() {
            return Err(CollectionError::InvalidTransition(
                "all intervals have elapsed".to_string(),
            ));
        }
        self.timer.start()
    }

    pub fn pause(&mut self) -> Result<(), CollectionError> {
        self.timer.pause()
    }

    /// Stop the countdown and return to idle. Recorded samples are kept.
    pub fn cancel(&mut self) {
        self.timer.reset();
    }

    /// Advance the countdown one second, moving to the next interval at zero
    pub fn tick(&mut self) -> IntervalTick {
        match self.timer.tick() {
            Tick::Stopped => IntervalTick::Stopped,
            Tick::Remaining(secs) => IntervalTick::Counting(secs),
            Tick::Expired => {
                if self.is_last() {
                    return IntervalTick::Finished;
                }
                self.current += 1;
                self.timer.restart();
                IntervalTick::Advanced(self.current_interval())
            }
        }
    }

    /// Record whether the behavior occurred in the current interval
    pub fn record_occurrence(&mut self, occurred: bool) {
        let time_remaining = self.timer.remaining_secs();
        let sample = &mut self.samples[self.current];
        sample.occurred = Some(occurred);
        sample.timestamp = Utc::now();
        sample.time_remaining = Some(time_remaining);
    }

    /// Correct the observation of any interval
    pub fn record_interval(
        &mut self,
        interval_number: u32,
        occurred: Option<bool>,
    ) -> Result<(), CollectionError> {
        let sample = self
            .samples
            .iter_mut()
            .find(|s| s.interval_number == interval_number)
            .ok_or(CollectionError::UnknownInterval(interval_number))?;
        sample.occurred = occurred;
        sample.timestamp = Utc::now();
        Ok(())
    }

    pub fn summary(&self) -> IntervalSummary {
        Aggregator::intervals(&self.samples)
    }

    pub fn record(&self) -> IntervalRecord {
        IntervalRecord {
            interval_type: self.interval_type,
            interval_duration: self.interval_secs,
            intervals: self.samples.clone(),
        }
    }
}

impl Recorder for IntervalRecorder {
    fn dimension(&self) -> MeasurementDimension {
        MeasurementDimension::Interval
    }

    fn check_complete(&self) -> Result<(), CollectionError> {
        self.snapshot().check_complete(false)
    }

    fn snapshot(&self) -> SessionData {
        SessionData::Interval(self.record())
    }

    fn tick(&mut self) {
        IntervalRecorder::tick(self);
    }

    fn stop(&mut self) {
        self.cancel();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn recorder(intervals: u32, secs: u32) -> IntervalRecorder {
        IntervalRecorder::new(&RecorderConfig::default(), IntervalType::Whole, intervals, secs)
            .unwrap()
    }

    #[test]
    fn test_configuration_bounds() {
        let config = RecorderConfig::default();
        assert!(IntervalRecorder::new(&config, IntervalType::Whole, 4, 30).is_err());
        assert!(IntervalRecorder::new(&config, IntervalType::Whole, 31, 30).is_err());
        assert!(IntervalRecorder::new(&config, IntervalType::Whole, 10, 9).is_err());
        assert!(IntervalRecorder::new(&config, IntervalType::Whole, 10, 121).is_err());
    }

    #[test]
    fn test_auto_advance_and_stop_at_last() {
        let mut rec = recorder(5, 10);
        rec.start().unwrap();

        for _ in 0..9 {
            assert!(matches!(rec.tick(), IntervalTick::Counting(_)));
        }
        assert_eq!(rec.tick(), IntervalTick::Advanced(2));
        assert_eq!(rec.time_remaining(), 10);
        assert_eq!(rec.timer_state(), TimerState::Running);

        // Run through intervals 2..=5
        let mut last = IntervalTick::Stopped;
        for _ in 0..40 {
            last = rec.tick();
        }
        assert_eq!(last, IntervalTick::Finished);
        assert_eq!(rec.current_interval(), 5);
        assert_eq!(rec.timer_state(), TimerState::Expired);
        assert_eq!(rec.tick(), IntervalTick::Stopped);
        assert!(rec.start().is_err());
    }

    #[test]
    fn test_record_current_interval_with_time_remaining() {
        let mut rec = recorder(5, 30);
        rec.start().unwrap();
        for _ in 0..12 {
            rec.tick();
        }
        rec.record_occurrence(true);

        let sample = &rec.samples()[0];
        assert_eq!(sample.occurred, Some(true));
        assert_eq!(sample.time_remaining, Some(18));
    }

    #[test]
    fn test_finalize_requires_every_interval() {
        let mut rec = recorder(5, 10);
        rec.start().unwrap();
        for n in 1..=4 {
            rec.record_occurrence(n % 2 == 0);
            for _ in 0..10 {
                rec.tick();
            }
        }
        assert!(matches!(
            rec.check_complete(),
            Err(CollectionError::IncompleteSession(_))
        ));

        rec.record_occurrence(true);
        assert!(rec.check_complete().is_ok());

        let summary = rec.summary();
        assert_eq!(summary.recorded, 5);
        // intervals 2, 4, 5
        assert_eq!(summary.occurred, 3);
        assert_eq!(summary.percentage_occurrence, 60);
    }

    #[test]
    fn test_cancel_keeps_data() {
        let mut rec = recorder(5, 10);
        rec.start().unwrap();
        rec.record_occurrence(false);
        rec.cancel();

        assert_eq!(rec.timer_state(), TimerState::Idle);
        assert_eq!(rec.samples()[0].occurred, Some(false));
    }

    #[test]
    fn test_resume_at_first_unrecorded() {
        let mut rec = recorder(5, 10);
        rec.record_interval(1, Some(true)).unwrap();
        rec.record_interval(2, Some(false)).unwrap();

        let resumed = IntervalRecorder::from_record(&RecorderConfig::default(), rec.record()).unwrap();
        assert_eq!(resumed.current_interval(), 3);
        assert_eq!(resumed.timer_state(), TimerState::Idle);
        assert_eq!(resumed.summary().recorded, 2);
    }

    #[test]
    fn test_record_interval_correction() {
        let mut rec = recorder(5, 10);
        rec.record_interval(3, Some(true)).unwrap();
        assert_eq!(rec.samples()[2].occurred, Some(true));
        assert!(matches!(
            rec.record_interval(6, Some(true)),
            Err(CollectionError::UnknownInterval(6))
        ));
    }
}
