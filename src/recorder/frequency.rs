//! Frequency (event count) recorder

use crate::aggregate::{Aggregator, FrequencySummary};
use crate::error::CollectionError;
use crate::session::{FrequencyRecord, SessionData};
use crate::timer::Stopwatch;
use crate::types::{FrequencyEvent, MeasurementDimension};
use chrono::{DateTime, Utc};

use super::Recorder;

/// Counts behavior occurrences against a session stopwatch
#[derive(Debug, Clone)]
pub struct FrequencyRecorder {
    start_time: DateTime<Utc>,
    events: Vec<FrequencyEvent>,
    stopwatch: Stopwatch,
}

impl Default for FrequencyRecorder {
    fn default() -> Self {
        Self::new(Utc::now())
    }
}

impl FrequencyRecorder {
    pub fn new(start_time: DateTime<Utc>) -> Self {
        Self {
            start_time,
            events: Vec::new(),
            stopwatch: Stopwatch::new(),
        }
    }

    /// Continue from a saved record; the stopwatch resumes idle
    pub fn from_record(record: FrequencyRecord) -> Self {
        Self {
            start_time: record.start_time,
            events: record.events,
            stopwatch: Stopwatch::with_elapsed(record.duration),
        }
    }

    pub fn count(&self) -> u32 {
        self.events.len() as u32
    }

    pub fn events(&self) -> &[FrequencyEvent] {
        &self.events
    }

    pub fn stopwatch(&self) -> &Stopwatch {
        &self.stopwatch
    }

    pub fn elapsed_secs(&self) -> u64 {
        self.stopwatch.elapsed_secs()
    }

    /// Record one occurrence now
    pub fn increment(&mut self) -> u32 {
        self.increment_at(Utc::now())
    }

    /// Record one occurrence at a given time
    pub fn increment_at(&mut self, timestamp: DateTime<Utc>) -> u32 {
        self.events.push(FrequencyEvent {
            id: format!("event-{}", uuid::Uuid::new_v4()),
            timestamp,
        });
        self.count()
    }

    /// Remove the most recent occurrence; no-op at zero
    pub fn decrement(&mut self) -> u32 {
        self.events.pop();
        self.count()
    }

    /// Start or pause the session stopwatch
    pub fn toggle_timer(&mut self) {
        self.stopwatch.toggle();
    }

    /// Advance the stopwatch by one second
    pub fn tick(&mut self) -> bool {
        self.stopwatch.tick()
    }

    /// Events per minute over the elapsed stopwatch time
    pub fn rate(&self) -> f64 {
        self.summary().rate
    }

    pub fn summary(&self) -> FrequencySummary {
        Aggregator::frequency(self.count(), self.stopwatch.elapsed_secs())
    }

    pub fn record(&self) -> FrequencyRecord {
        FrequencyRecord {
            start_time: self.start_time,
            end_time: None,
            duration: self.stopwatch.elapsed_secs(),
            events: self.events.clone(),
        }
    }
}

impl Recorder for FrequencyRecorder {
    fn dimension(&self) -> MeasurementDimension {
        MeasurementDimension::Frequency
    }

    fn check_complete(&self) -> Result<(), CollectionError> {
        Ok(())
    }

    fn snapshot(&self) -> SessionData {
        SessionData::Frequency(self.record())
    }

    fn tick(&mut self) {
        FrequencyRecorder::tick(self);
    }

    fn stop(&mut self) {
        self.stopwatch.stop();
    }
}
