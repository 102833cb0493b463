//! Duration (episode timing) recorder

use crate::aggregate::{Aggregator, DurationSummary};
use crate::error::CollectionError;
use crate::session::{DurationRecord, SessionData};
use crate::types::{DurationEpisode, MeasurementDimension};
use chrono::{DateTime, Utc};

use super::Recorder;

/// Times behavior episodes; at most one episode is open at a time
#[derive(Debug, Clone, Default)]
pub struct DurationRecorder {
    episodes: Vec<DurationEpisode>,
}

impl DurationRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_record(record: DurationRecord) -> Self {
        Self {
            episodes: record.episodes,
        }
    }

    pub fn episodes(&self) -> &[DurationEpisode] {
        &self.episodes
    }

    pub fn is_timing(&self) -> bool {
        self.episodes.last().is_some_and(|e| e.is_open())
    }

    /// Open a new episode
    pub fn start_episode(&mut self, at: DateTime<Utc>) -> Result<(), CollectionError> {
        if self.is_timing() {
            return Err(CollectionError::InvalidTransition(
                "an episode is already being timed".to_string(),
            ));
        }

        self.episodes.push(DurationEpisode {
            id: format!("episode-{}", self.episodes.len() + 1),
            start_time: at,
            end_time: None,
            duration: None,
        });
        Ok(())
    }

    /// Close the open episode, returning its length in seconds
    pub fn stop_episode(&mut self, at: DateTime<Utc>) -> Result<f64, CollectionError> {
        let episode = self
            .episodes
            .last_mut()
            .filter(|e| e.is_open())
            .ok_or_else(|| {
                CollectionError::InvalidTransition("no episode is being timed".to_string())
            })?;

        if at < episode.start_time {
            return Err(CollectionError::InvalidTransition(
                "episode cannot end before it starts".to_string(),
            ));
        }

        let secs = (at - episode.start_time).num_milliseconds() as f64 / 1000.0;
        episode.end_time = Some(at);
        episode.duration = Some(secs);
        Ok(secs)
    }

    /// Drop the open episode without recording it
    pub fn discard_open(&mut self) -> bool {
        if self.is_timing() {
            self.episodes.pop();
            return true;
        }
        false
    }

    pub fn summary(&self) -> DurationSummary {
        Aggregator::durations(&self.episodes)
    }

    pub fn record(&self) -> DurationRecord {
        DurationRecord {
            episodes: self.episodes.clone(),
        }
    }
}

impl Recorder for DurationRecorder {
    fn dimension(&self) -> MeasurementDimension {
        MeasurementDimension::Duration
    }

    fn check_complete(&self) -> Result<(), CollectionError> {
        self.snapshot().check_complete(false)
    }

    fn snapshot(&self) -> SessionData {
        SessionData::Duration(self.record())
    }
}
