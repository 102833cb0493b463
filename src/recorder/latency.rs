//! Latency recorder

use crate::aggregate::{Aggregator, LatencySummary};
use crate::error::CollectionError;
use crate::session::{LatencyRecord, SessionData};
use crate::types::{LatencyTrial, MeasurementDimension};
use chrono::{DateTime, Utc};

use super::Recorder;

/// Measures time from antecedent to response, one trial at a time
#[derive(Debug, Clone, Default)]
pub struct LatencyRecorder {
    trials: Vec<LatencyTrial>,
}

impl LatencyRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_record(record: LatencyRecord) -> Self {
        Self {
            trials: record.trials,
        }
    }

    pub fn trials(&self) -> &[LatencyTrial] {
        &self.trials
    }

    fn awaiting_response(&self) -> bool {
        self.trials.last().is_some_and(|t| t.response_time.is_none())
    }

    /// Present the antecedent for a new trial
    pub fn present_antecedent(&mut self, at: DateTime<Utc>) -> Result<u32, CollectionError> {
        if self.awaiting_response() {
            return Err(CollectionError::InvalidTransition(
                "previous trial is still waiting for a response".to_string(),
            ));
        }

        let number = self.trials.len() as u32 + 1;
        self.trials.push(LatencyTrial {
            id: format!("latency-{}", number),
            antecedent_time: at,
            response_time: None,
            latency: None,
        });
        Ok(number)
    }

    /// Record the response to the pending antecedent, returning the latency in seconds
    pub fn record_response(&mut self, at: DateTime<Utc>) -> Result<f64, CollectionError> {
        let trial = self
            .trials
            .last_mut()
            .filter(|t| t.response_time.is_none())
            .ok_or_else(|| {
                CollectionError::InvalidTransition("no antecedent is pending".to_string())
            })?;

        if at < trial.antecedent_time {
            return Err(CollectionError::InvalidTransition(
                "response cannot precede its antecedent".to_string(),
            ));
        }

        let latency = (at - trial.antecedent_time).num_milliseconds() as f64 / 1000.0;
        trial.response_time = Some(at);
        trial.latency = Some(latency);
        Ok(latency)
    }

    /// Drop a trial that never got a response
    pub fn discard_pending(&mut self) -> bool {
        if self.awaiting_response() {
            self.trials.pop();
            return true;
        }
        false
    }

    pub fn summary(&self) -> LatencySummary {
        Aggregator::latencies(&self.trials)
    }

    pub fn record(&self) -> LatencyRecord {
        LatencyRecord {
            trials: self.trials.clone(),
        }
    }
}

impl Recorder for LatencyRecorder {
    fn dimension(&self) -> MeasurementDimension {
        MeasurementDimension::Latency
    }

    fn check_complete(&self) -> Result<(), CollectionError> {
        self.snapshot().check_complete(false)
    }

    fn snapshot(&self) -> SessionData {
        SessionData::Latency(self.record())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 1, 20, 9, 0, 0).unwrap()
    }

    #[test]
    fn test_latency_average() {
        let mut rec = LatencyRecorder::new();
        assert_eq!(rec.present_antecedent(t0()).unwrap(), 1);
        assert_eq!(rec.record_response(t0() + Duration::seconds(2)).unwrap(), 2.0);

        rec.present_antecedent(t0() + Duration::seconds(10)).unwrap();
        rec.record_response(t0() + Duration::seconds(15)).unwrap();

        let summary = rec.summary();
        assert_eq!(summary.answered, 2);
        assert_eq!(summary.average_latency, Some(3.5));
    }

    #[test]
    fn test_one_pending_antecedent_at_a_time() {
        let mut rec = LatencyRecorder::new();
        rec.present_antecedent(t0()).unwrap();
        assert!(rec.present_antecedent(t0()).is_err());
        assert!(rec.check_complete().is_err());

        assert!(rec.discard_pending());
        assert!(rec.check_complete().is_ok());
        assert!(rec.record_response(t0()).is_err());
    }
}
