//! Session records
//!
//! A session wraps the observations of exactly one measurement dimension.
//! Records carry their raw observations; summaries are always recomputed from
//! them so a stored summary can never disagree with the data.

use crate::aggregate::{
    Aggregator, DurationSummary, FrequencySummary, IntervalSummary, LatencySummary, TrialSummary,
};
use crate::error::CollectionError;
use crate::types::{
    DurationEpisode, FrequencyEvent, IntervalSample, IntervalType, LatencyTrial,
    MeasurementDimension, Phase, SessionStatus, Trial, TrialResponse,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Trial-by-trial record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PercentageRecord {
    #[serde(default)]
    pub phase: Phase,
    pub trials: Vec<Trial>,
}

/// Event-count record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FrequencyRecord {
    pub start_time: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_time: Option<DateTime<Utc>>,
    /// Seconds counted by the session stopwatch
    pub duration: u64,
    pub events: Vec<FrequencyEvent>,
}

/// Episode-duration record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DurationRecord {
    pub episodes: Vec<DurationEpisode>,
}

/// Response-latency record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LatencyRecord {
    pub trials: Vec<LatencyTrial>,
}

/// Interval-sampling record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IntervalRecord {
    pub interval_type: IntervalType,
    /// Seconds per interval
    pub interval_duration: u32,
    pub intervals: Vec<IntervalSample>,
}

/// Observations of one session, tagged by dimension
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "dimension", rename_all = "kebab-case")]
pub enum SessionData {
    Percentage(PercentageRecord),
    Frequency(FrequencyRecord),
    Duration(DurationRecord),
    Latency(LatencyRecord),
    Interval(IntervalRecord),
}

/// Summary statistics of one session, tagged by dimension
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "dimension", rename_all = "kebab-case")]
pub enum SessionSummary {
    Percentage(TrialSummary),
    Frequency(FrequencySummary),
    Duration(DurationSummary),
    Latency(LatencySummary),
    Interval(IntervalSummary),
}

impl SessionSummary {
    /// Headline value plotted on progress charts
    pub fn primary_value(&self) -> Option<f64> {
        match self {
            SessionSummary::Percentage(s) => Some(s.percentage_correct as f64),
            SessionSummary::Frequency(s) => Some(s.count as f64),
            SessionSummary::Duration(s) => Some(s.total_duration),
            SessionSummary::Latency(s) => s.average_latency,
            SessionSummary::Interval(s) => Some(s.percentage_occurrence as f64),
        }
    }
}

impl SessionData {
    pub fn dimension(&self) -> MeasurementDimension {
        match self {
            SessionData::Percentage(_) => MeasurementDimension::Percentage,
            SessionData::Frequency(_) => MeasurementDimension::Frequency,
            SessionData::Duration(_) => MeasurementDimension::Duration,
            SessionData::Latency(_) => MeasurementDimension::Latency,
            SessionData::Interval(_) => MeasurementDimension::Interval,
        }
    }

    /// Phase recorded with the observations; only trial sessions carry one
    pub fn phase(&self) -> Option<Phase> {
        match self {
            SessionData::Percentage(r) => Some(r.phase),
            _ => None,
        }
    }

    pub fn summarize(&self) -> SessionSummary {
        match self {
            SessionData::Percentage(r) => SessionSummary::Percentage(Aggregator::trials(&r.trials)),
            SessionData::Frequency(r) => SessionSummary::Frequency(Aggregator::frequency(
                r.events.len() as u32,
                r.duration,
            )),
            SessionData::Duration(r) => {
                SessionSummary::Duration(Aggregator::durations(&r.episodes))
            }
            SessionData::Latency(r) => SessionSummary::Latency(Aggregator::latencies(&r.trials)),
            SessionData::Interval(r) => {
                SessionSummary::Interval(Aggregator::intervals(&r.intervals))
            }
        }
    }

    /// Check the record satisfies the invariants required to finalize it
    pub fn check_complete(&self, require_prompt_level: bool) -> Result<(), CollectionError> {
        match self {
            SessionData::Percentage(r) => check_trials(&r.trials, require_prompt_level),
            SessionData::Frequency(_) => Ok(()),
            SessionData::Duration(r) => {
                if r.episodes.iter().any(|e| e.is_open()) {
                    return Err(CollectionError::IncompleteSession(
                        "an episode is still being timed".to_string(),
                    ));
                }
                Ok(())
            }
            SessionData::Latency(r) => {
                let unanswered = r.trials.iter().filter(|t| t.latency.is_none()).count();
                if unanswered > 0 {
                    return Err(CollectionError::IncompleteSession(format!(
                        "{} latency trial(s) without a response",
                        unanswered
                    )));
                }
                Ok(())
            }
            SessionData::Interval(r) => {
                let unset = r.intervals.iter().filter(|s| s.occurred.is_none()).count();
                if unset > 0 {
                    return Err(CollectionError::IncompleteSession(format!(
                        "{} of {} intervals not recorded",
                        unset,
                        r.intervals.len()
                    )));
                }
                Ok(())
            }
        }
    }
}

/// Validate trial invariants: a prompt level only on prompted trials and,
/// when required, on every prompted trial.
pub(crate) fn check_trials(
    trials: &[Trial],
    require_prompt_level: bool,
) -> Result<(), CollectionError> {
    for trial in trials {
        if trial.prompt_level.is_some() && trial.response != TrialResponse::Prompted {
            return Err(CollectionError::InvalidTransition(format!(
                "trial {} has a prompt level but is not prompted",
                trial.number
            )));
        }
        if require_prompt_level && trial.needs_prompt_level() {
            return Err(CollectionError::MissingPromptLevel(trial.number));
        }
    }
    Ok(())
}

/// A data collection session, from opening the recorder to save or cancel
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DataCollectionSession {
    pub id: String,
    pub student_id: String,
    pub program_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub therapist_id: Option<String>,
    pub dimension: MeasurementDimension,
    pub start_time: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_time: Option<DateTime<Utc>>,
    pub status: SessionStatus,
    pub record: SessionData,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl DataCollectionSession {
    pub fn summary(&self) -> SessionSummary {
        self.record.summarize()
    }

    /// Elapsed wall-clock seconds, when the session has ended
    pub fn elapsed_secs(&self) -> Option<i64> {
        self.end_time
            .map(|end| (end - self.start_time).num_seconds().max(0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::PromptLevel;
    use chrono::TimeZone;

    fn ts() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 1, 20, 10, 0, 0).unwrap()
    }

    fn trial(number: u32, response: TrialResponse, level: Option<PromptLevel>) -> Trial {
        Trial {
            id: format!("trial-{}", number),
            number,
            response,
            prompt_level: level,
            timestamp: ts(),
        }
    }

    #[test]
    fn test_prompted_without_level_blocks_when_required() {
        let data = SessionData::Percentage(PercentageRecord {
            phase: Phase::Treatment,
            trials: vec![
                trial(1, TrialResponse::Independent, None),
                trial(2, TrialResponse::Prompted, None),
            ],
        });

        assert!(matches!(
            data.check_complete(true),
            Err(CollectionError::MissingPromptLevel(2))
        ));
        assert!(data.check_complete(false).is_ok());
    }

    #[test]
    fn test_prompt_level_on_non_prompted_rejected() {
        let data = SessionData::Percentage(PercentageRecord {
            phase: Phase::Baseline,
            trials: vec![trial(1, TrialResponse::Error, Some(PromptLevel::Gestural))],
        });
        assert!(matches!(
            data.check_complete(false),
            Err(CollectionError::InvalidTransition(_))
        ));
    }

    #[test]
    fn test_interval_incomplete() {
        let sample = |n: u32, occurred: Option<bool>| IntervalSample {
            interval_number: n,
            occurred,
            timestamp: ts(),
            time_remaining: None,
        };
        let data = SessionData::Interval(IntervalRecord {
            interval_type: IntervalType::Partial,
            interval_duration: 30,
            intervals: vec![sample(1, Some(true)), sample(2, None)],
        });
        assert!(matches!(
            data.check_complete(true),
            Err(CollectionError::IncompleteSession(_))
        ));
    }

    #[test]
    fn test_tagged_wire_format() {
        let data = SessionData::Frequency(FrequencyRecord {
            start_time: ts(),
            end_time: None,
            duration: 120,
            events: vec![
                FrequencyEvent {
                    id: "event-1".to_string(),
                    timestamp: ts(),
                },
                FrequencyEvent {
                    id: "event-2".to_string(),
                    timestamp: ts(),
                },
            ],
        });

        let value = serde_json::to_value(&data).unwrap();
        assert_eq!(value["dimension"], "frequency");
        assert_eq!(value["duration"], 120);

        let parsed: SessionData = serde_json::from_value(value).unwrap();
        assert_eq!(parsed, data);

        match parsed.summarize() {
            SessionSummary::Frequency(s) => {
                assert_eq!(s.count, 2);
                assert_eq!(s.rate, 1.0);
            }
            other => panic!("unexpected summary {:?}", other),
        }
    }

    #[test]
    fn test_primary_value() {
        let data = SessionData::Percentage(PercentageRecord {
            phase: Phase::Treatment,
            trials: vec![
                trial(1, TrialResponse::Independent, None),
                trial(2, TrialResponse::Independent, None),
                trial(3, TrialResponse::Error, None),
                trial(4, TrialResponse::Independent, None),
            ],
        });
        assert_eq!(data.summarize().primary_value(), Some(75.0));
    }

    #[test]
    fn test_open_episode_blocks() {
        let data = SessionData::Duration(DurationRecord {
            episodes: vec![DurationEpisode {
                id: "ep-1".to_string(),
                start_time: ts(),
                end_time: None,
                duration: None,
            }],
        });
        assert!(data.check_complete(true).is_err());
    }
}
