//! Session aggregation
//!
//! This module reduces recorded observations into summary statistics:
//! - Trial counts and percentage correct
//! - Frequency rate per minute
//! - Interval occurrence percentage
//! - Total duration and average latency

use crate::types::{DurationEpisode, IntervalSample, LatencyTrial, Trial, TrialResponse};
use serde::{Deserialize, Serialize};

/// Round half up to the nearest integer (`floor(x + 0.5)`).
///
/// Negative halves round toward positive infinity, so `-2.5` becomes `-2`.
pub fn round_half_up(value: f64) -> f64 {
    (value + 0.5).floor()
}

/// Round half up to one decimal place
pub fn round1(value: f64) -> f64 {
    round_half_up(value * 10.0) / 10.0
}

/// Summary of a percentage (trial-based) session
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrialSummary {
    pub total_trials: u32,
    pub independent_count: u32,
    pub prompted_count: u32,
    pub error_count: u32,
    pub no_response_count: u32,
    /// 0-100
    pub percentage_correct: u32,
}

/// Summary of a frequency session
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FrequencySummary {
    pub count: u32,
    /// Seconds
    pub duration: u64,
    /// Events per minute, one decimal
    pub rate: f64,
}

/// Summary of an interval session
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IntervalSummary {
    pub number_of_intervals: u32,
    pub recorded: u32,
    pub occurred: u32,
    /// 0-100, over recorded samples only
    pub percentage_occurrence: u32,
}

/// Summary of a duration session
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DurationSummary {
    pub episodes: u32,
    /// Seconds across closed episodes
    pub total_duration: f64,
}

/// Summary of a latency session
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LatencySummary {
    pub trials: u32,
    pub answered: u32,
    /// Seconds, one decimal; absent when no trial was answered
    pub average_latency: Option<f64>,
}

/// Aggregator for recorded observations
pub struct Aggregator;

impl Aggregator {
    /// Count responses by category and compute percentage correct.
    ///
    /// Only independent responses count as correct. An empty sequence yields 0%.
    pub fn trials(trials: &[Trial]) -> TrialSummary {
        let count = |response: TrialResponse| {
            trials.iter().filter(|t| t.response == response).count() as u32
        };

        let independent_count = count(TrialResponse::Independent);
        let total_trials = trials.len() as u32;

        TrialSummary {
            total_trials,
            independent_count,
            prompted_count: count(TrialResponse::Prompted),
            error_count: count(TrialResponse::Error),
            no_response_count: count(TrialResponse::NoResponse),
            percentage_correct: percentage(independent_count, total_trials),
        }
    }

    /// Summarize a frequency count over an elapsed number of seconds
    pub fn frequency(count: u32, elapsed_secs: u64) -> FrequencySummary {
        FrequencySummary {
            count,
            duration: elapsed_secs,
            rate: rate_per_minute(count, elapsed_secs),
        }
    }

    /// Summarize interval samples; unset samples are excluded from the denominator
    pub fn intervals(samples: &[IntervalSample]) -> IntervalSummary {
        let recorded = samples.iter().filter(|s| s.occurred.is_some()).count() as u32;
        let occurred = samples
            .iter()
            .filter(|s| s.occurred == Some(true))
            .count() as u32;

        IntervalSummary {
            number_of_intervals: samples.len() as u32,
            recorded,
            occurred,
            percentage_occurrence: percentage(occurred, recorded),
        }
    }

    /// Sum closed episode durations; an open episode contributes nothing
    pub fn durations(episodes: &[DurationEpisode]) -> DurationSummary {
        let total_duration = episodes.iter().filter_map(|e| e.duration).sum();

        DurationSummary {
            episodes: episodes.len() as u32,
            total_duration,
        }
    }

    /// Average latency over answered trials
    pub fn latencies(trials: &[LatencyTrial]) -> LatencySummary {
        let latencies: Vec<f64> = trials.iter().filter_map(|t| t.latency).collect();
        let average_latency = if latencies.is_empty() {
            None
        } else {
            Some(round1(latencies.iter().sum::<f64>() / latencies.len() as f64))
        };

        LatencySummary {
            trials: trials.len() as u32,
            answered: latencies.len() as u32,
            average_latency,
        }
    }
}

/// Integer percentage `round(100 * part / whole)`, 0 when `whole` is 0
pub fn percentage(part: u32, whole: u32) -> u32 {
    if whole == 0 {
        return 0;
    }
    round_half_up(100.0 * part as f64 / whole as f64) as u32
}

/// Events per minute with one decimal, 0 when no time has elapsed
pub fn rate_per_minute(count: u32, elapsed_secs: u64) -> f64 {
    if elapsed_secs == 0 {
        return 0.0;
    }
    round1((count as f64 / elapsed_secs as f64) * 60.0)
}
