//! Progress analytics
//!
//! Reduces a program's session history (one value per session) into KPI
//! statistics and a half-over-half trend. Series can be narrowed to a
//! trailing date window and to a single therapist before analysis.

use crate::aggregate::round1;
use crate::config::AnalysisConfig;
use crate::session::DataCollectionSession;
use crate::types::Phase;
use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};

/// Value plotted for a program
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AnalysisMetric {
    Percentage,
    Frequency,
    Duration,
    Rate,
}

impl AnalysisMetric {
    pub fn as_str(&self) -> &'static str {
        match self {
            AnalysisMetric::Percentage => "percentage",
            AnalysisMetric::Frequency => "frequency",
            AnalysisMetric::Duration => "duration",
            AnalysisMetric::Rate => "rate",
        }
    }
}

/// Treatment phase shown on progress charts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AnalysisPhase {
    Baseline,
    Intervention,
    Generalization,
    Maintenance,
}

impl From<Phase> for AnalysisPhase {
    fn from(phase: Phase) -> Self {
        match phase {
            Phase::Baseline => AnalysisPhase::Baseline,
            Phase::Treatment => AnalysisPhase::Intervention,
            Phase::Generalization => AnalysisPhase::Generalization,
            Phase::Maintenance => AnalysisPhase::Maintenance,
        }
    }
}

/// One session's headline value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DataPoint {
    pub id: String,
    pub session_id: String,
    pub student_id: String,
    pub program_id: String,
    pub therapist_id: String,
    pub date: NaiveDate,
    pub value: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    pub phase: AnalysisPhase,
}

impl DataPoint {
    /// Build a data point from a completed session.
    ///
    /// Trial sessions keep the phase they were recorded in. Other dimensions
    /// record no phase and are labelled with `default_phase`, typically the
    /// program's current phase. Returns `None` when the session has no
    /// headline value (a latency session where no trial was answered).
    pub fn from_session(
        session: &DataCollectionSession,
        default_phase: AnalysisPhase,
    ) -> Option<Self> {
        let value = session.summary().primary_value()?;
        let phase = session
            .record
            .phase()
            .map(AnalysisPhase::from)
            .unwrap_or(default_phase);

        Some(Self {
            id: format!("dp-{}", session.id),
            session_id: session.id.clone(),
            student_id: session.student_id.clone(),
            program_id: session.program_id.clone(),
            therapist_id: session.therapist_id.clone().unwrap_or_default(),
            date: session.end_time.unwrap_or(session.start_time).date_naive(),
            value,
            notes: session.notes.clone(),
            phase,
        })
    }
}

/// Direction of a series
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Trend {
    Up,
    Down,
    #[default]
    Stable,
}

/// First-half versus second-half comparison of a series
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrendReport {
    pub first_half_avg: f64,
    pub second_half_avg: f64,
    pub trend_diff: f64,
    /// Change relative to the first half, one decimal; 0 when the first half averages 0
    pub trend_percentage: f64,
    pub trend: Trend,
}

/// Classifies a series as up, down or stable
#[derive(Debug, Clone, Copy)]
pub struct TrendClassifier {
    threshold: f64,
}

impl Default for TrendClassifier {
    fn default() -> Self {
        Self::from_config(&AnalysisConfig::default())
    }
}

impl TrendClassifier {
    pub fn new(threshold: f64) -> Self {
        Self { threshold }
    }

    pub fn from_config(config: &AnalysisConfig) -> Self {
        Self::new(config.trend_threshold)
    }

    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    /// Split at `floor(n/2)` and compare half means
    pub fn classify(&self, values: &[f64]) -> TrendReport {
        let mid = values.len() / 2;
        let (first, second) = values.split_at(mid);

        let first_half_avg = mean(first);
        let second_half_avg = mean(second);
        let trend_diff = second_half_avg - first_half_avg;

        let trend_percentage = if first_half_avg != 0.0 {
            round1(trend_diff / first_half_avg * 100.0)
        } else {
            0.0
        };

        let trend = if trend_diff > self.threshold {
            Trend::Up
        } else if trend_diff < -self.threshold {
            Trend::Down
        } else {
            Trend::Stable
        };

        TrendReport {
            first_half_avg,
            second_half_avg,
            trend_diff,
            trend_percentage,
            trend,
        }
    }
}

fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Headline statistics for a series of data points
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KpiStats {
    pub total_sessions: usize,
    pub average_value: f64,
    pub max_value: f64,
    pub min_value: f64,
    pub trend: Trend,
    pub last_value: f64,
    pub trend_percentage: f64,
}

/// Compute KPI statistics over points in chronological order
pub fn calculate_kpis(points: &[DataPoint], config: &AnalysisConfig) -> KpiStats {
    if points.is_empty() {
        return KpiStats::default();
    }

    let values: Vec<f64> = points.iter().map(|p| p.value).collect();
    let report = TrendClassifier::from_config(config).classify(&values);

    KpiStats {
        total_sessions: values.len(),
        average_value: round1(mean(&values)),
        max_value: values.iter().copied().fold(f64::NEG_INFINITY, f64::max),
        min_value: values.iter().copied().fold(f64::INFINITY, f64::min),
        trend: report.trend,
        last_value: values[values.len() - 1],
        trend_percentage: report.trend_percentage,
    }
}

/// Trailing date range for charts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum DateWindow {
    #[serde(rename = "7d")]
    Days7,
    #[default]
    #[serde(rename = "30d")]
    Days30,
    #[serde(rename = "90d")]
    Days90,
}

impl DateWindow {
    pub fn days(&self) -> i64 {
        match self {
            DateWindow::Days7 => 7,
            DateWindow::Days30 => 30,
            DateWindow::Days90 => 90,
        }
    }

    /// Earliest date included when looking back from `reference`
    pub fn cutoff(&self, reference: NaiveDate) -> NaiveDate {
        reference - Duration::days(self.days())
    }

    pub fn parse(text: &str) -> Option<Self> {
        match text {
            "7d" => Some(DateWindow::Days7),
            "30d" => Some(DateWindow::Days30),
            "90d" => Some(DateWindow::Days90),
            _ => None,
        }
    }
}

/// Keep points inside the window and, if given, recorded by one therapist
pub fn filter_points(
    points: &[DataPoint],
    window: DateWindow,
    reference: NaiveDate,
    therapist_id: Option<&str>,
) -> Vec<DataPoint> {
    let cutoff = window.cutoff(reference);
    points
        .iter()
        .filter(|p| p.date >= cutoff)
        .filter(|p| therapist_id.map_or(true, |id| p.therapist_id == id))
        .cloned()
        .collect()
}

/// Whether the latest value reached the goal line
pub fn at_goal(points: &[DataPoint], goal: f64) -> bool {
    points.last().is_some_and(|p| p.value >= goal)
}
