//! Core types for the Trialflux recorders
//!
//! This module defines the observations that flow through each recorder:
//! trials, frequency events, interval samples, duration episodes and latency
//! trials, plus the vocabulary shared by all of them (dimension, phase,
//! prompt levels).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Measurement method for a program
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MeasurementDimension {
    Percentage,
    Frequency,
    Duration,
    Latency,
    Interval,
}

impl MeasurementDimension {
    pub fn as_str(&self) -> &'static str {
        match self {
            MeasurementDimension::Percentage => "percentage",
            MeasurementDimension::Frequency => "frequency",
            MeasurementDimension::Duration => "duration",
            MeasurementDimension::Latency => "latency",
            MeasurementDimension::Interval => "interval",
        }
    }
}

/// Clinical stage of a program during data collection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Phase {
    Baseline,
    #[default]
    Treatment,
    Generalization,
    Maintenance,
}

impl Phase {
    pub fn label(&self) -> &'static str {
        match self {
            Phase::Baseline => "Línea Base",
            Phase::Treatment => "Tratamiento",
            Phase::Generalization => "Generalización",
            Phase::Maintenance => "Mantenimiento",
        }
    }
}

/// Response recorded for a single trial
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TrialResponse {
    Independent,
    Prompted,
    Error,
    NoResponse,
}

/// Order in which a trial cycles through responses on each tap.
const RESPONSE_CYCLE: [(TrialResponse, TrialResponse); 4] = [
    (TrialResponse::NoResponse, TrialResponse::Independent),
    (TrialResponse::Independent, TrialResponse::Prompted),
    (TrialResponse::Prompted, TrialResponse::Error),
    (TrialResponse::Error, TrialResponse::NoResponse),
];

impl TrialResponse {
    /// Next response in the recording cycle
    /// `no-response → independent → prompted → error → no-response`.
    pub fn next(self) -> TrialResponse {
        RESPONSE_CYCLE
            .iter()
            .find(|(from, _)| *from == self)
            .map(|(_, to)| *to)
            .unwrap_or(TrialResponse::NoResponse)
    }

    /// Short code shown on the trial grid
    pub fn code(&self) -> &'static str {
        match self {
            TrialResponse::Independent => "I",
            TrialResponse::Prompted => "A",
            TrialResponse::Error => "E",
            TrialResponse::NoResponse => "NR",
        }
    }
}

/// Assistance tier applied to a prompted response
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PromptLevel {
    FullPhysical,
    PartialPhysical,
    Gestural,
    Shadow,
    Model,
    EchoicFull,
    EchoicPartial,
    VerbalFull,
    VerbalPartial,
    Unspecified,
}

impl PromptLevel {
    pub const ALL: [PromptLevel; 10] = [
        PromptLevel::FullPhysical,
        PromptLevel::PartialPhysical,
        PromptLevel::Gestural,
        PromptLevel::Shadow,
        PromptLevel::Model,
        PromptLevel::EchoicFull,
        PromptLevel::EchoicPartial,
        PromptLevel::VerbalFull,
        PromptLevel::VerbalPartial,
        PromptLevel::Unspecified,
    ];

    /// Abbreviation used in clinical notes
    pub fn code(&self) -> &'static str {
        match self {
            PromptLevel::FullPhysical => "AFT",
            PromptLevel::PartialPhysical => "AFP",
            PromptLevel::Gestural => "AG",
            PromptLevel::Shadow => "SOMBRA",
            PromptLevel::Model => "MOD",
            PromptLevel::EchoicFull => "ET",
            PromptLevel::EchoicPartial => "EP",
            PromptLevel::VerbalFull => "VT",
            PromptLevel::VerbalPartial => "VP",
            PromptLevel::Unspecified => "NE",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            PromptLevel::FullPhysical => "AFT (Ayuda Física Total)",
            PromptLevel::PartialPhysical => "AFP (Ayuda Física Parcial)",
            PromptLevel::Gestural => "AG (Ayuda Gestual)",
            PromptLevel::Shadow => "Sombra",
            PromptLevel::Model => "Modelado",
            PromptLevel::EchoicFull => "ET (Ecoica Total)",
            PromptLevel::EchoicPartial => "EP (Ecoica Parcial)",
            PromptLevel::VerbalFull => "VT (Verbal Total)",
            PromptLevel::VerbalPartial => "VP (Verbal Parcial)",
            PromptLevel::Unspecified => "Ayuda no específica",
        }
    }
}

/// Stimulus-side prompt applied when presenting the antecedent
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum StimulusPrompt {
    Position,
    Redundancy,
    Movement,
    #[serde(rename = "time-delay-0")]
    TimeDelay0,
    #[serde(rename = "time-delay-3")]
    TimeDelay3,
    #[serde(rename = "time-delay-5")]
    TimeDelay5,
    #[serde(rename = "time-delay-10")]
    TimeDelay10,
}

impl StimulusPrompt {
    /// Delay in seconds for time-delay prompts
    pub fn delay_secs(&self) -> Option<u32> {
        match self {
            StimulusPrompt::TimeDelay0 => Some(0),
            StimulusPrompt::TimeDelay3 => Some(3),
            StimulusPrompt::TimeDelay5 => Some(5),
            StimulusPrompt::TimeDelay10 => Some(10),
            _ => None,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            StimulusPrompt::Position => "Posición",
            StimulusPrompt::Redundancy => "Redundancia",
            StimulusPrompt::Movement => "Movimiento",
            StimulusPrompt::TimeDelay0 => "Time Delay 0 seg",
            StimulusPrompt::TimeDelay3 => "Time Delay 3 seg",
            StimulusPrompt::TimeDelay5 => "Time Delay 5 seg",
            StimulusPrompt::TimeDelay10 => "Time Delay 10 seg",
        }
    }
}

/// One discrete response opportunity in a percentage session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Trial {
    pub id: String,
    /// 1-based position in the session
    pub number: u32,
    pub response: TrialResponse,
    /// Present only while `response` is `Prompted`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prompt_level: Option<PromptLevel>,
    pub timestamp: DateTime<Utc>,
}

impl Trial {
    pub fn new(number: u32, timestamp: DateTime<Utc>) -> Self {
        Self {
            id: format!("trial-{}", number),
            number,
            response: TrialResponse::NoResponse,
            prompt_level: None,
            timestamp,
        }
    }

    /// Prompted without a recorded prompt level
    pub fn needs_prompt_level(&self) -> bool {
        self.response == TrialResponse::Prompted && self.prompt_level.is_none()
    }
}

/// A single counted occurrence in a frequency session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FrequencyEvent {
    pub id: String,
    pub timestamp: DateTime<Utc>,
}

/// Interval sampling method
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum IntervalType {
    /// Behavior must last the whole interval
    #[default]
    Whole,
    /// Behavior occurs at any moment of the interval
    Partial,
    /// Behavior observed at the end of the interval
    Momentary,
}

/// Observation slot in an interval session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IntervalSample {
    /// 1-based interval position
    pub interval_number: u32,
    /// `None` until observed
    pub occurred: Option<bool>,
    pub timestamp: DateTime<Utc>,
    /// Seconds left on the countdown when the observation was recorded
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time_remaining: Option<u32>,
}

/// Continuous bout of behavior in a duration session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DurationEpisode {
    pub id: String,
    pub start_time: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_time: Option<DateTime<Utc>>,
    /// Seconds, set when the episode is closed
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<f64>,
}

impl DurationEpisode {
    pub fn is_open(&self) -> bool {
        self.end_time.is_none()
    }
}

/// Antecedent/response pair in a latency session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LatencyTrial {
    pub id: String,
    pub antecedent_time: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub response_time: Option<DateTime<Utc>>,
    /// Seconds between antecedent and response
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub latency: Option<f64>,
}

/// Lifecycle of a data collection session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SessionStatus {
    InProgress,
    Completed,
    Cancelled,
}
