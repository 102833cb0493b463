//! Program models
//!
//! A program is either a skill-acquisition plan or a behavior-management plan.
//! The category is the enum variant itself, so it cannot change after
//! creation. Status moves only through [`Program::set_status`], which checks
//! the transition table.

use crate::analytics::AnalysisMetric;
use crate::config::AnalysisConfig;
use crate::error::CollectionError;
use crate::repository::Entity;
use crate::types::MeasurementDimension;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ProgramCategory {
    SkillAcquisition,
    BehaviorManagement,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ProgramStatus {
    Active,
    Achieved,
    Paused,
    Discontinued,
}

/// Allowed status changes
const STATUS_TRANSITIONS: [(ProgramStatus, ProgramStatus); 7] = [
    (ProgramStatus::Active, ProgramStatus::Achieved),
    (ProgramStatus::Active, ProgramStatus::Paused),
    (ProgramStatus::Active, ProgramStatus::Discontinued),
    (ProgramStatus::Paused, ProgramStatus::Active),
    (ProgramStatus::Paused, ProgramStatus::Discontinued),
    (ProgramStatus::Achieved, ProgramStatus::Active),
    (ProgramStatus::Discontinued, ProgramStatus::Active),
];

impl ProgramStatus {
    pub fn can_transition_to(self, to: ProgramStatus) -> bool {
        STATUS_TRANSITIONS.contains(&(self, to))
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ProgramStatus::Active => "active",
            ProgramStatus::Achieved => "achieved",
            ProgramStatus::Paused => "paused",
            ProgramStatus::Discontinued => "discontinued",
        }
    }
}

/// Hypothesized function of a problem behavior
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BehaviorFunction {
    Attention,
    Escape,
    Sensory,
    Tangible,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgramStep {
    pub id: String,
    pub order: u32,
    pub description: String,
}

/// Stimulus set used during teaching
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgramSet {
    pub id: String,
    pub name: String,
    pub items: Vec<String>,
}

/// Fields shared by every program
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgramInfo {
    pub id: String,
    pub student_id: String,
    pub name: String,
    pub status: ProgramStatus,
    pub created_date: NaiveDate,
    pub last_modified: NaiveDate,
    pub created_by: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SkillAcquisitionProgram {
    #[serde(flatten)]
    pub info: ProgramInfo,
    pub objective: String,
    pub antecedent: String,
    pub steps: Vec<ProgramStep>,
    pub procedure: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub sets: Vec<ProgramSet>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prompts: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_correction: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mastery_criteria: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub generalization: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BehaviorManagementProgram {
    #[serde(flatten)]
    pub info: ProgramInfo,
    pub topography: String,
    pub operational_definition: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_dimension: Option<MeasurementDimension>,
    pub functions: Vec<BehaviorFunction>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub precursor_behaviors: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub replacement_behavior: Option<String>,
    pub procedure: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mastery_criteria: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub crisis_plan: Option<String>,
}

/// A treatment program, tagged by category on the wire
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "category", rename_all = "kebab-case")]
pub enum Program {
    SkillAcquisition(SkillAcquisitionProgram),
    BehaviorManagement(BehaviorManagementProgram),
}

impl Program {
    pub fn info(&self) -> &ProgramInfo {
        match self {
            Program::SkillAcquisition(p) => &p.info,
            Program::BehaviorManagement(p) => &p.info,
        }
    }

    fn info_mut(&mut self) -> &mut ProgramInfo {
        match self {
            Program::SkillAcquisition(p) => &mut p.info,
            Program::BehaviorManagement(p) => &mut p.info,
        }
    }

    pub fn id(&self) -> &str {
        &self.info().id
    }

    pub fn name(&self) -> &str {
        &self.info().name
    }

    pub fn student_id(&self) -> &str {
        &self.info().student_id
    }

    pub fn status(&self) -> ProgramStatus {
        self.info().status
    }

    pub fn category(&self) -> ProgramCategory {
        match self {
            Program::SkillAcquisition(_) => ProgramCategory::SkillAcquisition,
            Program::BehaviorManagement(_) => ProgramCategory::BehaviorManagement,
        }
    }

    /// Move to a new status, stamping the modification date
    pub fn set_status(&mut self, to: ProgramStatus, on: NaiveDate) -> Result<(), CollectionError> {
        let from = self.status();
        if !from.can_transition_to(to) {
            return Err(CollectionError::InvalidTransition(format!(
                "program {} cannot go from {} to {}",
                self.id(),
                from.as_str(),
                to.as_str()
            )));
        }

        let info = self.info_mut();
        info.status = to;
        info.last_modified = on;
        tracing::info!(program_id = %info.id, from = from.as_str(), to = to.as_str(), "Program status changed");
        Ok(())
    }

    /// Metric plotted on the program's progress chart
    pub fn default_metric(&self) -> AnalysisMetric {
        match self {
            Program::SkillAcquisition(_) => AnalysisMetric::Percentage,
            Program::BehaviorManagement(_) => AnalysisMetric::Frequency,
        }
    }

    /// Dimension a recorder opens with when none is chosen
    pub fn default_dimension(&self) -> MeasurementDimension {
        match self {
            Program::SkillAcquisition(_) => MeasurementDimension::Percentage,
            Program::BehaviorManagement(p) => p
                .current_dimension
                .unwrap_or(MeasurementDimension::Frequency),
        }
    }

    /// Whether a session value meets the mastery percentage.
    ///
    /// Only skill-acquisition programs have a mastery percentage.
    pub fn meets_mastery(&self, value: f64, config: &AnalysisConfig) -> bool {
        match self {
            Program::SkillAcquisition(_) => value >= config.mastery_percentage,
            Program::BehaviorManagement(_) => false,
        }
    }
}

impl Entity for Program {
    fn id(&self) -> &str {
        Program::id(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn info(id: &str, status: ProgramStatus) -> ProgramInfo {
        ProgramInfo {
            id: id.to_string(),
            student_id: "std-001".to_string(),
            name: "Contacto Visual".to_string(),
            status,
            created_date: date(2023, 2, 15),
            last_modified: date(2026, 1, 20),
            created_by: "María González".to_string(),
        }
    }

    fn skill(status: ProgramStatus) -> Program {
        Program::SkillAcquisition(SkillAcquisitionProgram {
            info: info("prog-001", status),
            objective: "Contacto visual durante 3 segundos".to_string(),
            antecedent: "Terapeuta dice el nombre".to_string(),
            steps: vec![ProgramStep {
                id: "step-001".to_string(),
                order: 1,
                description: "Llamar al estudiante por su nombre".to_string(),
            }],
            procedure: "Reforzamiento inmediato".to_string(),
            sets: Vec::new(),
            prompts: None,
            error_correction: None,
            mastery_criteria: Some("80% en 3 sesiones".to_string()),
            generalization: None,
        })
    }

    fn behavior() -> Program {
        Program::BehaviorManagement(BehaviorManagementProgram {
            info: info("prog-005", ProgramStatus::Active),
            topography: "Gritos, llanto intenso".to_string(),
            operational_definition: "Episodio de llanto de más de 10 segundos".to_string(),
            current_dimension: None,
            functions: vec![BehaviorFunction::Escape, BehaviorFunction::Attention],
            precursor_behaviors: None,
            replacement_behavior: None,
            procedure: "Extinción de escape".to_string(),
            mastery_criteria: None,
            crisis_plan: None,
        })
    }

    #[test]
    fn test_status_transitions() {
        let mut program = skill(ProgramStatus::Active);
        program
            .set_status(ProgramStatus::Paused, date(2026, 2, 1))
            .unwrap();
        assert_eq!(program.status(), ProgramStatus::Paused);
        assert_eq!(program.info().last_modified, date(2026, 2, 1));

        // Paused programs must be resumed before they can be achieved
        assert!(program
            .set_status(ProgramStatus::Achieved, date(2026, 2, 2))
            .is_err());
        assert!(program
            .set_status(ProgramStatus::Paused, date(2026, 2, 2))
            .is_err());

        program
            .set_status(ProgramStatus::Discontinued, date(2026, 2, 3))
            .unwrap();
        program
            .set_status(ProgramStatus::Active, date(2026, 2, 4))
            .unwrap();
        assert_eq!(program.status(), ProgramStatus::Active);
    }

    #[test]
    fn test_defaults_by_category() {
        assert_eq!(skill(ProgramStatus::Active).default_metric(), AnalysisMetric::Percentage);
        assert_eq!(behavior().default_metric(), AnalysisMetric::Frequency);
        assert_eq!(
            behavior().default_dimension(),
            MeasurementDimension::Frequency
        );
    }

    #[test]
    fn test_tagged_wire_format() {
        let program = behavior();
        let value = serde_json::to_value(&program).unwrap();
        assert_eq!(value["category"], "behavior-management");
        assert_eq!(value["studentId"], "std-001");
        assert_eq!(value["functions"][0], "escape");
        assert_eq!(value["createdDate"], "2023-02-15");

        let parsed: Program = serde_json::from_value(value).unwrap();
        assert_eq!(parsed, program);
        assert_eq!(parsed.category(), ProgramCategory::BehaviorManagement);
    }

    #[test]
    fn test_mastery() {
        let config = AnalysisConfig::default();
        assert!(skill(ProgramStatus::Active).meets_mastery(80.0, &config));
        assert!(!skill(ProgramStatus::Active).meets_mastery(79.9, &config));
        assert!(!behavior().meets_mastery(100.0, &config));
    }
}
