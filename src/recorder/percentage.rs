//! Trial-by-trial (percentage) recorder

use crate::aggregate::{Aggregator, TrialSummary};
use crate::config::RecorderConfig;
use crate::error::CollectionError;
use crate::session::{check_trials, PercentageRecord, SessionData};
use crate::types::{MeasurementDimension, Phase, PromptLevel, Trial, TrialResponse};
use chrono::Utc;

use super::Recorder;

/// Records a fixed number of trials, each cycling through the response states
#[derive(Debug, Clone)]
pub struct PercentageRecorder {
    phase: Phase,
    trials: Vec<Trial>,
    require_prompt_level: bool,
}

impl PercentageRecorder {
    /// Allocate `count` trials, all starting as no-response
    pub fn new(
        config: &RecorderConfig,
        count: u32,
        phase: Phase,
    ) -> Result<Self, CollectionError> {
        if !config.trial_range().contains(&count) {
            return Err(CollectionError::InvalidConfig(format!(
                "number of trials must be between {} and {}, got {}",
                config.min_trials, config.max_trials, count
            )));
        }

        let now = Utc::now();
        let trials = (1..=count).map(|n| Trial::new(n, now)).collect();

        Ok(Self {
            phase,
            trials,
            require_prompt_level: config.require_prompt_level,
        })
    }

    /// Resume from previously recorded trials
    pub fn from_trials(
        config: &RecorderConfig,
        trials: Vec<Trial>,
        phase: Phase,
    ) -> Result<Self, CollectionError> {
        check_trials(&trials, false)?;
        Ok(Self {
            phase,
            trials,
            require_prompt_level: config.require_prompt_level,
        })
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn set_phase(&mut self, phase: Phase) {
        self.phase = phase;
    }

    pub fn trials(&self) -> &[Trial] {
        &self.trials
    }

    fn trial_mut(&mut self, number: u32) -> Result<&mut Trial, CollectionError> {
        self.trials
            .iter_mut()
            .find(|t| t.number == number)
            .ok_or(CollectionError::UnknownTrial(number))
    }

    /// Advance a trial to its next response. Leaving `prompted` clears the
    /// prompt level.
    pub fn cycle_response(&mut self, number: u32) -> Result<TrialResponse, CollectionError> {
        let trial = self.trial_mut(number)?;
        let next = trial.response.next();

        trial.response = next;
        trial.timestamp = Utc::now();
        if next != TrialResponse::Prompted {
            trial.prompt_level = None;
        }

        Ok(next)
    }

    /// Record the prompt level of a prompted trial
    pub fn set_prompt_level(
        &mut self,
        number: u32,
        level: PromptLevel,
    ) -> Result<(), CollectionError> {
        let trial = self.trial_mut(number)?;
        if trial.response != TrialResponse::Prompted {
            return Err(CollectionError::InvalidTransition(format!(
                "trial {} is {:?}, only prompted trials take a prompt level",
                number, trial.response
            )));
        }

        trial.prompt_level = Some(level);
        trial.timestamp = Utc::now();
        Ok(())
    }

    /// Trial numbers still waiting for a prompt level
    pub fn pending_prompt_levels(&self) -> Vec<u32> {
        self.trials
            .iter()
            .filter(|t| t.needs_prompt_level())
            .map(|t| t.number)
            .collect()
    }

    pub fn summary(&self) -> TrialSummary {
        Aggregator::trials(&self.trials)
    }

    pub fn record(&self) -> PercentageRecord {
        PercentageRecord {
            phase: self.phase,
            trials: self.trials.clone(),
        }
    }
}

impl Recorder for PercentageRecorder {
    fn dimension(&self) -> MeasurementDimension {
        MeasurementDimension::Percentage
    }

    fn check_complete(&self) -> Result<(), CollectionError> {
        check_trials(&self.trials, self.require_prompt_level)
    }

    fn snapshot(&self) -> SessionData {
        SessionData::Percentage(self.record())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn recorder(count: u32) -> PercentageRecorder {
        PercentageRecorder::new(&RecorderConfig::default(), count, Phase::Treatment).unwrap()
    }

    #[test]
    fn test_configure_allocates_no_response_trials() {
        let rec = recorder(5);
        assert_eq!(rec.trials().len(), 5);
        assert!(rec
            .trials()
            .iter()
            .all(|t| t.response == TrialResponse::NoResponse));
        assert_eq!(rec.trials()[4].number, 5);
    }

    #[test]
    fn test_trial_count_out_of_range() {
        let config = RecorderConfig::default();
        assert!(PercentageRecorder::new(&config, 2, Phase::Baseline).is_err());
        assert!(PercentageRecorder::new(&config, 11, Phase::Baseline).is_err());
    }

    #[test]
    fn test_cycling_away_from_prompted_clears_level() {
        let mut rec = recorder(3);
        assert_eq!(rec.cycle_response(1).unwrap(), TrialResponse::Independent);
        assert_eq!(rec.cycle_response(1).unwrap(), TrialResponse::Prompted);
        rec.set_prompt_level(1, PromptLevel::VerbalFull).unwrap();
        assert_eq!(rec.trials()[0].prompt_level, Some(PromptLevel::VerbalFull));

        assert_eq!(rec.cycle_response(1).unwrap(), TrialResponse::Error);
        assert_eq!(rec.trials()[0].prompt_level, None);
    }

    #[test]
    fn test_prompt_level_requires_prompted() {
        let mut rec = recorder(3);
        rec.cycle_response(2).unwrap();
        assert!(matches!(
            rec.set_prompt_level(2, PromptLevel::Gestural),
            Err(CollectionError::InvalidTransition(_))
        ));
    }

    #[test]
    fn test_finalize_blocked_until_prompt_level_set() {
        let mut rec = recorder(3);
        rec.cycle_response(1).unwrap();
        rec.cycle_response(1).unwrap();

        assert_eq!(rec.pending_prompt_levels(), vec![1]);
        assert!(matches!(
            rec.check_complete(),
            Err(CollectionError::MissingPromptLevel(1))
        ));

        rec.set_prompt_level(1, PromptLevel::Model).unwrap();
        assert!(rec.check_complete().is_ok());
    }

    #[test]
    fn test_not_required_when_configured_off() {
        let config = RecorderConfig {
            require_prompt_level: false,
            ..Default::default()
        };
        let mut rec = PercentageRecorder::new(&config, 3, Phase::Treatment).unwrap();
        rec.cycle_response(1).unwrap();
        rec.cycle_response(1).unwrap();
        assert!(rec.check_complete().is_ok());
    }

    #[test]
    fn test_summary() {
        let mut rec = recorder(4);
        // trial 1 independent, 2 prompted, 3 error, 4 untouched
        rec.cycle_response(1).unwrap();
        rec.cycle_response(2).unwrap();
        rec.cycle_response(2).unwrap();
        for _ in 0..3 {
            rec.cycle_response(3).unwrap();
        }

        let summary = rec.summary();
        assert_eq!(summary.independent_count, 1);
        assert_eq!(summary.prompted_count, 1);
        assert_eq!(summary.error_count, 1);
        assert_eq!(summary.no_response_count, 1);
        assert_eq!(summary.percentage_correct, 25);
    }

    #[test]
    fn test_unknown_trial() {
        let mut rec = recorder(3);
        assert!(matches!(
            rec.cycle_response(9),
            Err(CollectionError::UnknownTrial(9))
        ));
    }
}
