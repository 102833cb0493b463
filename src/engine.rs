//! Collection engine
//!
//! Orchestrates one data collection session around a recorder:
//!
//! 1. `open` - load the program and configure a recorder for the chosen dimension
//! 2. record - the caller drives the recorder and its timer
//! 3. `save` - write a draft, validate completeness, finalize, persist, drop the draft
//! 4. `cancel` - stop timers and optionally discard the draft
//!
//! A rejected save leaves the session open and its draft in place.

use crate::config::Config;
use crate::drafts::{DraftStore, SessionDraft};
use crate::error::CollectionError;
use crate::recorder::{ActiveRecorder, Recorder, RecorderSetup};
use crate::repository::ClinicalStore;
use crate::session::{DataCollectionSession, SessionData};
use crate::types::SessionStatus;
use chrono::{DateTime, Utc};

/// A session being recorded
#[derive(Debug, Clone)]
pub struct OpenSession {
    pub id: String,
    pub program_id: String,
    pub program_name: String,
    pub student_id: String,
    pub therapist_id: Option<String>,
    pub started_at: DateTime<Utc>,
    pub recorder: ActiveRecorder,
    pub notes: Option<String>,
}

impl OpenSession {
    fn draft(&self, now: DateTime<Utc>) -> SessionDraft {
        SessionDraft {
            program_id: self.program_id.clone(),
            program_name: self.program_name.clone(),
            dimension: self.recorder.dimension(),
            data: self.recorder.snapshot(),
            started_at: Some(self.started_at),
            timestamp: now,
        }
    }

    fn finish(&self, status: SessionStatus, now: DateTime<Utc>) -> DataCollectionSession {
        let mut record = self.recorder.snapshot();
        if let SessionData::Frequency(r) = &mut record {
            r.end_time = Some(now);
        }

        DataCollectionSession {
            id: self.id.clone(),
            student_id: self.student_id.clone(),
            program_id: self.program_id.clone(),
            therapist_id: self.therapist_id.clone(),
            dimension: self.recorder.dimension(),
            start_time: self.started_at,
            end_time: Some(now),
            status,
            record,
            notes: self.notes.clone(),
        }
    }
}

/// A save that did not commit, carrying the still-open session
#[derive(Debug, thiserror::Error)]
#[error("Save rejected: {error}")]
pub struct RejectedSave {
    pub session: Box<OpenSession>,
    #[source]
    pub error: CollectionError,
}

impl RejectedSave {
    pub fn into_parts(self) -> (OpenSession, CollectionError) {
        (*self.session, self.error)
    }
}

/// Stateful engine over a clinical store and a draft store
pub struct CollectionEngine<S, D> {
    config: Config,
    store: S,
    drafts: D,
}

impl<S: ClinicalStore, D: DraftStore> CollectionEngine<S, D> {
    pub fn new(config: Config, store: S, drafts: D) -> Self {
        Self {
            config,
            store,
            drafts,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn drafts(&self) -> &D {
        &self.drafts
    }

    /// Open a session for a program.
    ///
    /// # Arguments
    /// * `program_id` - Program to record against
    /// * `setup` - Recorder setup; the program's default dimension when `None`
    /// * `therapist_id` - Therapist running the session, if known
    pub fn open(
        &self,
        program_id: &str,
        setup: Option<RecorderSetup>,
        therapist_id: Option<&str>,
    ) -> Result<OpenSession, CollectionError> {
        let program = self.store.load_program(program_id)?;
        let setup =
            setup.unwrap_or_else(|| RecorderSetup::for_dimension(program.default_dimension()));
        let recorder = ActiveRecorder::configure(&setup, &self.config.recorder)?;

        let session = OpenSession {
            id: format!("sess-{}", uuid::Uuid::new_v4()),
            program_id: program.id().to_string(),
            program_name: program.name().to_string(),
            student_id: program.student_id().to_string(),
            therapist_id: therapist_id.map(str::to_string),
            started_at: Utc::now(),
            recorder,
            notes: None,
        };

        tracing::info!(
            session_id = %session.id,
            program_id,
            dimension = setup.dimension().as_str(),
            "Session opened"
        );
        Ok(session)
    }

    /// Draft left behind by an earlier save attempt or cancel
    pub fn pending_draft(&self, program_id: &str) -> Result<Option<SessionDraft>, CollectionError> {
        self.drafts.get_draft(program_id)
    }

    /// Reopen a session from its draft, if one exists
    pub fn resume(
        &self,
        program_id: &str,
        therapist_id: Option<&str>,
    ) -> Result<Option<OpenSession>, CollectionError> {
        let Some(draft) = self.drafts.get_draft(program_id)? else {
            return Ok(None);
        };
        let program = self.store.load_program(program_id)?;
        let recorder = ActiveRecorder::restore(draft.data, &self.config.recorder)?;

        let session = OpenSession {
            id: format!("sess-{}", uuid::Uuid::new_v4()),
            program_id: program.id().to_string(),
            program_name: draft.program_name,
            student_id: program.student_id().to_string(),
            therapist_id: therapist_id.map(str::to_string),
            started_at: draft.started_at.unwrap_or(draft.timestamp),
            recorder,
            notes: None,
        };

        tracing::info!(session_id = %session.id, program_id, "Session resumed from draft");
        Ok(Some(session))
    }

    /// Finalize and persist a session.
    ///
    /// The draft is written first. On success the session is consumed, so a
    /// committed record can no longer be edited through its recorder. If the
    /// session is incomplete or cannot be stored, the session is handed back
    /// inside [`RejectedSave`] and the draft is kept.
    pub fn save(&mut self, mut session: OpenSession) -> Result<DataCollectionSession, RejectedSave> {
        match self.commit(&mut session) {
            Ok(record) => Ok(record),
            Err(error) => {
                tracing::warn!(session_id = %session.id, error = %error, "Save rejected; draft kept");
                Err(RejectedSave {
                    session: Box::new(session),
                    error,
                })
            }
        }
    }

    fn commit(&mut self, session: &mut OpenSession) -> Result<DataCollectionSession, CollectionError> {
        let now = Utc::now();
        self.drafts.put_draft(&session.draft(now))?;
        session.recorder.check_complete()?;

        session.recorder.stop();
        let record = session.finish(SessionStatus::Completed, now);
        self.store.persist_session(record.clone())?;

        // The record is committed; a stale draft is only a resume hint
        if let Err(e) = self.drafts.remove_draft(&session.program_id) {
            tracing::warn!(session_id = %record.id, error = %e, "Draft not removed after commit");
        }

        tracing::info!(
            session_id = %record.id,
            program_id = %record.program_id,
            value = ?record.summary().primary_value(),
            "Session committed"
        );
        Ok(record)
    }

    /// Abandon a session. The returned record is not persisted.
    pub fn cancel(
        &mut self,
        mut session: OpenSession,
        discard_draft: bool,
    ) -> Result<DataCollectionSession, CollectionError> {
        session.recorder.stop();
        if discard_draft {
            self.drafts.remove_draft(&session.program_id)?;
        }

        tracing::info!(session_id = %session.id, discard_draft, "Session cancelled");
        Ok(session.finish(SessionStatus::Cancelled, Utc::now()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::drafts::MemoryDraftStore;
    use crate::logging;
    use crate::mock::seed_programs;
    use crate::repository::{InMemoryStore, Repository};
    use crate::session::SessionSummary;
    use crate::types::{MeasurementDimension, PromptLevel, TrialResponse};

    fn engine() -> CollectionEngine<InMemoryStore, MemoryDraftStore> {
        logging::init_test();
        CollectionEngine::new(
            Config::default(),
            InMemoryStore::with_programs(seed_programs()),
            MemoryDraftStore::new(),
        )
    }

    fn three_trials() -> RecorderSetup {
        RecorderSetup::Percentage {
            trials: Some(3),
            phase: Default::default(),
        }
    }

    #[test]
    fn test_open_uses_program_default_dimension() {
        let engine = engine();
        let skill = engine.open("prog-001", None, Some("ther-001")).unwrap();
        assert_eq!(skill.recorder.dimension(), MeasurementDimension::Percentage);
        assert_eq!(skill.program_name, "Contacto Visual");
        assert_eq!(skill.student_id, "std-001");

        let behavior = engine.open("prog-005", None, None).unwrap();
        assert_eq!(behavior.recorder.dimension(), MeasurementDimension::Frequency);

        assert!(matches!(
            engine.open("prog-999", None, None),
            Err(CollectionError::NotFound(_))
        ));
    }

    #[test]
    fn test_rejected_save_keeps_draft() {
        let mut engine = engine();
        let mut session = engine.open("prog-001", Some(three_trials()), None).unwrap();
        let trials = session.recorder.as_percentage_mut().unwrap();
        trials.cycle_response(1).unwrap();
        trials.cycle_response(2).unwrap();
        trials.cycle_response(2).unwrap();

        let rejected = engine.save(session).unwrap_err();
        assert!(matches!(rejected.error, CollectionError::MissingPromptLevel(2)));
        let draft = engine.pending_draft("prog-001").unwrap().unwrap();
        assert_eq!(draft.program_name, "Contacto Visual");
        assert!(engine.store().sessions.is_empty());

        let (mut session, _) = rejected.into_parts();
        session
            .recorder
            .as_percentage_mut()
            .unwrap()
            .set_prompt_level(2, PromptLevel::Gestural)
            .unwrap();
        let record = engine.save(session).unwrap();

        assert_eq!(record.status, SessionStatus::Completed);
        assert!(engine.pending_draft("prog-001").unwrap().is_none());
        assert_eq!(engine.store().sessions.len(), 1);
        match record.summary() {
            SessionSummary::Percentage(s) => {
                assert_eq!(s.independent_count, 1);
                assert_eq!(s.prompted_count, 1);
                assert_eq!(s.percentage_correct, 33);
            }
            other => panic!("unexpected summary {:?}", other),
        }
        let stored = engine.store().load_trials(&record.id).unwrap();
        assert_eq!(stored[1].response, TrialResponse::Prompted);
    }

    #[test]
    fn test_committed_session_cannot_be_saved_again() {
        let mut engine = engine();
        let mut session = engine.open("prog-001", Some(three_trials()), None).unwrap();
        session.recorder.as_percentage_mut().unwrap().cycle_response(1).unwrap();

        // Keep a copy of the open session to attempt an edit after commit
        let mut stale = session.clone();
        let record = engine.save(session).unwrap();
        assert_eq!(record.summary().primary_value(), Some(33.0));

        stale.recorder.as_percentage_mut().unwrap().cycle_response(2).unwrap();
        let rejected = engine.save(stale).unwrap_err();
        assert!(matches!(rejected.error, CollectionError::InvalidTransition(_)));

        let stored = engine.store().sessions.require(&record.id).unwrap();
        assert_eq!(stored, record);
        assert_eq!(stored.summary().primary_value(), Some(33.0));
    }

    #[test]
    fn test_frequency_session_commit() {
        let mut engine = engine();
        let mut session = engine.open("prog-005", None, Some("ther-002")).unwrap();
        {
            let freq = session.recorder.as_frequency_mut().unwrap();
            freq.toggle_timer();
            for _ in 0..60 {
                freq.tick();
            }
            freq.increment();
            freq.increment();
        }

        let record = engine.save(session).unwrap();
        match &record.record {
            SessionData::Frequency(r) => {
                assert_eq!(r.events.len(), 2);
                assert_eq!(r.duration, 60);
                assert!(r.end_time.is_some());
            }
            other => panic!("unexpected record {:?}", other),
        }
        assert_eq!(record.summary().primary_value(), Some(2.0));
        assert_eq!(record.therapist_id.as_deref(), Some("ther-002"));
    }

    #[test]
    fn test_cancel_with_and_without_discard() {
        let mut engine = engine();
        let session = engine.open("prog-002", None, None).unwrap();
        assert!(engine.save(session).is_ok());

        // Leave a draft behind through a rejected interval save
        let setup = RecorderSetup::for_dimension(MeasurementDimension::Interval);
        let interval = engine.open("prog-006", Some(setup), None).unwrap();
        let (interval, _) = engine.save(interval).unwrap_err().into_parts();

        let cancelled = engine.cancel(interval.clone(), false).unwrap();
        assert_eq!(cancelled.status, SessionStatus::Cancelled);
        assert!(engine.pending_draft("prog-006").unwrap().is_some());

        engine.cancel(interval, true).unwrap();
        assert!(engine.pending_draft("prog-006").unwrap().is_none());
        assert_eq!(engine.store().sessions.list().unwrap().len(), 1);
    }

    #[test]
    fn test_resume_from_draft() {
        let mut engine = engine();
        assert!(engine.resume("prog-006", None).unwrap().is_none());

        let setup = RecorderSetup::Interval {
            interval_type: Default::default(),
            intervals: Some(5),
            interval_secs: Some(10),
        };
        let mut session = engine.open("prog-006", Some(setup), None).unwrap();
        let opened_at = session.started_at;
        {
            let interval = session.recorder.as_interval_mut().unwrap();
            interval.record_interval(1, Some(true)).unwrap();
            interval.record_interval(2, Some(true)).unwrap();
        }
        assert!(engine.save(session).is_err());

        let mut resumed = engine.resume("prog-006", Some("ther-001")).unwrap().unwrap();
        assert_eq!(resumed.started_at, opened_at);
        {
            let interval = resumed.recorder.as_interval_mut().unwrap();
            assert_eq!(interval.current_interval(), 3);
            for n in 3..=5 {
                interval.record_interval(n, Some(false)).unwrap();
            }
        }
        let record = engine.save(resumed).unwrap();
        assert_eq!(record.summary().primary_value(), Some(40.0));
        assert_eq!(record.start_time, opened_at);
    }
}
