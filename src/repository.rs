//! Storage seams
//!
//! Records are reached through a typed repository trait rather than shared
//! global collections. [`InMemoryRepository`] backs tests, the CLI and the
//! demo store; hosts supply their own implementations.

use crate::error::CollectionError;
use crate::programs::Program;
use crate::session::{DataCollectionSession, SessionData};
use crate::types::Trial;
use std::collections::BTreeMap;

/// A record addressable by a string id
pub trait Entity {
    fn id(&self) -> &str;
}

impl Entity for DataCollectionSession {
    fn id(&self) -> &str {
        &self.id
    }
}

/// Typed CRUD over one kind of record
pub trait Repository<T: Entity> {
    fn get(&self, id: &str) -> Result<Option<T>, CollectionError>;

    /// All records, ordered by id
    fn list(&self) -> Result<Vec<T>, CollectionError>;

    /// Insert or replace by id
    fn upsert(&mut self, record: T) -> Result<(), CollectionError>;

    /// Remove by id, returning the removed record
    fn delete(&mut self, id: &str) -> Result<Option<T>, CollectionError>;

    /// Like `get`, but a missing record is an error
    fn require(&self, id: &str) -> Result<T, CollectionError> {
        self.get(id)?
            .ok_or_else(|| CollectionError::NotFound(id.to_string()))
    }
}

/// Repository held in a sorted map
#[derive(Debug, Clone)]
pub struct InMemoryRepository<T> {
    records: BTreeMap<String, T>,
}

impl<T> Default for InMemoryRepository<T> {
    fn default() -> Self {
        Self {
            records: BTreeMap::new(),
        }
    }
}

impl<T: Entity + Clone> InMemoryRepository<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_records(records: impl IntoIterator<Item = T>) -> Self {
        let records = records
            .into_iter()
            .map(|r| (r.id().to_string(), r))
            .collect();
        Self { records }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

impl<T: Entity + Clone> Repository<T> for InMemoryRepository<T> {
    fn get(&self, id: &str) -> Result<Option<T>, CollectionError> {
        Ok(self.records.get(id).cloned())
    }

    fn list(&self) -> Result<Vec<T>, CollectionError> {
        Ok(self.records.values().cloned().collect())
    }

    fn upsert(&mut self, record: T) -> Result<(), CollectionError> {
        self.records.insert(record.id().to_string(), record);
        Ok(())
    }

    fn delete(&mut self, id: &str) -> Result<Option<T>, CollectionError> {
        Ok(self.records.remove(id))
    }
}

/// Collaborators the collection engine depends on
pub trait ClinicalStore {
    fn load_program(&self, program_id: &str) -> Result<Program, CollectionError>;

    /// Trials of a stored percentage session
    fn load_trials(&self, session_id: &str) -> Result<Vec<Trial>, CollectionError>;

    /// Store a finalized session. Finalized sessions are immutable, so an id
    /// that is already stored is rejected.
    fn persist_session(&mut self, session: DataCollectionSession) -> Result<(), CollectionError>;
}

/// Program and session repositories bundled as a [`ClinicalStore`]
#[derive(Debug, Clone, Default)]
pub struct InMemoryStore {
    pub programs: InMemoryRepository<Program>,
    pub sessions: InMemoryRepository<DataCollectionSession>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_programs(programs: impl IntoIterator<Item = Program>) -> Self {
        Self {
            programs: InMemoryRepository::with_records(programs),
            sessions: InMemoryRepository::new(),
        }
    }

    /// Completed sessions for one program, oldest first
    pub fn sessions_for_program(
        &self,
        program_id: &str,
    ) -> Result<Vec<DataCollectionSession>, CollectionError> {
        let mut sessions: Vec<_> = self
            .sessions
            .list()?
            .into_iter()
            .filter(|s| s.program_id == program_id)
            .collect();
        sessions.sort_by_key(|s| s.start_time);
        Ok(sessions)
    }
}

impl ClinicalStore for InMemoryStore {
    fn load_program(&self, program_id: &str) -> Result<Program, CollectionError> {
        self.programs.require(program_id)
    }

    fn load_trials(&self, session_id: &str) -> Result<Vec<Trial>, CollectionError> {
        let session = self.sessions.require(session_id)?;
        match session.record {
            SessionData::Percentage(record) => Ok(record.trials),
            other => Err(CollectionError::InvalidTransition(format!(
                "session {} records {}, not trials",
                session_id,
                other.dimension().as_str()
            ))),
        }
    }

    fn persist_session(&mut self, session: DataCollectionSession) -> Result<(), CollectionError> {
        if self.sessions.get(&session.id)?.is_some() {
            return Err(CollectionError::InvalidTransition(format!(
                "session {} is already finalized",
                session.id
            )));
        }
        tracing::debug!(session_id = %session.id, program_id = %session.program_id, "Persisting session");
        self.sessions.upsert(session)
    }
}
