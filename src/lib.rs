//! Trialflux - On-device compute engine for ABA session data collection
//!
//! Trialflux records in-session observations and turns them into progress
//! analytics through a staged flow: recorder configuration → tick-driven
//! recording → completeness validation → aggregation → finalization →
//! persistence.
//!
//! ## Modules
//!
//! - **Recording**: per-dimension recorders (percentage, frequency, duration,
//!   latency, interval) with countdown and stopwatch timers
//! - **Aggregation**: session summaries and progress KPIs with trend classification
//! - **Engine**: session lifecycle over pluggable program, session and draft stores
//! - **Domain**: programs, student folders, the therapy team and folder-sharing
//!   invitations
//! - **Demo data**: seeded series, programs, students, team and invitations

pub mod aggregate;
pub mod analytics;
pub mod config;
pub mod directory;
pub mod drafts;
pub mod engine;
pub mod error;
pub mod logging;
pub mod mock;
pub mod programs;
pub mod recorder;
pub mod repository;
pub mod session;
pub mod sharing;
pub mod timer;
pub mod types;

pub use aggregate::{Aggregator, TrialSummary};
pub use analytics::{calculate_kpis, DataPoint, KpiStats, Trend, TrendClassifier};
pub use config::Config;
pub use directory::{Directory, MemberRole, Student, TeamMember};
pub use drafts::{DraftStore, FileDraftStore, MemoryDraftStore, SessionDraft};
pub use engine::{CollectionEngine, OpenSession, RejectedSave};
pub use error::CollectionError;
pub use programs::Program;
pub use recorder::{ActiveRecorder, Recorder, RecorderSetup};
pub use repository::{ClinicalStore, InMemoryRepository, InMemoryStore, Repository};
pub use session::{DataCollectionSession, SessionData, SessionSummary};
pub use sharing::{SharedAccess, SharingService};
pub use types::{MeasurementDimension, Phase, PromptLevel, Trial, TrialResponse};

/// Trialflux version
pub const TRIALFLUX_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Name reported by the CLI
pub const PRODUCER_NAME: &str = "trialflux";
