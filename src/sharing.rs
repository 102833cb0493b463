//! Folder sharing between supervisors and professionals
//!
//! A supervisor shares a student folder by inviting a professional by email.
//! Each invitation moves from pending to accepted or rejected exactly once.
//! A rejected invitation can be resent, which replaces it with a fresh pending
//! one.

use crate::error::CollectionError;
use crate::repository::{Entity, Repository};
use chrono::{DateTime, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AccessLevel {
    /// View and edit everything
    Full,
    ReadOnly,
    /// Limited to the student's programs
    ProgramsOnly,
}

impl AccessLevel {
    pub const ALL: [AccessLevel; 3] = [
        AccessLevel::Full,
        AccessLevel::ReadOnly,
        AccessLevel::ProgramsOnly,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            AccessLevel::Full => "full",
            AccessLevel::ReadOnly => "read-only",
            AccessLevel::ProgramsOnly => "programs-only",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InvitationStatus {
    Pending,
    Accepted,
    Rejected,
}

impl InvitationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            InvitationStatus::Pending => "pending",
            InvitationStatus::Accepted => "accepted",
            InvitationStatus::Rejected => "rejected",
        }
    }
}

/// An invitation granting a professional access to a student folder
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SharedAccess {
    pub id: String,
    /// Supervisor id
    pub shared_by: String,
    /// Professional email
    pub shared_with: String,
    pub student_id: String,
    pub student_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub professional_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub professional_title: Option<String>,
    pub shared_date: DateTime<Utc>,
    pub access_level: AccessLevel,
    pub status: InvitationStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl SharedAccess {
    pub fn accept(&mut self) -> Result<(), CollectionError> {
        self.respond(InvitationStatus::Accepted)
    }

    pub fn reject(&mut self) -> Result<(), CollectionError> {
        self.respond(InvitationStatus::Rejected)
    }

    fn respond(&mut self, to: InvitationStatus) -> Result<(), CollectionError> {
        if self.status != InvitationStatus::Pending {
            return Err(CollectionError::InvalidTransition(format!(
                "invitation {} is already {}",
                self.id,
                self.status.as_str()
            )));
        }
        self.status = to;
        Ok(())
    }

    fn is_for(&self, email: &str, student_id: &str) -> bool {
        self.student_id == student_id && self.shared_with.eq_ignore_ascii_case(email)
    }
}

impl Entity for SharedAccess {
    fn id(&self) -> &str {
        &self.id
    }
}

/// What a supervisor fills in to share a folder
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShareRequest {
    pub shared_by: String,
    pub shared_with: String,
    pub student_id: String,
    pub student_name: String,
    pub access_level: AccessLevel,
    #[serde(default)]
    pub professional_name: Option<String>,
    #[serde(default)]
    pub professional_title: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

fn email_pattern() -> &'static Regex {
    static EMAIL_RE: OnceLock<Regex> = OnceLock::new();
    EMAIL_RE.get_or_init(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("valid email pattern"))
}

/// Check an email address is present and well formed
pub fn validate_email(email: &str) -> Result<(), CollectionError> {
    if email.trim().is_empty() {
        return Err(CollectionError::InvalidEmail(
            "professional email is required".to_string(),
        ));
    }
    if !email_pattern().is_match(email) {
        return Err(CollectionError::InvalidEmail(format!(
            "'{}' is not a valid email address",
            email
        )));
    }
    Ok(())
}

/// Invitation workflow over a repository of invitations
pub struct SharingService<R> {
    repo: R,
}

impl<R: Repository<SharedAccess>> SharingService<R> {
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    pub fn repository(&self) -> &R {
        &self.repo
    }

    pub fn into_inner(self) -> R {
        self.repo
    }

    /// Invite a professional, refusing duplicates for the same student
    pub fn share(
        &mut self,
        request: ShareRequest,
        now: DateTime<Utc>,
    ) -> Result<SharedAccess, CollectionError> {
        validate_email(&request.shared_with)?;

        let existing = self
            .repo
            .list()?
            .into_iter()
            .find(|inv| inv.is_for(&request.shared_with, &request.student_id));

        if let Some(existing) = existing {
            let reason = match existing.status {
                InvitationStatus::Pending => format!(
                    "a pending invitation for {} already exists",
                    request.shared_with
                ),
                InvitationStatus::Accepted => {
                    format!("{} already has access to this folder", request.shared_with)
                }
                InvitationStatus::Rejected => format!(
                    "{} rejected invitation {} previously; resend it instead",
                    request.shared_with, existing.id
                ),
            };
            tracing::warn!(invitation_id = %existing.id, status = existing.status.as_str(), "Duplicate share refused");
            return Err(CollectionError::DuplicateInvitation(reason));
        }

        let invitation = SharedAccess {
            id: format!("inv-{}", uuid::Uuid::new_v4()),
            shared_by: request.shared_by,
            shared_with: request.shared_with,
            student_id: request.student_id,
            student_name: request.student_name,
            professional_name: request.professional_name,
            professional_title: request.professional_title,
            shared_date: now,
            access_level: request.access_level,
            status: InvitationStatus::Pending,
            message: request.message,
        };

        self.repo.upsert(invitation.clone())?;
        tracing::info!(
            invitation_id = %invitation.id,
            student_id = %invitation.student_id,
            access_level = invitation.access_level.as_str(),
            "Folder shared"
        );
        Ok(invitation)
    }

    pub fn accept(&mut self, id: &str) -> Result<SharedAccess, CollectionError> {
        self.update(id, |inv| inv.accept())
    }

    pub fn reject(&mut self, id: &str) -> Result<SharedAccess, CollectionError> {
        self.update(id, |inv| inv.reject())
    }

    /// Replace a rejected invitation with a new pending one
    pub fn resend(&mut self, id: &str, now: DateTime<Utc>) -> Result<SharedAccess, CollectionError> {
        let old = self.repo.require(id)?;
        if old.status != InvitationStatus::Rejected {
            return Err(CollectionError::InvalidTransition(format!(
                "only rejected invitations can be resent; {} is {}",
                id,
                old.status.as_str()
            )));
        }

        let invitation = SharedAccess {
            id: format!("inv-{}", uuid::Uuid::new_v4()),
            shared_date: now,
            status: InvitationStatus::Pending,
            ..old
        };

        self.repo.delete(id)?;
        self.repo.upsert(invitation.clone())?;
        tracing::info!(old_id = %id, invitation_id = %invitation.id, "Invitation resent");
        Ok(invitation)
    }

    pub fn change_access_level(
        &mut self,
        id: &str,
        level: AccessLevel,
    ) -> Result<SharedAccess, CollectionError> {
        self.update(id, |inv| {
            if inv.status == InvitationStatus::Rejected {
                return Err(CollectionError::InvalidTransition(format!(
                    "invitation {} was rejected",
                    inv.id
                )));
            }
            inv.access_level = level;
            Ok(())
        })
    }

    /// Cancel a pending invitation or revoke granted access
    pub fn revoke(&mut self, id: &str) -> Result<SharedAccess, CollectionError> {
        let removed = self
            .repo
            .delete(id)?
            .ok_or_else(|| CollectionError::NotFound(id.to_string()))?;
        tracing::info!(invitation_id = %id, status = removed.status.as_str(), "Access revoked");
        Ok(removed)
    }

    /// Invitations waiting on a professional, newest first
    pub fn pending_for(&self, email: &str) -> Result<Vec<SharedAccess>, CollectionError> {
        self.filtered(|inv| {
            inv.status == InvitationStatus::Pending && inv.shared_with.eq_ignore_ascii_case(email)
        })
    }

    /// Professionals with access to a student folder, newest first
    pub fn active_for(&self, student_id: &str) -> Result<Vec<SharedAccess>, CollectionError> {
        self.filtered(|inv| {
            inv.status == InvitationStatus::Accepted && inv.student_id == student_id
        })
    }

    /// Every invitation sent by a supervisor, newest first
    pub fn sent_by(&self, supervisor_id: &str) -> Result<Vec<SharedAccess>, CollectionError> {
        self.filtered(|inv| inv.shared_by == supervisor_id)
    }

    fn filtered(
        &self,
        keep: impl Fn(&SharedAccess) -> bool,
    ) -> Result<Vec<SharedAccess>, CollectionError> {
        let mut out: Vec<_> = self.repo.list()?.into_iter().filter(|i| keep(i)).collect();
        out.sort_by(|a, b| b.shared_date.cmp(&a.shared_date));
        Ok(out)
    }

    fn update(
        &mut self,
        id: &str,
        change: impl FnOnce(&mut SharedAccess) -> Result<(), CollectionError>,
    ) -> Result<SharedAccess, CollectionError> {
        let mut invitation = self.repo.require(id)?;
        let from = invitation.status;
        change(&mut invitation)?;
        self.repo.upsert(invitation.clone())?;
        tracing::info!(
            invitation_id = %id,
            from = from.as_str(),
            to = invitation.status.as_str(),
            "Invitation updated"
        );
        Ok(invitation)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::InMemoryRepository;
    use chrono::{Duration, TimeZone};

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 2, 1, 12, 0, 0).unwrap()
    }

    fn request(email: &str, student_id: &str) -> ShareRequest {
        ShareRequest {
            shared_by: "sup-001".to_string(),
            shared_with: email.to_string(),
            student_id: student_id.to_string(),
            student_name: "Santiago García Pérez".to_string(),
            access_level: AccessLevel::ReadOnly,
            professional_name: None,
            professional_title: None,
            message: None,
        }
    }

    fn service() -> SharingService<InMemoryRepository<SharedAccess>> {
        SharingService::new(InMemoryRepository::new())
    }

    #[test]
    fn test_email_validation() {
        assert!(validate_email("laura.mendoza@example.com").is_ok());
        assert!(matches!(
            validate_email("  "),
            Err(CollectionError::InvalidEmail(_))
        ));
        assert!(validate_email("laura@example").is_err());
        assert!(validate_email("laura mendoza@example.com").is_err());
    }

    #[test]
    fn test_accept_once() {
        let mut svc = service();
        let inv = svc.share(request("a@example.com", "std-001"), now()).unwrap();
        assert_eq!(inv.status, InvitationStatus::Pending);

        let accepted = svc.accept(&inv.id).unwrap();
        assert_eq!(accepted.status, InvitationStatus::Accepted);

        assert!(matches!(
            svc.reject(&inv.id),
            Err(CollectionError::InvalidTransition(_))
        ));
        assert!(svc.accept(&inv.id).is_err());
        assert_eq!(svc.active_for("std-001").unwrap().len(), 1);
    }

    #[test]
    fn test_duplicates_refused() {
        let mut svc = service();
        let inv = svc.share(request("a@example.com", "std-001"), now()).unwrap();

        // Same professional, different case
        assert!(matches!(
            svc.share(request("A@Example.com", "std-001"), now()),
            Err(CollectionError::DuplicateInvitation(_))
        ));
        // Another student is fine
        assert!(svc.share(request("a@example.com", "std-002"), now()).is_ok());

        svc.accept(&inv.id).unwrap();
        assert!(svc.share(request("a@example.com", "std-001"), now()).is_err());
    }

    #[test]
    fn test_rejected_must_be_resent() {
        let mut svc = service();
        let inv = svc.share(request("a@example.com", "std-001"), now()).unwrap();
        svc.reject(&inv.id).unwrap();

        let err = svc
            .share(request("a@example.com", "std-001"), now())
            .unwrap_err();
        assert!(err.to_string().contains(&inv.id));

        let later = now() + Duration::days(2);
        let resent = svc.resend(&inv.id, later).unwrap();
        assert_ne!(resent.id, inv.id);
        assert_eq!(resent.status, InvitationStatus::Pending);
        assert_eq!(resent.shared_date, later);
        assert!(svc.repository().get(&inv.id).unwrap().is_none());

        // Only rejected invitations can be resent
        assert!(svc.resend(&resent.id, later).is_err());
    }

    #[test]
    fn test_change_access_and_revoke() {
        let mut svc = service();
        let inv = svc.share(request("a@example.com", "std-001"), now()).unwrap();

        let changed = svc.change_access_level(&inv.id, AccessLevel::Full).unwrap();
        assert_eq!(changed.access_level, AccessLevel::Full);

        svc.revoke(&inv.id).unwrap();
        assert!(matches!(
            svc.revoke(&inv.id),
            Err(CollectionError::NotFound(_))
        ));
    }

    #[test]
    fn test_pending_inbox_newest_first() {
        let mut svc = service();
        svc.share(request("a@example.com", "std-001"), now()).unwrap();
        let newer = svc
            .share(request("a@example.com", "std-002"), now() + Duration::hours(1))
            .unwrap();
        svc.share(request("b@example.com", "std-001"), now()).unwrap();

        let inbox = svc.pending_for("a@example.com").unwrap();
        assert_eq!(inbox.len(), 2);
        assert_eq!(inbox[0].id, newer.id);
        assert_eq!(svc.sent_by("sup-001").unwrap().len(), 3);
    }

    #[test]
    fn test_wire_format() {
        let mut svc = service();
        let inv = svc.share(request("a@example.com", "std-001"), now()).unwrap();
        let value = serde_json::to_value(&inv).unwrap();
        assert_eq!(value["accessLevel"], "read-only");
        assert_eq!(value["status"], "pending");
        assert_eq!(value["sharedWith"], "a@example.com");
    }
}
