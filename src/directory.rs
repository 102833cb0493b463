//! Student folders and the therapy team
//!
//! Students and team members are plain records behind the [`Repository`]
//! seam. [`Directory`] answers the queries the case and team screens need:
//! member search, caseloads and therapist assignment.

use crate::error::CollectionError;
use crate::repository::{Entity, Repository};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Role of a team member
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MemberRole {
    Admin,
    Supervisor,
    Therapist,
}

impl MemberRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            MemberRole::Admin => "admin",
            MemberRole::Supervisor => "supervisor",
            MemberRole::Therapist => "therapist",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            MemberRole::Admin => "Administrador",
            MemberRole::Supervisor => "Supervisor",
            MemberRole::Therapist => "Terapeuta",
        }
    }

    /// Whether members with this role can be assigned a caseload
    pub fn takes_cases(&self) -> bool {
        matches!(self, MemberRole::Therapist | MemberRole::Supervisor)
    }
}

/// A professional on the team
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TeamMember {
    pub id: String,
    pub name: String,
    /// Certification, e.g. BCBA or RBT
    pub profession: String,
    pub title: String,
    pub description: String,
    pub role: MemberRole,
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    pub joined_date: NaiveDate,
}

impl TeamMember {
    /// Case-insensitive match on name, profession or email. An empty query
    /// matches everyone.
    pub fn matches(&self, query: &str) -> bool {
        let query = query.trim().to_lowercase();
        query.is_empty()
            || [&self.name, &self.profession, &self.email]
                .iter()
                .any(|field| field.to_lowercase().contains(&query))
    }
}

impl Entity for TeamMember {
    fn id(&self) -> &str {
        &self.id
    }
}

/// Filter members by free-text query and optional role, keeping input order
pub fn search_members(
    members: &[TeamMember],
    query: &str,
    role: Option<MemberRole>,
) -> Vec<TeamMember> {
    members
        .iter()
        .filter(|m| m.matches(query))
        .filter(|m| role.map_or(true, |r| m.role == r))
        .cloned()
        .collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StudentStatus {
    #[default]
    Active,
    Inactive,
}

/// Family contact on a student folder
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FamilyMember {
    pub id: String,
    pub name: String,
    pub relationship: String,
    pub phone: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    pub is_primary_contact: bool,
}

/// A student's case folder
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Student {
    pub id: String,
    pub full_name: String,
    pub identity_number: String,
    pub date_of_birth: NaiveDate,
    pub diagnosis: String,
    pub consultation_reason: String,
    pub has_active_session: bool,
    pub family_access_enabled: bool,
    #[serde(default)]
    pub family_members: Vec<FamilyMember>,
    pub registration_date: NaiveDate,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_session_date: Option<NaiveDate>,
    /// Team member id
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assigned_therapist: Option<String>,
    #[serde(default)]
    pub status: StudentStatus,
}

impl Student {
    /// Age in whole years on `date`; 0 before the date of birth
    pub fn age_on(&self, date: NaiveDate) -> u32 {
        date.years_since(self.date_of_birth).unwrap_or(0)
    }

    pub fn primary_contact(&self) -> Option<&FamilyMember> {
        self.family_members.iter().find(|f| f.is_primary_contact)
    }
}

impl Entity for Student {
    fn id(&self) -> &str {
        &self.id
    }
}

/// Students and team members over two repositories
pub struct Directory<S, M> {
    students: S,
    members: M,
}

impl<S, M> Directory<S, M>
where
    S: Repository<Student>,
    M: Repository<TeamMember>,
{
    pub fn new(students: S, members: M) -> Self {
        Self { students, members }
    }

    pub fn students(&self) -> &S {
        &self.students
    }

    pub fn members(&self) -> &M {
        &self.members
    }

    pub fn student(&self, id: &str) -> Result<Student, CollectionError> {
        self.students.require(id)
    }

    pub fn member(&self, id: &str) -> Result<TeamMember, CollectionError> {
        self.members.require(id)
    }

    /// Members matching `query` and, if given, `role`, ordered by name
    pub fn search_members(
        &self,
        query: &str,
        role: Option<MemberRole>,
    ) -> Result<Vec<TeamMember>, CollectionError> {
        let mut found = search_members(&self.members.list()?, query, role);
        found.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(found)
    }

    /// Active students assigned to one member
    pub fn caseload(&self, member_id: &str) -> Result<Vec<Student>, CollectionError> {
        Ok(self
            .students
            .list()?
            .into_iter()
            .filter(|s| s.status == StudentStatus::Active)
            .filter(|s| s.assigned_therapist.as_deref() == Some(member_id))
            .collect())
    }

    /// Assign a student to a therapist or supervisor
    pub fn assign_therapist(
        &mut self,
        student_id: &str,
        member_id: &str,
    ) -> Result<Student, CollectionError> {
        let member = self.members.require(member_id)?;
        if !member.role.takes_cases() {
            return Err(CollectionError::InvalidTransition(format!(
                "{} ({}) cannot hold a caseload",
                member.name,
                member.role.as_str()
            )));
        }

        let mut student = self.students.require(student_id)?;
        student.assigned_therapist = Some(member.id.clone());
        self.students.upsert(student.clone())?;

        tracing::info!(student_id, member_id, "Therapist assigned");
        Ok(student)
    }

    /// Replace a member's editable profile fields. Id, role and join date are kept.
    pub fn update_member(
        &mut self,
        member_id: &str,
        profile: TeamMember,
    ) -> Result<TeamMember, CollectionError> {
        let current = self.members.require(member_id)?;
        let updated = TeamMember {
            id: current.id,
            role: current.role,
            joined_date: current.joined_date,
            ..profile
        };
        self.members.upsert(updated.clone())?;
        tracing::debug!(member_id, "Team member updated");
        Ok(updated)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::{seed_students, seed_team};
    use crate::repository::InMemoryRepository;
    use pretty_assertions::assert_eq;

    type SeedDirectory = Directory<InMemoryRepository<Student>, InMemoryRepository<TeamMember>>;

    fn directory() -> SeedDirectory {
        Directory::new(
            InMemoryRepository::with_records(seed_students()),
            InMemoryRepository::with_records(seed_team()),
        )
    }

    fn names(members: &[TeamMember]) -> Vec<&str> {
        members.iter().map(|m| m.name.as_str()).collect()
    }

    #[test]
    fn test_search_by_text_and_role() {
        let team = seed_team();

        let rbt = search_members(&team, "rbt", None);
        assert_eq!(
            names(&rbt),
            vec!["María González", "Ana Martínez", "Luis Torres", "Jorge Vargas"]
        );

        let by_email = search_members(&team, "CARLOS.RAMIREZ@", None);
        assert_eq!(names(&by_email), vec!["Carlos Ramírez"]);

        assert_eq!(search_members(&team, "", None).len(), team.len());
        assert_eq!(search_members(&team, "  ", Some(MemberRole::Therapist)).len(), 6);
        assert_eq!(
            names(&search_members(&team, "bcba", Some(MemberRole::Admin))),
            vec!["Héctor Dev"]
        );
        assert!(search_members(&team, "bcba", Some(MemberRole::Therapist)).is_empty());
    }

    #[test]
    fn test_directory_search_sorted_by_name() {
        let found = directory()
            .search_members("bcaba", Some(MemberRole::Therapist))
            .unwrap();
        assert_eq!(names(&found), vec!["Carlos Ramírez", "Patricia Silva"]);
    }

    #[test]
    fn test_caseload_and_assignment() {
        let mut dir = directory();
        let caseload = dir.caseload("ther-001").unwrap();
        assert_eq!(caseload.len(), 1);
        assert_eq!(caseload[0].id, "std-001");

        let student = dir.assign_therapist("std-002", "ther-001").unwrap();
        assert_eq!(student.assigned_therapist.as_deref(), Some("ther-001"));
        assert_eq!(dir.caseload("ther-001").unwrap().len(), 2);
        assert!(dir.caseload("ther-002").unwrap().is_empty());

        assert!(matches!(
            dir.assign_therapist("std-002", "sup-001"),
            Err(CollectionError::InvalidTransition(_))
        ));
        assert!(matches!(
            dir.assign_therapist("std-404", "ther-001"),
            Err(CollectionError::NotFound(_))
        ));
        assert!(matches!(
            dir.assign_therapist("std-001", "ther-404"),
            Err(CollectionError::NotFound(_))
        ));
    }

    #[test]
    fn test_update_member_keeps_identity() {
        let mut dir = directory();
        let mut profile = dir.member("ther-003").unwrap();
        profile.id = "other".to_string();
        profile.role = MemberRole::Admin;
        profile.title = "Coordinadora".to_string();

        let updated = dir.update_member("ther-003", profile).unwrap();
        assert_eq!(updated.id, "ther-003");
        assert_eq!(updated.role, MemberRole::Therapist);
        assert_eq!(dir.member("ther-003").unwrap().title, "Coordinadora");
        assert!(dir.members().get("other").unwrap().is_none());
    }

    #[test]
    fn test_student_age_and_contact() {
        let student = directory().student("std-001").unwrap();
        let on = NaiveDate::from_ymd_opt(2026, 1, 23).unwrap();
        assert_eq!(student.age_on(on), 7);
        assert_eq!(
            student.age_on(NaiveDate::from_ymd_opt(2026, 3, 15).unwrap()),
            8
        );
        assert_eq!(student.age_on(NaiveDate::from_ymd_opt(2010, 1, 1).unwrap()), 0);
        assert_eq!(student.primary_contact().unwrap().relationship, "Madre");
    }

    #[test]
    fn test_wire_format() {
        let student = serde_json::to_value(&directory().student("std-003").unwrap()).unwrap();
        assert_eq!(student["fullName"], "Mateo López Fernández");
        assert_eq!(student["dateOfBirth"], "2017-11-08");
        assert_eq!(student["assignedTherapist"], "ther-003");
        assert_eq!(student["status"], "active");

        let member = serde_json::to_value(&directory().member("sup-001").unwrap()).unwrap();
        assert_eq!(member["role"], "admin");
        assert_eq!(member["joinedDate"], "2020-01-15");
    }
}
