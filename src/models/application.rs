use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Application {
    pub id: Uuid,
    pub student_id: Uuid,
    pub job_id: Uuid,
    pub status: String,
    pub cover_letter: Option<String>,
    pub resume_url: Option<String>,
    pub applied_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Interview {
    pub id: Uuid,
    pub application_id: Uuid,
    pub title: String,
    pub scheduled_on: NaiveDate,
    pub start_time: String,
    pub end_time: String,
    pub location: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ApplicationStatus {
    Applied,
    Shortlisted,
    InterviewScheduled,
    Rejected,
    Hired,
}

use ApplicationStatus::*;

/// Every legal (from, to) edge. Same-state entries are idempotent no-ops:
/// re-shortlisting is allowed and re-scheduling replaces the interview.
const ALLOWED_TRANSITIONS: &[(ApplicationStatus, ApplicationStatus)] = &[
    (Applied, Shortlisted),
    (Applied, Rejected),
    (Shortlisted, Shortlisted),
    (Shortlisted, InterviewScheduled),
    (Shortlisted, Rejected),
    (Shortlisted, Hired),
    (InterviewScheduled, InterviewScheduled),
    (InterviewScheduled, Rejected),
    (InterviewScheduled, Hired),
];

impl ApplicationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Applied => "applied",
            Shortlisted => "shortlisted",
            InterviewScheduled => "interview_scheduled",
            Rejected => "rejected",
            Hired => "hired",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "applied" => Some(Applied),
            "shortlisted" => Some(Shortlisted),
            "interview_scheduled" => Some(InterviewScheduled),
            "rejected" => Some(Rejected),
            "hired" => Some(Hired),
            _ => None,
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, Rejected | Hired)
    }

    pub fn can_transition_to(&self, target: ApplicationStatus) -> bool {
        ALLOWED_TRANSITIONS.contains(&(*self, target))
    }

    /// Label shown in the school applicants listing. Shortlisted and
    /// interview-scheduled applications share the "In Progress" bucket;
    /// the raw status is still returned alongside.
    pub fn display_bucket(&self) -> &'static str {
        match self {
            Applied => "Applied",
            Shortlisted | InterviewScheduled => "In Progress",
            Rejected => "Rejected",
            Hired => "Hired",
        }
    }
}

impl std::fmt::Display for ApplicationStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The single transition gate. Both the status-update endpoint and the
/// interview-scheduling endpoint go through here.
pub fn transition(
    current: ApplicationStatus,
    target: ApplicationStatus,
) -> Result<ApplicationStatus, crate::error::Error> {
    if current.can_transition_to(target) {
        Ok(target)
    } else {
        Err(crate::error::Error::BadRequest(format!(
            "Cannot move application from {} to {}",
            current, target
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn forward_path_is_allowed() {
        assert!(transition(Applied, Shortlisted).is_ok());
        assert!(transition(Shortlisted, InterviewScheduled).is_ok());
        assert!(transition(InterviewScheduled, Hired).is_ok());
    }

    #[test]
    fn rejected_is_reachable_from_every_non_terminal_state() {
        for state in [Applied, Shortlisted, InterviewScheduled] {
            assert!(transition(state, Rejected).is_ok(), "{} -> rejected", state);
        }
    }

    #[test]
    fn shortlist_must_precede_interview() {
        assert!(transition(Applied, InterviewScheduled).is_err());
    }

    #[test]
    fn interview_cannot_fall_back_to_shortlisted() {
        assert!(transition(InterviewScheduled, Shortlisted).is_err());
    }

    #[test]
    fn idempotent_resets_are_noops_not_errors() {
        assert!(transition(Shortlisted, Shortlisted).is_ok());
        assert!(transition(InterviewScheduled, InterviewScheduled).is_ok());
    }

    #[test]
    fn terminal_states_accept_nothing() {
        for target in [Applied, Shortlisted, InterviewScheduled, Rejected, Hired] {
            assert!(transition(Rejected, target).is_err());
            assert!(transition(Hired, target).is_err());
        }
    }

    #[test]
    fn status_strings_round_trip() {
        for state in [Applied, Shortlisted, InterviewScheduled, Rejected, Hired] {
            assert_eq!(ApplicationStatus::parse(state.as_str()), Some(state));
        }
        assert_eq!(ApplicationStatus::parse("pending"), None);
    }

    #[test]
    fn display_buckets_collapse_in_progress() {
        assert_eq!(Shortlisted.display_bucket(), "In Progress");
        assert_eq!(InterviewScheduled.display_bucket(), "In Progress");
        assert_eq!(Applied.display_bucket(), "Applied");
    }
}
