//! Request status records and the outcome-to-status transition.

use std::fmt::{Display, Formatter, Result as FmtResult};
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::outcome::{OutcomeCode, ValidationOutcome};

/// Lifecycle state of a validation request. Derived from validator outcomes,
/// never set directly by callers.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "UPPERCASE")]
pub enum StatusKind {
    Pending,
    Complete,
    Error,
}

impl StatusKind {
    /// COMPLETE and ERROR records expect no further transitions and become
    /// retention-sweep candidates once old enough.
    pub fn is_terminal(&self) -> bool {
        matches!(self, StatusKind::Complete | StatusKind::Error)
    }
}

impl Display for StatusKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            StatusKind::Pending => write!(f, "PENDING"),
            StatusKind::Complete => write!(f, "COMPLETE"),
            StatusKind::Error => write!(f, "ERROR"),
        }
    }
}

impl FromStr for StatusKind {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "PENDING" => Ok(StatusKind::Pending),
            "COMPLETE" => Ok(StatusKind::Complete),
            "ERROR" => Ok(StatusKind::Error),
            _ => Err(anyhow::anyhow!("Invalid status: {}", s)),
        }
    }
}

/// One validation request, keyed by file id.
///
/// `created_at` is set at first observation of the file id and preserved by
/// every subsequent write; `updated_at` moves on every write, so
/// `created_at <= updated_at` always holds.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RequestStatus {
    pub file_id: String,
    /// Display name; empty for error records.
    pub file_name: String,
    pub status: StatusKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<ValidationOutcome>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl RequestStatus {
    /// Initial PENDING record written when a file is submitted, before any
    /// validator outcome exists.
    pub fn pending(
        file_id: &str,
        file_name: &str,
        existing: Option<&RequestStatus>,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            file_id: file_id.to_string(),
            file_name: file_name.to_string(),
            status: StatusKind::Pending,
            result: None,
            created_at: created_from(existing, now),
            updated_at: now,
        }
    }

    /// Compute the next record from a raw validator outcome.
    ///
    /// Deterministic given its inputs; `now` is explicit so tests can pin the
    /// clock. The match on the outcome code is exhaustive on purpose.
    pub fn from_outcome(
        file_id: &str,
        outcome: ValidationOutcome,
        file_name: &str,
        existing: Option<&RequestStatus>,
        now: DateTime<Utc>,
    ) -> Self {
        let created_at = created_from(existing, now);
        match outcome.code {
            OutcomeCode::Error => Self {
                file_id: file_id.to_string(),
                file_name: String::new(),
                status: StatusKind::Error,
                result: None,
                created_at,
                updated_at: now,
            },
            OutcomeCode::Ok | OutcomeCode::Failed => Self {
                file_id: file_id.to_string(),
                file_name: file_name.to_string(),
                status: StatusKind::Complete,
                result: Some(outcome),
                created_at,
                updated_at: now,
            },
            OutcomeCode::SentToValidator => Self {
                file_id: file_id.to_string(),
                file_name: file_name.to_string(),
                status: StatusKind::Pending,
                // Provisional result so a poller can observe upstream progress
                result: Some(outcome),
                created_at,
                updated_at: now,
            },
        }
    }

    pub fn is_terminal(&self) -> bool {
        self.status.is_terminal()
    }
}

fn created_from(existing: Option<&RequestStatus>, now: DateTime<Utc>) -> DateTime<Utc> {
    existing.map(|e| e.created_at).unwrap_or(now)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(secs: i64) -> DateTime<Utc> {
        Utc.timestamp_opt(1_700_000_000 + secs, 0).unwrap()
    }

    #[test]
    fn error_outcome_produces_error_record_with_empty_name_and_result() {
        let outcome = ValidationOutcome::with_errors(
            OutcomeCode::Error,
            vec!["validator crashed".to_string()],
        );
        let status = RequestStatus::from_outcome("f1", outcome, "accounts.xhtml", None, at(0));

        assert_eq!(status.status, StatusKind::Error);
        assert!(status.file_name.is_empty());
        assert!(status.result.is_none());
    }

    #[test]
    fn terminal_codes_produce_complete_records_carrying_the_outcome() {
        for code in [OutcomeCode::Ok, OutcomeCode::Failed] {
            let outcome = ValidationOutcome::new(code);
            let status =
                RequestStatus::from_outcome("f1", outcome.clone(), "accounts.xhtml", None, at(0));

            assert_eq!(status.status, StatusKind::Complete);
            assert_eq!(status.file_name, "accounts.xhtml");
            assert_eq!(status.result, Some(outcome));
        }
    }

    #[test]
    fn intermediate_code_produces_pending_record_with_provisional_result() {
        let outcome = ValidationOutcome::new(OutcomeCode::SentToValidator);
        let status =
            RequestStatus::from_outcome("f1", outcome.clone(), "accounts.xhtml", None, at(0));

        assert_eq!(status.status, StatusKind::Pending);
        assert_eq!(status.result, Some(outcome));
        assert!(!status.is_terminal());
    }

    #[test]
    fn created_at_is_preserved_across_successive_transitions() {
        let t0 = at(0);
        let first = RequestStatus::pending("f1", "accounts.xhtml", None, t0);
        assert_eq!(first.created_at, t0);
        assert_eq!(first.updated_at, t0);

        let second = RequestStatus::from_outcome(
            "f1",
            ValidationOutcome::new(OutcomeCode::SentToValidator),
            "accounts.xhtml",
            Some(&first),
            at(10),
        );
        assert_eq!(second.created_at, t0);
        assert_eq!(second.updated_at, at(10));

        let third = RequestStatus::from_outcome(
            "f1",
            ValidationOutcome::new(OutcomeCode::Ok),
            "accounts.xhtml",
            Some(&second),
            at(20),
        );
        assert_eq!(third.created_at, t0);
        assert_eq!(third.updated_at, at(20));
        assert!(third.created_at <= third.updated_at);
    }

    #[test]
    fn resubmission_over_a_complete_record_goes_back_to_pending_keeping_created_at() {
        let t0 = at(0);
        let complete = RequestStatus::from_outcome(
            "f1",
            ValidationOutcome::new(OutcomeCode::Ok),
            "accounts.xhtml",
            None,
            t0,
        );

        let resubmitted = RequestStatus::pending("f1", "accounts.xhtml", Some(&complete), at(60));
        assert_eq!(resubmitted.status, StatusKind::Pending);
        assert_eq!(resubmitted.created_at, t0);
        assert_eq!(resubmitted.updated_at, at(60));
    }

    #[test]
    fn status_round_trips_through_display_and_from_str() {
        for kind in [StatusKind::Pending, StatusKind::Complete, StatusKind::Error] {
            assert_eq!(kind.to_string().parse::<StatusKind>().unwrap(), kind);
        }
    }
}
