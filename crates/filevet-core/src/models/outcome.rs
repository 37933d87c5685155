//! Raw validator outcomes.

use std::fmt::{Display, Formatter, Result as FmtResult};
use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Status code reported by a validator for one file.
///
/// Closed set, matched exhaustively wherever a status is derived from it:
/// adding an upstream code is a compile-time decision, not a silent
/// fall-through.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OutcomeCode {
    /// Intermediate: the file has been handed to the validator.
    SentToValidator,
    /// Terminal: validation passed.
    Ok,
    /// Terminal: validation ran and the document failed business rules.
    Failed,
    /// The validator itself faulted.
    Error,
}

impl OutcomeCode {
    /// Terminal codes produce a COMPLETE record; see
    /// [`super::status::RequestStatus::from_outcome`].
    pub fn is_terminal(&self) -> bool {
        matches!(self, OutcomeCode::Ok | OutcomeCode::Failed)
    }
}

impl Display for OutcomeCode {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            OutcomeCode::SentToValidator => write!(f, "SENT_TO_VALIDATOR"),
            OutcomeCode::Ok => write!(f, "OK"),
            OutcomeCode::Failed => write!(f, "FAILED"),
            OutcomeCode::Error => write!(f, "ERROR"),
        }
    }
}

impl FromStr for OutcomeCode {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "SENT_TO_VALIDATOR" => Ok(OutcomeCode::SentToValidator),
            "OK" => Ok(OutcomeCode::Ok),
            "FAILED" => Ok(OutcomeCode::Failed),
            "ERROR" => Ok(OutcomeCode::Error),
            _ => Err(anyhow::anyhow!("Invalid outcome code: {}", s)),
        }
    }
}

/// Accounting fields the validator extracts from a well-formed document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountsData {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub balance_sheet_date: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub accounts_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub registered_number: Option<String>,
}

/// A validator's raw result for one file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationOutcome {
    pub code: OutcomeCode,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<AccountsData>,
}

impl ValidationOutcome {
    pub fn new(code: OutcomeCode) -> Self {
        Self {
            code,
            errors: Vec::new(),
            data: None,
        }
    }

    pub fn with_errors(code: OutcomeCode, errors: Vec<String>) -> Self {
        Self {
            code,
            errors,
            data: None,
        }
    }
}
