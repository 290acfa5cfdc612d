use std::str::FromStr;

use chrono::{DateTime, Utc};
use imagekeeper_core::AppError;
use serde::{Deserialize, Serialize};

use crate::outcome::{OutcomeRecord, VariableRecord};

/// One of the three independent backup passes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PassKind {
    /// Take one image per tagged instance.
    Create,
    /// Check freshness and expiry of existing images.
    Audit,
    /// Deregister images past retention.
    Prune,
}

impl PassKind {
    /// Returns the stable pass name used on the command line.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Create => "create",
            Self::Audit => "audit",
            Self::Prune => "prune",
        }
    }

    /// Returns the report title for this pass.
    #[must_use]
    pub fn title(&self) -> &'static str {
        match self {
            Self::Create => "Take image backups",
            Self::Audit => "Monitor image backups",
            Self::Prune => "Remove expired image backups",
        }
    }
}

impl FromStr for PassKind {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "create" => Ok(Self::Create),
            "audit" => Ok(Self::Audit),
            "prune" => Ok(Self::Prune),
            _ => Err(AppError::Validation(format!(
                "unknown pass '{value}', expected one of: create, audit, prune"
            ))),
        }
    }
}

/// Everything one pass produced, handed to the reporter once.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PassReport {
    /// Which pass ran.
    pub kind: PassKind,
    /// The `now` every threshold of the pass was derived from.
    pub started_at: DateTime<Utc>,
    /// Outcome records in scan order.
    pub records: Vec<OutcomeRecord>,
    /// Run parameters shown in the long-form header.
    pub variables: Vec<VariableRecord>,
}

impl PassReport {
    /// Creates an empty report for a pass starting at `started_at`.
    #[must_use]
    pub fn new(kind: PassKind, started_at: DateTime<Utc>) -> Self {
        Self {
            kind,
            started_at,
            records: Vec::new(),
            variables: Vec::new(),
        }
    }

    /// Appends an outcome record.
    pub fn record(&mut self, record: OutcomeRecord) {
        self.records.push(record);
    }

    /// Appends a run parameter.
    pub fn variable(&mut self, title: &str, value: impl Into<String>) {
        self.variables.push(VariableRecord::new(title, value));
    }
}
