//! Aggregation of outcome records into report buckets and a severity verdict.

use serde::{Deserialize, Serialize};

use crate::outcome::{BackupAction, OutcomeRecord};

/// Report category of an outcome record.
///
/// Declaration order is report order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StatusBucket {
    /// Images taken.
    CreateSuccess,
    /// Images not taken.
    CreateFailure,
    /// Expired images deleted.
    DeleteSuccess,
    /// Expired images not deleted.
    DeleteFailure,
    /// Instances without any image.
    Missing,
    /// Images left behind past expiry.
    Expired,
    /// Instances whose newest image is stale.
    NoRecent,
}

impl StatusBucket {
    /// All buckets in report order.
    pub const ALL: [Self; 7] = [
        Self::CreateSuccess,
        Self::CreateFailure,
        Self::DeleteSuccess,
        Self::DeleteFailure,
        Self::Missing,
        Self::Expired,
        Self::NoRecent,
    ];

    /// Returns the bucket a record belongs to. Every record has exactly one.
    #[must_use]
    pub fn of(record: &OutcomeRecord) -> Self {
        match (record.action(), record.is_success()) {
            (BackupAction::Create, true) => Self::CreateSuccess,
            (BackupAction::Create, false) => Self::CreateFailure,
            (BackupAction::Delete, true) => Self::DeleteSuccess,
            (BackupAction::Delete, false) => Self::DeleteFailure,
            (BackupAction::CheckMissing, _) => Self::Missing,
            (BackupAction::CheckExpired, _) => Self::Expired,
            (BackupAction::CheckRecent, _) => Self::NoRecent,
        }
    }

    /// Returns the section title.
    #[must_use]
    pub fn title(&self) -> &'static str {
        match self {
            Self::CreateSuccess => "Backups taken",
            Self::CreateFailure => "Backups NOT taken",
            Self::DeleteSuccess => "Expired backups deleted",
            Self::DeleteFailure => "Expired backups NOT deleted",
            Self::Missing => "Server(s) with NO backups",
            Self::Expired => "Expired backups left behind",
            Self::NoRecent => "Server(s) missing recent backups taken",
        }
    }

    /// Returns whether the bucket reports a passing outcome.
    #[must_use]
    pub fn is_pass(&self) -> bool {
        matches!(self, Self::CreateSuccess | Self::DeleteSuccess)
    }

    /// Returns `Pass` or `Fail`.
    #[must_use]
    pub fn verdict(&self) -> &'static str {
        if self.is_pass() { "Pass" } else { "Fail" }
    }
}

/// Overall verdict of a pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    /// Every record succeeded.
    Good,
    /// Some records failed.
    Warning,
    /// Every record failed.
    Danger,
}

impl Severity {
    /// Returns the stable severity label, also used as the chat color.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Good => "good",
            Self::Warning => "warning",
            Self::Danger => "danger",
        }
    }

    /// Derives severity from success and failure counts.
    #[must_use]
    pub fn from_counts(successes: usize, failures: usize) -> Self {
        match (successes, failures) {
            (_, 0) => Self::Good,
            (0, _) => Self::Danger,
            _ => Self::Warning,
        }
    }
}

/// Bucketed, read-only view over one pass's records.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusSummary<'a> {
    buckets: [Vec<&'a OutcomeRecord>; 7],
    total: usize,
    severity: Severity,
}

impl<'a> StatusSummary<'a> {
    /// Buckets `records`; returns `None` when there is nothing to report.
    #[must_use]
    pub fn aggregate(records: &'a [OutcomeRecord]) -> Option<Self> {
        if records.is_empty() {
            return None;
        }

        let mut buckets: [Vec<&'a OutcomeRecord>; 7] = Default::default();
        for record in records {
            buckets[StatusBucket::of(record) as usize].push(record);
        }

        let successes = records.iter().filter(|record| record.is_success()).count();
        let severity = Severity::from_counts(successes, records.len() - successes);

        Some(Self {
            buckets,
            total: records.len(),
            severity,
        })
    }

    /// Returns the records of one bucket in scan order.
    #[must_use]
    pub fn bucket(&self, bucket: StatusBucket) -> &[&'a OutcomeRecord] {
        &self.buckets[bucket as usize]
    }

    /// Returns the non-empty buckets in report order.
    pub fn non_empty_buckets(
        &self,
    ) -> impl Iterator<Item = (StatusBucket, &[&'a OutcomeRecord])> + '_ {
        StatusBucket::ALL
            .into_iter()
            .map(|bucket| (bucket, self.bucket(bucket)))
            .filter(|(_, records)| !records.is_empty())
    }

    /// Returns the number of aggregated records.
    #[must_use]
    pub fn total(&self) -> usize {
        self.total
    }

    /// Returns the overall verdict.
    #[must_use]
    pub fn severity(&self) -> Severity {
        self.severity
    }
}
