use chrono::{DateTime, Duration, Utc};
use imagekeeper_core::{AppError, AppResult};

/// Upper bound for hour thresholds, one year.
pub const MAX_BACKUP_HOURS: u32 = 24 * 366;
/// Upper bound for day thresholds, one hundred years.
pub const MAX_RETENTION_DAYS: u32 = 36_500;

/// Backup cadence and retention thresholds.
///
/// Grace values are what the audit compares against; each must be at least
/// its operational counterpart so normal scheduling jitter does not alert.
/// The backup cadence itself only takes part in that validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetentionPolicy {
    backup_hours_grace: u32,
    retention_days: u32,
    retention_days_grace: u32,
}

/// Cutoffs the audit pass compares image creation times against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AuditCutoffs {
    /// The newest image must be at least this recent.
    pub recent_backup_cutoff: DateTime<Utc>,
    /// No image may be older than this.
    pub expired_backup_cutoff: DateTime<Utc>,
}

impl RetentionPolicy {
    /// Creates a validated retention policy.
    pub fn new(
        backup_hours: u32,
        backup_hours_grace: u32,
        retention_days: u32,
        retention_days_grace: u32,
    ) -> AppResult<Self> {
        for (name, value, max) in [
            ("backup_hours", backup_hours, MAX_BACKUP_HOURS),
            ("backup_hours_grace", backup_hours_grace, MAX_BACKUP_HOURS),
            ("retention_days", retention_days, MAX_RETENTION_DAYS),
            ("retention_days_grace", retention_days_grace, MAX_RETENTION_DAYS),
        ] {
            if value == 0 {
                return Err(AppError::Validation(format!(
                    "{name} must be greater than zero"
                )));
            }

            if value > max {
                return Err(AppError::Validation(format!(
                    "{name} ({value}) must not exceed {max}"
                )));
            }
        }

        if backup_hours_grace < backup_hours {
            return Err(AppError::Validation(format!(
                "backup_hours_grace ({backup_hours_grace}) must be at least backup_hours ({backup_hours})"
            )));
        }

        if retention_days_grace < retention_days {
            return Err(AppError::Validation(format!(
                "retention_days_grace ({retention_days_grace}) must be at least retention_days ({retention_days})"
            )));
        }

        Ok(Self {
            backup_hours_grace,
            retention_days,
            retention_days_grace,
        })
    }

    /// Computes the audit cutoffs relative to `now`.
    #[must_use]
    pub fn audit_cutoffs(&self, now: DateTime<Utc>) -> AuditCutoffs {
        AuditCutoffs {
            recent_backup_cutoff: now - Duration::hours(i64::from(self.backup_hours_grace)),
            expired_backup_cutoff: now - Duration::days(i64::from(self.retention_days_grace)),
        }
    }

    /// Computes the prune cutoff relative to `now`.
    #[must_use]
    pub fn expiry_cutoff(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        now - Duration::days(i64::from(self.retention_days))
    }
}

impl Default for RetentionPolicy {
    fn default() -> Self {
        Self {
            backup_hours_grace: 8,
            retention_days: 7,
            retention_days_grace: 8,
        }
    }
}
