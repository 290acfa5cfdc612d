use std::fmt::{Display, Formatter};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Policy that produced an outcome record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BackupAction {
    /// Image creation for an instance.
    Create,
    /// Deregistration of an expired image.
    Delete,
    /// Freshness check of an instance's newest image.
    CheckRecent,
    /// Retention check of every image of an instance.
    CheckExpired,
    /// Existence check of any image for an instance.
    CheckMissing,
}

impl BackupAction {
    /// Returns the stable action label.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Create => "CREATE",
            Self::Delete => "DELETE",
            Self::CheckRecent => "CHECK_RECENT",
            Self::CheckExpired => "CHECK_EXPIRED",
            Self::CheckMissing => "CHECK_MISSING",
        }
    }
}

impl Display for BackupAction {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        formatter.write_str(self.as_str())
    }
}

/// Verdict of one policy evaluation on one instance or image.
///
/// Built only through the per-outcome constructors so every record carries
/// exactly the fields its outcome has.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutcomeRecord {
    instance_id: Option<String>,
    instance_name: String,
    image_id: Option<String>,
    image_name: Option<String>,
    created_at: Option<DateTime<Utc>>,
    action: BackupAction,
    is_success: bool,
}

impl OutcomeRecord {
    /// An image was requested and returned an id.
    #[must_use]
    pub fn created(
        instance_id: impl Into<String>,
        instance_name: impl Into<String>,
        image_id: impl Into<String>,
        image_name: impl Into<String>,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            instance_id: Some(instance_id.into()),
            instance_name: instance_name.into(),
            image_id: Some(image_id.into()),
            image_name: Some(image_name.into()),
            created_at: Some(created_at),
            action: BackupAction::Create,
            is_success: true,
        }
    }

    /// An image request errored or returned nothing.
    #[must_use]
    pub fn create_failed(
        instance_id: impl Into<String>,
        instance_name: impl Into<String>,
        image_name: impl Into<String>,
        attempted_at: DateTime<Utc>,
    ) -> Self {
        Self {
            instance_id: Some(instance_id.into()),
            instance_name: instance_name.into(),
            image_id: None,
            image_name: Some(image_name.into()),
            created_at: Some(attempted_at),
            action: BackupAction::Create,
            is_success: false,
        }
    }

    /// An expired image was deregistered.
    #[must_use]
    pub fn deleted(
        instance_id: Option<String>,
        instance_name: impl Into<String>,
        image_id: impl Into<String>,
        image_name: impl Into<String>,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self::delete_outcome(
            instance_id,
            instance_name.into(),
            image_id.into(),
            image_name.into(),
            created_at,
            true,
        )
    }

    /// An expired image could not be deregistered.
    #[must_use]
    pub fn delete_failed(
        instance_id: Option<String>,
        instance_name: impl Into<String>,
        image_id: impl Into<String>,
        image_name: impl Into<String>,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self::delete_outcome(
            instance_id,
            instance_name.into(),
            image_id.into(),
            image_name.into(),
            created_at,
            false,
        )
    }

    fn delete_outcome(
        instance_id: Option<String>,
        instance_name: String,
        image_id: String,
        image_name: String,
        created_at: DateTime<Utc>,
        is_success: bool,
    ) -> Self {
        Self {
            instance_id,
            instance_name,
            image_id: Some(image_id),
            image_name: Some(image_name),
            created_at: Some(created_at),
            action: BackupAction::Delete,
            is_success,
        }
    }

    /// An instance has no completed image at all.
    #[must_use]
    pub fn missing(instance_id: impl Into<String>, instance_name: impl Into<String>) -> Self {
        Self {
            instance_id: Some(instance_id.into()),
            instance_name: instance_name.into(),
            image_id: None,
            image_name: None,
            created_at: None,
            action: BackupAction::CheckMissing,
            is_success: false,
        }
    }

    /// The newest image of an instance is older than the freshness cutoff.
    #[must_use]
    pub fn stale(
        instance_id: impl Into<String>,
        instance_name: impl Into<String>,
        image_id: impl Into<String>,
        image_name: impl Into<String>,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self::audit_violation(
            BackupAction::CheckRecent,
            instance_id.into(),
            instance_name.into(),
            image_id.into(),
            image_name.into(),
            created_at,
        )
    }

    /// An image of an instance is older than the expiry cutoff.
    #[must_use]
    pub fn expired(
        instance_id: impl Into<String>,
        instance_name: impl Into<String>,
        image_id: impl Into<String>,
        image_name: impl Into<String>,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self::audit_violation(
            BackupAction::CheckExpired,
            instance_id.into(),
            instance_name.into(),
            image_id.into(),
            image_name.into(),
            created_at,
        )
    }

    fn audit_violation(
        action: BackupAction,
        instance_id: String,
        instance_name: String,
        image_id: String,
        image_name: String,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            instance_id: Some(instance_id),
            instance_name,
            image_id: Some(image_id),
            image_name: Some(image_name),
            created_at: Some(created_at),
            action,
            is_success: false,
        }
    }

    /// Returns the source instance id.
    #[must_use]
    pub fn instance_id(&self) -> Option<&str> {
        self.instance_id.as_deref()
    }

    /// Returns the normalized instance display name.
    #[must_use]
    pub fn instance_name(&self) -> &str {
        self.instance_name.as_str()
    }

    /// Returns the image id, absent for failed creates and missing backups.
    #[must_use]
    pub fn image_id(&self) -> Option<&str> {
        self.image_id.as_deref()
    }

    /// Returns the image name, absent for missing backups.
    #[must_use]
    pub fn image_name(&self) -> Option<&str> {
        self.image_name.as_deref()
    }

    /// Returns when the image was (or should have been) created.
    #[must_use]
    pub fn created_at(&self) -> Option<DateTime<Utc>> {
        self.created_at
    }

    /// Returns the producing policy.
    #[must_use]
    pub fn action(&self) -> BackupAction {
        self.action
    }

    /// Returns the verdict.
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.is_success
    }
}

/// Labelled run parameter shown in the long-form report header.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VariableRecord {
    title: String,
    value: String,
}

impl VariableRecord {
    /// Creates a variable; the title is upper-cased for display.
    #[must_use]
    pub fn new(title: &str, value: impl Into<String>) -> Self {
        Self {
            title: title.to_uppercase(),
            value: value.into(),
        }
    }

    /// Returns the upper-cased title.
    #[must_use]
    pub fn title(&self) -> &str {
        self.title.as_str()
    }

    /// Returns the value.
    #[must_use]
    pub fn value(&self) -> &str {
        self.value.as_str()
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::{BackupAction, OutcomeRecord, VariableRecord};

    #[test]
    fn missing_record_has_no_image_fields() {
        let record = OutcomeRecord::missing("i-1", "web01");

        assert_eq!(record.action(), BackupAction::CheckMissing);
        assert!(!record.is_success());
        assert_eq!(record.image_id(), None);
        assert_eq!(record.image_name(), None);
        assert_eq!(record.created_at(), None);
    }

    #[test]
    fn failed_create_keeps_intended_name_without_image_id() {
        let record =
            OutcomeRecord::create_failed("i-1", "web01", "web01_2026-10-19T04-00-00", Utc::now());

        assert_eq!(record.action(), BackupAction::Create);
        assert_eq!(record.image_id(), None);
        assert_eq!(record.image_name(), Some("web01_2026-10-19T04-00-00"));
    }

    #[test]
    fn action_labels_are_stable() {
        assert_eq!(BackupAction::CheckRecent.to_string(), "CHECK_RECENT");
        assert_eq!(BackupAction::CheckExpired.as_str(), "CHECK_EXPIRED");
    }

    #[test]
    fn variable_title_is_upper_cased() {
        let variable = VariableRecord::new("Latest backup date", "2026-10-19T00:00:00+00:00");
        assert_eq!(variable.title(), "LATEST BACKUP DATE");
        assert_eq!(variable.value(), "2026-10-19T00:00:00+00:00");
    }
}
