//! Backup lifecycle passes: create, audit and prune.
//!
//! Each pass is one sequential scan. Per-item failures become failed outcome
//! records and never abort the scan; only discovery failures are returned as
//! errors, since no scan can happen without an inventory listing.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use imagekeeper_core::AppResult;
use imagekeeper_domain::{PassKind, PassReport, ResourceTag, RetentionPolicy};

use crate::backup_ports::ComputeInventory;

mod audit;
mod create;
mod prune;

/// Timestamp layout used in image names.
const IMAGE_NAME_TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H-%M-%S";

/// Application service running the backup lifecycle passes.
#[derive(Clone)]
pub struct BackupService {
    inventory: Arc<dyn ComputeInventory>,
    selector: ResourceTag,
    policy: RetentionPolicy,
}

impl BackupService {
    /// Creates a backup service discovering instances by `selector`.
    #[must_use]
    pub fn new(
        inventory: Arc<dyn ComputeInventory>,
        selector: ResourceTag,
        policy: RetentionPolicy,
    ) -> Self {
        Self {
            inventory,
            selector,
            policy,
        }
    }

    /// Runs one pass with every threshold derived from `now`.
    pub async fn run_pass(&self, kind: PassKind, now: DateTime<Utc>) -> AppResult<PassReport> {
        match kind {
            PassKind::Create => self.create_backups(now).await,
            PassKind::Audit => self.audit_backups(now).await,
            PassKind::Prune => self.prune_backups(now).await,
        }
    }
}
