//! Domain entities and backup lifecycle rules.

#![forbid(unsafe_code)]

mod naming;
mod outcome;
mod pass;
mod resource;
mod retention;
mod status;

pub use naming::normalize_instance_name;
pub use outcome::{BackupAction, OutcomeRecord, VariableRecord};
pub use pass::{PassKind, PassReport};
pub use resource::{
    CREATED_BY_TAG, INSTANCE_ID_TAG, INSTANCE_NAME_TAG, Image, ImageFilter, ImageQuery, Instance,
    NAME_TAG, OwnerScope, PROVENANCE_MARKER, ResourceTag,
};
pub use retention::{AuditCutoffs, MAX_BACKUP_HOURS, MAX_RETENTION_DAYS, RetentionPolicy};
pub use status::{Severity, StatusBucket, StatusSummary};
