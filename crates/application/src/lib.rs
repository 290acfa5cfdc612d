//! Application services and ports.

#![forbid(unsafe_code)]

mod backup_ports;
mod backup_service;
mod report_service;

pub use backup_ports::{
    ChatNotifier, ComputeInventory, CreateImageRequest, DigestMessage, DigestSection,
    ReportNotifier,
};
pub use backup_service::BackupService;
pub use report_service::{
    ReportContext, ReportDispatch, ReportService, render_digest, render_long_form, report_subject,
};
