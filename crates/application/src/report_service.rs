//! Status aggregation, rendering and dispatch for one pass report.

use std::sync::Arc;

use chrono::{DateTime, SecondsFormat, Utc};
use imagekeeper_domain::{PassReport, Severity, StatusSummary};
use tracing::{error, info};

use crate::backup_ports::{ChatNotifier, ReportNotifier};

mod digest;
mod long_form;

pub use digest::render_digest;
pub use long_form::{render_long_form, report_subject};

/// Placeholder for values a record does not have.
const MISSING_VALUE: &str = "--";

/// Run context shown in rendered reports.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportContext {
    /// Cloud region the pass ran against.
    pub region: String,
    /// Identity of the invoking worker, e.g. `imagekeeper-worker audit`.
    pub script: String,
}

/// What [`ReportService::publish`] attempted and delivered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportDispatch {
    /// The pass produced no records; nothing was sent.
    NothingToReport,
    /// A digest was sent, and a long-form report when requested.
    Dispatched {
        /// Overall verdict of the pass.
        severity: Severity,
        /// Whether the chat transport accepted the digest.
        digest_delivered: bool,
        /// `None` when no long form was requested, otherwise whether it was accepted.
        long_form_delivered: Option<bool>,
    },
}

/// Application service publishing pass reports to the notification transports.
#[derive(Clone)]
pub struct ReportService {
    chat_notifier: Arc<dyn ChatNotifier>,
    report_notifier: Arc<dyn ReportNotifier>,
    context: ReportContext,
}

impl ReportService {
    /// Creates a report service.
    #[must_use]
    pub fn new(
        chat_notifier: Arc<dyn ChatNotifier>,
        report_notifier: Arc<dyn ReportNotifier>,
        context: ReportContext,
    ) -> Self {
        Self {
            chat_notifier,
            report_notifier,
            context,
        }
    }

    /// Aggregates `report`, sends the digest, and sends the long form when
    /// `include_long_form` is set.
    ///
    /// Transport failures are logged and reflected in the returned
    /// [`ReportDispatch`]; they never fail the pass.
    pub async fn publish(&self, report: &PassReport, include_long_form: bool) -> ReportDispatch {
        let Some(summary) = StatusSummary::aggregate(&report.records) else {
            info!(pass = report.kind.as_str(), "no backup errors reported");
            return ReportDispatch::NothingToReport;
        };

        let digest = render_digest(report, &summary, &self.context);
        let digest_delivered = match self.chat_notifier.publish_digest(&digest).await {
            Ok(()) => true,
            Err(error) => {
                error!(
                    pass = report.kind.as_str(),
                    error = %error,
                    "failed to publish status digest"
                );
                false
            }
        };

        let long_form_delivered = if include_long_form {
            let subject = report_subject(report, &self.context);
            let body = render_long_form(report, &summary, &self.context);
            match self.report_notifier.publish_report(&subject, &body).await {
                Ok(()) => Some(true),
                Err(error) => {
                    error!(
                        pass = report.kind.as_str(),
                        error = %error,
                        "failed to publish status report"
                    );
                    Some(false)
                }
            }
        } else {
            None
        };

        info!(
            pass = report.kind.as_str(),
            severity = summary.severity().as_str(),
            items = summary.total(),
            digest_delivered,
            long_form_delivered = ?long_form_delivered,
            "status report published"
        );

        ReportDispatch::Dispatched {
            severity: summary.severity(),
            digest_delivered,
            long_form_delivered,
        }
    }
}

fn display_timestamp(value: Option<DateTime<Utc>>) -> String {
    value.map_or_else(
        || MISSING_VALUE.to_owned(),
        |value| value.to_rfc3339_opts(SecondsFormat::Secs, true),
    )
}

#[cfg(test)]
mod tests;
