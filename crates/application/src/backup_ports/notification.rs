use async_trait::async_trait;
use imagekeeper_core::AppResult;
use imagekeeper_domain::Severity;

/// One collapsible section of a chat digest.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DigestSection {
    /// Section heading, including the pass/fail marker.
    pub heading: String,
    /// Column header followed by one line per record.
    pub body: String,
}

/// Compact chat rendering of a pass report.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DigestMessage {
    /// Pass title.
    pub title: String,
    /// Overall verdict, rendered as the message color.
    pub severity: Severity,
    /// Identity of the invoking worker.
    pub footer: String,
    /// Non-empty buckets in report order.
    pub sections: Vec<DigestSection>,
}

/// Port for the chat transport receiving digests.
#[async_trait]
pub trait ChatNotifier: Send + Sync {
    /// Publishes one digest.
    async fn publish_digest(&self, message: &DigestMessage) -> AppResult<()>;
}

/// Port for the transport receiving long-form reports.
#[async_trait]
pub trait ReportNotifier: Send + Sync {
    /// Publishes one long-form report.
    async fn publish_report(&self, subject: &str, body: &str) -> AppResult<()>;
}
