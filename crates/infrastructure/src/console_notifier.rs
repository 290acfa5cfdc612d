//! Console notifier for unconfigured transports. Logs reports to tracing output.

use async_trait::async_trait;
use imagekeeper_application::{ChatNotifier, DigestMessage, ReportNotifier};
use imagekeeper_core::AppResult;
use tracing::info;

/// Notifier that writes digests and reports to the log.
#[derive(Clone)]
pub struct ConsoleNotifier;

impl ConsoleNotifier {
    /// Creates a new console notifier.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl Default for ConsoleNotifier {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ChatNotifier for ConsoleNotifier {
    async fn publish_digest(&self, message: &DigestMessage) -> AppResult<()> {
        let body: String = message
            .sections
            .iter()
            .map(|section| format!("{}\n{}", section.heading, section.body))
            .collect();

        info!(
            severity = message.severity.as_str(),
            "--- DIGEST (console) ---\n{}\n\n{}{}\n--- END DIGEST ---",
            message.title,
            body,
            message.footer
        );

        Ok(())
    }
}

#[async_trait]
impl ReportNotifier for ConsoleNotifier {
    async fn publish_report(&self, subject: &str, body: &str) -> AppResult<()> {
        info!(
            subject = subject,
            "--- REPORT (console) ---\nSubject: {}\n\n{}\n--- END REPORT ---",
            subject,
            body
        );

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use imagekeeper_application::{ChatNotifier, DigestMessage, ReportNotifier};
    use imagekeeper_domain::Severity;

    use super::ConsoleNotifier;

    #[tokio::test]
    async fn console_notifier_accepts_digests_and_reports() {
        let notifier = ConsoleNotifier::new();
        let message = DigestMessage {
            title: "Take image backups".to_owned(),
            severity: Severity::Good,
            footer: "imagekeeper-worker create".to_owned(),
            sections: Vec::new(),
        };

        assert!(notifier.publish_digest(&message).await.is_ok());
        assert!(
            notifier
                .publish_report("Backup Status Report", "BACKUP STATUS REPORT")
                .await
                .is_ok()
        );
    }
}
