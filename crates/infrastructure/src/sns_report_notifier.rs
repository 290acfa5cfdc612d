//! SNS topic transport for the long-form report.

use async_trait::async_trait;
use aws_sdk_sns::Client;
use aws_sdk_sns::error::DisplayErrorContext;
use imagekeeper_application::ReportNotifier;
use imagekeeper_core::{AppError, AppResult};
use tracing::info;

const MAX_SUBJECT_CHARS: usize = 100;

/// Report notifier publishing to an SNS topic.
#[derive(Clone)]
pub struct SnsReportNotifier {
    client: Client,
    topic_arn: String,
}

impl SnsReportNotifier {
    /// Creates a notifier for one topic.
    #[must_use]
    pub fn new(client: Client, topic_arn: impl Into<String>) -> Self {
        Self {
            client,
            topic_arn: topic_arn.into(),
        }
    }
}

// SNS rejects subjects longer than 100 characters or containing line breaks.
fn sanitize_subject(subject: &str) -> String {
    subject
        .chars()
        .map(|character| if character.is_control() { ' ' } else { character })
        .take(MAX_SUBJECT_CHARS)
        .collect()
}

#[async_trait]
impl ReportNotifier for SnsReportNotifier {
    async fn publish_report(&self, subject: &str, body: &str) -> AppResult<()> {
        let output = self
            .client
            .publish()
            .topic_arn(&self.topic_arn)
            .subject(sanitize_subject(subject))
            .message(body)
            .send()
            .await
            .map_err(|error| {
                AppError::External(format!(
                    "sns publish to '{}' failed: {}",
                    self.topic_arn,
                    DisplayErrorContext(error)
                ))
            })?;

        info!(
            topic_arn = %self.topic_arn,
            message_id = output.message_id().unwrap_or_default(),
            "long-form report published"
        );

        Ok(())
    }
}
