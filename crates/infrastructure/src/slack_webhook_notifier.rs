//! Slack incoming-webhook transport for status digests.

use async_trait::async_trait;
use chrono::Utc;
use imagekeeper_application::{ChatNotifier, DigestMessage};
use imagekeeper_core::{AppError, AppResult};
use serde::Serialize;
use tracing::info;

/// Slack webhook settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SlackWebhookConfig {
    /// Incoming webhook URL.
    pub webhook_url: String,
    /// Channel the digest is posted to.
    pub channel: String,
    /// Emoji name used as the bot icon, with or without surrounding colons.
    pub icon: String,
    /// Job name shown as the attachment title.
    pub job_name: String,
}

/// Chat notifier posting digests as Slack attachments.
pub struct SlackWebhookNotifier {
    http_client: reqwest::Client,
    config: SlackWebhookConfig,
}

impl SlackWebhookNotifier {
    /// Creates a notifier over a shared HTTP client.
    #[must_use]
    pub fn new(http_client: reqwest::Client, config: SlackWebhookConfig) -> Self {
        Self {
            http_client,
            config,
        }
    }
}

#[derive(Debug, Serialize)]
struct SlackPayload<'a> {
    channel: &'a str,
    username: &'a str,
    icon_emoji: String,
    attachments: Vec<SlackAttachment<'a>>,
}

#[derive(Debug, Serialize)]
struct SlackAttachment<'a> {
    fallback: String,
    color: &'static str,
    title: &'a str,
    pretext: &'a str,
    fields: Vec<SlackField<'a>>,
    footer: &'a str,
    ts: i64,
    mrkdwn_in: [&'static str; 3],
}

#[derive(Debug, Serialize)]
struct SlackField<'a> {
    title: &'a str,
    value: &'a str,
    short: bool,
}

fn icon_emoji(icon: &str) -> String {
    let icon = icon.trim().trim_matches(':');
    format!(":{icon}:")
}

fn build_payload<'a>(
    config: &'a SlackWebhookConfig,
    message: &'a DigestMessage,
    ts: i64,
) -> SlackPayload<'a> {
    SlackPayload {
        channel: &config.channel,
        username: &config.job_name,
        icon_emoji: icon_emoji(&config.icon),
        attachments: vec![SlackAttachment {
            fallback: format!("{}: {}", message.title, message.severity.as_str()),
            color: message.severity.as_str(),
            title: &config.job_name,
            pretext: &message.title,
            fields: message
                .sections
                .iter()
                .map(|section| SlackField {
                    title: &section.heading,
                    value: &section.body,
                    short: false,
                })
                .collect(),
            footer: &message.footer,
            ts,
            mrkdwn_in: ["pretext", "text", "fields"],
        }],
    }
}

#[async_trait]
impl ChatNotifier for SlackWebhookNotifier {
    async fn publish_digest(&self, message: &DigestMessage) -> AppResult<()> {
        let payload = build_payload(&self.config, message, Utc::now().timestamp());

        let response = self
            .http_client
            .post(&self.config.webhook_url)
            .json(&payload)
            .send()
            .await
            .map_err(|error| AppError::External(format!("slack webhook transport error: {error}")))?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<response body unavailable>".to_owned());
            return Err(AppError::External(format!(
                "slack webhook failed with status {status}: {body}"
            )));
        }

        info!(
            channel = %self.config.channel,
            severity = message.severity.as_str(),
            sections = message.sections.len(),
            "status digest posted to slack"
        );

        Ok(())
    }
}
