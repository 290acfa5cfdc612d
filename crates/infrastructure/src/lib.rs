//! Infrastructure adapters for application ports.

#![forbid(unsafe_code)]

mod console_notifier;
mod ec2_compute_inventory;
mod slack_webhook_notifier;
mod sns_report_notifier;

pub use console_notifier::ConsoleNotifier;
pub use ec2_compute_inventory::Ec2ComputeInventory;
pub use slack_webhook_notifier::{SlackWebhookConfig, SlackWebhookNotifier};
pub use sns_report_notifier::SnsReportNotifier;
