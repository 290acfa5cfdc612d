//! Imagekeeper backup lifecycle worker. Runs one pass per invocation.

#![forbid(unsafe_code)]

mod worker_config;

use std::env;
use std::sync::Arc;
use std::time::Duration;

use aws_config::{BehaviorVersion, Region};
use chrono::Utc;
use imagekeeper_application::{
    BackupService, ChatNotifier, ReportContext, ReportDispatch, ReportNotifier, ReportService,
};
use imagekeeper_core::AppError;
use imagekeeper_infrastructure::{
    ConsoleNotifier, Ec2ComputeInventory, SlackWebhookNotifier, SnsReportNotifier,
};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use crate::worker_config::{WorkerConfig, parse_pass};

#[tokio::main]
async fn main() -> Result<(), AppError> {
    dotenvy::dotenv().ok();
    init_tracing();

    let pass = parse_pass(env::args().nth(1))?;
    let config = WorkerConfig::load()?;
    let sdk_config = aws_config::defaults(BehaviorVersion::latest())
        .region(Region::new(config.region.clone()))
        .load()
        .await;
    let http_client = reqwest::Client::builder()
        .timeout(Duration::from_secs(15))
        .build()
        .map_err(|error| AppError::Internal(format!("failed to build HTTP client: {error}")))?;

    let backup_service = BackupService::new(
        Arc::new(Ec2ComputeInventory::new(aws_sdk_ec2::Client::new(&sdk_config))),
        config.backup_tag.clone(),
        config.policy,
    );
    let report_service = build_report_service(&config, &sdk_config, http_client, pass.as_str());

    info!(
        pass = pass.as_str(),
        region = %config.region,
        tag_key = config.backup_tag.key(),
        tag_value = config.backup_tag.value(),
        "imagekeeper-worker started"
    );

    let report = match backup_service.run_pass(pass, Utc::now()).await {
        Ok(report) => report,
        Err(error) => {
            error!(pass = pass.as_str(), error = %error, "backup pass failed");
            return Err(error);
        }
    };

    match report_service
        .publish(&report, config.sends_long_form(pass))
        .await
    {
        ReportDispatch::NothingToReport => {}
        ReportDispatch::Dispatched {
            severity,
            digest_delivered,
            long_form_delivered,
        } => info!(
            pass = pass.as_str(),
            severity = severity.as_str(),
            digest_delivered,
            long_form_delivered = ?long_form_delivered,
            "backup pass reported"
        ),
    }

    info!(
        pass = pass.as_str(),
        records = report.records.len(),
        "imagekeeper-worker finished"
    );

    Ok(())
}

fn build_report_service(
    config: &WorkerConfig,
    sdk_config: &aws_config::SdkConfig,
    http_client: reqwest::Client,
    pass: &str,
) -> ReportService {
    let chat_notifier: Arc<dyn ChatNotifier> = match &config.slack {
        Some(slack) => Arc::new(SlackWebhookNotifier::new(http_client, slack.clone())),
        None => {
            info!("SLACK_WEBHOOK_URL not set, digests go to the console");
            Arc::new(ConsoleNotifier::new())
        }
    };
    let report_notifier: Arc<dyn ReportNotifier> = match &config.report_topic_arn {
        Some(topic_arn) => Arc::new(SnsReportNotifier::new(
            aws_sdk_sns::Client::new(sdk_config),
            topic_arn.clone(),
        )),
        None => {
            info!("REPORT_TOPIC_ARN not set, long-form reports go to the console");
            Arc::new(ConsoleNotifier::new())
        }
    };

    ReportService::new(
        chat_notifier,
        report_notifier,
        ReportContext {
            region: config.region.clone(),
            script: format!("imagekeeper-worker {pass}"),
        },
    )
}

fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .compact()
        .init();
}
