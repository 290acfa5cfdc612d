use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Duration, TimeZone, Utc};
use tokio::sync::Mutex;

use imagekeeper_core::{AppError, AppResult};
use imagekeeper_domain::{OutcomeRecord, PassKind, PassReport, Severity, StatusSummary};

use crate::backup_ports::{ChatNotifier, DigestMessage, ReportNotifier};

use super::{
    ReportContext, ReportDispatch, ReportService, render_digest, render_long_form, report_subject,
};

#[derive(Default)]
struct FakeChatNotifier {
    fail: bool,
    digests: Mutex<Vec<DigestMessage>>,
}

#[async_trait]
impl ChatNotifier for FakeChatNotifier {
    async fn publish_digest(&self, message: &DigestMessage) -> AppResult<()> {
        self.digests.lock().await.push(message.clone());
        if self.fail {
            return Err(AppError::External("webhook returned status 500".to_owned()));
        }

        Ok(())
    }
}

#[derive(Default)]
struct FakeReportNotifier {
    reports: Mutex<Vec<(String, String)>>,
}

#[async_trait]
impl ReportNotifier for FakeReportNotifier {
    async fn publish_report(&self, subject: &str, body: &str) -> AppResult<()> {
        self.reports
            .lock()
            .await
            .push((subject.to_owned(), body.to_owned()));
        Ok(())
    }
}

fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 10, 19, 12, 0, 0)
        .single()
        .unwrap_or_else(|| unreachable!())
}

fn context() -> ReportContext {
    ReportContext {
        region: "us-east-1".to_owned(),
        script: "imagekeeper-worker audit".to_owned(),
    }
}

fn audit_report() -> PassReport {
    let mut report = PassReport::new(PassKind::Audit, now());
    report.variable("Latest backup date", "2026-10-19T04:00:00+00:00");
    report.record(OutcomeRecord::missing("i-1", "web01"));
    report.record(OutcomeRecord::expired(
        "i-2",
        "db01",
        "ami-old",
        "db01_2026-10-09T12-00-00",
        now() - Duration::days(10),
    ));
    report.record(OutcomeRecord::expired(
        "i-2",
        "db01",
        "ami-older",
        "db01_2026-10-08T12-00-00",
        now() - Duration::days(11),
    ));
    report
}

fn build_service(
    chat_notifier: Arc<FakeChatNotifier>,
    report_notifier: Arc<FakeReportNotifier>,
) -> ReportService {
    ReportService::new(chat_notifier, report_notifier, context())
}

#[tokio::test]
async fn empty_report_sends_nothing() {
    let chat_notifier = Arc::new(FakeChatNotifier::default());
    let report_notifier = Arc::new(FakeReportNotifier::default());
    let service = build_service(chat_notifier.clone(), report_notifier.clone());

    let dispatch = service
        .publish(&PassReport::new(PassKind::Audit, now()), true)
        .await;

    assert_eq!(dispatch, ReportDispatch::NothingToReport);
    assert!(chat_notifier.digests.lock().await.is_empty());
    assert!(report_notifier.reports.lock().await.is_empty());
}

#[tokio::test]
async fn audit_failures_send_danger_digest_and_long_form() {
    let chat_notifier = Arc::new(FakeChatNotifier::default());
    let report_notifier = Arc::new(FakeReportNotifier::default());
    let service = build_service(chat_notifier.clone(), report_notifier.clone());

    let dispatch = service.publish(&audit_report(), true).await;

    assert_eq!(
        dispatch,
        ReportDispatch::Dispatched {
            severity: Severity::Danger,
            digest_delivered: true,
            long_form_delivered: Some(true),
        }
    );

    let digests = chat_notifier.digests.lock().await;
    assert_eq!(digests.len(), 1);
    assert_eq!(digests[0].title, "Monitor image backups");
    assert_eq!(digests[0].footer, "imagekeeper-worker audit");
    let headings: Vec<&str> = digests[0]
        .sections
        .iter()
        .map(|section| section.heading.as_str())
        .collect();
    assert_eq!(
        headings,
        vec![
            "Server(s) with NO backups (`Fail`):",
            "Expired backups left behind (`Fail`):"
        ]
    );

    let reports = report_notifier.reports.lock().await;
    assert_eq!(reports.len(), 1);
    assert_eq!(
        reports[0].0,
        "Backup Status Report [us-east-1] @ [2026-10-19 12:00 UTC]"
    );
}

#[tokio::test]
async fn long_form_is_only_sent_when_requested() {
    let chat_notifier = Arc::new(FakeChatNotifier::default());
    let report_notifier = Arc::new(FakeReportNotifier::default());
    let service = build_service(chat_notifier.clone(), report_notifier.clone());
    let mut report = PassReport::new(PassKind::Create, now());
    report.record(OutcomeRecord::created(
        "i-1",
        "web01",
        "ami-1",
        "web01_2026-10-19T12-00-00",
        now(),
    ));
    report.record(OutcomeRecord::create_failed(
        "i-2",
        "web02",
        "web02_2026-10-19T12-00-00",
        now(),
    ));

    let dispatch = service.publish(&report, false).await;

    assert_eq!(
        dispatch,
        ReportDispatch::Dispatched {
            severity: Severity::Warning,
            digest_delivered: true,
            long_form_delivered: None,
        }
    );
    assert_eq!(chat_notifier.digests.lock().await.len(), 1);
    assert!(report_notifier.reports.lock().await.is_empty());
}

#[tokio::test]
async fn chat_failure_is_reported_but_does_not_block_long_form() {
    let chat_notifier = Arc::new(FakeChatNotifier {
        fail: true,
        ..FakeChatNotifier::default()
    });
    let report_notifier = Arc::new(FakeReportNotifier::default());
    let service = build_service(chat_notifier, report_notifier.clone());

    let dispatch = service.publish(&audit_report(), true).await;

    assert_eq!(
        dispatch,
        ReportDispatch::Dispatched {
            severity: Severity::Danger,
            digest_delivered: false,
            long_form_delivered: Some(true),
        }
    );
    assert_eq!(report_notifier.reports.lock().await.len(), 1);
}

#[test]
fn digest_uses_placeholders_for_records_without_image() {
    let report = audit_report();
    let summary = StatusSummary::aggregate(&report.records).unwrap_or_else(|| unreachable!());

    let digest = render_digest(&report, &summary, &context());

    assert_eq!(digest.severity, Severity::Danger);
    assert_eq!(
        digest.sections[0].body,
        "[ *Server* | _Image ID_ | Taken On ]\nweb01 | -- | --\n"
    );
    assert_eq!(
        digest.sections[1].body,
        "[ *Server* | _Image ID_ | Taken On ]\n\
         *db01* | _ami-old_ | 2026-10-09T12:00:00Z\n\
         *db01* | _ami-older_ | 2026-10-08T12:00:00Z\n"
    );
}

#[test]
fn long_form_lists_header_variables_and_bucket_tables() {
    let report = audit_report();
    let summary = StatusSummary::aggregate(&report.records).unwrap_or_else(|| unreachable!());

    let body = render_long_form(&report, &summary, &context());
    let lines: Vec<&str> = body.lines().collect();

    assert_eq!(lines[0], "-".repeat(40));
    assert_eq!(lines[1], "BACKUP STATUS REPORT");
    assert!(lines.contains(&"REGION        : us-east-1       "));
    assert!(lines.contains(&"ITEMS         : 3               "));
    assert!(lines.contains(&"TITLE         : Monitor image backups"));
    assert!(lines.contains(&"SCRIPT        : imagekeeper-worker audit"));
    assert!(lines.contains(&"LATEST BACKUP DATE : 2026-10-19T04:00:00+00:00"));
    assert!(lines.contains(&"Server(s) with NO backups (Fail):"));
    assert!(lines.contains(&"Expired backups left behind (Fail):"));
    assert!(lines.contains(&format!("{:>21} | Item(s)", 2).as_str()));

    let missing_row = lines
        .iter()
        .find(|line| line.starts_with("web01 "))
        .unwrap_or_else(|| unreachable!());
    assert_eq!(
        *missing_row,
        format!("{:21} | {:21} | {:25} | {:60}", "web01", "--", "--", "false")
    );
}

#[test]
fn subject_names_region_and_start_time() {
    let report = PassReport::new(PassKind::Prune, now());
    assert_eq!(
        report_subject(&report, &context()),
        "Backup Status Report [us-east-1] @ [2026-10-19 12:00 UTC]"
    );
}
