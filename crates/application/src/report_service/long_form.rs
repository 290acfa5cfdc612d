use imagekeeper_domain::{OutcomeRecord, PassReport, StatusSummary};

use super::{MISSING_VALUE, ReportContext, display_timestamp};

const HEADER_RULE_WIDTH: usize = 40;
const TABLE_RULE_WIDTH: usize = 120;

/// Returns the long-form report subject line.
#[must_use]
pub fn report_subject(report: &PassReport, context: &ReportContext) -> String {
    format!(
        "Backup Status Report [{}] @ [{}]",
        context.region,
        report.started_at.format("%Y-%m-%d %H:%M UTC")
    )
}

/// Renders the long-form report: a metadata header followed by one
/// fixed-width table per non-empty bucket.
#[must_use]
pub fn render_long_form(
    report: &PassReport,
    summary: &StatusSummary<'_>,
    context: &ReportContext,
) -> String {
    let header_rule = "-".repeat(HEADER_RULE_WIDTH);
    let table_rule = "-".repeat(TABLE_RULE_WIDTH);
    let mut lines = vec![
        header_rule.clone(),
        "BACKUP STATUS REPORT".to_owned(),
        header_rule.clone(),
        header_field("REGION", &context.region),
        header_field("DATE-TIME", &report.started_at.to_rfc3339()),
        header_field("ITEMS", &summary.total().to_string()),
        header_field("TITLE", report.kind.title()),
        header_field("SCRIPT", &context.script),
        header_rule.clone(),
    ];

    if !report.variables.is_empty() {
        lines.extend(
            report
                .variables
                .iter()
                .map(|variable| header_field(variable.title(), variable.value())),
        );
        lines.push(header_rule);
    }

    lines.push(String::new());
    lines.push(String::new());

    for (bucket, records) in summary.non_empty_buckets() {
        lines.push(format!("{} ({}):", bucket.title(), bucket.verdict()));
        lines.push(table_rule.clone());
        lines.push(table_row("INSTANCE", "IMAGE ID", "TIMESTAMP", "COMPLETED"));
        lines.push(table_rule.clone());
        lines.extend(records.iter().map(|record| record_row(record)));
        lines.push(table_rule.clone());
        lines.push(format!("{:>21} | Item(s)", records.len()));
        lines.push(String::new());
        lines.push(String::new());
    }

    lines.join("\n")
}

fn header_field(title: &str, value: &str) -> String {
    format!("{title:13} : {value:16}")
}

fn table_row(instance: &str, image_id: &str, timestamp: &str, completed: &str) -> String {
    format!("{instance:21} | {image_id:21} | {timestamp:25} | {completed:60}")
}

fn record_row(record: &OutcomeRecord) -> String {
    table_row(
        record.instance_name(),
        record.image_id().unwrap_or(MISSING_VALUE),
        &display_timestamp(record.created_at()),
        if record.is_success() { "true" } else { "false" },
    )
}
