use imagekeeper_domain::{OutcomeRecord, PassReport, StatusSummary};

use super::{MISSING_VALUE, ReportContext, display_timestamp};
use crate::backup_ports::{DigestMessage, DigestSection};

const DIGEST_HEADER: &str = "[ *Server* | _Image ID_ | Taken On ]";

/// Renders the compact chat digest: one section per non-empty bucket.
#[must_use]
pub fn render_digest(
    report: &PassReport,
    summary: &StatusSummary<'_>,
    context: &ReportContext,
) -> DigestMessage {
    let sections = summary
        .non_empty_buckets()
        .map(|(bucket, records)| {
            let mut body = format!("{DIGEST_HEADER}\n");
            for record in records {
                body.push_str(&digest_line(record));
                body.push('\n');
            }

            DigestSection {
                heading: format!("{} (`{}`):", bucket.title(), bucket.verdict()),
                body,
            }
        })
        .collect();

    DigestMessage {
        title: report.kind.title().to_owned(),
        severity: summary.severity(),
        footer: context.script.clone(),
        sections,
    }
}

fn digest_line(record: &OutcomeRecord) -> String {
    match record.image_id() {
        Some(image_id) => format!(
            "*{}* | _{}_ | {}",
            record.instance_name(),
            image_id,
            display_timestamp(record.created_at())
        ),
        None => format!(
            "{} | {MISSING_VALUE} | {MISSING_VALUE}",
            record.instance_name()
        ),
    }
}
