use chrono::{DateTime, Utc};
use imagekeeper_core::AppResult;
use imagekeeper_domain::{
    AuditCutoffs, Image, ImageQuery, Instance, OutcomeRecord, PassKind, PassReport,
};
use tracing::{error, warn};

use super::BackupService;

impl BackupService {
    /// Checks that every discovered instance has a recent image and no
    /// images past the expiry grace period.
    ///
    /// Emits failure records only; an instance with nothing to report
    /// contributes no record.
    pub async fn audit_backups(&self, now: DateTime<Utc>) -> AppResult<PassReport> {
        let mut report = PassReport::new(PassKind::Audit, now);
        let cutoffs = self.policy.audit_cutoffs(now);
        report.variable("Latest backup date", cutoffs.recent_backup_cutoff.to_rfc3339());
        report.variable("Oldest backup date", cutoffs.expired_backup_cutoff.to_rfc3339());

        let instances = self.inventory.find_instances(&self.selector).await?;
        for instance in &instances {
            for record in self.audit_instance(instance, &cutoffs).await {
                report.record(record);
            }
        }

        Ok(report)
    }

    async fn audit_instance(
        &self,
        instance: &Instance,
        cutoffs: &AuditCutoffs,
    ) -> Vec<OutcomeRecord> {
        let instance_id = instance.instance_id.as_str();
        let instance_name = instance.display_name();
        let query = ImageQuery::available_for_instance(instance_id);

        let images = match self.inventory.find_images(&query).await {
            Ok(images) => images,
            Err(error) => {
                error!(
                    instance_id,
                    instance_name = %instance_name,
                    error = %error,
                    "failed to list images for instance"
                );
                return vec![OutcomeRecord::missing(instance_id, instance_name)];
            }
        };

        if images.is_empty() {
            warn!(
                instance_id,
                instance_name = %instance_name,
                "no images found for instance"
            );
            return vec![OutcomeRecord::missing(instance_id, instance_name)];
        }

        evaluate_images(instance_id, &instance_name, images, cutoffs)
    }
}

/// Freshness and expiry verdicts for the images of one instance.
fn evaluate_images(
    instance_id: &str,
    instance_name: &str,
    mut images: Vec<Image>,
    cutoffs: &AuditCutoffs,
) -> Vec<OutcomeRecord> {
    // Newest first; equal timestamps keep inventory order.
    images.sort_by(|left, right| right.created_at.cmp(&left.created_at));

    let mut records = Vec::new();

    if let Some(newest) = images
        .first()
        .filter(|newest| newest.created_at < cutoffs.recent_backup_cutoff)
    {
        warn!(
            instance_id,
            instance_name,
            image_id = %newest.image_id,
            created_at = %newest.created_at.to_rfc3339(),
            "most recent image is stale"
        );
        records.push(OutcomeRecord::stale(
            instance_id,
            instance_name,
            newest.image_id.as_str(),
            newest.name.as_str(),
            newest.created_at,
        ));
    }

    for image in images
        .iter()
        .filter(|image| image.created_at < cutoffs.expired_backup_cutoff)
    {
        warn!(
            instance_id,
            instance_name,
            image_id = %image.image_id,
            created_at = %image.created_at.to_rfc3339(),
            "expired image was not pruned"
        );
        records.push(OutcomeRecord::expired(
            instance_id,
            instance_name,
            image.image_id.as_str(),
            image.name.as_str(),
            image.created_at,
        ));
    }

    records
}
