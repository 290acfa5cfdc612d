use chrono::{DateTime, Utc};
use imagekeeper_core::AppResult;
use imagekeeper_domain::{Image, ImageQuery, OutcomeRecord, PassKind, PassReport};
use tracing::{error, info};

use super::BackupService;

impl BackupService {
    /// Deregisters tagged images older than the retention window together
    /// with their snapshots.
    ///
    /// Images without the provenance tag, or newer than the cutoff, are left
    /// alone and produce no record.
    pub async fn prune_backups(&self, now: DateTime<Utc>) -> AppResult<PassReport> {
        let mut report = PassReport::new(PassKind::Prune, now);
        let expiry_cutoff = self.policy.expiry_cutoff(now);
        report.variable("Expiration date", expiry_cutoff.to_rfc3339());

        let images = self.inventory.find_images(&ImageQuery::prunable()).await?;
        for image in &images {
            if image.source_instance_id().is_none() || image.created_at >= expiry_cutoff {
                continue;
            }

            let record = self.prune_image(image).await;
            report.record(record);
        }

        Ok(report)
    }

    async fn prune_image(&self, image: &Image) -> OutcomeRecord {
        let image_id = image.image_id.as_str();
        let instance_id = image.source_instance_id().map(str::to_owned);
        let instance_name = image.source_instance_name().unwrap_or_default();
        let created_at = image.created_at.to_rfc3339();

        if let Err(error) = self.inventory.deregister_image(image_id).await {
            error!(
                image_id,
                instance_id = instance_id.as_deref().unwrap_or_default(),
                instance_name = %instance_name,
                created_at = %created_at,
                error = %error,
                "failed to deregister expired image"
            );
            return OutcomeRecord::delete_failed(
                instance_id,
                instance_name,
                image_id,
                image.name.as_str(),
                image.created_at,
            );
        }

        info!(
            image_id,
            instance_id = instance_id.as_deref().unwrap_or_default(),
            instance_name = %instance_name,
            created_at = %created_at,
            "expired image deregistered"
        );

        for snapshot_id in &image.snapshot_ids {
            match self.inventory.delete_snapshot(snapshot_id).await {
                Ok(()) => info!(
                    image_id,
                    snapshot_id = %snapshot_id,
                    "snapshot deleted"
                ),
                Err(error) => error!(
                    image_id,
                    snapshot_id = %snapshot_id,
                    error = %error,
                    "failed to delete snapshot"
                ),
            }
        }

        OutcomeRecord::deleted(
            instance_id,
            instance_name,
            image_id,
            image.name.as_str(),
            image.created_at,
        )
    }
}
