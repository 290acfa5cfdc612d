use chrono::{DateTime, Utc};
use imagekeeper_core::AppResult;
use imagekeeper_domain::{
    CREATED_BY_TAG, INSTANCE_ID_TAG, INSTANCE_NAME_TAG, Instance, NAME_TAG, OutcomeRecord,
    PROVENANCE_MARKER, PassKind, PassReport, ResourceTag,
};
use tracing::{error, info};

use super::{BackupService, IMAGE_NAME_TIMESTAMP_FORMAT};
use crate::backup_ports::CreateImageRequest;

impl BackupService {
    /// Requests one image per discovered instance and tags each new image
    /// with its source instance.
    pub async fn create_backups(&self, now: DateTime<Utc>) -> AppResult<PassReport> {
        let mut report = PassReport::new(PassKind::Create, now);
        let instances = self.inventory.find_instances(&self.selector).await?;
        let timestamp = now.format(IMAGE_NAME_TIMESTAMP_FORMAT).to_string();

        for instance in &instances {
            let record = self.create_backup(instance, &timestamp, now).await;
            report.record(record);
        }

        Ok(report)
    }

    async fn create_backup(
        &self,
        instance: &Instance,
        timestamp: &str,
        now: DateTime<Utc>,
    ) -> OutcomeRecord {
        let instance_id = instance.instance_id.as_str();
        let instance_name = instance.display_name();
        let image_name = format!("{instance_name}_{timestamp}");

        let request = CreateImageRequest {
            instance_id: instance_id.to_owned(),
            name: image_name.clone(),
            description: format!("Automated backup for [{instance_name}]"),
            no_reboot: true,
        };

        let image_id = match self.inventory.create_image(request).await {
            Ok(Some(image_id)) => image_id,
            Ok(None) => {
                error!(
                    instance_id,
                    instance_name = %instance_name,
                    image_name = %image_name,
                    "image request returned no image id"
                );
                return OutcomeRecord::create_failed(instance_id, instance_name, image_name, now);
            }
            Err(error) => {
                error!(
                    instance_id,
                    instance_name = %instance_name,
                    image_name = %image_name,
                    error = %error,
                    "failed to request image"
                );
                return OutcomeRecord::create_failed(instance_id, instance_name, image_name, now);
            }
        };

        info!(
            instance_id,
            instance_name = %instance_name,
            image_id = %image_id,
            image_name = %image_name,
            "image created"
        );

        match provenance_tags(instance, &instance_name) {
            Ok(tags) => {
                if let Err(error) = self.inventory.tag_resource(&image_id, &tags).await {
                    error!(
                        instance_id,
                        image_id = %image_id,
                        error = %error,
                        "failed to tag image with its source instance"
                    );
                }
            }
            Err(error) => {
                error!(
                    instance_id,
                    image_id = %image_id,
                    error = %error,
                    "failed to build image tags"
                );
            }
        }

        OutcomeRecord::created(instance_id, instance_name, image_id, image_name, now)
    }
}

/// Tags linking an image to its source instance.
fn provenance_tags(instance: &Instance, instance_name: &str) -> AppResult<Vec<ResourceTag>> {
    Ok(vec![
        ResourceTag::new(NAME_TAG, instance.full_name())?,
        ResourceTag::new(INSTANCE_ID_TAG, instance.instance_id.as_str())?,
        ResourceTag::new(INSTANCE_NAME_TAG, instance_name)?,
        ResourceTag::new("instance_type", instance.instance_type.as_str())?,
        ResourceTag::new(
            "instance_keyname",
            instance.key_name.as_deref().unwrap_or_default(),
        )?,
        ResourceTag::new("instance_state", instance.state.as_str())?,
        ResourceTag::new("instance_avail_zone", instance.availability_zone.as_str())?,
        ResourceTag::new("instance_sec_groups", instance.security_group_ids.join(","))?,
        ResourceTag::new(CREATED_BY_TAG, PROVENANCE_MARKER)?,
    ])
}
