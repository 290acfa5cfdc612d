//! Compute inventory backed by the EC2 API.

use async_trait::async_trait;
use aws_sdk_ec2::Client;
use aws_sdk_ec2::error::DisplayErrorContext;
use aws_sdk_ec2::types::{Filter, Tag};
use chrono::{DateTime, Utc};
use imagekeeper_application::{ComputeInventory, CreateImageRequest};
use imagekeeper_core::{AppError, AppResult};
use imagekeeper_domain::{Image, ImageFilter, ImageQuery, Instance, OwnerScope, ResourceTag};
use tracing::warn;

/// EC2 implementation of the compute inventory port.
#[derive(Clone)]
pub struct Ec2ComputeInventory {
    client: Client,
}

impl Ec2ComputeInventory {
    /// Creates an inventory over an EC2 client.
    #[must_use]
    pub fn new(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl ComputeInventory for Ec2ComputeInventory {
    async fn find_instances(&self, tag: &ResourceTag) -> AppResult<Vec<Instance>> {
        let filter = Filter::builder()
            .name(format!("tag:{}", tag.key()))
            .values(tag.value())
            .build();
        let mut instances = Vec::new();
        let mut next_token: Option<String> = None;

        loop {
            let output = self
                .client
                .describe_instances()
                .filters(filter.clone())
                .set_next_token(next_token.take())
                .send()
                .await
                .map_err(|error| external_error("describe_instances", error))?;

            for instance in output
                .reservations()
                .iter()
                .flat_map(|reservation| reservation.instances())
            {
                match instance_from_sdk(instance) {
                    Some(instance) => instances.push(instance),
                    None => warn!("skipping instance without an instance id"),
                }
            }

            next_token = output.next_token().map(str::to_owned);
            if next_token.is_none() {
                break;
            }
        }

        Ok(instances)
    }

    async fn find_images(&self, query: &ImageQuery) -> AppResult<Vec<Image>> {
        let filters = image_filters(query);
        let owners = match query.owner {
            OwnerScope::Any => None,
            OwnerScope::SelfOwned => Some(vec!["self".to_owned()]),
        };
        let mut images = Vec::new();
        let mut next_token: Option<String> = None;

        loop {
            let output = self
                .client
                .describe_images()
                .set_filters(Some(filters.clone()))
                .set_owners(owners.clone())
                .set_next_token(next_token.take())
                .send()
                .await
                .map_err(|error| external_error("describe_images", error))?;

            for image in output.images() {
                match image_from_sdk(image) {
                    Ok(image) => images.push(image),
                    Err(error) => warn!(
                        image_id = image.image_id().unwrap_or_default(),
                        error = %error,
                        "skipping image with unusable metadata"
                    ),
                }
            }

            next_token = output.next_token().map(str::to_owned);
            if next_token.is_none() {
                break;
            }
        }

        Ok(images)
    }

    async fn create_image(&self, request: CreateImageRequest) -> AppResult<Option<String>> {
        let output = self
            .client
            .create_image()
            .instance_id(request.instance_id)
            .name(request.name)
            .description(request.description)
            .no_reboot(request.no_reboot)
            .send()
            .await
            .map_err(|error| external_error("create_image", error))?;

        Ok(output
            .image_id()
            .filter(|image_id| !image_id.is_empty())
            .map(str::to_owned))
    }

    async fn tag_resource(&self, resource_id: &str, tags: &[ResourceTag]) -> AppResult<()> {
        let tags = tags
            .iter()
            .map(|tag| Tag::builder().key(tag.key()).value(tag.value()).build())
            .collect();

        self.client
            .create_tags()
            .resources(resource_id)
            .set_tags(Some(tags))
            .send()
            .await
            .map_err(|error| external_error("create_tags", error))?;

        Ok(())
    }

    async fn deregister_image(&self, image_id: &str) -> AppResult<()> {
        self.client
            .deregister_image()
            .image_id(image_id)
            .send()
            .await
            .map_err(|error| external_error("deregister_image", error))?;

        Ok(())
    }

    async fn delete_snapshot(&self, snapshot_id: &str) -> AppResult<()> {
        self.client
            .delete_snapshot()
            .snapshot_id(snapshot_id)
            .send()
            .await
            .map_err(|error| external_error("delete_snapshot", error))?;

        Ok(())
    }
}

fn external_error<E: std::error::Error>(operation: &str, error: E) -> AppError {
    AppError::External(format!(
        "ec2 {operation} failed: {}",
        DisplayErrorContext(error)
    ))
}

fn image_filters(query: &ImageQuery) -> Vec<Filter> {
    query
        .filters
        .iter()
        .map(|filter| match filter {
            ImageFilter::Tag { key, value } => Filter::builder()
                .name(format!("tag:{key}"))
                .values(value)
                .build(),
            ImageFilter::TagKey(key) => Filter::builder().name("tag-key").values(key).build(),
            ImageFilter::Available => Filter::builder().name("state").values("available").build(),
        })
        .collect()
}

fn tags_from_sdk(tags: &[Tag]) -> Vec<ResourceTag> {
    tags.iter()
        .filter_map(|tag| ResourceTag::new(tag.key()?, tag.value().unwrap_or_default()).ok())
        .collect()
}

fn instance_from_sdk(instance: &aws_sdk_ec2::types::Instance) -> Option<Instance> {
    let instance_id = instance.instance_id().filter(|id| !id.is_empty())?;

    Some(Instance {
        instance_id: instance_id.to_owned(),
        tags: tags_from_sdk(instance.tags()),
        instance_type: instance
            .instance_type()
            .map(|instance_type| instance_type.as_str().to_owned())
            .unwrap_or_default(),
        key_name: instance.key_name().map(str::to_owned),
        state: instance
            .state()
            .and_then(|state| state.name())
            .map(|name| name.as_str().to_owned())
            .unwrap_or_default(),
        availability_zone: instance
            .placement()
            .and_then(|placement| placement.availability_zone())
            .unwrap_or_default()
            .to_owned(),
        security_group_ids: instance
            .security_groups()
            .iter()
            .filter_map(|group| group.group_id())
            .filter(|group_id| !group_id.is_empty())
            .map(str::to_owned)
            .collect(),
    })
}

fn image_from_sdk(image: &aws_sdk_ec2::types::Image) -> AppResult<Image> {
    let image_id = image
        .image_id()
        .filter(|id| !id.is_empty())
        .ok_or_else(|| AppError::Validation("image has no image id".to_owned()))?;
    let creation_date = image.creation_date().ok_or_else(|| {
        AppError::Validation(format!("image '{image_id}' has no creation date"))
    })?;
    let created_at = DateTime::parse_from_rfc3339(creation_date)
        .map_err(|error| {
            AppError::Validation(format!(
                "image '{image_id}' has invalid creation date '{creation_date}': {error}"
            ))
        })?
        .with_timezone(&Utc);

    Ok(Image {
        image_id: image_id.to_owned(),
        name: image.name().unwrap_or_default().to_owned(),
        created_at,
        tags: tags_from_sdk(image.tags()),
        snapshot_ids: image
            .block_device_mappings()
            .iter()
            .filter_map(|mapping| mapping.ebs())
            .filter_map(|ebs| ebs.snapshot_id())
            .map(str::to_owned)
            .collect(),
    })
}
