use async_trait::async_trait;
use imagekeeper_core::AppResult;
use imagekeeper_domain::{Image, ImageQuery, Instance, ResourceTag};

/// Image creation request for one instance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateImageRequest {
    /// Source instance.
    pub instance_id: String,
    /// Image name.
    pub name: String,
    /// Image description.
    pub description: String,
    /// Take the image without stopping or restarting the instance.
    pub no_reboot: bool,
}

/// Port for the cloud compute inventory.
///
/// Every call is one blocking round trip; implementations do not retry.
#[async_trait]
pub trait ComputeInventory: Send + Sync {
    /// Lists instances carrying `tag` with its exact value.
    async fn find_instances(&self, tag: &ResourceTag) -> AppResult<Vec<Instance>>;

    /// Lists images matching every filter of `query`.
    async fn find_images(&self, query: &ImageQuery) -> AppResult<Vec<Image>>;

    /// Requests an image; returns its id, or `None` when the API returned nothing.
    async fn create_image(&self, request: CreateImageRequest) -> AppResult<Option<String>>;

    /// Applies tags to a resource.
    async fn tag_resource(&self, resource_id: &str, tags: &[ResourceTag]) -> AppResult<()>;

    /// Deregisters an image. Its snapshots are left in place.
    async fn deregister_image(&self, image_id: &str) -> AppResult<()>;

    /// Deletes a storage snapshot.
    async fn delete_snapshot(&self, snapshot_id: &str) -> AppResult<()>;
}
