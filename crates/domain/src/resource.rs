//! Compute inventory resources as seen by the backup policies.

use chrono::{DateTime, Utc};
use imagekeeper_core::{AppResult, NonEmptyString};
use serde::{Deserialize, Serialize};

use crate::naming::normalize_instance_name;

/// Tag key holding the human-readable resource name.
pub const NAME_TAG: &str = "Name";
/// Tag key linking an image to its source instance. Only images carrying it are prunable.
pub const INSTANCE_ID_TAG: &str = "instance_id";
/// Tag key holding the normalized source instance name on an image.
pub const INSTANCE_NAME_TAG: &str = "instance_name";
/// Tag key marking who created an image.
pub const CREATED_BY_TAG: &str = "CreatedBy";
/// Value written under [`CREATED_BY_TAG`] on every image this tool creates.
pub const PROVENANCE_MARKER: &str = "imagekeeper";

/// One key/value tag on a cloud resource.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ResourceTag {
    key: NonEmptyString,
    value: String,
}

impl ResourceTag {
    /// Creates a tag with a non-empty key.
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> AppResult<Self> {
        Ok(Self {
            key: NonEmptyString::new(key)?,
            value: value.into(),
        })
    }

    /// Returns the tag key.
    #[must_use]
    pub fn key(&self) -> &str {
        self.key.as_str()
    }

    /// Returns the tag value.
    #[must_use]
    pub fn value(&self) -> &str {
        self.value.as_str()
    }
}

fn find_tag<'a>(tags: &'a [ResourceTag], key: &str) -> Option<&'a str> {
    tags.iter()
        .find(|tag| tag.key() == key)
        .map(ResourceTag::value)
}

/// A compute instance subject to backup policy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Instance {
    /// Instance identifier.
    pub instance_id: String,
    /// All tags on the instance, including `Name`.
    pub tags: Vec<ResourceTag>,
    /// Instance type, e.g. `t3.medium`.
    pub instance_type: String,
    /// Key pair the instance was launched with.
    pub key_name: Option<String>,
    /// Power state, e.g. `running`.
    pub state: String,
    /// Availability zone the instance is placed in.
    pub availability_zone: String,
    /// Attached security group identifiers.
    pub security_group_ids: Vec<String>,
}

impl Instance {
    /// Returns the value of a tag, if present.
    #[must_use]
    pub fn tag(&self, key: &str) -> Option<&str> {
        find_tag(&self.tags, key)
    }

    /// Returns the raw `Name` tag, falling back to the instance id.
    #[must_use]
    pub fn full_name(&self) -> &str {
        self.tag(NAME_TAG)
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .unwrap_or(self.instance_id.as_str())
    }

    /// Returns the normalized display name.
    #[must_use]
    pub fn display_name(&self) -> String {
        normalize_instance_name(self.full_name())
    }
}

/// A machine image, the backup artifact.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Image {
    /// Image identifier.
    pub image_id: String,
    /// Image name.
    pub name: String,
    /// Creation time reported by the inventory.
    pub created_at: DateTime<Utc>,
    /// All tags on the image.
    pub tags: Vec<ResourceTag>,
    /// Storage snapshots referenced by the image's block-device mappings.
    pub snapshot_ids: Vec<String>,
}

impl Image {
    /// Returns the value of a tag, if present.
    #[must_use]
    pub fn tag(&self, key: &str) -> Option<&str> {
        find_tag(&self.tags, key)
    }

    /// Returns the source instance id from the provenance tag.
    #[must_use]
    pub fn source_instance_id(&self) -> Option<&str> {
        self.tag(INSTANCE_ID_TAG)
    }

    /// Returns the source instance display name recorded on the image.
    ///
    /// Prefers the `instance_name` tag, then the normalized `Name` tag, then
    /// the source instance id. `instance_name` is already normalized on images
    /// carrying the provenance marker and is normalized here for any other.
    #[must_use]
    pub fn source_instance_name(&self) -> Option<String> {
        let created_here = self.tag(CREATED_BY_TAG) == Some(PROVENANCE_MARKER);

        self.tag(INSTANCE_NAME_TAG)
            .map(|name| {
                if created_here {
                    name.trim().to_owned()
                } else {
                    normalize_instance_name(name)
                }
            })
            .filter(|name| !name.is_empty())
            .or_else(|| {
                self.tag(NAME_TAG)
                    .map(normalize_instance_name)
                    .filter(|name| !name.is_empty())
            })
            .or_else(|| self.source_instance_id().map(str::to_owned))
    }
}

/// Filter applied to an image lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImageFilter {
    /// Image carries `key` with exactly `value`.
    Tag {
        /// Tag key.
        key: String,
        /// Required tag value.
        value: String,
    },
    /// Image carries `key` with any value.
    TagKey(String),
    /// Image is in the `available` state.
    Available,
}

/// Account scope for an image lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OwnerScope {
    /// Any image visible to the caller.
    #[default]
    Any,
    /// Only images owned by the calling account.
    SelfOwned,
}

/// Image lookup: every filter must match.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ImageQuery {
    /// Filters combined with AND.
    pub filters: Vec<ImageFilter>,
    /// Owner scope.
    pub owner: OwnerScope,
}

impl ImageQuery {
    /// Completed images created from one instance.
    #[must_use]
    pub fn available_for_instance(instance_id: &str) -> Self {
        Self {
            filters: vec![
                ImageFilter::Tag {
                    key: INSTANCE_ID_TAG.to_owned(),
                    value: instance_id.to_owned(),
                },
                ImageFilter::Available,
            ],
            owner: OwnerScope::Any,
        }
    }

    /// Completed, self-owned images carrying the provenance tag.
    #[must_use]
    pub fn prunable() -> Self {
        Self {
            filters: vec![
                ImageFilter::TagKey(INSTANCE_ID_TAG.to_owned()),
                ImageFilter::Available,
            ],
            owner: OwnerScope::SelfOwned,
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;

    fn tag(key: &str, value: &str) -> ResourceTag {
        ResourceTag::new(key, value).unwrap_or_else(|_| unreachable!())
    }

    fn image_with_tags(tags: Vec<ResourceTag>) -> Image {
        Image {
            image_id: "ami-1".to_owned(),
            name: "web01_2026-01-01T00-00-00".to_owned(),
            created_at: Utc::now(),
            tags,
            snapshot_ids: Vec::new(),
        }
    }

    #[test]
    fn tag_rejects_blank_key() {
        assert!(ResourceTag::new(" ", "value").is_err());
    }

    #[test]
    fn instance_without_name_tag_is_displayed_by_id() {
        let instance = Instance {
            instance_id: "i-0abc".to_owned(),
            tags: vec![tag("Environment", "production")],
            instance_type: "t3.micro".to_owned(),
            key_name: None,
            state: "running".to_owned(),
            availability_zone: "us-east-1a".to_owned(),
            security_group_ids: Vec::new(),
        };

        assert_eq!(instance.full_name(), "i-0abc");
        assert_eq!(instance.display_name(), "i-0abc");
    }

    #[test]
    fn image_source_name_prefers_instance_name_tag() {
        let image = image_with_tags(vec![
            tag(NAME_TAG, "prod:web01.example.com"),
            tag(INSTANCE_NAME_TAG, "web01"),
            tag(INSTANCE_ID_TAG, "i-1"),
        ]);

        assert_eq!(image.source_instance_name().as_deref(), Some("web01"));
        assert_eq!(image.source_instance_id(), Some("i-1"));
    }

    #[test]
    fn foreign_instance_name_tag_is_normalized() {
        let image = image_with_tags(vec![tag(INSTANCE_NAME_TAG, "prod:web01.example.com")]);

        assert_eq!(image.source_instance_name().as_deref(), Some("web01"));
    }

    #[test]
    fn own_instance_name_tag_is_not_normalized_twice() {
        let image = image_with_tags(vec![
            tag(INSTANCE_NAME_TAG, "db:replica"),
            tag(CREATED_BY_TAG, PROVENANCE_MARKER),
        ]);

        assert_eq!(image.source_instance_name().as_deref(), Some("db:replica"));
    }

    #[test]
    fn image_source_name_falls_back_to_normalized_name_tag() {
        let image = image_with_tags(vec![tag(NAME_TAG, "prod:db02.example.com")]);

        assert_eq!(image.source_instance_name().as_deref(), Some("db02"));
        assert_eq!(image.source_instance_id(), None);
    }

    #[test]
    fn prunable_query_is_scoped_to_own_tagged_images() {
        let query = ImageQuery::prunable();

        assert_eq!(query.owner, OwnerScope::SelfOwned);
        assert!(
            query
                .filters
                .contains(&ImageFilter::TagKey(INSTANCE_ID_TAG.to_owned()))
        );
        assert!(query.filters.contains(&ImageFilter::Available));
    }
}
