//! Wire types for the gateway's ACL and consumer resources.
//!
//! # Design
//! Field names are fixed by the gateway's JSON. Optional fields are
//! `Option`s and are left out of the serialized form when absent, so a
//! request never carries `null` for something the caller did not set.

use serde::{Deserialize, Deserializer, Serialize};

/// One membership record linking a consumer to an access group.
///
/// The `id` is assigned by the gateway; it is `None` only when the gateway
/// answered without creating anything.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Acl {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub created_at: Option<i64>,
    #[serde(default)]
    pub group: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub consumer_id: Option<String>,
}

/// Payload for adding a consumer to a group.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AclRequest {
    pub group: String,
}

impl AclRequest {
    pub fn new(group: &str) -> Self {
        Self {
            group: group.to_string(),
        }
    }
}

/// Equality predicates for narrowing a list query.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct AclFilter {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub consumer_id: Option<String>,
}

impl AclFilter {
    pub fn by_id(id: &str) -> Self {
        Self {
            id: Some(id.to_string()),
            consumer_id: None,
        }
    }

    pub fn by_consumer_id(consumer_id: &str) -> Self {
        Self {
            id: None,
            consumer_id: Some(consumer_id.to_string()),
        }
    }
}

/// A page of ACL records.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Acls {
    #[serde(
        rename = "data",
        default,
        deserialize_with = "null_as_default",
        skip_serializing_if = "Vec::is_empty"
    )]
    pub results: Vec<Acl>,
    #[serde(default, deserialize_with = "null_as_default", skip_serializing_if = "is_zero")]
    pub total: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub offset: Option<String>,
}

fn is_zero(n: &i64) -> bool {
    *n == 0
}

/// An API caller identity owning ACL memberships.
///
/// A missing `id` decodes to the empty string; lookups treat that as "no
/// consumer".
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Consumer {
    #[serde(
        default,
        deserialize_with = "null_as_default",
        skip_serializing_if = "String::is_empty"
    )]
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<i64>,
}

/// `null` decodes like a missing field: to the type's zero value.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}
