//! ConfigMap resource

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::meta::{impl_api_defaults, HasApiResource, ObjectMeta};

/// Kubernetes ConfigMap holding rendered config file content
///
/// Invariant: every value attached here has already had its known tokens
/// substituted. ConfigMaps carry final file content, not templates.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ConfigMap {
    /// API version
    #[serde(default = "ConfigMap::default_api_version")]
    pub api_version: String,
    /// Kind
    #[serde(default = "ConfigMap::default_kind")]
    pub kind: String,
    /// Metadata
    pub metadata: ObjectMeta,
    /// File name -> rendered content
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub data: BTreeMap<String, String>,
}

impl HasApiResource for ConfigMap {
    const API_VERSION: &'static str = "v1";
    const KIND: &'static str = "ConfigMap";
}

impl_api_defaults!(ConfigMap);

impl ConfigMap {
    /// Create a new empty ConfigMap
    pub fn new(name: impl Into<String>, namespace: impl Into<String>) -> Self {
        Self {
            api_version: Self::default_api_version(),
            kind: Self::default_kind(),
            metadata: ObjectMeta::new(name, namespace),
            data: BTreeMap::new(),
        }
    }

    /// Add a file entry
    pub fn with_data(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.data.insert(key.into(), value.into());
        self
    }
}
