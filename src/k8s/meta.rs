//! Resource metadata and identity
//!
//! [`ObjectMeta`] is the canonical metadata block for every emitted resource.
//! [`ResourceRef`] is the immutable `{apiVersion, kind, name}` identity a
//! built resource exposes so dependents (autoscalers, ingress backends,
//! secret requests) reference it by value instead of sharing the object.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Trait for types with a compile-time known API version and kind
///
/// Implemented by every emitted resource so serialization defaults and
/// cross-references always agree on the same strings.
pub trait HasApiResource {
    /// Full API version (e.g. "apps/v1", "networking.k8s.io/v1")
    const API_VERSION: &'static str;
    /// Resource kind (e.g. "Deployment")
    const KIND: &'static str;
}

/// Implement `default_api_version()` / `default_kind()` for a type
/// implementing [`HasApiResource`], for use as serde field defaults.
macro_rules! impl_api_defaults {
    ($type:ty) => {
        impl $type {
            pub(crate) fn default_api_version() -> String {
                <Self as $crate::k8s::meta::HasApiResource>::API_VERSION.to_string()
            }
            pub(crate) fn default_kind() -> String {
                <Self as $crate::k8s::meta::HasApiResource>::KIND.to_string()
            }
        }
    };
}
pub(crate) use impl_api_defaults;

/// Standard Kubernetes ObjectMeta for emitted resources
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ObjectMeta {
    /// Resource name
    pub name: String,
    /// Resource namespace
    pub namespace: String,
    /// Labels
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub labels: BTreeMap<String, String>,
    /// Annotations
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub annotations: BTreeMap<String, String>,
}

impl ObjectMeta {
    /// Create new metadata with the standard managed-by label
    pub fn new(name: impl Into<String>, namespace: impl Into<String>) -> Self {
        let mut labels = BTreeMap::new();
        labels.insert(
            crate::LABEL_MANAGED_BY.to_string(),
            crate::LABEL_MANAGED_BY_STACKSMITH.to_string(),
        );
        Self {
            name: name.into(),
            namespace: namespace.into(),
            labels,
            annotations: BTreeMap::new(),
        }
    }

    /// Add a label
    pub fn with_label(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.labels.insert(key.into(), value.into());
        self
    }

    /// Add an annotation
    pub fn with_annotation(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.annotations.insert(key.into(), value.into());
        self
    }
}

/// Immutable identity of a built resource
///
/// Downstream resources embed this by value (HPA scale targets, secret-store
/// references), so cross-references are resolved in construction order with
/// no shared mutable objects.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ResourceRef {
    /// API version of the referenced resource
    pub api_version: String,
    /// Kind of the referenced resource
    pub kind: String,
    /// Name of the referenced resource
    pub name: String,
}

impl ResourceRef {
    /// Build a reference to a resource of type `T` with the given name
    pub fn to<T: HasApiResource>(name: impl Into<String>) -> Self {
        Self {
            api_version: T::API_VERSION.to_string(),
            kind: T::KIND.to_string(),
            name: name.into(),
        }
    }
}
