//! External Secrets Operator (ESO) resources
//!
//! Typed structs for the secret-provisioning pair: a namespaced SecretStore
//! pointing at AWS Secrets Manager, and an ExternalSecret that syncs a named
//! secret bundle into a cluster Secret owned by this declaration. Actual
//! secret retrieval is the operator's job, not ours.

use serde::{Deserialize, Serialize};

use super::meta::{impl_api_defaults, HasApiResource, ObjectMeta, ResourceRef};

// =============================================================================
// SecretStore
// =============================================================================

/// ESO SecretStore resource
///
/// Namespace-scoped store describing how the operator reaches the external
/// secret backend.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SecretStore {
    /// API version
    #[serde(default = "SecretStore::default_api_version")]
    pub api_version: String,
    /// Resource kind
    #[serde(default = "SecretStore::default_kind")]
    pub kind: String,
    /// Resource metadata
    pub metadata: ObjectMeta,
    /// Store specification
    pub spec: SecretStoreSpec,
}

impl HasApiResource for SecretStore {
    const API_VERSION: &'static str = "external-secrets.io/v1beta1";
    const KIND: &'static str = "SecretStore";
}

impl_api_defaults!(SecretStore);

impl SecretStore {
    /// Create a store backed by AWS Secrets Manager in the given region
    pub fn aws_secrets_manager(
        name: impl Into<String>,
        namespace: impl Into<String>,
        region: impl Into<String>,
    ) -> Self {
        Self {
            api_version: Self::default_api_version(),
            kind: Self::default_kind(),
            metadata: ObjectMeta::new(name, namespace),
            spec: SecretStoreSpec {
                provider: ProviderSpec {
                    aws: Some(AwsProvider {
                        service: "SecretsManager".to_string(),
                        region: region.into(),
                    }),
                },
            },
        }
    }

    /// Immutable identity for the ExternalSecret's store reference
    pub fn id(&self) -> ResourceRef {
        ResourceRef::to::<Self>(&self.metadata.name)
    }
}

/// SecretStore spec
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct SecretStoreSpec {
    /// Provider configuration
    pub provider: ProviderSpec,
}

/// Provider specification
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct ProviderSpec {
    /// AWS provider configuration
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub aws: Option<AwsProvider>,
}

/// AWS provider configuration
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct AwsProvider {
    /// AWS service backing the store (SecretsManager or ParameterStore)
    pub service: String,
    /// AWS region (a pipeline placeholder until deploy time)
    pub region: String,
}

// =============================================================================
// ExternalSecret
// =============================================================================

/// ESO ExternalSecret resource
///
/// Syncs a secret bundle from the referenced store into a Kubernetes Secret
/// on a fixed refresh interval.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ExternalSecret {
    /// API version
    #[serde(default = "ExternalSecret::default_api_version")]
    pub api_version: String,
    /// Resource kind
    #[serde(default = "ExternalSecret::default_kind")]
    pub kind: String,
    /// Resource metadata
    pub metadata: ObjectMeta,
    /// ExternalSecret specification
    pub spec: ExternalSecretSpec,
}

impl HasApiResource for ExternalSecret {
    const API_VERSION: &'static str = "external-secrets.io/v1beta1";
    const KIND: &'static str = "ExternalSecret";
}

impl_api_defaults!(ExternalSecret);

impl ExternalSecret {
    /// Create an ExternalSecret extracting one remote bundle
    ///
    /// `store` is the built SecretStore's identity; the reference embeds its
    /// name and kind, so the two can never drift apart. The target Secret is
    /// created with policy `Owner`: this declaration, not an external actor,
    /// is the source of truth for the Secret's lifecycle.
    pub fn extract_bundle(
        name: impl Into<String>,
        namespace: impl Into<String>,
        store: &ResourceRef,
        remote_key: impl Into<String>,
        target_secret: impl Into<String>,
        refresh_interval: impl Into<String>,
    ) -> Self {
        Self {
            api_version: Self::default_api_version(),
            kind: Self::default_kind(),
            metadata: ObjectMeta::new(name, namespace),
            spec: ExternalSecretSpec {
                refresh_interval: refresh_interval.into(),
                secret_store_ref: SecretStoreRef {
                    name: store.name.clone(),
                    kind: store.kind.clone(),
                },
                target: ExternalSecretTarget {
                    name: target_secret.into(),
                    creation_policy: "Owner".to_string(),
                },
                data_from: vec![ExternalSecretDataFrom {
                    extract: ExternalSecretExtract {
                        key: remote_key.into(),
                    },
                }],
            },
        }
    }
}

/// ExternalSecret spec
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ExternalSecretSpec {
    /// Sync interval (e.g. "5m")
    pub refresh_interval: String,
    /// Reference to the secret store
    pub secret_store_ref: SecretStoreRef,
    /// Target Kubernetes Secret configuration
    pub target: ExternalSecretTarget,
    /// Remote bundles to extract wholesale
    pub data_from: Vec<ExternalSecretDataFrom>,
}

/// Reference to a SecretStore by name and kind
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SecretStoreRef {
    /// Store name
    pub name: String,
    /// Store kind
    pub kind: String,
}

/// Target Kubernetes Secret configuration
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ExternalSecretTarget {
    /// Name of the Kubernetes Secret to create
    pub name: String,
    /// Creation policy (Owner: this resource manages the Secret's lifecycle)
    pub creation_policy: String,
}

/// Fetch all keys of a remote bundle
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ExternalSecretDataFrom {
    /// Extract from a specific remote key
    pub extract: ExternalSecretExtract,
}

/// Extract configuration for dataFrom
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ExternalSecretExtract {
    /// Remote key to extract (a pipeline placeholder until deploy time)
    pub key: String,
}

// =============================================================================
// Tests
// =============================================================================
