//! Deployment and pod template types
//!
//! The Deployment spec deliberately has no `replicas` field: the paired
//! HorizontalPodAutoscaler owns replica count, and emitting a literal count
//! here would fight the autoscaler on every apply.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::meta::{impl_api_defaults, HasApiResource, ObjectMeta, ResourceRef};

// =============================================================================
// Deployment
// =============================================================================

/// Kubernetes Deployment
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Deployment {
    /// API version
    #[serde(default = "Deployment::default_api_version")]
    pub api_version: String,
    /// Kind
    #[serde(default = "Deployment::default_kind")]
    pub kind: String,
    /// Metadata
    pub metadata: ObjectMeta,
    /// Spec
    pub spec: DeploymentSpec,
}

impl HasApiResource for Deployment {
    const API_VERSION: &'static str = "apps/v1";
    const KIND: &'static str = "Deployment";
}

impl_api_defaults!(Deployment);

impl Deployment {
    /// Create a new Deployment
    pub fn new(metadata: ObjectMeta, spec: DeploymentSpec) -> Self {
        Self {
            api_version: Self::default_api_version(),
            kind: Self::default_kind(),
            metadata,
            spec,
        }
    }

    /// Immutable identity for downstream references (e.g. HPA scale target)
    pub fn id(&self) -> ResourceRef {
        ResourceRef::to::<Self>(&self.metadata.name)
    }
}

/// Deployment spec
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DeploymentSpec {
    /// Label selector matching the pod template
    pub selector: LabelSelector,
    /// Pod template
    pub template: PodTemplateSpec,
}

/// Label selector
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct LabelSelector {
    /// Match labels
    pub match_labels: BTreeMap<String, String>,
}

/// Pod template spec
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PodTemplateSpec {
    /// Pod metadata
    pub metadata: PodMeta,
    /// Pod spec
    pub spec: PodSpec,
}

/// Pod metadata (labels only)
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PodMeta {
    /// Labels
    pub labels: BTreeMap<String, String>,
}

/// Pod spec
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PodSpec {
    /// Containers
    pub containers: Vec<Container>,
    /// Volumes
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub volumes: Vec<Volume>,
}

// =============================================================================
// Container
// =============================================================================

/// Container spec
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Container {
    /// Container name
    pub name: String,
    /// Image reference (a pipeline placeholder until deploy time)
    pub image: String,
    /// Ports
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub ports: Vec<ContainerPort>,
    /// Environment from ConfigMap/Secret references
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub env_from: Vec<EnvFromSource>,
    /// Volume mounts
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub volume_mounts: Vec<VolumeMount>,
    /// Readiness probe - removes the pod from service endpoints on failure
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub readiness_probe: Option<ProbeSpec>,
    /// Liveness probe - restarts the container on failure
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub liveness_probe: Option<ProbeSpec>,
    /// Security context
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub security_context: Option<SecurityContext>,
}

impl Container {
    /// Create a container with just a name and image
    pub fn new(name: impl Into<String>, image: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            image: image.into(),
            ports: vec![],
            env_from: vec![],
            volume_mounts: vec![],
            readiness_probe: None,
            liveness_probe: None,
            security_context: None,
        }
    }

    /// Expose a container port
    pub fn with_port(mut self, port: u16) -> Self {
        self.ports.push(ContainerPort {
            container_port: port,
        });
        self
    }

    /// Load all keys of a Secret as environment variables
    pub fn with_env_from_secret(mut self, secret_name: impl Into<String>) -> Self {
        self.env_from.push(EnvFromSource {
            secret_ref: Some(SecretEnvSource {
                name: secret_name.into(),
            }),
        });
        self
    }

    /// Mount a single file from a volume via subPath
    pub fn with_file_mount(mut self, mount: VolumeMount) -> Self {
        self.volume_mounts.push(mount);
        self
    }

    /// Set the readiness probe
    pub fn with_readiness(mut self, probe: ProbeSpec) -> Self {
        self.readiness_probe = Some(probe);
        self
    }

    /// Set the liveness probe
    pub fn with_liveness(mut self, probe: ProbeSpec) -> Self {
        self.liveness_probe = Some(probe);
        self
    }

    /// Add Linux capabilities to the container
    pub fn with_added_capabilities(mut self, caps: &[&str]) -> Self {
        self.security_context = Some(SecurityContext {
            capabilities: Some(Capabilities {
                add: caps.iter().map(|c| c.to_string()).collect(),
            }),
        });
        self
    }
}

/// Container port
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ContainerPort {
    /// Port number
    pub container_port: u16,
}

/// Reference to a ConfigMap or Secret for loading env vars
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct EnvFromSource {
    /// Secret reference
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub secret_ref: Option<SecretEnvSource>,
}

/// Reference to a Secret for env vars
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct SecretEnvSource {
    /// Secret name
    pub name: String,
}

/// Container security context
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SecurityContext {
    /// Capabilities to add
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub capabilities: Option<Capabilities>,
}

/// Linux capabilities for containers
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Capabilities {
    /// Capabilities to add
    pub add: Vec<String>,
}

// =============================================================================
// Probes
// =============================================================================

/// Probe specification - maps 1:1 with the Kubernetes probe spec
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ProbeSpec {
    /// HTTP GET probe
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub http_get: Option<HttpGetAction>,
    /// Exec probe
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exec: Option<ExecAction>,
    /// Seconds after container start before probes begin
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub initial_delay_seconds: Option<u32>,
    /// Seconds between probe attempts
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub period_seconds: Option<u32>,
    /// Seconds before the probe times out
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout_seconds: Option<u32>,
    /// Consecutive successes before marking healthy
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub success_threshold: Option<u32>,
    /// Consecutive failures before marking unhealthy
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub failure_threshold: Option<u32>,
}

/// The health check a probe performs
#[derive(Clone, Debug, PartialEq)]
pub enum ProbeCheck {
    /// HTTP GET against a path and port
    HttpGet {
        /// Request path
        path: String,
        /// Target port
        port: u16,
    },
    /// Command executed inside the container
    Exec {
        /// Command and arguments
        command: Vec<String>,
    },
}

impl ProbeSpec {
    /// Create a probe from a check, with no timing fields set
    pub fn from_check(check: ProbeCheck) -> Self {
        match check {
            ProbeCheck::HttpGet { path, port } => Self {
                http_get: Some(HttpGetAction { path, port }),
                ..Self::default()
            },
            ProbeCheck::Exec { command } => Self {
                exec: Some(ExecAction { command }),
                ..Self::default()
            },
        }
    }
}

/// HTTP GET action for a probe
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct HttpGetAction {
    /// Path
    pub path: String,
    /// Port
    pub port: u16,
}

/// Exec action for a probe
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ExecAction {
    /// Command
    pub command: Vec<String>,
}

// =============================================================================
// Volumes
// =============================================================================

/// Volume
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Volume {
    /// Volume name
    pub name: String,
    /// ConfigMap source
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub config_map: Option<ConfigMapVolumeSource>,
}

impl Volume {
    /// Create a volume projecting a single key of a ConfigMap as a file
    ///
    /// The key doubles as the in-volume path, matching the subPath used by
    /// the corresponding mount.
    pub fn config_map_item(
        name: impl Into<String>,
        config_map_name: impl Into<String>,
        key: impl Into<String>,
    ) -> Self {
        let key = key.into();
        Self {
            name: name.into(),
            config_map: Some(ConfigMapVolumeSource {
                name: config_map_name.into(),
                items: vec![KeyToPath {
                    key: key.clone(),
                    path: key,
                }],
            }),
        }
    }
}

/// ConfigMap volume source
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ConfigMapVolumeSource {
    /// ConfigMap name
    pub name: String,
    /// Keys to project
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub items: Vec<KeyToPath>,
}

/// Projection of a ConfigMap key to a path inside the volume
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct KeyToPath {
    /// ConfigMap key
    pub key: String,
    /// Relative path within the volume
    pub path: String,
}

/// Volume mount
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct VolumeMount {
    /// Volume name
    pub name: String,
    /// Mount path
    pub mount_path: String,
    /// Sub path within the volume
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sub_path: Option<String>,
}

impl VolumeMount {
    /// Mount a single file from a volume at an exact path
    pub fn file(
        name: impl Into<String>,
        mount_path: impl Into<String>,
        sub_path: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            mount_path: mount_path.into(),
            sub_path: Some(sub_path.into()),
        }
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deployment_id_matches_metadata() {
        let deploy = Deployment::new(
            ObjectMeta::new("nginx-deploy", "<<NAMESPACE>>"),
            DeploymentSpec {
                selector: LabelSelector {
                    match_labels: BTreeMap::new(),
                },
                template: PodTemplateSpec {
                    metadata: PodMeta {
                        labels: BTreeMap::new(),
                    },
                    spec: PodSpec {
                        containers: vec![],
                        volumes: vec![],
                    },
                },
            },
        );

        let id = deploy.id();
        assert_eq!(id.api_version, "apps/v1");
        assert_eq!(id.kind, "Deployment");
        assert_eq!(id.name, "nginx-deploy");
    }

    #[test]
    fn test_deployment_spec_has_no_replicas_field() {
        // The HPA owns replica count; the serialized spec must not carry one.
        let spec = DeploymentSpec {
            selector: LabelSelector {
                match_labels: BTreeMap::new(),
            },
            template: PodTemplateSpec {
                metadata: PodMeta {
                    labels: BTreeMap::new(),
                },
                spec: PodSpec {
                    containers: vec![],
                    volumes: vec![],
                },
            },
        };
        let json = serde_json::to_string(&spec).unwrap();
        assert!(!json.contains("replicas"));
    }

    #[test]
    fn test_container_builder_chain() {
        let container = Container::new("php-fpm", "<<PHP_FPM_DOCKER_IMAGE_URL>>")
            .with_port(9000)
            .with_env_from_secret("laravel-secrets")
            .with_added_capabilities(&["SYS_PTRACE"]);

        let json = serde_json::to_value(&container).unwrap();
        assert_eq!(json["ports"][0]["containerPort"], 9000);
        assert_eq!(json["envFrom"][0]["secretRef"]["name"], "laravel-secrets");
        assert_eq!(
            json["securityContext"]["capabilities"]["add"][0],
            "SYS_PTRACE"
        );
    }

    #[test]
    fn test_probe_from_http_check() {
        let probe = ProbeSpec::from_check(ProbeCheck::HttpGet {
            path: "/nginx_status".to_string(),
            port: 80,
        });
        let json = serde_json::to_value(&probe).unwrap();
        assert_eq!(json["httpGet"]["path"], "/nginx_status");
        assert_eq!(json["httpGet"]["port"], 80);
        assert!(json.get("exec").is_none());
    }

    #[test]
    fn test_probe_from_exec_check() {
        let probe = ProbeSpec::from_check(ProbeCheck::Exec {
            command: vec!["php-fpm-healthcheck".to_string()],
        });
        let json = serde_json::to_value(&probe).unwrap();
        assert_eq!(json["exec"]["command"][0], "php-fpm-healthcheck");
        assert!(json.get("httpGet").is_none());
    }

    #[test]
    fn test_config_map_item_volume_projects_key_as_path() {
        let volume = Volume::config_map_item("nginx-site", "nginx-configmap", "default.conf");
        let json = serde_json::to_value(&volume).unwrap();
        assert_eq!(json["configMap"]["name"], "nginx-configmap");
        assert_eq!(json["configMap"]["items"][0]["key"], "default.conf");
        assert_eq!(json["configMap"]["items"][0]["path"], "default.conf");
    }

    #[test]
    fn test_file_mount_serialization() {
        let mount = VolumeMount::file(
            "nginx-site",
            "/etc/nginx/conf.d/default.conf",
            "default.conf",
        );
        let json = serde_json::to_value(&mount).unwrap();
        assert_eq!(json["mountPath"], "/etc/nginx/conf.d/default.conf");
        assert_eq!(json["subPath"], "default.conf");
    }
}
