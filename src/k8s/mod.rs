//! Typed Kubernetes resource definitions
//!
//! Hand-rolled serde structs for the resource kinds this topology emits.
//! Each type maps 1:1 onto the Kubernetes API shape (camelCase fields,
//! optional fields omitted from output) and carries its API version and kind
//! via [`meta::HasApiResource`]. Construction is builder-style; nothing here
//! talks to a cluster.

pub mod autoscaler;
pub mod config_map;
pub mod eso;
pub mod ingress;
pub mod meta;
pub mod service;
pub mod workload;

pub use autoscaler::{HorizontalPodAutoscaler, HpaBehavior, ScalingPolicy, ScalingRules};
pub use config_map::ConfigMap;
pub use eso::{ExternalSecret, SecretStore};
pub use ingress::Ingress;
pub use meta::{HasApiResource, ObjectMeta, ResourceRef};
pub use service::{Service, ServicePort, ServiceType};
pub use workload::{Container, Deployment, ProbeSpec, Volume, VolumeMount};
