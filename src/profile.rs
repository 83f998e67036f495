//! Per-service configuration records
//!
//! A [`ServiceProfile`] captures everything that distinguishes one logical
//! service in the topology: its pod selector label, namespace, stable service
//! name, and replica bounds. Profiles are built once from literal constants
//! and are immutable; every resource builder in [`crate::topology`] is
//! parameterized by one.

use std::collections::BTreeMap;

/// Pod selector label key shared by both services
pub const APP_LABEL_KEY: &str = "app";

/// Replica bounds enforced by the service's autoscaler
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ReplicaBounds {
    /// Minimum replica count
    pub min: u32,
    /// Maximum replica count
    pub max: u32,
}

/// Immutable configuration record for one logical service
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ServiceProfile {
    /// Value for the `app` selector label (e.g. `nginx-web`)
    pub app: String,
    /// Namespace all of the service's resources land in
    pub namespace: String,
    /// Name of the service's Service resource
    pub service_name: String,
    /// Replica bounds for the service's autoscaler
    pub replicas: ReplicaBounds,
}

impl ServiceProfile {
    /// Create a new profile
    pub fn new(
        app: impl Into<String>,
        namespace: impl Into<String>,
        service_name: impl Into<String>,
        replicas: ReplicaBounds,
    ) -> Self {
        Self {
            app: app.into(),
            namespace: namespace.into(),
            service_name: service_name.into(),
            replicas,
        }
    }

    /// The pod selector label map (`app: <value>`)
    ///
    /// Used for the Deployment selector, the pod template labels, and the
    /// Service selector, so all three always agree.
    pub fn selector(&self) -> BTreeMap<String, String> {
        let mut labels = BTreeMap::new();
        labels.insert(APP_LABEL_KEY.to_string(), self.app.clone());
        labels
    }

    /// The service's in-cluster DNS address for the given port
    ///
    /// `<service>.<namespace>.svc.cluster.local:<port>`. This is the value
    /// substituted into the proxy config, so it must be derivable before any
    /// of the service's own resources exist.
    pub fn cluster_local_address(&self, port: u16) -> String {
        format!(
            "{}.{}.svc.cluster.local:{}",
            self.service_name, self.namespace, port
        )
    }
}
