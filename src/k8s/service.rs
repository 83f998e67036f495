//! Service resource
//!
//! Exposure is a typed enum rather than a free string: the topology depends
//! on only the web tier being reachable from outside the cluster, and that
//! asymmetry should not be falsifiable by a typo.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::meta::{impl_api_defaults, HasApiResource, ObjectMeta, ResourceRef};

/// How a Service is exposed
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub enum ServiceType {
    /// Reachable only inside the cluster
    #[serde(rename = "ClusterIP")]
    ClusterIp,
    /// Exposed on every node's network, reachable from outside the cluster
    NodePort,
}

impl ServiceType {
    /// Whether traffic from outside the cluster can reach this service
    pub fn is_externally_reachable(self) -> bool {
        matches!(self, ServiceType::NodePort)
    }
}

/// Kubernetes Service
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Service {
    /// API version
    #[serde(default = "Service::default_api_version")]
    pub api_version: String,
    /// Kind
    #[serde(default = "Service::default_kind")]
    pub kind: String,
    /// Metadata
    pub metadata: ObjectMeta,
    /// Spec
    pub spec: ServiceSpec,
}

impl HasApiResource for Service {
    const API_VERSION: &'static str = "v1";
    const KIND: &'static str = "Service";
}

impl_api_defaults!(Service);

impl Service {
    /// Create a new Service
    pub fn new(metadata: ObjectMeta, spec: ServiceSpec) -> Self {
        Self {
            api_version: Self::default_api_version(),
            kind: Self::default_kind(),
            metadata,
            spec,
        }
    }

    /// Immutable identity for downstream references (e.g. ingress backend)
    pub fn id(&self) -> ResourceRef {
        ResourceRef::to::<Self>(&self.metadata.name)
    }
}

/// Service spec
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ServiceSpec {
    /// Exposure type
    #[serde(rename = "type")]
    pub type_: ServiceType,
    /// Ports
    pub ports: Vec<ServicePort>,
    /// Pod selector
    pub selector: BTreeMap<String, String>,
}

/// Service port
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ServicePort {
    /// Port name
    pub name: String,
    /// Port number
    pub port: u16,
    /// Target port on the pod
    pub target_port: u16,
    /// Protocol
    pub protocol: String,
}

impl ServicePort {
    /// Create a TCP port forwarding to the same pod port
    pub fn tcp(name: impl Into<String>, port: u16) -> Self {
        Self {
            name: name.into(),
            port,
            target_port: port,
            protocol: "TCP".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_service_type_serialization() {
        assert_eq!(
            serde_json::to_value(ServiceType::ClusterIp).unwrap(),
            "ClusterIP"
        );
        assert_eq!(
            serde_json::to_value(ServiceType::NodePort).unwrap(),
            "NodePort"
        );
    }

    #[test]
    fn test_only_node_port_is_externally_reachable() {
        assert!(ServiceType::NodePort.is_externally_reachable());
        assert!(!ServiceType::ClusterIp.is_externally_reachable());
    }

    #[test]
    fn test_service_serialization() {
        let mut selector = BTreeMap::new();
        selector.insert("app".to_string(), "nginx-web".to_string());

        let svc = Service::new(
            ObjectMeta::new("nginx-serv", "<<NAMESPACE>>"),
            ServiceSpec {
                type_: ServiceType::NodePort,
                ports: vec![ServicePort::tcp("http-port", 80)],
                selector,
            },
        );

        let json = serde_json::to_value(&svc).unwrap();
        assert_eq!(json["spec"]["type"], "NodePort");
        assert_eq!(json["spec"]["ports"][0]["name"], "http-port");
        assert_eq!(json["spec"]["ports"][0]["port"], 80);
        assert_eq!(json["spec"]["ports"][0]["targetPort"], 80);
        assert_eq!(json["spec"]["ports"][0]["protocol"], "TCP");
        assert_eq!(json["spec"]["selector"]["app"], "nginx-web");

        assert_eq!(svc.id().kind, "Service");
        assert_eq!(svc.id().name, "nginx-serv");
    }
}
