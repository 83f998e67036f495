//! Ingress resource (networking.k8s.io/v1)
//!
//! Controller-specific behavior (TLS termination, HTTPS redirect, load
//! balancer grouping, deregistration delay) is expressed as opaque
//! annotations passed through verbatim; this crate does not interpret or
//! validate them.

use serde::{Deserialize, Serialize};

use super::meta::{impl_api_defaults, HasApiResource, ObjectMeta};

/// Kubernetes Ingress
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Ingress {
    /// API version
    #[serde(default = "Ingress::default_api_version")]
    pub api_version: String,
    /// Kind
    #[serde(default = "Ingress::default_kind")]
    pub kind: String,
    /// Metadata (annotations carry the controller configuration)
    pub metadata: ObjectMeta,
    /// Spec
    pub spec: IngressSpec,
}

impl HasApiResource for Ingress {
    const API_VERSION: &'static str = "networking.k8s.io/v1";
    const KIND: &'static str = "Ingress";
}

impl_api_defaults!(Ingress);

impl Ingress {
    /// Create a new Ingress
    pub fn new(metadata: ObjectMeta, spec: IngressSpec) -> Self {
        Self {
            api_version: Self::default_api_version(),
            kind: Self::default_kind(),
            metadata,
            spec,
        }
    }
}

/// Ingress spec
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct IngressSpec {
    /// Ingress class handled by the external controller
    pub ingress_class_name: String,
    /// Routing rules
    pub rules: Vec<IngressRule>,
}

/// One routing rule
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct IngressRule {
    /// HTTP paths for this rule
    pub http: HttpIngressRuleValue,
}

/// HTTP paths of a rule
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct HttpIngressRuleValue {
    /// Paths
    pub paths: Vec<HttpIngressPath>,
}

/// One path -> backend mapping
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct HttpIngressPath {
    /// Request path
    pub path: String,
    /// Match type (Prefix, Exact, ImplementationSpecific)
    pub path_type: String,
    /// Backend receiving matched traffic
    pub backend: IngressBackend,
}

impl HttpIngressPath {
    /// Prefix-match `path` and route it to a service port
    pub fn prefix(path: impl Into<String>, service_name: impl Into<String>, port: u16) -> Self {
        Self {
            path: path.into(),
            path_type: "Prefix".to_string(),
            backend: IngressBackend {
                service: IngressServiceBackend {
                    name: service_name.into(),
                    port: ServiceBackendPort { number: port },
                },
            },
        }
    }
}

/// Ingress backend
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct IngressBackend {
    /// Service backend
    pub service: IngressServiceBackend,
}

/// Service referenced by an ingress backend
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct IngressServiceBackend {
    /// Service name
    pub name: String,
    /// Service port
    pub port: ServiceBackendPort,
}

/// Port of a service backend
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ServiceBackendPort {
    /// Port number
    pub number: u16,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prefix_path_shape() {
        let path = HttpIngressPath::prefix("/", "nginx-serv", 80);
        let json = serde_json::to_value(&path).unwrap();
        assert_eq!(json["path"], "/");
        assert_eq!(json["pathType"], "Prefix");
        assert_eq!(json["backend"]["service"]["name"], "nginx-serv");
        assert_eq!(json["backend"]["service"]["port"]["number"], 80);
    }

    #[test]
    fn test_annotations_pass_through_verbatim() {
        let ingress = Ingress::new(
            ObjectMeta::new("nginx-ingress", "<<NAMESPACE>>")
                .with_annotation("alb.ingress.kubernetes.io/ssl-redirect", "443")
                .with_annotation(
                    "alb.ingress.kubernetes.io/listen-ports",
                    r#"[{"HTTP": 80}, {"HTTPS":443}]"#,
                ),
            IngressSpec {
                ingress_class_name: "alb".to_string(),
                rules: vec![IngressRule {
                    http: HttpIngressRuleValue {
                        paths: vec![HttpIngressPath::prefix("/", "nginx-serv", 80)],
                    },
                }],
            },
        );

        let json = serde_json::to_value(&ingress).unwrap();
        assert_eq!(json["apiVersion"], "networking.k8s.io/v1");
        assert_eq!(json["spec"]["ingressClassName"], "alb");
        assert_eq!(
            json["metadata"]["annotations"]["alb.ingress.kubernetes.io/listen-ports"],
            r#"[{"HTTP": 80}, {"HTTPS":443}]"#
        );
    }
}
