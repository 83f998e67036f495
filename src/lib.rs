//! stacksmith - declarative manifest synthesis for the nginx + PHP-FPM stack
//!
//! This crate declares one fixed Kubernetes topology (an nginx reverse proxy
//! fronting a PHP-FPM application server) as a typed object graph and renders
//! it to a multi-document YAML manifest. There is no cluster interaction:
//! synthesis reads four local config templates, wires the application
//! server's cluster-local address into the proxy config, and serializes the
//! resulting resources.
//!
//! # Modules
//!
//! - [`profile`] - Per-service configuration records (labels, names, bounds)
//! - [`template`] - Config file loading and token substitution
//! - [`k8s`] - Typed Kubernetes resource definitions
//! - [`topology`] - The synthesis pass assembling the resource graph
//! - [`manifest`] - Multi-document YAML rendering
//! - [`error`] - Error types
//!
//! Placeholder tokens such as `<<NAMESPACE>>` are emitted verbatim; the
//! deployment pipeline substitutes them before the manifest is applied.

#![deny(missing_docs)]

pub mod error;
pub mod k8s;
pub mod manifest;
pub mod profile;
pub mod template;
pub mod topology;

pub use error::Error;

/// Result type alias using our custom Error type
pub type Result<T> = std::result::Result<T, Error>;

// =============================================================================
// Placeholder tokens resolved by the deployment pipeline, never by us
// =============================================================================

/// Target namespace, substituted per environment by the pipeline
pub const NAMESPACE_PLACEHOLDER: &str = "<<NAMESPACE>>";

/// nginx container image reference
pub const NGINX_IMAGE_PLACEHOLDER: &str = "<<NGINX_DOCKER_IMAGE_URL>>";

/// PHP-FPM container image reference
pub const PHP_FPM_IMAGE_PLACEHOLDER: &str = "<<PHP_FPM_DOCKER_IMAGE_URL>>";

/// AWS region for the secret-store provider
pub const AWS_REGION_PLACEHOLDER: &str = "<<AWS_REGION>>";

/// Secrets Manager lookup key for the application secret bundle
pub const SECRETS_MANAGER_KEY_PLACEHOLDER: &str = "<<AWS_SECRET_MANAGER_NAME>>";

/// Name prefix for the ALB and its target group
pub const ALB_NAME_PREFIX_PLACEHOLDER: &str = "<<AWS_ALB_NAME_PREFIX>>";

/// ACM certificate ARN for TLS termination at the load balancer
pub const CERTIFICATE_ARN_PLACEHOLDER: &str = "<<AWS_CERTIFICATE_ARN>>";

// =============================================================================
// Shared constants
// =============================================================================

/// Token in the nginx site config that receives the PHP-FPM upstream address
pub const PHPFPM_LOCATION_TOKEN: &str = "{{PHPFPM_LOCATION}}";

/// Label key marking resources as managed by this tool
pub const LABEL_MANAGED_BY: &str = "app.kubernetes.io/managed-by";

/// Label value for [`LABEL_MANAGED_BY`]
pub const LABEL_MANAGED_BY_STACKSMITH: &str = "stacksmith";

/// HTTP port served by nginx
pub const HTTP_PORT: u16 = 80;

/// FastCGI port served by PHP-FPM
pub const FPM_PORT: u16 = 9000;
