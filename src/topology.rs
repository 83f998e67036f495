//! The topology synthesis pass
//!
//! One fixed topology: an nginx reverse proxy fronting a PHP-FPM application
//! server, plus the secret-provisioning pair the application consumes. Not a
//! generic engine: the shape is hardcoded and parameterized only by the two
//! [`ServiceProfile`]s and the policy constants below. Both services run
//! through the same builders, so their probe and autoscaler shapes cannot
//! drift apart.
//!
//! Construction order matters once: the web config map embeds the app
//! service's cluster-local address, so both profiles exist before any
//! resource is built. Everything else is a linear pass; resources are built
//! once and referenced by their immutable identity afterwards.

use tracing::{debug, info};

use crate::k8s::workload::{
    Container, DeploymentSpec, LabelSelector, PodMeta, PodSpec, PodTemplateSpec, ProbeCheck,
    ProbeSpec, Volume, VolumeMount,
};
use crate::k8s::{
    ConfigMap, Deployment, ExternalSecret, HorizontalPodAutoscaler, HpaBehavior, Ingress,
    ObjectMeta, ResourceRef, ScalingPolicy, ScalingRules, SecretStore, Service, ServicePort,
    ServiceType,
};
use crate::k8s::autoscaler::{HpaSpec, MetricSpec};
use crate::k8s::ingress::{HttpIngressPath, HttpIngressRuleValue, IngressRule, IngressSpec};
use crate::k8s::service::ServiceSpec;
use crate::manifest::Manifest;
use crate::profile::{ReplicaBounds, ServiceProfile};
use crate::template::{
    self, ConfigDir, FPM_DOCKER_CONFIG, FPM_POOL_CONFIG, NGINX_MAIN_CONFIG, NGINX_SITE_CONFIG,
};
use crate::{Result, FPM_PORT, HTTP_PORT};

// =============================================================================
// Resource names
// =============================================================================

/// Web-tier ConfigMap name
pub const WEB_CONFIG_MAP_NAME: &str = "nginx-configmap";
/// App-tier ConfigMap name
pub const APP_CONFIG_MAP_NAME: &str = "php-fpm-configmap";
/// Web-tier Deployment name
pub const WEB_DEPLOYMENT_NAME: &str = "nginx-deploy";
/// App-tier Deployment name
pub const APP_DEPLOYMENT_NAME: &str = "php-fpm-deploy";
/// Web-tier Service name
pub const WEB_SERVICE_NAME: &str = "nginx-serv";
/// App-tier Service name
pub const APP_SERVICE_NAME: &str = "php-fpm-serv";
/// Web-tier autoscaler name
pub const WEB_HPA_NAME: &str = "nginx-hpa";
/// App-tier autoscaler name
pub const APP_HPA_NAME: &str = "php-fpm-hpa";
/// Ingress name
pub const INGRESS_NAME: &str = "nginx-ingress";
/// SecretStore name
pub const SECRET_STORE_NAME: &str = "laravel-secret-store";
/// ExternalSecret name
pub const EXTERNAL_SECRET_NAME: &str = "laravel-external-secret";
/// Cluster Secret materialized by the ExternalSecret, consumed by the app pod
pub const APP_SECRET_NAME: &str = "laravel-secrets";

/// nginx stub_status endpoint probed for health
const NGINX_STATUS_PATH: &str = "/nginx_status";

/// How often the ExternalSecret re-syncs from the backend
const SECRET_REFRESH_INTERVAL: &str = "5m";

// =============================================================================
// Policy constants
// =============================================================================
// These are policy, not derived values: the same numbers apply to both
// services by construction.

const REPLICA_BOUNDS: ReplicaBounds = ReplicaBounds { min: 1, max: 50 };

const CPU_TARGET_PERCENT: u32 = 50;
const SCALE_UP_WINDOW_SECS: u32 = 10;
const SCALE_UP_PERCENT_STEP: u32 = 100;
const SCALE_UP_PODS_STEP: u32 = 4;
const SCALE_UP_PERIOD_SECS: u32 = 15;
const SCALE_DOWN_WINDOW_SECS: u32 = 300;
const SCALE_DOWN_PODS_STEP: u32 = 1;
const SCALE_DOWN_PERIOD_SECS: u32 = 300;

const READINESS_SUCCESS_THRESHOLD: u32 = 1;
const READINESS_FAILURE_THRESHOLD: u32 = 3;
const READINESS_PERIOD_SECS: u32 = 5;
const READINESS_TIMEOUT_SECS: u32 = 2;
const LIVENESS_INITIAL_DELAY_SECS: u32 = 0;
const LIVENESS_PERIOD_SECS: u32 = 10;

// =============================================================================
// Compiler
// =============================================================================

/// Compiles the fixed web/app topology into its resource graph
pub struct TopologyCompiler {
    config: ConfigDir,
    instance: String,
}

impl TopologyCompiler {
    /// Create a compiler reading templates from `config`
    ///
    /// `instance` suffixes the pod selector labels (`nginx-<instance>`,
    /// `php-fpm-<instance>`) so multiple instances can coexist in one
    /// namespace without their selectors overlapping.
    pub fn new(config: ConfigDir, instance: impl Into<String>) -> Self {
        Self {
            config,
            instance: instance.into(),
        }
    }

    /// Run the synthesis pass
    ///
    /// Fails only on a missing or unreadable config template; no partial
    /// topology is ever returned.
    pub fn compile(&self) -> Result<Topology> {
        let web = ServiceProfile::new(
            format!("nginx-{}", self.instance),
            crate::NAMESPACE_PLACEHOLDER,
            WEB_SERVICE_NAME,
            REPLICA_BOUNDS,
        );
        let app = ServiceProfile::new(
            format!("php-fpm-{}", self.instance),
            crate::NAMESPACE_PLACEHOLDER,
            APP_SERVICE_NAME,
            REPLICA_BOUNDS,
        );

        // The web config map depends on the app profile (upstream address),
        // so it is built first, before any app resource exists.
        let fpm_address = app.cluster_local_address(FPM_PORT);
        debug!(address = %fpm_address, "resolved PHP-FPM upstream address");

        let web_config_map = ConfigMap::new(WEB_CONFIG_MAP_NAME, &web.namespace)
            .with_data(
                "default.conf",
                template::substitute_once(
                    &self.config.load(NGINX_SITE_CONFIG)?,
                    crate::PHPFPM_LOCATION_TOKEN,
                    &fpm_address,
                ),
            )
            .with_data("nginx.conf", self.config.load(NGINX_MAIN_CONFIG)?);

        let app_config_map = ConfigMap::new(APP_CONFIG_MAP_NAME, &app.namespace)
            .with_data("www.conf", self.config.load(FPM_POOL_CONFIG)?)
            .with_data("docker.conf", self.config.load(FPM_DOCKER_CONFIG)?);

        let secret_store = SecretStore::aws_secrets_manager(
            SECRET_STORE_NAME,
            &app.namespace,
            crate::AWS_REGION_PLACEHOLDER,
        );
        let external_secret = ExternalSecret::extract_bundle(
            EXTERNAL_SECRET_NAME,
            &app.namespace,
            &secret_store.id(),
            crate::SECRETS_MANAGER_KEY_PLACEHOLDER,
            APP_SECRET_NAME,
            SECRET_REFRESH_INTERVAL,
        );

        let web_deployment = build_deployment(
            WEB_DEPLOYMENT_NAME,
            &web,
            Container::new("nginx", crate::NGINX_IMAGE_PLACEHOLDER)
                .with_port(HTTP_PORT)
                .with_file_mount(VolumeMount::file(
                    "nginx-site",
                    "/etc/nginx/conf.d/default.conf",
                    "default.conf",
                ))
                .with_file_mount(VolumeMount::file(
                    "nginx-cfg",
                    "/etc/nginx/nginx.conf",
                    "nginx.conf",
                ))
                .with_readiness(readiness_probe(ProbeCheck::HttpGet {
                    path: NGINX_STATUS_PATH.to_string(),
                    port: HTTP_PORT,
                }))
                .with_liveness(liveness_probe(ProbeCheck::HttpGet {
                    path: NGINX_STATUS_PATH.to_string(),
                    port: HTTP_PORT,
                })),
            vec![
                Volume::config_map_item("nginx-site", WEB_CONFIG_MAP_NAME, "default.conf"),
                Volume::config_map_item("nginx-cfg", WEB_CONFIG_MAP_NAME, "nginx.conf"),
            ],
        );

        let app_deployment = build_deployment(
            APP_DEPLOYMENT_NAME,
            &app,
            Container::new("php-fpm", crate::PHP_FPM_IMAGE_PLACEHOLDER)
                .with_port(FPM_PORT)
                // php-fpm-healthcheck reads the FPM status page through the
                // pool socket; SYS_PTRACE lets it inspect worker state.
                .with_added_capabilities(&["SYS_PTRACE"])
                .with_env_from_secret(APP_SECRET_NAME)
                .with_file_mount(VolumeMount::file(
                    "fpm-config",
                    "/usr/local/etc/php-fpm.d/www.conf",
                    "www.conf",
                ))
                .with_file_mount(VolumeMount::file(
                    "fpm-config-docker",
                    "/usr/local/etc/php-fpm.d/docker.conf",
                    "docker.conf",
                ))
                .with_readiness(readiness_probe(ProbeCheck::Exec {
                    command: vec!["php-fpm-healthcheck".to_string()],
                }))
                .with_liveness(liveness_probe(ProbeCheck::Exec {
                    command: vec![
                        "php-fpm-healthcheck".to_string(),
                        "--listen-queue=10".to_string(),
                    ],
                })),
            vec![
                Volume::config_map_item("fpm-config", APP_CONFIG_MAP_NAME, "www.conf"),
                Volume::config_map_item("fpm-config-docker", APP_CONFIG_MAP_NAME, "docker.conf"),
            ],
        );

        // Only the web tier is reachable from outside the cluster; the app
        // tier stays cluster-internal behind the proxy.
        let web_service = build_service(&web, "http-port", HTTP_PORT, ServiceType::NodePort);
        let app_service = build_service(&app, "fpm-port", FPM_PORT, ServiceType::ClusterIp);

        let web_autoscaler = build_autoscaler(WEB_HPA_NAME, &web, web_deployment.id());
        let app_autoscaler = build_autoscaler(APP_HPA_NAME, &app, app_deployment.id());

        let ingress = build_ingress(&web.namespace, &web_service.id());

        let topology = Topology {
            web_config_map,
            app_config_map,
            secret_store,
            external_secret,
            web_deployment,
            app_deployment,
            web_service,
            app_service,
            web_autoscaler,
            app_autoscaler,
            ingress,
        };
        info!(
            resources = topology.resource_count(),
            instance = %self.instance,
            "compiled topology"
        );
        Ok(topology)
    }
}

// =============================================================================
// Parameterized builders
// =============================================================================

/// Readiness probe with the shared timing policy around the given check
fn readiness_probe(check: ProbeCheck) -> ProbeSpec {
    ProbeSpec {
        success_threshold: Some(READINESS_SUCCESS_THRESHOLD),
        failure_threshold: Some(READINESS_FAILURE_THRESHOLD),
        period_seconds: Some(READINESS_PERIOD_SECS),
        timeout_seconds: Some(READINESS_TIMEOUT_SECS),
        ..ProbeSpec::from_check(check)
    }
}

/// Liveness probe with the shared timing policy around the given check
fn liveness_probe(check: ProbeCheck) -> ProbeSpec {
    ProbeSpec {
        initial_delay_seconds: Some(LIVENESS_INITIAL_DELAY_SECS),
        period_seconds: Some(LIVENESS_PERIOD_SECS),
        ..ProbeSpec::from_check(check)
    }
}

/// Build a single-container Deployment for a service profile
///
/// Selector, pod labels, and namespace all come from the profile. No
/// `replicas` is emitted: the paired autoscaler owns replica count.
fn build_deployment(
    name: &str,
    profile: &ServiceProfile,
    container: Container,
    volumes: Vec<Volume>,
) -> Deployment {
    Deployment::new(
        ObjectMeta::new(name, &profile.namespace),
        DeploymentSpec {
            selector: LabelSelector {
                match_labels: profile.selector(),
            },
            template: PodTemplateSpec {
                metadata: PodMeta {
                    labels: profile.selector(),
                },
                spec: PodSpec {
                    containers: vec![container],
                    volumes,
                },
            },
        },
    )
}

/// Build a single-port Service for a service profile
fn build_service(
    profile: &ServiceProfile,
    port_name: &str,
    port: u16,
    type_: ServiceType,
) -> Service {
    Service::new(
        ObjectMeta::new(&profile.service_name, &profile.namespace),
        ServiceSpec {
            type_,
            ports: vec![ServicePort::tcp(port_name, port)],
            selector: profile.selector(),
        },
    )
}

/// Build the autoscaler for a workload, identical in shape for both services
fn build_autoscaler(
    name: &str,
    profile: &ServiceProfile,
    target: ResourceRef,
) -> HorizontalPodAutoscaler {
    HorizontalPodAutoscaler::new(
        ObjectMeta::new(name, &profile.namespace),
        HpaSpec {
            scale_target_ref: target,
            min_replicas: profile.replicas.min,
            max_replicas: profile.replicas.max,
            metrics: vec![MetricSpec::cpu_utilization(CPU_TARGET_PERCENT)],
            behavior: Some(HpaBehavior {
                scale_up: Some(ScalingRules {
                    stabilization_window_seconds: SCALE_UP_WINDOW_SECS,
                    policies: vec![
                        ScalingPolicy::percent(SCALE_UP_PERCENT_STEP, SCALE_UP_PERIOD_SECS),
                        ScalingPolicy::pods(SCALE_UP_PODS_STEP, SCALE_UP_PERIOD_SECS),
                    ],
                }),
                scale_down: Some(ScalingRules {
                    stabilization_window_seconds: SCALE_DOWN_WINDOW_SECS,
                    policies: vec![ScalingPolicy::pods(
                        SCALE_DOWN_PODS_STEP,
                        SCALE_DOWN_PERIOD_SECS,
                    )],
                }),
            }),
        },
    )
}

/// Build the ingress routing all inbound HTTP(S) traffic to the web service
///
/// The ALB annotation block is the external controller's contract and passes
/// through verbatim, placeholders included.
fn build_ingress(namespace: &str, web_service: &ResourceRef) -> Ingress {
    let metadata = ObjectMeta::new(INGRESS_NAME, namespace)
        .with_annotation(
            "alb.ingress.kubernetes.io/load-balancer-name",
            format!("{}-alb", crate::ALB_NAME_PREFIX_PLACEHOLDER),
        )
        .with_annotation("alb.ingress.kubernetes.io/scheme", "internet-facing")
        .with_annotation(
            "alb.ingress.kubernetes.io/group.name",
            format!("{}-tg", crate::ALB_NAME_PREFIX_PLACEHOLDER),
        )
        .with_annotation("alb.ingress.kubernetes.io/target-type", "ip")
        .with_annotation(
            "alb.ingress.kubernetes.io/certificate-arn",
            crate::CERTIFICATE_ARN_PLACEHOLDER,
        )
        .with_annotation(
            "alb.ingress.kubernetes.io/listen-ports",
            r#"[{"HTTP": 80}, {"HTTPS":443}]"#,
        )
        .with_annotation("alb.ingress.kubernetes.io/ssl-redirect", "443")
        .with_annotation(
            "alb.ingress.kubernetes.io/target-group-attributes",
            "deregistration_delay.timeout_seconds=30",
        );

    Ingress::new(
        metadata,
        IngressSpec {
            ingress_class_name: "alb".to_string(),
            rules: vec![IngressRule {
                http: HttpIngressRuleValue {
                    paths: vec![HttpIngressPath::prefix(
                        "/",
                        web_service.name.as_str(),
                        HTTP_PORT,
                    )],
                },
            }],
        },
    )
}

// =============================================================================
// Output
// =============================================================================

/// The complete compiled resource graph
///
/// Every field is built exactly once per pass and never mutated afterwards.
#[derive(Clone, Debug)]
pub struct Topology {
    /// Web-tier ConfigMap (rendered nginx configs)
    pub web_config_map: ConfigMap,
    /// App-tier ConfigMap (PHP-FPM configs, verbatim)
    pub app_config_map: ConfigMap,
    /// SecretStore for the external secret backend
    pub secret_store: SecretStore,
    /// ExternalSecret materializing the app secret bundle
    pub external_secret: ExternalSecret,
    /// Web-tier Deployment
    pub web_deployment: Deployment,
    /// App-tier Deployment
    pub app_deployment: Deployment,
    /// Web-tier Service (externally reachable)
    pub web_service: Service,
    /// App-tier Service (cluster-internal)
    pub app_service: Service,
    /// Web-tier autoscaler
    pub web_autoscaler: HorizontalPodAutoscaler,
    /// App-tier autoscaler
    pub app_autoscaler: HorizontalPodAutoscaler,
    /// Ingress routing external traffic to the web service
    pub ingress: Ingress,
}

impl Topology {
    /// Number of resources in the graph
    pub fn resource_count(&self) -> usize {
        11
    }

    /// Collect the graph into a manifest, in dependency order
    ///
    /// Config maps and the secret pair come first, then workloads, services,
    /// autoscalers, and finally the ingress, in the same order the resources
    /// were declared in.
    pub fn manifest(&self) -> Result<Manifest> {
        let mut manifest = Manifest::new();
        manifest.push(&self.web_config_map)?;
        manifest.push(&self.app_config_map)?;
        manifest.push(&self.secret_store)?;
        manifest.push(&self.external_secret)?;
        manifest.push(&self.web_deployment)?;
        manifest.push(&self.app_deployment)?;
        manifest.push(&self.web_service)?;
        manifest.push(&self.app_service)?;
        manifest.push(&self.web_autoscaler)?;
        manifest.push(&self.app_autoscaler)?;
        manifest.push(&self.ingress)?;
        Ok(manifest)
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    const SITE_TEMPLATE: &str = "server {\n    fastcgi_pass {{PHPFPM_LOCATION}};\n}\n";

    fn fixture_config() -> (TempDir, ConfigDir) {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir(dir.path().join("nginx")).unwrap();
        fs::create_dir(dir.path().join("php-fpm")).unwrap();
        fs::write(dir.path().join(NGINX_SITE_CONFIG), SITE_TEMPLATE).unwrap();
        fs::write(
            dir.path().join(NGINX_MAIN_CONFIG),
            "worker_processes auto;\n",
        )
        .unwrap();
        fs::write(
            dir.path().join(FPM_POOL_CONFIG),
            "[www]\nlisten = 9000\n",
        )
        .unwrap();
        fs::write(
            dir.path().join(FPM_DOCKER_CONFIG),
            "[global]\nerror_log = /proc/self/fd/2\n",
        )
        .unwrap();
        let config = ConfigDir::new(dir.path());
        (dir, config)
    }

    fn compile() -> Topology {
        let (_dir, config) = fixture_config();
        let topology = TopologyCompiler::new(config, "web").compile().unwrap();
        // _dir dropped here: compile reads everything up front
        topology
    }

    // =========================================================================
    // Story: the proxy config is wired to the app service
    // =========================================================================

    #[test]
    fn story_web_config_embeds_resolved_fpm_address_exactly_once() {
        let topology = compile();
        let site = topology.web_config_map.data.get("default.conf").unwrap();

        assert!(!site.contains("{{PHPFPM_LOCATION}}"));
        let address = "php-fpm-serv.<<NAMESPACE>>.svc.cluster.local:9000";
        assert_eq!(site.matches(address).count(), 1);
    }

    #[test]
    fn story_app_config_is_untouched() {
        let topology = compile();
        assert_eq!(
            topology.app_config_map.data.get("www.conf").unwrap(),
            "[www]\nlisten = 9000\n"
        );
        assert_eq!(
            topology.app_config_map.data.get("docker.conf").unwrap(),
            "[global]\nerror_log = /proc/self/fd/2\n"
        );
    }

    #[test]
    fn story_missing_template_aborts_synthesis() {
        let (dir, config) = fixture_config();
        fs::remove_file(dir.path().join(FPM_POOL_CONFIG)).unwrap();

        let err = TopologyCompiler::new(config, "web").compile().unwrap_err();
        match err {
            crate::Error::ConfigLoad { path, .. } => {
                assert!(path.ends_with("php-fpm/www.conf"));
            }
            other => panic!("expected ConfigLoad, got {other:?}"),
        }
    }

    // =========================================================================
    // Story: only the web tier is externally reachable
    // =========================================================================

    #[test]
    fn story_service_exposure_asymmetry() {
        let topology = compile();

        assert_ne!(
            topology.web_service.metadata.name,
            topology.app_service.metadata.name
        );
        assert!(topology
            .web_service
            .spec
            .type_
            .is_externally_reachable());
        assert!(!topology
            .app_service
            .spec
            .type_
            .is_externally_reachable());
    }

    #[test]
    fn test_service_ports() {
        let topology = compile();
        let web_port = &topology.web_service.spec.ports[0];
        assert_eq!((web_port.name.as_str(), web_port.port), ("http-port", 80));
        let app_port = &topology.app_service.spec.ports[0];
        assert_eq!((app_port.name.as_str(), app_port.port), ("fpm-port", 9000));
    }

    // =========================================================================
    // Story: both autoscalers carry the same policy
    // =========================================================================

    #[test]
    fn story_autoscaler_policy() {
        let topology = compile();

        for hpa in [&topology.web_autoscaler, &topology.app_autoscaler] {
            assert_eq!(hpa.spec.min_replicas, 1);
            assert_eq!(hpa.spec.max_replicas, 50);

            assert_eq!(hpa.spec.metrics.len(), 1);
            let resource = hpa.spec.metrics[0].resource.as_ref().unwrap();
            assert_eq!(resource.name, "cpu");
            assert_eq!(resource.target.average_utilization, Some(50));

            let behavior = hpa.spec.behavior.as_ref().unwrap();
            let up = behavior.scale_up.as_ref().unwrap();
            assert_eq!(up.stabilization_window_seconds, 10);
            assert_eq!(up.policies.len(), 2);
            assert_eq!(up.policies[0], ScalingPolicy::percent(100, 15));
            assert_eq!(up.policies[1], ScalingPolicy::pods(4, 15));

            let down = behavior.scale_down.as_ref().unwrap();
            assert_eq!(down.stabilization_window_seconds, 300);
            assert_eq!(down.policies.len(), 1);
            assert_eq!(down.policies[0], ScalingPolicy::pods(1, 300));
        }
    }

    // =========================================================================
    // Story: cross-references resolve to built identities
    // =========================================================================

    #[test]
    fn story_referential_integrity() {
        let topology = compile();

        assert_eq!(
            topology.web_autoscaler.spec.scale_target_ref,
            topology.web_deployment.id()
        );
        assert_eq!(
            topology.app_autoscaler.spec.scale_target_ref,
            topology.app_deployment.id()
        );

        let backend =
            &topology.ingress.spec.rules[0].http.paths[0].backend.service;
        assert_eq!(backend.name, topology.web_service.metadata.name);
        assert_eq!(backend.port.number, 80);

        assert_eq!(
            topology.external_secret.spec.secret_store_ref.name,
            topology.secret_store.metadata.name
        );
        assert_eq!(topology.external_secret.spec.secret_store_ref.kind, "SecretStore");
    }

    #[test]
    fn test_selectors_agree_across_resources() {
        let topology = compile();

        let deploy = &topology.web_deployment;
        assert_eq!(
            deploy.spec.selector.match_labels,
            deploy.spec.template.metadata.labels
        );
        assert_eq!(
            topology.web_service.spec.selector,
            deploy.spec.selector.match_labels
        );
        assert_eq!(
            deploy.spec.selector.match_labels.get("app"),
            Some(&"nginx-web".to_string())
        );
        assert_eq!(
            topology
                .app_deployment
                .spec
                .selector
                .match_labels
                .get("app"),
            Some(&"php-fpm-web".to_string())
        );
    }

    // =========================================================================
    // Probes and pod details
    // =========================================================================

    #[test]
    fn test_probe_policy() {
        let topology = compile();

        for deploy in [&topology.web_deployment, &topology.app_deployment] {
            let container = &deploy.spec.template.spec.containers[0];

            let readiness = container.readiness_probe.as_ref().unwrap();
            assert_eq!(readiness.success_threshold, Some(1));
            assert_eq!(readiness.failure_threshold, Some(3));
            assert_eq!(readiness.period_seconds, Some(5));
            assert_eq!(readiness.timeout_seconds, Some(2));

            let liveness = container.liveness_probe.as_ref().unwrap();
            assert_eq!(liveness.initial_delay_seconds, Some(0));
            assert_eq!(liveness.period_seconds, Some(10));
        }
    }

    #[test]
    fn test_probe_checks_differ_per_service() {
        let topology = compile();

        let nginx = &topology.web_deployment.spec.template.spec.containers[0];
        let http = nginx
            .readiness_probe
            .as_ref()
            .unwrap()
            .http_get
            .as_ref()
            .unwrap();
        assert_eq!(http.path, "/nginx_status");
        assert_eq!(http.port, 80);

        let fpm = &topology.app_deployment.spec.template.spec.containers[0];
        let readiness_exec = fpm
            .readiness_probe
            .as_ref()
            .unwrap()
            .exec
            .as_ref()
            .unwrap();
        assert_eq!(readiness_exec.command, vec!["php-fpm-healthcheck"]);
        let liveness_exec = fpm
            .liveness_probe
            .as_ref()
            .unwrap()
            .exec
            .as_ref()
            .unwrap();
        assert_eq!(
            liveness_exec.command,
            vec!["php-fpm-healthcheck", "--listen-queue=10"]
        );
    }

    #[test]
    fn test_app_pod_consumes_secret_bundle() {
        let topology = compile();
        let fpm = &topology.app_deployment.spec.template.spec.containers[0];

        assert_eq!(fpm.env_from.len(), 1);
        assert_eq!(
            fpm.env_from[0].secret_ref.as_ref().unwrap().name,
            APP_SECRET_NAME
        );
        assert_eq!(
            topology.external_secret.spec.target.name,
            APP_SECRET_NAME
        );

        let caps = fpm
            .security_context
            .as_ref()
            .unwrap()
            .capabilities
            .as_ref()
            .unwrap();
        assert_eq!(caps.add, vec!["SYS_PTRACE"]);
    }

    #[test]
    fn test_config_volumes_match_config_map_keys() {
        let topology = compile();

        for (deploy, cm) in [
            (&topology.web_deployment, &topology.web_config_map),
            (&topology.app_deployment, &topology.app_config_map),
        ] {
            let pod = &deploy.spec.template.spec;
            assert_eq!(pod.volumes.len(), 2);
            for volume in &pod.volumes {
                let source = volume.config_map.as_ref().unwrap();
                assert_eq!(source.name, cm.metadata.name);
                for item in &source.items {
                    assert!(cm.data.contains_key(&item.key));
                }
            }
            // every mount's subPath is backed by a volume of the same name
            let container = &pod.containers[0];
            for mount in &container.volume_mounts {
                assert!(pod.volumes.iter().any(|v| v.name == mount.name));
            }
        }
    }

    // =========================================================================
    // Manifest output
    // =========================================================================

    #[test]
    fn test_manifest_holds_all_resources() {
        let topology = compile();
        let manifest = topology.manifest().unwrap();
        assert_eq!(manifest.len(), topology.resource_count());
    }

    #[test]
    fn story_synthesis_is_idempotent() {
        let (_dir, config) = fixture_config();
        let first = TopologyCompiler::new(config.clone(), "web")
            .compile()
            .unwrap()
            .manifest()
            .unwrap()
            .to_yaml()
            .unwrap();
        let second = TopologyCompiler::new(config, "web")
            .compile()
            .unwrap()
            .manifest()
            .unwrap()
            .to_yaml()
            .unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_instance_parameterizes_labels_only() {
        let (_dir, config) = fixture_config();
        let topology = TopologyCompiler::new(config, "canary").compile().unwrap();

        assert_eq!(
            topology
                .web_deployment
                .spec
                .selector
                .match_labels
                .get("app"),
            Some(&"nginx-canary".to_string())
        );
        // service names are stable regardless of instance
        assert_eq!(topology.web_service.metadata.name, "nginx-serv");
        assert_eq!(topology.app_service.metadata.name, "php-fpm-serv");
    }
}
