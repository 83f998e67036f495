//! HorizontalPodAutoscaler (autoscaling/v2) with behavior rules

use serde::{Deserialize, Serialize};

use super::meta::{impl_api_defaults, HasApiResource, ObjectMeta, ResourceRef};

/// Kubernetes HorizontalPodAutoscaler (v2)
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct HorizontalPodAutoscaler {
    /// API version
    #[serde(default = "HorizontalPodAutoscaler::default_api_version")]
    pub api_version: String,
    /// Kind
    #[serde(default = "HorizontalPodAutoscaler::default_kind")]
    pub kind: String,
    /// Metadata
    pub metadata: ObjectMeta,
    /// Spec
    pub spec: HpaSpec,
}

impl HasApiResource for HorizontalPodAutoscaler {
    const API_VERSION: &'static str = "autoscaling/v2";
    const KIND: &'static str = "HorizontalPodAutoscaler";
}

impl_api_defaults!(HorizontalPodAutoscaler);

impl HorizontalPodAutoscaler {
    /// Create a new HorizontalPodAutoscaler
    pub fn new(metadata: ObjectMeta, spec: HpaSpec) -> Self {
        Self {
            api_version: Self::default_api_version(),
            kind: Self::default_kind(),
            metadata,
            spec,
        }
    }
}

/// HPA spec
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct HpaSpec {
    /// Identity of the scaled workload
    pub scale_target_ref: ResourceRef,
    /// Minimum replica count
    pub min_replicas: u32,
    /// Maximum replica count
    pub max_replicas: u32,
    /// Metrics driving scaling decisions
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub metrics: Vec<MetricSpec>,
    /// Scale-up/scale-down behavior
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub behavior: Option<HpaBehavior>,
}

/// Metric specification
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct MetricSpec {
    /// Metric type
    #[serde(rename = "type")]
    pub type_: String,
    /// Resource metric
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resource: Option<ResourceMetricSource>,
}

impl MetricSpec {
    /// CPU utilization metric targeting the given average percentage
    pub fn cpu_utilization(percent: u32) -> Self {
        Self {
            type_: "Resource".to_string(),
            resource: Some(ResourceMetricSource {
                name: "cpu".to_string(),
                target: MetricTarget {
                    type_: "Utilization".to_string(),
                    average_utilization: Some(percent),
                },
            }),
        }
    }
}

/// Resource metric source
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ResourceMetricSource {
    /// Resource name (cpu, memory)
    pub name: String,
    /// Target
    pub target: MetricTarget,
}

/// Metric target
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct MetricTarget {
    /// Target type
    #[serde(rename = "type")]
    pub type_: String,
    /// Average utilization percentage
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub average_utilization: Option<u32>,
}

// =============================================================================
// Behavior
// =============================================================================

/// Scale-up and scale-down behavior rules
///
/// When multiple policies are present the autoscaler applies its own
/// max-of-policies rule; these records only declare the policies.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct HpaBehavior {
    /// Scale-up rules
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scale_up: Option<ScalingRules>,
    /// Scale-down rules
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scale_down: Option<ScalingRules>,
}

/// Rules for one scaling direction
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ScalingRules {
    /// Seconds of metric history considered before acting
    pub stabilization_window_seconds: u32,
    /// Step policies
    pub policies: Vec<ScalingPolicy>,
}

/// One step policy
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ScalingPolicy {
    /// Policy type: Percent or Pods
    #[serde(rename = "type")]
    pub type_: String,
    /// Step size (percent of current replicas, or pod count)
    pub value: u32,
    /// Seconds the step applies over
    pub period_seconds: u32,
}

impl ScalingPolicy {
    /// Step by a percentage of current replicas per period
    pub fn percent(value: u32, period_seconds: u32) -> Self {
        Self {
            type_: "Percent".to_string(),
            value,
            period_seconds,
        }
    }

    /// Step by an absolute pod count per period
    pub fn pods(value: u32, period_seconds: u32) -> Self {
        Self {
            type_: "Pods".to_string(),
            value,
            period_seconds,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cpu_metric_shape() {
        let metric = MetricSpec::cpu_utilization(50);
        let json = serde_json::to_value(&metric).unwrap();
        assert_eq!(json["type"], "Resource");
        assert_eq!(json["resource"]["name"], "cpu");
        assert_eq!(json["resource"]["target"]["type"], "Utilization");
        assert_eq!(json["resource"]["target"]["averageUtilization"], 50);
    }

    #[test]
    fn test_hpa_serialization() {
        let hpa = HorizontalPodAutoscaler::new(
            ObjectMeta::new("nginx-hpa", "<<NAMESPACE>>"),
            HpaSpec {
                scale_target_ref: ResourceRef::to::<crate::k8s::Deployment>("nginx-deploy"),
                min_replicas: 1,
                max_replicas: 50,
                metrics: vec![MetricSpec::cpu_utilization(50)],
                behavior: Some(HpaBehavior {
                    scale_up: Some(ScalingRules {
                        stabilization_window_seconds: 10,
                        policies: vec![
                            ScalingPolicy::percent(100, 15),
                            ScalingPolicy::pods(4, 15),
                        ],
                    }),
                    scale_down: Some(ScalingRules {
                        stabilization_window_seconds: 300,
                        policies: vec![ScalingPolicy::pods(1, 300)],
                    }),
                }),
            },
        );

        let json = serde_json::to_value(&hpa).unwrap();
        assert_eq!(json["apiVersion"], "autoscaling/v2");
        assert_eq!(json["spec"]["scaleTargetRef"]["apiVersion"], "apps/v1");
        assert_eq!(json["spec"]["scaleTargetRef"]["name"], "nginx-deploy");
        assert_eq!(json["spec"]["minReplicas"], 1);
        assert_eq!(json["spec"]["maxReplicas"], 50);
        assert_eq!(
            json["spec"]["behavior"]["scaleUp"]["stabilizationWindowSeconds"],
            10
        );
        assert_eq!(
            json["spec"]["behavior"]["scaleUp"]["policies"][0]["type"],
            "Percent"
        );
        assert_eq!(
            json["spec"]["behavior"]["scaleDown"]["policies"][0]["periodSeconds"],
            300
        );

        let parsed: HorizontalPodAutoscaler = serde_json::from_value(json).unwrap();
        assert_eq!(parsed, hpa);
    }
}
