// Scale target of every generated autoscaler.
pub const DEPLOYMENT_API_VERSION: &str = "apps/v1";
pub const DEPLOYMENT_KIND: &str = "Deployment";

// The single CPU utilization metric.
pub const RESOURCE_METRIC_TYPE: &str = "Resource";
pub const CPU_RESOURCE_NAME: &str = "cpu";
pub const UTILIZATION_TARGET_TYPE: &str = "Utilization";

pub const HPA_KIND: &str = "HorizontalPodAutoscaler";

// Artifact file naming: `<selector>_hpa.yaml`, or `<selector>.yaml` when all artifacts of a
// workload share one file.
pub const HPA_FILE_POSTFIX: &str = "_hpa";
pub const YAML: &str = ".yaml";
pub const YAML_DOC_LEADER: &str = "---\n";

/// Environment variable naming the directory artifacts are written to.
pub const K8S_ARTIFACT_OUTPUT_PATH_ENV_VAR: &str = "K8S_ARTIFACT_OUTPUT_PATH";
pub const DEFAULT_K8S_ARTIFACT_OUTPUT_PATH: &str = "kubernetes";
