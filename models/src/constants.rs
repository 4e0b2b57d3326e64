/// Label key shared by a workload and its pods. Its value names the generated artifact files.
pub const KUBERNETES_SELECTOR_KEY: &str = "app";

// Bounds for the target average CPU utilization of an autoscaler, in percent.
pub const MIN_CPU_PERCENTAGE: i32 = 1;
pub const MAX_CPU_PERCENTAGE: i32 = 100;
