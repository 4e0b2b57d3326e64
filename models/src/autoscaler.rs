use crate::constants::{MAX_CPU_PERCENTAGE, MIN_CPU_PERCENTAGE};
use crate::error::{self, Result};

use snafu::ResultExt;
use validator::{Validate, ValidationError};

use std::collections::BTreeMap;

const DEFAULT_MIN_REPLICAS: i32 = 1;
const DEFAULT_MAX_REPLICAS: i32 = 2;
const DEFAULT_CPU_PERCENTAGE: i32 = 50;

/// The intent to horizontally autoscale one deployment on CPU utilization.
///
/// Replica counts and the utilization target use `i32` to line up with the Kubernetes API types.
#[derive(Clone, Debug, Eq, PartialEq, Validate)]
#[validate(schema(function = "validate_replica_bounds"))]
pub struct PodAutoscalerModel {
    /// Name of the generated HorizontalPodAutoscaler.
    #[validate(length(min = 1))]
    pub name: String,
    /// Name of the Deployment this autoscaler scales.
    #[validate(length(min = 1))]
    pub deployment: String,
    #[validate(range(min = 1))]
    pub min_replicas: i32,
    #[validate(range(min = 1))]
    pub max_replicas: i32,
    /// Target average CPU utilization across pods, in percent.
    #[validate(range(min = "MIN_CPU_PERCENTAGE", max = "MAX_CPU_PERCENTAGE"))]
    pub cpu_percentage: i32,
    /// Labels carried onto the generated resource's metadata.
    pub labels: BTreeMap<String, String>,
}

impl PodAutoscalerModel {
    pub fn builder() -> PodAutoscalerModelBuilder {
        PodAutoscalerModelBuilder::default()
    }
}

fn validate_replica_bounds(
    model: &PodAutoscalerModel,
) -> std::result::Result<(), ValidationError> {
    if model.min_replicas > model.max_replicas {
        return Err(ValidationError::new("min_replicas_exceeds_max_replicas"));
    }
    Ok(())
}

/// Builds a [`PodAutoscalerModel`].
///
/// Unset replica bounds and CPU target fall back to 1, 2 and 50% respectively. `build` rejects
/// empty names, non-positive replica counts, `min_replicas > max_replicas` and CPU targets
/// outside 1-100%.
#[derive(Clone, Debug)]
pub struct PodAutoscalerModelBuilder {
    name: String,
    deployment: String,
    min_replicas: i32,
    max_replicas: i32,
    cpu_percentage: i32,
    labels: BTreeMap<String, String>,
}

impl Default for PodAutoscalerModelBuilder {
    fn default() -> Self {
        Self {
            name: String::new(),
            deployment: String::new(),
            min_replicas: DEFAULT_MIN_REPLICAS,
            max_replicas: DEFAULT_MAX_REPLICAS,
            cpu_percentage: DEFAULT_CPU_PERCENTAGE,
            labels: BTreeMap::new(),
        }
    }
}

impl PodAutoscalerModelBuilder {
    pub fn name<S: Into<String>>(mut self, name: S) -> Self {
        self.name = name.into();
        self
    }

    pub fn deployment<S: Into<String>>(mut self, deployment: S) -> Self {
        self.deployment = deployment.into();
        self
    }

    pub fn min_replicas(mut self, min_replicas: i32) -> Self {
        self.min_replicas = min_replicas;
        self
    }

    pub fn max_replicas(mut self, max_replicas: i32) -> Self {
        self.max_replicas = max_replicas;
        self
    }

    pub fn cpu_percentage(mut self, cpu_percentage: i32) -> Self {
        self.cpu_percentage = cpu_percentage;
        self
    }

    pub fn label<K: Into<String>, V: Into<String>>(mut self, key: K, value: V) -> Self {
        self.labels.insert(key.into(), value.into());
        self
    }

    pub fn labels(mut self, labels: BTreeMap<String, String>) -> Self {
        self.labels.extend(labels);
        self
    }

    pub fn build(self) -> Result<PodAutoscalerModel> {
        let model = PodAutoscalerModel {
            name: self.name,
            deployment: self.deployment,
            min_replicas: self.min_replicas,
            max_replicas: self.max_replicas,
            cpu_percentage: self.cpu_percentage,
            labels: self.labels,
        };
        model.validate().context(error::ValidationSnafu {
            model: "PodAutoscalerModel",
            name: model.name.clone(),
        })?;
        Ok(model)
    }
}
