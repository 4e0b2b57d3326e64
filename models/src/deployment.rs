use crate::constants::KUBERNETES_SELECTOR_KEY;
use crate::error::{self, Result};

use snafu::ResultExt;
use validator::{Validate, ValidationError};

use std::collections::BTreeMap;

/// A single deployable workload, as described by the annotation-processing stage.
///
/// Whether the workload is autoscaled is not recorded here; the association lives in the
/// [`ModelStore`](crate::store::ModelStore).
#[derive(Clone, Debug, Default, Eq, PartialEq, Validate)]
pub struct DeploymentModel {
    /// Identifier of the workload, unique within an artifact set.
    #[validate(length(min = 1))]
    pub name: String,
    /// Declared container ports, in declaration order.
    pub ports: Vec<u16>,
    /// Labels shared by the workload and its pods. Must carry the selector label.
    #[validate(custom = "validate_selector_label")]
    pub labels: BTreeMap<String, String>,
    /// Whether every artifact of the workload goes into one combined YAML file.
    pub single_yaml: bool,
}

impl DeploymentModel {
    pub fn builder() -> DeploymentModelBuilder {
        DeploymentModelBuilder::default()
    }

    /// Value of the selector label, if one is set.
    pub fn selector(&self) -> Option<&str> {
        self.labels.get(KUBERNETES_SELECTOR_KEY).map(String::as_str)
    }
}

fn validate_selector_label(
    labels: &BTreeMap<String, String>,
) -> std::result::Result<(), ValidationError> {
    match labels.get(KUBERNETES_SELECTOR_KEY) {
        Some(value) if !value.is_empty() => Ok(()),
        _ => Err(ValidationError::new("missing_selector_label")),
    }
}

/// Builds a [`DeploymentModel`], rejecting models without a name or a selector label.
#[derive(Clone, Debug, Default)]
pub struct DeploymentModelBuilder {
    name: String,
    ports: Vec<u16>,
    labels: BTreeMap<String, String>,
    single_yaml: bool,
}

impl DeploymentModelBuilder {
    pub fn name<S: Into<String>>(mut self, name: S) -> Self {
        self.name = name.into();
        self
    }

    pub fn port(mut self, port: u16) -> Self {
        self.ports.push(port);
        self
    }

    pub fn ports<I: IntoIterator<Item = u16>>(mut self, ports: I) -> Self {
        self.ports.extend(ports);
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

    pub fn single_yaml(mut self, single_yaml: bool) -> Self {
        self.single_yaml = single_yaml;
        self
    }

    pub fn build(self) -> Result<DeploymentModel> {
        let model = DeploymentModel {
            name: self.name,
            ports: self.ports,
            labels: self.labels,
            single_yaml: self.single_yaml,
        };
        model.validate().context(error::ValidationSnafu {
            model: "DeploymentModel",
            name: model.name.clone(),
        })?;
        Ok(model)
    }
}
