//! Loading workload descriptions into a [`ModelStore`].
//!
//! A workload file lists deployments, each with an optional autoscaler:
//!
//! ```yaml
//! deployments:
//!   - name: MyDeployment
//!     ports: [9090, 9091]
//!     labels:
//!       app: hello
//!     autoscaler:
//!       name: MyHPA
//!       minReplicas: 2
//!       maxReplicas: 10
//!       cpuPercentage: 90
//! ```
//!
//! The autoscaler targets its enclosing deployment. When it declares no labels it inherits the
//! deployment's.

use crate::error::{self, Result};

use models::autoscaler::PodAutoscalerModel;
use models::deployment::DeploymentModel;
use models::store::ModelStore;
use serde::Deserialize;
use snafu::ResultExt;

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct WorkloadFile {
    #[serde(default)]
    pub deployments: Vec<WorkloadDeployment>,
}

#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct WorkloadDeployment {
    pub name: String,
    #[serde(default)]
    pub ports: Vec<u16>,
    #[serde(default)]
    pub labels: BTreeMap<String, String>,
    #[serde(default)]
    pub single_yaml: bool,
    pub autoscaler: Option<WorkloadAutoscaler>,
}

#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct WorkloadAutoscaler {
    pub name: String,
    pub min_replicas: Option<i32>,
    pub max_replicas: Option<i32>,
    pub cpu_percentage: Option<i32>,
    pub labels: Option<BTreeMap<String, String>>,
}

impl WorkloadFile {
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).context(error::ReadFileSnafu { path })?;
        serde_yaml::from_str(&content).context(error::DeserializeYamlSnafu { path })
    }

    /// Builds validated models from the file and registers them in a new store writing to
    /// `output_dir`.
    ///
    /// `single_yaml_override` forces the single-file flag on every deployment when set.
    pub fn into_store(
        self,
        output_dir: PathBuf,
        single_yaml_override: Option<bool>,
    ) -> Result<ModelStore> {
        let mut store = ModelStore::new().with_output_dir(output_dir);

        for workload in self.deployments {
            let deployment = DeploymentModel::builder()
                .name(workload.name.clone())
                .ports(workload.ports)
                .labels(workload.labels.clone())
                .single_yaml(single_yaml_override.unwrap_or(workload.single_yaml))
                .build()
                .context(error::InvalidModelSnafu)?;
            store
                .add_deployment(deployment)
                .context(error::InvalidModelSnafu)?;

            if let Some(autoscaler) = workload.autoscaler {
                let mut builder = PodAutoscalerModel::builder()
                    .name(autoscaler.name)
                    .deployment(workload.name)
                    .labels(autoscaler.labels.unwrap_or(workload.labels));
                if let Some(min_replicas) = autoscaler.min_replicas {
                    builder = builder.min_replicas(min_replicas);
                }
                if let Some(max_replicas) = autoscaler.max_replicas {
                    builder = builder.max_replicas(max_replicas);
                }
                if let Some(cpu_percentage) = autoscaler.cpu_percentage {
                    builder = builder.cpu_percentage(cpu_percentage);
                }
                let autoscaler = builder.build().context(error::InvalidModelSnafu)?;
                store
                    .attach_autoscaler(autoscaler)
                    .context(error::InvalidModelSnafu)?;
            }
        }

        Ok(store)
    }
}
