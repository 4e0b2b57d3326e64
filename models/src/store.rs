use crate::autoscaler::PodAutoscalerModel;
use crate::deployment::DeploymentModel;
use crate::error::{self, Result};

use snafu::ensure;
use tracing::{event, Level};

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Holds the workload models of one artifact set, along with the directory the generated
/// artifacts are written to.
///
/// Autoscalers are associated with deployments by deployment name. A deployment without an
/// associated autoscaler is not autoscaled.
#[derive(Clone, Debug, Default)]
pub struct ModelStore {
    deployments: BTreeMap<String, DeploymentModel>,
    // Keyed by the name of the deployment the autoscaler targets.
    autoscalers: BTreeMap<String, PodAutoscalerModel>,
    output_dir: PathBuf,
}

impl ModelStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the resolved Kubernetes artifact output directory.
    pub fn with_output_dir<P: Into<PathBuf>>(mut self, output_dir: P) -> Self {
        self.output_dir = output_dir.into();
        self
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    pub fn add_deployment(&mut self, deployment: DeploymentModel) -> Result<()> {
        ensure!(
            !self.deployments.contains_key(&deployment.name),
            error::DuplicateDeploymentSnafu {
                name: deployment.name.clone()
            }
        );
        event!(Level::DEBUG, deployment = %deployment.name, "Registered deployment model.");
        self.deployments.insert(deployment.name.clone(), deployment);
        Ok(())
    }

    /// Associates an autoscaler with the deployment it names.
    ///
    /// The deployment must already be registered and must not have an autoscaler yet.
    pub fn attach_autoscaler(&mut self, autoscaler: PodAutoscalerModel) -> Result<()> {
        ensure!(
            self.deployments.contains_key(&autoscaler.deployment),
            error::UnknownDeploymentSnafu {
                name: autoscaler.name.clone(),
                deployment: autoscaler.deployment.clone(),
            }
        );
        if let Some(existing) = self.autoscalers.get(&autoscaler.deployment) {
            return error::DuplicateAutoscalerSnafu {
                deployment: autoscaler.deployment.clone(),
                existing: existing.name.clone(),
                name: autoscaler.name.clone(),
            }
            .fail();
        }
        event!(
            Level::DEBUG,
            autoscaler = %autoscaler.name,
            deployment = %autoscaler.deployment,
            "Attached autoscaler model."
        );
        self.autoscalers.insert(autoscaler.deployment.clone(), autoscaler);
        Ok(())
    }

    pub fn deployment(&self, name: &str) -> Option<&DeploymentModel> {
        self.deployments.get(name)
    }

    pub fn autoscaler_for(&self, deployment: &str) -> Option<&PodAutoscalerModel> {
        self.autoscalers.get(deployment)
    }

    /// All deployments, ordered by name.
    pub fn deployments(&self) -> impl Iterator<Item = &DeploymentModel> {
        self.deployments.values()
    }

    /// Deployments that have an autoscaler, paired with it, ordered by deployment name.
    pub fn autoscaled(&self) -> impl Iterator<Item = (&DeploymentModel, &PodAutoscalerModel)> {
        self.deployments.values().filter_map(move |deployment| {
            self.autoscalers
                .get(&deployment.name)
                .map(|autoscaler| (deployment, autoscaler))
        })
    }
}
