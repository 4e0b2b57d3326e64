use crate::error::{self, Result};
use crate::generator::generate;
use crate::writer::ArtifactWriter;

use kube::ResourceExt;
use models::deployment::DeploymentModel;
use models::store::ModelStore;
use snafu::OptionExt;
use tracing::{event, instrument, Level};

use std::path::PathBuf;

/// Creates the HorizontalPodAutoscaler artifacts for every autoscaled workload in a
/// [`ModelStore`].
#[derive(Clone, Copy, Debug)]
pub struct HpaHandler<'a> {
    store: &'a ModelStore,
}

impl<'a> HpaHandler<'a> {
    pub fn new(store: &'a ModelStore) -> Self {
        Self { store }
    }

    /// Generates and writes one artifact per autoscaled deployment, in deployment name order.
    ///
    /// Deployments without an autoscaler are skipped. Stops at the first error; artifacts
    /// written before it are left in place. Combined single-file artifacts are started over by
    /// each run, so repeated runs over the same store produce the same files.
    #[instrument(skip(self), fields(output_dir = %self.store.output_dir().display()), err)]
    pub fn create_artifacts(&self) -> Result<Vec<PathBuf>> {
        let separate = ArtifactWriter::new(self.store.output_dir());
        let combined = ArtifactWriter::new(self.store.output_dir()).single_yaml(true);

        let mut written = Vec::new();
        for deployment in self.store.deployments() {
            let writer = if deployment.single_yaml {
                &combined
            } else {
                &separate
            };
            if let Some(path) = self.create_artifact(deployment, writer)? {
                written.push(path);
            }
        }
        event!(
            Level::INFO,
            count = written.len(),
            "Generated HorizontalPodAutoscaler artifacts."
        );
        Ok(written)
    }

    /// Generates the artifact for a single deployment, if it is autoscaled, and writes it with
    /// `writer`.
    pub fn create_artifact(
        &self,
        deployment: &DeploymentModel,
        writer: &ArtifactWriter,
    ) -> Result<Option<PathBuf>> {
        let autoscaler = self.store.autoscaler_for(&deployment.name);
        let hpa = match generate(deployment, autoscaler)? {
            Some(hpa) => hpa,
            None => return Ok(None),
        };

        let selector = deployment
            .selector()
            .context(error::MissingSelectorLabelSnafu {
                deployment: deployment.name.clone(),
            })?;

        let path = writer.write(&hpa, selector)?;

        event!(
            Level::INFO,
            hpa = %hpa.name_any(),
            deployment = %deployment.name,
            path = %path.display(),
            "Generated HorizontalPodAutoscaler."
        );
        Ok(Some(path))
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::error::ErrorKind;
    use crate::writer::load;
    use models::autoscaler::PodAutoscalerModel;
    use models::constants::KUBERNETES_SELECTOR_KEY;
    use std::fs;

    fn deployment(name: &str, selector: &str) -> DeploymentModel {
        DeploymentModel::builder()
            .name(name)
            .port(8080)
            .label(KUBERNETES_SELECTOR_KEY, selector)
            .build()
            .unwrap()
    }

    fn autoscaler(name: &str, deployment: &str, selector: &str) -> PodAutoscalerModel {
        PodAutoscalerModel::builder()
            .name(name)
            .deployment(deployment)
            .label(KUBERNETES_SELECTOR_KEY, selector)
            .cpu_percentage(75)
            .min_replicas(1)
            .max_replicas(4)
            .build()
            .unwrap()
    }

    #[test]
    fn test_only_autoscaled_deployments_get_artifacts() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = ModelStore::new().with_output_dir(dir.path());
        store.add_deployment(deployment("web", "web")).unwrap();
        store.add_deployment(deployment("batch", "batch")).unwrap();
        store
            .attach_autoscaler(autoscaler("web-hpa", "web", "web"))
            .unwrap();

        let written = HpaHandler::new(&store).create_artifacts().unwrap();

        assert_eq!(written, vec![dir.path().join("web_hpa.yaml")]);
        assert!(!dir.path().join("batch_hpa.yaml").exists());
        assert_eq!(load(&written[0]).unwrap().name_any(), "web-hpa");
    }

    #[test]
    fn test_single_yaml_runs_are_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = ModelStore::new().with_output_dir(dir.path());
        store
            .add_deployment(
                DeploymentModel::builder()
                    .name("web")
                    .label(KUBERNETES_SELECTOR_KEY, "web")
                    .single_yaml(true)
                    .build()
                    .unwrap(),
            )
            .unwrap();
        store
            .attach_autoscaler(autoscaler("web-hpa", "web", "web"))
            .unwrap();
        let handler = HpaHandler::new(&store);

        let path = handler.create_artifacts().unwrap().remove(0);
        assert_eq!(path, dir.path().join("web.yaml"));
        let first = fs::read(&path).unwrap();
        handler.create_artifacts().unwrap();

        assert_eq!(fs::read(&path).unwrap(), first);
        assert_eq!(crate::writer::load_all(&path).unwrap().len(), 1);
    }

    #[test]
    fn test_empty_store() {
        let dir = tempfile::tempdir().unwrap();
        let store = ModelStore::new().with_output_dir(dir.path());
        assert!(HpaHandler::new(&store).create_artifacts().unwrap().is_empty());
    }

    #[test]
    fn test_missing_output_directory() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = ModelStore::new().with_output_dir(dir.path().join("missing"));
        store.add_deployment(deployment("web", "web")).unwrap();
        store
            .attach_autoscaler(autoscaler("web-hpa", "web", "web"))
            .unwrap();

        let err = HpaHandler::new(&store).create_artifacts().unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Io);
    }

    #[test]
    fn test_missing_selector_label() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = ModelStore::new().with_output_dir(dir.path());
        // Skip the builder to model a deployment that lost its selector label.
        store
            .add_deployment(DeploymentModel {
                name: "web".to_string(),
                ..Default::default()
            })
            .unwrap();
        store
            .attach_autoscaler(autoscaler("web-hpa", "web", "web"))
            .unwrap();

        let err = HpaHandler::new(&store).create_artifacts().unwrap_err();
        assert!(matches!(err, error::Error::MissingSelectorLabel { .. }));
        assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 0);
    }
}
