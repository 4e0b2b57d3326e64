use crate::constants::{HPA_FILE_POSTFIX, HPA_KIND, YAML, YAML_DOC_LEADER};
use crate::error::{self, Result};

use k8s_openapi::api::autoscaling::v2::HorizontalPodAutoscaler;
use kube::ResourceExt;
use serde::Deserialize;
use snafu::{ensure, ResultExt};
use tempfile::NamedTempFile;
use tracing::{event, Level};

use std::collections::BTreeSet;
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};

/// Persists generated autoscalers as YAML under the Kubernetes artifact output directory.
///
/// In separate-file mode each autoscaler gets its own `<selector>_hpa.yaml`, replaced whole on
/// every write. In single-file mode autoscalers go to `<selector>.yaml`, the file shared by every
/// artifact of the workload, as `---`-led documents. The first write a writer makes to a combined
/// file starts it over; later writes through the same writer append to it. One writer per
/// generation run therefore leaves the same bytes behind on every run.
#[derive(Debug)]
pub struct ArtifactWriter {
    output_dir: PathBuf,
    single_yaml: bool,
    // Combined files this writer has already started.
    started: Mutex<BTreeSet<PathBuf>>,
}

impl ArtifactWriter {
    pub fn new<P: Into<PathBuf>>(output_dir: P) -> Self {
        Self {
            output_dir: output_dir.into(),
            single_yaml: false,
            started: Mutex::new(BTreeSet::new()),
        }
    }

    pub fn single_yaml(mut self, single_yaml: bool) -> Self {
        self.single_yaml = single_yaml;
        self
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// The artifact file name for a workload with the given selector label value.
    pub fn file_name(&self, selector: &str) -> String {
        if self.single_yaml {
            format!("{}{}", selector, YAML)
        } else {
            format!("{}{}{}", selector, HPA_FILE_POSTFIX, YAML)
        }
    }

    /// Serializes `hpa` and writes it to the file named after `selector`, returning its path.
    ///
    /// Nothing is touched on disk if the selector is unusable or serialization fails.
    pub fn write(&self, hpa: &HorizontalPodAutoscaler, selector: &str) -> Result<PathBuf> {
        ensure!(
            is_valid_file_stem(selector),
            error::InvalidSelectorLabelSnafu { selector }
        );
        ensure!(
            self.output_dir.is_dir(),
            error::OutputDirectoryMissingSnafu {
                path: self.output_dir.clone(),
            }
        );

        let content = serde_yaml::to_string(hpa).context(error::SerializeYamlSnafu {
            name: hpa.name_any(),
        })?;

        let path = self.output_dir.join(self.file_name(selector));
        if self.single_yaml {
            self.write_document(&path, &content)?;
        } else {
            self.replace_file(&path, &content)?;
        }

        event!(
            Level::DEBUG,
            hpa = %hpa.name_any(),
            path = %path.display(),
            single_yaml = self.single_yaml,
            "Wrote HorizontalPodAutoscaler."
        );
        Ok(path)
    }

    /// Writes `content` to a uniquely named temporary file next to `path` and renames it over
    /// `path`, so readers see either the previous file or the complete new one. Concurrent
    /// writers of the same path each rename a file of their own; the last rename wins.
    fn replace_file(&self, path: &Path, content: &str) -> Result<()> {
        let mut file = NamedTempFile::new_in(&self.output_dir)
            .context(error::CreateFileSnafu { path })?;
        file.write_all(content.as_bytes())
            .context(error::WriteFileSnafu { path })?;
        file.as_file()
            .sync_all()
            .context(error::WriteFileSnafu { path })?;
        file.persist(path).context(error::PersistFileSnafu { path })?;
        Ok(())
    }

    fn write_document(&self, path: &Path, content: &str) -> Result<()> {
        let document = format!("{}{}", YAML_DOC_LEADER, content);
        // Held across the write so documents from concurrent callers do not interleave.
        let mut started = self.started.lock().unwrap_or_else(PoisonError::into_inner);
        if started.contains(path) {
            append_document(path, &document)
        } else {
            self.replace_file(path, &document)?;
            started.insert(path.to_path_buf());
            Ok(())
        }
    }
}

/// Selector values become file names, so they must not be empty or leave the output directory.
fn is_valid_file_stem(selector: &str) -> bool {
    !selector.is_empty()
        && selector != "."
        && selector != ".."
        && !selector.contains(|c| c == '/' || c == '\\')
}

fn append_document(path: &Path, document: &str) -> Result<()> {
    let mut file = OpenOptions::new()
        .append(true)
        .open(path)
        .context(error::CreateFileSnafu { path })?;
    file.write_all(document.as_bytes())
        .context(error::WriteFileSnafu { path })?;
    file.sync_all().context(error::WriteFileSnafu { path })
}

/// Parses a single-document artifact file back into a typed HorizontalPodAutoscaler.
pub fn load<P: AsRef<Path>>(path: P) -> Result<HorizontalPodAutoscaler> {
    let path = path.as_ref();
    let content = fs::read_to_string(path).context(error::ReadFileSnafu { path })?;
    serde_yaml::from_str(&content).context(error::DeserializeYamlSnafu { path })
}

/// Parses every HorizontalPodAutoscaler document of a (possibly multi-document) artifact file.
///
/// Documents of other kinds are skipped.
pub fn load_all<P: AsRef<Path>>(path: P) -> Result<Vec<HorizontalPodAutoscaler>> {
    let path = path.as_ref();
    let content = fs::read_to_string(path).context(error::ReadFileSnafu { path })?;

    let mut autoscalers = Vec::new();
    for document in serde_yaml::Deserializer::from_str(&content) {
        let value =
            serde_yaml::Value::deserialize(document).context(error::DeserializeYamlSnafu { path })?;
        if value.get("kind").and_then(serde_yaml::Value::as_str) != Some(HPA_KIND) {
            continue;
        }
        autoscalers
            .push(serde_yaml::from_value(value).context(error::DeserializeYamlSnafu { path })?);
    }

    ensure!(
        !autoscalers.is_empty(),
        error::NoAutoscalerDocumentSnafu { path }
    );
    Ok(autoscalers)
}
