use snafu::Snafu;

use std::path::PathBuf;

/// The crate-wide result type.
pub type Result<T> = std::result::Result<T, Error>;

/// Broad classification of an [`Error`].
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum ErrorKind {
    /// The model data is invalid or inconsistent. Nothing was written.
    Generation,
    /// The artifact could not be serialized, written or read back.
    Io,
}

/// The crate-wide error type.
#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
pub enum Error {
    #[snafu(display("Autoscaler '{}' does not reference a deployment.", hpa_name))]
    MissingDeploymentReference { hpa_name: String },

    #[snafu(display(
        "Autoscaler '{}' is attached to deployment '{}' but targets '{}'.",
        hpa_name,
        deployment,
        target
    ))]
    DetachedAutoscaler {
        hpa_name: String,
        deployment: String,
        target: String,
    },

    #[snafu(display(
        "Autoscaler '{}' has CPU utilization target {}%, which is outside {}-{}%.",
        hpa_name,
        cpu_percentage,
        models::constants::MIN_CPU_PERCENTAGE,
        models::constants::MAX_CPU_PERCENTAGE
    ))]
    CpuPercentageOutOfRange { hpa_name: String, cpu_percentage: i32 },

    #[snafu(display(
        "Autoscaler '{}' has minReplicas {} greater than maxReplicas {}.",
        hpa_name,
        min_replicas,
        max_replicas
    ))]
    ReplicaBoundsInverted {
        hpa_name: String,
        min_replicas: i32,
        max_replicas: i32,
    },

    #[snafu(display(
        "Deployment '{}' has no '{}' label to name its artifacts after.",
        deployment,
        models::constants::KUBERNETES_SELECTOR_KEY
    ))]
    MissingSelectorLabel { deployment: String },

    #[snafu(display("Selector label '{}' cannot be used as a file name.", selector))]
    InvalidSelectorLabel { selector: String },

    #[snafu(display("Invalid workload model: '{}'", source))]
    InvalidModel { source: models::error::Error },

    #[snafu(display("Output directory '{}' does not exist.", path.display()))]
    OutputDirectoryMissing { path: PathBuf },

    #[snafu(display("Unable to serialize HorizontalPodAutoscaler '{}' to YAML: '{}'", name, source))]
    SerializeYaml {
        source: serde_yaml::Error,
        name: String,
    },

    #[snafu(display("Unable to create '{}': '{}'", path.display(), source))]
    CreateFile {
        source: std::io::Error,
        path: PathBuf,
    },

    #[snafu(display("Unable to write '{}': '{}'", path.display(), source))]
    WriteFile {
        source: std::io::Error,
        path: PathBuf,
    },

    #[snafu(display("Unable to move '{}' into place: '{}'", path.display(), source))]
    PersistFile {
        source: tempfile::PersistError,
        path: PathBuf,
    },

    #[snafu(display("Unable to read '{}': '{}'", path.display(), source))]
    ReadFile {
        source: std::io::Error,
        path: PathBuf,
    },

    #[snafu(display("Unable to parse '{}': '{}'", path.display(), source))]
    DeserializeYaml {
        source: serde_yaml::Error,
        path: PathBuf,
    },

    #[snafu(display("'{}' does not contain a HorizontalPodAutoscaler.", path.display()))]
    NoAutoscalerDocument { path: PathBuf },
}

impl Error {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::MissingDeploymentReference { .. }
            | Self::DetachedAutoscaler { .. }
            | Self::CpuPercentageOutOfRange { .. }
            | Self::ReplicaBoundsInverted { .. }
            | Self::MissingSelectorLabel { .. }
            | Self::InvalidSelectorLabel { .. }
            | Self::InvalidModel { .. } => ErrorKind::Generation,
            Self::OutputDirectoryMissing { .. }
            | Self::SerializeYaml { .. }
            | Self::CreateFile { .. }
            | Self::WriteFile { .. }
            | Self::PersistFile { .. }
            | Self::ReadFile { .. }
            | Self::DeserializeYaml { .. }
            | Self::NoAutoscalerDocument { .. } => ErrorKind::Io,
        }
    }
}
