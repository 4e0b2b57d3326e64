/*!

Generates Kubernetes HorizontalPodAutoscaler manifests for the workloads held in a
[`ModelStore`](models::store::ModelStore).

The [`generator`] turns an autoscaler model into a typed `autoscaling/v2` resource, the
[`writer`] persists it as YAML under a name derived from the workload's selector label, and the
[`handler`] drives both over every autoscaled workload.

!*/

pub mod constants;
pub mod error;
pub mod generator;
pub mod handler;
pub mod workloads;
pub mod writer;

pub use crate::error::{Error, ErrorKind, Result};
pub use crate::generator::{generate, generate_hpa};
pub use crate::handler::HpaHandler;
pub use crate::writer::{load, load_all, ArtifactWriter};
