use hpagen::constants::{DEFAULT_K8S_ARTIFACT_OUTPUT_PATH, K8S_ARTIFACT_OUTPUT_PATH_ENV_VAR};
use hpagen::workloads::WorkloadFile;
use hpagen::HpaHandler;
use models::telemetry;

use argh::FromArgs;
use snafu::ResultExt;
use tracing::{event, Level};

use std::env;
use std::path::PathBuf;
use std::process;

/// Generate Kubernetes HorizontalPodAutoscaler manifests for autoscaled workloads.
#[derive(FromArgs, Debug)]
struct Arguments {
    /// path to the workload description file
    #[argh(option, short = 'w')]
    workloads: PathBuf,

    /// directory the manifests are written to (default: $K8S_ARTIFACT_OUTPUT_PATH, then ./kubernetes)
    #[argh(option, short = 'o')]
    output_dir: Option<PathBuf>,

    /// append every artifact of a workload to one combined YAML file
    #[argh(switch)]
    single_yaml: bool,
}

fn main() {
    dotenv::dotenv().ok();
    let arguments: Arguments = argh::from_env();

    if let Err(e) = run(arguments) {
        eprintln!("{}", e);
        process::exit(1);
    }
}

fn run(arguments: Arguments) -> Result<()> {
    telemetry::init_telemetry_from_env().context(error::TelemetryInitSnafu)?;

    let output_dir = arguments
        .output_dir
        .or_else(|| env::var_os(K8S_ARTIFACT_OUTPUT_PATH_ENV_VAR).map(PathBuf::from))
        .unwrap_or_else(|| PathBuf::from(DEFAULT_K8S_ARTIFACT_OUTPUT_PATH));

    let store = WorkloadFile::from_path(&arguments.workloads)
        .and_then(|workloads| {
            workloads.into_store(output_dir, arguments.single_yaml.then_some(true))
        })
        .context(error::GenerateSnafu)?;

    let written = HpaHandler::new(&store)
        .create_artifacts()
        .context(error::GenerateSnafu)?;
    for path in &written {
        println!("{}", path.display());
    }

    event!(
        Level::INFO,
        workloads = %arguments.workloads.display(),
        artifacts = written.len(),
        "Done."
    );
    Ok(())
}

type Result<T> = std::result::Result<T, error::Error>;

mod error {
    use models::telemetry;
    use snafu::Snafu;

    #[derive(Debug, Snafu)]
    #[snafu(visibility(pub))]
    pub enum Error {
        #[snafu(display("Error configuring telemetry: '{}'", source))]
        TelemetryInit {
            source: telemetry::TelemetryConfigError,
        },

        #[snafu(display("Unable to generate HorizontalPodAutoscaler artifacts: {}", source))]
        Generate { source: hpagen::Error },
    }
}
