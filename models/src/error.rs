use snafu::Snafu;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
pub enum Error {
    #[snafu(display("Invalid {} '{}': '{}'", model, name, source))]
    Validation {
        source: validator::ValidationErrors,
        model: &'static str,
        name: String,
    },

    #[snafu(display("A deployment named '{}' is already registered.", name))]
    DuplicateDeployment { name: String },

    #[snafu(display(
        "Deployment '{}' already has an autoscaler ('{}'); refusing to attach '{}'.",
        deployment,
        existing,
        name
    ))]
    DuplicateAutoscaler {
        deployment: String,
        existing: String,
        name: String,
    },

    #[snafu(display(
        "Autoscaler '{}' targets deployment '{}', which is not registered.",
        name,
        deployment
    ))]
    UnknownDeployment { name: String, deployment: String },
}
