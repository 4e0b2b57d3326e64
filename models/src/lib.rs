pub mod autoscaler;
pub mod constants;
pub mod deployment;
pub mod error;
pub mod store;
pub mod telemetry;
