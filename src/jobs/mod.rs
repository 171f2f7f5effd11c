//! Background harvesting jobs
//!
//! The registry owns all job state; the runner executes jobs on a bounded
//! pool of tokio tasks and reports progress into the registry.

mod registry;
mod runner;

pub use registry::{Job, JobId, JobRegistry, JobStatus};
pub use runner::JobRunner;
