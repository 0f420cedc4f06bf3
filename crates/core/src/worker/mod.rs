//! Background worker consuming transformation jobs.
//!
//! One claim loop, one job at a time. Running a single worker avoids
//! concurrent writers racing on the shared object-store client; the
//! components themselves are safe for concurrent use, so more workers
//! can be run once the deployment wants them.

mod runner;

pub use runner::{ImageWorker, WorkerError};
