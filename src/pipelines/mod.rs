//! Workflow pipelines orchestrating stateless services.

pub mod background;
pub mod signing_job;

pub use background::sign_in_background;
pub use signing_job::{JobOutcome, SigningJob};
