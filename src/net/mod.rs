//! The external generation collaborator: HTTP client and the background
//! worker that keeps collaborator calls off the UI thread.

pub mod client;
pub mod worker;

pub use client::{Collaborator, ConstellationMetadata, GenerateError, StudioClient};
pub use worker::{GenerationWorker, Outcome};
