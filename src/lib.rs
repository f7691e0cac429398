pub mod changelog;
pub mod ci;
pub mod cli;
pub mod config;
pub mod error;
pub mod forge;
pub mod major_tag;
pub mod orchestrator;
pub mod repo;
pub mod version;

pub use error::{ReleaseError, Result};
pub use orchestrator::Orchestrator;

#[cfg(test)]
pub mod test_helpers;
