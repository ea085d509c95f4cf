pub mod error;
pub mod ingest;
pub mod linkedin;
pub mod orchestrator;
pub mod twitter;

pub use error::IngestError;
pub use ingest::{Ingestor, Provider};
pub use linkedin::LinkedinProvider;
pub use orchestrator::Orchestrator;
pub use twitter::TwitterProvider;

#[cfg(test)]
mod tests;
