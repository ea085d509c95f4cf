use thiserror::Error;

/// Classified ingest faults. All of them stop at the adapter boundary:
/// `Ingestor::ingest` converts every variant into a `false` outcome.
#[derive(Debug, Error)]
pub enum IngestError {
    /// The provider has no profile for the handle: non-success HTTP status
    /// or a response missing the identity field.
    #[error("no profile found")]
    NotFound,

    /// Transport or decode fault talking to the provider.
    #[error("profile fetch failed: {0}")]
    Fetch(#[from] reqwest::Error),

    /// The store rejected a read or write. No partial record exists; the
    /// insert is atomic at the single-document level.
    #[error("store operation failed: {0}")]
    Store(#[source] anyhow::Error),
}
