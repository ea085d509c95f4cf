use crate::ingest::Ingestor;
use doppel_core::Notifier;
use futures::future::join_all;
use std::sync::Arc;

/// Fan-out coordinator: one handle, every registered provider at once.
/// Providers run as independent concurrent futures joined at a single
/// barrier, so completion order never matters and one failing provider
/// cannot starve the others.
pub struct Orchestrator {
    ingestors: Vec<Ingestor>,
    notifier: Arc<dyn Notifier>,
}

impl Orchestrator {
    pub fn new(notifier: Arc<dyn Notifier>) -> Self {
        Self {
            ingestors: Vec::new(),
            notifier,
        }
    }

    pub fn register(&mut self, ingestor: Ingestor) {
        self.ingestors.push(ingestor);
    }

    /// Returns the number of providers that ended with a persona available
    /// (freshly created or already existing). Zero successes surface as a
    /// single aggregate notification rather than one per provider.
    pub async fn create_persona(&self, handle: &str) -> usize {
        let results = join_all(self.ingestors.iter().map(|ing| ing.ingest(handle))).await;
        let successes = results.into_iter().filter(|ok| *ok).count();

        tracing::info!(
            handle = %handle,
            successes,
            providers = self.ingestors.len(),
            "Persona creation finished"
        );

        if successes == 0 {
            self.notifier.error("No profiles found for the given handle.");
        }
        successes
    }
}
