pub mod config;
pub mod format;
pub mod model;
pub mod prompt;

pub use config::DoppelConfig;
pub use model::{
    EnrichedProfile, NewPersona, Page, PageCursor, PersonaKey, PersonaRecord, Platform,
};

use async_trait::async_trait;

/// Backing store for the persona catalog. Append-only: records are created
/// once and never updated or deleted by this core.
#[async_trait]
pub trait PersonaStore: Send + Sync {
    /// Exact-match lookup by normalized username, optionally scoped to one
    /// platform. The ingest pipeline queries unscoped.
    async fn find_by_username(
        &self,
        platform: Option<Platform>,
        username: &str,
    ) -> anyhow::Result<Option<PersonaRecord>>;

    /// Append a new record and return its store-assigned id.
    async fn create(&self, persona: &NewPersona) -> anyhow::Result<String>;

    /// One catalog page ordered by popularity (sub_count descending, id
    /// ascending as tie-break). Pass the previous page's cursor to continue.
    async fn list_page(&self, cursor: Option<&PageCursor>, limit: i64) -> anyhow::Result<Page>;
}

/// Outbound user-facing effects: toasts and navigation. Implemented by the
/// host surface (CLI, web shell); injected so the core never touches a
/// global presentation handle.
pub trait Notifier: Send + Sync {
    fn success(&self, message: &str);
    fn error(&self, message: &str);
    /// Navigate the user to the chat surface for a persona id.
    fn open_chat(&self, persona_id: &str);
}
