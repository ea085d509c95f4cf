use crate::error::IngestError;
use async_trait::async_trait;
use chrono::Utc;
use doppel_core::format::{format_created_at, normalize_handle};
use doppel_core::prompt::build_prompt;
use doppel_core::{EnrichedProfile, NewPersona, Notifier, PersonaStore, Platform};
use std::sync::Arc;

/// One external profile source. Implementations do the platform-specific
/// fetch and enrichment; the shared pipeline lives in [`Ingestor`].
#[async_trait]
pub trait Provider: Send + Sync {
    fn platform(&self) -> Platform;

    /// Fetch and enrich the profile for an already-normalized handle.
    async fn fetch(&self, handle: &str) -> Result<EnrichedProfile, IngestError>;
}

enum Outcome {
    Created(String),
    Existing(String),
}

/// Per-provider ingest driver: normalize, dedup-check, fetch, synthesize,
/// persist, navigate. One instance per registered provider.
pub struct Ingestor {
    provider: Arc<dyn Provider>,
    store: Arc<dyn PersonaStore>,
    notifier: Arc<dyn Notifier>,
    extra_rules: String,
}

impl Ingestor {
    pub fn new(
        provider: Arc<dyn Provider>,
        store: Arc<dyn PersonaStore>,
        notifier: Arc<dyn Notifier>,
        extra_rules: String,
    ) -> Self {
        Self {
            provider,
            store,
            notifier,
            extra_rules,
        }
    }

    pub fn platform(&self) -> Platform {
        self.provider.platform()
    }

    /// Run the full pipeline for a raw handle. Every failure path resolves
    /// to `false`; nothing propagates to the orchestrator. A hit on the
    /// existence check counts as success: the user ends up with a persona
    /// to chat with either way.
    pub async fn ingest(&self, raw_handle: &str) -> bool {
        let handle = normalize_handle(raw_handle);
        if handle.is_empty() {
            return false;
        }

        match self.try_ingest(&handle).await {
            Ok(Outcome::Existing(id)) => {
                self.notifier.success("Profile already exists, redirecting...");
                self.notifier.open_chat(&id);
                true
            }
            Ok(Outcome::Created(id)) => {
                self.notifier.success("Profile saved successfully!");
                self.notifier.open_chat(&id);
                true
            }
            Err(IngestError::NotFound) => {
                // Common case when the handle only exists on one platform;
                // the orchestrator decides whether anything is user-visible.
                tracing::debug!(platform = %self.provider.platform(), handle = %handle,
                    "No profile found");
                false
            }
            Err(IngestError::Store(e)) => {
                tracing::error!(platform = %self.provider.platform(), handle = %handle,
                    "Store failure during ingest: {:#}", e);
                self.notifier.error("Failed to save profile");
                false
            }
            Err(IngestError::Fetch(e)) => {
                tracing::warn!(platform = %self.provider.platform(), handle = %handle,
                    "Profile fetch failed: {}", e);
                false
            }
        }
    }

    async fn try_ingest(&self, handle: &str) -> Result<Outcome, IngestError> {
        // Dedup check is unscoped by platform: one handle, one persona.
        if let Some(existing) = self
            .store
            .find_by_username(None, handle)
            .await
            .map_err(IngestError::Store)?
        {
            return Ok(Outcome::Existing(existing.id));
        }

        let profile = self.provider.fetch(handle).await?;
        let chat_prompt = build_prompt(&profile, &self.extra_rules);

        let persona = NewPersona {
            username: profile.username.clone(),
            platform: profile.platform,
            name: profile.name.clone(),
            avatar: profile.avatar.clone(),
            profile: profile.bio.clone(),
            desc: profile.desc.clone(),
            sub_count: profile.sub_count,
            connection_count: profile.connection_count,
            created_at: format_created_at(Utc::now()),
            chat_prompt,
        };

        let id = self
            .store
            .create(&persona)
            .await
            .map_err(IngestError::Store)?;
        Ok(Outcome::Created(id))
    }
}
