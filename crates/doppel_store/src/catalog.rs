use anyhow::{Context, Result};
use doppel_core::{PageCursor, PersonaKey, PersonaRecord, PersonaStore};
use std::collections::HashMap;

/// In-memory view of the persona catalog, filled one popularity-ordered
/// page at a time and deduplicated on (username, platform).
pub struct Catalog {
    page_size: usize,
    entries: Vec<PersonaRecord>,
    cursor: Option<PageCursor>,
    has_more: bool,
    loading: bool,
}

impl Catalog {
    pub fn new(page_size: usize) -> Self {
        Self {
            page_size,
            entries: Vec::new(),
            cursor: None,
            has_more: true,
            loading: false,
        }
    }

    pub fn entries(&self) -> &[PersonaRecord] {
        &self.entries
    }

    pub fn has_more(&self) -> bool {
        self.has_more
    }

    /// Fetch the next page and merge it into the view. A call while a fetch
    /// is already in flight, or after the listing is exhausted (unless
    /// resetting), is a no-op; visibility triggers may fire repeatedly and
    /// must not stack requests.
    pub async fn load_page(&mut self, store: &dyn PersonaStore, reset: bool) -> Result<()> {
        if self.loading {
            return Ok(());
        }
        if !reset && !self.has_more {
            return Ok(());
        }

        self.loading = true;
        let result = self.fetch_and_merge(store, reset).await;
        self.loading = false;
        result
    }

    async fn fetch_and_merge(&mut self, store: &dyn PersonaStore, reset: bool) -> Result<()> {
        if reset {
            self.cursor = None;
        }

        let page = store
            .list_page(self.cursor.as_ref(), self.page_size as i64)
            .await
            .context("Failed to load persona page")?;
        let fetched = page.records.len();

        // Dedup map keyed on (username, platform). On an incremental load it
        // is seeded from the current view; the fresh page wins on collision
        // (e.g. a changed popularity count).
        let mut by_key: HashMap<PersonaKey, PersonaRecord> = HashMap::new();
        if !reset {
            for record in self.entries.drain(..) {
                by_key.insert(PersonaKey::of(&record), record);
            }
        }
        for record in page.records {
            by_key.insert(PersonaKey::of(&record), record);
        }

        let mut merged: Vec<PersonaRecord> = by_key.into_values().collect();
        merged.sort_by(|a, b| {
            b.sub_count
                .cmp(&a.sub_count)
                .then_with(|| a.id.cmp(&b.id))
        });
        self.entries = merged;

        if let Some(next) = page.next_cursor {
            self.cursor = Some(next);
        }
        self.has_more = fetched == self.page_size;
        Ok(())
    }

    /// Client-side display filter: case-insensitive substring match on name
    /// or username. Touches no pagination state.
    pub fn filter(&self, query: &str) -> Vec<&PersonaRecord> {
        let needle = query.to_lowercase();
        self.entries
            .iter()
            .filter(|r| {
                r.name.to_lowercase().contains(&needle)
                    || r.username.to_lowercase().contains(&needle)
            })
            .collect()
    }
}
