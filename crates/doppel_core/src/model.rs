use crate::format::normalize_handle;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Source platform of a persona. Stored as its lowercase string form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    Twitter,
    Linkedin,
}

impl Platform {
    pub fn as_str(&self) -> &'static str {
        match self {
            Platform::Twitter => "twitter",
            Platform::Linkedin => "linkedin",
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Platform {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "twitter" => Ok(Platform::Twitter),
            "linkedin" => Ok(Platform::Linkedin),
            other => Err(anyhow::anyhow!("Unknown platform: {}", other)),
        }
    }
}

/// Composite dedup key. The same handle may exist once per platform, so
/// identity is the (username, platform) tuple rather than a concatenated
/// string, which would break if a separator ever appeared in a username.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PersonaKey {
    pub username: String,
    pub platform: Platform,
}

impl PersonaKey {
    pub fn new(raw_handle: &str, platform: Platform) -> Self {
        Self {
            username: normalize_handle(raw_handle),
            platform,
        }
    }

    pub fn of(record: &PersonaRecord) -> Self {
        Self::new(&record.username, record.platform)
    }
}

/// Persisted persona document, one per (username, platform) pair.
/// `chat_prompt` is write-once: synthesized at creation and never recomputed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PersonaRecord {
    /// Store-assigned identifier; immutable.
    pub id: String,
    /// Normalized handle: `@`-stripped, trimmed, lowercased.
    pub username: String,
    pub platform: Platform,
    pub name: String,
    pub avatar: String,
    /// Raw short biography/summary.
    pub profile: String,
    /// Enriched description embedded verbatim in the prompt.
    pub desc: String,
    /// Popularity metric; drives catalog ordering.
    pub sub_count: i64,
    /// LinkedIn only.
    pub connection_count: Option<i64>,
    /// Human-readable timestamp captured at write time.
    pub created_at: String,
    pub chat_prompt: String,
}

/// Insert payload: a `PersonaRecord` minus the id the store assigns.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewPersona {
    pub username: String,
    pub platform: Platform,
    pub name: String,
    pub avatar: String,
    pub profile: String,
    pub desc: String,
    pub sub_count: i64,
    pub connection_count: Option<i64>,
    pub created_at: String,
    pub chat_prompt: String,
}

/// Transient adapter output; consumed once by the prompt synthesizer and
/// the repository write, then discarded.
#[derive(Debug, Clone)]
pub struct EnrichedProfile {
    pub platform: Platform,
    pub username: String,
    pub name: String,
    pub avatar: String,
    pub bio: String,
    pub desc: String,
    pub sub_count: i64,
    pub connection_count: Option<i64>,
}

/// Opaque pagination cursor: position of the last record of the previous
/// page in the (sub_count desc, id asc) total order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageCursor {
    pub sub_count: i64,
    pub id: String,
}

/// One fetched catalog page plus the cursor for the next request.
#[derive(Debug, Clone)]
pub struct Page {
    pub records: Vec<PersonaRecord>,
    pub next_cursor: Option<PageCursor>,
}
