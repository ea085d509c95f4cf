use crate::error::IngestError;
use crate::ingest::Provider;
use anyhow::Result;
use async_trait::async_trait;
use doppel_core::config::TwitterApiConfig;
use doppel_core::format::format_twitter_avatar;
use doppel_core::{EnrichedProfile, Platform};
use serde::Deserialize;
use std::time::Duration;

/// Hard cap on timeline texts folded into the enriched description.
const TIMELINE_CAP: usize = 30;

pub struct TwitterProvider {
    client: reqwest::Client,
    base_url: String,
    api_host: String,
    api_key: String,
}

#[derive(Debug, Deserialize)]
struct TwitterProfile {
    name: Option<String>,
    #[serde(default)]
    desc: Option<String>,
    #[serde(default)]
    avatar: Option<String>,
    #[serde(default)]
    sub_count: Option<i64>,
}

impl TwitterProvider {
    pub fn new(base_url: &str, api_host: &str, api_key: &str) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(10))
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_host: api_host.to_string(),
            api_key: api_key.to_string(),
        })
    }

    pub fn from_config(config: &TwitterApiConfig) -> Result<Self> {
        Self::new(
            &format!("https://{}", config.api_host),
            &config.api_host,
            &config.api_key,
        )
    }

    /// Recent tweet texts, capped at [`TIMELINE_CAP`]. Retweets (`RT @`
    /// prefix) and empty entries are dropped. The response keys the
    /// timeline by opaque entry ids; only the `text` fields matter here.
    async fn fetch_timeline(&self, handle: &str) -> Result<Vec<String>, IngestError> {
        let response = self
            .client
            .get(format!("{}/timeline.php", self.base_url))
            .query(&[("screenname", handle)])
            .header("x-rapidapi-key", &self.api_key)
            .header("x-rapidapi-host", &self.api_host)
            .send()
            .await?
            .error_for_status()?;

        let body: serde_json::Value = response.json().await?;

        let mut tweets = Vec::new();
        if let Some(entries) = body.get("timeline").and_then(|t| t.as_object()) {
            for entry in entries.values() {
                if tweets.len() >= TIMELINE_CAP {
                    break;
                }
                if let Some(text) = entry.get("text").and_then(|t| t.as_str()) {
                    if !text.is_empty() && !text.starts_with("RT @") {
                        tweets.push(text.to_string());
                    }
                }
            }
        }
        Ok(tweets)
    }
}

#[async_trait]
impl Provider for TwitterProvider {
    fn platform(&self) -> Platform {
        Platform::Twitter
    }

    async fn fetch(&self, handle: &str) -> Result<EnrichedProfile, IngestError> {
        let response = self
            .client
            .get(format!("{}/screenname.php", self.base_url))
            .query(&[("screenname", handle)])
            .header("x-rapidapi-key", &self.api_key)
            .header("x-rapidapi-host", &self.api_host)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(IngestError::NotFound);
        }

        let profile: TwitterProfile = response.json().await?;
        let name = match profile.name {
            Some(n) if !n.is_empty() => n,
            _ => return Err(IngestError::NotFound),
        };

        // Timeline faults degrade to an empty list; the profile alone is
        // enough to build a persona.
        let tweets = match self.fetch_timeline(handle).await {
            Ok(tweets) => tweets,
            Err(e) => {
                tracing::warn!(handle = %handle, "Timeline fetch failed, continuing without: {}", e);
                Vec::new()
            }
        };

        let bio = profile
            .desc
            .filter(|d| !d.is_empty())
            .unwrap_or_else(|| "No description available".to_string());
        let desc = format!(
            "{}\n\nHere are my recent tweets:\n{}",
            bio,
            tweets.join("\n")
        );

        Ok(EnrichedProfile {
            platform: Platform::Twitter,
            username: handle.to_string(),
            name,
            avatar: format_twitter_avatar(profile.avatar.as_deref().unwrap_or("")),
            bio,
            desc,
            sub_count: profile.sub_count.unwrap_or(0),
            connection_count: None,
        })
    }
}
