use crate::error::IngestError;
use crate::ingest::Provider;
use anyhow::Result;
use async_trait::async_trait;
use doppel_core::config::LinkedinApiConfig;
use doppel_core::format::DEFAULT_AVATAR;
use doppel_core::{EnrichedProfile, Platform};
use serde::Deserialize;
use std::time::Duration;

pub struct LinkedinProvider {
    client: reqwest::Client,
    base_url: String,
    api_host: String,
    api_key: String,
}

#[derive(Debug, Default, Deserialize)]
struct LinkedinResponse {
    #[serde(default)]
    data: LinkedinData,
    #[serde(default)]
    posts: Vec<LinkedinPost>,
    #[serde(default)]
    follower: Option<i64>,
    #[serde(default)]
    connection: Option<i64>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct LinkedinData {
    #[serde(default)]
    first_name: Option<String>,
    #[serde(default)]
    last_name: Option<String>,
    #[serde(default)]
    summary: Option<String>,
    #[serde(default)]
    profile_picture: Option<String>,
    #[serde(default)]
    position: Vec<LinkedinPosition>,
    #[serde(default)]
    skills: Vec<LinkedinSkill>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct LinkedinPosition {
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    company_name: Option<String>,
    #[serde(default)]
    start: Option<PositionDate>,
    #[serde(default)]
    end: Option<PositionDate>,
}

#[derive(Debug, Deserialize)]
struct PositionDate {
    #[serde(default)]
    year: Option<i32>,
}

#[derive(Debug, Deserialize)]
struct LinkedinSkill {
    #[serde(default)]
    name: Option<String>,
}

#[derive(Debug, Deserialize)]
struct LinkedinPost {
    #[serde(default)]
    text: Option<String>,
}

fn format_positions(positions: &[LinkedinPosition]) -> String {
    if positions.is_empty() {
        return "No positions available".to_string();
    }
    positions
        .iter()
        .map(|pos| {
            let title = pos
                .title
                .as_deref()
                .filter(|t| !t.is_empty())
                .unwrap_or("Unknown Title");
            let company = pos
                .company_name
                .as_deref()
                .filter(|c| !c.is_empty())
                .unwrap_or("Unknown Company");
            let start = pos
                .start
                .as_ref()
                .and_then(|d| d.year)
                .map(|y| y.to_string())
                .unwrap_or_else(|| "N/A".to_string());
            let end = pos
                .end
                .as_ref()
                .and_then(|d| d.year)
                .map(|y| y.to_string())
                .unwrap_or_else(|| "Present".to_string());
            format!("{} at {} ({} - {})", title, company, start, end)
        })
        .collect::<Vec<_>>()
        .join(", ")
}

fn format_skills(skills: &[LinkedinSkill]) -> String {
    let names: Vec<&str> = skills
        .iter()
        .filter_map(|s| s.name.as_deref())
        .filter(|n| !n.is_empty())
        .collect();
    if names.is_empty() {
        return "No skills available".to_string();
    }
    names.join(", ")
}

fn format_posts(posts: &[LinkedinPost]) -> String {
    let texts: Vec<&str> = posts
        .iter()
        .filter_map(|p| p.text.as_deref())
        .filter(|t| !t.is_empty())
        .collect();
    if texts.is_empty() {
        return "No recent posts available".to_string();
    }
    texts.join("\n")
}

impl LinkedinProvider {
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

    pub fn from_config(config: &LinkedinApiConfig) -> Result<Self> {
        Self::new(
            &format!("https://{}", config.api_host),
            &config.api_host,
            &config.api_key,
        )
    }
}

#[async_trait]
impl Provider for LinkedinProvider {
    fn platform(&self) -> Platform {
        Platform::Linkedin
    }

    async fn fetch(&self, handle: &str) -> Result<EnrichedProfile, IngestError> {
        // Single endpoint returns profile, connection count and recent posts.
        let response = self
            .client
            .get(format!(
                "{}/profile-data-connection-count-posts",
                self.base_url
            ))
            .query(&[("username", handle)])
            .header("x-rapidapi-key", &self.api_key)
            .header("x-rapidapi-host", &self.api_host)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(IngestError::NotFound);
        }

        let payload: LinkedinResponse = response.json().await?;
        let first_name = match payload.data.first_name.as_deref() {
            Some(n) if !n.is_empty() => n,
            _ => return Err(IngestError::NotFound),
        };

        let name = format!(
            "{} {}",
            first_name,
            payload.data.last_name.as_deref().unwrap_or("")
        )
        .trim()
        .to_string();
        let summary = payload
            .data
            .summary
            .as_deref()
            .filter(|s| !s.is_empty())
            .unwrap_or("No summary available")
            .to_string();

        let positions = format_positions(&payload.data.position);
        let skills = format_skills(&payload.data.skills);
        let posts = format_posts(&payload.posts);
        let desc = format!(
            "{}\n\nPositions: {}\n\nSkills: {}\n\nRecent Posts:\n{}",
            summary, positions, skills, posts
        );

        Ok(EnrichedProfile {
            platform: Platform::Linkedin,
            username: handle.to_string(),
            name,
            avatar: payload
                .data
                .profile_picture
                .filter(|p| !p.is_empty())
                .unwrap_or_else(|| DEFAULT_AVATAR.to_string()),
            bio: summary.clone(),
            desc,
            sub_count: payload.follower.unwrap_or(0),
            connection_count: payload.connection,
        })
    }
}
