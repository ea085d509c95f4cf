use chrono::{DateTime, Utc};

/// Placeholder served when a provider has no avatar for the profile.
pub const DEFAULT_AVATAR: &str = "/default-avatar.svg";

/// Canonical handle form: trimmed, leading `@` stripped, lowercased.
/// Idempotent, so it is safe to apply at every boundary that sees a handle.
pub fn normalize_handle(raw: &str) -> String {
    raw.trim().trim_start_matches('@').trim().to_lowercase()
}

/// Canonical Twitter avatar URL: upgrade to https and drop the `_normal`
/// thumbnail suffix so the full-size image is stored.
pub fn format_twitter_avatar(url: &str) -> String {
    if url.is_empty() {
        return DEFAULT_AVATAR.to_string();
    }
    url.replacen("http://", "https://", 1).replace("_normal", "")
}

/// Human-readable creation stamp, e.g. "January 2, 2026 at 15:04:05 UTC".
pub fn format_created_at(ts: DateTime<Utc>) -> String {
    ts.format("%B %-d, %Y at %H:%M:%S UTC").to_string()
}
