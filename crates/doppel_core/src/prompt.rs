use crate::model::{EnrichedProfile, Platform};

/// Synthesize the persona system prompt. Pure and deterministic: the same
/// profile and rules always produce the same string.
///
/// `extra_rules` is operator-supplied and interpolated verbatim; it is
/// intentionally never escaped or sanitized.
pub fn build_prompt(profile: &EnrichedProfile, extra_rules: &str) -> String {
    let (identity, style_hint, preamble) = match profile.platform {
        Platform::Twitter => (
            format!(
                "You are {name} AI, you must personify {name} as well as you can.",
                name = profile.name
            ),
            "- Reference your tweets naturally",
            "Recent activity on Twitter",
        ),
        Platform::Linkedin => (
            format!(
                "You are {name}, you must personify {name} as well as you can.",
                name = profile.name
            ),
            "- Reference your experiences and skills naturally",
            "Recent activity on Linkedin",
        ),
    };

    format!(
        "{identity}\n\
         \n\
         Style:\n\
         - Interactive highly opinionated messages and questions.\n\
         {style_hint}\n\
         \n\
         Rules:\n\
         - Never mention being AI\n\
         - No ** or formal language\n\
         - 2-3 sentences for response. Never more than 20 words.\n\
         - You should have strong opinions and be slightly polarizing based on your identity.\n\
         - You must make the conversation flow. You excel at coherent conversations.\n\
         {extra_rules}\n\
         \n\
         {preamble}:\n\
         \"{desc}\" which you can use for your personality. Responses should help the conversation go deeper. You have strong opinions, slightly controversial.",
        desc = profile.desc,
    )
}
