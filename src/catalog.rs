//! Built-in platform and tone catalog, used when the backend cannot be reached.

use crate::types::{Platform, Tone};

/// (name, display name, max length, description)
const PLATFORMS: &[(&str, &str, u32, &str)] = &[
    ("blog_post", "Blog Post", 2000, "Long-form blog content"),
    (
        "linkedin",
        "LinkedIn Post",
        1300,
        "Professional social media content",
    ),
    (
        "twitter",
        "Twitter/X Post",
        280,
        "Short-form social media content",
    ),
];

const TONES: &[(&str, &str, &str)] = &[
    (
        "informative",
        "Informative",
        "Educational, fact-focused, clear explanations",
    ),
    (
        "professional",
        "Professional",
        "Business-appropriate, formal tone",
    ),
    ("casual", "Casual", "Friendly, conversational, approachable"),
];

pub fn fallback_platforms() -> Vec<Platform> {
    PLATFORMS
        .iter()
        .map(|(name, display_name, max_length, description)| Platform {
            name: name.to_string(),
            display_name: display_name.to_string(),
            max_length: Some(*max_length),
            description: description.to_string(),
        })
        .collect()
}

pub fn fallback_tones() -> Vec<Tone> {
    TONES
        .iter()
        .map(|(name, display_name, description)| Tone {
            name: name.to_string(),
            display_name: display_name.to_string(),
            description: description.to_string(),
        })
        .collect()
}
