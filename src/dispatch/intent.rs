//! Intent classification for task dispatch.
//!
//! A task's title and description are classified into an [`Intent`] which
//! names the collaborator action responsible for it. The default
//! [`KeywordClassifier`] implements ordered keyword matching (first match
//! wins, generic is the fallback); the [`IntentClassifier`] trait is the
//! seam for swapping in a learned or configurable classifier.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;

/// What a task is asking for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Intent {
    Search,
    ImageGeneration,
    VideoGeneration,
    CodeGeneration,
    Generic,
}

impl Intent {
    /// The collaborator action bound to this intent.
    pub fn action_name(&self) -> &'static str {
        match self {
            Intent::Search => "web-search",
            Intent::ImageGeneration => "image-generation",
            Intent::VideoGeneration => "video-generation",
            Intent::CodeGeneration => "code-generation",
            Intent::Generic => "generic-completion",
        }
    }
}

impl std::fmt::Display for Intent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.action_name())
    }
}

/// Classifies free text into an [`Intent`].
pub trait IntentClassifier: Send + Sync {
    fn classify(&self, text: &str) -> Intent;
}

/// Regex for pulling the query out of "search for X" phrasing.
static SEARCH_QUERY_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)search\s+(?:for\s+)?["']?([^"']+)["']?"#).unwrap()
});

/// Regex for pulling the prompt out of "generate an image of X" phrasing.
static IMAGE_PROMPT_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)generate\s+(?:an?\s+)?(?:image\s+of\s+)?["']?([^"']+)["']?"#).unwrap()
});

/// Regex for pulling the prompt out of "animate X" / "create video of X".
static VIDEO_PROMPT_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)(?:animate|create\s+video\s+of)\s+["']?([^"']+)["']?"#).unwrap()
});

/// Ordered keyword matching over lowercased title + description.
///
/// Rule order matters: the first matching rule wins, so "search then
/// create a summary" is a search, and the create/write rule only sees
/// text nothing earlier claimed.
#[derive(Debug, Default, Clone, Copy)]
pub struct KeywordClassifier;

impl KeywordClassifier {
    pub fn new() -> Self {
        Self
    }
}

impl IntentClassifier for KeywordClassifier {
    fn classify(&self, text: &str) -> Intent {
        let text = text.to_lowercase();
        if text.contains("search") || text.contains("find") {
            Intent::Search
        } else if text.contains("generate") && text.contains("image") {
            Intent::ImageGeneration
        } else if text.contains("animate") || text.contains("video") {
            Intent::VideoGeneration
        } else if text.contains("create") || text.contains("write") {
            Intent::CodeGeneration
        } else {
            Intent::Generic
        }
    }
}

/// Extract the free-text parameter for an intent from title + description.
///
/// Falls back to the title when no heuristic matches.
pub fn extract_parameter(intent: Intent, title: &str, description: &str) -> String {
    let text = format!("{} {}", title, description);
    let captured = match intent {
        Intent::Search => SEARCH_QUERY_RE
            .captures(&text)
            .and_then(|c| c.get(1))
            .map(|m| m.as_str().trim().to_string()),
        Intent::ImageGeneration => IMAGE_PROMPT_RE
            .captures(&text)
            .and_then(|c| c.get(1))
            .map(|m| m.as_str().trim().to_string()),
        Intent::VideoGeneration => VIDEO_PROMPT_RE
            .captures(&text)
            .and_then(|c| c.get(1))
            .map(|m| m.as_str().trim().to_string()),
        _ => None,
    };
    captured.unwrap_or_else(|| title.to_string())
}
