//! Discussion list query configuration
//!
//! `StreamQuery` is an immutable value. Every builder method consumes the
//! query and returns a new one, so a configured query can be cloned and
//! varied without affecting the original.

use serde::{Deserialize, Serialize};

/// Default number of discussions requested per fetch.
pub const DEFAULT_LIMIT: u32 = 5;

/// Relations included by default so the listing can show author and excerpt.
pub const DEFAULT_INCLUDE: [&str; 2] = ["startUser", "startPost"];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StreamQuery {
    base_url: String,
    limit: u32,
    include: Vec<String>,
    tag: Option<String>,
}

impl StreamQuery {
    /// Create a query against a forum root (same value as the forum's
    /// configured url). A trailing slash is stripped.
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            limit: DEFAULT_LIMIT,
            include: DEFAULT_INCLUDE.iter().map(|s| s.to_string()).collect(),
            tag: None,
        }
    }

    pub fn limit(self, limit: u32) -> Self {
        Self { limit, ..self }
    }

    /// Restrict results to a tag slug. An empty tag clears the filter.
    pub fn tag(self, tag: impl Into<String>) -> Self {
        let tag = tag.into();
        Self {
            tag: (!tag.is_empty()).then_some(tag),
            ..self
        }
    }

    /// Replace the included relation names.
    pub fn include<I, S>(self, include: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            include: include.into_iter().map(Into::into).collect(),
            ..self
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn limit_value(&self) -> u32 {
        self.limit
    }

    pub fn includes(&self) -> &[String] {
        &self.include
    }

    pub fn tag_value(&self) -> Option<&str> {
        self.tag.as_deref()
    }

    /// Full request URL for the discussion list endpoint.
    pub fn url(&self) -> String {
        let mut url = format!(
            "{}/api/discussions?include={}&page[limit]={}",
            self.base_url,
            self.include.join(","),
            self.limit
        );

        if let Some(tag) = &self.tag {
            url.push_str(&format!("&filter[q]=tag:{}", urlencoding::encode(tag)));
        }

        url
    }

    /// Public URL of a discussion page.
    pub fn discussion_url(&self, id: &str, slug: &str) -> String {
        format!("{}/d/{}-{}", self.base_url, id, slug)
    }
}
