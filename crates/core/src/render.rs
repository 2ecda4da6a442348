//! Discussion listing output
//!
//! Summaries are built first (resolving `startUser` and `startPost` for each
//! discussion) and only then turned into HTML, so a missing relationship or
//! attribute anywhere aborts the listing before any output exists.

use chrono::DateTime;
use serde::Serialize;

use crate::document::Resource;
use crate::error::StreamError;
use crate::excerpt::{excerpt, DEFAULT_ELLIPSIS, DEFAULT_EXCERPT_LENGTH};
use crate::store::ResourceStore;

/// Output format for the discussion start time.
pub const START_TIME_FORMAT: &str = "%Y-%m-%d %H:%M";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderOptions {
    pub excerpt_length: usize,
    pub ellipsis: String,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            excerpt_length: DEFAULT_EXCERPT_LENGTH,
            ellipsis: DEFAULT_ELLIPSIS.to_string(),
        }
    }
}

/// Everything the listing shows for one discussion, unescaped.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DiscussionSummary {
    pub id: String,
    pub title: String,
    pub url: String,
    pub author: String,
    pub start_time: String,
    pub excerpt: String,
}

/// Format an ATOM / RFC 3339 timestamp in its own offset.
pub fn format_start_time(timestamp: &str) -> Result<String, StreamError> {
    let parsed = DateTime::parse_from_rfc3339(timestamp).map_err(|e| {
        StreamError::schema(format!("invalid startTime `{timestamp}`: {e}"))
    })?;
    Ok(parsed.format(START_TIME_FORMAT).to_string())
}

pub fn summarize_discussion(
    store: &ResourceStore,
    discussion: &Resource,
    options: &RenderOptions,
) -> Result<DiscussionSummary, StreamError> {
    let url = discussion.url.clone().ok_or_else(|| {
        StreamError::schema(format!(
            "{} {} has no slug to build its url from",
            discussion.kind, discussion.id
        ))
    })?;

    let author = store.related(discussion, "startUser")?;
    let first_post = store.related(discussion, "startPost")?;

    Ok(DiscussionSummary {
        id: discussion.id.clone(),
        title: discussion.require_str("title")?.to_string(),
        url,
        author: author.require_str("username")?.to_string(),
        start_time: format_start_time(discussion.require_str("startTime")?)?,
        excerpt: excerpt(
            first_post.require_str("contentHtml")?,
            options.excerpt_length,
            &options.ellipsis,
        ),
    })
}

/// Summaries for every discussion, in response order.
pub fn summarize(
    store: &ResourceStore,
    options: &RenderOptions,
) -> Result<Vec<DiscussionSummary>, StreamError> {
    store
        .discussions()
        .iter()
        .map(|discussion| summarize_discussion(store, discussion, options))
        .collect()
}

/// One `<article>` block with every value escaped.
pub fn render_article(summary: &DiscussionSummary) -> String {
    format!(
        "<article>\n    <h1><a href=\"{url}\">{title}</a></h1>\n    <p>By {author} on {time}</p>\n    <p>{excerpt}</p>\n</article>\n",
        url = html_escape::encode_double_quoted_attribute(&summary.url),
        title = html_escape::encode_text(&summary.title),
        author = html_escape::encode_text(&summary.author),
        time = html_escape::encode_text(&summary.start_time),
        excerpt = html_escape::encode_text(&summary.excerpt),
    )
}

/// HTML fragment with one article per discussion.
pub fn render_listing(
    store: &ResourceStore,
    options: &RenderOptions,
) -> Result<String, StreamError> {
    Ok(summarize(store, options)?
        .iter()
        .map(render_article)
        .collect::<Vec<_>>()
        .join("\n"))
}
