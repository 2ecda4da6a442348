//! Core library for flarum-stream
//!
//! This crate implements the **Functional Core** of the flarum-stream
//! application, following the Functional Core - Imperative Shell pattern.
//!
//! # Architecture Overview
//!
//! - **`flarum_core`** (this crate): query building, document validation,
//!   relationship resolution and rendering, with zero network I/O
//! - **`flarum`**: the CLI, the blocking HTTP fetch and output writing
//!
//! # Module Organization
//!
//! - [`query`]: immutable configuration of the discussion list request
//! - [`document`]: JSON:API resources, pointers and validated parsing
//! - [`store`]: the `(type, id)` index, relationship lookup and the
//!   Unfetched/Fetched stream state machine
//! - [`excerpt`]: plain text previews of post HTML
//! - [`render`]: discussion summaries and the HTML listing
//! - [`error`]: the [`StreamError`] taxonomy shared by every stage
//!
//! # Example Usage
//!
//! ```rust
//! use flarum_core::{DiscussionStream, StreamQuery};
//! use serde_json::json;
//!
//! let body = r#"{
//!     "data": [{"id": "1", "type": "discussions",
//!               "attributes": {"slug": "hello", "title": "Hi"},
//!               "relationships": {"startUser": {"data": {"type": "users", "id": "9"}}}}],
//!     "included": [{"type": "users", "id": "9", "attributes": {"username": "bob"}}]
//! }"#;
//!
//! let mut stream = DiscussionStream::new(StreamQuery::new("https://x.tld").tag("dev"));
//! stream.ingest(body).unwrap();
//!
//! let discussion = &stream.discussions().unwrap()[0];
//! assert_eq!(discussion.url.as_deref(), Some("https://x.tld/d/1-hello"));
//!
//! let user = stream
//!     .relationship(&json!({"data": {"type": "users", "id": "9"}}))
//!     .unwrap();
//! assert_eq!(user.str_attribute("username"), Some("bob"));
//! ```

pub mod document;
pub mod error;
pub mod excerpt;
pub mod query;
pub mod render;
pub mod store;

pub use document::{Document, Resource, ResourcePointer};
pub use error::StreamError;
pub use query::StreamQuery;
pub use render::{DiscussionSummary, RenderOptions};
pub use store::{DiscussionStream, ResourceIndex, ResourceStore};
