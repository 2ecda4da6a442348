//! Blocking fetch of one page of discussions
//!
//! The only network I/O in the project. Every failure to obtain a body is a
//! `StreamError::Transport`; parsing and indexing are delegated to the core.

use std::time::Duration;

use flarum_core::{DiscussionStream, ResourceStore, StreamError, StreamQuery};
use reqwest::blocking::Client;
use reqwest::header::ACCEPT;

const JSON_API: &str = "application/vnd.api+json";

pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchOptions {
    pub timeout: Duration,
}

impl Default for FetchOptions {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }
}

pub fn build_client(options: &FetchOptions) -> Result<Client, StreamError> {
    Client::builder()
        .timeout(options.timeout)
        .user_agent(concat!("flarum/", env!("CARGO_PKG_VERSION")))
        .build()
        .map_err(|e| StreamError::Transport(format!("failed to build HTTP client: {e}")))
}

/// GET `url` and return the body of a 2xx response.
pub fn fetch_body(client: &Client, url: &str) -> Result<String, StreamError> {
    log::debug!("GET {url}");

    let response = client
        .get(url)
        .header(ACCEPT, JSON_API)
        .send()
        .map_err(|e| StreamError::Transport(format!("could not fetch the discussions: {e}")))?;

    let status = response.status();
    log::debug!("HTTP {status} from {url}");

    if !status.is_success() {
        return Err(StreamError::Transport(format!(
            "could not fetch the discussions: HTTP {status}"
        )));
    }

    response
        .text()
        .map_err(|e| StreamError::Transport(format!("could not read the response body: {e}")))
}

/// Fetch the query's page and return a stream in the Fetched state.
pub fn fetch(query: StreamQuery, options: &FetchOptions) -> Result<DiscussionStream, StreamError> {
    let client = build_client(options)?;
    let body = fetch_body(&client, &query.url())?;

    let mut stream = DiscussionStream::new(query);
    log_store(stream.ingest(&body)?);

    Ok(stream)
}

fn log_store(store: &ResourceStore) {
    log::debug!(
        "indexed {} discussions and {} included resources ({})",
        store.discussions().len(),
        store.index().len(),
        store.index().types().join(", ")
    );

    for pointer in store.index().overwritten() {
        log::debug!(
            "included {} {} appears more than once, keeping the last occurrence",
            pointer.kind,
            pointer.id
        );
    }
}
