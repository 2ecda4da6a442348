//! Relationship resolution over a fetched document
//!
//! [`ResourceStore`] owns the primary discussions (in response order) and a
//! two-level index of included resources keyed by type then id.
//! [`DiscussionStream`] wraps a store in the Unfetched/Fetched state machine.

use std::collections::HashMap;

use serde_json::Value;

use crate::document::{Document, Resource, ResourcePointer};
use crate::error::StreamError;
use crate::query::StreamQuery;

/// Included resources keyed by `(type, id)`. Immutable once built.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResourceIndex {
    by_type: HashMap<String, HashMap<String, Resource>>,
    overwritten: Vec<ResourcePointer>,
}

impl ResourceIndex {
    /// Index resources in order. A repeated `(type, id)` replaces the
    /// earlier entry and is recorded in [`ResourceIndex::overwritten`].
    pub fn build(resources: Vec<Resource>) -> Self {
        let mut index = Self::default();

        for resource in resources {
            let by_id = index.by_type.entry(resource.kind.clone()).or_default();
            let pointer = resource.pointer();
            if by_id.insert(resource.id.clone(), resource).is_some() {
                index.overwritten.push(pointer);
            }
        }

        index
    }

    pub fn get(&self, pointer: &ResourcePointer) -> Option<&Resource> {
        self.by_type.get(&pointer.kind)?.get(&pointer.id)
    }

    pub fn len(&self) -> usize {
        self.by_type.values().map(HashMap::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Resource types present, sorted.
    pub fn types(&self) -> Vec<&str> {
        let mut types: Vec<&str> = self.by_type.keys().map(String::as_str).collect();
        types.sort_unstable();
        types
    }

    pub fn overwritten(&self) -> &[ResourcePointer] {
        &self.overwritten
    }
}

/// The result of one successful fetch.
#[derive(Debug, Clone, PartialEq)]
pub struct ResourceStore {
    discussions: Vec<Resource>,
    index: ResourceIndex,
}

impl ResourceStore {
    /// Build a store from a validated document, deriving discussion urls
    /// from the query's base url.
    pub fn from_document(document: Document, query: &StreamQuery) -> Self {
        let discussions = document
            .data
            .into_iter()
            .map(|resource| with_discussion_url(resource, query))
            .collect();

        Self {
            discussions,
            index: ResourceIndex::build(document.included),
        }
    }

    /// Parse, validate and index a response body in one step.
    pub fn parse(body: &str, query: &StreamQuery) -> Result<Self, StreamError> {
        Ok(Self::from_document(Document::parse(body)?, query))
    }

    pub fn discussions(&self) -> &[Resource] {
        &self.discussions
    }

    pub fn index(&self) -> &ResourceIndex {
        &self.index
    }

    pub fn resolve(&self, pointer: &ResourcePointer) -> Result<&Resource, StreamError> {
        self.index.get(pointer).ok_or_else(|| StreamError::NotFound {
            kind: pointer.kind.clone(),
            id: pointer.id.clone(),
        })
    }

    /// Resolve a raw pointer or a `{data: pointer}` envelope.
    pub fn relationship(&self, reference: &Value) -> Result<&Resource, StreamError> {
        self.resolve(&ResourcePointer::from_value(reference)?)
    }

    /// Resolve to-many linkage. Every pointer must be present in the index.
    pub fn relationships(&self, reference: &Value) -> Result<Vec<&Resource>, StreamError> {
        ResourcePointer::many_from_value(reference)?
            .iter()
            .map(|pointer| self.resolve(pointer))
            .collect()
    }

    /// Resolve the relationship called `name` on `resource`.
    pub fn related(&self, resource: &Resource, name: &str) -> Result<&Resource, StreamError> {
        let reference = resource.relationship_ref(name).ok_or_else(|| {
            StreamError::schema(format!(
                "{} {} has no `{}` relationship",
                resource.kind, resource.id, name
            ))
        })?;

        self.relationship(reference)
    }
}

fn with_discussion_url(mut resource: Resource, query: &StreamQuery) -> Resource {
    if resource.kind != "discussions" {
        return resource;
    }

    let slug = match resource.attribute("slug") {
        Some(Value::String(slug)) => slug.clone(),
        Some(Value::Number(slug)) => slug.to_string(),
        Some(Value::Null) => String::new(),
        _ => return resource,
    };

    resource.url = Some(query.discussion_url(&resource.id, &slug));
    resource
}

#[derive(Debug, Clone, PartialEq)]
enum StreamState {
    Unfetched,
    Fetched(ResourceStore),
}

/// A configured discussion listing and, once ingested, its fetched result.
#[derive(Debug, Clone, PartialEq)]
pub struct DiscussionStream {
    query: StreamQuery,
    state: StreamState,
}

impl DiscussionStream {
    pub fn new(query: StreamQuery) -> Self {
        Self {
            query,
            state: StreamState::Unfetched,
        }
    }

    pub fn query(&self) -> &StreamQuery {
        &self.query
    }

    pub fn is_fetched(&self) -> bool {
        matches!(self.state, StreamState::Fetched(_))
    }

    /// Replace the current result with the one parsed from `body`.
    ///
    /// The previous result is dropped first: on error the stream is
    /// Unfetched and no partially built index is reachable.
    pub fn ingest(&mut self, body: &str) -> Result<&ResourceStore, StreamError> {
        self.state = StreamState::Unfetched;
        let store = ResourceStore::parse(body, &self.query)?;
        self.state = StreamState::Fetched(store);
        self.store()
    }

    pub fn store(&self) -> Result<&ResourceStore, StreamError> {
        match &self.state {
            StreamState::Fetched(store) => Ok(store),
            StreamState::Unfetched => Err(not_ready()),
        }
    }

    pub fn into_store(self) -> Result<ResourceStore, StreamError> {
        match self.state {
            StreamState::Fetched(store) => Ok(store),
            StreamState::Unfetched => Err(not_ready()),
        }
    }

    pub fn discussions(&self) -> Result<&[Resource], StreamError> {
        Ok(self.store()?.discussions())
    }

    pub fn relationship(&self, reference: &Value) -> Result<&Resource, StreamError> {
        self.store()?.relationship(reference)
    }
}

fn not_ready() -> StreamError {
    StreamError::State("data not ready, fetch the discussions first".to_string())
}
