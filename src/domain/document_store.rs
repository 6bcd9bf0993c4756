//! Client-side interface to the real-time document store.
//!
//! The dashboard does not own its data: records live in a document store
//! that pushes a full snapshot to every live query whenever a matching
//! document changes. [`DocumentStore`] is the narrow slice of that client
//! the gateway needs, and [`LiveSubscription`] is the receiving end of one
//! live query.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use serde_json::{Map, Value};
use tokio::sync::watch;

use super::collection::{Document, LiveQuery, Snapshot};
use super::{Collection, DocumentId, StoreError};

/// Field update applied in place by [`DocumentStore::update`].
pub type FieldUpdate<'a> = &'a mut (dyn FnMut(&mut Map<String, Value>) + Send);

/// Operations the gateway performs against the document store.
pub trait DocumentStore: Send + Sync + fmt::Debug {
    /// Opens a live query.
    ///
    /// The returned subscription yields the current snapshot first and a
    /// fresh snapshot after every change. Dropping it releases the query.
    ///
    /// # Errors
    ///
    /// Returns a [`StoreError`] if the query cannot be established.
    fn subscribe(&self, query: LiveQuery) -> Result<LiveSubscription, StoreError>;

    /// Reads a single document.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::DocumentNotFound`] if the id is unknown, or the
    /// collection's current failure.
    fn get(&self, collection: Collection, id: &DocumentId) -> Result<Document, StoreError>;

    /// Creates or replaces a document.
    ///
    /// # Errors
    ///
    /// Returns the collection's current failure, if any.
    fn upsert(&self, collection: Collection, document: Document) -> Result<(), StoreError>;

    /// Creates a document under a freshly generated id.
    ///
    /// # Errors
    ///
    /// Returns the collection's current failure, if any.
    fn insert(
        &self,
        collection: Collection,
        fields: Map<String, Value>,
    ) -> Result<DocumentId, StoreError>;

    /// Applies `apply` to an existing document's fields and returns the
    /// updated document.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::DocumentNotFound`] if the id is unknown, or the
    /// collection's current failure.
    fn update(
        &self,
        collection: Collection,
        id: &DocumentId,
        apply: FieldUpdate<'_>,
    ) -> Result<Document, StoreError>;
}

/// Contents of one collection as published to live queries.
#[derive(Debug, Clone, Default)]
pub struct CollectionState {
    /// Documents keyed by id.
    pub documents: BTreeMap<DocumentId, Document>,
    /// Set while the collection cannot be read. Subscriptions receive it
    /// instead of a snapshot.
    pub failure: Option<StoreError>,
    /// Incremented on every change.
    pub version: u64,
}

/// Receiving end of a live query.
///
/// Backed by a `watch` channel: a slow consumer observes only the latest
/// state, never a backlog of intermediate snapshots.
pub struct LiveSubscription {
    query: LiveQuery,
    rx: watch::Receiver<CollectionState>,
    primed: bool,
}

impl LiveSubscription {
    /// Wraps a receiver of collection state.
    #[must_use]
    pub fn new(query: LiveQuery, rx: watch::Receiver<CollectionState>) -> Self {
        Self {
            query,
            rx,
            primed: false,
        }
    }

    /// Returns the query this subscription serves.
    #[must_use]
    pub fn query(&self) -> &LiveQuery {
        &self.query
    }

    /// Waits for the next delivery.
    ///
    /// The first call resolves immediately with the current state. Returns
    /// `None` once the store has shut down.
    pub async fn next(&mut self) -> Option<Result<Snapshot, StoreError>> {
        if self.primed {
            self.rx.changed().await.ok()?;
        } else {
            self.primed = true;
        }

        let state = self.rx.borrow_and_update();
        let delivery = match &state.failure {
            Some(err) => Err(err.clone()),
            None => Ok(Arc::new(self.query.apply(state.documents.values()))),
        };
        Some(delivery)
    }
}

impl fmt::Debug for LiveSubscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LiveSubscription")
            .field("query", &self.query)
            .field("primed", &self.primed)
            .finish_non_exhaustive()
    }
}

impl Drop for LiveSubscription {
    fn drop(&mut self) {
        tracing::debug!(collection = %self.query.collection, "live subscription released");
    }
}
