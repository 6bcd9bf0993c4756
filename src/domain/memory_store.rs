//! In-process document store.
//!
//! [`MemoryStore`] keeps each collection in its own `watch` channel. Every
//! write replaces the collection state, which wakes all live subscriptions
//! on that collection; each subscription then re-runs its query against the
//! new state. Used by the binary when no hosted store is configured and by
//! tests.

use std::collections::HashMap;

use serde_json::{Map, Value};
use tokio::sync::watch;

use super::collection::{Document, LiveQuery};
use super::document_store::{CollectionState, DocumentStore, FieldUpdate, LiveSubscription};
use super::{Collection, DocumentId, StoreError};

/// Document store held entirely in memory.
///
/// Queries run through [`LiveQuery::apply`], so an ordered query leaves out
/// documents that lack the order-by field, as a hosted store's index would.
#[derive(Debug)]
pub struct MemoryStore {
    feeds: HashMap<Collection, watch::Sender<CollectionState>>,
}

impl MemoryStore {
    /// Creates an empty store with every [`Collection`].
    #[must_use]
    pub fn new() -> Self {
        let feeds = Collection::ALL
            .into_iter()
            .map(|c| (c, watch::Sender::new(CollectionState::default())))
            .collect();
        Self { feeds }
    }

    fn feed(&self, collection: Collection) -> Result<&watch::Sender<CollectionState>, StoreError> {
        self.feeds
            .get(&collection)
            .ok_or_else(|| StoreError::Unavailable(format!("no feed for {collection}")))
    }

    /// Puts a collection into a failed state. Live subscriptions receive
    /// `err` and reads and writes return it until [`Self::recover`].
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Unavailable`] if the collection has no feed.
    pub fn fail(&self, collection: Collection, err: StoreError) -> Result<(), StoreError> {
        self.feed(collection)?.send_modify(|state| {
            state.failure = Some(err);
            state.version += 1;
        });
        tracing::warn!(%collection, "collection marked as failed");
        Ok(())
    }

    /// Clears a failure set by [`Self::fail`]. Subscriptions receive a
    /// fresh snapshot.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Unavailable`] if the collection has no feed.
    pub fn recover(&self, collection: Collection) -> Result<(), StoreError> {
        self.feed(collection)?.send_if_modified(|state| {
            if state.failure.take().is_none() {
                return false;
            }
            state.version += 1;
            true
        });
        Ok(())
    }

    /// Number of live subscriptions currently open on `collection`.
    #[must_use]
    pub fn active_subscriptions(&self, collection: Collection) -> usize {
        self.feeds
            .get(&collection)
            .map_or(0, watch::Sender::receiver_count)
    }

    /// Number of documents in `collection`.
    #[must_use]
    pub fn len(&self, collection: Collection) -> usize {
        self.feeds
            .get(&collection)
            .map_or(0, |feed| feed.borrow().documents.len())
    }

    /// Returns `true` if `collection` holds no documents.
    #[must_use]
    pub fn is_empty(&self, collection: Collection) -> bool {
        self.len(collection) == 0
    }

    /// Loads seed data of the form `{"students": [...], "notifications": {...}}`.
    ///
    /// Each collection is either an array of objects (the `id` field is the
    /// key, generated when absent) or an object mapping id to fields.
    /// Unknown collection names are skipped. Returns the number of
    /// documents loaded.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::InvalidDocument`] if the seed or one of its
    /// documents is not a JSON object.
    pub fn load_seed(&self, seed: &Value) -> Result<usize, StoreError> {
        let Value::Object(collections) = seed else {
            return Err(StoreError::InvalidDocument(
                "seed must be a JSON object keyed by collection".to_string(),
            ));
        };

        let mut loaded = 0;
        for (name, docs) in collections {
            let Some(collection) = Collection::from_name(name) else {
                tracing::warn!(collection = %name, "skipping unknown collection in seed");
                continue;
            };
            let entries: Vec<(Option<DocumentId>, &Value)> = match docs {
                Value::Array(items) => items.iter().map(|v| (None, v)).collect(),
                Value::Object(map) => map
                    .iter()
                    .map(|(k, v)| (Some(DocumentId::new(k.as_str())), v))
                    .collect(),
                _ => {
                    return Err(StoreError::InvalidDocument(format!(
                        "seed entry for {collection} must be an array or object"
                    )));
                }
            };
            for (key, value) in entries {
                let Value::Object(fields) = value else {
                    return Err(StoreError::InvalidDocument(format!(
                        "seed document in {collection} is not an object"
                    )));
                };
                let id = key
                    .or_else(|| {
                        fields
                            .get("id")
                            .and_then(Value::as_str)
                            .map(DocumentId::from)
                    })
                    .unwrap_or_else(DocumentId::generate);
                self.upsert(collection, Document::new(id, fields.clone()))?;
                loaded += 1;
            }
        }
        Ok(loaded)
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl DocumentStore for MemoryStore {
    fn subscribe(&self, query: LiveQuery) -> Result<LiveSubscription, StoreError> {
        let rx = self.feed(query.collection)?.subscribe();
        tracing::debug!(collection = %query.collection, "live subscription opened");
        Ok(LiveSubscription::new(query, rx))
    }

    fn get(&self, collection: Collection, id: &DocumentId) -> Result<Document, StoreError> {
        let state = self.feed(collection)?.borrow();
        if let Some(err) = &state.failure {
            return Err(err.clone());
        }
        state
            .documents
            .get(id)
            .cloned()
            .ok_or_else(|| StoreError::DocumentNotFound {
                collection,
                id: id.clone(),
            })
    }

    fn upsert(&self, collection: Collection, document: Document) -> Result<(), StoreError> {
        let mut outcome = Ok(());
        self.feed(collection)?.send_if_modified(|state| {
            if let Some(err) = &state.failure {
                outcome = Err(err.clone());
                return false;
            }
            state.documents.insert(document.id.clone(), document);
            state.version += 1;
            true
        });
        outcome
    }

    fn insert(
        &self,
        collection: Collection,
        fields: Map<String, Value>,
    ) -> Result<DocumentId, StoreError> {
        let id = DocumentId::generate();
        self.upsert(collection, Document::new(id.clone(), fields))?;
        Ok(id)
    }

    fn update(
        &self,
        collection: Collection,
        id: &DocumentId,
        apply: FieldUpdate<'_>,
    ) -> Result<Document, StoreError> {
        let mut outcome = Err(StoreError::DocumentNotFound {
            collection,
            id: id.clone(),
        });
        self.feed(collection)?.send_if_modified(|state| {
            if let Some(err) = &state.failure {
                outcome = Err(err.clone());
                return false;
            }
            let Some(doc) = state.documents.get_mut(id) else {
                return false;
            };
            apply(&mut doc.fields);
            doc.fields.remove("id");
            outcome = Ok(doc.clone());
            state.version += 1;
            true
        });
        outcome
    }
}
