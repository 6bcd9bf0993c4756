//! Errors reported by the document store.

use serde::Serialize;

use super::{Collection, DocumentId};

/// Failure of a document store operation or live subscription.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, thiserror::Error)]
#[serde(tag = "kind", content = "detail", rename_all = "snake_case")]
pub enum StoreError {
    /// The store cannot be reached.
    #[error("store unavailable: {0}")]
    Unavailable(String),

    /// The caller is not allowed to read or write the collection.
    #[error("permission denied on {0}")]
    PermissionDenied(Collection),

    /// No document with that id exists in the collection.
    #[error("document {id} not found in {collection}")]
    DocumentNotFound {
        /// Queried collection.
        collection: Collection,
        /// Missing document.
        id: DocumentId,
    },

    /// A write was rejected because the payload is not a JSON object.
    #[error("invalid document: {0}")]
    InvalidDocument(String),
}
