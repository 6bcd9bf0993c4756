//! Collections, raw documents, and live query descriptions.

use std::cmp::Ordering;
use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::DocumentId;

/// Collections the dashboard reads from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Collection {
    /// Student records: rewards ledger, attendance, names.
    Students,
    /// Announcements posted by administrators.
    Notifications,
    /// Per-teacher reward activity.
    #[serde(rename = "teacherProgress")]
    Teachers,
}

impl Collection {
    /// Every collection, in a fixed order.
    pub const ALL: [Self; 3] = [Self::Students, Self::Notifications, Self::Teachers];

    /// Returns the store-side collection name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Students => "students",
            Self::Notifications => "notifications",
            Self::Teachers => "teacherProgress",
        }
    }

    /// Parses a store-side collection name.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.as_str() == name)
    }
}

impl fmt::Display for Collection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A raw document as held by the store: an id plus an arbitrary field set.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Document {
    /// Store key.
    pub id: DocumentId,
    /// Field values. Never contains the `id` key itself.
    pub fields: Map<String, Value>,
}

impl Document {
    /// Creates a document, dropping any `id` entry from `fields`.
    #[must_use]
    pub fn new(id: DocumentId, mut fields: Map<String, Value>) -> Self {
        fields.remove("id");
        Self { id, fields }
    }

    /// Returns the value of a field, if present.
    #[must_use]
    pub fn field(&self, name: &str) -> Option<&Value> {
        self.fields.get(name)
    }
}

/// Point-in-time, ordered result of a live query.
///
/// Shared behind an `Arc` so that every consumer of a delivery sees the same
/// allocation.
pub type Snapshot = Arc<Vec<Document>>;

/// Sort direction of a live query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    /// Smallest first.
    Ascending,
    /// Largest first.
    Descending,
}

/// Field ordering of a live query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderBy {
    /// Field name compared between documents.
    pub field: String,
    /// Sort direction.
    pub direction: Direction,
}

/// Description of a live query against one collection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LiveQuery {
    /// Queried collection.
    pub collection: Collection,
    /// Optional ordering; documents lacking the field are left out.
    /// Without it documents are returned by id.
    pub order_by: Option<OrderBy>,
    /// Optional cap on the snapshot length, applied after ordering.
    pub limit: Option<usize>,
}

impl LiveQuery {
    /// Query returning the whole collection ordered by id.
    #[must_use]
    pub fn collection(collection: Collection) -> Self {
        Self {
            collection,
            order_by: None,
            limit: None,
        }
    }

    /// Orders the results by `field`.
    #[must_use]
    pub fn order_by(mut self, field: &str, direction: Direction) -> Self {
        self.order_by = Some(OrderBy {
            field: field.to_string(),
            direction,
        });
        self
    }

    /// Caps the number of returned documents.
    #[must_use]
    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Applies ordering and limit to a set of documents.
    ///
    /// An ordered query only returns documents that carry the order-by
    /// field; an explicit `null` still counts and sorts first ascending.
    /// The sort is stable and falls back to the document id, so equal keys
    /// always come back in the same order.
    #[must_use]
    pub fn apply<'a>(&self, documents: impl Iterator<Item = &'a Document>) -> Vec<Document> {
        let mut docs: Vec<Document> = documents.cloned().collect();
        if let Some(order) = &self.order_by {
            docs.retain(|d| d.field(&order.field).is_some());
            docs.sort_by(|a, b| {
                let ord = compare_values(a.field(&order.field), b.field(&order.field));
                let ord = match order.direction {
                    Direction::Ascending => ord,
                    Direction::Descending => ord.reverse(),
                };
                ord.then_with(|| a.id.cmp(&b.id))
            });
        }
        if let Some(limit) = self.limit {
            docs.truncate(limit);
        }
        docs
    }
}

/// Sort key extracted from a field value.
#[derive(Debug, PartialEq, PartialOrd)]
enum SortKey<'a> {
    Missing,
    Bool(bool),
    Number(f64),
    Text(&'a str),
    Other,
}

fn sort_key(value: Option<&Value>) -> SortKey<'_> {
    match value {
        None | Some(Value::Null) => SortKey::Missing,
        Some(Value::Bool(b)) => SortKey::Bool(*b),
        Some(Value::Number(n)) => SortKey::Number(n.as_f64().unwrap_or(0.0)),
        Some(Value::String(s)) => SortKey::Text(s),
        Some(Value::Object(map)) => match timestamp_seconds(map) {
            Some(seconds) => SortKey::Number(seconds),
            None => SortKey::Other,
        },
        Some(Value::Array(_)) => SortKey::Other,
    }
}

/// Reads `{seconds, nanoseconds}` (or the `_seconds` wire variant) as
/// fractional seconds.
fn timestamp_seconds(map: &Map<String, Value>) -> Option<f64> {
    let seconds = map
        .get("seconds")
        .or_else(|| map.get("_seconds"))
        .and_then(Value::as_f64)?;
    let nanos = map
        .get("nanoseconds")
        .or_else(|| map.get("_nanoseconds"))
        .and_then(Value::as_f64)
        .unwrap_or(0.0);
    Some(seconds + nanos / 1e9)
}

/// Compares two optional field values. Missing values sort first, then
/// booleans, numbers (and store timestamps), strings, and everything else.
fn compare_values(a: Option<&Value>, b: Option<&Value>) -> Ordering {
    sort_key(a)
        .partial_cmp(&sort_key(b))
        .unwrap_or(Ordering::Equal)
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;
    use serde_json::json;

    fn doc(id: &str, fields: Value) -> Document {
        let Value::Object(map) = fields else {
            panic!("fields must be an object");
        };
        Document::new(DocumentId::new(id), map)
    }

    fn ids(docs: &[Document]) -> Vec<&str> {
        docs.iter().map(|d| d.id.as_str()).collect()
    }

    #[test]
    fn collection_names_round_trip() {
        for c in Collection::ALL {
            assert_eq!(Collection::from_name(c.as_str()), Some(c));
        }
        assert_eq!(Collection::from_name("grades"), None);
    }

    #[test]
    fn document_new_strips_id_field() {
        let d = doc("a", json!({"id": "ignored", "name": "Ada"}));
        assert!(d.field("id").is_none());
        assert_eq!(d.field("name"), Some(&json!("Ada")));
    }

    #[test]
    fn unordered_query_keeps_input_order() {
        let docs = [doc("b", json!({})), doc("a", json!({}))];
        let out = LiveQuery::collection(Collection::Students).apply(docs.iter());
        assert_eq!(ids(&out), vec!["b", "a"]);
    }

    #[test]
    fn orders_numbers_and_breaks_ties_by_id() {
        let docs = [
            doc("c", json!({"studentId": 2})),
            doc("b", json!({"studentId": 1})),
            doc("a", json!({"studentId": 2})),
            doc("d", json!({})),
        ];
        let out = LiveQuery::collection(Collection::Students)
            .order_by("studentId", Direction::Ascending)
            .apply(docs.iter());
        assert_eq!(ids(&out), vec!["b", "a", "c"]);
    }

    #[test]
    fn ordered_query_skips_documents_without_the_field() {
        let docs = [
            doc("a", json!({"studentId": 1})),
            doc("b", json!({"studentId": null})),
            doc("c", json!({"name": "Ana"})),
        ];
        let query = LiveQuery::collection(Collection::Students);
        assert_eq!(ids(&query.apply(docs.iter())), vec!["a", "b", "c"]);
        let ordered = query
            .order_by("studentId", Direction::Ascending)
            .limit(5)
            .apply(docs.iter());
        assert_eq!(ids(&ordered), vec!["b", "a"]);
    }

    #[test]
    fn orders_store_timestamps_descending_with_limit() {
        let docs = [
            doc("old", json!({"date": {"seconds": 100, "nanoseconds": 0}})),
            doc("new", json!({"date": {"seconds": 300, "nanoseconds": 0}})),
            doc("mid", json!({"date": {"_seconds": 200}})),
        ];
        let out = LiveQuery::collection(Collection::Notifications)
            .order_by("date", Direction::Descending)
            .limit(2)
            .apply(docs.iter());
        assert_eq!(ids(&out), vec!["new", "mid"]);
    }
}
