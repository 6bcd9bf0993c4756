//! Domain layer: records, the document store boundary, and events.
//!
//! Records are decoded leniently from raw store documents. The store itself
//! is an external collaborator reached through [`DocumentStore`];
//! [`MemoryStore`] is the in-process implementation. Derived views are
//! announced on the [`EventBus`] as [`DashboardEvent`]s.

pub mod announcement;
pub mod collection;
pub mod dashboard_event;
pub mod document_id;
pub mod document_store;
pub mod dollars;
pub mod error;
pub mod event_bus;
pub mod memory_store;
pub mod student;
pub mod teacher;

pub use announcement::{AnnouncementDate, AnnouncementRecord, Audience, ViewerRole};
pub use collection::{Collection, Direction, Document, LiveQuery, OrderBy, Snapshot};
pub use dashboard_event::{DashboardEvent, Topic};
pub use document_id::DocumentId;
pub use document_store::{CollectionState, DocumentStore, FieldUpdate, LiveSubscription};
pub use dollars::{DollarAmount, parse_leading_int, serialize_amount};
pub use error::StoreError;
pub use event_bus::EventBus;
pub use memory_store::MemoryStore;
pub use student::{Reward, StudentRecord, UNKNOWN_STUDENT_NAME};
pub use teacher::{TeacherRecord, UNKNOWN_TEACHER_NAME};
