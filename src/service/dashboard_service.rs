//! Dashboard service: keeps derived views in sync with the live store.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, NaiveDate, Utc};
use serde_json::{Map, Value, json};
use tokio::sync::RwLock;

use super::LiveViews;
use crate::config::GatewayConfig;
use crate::domain::{
    AnnouncementRecord, Audience, Collection, DashboardEvent, Direction, Document, DocumentId,
    DocumentStore, EventBus, LiveQuery, LiveSubscription, Snapshot, StoreError, StudentRecord,
    TeacherRecord, ViewerRole,
};
use crate::error::GatewayError;
use crate::pipeline::{
    AnnouncementView, Clock, OverviewSummary, StudentProgress, TeacherStanding,
    build_overview_with_limit, build_teacher_leaderboard, date_key, filter_announcements,
    student_progress,
};

/// Sizes applied when deriving views.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ViewSettings {
    /// Maximum announcements per role feed.
    pub announcement_limit: usize,
    /// Rows on the overview leaderboard.
    pub leaderboard_size: usize,
    /// Rows on the staff leaderboard.
    pub teacher_leaderboard_size: usize,
}

impl Default for ViewSettings {
    fn default() -> Self {
        Self::from(&GatewayConfig::default())
    }
}

impl From<&GatewayConfig> for ViewSettings {
    fn from(config: &GatewayConfig) -> Self {
        Self {
            announcement_limit: config.announcement_limit,
            leaderboard_size: config.leaderboard_size,
            teacher_leaderboard_size: config.teacher_leaderboard_size,
        }
    }
}

/// Most recent value of a derived view.
#[derive(Debug, Clone, PartialEq)]
pub struct ViewState<T> {
    /// The view as computed from the last good snapshot.
    pub data: T,
    /// When `data` was computed.
    pub updated_at: DateTime<Utc>,
    /// Error reported by the live query since `data` was computed, if any.
    /// When set, `data` is stale but still valid to display.
    pub last_error: Option<String>,
}

impl<T> ViewState<T> {
    /// Returns `true` if the live query failed after this view was computed.
    #[must_use]
    pub fn is_stale(&self) -> bool {
        self.last_error.is_some()
    }
}

/// Storage for one derived view. Each live query writes only its own slot.
#[derive(Debug)]
struct Slot<T> {
    current: Option<(T, DateTime<Utc>)>,
    last_error: Option<String>,
}

impl<T> Default for Slot<T> {
    fn default() -> Self {
        Self {
            current: None,
            last_error: None,
        }
    }
}

impl<T> Slot<T> {
    fn replace(&mut self, value: T, at: DateTime<Utc>) {
        self.current = Some((value, at));
        self.last_error = None;
    }

    fn fail(&mut self, message: String) {
        self.last_error = Some(message);
    }

    fn view<U>(
        &self,
        collection: Collection,
        project: impl FnOnce(&T) -> U,
    ) -> Result<ViewState<U>, GatewayError> {
        let Some((value, at)) = &self.current else {
            return Err(match &self.last_error {
                Some(message) => GatewayError::Store(StoreError::Unavailable(message.clone())),
                None => GatewayError::NotReady(collection),
            });
        };
        Ok(ViewState {
            data: project(value),
            updated_at: *at,
            last_error: self.last_error.clone(),
        })
    }
}

#[derive(Debug, Default)]
struct Slots {
    overview: RwLock<Slot<OverviewSummary>>,
    announcements: RwLock<Slot<HashMap<ViewerRole, Vec<AnnouncementView>>>>,
    teachers: RwLock<Slot<Vec<TeacherStanding>>>,
}

/// Orchestration layer for the dashboards.
///
/// Opens one live query per collection and, for every delivered snapshot,
/// rebuilds that collection's view from scratch, stores it, and publishes a
/// [`DashboardEvent`]. A failed delivery leaves the last view in place and
/// marks it stale. Writes go straight to the store; the resulting change
/// comes back through the live queries like any other.
#[derive(Debug, Clone)]
pub struct DashboardService {
    store: Arc<dyn DocumentStore>,
    event_bus: EventBus,
    clock: Arc<dyn Clock>,
    settings: ViewSettings,
    slots: Arc<Slots>,
}

impl DashboardService {
    /// Creates a new `DashboardService`. Call [`Self::start`] to begin
    /// following the store.
    #[must_use]
    pub fn new(
        store: Arc<dyn DocumentStore>,
        event_bus: EventBus,
        clock: Arc<dyn Clock>,
        settings: ViewSettings,
    ) -> Self {
        Self {
            store,
            event_bus,
            clock,
            settings,
            slots: Arc::new(Slots::default()),
        }
    }

    /// Returns a reference to the inner [`EventBus`].
    #[must_use]
    pub fn event_bus(&self) -> &EventBus {
        &self.event_bus
    }

    /// Returns the view settings in effect.
    #[must_use]
    pub fn settings(&self) -> ViewSettings {
        self.settings
    }

    /// Live query used for `collection`.
    #[must_use]
    pub fn live_query(collection: Collection) -> LiveQuery {
        let query = LiveQuery::collection(collection);
        match collection {
            Collection::Students => query.order_by("studentId", Direction::Ascending),
            Collection::Notifications => query.order_by("date", Direction::Descending),
            Collection::Teachers => query.order_by("name", Direction::Ascending),
        }
    }

    /// Opens the live queries and spawns one task per collection.
    ///
    /// Must be called from within a Tokio runtime. The feeds run until the
    /// returned [`LiveViews`] is dropped or shut down.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::Store`] if a live query cannot be opened.
    /// Feeds opened before the failure are stopped.
    pub fn start(&self) -> Result<LiveViews, GatewayError> {
        let mut views = LiveViews::new(Vec::with_capacity(Collection::ALL.len()));
        for collection in Collection::ALL {
            let subscription = self.store.subscribe(Self::live_query(collection))?;
            let service = self.clone();
            views.push(collection, tokio::spawn(service.run_feed(subscription)));
        }
        tracing::info!(feeds = Collection::ALL.len(), "live dashboard feeds started");
        Ok(views)
    }

    async fn run_feed(self, mut subscription: LiveSubscription) {
        let collection = subscription.query().collection;
        while let Some(delivery) = subscription.next().await {
            self.handle_delivery(collection, delivery).await;
        }
        tracing::debug!(%collection, "live feed ended");
    }

    /// Processes one delivery from the live query on `collection`.
    pub async fn handle_delivery(
        &self,
        collection: Collection,
        delivery: Result<Snapshot, StoreError>,
    ) {
        match delivery {
            Ok(snapshot) => self.apply_snapshot(collection, &snapshot).await,
            Err(err) => self.apply_failure(collection, &err).await,
        }
    }

    async fn apply_snapshot(&self, collection: Collection, snapshot: &[Document]) {
        let now = self.clock.now();
        let events = match collection {
            Collection::Students => {
                let records: Vec<StudentRecord> =
                    snapshot.iter().map(StudentRecord::from_document).collect();
                let overview = build_overview_with_limit(
                    &records,
                    self.clock.today(),
                    self.settings.leaderboard_size,
                );
                tracing::debug!(
                    students = overview.total_students,
                    present = overview.today_present_count,
                    "overview recomputed"
                );
                self.slots.overview.write().await.replace(overview.clone(), now);
                vec![DashboardEvent::OverviewUpdated {
                    overview,
                    timestamp: now,
                }]
            }
            Collection::Notifications => {
                let records: Vec<AnnouncementRecord> = snapshot
                    .iter()
                    .map(AnnouncementRecord::from_document)
                    .collect();
                let feeds: HashMap<ViewerRole, Vec<AnnouncementView>> = ViewerRole::ALL
                    .into_iter()
                    .map(|role| {
                        let feed = filter_announcements(
                            &records,
                            role.accepted_audiences(),
                            self.clock.as_ref(),
                            self.settings.announcement_limit,
                        );
                        (role, feed)
                    })
                    .collect();
                tracing::debug!(announcements = records.len(), "announcement feeds recomputed");
                let events = ViewerRole::ALL
                    .into_iter()
                    .map(|role| DashboardEvent::AnnouncementsUpdated {
                        role,
                        announcements: feeds.get(&role).cloned().unwrap_or_default(),
                        timestamp: now,
                    })
                    .collect();
                self.slots.announcements.write().await.replace(feeds, now);
                events
            }
            Collection::Teachers => {
                let records: Vec<TeacherRecord> =
                    snapshot.iter().map(TeacherRecord::from_document).collect();
                let standings =
                    build_teacher_leaderboard(&records, self.settings.teacher_leaderboard_size);
                tracing::debug!(teachers = records.len(), "staff leaderboard recomputed");
                self.slots.teachers.write().await.replace(standings.clone(), now);
                vec![DashboardEvent::TeacherLeaderboardUpdated {
                    standings,
                    timestamp: now,
                }]
            }
        };

        for event in events {
            let _ = self.event_bus.publish(event);
        }
    }

    async fn apply_failure(&self, collection: Collection, err: &StoreError) {
        let message = err.to_string();
        tracing::warn!(%collection, error = %message, "live query failed, keeping last view");
        match collection {
            Collection::Students => self.slots.overview.write().await.fail(message.clone()),
            Collection::Notifications => {
                self.slots.announcements.write().await.fail(message.clone());
            }
            Collection::Teachers => self.slots.teachers.write().await.fail(message.clone()),
        }
        let _ = self.event_bus.publish(DashboardEvent::SubscriptionFailed {
            collection,
            message,
            timestamp: self.clock.now(),
        });
    }

    /// Returns the current overview.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::NotReady`] before the first students
    /// snapshot, or [`GatewayError::Store`] if the query failed before
    /// delivering one.
    pub async fn overview(&self) -> Result<ViewState<OverviewSummary>, GatewayError> {
        self.slots
            .overview
            .read()
            .await
            .view(Collection::Students, Clone::clone)
    }

    /// Returns the announcement feed for `role`.
    ///
    /// # Errors
    ///
    /// Same conditions as [`Self::overview`], for the notifications query.
    pub async fn announcements(
        &self,
        role: ViewerRole,
    ) -> Result<ViewState<Vec<AnnouncementView>>, GatewayError> {
        self.slots
            .announcements
            .read()
            .await
            .view(Collection::Notifications, |feeds| {
                feeds.get(&role).cloned().unwrap_or_default()
            })
    }

    /// Returns the staff leaderboard.
    ///
    /// # Errors
    ///
    /// Same conditions as [`Self::overview`], for the teachers query.
    pub async fn teacher_leaderboard(
        &self,
    ) -> Result<ViewState<Vec<TeacherStanding>>, GatewayError> {
        self.slots
            .teachers
            .read()
            .await
            .view(Collection::Teachers, Clone::clone)
    }

    /// Builds the parent-facing progress card of one student.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::StudentNotFound`] if the id is unknown, or
    /// [`GatewayError::Store`] if the store cannot be read.
    pub fn student_progress(&self, id: &DocumentId) -> Result<StudentProgress, GatewayError> {
        let doc = self
            .store
            .get(Collection::Students, id)
            .map_err(GatewayError::from_student_lookup)?;
        Ok(student_progress(
            &StudentRecord::from_document(&doc),
            self.clock.today(),
        ))
    }

    /// Creates or replaces a student document.
    ///
    /// The students feed is ordered by `studentId`, so a document saved
    /// without one is stored but left out of the live views.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::InvalidRequest`] for a blank id, or
    /// [`GatewayError::Store`] if the write is rejected.
    pub fn upsert_student(
        &self,
        id: DocumentId,
        fields: Map<String, Value>,
    ) -> Result<StudentProgress, GatewayError> {
        if id.is_blank() {
            return Err(GatewayError::InvalidRequest(
                "student id must not be blank".to_string(),
            ));
        }
        let doc = Document::new(id, fields);
        self.store.upsert(Collection::Students, doc.clone())?;
        tracing::info!(student = %doc.id, "student saved");
        Ok(student_progress(
            &StudentRecord::from_document(&doc),
            self.clock.today(),
        ))
    }

    /// Records a student as present or absent on `date` (today when `None`).
    ///
    /// Marking present adds the date to `attendance` and removes it from
    /// `absentDates`; marking absent does the reverse.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::StudentNotFound`] if the id is unknown, or
    /// [`GatewayError::Store`] if the write is rejected.
    pub fn mark_attendance(
        &self,
        id: &DocumentId,
        date: Option<NaiveDate>,
        present: bool,
    ) -> Result<StudentProgress, GatewayError> {
        let key = date_key(date.unwrap_or_else(|| self.clock.today()));
        let (add_to, remove_from) = if present {
            ("attendance", "absentDates")
        } else {
            ("absentDates", "attendance")
        };
        let doc = self
            .store
            .update(Collection::Students, id, &mut |fields: &mut Map<String, Value>| {
                add_date(fields, add_to, &key);
                remove_date(fields, remove_from, &key);
            })
            .map_err(GatewayError::from_student_lookup)?;
        tracing::info!(student = %id, date = %key, present, "attendance recorded");
        Ok(student_progress(
            &StudentRecord::from_document(&doc),
            self.clock.today(),
        ))
    }

    /// Appends an entry to a student's rewards ledger. Negative amounts
    /// record a deduction.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::InvalidRequest`] for a zero amount,
    /// [`GatewayError::StudentNotFound`] if the id is unknown, or
    /// [`GatewayError::Store`] if the write is rejected.
    pub fn award_reward(
        &self,
        id: &DocumentId,
        dollars: i64,
        reason: Option<String>,
    ) -> Result<StudentProgress, GatewayError> {
        if dollars == 0 {
            return Err(GatewayError::InvalidRequest(
                "dollars must be non-zero".to_string(),
            ));
        }
        let mut entry = Map::new();
        entry.insert("dollars".to_string(), json!(dollars));
        if let Some(reason) = reason.filter(|r| !r.trim().is_empty()) {
            entry.insert("reason".to_string(), Value::String(reason));
        }
        entry.insert(
            "date".to_string(),
            Value::String(self.clock.now().to_rfc3339()),
        );
        let entry = Value::Object(entry);

        let doc = self
            .store
            .update(Collection::Students, id, &mut |fields: &mut Map<String, Value>| {
                match fields.get_mut("rewards") {
                    Some(Value::Array(items)) => items.push(entry.clone()),
                    _ => {
                        fields.insert("rewards".to_string(), Value::Array(vec![entry.clone()]));
                    }
                }
            })
            .map_err(GatewayError::from_student_lookup)?;
        tracing::info!(student = %id, dollars, "reward recorded");
        Ok(student_progress(
            &StudentRecord::from_document(&doc),
            self.clock.today(),
        ))
    }

    /// Posts an announcement dated now.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::InvalidRequest`] for an empty title or an
    /// unrecognised audience, or [`GatewayError::Store`] if the write is
    /// rejected.
    pub fn post_announcement(
        &self,
        title: &str,
        message: &str,
        audience: Audience,
        is_important: bool,
    ) -> Result<DocumentId, GatewayError> {
        if title.trim().is_empty() {
            return Err(GatewayError::InvalidRequest(
                "title must not be empty".to_string(),
            ));
        }
        if audience == Audience::Unspecified {
            return Err(GatewayError::InvalidRequest(
                "audience must be one of Teachers, Parents, All Students, All".to_string(),
            ));
        }
        let now = self.clock.now();
        let mut fields = Map::new();
        fields.insert("title".to_string(), Value::String(title.trim().to_string()));
        fields.insert("message".to_string(), Value::String(message.to_string()));
        fields.insert(
            "audience".to_string(),
            Value::String(audience.as_str().to_string()),
        );
        fields.insert(
            "date".to_string(),
            json!({"seconds": now.timestamp(), "nanoseconds": now.timestamp_subsec_nanos()}),
        );
        fields.insert("isImportant".to_string(), Value::Bool(is_important));

        let id = self.store.insert(Collection::Notifications, fields)?;
        tracing::info!(announcement = %id, %audience, "announcement posted");
        Ok(id)
    }
}

/// Adds `key` to the date set stored in `field`, creating the field as an
/// array when it is missing or malformed.
fn add_date(fields: &mut Map<String, Value>, field: &str, key: &str) {
    match fields.get_mut(field) {
        Some(Value::Array(items)) => {
            let present = items
                .iter()
                .any(|v| v.as_str().is_some_and(|s| s.starts_with(key)));
            if !present {
                items.push(Value::String(key.to_string()));
            }
        }
        Some(Value::Object(map)) => {
            map.insert(key.to_string(), Value::Bool(true));
        }
        _ => {
            fields.insert(field.to_string(), json!([key]));
        }
    }
}

/// Removes every entry for `key` from the date set stored in `field`.
fn remove_date(fields: &mut Map<String, Value>, field: &str, key: &str) {
    match fields.get_mut(field) {
        Some(Value::Array(items)) => {
            items.retain(|v| !v.as_str().is_some_and(|s| s.starts_with(key)));
        }
        Some(Value::Object(map)) => map.retain(|k, _| !k.starts_with(key)),
        _ => {}
    }
}
