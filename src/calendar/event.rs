use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use md5::{Digest, Md5};
use serde_json::{Map, Value, json};

use super::alarm::SharedEvent;
use super::attendee::Attendee;
use super::calendar_type::Calendar;

/// Timestamp pattern shared by the summary line and ICS encoders.
pub const YMD_HIS: &str = "%Y%m%dT%H%M%S";

/// Stays on the event after it fires. A callback that captures a
/// [`SharedEvent`] for its own event forms an `Arc` cycle and is never freed.
pub type AlarmCallback = Arc<dyn Fn(SharedEvent) + Send + Sync>;

/// A single calendar occurrence.
///
/// Setters take `&mut self` and hand the event back so calls can be chained.
/// `Clone` is shallow: attendees and the organizer are shared `Arc`s, but
/// appending to a clone's attendee list never touches the original.
#[derive(Clone, Default)]
pub struct Event {
    start: DateTime<Utc>,
    end: DateTime<Utc>,
    created: DateTime<Utc>,
    modified: DateTime<Utc>,
    alarm_time: Duration,
    imported_id: String,
    status: String,
    description: String,
    location: String,
    summary: String,
    rrule: String,
    class: String,
    id: String,
    sequence: i64,
    attendees: Vec<Arc<Attendee>>,
    organizer: Option<Arc<Attendee>>,
    whole_day_event: bool,
    calendar_id: Option<String>,
    alarm_callback: Option<AlarmCallback>,
}

impl Event {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_start(&mut self, start: DateTime<Utc>) -> &mut Self {
        self.start = start;
        self
    }

    pub fn start(&self) -> DateTime<Utc> {
        self.start
    }

    pub fn set_end(&mut self, end: DateTime<Utc>) -> &mut Self {
        self.end = end;
        self
    }

    pub fn end(&self) -> DateTime<Utc> {
        self.end
    }

    pub fn set_created(&mut self, created: DateTime<Utc>) -> &mut Self {
        self.created = created;
        self
    }

    pub fn created(&self) -> DateTime<Utc> {
        self.created
    }

    pub fn set_last_modified(&mut self, modified: DateTime<Utc>) -> &mut Self {
        self.modified = modified;
        self
    }

    pub fn last_modified(&self) -> DateTime<Utc> {
        self.modified
    }

    pub fn set_id(&mut self, id: impl Into<String>) -> &mut Self {
        self.id = id.into();
        self
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    /// Identifier assigned by the system the event was imported from.
    pub fn set_imported_id(&mut self, id: impl Into<String>) -> &mut Self {
        self.imported_id = id.into();
        self
    }

    pub fn imported_id(&self) -> &str {
        &self.imported_id
    }

    pub fn set_sequence(&mut self, sequence: i64) -> &mut Self {
        self.sequence = sequence;
        self
    }

    pub fn sequence(&self) -> i64 {
        self.sequence
    }

    pub fn set_status(&mut self, status: impl Into<String>) -> &mut Self {
        self.status = status.into();
        self
    }

    pub fn status(&self) -> &str {
        &self.status
    }

    pub fn set_summary(&mut self, summary: impl Into<String>) -> &mut Self {
        self.summary = summary.into();
        self
    }

    pub fn summary(&self) -> &str {
        &self.summary
    }

    pub fn set_description(&mut self, description: impl Into<String>) -> &mut Self {
        self.description = description.into();
        self
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn set_location(&mut self, location: impl Into<String>) -> &mut Self {
        self.location = location.into();
        self
    }

    pub fn location(&self) -> &str {
        &self.location
    }

    pub fn set_class(&mut self, class: impl Into<String>) -> &mut Self {
        self.class = class.into();
        self
    }

    pub fn class(&self) -> &str {
        &self.class
    }

    /// Stored verbatim; never parsed or expanded.
    pub fn set_rrule(&mut self, rrule: impl Into<String>) -> &mut Self {
        self.rrule = rrule.into();
        self
    }

    pub fn rrule(&self) -> &str {
        &self.rrule
    }

    pub fn set_whole_day_event(&mut self, whole_day: bool) -> &mut Self {
        self.whole_day_event = whole_day;
        self
    }

    pub fn whole_day_event(&self) -> bool {
        self.whole_day_event
    }

    pub fn is_whole_day(&self) -> bool {
        self.whole_day_event
    }

    pub fn add_attendee(&mut self, attendee: impl Into<Arc<Attendee>>) -> &mut Self {
        self.attendees.push(attendee.into());
        self
    }

    pub fn add_attendees<I>(&mut self, attendees: I) -> &mut Self
    where
        I: IntoIterator,
        I::Item: Into<Arc<Attendee>>,
    {
        self.attendees.extend(attendees.into_iter().map(Into::into));
        self
    }

    pub fn attendees(&self) -> &[Arc<Attendee>] {
        &self.attendees
    }

    /// Independent of the attendee list; the organizer is not added to it.
    pub fn set_organizer(&mut self, organizer: Option<Arc<Attendee>>) -> &mut Self {
        self.organizer = organizer;
        self
    }

    pub fn organizer(&self) -> Option<&Arc<Attendee>> {
        self.organizer.as_ref()
    }

    /// Records which calendar holds this event. The calendar itself is not
    /// touched.
    pub fn set_calendar(&mut self, calendar: Option<&Calendar>) -> &mut Self {
        self.calendar_id = calendar.map(|c| c.id.clone());
        self
    }

    pub fn calendar_id(&self) -> Option<&str> {
        self.calendar_id.as_deref()
    }

    pub fn resolve_calendar<'a>(&self, calendars: &'a [Calendar]) -> Option<&'a Calendar> {
        let id = self.calendar_id.as_deref()?;
        calendars.iter().find(|c| c.id == id)
    }

    pub fn alarm_time(&self) -> Duration {
        self.alarm_time
    }

    pub fn alarm_callback(&self) -> Option<&AlarmCallback> {
        self.alarm_callback.as_ref()
    }

    pub(crate) fn record_alarm(&mut self, offset: Duration, callback: AlarmCallback) {
        self.alarm_time = offset;
        self.alarm_callback = Some(callback);
    }

    pub fn duration(&self) -> chrono::Duration {
        self.end - self.start
    }

    pub fn overlaps(&self, other: &Event) -> bool {
        self.start < other.end && other.start < self.end
    }

    /// Derives a stable 32 character hex id from the event content.
    ///
    /// Imported events hash `start`, `end` and the imported id so that
    /// re-importing yields the same id. Everything else hashes `start`, `end`,
    /// `summary` and `description`. The result is not assigned to `id`.
    pub fn generate_event_id(&self) -> String {
        let times = format!("{}{}", self.start, self.end);
        let fingerprint = if self.imported_id.is_empty() {
            format!("{times}{}{}", self.summary, self.description)
        } else {
            format!("{times}{}", self.imported_id)
        };
        tracing::trace!(%fingerprint, "hashing event fingerprint");
        hex::encode(Md5::digest(fingerprint.as_bytes()))
    }

    /// Flattens the event into a field map ahead of serialization.
    ///
    /// Attendees are emitted as `attendees<index>` =
    /// `[email, cutype, status, name, role]`; the organizer as
    /// `[cutype, email, name, role, status]`. Consumers rely on both orders.
    pub fn to_map(&self) -> Map<String, Value> {
        let mut map = Map::new();
        map.insert("start".into(), json!(self.start.to_string()));
        map.insert("end".into(), json!(self.end.to_string()));
        map.insert("created".into(), json!(self.created.to_string()));
        map.insert("modified".into(), json!(self.modified.to_string()));
        map.insert("alarmTime".into(), json!(format!("{:?}", self.alarm_time)));
        map.insert("importedId".into(), json!(self.imported_id));
        map.insert("status".into(), json!(self.status));
        map.insert("description".into(), json!(self.description));
        map.insert("location".into(), json!(self.location));
        map.insert("summary".into(), json!(self.summary));
        map.insert("rrule".into(), json!(self.rrule));
        map.insert("class".into(), json!(self.class));
        map.insert("id".into(), json!(self.id));
        map.insert("sequence".into(), json!(self.sequence));
        map.insert("wholeDayEvent".into(), json!(self.whole_day_event));

        for (i, a) in self.attendees.iter().enumerate() {
            map.insert(
                format!("attendees{i}"),
                json!([a.email(), a.cutype(), a.status(), a.name(), a.role()]),
            );
        }

        if let Some(o) = &self.organizer {
            map.insert(
                "organizer".into(),
                json!([o.cutype(), o.email(), o.name(), o.role(), o.status()]),
            );
        }

        map
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Event({}) from {} to {} about {} . {} people are invited to it",
            self.status,
            self.start.format(YMD_HIS),
            self.end.format(YMD_HIS),
            self.summary,
            self.attendees.len()
        )
    }
}

impl fmt::Debug for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Event")
            .field("id", &self.id)
            .field("imported_id", &self.imported_id)
            .field("summary", &self.summary)
            .field("status", &self.status)
            .field("start", &self.start)
            .field("end", &self.end)
            .field("whole_day_event", &self.whole_day_event)
            .field("sequence", &self.sequence)
            .field("attendees", &self.attendees.len())
            .field("organizer", &self.organizer.as_ref().map(|o| o.email()))
            .field("calendar_id", &self.calendar_id)
            .field("alarm_time", &self.alarm_time)
            .field("has_alarm", &self.alarm_callback.is_some())
            .finish()
    }
}
