//! In-memory record store

use chrono::NaiveDate;
use parking_lot::RwLock;
use std::collections::{BTreeMap, HashSet};
use streamstats_common::{
    Event, EventId, EventRecord, FieldError, HourlyRecord, HourlyRecordId, Result, StatsError,
    Stream, StreamId,
};
use tracing::{debug, info};

use crate::repository::{
    EventScope, EventTotals, NewHourlyRecord, NewStream, RecordIngest, RecordStore,
    StreamSnapshot,
};

/// Row counts, mainly for diagnostics
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct StoreCounts {
    /// Streams
    pub streams: usize,
    /// Hourly records
    pub hourly_records: usize,
    /// Events
    pub events: usize,
}

#[derive(Debug, Default)]
struct Inner {
    next_stream_id: u64,
    next_record_id: u64,
    next_event_id: u64,
    streams: BTreeMap<StreamId, Stream>,
    // Insertion order is the chronological order of records and events
    records: Vec<HourlyRecord>,
    events: Vec<EventRecord>,
}

/// Id following `last`, failing once the id space is used up
fn next_id(last: u64, kind: &str) -> Result<u64> {
    last.checked_add(1)
        .ok_or_else(|| StatsError::storage(format!("No {kind} ids left")))
}

impl Inner {
    fn stream(&self, id: StreamId) -> Result<&Stream> {
        self.streams
            .get(&id)
            .ok_or_else(|| StatsError::not_found("stream", id))
    }

    fn records_of(&self, stream_id: StreamId) -> impl Iterator<Item = &HourlyRecord> {
        self.records
            .iter()
            .filter(move |record| record.stream_id == stream_id)
    }

    fn events_in(&self, scope: EventScope) -> Vec<&Event> {
        match scope {
            EventScope::HourlyRecord(record_id) => self
                .events
                .iter()
                .filter(|e| e.hourly_record_id == record_id)
                .map(|e| &e.event)
                .collect(),
            EventScope::Stream(stream_id) => {
                let record_ids: HashSet<HourlyRecordId> =
                    self.records_of(stream_id).map(|r| r.id).collect();
                self.events
                    .iter()
                    .filter(|e| record_ids.contains(&e.hourly_record_id))
                    .map(|e| &e.event)
                    .collect()
            }
        }
    }

    fn totals(&self, scope: EventScope) -> EventTotals {
        EventTotals::from_events(self.events_in(scope))
    }

    fn sorted_newest_first(&self, since: Option<NaiveDate>) -> Vec<Stream> {
        let mut streams: Vec<Stream> = self
            .streams
            .values()
            .filter(|s| since.map_or(true, |start| s.date >= start))
            .cloned()
            .collect();
        // Stable sort keeps id order among streams of the same date
        streams.sort_by(|a, b| b.date.cmp(&a.date));
        streams
    }
}

/// Thread-safe store keeping every row in memory.
///
/// All reads and writes go through one `RwLock`, so every call observes a
/// consistent state and multi-row writes are atomic.
#[derive(Debug, Default)]
pub struct MemoryStore {
    inner: RwLock<Inner>,
}

impl MemoryStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Current row counts
    pub fn counts(&self) -> StoreCounts {
        let inner = self.inner.read();
        StoreCounts {
            streams: inner.streams.len(),
            hourly_records: inner.records.len(),
            events: inner.events.len(),
        }
    }
}

fn check_events(events: &[Event]) -> Result<()> {
    let errors: Vec<FieldError> = events
        .iter()
        .enumerate()
        .filter_map(|(i, event)| match event {
            Event::Donation { amount, .. } if !amount.is_finite() || *amount < 0.0 => Some(
                FieldError::new(format!("events[{i}].amount"), "must be a non-negative amount"),
            ),
            _ if event.username().trim().is_empty() => Some(FieldError::new(
                format!("events[{i}].username"),
                "cannot be empty",
            )),
            _ => None,
        })
        .collect();

    if errors.is_empty() {
        Ok(())
    } else {
        Err(StatsError::invalid_input(errors))
    }
}

impl RecordStore for MemoryStore {
    fn get_stream(&self, id: StreamId) -> Result<Stream> {
        self.inner.read().stream(id).cloned()
    }

    fn hourly_records(&self, stream_id: StreamId) -> Result<Vec<HourlyRecord>> {
        let inner = self.inner.read();
        inner.stream(stream_id)?;
        Ok(inner.records_of(stream_id).cloned().collect())
    }

    fn streams_since(&self, date: NaiveDate) -> Result<Vec<Stream>> {
        Ok(self.inner.read().sorted_newest_first(Some(date)))
    }

    fn list_streams(&self) -> Result<Vec<Stream>> {
        Ok(self.inner.read().sorted_newest_first(None))
    }

    fn count_subscriptions(&self, scope: EventScope) -> Result<u64> {
        Ok(self.inner.read().totals(scope).subscriptions)
    }

    fn sum_donations(&self, scope: EventScope) -> Result<f64> {
        Ok(self.inner.read().totals(scope).donation_amount)
    }

    fn sum_bits(&self, scope: EventScope) -> Result<u64> {
        Ok(self.inner.read().totals(scope).bits_amount)
    }

    fn events_for_record(&self, id: HourlyRecordId) -> Result<Vec<EventRecord>> {
        let inner = self.inner.read();
        if !inner.records.iter().any(|r| r.id == id) {
            return Err(StatsError::not_found("hourly record", id));
        }
        Ok(inner
            .events
            .iter()
            .filter(|e| e.hourly_record_id == id)
            .cloned()
            .collect())
    }

    fn event_totals(&self, scope: EventScope) -> Result<EventTotals> {
        Ok(self.inner.read().totals(scope))
    }

    fn stream_snapshot(&self, id: StreamId) -> Result<StreamSnapshot> {
        let inner = self.inner.read();
        let stream = inner.stream(id)?.clone();
        Ok(StreamSnapshot {
            stream,
            records: inner.records_of(id).cloned().collect(),
            events: inner.totals(EventScope::Stream(id)),
        })
    }
}

impl RecordIngest for MemoryStore {
    fn create_stream(&self, new: NewStream) -> Result<Stream> {
        let mut inner = self.inner.write();
        inner.next_stream_id = next_id(inner.next_stream_id, "stream")?;
        let stream = Stream {
            id: StreamId(inner.next_stream_id),
            date: new.date,
            title: new.title,
            streamer: new.streamer,
        };
        inner.streams.insert(stream.id, stream.clone());
        info!(stream_id = %stream.id, date = %stream.date, "Created stream");
        Ok(stream)
    }

    fn insert_hourly_record(
        &self,
        stream_id: StreamId,
        new: NewHourlyRecord,
    ) -> Result<(HourlyRecord, Vec<EventRecord>)> {
        check_events(&new.events)?;

        let mut inner = self.inner.write();
        inner.stream(stream_id)?;
        let record_id = next_id(inner.next_record_id, "hourly record")?;
        let event_count = u64::try_from(new.events.len()).unwrap_or(u64::MAX);
        if inner.next_event_id.checked_add(event_count).is_none() {
            return Err(StatsError::storage("No event ids left"));
        }

        // Nothing is mutated before this point, so a failure above stores nothing
        inner.next_record_id = record_id;
        let record = HourlyRecord {
            id: HourlyRecordId(record_id),
            stream_id,
            hour: new.hour,
            viewers: new.viewers,
            followers: new.followers,
        };

        let mut events = Vec::with_capacity(new.events.len());
        for event in new.events {
            inner.next_event_id += 1;
            events.push(EventRecord {
                id: EventId(inner.next_event_id),
                hourly_record_id: record.id,
                event,
            });
        }

        inner.records.push(record.clone());
        inner.events.extend(events.iter().cloned());

        debug!(
            stream_id = %stream_id,
            record_id = %record.id,
            events = events.len(),
            "Inserted hourly record"
        );
        Ok((record, events))
    }

    fn delete_stream(&self, id: StreamId) -> Result<()> {
        let mut inner = self.inner.write();
        if inner.streams.remove(&id).is_none() {
            return Err(StatsError::not_found("stream", id));
        }

        let removed: HashSet<HourlyRecordId> =
            inner.records_of(id).map(|record| record.id).collect();
        inner.records.retain(|record| record.stream_id != id);
        inner
            .events
            .retain(|event| !removed.contains(&event.hourly_record_id));

        info!(stream_id = %id, hourly_records = removed.len(), "Deleted stream");
        Ok(())
    }

    fn clear_all(&self) -> Result<()> {
        let mut inner = self.inner.write();
        let streams = inner.streams.len();
        inner.streams.clear();
        inner.records.clear();
        inner.events.clear();
        info!(streams, "Cleared all streams");
        Ok(())
    }
}
