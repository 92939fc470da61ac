//! Record store contract consumed by the analytics core

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use streamstats_common::{
    Event, EventRecord, HourlyRecord, HourlyRecordId, Result, Stream, StreamId,
};

/// Rows an event aggregate is computed over
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventScope {
    /// Every event of every hourly record of a stream
    Stream(StreamId),
    /// Events of one hourly record
    HourlyRecord(HourlyRecordId),
}

/// Count and sums of the three event variants over one scope
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct EventTotals {
    /// Subscription events
    pub subscriptions: u64,
    /// Sum of donation amounts, 0.0 over zero rows
    pub donation_amount: f64,
    /// Sum of bits amounts, 0 over zero rows
    pub bits_amount: u64,
}

impl EventTotals {
    /// Fold a sequence of events into totals
    pub fn from_events<'a>(events: impl IntoIterator<Item = &'a Event>) -> Self {
        events
            .into_iter()
            .fold(Self::default(), |mut totals, event| {
                match event {
                    Event::Subscription { .. } => totals.subscriptions += 1,
                    Event::Donation { amount, .. } => totals.donation_amount += amount,
                    Event::BitsDonation { amount, .. } => totals.bits_amount += amount,
                }
                totals
            })
    }
}

/// A stream with its hourly records and event totals, read consistently
#[derive(Debug, Clone, PartialEq)]
pub struct StreamSnapshot {
    /// The stream
    pub stream: Stream,
    /// Hourly records in insertion order
    pub records: Vec<HourlyRecord>,
    /// Event totals over the whole stream
    pub events: EventTotals,
}

/// Read side of the record store.
///
/// Hourly records are always returned in insertion order, which is the only
/// chronological order the store knows about.
pub trait RecordStore: Send + Sync {
    /// Fetch one stream, `NotFound` when it does not exist
    fn get_stream(&self, id: StreamId) -> Result<Stream>;

    /// Hourly records of a stream in insertion order, `NotFound` for an unknown stream
    fn hourly_records(&self, stream_id: StreamId) -> Result<Vec<HourlyRecord>>;

    /// Streams dated on or after `date`, newest first
    fn streams_since(&self, date: NaiveDate) -> Result<Vec<Stream>>;

    /// Every stream, newest first
    fn list_streams(&self) -> Result<Vec<Stream>>;

    /// Number of subscription events in scope
    fn count_subscriptions(&self, scope: EventScope) -> Result<u64>;

    /// Sum of donation amounts in scope
    fn sum_donations(&self, scope: EventScope) -> Result<f64>;

    /// Sum of bits amounts in scope
    fn sum_bits(&self, scope: EventScope) -> Result<u64>;

    /// Events attached to one hourly record, in insertion order
    fn events_for_record(&self, id: HourlyRecordId) -> Result<Vec<EventRecord>>;

    /// All three event aggregates for a scope
    fn event_totals(&self, scope: EventScope) -> Result<EventTotals> {
        Ok(EventTotals {
            subscriptions: self.count_subscriptions(scope)?,
            donation_amount: self.sum_donations(scope)?,
            bits_amount: self.sum_bits(scope)?,
        })
    }

    /// Stream, records and event totals in one read.
    ///
    /// Stores that can serve this from a single consistent view should
    /// override it.
    fn stream_snapshot(&self, id: StreamId) -> Result<StreamSnapshot> {
        let stream = self.get_stream(id)?;
        let records = self.hourly_records(id)?;
        let events = self.event_totals(EventScope::Stream(id))?;
        Ok(StreamSnapshot {
            stream,
            records,
            events,
        })
    }
}

/// A validated stream ready to be stored
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewStream {
    /// Stream date
    pub date: NaiveDate,
    /// Optional title
    pub title: Option<String>,
    /// Streamer name
    pub streamer: String,
}

/// A validated hourly record and the events recorded with it
#[derive(Debug, Clone, PartialEq)]
pub struct NewHourlyRecord {
    /// Hour label
    pub hour: String,
    /// Viewer count
    pub viewers: u32,
    /// Follower count
    pub followers: u32,
    /// Events committed together with the record
    pub events: Vec<Event>,
}

/// Write side of the record store
pub trait RecordIngest: RecordStore {
    /// Store a new stream and return it with its assigned id
    fn create_stream(&self, new: NewStream) -> Result<Stream>;

    /// Store an hourly record with all its events as one atomic unit.
    ///
    /// Either the record and every event become visible together or nothing
    /// is stored.
    fn insert_hourly_record(
        &self,
        stream_id: StreamId,
        new: NewHourlyRecord,
    ) -> Result<(HourlyRecord, Vec<EventRecord>)>;

    /// Delete a stream with its hourly records and their events
    fn delete_stream(&self, id: StreamId) -> Result<()>;

    /// Delete everything
    fn clear_all(&self) -> Result<()>;
}
