//! Domain model: recorded streams, their hourly snapshots and events, and the
//! read-only summaries derived from them.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::{fmt, num::ParseIntError, str::FromStr};

macro_rules! id_newtype {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub u64);

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl FromStr for $name {
            type Err = ParseIntError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                s.trim().parse().map(Self)
            }
        }
    };
}

id_newtype!(
    /// Identifier of a recorded stream.
    StreamId
);
id_newtype!(
    /// Identifier of an hourly measurement record.
    HourlyRecordId
);
id_newtype!(
    /// Identifier of a subscription, donation or bits event.
    EventId
);

/// One recorded broadcast session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Stream {
    /// Store-assigned identifier
    pub id: StreamId,
    /// Calendar date the stream took place
    pub date: NaiveDate,
    /// Optional title, reports substitute a placeholder when absent
    pub title: Option<String>,
    /// Name of the streamer
    pub streamer: String,
}

/// A measurement snapshot within a stream.
///
/// `hour` is an opaque label such as `"10:00"`. It is never parsed or sorted;
/// insertion order is the chronological order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HourlyRecord {
    /// Store-assigned identifier
    pub id: HourlyRecordId,
    /// Owning stream
    pub stream_id: StreamId,
    /// Free-form hour label
    pub hour: String,
    /// Viewer count at that hour
    pub viewers: u32,
    /// Cumulative follower count at that hour
    pub followers: u32,
}

/// Audience activity attached to an hourly record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Event {
    /// A new subscription
    Subscription {
        /// Subscriber name
        username: String,
    },
    /// A currency donation
    Donation {
        /// Donor name
        username: String,
        /// Non-negative amount in the configured currency
        amount: f64,
    },
    /// A bits cheer
    BitsDonation {
        /// Donor name
        username: String,
        /// Number of bits
        amount: u64,
    },
}

impl Event {
    /// Name of the user behind the event.
    pub fn username(&self) -> &str {
        match self {
            Self::Subscription { username }
            | Self::Donation { username, .. }
            | Self::BitsDonation { username, .. } => username,
        }
    }
}

/// A stored event and the hourly record it belongs to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventRecord {
    /// Store-assigned identifier
    pub id: EventId,
    /// Owning hourly record
    pub hourly_record_id: HourlyRecordId,
    /// Event payload
    pub event: Event,
}

/// Aggregate over one stream's hourly records and events.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StreamSummary {
    /// The summarized stream
    pub stream: Stream,
    /// Raw sum of the hourly viewer counts
    pub total_viewers: u64,
    /// `total_viewers / hourly_data_points`, 0 when there are no records
    pub average_viewers: f64,
    /// Highest hourly viewer count
    pub peak_viewers: u32,
    /// Number of subscription events
    pub total_subscriptions: u64,
    /// Sum of donation amounts
    pub total_donation_amount: f64,
    /// Sum of bits amounts
    pub total_bits_amount: u64,
    /// Number of hourly records
    pub hourly_data_points: usize,
    /// Follower count of the first record in insertion order
    pub first_stat_followers: u32,
    /// Follower count of the last record in insertion order
    pub last_stat_followers: u32,
    /// `last_stat_followers - first_stat_followers`, may be negative
    pub followers_gained_approx: i64,
}

impl StreamSummary {
    /// A zero-valued summary for a stream without any records.
    pub const fn empty(stream: Stream) -> Self {
        Self {
            stream,
            total_viewers: 0,
            average_viewers: 0.0,
            peak_viewers: 0,
            total_subscriptions: 0,
            total_donation_amount: 0.0,
            total_bits_amount: 0,
            hourly_data_points: 0,
            first_stat_followers: 0,
            last_stat_followers: 0,
            followers_gained_approx: 0,
        }
    }
}

/// Calendar window used to group streams.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PeriodKind {
    /// Today only
    #[default]
    Day,
    /// Since the most recent Monday
    Week,
    /// Since the first of the current month
    Month,
    /// Since the first of January
    Year,
}

impl PeriodKind {
    /// All period kinds, shortest first.
    pub const ALL: [Self; 4] = [Self::Day, Self::Week, Self::Month, Self::Year];

    /// Strict parse, case-insensitive.
    pub fn try_parse(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "day" => Some(Self::Day),
            "week" => Some(Self::Week),
            "month" => Some(Self::Month),
            "year" => Some(Self::Year),
            _ => None,
        }
    }

    /// Lenient parse: unrecognized names select [`PeriodKind::Day`].
    pub fn parse_lenient(name: &str) -> Self {
        Self::try_parse(name).unwrap_or_default()
    }

    /// Lowercase name (`"week"`).
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Day => "day",
            Self::Week => "week",
            Self::Month => "month",
            Self::Year => "year",
        }
    }

    /// Capitalized name used in titles (`"Week"`).
    pub const fn capitalized(self) -> &'static str {
        match self {
            Self::Day => "Day",
            Self::Week => "Week",
            Self::Month => "Month",
            Self::Year => "Year",
        }
    }
}

impl fmt::Display for PeriodKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PeriodKind {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::parse_lenient(s))
    }
}

/// Per-stream row of a period summary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PeriodStreamStats {
    /// The stream
    pub stream: Stream,
    /// Mean hourly viewers, `None` when the stream has no records
    pub average_viewers: Option<f64>,
    /// Highest hourly viewers, `None` when the stream has no records
    pub peak_viewers: Option<u32>,
    /// Subscription events of this stream
    pub subscriptions: u64,
    /// Donation total of this stream
    pub donation_amount: f64,
    /// Bits total of this stream
    pub bits_amount: u64,
    /// Number of hourly records of this stream
    pub hourly_data_points: usize,
}

/// Event totals over every stream of a period.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct PeriodTotals {
    /// Subscription events
    pub subscriptions: u64,
    /// Donation amount
    pub donation_amount: f64,
    /// Bits amount
    pub bits_amount: u64,
}

/// Roll-up of all streams dated on or after the period start.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PeriodSummary {
    /// Period kind actually used
    pub period: PeriodKind,
    /// First day of the window
    pub start_date: NaiveDate,
    /// Selected streams, newest first
    pub streams: Vec<PeriodStreamStats>,
    /// Hourly records of all selected streams, concatenated in stream order
    pub hourly_records: Vec<HourlyRecord>,
    /// Event totals
    pub totals: PeriodTotals,
    /// Mean of the per-stream averages, streams without records count as 0
    pub overall_average_viewers: f64,
    /// Highest single hourly viewer count in the window
    pub overall_peak_viewers: u32,
    /// Number of selected streams
    pub stream_count: usize,
}

impl PeriodSummary {
    /// An empty roll-up for a window without streams.
    pub const fn empty(period: PeriodKind, start_date: NaiveDate) -> Self {
        Self {
            period,
            start_date,
            streams: Vec::new(),
            hourly_records: Vec::new(),
            totals: PeriodTotals {
                subscriptions: 0,
                donation_amount: 0.0,
                bits_amount: 0,
            },
            overall_average_viewers: 0.0,
            overall_peak_viewers: 0,
            stream_count: 0,
        }
    }
}
