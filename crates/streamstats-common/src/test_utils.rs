//! Test utilities and shared fixtures for the streamstats workspace.
//!
//! Enabled for the crate's own tests and for other crates through the
//! `testing` feature.

use chrono::NaiveDate;
use std::sync::Once;
use tracing_subscriber::{fmt, EnvFilter};

use crate::{HourlyRecord, HourlyRecordId, Stream, StreamId};

static INIT: Once = Once::new();

/// Initialize logging for tests. Safe to call from every test.
pub fn init_test_logging() {
    INIT.call_once(|| {
        let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug"));
        let _ = fmt().with_test_writer().with_env_filter(filter).try_init();
    });
}

/// Assert that two floating point numbers are approximately equal within a tolerance.
pub fn assert_approx_eq(left: f64, right: f64, tolerance: f64) {
    let diff = (left - right).abs();
    assert!(
        diff <= tolerance,
        "assertion failed: `{left}` is not approximately equal to `{right}` (tolerance: {tolerance}, diff: {diff})"
    );
}

/// Build a calendar date, panicking on an invalid one.
pub fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).expect("valid test date")
}

/// Ready-made domain values.
pub mod fixtures {
    use super::*;

    /// A titled stream with the given id and date.
    pub fn stream(id: u64, date: NaiveDate) -> Stream {
        Stream {
            id: StreamId(id),
            date,
            title: Some(format!("Stream {id}")),
            streamer: "tester".to_string(),
        }
    }

    /// Hourly records for `stream_id`, one per `(viewers, followers)` pair,
    /// labelled `10:00`, `11:00`, ...
    pub fn hourly_records(stream_id: u64, values: &[(u32, u32)]) -> Vec<HourlyRecord> {
        values
            .iter()
            .enumerate()
            .map(|(i, &(viewers, followers))| HourlyRecord {
                id: HourlyRecordId(stream_id * 1000 + i as u64),
                stream_id: StreamId(stream_id),
                hour: format!("{}:00", 10 + i),
                viewers,
                followers,
            })
            .collect()
    }
}

/// Property-based testing strategies.
pub mod property_testing {
    use proptest::prelude::*;

    /// Arbitrary `(viewers, followers)` pairs for one stream.
    pub fn hourly_values_strategy() -> impl Strategy<Value = Vec<(u32, u32)>> {
        prop::collection::vec((0u32..100_000, 0u32..1_000_000), 0..48)
    }

    /// Opaque hour labels, deliberately not chronological.
    pub fn hour_label_strategy() -> impl Strategy<Value = String> {
        r"[0-9]{1,2}:[0-9]{2}|[a-z ]{1,12}".prop_map(|s| s.to_string())
    }
}
