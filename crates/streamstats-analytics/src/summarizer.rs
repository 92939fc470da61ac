//! Single-stream summaries

use streamstats_common::{HourlyRecord, Result, Stream, StreamId, StreamSummary};
use streamstats_store::{EventTotals, RecordStore};
use tracing::{debug, instrument};

/// Viewer and follower figures folded from hourly records in insertion order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ViewerStats {
    /// Sum of viewer counts
    pub total: u64,
    /// Number of records folded
    pub count: usize,
    /// Highest viewer count, 0 when empty
    pub peak: u32,
    /// Followers of the first record
    pub first_followers: Option<u32>,
    /// Followers of the last record
    pub last_followers: Option<u32>,
}

impl ViewerStats {
    /// Fold records in the order given
    pub fn from_records<'a>(records: impl IntoIterator<Item = &'a HourlyRecord>) -> Self {
        records.into_iter().fold(Self::default(), |mut stats, record| {
            stats.total += u64::from(record.viewers);
            stats.count += 1;
            stats.peak = stats.peak.max(record.viewers);
            if stats.first_followers.is_none() {
                stats.first_followers = Some(record.followers);
            }
            stats.last_followers = Some(record.followers);
            stats
        })
    }

    /// `total / count`, or 0 without records
    #[allow(clippy::cast_precision_loss)]
    pub fn average(&self) -> f64 {
        if self.count == 0 {
            0.0
        } else {
            self.total as f64 / self.count as f64
        }
    }

    /// Average, `None` without records
    pub fn average_if_any(&self) -> Option<f64> {
        (self.count > 0).then(|| self.average())
    }

    /// Peak, `None` without records
    pub fn peak_if_any(&self) -> Option<u32> {
        (self.count > 0).then_some(self.peak)
    }

    /// Last minus first follower count, 0 without records
    pub fn followers_gained(&self) -> i64 {
        match (self.first_followers, self.last_followers) {
            (Some(first), Some(last)) => i64::from(last) - i64::from(first),
            _ => 0,
        }
    }
}

/// Build a summary from already fetched data
pub fn summarize_records(
    stream: Stream,
    records: &[HourlyRecord],
    events: EventTotals,
) -> StreamSummary {
    let stats = ViewerStats::from_records(records);

    StreamSummary {
        stream,
        total_viewers: stats.total,
        average_viewers: stats.average(),
        peak_viewers: stats.peak,
        total_subscriptions: events.subscriptions,
        total_donation_amount: events.donation_amount,
        total_bits_amount: events.bits_amount,
        hourly_data_points: stats.count,
        first_stat_followers: stats.first_followers.unwrap_or(0),
        last_stat_followers: stats.last_followers.unwrap_or(0),
        followers_gained_approx: stats.followers_gained(),
    }
}

/// Computes [`StreamSummary`] values from a record store
#[derive(Debug)]
pub struct StreamSummarizer<'a, S: ?Sized> {
    store: &'a S,
}

impl<'a, S> StreamSummarizer<'a, S>
where
    S: RecordStore + ?Sized,
{
    /// Summarizer reading from `store`
    pub const fn new(store: &'a S) -> Self {
        Self { store }
    }

    /// Summarize one stream. Fails only with `NotFound` or a store error;
    /// a stream without records yields a zero-valued summary.
    #[instrument(skip(self))]
    pub fn summarize(&self, stream_id: StreamId) -> Result<StreamSummary> {
        let snapshot = self.store.stream_snapshot(stream_id)?;
        let summary = summarize_records(snapshot.stream, &snapshot.records, snapshot.events);

        debug!(
            records = summary.hourly_data_points,
            average_viewers = summary.average_viewers,
            peak_viewers = summary.peak_viewers,
            "Summarized stream"
        );
        Ok(summary)
    }
}

/// Summarize one stream from `store`
pub fn summarize_stream<S>(store: &S, stream_id: StreamId) -> Result<StreamSummary>
where
    S: RecordStore + ?Sized,
{
    StreamSummarizer::new(store).summarize(stream_id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use streamstats_common::test_utils::{assert_approx_eq, date, fixtures};

    #[test]
    fn test_empty_records_give_zero_summary() {
        let stream = fixtures::stream(1, date(2024, 4, 1));
        let summary = summarize_records(stream.clone(), &[], EventTotals::default());

        assert_eq!(summary, StreamSummary::empty(stream));
    }

    #[test]
    fn test_summary_figures() {
        let stream = fixtures::stream(1, date(2024, 4, 1));
        let records = fixtures::hourly_records(1, &[(100, 1000), (250, 1010), (150, 1030)]);
        let events = EventTotals {
            subscriptions: 4,
            donation_amount: 12.5,
            bits_amount: 900,
        };

        let summary = summarize_records(stream, &records, events);
        assert_eq!(summary.total_viewers, 500);
        assert_approx_eq(summary.average_viewers, 500.0 / 3.0, 1e-9);
        assert_eq!(summary.peak_viewers, 250);
        assert_eq!(summary.hourly_data_points, 3);
        assert_eq!(summary.first_stat_followers, 1000);
        assert_eq!(summary.last_stat_followers, 1030);
        assert_eq!(summary.followers_gained_approx, 30);
        assert_eq!(summary.total_subscriptions, 4);
        assert_eq!(summary.total_bits_amount, 900);
    }

    #[test]
    fn test_followers_use_insertion_order_not_labels() {
        let stream = fixtures::stream(1, date(2024, 4, 1));
        let mut records = fixtures::hourly_records(1, &[(10, 500), (10, 480)]);
        records[0].hour = "23:00".to_string();
        records[1].hour = "01:00".to_string();

        let summary = summarize_records(stream, &records, EventTotals::default());
        assert_eq!(summary.followers_gained_approx, -20);
    }

    #[test]
    fn test_single_record() {
        let stats = ViewerStats::from_records(&fixtures::hourly_records(1, &[(42, 7)]));
        assert_eq!(stats.average_if_any(), Some(42.0));
        assert_eq!(stats.peak_if_any(), Some(42));
        assert_eq!(stats.followers_gained(), 0);
        assert_eq!(ViewerStats::default().average_if_any(), None);
    }

    proptest! {
        #[test]
        fn prop_average_is_sum_over_count(
            values in streamstats_common::test_utils::property_testing::hourly_values_strategy()
        ) {
            let records = fixtures::hourly_records(1, &values);
            let summary = summarize_records(
                fixtures::stream(1, date(2024, 1, 1)),
                &records,
                EventTotals::default(),
            );

            let sum: u64 = values.iter().map(|(v, _)| u64::from(*v)).sum();
            prop_assert_eq!(summary.total_viewers, sum);
            if values.is_empty() {
                prop_assert_eq!(summary.average_viewers, 0.0);
                prop_assert_eq!(summary.followers_gained_approx, 0);
            } else {
                prop_assert!((summary.average_viewers - sum as f64 / values.len() as f64).abs() < 1e-9);
                let first = i64::from(values[0].1);
                let last = i64::from(values[values.len() - 1].1);
                prop_assert_eq!(summary.followers_gained_approx, last - first);
                prop_assert_eq!(summary.peak_viewers, values.iter().map(|(v, _)| *v).max().unwrap());
            }
        }
    }
}
