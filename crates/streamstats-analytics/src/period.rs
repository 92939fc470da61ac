//! Period roll-ups over day, week, month and year windows

use chrono::{Datelike, Days, Local, NaiveDate};
use streamstats_common::{PeriodKind, PeriodStreamStats, PeriodSummary, Result, StatsError};
use streamstats_store::RecordStore;
use tracing::{debug, info, instrument, warn};

use crate::summarizer::ViewerStats;

/// First day of the window of `kind` containing `today`.
///
/// Weeks start on Monday.
pub fn period_start(kind: PeriodKind, today: NaiveDate) -> NaiveDate {
    match kind {
        PeriodKind::Day => today,
        PeriodKind::Week => today
            .checked_sub_days(Days::new(u64::from(today.weekday().num_days_from_monday())))
            .unwrap_or(today),
        PeriodKind::Month => today.with_day(1).unwrap_or(today),
        PeriodKind::Year => today.with_ordinal(1).unwrap_or(today),
    }
}

/// Builds [`PeriodSummary`] values from a record store
#[derive(Debug)]
pub struct PeriodAggregator<'a, S: ?Sized> {
    store: &'a S,
}

impl<'a, S> PeriodAggregator<'a, S>
where
    S: RecordStore + ?Sized,
{
    /// Aggregator reading from `store`
    pub const fn new(store: &'a S) -> Self {
        Self { store }
    }

    /// Roll up every stream dated on or after the start of the window
    /// containing `today`. An empty window is a valid, zero-valued result.
    #[instrument(skip(self))]
    pub fn summarize_at(&self, kind: PeriodKind, today: NaiveDate) -> Result<PeriodSummary> {
        let start_date = period_start(kind, today);
        let streams = self.store.streams_since(start_date)?;

        let mut summary = PeriodSummary::empty(kind, start_date);
        let mut average_sum = 0.0;

        for stream in streams {
            // A stream deleted after selection is no longer part of the window
            let snapshot = match self.store.stream_snapshot(stream.id) {
                Ok(snapshot) => snapshot,
                Err(StatsError::NotFound { .. }) => {
                    debug!(stream_id = %stream.id, "Stream vanished during aggregation");
                    continue;
                }
                Err(e) => return Err(e),
            };

            let stats = ViewerStats::from_records(&snapshot.records);
            average_sum += stats.average();
            summary.overall_peak_viewers = summary.overall_peak_viewers.max(stats.peak);

            summary.totals.subscriptions += snapshot.events.subscriptions;
            summary.totals.donation_amount += snapshot.events.donation_amount;
            summary.totals.bits_amount += snapshot.events.bits_amount;

            debug!(
                stream_id = %snapshot.stream.id,
                records = stats.count,
                average_viewers = stats.average(),
                "Folded stream into period"
            );

            summary.streams.push(PeriodStreamStats {
                stream: snapshot.stream,
                average_viewers: stats.average_if_any(),
                peak_viewers: stats.peak_if_any(),
                subscriptions: snapshot.events.subscriptions,
                donation_amount: snapshot.events.donation_amount,
                bits_amount: snapshot.events.bits_amount,
                hourly_data_points: stats.count,
            });
            summary.hourly_records.extend(snapshot.records);
        }

        summary.stream_count = summary.streams.len();
        summary.overall_average_viewers = mean_of_means(average_sum, summary.stream_count);

        info!(
            period = %kind,
            start_date = %start_date,
            streams = summary.stream_count,
            hourly_records = summary.hourly_records.len(),
            "Aggregated period"
        );
        Ok(summary)
    }

    /// Like [`summarize_at`](Self::summarize_at) with a period name;
    /// unrecognized names fall back to `day`
    pub fn summarize_named_at(&self, name: &str, today: NaiveDate) -> Result<PeriodSummary> {
        let kind = PeriodKind::try_parse(name).unwrap_or_else(|| {
            warn!(period = name, "Unknown period, using day");
            PeriodKind::Day
        });
        self.summarize_at(kind, today)
    }

    /// Roll up the window containing the local calendar date
    pub fn summarize(&self, kind: PeriodKind) -> Result<PeriodSummary> {
        self.summarize_at(kind, Local::now().date_naive())
    }
}

#[allow(clippy::cast_precision_loss)]
fn mean_of_means(sum: f64, count: usize) -> f64 {
    if count == 0 {
        0.0
    } else {
        sum / count as f64
    }
}

/// Roll up the window of `kind` containing the local calendar date
pub fn summarize_period<S>(store: &S, kind: PeriodKind) -> Result<PeriodSummary>
where
    S: RecordStore + ?Sized,
{
    PeriodAggregator::new(store).summarize(kind)
}

/// Roll up the window of `kind` containing `today`
pub fn summarize_period_at<S>(store: &S, kind: PeriodKind, today: NaiveDate) -> Result<PeriodSummary>
where
    S: RecordStore + ?Sized,
{
    PeriodAggregator::new(store).summarize_at(kind, today)
}
