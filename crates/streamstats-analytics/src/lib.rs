//! # streamstats analytics
//!
//! Turns stored streams into summaries: [`StreamSummarizer`] for one stream
//! and [`PeriodAggregator`] for every stream of a day, week, month or year.
//! Both only read from a [`streamstats_store::RecordStore`].

#![warn(missing_docs)]
#![warn(clippy::all)]
#![allow(clippy::module_name_repetitions)]

pub mod period;
pub mod summarizer;

pub use period::{period_start, summarize_period, summarize_period_at, PeriodAggregator};
pub use summarizer::{summarize_records, summarize_stream, StreamSummarizer, ViewerStats};
