//! # streamstats store
//!
//! The record store contract the analytics core reads from
//! ([`RecordStore`]), its write side ([`RecordIngest`]), a thread-safe
//! in-memory implementation, and validation of raw ingestion input.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![allow(clippy::module_name_repetitions)]

pub mod ingest;
pub mod memory;
pub mod repository;

pub use ingest::{
    submit_hourly, submit_stream, AmountSubmission, HourlySubmission, StreamSubmission,
};
pub use memory::{MemoryStore, StoreCounts};
pub use repository::{
    EventScope, EventTotals, NewHourlyRecord, NewStream, RecordIngest, RecordStore,
    StreamSnapshot,
};
