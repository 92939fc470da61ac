//! Integration tests for streamstats-store.

use std::sync::Arc;
use std::thread;

use streamstats_common::Event;
use streamstats_store::{
    submit_hourly, submit_stream, HourlySubmission, MemoryStore, NewHourlyRecord, RecordIngest,
    RecordStore, StreamSubmission,
};

#[test]
fn test_readers_never_observe_partial_records() {
    let store = Arc::new(MemoryStore::new());
    let stream = submit_stream(
        store.as_ref(),
        &StreamSubmission {
            date: "2024-03-04".to_string(),
            title: Some("Marathon".to_string()),
            streamer: None,
        },
        "host",
    )
    .unwrap();
    let stream_id = stream.id;

    let writer = {
        let store = Arc::clone(&store);
        thread::spawn(move || {
            for i in 0..200u32 {
                let events = (0..3)
                    .map(|n| Event::Subscription {
                        username: format!("user{i}_{n}"),
                    })
                    .collect();
                store
                    .insert_hourly_record(
                        stream_id,
                        NewHourlyRecord {
                            hour: format!("h{i}"),
                            viewers: i,
                            followers: i,
                            events,
                        },
                    )
                    .unwrap();
            }
        })
    };

    let reader = {
        let store = Arc::clone(&store);
        thread::spawn(move || {
            for _ in 0..200 {
                let snapshot = store.stream_snapshot(stream_id).unwrap();
                assert_eq!(
                    snapshot.events.subscriptions,
                    3 * snapshot.records.len() as u64
                );
            }
        })
    };

    writer.join().unwrap();
    reader.join().unwrap();
    assert_eq!(store.hourly_records(stream_id).unwrap().len(), 200);
}

#[test]
fn test_dataset_style_submission_round() {
    let store = MemoryStore::new();
    let stream = submit_stream(
        &store,
        &StreamSubmission {
            date: "2024-03-04".to_string(),
            title: None,
            streamer: Some("  guest  ".to_string()),
        },
        "host",
    )
    .unwrap();
    assert_eq!(stream.streamer, "guest");

    let submission: HourlySubmission = serde_json::from_value(serde_json::json!({
        "hour": "20:00",
        "viewers": 150,
        "followers": 3000,
        "subscriptions": ["a", "b"],
        "bits": [{"username": "c", "amount": 500}]
    }))
    .unwrap();

    let (record, events) = submit_hourly(&store, stream.id, &submission).unwrap();
    assert_eq!(record.viewers, 150);
    assert_eq!(events.len(), 3);
    assert_eq!(store.events_for_record(record.id).unwrap(), events);
}
