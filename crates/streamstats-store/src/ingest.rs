//! Validation and submission of raw ingestion input.
//!
//! Submissions carry the text a form or dataset file supplied. Every field is
//! checked before anything is written, and all failures are reported together
//! as one `InvalidInput` error.

use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize};
use streamstats_common::{
    Event, EventRecord, FieldError, HourlyRecord, Result, StatsError, Stream, StreamId,
};
use tracing::{instrument, warn};

use crate::repository::{NewHourlyRecord, NewStream, RecordIngest};

/// Accept YAML/JSON scalars of any type as raw text
fn raw_text<'de, D>(deserializer: D) -> std::result::Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Text(String),
        Int(i64),
        Float(f64),
        Bool(bool),
    }

    Ok(match Raw::deserialize(deserializer)? {
        Raw::Text(s) => s,
        Raw::Int(i) => i.to_string(),
        Raw::Float(f) => f.to_string(),
        Raw::Bool(b) => b.to_string(),
    })
}

/// Raw new-stream input
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StreamSubmission {
    /// Date as `YYYY-MM-DD`
    #[serde(deserialize_with = "raw_text")]
    pub date: String,
    /// Optional title, blank means none
    #[serde(default)]
    pub title: Option<String>,
    /// Optional streamer, blank means the configured default
    #[serde(default)]
    pub streamer: Option<String>,
}

impl StreamSubmission {
    /// Check every field and produce a storable stream
    pub fn validate(&self, default_streamer: &str) -> Result<NewStream> {
        let date = NaiveDate::parse_from_str(self.date.trim(), "%Y-%m-%d").map_err(|_| {
            StatsError::invalid_field("date", "must be a date in YYYY-MM-DD format")
        })?;

        let title = self
            .title
            .as_deref()
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .map(str::to_string);

        let streamer = self
            .streamer
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .unwrap_or(default_streamer)
            .to_string();

        Ok(NewStream {
            date,
            title,
            streamer,
        })
    }
}

/// Raw donation input
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AmountSubmission {
    /// Donor name
    pub username: String,
    /// Amount as text
    #[serde(deserialize_with = "raw_text")]
    pub amount: String,
}

/// Raw hourly-record input with its events
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HourlySubmission {
    /// Free-form hour label
    pub hour: String,
    /// Viewer count as text
    #[serde(deserialize_with = "raw_text")]
    pub viewers: String,
    /// Follower count as text
    #[serde(deserialize_with = "raw_text")]
    pub followers: String,
    /// Subscriber names
    #[serde(default)]
    pub subscriptions: Vec<String>,
    /// Currency donations
    #[serde(default)]
    pub donations: Vec<AmountSubmission>,
    /// Bits cheers
    #[serde(default)]
    pub bits: Vec<AmountSubmission>,
}

fn parse_count(field: &str, raw: &str, errors: &mut Vec<FieldError>) -> Option<u32> {
    match raw.trim().parse::<u32>() {
        Ok(value) => Some(value),
        Err(_) => {
            errors.push(FieldError::new(field, "must be a non-negative integer"));
            None
        }
    }
}

fn check_username(field: String, username: &str, errors: &mut Vec<FieldError>) -> Option<String> {
    let trimmed = username.trim();
    if trimmed.is_empty() {
        errors.push(FieldError::new(field, "cannot be empty"));
        None
    } else {
        Some(trimmed.to_string())
    }
}

impl HourlySubmission {
    /// Check every field and produce a storable record with its events
    pub fn validate(&self) -> Result<NewHourlyRecord> {
        let mut errors = Vec::new();

        let hour = self.hour.trim();
        if hour.is_empty() {
            errors.push(FieldError::new("hour", "cannot be empty"));
        }
        let viewers = parse_count("viewers", &self.viewers, &mut errors);
        let followers = parse_count("followers", &self.followers, &mut errors);

        let mut events = Vec::new();

        for (i, username) in self.subscriptions.iter().enumerate() {
            if let Some(username) = check_username(format!("subscriptions[{i}]"), username, &mut errors)
            {
                events.push(Event::Subscription { username });
            }
        }

        for (i, donation) in self.donations.iter().enumerate() {
            let username =
                check_username(format!("donations[{i}].username"), &donation.username, &mut errors);
            let amount = match donation.amount.trim().parse::<f64>() {
                Ok(amount) if amount.is_finite() && amount >= 0.0 => Some(amount),
                _ => {
                    errors.push(FieldError::new(
                        format!("donations[{i}].amount"),
                        "must be a non-negative decimal amount",
                    ));
                    None
                }
            };
            if let (Some(username), Some(amount)) = (username, amount) {
                events.push(Event::Donation { username, amount });
            }
        }

        for (i, cheer) in self.bits.iter().enumerate() {
            let username =
                check_username(format!("bits[{i}].username"), &cheer.username, &mut errors);
            let amount = match cheer.amount.trim().parse::<u64>() {
                Ok(amount) => Some(amount),
                Err(_) => {
                    errors.push(FieldError::new(
                        format!("bits[{i}].amount"),
                        "must be a non-negative integer",
                    ));
                    None
                }
            };
            if let (Some(username), Some(amount)) = (username, amount) {
                events.push(Event::BitsDonation { username, amount });
            }
        }

        match (viewers, followers) {
            (Some(viewers), Some(followers)) if errors.is_empty() => Ok(NewHourlyRecord {
                hour: hour.to_string(),
                viewers,
                followers,
                events,
            }),
            _ => Err(StatsError::invalid_input(errors)),
        }
    }
}

/// Validate and store a new stream
#[instrument(skip(store, submission), fields(date = %submission.date))]
pub fn submit_stream<S>(
    store: &S,
    submission: &StreamSubmission,
    default_streamer: &str,
) -> Result<Stream>
where
    S: RecordIngest + ?Sized,
{
    let new = submission
        .validate(default_streamer)
        .inspect_err(|e| warn!(error = %e, "Rejected stream submission"))?;
    store.create_stream(new)
}

/// Validate and store an hourly record with its events as one unit
#[instrument(skip(store, submission), fields(hour = %submission.hour))]
pub fn submit_hourly<S>(
    store: &S,
    stream_id: StreamId,
    submission: &HourlySubmission,
) -> Result<(HourlyRecord, Vec<EventRecord>)>
where
    S: RecordIngest + ?Sized,
{
    let new = submission
        .validate()
        .inspect_err(|e| warn!(error = %e, "Rejected hourly submission"))?;
    store.insert_hourly_record(stream_id, new)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::MemoryStore;
    use crate::RecordStore;

    fn hourly(viewers: &str, followers: &str) -> HourlySubmission {
        HourlySubmission {
            hour: "10:00".to_string(),
            viewers: viewers.to_string(),
            followers: followers.to_string(),
            ..HourlySubmission::default()
        }
    }

    #[test]
    fn test_stream_submission_defaults() {
        let submission = StreamSubmission {
            date: " 2024-06-01 ".to_string(),
            title: Some("   ".to_string()),
            streamer: None,
        };
        let new = submission.validate("fallback").unwrap();
        assert_eq!(new.date, NaiveDate::from_ymd_opt(2024, 6, 1).unwrap());
        assert_eq!(new.title, None);
        assert_eq!(new.streamer, "fallback");
    }

    #[test]
    fn test_stream_submission_bad_date() {
        let submission = StreamSubmission {
            date: "06/01/2024".to_string(),
            ..StreamSubmission::default()
        };
        let err = submission.validate("fallback").unwrap_err();
        assert_eq!(err.field_errors()[0].field, "date");
    }

    #[test]
    fn test_hourly_submission_valid() {
        let mut submission = hourly("120", "1500");
        submission.subscriptions = vec!["alice".to_string()];
        submission.donations = vec![AmountSubmission {
            username: "bob".to_string(),
            amount: "5.25".to_string(),
        }];
        submission.bits = vec![AmountSubmission {
            username: "carol".to_string(),
            amount: "100".to_string(),
        }];

        let new = submission.validate().unwrap();
        assert_eq!(new.viewers, 120);
        assert_eq!(new.followers, 1500);
        assert_eq!(new.events.len(), 3);
        assert_eq!(
            new.events[1],
            Event::Donation {
                username: "bob".to_string(),
                amount: 5.25
            }
        );
    }

    #[test]
    fn test_hourly_submission_reports_every_field() {
        let mut submission = hourly("-5", "many");
        submission.hour = " ".to_string();
        submission.donations = vec![AmountSubmission {
            username: String::new(),
            amount: "-1".to_string(),
        }];
        submission.bits = vec![AmountSubmission {
            username: "x".to_string(),
            amount: "1.5".to_string(),
        }];

        let err = submission.validate().unwrap_err();
        let fields: Vec<&str> = err.field_errors().iter().map(|e| e.field.as_str()).collect();
        assert_eq!(
            fields,
            vec![
                "hour",
                "viewers",
                "followers",
                "donations[0].username",
                "donations[0].amount",
                "bits[0].amount"
            ]
        );
    }

    #[test]
    fn test_submission_from_json_numbers() {
        let submission: HourlySubmission = serde_json::from_str(
            r#"{"hour":"21:00","viewers":42,"followers":"7","donations":[{"username":"d","amount":2.5}]}"#,
        )
        .unwrap();
        assert_eq!(submission.viewers, "42");
        assert_eq!(submission.donations[0].amount, "2.5");
        assert!(submission.validate().is_ok());
    }

    #[test]
    fn test_rejected_submission_writes_nothing() {
        let store = MemoryStore::new();
        let stream = submit_stream(
            &store,
            &StreamSubmission {
                date: "2024-06-01".to_string(),
                ..StreamSubmission::default()
            },
            "host",
        )
        .unwrap();

        let mut bad = hourly("10", "10");
        bad.subscriptions = vec!["fine".to_string(), " ".to_string()];
        assert!(submit_hourly(&store, stream.id, &bad).is_err());
        assert!(store.hourly_records(stream.id).unwrap().is_empty());

        let (record, events) = submit_hourly(&store, stream.id, &hourly("10", "10")).unwrap();
        assert_eq!(record.stream_id, stream.id);
        assert!(events.is_empty());
    }
}
