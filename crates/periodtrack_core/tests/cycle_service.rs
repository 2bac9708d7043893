use chrono::{NaiveDate, TimeZone, Utc};
use periodtrack_core::db::open_db_in_memory;
use periodtrack_core::{
    AverageCycleLength, BlobEntryStore, BlobStore, CycleService, MemoryBlobStore, NewEntry,
    NormalizeIssue, Prediction, PredictionSource, ServiceError, SqliteBlobStore,
    ENTRY_STORE_KEY, parse_instant_str,
};
use serde_json::{json, Value};

fn stored_records(blobs: &impl BlobStore) -> Vec<Value> {
    let text = blobs.get(ENTRY_STORE_KEY).expect("read blob").expect("blob should exist");
    serde_json::from_str(&text).expect("stored blob should be JSON")
}

#[test]
fn delete_by_index_keeps_other_records_untouched() {
    let a = json!({"date": "2024-01-01T00:00:00.000Z", "lastPeriod": "2023-12-30T00:00:00.000Z", "cycleLength": "28", "selectedSymptoms": ["Cramps"], "notes": "a", "extra": 1});
    let b = json!({"date": "2024-01-29T00:00:00.000Z", "cycleLength": "30", "selectedSymptoms": [], "notes": "b"});
    let c = json!({"notes": "no date at all"});
    let blobs = MemoryBlobStore::with_blob(
        ENTRY_STORE_KEY,
        Value::Array(vec![a.clone(), b, c.clone()]).to_string(),
    );
    let service = CycleService::new(BlobEntryStore::new(&blobs));

    service.delete_entry(1).expect("delete stored entry");

    assert_eq!(stored_records(&blobs), vec![a, c]);
}

#[test]
fn delete_out_of_range_reports_not_found_and_keeps_data() {
    let blobs = MemoryBlobStore::with_blob(ENTRY_STORE_KEY, r#"[{"date":"2024-01-01"}]"#);
    let service = CycleService::new(BlobEntryStore::new(&blobs));

    match service.delete_entry(3).expect_err("index 3 is out of range") {
        ServiceError::EntryNotFound { index, len } => {
            assert_eq!(index, 3);
            assert_eq!(len, 1);
        }
        other => panic!("unexpected error: {other}"),
    }
    assert_eq!(stored_records(&blobs).len(), 1);
}

#[test]
fn log_entries_then_refresh_on_sqlite_store() {
    let conn = open_db_in_memory().expect("open in-memory db");
    let service = CycleService::new(BlobEntryStore::new(SqliteBlobStore::new(&conn)));

    for (day, month) in [(1, 1), (29, 1), (28, 2)] {
        let start = Utc.with_ymd_and_hms(2024, month, day, 0, 0, 0).single().expect("valid UTC instant");
        service
            .log_entry(
                NewEntry {
                    last_period_start: Some(start),
                    cycle_length_days: Some(28),
                    selected_symptoms: vec!["Fatigue".to_string()],
                    notes: String::new(),
                },
                start,
            )
            .expect("log entry");
    }

    let snapshot = service.refresh().expect("refresh insights");
    assert_eq!(snapshot.entries.len(), 3);
    assert!(snapshot.issues.is_empty());
    assert_eq!(
        snapshot.statistics.average_cycle_length,
        AverageCycleLength::Days(29)
    );
    // The latest entry carries the prediction made when it was logged.
    assert_eq!(
        snapshot.statistics.next_predicted,
        Prediction::Date {
            date: NaiveDate::from_ymd_opt(2024, 3, 27).expect("valid calendar date"),
            source: PredictionSource::StoredPrediction
        }
    );
}

#[test]
fn logged_entry_gets_next_stored_position() {
    let blobs = MemoryBlobStore::with_blob(ENTRY_STORE_KEY, r#"[{"date":"2024-01-01"},"junk"]"#);
    let service = CycleService::new(BlobEntryStore::new(&blobs));
    let logged_at = Utc.with_ymd_and_hms(2024, 2, 1, 12, 0, 0).single().expect("valid UTC instant");

    let entry = service
        .log_entry(
            NewEntry {
                notes: "second".to_string(),
                ..NewEntry::default()
            },
            logged_at,
        )
        .expect("log entry");

    assert_eq!(entry.source_index, 2);
    let records = stored_records(&blobs);
    assert_eq!(records[1], json!("junk"));
    assert_eq!(records[2]["notes"], "second");
    assert_eq!(records[2]["date"], "2024-02-01T12:00:00Z");
}

#[test]
fn history_is_most_recent_first() {
    let blobs = MemoryBlobStore::with_blob(
        ENTRY_STORE_KEY,
        r#"[{"date":"2024-01-01","notes":"old"},{"date":"2024-03-01","notes":"new"},{"date":"2024-02-01","notes":"mid"}]"#,
    );
    let service = CycleService::new(BlobEntryStore::new(&blobs));

    let notes: Vec<String> = service
        .history()
        .expect("load history")
        .into_iter()
        .map(|entry| entry.notes)
        .collect();
    assert_eq!(notes, vec!["new", "mid", "old"]);
}

#[test]
fn malformed_blob_degrades_to_empty_insights() {
    let blobs = MemoryBlobStore::with_blob(ENTRY_STORE_KEY, r#"{"date":"2024-01-01"}"#);
    let service = CycleService::new(BlobEntryStore::new(&blobs));

    let snapshot = service.refresh().expect("refresh insights");
    assert!(snapshot.entries.is_empty());
    assert_eq!(
        snapshot.statistics.average_cycle_length,
        AverageCycleLength::NotAvailable
    );
    assert_eq!(snapshot.statistics.next_predicted, Prediction::NoData);
    assert!(matches!(
        snapshot.issues.as_slice(),
        [NormalizeIssue::MalformedStoreData { .. }]
    ));
    assert!(snapshot.store_malformed());
}

#[test]
fn writes_over_malformed_blob_are_refused_and_keep_it_intact() {
    let original = r#"{"entries":[{"date":"2024-01-01","notes":"keep me"}]}"#;
    let blobs = MemoryBlobStore::with_blob(ENTRY_STORE_KEY, original);
    let service = CycleService::new(BlobEntryStore::new(&blobs));
    let logged_at = Utc
        .with_ymd_and_hms(2024, 2, 1, 0, 0, 0)
        .single()
        .expect("valid logging instant");

    let err = service
        .log_entry(NewEntry::default(), logged_at)
        .expect_err("log over malformed blob must fail");
    assert!(matches!(err, ServiceError::MalformedStore { .. }), "{err}");

    let err = service
        .delete_entry(0)
        .expect_err("delete over malformed blob must fail");
    assert!(matches!(err, ServiceError::MalformedStore { .. }), "{err}");

    assert_eq!(
        blobs.get(ENTRY_STORE_KEY).expect("read blob").as_deref(),
        Some(original)
    );
}

#[test]
fn period_start_picked_as_local_today_is_logged() {
    let blobs = MemoryBlobStore::new();
    let service = CycleService::new(BlobEntryStore::new(&blobs));
    // Evening UTC is already the next morning east of UTC.
    let logged_at = Utc
        .with_ymd_and_hms(2024, 5, 9, 22, 0, 0)
        .single()
        .expect("valid logging instant");

    let entry = service
        .log_entry(
            NewEntry {
                last_period_start: parse_instant_str("2024-05-10"),
                cycle_length_days: Some(28),
                ..NewEntry::default()
            },
            logged_at,
        )
        .expect("local today is a valid period start");

    assert_eq!(entry.source_index, 0);
    assert_eq!(
        entry.predicted_next_period,
        parse_instant_str("2024-06-07")
    );
    assert_eq!(stored_records(&blobs).len(), 1);
}

#[test]
fn invalid_new_entry_is_rejected_without_saving() {
    let blobs = MemoryBlobStore::new();
    let service = CycleService::new(BlobEntryStore::new(&blobs));
    let logged_at = Utc.with_ymd_and_hms(2024, 2, 1, 0, 0, 0).single().expect("valid UTC instant");

    let err = service
        .log_entry(
            NewEntry {
                cycle_length_days: Some(0),
                ..NewEntry::default()
            },
            logged_at,
        )
        .expect_err("zero-day cycle is invalid");

    assert!(matches!(err, ServiceError::InvalidEntry(_)), "{err}");
    assert_eq!(blobs.get(ENTRY_STORE_KEY).expect("read blob"), None);
}
