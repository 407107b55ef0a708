use std::collections::HashSet;
use std::io;
use std::sync::Arc;
use parking_lot::Mutex;
use serde_json::json;
use place_importer::core::error::{Error, ErrorKind, Result};
use place_importer::core::types::{Centroid, PlaceDoc, PlaceId};
use place_importer::index::client::IndexClient;
use place_importer::index::operation::{BulkAction, BulkItemResult, BulkOperation, BulkResponse};
use place_importer::mapper::field_mapper::{FieldMapper, Payload, PlaceFieldMapper};
use place_importer::writer::updater::{BulkUpdater, UpsertOutcome};

/// Index client that records every bulk request it receives
#[derive(Default)]
struct RecordingClient {
    existing: HashSet<PlaceId>,
    unreachable: HashSet<PlaceId>,
    rejected: HashSet<PlaceId>,
    extra_failures: usize,
    submitted: Mutex<Vec<Vec<BulkOperation>>>,
}

impl RecordingClient {
    fn with_existing(ids: &[u64]) -> Self {
        RecordingClient {
            existing: ids.iter().copied().map(PlaceId).collect(),
            ..RecordingClient::default()
        }
    }

    fn requests(&self) -> Vec<Vec<BulkOperation>> {
        self.submitted.lock().clone()
    }
}

impl IndexClient for RecordingClient {
    fn exists(&self, id: PlaceId) -> Result<bool> {
        if self.unreachable.contains(&id) {
            return Err(Error::unavailable("connection refused"));
        }
        Ok(self.existing.contains(&id))
    }

    fn bulk(&self, operations: Vec<BulkOperation>) -> Result<BulkResponse> {
        let mut items: Vec<BulkItemResult> = operations
            .iter()
            .map(|op| {
                if self.rejected.contains(&op.id()) {
                    BulkItemResult::failed(op.id(), op.action(), "mapper_parsing_exception")
                } else {
                    BulkItemResult::ok(op.id(), op.action())
                }
            })
            .collect();
        for _ in 0..self.extra_failures {
            items.push(BulkItemResult::failed(PlaceId(0), BulkAction::Create, "unknown item"));
        }
        self.submitted.lock().push(operations);
        Ok(BulkResponse::new(items))
    }
}

/// Maps a place to `{ "name": <default name> }`, failing for unnamed places
struct NameMapper;

impl FieldMapper for NameMapper {
    fn to_payload(&self, doc: &PlaceDoc) -> Result<Payload> {
        let name = doc
            .default_name()
            .ok_or_else(|| Error::conversion(format!("place {} has no name", doc.place_id)))?;
        let mut payload = Payload::new();
        payload.insert("name".to_string(), json!(name));
        Ok(payload)
    }
}

/// In-memory sink for formatted log output
#[derive(Clone, Default)]
struct CapturedLogs(Arc<Mutex<Vec<u8>>>);

impl CapturedLogs {
    fn contents(&self) -> String {
        String::from_utf8_lossy(&self.0.lock()).into_owned()
    }
}

impl io::Write for CapturedLogs {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

fn with_captured_logs<T>(f: impl FnOnce() -> T) -> (T, String) {
    let logs = CapturedLogs::default();
    let writer = logs.clone();
    let subscriber = tracing_subscriber::fmt()
        .with_writer(move || writer.clone())
        .with_ansi(false)
        .finish();
    let result = tracing::subscriber::with_default(subscriber, f);
    (result, logs.contents())
}

fn place(id: u64) -> PlaceDoc {
    PlaceDoc::new(PlaceId(id), "amenity", "cafe", Centroid::new(2.35, 48.85))
}

fn named(id: u64, name: &str) -> PlaceDoc {
    place(id).with_name("default", name)
}

fn payload(name: &str) -> Payload {
    let mut payload = Payload::new();
    payload.insert("name".to_string(), json!(name));
    payload
}

#[test]
fn absent_place_stages_exactly_one_create() {
    let client = RecordingClient::default();
    let mut updater = BulkUpdater::with_mapper(&client, NameMapper);

    assert_eq!(updater.upsert(&named(1, "A")).unwrap(), UpsertOutcome::Created);
    assert_eq!(
        updater.pending(),
        &[BulkOperation::Create { id: PlaceId(1), payload: payload("A") }]
    );
}

#[test]
fn present_place_stages_exactly_one_update() {
    let client = RecordingClient::with_existing(&[2]);
    let mut updater = BulkUpdater::with_mapper(&client, NameMapper);

    assert_eq!(updater.upsert(&named(2, "B")).unwrap(), UpsertOutcome::Updated);
    assert_eq!(
        updater.pending(),
        &[BulkOperation::Update { id: PlaceId(2), payload: payload("B") }]
    );
}

#[test]
fn delete_stages_regardless_of_existence() {
    let client = RecordingClient {
        unreachable: [PlaceId(4)].into_iter().collect(),
        ..RecordingClient::with_existing(&[3])
    };
    let mut updater = BulkUpdater::with_mapper(&client, NameMapper);

    updater.delete(PlaceId(3));
    updater.delete(PlaceId(4));
    updater.delete(PlaceId(5));

    assert_eq!(
        updater.pending(),
        &[
            BulkOperation::Delete { id: PlaceId(3) },
            BulkOperation::Delete { id: PlaceId(4) },
            BulkOperation::Delete { id: PlaceId(5) },
        ]
    );
}

#[test]
fn flush_submits_in_staging_order_and_empties_batch() {
    let client = RecordingClient::with_existing(&[2]);
    let mut updater = BulkUpdater::with_mapper(&client, NameMapper);

    updater.upsert(&named(1, "A")).unwrap();
    updater.upsert(&named(2, "B")).unwrap();
    updater.delete(PlaceId(3));

    let report = updater.flush().unwrap();

    assert_eq!(report.submitted, 3);
    assert_eq!(updater.len(), 0);
    assert_eq!(
        client.requests(),
        vec![vec![
            BulkOperation::Create { id: PlaceId(1), payload: payload("A") },
            BulkOperation::Update { id: PlaceId(2), payload: payload("B") },
            BulkOperation::Delete { id: PlaceId(3) },
        ]]
    );
}

#[test]
fn operations_after_flush_go_to_the_next_request() {
    let client = RecordingClient::default();
    let mut updater = BulkUpdater::with_mapper(&client, NameMapper);

    updater.upsert(&named(1, "A")).unwrap();
    updater.flush().unwrap();
    updater.delete(PlaceId(1));
    updater.upsert(&named(2, "B")).unwrap();
    updater.flush().unwrap();

    let requests = client.requests();
    assert_eq!(requests.len(), 2);
    assert_eq!(requests[0].len(), 1);
    assert_eq!(requests[0][0].id(), PlaceId(1));
    assert_eq!(
        requests[1],
        vec![
            BulkOperation::Delete { id: PlaceId(1) },
            BulkOperation::Create { id: PlaceId(2), payload: payload("B") },
        ]
    );
}

#[test]
fn batch_is_cleared_when_items_are_rejected() {
    let client = RecordingClient {
        rejected: [PlaceId(7)].into_iter().collect(),
        ..RecordingClient::default()
    };
    let mut updater = BulkUpdater::with_mapper(&client, NameMapper);

    updater.upsert(&named(6, "F")).unwrap();
    updater.upsert(&named(7, "G")).unwrap();
    let report = updater.flush().unwrap();

    assert_eq!(report.submitted, 2);
    assert_eq!(report.failed, 1);
    assert!(updater.is_empty());

    // the rejected create is not carried over
    updater.delete(PlaceId(8));
    updater.flush().unwrap();
    assert_eq!(client.requests()[1], vec![BulkOperation::Delete { id: PlaceId(8) }]);
}

#[test]
fn failed_existence_check_is_fatal_and_stages_nothing() {
    let client = RecordingClient {
        unreachable: [PlaceId(5)].into_iter().collect(),
        ..RecordingClient::default()
    };
    let mut updater = BulkUpdater::with_mapper(&client, NameMapper);

    let err = updater.upsert(&named(5, "E")).unwrap_err();

    assert_eq!(err.kind, ErrorKind::Unavailable);
    assert!(err.context.contains("place 5"));
    assert!(updater.is_empty());
    assert_eq!(updater.stats().staged(), 0);
}

#[test]
fn conversion_failure_skips_only_that_place() {
    let client = RecordingClient::default();
    let mut updater = BulkUpdater::with_mapper(&client, NameMapper);

    assert_eq!(updater.upsert(&named(1, "A")).unwrap(), UpsertOutcome::Created);
    assert_eq!(updater.upsert(&place(2)).unwrap(), UpsertOutcome::Skipped);
    assert_eq!(updater.upsert(&named(3, "C")).unwrap(), UpsertOutcome::Created);

    let ids: Vec<PlaceId> = updater.pending().iter().map(BulkOperation::id).collect();
    assert_eq!(ids, vec![PlaceId(1), PlaceId(3)]);
    assert_eq!(updater.stats().skipped, 1);
}

#[test]
fn default_mapper_skips_places_with_bad_coordinates() {
    let client = RecordingClient::default();
    let mut updater = BulkUpdater::new(&client);

    let broken = PlaceDoc::new(PlaceId(11), "place", "hamlet", Centroid::new(0.0, 95.0));
    assert_eq!(updater.upsert(&broken).unwrap(), UpsertOutcome::Skipped);
    assert_eq!(updater.upsert(&named(12, "L")).unwrap(), UpsertOutcome::Created);

    let expected = PlaceFieldMapper::new().to_payload(&named(12, "L")).unwrap();
    assert_eq!(
        updater.pending(),
        &[BulkOperation::Create { id: PlaceId(12), payload: expected }]
    );
}

#[test]
fn conversion_failure_is_logged_with_place_and_reason() {
    let client = RecordingClient::default();
    let mut updater = BulkUpdater::with_mapper(&client, NameMapper);

    let (outcome, logs) = with_captured_logs(|| updater.upsert(&place(2)).unwrap());

    assert_eq!(outcome, UpsertOutcome::Skipped);
    assert!(logs.contains("ERROR"));
    assert!(logs.contains("creation of doc [place 2"));
    assert!(logs.contains("place 2 has no name"));
}

#[test]
fn failed_mapping_of_existing_place_skips_the_update() {
    let client = RecordingClient::with_existing(&[4]);
    let mut updater = BulkUpdater::with_mapper(&client, NameMapper);

    let (outcome, logs) = with_captured_logs(|| updater.upsert(&place(4)).unwrap());

    assert_eq!(outcome, UpsertOutcome::Skipped);
    assert!(updater.is_empty());
    assert_eq!(updater.stats().skipped, 1);
    assert_eq!(updater.stats().updated, 0);
    assert!(logs.contains("update of doc [place 4"));
}

#[test]
fn rejected_items_are_logged_on_flush() {
    let client = RecordingClient {
        rejected: [PlaceId(7)].into_iter().collect(),
        ..RecordingClient::default()
    };
    let mut updater = BulkUpdater::with_mapper(&client, NameMapper);
    updater.upsert(&named(7, "G")).unwrap();

    let (report, logs) = with_captured_logs(|| updater.flush().unwrap());

    assert_eq!(report.failed, 1);
    assert!(logs.contains("error while bulk update"));
    assert!(logs.contains("index of place 7 failed: mapper_parsing_exception"));
}

#[test]
fn over_reported_failures_are_capped_at_submitted() {
    let client = RecordingClient {
        extra_failures: 3,
        ..RecordingClient::default()
    };
    let mut updater = BulkUpdater::with_mapper(&client, NameMapper);
    updater.upsert(&named(1, "A")).unwrap();

    let report = updater.flush().unwrap();

    assert_eq!(report.submitted, 1);
    assert_eq!(report.failed, 1);
    assert_eq!(updater.stats().succeeded(), 0);
}
