mod common;

use common::{BASE_URL, RecordingSleeper, StubTransport};
use lotto_lib::dataset::Dataset;
use lotto_lib::database;
use lotto_lib::orchestrator::RangeOrchestrator;
use lotto_lib::pipeline::RoundPipeline;
use lotto_lib::retry::RetryPolicy;
use std::time::Duration;

fn orchestrator(transport: StubTransport) -> RangeOrchestrator<StubTransport, RecordingSleeper> {
    let retry = RetryPolicy::with_sleeper(1, Duration::ZERO, RecordingSleeper::default());
    let pipeline = RoundPipeline::new(transport, retry, BASE_URL);
    RangeOrchestrator::new(pipeline, RecordingSleeper::default(), Duration::ZERO, 1200)
}

#[tokio::test]
async fn scraped_rounds_land_in_csv_and_archive() {
    let dir = tempfile::tempdir().unwrap();
    let csv_path = dir.path().join("data").join("lotto_numbers.csv");
    let conn = database::open_archive(&dir.path().join("db").join("draws.db")).unwrap();

    let outcome = orchestrator(StubTransport::with_rounds(&[1, 2])).run(1, Some(2)).await;
    let dataset = Dataset::from_records(outcome.records).unwrap();
    dataset.validate().unwrap();
    dataset.save_csv(&csv_path).unwrap();
    database::save_draw_records(&conn, dataset.records()).unwrap();

    let csv = std::fs::read_to_string(&csv_path).unwrap();
    let lines: Vec<&str> = csv.lines().collect();
    assert_eq!(lines.len(), 3);
    assert_eq!(lines[1], "1,2024-12-14,8,9,18,35,39,45,25,9,3065034000");
    assert_eq!(database::load_draw_records(&conn, 1, 2).unwrap(), dataset.records());
}

#[tokio::test]
async fn skip_existing_fetches_only_missing_rounds() {
    let dir = tempfile::tempdir().unwrap();
    let conn = database::open_archive(&dir.path().join("draws.db")).unwrap();

    let first = orchestrator(StubTransport::with_rounds(&[1, 2])).run(1, Some(2)).await;
    database::save_draw_records(&conn, &first.records).unwrap();

    let split = database::check_existing_rounds(&conn, 1, 4).unwrap();
    assert_eq!(split.to_fetch().collect::<Vec<_>>(), vec![3, 4]);
    assert_eq!(split.to_fetch_count(), 2);

    let transport = StubTransport::with_rounds(&[1, 2, 3, 4]);
    let calls = transport.call_log();
    let second = orchestrator(transport).run_ascending(split.to_fetch()).await;
    assert_eq!(calls.lock().unwrap().len(), 2);

    let mut merged = database::load_draw_records(&conn, 1, 4).unwrap();
    merged.extend(second.records);
    let dataset = Dataset::from_records(merged).unwrap();
    dataset.validate().unwrap();
    assert_eq!(dataset.len(), 4);
    assert_eq!(database::latest_stored_round(&conn).unwrap(), Some(2));
}
