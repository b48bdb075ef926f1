//! Pipeline lifecycle integration tests.
//!
//! These tests run single rows through the pipeline processor with the mock
//! fetcher, converter and publisher:
//! - Outcome recording (result link, error message, final state)
//! - Error classification (retrieval vs internal)
//! - Temporary artifact cleanup on every exit path
//! - Cut planning from row cells

use tempfile::TempDir;

use sheetcut_core::{
    converter::ConverterError,
    processor::JobOutcome,
    publisher::PublishError,
    testing::{fixtures, MemorySource, MockConverter, MockFetcher, MockPublisher},
    ColumnMap, PipelineProcessor, ProcessorConfig, Row, RowState, SharedSheet,
};

/// Test helper wiring a pipeline processor to mocks and an in-memory sheet.
struct TestHarness {
    processor: PipelineProcessor<MockFetcher, MockConverter, MockPublisher>,
    fetcher: MockFetcher,
    converter: MockConverter,
    publisher: MockPublisher,
    source: MemorySource,
    sheet: SharedSheet,
    columns: ColumnMap,
    temp_dir: TempDir,
}

impl TestHarness {
    fn new(rows: Vec<Row>) -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let config = ProcessorConfig::default().with_temp_dir(temp_dir.path().to_path_buf());

        let fetcher = MockFetcher::new();
        let converter = MockConverter::new();
        let publisher = MockPublisher::new();
        let columns = ColumnMap::default();

        let processor = PipelineProcessor::new(
            config,
            columns.clone(),
            fetcher.clone(),
            converter.clone(),
            publisher.clone(),
        );

        let source = MemorySource::new(rows);
        let sheet = source.shared_sheet();

        Self {
            processor,
            fetcher,
            converter,
            publisher,
            source,
            sheet,
            columns,
            temp_dir,
        }
    }

    /// Harness holding one claimed row (id 1).
    fn claimed() -> Self {
        let row = fixtures::sheet_row(1, "Ready", "In Progress", &fixtures::link_for(1), "Song 1");
        Self::new(vec![row])
    }

    async fn process(&self, row_id: u32) -> JobOutcome {
        let row = self.source.row(row_id).expect("row exists");
        self.processor.process(&self.sheet, row, false).await
    }

    fn state(&self, row_id: u32) -> Option<RowState> {
        RowState::from_cell(&self.source.cell(row_id, &self.columns.state))
    }

    fn temp_entries(&self) -> usize {
        std::fs::read_dir(self.temp_dir.path())
            .expect("temp dir readable")
            .count()
    }
}

// =============================================================================
// Success Path
// =============================================================================

#[tokio::test]
async fn test_pipeline_completes_row() {
    let harness = TestHarness::claimed();

    let outcome = harness.process(1).await;

    assert_eq!(
        outcome,
        JobOutcome::Complete {
            reference: "mock://published/1-song_1.mp3".to_string()
        }
    );
    assert_eq!(
        harness.source.cell(1, &harness.columns.result_link),
        "mock://published/1-song_1.mp3"
    );
    assert_eq!(harness.state(1), Some(RowState::Complete));
    assert_eq!(harness.source.cell(1, &harness.columns.error), "");

    assert_eq!(harness.fetcher.fetched_links().await, vec![fixtures::link_for(1)]);
    let published = harness.publisher.recorded_publishes().await;
    assert_eq!(published.len(), 1);
    assert_eq!(published[0].name, "1-song_1.mp3");
}

#[tokio::test]
async fn test_result_link_is_written_before_final_state() {
    let harness = TestHarness::claimed();

    harness.process(1).await;

    let writes = harness.source.writes();
    let columns: Vec<&str> = writes.iter().map(|w| w.column.as_str()).collect();
    assert_eq!(
        columns,
        vec![harness.columns.result_link.as_str(), harness.columns.state.as_str()]
    );
}

#[tokio::test]
async fn test_output_extension_is_used_for_published_name() {
    let mut harness = TestHarness::claimed();
    harness.processor = PipelineProcessor::new(
        ProcessorConfig::default().with_temp_dir(harness.temp_dir.path().to_path_buf()),
        harness.columns.clone(),
        harness.fetcher.clone(),
        harness.converter.clone(),
        harness.publisher.clone(),
    )
    .with_output_extension(".ogg");

    harness.process(1).await;

    let conversions = harness.converter.recorded_conversions().await;
    assert!(conversions[0].job.output_path.ends_with("cut.ogg"));
    assert_eq!(harness.publisher.recorded_publishes().await[0].name, "1-song_1.ogg");
}

#[tokio::test]
async fn test_workspace_removed_after_success() {
    let harness = TestHarness::claimed();

    harness.process(1).await;

    assert_eq!(harness.temp_entries(), 0, "job workspace should be removed");
}

// =============================================================================
// Failure Classification
// =============================================================================

#[tokio::test]
async fn test_retrieval_failure_records_download_error() {
    let harness = TestHarness::claimed();
    harness
        .fetcher
        .set_unavailable(fixtures::link_for(1), "Video unavailable")
        .await;

    let outcome = harness.process(1).await;

    assert_eq!(
        outcome,
        JobOutcome::Errored {
            retrieval: true,
            message: "Download error: Video unavailable".to_string()
        }
    );
    assert_eq!(
        harness.source.cell(1, &harness.columns.error),
        "Download error: Video unavailable"
    );
    assert_eq!(harness.state(1), Some(RowState::Errored));
    assert_eq!(harness.converter.conversion_count().await, 0);
    assert_eq!(harness.temp_entries(), 0);
}

#[tokio::test]
async fn test_transcode_failure_is_internal_and_cleans_up() {
    let harness = TestHarness::claimed();
    harness
        .converter
        .set_next_error(ConverterError::conversion_failed("FFmpeg exited with code: Some(1)", None))
        .await;

    let outcome = harness.process(1).await;

    match &outcome {
        JobOutcome::Errored { retrieval, message } => {
            assert!(!retrieval);
            assert!(
                message.starts_with("Internal error transcode:"),
                "unexpected message: {}",
                message
            );
        }
        other => panic!("expected Errored, got {:?}", other),
    }
    assert_eq!(harness.state(1), Some(RowState::Errored));
    assert!(harness.publisher.recorded_publishes().await.is_empty());
    // The mock wrote its output before failing; nothing may be left behind
    assert_eq!(harness.temp_entries(), 0);
}

#[tokio::test]
async fn test_publish_failure_is_internal() {
    let harness = TestHarness::claimed();
    harness
        .publisher
        .set_next_error(PublishError::TransferFailed {
            exit_code: Some(1),
            stderr: Some("Permission denied".to_string()),
        })
        .await;

    let outcome = harness.process(1).await;

    match outcome {
        JobOutcome::Errored { retrieval, message } => {
            assert!(!retrieval);
            assert!(message.starts_with("Internal error publish:"));
        }
        other => panic!("expected Errored, got {:?}", other),
    }
    assert_eq!(harness.source.cell(1, &harness.columns.result_link), "");
    assert_eq!(harness.temp_entries(), 0);
}

#[tokio::test]
async fn test_bad_timecode_fails_before_download() {
    let mut row = fixtures::sheet_row(1, "Ready", "In Progress", &fixtures::link_for(1), "Song 1");
    row.fields
        .insert(ColumnMap::default().start, "abc".to_string());
    let harness = TestHarness::new(vec![row]);

    let outcome = harness.process(1).await;

    match outcome {
        JobOutcome::Errored { retrieval, message } => {
            assert!(!retrieval);
            assert!(message.starts_with("Internal error timecode:"));
        }
        other => panic!("expected Errored, got {:?}", other),
    }
    assert!(harness.fetcher.fetched_links().await.is_empty());
}

#[tokio::test]
async fn test_missing_link_is_internal_error() {
    let row = fixtures::sheet_row(1, "Ready", "In Progress", "   ", "Song 1");
    let harness = TestHarness::new(vec![row]);

    let outcome = harness.process(1).await;

    assert!(matches!(outcome, JobOutcome::Errored { retrieval: false, .. }));
    assert_eq!(harness.state(1), Some(RowState::Errored));
    assert!(harness.fetcher.fetched_links().await.is_empty());
}

// =============================================================================
// Recording
// =============================================================================

#[tokio::test]
async fn test_no_update_state_leaves_state_column() {
    let harness = TestHarness::claimed();
    let row = harness.source.row(1).unwrap();

    let outcome = harness.processor.process(&harness.sheet, row, true).await;

    assert!(outcome.is_success());
    assert_eq!(harness.state(1), Some(RowState::InProgress));
    assert!(harness.source.writes_to(1, &harness.columns.state).is_empty());
    assert_eq!(
        harness.source.cell(1, &harness.columns.result_link),
        "mock://published/1-song_1.mp3"
    );
}

#[tokio::test]
async fn test_record_failure_is_reported_as_unrecorded() {
    let harness = TestHarness::claimed();
    harness.source.fail_writes(1);

    let outcome = harness.process(1).await;

    assert!(matches!(outcome, JobOutcome::Unrecorded { .. }));
    assert_eq!(outcome.label(), "unrecorded");
    // The row keeps its claim
    assert_eq!(harness.state(1), Some(RowState::InProgress));
    assert_eq!(harness.temp_entries(), 0);
}

// =============================================================================
// Cut Planning
// =============================================================================

#[tokio::test]
async fn test_end_and_fade_out_extend_the_cut() {
    let columns = ColumnMap::default();
    let mut row = fixtures::sheet_row(1, "Ready", "In Progress", &fixtures::link_for(1), "Song 1");
    row.fields.insert(columns.start.clone(), "0:10".to_string());
    row.fields.insert(columns.end.clone(), "1m".to_string());
    row.fields.insert(columns.fade_in.clone(), "2".to_string());
    row.fields.insert(columns.fade_out.clone(), "5s".to_string());
    let harness = TestHarness::new(vec![row]);

    let outcome = harness.process(1).await;
    assert!(outcome.is_success());

    let conversions = harness.converter.recorded_conversions().await;
    let plan = conversions[0].plan.clone().unwrap();
    assert_eq!(plan.seek, Some(10.0));
    assert_eq!(plan.effective_end, Some(65.0));
    assert_eq!(plan.duration, Some(55.0));
    assert_eq!(plan.fade_out.unwrap().start_time, 50.0);
    assert_eq!(harness.converter.probe_count().await, 0);
}

#[tokio::test]
async fn test_fade_out_without_end_probes_source() {
    let columns = ColumnMap::default();
    let mut row = fixtures::sheet_row(1, "Ready", "In Progress", &fixtures::link_for(1), "Song 1");
    row.fields.insert(columns.fade_out.clone(), "4".to_string());
    let harness = TestHarness::new(vec![row]);
    harness.converter.set_probe_duration(200.0).await;

    let outcome = harness.process(1).await;
    assert!(outcome.is_success());

    assert_eq!(harness.converter.probe_count().await, 1);
    let plan = harness.converter.recorded_conversions().await[0]
        .plan
        .clone()
        .unwrap();
    assert_eq!(plan.effective_end, Some(200.0));
    assert_eq!(plan.fade_out.unwrap().start_time, 196.0);
}

#[tokio::test]
async fn test_metadata_comes_from_row() {
    let columns = ColumnMap::default();
    let mut row = fixtures::sheet_row(1, "Ready", "In Progress", &fixtures::link_for(1), "Intro Theme");
    row.fields.insert(columns.category.clone(), "Soundtrack".to_string());
    let harness = TestHarness::new(vec![row]);

    harness.process(1).await;

    let job = &harness.converter.recorded_conversions().await[0].job;
    assert_eq!(job.metadata.title, "Intro Theme");
    assert_eq!(job.metadata.artist, "Test Artist");
    assert_eq!(job.metadata.genre, "Soundtrack");
    assert_eq!(job.job_id, "row-1");
}
