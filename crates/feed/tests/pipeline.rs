use async_trait::async_trait;
use slog::Logger;
use std::{
    path::{Path, PathBuf},
    sync::{Arc, Mutex},
};
use time::macros::date;
use wims_feed::{
    ArtifactPublisher, CategoryRequest, FeedError, FeedPipeline, FetchedDocument, Notifier,
    ObservationRow, PipelineSettings, PublishStatus, RawCategoryResponse, RemoteFetcher,
    ReportWindow, RunClock, RunSummary, StationDescriptor, SENTINEL,
};

fn logger() -> Logger {
    Logger::root(slog::Discard, slog::o!())
}

fn clock() -> RunClock {
    RunClock::new(date!(2026 - 10 - 16), 14)
}

/// Answers by URL fragment, everything else is absent.
struct MapFetcher {
    documents: Vec<(String, FetchedDocument)>,
}

#[async_trait]
impl RemoteFetcher for MapFetcher {
    async fn fetch(&self, request: &CategoryRequest) -> FetchedDocument {
        self.documents
            .iter()
            .find(|(fragment, _)| request.url.contains(fragment.as_str()))
            .map(|(_, document)| document.clone())
            .unwrap_or_else(FetchedDocument::absent)
    }
}

#[derive(Default)]
struct RecordingPublisher {
    published: Mutex<Vec<(PathBuf, String)>>,
}

#[async_trait]
impl ArtifactPublisher for RecordingPublisher {
    async fn publish(&self, local: &Path, key: &str) -> PublishStatus {
        self.published
            .lock()
            .unwrap()
            .push((local.to_path_buf(), key.to_string()));
        PublishStatus::success(format!("memory://{}", key))
    }
}

#[derive(Default)]
struct RecordingNotifier {
    summaries: Mutex<Vec<RunSummary>>,
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn notify(&self, summary: &RunSummary) -> Result<(), FeedError> {
        self.summaries.lock().unwrap().push(summary.clone());
        Ok(())
    }
}

fn document(root: &str, rows: Vec<ObservationRow>) -> FetchedDocument {
    FetchedDocument {
        root: Some(root.to_string()),
        response: RawCategoryResponse::from(rows),
    }
}

fn identity<'a>(name: &'a str, fields: Vec<(&'a str, &'a str)>) -> ObservationRow {
    let mut all = vec![
        ("sta_id", "101108"),
        ("sta_nm", name),
        ("latitude", "42.5"),
        ("longitude", "-112.6"),
    ];
    all.extend(fields);
    all.into_iter().collect()
}

fn weather_forecast(date: &str) -> ObservationRow {
    [
        ("fcst_dt", date),
        ("rh_max", "80"),
        ("temp_min", "41"),
        ("rh_min", "22"),
        ("temp_max", "63"),
        ("wind_sp", "7"),
    ]
    .into_iter()
    .collect()
}

fn weather_observation(date: &str) -> ObservationRow {
    identity(
        "ARBON OBS",
        vec![
            ("obs_dt", date),
            ("rh_max", "75"),
            ("temp_min", "38"),
            ("rh_min", "19"),
            ("temp_max", "66"),
            ("wind_sp", "9"),
        ],
    )
}

fn danger_observation(date: &str, bi: &str) -> ObservationRow {
    identity(
        "ARBON",
        vec![
            ("nfdr_dt", date),
            ("bi", bi),
            ("ec", "40.2"),
            ("ic", "12.5"),
            ("ten_hr", "6"),
            ("hu_hr", "9.4"),
            ("th_hr", "11.5"),
        ],
    )
}

/// Six of nine forecast days of weather, no danger forecast, both
/// observation days complete. The danger observation carries a second
/// fuel model row for 10/16.
fn arbon_fetcher() -> MapFetcher {
    let forecast_rows = [
        "10/17/2026",
        "10/18/2026",
        "10/19/2026",
        "10/20/2026",
        "10/21/2026",
        "10/22/2026",
    ]
    .into_iter()
    .map(weather_forecast)
    .collect();

    MapFetcher {
        documents: vec![
            ("nfdrs.xsql?stn=101108&type=F".to_string(), document("nfdrs", vec![])),
            (
                "nfdrs.xsql?stn=101108&type=N".to_string(),
                document(
                    "nfdrs",
                    vec![
                        danger_observation("10/15/2026", "31.6"),
                        danger_observation("10/16/2026", "28.2"),
                        danger_observation("10/16/2026", "55.0"),
                    ],
                ),
            ),
            ("pfcst.xsql?stn=101108".to_string(), document("pfcst", forecast_rows)),
            (
                "obs.xsql?stn=101108".to_string(),
                document(
                    "obs",
                    vec![
                        weather_observation("10/15/2026"),
                        weather_observation("10/16/2026"),
                    ],
                ),
            ),
        ],
    }
}

fn settings(dir: &Path) -> PipelineSettings {
    PipelineSettings {
        base_url: "http://wims.test/xsql".to_string(),
        station_path: dir.join("station_list.json"),
        output_dir: dir.join("out"),
        report_file: "ndfd_predserv_fcst.txt".to_string(),
        error_file: "error_stns.txt".to_string(),
        concurrency: 2,
        request_days: 7,
        forecast_days: 9,
    }
}

fn pipeline(
    dir: &Path,
    publisher: Arc<RecordingPublisher>,
    notifier: Arc<RecordingNotifier>,
) -> FeedPipeline {
    FeedPipeline::new(
        logger(),
        settings(dir),
        Arc::new(arbon_fetcher()),
        publisher,
        notifier,
    )
}

fn strings(values: &[&str]) -> Vec<String> {
    values.iter().map(|v| v.to_string()).collect()
}

#[tokio::test]
async fn partial_station_is_gap_filled() {
    let dir = tempfile::tempdir().unwrap();
    let pipeline = pipeline(dir.path(), Arc::default(), Arc::default());
    let window = ReportWindow::new(clock(), 9).unwrap();

    let outcomes = pipeline
        .process_stations(&[StationDescriptor::new("101108")], &window)
        .await
        .unwrap();
    assert!(outcomes.error_stns.is_empty());
    let report = &outcomes.reports[0];

    assert_eq!(report.header.station_name, "ARBON");
    assert_eq!(
        report.header.fields(),
        ["ARBON", "101108", "42.5", "-112.6", "20261016", "14"]
    );

    let dates = report.grid.dates();
    assert_eq!(dates.len(), 11);
    assert_eq!(dates[0], "10/15");
    assert_eq!(dates[10], "10/25");

    // observation days: real weather and rounded danger values
    assert_eq!(
        report.grid.values("10/15").unwrap(),
        strings(&["75", "38", "19", "66", "9", "32", "40", "12", "6", "9", "12"])
    );
    // first of the duplicate fuel model rows wins
    assert_eq!(report.grid.values("10/16").unwrap()[5], "28");

    // forecast days with weather: real weather, sentinel danger
    for date in ["10/17", "10/18", "10/19", "10/20", "10/21", "10/22"] {
        let values = report.grid.values(date).unwrap();
        assert_eq!(values[..5], strings(&["80", "41", "22", "63", "7"]));
        assert!(values[5..].iter().all(|v| v == SENTINEL), "{}", date);
    }

    // forecast days without weather: all sentinel
    for date in ["10/23", "10/24", "10/25"] {
        let values = report.grid.values(date).unwrap();
        assert_eq!(values.len(), 11);
        assert!(values.iter().all(|v| v == SENTINEL), "{}", date);
    }
}

#[tokio::test]
async fn station_without_data_is_listed_as_error() {
    let dir = tempfile::tempdir().unwrap();
    let pipeline = pipeline(dir.path(), Arc::default(), Arc::default());
    let window = ReportWindow::new(clock(), 9).unwrap();

    let outcomes = pipeline
        .process_stations(
            &[
                StationDescriptor::new("20207"),
                StationDescriptor::new("101108"),
                StationDescriptor::new("20208"),
            ],
            &window,
        )
        .await
        .unwrap();
    assert_eq!(outcomes.reports.len(), 1);
    assert_eq!(outcomes.error_stns, vec!["20207", "20208"]);
}

#[tokio::test]
async fn run_writes_publishes_and_notifies() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(
        dir.path().join("station_list.json"),
        r#"{"stations": ["101108", 20207]}"#,
    )
    .unwrap();
    let publisher = Arc::new(RecordingPublisher::default());
    let notifier = Arc::new(RecordingNotifier::default());
    let pipeline = pipeline(dir.path(), publisher.clone(), notifier.clone());

    let summary = pipeline.run(clock()).await.unwrap();
    assert_eq!(summary.forecast_file.num_stns, 1);
    assert!(summary.forecast_file.publish.is_success());
    let error_file = summary.error_file.as_ref().unwrap();
    assert_eq!(error_file.error_stns, vec!["20207"]);

    let out = dir.path().join("out");
    let report = std::fs::read_to_string(out.join("ndfd_predserv_fcst.txt")).unwrap();
    assert!(report.starts_with("*ARBON              101108  42.5    -112.6   20261016  14   \n"));
    assert_eq!(report.lines().count(), 14);
    let errors = std::fs::read_to_string(out.join("error_stns.txt")).unwrap();
    assert_eq!(errors, "20207\n");

    let keys: Vec<String> = publisher
        .published
        .lock()
        .unwrap()
        .iter()
        .map(|(_, key)| key.clone())
        .collect();
    assert_eq!(keys, vec!["ndfd_predserv_fcst.txt", "error_stns.txt"]);
    assert_eq!(notifier.summaries.lock().unwrap().as_slice(), &[summary]);
}

#[tokio::test]
async fn missing_station_list_fails_the_run() {
    let dir = tempfile::tempdir().unwrap();
    let notifier = Arc::new(RecordingNotifier::default());
    let pipeline = pipeline(dir.path(), Arc::default(), notifier.clone());

    assert!(pipeline.run(clock()).await.is_err());
    assert!(notifier.summaries.lock().unwrap().is_empty());
}
