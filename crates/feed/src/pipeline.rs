use anyhow::Context;
use futures::stream::{self, StreamExt};
use slog::{error, info, o, Logger};
use std::{path::PathBuf, sync::Arc};
use wims_feed_core::{ensure_dir_exists, write_lines};

use crate::{
    build_requests, build_station_report, fetch_station, load_station_list, write_report_file,
    ArtifactPublisher, Cli, ErrorFileSummary, FeedError, ForecastFileSummary, Notifier,
    RemoteFetcher, ReportWindow, RunClock, RunSummary, StationDescriptor, StationReport,
};

/// Run parameters, resolved from the merged configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineSettings {
    pub base_url: String,
    pub station_path: PathBuf,
    pub output_dir: PathBuf,
    pub report_file: String,
    pub error_file: String,
    pub concurrency: usize,
    pub request_days: i64,
    pub forecast_days: i64,
}

impl From<&Cli> for PipelineSettings {
    fn from(cli: &Cli) -> Self {
        Self {
            base_url: cli.base_url(),
            station_path: cli.station_path(),
            output_dir: cli.output_dir(),
            report_file: cli.report_file(),
            error_file: cli.error_file(),
            concurrency: cli.concurrency(),
            request_days: cli.request_days(),
            forecast_days: cli.forecast_days(),
        }
    }
}

/// Stations split by outcome, both in station list order.
#[derive(Debug, Default)]
pub struct StationOutcomes {
    pub reports: Vec<StationReport>,
    pub error_stns: Vec<String>,
}

pub struct FeedPipeline {
    logger: Logger,
    settings: PipelineSettings,
    fetcher: Arc<dyn RemoteFetcher>,
    publisher: Arc<dyn ArtifactPublisher>,
    notifier: Arc<dyn Notifier>,
}

impl FeedPipeline {
    pub fn new(
        logger: Logger,
        settings: PipelineSettings,
        fetcher: Arc<dyn RemoteFetcher>,
        publisher: Arc<dyn ArtifactPublisher>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Self {
            logger,
            settings,
            fetcher,
            publisher,
            notifier,
        }
    }

    /// One full run: fetch, build, write, publish, notify.
    pub async fn run(&self, clock: RunClock) -> Result<RunSummary, anyhow::Error> {
        let stations = load_station_list(&self.settings.station_path).with_context(|| {
            format!(
                "loading station list {}",
                self.settings.station_path.display()
            )
        })?;
        info!(self.logger, "processing {} stations", stations.len());

        let window = ReportWindow::new(clock, self.settings.forecast_days)?;
        let outcomes = self.process_stations(&stations, &window).await?;

        ensure_dir_exists(&self.settings.output_dir)?;
        let report_path = self.settings.output_dir.join(&self.settings.report_file);
        let num_stns = write_report_file(&report_path, &outcomes.reports, &self.logger)?;
        let forecast_file = ForecastFileSummary {
            publish: self
                .publisher
                .publish(&report_path, &self.settings.report_file)
                .await,
            num_stns,
        };

        let error_file = if outcomes.error_stns.is_empty() {
            None
        } else {
            let error_path = self.settings.output_dir.join(&self.settings.error_file);
            write_lines(&error_path, &outcomes.error_stns)?;
            info!(
                self.logger,
                "{} stations without data listed in {}",
                outcomes.error_stns.len(),
                error_path.display()
            );
            Some(ErrorFileSummary {
                publish: self
                    .publisher
                    .publish(&error_path, &self.settings.error_file)
                    .await,
                error_stns: outcomes.error_stns,
            })
        };

        let summary = RunSummary {
            forecast_file,
            error_file,
        };
        if let Err(err) = self.notifier.notify(&summary).await {
            error!(self.logger, "failed to send run summary: {}", err);
        }
        Ok(summary)
    }

    /// Build every station's report with bounded concurrency. Stations
    /// without a usable header are collected by id; any other error aborts.
    pub async fn process_stations(
        &self,
        stations: &[StationDescriptor],
        window: &ReportWindow,
    ) -> Result<StationOutcomes, FeedError> {
        let results: Vec<Result<StationReport, FeedError>> = stream::iter(stations)
            .map(|station| self.process_station(station, window))
            .buffered(self.settings.concurrency.max(1))
            .collect()
            .await;

        let mut outcomes = StationOutcomes::default();
        for result in results {
            match result {
                Ok(report) => outcomes.reports.push(report),
                Err(FeedError::NoUsableHeader(station_id)) => outcomes.error_stns.push(station_id),
                Err(err) => return Err(err),
            }
        }
        Ok(outcomes)
    }

    async fn process_station(
        &self,
        station: &StationDescriptor,
        window: &ReportWindow,
    ) -> Result<StationReport, FeedError> {
        let logger = self.logger.new(o!("station" => station.station_id.clone()));
        let requests = build_requests(
            &self.settings.base_url,
            station,
            &window.clock,
            self.settings.request_days,
        )?;
        let responses = fetch_station(self.fetcher.as_ref(), &requests, &logger).await;
        build_station_report(&station.station_id, &responses, window, &logger)
    }
}
