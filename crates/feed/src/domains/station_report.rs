use slog::{debug, warn, Logger};

use crate::{
    extract_header, merge_station, normalize, remove_extra_nfdrs, DateGrid, FeedError,
    ReportWindow, StationHeader, StationResponses,
};

/// Fully processed station, ready for the report writer.
#[derive(Debug, Clone, PartialEq)]
pub struct StationReport {
    pub header: StationHeader,
    pub grid: DateGrid,
}

/// Normalize, de-duplicate and gap fill the four responses of a station.
///
/// Missing endpoints and incomplete rows degrade to sentinels. The only
/// per-station failure is [`FeedError::NoUsableHeader`], when no endpoint
/// returned a row identifying the station.
pub fn build_station_report(
    station_id: &str,
    responses: &StationResponses,
    window: &ReportWindow,
    logger: &Logger,
) -> Result<StationReport, FeedError> {
    let absent = responses.absent_categories();
    if !absent.is_empty() {
        debug!(logger, "station {} missing endpoints: {:?}", station_id, absent);
    }

    let normalized = remove_extra_nfdrs(&normalize(responses));
    let (grid, fills) = merge_station(&normalized, window)?;
    for (category, fill) in &fills {
        debug!(
            logger,
            "station {} {}: {} dates filled, {} missing, {} rows ignored",
            station_id,
            category,
            fill.filled.len(),
            fill.missing.len(),
            fill.ignored_rows
        );
    }

    match extract_header(&normalized, &window.clock) {
        Some(header) => Ok(StationReport { header, grid }),
        None => {
            warn!(
                logger,
                "No data found for {}. This stn will not be written to file.", station_id
            );
            Err(FeedError::NoUsableHeader(station_id.to_string()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Category, ObservationRow, RawCategoryResponse, RunClock, SENTINEL};
    use time::macros::date;

    fn logger() -> Logger {
        Logger::root(slog::Discard, slog::o!())
    }

    fn window() -> ReportWindow {
        ReportWindow::new(RunClock::new(date!(2026 - 10 - 16), 14), 9).unwrap()
    }

    #[test]
    fn station_without_rows_is_rejected() {
        let err = build_station_report("20207", &StationResponses::new(), &window(), &logger())
            .unwrap_err();
        assert!(matches!(err, FeedError::NoUsableHeader(id) if id == "20207"));
    }

    #[test]
    fn single_observation_row_is_enough() {
        let row: ObservationRow = [
            ("sta_nm", "ARBON"),
            ("sta_id", "101108"),
            ("latitude", "42.5"),
            ("longitude", "-112.6"),
            ("obs_dt", "10/16/2026"),
            ("temp_max", "70"),
        ]
        .into_iter()
        .collect();
        let mut responses = StationResponses::new();
        responses.insert(Category::WeatherObservation, RawCategoryResponse::Single(row));

        let report = build_station_report("101108", &responses, &window(), &logger()).unwrap();
        assert_eq!(report.header.station_id, "101108");
        assert!(report.grid.is_complete(11));
        let today = report.grid.values("10/16").unwrap();
        assert_eq!(today[3], "70");
        assert_eq!(today[0], SENTINEL);
        assert!(today[5..].iter().all(|v| v == SENTINEL));
    }
}
