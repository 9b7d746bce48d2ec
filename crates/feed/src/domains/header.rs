use crate::{Category, NormalizedStation, ObservationRow, RunClock};

/// Identity line of a station in the legacy report.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StationHeader {
    pub station_name: String,
    pub station_id: String,
    pub latitude: String,
    pub longitude: String,
    /// `YYYYMMDD`
    pub run_date: String,
    /// `HH`
    pub run_hour: String,
}

impl StationHeader {
    pub fn fields(&self) -> [&str; 6] {
        [
            self.station_name.as_str(),
            self.station_id.as_str(),
            self.latitude.as_str(),
            self.longitude.as_str(),
            self.run_date.as_str(),
            self.run_hour.as_str(),
        ]
    }
}

/// Round to 3 decimals and print the shortest form, keeping one decimal for
/// whole numbers (`45.0`, `-116.219`). Ties resolve on the exact binary
/// value, so `43.6125` prints as `43.612`.
pub fn round_coordinate(value: &str) -> Option<String> {
    let parsed = value.trim().parse::<f64>().ok().filter(|v| v.is_finite())?;
    let mut rounded = format!("{:.3}", parsed)
        .trim_end_matches('0')
        .to_string();
    if rounded.ends_with('.') {
        rounded.push('0');
    }
    Some(rounded)
}

fn header_from_row(row: &ObservationRow, clock: &RunClock) -> Option<StationHeader> {
    Some(StationHeader {
        station_name: row.get("sta_nm")?.to_string(),
        station_id: row.get("sta_id")?.to_string(),
        latitude: round_coordinate(row.get("latitude")?)?,
        longitude: round_coordinate(row.get("longitude")?)?,
        run_date: clock.header_date(),
        run_hour: clock.header_hour(),
    })
}

/// Header from the first row of the first category, in request order, that
/// carries the station identity. `None` means the station returned no usable
/// data from any endpoint.
pub fn extract_header(station: &NormalizedStation, clock: &RunClock) -> Option<StationHeader> {
    Category::REQUEST_ORDER.into_iter().find_map(|category| {
        station
            .rows(category)
            .first()
            .and_then(|row| header_from_row(row, clock))
    })
}
