use std::collections::BTreeMap;

use crate::{Category, ObservationRow, RawCategoryResponse, StationResponses};

/// Rows of every category for a station, each category a plain list.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NormalizedStation {
    rows: BTreeMap<Category, Vec<ObservationRow>>,
}

impl NormalizedStation {
    pub fn rows(&self, category: Category) -> &[ObservationRow] {
        self.rows.get(&category).map(Vec::as_slice).unwrap_or_default()
    }

    pub fn set_rows(&mut self, category: Category, rows: Vec<ObservationRow>) {
        self.rows.insert(category, rows);
    }

    pub fn is_empty(&self) -> bool {
        self.rows.values().all(Vec::is_empty)
    }
}

/// Collapse a response to a list of rows. Absent endpoints become an empty
/// list, a lone row a list of one. Row order is untouched.
pub fn normalize_response(response: &RawCategoryResponse) -> Vec<ObservationRow> {
    match response {
        RawCategoryResponse::Absent | RawCategoryResponse::Empty => vec![],
        RawCategoryResponse::Single(row) => vec![row.clone()],
        RawCategoryResponse::Many(rows) => rows.clone(),
    }
}

pub fn normalize(responses: &StationResponses) -> NormalizedStation {
    let mut normalized = NormalizedStation::default();
    for category in Category::REQUEST_ORDER {
        normalized.set_rows(category, normalize_response(responses.get(category)));
    }
    normalized
}

/// Some stations report a row per fuel model for the same day, even for the
/// RS time observation. Keep the first row of every run of same-date rows.
///
/// Only back to back duplicates are caught; a date that reappears after a
/// different date is kept.
pub fn remove_duplicate_dates(rows: &[ObservationRow], date_field: &str) -> Vec<ObservationRow> {
    let mut previous: Option<&str> = None;
    rows.iter()
        .filter(|row| {
            let date = row.get(date_field);
            let duplicate = date.is_some() && date == previous;
            previous = date;
            !duplicate
        })
        .cloned()
        .collect()
}

/// Copy of the station with duplicate NFDRS rows removed. Weather
/// categories pass through untouched.
pub fn remove_extra_nfdrs(station: &NormalizedStation) -> NormalizedStation {
    let mut filtered = station.clone();
    for category in [Category::DangerForecast, Category::DangerObservation] {
        let rows = remove_duplicate_dates(station.rows(category), category.date_field());
        filtered.set_rows(category, rows);
    }
    filtered
}

#[cfg(test)]
mod tests {
    use super::*;

    fn nfdrs_row(num: &str, date: &str, model: &str) -> ObservationRow {
        [("num", num), ("nfdr_dt", date), ("msgc", model)]
            .into_iter()
            .collect()
    }

    #[test]
    fn singleton_becomes_list_of_one() {
        let row: ObservationRow = [("num", "1")].into_iter().collect();
        let mut responses = StationResponses::new();
        responses.insert(Category::DangerForecast, RawCategoryResponse::Single(row.clone()));

        let normalized = normalize(&responses);
        assert_eq!(normalized.rows(Category::DangerForecast), &[row]);
    }

    #[test]
    fn absent_becomes_empty_list() {
        let normalized = normalize(&StationResponses::new());
        for category in Category::REQUEST_ORDER {
            assert!(normalized.rows(category).is_empty());
        }
        assert!(normalized.is_empty());
    }

    #[test]
    fn normalizing_twice_changes_nothing() {
        let rows = vec![
            nfdrs_row("1", "10/16/2026", "Y"),
            nfdrs_row("2", "10/17/2026", "Y"),
        ];
        let responses = [
            RawCategoryResponse::Absent,
            RawCategoryResponse::Empty,
            RawCategoryResponse::Single(rows[0].clone()),
            RawCategoryResponse::Many(rows.clone()),
        ];
        for response in responses {
            let once = normalize_response(&response);
            let twice = normalize_response(&RawCategoryResponse::Many(once.clone()));
            assert_eq!(once, twice);
        }
    }

    #[test]
    fn keeps_first_of_consecutive_duplicates() {
        let rows = vec![
            nfdrs_row("1", "10/15/2026", "Y"),
            nfdrs_row("2", "10/15/2026", "V"),
            nfdrs_row("3", "10/15/2026", "W"),
            nfdrs_row("4", "10/16/2026", "Y"),
            nfdrs_row("5", "10/16/2026", "V"),
        ];
        let kept = remove_duplicate_dates(&rows, "nfdr_dt");
        let nums: Vec<&str> = kept.iter().filter_map(|r| r.get("num")).collect();
        assert_eq!(nums, vec!["1", "4"]);
    }

    #[test]
    fn non_consecutive_duplicates_are_kept() {
        let rows = vec![
            nfdrs_row("1", "10/15/2026", "Y"),
            nfdrs_row("2", "10/16/2026", "Y"),
            nfdrs_row("3", "10/15/2026", "V"),
        ];
        assert_eq!(remove_duplicate_dates(&rows, "nfdr_dt").len(), 3);
    }

    #[test]
    fn only_danger_categories_are_filtered() {
        let weather: Vec<ObservationRow> = (0..2)
            .map(|_| [("fcst_dt", "10/17/2026")].into_iter().collect())
            .collect();
        let danger = vec![
            nfdrs_row("1", "10/17/2026", "Y"),
            nfdrs_row("2", "10/17/2026", "V"),
        ];

        let mut station = NormalizedStation::default();
        station.set_rows(Category::WeatherForecast, weather.clone());
        station.set_rows(Category::DangerForecast, danger.clone());
        station.set_rows(Category::DangerObservation, danger.clone());

        let filtered = remove_extra_nfdrs(&station);
        assert_eq!(filtered.rows(Category::WeatherForecast).len(), 2);
        assert_eq!(filtered.rows(Category::DangerForecast).len(), 1);
        assert_eq!(filtered.rows(Category::DangerObservation).len(), 1);
        // input untouched
        assert_eq!(station.rows(Category::DangerForecast).len(), 2);
    }
}
