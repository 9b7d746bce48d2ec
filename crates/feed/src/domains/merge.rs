use std::collections::{BTreeMap, HashMap, HashSet};

use crate::{
    truncate_to_key, Category, DateKey, FeedError, NormalizedStation, ObservationRow,
    ReportWindow, SENTINEL,
};

/// Round an NFDRS value to match the integer display of legacy WIMS output.
/// Ties go to the even integer. Anything that isn't a number becomes the sentinel.
pub fn round_value(value: &str) -> String {
    match value.trim().parse::<f64>() {
        Ok(parsed) if parsed.is_finite() => match parsed.round_ties_even() {
            // -0.4 rounds to -0
            rounded if rounded == 0.0 => "0".to_string(),
            rounded => format!("{:.0}", rounded),
        },
        _ => SENTINEL.to_string(),
    }
}

/// Values of one row in report order, `-99` for every field it lacks.
pub fn extract_values(category: Category, row: &ObservationRow) -> Vec<String> {
    category
        .value_fields()
        .iter()
        .map(|field| {
            let value = row.get_or_sentinel(field);
            if category.is_danger() {
                round_value(&value)
            } else {
                value
            }
        })
        .collect()
}

pub fn sentinel_values(category: Category) -> Vec<String> {
    vec![SENTINEL.to_string(); category.value_fields().len()]
}

/// Expected dates with no row for `category`, in expected order.
pub fn find_missing_dates(
    rows: &[ObservationRow],
    category: Category,
    expected: &[DateKey],
) -> Vec<DateKey> {
    let present: HashSet<DateKey> = rows
        .iter()
        .filter_map(|row| row.get(category.date_field()))
        .map(truncate_to_key)
        .collect();
    expected
        .iter()
        .filter(|key| !present.contains(*key))
        .cloned()
        .collect()
}

/// Per date values of a station, one vector per canonical date.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DateGrid {
    dates: Vec<DateKey>,
    values: BTreeMap<DateKey, Vec<String>>,
}

impl DateGrid {
    pub fn new(dates: Vec<DateKey>) -> Self {
        let values = dates.iter().map(|d| (d.clone(), vec![])).collect();
        Self { dates, values }
    }

    /// Canonical dates in chronological order.
    pub fn dates(&self) -> &[DateKey] {
        &self.dates
    }

    pub fn values(&self, date: &str) -> Option<&[String]> {
        self.values.get(date).map(Vec::as_slice)
    }

    /// True when every date holds exactly `width` values.
    pub fn is_complete(&self, width: usize) -> bool {
        self.values.values().all(|v| v.len() == width)
    }

    fn extend(&mut self, date: &str, values: Vec<String>) -> bool {
        match self.values.get_mut(date) {
            Some(existing) => {
                existing.extend(values);
                true
            }
            None => false,
        }
    }
}

/// What merging a single category did to the grid.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CategoryFill {
    /// Dates filled from a row
    pub filled: Vec<DateKey>,
    /// Dates filled with sentinels
    pub missing: Vec<DateKey>,
    /// Rows without a date, outside the expected window, or repeating a date
    pub ignored_rows: usize,
}

/// Append one vector per expected date to the grid: the row's values when
/// the date is present, the sentinel vector otherwise. Never both.
pub fn merge_category(
    grid: &mut DateGrid,
    category: Category,
    rows: &[ObservationRow],
    expected: &[DateKey],
) -> CategoryFill {
    let mut fill = CategoryFill {
        missing: find_missing_dates(rows, category, expected),
        ..Default::default()
    };

    let mut by_date: HashMap<DateKey, &ObservationRow> = HashMap::new();
    for row in rows {
        let key = row.get(category.date_field()).map(truncate_to_key);
        match key {
            Some(key) if expected.contains(&key) && !by_date.contains_key(&key) => {
                by_date.insert(key, row);
            }
            _ => fill.ignored_rows += 1,
        }
    }

    for date in expected {
        let values = match by_date.get(date) {
            Some(row) => {
                fill.filled.push(date.clone());
                extract_values(category, row)
            }
            None => sentinel_values(category),
        };
        grid.extend(date, values);
    }
    fill
}

/// Build the full grid for a station. Categories are merged weather first so
/// every date ends up `[weather.., danger..]`.
pub fn merge_station(
    station: &NormalizedStation,
    window: &ReportWindow,
) -> Result<(DateGrid, Vec<(Category, CategoryFill)>), FeedError> {
    let mut grid = DateGrid::new(window.grid_keys()?);
    let mut fills = Vec::with_capacity(Category::MERGE_ORDER.len());
    for category in Category::MERGE_ORDER {
        let expected = window.expected_keys(category.is_forecast())?;
        let fill = merge_category(&mut grid, category, station.rows(category), &expected);
        fills.push((category, fill));
    }
    Ok((grid, fills))
}
