use serde::Deserialize;
use std::collections::BTreeMap;
use std::fmt;

/// WIMS and the downstream forecast systems use this for "no data".
pub const SENTINEL: &str = "-99";

/// Weather fields, in legacy report order.
pub const WEATHER_FIELDS: [&str; 5] = ["rh_max", "temp_min", "rh_min", "temp_max", "wind_sp"];

/// NFDRS danger index fields, in legacy report order.
pub const DANGER_FIELDS: [&str; 6] = ["bi", "ec", "ic", "ten_hr", "hu_hr", "th_hr"];

/// Values per date once every category has been merged.
pub const VALUES_PER_DATE: usize = WEATHER_FIELDS.len() + DANGER_FIELDS.len();

/// One of the four WIMS queries made per station.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Category {
    WeatherForecast,
    WeatherObservation,
    DangerForecast,
    DangerObservation,
}

impl Category {
    /// Order categories are merged into the date grid. Weather values must
    /// land before danger values for every date.
    pub const MERGE_ORDER: [Category; 4] = [
        Category::WeatherForecast,
        Category::WeatherObservation,
        Category::DangerObservation,
        Category::DangerForecast,
    ];

    /// Order the endpoints are requested in. Station headers come from the
    /// first of these with a usable row.
    pub const REQUEST_ORDER: [Category; 4] = [
        Category::DangerForecast,
        Category::DangerObservation,
        Category::WeatherForecast,
        Category::WeatherObservation,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Category::WeatherForecast => "weather_forecast",
            Category::WeatherObservation => "weather_observation",
            Category::DangerForecast => "danger_forecast",
            Category::DangerObservation => "danger_observation",
        }
    }

    /// Field holding the `MM/DD/YYYY` date of a row.
    pub fn date_field(&self) -> &'static str {
        match self {
            Category::WeatherForecast => "fcst_dt",
            Category::WeatherObservation => "obs_dt",
            Category::DangerForecast | Category::DangerObservation => "nfdr_dt",
        }
    }

    pub fn is_danger(&self) -> bool {
        matches!(
            self,
            Category::DangerForecast | Category::DangerObservation
        )
    }

    pub fn is_forecast(&self) -> bool {
        matches!(self, Category::WeatherForecast | Category::DangerForecast)
    }

    /// The other category sharing this category's root element, if any.
    pub fn sibling(&self) -> Option<Category> {
        match self {
            Category::DangerForecast => Some(Category::DangerObservation),
            Category::DangerObservation => Some(Category::DangerForecast),
            _ => None,
        }
    }

    pub fn value_fields(&self) -> &'static [&'static str] {
        if self.is_danger() {
            &DANGER_FIELDS
        } else {
            &WEATHER_FIELDS
        }
    }

    /// First category answered by a document with this root element.
    pub fn from_root_element(root: &str) -> Option<Category> {
        match root {
            "pfcst" => Some(Category::WeatherForecast),
            "obs" => Some(Category::WeatherObservation),
            "nfdrs" => Some(Category::DangerForecast),
            _ => None,
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// A single `row` of a WIMS document: field name to raw string value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(transparent)]
pub struct ObservationRow(BTreeMap<String, String>);

impl ObservationRow {
    pub fn get(&self, field: &str) -> Option<&str> {
        self.0.get(field).map(String::as_str)
    }

    /// Field value, or the sentinel when the row doesn't carry it.
    pub fn get_or_sentinel(&self, field: &str) -> String {
        self.get(field).unwrap_or(SENTINEL).to_string()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Drops fields WIMS sent as empty elements so they fall back to the sentinel.
    pub fn without_blank_fields(self) -> Self {
        ObservationRow(
            self.0
                .into_iter()
                .filter(|(_, value)| !value.trim().is_empty())
                .collect(),
        )
    }
}

impl<K, V> FromIterator<(K, V)> for ObservationRow
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        ObservationRow(
            iter.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}

/// Parsed result of one category query, before normalization.
///
/// WIMS answers a single row as a bare element and several rows as a list;
/// the two shapes are kept apart here and collapsed by `normalize_response`.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum RawCategoryResponse {
    /// Endpoint unreachable or returned nothing decodable
    #[default]
    Absent,
    Empty,
    Single(ObservationRow),
    Many(Vec<ObservationRow>),
}

impl From<Vec<ObservationRow>> for RawCategoryResponse {
    fn from(mut rows: Vec<ObservationRow>) -> Self {
        match rows.len() {
            0 => RawCategoryResponse::Empty,
            1 => RawCategoryResponse::Single(rows.remove(0)),
            _ => RawCategoryResponse::Many(rows),
        }
    }
}

impl RawCategoryResponse {
    pub fn is_absent(&self) -> bool {
        matches!(self, RawCategoryResponse::Absent)
    }
}

/// The four raw responses gathered for one station.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StationResponses {
    slots: BTreeMap<Category, RawCategoryResponse>,
}

impl StationResponses {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a response for a known category, replacing any previous one.
    pub fn insert(&mut self, category: Category, response: RawCategoryResponse) {
        self.slots.insert(category, response);
    }

    /// Store a response identified only by its document root element.
    ///
    /// Both NFDRS queries answer with an `nfdrs` document: the first one seen
    /// fills the danger forecast slot and a later one goes to its sibling
    /// rather than overwriting it. Returns the slot used, or `None` for an
    /// unknown root or when both slots are already taken.
    pub fn insert_document(
        &mut self,
        root: &str,
        response: RawCategoryResponse,
    ) -> Option<Category> {
        let first = Category::from_root_element(root)?;
        let target = if !self.contains(first) {
            first
        } else {
            first.sibling().filter(|sibling| !self.contains(*sibling))?
        };
        self.slots.insert(target, response);
        Some(target)
    }

    /// True once anything, even an absent response, was stored for `category`.
    pub fn contains(&self, category: Category) -> bool {
        self.slots.contains_key(&category)
    }

    pub fn get(&self, category: Category) -> &RawCategoryResponse {
        static ABSENT: RawCategoryResponse = RawCategoryResponse::Absent;
        self.slots.get(&category).unwrap_or(&ABSENT)
    }

    /// Categories whose endpoint returned nothing at all.
    pub fn absent_categories(&self) -> Vec<Category> {
        Category::REQUEST_ORDER
            .into_iter()
            .filter(|category| self.get(*category).is_absent())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(date: &str) -> ObservationRow {
        [("nfdr_dt", date)].into_iter().collect()
    }

    #[test]
    fn vec_maps_to_shape_variants() {
        assert_eq!(RawCategoryResponse::from(vec![]), RawCategoryResponse::Empty);
        assert_eq!(
            RawCategoryResponse::from(vec![row("10/16/2026")]),
            RawCategoryResponse::Single(row("10/16/2026"))
        );
        assert!(matches!(
            RawCategoryResponse::from(vec![row("10/16/2026"), row("10/17/2026")]),
            RawCategoryResponse::Many(rows) if rows.len() == 2
        ));
    }

    #[test]
    fn second_nfdrs_document_goes_to_observation_slot() {
        let mut responses = StationResponses::new();
        let forecast = RawCategoryResponse::Single(row("10/17/2026"));
        let observation = RawCategoryResponse::Single(row("10/16/2026"));

        assert_eq!(
            responses.insert_document("nfdrs", forecast.clone()),
            Some(Category::DangerForecast)
        );
        assert_eq!(
            responses.insert_document("nfdrs", observation.clone()),
            Some(Category::DangerObservation)
        );
        assert_eq!(responses.get(Category::DangerForecast), &forecast);
        assert_eq!(responses.get(Category::DangerObservation), &observation);

        // a third one has nowhere to go
        assert_eq!(
            responses.insert_document("nfdrs", RawCategoryResponse::Empty),
            None
        );
        assert_eq!(responses.get(Category::DangerForecast), &forecast);
    }

    #[test]
    fn absent_forecast_slot_still_counts_as_taken() {
        let mut responses = StationResponses::new();
        responses.insert(Category::DangerForecast, RawCategoryResponse::Absent);
        assert_eq!(
            responses.insert_document("nfdrs", RawCategoryResponse::Empty),
            Some(Category::DangerObservation)
        );
    }

    #[test]
    fn unknown_root_is_rejected() {
        let mut responses = StationResponses::new();
        assert_eq!(
            responses.insert_document("error", RawCategoryResponse::Empty),
            None
        );
        assert_eq!(responses.absent_categories().len(), 4);
    }

    #[test]
    fn missing_fields_fall_back_to_sentinel() {
        let row: ObservationRow = [("bi", "12"), ("ec", " ")].into_iter().collect();
        let row = row.without_blank_fields();
        assert_eq!(row.get_or_sentinel("bi"), "12");
        assert_eq!(row.get_or_sentinel("ec"), SENTINEL);
        assert_eq!(row.get_or_sentinel("ic"), SENTINEL);
    }
}
