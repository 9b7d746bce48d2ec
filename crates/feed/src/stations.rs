use serde::{Deserialize, Deserializer};
use std::{fs, path::Path};

use crate::FeedError;

/// RS time used when the station list only carries ids.
pub const DEFAULT_RS_TIME: &str = "13";

/// NFDRS 2016 fuel model Y.
pub const DEFAULT_FUEL_MODEL: &str = "16Y";

/// A RAWS station from the station list.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct StationDescriptor {
    #[serde(deserialize_with = "string_or_number")]
    pub station_id: String,
    /// Regularly scheduled observation hour, used to pick the canonical
    /// observation when a station reports several times a day.
    #[serde(default = "default_rs", deserialize_with = "string_or_number")]
    pub rs: String,
    #[serde(default = "default_fuel_model", alias = "fmodel")]
    pub fuel_model: String,
    #[serde(default)]
    pub priority: Option<String>,
}

impl StationDescriptor {
    pub fn new(station_id: impl Into<String>) -> Self {
        Self {
            station_id: station_id.into(),
            rs: default_rs(),
            fuel_model: default_fuel_model(),
            priority: None,
        }
    }
}

fn default_rs() -> String {
    DEFAULT_RS_TIME.to_string()
}

fn default_fuel_model() -> String {
    DEFAULT_FUEL_MODEL.to_string()
}

#[derive(Deserialize)]
#[serde(untagged)]
enum StringOrNumber {
    Text(String),
    Integer(i64),
}

impl From<StringOrNumber> for String {
    fn from(value: StringOrNumber) -> Self {
        match value {
            StringOrNumber::Text(text) => text,
            StringOrNumber::Integer(n) => n.to_string(),
        }
    }
}

fn string_or_number<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    StringOrNumber::deserialize(deserializer).map(String::from)
}

#[derive(Deserialize)]
#[serde(untagged)]
enum StationEntry {
    Descriptor(StationDescriptor),
    Id(StringOrNumber),
}

impl From<StationEntry> for StationDescriptor {
    fn from(entry: StationEntry) -> Self {
        match entry {
            StationEntry::Descriptor(descriptor) => descriptor,
            StationEntry::Id(id) => StationDescriptor::new(String::from(id)),
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum StationFile {
    List(Vec<StationEntry>),
    Wrapped { stations: Vec<StationEntry> },
}

/// Parse a station list: either a JSON array or `{"stations": [...]}`, whose
/// entries are station objects or bare ids.
pub fn parse_station_list(content: &str) -> Result<Vec<StationDescriptor>, FeedError> {
    let entries = match serde_json::from_str::<StationFile>(content)? {
        StationFile::List(entries) => entries,
        StationFile::Wrapped { stations } => stations,
    };
    Ok(entries.into_iter().map(StationDescriptor::from).collect())
}

pub fn load_station_list(path: &Path) -> Result<Vec<StationDescriptor>, FeedError> {
    let content = fs::read_to_string(path)?;
    parse_station_list(&content)
}
