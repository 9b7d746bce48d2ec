use async_trait::async_trait;
use futures::future::join_all;
use serde::Deserialize;
use slog::{debug, error, warn, Logger};

use crate::{
    format_request_date, Category, FeedError, ObservationRow, RawCategoryResponse, RunClock,
    StationDescriptor, StationResponses, XmlFetcher,
};

/// One xsql query for a station.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryRequest {
    pub category: Category,
    pub url: String,
}

/// Provider answer to a request. `root` is the document element name, `None`
/// when nothing decodable came back.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FetchedDocument {
    pub root: Option<String>,
    pub response: RawCategoryResponse,
}

impl FetchedDocument {
    pub fn absent() -> Self {
        Self::default()
    }
}

#[async_trait]
pub trait RemoteFetcher: Send + Sync {
    /// Must not fail: network and decoding problems come back as an absent
    /// document so the station is gap filled instead of dropped.
    async fn fetch(&self, request: &CategoryRequest) -> FetchedDocument;
}

/// The four WIMS requests of a station, in [`Category::REQUEST_ORDER`].
///
/// WIMS only serves `request_days` of forecast; the report window beyond that
/// is sentinel filled.
pub fn build_requests(
    base_url: &str,
    station: &StationDescriptor,
    clock: &RunClock,
    request_days: i64,
) -> Result<Vec<CategoryRequest>, FeedError> {
    let yesterday = format_request_date(clock.days_from_run(-1)?)?;
    let today = format_request_date(clock.run_date)?;
    let tomorrow = format_request_date(clock.days_from_run(1)?)?;
    let last_day = format_request_date(clock.days_from_run(request_days)?)?;
    let base = base_url.trim_end_matches('/');
    let stn = &station.station_id;
    let priority = station
        .priority
        .as_ref()
        .map(|p| format!("&priority={}", p))
        .unwrap_or_default();

    Category::REQUEST_ORDER
        .into_iter()
        .map(|category| {
            let url = match category {
                Category::DangerForecast => format!(
                    "{}/nfdrs.xsql?stn={}&type=F{}&fmodel={}&start={}&end={}",
                    base, stn, priority, station.fuel_model, today, last_day
                ),
                Category::DangerObservation => format!(
                    "{}/nfdrs.xsql?stn={}&type=N{}&fmodel={}&start={}&end={}&time={}",
                    base, stn, priority, station.fuel_model, yesterday, today, station.rs
                ),
                Category::WeatherForecast => format!(
                    "{}/pfcst.xsql?stn={}&type=F&start={}&end={}",
                    base, stn, tomorrow, last_day
                ),
                Category::WeatherObservation => format!(
                    "{}/obs.xsql?stn={}&start={}&end={}&time={}",
                    base, stn, yesterday, today, station.rs
                ),
            };
            Ok(CategoryRequest { category, url })
        })
        .collect()
}

#[derive(Debug, Default, Deserialize)]
struct WimsDocument {
    #[serde(default)]
    row: Vec<ObservationRow>,
}

/// Name of the document element, skipping the xml declaration and comments.
pub fn root_element_name(xml: &str) -> Option<&str> {
    let mut rest = xml;
    loop {
        let start = rest.find('<')?;
        rest = &rest[start + 1..];
        if rest.starts_with('?') || rest.starts_with('!') {
            continue;
        }
        let end = rest
            .find(|c: char| c.is_whitespace() || c == '>' || c == '/')
            .unwrap_or(rest.len());
        let name = &rest[..end];
        return (!name.is_empty()).then_some(name);
    }
}

/// Decode an xsql response body. WIMS error documents decode as absent.
pub fn decode_document(xml: &str) -> Result<FetchedDocument, FeedError> {
    let Some(root) = root_element_name(xml) else {
        return Ok(FetchedDocument::absent());
    };
    if root == "error" {
        return Ok(FetchedDocument::absent());
    }
    let document: WimsDocument = serde_xml_rs::from_str(xml)?;
    let rows: Vec<ObservationRow> = document
        .row
        .into_iter()
        .map(ObservationRow::without_blank_fields)
        .filter(|row| !row.is_empty())
        .collect();
    Ok(FetchedDocument {
        root: Some(root.to_string()),
        response: rows.into(),
    })
}

/// Fetches and decodes WIMS xsql documents.
pub struct WimsClient {
    logger: Logger,
    fetcher: XmlFetcher,
}

impl WimsClient {
    pub fn new(logger: Logger, fetcher: XmlFetcher) -> Self {
        Self { logger, fetcher }
    }
}

#[async_trait]
impl RemoteFetcher for WimsClient {
    async fn fetch(&self, request: &CategoryRequest) -> FetchedDocument {
        let xml = match self.fetcher.fetch_xml(&request.url).await {
            Ok(xml) => xml,
            Err(err) => {
                error!(self.logger, "Unable to get url {}: {}", request.url, err);
                return FetchedDocument::absent();
            }
        };
        match decode_document(&xml) {
            Ok(document) => document,
            Err(err) => {
                error!(
                    self.logger,
                    "error converting xml from {}: {}", request.url, err
                );
                debug!(self.logger, "raw string: {}", xml);
                FetchedDocument::absent()
            }
        }
    }
}

/// Issue a station's requests concurrently and slot the answers by category.
///
/// Answers are interpreted in request order. A document is placed by its
/// root element, so the second `nfdrs` document lands in the danger
/// observation slot; failed requests keep their own slot as absent.
pub async fn fetch_station<F: RemoteFetcher + ?Sized>(
    fetcher: &F,
    requests: &[CategoryRequest],
    logger: &Logger,
) -> StationResponses {
    let documents = join_all(requests.iter().map(|request| fetcher.fetch(request))).await;

    let mut responses = StationResponses::new();
    for (request, document) in requests.iter().zip(documents) {
        let placed = match document.root.as_deref() {
            Some(root) => responses.insert_document(root, document.response),
            None => None,
        };
        match placed {
            Some(category) if category != request.category => warn!(
                logger,
                "{} answered as {}: {}", request.category, category, request.url
            ),
            Some(_) => {}
            None if !responses.contains(request.category) => {
                responses.insert(request.category, RawCategoryResponse::Absent)
            }
            None => {}
        }
    }
    responses
}
