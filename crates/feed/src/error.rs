#[derive(thiserror::Error, Debug)]
pub enum FeedError {
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
    #[error("No usable header for station {0}")]
    NoUsableHeader(String),
    #[error("Failed to format time string: {0}")]
    TimeFormat(#[from] time::error::Format),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to parse station list: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Failed to decode provider xml: {0}")]
    Xml(#[from] serde_xml_rs::Error),
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}

impl FeedError {
    pub fn invalid_argument(message: impl std::fmt::Display) -> Self {
        FeedError::InvalidArgument(message.to_string())
    }
}
