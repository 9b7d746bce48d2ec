//! WIMS Feed Core Library
//!
//! Shared utilities for the feed service:
//! - Configuration loading (XDG-compliant)
//! - File system utilities
//! - Application defaults

mod config;
pub mod fs;

pub use config::{config_candidates, find_config_file, load_config, ConfigSource};
pub use fs::{ensure_dir_exists, write_lines};

/// Application name used for XDG paths
pub const APP_NAME: &str = "wims-feed";

/// Config filename searched for in the standard locations
pub const CONFIG_FILE_NAME: &str = "wims-feed.toml";

/// Environment variable holding an explicit config path
pub const CONFIG_ENV_VAR: &str = "WIMS_FEED_CONFIG";

/// WIMS xsql endpoint root
pub const DEFAULT_BASE_URL: &str = "https://famprod.nwcg.gov/wims/xsql";

/// Legacy forecast file consumed by downstream forecast systems
pub const DEFAULT_REPORT_FILE: &str = "ndfd_predserv_fcst.txt";

/// Stations that produced no usable data, one id per line
pub const DEFAULT_ERROR_FILE: &str = "error_stns.txt";

pub const DEFAULT_STATION_PATH: &str = "station_list.json";

pub const DEFAULT_BUCKET: &str = "predictive-services-open-data-us-west-2";

/// Days of forecast data requested from WIMS
pub const DEFAULT_REQUEST_DAYS: i64 = 7;

/// Forecast days in the legacy report. WIMS only returns `DEFAULT_REQUEST_DAYS`,
/// the rest are sentinel filled.
pub const DEFAULT_FORECAST_DAYS: i64 = 9;
