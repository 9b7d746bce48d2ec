use std::mem::replace;
use time::{macros::format_description, Date, Duration, OffsetDateTime};

use crate::FeedError;

/// `MM/DD` key used for the rows of a station report.
pub type DateKey = String;

/// An iterator yielding each date from the start date through the end date (inclusive).
#[derive(Clone, Eq, PartialEq, Copy, Debug)]
pub struct DateRange(pub Date, pub Date);

impl Iterator for DateRange {
    type Item = Date;
    fn next(&mut self) -> Option<Self::Item> {
        if self.0 > self.1 {
            return None;
        }
        match self.0.next_day() {
            Some(next) => Some(replace(&mut self.0, next)),
            // Date::MAX, nothing after it
            None => {
                let last = self.0;
                self.1 = Date::MIN;
                Some(last)
            }
        }
    }
}

/// Inclusive, ascending list of dates from `start` to `end`.
pub fn enumerate_dates(start: Date, end: Date) -> Vec<Date> {
    DateRange(start, end).collect()
}

/// Same as [`enumerate_dates`] for `MM/DD/YYYY` strings as WIMS writes them.
pub fn enumerate_date_strings(start: &str, end: &str) -> Result<Vec<Date>, FeedError> {
    Ok(enumerate_dates(
        parse_wims_date(start)?,
        parse_wims_date(end)?,
    ))
}

pub fn parse_wims_date(value: &str) -> Result<Date, FeedError> {
    Date::parse(value.trim(), format_description!("[month]/[day]/[year]"))
        .map_err(|e| FeedError::invalid_argument(format!("not a date '{}': {}", value, e)))
}

/// `MM/DD` key for a calendar date.
pub fn date_key(date: Date) -> DateKey {
    format!("{:02}/{:02}", u8::from(date.month()), date.day())
}

/// `MM/DD` key of a WIMS `MM/DD/YYYY` string, by dropping the year.
pub fn truncate_to_key(wims_date: &str) -> DateKey {
    let trimmed = wims_date.trim();
    let cut = trimmed.len().saturating_sub(5);
    trimmed.get(..cut).unwrap_or_default().to_string()
}

/// Date parameter format of the xsql endpoints, e.g. `16-Oct-26`.
pub fn format_request_date(date: Date) -> Result<String, FeedError> {
    Ok(date.format(format_description!(
        "[day]-[month repr:short]-[year repr:last_two]"
    ))?)
}

fn offset(date: Date, days: i64) -> Result<Date, FeedError> {
    date.checked_add(Duration::days(days))
        .ok_or_else(|| FeedError::invalid_argument(format!("{} + {} days overflows", date, days)))
}

/// The moment a run started. Every date window and the report header derive
/// from it, so one run never straddles two "todays".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunClock {
    pub run_date: Date,
    pub run_hour: u8,
}

impl RunClock {
    pub fn now_utc() -> Self {
        let now = OffsetDateTime::now_utc();
        Self {
            run_date: now.date(),
            run_hour: now.hour(),
        }
    }

    pub fn new(run_date: Date, run_hour: u8) -> Self {
        Self { run_date, run_hour }
    }

    pub fn days_from_run(&self, days: i64) -> Result<Date, FeedError> {
        offset(self.run_date, days)
    }

    /// `YYYYMMDD` for the report header.
    pub fn header_date(&self) -> String {
        format!(
            "{:04}{:02}{:02}",
            self.run_date.year(),
            u8::from(self.run_date.month()),
            self.run_date.day()
        )
    }

    /// `HH` for the report header.
    pub fn header_hour(&self) -> String {
        format!("{:02}", self.run_hour)
    }
}

/// Date windows of the legacy report relative to the run date.
///
/// The grid runs from yesterday through `forecast_days` ahead. Observations
/// cover yesterday and today, forecasts tomorrow onward.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReportWindow {
    pub clock: RunClock,
    pub forecast_days: i64,
}

impl ReportWindow {
    pub fn new(clock: RunClock, forecast_days: i64) -> Result<Self, FeedError> {
        if forecast_days < 1 {
            return Err(FeedError::invalid_argument(format!(
                "forecast days must be positive, got {}",
                forecast_days
            )));
        }
        Ok(Self {
            clock,
            forecast_days,
        })
    }

    /// Every date of the output grid, ascending.
    pub fn grid_dates(&self) -> Result<Vec<Date>, FeedError> {
        Ok(enumerate_dates(
            self.clock.days_from_run(-1)?,
            self.clock.days_from_run(self.forecast_days)?,
        ))
    }

    pub fn grid_keys(&self) -> Result<Vec<DateKey>, FeedError> {
        Ok(self.grid_dates()?.into_iter().map(date_key).collect())
    }

    pub fn forecast_dates(&self) -> Result<Vec<Date>, FeedError> {
        Ok(enumerate_dates(
            self.clock.days_from_run(1)?,
            self.clock.days_from_run(self.forecast_days)?,
        ))
    }

    pub fn observation_dates(&self) -> Result<Vec<Date>, FeedError> {
        Ok(enumerate_dates(
            self.clock.days_from_run(-1)?,
            self.clock.run_date,
        ))
    }

    /// Dates a category is expected to cover, as report keys.
    pub fn expected_keys(&self, forecast: bool) -> Result<Vec<DateKey>, FeedError> {
        let dates = if forecast {
            self.forecast_dates()?
        } else {
            self.observation_dates()?
        };
        Ok(dates.into_iter().map(date_key).collect())
    }
}
