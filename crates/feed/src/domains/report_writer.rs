use slog::{info, warn, Logger};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use crate::{FeedError, StationReport, VALUES_PER_DATE};

/// Label of the date axis line.
pub const DATE_LABEL: &str = "Fcst Dy";

/// Left most column labels, one per value of a date vector.
pub const STN_LABELS: [&str; VALUES_PER_DATE] = [
    "Max RH (%)",
    "Min Temp (F)",
    "Min RH (%)",
    "Max Temp (F)",
    "WSpd (knt)",
    "BI",
    "ERC",
    "IC",
    "10-hr fuel (%)",
    "100-hr fuel (%)",
    "1000-hr fuel (%)",
];

/// Render one station block in the fixed-width WFAS layout, or `None` when
/// some date doesn't hold a full vector of values.
pub fn render_station(report: &StationReport) -> Option<String> {
    let dates = report.grid.dates();
    let columns = dates
        .iter()
        .map(|date| {
            report
                .grid
                .values(date)
                .filter(|values| values.len() >= VALUES_PER_DATE)
        })
        .collect::<Option<Vec<_>>>()?;

    let h = &report.header;
    let mut block = format!(
        "{:<20}{:<8}{:<8}{:<9}{:<10}{:<5}\n",
        format!("*{}", h.station_name),
        h.station_id,
        h.latitude,
        h.longitude,
        h.run_date,
        h.run_hour
    );

    block.push_str(&format!("{:<20}", DATE_LABEL));
    for date in dates {
        block.push_str(&format!("{:<9}", date));
    }
    block.push('\n');

    for (i, label) in STN_LABELS.iter().enumerate() {
        block.push_str(&format!("{:<22}", label));
        for values in &columns {
            block.push_str(&format!("{:<9}", values[i]));
        }
        block.push('\n');
    }
    block.push('\n');
    Some(block)
}

/// Write every renderable station in order. Returns the number written.
pub fn write_report<W: Write>(
    reports: &[StationReport],
    mut out: W,
    logger: &Logger,
) -> Result<usize, FeedError> {
    let mut written = 0;
    for report in reports {
        match render_station(report) {
            Some(block) => {
                out.write_all(block.as_bytes())?;
                written += 1;
            }
            None => warn!(
                logger,
                "skipping station {}: incomplete date grid", report.header.station_id
            ),
        }
    }
    out.flush()?;
    Ok(written)
}

pub fn write_report_file(
    path: &Path,
    reports: &[StationReport],
    logger: &Logger,
) -> Result<usize, FeedError> {
    let file = File::create(path)?;
    let written = write_report(reports, BufWriter::new(file), logger)?;
    info!(logger, "wrote {} stations to {}", written, path.display());
    Ok(written)
}
