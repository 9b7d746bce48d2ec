mod categories;
mod dates;
mod header;
mod merge;
mod normalize;
mod report_writer;
mod station_report;

pub use categories::*;
pub use dates::*;
pub use header::*;
pub use merge::*;
pub use normalize::*;
pub use report_writer::*;
pub use station_report::*;
