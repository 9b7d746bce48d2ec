//! Filesystem utilities

use std::fs;
use std::io::{self, BufWriter, Write};
use std::path::Path;

use log::info;

/// Create a directory and all parent directories if they don't exist
pub fn ensure_dir_exists(path: &Path) -> io::Result<()> {
    if path.is_dir() {
        return Ok(());
    }
    fs::create_dir_all(path)?;
    info!("Created directory: {}", path.display());
    Ok(())
}

/// Write each item on its own line, replacing any existing file
pub fn write_lines<I, S>(path: &Path, lines: I) -> io::Result<()>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut writer = BufWriter::new(fs::File::create(path)?);
    for line in lines {
        writeln!(writer, "{}", line.as_ref())?;
    }
    writer.flush()
}
