use chrono::Local;
use std::fs::OpenOptions;
use std::io::{self, Write};

/// Append one `<timestamp>: <name>` line to the deploy log.
///
/// The hour is on a 12-hour clock with no AM/PM marker; the log has always
/// been written that way and downstream readers key off the exact shape.
pub fn append(path: &str, repo_name: &str) -> io::Result<()> {
    let stamp = Local::now().format("%Y-%m-%d %I:%M:%S");

    let mut file = OpenOptions::new().create(true).append(true).open(path)?;
    writeln!(file, "{stamp}: {repo_name}")?;

    Ok(())
}
