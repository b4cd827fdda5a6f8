//! Human-readable book snapshots on disk. Purely observational; nothing
//! feeds back into the loop. The logs directory is passed explicitly by
//! the caller.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use chrono::Local;

use crate::book::InfoBook;

/// Write a timestamped snapshot of the book under `logs_dir` and return
/// the file path.
pub fn write_report(logs_dir: &Path, log_name: &str, book: &InfoBook) -> io::Result<PathBuf> {
    fs::create_dir_all(logs_dir)?;

    let now = Local::now();
    let path = logs_dir.join(format!(
        "{}_{log_name}_info_book.txt",
        now.format("%Y%m%d_%H%M%S")
    ));

    let mut lines = vec![
        "=== INFO BOOK REPORT ===".to_string(),
        format!("Timestamp: {}", now.to_rfc3339()),
        format!("Goal: {}", book.goal),
        format!("Complete: {}", if book.is_complete() { "Yes" } else { "No" }),
        String::new(),
    ];
    lines.push(book.summary());

    fs::write(&path, lines.join("\n"))?;
    Ok(path)
}
