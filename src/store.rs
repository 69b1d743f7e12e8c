use chrono::Local;
use rusqlite::{Connection, OpenFlags};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{info, warn};

use crate::error::{Error, Result};
use crate::timestamp::{utc_to_webkit, webkit_to_utc, TimeWindow};
use crate::visit::Visit;

/// Resolve the OS-conventional Chrome history path.
pub fn default_history_path() -> Result<PathBuf> {
    let system = env::consts::OS;
    let home = env::var("HOME")
        .or_else(|_| env::var("USERPROFILE"))
        .map_err(|_| Error::StoreUnavailable {
            path: PathBuf::new(),
            reason: "no home directory in environment".to_string(),
        })?;

    let path = match system {
        "windows" => {
            PathBuf::from(home).join("AppData/Local/Google/Chrome/User Data/Default/History")
        }
        "macos" => {
            PathBuf::from(home).join("Library/Application Support/Google/Chrome/Default/History")
        }
        "linux" => PathBuf::from(home).join(".config/google-chrome/Default/History"),
        other => {
            return Err(Error::StoreUnavailable {
                path: PathBuf::new(),
                reason: format!("unsupported operating system '{other}'"),
            })
        }
    };

    info!(action = "resolve", component = "history_path", path = ?path, "History store path resolved");
    Ok(path)
}

/// Scratch copy of the history store, removed on drop. The browser keeps a
/// lock on the live file, so queries always run against a private copy.
#[derive(Debug)]
pub struct ScopedCopy {
    path: PathBuf,
}

impl ScopedCopy {
    /// Copy the store to `temp_path` (or a default next to the system temp
    /// dir). A missing source or a failed copy is fatal.
    pub fn create(history_path: &Path, temp_path: Option<&Path>) -> Result<Self> {
        let start_time = Instant::now();

        let destination = temp_path
            .map(Path::to_path_buf)
            .unwrap_or_else(|| env::temp_dir().join("circada_history_copy.db"));

        info!(action = "copy", component = "store_copy", source = ?history_path, destination = ?destination, "Copying history store");

        if !history_path.exists() {
            return Err(Error::StoreUnavailable {
                path: history_path.to_path_buf(),
                reason: "history file not found".to_string(),
            });
        }

        fs::copy(history_path, &destination).map_err(|e| Error::StoreUnavailable {
            path: history_path.to_path_buf(),
            reason: format!("copy failed: {e}"),
        })?;

        info!(
            action = "complete",
            component = "store_copy",
            duration_ms = start_time.elapsed().as_millis(),
            "Store copy completed"
        );
        Ok(Self { path: destination })
    }

    /// Open the copy read-only.
    pub fn open(&self) -> Result<Connection> {
        let conn = Connection::open_with_flags(
            &self.path,
            OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )?;
        info!(action = "open", component = "store_copy", path = ?self.path, "Connected to store copy");
        Ok(conn)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for ScopedCopy {
    fn drop(&mut self) {
        if let Err(e) = fs::remove_file(&self.path) {
            warn!(action = "cleanup", component = "store_copy", path = ?self.path, error = %e, "Failed to remove store copy");
        }
    }
}

/// Extract visits inside the window, ordered by visit time ascending.
/// Returns the visits plus the count of rows skipped for a timestamp that
/// doesn't convert to a real instant.
pub fn extract_visits(conn: &Connection, window: &TimeWindow) -> Result<(Vec<Visit>, u64)> {
    let start_time = Instant::now();
    info!(action = "start", component = "extractor", "Extracting visits");

    let mut statement = conn.prepare(
        "SELECT visits.visit_time, urls.url, urls.title
         FROM visits JOIN urls ON visits.url = urls.id
         WHERE visits.visit_time >= ?1 AND visits.visit_time <= ?2
         ORDER BY visits.visit_time ASC",
    )?;

    let mut visits = Vec::new();
    let mut skipped = 0u64;
    let rows = statement.query_map(
        [utc_to_webkit(window.start), utc_to_webkit(window.end)],
        |row| {
            let raw_time: i64 = row.get(0)?;
            let url: String = row.get(1)?;
            let title: Option<String> = row.get(2)?;
            Ok((raw_time, url, title))
        },
    )?;

    for row in rows {
        let (raw_time, url, title) = row?;
        match webkit_to_utc(raw_time) {
            Some(time) => {
                let title = title.filter(|t| !t.is_empty());
                visits.push(Visit::new(&url, title, time.with_timezone(&Local)));
            }
            None => {
                skipped += 1;
                warn!(
                    action = "skip",
                    component = "extractor",
                    raw_time,
                    url,
                    "Skipping row with unconvertible timestamp"
                );
            }
        }
    }

    info!(
        action = "complete",
        component = "extractor",
        visit_count = visits.len(),
        skipped,
        duration_ms = start_time.elapsed().as_millis(),
        "Visit extraction completed"
    );
    Ok((visits, skipped))
}
