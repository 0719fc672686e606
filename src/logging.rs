//! Log setup. The renderer owns the terminal, so logs go to a file.

use std::fs::{self, File};
use std::path::PathBuf;
use std::sync::Mutex;
use tracing_subscriber::fmt::writer::BoxMakeWriter;
use tracing_subscriber::EnvFilter;

pub const LOG_ENV: &str = "GLOBEFOLIO_LOG";
const DEFAULT_DIRECTIVE: &str = "globefolio=info";

pub fn default_log_path() -> PathBuf {
    dirs::cache_dir()
        .unwrap_or_else(std::env::temp_dir)
        .join("globefolio")
        .join("globefolio.log")
}

fn filter() -> EnvFilter {
    EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(DEFAULT_DIRECTIVE))
}

/// Install the global subscriber. Returns the log file in use, if one could be opened.
pub fn init(path: Option<PathBuf>) -> Option<PathBuf> {
    let path = path.unwrap_or_else(default_log_path);
    let file = path
        .parent()
        .map_or(Ok(()), fs::create_dir_all)
        .and_then(|_| File::options().create(true).append(true).open(&path));

    let (writer, opened) = match file {
        Ok(file) => (BoxMakeWriter::new(Mutex::new(file)), Some(path)),
        Err(_) => (BoxMakeWriter::new(std::io::sink), None),
    };

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter())
        .with_writer(writer)
        .with_ansi(false)
        .try_init();

    opened
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_path_is_under_app_dir() {
        assert!(default_log_path().ends_with("globefolio/globefolio.log"));
    }

    #[test]
    fn init_creates_missing_directories() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("run.log");
        assert_eq!(init(Some(path.clone())), Some(path.clone()));
        assert!(path.exists());
    }
}
