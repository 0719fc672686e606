use std::path::PathBuf;

/// Errors raised while loading settings or optional globe assets.
///
/// None of these are fatal to a view: callers log them and carry on
/// without the feature that failed.
#[derive(Debug, thiserror::Error)]
pub enum GlobeError {
    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("fetch failed for {url}: {reason}")]
    Fetch { url: String, reason: String },

    #[error("image decode failed: {0}")]
    Decode(#[from] image::ImageError),

    #[error("invalid geojson: {0}")]
    GeoJson(String),

    #[error("config error in {path}: {reason}")]
    Config { path: PathBuf, reason: String },

    #[error("load cancelled")]
    Cancelled,
}

impl From<serde_json::Error> for GlobeError {
    fn from(e: serde_json::Error) -> Self {
        GlobeError::GeoJson(e.to_string())
    }
}

pub type Result<T> = std::result::Result<T, GlobeError>;
