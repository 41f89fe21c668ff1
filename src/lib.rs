pub mod condition;
pub mod fit;
pub mod gpx_io;
pub mod map;
pub mod profile;
pub mod stats;
pub mod track;
pub mod units;

use std::path::PathBuf;

use thiserror::Error;

/// Errors produced while reading, transforming, or rendering a track.
#[derive(Debug, Error)]
pub enum Error {
    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("not a valid FIT file: {0}")]
    FitDecode(String),
    #[error("FIT file contains no record messages")]
    NoRecordMessages,
    #[error("failed to write GPX: {0}")]
    GpxWrite(String),
    #[error("failed to parse GPX: {0}")]
    GpxRead(String),
    #[error("invalid API key file: {0}")]
    ApiKey(String),
    #[error("failed to write report: {0}")]
    ReportWrite(#[source] std::io::Error),
    #[error("track contains no points")]
    EmptyTrack,
    #[error("track has fewer than two timestamped points")]
    TrackTooShort,
    #[error("track has no GPS elevation data")]
    NoElevationData,
    #[error("map server responded with HTTP status {0}")]
    HttpStatus(u16),
    #[error("map request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("rendering failed: {0}")]
    Render(String),
}

pub type Result<T> = std::result::Result<T, Error>;
