use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::model::AlbumKey;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TimelineError {
    /// Albums handed to a build must already be sorted ascending by start date
    #[error("album {album} starts at {start}, before preceding album {previous} at {previous_start}")]
    UnsortedInput {
        previous: AlbumKey,
        previous_start: DateTime<Utc>,
        album: AlbumKey,
        start: DateTime<Utc>,
    },
    /// Album ranges are half-open, the end must be strictly after the start
    #[error("album {album} has an empty or inverted range: start {start}, end {end}")]
    InvalidAlbumRange {
        album: AlbumKey,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    },
}
