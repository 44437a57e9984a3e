use std::fmt::Display;

use chrono::{DateTime, TimeDelta, Utc};
use serde::Serialize;

use crate::catalog::TimelineError;

/// Identity of an album within a catalog: folder names are unique per owner
/// and never change after creation.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct AlbumKey {
    pub owner: String,
    pub folder_name: String,
}

impl Display for AlbumKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_fmt(format_args!("AlbumKey({}/{})", self.owner, self.folder_name))
    }
}

/// A named time range that media can be assigned to. Never mutated once
/// constructed; timeline updates always go through a rebuild.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct Album {
    pub owner: String,
    pub folder_name: String,
    /// inclusive
    pub start: DateTime<Utc>,
    /// exclusive
    pub end: DateTime<Utc>,
}

impl Album {
    pub fn new(
        owner: String,
        folder_name: String,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Album, TimelineError> {
        let album = Album {
            owner,
            folder_name,
            start,
            end,
        };
        if album.end <= album.start {
            return Err(TimelineError::InvalidAlbumRange {
                album: album.key(),
                start: album.start,
                end: album.end,
            });
        }
        Ok(album)
    }

    pub fn key(&self) -> AlbumKey {
        AlbumKey {
            owner: self.owner.clone(),
            folder_name: self.folder_name.clone(),
        }
    }

    pub fn has_key(&self, owner: &str, folder_name: &str) -> bool {
        self.owner == owner && self.folder_name == folder_name
    }

    pub fn duration(&self) -> TimeDelta {
        self.end - self.start
    }

    pub fn covers(&self, instant: DateTime<Utc>) -> bool {
        self.start <= instant && instant < self.end
    }

    /// Whether the whole of `[from, to)` lies inside this album's range
    pub fn covers_range(&self, from: DateTime<Utc>, to: DateTime<Utc>) -> bool {
        self.start <= from && to <= self.end
    }
}
