use chrono::{DateTime, Utc};
use itertools::Itertools;
use serde::Serialize;
use tracing::instrument;

use crate::model::Album;

use super::sweep::{cmp_priority, Builder};
use super::TimelineError;

/// A contiguous time range over which the set of covering albums and the
/// dominant album do not change.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Segment {
    pub(crate) from: DateTime<Utc>,
    pub(crate) to: DateTime<Utc>,
    /// indices into the owning timeline's album list, index 0 is the
    /// dominant album and spans the whole segment; later entries may have
    /// stopped covering part of it
    pub(crate) albums: Vec<usize>,
}

/// Query-facing view of a (possibly clipped) segment: albums are filtered
/// to those covering the whole range and sorted by priority descending. A
/// missed range is a `PrioritySegment` with no albums at all.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PrioritySegment {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub albums: Vec<Album>,
}

/// Resolves which album is authoritative for any instant or range of time.
///
/// Built once from an owner's albums and frozen: segments never overlap,
/// are strictly ordered and skip over instants no album covers. Every
/// update path produces a fresh `Timeline`, a built one can be shared
/// read-only without synchronization.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Timeline {
    albums: Vec<Album>,
    segments: Vec<Segment>,
}

impl Timeline {
    /// Runs the sweep over `albums`, which must be sorted ascending by
    /// start date. An empty list builds an empty timeline.
    #[instrument(skip(albums), fields(num_albums = albums.len()), level = "debug")]
    pub fn build(albums: Vec<Album>) -> Result<Timeline, TimelineError> {
        if let Some((previous, album)) = albums
            .iter()
            .tuple_windows()
            .find(|(previous, album)| previous.start > album.start)
        {
            return Err(TimelineError::UnsortedInput {
                previous: previous.key(),
                previous_start: previous.start,
                album: album.key(),
                start: album.start,
            });
        }
        if let Some(album) = albums.iter().find(|album| album.end <= album.start) {
            return Err(TimelineError::InvalidAlbumRange {
                album: album.key(),
                start: album.start,
                end: album.end,
            });
        }
        let segments = Builder::new(&albums).run();
        debug_assert!(
            segments.windows(2).all(|pair| pair[0].to <= pair[1].from),
            "segments must be disjoint and ordered"
        );
        Ok(Timeline { albums, segments })
    }

    /// The album authoritative at `instant`, if any covers it.
    pub fn find_at(&self, instant: DateTime<Utc>) -> Option<&Album> {
        self.segment_covering(instant)
            .map(|segment| &self.albums[segment.albums[0]])
    }

    /// Every album covering `instant`, dominant or not, in no particular
    /// order.
    pub fn find_all_at(&self, instant: DateTime<Utc>) -> Vec<&Album> {
        self.segment_covering(instant)
            .map(|segment| {
                segment
                    .albums
                    .iter()
                    .map(|&idx| &self.albums[idx])
                    .filter(|album| album.covers(instant))
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Every time range the given album is authoritative for.
    #[instrument(skip(self), level = "trace")]
    pub fn find_for_album(&self, owner: &str, folder_name: &str) -> Vec<PrioritySegment> {
        self.segments
            .iter()
            .filter(|segment| self.albums[segment.albums[0]].has_key(owner, folder_name))
            .map(|segment| self.priority_segment(segment, segment.from, segment.to))
            .collect()
    }

    /// Splits `[start, end)` into the segments covering it and the gaps no
    /// album covers. Covered segments are clipped to the window; together
    /// with the missed ranges they tile the window exactly.
    #[instrument(skip(self), level = "trace")]
    pub fn find_between(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> (Vec<PrioritySegment>, Vec<PrioritySegment>) {
        let mut covered = Vec::new();
        let mut missed = Vec::new();
        if start >= end {
            return (covered, missed);
        }
        let first = self.segments.partition_point(|segment| segment.to <= start);
        let mut cursor = start;
        for segment in &self.segments[first..] {
            if segment.from >= end {
                break;
            }
            let from = segment.from.max(start);
            let to = segment.to.min(end);
            if cursor < from {
                missed.push(PrioritySegment {
                    start: cursor,
                    end: from,
                    albums: Vec::new(),
                });
            }
            covered.push(self.priority_segment(segment, from, to));
            cursor = to;
        }
        if cursor < end {
            missed.push(PrioritySegment {
                start: cursor,
                end,
                albums: Vec::new(),
            });
        }
        (covered, missed)
    }

    /// A new timeline over this one's albums plus `album`. Rebuilds from
    /// scratch, which is always equivalent to building over the union and
    /// cheap at catalog sizes (tens to low hundreds of albums per owner).
    #[instrument(skip(self, album), fields(album = %album.key()), level = "debug")]
    pub fn append_album(&self, album: Album) -> Result<Timeline, TimelineError> {
        let mut albums = self.albums.clone();
        albums.push(album);
        albums.sort_by(|a, b| a.start.cmp(&b.start));
        Timeline::build(albums)
    }

    /// The albums this timeline was built from, sorted ascending by start.
    pub fn albums(&self) -> &[Album] {
        &self.albums
    }

    pub fn is_empty(&self) -> bool {
        self.albums.is_empty()
    }

    /// Overall covered span: start of the first segment, end of the last.
    pub fn extent(&self) -> Option<(DateTime<Utc>, DateTime<Utc>)> {
        match (self.segments.first(), self.segments.last()) {
            (Some(first), Some(last)) => Some((first.from, last.to)),
            _ => None,
        }
    }

    /// The whole timeline as fully sorted segments.
    pub fn priority_segments(&self) -> Vec<PrioritySegment> {
        self.segments
            .iter()
            .map(|segment| self.priority_segment(segment, segment.from, segment.to))
            .collect()
    }

    fn segment_covering(&self, instant: DateTime<Utc>) -> Option<&Segment> {
        let idx = self.segments.partition_point(|segment| segment.to <= instant);
        self.segments
            .get(idx)
            .filter(|segment| segment.from <= instant)
    }

    fn priority_segment(
        &self,
        segment: &Segment,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> PrioritySegment {
        let mut albums: Vec<Album> = segment
            .albums
            .iter()
            .map(|&idx| &self.albums[idx])
            .filter(|album| album.covers_range(from, to))
            .cloned()
            .collect();
        albums.sort_by(|a, b| cmp_priority(b, a));
        PrioritySegment {
            start: from,
            end: to,
            albums,
        }
    }
}
