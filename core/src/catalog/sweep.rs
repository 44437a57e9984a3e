use std::cmp::{Ordering, Reverse};
use std::collections::BinaryHeap;

use chrono::{DateTime, Utc};

use crate::model::Album;

use super::timeline::Segment;

/// Total priority order over albums. The higher-ranking album is
/// authoritative wherever two albums overlap:
/// shorter duration first, then earlier start, then earlier end, then the
/// lexicographically greater folder name.
///
/// The folder name fallback points the other way than the rest of the chain
/// on purpose, existing catalogs depend on the resulting order.
pub(crate) fn cmp_priority(a: &Album, b: &Album) -> Ordering {
    let ord = b
        .duration()
        .cmp(&a.duration())
        .then_with(|| b.start.cmp(&a.start))
        .then_with(|| b.end.cmp(&a.end))
        .then_with(|| a.folder_name.cmp(&b.folder_name));
    debug_assert!(
        ord != Ordering::Equal || (a.owner == b.owner && a.folder_name == b.folder_name),
        "priority order must be strict, got two distinct albums comparing equal: {} and {}",
        a.key(),
        b.key()
    );
    ord
}

/// Max-heap entry: the root is the currently dominant open album.
#[derive(Debug, Clone)]
struct ByPriority {
    album: Album,
    idx: usize,
}

impl Ord for ByPriority {
    fn cmp(&self, other: &Self) -> Ordering {
        cmp_priority(&self.album, &other.album)
    }
}

impl PartialOrd for ByPriority {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for ByPriority {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for ByPriority {}

/// Min-heap entry (through `Reverse`): the root is the next album to stop
/// covering the sweep cursor. Ties resolved by arena index to keep one run
/// reproducible.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
struct ByClose {
    end: DateTime<Utc>,
    idx: usize,
}

/// A segment being accumulated between two priority boundaries.
#[derive(Debug)]
struct Draft {
    from: DateTime<Utc>,
    /// arena indices, index 0 is the dominant album
    albums: Vec<usize>,
}

/// Sweep cursor over albums sorted ascending by start. Albums are opened in
/// start order and closed in end order; the dominant album can only change
/// at one of those boundaries, so segments are emitted exactly there.
///
/// Both heaps carry arena indices instead of references into the album
/// list. Removal from the priority heap is deferred: a closed album keeps
/// its entry until it surfaces at the root, where `purge_closed` drops it.
pub(crate) struct Builder<'a> {
    albums: &'a [Album],
    by_priority: BinaryHeap<ByPriority>,
    by_close: BinaryHeap<Reverse<ByClose>>,
    open: Vec<bool>,
    current: Option<Draft>,
    segments: Vec<Segment>,
}

impl<'a> Builder<'a> {
    pub(crate) fn new(albums: &'a [Album]) -> Self {
        Builder {
            albums,
            by_priority: BinaryHeap::with_capacity(albums.len()),
            by_close: BinaryHeap::with_capacity(albums.len()),
            open: vec![false; albums.len()],
            current: None,
            segments: Vec::new(),
        }
    }

    pub(crate) fn run(mut self) -> Vec<Segment> {
        for idx in 0..self.albums.len() {
            let start = self.albums[idx].start;
            self.close_albums_ending_by(start);
            self.open_album(idx);
        }
        self.close_albums_ending_by(DateTime::<Utc>::MAX_UTC);
        debug_assert!(self.current.is_none(), "all segments must be flushed");
        debug_assert!(self.by_close.is_empty(), "all albums must be closed");
        self.segments
    }

    /// Remove every album whose coverage ends at or before `cutoff` from
    /// both heaps, one boundary instant at a time. A boundary only closes
    /// the accumulating segment if the dominant album ends there; albums
    /// sharing one end instant are coalesced into a single boundary.
    fn close_albums_ending_by(&mut self, cutoff: DateTime<Utc>) {
        while let Some(&Reverse(next)) = self.by_close.peek() {
            if next.end > cutoff {
                break;
            }
            let boundary = next.end;
            let mut dominant_closed = false;
            while let Some(&Reverse(head)) = self.by_close.peek() {
                if head.end != boundary {
                    break;
                }
                self.by_close.pop();
                self.open[head.idx] = false;
                if let Some(draft) = &self.current {
                    if draft.albums[0] == head.idx {
                        dominant_closed = true;
                    }
                }
            }
            self.purge_closed();
            if dominant_closed {
                self.close_current(boundary);
                if self.by_priority.peek().is_some() {
                    self.start_segment(boundary);
                }
            }
        }
    }

    fn open_album(&mut self, idx: usize) {
        let start = self.albums[idx].start;
        let end = self.albums[idx].end;
        self.open[idx] = true;
        self.by_close.push(Reverse(ByClose { end, idx }));
        self.by_priority.push(ByPriority {
            album: self.albums[idx].clone(),
            idx,
        });

        let root = self
            .by_priority
            .peek()
            .expect("priority heap cannot be empty after a push")
            .idx;
        if root == idx && self.current.is_some() {
            // the new album outranks everything open, the dominant album
            // changes exactly at its start
            self.close_current(start);
        } else if let Some(draft) = &mut self.current {
            draft.albums.push(idx);
        }
        if self.current.is_none() && !self.next_shares_start(idx) {
            self.start_segment(start);
        }
    }

    /// Albums sharing one start instant are opened before any segment
    /// snapshot is taken, so the snapshot ranks all of them at once.
    fn next_shares_start(&self, idx: usize) -> bool {
        self.albums
            .get(idx + 1)
            .is_some_and(|next| next.start == self.albums[idx].start)
    }

    fn start_segment(&mut self, from: DateTime<Utc>) {
        debug_assert!(self.current.is_none(), "a segment is already open");
        let root = self
            .by_priority
            .peek()
            .expect("starting a segment requires an open album")
            .idx;
        let mut albums = vec![root];
        albums.extend(
            self.by_priority
                .iter()
                .filter(|entry| entry.idx != root && self.open[entry.idx])
                .map(|entry| entry.idx),
        );
        self.current = Some(Draft { from, albums });
    }

    /// Flush the accumulating segment, ending it at `to`. Drafts spanning
    /// no time at all occur when a closing boundary coincides with the next
    /// album's start and are dropped.
    fn close_current(&mut self, to: DateTime<Utc>) {
        let draft = self
            .current
            .take()
            .expect("closing a segment requires one to be open");
        if to > draft.from {
            self.segments.push(Segment {
                from: draft.from,
                to,
                albums: draft.albums,
            });
        }
    }

    fn purge_closed(&mut self) {
        while let Some(head) = self.by_priority.peek() {
            if self.open[head.idx] {
                break;
            }
            self.by_priority.pop();
        }
    }
}
