use smallvec::SmallVec;

use crate::{
    time::{Delta, Time},
    units::{Bytes, BytesPerSec},
};

/// A constant-bandwidth interval of a connection's transfer.
///
/// A segment is open until a later segment replaces it, at which point it is closed at the start of
/// its successor.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Segment {
    bandwidth: BytesPerSec,
    start: Time,
    end: Option<Time>,
}

impl Segment {
    pub fn new(bandwidth: BytesPerSec, start: Time) -> Self {
        Self {
            bandwidth,
            start,
            end: None,
        }
    }

    pub fn bandwidth(&self) -> BytesPerSec {
        self.bandwidth
    }

    pub fn start(&self) -> Time {
        self.start
    }

    pub fn end(&self) -> Option<Time> {
        self.end
    }

    pub fn is_open(&self) -> bool {
        self.end.is_none()
    }

    pub(crate) fn close(&mut self, at: Time) {
        assert!(self.is_open(), "segment closed twice");
        self.end = Some(at);
    }

    /// Time spent in this segment. An open segment runs until `now`.
    pub fn duration(&self, now: Time) -> Delta {
        self.end.unwrap_or(now) - self.start
    }

    /// Bytes moved during this segment. Non-positive bandwidths are not special-cased.
    pub fn bytes_delivered(&self, now: Time) -> Bytes {
        self.duration(now).at(self.bandwidth)
    }
}

// Most connections only see a handful of bandwidth updates
type SegmentList = SmallVec<[Segment; 4]>;

/// The ordered, append-only segment history of one connection.
#[derive(Debug, Clone, Default)]
pub struct Segments {
    inner: SegmentList,
}

impl Segments {
    delegate::delegate! {
        to self.inner {
            pub fn len(&self) -> usize;
            pub fn is_empty(&self) -> bool;
            pub fn last(&self) -> Option<&Segment>;
            pub fn iter(&self) -> std::slice::Iter<'_, Segment>;
        }
    }

    /// Appends `segment`, closing the current last segment at its start.
    pub(crate) fn push(&mut self, segment: Segment) {
        if let Some(prev) = self.inner.last_mut() {
            assert!(prev.start <= segment.start);
            prev.close(segment.start);
        }
        self.inner.push(segment);
    }

    /// All segments except the last, i.e. the closed ones.
    pub fn closed(&self) -> &[Segment] {
        match self.inner.split_last() {
            Some((_, closed)) => closed,
            None => &[],
        }
    }
}
