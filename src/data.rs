use crate::{
    time::Time,
    units::{Bytes, BytesPerSec},
};

/// A snapshot of a connection's transfer state.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Progress {
    /// The total amount of data to transfer.
    pub total: Bytes,
    /// Bytes delivered so far, including the open segment.
    pub delivered: Bytes,
    /// The bandwidth of the open segment.
    pub bandwidth: BytesPerSec,
    /// The number of bandwidth segments recorded.
    pub segments: usize,
    /// The projected completion time, or `None` when the current bandwidth makes it unbounded.
    pub projected_end: Option<Time>,
    /// The time this snapshot was taken.
    pub now: Time,
    /// Whether the transfer has completed at `now`.
    pub finished: bool,
}

impl Progress {
    /// Bytes still to deliver at `now`. Over-delivery is reported as zero.
    pub fn remaining(&self) -> Bytes {
        if self.delivered >= self.total {
            Bytes::ZERO
        } else {
            self.total - self.delivered
        }
    }
}
