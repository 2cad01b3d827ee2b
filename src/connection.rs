use crate::{
    data::Progress,
    error::Error,
    segment::{Segment, Segments},
    time::Time,
    units::{Bytes, BytesPerSec},
};

/// Identifies a connection: the requesting rule and its source and destination sites.
#[derive(
    Debug,
    Clone,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    derive_new::new,
    serde::Serialize,
    serde::Deserialize,
)]
pub struct ConnectionKey {
    pub burro_id: String,
    pub src: String,
    pub dst: String,
}

impl ConnectionKey {
    /// The underscore-joined id used by the update endpoint and in log lines.
    ///
    /// The join is lossy: `("a_b", "c", "d")` and `("a", "b_c", "d")` render the same id, so the
    /// structured key is what identifies a connection.
    pub fn legacy_id(&self) -> String {
        format!("{}_{}_{}", self.burro_id, self.src, self.dst)
    }
}

impl std::fmt::Display for ConnectionKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.legacy_id())
    }
}

/// A simulated transfer of a fixed amount of data over a sequence of bandwidth segments.
#[derive(Debug, Clone)]
pub struct Connection {
    key: ConnectionKey,
    total: Bytes,
    segments: Segments,
}

impl Connection {
    pub fn new(key: ConnectionKey, total: Bytes) -> Self {
        Self {
            key,
            total,
            segments: Segments::default(),
        }
    }

    pub fn key(&self) -> &ConnectionKey {
        &self.key
    }

    pub fn total(&self) -> Bytes {
        self.total
    }

    pub fn segments(&self) -> &Segments {
        &self.segments
    }

    /// Starts a new segment at `now` with the given bandwidth, closing the current one.
    ///
    /// A `now` earlier than the current segment's start is raised to it, so segment starts never
    /// decrease.
    pub fn update(&mut self, bandwidth: BytesPerSec, now: Time) {
        let start = match self.segments.last() {
            Some(last) => now.max(last.start()),
            None => now,
        };
        if !bandwidth.is_positive() {
            tracing::warn!(
                connection = %self.key,
                bandwidth = %bandwidth,
                "non-positive bandwidth; transfer cannot progress"
            );
        }
        self.segments.push(Segment::new(bandwidth, start));
    }

    fn active(&self) -> Result<&Segment, Error> {
        self.segments
            .last()
            .ok_or_else(|| Error::UninitializedConnection {
                id: self.key.legacy_id(),
            })
    }

    /// The time at which all of the data is projected to be delivered.
    ///
    /// Bytes moved by the closed segments are subtracted from the total and the remainder is
    /// delivered at the active segment's bandwidth, starting from its start. A zero bandwidth
    /// yields `+inf` when data remains and `-inf` otherwise.
    pub fn projected_end_time(&self, now: Time) -> Result<Time, Error> {
        let active = self.active()?;
        let delivered: Bytes = self
            .segments
            .closed()
            .iter()
            .map(|s| s.bytes_delivered(now))
            .sum();
        let remaining = self.total - delivered;
        let bandwidth = active.bandwidth();
        if bandwidth == BytesPerSec::ZERO {
            // Division would give NaN for an exactly covered total
            return Ok(if remaining > Bytes::ZERO {
                Time::INFINITY
            } else {
                Time::NEG_INFINITY
            });
        }
        Ok(active.start() + bandwidth.length(remaining))
    }

    pub fn is_finished(&self, now: Time) -> Result<bool, Error> {
        Ok(self.projected_end_time(now)? <= now)
    }

    /// Bytes delivered by every segment up to `now`, the active one included.
    pub fn delivered(&self, now: Time) -> Bytes {
        self.segments.iter().map(|s| s.bytes_delivered(now)).sum()
    }

    pub fn progress(&self, now: Time) -> Result<Progress, Error> {
        let active = self.active()?;
        let projected_end = self.projected_end_time(now)?;
        Ok(Progress {
            total: self.total,
            delivered: self.delivered(now),
            bandwidth: active.bandwidth(),
            segments: self.segments.len(),
            projected_end: projected_end.is_finite().then_some(projected_end),
            now,
            finished: projected_end <= now,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key() -> ConnectionKey {
        ConnectionKey::new("r1".into(), "siteA".into(), "siteB".into())
    }

    fn conn(total: f64) -> Connection {
        Connection::new(key(), Bytes::new(total))
    }

    #[test]
    fn single_segment() {
        let mut c = conn(1_000.0);
        c.update(BytesPerSec::new(100.0), Time::new(0.0));
        assert_eq!(c.projected_end_time(Time::new(0.0)), Ok(Time::new(10.0)));
        assert_eq!(c.is_finished(Time::new(0.0)), Ok(false));
        assert_eq!(c.is_finished(Time::new(9.5)), Ok(false));
        assert_eq!(c.is_finished(Time::new(10.0)), Ok(true));
    }

    #[test]
    fn multi_segment_accumulates() {
        let (t0, t1) = (Time::new(2.0), Time::new(6.0));
        let (b1, b2) = (BytesPerSec::new(50.0), BytesPerSec::new(25.0));
        let mut c = conn(1_000.0);
        c.update(b1, t0);
        c.update(b2, t1);
        // 200 bytes in the first segment, 800 left at 25 B/s
        assert_eq!(c.projected_end_time(Time::new(7.0)), Ok(Time::new(38.0)));
        assert_eq!(c.delivered(Time::new(10.0)), Bytes::new(300.0));
    }

    #[test]
    fn zero_total_finishes_immediately() {
        let mut c = conn(0.0);
        c.update(BytesPerSec::new(10.0), Time::new(3.0));
        assert_eq!(c.projected_end_time(Time::new(3.0)), Ok(Time::new(3.0)));
        assert_eq!(c.is_finished(Time::new(3.0)), Ok(true));
    }

    #[test]
    fn uninitialized_is_an_error() {
        let c = conn(10.0);
        let err = Error::UninitializedConnection {
            id: "r1_siteA_siteB".into(),
        };
        assert_eq!(c.is_finished(Time::ZERO), Err(err.clone()));
        assert_eq!(c.progress(Time::ZERO), Err(err));
    }

    #[test]
    fn zero_bandwidth_never_finishes() {
        let mut c = conn(10.0);
        c.update(BytesPerSec::ZERO, Time::ZERO);
        assert_eq!(c.projected_end_time(Time::ZERO), Ok(Time::INFINITY));
        assert_eq!(c.is_finished(Time::new(1e12)), Ok(false));
    }

    #[test]
    fn zero_bandwidth_after_full_delivery_is_finished() {
        let mut c = conn(10.0);
        c.update(BytesPerSec::new(10.0), Time::ZERO);
        c.update(BytesPerSec::ZERO, Time::new(2.0));
        assert_eq!(c.projected_end_time(Time::new(2.0)), Ok(Time::NEG_INFINITY));
        assert_eq!(c.is_finished(Time::new(2.0)), Ok(true));
    }

    #[test]
    fn negative_bandwidth_divides_plainly() {
        let mut c = conn(10.0);
        c.update(BytesPerSec::new(-5.0), Time::ZERO);
        assert_eq!(c.projected_end_time(Time::ZERO), Ok(Time::new(-2.0)));
        assert_eq!(c.is_finished(Time::ZERO), Ok(true));
    }

    #[test]
    fn negative_zero_bandwidth_is_a_stall() {
        let mut c = conn(10.0);
        c.update(BytesPerSec::new(-0.0), Time::ZERO);
        assert_eq!(c.projected_end_time(Time::ZERO), Ok(Time::INFINITY));
        assert_eq!(c.is_finished(Time::new(1e12)), Ok(false));
    }

    #[test]
    fn over_delivery_projects_into_the_past() {
        let mut c = conn(10.0);
        c.update(BytesPerSec::new(10.0), Time::ZERO);
        c.update(BytesPerSec::new(5.0), Time::new(4.0));
        // 40 bytes already moved, 30 over the total
        assert_eq!(c.projected_end_time(Time::new(4.0)), Ok(Time::new(-2.0)));
    }

    #[test]
    fn starts_never_decrease() {
        let mut c = conn(10.0);
        c.update(BytesPerSec::new(1.0), Time::new(5.0));
        c.update(BytesPerSec::new(1.0), Time::new(4.0));
        let starts: Vec<_> = c.segments().iter().map(Segment::start).collect();
        assert_eq!(starts, vec![Time::new(5.0), Time::new(5.0)]);
        assert_eq!(c.segments().closed()[0].end(), Some(Time::new(5.0)));
    }

    #[test]
    fn progress_snapshot() {
        let mut c = conn(1_000.0);
        c.update(BytesPerSec::new(100.0), Time::ZERO);
        let p = c.progress(Time::new(4.0)).unwrap();
        assert_eq!(p.delivered, Bytes::new(400.0));
        assert_eq!(p.remaining(), Bytes::new(600.0));
        assert_eq!(p.projected_end, Some(Time::new(10.0)));
        assert_eq!(p.segments, 1);
        assert!(!p.finished);
    }

    #[test]
    fn legacy_id_is_lossy() {
        let a = ConnectionKey::new("a_b".into(), "c".into(), "d".into());
        let b = ConnectionKey::new("a".into(), "b_c".into(), "d".into());
        assert_eq!(a.legacy_id(), b.legacy_id());
        assert_ne!(a, b);
    }
}
