use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::BoundsError;

/// One observed point on the network's close-time curve.
///
/// Close times are monotonic non-decreasing in sequence number, so a set of
/// close points can be searched like a sorted map from time to sequence.
/// A point is immutable once observed.
///
/// Ordering: by `seq`, then `close_time`.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ClosePoint {
    /// Ledger sequence number.
    pub seq: u64,
    /// Wall-clock instant at which the ledger was finalized (UTC).
    pub close_time: DateTime<Utc>,
}

impl ClosePoint {
    /// Create a close point with explicit values.
    pub fn new(seq: u64, close_time: DateTime<Utc>) -> Self {
        Self { seq, close_time }
    }
}

impl fmt::Debug for ClosePoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ClosePoint({} @ {})", self.seq, self.close_time.to_rfc3339())
    }
}

impl fmt::Display for ClosePoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}", self.seq, self.close_time.to_rfc3339())
    }
}

/// The usable edges of the network's history.
///
/// `begin` is the earliest sequence with a meaningful close time. The
/// genesis ledger carries a degenerate zero close time and is never part
/// of the bounds. `end` is the latest sequence known to the source.
///
/// Instants outside `[begin.close_time, end.close_time]` are clamped to
/// the nearest edge before resolution.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct NetworkBounds {
    begin: ClosePoint,
    end: ClosePoint,
}

impl NetworkBounds {
    /// Build bounds from the two edge points.
    ///
    /// Fails if `end` does not lie strictly after `begin` in sequence, or
    /// if the close times contradict the monotonicity of the curve.
    pub fn new(begin: ClosePoint, end: ClosePoint) -> Result<Self, BoundsError> {
        if end.seq < begin.seq + 1 {
            return Err(BoundsError::InconsistentSequences {
                begin: begin.seq,
                end: end.seq,
            });
        }
        if end.close_time < begin.close_time {
            return Err(BoundsError::InconsistentCloseTimes {
                begin: begin.close_time,
                end: end.close_time,
            });
        }
        Ok(Self { begin, end })
    }

    /// The earliest usable close point.
    pub fn begin(&self) -> ClosePoint {
        self.begin
    }

    /// The latest known close point.
    pub fn end(&self) -> ClosePoint {
        self.end
    }

    /// Number of sequences spanned, `end.seq - begin.seq`.
    pub fn seq_span(&self) -> u64 {
        self.end.seq - self.begin.seq
    }

    /// Pull an instant into `[begin.close_time, end.close_time]`.
    pub fn clamp(&self, instant: DateTime<Utc>) -> DateTime<Utc> {
        if instant < self.begin.close_time {
            self.begin.close_time
        } else if instant > self.end.close_time {
            self.end.close_time
        } else {
            instant
        }
    }

    /// Returns `true` if the instant lies inside the bounds.
    pub fn contains(&self, instant: DateTime<Utc>) -> bool {
        instant >= self.begin.close_time && instant <= self.end.close_time
    }
}
