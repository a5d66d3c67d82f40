//! Millisecond timestamps.
//!
//! Every timing decision in the controller is a pure function of an
//! explicit `now` supplied by the caller.  Timestamps are milliseconds on
//! an arbitrary monotonic epoch (usually "since boot").

/// Monotonic timestamp or duration in milliseconds.
pub type Millis = u64;

/// Milliseconds elapsed from `since` to `now`, clamped at zero when the
/// caller hands in a timestamp older than `since`.
#[inline]
pub const fn elapsed(now: Millis, since: Millis) -> Millis {
    now.saturating_sub(since)
}
