//! Wall-clock instants with nanosecond resolution.

/// Seconds and nanoseconds since the Unix epoch, UTC, leap seconds smeared.
///
/// The zero value is the epoch itself, and like every other zero value it
/// occupies no bytes on the wire. The full `i64` range of seconds is
/// representable, which is wider than most calendar types allow; callers
/// converting to such a type own the range check.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Timestamp {
    /// Seconds since the epoch, negative for instants before it.
    pub secs: i64,
    /// Nanoseconds added to `secs`. Expected below 1_000_000_000, but the
    /// codec passes larger values through unchanged.
    pub nanos: u32,
}

impl Timestamp {
    /// The zero value.
    pub const EPOCH: Timestamp = Timestamp { secs: 0, nanos: 0 };

    pub fn new(secs: i64, nanos: u32) -> Self {
        Timestamp { secs, nanos }
    }

    /// Whether this is the zero value, which encodes to nothing.
    pub fn is_epoch(&self) -> bool {
        *self == Self::EPOCH
    }
}

#[cfg(test)]
mod tests {
    use super::Timestamp;

    #[test]
    fn epoch_is_default() {
        assert_eq!(Timestamp::default(), Timestamp::EPOCH);
        assert!(Timestamp::new(0, 0).is_epoch());
        assert!(!Timestamp::new(0, 1).is_epoch());
        assert!(!Timestamp::new(-1, 0).is_epoch());
    }
}
