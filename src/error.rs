use std::fmt::{self, Display, Formatter};
use thiserror::Error;

/// The ceiling that an encode or decode ran into.
///
/// Both directions share the same two configured limits: a byte ceiling for
/// records and for single text or binary payloads, and an element ceiling
/// for lists. See [`Record::SIZE_MAX`](crate::Record::SIZE_MAX) and
/// [`Record::LIST_MAX`](crate::Record::LIST_MAX).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Limit {
    /// A byte size overstepped the size ceiling.
    Size { size: usize, max: usize },
    /// A list element count overstepped the list ceiling.
    Count { count: usize, max: usize },
    /// The most negative integer has no magnitude encoding.
    Magnitude,
}

impl Display for Limit {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result<(), fmt::Error> {
        match self {
            Limit::Size { size, max } => write!(f, "size {} exceeds {} bytes", size, max),
            Limit::Count { count, max } => write!(f, "length {} exceeds {} elements", count, max),
            Limit::Magnitude => f.write_str("integer magnitude overflows its encoding"),
        }
    }
}

/// Raised while serializing a record.
#[derive(Debug, Error)]
pub enum EncodeError {
    /// The serial would overrun the destination buffer while still fitting
    /// the size ceiling. Callers grow the buffer and retry;
    /// [`Record::encode_to`](crate::Record::encode_to) does so internally.
    #[error("buffer full at byte {0}")]
    BufferFull(usize),
    /// A value or the record as a whole oversteps a configured ceiling.
    /// The input is at fault; retrying cannot help.
    #[error("{0}")]
    LimitBreach(Limit),
    /// Write failure from the sink.
    #[error("write to sink failed: {0}")]
    Io(#[from] std::io::Error),
}

/// Raised while deserializing a record.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum DecodeError {
    /// The input window ends before the record does. More bytes may
    /// complete the record; the stream reader refills and retries on this.
    #[error("input ends before the record does")]
    Incomplete,
    /// A byte that matches neither a remaining field tag, the sentinel,
    /// nor the value range of its position. Fatal for the record, and the
    /// stream position past the fault is undefined.
    #[error("unexpected byte 0x{0:02x} for the schema")]
    SchemaMismatch(u8),
    /// A declared or accumulated size oversteps a configured ceiling.
    /// Raised before any allocation of the declared size.
    #[error("{0}")]
    LimitBreach(Limit),
}

/// Raised by [`StreamReader`](crate::StreamReader).
///
/// `Incomplete` never appears here: the reader consumes it as its refill
/// signal. The two pending variants mark misuse of the record boundary.
#[derive(Debug, Error)]
pub enum StreamError {
    /// The source failed. The buffered bytes are kept, so the call may be
    /// retried once the source recovers.
    #[error("source read failed: {0}")]
    Io(#[from] std::io::Error),
    /// The buffered bytes do not form a valid record.
    #[error(transparent)]
    Decode(DecodeError),
    /// The source reached EOF with a partial record in the buffer.
    #[error("pending data at EOF")]
    PendingAtEof,
    /// A reset was requested while a partial record is buffered.
    #[error("pending data in the buffer")]
    Pending,
}
