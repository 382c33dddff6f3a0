//! Records on the wire.
//!
//! A record is the sequence of its non-zero fields in ascending index
//! order, closed by the `0x7f` sentinel. The smallest possible record is
//! the lone sentinel byte. Schema compilers emit one [`Record`]
//! implementation per declared record shape; everything beyond the two
//! field-walk methods is provided here.

use std::io::Write;

use crate::error::{DecodeError, EncodeError};
use crate::field::{Decoder, Encoder};

/// Serialization contract for one schema-described record shape.
///
/// Implementations supply the field walks; the entry points, the sentinel
/// and the limit plumbing are shared. The two ceilings are fixed per shape
/// at generation time.
pub trait Record: Default {
    /// Upper limit for the byte size of an encoded record and for any
    /// single text or binary payload within it.
    const SIZE_MAX: usize = 16 * 1024 * 1024;

    /// Upper limit for the element count of any list field.
    const LIST_MAX: usize = 64 * 1024;

    /// Writes the fields, in ascending index order, through the per-type
    /// routines on [`Encoder`]. Zero-valued fields write nothing.
    fn encode_fields(&self, enc: &mut Encoder<'_>) -> Result<(), EncodeError>;

    /// Offers the pending header to every field, in ascending index order,
    /// through the per-type routines on [`Decoder`]. Absent fields must be
    /// left at their current value.
    fn decode_fields(&mut self, dec: &mut Decoder<'_>) -> Result<(), DecodeError>;

    /// Serializes the record into `buf` starting at `offset`.
    ///
    /// Returns the exclusive end index of the serial. A buffer too small
    /// for a record still within [`SIZE_MAX`](Self::SIZE_MAX) yields
    /// [`EncodeError::BufferFull`]; growing the buffer and retrying is
    /// always safe.
    fn encode(&self, buf: &mut [u8], offset: usize) -> Result<usize, EncodeError> {
        let mut enc = Encoder::new(buf, offset, Self::SIZE_MAX, Self::LIST_MAX);
        self.encode_fields(&mut enc)?;
        enc.finish()
    }

    /// Deserializes one record from `buf[offset..end]` into `self`.
    ///
    /// Returns the exclusive end index of the consumed serial. `end` is
    /// clamped to the buffer length. Fields absent from the serial keep
    /// their current value; start from [`Default`] for plain
    /// deserialization. [`DecodeError::Incomplete`] means more input may
    /// complete the record; the other errors are final.
    fn decode(&mut self, buf: &[u8], offset: usize, end: usize) -> Result<usize, DecodeError> {
        let mut dec = Decoder::new(buf, offset, end, Self::SIZE_MAX, Self::LIST_MAX)?;
        self.decode_fields(&mut dec)?;
        dec.finish()
    }

    /// Serializes the record through `scratch` into `sink`.
    ///
    /// The scratch buffer grows geometrically as needed, up to
    /// [`SIZE_MAX`](Self::SIZE_MAX), and is returned for reuse on the next
    /// call. [`EncodeError::BufferFull`] never escapes here.
    fn encode_to<W: Write>(&self, sink: &mut W, mut scratch: Vec<u8>) -> Result<Vec<u8>, EncodeError> {
        if scratch.is_empty() {
            scratch = vec![0; Self::SIZE_MAX.min(2048)];
        }
        loop {
            match self.encode(&mut scratch, 0) {
                Ok(end) => {
                    sink.write_all(&scratch[..end])?;
                    return Ok(scratch);
                }
                Err(EncodeError::BufferFull(_)) => {
                    let grown = scratch.len().saturating_mul(4).min(Self::SIZE_MAX);
                    scratch = vec![0; grown];
                }
                Err(e) => return Err(e),
            }
        }
    }
}
