//! Record framing over an append-only byte source.
//!
//! The reader keeps a rolling window `buf[offset..fill]` of bytes read from
//! the source but not yet consumed by a decode. A decode attempt that runs
//! out of input is not an error here: it is the signal to slide the pending
//! bytes down, grow the buffer if the window already spans all of it, and
//! read more. Growth stops at the record size ceiling, at which point the
//! decoder itself rules the input oversized.

use std::io::Read;
use std::marker::PhantomData;

use tracing::trace;

use crate::error::{DecodeError, Limit, StreamError};
use crate::record::Record;

/// Reusable record reader over an [`io::Read`](std::io::Read) source.
///
/// Single-threaded, with no background state: dropping it mid-stream
/// abandons nothing but buffered bytes.
pub struct StreamReader<R, T> {
    src: R,
    buf: Vec<u8>,
    /// Data start in `buf`, inclusive.
    offset: usize,
    /// Data end in `buf`, exclusive.
    fill: usize,
    _record: PhantomData<fn() -> T>,
}

impl<R: Read, T: Record> StreamReader<R, T> {
    /// Wraps `src`. An empty `buf` gets the default initial capacity of
    /// `min(SIZE_MAX, 2048)` bytes.
    pub fn new(src: R, mut buf: Vec<u8>) -> Self {
        if buf.is_empty() {
            buf = vec![0; T::SIZE_MAX.min(2048)];
        }
        StreamReader { src, buf, offset: 0, fill: 0, _record: PhantomData }
    }

    /// Reads the next record, or `None` on a clean EOF.
    ///
    /// Source errors leave the buffered bytes intact, so the call may be
    /// retried. Decode failures other than running out of input are final
    /// for the stream: the position past the fault is undefined.
    pub fn next(&mut self) -> Result<Option<T>, StreamError> {
        loop {
            if self.fill > self.offset {
                let mut rec = T::default();
                match rec.decode(&self.buf, self.offset, self.fill) {
                    Ok(end) => {
                        self.offset = end;
                        return Ok(Some(rec));
                    }
                    Err(DecodeError::Incomplete) => {}
                    Err(e) => return Err(StreamError::Decode(e)),
                }
            }
            // not enough buffered data; make room and refill
            if self.fill == self.offset {
                self.offset = 0;
                self.fill = 0;
            } else if self.fill == self.buf.len() {
                if self.offset > 0 {
                    self.buf.copy_within(self.offset..self.fill, 0);
                    self.fill -= self.offset;
                    self.offset = 0;
                    trace!(pending = self.fill, "compacted the read buffer");
                } else {
                    let grown = self.buf.len().saturating_mul(4).min(T::SIZE_MAX);
                    if grown == self.buf.len() {
                        // a full window at the ceiling cannot hold a record
                        return Err(StreamError::Decode(DecodeError::LimitBreach(
                            Limit::Size { size: self.fill, max: T::SIZE_MAX },
                        )));
                    }
                    trace!(from = self.buf.len(), to = grown, "grew the read buffer");
                    self.buf.resize(grown, 0);
                }
            }
            let n = self.src.read(&mut self.buf[self.fill..])?;
            if n == 0 {
                if self.fill > self.offset {
                    return Err(StreamError::PendingAtEof);
                }
                return Ok(None);
            }
            self.fill += n;
        }
    }

    /// Swaps the byte source for reuse.
    ///
    /// Refused with [`StreamError::Pending`] while a partial record sits in
    /// the buffer; drain with [`next`](Self::next) first.
    pub fn reset(&mut self, src: R) -> Result<(), StreamError> {
        if self.fill != self.offset {
            return Err(StreamError::Pending);
        }
        self.src = src;
        self.offset = 0;
        self.fill = 0;
        Ok(())
    }
}
