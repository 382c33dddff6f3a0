//! Compact, schema-driven binary records.
//!
//! A record is encoded as its fields in ascending index order, each opened
//! by a tag byte, terminated by the `0x7f` sentinel. The low seven bits of
//! a tag carry the field index; the high bit selects between a compact and
//! an extended representation for the types that have two, chosen from the
//! value's magnitude at encode time. Fields holding their zero value emit
//! no bytes at all, so sparse records stay tiny and the empty record is a
//! single sentinel byte.
//!
//! Decoding is schema-driven and strictly bounded: every length and count
//! on the wire is checked against the configured ceilings before anything
//! is allocated, truncated input is reported separately from malformed
//! input, and the [`StreamReader`] turns the truncation signal into
//! buffered refills over any [`Read`](std::io::Read) source.
//!
//! # Example
//!
//! ```
//! use colfer::{Record, testdata::Entry};
//!
//! let entry = Entry { id: 7, name: "Hi".into(), ..Entry::default() };
//!
//! let mut buf = [0u8; 64];
//! let end = entry.encode(&mut buf, 0).unwrap();
//! assert_eq!(&buf[..end], [
//!     0x00,       // field 0, compact uint32
//!     0x07,       // 7
//!     0x01,       // field 1, text
//!     0x02,       // 2 bytes
//!     0x48, 0x69, // "Hi"
//!     0x7f,       // sentinel
//! ]);
//!
//! let mut decoded = Entry::default();
//! let read = decoded.decode(&buf, 0, end).unwrap();
//! assert_eq!(read, end);
//! assert_eq!(decoded, entry);
//! ```
//!
//! The schema compiler that turns record declarations into [`Record`]
//! implementations lives elsewhere; the [`testdata`] module shows what its
//! output looks like.

mod error;
mod field;
mod record;
mod stream;
pub mod testdata;
mod timestamp;
mod varint;

pub use error::{DecodeError, EncodeError, Limit, StreamError};
pub use field::{Decoder, Encoder};
pub use record::Record;
pub use stream::StreamReader;
pub use timestamp::Timestamp;
