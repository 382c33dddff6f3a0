//! Field-level wire codecs.
//!
//! Every field opens with a tag byte: bits 0..6 carry the field index, bit 7
//! selects between two representations for the types that have them. Which
//! representation a value gets is decided by its magnitude at encode time,
//! never by its declared type. Fields holding their zero value are skipped
//! entirely, so a record's wire form is the strictly ascending sequence of
//! its non-zero fields followed by the `0x7f` sentinel.
//!
//! The decoder never maps tags to handlers. It holds the one pending header
//! byte and offers it to each field routine in declared order; a routine
//! consumes the header (and its payload, and the following header) only on
//! an index match, and otherwise leaves everything untouched for the next
//! field to inspect. Out-of-order or unknown tags thereby fall through every
//! routine and fail the sentinel check.
//!
//! List payloads carry a varint element count followed by value-only
//! encodings. With no per-element tag to put it in, the representation
//! choice disappears: unsigned elements are plain varints, signed elements
//! fold their sign into bit 0 of one, timestamps always use the wide
//! payload, floats and the length-prefixed types keep their single form.

use crate::error::{DecodeError, EncodeError, Limit};
use crate::record::Record;
use crate::timestamp::Timestamp;
use crate::varint;

/// Terminates every record. No field tag can collide: index 127 is reserved.
pub(crate) const SENTINEL: u8 = 0x7f;

/// Serializes one record into a caller-owned buffer.
///
/// Obtained through [`Record::encode`]; generated `encode_fields` bodies
/// call the `*_field` routines in ascending index order.
pub struct Encoder<'a> {
    buf: &'a mut [u8],
    /// Start of the current record frame; the size ceiling counts from here.
    start: usize,
    pos: usize,
    size_max: usize,
    list_max: usize,
}

impl<'a> Encoder<'a> {
    pub(crate) fn new(buf: &'a mut [u8], offset: usize, size_max: usize, list_max: usize) -> Self {
        Encoder { buf, start: offset, pos: offset, size_max, list_max }
    }

    /// Writes the sentinel and hands back the exclusive end index.
    pub(crate) fn finish(mut self) -> Result<usize, EncodeError> {
        self.put(SENTINEL)?;
        Ok(self.pos)
    }

    fn put(&mut self, b: u8) -> Result<(), EncodeError> {
        if self.pos - self.start >= self.size_max {
            return Err(EncodeError::LimitBreach(Limit::Size {
                size: self.pos - self.start + 1,
                max: self.size_max,
            }));
        }
        if self.pos >= self.buf.len() {
            return Err(EncodeError::BufferFull(self.pos));
        }
        self.buf[self.pos] = b;
        self.pos += 1;
        Ok(())
    }

    fn put_slice(&mut self, bytes: &[u8]) -> Result<(), EncodeError> {
        if self.pos - self.start + bytes.len() > self.size_max {
            return Err(EncodeError::LimitBreach(Limit::Size {
                size: self.pos - self.start + bytes.len(),
                max: self.size_max,
            }));
        }
        let end = self.pos + bytes.len();
        if end > self.buf.len() {
            return Err(EncodeError::BufferFull(self.buf.len()));
        }
        self.buf[self.pos..end].copy_from_slice(bytes);
        self.pos = end;
        Ok(())
    }

    fn varint(&mut self, x: u64) -> Result<(), EncodeError> {
        let mut tmp = [0u8; varint::MAX_BYTES];
        let n = varint::put(x, &mut tmp);
        self.put_slice(&tmp[..n])
    }

    /// A text or binary byte size, checked against the size ceiling.
    fn size(&mut self, n: usize) -> Result<(), EncodeError> {
        if n > self.size_max {
            return Err(EncodeError::LimitBreach(Limit::Size { size: n, max: self.size_max }));
        }
        self.varint(n as u64)
    }

    /// A list element count, checked against the list ceiling.
    fn count(&mut self, n: usize) -> Result<(), EncodeError> {
        if n > self.list_max {
            return Err(EncodeError::LimitBreach(Limit::Count { count: n, max: self.list_max }));
        }
        self.varint(n as u64)
    }

    fn signed(&mut self, v: i64) -> Result<(), EncodeError> {
        // sign moves to bit 0; i64::MIN would need bit 64 for its magnitude
        if v == i64::MIN {
            return Err(EncodeError::LimitBreach(Limit::Magnitude));
        }
        self.varint(v.unsigned_abs() << 1 | (v < 0) as u64)
    }

    fn timestamp(&mut self, v: Timestamp) -> Result<(), EncodeError> {
        self.put_slice(&v.secs.to_be_bytes())?;
        self.put_slice(&v.nanos.to_be_bytes())
    }

    /// Encodes a nested record in place: its fields under its own limits,
    /// then its sentinel. The enclosing record's ceiling still covers the
    /// nested bytes once this frame is popped.
    fn nested<T: Record>(&mut self, rec: &T) -> Result<(), EncodeError> {
        let frame = (self.start, self.size_max, self.list_max);
        self.start = self.pos;
        self.size_max = T::SIZE_MAX;
        self.list_max = T::LIST_MAX;
        rec.encode_fields(self)?;
        self.put(SENTINEL)?;
        (self.start, self.size_max, self.list_max) = frame;
        Ok(())
    }

    pub fn bool_field(&mut self, index: u8, v: bool) -> Result<(), EncodeError> {
        if v {
            self.put(index)?;
        }
        Ok(())
    }

    pub fn u8_field(&mut self, index: u8, v: u8) -> Result<(), EncodeError> {
        if v != 0 {
            self.put(index)?;
            self.put(v)?;
        }
        Ok(())
    }

    pub fn u16_field(&mut self, index: u8, v: u16) -> Result<(), EncodeError> {
        if v == 0 {
            Ok(())
        } else if v > 0xff {
            self.put(index | 0x80)?;
            self.put_slice(&v.to_be_bytes())
        } else {
            self.put(index)?;
            self.put(v as u8)
        }
    }

    pub fn u32_field(&mut self, index: u8, v: u32) -> Result<(), EncodeError> {
        if v == 0 {
            Ok(())
        } else if v >= 1 << 21 {
            self.put(index | 0x80)?;
            self.put_slice(&v.to_be_bytes())
        } else {
            self.put(index)?;
            self.varint(v as u64)
        }
    }

    pub fn u64_field(&mut self, index: u8, v: u64) -> Result<(), EncodeError> {
        if v == 0 {
            Ok(())
        } else if v >= 1 << 49 {
            self.put(index | 0x80)?;
            self.put_slice(&v.to_be_bytes())
        } else {
            self.put(index)?;
            self.varint(v)
        }
    }

    pub fn i32_field(&mut self, index: u8, v: i32) -> Result<(), EncodeError> {
        if v == 0 {
            return Ok(());
        }
        if v == i32::MIN {
            return Err(EncodeError::LimitBreach(Limit::Magnitude));
        }
        self.put(if v < 0 { index | 0x80 } else { index })?;
        self.varint(v.unsigned_abs() as u64)
    }

    pub fn i64_field(&mut self, index: u8, v: i64) -> Result<(), EncodeError> {
        if v == 0 {
            return Ok(());
        }
        if v == i64::MIN {
            return Err(EncodeError::LimitBreach(Limit::Magnitude));
        }
        self.put(if v < 0 { index | 0x80 } else { index })?;
        self.varint(v.unsigned_abs())
    }

    pub fn f32_field(&mut self, index: u8, v: f32) -> Result<(), EncodeError> {
        if v != 0.0 {
            self.put(index)?;
            self.put_slice(&v.to_bits().to_be_bytes())?;
        }
        Ok(())
    }

    pub fn f64_field(&mut self, index: u8, v: f64) -> Result<(), EncodeError> {
        if v != 0.0 {
            self.put(index)?;
            self.put_slice(&v.to_bits().to_be_bytes())?;
        }
        Ok(())
    }

    pub fn timestamp_field(&mut self, index: u8, v: Timestamp) -> Result<(), EncodeError> {
        if v.is_epoch() {
            Ok(())
        } else if v.secs >= 0 && v.secs < 1 << 32 {
            self.put(index)?;
            self.put_slice(&(v.secs as u32).to_be_bytes())?;
            self.put_slice(&v.nanos.to_be_bytes())
        } else {
            self.put(index | 0x80)?;
            self.timestamp(v)
        }
    }

    pub fn text_field(&mut self, index: u8, v: &str) -> Result<(), EncodeError> {
        if v.is_empty() {
            return Ok(());
        }
        self.put(index)?;
        self.size(v.len())?;
        self.put_slice(v.as_bytes())
    }

    pub fn binary_field(&mut self, index: u8, v: &[u8]) -> Result<(), EncodeError> {
        if v.is_empty() {
            return Ok(());
        }
        self.put(index)?;
        self.size(v.len())?;
        self.put_slice(v)
    }

    pub fn record_field<T: Record>(&mut self, index: u8, v: Option<&T>) -> Result<(), EncodeError> {
        match v {
            None => Ok(()),
            Some(rec) => {
                self.put(index)?;
                self.nested(rec)
            }
        }
    }

    pub fn u8_list_field(&mut self, index: u8, v: &[u8]) -> Result<(), EncodeError> {
        if v.is_empty() {
            return Ok(());
        }
        self.put(index)?;
        self.count(v.len())?;
        self.put_slice(v)
    }

    pub fn u16_list_field(&mut self, index: u8, v: &[u16]) -> Result<(), EncodeError> {
        if v.is_empty() {
            return Ok(());
        }
        self.put(index)?;
        self.count(v.len())?;
        for &x in v {
            self.varint(x as u64)?;
        }
        Ok(())
    }

    pub fn u32_list_field(&mut self, index: u8, v: &[u32]) -> Result<(), EncodeError> {
        if v.is_empty() {
            return Ok(());
        }
        self.put(index)?;
        self.count(v.len())?;
        for &x in v {
            self.varint(x as u64)?;
        }
        Ok(())
    }

    pub fn u64_list_field(&mut self, index: u8, v: &[u64]) -> Result<(), EncodeError> {
        if v.is_empty() {
            return Ok(());
        }
        self.put(index)?;
        self.count(v.len())?;
        for &x in v {
            self.varint(x)?;
        }
        Ok(())
    }

    pub fn i32_list_field(&mut self, index: u8, v: &[i32]) -> Result<(), EncodeError> {
        if v.is_empty() {
            return Ok(());
        }
        self.put(index)?;
        self.count(v.len())?;
        for &x in v {
            // the folded form must stay decodable by a 32-bit accumulator
            if x == i32::MIN {
                return Err(EncodeError::LimitBreach(Limit::Magnitude));
            }
            self.signed(x as i64)?;
        }
        Ok(())
    }

    pub fn i64_list_field(&mut self, index: u8, v: &[i64]) -> Result<(), EncodeError> {
        if v.is_empty() {
            return Ok(());
        }
        self.put(index)?;
        self.count(v.len())?;
        for &x in v {
            self.signed(x)?;
        }
        Ok(())
    }

    pub fn f32_list_field(&mut self, index: u8, v: &[f32]) -> Result<(), EncodeError> {
        if v.is_empty() {
            return Ok(());
        }
        self.put(index)?;
        self.count(v.len())?;
        for &x in v {
            self.put_slice(&x.to_bits().to_be_bytes())?;
        }
        Ok(())
    }

    pub fn f64_list_field(&mut self, index: u8, v: &[f64]) -> Result<(), EncodeError> {
        if v.is_empty() {
            return Ok(());
        }
        self.put(index)?;
        self.count(v.len())?;
        for &x in v {
            self.put_slice(&x.to_bits().to_be_bytes())?;
        }
        Ok(())
    }

    pub fn timestamp_list_field(&mut self, index: u8, v: &[Timestamp]) -> Result<(), EncodeError> {
        if v.is_empty() {
            return Ok(());
        }
        self.put(index)?;
        self.count(v.len())?;
        for &x in v {
            self.timestamp(x)?;
        }
        Ok(())
    }

    pub fn text_list_field(&mut self, index: u8, v: &[String]) -> Result<(), EncodeError> {
        if v.is_empty() {
            return Ok(());
        }
        self.put(index)?;
        self.count(v.len())?;
        for x in v {
            self.size(x.len())?;
            self.put_slice(x.as_bytes())?;
        }
        Ok(())
    }

    pub fn binary_list_field(&mut self, index: u8, v: &[Vec<u8>]) -> Result<(), EncodeError> {
        if v.is_empty() {
            return Ok(());
        }
        self.put(index)?;
        self.count(v.len())?;
        for x in v {
            self.size(x.len())?;
            self.put_slice(x)?;
        }
        Ok(())
    }

    pub fn record_list_field<T: Record>(&mut self, index: u8, v: &[T]) -> Result<(), EncodeError> {
        if v.is_empty() {
            return Ok(());
        }
        self.put(index)?;
        self.count(v.len())?;
        for rec in v {
            self.nested(rec)?;
        }
        Ok(())
    }
}

/// Deserializes one record from a byte window.
///
/// Obtained through [`Record::decode`]; generated `decode_fields` bodies
/// offer the pending header to the `*_field` routines in ascending index
/// order. Each returns `None` without touching anything when the header
/// belongs to a later field or the sentinel.
pub struct Decoder<'a> {
    buf: &'a [u8],
    /// Start of the current record frame; the size ceiling counts from here.
    start: usize,
    pos: usize,
    end: usize,
    header: u8,
    size_max: usize,
    list_max: usize,
}

impl<'a> Decoder<'a> {
    pub(crate) fn new(
        buf: &'a [u8],
        offset: usize,
        end: usize,
        size_max: usize,
        list_max: usize,
    ) -> Result<Self, DecodeError> {
        let end = end.min(buf.len());
        let mut dec = Decoder { buf, start: offset, pos: offset, end, header: 0, size_max, list_max };
        dec.header = dec.take()?;
        Ok(dec)
    }

    /// Requires the sentinel and hands back the exclusive end index.
    pub(crate) fn finish(self) -> Result<usize, DecodeError> {
        if self.header != SENTINEL {
            return Err(DecodeError::SchemaMismatch(self.header));
        }
        Ok(self.pos)
    }

    /// Incomplete while more input could still complete the record within
    /// the ceiling; LimitBreach once the window alone proves it cannot.
    fn underflow(&self) -> DecodeError {
        let window = self.end.saturating_sub(self.start);
        if window >= self.size_max {
            DecodeError::LimitBreach(Limit::Size { size: window, max: self.size_max })
        } else {
            DecodeError::Incomplete
        }
    }

    fn take(&mut self) -> Result<u8, DecodeError> {
        if self.pos - self.start >= self.size_max {
            return Err(DecodeError::LimitBreach(Limit::Size {
                size: self.pos - self.start + 1,
                max: self.size_max,
            }));
        }
        if self.pos >= self.end {
            return Err(self.underflow());
        }
        let b = self.buf[self.pos];
        self.pos += 1;
        Ok(b)
    }

    fn slice(&mut self, n: usize) -> Result<&'a [u8], DecodeError> {
        if self.pos - self.start + n > self.size_max {
            return Err(DecodeError::LimitBreach(Limit::Size {
                size: self.pos - self.start + n,
                max: self.size_max,
            }));
        }
        if self.pos + n > self.end {
            return Err(self.underflow());
        }
        self.pos += n;
        Ok(&self.buf[self.pos - n..self.pos])
    }

    fn varint32(&mut self) -> Result<u32, DecodeError> {
        let (x, n) = varint::take32(&self.buf[self.pos..self.end]).map_err(|e| match e {
            DecodeError::Incomplete => self.underflow(),
            e => e,
        })?;
        self.pos += n;
        if self.pos - self.start > self.size_max {
            return Err(DecodeError::LimitBreach(Limit::Size {
                size: self.pos - self.start,
                max: self.size_max,
            }));
        }
        Ok(x)
    }

    fn varint64(&mut self) -> Result<u64, DecodeError> {
        let (x, n) = varint::take64(&self.buf[self.pos..self.end]).map_err(|e| match e {
            DecodeError::Incomplete => self.underflow(),
            e => e,
        })?;
        self.pos += n;
        if self.pos - self.start > self.size_max {
            return Err(DecodeError::LimitBreach(Limit::Size {
                size: self.pos - self.start,
                max: self.size_max,
            }));
        }
        Ok(x)
    }

    /// A declared byte size, rejected before anything of that size gets
    /// read or allocated.
    fn declared_size(&mut self) -> Result<usize, DecodeError> {
        let n = self.varint32()? as usize;
        if n > self.size_max {
            return Err(DecodeError::LimitBreach(Limit::Size { size: n, max: self.size_max }));
        }
        Ok(n)
    }

    /// A declared element count, rejected before allocation.
    fn declared_count(&mut self) -> Result<usize, DecodeError> {
        let n = self.varint32()? as usize;
        if n > self.list_max {
            return Err(DecodeError::LimitBreach(Limit::Count { count: n, max: self.list_max }));
        }
        Ok(n)
    }

    fn be16(&mut self) -> Result<u16, DecodeError> {
        Ok(u16::from_be_bytes(self.slice(2)?.try_into().unwrap()))
    }

    fn be32(&mut self) -> Result<u32, DecodeError> {
        Ok(u32::from_be_bytes(self.slice(4)?.try_into().unwrap()))
    }

    fn be64(&mut self) -> Result<u64, DecodeError> {
        Ok(u64::from_be_bytes(self.slice(8)?.try_into().unwrap()))
    }

    // The sign-magnitude form cannot come out of the encoder with a
    // magnitude at the type's full width, since negating it would
    // overflow; such input is malformed, not the most negative integer.
    fn signed32(&mut self, tag: u8) -> Result<i32, DecodeError> {
        let mag = self.varint32()?;
        if tag & 0x80 == 0 {
            i32::try_from(mag).map_err(|_| DecodeError::SchemaMismatch(tag))
        } else if mag >= 1 << 31 {
            Err(DecodeError::SchemaMismatch(tag))
        } else {
            Ok(-(mag as i32))
        }
    }

    fn signed64(&mut self, tag: u8) -> Result<i64, DecodeError> {
        let mag = self.varint64()?;
        if tag & 0x80 == 0 {
            i64::try_from(mag).map_err(|_| DecodeError::SchemaMismatch(tag))
        } else if mag >= 1 << 63 {
            Err(DecodeError::SchemaMismatch(tag))
        } else {
            Ok(-(mag as i64))
        }
    }

    fn timestamp(&mut self) -> Result<Timestamp, DecodeError> {
        let secs = self.be64()? as i64;
        let nanos = self.be32()?;
        Ok(Timestamp { secs, nanos })
    }

    fn text(&mut self, size: usize) -> Result<String, DecodeError> {
        // ill-formed sequences decode to U+FFFD rather than failing
        Ok(String::from_utf8_lossy(self.slice(size)?).into_owned())
    }

    /// Decodes a nested record in place, sentinel included, under its own
    /// limits. The caller reads the following header afterwards.
    fn nested<T: Record>(&mut self) -> Result<T, DecodeError> {
        let frame = (self.start, self.size_max, self.list_max);
        self.start = self.pos;
        self.size_max = T::SIZE_MAX;
        self.list_max = T::LIST_MAX;
        let mut rec = T::default();
        self.header = self.take()?;
        rec.decode_fields(self)?;
        if self.header != SENTINEL {
            return Err(DecodeError::SchemaMismatch(self.header));
        }
        (self.start, self.size_max, self.list_max) = frame;
        Ok(rec)
    }

    pub fn bool_field(&mut self, index: u8) -> Result<Option<bool>, DecodeError> {
        if self.header != index {
            return Ok(None);
        }
        self.header = self.take()?;
        Ok(Some(true))
    }

    pub fn u8_field(&mut self, index: u8) -> Result<Option<u8>, DecodeError> {
        if self.header != index {
            return Ok(None);
        }
        let v = self.take()?;
        self.header = self.take()?;
        Ok(Some(v))
    }

    pub fn u16_field(&mut self, index: u8) -> Result<Option<u16>, DecodeError> {
        let v = if self.header == index {
            self.take()? as u16
        } else if self.header == index | 0x80 {
            self.be16()?
        } else {
            return Ok(None);
        };
        self.header = self.take()?;
        Ok(Some(v))
    }

    pub fn u32_field(&mut self, index: u8) -> Result<Option<u32>, DecodeError> {
        let v = if self.header == index {
            self.varint32()?
        } else if self.header == index | 0x80 {
            self.be32()?
        } else {
            return Ok(None);
        };
        self.header = self.take()?;
        Ok(Some(v))
    }

    pub fn u64_field(&mut self, index: u8) -> Result<Option<u64>, DecodeError> {
        let v = if self.header == index {
            self.varint64()?
        } else if self.header == index | 0x80 {
            self.be64()?
        } else {
            return Ok(None);
        };
        self.header = self.take()?;
        Ok(Some(v))
    }

    pub fn i32_field(&mut self, index: u8) -> Result<Option<i32>, DecodeError> {
        if self.header & 0x7f != index {
            return Ok(None);
        }
        let v = self.signed32(self.header)?;
        self.header = self.take()?;
        Ok(Some(v))
    }

    pub fn i64_field(&mut self, index: u8) -> Result<Option<i64>, DecodeError> {
        if self.header & 0x7f != index {
            return Ok(None);
        }
        let v = self.signed64(self.header)?;
        self.header = self.take()?;
        Ok(Some(v))
    }

    pub fn f32_field(&mut self, index: u8) -> Result<Option<f32>, DecodeError> {
        if self.header != index {
            return Ok(None);
        }
        let v = f32::from_bits(self.be32()?);
        self.header = self.take()?;
        Ok(Some(v))
    }

    pub fn f64_field(&mut self, index: u8) -> Result<Option<f64>, DecodeError> {
        if self.header != index {
            return Ok(None);
        }
        let v = f64::from_bits(self.be64()?);
        self.header = self.take()?;
        Ok(Some(v))
    }

    pub fn timestamp_field(&mut self, index: u8) -> Result<Option<Timestamp>, DecodeError> {
        let v = if self.header == index {
            let secs = self.be32()? as i64;
            let nanos = self.be32()?;
            Timestamp { secs, nanos }
        } else if self.header == index | 0x80 {
            self.timestamp()?
        } else {
            return Ok(None);
        };
        self.header = self.take()?;
        Ok(Some(v))
    }

    pub fn text_field(&mut self, index: u8) -> Result<Option<String>, DecodeError> {
        if self.header != index {
            return Ok(None);
        }
        let size = self.declared_size()?;
        let v = self.text(size)?;
        self.header = self.take()?;
        Ok(Some(v))
    }

    pub fn binary_field(&mut self, index: u8) -> Result<Option<Vec<u8>>, DecodeError> {
        if self.header != index {
            return Ok(None);
        }
        let size = self.declared_size()?;
        let v = self.slice(size)?.to_vec();
        self.header = self.take()?;
        Ok(Some(v))
    }

    pub fn record_field<T: Record>(&mut self, index: u8) -> Result<Option<Box<T>>, DecodeError> {
        if self.header != index {
            return Ok(None);
        }
        let rec = self.nested::<T>()?;
        self.header = self.take()?;
        Ok(Some(Box::new(rec)))
    }

    pub fn u8_list_field(&mut self, index: u8) -> Result<Option<Vec<u8>>, DecodeError> {
        if self.header != index {
            return Ok(None);
        }
        let count = self.declared_count()?;
        let v = self.slice(count)?.to_vec();
        self.header = self.take()?;
        Ok(Some(v))
    }

    pub fn u16_list_field(&mut self, index: u8) -> Result<Option<Vec<u16>>, DecodeError> {
        if self.header != index {
            return Ok(None);
        }
        let count = self.declared_count()?;
        let mut list = Vec::with_capacity(count);
        for _ in 0..count {
            let x = self.varint32()?;
            let x = u16::try_from(x).map_err(|_| DecodeError::SchemaMismatch(index))?;
            list.push(x);
        }
        self.header = self.take()?;
        Ok(Some(list))
    }

    pub fn u32_list_field(&mut self, index: u8) -> Result<Option<Vec<u32>>, DecodeError> {
        if self.header != index {
            return Ok(None);
        }
        let count = self.declared_count()?;
        let mut list = Vec::with_capacity(count);
        for _ in 0..count {
            list.push(self.varint32()?);
        }
        self.header = self.take()?;
        Ok(Some(list))
    }

    pub fn u64_list_field(&mut self, index: u8) -> Result<Option<Vec<u64>>, DecodeError> {
        if self.header != index {
            return Ok(None);
        }
        let count = self.declared_count()?;
        let mut list = Vec::with_capacity(count);
        for _ in 0..count {
            list.push(self.varint64()?);
        }
        self.header = self.take()?;
        Ok(Some(list))
    }

    pub fn i32_list_field(&mut self, index: u8) -> Result<Option<Vec<i32>>, DecodeError> {
        if self.header != index {
            return Ok(None);
        }
        let count = self.declared_count()?;
        let mut list = Vec::with_capacity(count);
        for _ in 0..count {
            list.push(sign_folded(self.varint32()? as u64) as i32);
        }
        self.header = self.take()?;
        Ok(Some(list))
    }

    pub fn i64_list_field(&mut self, index: u8) -> Result<Option<Vec<i64>>, DecodeError> {
        if self.header != index {
            return Ok(None);
        }
        let count = self.declared_count()?;
        let mut list = Vec::with_capacity(count);
        for _ in 0..count {
            list.push(sign_folded(self.varint64()?));
        }
        self.header = self.take()?;
        Ok(Some(list))
    }

    pub fn f32_list_field(&mut self, index: u8) -> Result<Option<Vec<f32>>, DecodeError> {
        if self.header != index {
            return Ok(None);
        }
        let count = self.declared_count()?;
        let mut list = Vec::with_capacity(count);
        for _ in 0..count {
            list.push(f32::from_bits(self.be32()?));
        }
        self.header = self.take()?;
        Ok(Some(list))
    }

    pub fn f64_list_field(&mut self, index: u8) -> Result<Option<Vec<f64>>, DecodeError> {
        if self.header != index {
            return Ok(None);
        }
        let count = self.declared_count()?;
        let mut list = Vec::with_capacity(count);
        for _ in 0..count {
            list.push(f64::from_bits(self.be64()?));
        }
        self.header = self.take()?;
        Ok(Some(list))
    }

    pub fn timestamp_list_field(&mut self, index: u8) -> Result<Option<Vec<Timestamp>>, DecodeError> {
        if self.header != index {
            return Ok(None);
        }
        let count = self.declared_count()?;
        let mut list = Vec::with_capacity(count);
        for _ in 0..count {
            list.push(self.timestamp()?);
        }
        self.header = self.take()?;
        Ok(Some(list))
    }

    pub fn text_list_field(&mut self, index: u8) -> Result<Option<Vec<String>>, DecodeError> {
        if self.header != index {
            return Ok(None);
        }
        let count = self.declared_count()?;
        let mut list = Vec::with_capacity(count);
        for _ in 0..count {
            let size = self.declared_size()?;
            list.push(self.text(size)?);
        }
        self.header = self.take()?;
        Ok(Some(list))
    }

    pub fn binary_list_field(&mut self, index: u8) -> Result<Option<Vec<Vec<u8>>>, DecodeError> {
        if self.header != index {
            return Ok(None);
        }
        let count = self.declared_count()?;
        let mut list = Vec::with_capacity(count);
        for _ in 0..count {
            let size = self.declared_size()?;
            list.push(self.slice(size)?.to_vec());
        }
        self.header = self.take()?;
        Ok(Some(list))
    }

    pub fn record_list_field<T: Record>(&mut self, index: u8) -> Result<Option<Vec<T>>, DecodeError> {
        if self.header != index {
            return Ok(None);
        }
        let count = self.declared_count()?;
        let mut list = Vec::with_capacity(count);
        for _ in 0..count {
            list.push(self.nested::<T>()?);
        }
        self.header = self.take()?;
        Ok(Some(list))
    }
}

/// Unfolds a list element's sign from bit 0. Magnitudes stay below 2⁶³, so
/// the cast cannot wrap; a folded negative zero unfolds to plain zero.
fn sign_folded(x: u64) -> i64 {
    let mag = (x >> 1) as i64;
    if x & 1 == 0 {
        mag
    } else {
        -mag
    }
}
