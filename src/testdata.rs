//! Hand-maintained bindings for the schemas exercised by the test suite and
//! the documentation, written the way a schema compiler would emit them:
//! one struct per record shape, fields in index order, and the two field
//! walks as plain chains over the cursor routines.

use crate::error::{DecodeError, EncodeError};
use crate::field::{Decoder, Encoder};
use crate::record::Record;
use crate::timestamp::Timestamp;

/// A directory entry.
///
/// ```text
/// type Entry struct {
///     id    uint32      // 0
///     name  text        // 1
///     tags  []uint32    // 2
///     flag  bool        // 3
///     since timestamp   // 4
/// }
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Entry {
    pub id: u32,
    pub name: String,
    pub tags: Vec<u32>,
    pub flag: bool,
    pub since: Timestamp,
}

impl Record for Entry {
    fn encode_fields(&self, enc: &mut Encoder<'_>) -> Result<(), EncodeError> {
        enc.u32_field(0, self.id)?;
        enc.text_field(1, &self.name)?;
        enc.u32_list_field(2, &self.tags)?;
        enc.bool_field(3, self.flag)?;
        enc.timestamp_field(4, self.since)
    }

    fn decode_fields(&mut self, dec: &mut Decoder<'_>) -> Result<(), DecodeError> {
        if let Some(v) = dec.u32_field(0)? {
            self.id = v;
        }
        if let Some(v) = dec.text_field(1)? {
            self.name = v;
        }
        if let Some(v) = dec.u32_list_field(2)? {
            self.tags = v;
        }
        if let Some(v) = dec.bool_field(3)? {
            self.flag = v;
        }
        if let Some(v) = dec.timestamp_field(4)? {
            self.since = v;
        }
        Ok(())
    }
}

/// One field of every wire type, scalar and list, plus recursion. Exists to
/// exercise the whole codec surface; no real schema looks like this.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Omni {
    pub flag: bool,                 // 0  bool
    pub tiny: u8,                   // 1  uint8
    pub port: u16,                  // 2  uint16
    pub count: u32,                 // 3  uint32
    pub total: u64,                 // 4  uint64
    pub delta: i32,                 // 5  int32
    pub shift: i64,                 // 6  int64
    pub ratio: f32,                 // 7  float32
    pub mean: f64,                  // 8  float64
    pub at: Timestamp,              // 9  timestamp
    pub label: String,              // 10 text
    pub raw: Vec<u8>,               // 11 binary
    pub inner: Option<Box<Omni>>,   // 12 Omni
    pub kids: Vec<Omni>,            // 13 []Omni
    pub tinies: Vec<u8>,            // 14 []uint8
    pub ports: Vec<u16>,            // 15 []uint16
    pub counts: Vec<u32>,           // 16 []uint32
    pub totals: Vec<u64>,           // 17 []uint64
    pub deltas: Vec<i32>,           // 18 []int32
    pub shifts: Vec<i64>,           // 19 []int64
    pub ratios: Vec<f32>,           // 20 []float32
    pub means: Vec<f64>,            // 21 []float64
    pub stamps: Vec<Timestamp>,     // 22 []timestamp
    pub names: Vec<String>,         // 23 []text
    pub blobs: Vec<Vec<u8>>,        // 24 []binary
}

impl Record for Omni {
    fn encode_fields(&self, enc: &mut Encoder<'_>) -> Result<(), EncodeError> {
        enc.bool_field(0, self.flag)?;
        enc.u8_field(1, self.tiny)?;
        enc.u16_field(2, self.port)?;
        enc.u32_field(3, self.count)?;
        enc.u64_field(4, self.total)?;
        enc.i32_field(5, self.delta)?;
        enc.i64_field(6, self.shift)?;
        enc.f32_field(7, self.ratio)?;
        enc.f64_field(8, self.mean)?;
        enc.timestamp_field(9, self.at)?;
        enc.text_field(10, &self.label)?;
        enc.binary_field(11, &self.raw)?;
        enc.record_field(12, self.inner.as_deref())?;
        enc.record_list_field(13, &self.kids)?;
        enc.u8_list_field(14, &self.tinies)?;
        enc.u16_list_field(15, &self.ports)?;
        enc.u32_list_field(16, &self.counts)?;
        enc.u64_list_field(17, &self.totals)?;
        enc.i32_list_field(18, &self.deltas)?;
        enc.i64_list_field(19, &self.shifts)?;
        enc.f32_list_field(20, &self.ratios)?;
        enc.f64_list_field(21, &self.means)?;
        enc.timestamp_list_field(22, &self.stamps)?;
        enc.text_list_field(23, &self.names)?;
        enc.binary_list_field(24, &self.blobs)
    }

    fn decode_fields(&mut self, dec: &mut Decoder<'_>) -> Result<(), DecodeError> {
        if let Some(v) = dec.bool_field(0)? {
            self.flag = v;
        }
        if let Some(v) = dec.u8_field(1)? {
            self.tiny = v;
        }
        if let Some(v) = dec.u16_field(2)? {
            self.port = v;
        }
        if let Some(v) = dec.u32_field(3)? {
            self.count = v;
        }
        if let Some(v) = dec.u64_field(4)? {
            self.total = v;
        }
        if let Some(v) = dec.i32_field(5)? {
            self.delta = v;
        }
        if let Some(v) = dec.i64_field(6)? {
            self.shift = v;
        }
        if let Some(v) = dec.f32_field(7)? {
            self.ratio = v;
        }
        if let Some(v) = dec.f64_field(8)? {
            self.mean = v;
        }
        if let Some(v) = dec.timestamp_field(9)? {
            self.at = v;
        }
        if let Some(v) = dec.text_field(10)? {
            self.label = v;
        }
        if let Some(v) = dec.binary_field(11)? {
            self.raw = v;
        }
        if let Some(v) = dec.record_field(12)? {
            self.inner = Some(v);
        }
        if let Some(v) = dec.record_list_field(13)? {
            self.kids = v;
        }
        if let Some(v) = dec.u8_list_field(14)? {
            self.tinies = v;
        }
        if let Some(v) = dec.u16_list_field(15)? {
            self.ports = v;
        }
        if let Some(v) = dec.u32_list_field(16)? {
            self.counts = v;
        }
        if let Some(v) = dec.u64_list_field(17)? {
            self.totals = v;
        }
        if let Some(v) = dec.i32_list_field(18)? {
            self.deltas = v;
        }
        if let Some(v) = dec.i64_list_field(19)? {
            self.shifts = v;
        }
        if let Some(v) = dec.f32_list_field(20)? {
            self.ratios = v;
        }
        if let Some(v) = dec.f64_list_field(21)? {
            self.means = v;
        }
        if let Some(v) = dec.timestamp_list_field(22)? {
            self.stamps = v;
        }
        if let Some(v) = dec.text_list_field(23)? {
            self.names = v;
        }
        if let Some(v) = dec.binary_list_field(24)? {
            self.blobs = v;
        }
        Ok(())
    }
}
