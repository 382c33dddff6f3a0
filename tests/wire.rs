//! Byte-exact wire checks and error discipline.

use colfer::testdata::{Entry, Omni};
use colfer::{DecodeError, Decoder, EncodeError, Encoder, Limit, Record, Timestamp};

/// Encodes through a buffer comfortably larger than any record in here.
fn bytes_of<T: Record>(rec: &T) -> Vec<u8> {
    let mut buf = vec![0u8; 1 << 16];
    let end = rec.encode(&mut buf, 0).expect("encode");
    buf.truncate(end);
    buf
}

fn decode_new<T: Record>(buf: &[u8]) -> Result<(T, usize), DecodeError> {
    let mut rec = T::default();
    let end = rec.decode(buf, 0, buf.len())?;
    Ok((rec, end))
}

#[test]
fn empty_record_is_one_sentinel() {
    assert_eq!(bytes_of(&Entry::default()), [0x7f]);
    assert_eq!(bytes_of(&Omni::default()), [0x7f]);
}

#[test]
fn small_uint32() {
    let entry = Entry { id: 7, ..Entry::default() };
    assert_eq!(bytes_of(&entry), [0x00, 0x07, 0x7f]);
    assert_eq!(decode_new::<Entry>(&[0x00, 0x07, 0x7f]).unwrap(), (entry, 3));
}

#[test]
fn uint32_form_boundary() {
    // 21 bits still fit the compact varint form
    let entry = Entry { id: (1 << 21) - 1, ..Entry::default() };
    assert_eq!(bytes_of(&entry), [0x00, 0xff, 0xff, 0x7f, 0x7f]);
    assert_eq!(decode_new::<Entry>(&[0x00, 0xff, 0xff, 0x7f, 0x7f]).unwrap().0, entry);

    // one more and the tag's high bit selects four fixed bytes
    let entry = Entry { id: 1 << 21, ..Entry::default() };
    assert_eq!(bytes_of(&entry), [0x80, 0x00, 0x20, 0x00, 0x00, 0x7f]);
    assert_eq!(
        decode_new::<Entry>(&[0x80, 0x00, 0x20, 0x00, 0x00, 0x7f]).unwrap().0,
        entry
    );
}

#[test]
fn ascii_text() {
    let entry = Entry { name: "Hi".into(), ..Entry::default() };
    assert_eq!(bytes_of(&entry), [0x01, 0x02, b'H', b'i', 0x7f]);
}

#[test]
fn text_with_two_byte_size() {
    let entry = Entry { name: "a".repeat(200), ..Entry::default() };
    let mut want = vec![0x01, 0xc8, 0x01];
    want.extend(std::iter::repeat(b'a').take(200));
    want.push(0x7f);
    assert_eq!(bytes_of(&entry), want);
    assert_eq!(decode_new::<Entry>(&want).unwrap().0, entry);
}

#[test]
fn timestamp_forms() {
    // seconds in [0, 2^32) take the narrow form
    let entry = Entry { since: Timestamp::new(1, 2), ..Entry::default() };
    assert_eq!(
        bytes_of(&entry),
        [0x04, 0x00, 0x00, 0x00, 0x01, 0x00, 0x00, 0x00, 0x02, 0x7f]
    );

    // anything before the epoch needs the wide form
    let entry = Entry { since: Timestamp::new(-1, 0), ..Entry::default() };
    let want = [
        0x84, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0x00, 0x00, 0x00, 0x00, 0x7f,
    ];
    assert_eq!(bytes_of(&entry), want);
    assert_eq!(decode_new::<Entry>(&want).unwrap().0, entry);
}

#[test]
fn uint16_forms() {
    let omni = Omni { port: 5, ..Omni::default() };
    assert_eq!(bytes_of(&omni), [0x02, 0x05, 0x7f]);
    assert_eq!(decode_new::<Omni>(&[0x02, 0x05, 0x7f]).unwrap().0, omni);

    let omni = Omni { port: 0x1234, ..Omni::default() };
    assert_eq!(bytes_of(&omni), [0x82, 0x12, 0x34, 0x7f]);
    assert_eq!(decode_new::<Omni>(&[0x82, 0x12, 0x34, 0x7f]).unwrap().0, omni);
}

#[test]
fn uint64_form_boundary() {
    let omni = Omni { total: (1 << 49) - 1, ..Omni::default() };
    assert_eq!(
        bytes_of(&omni),
        [0x04, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0x7f, 0x7f]
    );

    let omni = Omni { total: 1 << 49, ..Omni::default() };
    assert_eq!(
        bytes_of(&omni),
        [0x84, 0x00, 0x02, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x7f]
    );
}

#[test]
fn signed_magnitude_in_the_tag() {
    let omni = Omni { delta: 1, ..Omni::default() };
    assert_eq!(bytes_of(&omni), [0x05, 0x01, 0x7f]);

    let omni = Omni { delta: -1, ..Omni::default() };
    assert_eq!(bytes_of(&omni), [0x85, 0x01, 0x7f]);
    assert_eq!(decode_new::<Omni>(&[0x85, 0x01, 0x7f]).unwrap().0, omni);

    // the widest magnitude runs the varint to its nine-byte cap
    let omni = Omni { shift: -i64::MAX, ..Omni::default() };
    let want = [
        0x86, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0x7f, 0x7f,
    ];
    assert_eq!(bytes_of(&omni), want);
    assert_eq!(decode_new::<Omni>(&want).unwrap().0, omni);
}

#[test]
fn most_negative_integers_are_rejected() {
    let mut buf = vec![0u8; 64];
    let omni = Omni { delta: i32::MIN, ..Omni::default() };
    assert!(matches!(
        omni.encode(&mut buf, 0),
        Err(EncodeError::LimitBreach(Limit::Magnitude))
    ));
    let omni = Omni { shift: i64::MIN, ..Omni::default() };
    assert!(matches!(
        omni.encode(&mut buf, 0),
        Err(EncodeError::LimitBreach(Limit::Magnitude))
    ));
    let omni = Omni { shifts: vec![i64::MIN], ..Omni::default() };
    assert!(matches!(
        omni.encode(&mut buf, 0),
        Err(EncodeError::LimitBreach(Limit::Magnitude))
    ));
    let omni = Omni { deltas: vec![i32::MIN], ..Omni::default() };
    assert!(matches!(
        omni.encode(&mut buf, 0),
        Err(EncodeError::LimitBreach(Limit::Magnitude))
    ));
}

#[test]
fn maximal_negative_magnitudes_cannot_be_decoded_either() {
    // a sign-flagged int32 whose magnitude claims exactly 2^31: negating
    // it would overflow, so no encoder emits this and no decoder takes it
    let buf = [0x85, 0x80, 0x80, 0x80, 0x80, 0x08, 0x7f];
    let mut omni = Omni::default();
    assert_eq!(
        omni.decode(&buf, 0, buf.len()).unwrap_err(),
        DecodeError::SchemaMismatch(0x85)
    );

    // same for int64 with a nine-byte magnitude varint of exactly 2^63
    let buf = [
        0x86, 0x80, 0x80, 0x80, 0x80, 0x80, 0x80, 0x80, 0x80, 0x80, 0x7f,
    ];
    let mut omni = Omni::default();
    assert_eq!(
        omni.decode(&buf, 0, buf.len()).unwrap_err(),
        DecodeError::SchemaMismatch(0x86)
    );
}

#[test]
fn full_entry_has_ascending_tags() {
    let entry = Entry {
        id: 7,
        name: "x".into(),
        tags: vec![5],
        flag: true,
        since: Timestamp::new(1, 0),
    };
    assert_eq!(
        bytes_of(&entry),
        [
            0x00, 0x07, // id
            0x01, 0x01, b'x', // name
            0x02, 0x01, 0x05, // tags
            0x03, // flag, presence only
            0x04, 0x00, 0x00, 0x00, 0x01, 0x00, 0x00, 0x00, 0x00, // since
            0x7f,
        ]
    );
}

#[test]
fn nested_records() {
    let omni = Omni {
        inner: Some(Box::new(Omni { tiny: 1, ..Omni::default() })),
        ..Omni::default()
    };
    assert_eq!(bytes_of(&omni), [0x0c, 0x01, 0x01, 0x7f, 0x7f]);
    assert_eq!(decode_new::<Omni>(&[0x0c, 0x01, 0x01, 0x7f, 0x7f]).unwrap().0, omni);

    let omni = Omni {
        kids: vec![Omni::default(), Omni { flag: true, ..Omni::default() }],
        ..Omni::default()
    };
    assert_eq!(bytes_of(&omni), [0x0d, 0x02, 0x7f, 0x00, 0x7f, 0x7f]);
    assert_eq!(
        decode_new::<Omni>(&[0x0d, 0x02, 0x7f, 0x00, 0x7f, 0x7f]).unwrap().0,
        omni
    );
}

#[test]
fn signed_list_elements_fold_their_sign() {
    let omni = Omni { deltas: vec![1, -1, 2, -2, 0], ..Omni::default() };
    let want = [0x12, 0x05, 0x02, 0x03, 0x04, 0x05, 0x00, 0x7f];
    assert_eq!(bytes_of(&omni), want);
    assert_eq!(decode_new::<Omni>(&want).unwrap().0, omni);
}

#[test]
fn timestamp_list_elements_use_the_wide_payload() {
    let omni = Omni { stamps: vec![Timestamp::new(-1, 5)], ..Omni::default() };
    let want = [
        0x16, 0x01, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0x00, 0x00, 0x00, 0x05, 0x7f,
    ];
    assert_eq!(bytes_of(&omni), want);
    assert_eq!(decode_new::<Omni>(&want).unwrap().0, omni);
}

#[test]
fn unknown_tag_is_a_mismatch() {
    assert_eq!(
        decode_new::<Entry>(&[0x05, 0x7f]).unwrap_err(),
        DecodeError::SchemaMismatch(0x05)
    );
}

#[test]
fn flagged_tag_on_a_single_form_type_is_a_mismatch() {
    // field 1 of Entry is text, which has no extended form
    assert_eq!(
        decode_new::<Entry>(&[0x81, 0x02, b'H', b'i', 0x7f]).unwrap_err(),
        DecodeError::SchemaMismatch(0x81)
    );
}

#[test]
fn out_of_order_tags_are_a_mismatch() {
    // name before id: the id codec has already been passed when 0x00 shows
    let buf = [0x01, 0x02, b'H', b'i', 0x00, 0x07, 0x7f];
    assert_eq!(
        decode_new::<Entry>(&buf).unwrap_err(),
        DecodeError::SchemaMismatch(0x00)
    );
}

#[test]
fn truncated_input_is_incomplete() {
    let entry = Entry { name: "XY".into(), ..Entry::default() };
    let bytes = bytes_of(&entry);
    assert_eq!(bytes, [0x01, 0x02, b'X', b'Y', 0x7f]);
    for end in 0..bytes.len() {
        assert_eq!(
            decode_new::<Entry>(&bytes[..end]).unwrap_err(),
            DecodeError::Incomplete,
            "prefix of {} bytes",
            end
        );
    }
}

#[test]
fn trailing_bytes_are_left_alone() {
    let buf = [0x00, 0x07, 0x7f, 0xde, 0xad];
    let (entry, end) = decode_new::<Entry>(&buf).unwrap();
    assert_eq!(entry.id, 7);
    assert_eq!(end, 3);
}

#[test]
fn decode_merges_into_the_record() {
    let mut entry = Entry { id: 9, flag: true, ..Entry::default() };
    let end = entry.decode(&[0x01, 0x02, b'H', b'i', 0x7f], 0, 5).unwrap();
    assert_eq!(end, 5);
    assert_eq!(entry.id, 9);
    assert!(entry.flag);
    assert_eq!(entry.name, "Hi");
}

#[test]
fn ill_formed_text_decodes_lossily() {
    let (entry, _) = decode_new::<Entry>(&[0x01, 0x02, 0xc3, 0x28, 0x7f]).unwrap();
    assert_eq!(entry.name, "\u{fffd}(");
}

#[test]
fn negative_zero_floats_are_elided() {
    let omni = Omni { ratio: -0.0, mean: -0.0, ..Omni::default() };
    assert_eq!(bytes_of(&omni), [0x7f]);
}

#[test]
fn zeroed_fields_write_nothing() {
    let omni = Omni {
        flag: false,
        tiny: 0,
        port: 0,
        count: 0,
        total: 0,
        delta: 0,
        shift: 0,
        ratio: 0.0,
        mean: 0.0,
        at: Timestamp::EPOCH,
        label: String::new(),
        raw: Vec::new(),
        inner: None,
        ..Omni::default()
    };
    assert_eq!(bytes_of(&omni), [0x7f]);
}

/// Deliberately cramped limits so breaches fit in a handful of bytes.
#[derive(Debug, Clone, Default, PartialEq)]
struct Tiny {
    note: String,
    nums: Vec<u32>,
}

impl Record for Tiny {
    const SIZE_MAX: usize = 16;
    const LIST_MAX: usize = 3;

    fn encode_fields(&self, enc: &mut Encoder<'_>) -> Result<(), EncodeError> {
        enc.text_field(0, &self.note)?;
        enc.u32_list_field(1, &self.nums)
    }

    fn decode_fields(&mut self, dec: &mut Decoder<'_>) -> Result<(), DecodeError> {
        if let Some(v) = dec.text_field(0)? {
            self.note = v;
        }
        if let Some(v) = dec.u32_list_field(1)? {
            self.nums = v;
        }
        Ok(())
    }
}

#[test]
fn oversized_text_breaches_on_encode() {
    let mut buf = vec![0u8; 64];
    let tiny = Tiny { note: "a".repeat(17), ..Tiny::default() };
    assert!(matches!(
        tiny.encode(&mut buf, 0),
        Err(EncodeError::LimitBreach(Limit::Size { size: 17, max: 16 }))
    ));
}

#[test]
fn oversized_record_breaches_on_encode() {
    // 12 bytes of text field plus 5 of list field pass the 16 byte ceiling
    let mut buf = vec![0u8; 64];
    let tiny = Tiny { note: "a".repeat(10), nums: vec![1, 2, 3] };
    assert!(matches!(
        tiny.encode(&mut buf, 0),
        Err(EncodeError::LimitBreach(Limit::Size { max: 16, .. }))
    ));
}

#[test]
fn oversized_list_breaches_on_encode() {
    let mut buf = vec![0u8; 64];
    let tiny = Tiny { nums: vec![1, 2, 3, 4], ..Tiny::default() };
    assert!(matches!(
        tiny.encode(&mut buf, 0),
        Err(EncodeError::LimitBreach(Limit::Count { count: 4, max: 3 }))
    ));
}

#[test]
fn short_buffer_is_full_not_a_breach() {
    let mut buf = vec![0u8; 4];
    let tiny = Tiny { note: "abcdef".into(), ..Tiny::default() };
    assert!(matches!(tiny.encode(&mut buf, 0), Err(EncodeError::BufferFull(_))));
}

#[test]
fn encode_to_grows_the_scratch_buffer() {
    let entry = Entry { name: "y".repeat(5000), ..Entry::default() };
    let mut sink = Vec::new();
    let scratch = entry.encode_to(&mut sink, Vec::new()).unwrap();
    assert!(scratch.len() >= sink.len());
    let (back, end) = decode_new::<Entry>(&sink).unwrap();
    assert_eq!(end, sink.len());
    assert_eq!(back, entry);
}

#[test]
fn declared_size_breaches_before_any_read() {
    // the prefix claims 1000 bytes of text against a 16 byte ceiling,
    // and the breach must win over the missing payload
    let buf = [0x00, 0xe8, 0x07];
    let mut tiny = Tiny::default();
    assert_eq!(
        tiny.decode(&buf, 0, buf.len()).unwrap_err(),
        DecodeError::LimitBreach(Limit::Size { size: 1000, max: 16 })
    );
}

#[test]
fn declared_size_breaches_against_the_default_ceiling() {
    // 2^28 claimed bytes in six bytes of input
    let buf = [0x01, 0x80, 0x80, 0x80, 0x80, 0x01];
    let mut entry = Entry::default();
    assert_eq!(
        entry.decode(&buf, 0, buf.len()).unwrap_err(),
        DecodeError::LimitBreach(Limit::Size { size: 1 << 28, max: Entry::SIZE_MAX })
    );
}

#[test]
fn declared_count_breaches_before_any_read() {
    let buf = [0x01, 0x04];
    let mut tiny = Tiny::default();
    assert_eq!(
        tiny.decode(&buf, 0, buf.len()).unwrap_err(),
        DecodeError::LimitBreach(Limit::Count { count: 4, max: 3 })
    );
}

#[test]
fn payload_overrunning_the_record_ceiling_breaches() {
    // declared 16 text bytes are within the per-payload ceiling, but the
    // tag and size prefix push the record total to 18
    let mut buf = vec![0x00, 0x10];
    buf.extend([b'a'; 16]);
    buf.push(0x7f);
    let mut tiny = Tiny::default();
    assert_eq!(
        tiny.decode(&buf, 0, buf.len()).unwrap_err(),
        DecodeError::LimitBreach(Limit::Size { size: 18, max: 16 })
    );
}

#[test]
fn uint16_list_element_overflow_is_a_mismatch() {
    // 70000 does not fit the element type
    let buf = [0x0f, 0x01, 0xf0, 0xa2, 0x04, 0x7f];
    let mut omni = Omni::default();
    assert_eq!(
        omni.decode(&buf, 0, buf.len()).unwrap_err(),
        DecodeError::SchemaMismatch(0x0f)
    );
}

#[test]
fn varint_overrun_is_a_mismatch() {
    // compact uint32 whose fifth byte carries bits past the accumulator
    let buf = [0x00, 0xff, 0xff, 0xff, 0xff, 0x7f, 0x7f];
    let mut entry = Entry::default();
    assert_eq!(
        entry.decode(&buf, 0, buf.len()).unwrap_err(),
        DecodeError::SchemaMismatch(0x7f)
    );
}
