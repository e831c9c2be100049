//! Round-Trip- und Byte-Vektor-Tests über die öffentliche API.
//!
//! Jede Struktur wird aus festen Bytefolgen decodiert und muss exakt dieselben
//! Bytes wieder erzeugen; dazu die Rahmen-Grenzfälle (62/63 Byte Body,
//! Opcode 0x7F/0x80) und die Kapazitätsgrenze der Gradienten.

use swfx::coder::{decode, encode};
use swfx::gradient::MAX_GRADIENTS;
use swfx::tag::{self, code, header_size};
use swfx::{
    ActionObject, AlignmentZone, Color, Context, CoordTransform, DefineFontName, DoAction,
    Encodable, Error, Gradient, GradientFill, MovieTag, Property, Spread, UnknownTag,
};

// ============================================================================
// Hilfsfunktionen
// ============================================================================

/// Decodiert `bytes` als `T`, encodiert zurück und vergleicht byteweise.
fn assert_reencodes<T>(bytes: &[u8], ctx: &Context) -> T
where
    T: swfx::Decodable + Encodable + std::fmt::Debug,
{
    let value = decode::<T>(bytes, ctx).expect("decode");
    assert_eq!(value.size_of(ctx), bytes.len(), "size_of of {value:?}");
    assert_eq!(encode(&value, ctx).expect("encode"), bytes, "re-encode of {value:?}");
    value
}

fn font_name_with_body(len: usize) -> DefineFontName {
    // Body = 2 (id) + name + NUL + copyright "" + NUL
    let name = "n".repeat(len - 4);
    DefineFontName::new(42, name, "").unwrap()
}

// ============================================================================
// Feste Bytefolgen
// ============================================================================

#[test]
fn fixed_tag_stream_reencodes() {
    let ctx = Context::new();
    let parts: [&[u8]; 6] = [
        // DefineFontName id=1 "Arial" "(c)"
        &[0x0C, 0x16, 0x01, 0x00],
        b"Arial\0(c)\0",
        // DoAction: Play (0x06), GotoFrame (0x81, 2 Byte), End
        &[0x07, 0x03, 0x06, 0x81, 0x02, 0x00, 0x05, 0x00, 0x00],
        // SetBackgroundColor (9), 3 Byte
        &[0x43, 0x02, 0xFF, 0xFF, 0xFF],
        // ShowFrame
        &[0x40, 0x00],
        // End
        &[0x00, 0x00],
    ];
    let stream = parts.concat();

    let tags = tag::decode_tags(&stream, &ctx).unwrap();
    assert_eq!(tags.len(), 5);
    assert!(matches!(&tags[0], MovieTag::FontName(f) if f.name() == "Arial"));
    assert!(matches!(&tags[1], MovieTag::DoAction(a) if a.actions().len() == 2));
    assert_eq!(tags[2].code(), code::SET_BACKGROUND_COLOR);
    assert_eq!(tag::encode_tags(&tags, &ctx).unwrap(), stream);
}

#[test]
fn fixed_gradient_reencodes() {
    let ctx = Context::new();
    // radial, Matrix mit Translation (1, -1), Reflect | Linear | 1 Stop
    let bytes = [0x12, 0b0000_0100, 0b1110_0000, 0x40 | 0x10 | 0x01, 0x80, 0x10, 0x20, 0x30];
    let fill: GradientFill = assert_reencodes(&bytes, &ctx);
    assert!(fill.is_radial());
    assert_eq!(fill.spread(), Spread::Reflect);
    assert_eq!(fill.transform(), &CoordTransform::translate(1, -1));
    assert_eq!(fill.gradients(), &[Gradient::new(0x80, Color::rgb(0x10, 0x20, 0x30))]);
}

#[test]
fn fixed_transparent_gradient_reencodes() {
    let ctx = Context::new().with_transparency();
    let bytes = [0x10, 0x00, 0x02, 0x00, 1, 2, 3, 4, 0xFF, 5, 6, 7, 8];
    let fill: GradientFill = assert_reencodes(&bytes, &ctx);
    assert_eq!(fill.gradients()[1].color, Color::rgba(5, 6, 7, 8));
}

#[test]
fn gradient_with_wide_matrix_reencodes() {
    // Translation (0, 0) mit 3 Bit Feldbreite statt 0, keine Stops
    let fill: GradientFill = assert_reencodes(&[0x10, 0x06, 0x00, 0x00], &Context::new());
    assert!(!fill.transform().is_canonical());
    assert!(fill.gradients().is_empty());
}

#[test]
fn fixed_alignment_zone_reencodes() {
    let zone: AlignmentZone = assert_reencodes(&[0x00, 0x38, 0x00, 0xBC], &Context::new());
    assert_eq!(zone, AlignmentZone::new(0.5, -1.0));
}

#[test]
fn fixed_property_reencodes_per_version() {
    let v4 = Context::new().with_version(4);
    let p: Property = assert_reencodes(&[0x00, 0x00, 0x20, 0x41], &v4);
    assert_eq!(p, Property::Rotation);
    let p: Property = assert_reencodes(&[0x0A, 0x00, 0x00, 0x00], &Context::new());
    assert_eq!(p, Property::Rotation);
}

// ============================================================================
// Tag-Rahmen
// ============================================================================

#[test]
fn body_of_62_and_63_bytes() {
    let ctx = Context::new();
    for (len, extended) in [(62, false), (63, true)] {
        let font = font_name_with_body(len);
        let bytes = encode(&font, &ctx).unwrap();
        assert_eq!(bytes.len(), header_size(len) + len);
        let word = u16::from_le_bytes([bytes[0], bytes[1]]);
        assert_eq!(word >> 6, code::DEFINE_FONT_NAME);
        if extended {
            assert_eq!(word & 0x3F, 0x3F);
            assert_eq!(&bytes[2..6], &63u32.to_le_bytes());
        } else {
            assert_eq!(word & 0x3F, 62);
        }
        assert_eq!(decode::<DefineFontName>(&bytes, &ctx).unwrap(), font);
    }
}

#[test]
fn short_length_63_is_never_literal() {
    // 0x3F im Kurzfeld verlangt immer eine 32-Bit-Länge
    let bytes = [0x3F, 0x16];
    assert!(matches!(
        decode::<DefineFontName>(&bytes, &Context::new()),
        Err(Error::OutOfData { .. })
    ));
}

#[test]
fn declared_length_off_by_one() {
    let ctx = Context::new();
    let mut bytes = encode(&DefineFontName::new(1, "Arial", "(c)").unwrap(), &ctx).unwrap();
    bytes[0] += 1;
    bytes.push(0xAA);
    match decode::<DefineFontName>(&bytes, &ctx).unwrap_err() {
        Error::FramingConsistency { structure, delta, .. } => {
            assert_eq!(structure, "DefineFontName");
            assert_eq!(delta, 1);
        }
        other => panic!("expected framing error, got {other}"),
    }
}

#[test]
fn unknown_tag_forms_survive() {
    let ctx = Context::new();
    let tags = vec![
        MovieTag::Unknown(UnknownTag::new(code::DEFINE_BITS, vec![1, 2, 3]).unwrap().with_extended_header()),
        MovieTag::Unknown(UnknownTag::new(code::DEFINE_BITS, vec![1, 2, 3]).unwrap()),
        MovieTag::Unknown(UnknownTag::new(700, vec![0; 1000]).unwrap()),
    ];
    let bytes = tag::encode_tags(&tags, &ctx).unwrap();
    assert_eq!(bytes.len(), (6 + 3) + (2 + 3) + (6 + 1000));
    assert_eq!(tag::decode_tags(&bytes, &ctx).unwrap(), tags);
}

// ============================================================================
// Action-Records
// ============================================================================

#[test]
fn opcode_boundary() {
    let ctx = Context::new();
    let last_basic = ActionObject::basic(0x7F).unwrap();
    assert_eq!(encode(&last_basic, &ctx).unwrap(), [0x7F]);

    let first_payload = ActionObject::with_payload(0x80, vec![]).unwrap();
    assert_eq!(encode(&first_payload, &ctx).unwrap(), [0x80, 0x00, 0x00]);

    let payload = ActionObject::with_payload(0x80, vec![1, 2, 3, 4]).unwrap();
    let bytes = encode(&payload, &ctx).unwrap();
    assert_eq!(bytes, [0x80, 0x04, 0x00, 1, 2, 3, 4]);
    assert_eq!(decode::<ActionObject>(&bytes, &ctx).unwrap(), payload);
}

#[test]
fn do_action_with_long_body() {
    let ctx = Context::new();
    let action = ActionObject::with_payload(0x96, vec![7; 100]).unwrap();
    let tag = DoAction::new(vec![action.clone(), action]).unwrap();
    let bytes = encode(&tag, &ctx).unwrap();
    // 2 * 103 + End
    assert_eq!(bytes.len(), 6 + 207);
    assert_eq!(decode::<DoAction>(&bytes, &ctx).unwrap(), tag);
}

// ============================================================================
// Kapazität und Kontext
// ============================================================================

#[test]
fn gradient_capacity() {
    let mut fill = GradientFill::linear(CoordTransform::identity());
    for i in 0..MAX_GRADIENTS as u8 {
        fill.add(Gradient::new(i, Color::rgb(i, 0, 0))).unwrap();
    }
    let first_15 = fill.gradients().to_vec();
    assert!(matches!(
        fill.add(Gradient::new(99, Color::default())),
        Err(Error::CapacityExceeded { capacity: 15, requested: 16, .. })
    ));
    assert_eq!(fill.gradients(), &first_15[..]);

    let ctx = Context::new();
    let bytes = encode(&fill, &ctx).unwrap();
    assert_eq!(bytes[2] & 0x0F, 15);
    assert_eq!(decode::<GradientFill>(&bytes, &ctx).unwrap(), fill);
}

#[test]
fn transparency_adds_one_byte_per_stop() {
    let fill = GradientFill::new(
        true,
        CoordTransform::scale(2.0, 2.0),
        vec![Gradient::new(0, Color::rgba(1, 2, 3, 4)); 5],
    )
    .unwrap();
    let rgb = encode(&fill, &Context::new()).unwrap();
    let rgba = encode(&fill, &Context::new().with_transparency()).unwrap();
    assert_eq!(rgba.len(), rgb.len() + 5);
}

#[test]
fn size_of_is_stable() {
    let ctx = Context::new().with_transparency();
    let fill = GradientFill::new(false, CoordTransform::shear(0.5, 0.0), vec![Gradient::new(1, Color::default()); 3])
        .unwrap();
    assert_eq!(fill.size_of(&ctx), fill.size_of(&ctx));
    assert_eq!(encode(&fill, &ctx).unwrap().len(), fill.size_of(&ctx));
}
