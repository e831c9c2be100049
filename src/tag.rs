//! Container tag framing.
//!
//! Every tag starts with a little-endian 16-bit header holding a 10-bit type
//! code and a 6-bit body length:
//!
//! ```text
//! short form     [code:10 | length:6]                  length 0..=62
//! extended form  [code:10 | 0x3F] [length:UI32]        length >= 63
//! ```
//!
//! 0x3F is never a literal length; a 62 byte body is the longest short-form
//! tag. The body length is computed before anything is written (see
//! [`coder`](crate::coder)), so the header never has to be backpatched.
//!
//! [`MovieTag`] dispatches on the type code. Codes without a dedicated
//! structure decode as [`UnknownTag`], which keeps the raw body and the header
//! form so that re-encoding reproduces the input exactly.

use crate::action::DoAction;
use crate::bitstream::{BitReader, BitWriter};
use crate::coder::{self, Decodable, Encodable, Structure};
use crate::context::Context;
use crate::font::DefineFontName;
use crate::{Error, Result};

/// Length field value announcing an extended 32-bit length.
pub const LENGTH_SENTINEL: u16 = 0x3F;

/// Longest body that fits the short form.
pub const MAX_SHORT_LENGTH: usize = 62;

/// Largest type code a header can carry.
pub const MAX_CODE: u16 = 0x3FF;

/// Type codes of the tags in the format.
pub mod code {
    pub const END: u16 = 0;
    pub const SHOW_FRAME: u16 = 1;
    pub const DEFINE_SHAPE: u16 = 2;
    pub const PLACE_OBJECT: u16 = 4;
    pub const REMOVE_OBJECT: u16 = 5;
    pub const DEFINE_BITS: u16 = 6;
    pub const DEFINE_BUTTON: u16 = 7;
    pub const JPEG_TABLES: u16 = 8;
    pub const SET_BACKGROUND_COLOR: u16 = 9;
    pub const DEFINE_FONT: u16 = 10;
    pub const DEFINE_TEXT: u16 = 11;
    pub const DO_ACTION: u16 = 12;
    pub const DEFINE_FONT_INFO: u16 = 13;
    pub const DEFINE_SOUND: u16 = 14;
    pub const START_SOUND: u16 = 15;
    pub const DEFINE_BUTTON_SOUND: u16 = 17;
    pub const SOUND_STREAM_HEAD: u16 = 18;
    pub const SOUND_STREAM_BLOCK: u16 = 19;
    pub const DEFINE_BITS_LOSSLESS: u16 = 20;
    pub const DEFINE_BITS_JPEG2: u16 = 21;
    pub const DEFINE_SHAPE2: u16 = 22;
    pub const PROTECT: u16 = 24;
    pub const PLACE_OBJECT2: u16 = 26;
    pub const REMOVE_OBJECT2: u16 = 28;
    pub const DEFINE_SHAPE3: u16 = 32;
    pub const DEFINE_TEXT2: u16 = 33;
    pub const DEFINE_BUTTON2: u16 = 34;
    pub const DEFINE_BITS_JPEG3: u16 = 35;
    pub const DEFINE_BITS_LOSSLESS2: u16 = 36;
    pub const DEFINE_EDIT_TEXT: u16 = 37;
    pub const DEFINE_SPRITE: u16 = 39;
    pub const FRAME_LABEL: u16 = 43;
    pub const SOUND_STREAM_HEAD2: u16 = 45;
    pub const DEFINE_MORPH_SHAPE: u16 = 46;
    pub const DEFINE_FONT2: u16 = 48;
    pub const EXPORT_ASSETS: u16 = 56;
    pub const IMPORT_ASSETS: u16 = 57;
    pub const DO_INIT_ACTION: u16 = 59;
    pub const DEFINE_VIDEO_STREAM: u16 = 60;
    pub const VIDEO_FRAME: u16 = 61;
    pub const DEFINE_FONT_INFO2: u16 = 62;
    pub const FILE_ATTRIBUTES: u16 = 69;
    pub const PLACE_OBJECT3: u16 = 70;
    pub const DEFINE_FONT_ALIGN_ZONES: u16 = 73;
    pub const CSM_TEXT_SETTINGS: u16 = 74;
    pub const DEFINE_FONT3: u16 = 75;
    pub const SYMBOL_CLASS: u16 = 76;
    pub const METADATA: u16 = 77;
    pub const DEFINE_SCALING_GRID: u16 = 78;
    pub const DO_ABC: u16 = 82;
    pub const DEFINE_SHAPE4: u16 = 83;
    pub const DEFINE_MORPH_SHAPE2: u16 = 84;
    pub const DEFINE_SCENE_AND_FRAME_LABEL_DATA: u16 = 86;
    pub const DEFINE_BINARY_DATA: u16 = 87;
    pub const DEFINE_FONT_NAME: u16 = 88;
    pub const START_SOUND2: u16 = 89;
    pub const DEFINE_BITS_JPEG4: u16 = 90;
    pub const DEFINE_FONT4: u16 = 91;

    const NAMES: &[(u16, &str)] = &[
        (END, "End"),
        (SHOW_FRAME, "ShowFrame"),
        (DEFINE_SHAPE, "DefineShape"),
        (PLACE_OBJECT, "PlaceObject"),
        (REMOVE_OBJECT, "RemoveObject"),
        (DEFINE_BITS, "DefineBits"),
        (DEFINE_BUTTON, "DefineButton"),
        (JPEG_TABLES, "JPEGTables"),
        (SET_BACKGROUND_COLOR, "SetBackgroundColor"),
        (DEFINE_FONT, "DefineFont"),
        (DEFINE_TEXT, "DefineText"),
        (DO_ACTION, "DoAction"),
        (DEFINE_FONT_INFO, "DefineFontInfo"),
        (DEFINE_SOUND, "DefineSound"),
        (START_SOUND, "StartSound"),
        (DEFINE_BUTTON_SOUND, "DefineButtonSound"),
        (SOUND_STREAM_HEAD, "SoundStreamHead"),
        (SOUND_STREAM_BLOCK, "SoundStreamBlock"),
        (DEFINE_BITS_LOSSLESS, "DefineBitsLossless"),
        (DEFINE_BITS_JPEG2, "DefineBitsJPEG2"),
        (DEFINE_SHAPE2, "DefineShape2"),
        (PROTECT, "Protect"),
        (PLACE_OBJECT2, "PlaceObject2"),
        (REMOVE_OBJECT2, "RemoveObject2"),
        (DEFINE_SHAPE3, "DefineShape3"),
        (DEFINE_TEXT2, "DefineText2"),
        (DEFINE_BUTTON2, "DefineButton2"),
        (DEFINE_BITS_JPEG3, "DefineBitsJPEG3"),
        (DEFINE_BITS_LOSSLESS2, "DefineBitsLossless2"),
        (DEFINE_EDIT_TEXT, "DefineEditText"),
        (DEFINE_SPRITE, "DefineSprite"),
        (FRAME_LABEL, "FrameLabel"),
        (SOUND_STREAM_HEAD2, "SoundStreamHead2"),
        (DEFINE_MORPH_SHAPE, "DefineMorphShape"),
        (DEFINE_FONT2, "DefineFont2"),
        (EXPORT_ASSETS, "ExportAssets"),
        (IMPORT_ASSETS, "ImportAssets"),
        (DO_INIT_ACTION, "DoInitAction"),
        (DEFINE_VIDEO_STREAM, "DefineVideoStream"),
        (VIDEO_FRAME, "VideoFrame"),
        (DEFINE_FONT_INFO2, "DefineFontInfo2"),
        (FILE_ATTRIBUTES, "FileAttributes"),
        (PLACE_OBJECT3, "PlaceObject3"),
        (DEFINE_FONT_ALIGN_ZONES, "DefineFontAlignZones"),
        (CSM_TEXT_SETTINGS, "CSMTextSettings"),
        (DEFINE_FONT3, "DefineFont3"),
        (SYMBOL_CLASS, "SymbolClass"),
        (METADATA, "Metadata"),
        (DEFINE_SCALING_GRID, "DefineScalingGrid"),
        (DO_ABC, "DoABC"),
        (DEFINE_SHAPE4, "DefineShape4"),
        (DEFINE_MORPH_SHAPE2, "DefineMorphShape2"),
        (DEFINE_SCENE_AND_FRAME_LABEL_DATA, "DefineSceneAndFrameLabelData"),
        (DEFINE_BINARY_DATA, "DefineBinaryData"),
        (DEFINE_FONT_NAME, "DefineFontName"),
        (START_SOUND2, "StartSound2"),
        (DEFINE_BITS_JPEG4, "DefineBitsJPEG4"),
        (DEFINE_FONT4, "DefineFont4"),
    ];

    /// Human readable name of a type code.
    pub fn name(code: u16) -> Option<&'static str> {
        NAMES.iter().find(|(c, _)| *c == code).map(|(_, n)| *n)
    }
}

/// Decoded tag header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TagHeader {
    pub code: u16,
    /// Body length in bytes, header excluded.
    pub length: u32,
    /// True when the header used the extended 32-bit length.
    pub extended: bool,
}

impl TagHeader {
    /// Header for a body of `length` bytes. The extended form is used when
    /// `length` needs it or when `force_extended` is set.
    pub fn new(code: u16, length: usize, force_extended: bool) -> Result<Self> {
        if code > MAX_CODE {
            return Err(Error::invalid_value(format!("tag code {code} exceeds {MAX_CODE}")));
        }
        let length = u32::try_from(length)
            .map_err(|_| Error::LengthOverflow { structure: "TagHeader", length })?;
        Ok(Self {
            code,
            length,
            extended: force_extended || length as usize > MAX_SHORT_LENGTH,
        })
    }

    /// Encoded size of the header itself.
    pub fn size(&self) -> usize {
        if self.is_extended() { 6 } else { 2 }
    }

    fn is_extended(&self) -> bool {
        self.extended || self.length as usize > MAX_SHORT_LENGTH
    }

    /// True when the long form was used although the short one would have
    /// fit. Re-encoding has to repeat that choice to stay byte-exact.
    pub fn is_forced_extended(&self) -> bool {
        self.extended && self.length as usize <= MAX_SHORT_LENGTH
    }

    pub fn read(reader: &mut BitReader<'_>) -> Result<Self> {
        let word = reader.read_u16()?;
        let code = word >> 6;
        let short = word & LENGTH_SENTINEL;
        if short == LENGTH_SENTINEL {
            let length = reader.read_u32()?;
            Ok(Self { code, length, extended: true })
        } else {
            Ok(Self { code, length: u32::from(short), extended: false })
        }
    }

    pub fn write(&self, writer: &mut BitWriter) -> Result<()> {
        if self.is_extended() {
            writer.write_u16((self.code << 6) | LENGTH_SENTINEL)?;
            writer.write_u32(self.length)
        } else {
            writer.write_u16((self.code << 6) | self.length as u16)
        }
    }
}

/// Header size for a canonical header around a body of `length` bytes.
pub fn header_size(length: usize) -> usize {
    if length > MAX_SHORT_LENGTH { 6 } else { 2 }
}

/// A structure framed as a container tag.
///
/// Implementors describe only the body; [`tag_size`], [`write_tag`] and
/// [`read_tag`] add the header and the position checks.
pub trait Tag: Structure + Sized {
    /// Type code written into the header.
    const CODE: u16;

    /// Exact body length under `ctx`.
    fn body_size(&self, ctx: &Context) -> usize;

    /// Writes exactly `body_size` bytes.
    fn write_body(&self, writer: &mut BitWriter, ctx: &Context) -> Result<()>;

    /// Reads the body. The reader is positioned after the header.
    fn read_body(reader: &mut BitReader<'_>, ctx: &Context, header: &TagHeader) -> Result<Self>;

    /// Code to write; only opaque tags override this.
    fn code(&self) -> u16 {
        Self::CODE
    }

    /// Forces the extended header form even for short bodies.
    fn extended(&self) -> bool {
        false
    }
}

/// Total encoded size of `tag`, header included.
pub fn tag_size<T: Tag>(tag: &T, ctx: &Context) -> usize {
    let length = tag.body_size(ctx);
    let header = if tag.extended() { 6 } else { header_size(length) };
    header + length
}

/// Writes header and body of `tag` and checks the body length.
pub fn write_tag<T: Tag>(tag: &T, writer: &mut BitWriter, ctx: &Context) -> Result<()> {
    let length = tag.body_size(ctx);
    let header = TagHeader::new(tag.code(), length, tag.extended())?;
    log::trace!(
        "{} code={} length={length} extended={}",
        T::NAME,
        header.code,
        header.extended
    );
    header.write(writer)?;
    let start = writer.bit_position();
    tag.write_body(writer, ctx)?;
    coder::check_end(T::NAME, start, length, writer.bit_position())
}

/// Reads the body announced by `header` and checks it ends where declared.
pub fn read_body<T: Tag>(reader: &mut BitReader<'_>, ctx: &Context, header: &TagHeader) -> Result<T> {
    coder::read_framed(reader, T::NAME, header.length as usize, |r| T::read_body(r, ctx, header))
}

/// Reads a header that must carry `T::CODE`, then the body.
pub fn read_tag<T: Tag>(reader: &mut BitReader<'_>, ctx: &Context) -> Result<T> {
    let checkpoint = reader.save_checkpoint();
    let position = reader.bit_position();
    let header = TagHeader::read(reader)?;
    if header.code != T::CODE {
        reader.restore_checkpoint(checkpoint);
        return Err(Error::invalid_value(format!(
            "expected {} (code {}), found code {} at byte {}",
            T::NAME,
            T::CODE,
            header.code,
            position / 8
        )));
    }
    read_body(reader, ctx, &header)
}

/// A tag without a dedicated structure, kept as raw bytes.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct UnknownTag {
    code: u16,
    data: Vec<u8>,
    extended: bool,
}

impl UnknownTag {
    /// Wraps a raw body. The header form follows the body length.
    pub fn new(code: u16, data: Vec<u8>) -> Result<Self> {
        TagHeader::new(code, data.len(), false)?;
        Ok(Self { code, data, extended: false })
    }

    /// Forces the extended header form, as some producers write it for tags
    /// like DefineBits regardless of their length.
    pub fn with_extended_header(mut self) -> Self {
        self.extended = true;
        self
    }

    pub fn code(&self) -> u16 {
        self.code
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn is_extended(&self) -> bool {
        self.extended
    }
}

impl Structure for UnknownTag {
    const NAME: &'static str = "UnknownTag";
}

impl Tag for UnknownTag {
    // Nur für read_tag relevant; der Code steckt im Wert, siehe code().
    const CODE: u16 = MAX_CODE;

    fn body_size(&self, _ctx: &Context) -> usize {
        self.data.len()
    }

    fn write_body(&self, writer: &mut BitWriter, _ctx: &Context) -> Result<()> {
        writer.write_bytes(&self.data)
    }

    fn read_body(reader: &mut BitReader<'_>, _ctx: &Context, header: &TagHeader) -> Result<Self> {
        let data = reader.read_bytes(header.length as usize)?;
        Ok(Self { code: header.code, data, extended: header.is_forced_extended() })
    }

    fn code(&self) -> u16 {
        self.code
    }

    fn extended(&self) -> bool {
        self.extended
    }
}

/// Any tag of a tag stream.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum MovieTag {
    DoAction(DoAction),
    FontName(DefineFontName),
    Unknown(UnknownTag),
}

impl MovieTag {
    /// Type code of the tag.
    pub fn code(&self) -> u16 {
        match self {
            Self::DoAction(_) => code::DO_ACTION,
            Self::FontName(_) => code::DEFINE_FONT_NAME,
            Self::Unknown(t) => t.code(),
        }
    }

    /// Human readable tag name.
    pub fn name(&self) -> &'static str {
        code::name(self.code()).unwrap_or("Unknown")
    }
}

impl Structure for MovieTag {
    const NAME: &'static str = "MovieTag";
}

impl Encodable for MovieTag {
    fn size_of(&self, ctx: &Context) -> usize {
        match self {
            Self::DoAction(t) => tag_size(t, ctx),
            Self::FontName(t) => tag_size(t, ctx),
            Self::Unknown(t) => tag_size(t, ctx),
        }
    }

    fn write_into(&self, writer: &mut BitWriter, ctx: &Context) -> Result<()> {
        match self {
            Self::DoAction(t) => write_tag(t, writer, ctx),
            Self::FontName(t) => write_tag(t, writer, ctx),
            Self::Unknown(t) => write_tag(t, writer, ctx),
        }
    }
}

impl Decodable for MovieTag {
    fn read_from(reader: &mut BitReader<'_>, ctx: &Context) -> Result<Self> {
        let header = TagHeader::read(reader)?;
        match header.code {
            code::DO_ACTION => Ok(Self::DoAction(read_body(reader, ctx, &header)?)),
            code::DEFINE_FONT_NAME => Ok(Self::FontName(read_body(reader, ctx, &header)?)),
            other => {
                log::debug!(
                    "passing through {} (code {other}, {} bytes)",
                    code::name(other).unwrap_or("unknown tag"),
                    header.length
                );
                Ok(Self::Unknown(read_body(reader, ctx, &header)?))
            }
        }
    }
}

/// Decodes every tag in `bytes`.
pub fn decode_tags(bytes: &[u8], ctx: &Context) -> Result<Vec<MovieTag>> {
    let mut reader = BitReader::new(bytes);
    let mut tags: Vec<MovieTag> = Vec::new();
    while !reader.at_end() {
        if tags.last().is_some_and(|t| t.code() == code::END) {
            log::warn!("tag after End at byte {}", reader.byte_position());
        }
        tags.push(MovieTag::read_from(&mut reader, ctx)?);
    }
    log::debug!("decoded {} tags from {} bytes", tags.len(), bytes.len());
    Ok(tags)
}

/// Encodes `tags` back to back into one buffer of exactly their total size.
pub fn encode_tags(tags: &[MovieTag], ctx: &Context) -> Result<Vec<u8>> {
    let sizes: Vec<usize> = tags.iter().map(|t| t.size_of(ctx)).collect();
    let mut writer = BitWriter::new(sizes.iter().sum());
    for (tag, &size) in tags.iter().zip(&sizes) {
        coder::write_sized(tag, size, &mut writer, ctx)?;
    }
    Ok(writer.into_vec())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coder::{decode, encode};

    fn unknown(code: u16, len: usize) -> UnknownTag {
        UnknownTag::new(code, (0..len).map(|i| i as u8).collect()).unwrap()
    }

    #[test]
    fn header_short_form() {
        let mut w = BitWriter::new(2);
        TagHeader::new(code::SHOW_FRAME, 0, false).unwrap().write(&mut w).unwrap();
        assert_eq!(w.into_vec(), vec![0x40, 0x00]);
    }

    #[test]
    fn header_62_is_short_63_is_extended() {
        let short = TagHeader::new(code::DEFINE_BINARY_DATA, 62, false).unwrap();
        assert!(!short.extended);
        assert_eq!(short.size(), 2);

        let long = TagHeader::new(code::DEFINE_BINARY_DATA, 63, false).unwrap();
        assert!(long.extended);
        let mut w = BitWriter::new(6);
        long.write(&mut w).unwrap();
        let bytes = w.into_vec();
        // (87 << 6) | 0x3F = 0x15FF
        assert_eq!(bytes, vec![0xFF, 0x15, 63, 0, 0, 0]);

        let mut r = BitReader::new(&bytes);
        assert_eq!(TagHeader::read(&mut r).unwrap(), long);
    }

    #[test]
    fn code_out_of_range() {
        assert!(TagHeader::new(1024, 0, false).is_err());
        assert!(UnknownTag::new(2000, vec![]).is_err());
    }

    #[test]
    fn unknown_tag_round_trip_short_and_long() {
        let ctx = Context::new();
        for len in [0, 1, 62, 63, 300] {
            let tag = MovieTag::Unknown(unknown(code::DEFINE_BINARY_DATA, len));
            let bytes = encode(&tag, &ctx).unwrap();
            assert_eq!(bytes.len(), header_size(len) + len, "len={len}");
            assert_eq!(decode::<MovieTag>(&bytes, &ctx).unwrap(), tag);
        }
    }

    #[test]
    fn unknown_tag_writes_its_own_code() {
        let tag = unknown(700, 1);
        assert_eq!(Tag::code(&tag), 700);
        let bytes = encode(&MovieTag::Unknown(tag), &Context::new()).unwrap();
        // (700 << 6) | 1 = 0xAF01
        assert_eq!(bytes, vec![0x01, 0xAF, 0x00]);
    }

    #[test]
    fn forced_extended_header_is_preserved() {
        let ctx = Context::new();
        // DefineBits, Länge 3, aber im langen Header
        let bytes = [0xBF, 0x01, 3, 0, 0, 0, 0xAA, 0xBB, 0xCC];
        let tag = decode::<MovieTag>(&bytes, &ctx).unwrap();
        let MovieTag::Unknown(ref inner) = tag else { panic!("expected unknown tag") };
        assert!(inner.is_extended());
        assert_eq!(inner.code(), code::DEFINE_BITS);
        assert_eq!(encode(&tag, &ctx).unwrap(), bytes);
    }

    #[test]
    fn declared_length_longer_than_body() {
        let ctx = Context::new();
        let mut bytes = encode(&DefineFontName::new(7, "A", "B").unwrap(), &ctx).unwrap();
        // Länge um 1 erhöhen und ein Füllbyte anhängen
        bytes[0] += 1;
        bytes.push(0);
        let err = decode::<MovieTag>(&bytes, &ctx).unwrap_err();
        assert_eq!(
            err,
            Error::FramingConsistency { structure: "DefineFontName", offset: 2, expected: 7, delta: 1 }
        );
    }

    #[test]
    fn declared_length_past_buffer() {
        let bytes = [0x05, 0x16, 0x01, 0x00];
        assert!(matches!(
            decode::<MovieTag>(&bytes, &Context::new()),
            Err(Error::OutOfData { .. })
        ));
    }

    #[test]
    fn tag_stream_round_trip() {
        let ctx = Context::new();
        let tags = vec![
            MovieTag::FontName(DefineFontName::new(1, "Verdana", "").unwrap()),
            MovieTag::Unknown(unknown(code::SHOW_FRAME, 0)),
            MovieTag::Unknown(unknown(code::END, 0)),
        ];
        let bytes = encode_tags(&tags, &ctx).unwrap();
        assert_eq!(&bytes[bytes.len() - 4..], &[0x40, 0x00, 0x00, 0x00]);
        assert_eq!(decode_tags(&bytes, &ctx).unwrap(), tags);
    }

    #[test]
    fn names() {
        assert_eq!(code::name(code::DEFINE_FONT_NAME), Some("DefineFontName"));
        assert_eq!(code::name(1000), None);
        assert_eq!(MovieTag::Unknown(unknown(1000, 0)).name(), "Unknown");
    }

    #[test]
    fn empty_stream() {
        assert!(decode_tags(&[], &Context::new()).unwrap().is_empty());
        assert!(encode_tags(&[], &Context::new()).unwrap().is_empty());
    }
}
