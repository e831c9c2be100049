//! Font structures: alignment zones and the font name tag.

use crate::bitstream::{BitReader, BitWriter};
use crate::coder::{Decodable, Encodable, Structure};
use crate::context::Context;
use crate::tag::{self, Tag, TagHeader, code};
use crate::{Error, Result};

/// An alignment hint for a glyph: a coordinate and a range, both stored as
/// half-precision floats. Always 4 bytes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AlignmentZone {
    coordinate: f32,
    range: f32,
}

impl AlignmentZone {
    pub const fn new(coordinate: f32, range: f32) -> Self {
        Self { coordinate, range }
    }

    pub fn coordinate(&self) -> f32 {
        self.coordinate
    }

    pub fn range(&self) -> f32 {
        self.range
    }
}

impl Structure for AlignmentZone {
    const NAME: &'static str = "AlignmentZone";
}

impl Encodable for AlignmentZone {
    fn size_of(&self, _ctx: &Context) -> usize {
        4
    }

    fn write_into(&self, writer: &mut BitWriter, _ctx: &Context) -> Result<()> {
        writer.write_half(self.coordinate)?;
        writer.write_half(self.range)
    }
}

impl Decodable for AlignmentZone {
    fn read_from(reader: &mut BitReader<'_>, _ctx: &Context) -> Result<Self> {
        let coordinate = reader.read_half()?;
        let range = reader.read_half()?;
        Ok(Self { coordinate, range })
    }
}

/// Checks that a character identifier lies in 1..=65535.
pub fn check_identifier(uid: u32) -> Result<u16> {
    match u16::try_from(uid) {
        Ok(id) if id > 0 => Ok(id),
        _ => Err(Error::IdentifierOutOfRange(uid)),
    }
}

fn check_string(field: &str, s: &str) -> Result<()> {
    if s.contains('\0') {
        return Err(Error::invalid_value(format!("{field} contains a NUL byte")));
    }
    Ok(())
}

/// The DefineFontName tag: the full name and copyright notice of a font
/// defined elsewhere in the movie.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DefineFontName {
    identifier: u16,
    name: String,
    copyright: String,
    extended: bool,
}

impl DefineFontName {
    /// Fails with [`Error::IdentifierOutOfRange`] unless `uid` is in
    /// 1..=65535.
    pub fn new(uid: u32, name: impl Into<String>, copyright: impl Into<String>) -> Result<Self> {
        let name = name.into();
        let copyright = copyright.into();
        check_string("name", &name)?;
        check_string("copyright", &copyright)?;
        Ok(Self { identifier: check_identifier(uid)?, name, copyright, extended: false })
    }

    /// Writes the long header form even when the body is short.
    pub fn with_extended_header(mut self) -> Self {
        self.extended = true;
        self
    }

    pub fn identifier(&self) -> u16 {
        self.identifier
    }

    pub fn set_identifier(&mut self, uid: u32) -> Result<()> {
        self.identifier = check_identifier(uid)?;
        Ok(())
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn set_name(&mut self, name: impl Into<String>) -> Result<()> {
        let name = name.into();
        check_string("name", &name)?;
        self.name = name;
        Ok(())
    }

    pub fn copyright(&self) -> &str {
        &self.copyright
    }

    pub fn set_copyright(&mut self, copyright: impl Into<String>) -> Result<()> {
        let copyright = copyright.into();
        check_string("copyright", &copyright)?;
        self.copyright = copyright;
        Ok(())
    }
}

impl Structure for DefineFontName {
    const NAME: &'static str = "DefineFontName";
}

impl Tag for DefineFontName {
    const CODE: u16 = code::DEFINE_FONT_NAME;

    fn body_size(&self, _ctx: &Context) -> usize {
        2 + BitWriter::string_len(&self.name) + BitWriter::string_len(&self.copyright)
    }

    fn write_body(&self, writer: &mut BitWriter, _ctx: &Context) -> Result<()> {
        writer.write_u16(self.identifier)?;
        writer.write_string(&self.name)?;
        writer.write_string(&self.copyright)
    }

    fn read_body(reader: &mut BitReader<'_>, _ctx: &Context, header: &TagHeader) -> Result<Self> {
        let identifier = reader.read_u16()?;
        let name = reader.read_string()?;
        let copyright = reader.read_string()?;
        Ok(Self { identifier, name, copyright, extended: header.is_forced_extended() })
    }

    fn extended(&self) -> bool {
        self.extended
    }
}

impl Encodable for DefineFontName {
    fn size_of(&self, ctx: &Context) -> usize {
        tag::tag_size(self, ctx)
    }

    fn write_into(&self, writer: &mut BitWriter, ctx: &Context) -> Result<()> {
        tag::write_tag(self, writer, ctx)
    }
}

impl Decodable for DefineFontName {
    fn read_from(reader: &mut BitReader<'_>, ctx: &Context) -> Result<Self> {
        tag::read_tag(reader, ctx)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coder::{decode, encode};

    #[test]
    fn alignment_zone_known_bytes() {
        let ctx = Context::new();
        let zone = AlignmentZone::new(1.0, -2.0);
        let bytes = encode(&zone, &ctx).unwrap();
        assert_eq!(bytes, vec![0x00, 0x3C, 0x00, 0xC0]);
        let back = decode::<AlignmentZone>(&bytes, &ctx).unwrap();
        assert_eq!(back, zone);
        assert_eq!(back.coordinate(), 1.0);
        assert_eq!(back.range(), -2.0);
    }

    #[test]
    fn alignment_zone_truncated() {
        assert!(matches!(
            decode::<AlignmentZone>(&[0x00, 0x3C, 0x00], &Context::new()),
            Err(Error::OutOfData { position: 16, requested: 16 })
        ));
    }

    #[test]
    fn font_name_short_form() {
        let ctx = Context::new();
        let tag = DefineFontName::new(1, "Arial", "(c)").unwrap();
        let bytes = encode(&tag, &ctx).unwrap();
        // Länge = 2 + 6 + 4 = 12, Header = (88 << 6) | 12 = 0x160C
        assert_eq!(&bytes[..2], &[0x0C, 0x16]);
        assert_eq!(&bytes[2..4], &[0x01, 0x00]);
        assert_eq!(&bytes[4..], b"Arial\0(c)\0");
        assert_eq!(decode::<DefineFontName>(&bytes, &ctx).unwrap(), tag);
    }

    #[test]
    fn identifier_range() {
        assert_eq!(
            DefineFontName::new(0, "a", "b").unwrap_err(),
            Error::IdentifierOutOfRange(0)
        );
        assert_eq!(
            DefineFontName::new(65536, "a", "b").unwrap_err(),
            Error::IdentifierOutOfRange(65536)
        );
        let mut tag = DefineFontName::new(65535, "a", "b").unwrap();
        assert!(tag.set_identifier(70000).is_err());
        assert_eq!(tag.identifier(), 65535);
    }

    #[test]
    fn nul_in_name_rejected() {
        assert!(matches!(DefineFontName::new(1, "a\0b", ""), Err(Error::InvalidValue(_))));
        let mut tag = DefineFontName::new(1, "a", "b").unwrap();
        assert!(tag.set_copyright("x\0").is_err());
        assert_eq!(tag.copyright(), "b");
        tag.set_name("Helvetica").unwrap();
        assert_eq!(tag.name(), "Helvetica");
    }

    #[test]
    fn long_header_on_short_body() {
        let ctx = Context::new();
        let tag = DefineFontName::new(2, "A", "").unwrap().with_extended_header();
        let bytes = encode(&tag, &ctx).unwrap();
        assert_eq!(&bytes[..6], &[0x3F, 0x16, 5, 0, 0, 0]);
        assert_eq!(decode::<DefineFontName>(&bytes, &ctx).unwrap(), tag);
    }

    #[test]
    fn wrong_tag_code() {
        // Header mit Code 1 (ShowFrame), Länge 0
        let bytes = [0x40, 0x00];
        assert!(matches!(
            decode::<DefineFontName>(&bytes, &Context::new()),
            Err(Error::InvalidValue(_))
        ));
    }
}
