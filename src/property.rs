//! Movie clip property identifiers, as pushed before GetProperty and
//! SetProperty actions.
//!
//! Players before version 5 expect the identifier as the bit pattern of an
//! IEEE-754 single (2 becomes `0x4000_0000`); later players take the plain
//! integer. Decoding accepts either form.

use crate::bitstream::{BitReader, BitWriter};
use crate::coder::{Decodable, Encodable, Structure};
use crate::context::Context;
use crate::{Error, Result};

/// First version that writes property identifiers as integers.
pub const INTEGER_CODES_SINCE: u32 = 5;

/// A movie clip property.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Property {
    X,
    Y,
    XScale,
    YScale,
    CurrentFrame,
    TotalFrames,
    Alpha,
    Visible,
    Width,
    Height,
    Rotation,
    Target,
    FramesLoaded,
    Name,
    DropTarget,
    Url,
    HighQuality,
    FocusRect,
    SoundBufTime,
    Quality,
    XMouse,
    YMouse,
}

impl Property {
    pub const ALL: [Self; 22] = [
        Self::X,
        Self::Y,
        Self::XScale,
        Self::YScale,
        Self::CurrentFrame,
        Self::TotalFrames,
        Self::Alpha,
        Self::Visible,
        Self::Width,
        Self::Height,
        Self::Rotation,
        Self::Target,
        Self::FramesLoaded,
        Self::Name,
        Self::DropTarget,
        Self::Url,
        Self::HighQuality,
        Self::FocusRect,
        Self::SoundBufTime,
        Self::Quality,
        Self::XMouse,
        Self::YMouse,
    ];

    /// Index of the property, independent of the version.
    pub fn index(self) -> u32 {
        self as u32
    }

    /// Encoded identifier for the version in `ctx`.
    pub fn code(self, ctx: &Context) -> u32 {
        if ctx.version() < INTEGER_CODES_SINCE {
            (self.index() as f32).to_bits()
        } else {
            self.index()
        }
    }

    /// Maps an identifier in either form back to the property. `position`
    /// is only used for the error.
    pub fn from_code(value: u32, position: usize) -> Result<Self> {
        let index = if (value as usize) < Self::ALL.len() {
            Some(value as usize)
        } else {
            let float = f32::from_bits(value);
            (float.fract() == 0.0 && float >= 0.0 && float < Self::ALL.len() as f32)
                .then_some(float as usize)
        };
        index
            .map(|i| Self::ALL[i])
            .ok_or(Error::UnknownEnumValue { kind: "Property", value, position })
    }
}

impl Structure for Property {
    const NAME: &'static str = "Property";
}

impl Encodable for Property {
    fn size_of(&self, _ctx: &Context) -> usize {
        4
    }

    fn write_into(&self, writer: &mut BitWriter, ctx: &Context) -> Result<()> {
        writer.write_u32(self.code(ctx))
    }
}

impl Decodable for Property {
    fn read_from(reader: &mut BitReader<'_>, _ctx: &Context) -> Result<Self> {
        let position = reader.bit_position();
        Self::from_code(reader.read_u32()?, position)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coder::{decode, encode};

    #[test]
    fn version_selects_form() {
        let v4 = Context::new().with_version(4);
        let v5 = Context::new().with_version(5);
        assert_eq!(Property::XScale.code(&v5), 2);
        assert_eq!(Property::XScale.code(&v4), 0x4000_0000);
        assert_eq!(Property::X.code(&v4), 0);
        assert_eq!(encode(&Property::Alpha, &v5).unwrap(), vec![6, 0, 0, 0]);
        assert_eq!(encode(&Property::Alpha, &v4).unwrap(), 6.0f32.to_bits().to_le_bytes());
    }

    #[test]
    fn decode_accepts_both_forms() {
        for version in [4, 5, 10] {
            let ctx = Context::new().with_version(version);
            for p in Property::ALL {
                let bytes = encode(&p, &ctx).unwrap();
                assert_eq!(decode::<Property>(&bytes, &ctx).unwrap(), p, "v{version} {p:?}");
            }
        }
    }

    #[test]
    fn table_matches_indices() {
        for (i, p) in Property::ALL.iter().enumerate() {
            assert_eq!(p.index() as usize, i);
        }
        assert_eq!(Property::YMouse.index(), 21);
    }

    #[test]
    fn unknown_codes() {
        assert_eq!(
            Property::from_code(22, 8).unwrap_err(),
            Error::UnknownEnumValue { kind: "Property", value: 22, position: 8 }
        );
        assert!(Property::from_code(1.5f32.to_bits(), 0).is_err());
        assert!(Property::from_code(22.0f32.to_bits(), 0).is_err());
        assert!(Property::from_code((-1.0f32).to_bits(), 0).is_err());
    }
}
