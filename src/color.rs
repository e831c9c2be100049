//! RGB / RGBA colors.
//!
//! Whether a color carries an alpha byte is not stored in the stream; it
//! follows from the enclosing tag and is passed in as [`Flag::Transparent`].
//! Without the flag the alpha channel is neither written nor read and decodes
//! as fully opaque.
//!
//! [`Flag::Transparent`]: crate::context::Flag::Transparent

use crate::bitstream::{BitReader, BitWriter};
use crate::coder::{Decodable, Encodable, Structure};
use crate::context::Context;
use crate::Result;

/// Alpha value of an opaque color.
pub const OPAQUE: u8 = 255;

/// An 8-bit per channel color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Color {
    pub red: u8,
    pub green: u8,
    pub blue: u8,
    pub alpha: u8,
}

impl Color {
    /// Opaque color.
    pub const fn rgb(red: u8, green: u8, blue: u8) -> Self {
        Self { red, green, blue, alpha: OPAQUE }
    }

    /// Color with explicit alpha.
    pub const fn rgba(red: u8, green: u8, blue: u8, alpha: u8) -> Self {
        Self { red, green, blue, alpha }
    }

    pub fn is_opaque(&self) -> bool {
        self.alpha == OPAQUE
    }
}

impl Default for Color {
    fn default() -> Self {
        Self::rgb(0, 0, 0)
    }
}

impl Structure for Color {
    const NAME: &'static str = "Color";
}

impl Encodable for Color {
    fn size_of(&self, ctx: &Context) -> usize {
        if ctx.is_transparent() { 4 } else { 3 }
    }

    fn write_into(&self, writer: &mut BitWriter, ctx: &Context) -> Result<()> {
        writer.write_u8(self.red)?;
        writer.write_u8(self.green)?;
        writer.write_u8(self.blue)?;
        if ctx.is_transparent() {
            writer.write_u8(self.alpha)?;
        }
        Ok(())
    }
}

impl Decodable for Color {
    fn read_from(reader: &mut BitReader<'_>, ctx: &Context) -> Result<Self> {
        let red = reader.read_u8()?;
        let green = reader.read_u8()?;
        let blue = reader.read_u8()?;
        let alpha = if ctx.is_transparent() { reader.read_u8()? } else { OPAQUE };
        Ok(Self { red, green, blue, alpha })
    }
}
