//! Coordinate transforms (the SWF MATRIX record).
//!
//! Layout, MSB first:
//!
//! ```text
//! HasScale   UB[1]   ┐ optional, only when scale != (1.0, 1.0)
//! NScaleBits UB[5]   │
//! ScaleX     FB[n]   │ 16.16 fixed point
//! ScaleY     FB[n]   ┘
//! HasRotate  UB[1]   ┐ optional, only when shear != (0, 0)
//! NRotBits   UB[5]   │
//! Shear0     FB[n]   │
//! Shear1     FB[n]   ┘
//! NTransBits UB[5]
//! TranslateX SB[n]     twips
//! TranslateY SB[n]
//! padding to the next byte
//! ```
//!
//! Field widths are the smallest that hold both values of a pair, so the
//! encoded size depends on the values and has to be computed before writing.
//! A matrix decoded with wider fields, or with a scale of (1, 1) or a shear
//! of (0, 0) spelled out, keeps that layout and re-encodes it unchanged as
//! long as the values still fit.

use crate::bitstream::{BitReader, BitWriter};
use crate::coder::{Decodable, Encodable, Structure};
use crate::context::Context;
use crate::{Error, Result};

/// 1.0 in 16.16 fixed point.
pub const FIXED_ONE: i32 = 1 << 16;

/// Largest width a 5-bit width field can announce.
const MAX_FIELD_BITS: u32 = 31;

/// Anzahl Bits für `v` als Zweierkomplement; 0 braucht keine Bits.
fn signed_bits(v: i32) -> u32 {
    match v {
        0 => 0,
        v if v > 0 => 33 - v.leading_zeros(),
        v => 33 - (!v).leading_zeros(),
    }
}

fn pair_bits(a: i32, b: i32) -> u32 {
    signed_bits(a).max(signed_bits(b))
}

fn to_fixed(v: f32) -> i32 {
    (v * FIXED_ONE as f32).round() as i32
}

fn from_fixed(v: i32) -> f32 {
    v as f32 / FIXED_ONE as f32
}

/// Which optional pairs are present and how wide each pair is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
struct Layout {
    scale: Option<u32>,
    shear: Option<u32>,
    translate: u32,
}

impl Layout {
    fn bit_count(&self) -> usize {
        let pair = |bits: Option<u32>| bits.map_or(0, |n| 5 + 2 * n as usize);
        1 + 1 + pair(self.scale) + pair(self.shear) + 5 + 2 * self.translate as usize
    }
}

/// An affine transform: scale and shear in 16.16 fixed point, translation in
/// twips.
///
/// A decoded transform whose layout is not the canonical one remembers it,
/// and then compares unequal to a constructed transform with the same values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CoordTransform {
    scale_x: i32,
    scale_y: i32,
    shear_x: i32,
    shear_y: i32,
    translate_x: i32,
    translate_y: i32,
    layout: Option<Layout>,
}

impl Default for CoordTransform {
    fn default() -> Self {
        Self::identity()
    }
}

impl CoordTransform {
    /// The identity transform; encodes as a single zero byte.
    pub const fn identity() -> Self {
        Self {
            scale_x: FIXED_ONE,
            scale_y: FIXED_ONE,
            shear_x: 0,
            shear_y: 0,
            translate_x: 0,
            translate_y: 0,
            layout: None,
        }
    }

    /// A pure translation in twips.
    pub const fn translate(x: i32, y: i32) -> Self {
        Self { translate_x: x, translate_y: y, ..Self::identity() }
    }

    /// A pure scale.
    pub fn scale(x: f32, y: f32) -> Self {
        Self { scale_x: to_fixed(x), scale_y: to_fixed(y), ..Self::identity() }
    }

    /// A pure shear.
    pub fn shear(x: f32, y: f32) -> Self {
        Self { shear_x: to_fixed(x), shear_y: to_fixed(y), ..Self::identity() }
    }

    /// Builds a transform from raw fixed-point values.
    pub const fn from_fixed(
        scale: (i32, i32),
        shear: (i32, i32),
        translate: (i32, i32),
    ) -> Self {
        Self {
            scale_x: scale.0,
            scale_y: scale.1,
            shear_x: shear.0,
            shear_y: shear.1,
            translate_x: translate.0,
            translate_y: translate.1,
            layout: None,
        }
    }

    pub fn with_translation(mut self, x: i32, y: i32) -> Self {
        self.translate_x = x;
        self.translate_y = y;
        self
    }

    pub fn scale_x(&self) -> f32 {
        from_fixed(self.scale_x)
    }

    pub fn scale_y(&self) -> f32 {
        from_fixed(self.scale_y)
    }

    pub fn shear_x(&self) -> f32 {
        from_fixed(self.shear_x)
    }

    pub fn shear_y(&self) -> f32 {
        from_fixed(self.shear_y)
    }

    pub fn translate_x(&self) -> i32 {
        self.translate_x
    }

    pub fn translate_y(&self) -> i32 {
        self.translate_y
    }

    /// Raw (scale, shear, translate) pairs.
    pub fn to_fixed(&self) -> ((i32, i32), (i32, i32), (i32, i32)) {
        (
            (self.scale_x, self.scale_y),
            (self.shear_x, self.shear_y),
            (self.translate_x, self.translate_y),
        )
    }

    fn has_scale(&self) -> bool {
        self.scale_x != FIXED_ONE || self.scale_y != FIXED_ONE
    }

    fn has_shear(&self) -> bool {
        self.shear_x != 0 || self.shear_y != 0
    }

    /// True when the transform encodes with the smallest layout.
    pub fn is_canonical(&self) -> bool {
        self.layout.is_none()
    }

    /// Drops a layout remembered from decoding.
    pub fn canonical(mut self) -> Self {
        self.layout = None;
        self
    }

    fn canonical_layout(&self) -> Layout {
        Layout {
            scale: self.has_scale().then(|| pair_bits(self.scale_x, self.scale_y)),
            shear: self.has_shear().then(|| pair_bits(self.shear_x, self.shear_y)),
            translate: pair_bits(self.translate_x, self.translate_y),
        }
    }

    /// Layout to write: the remembered one, widened where a value no longer
    /// fits.
    fn effective_layout(&self) -> Layout {
        let canonical = self.canonical_layout();
        let Some(hint) = self.layout else {
            return canonical;
        };
        let widen = |hint: Option<u32>, needed: Option<u32>, a: i32, b: i32| match hint {
            Some(n) => Some(n.max(pair_bits(a, b))),
            None => needed,
        };
        Layout {
            scale: widen(hint.scale, canonical.scale, self.scale_x, self.scale_y),
            shear: widen(hint.shear, canonical.shear, self.shear_x, self.shear_y),
            translate: hint.translate.max(canonical.translate),
        }
    }
}

/// Schreibt ein Wertepaar mit gemeinsamer Bitbreite.
fn write_pair(writer: &mut BitWriter, field: &'static str, bits: u32, a: i32, b: i32) -> Result<()> {
    if bits > MAX_FIELD_BITS {
        return Err(Error::FieldTooWide { field, bits });
    }
    writer.write_bits(bits, 5)?;
    writer.write_sbits(a, bits as u8)?;
    writer.write_sbits(b, bits as u8)
}

fn read_pair(reader: &mut BitReader<'_>) -> Result<(u32, i32, i32)> {
    let bits = reader.read_bits(5)?;
    Ok((bits, reader.read_sbits(bits as u8)?, reader.read_sbits(bits as u8)?))
}

impl Structure for CoordTransform {
    const NAME: &'static str = "CoordTransform";
}

impl Encodable for CoordTransform {
    fn size_of(&self, _ctx: &Context) -> usize {
        self.effective_layout().bit_count().div_ceil(8)
    }

    fn write_into(&self, writer: &mut BitWriter, _ctx: &Context) -> Result<()> {
        let layout = self.effective_layout();
        writer.write_bool(layout.scale.is_some())?;
        if let Some(bits) = layout.scale {
            write_pair(writer, "scale", bits, self.scale_x, self.scale_y)?;
        }
        writer.write_bool(layout.shear.is_some())?;
        if let Some(bits) = layout.shear {
            write_pair(writer, "shear", bits, self.shear_x, self.shear_y)?;
        }
        write_pair(writer, "translate", layout.translate, self.translate_x, self.translate_y)?;
        writer.align()
    }
}

impl Decodable for CoordTransform {
    fn read_from(reader: &mut BitReader<'_>, _ctx: &Context) -> Result<Self> {
        let mut transform = Self::identity();
        let mut layout = Layout { scale: None, shear: None, translate: 0 };
        if reader.read_bool()? {
            let (bits, x, y) = read_pair(reader)?;
            (transform.scale_x, transform.scale_y) = (x, y);
            layout.scale = Some(bits);
        }
        if reader.read_bool()? {
            let (bits, x, y) = read_pair(reader)?;
            (transform.shear_x, transform.shear_y) = (x, y);
            layout.shear = Some(bits);
        }
        let (bits, x, y) = read_pair(reader)?;
        (transform.translate_x, transform.translate_y) = (x, y);
        layout.translate = bits;
        reader.align();
        if layout != transform.canonical_layout() {
            transform.layout = Some(layout);
        }
        Ok(transform)
    }
}
