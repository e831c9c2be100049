//! Linear and radial gradient fills.
//!
//! ```text
//! kind         UI8                 0x10 linear, 0x12 radial
//! transform    MATRIX              gradient square → shape coordinates
//! flags        UI8                 spread (0xC0) | interpolation (0x30) | count (0x0F)
//! gradients    GRADRECORD[count]   ratio UI8 + RGB, or RGBA with Flag::Transparent
//! ```

use crate::bitstream::{BitReader, BitWriter};
use crate::bounded::BoundedVec;
use crate::coder::{self, Decodable, Encodable, Structure};
use crate::color::Color;
use crate::context::Context;
use crate::packed::{self, PackedEnum};
use crate::transform::CoordTransform;
use crate::{packed_enum, Result};

/// Maximum number of control points in one gradient.
pub const MAX_GRADIENTS: usize = 15;

/// Bits of the flags byte holding the number of control points.
pub const COUNT_MASK: u8 = 0x0F;

packed_enum! {
    /// Geometry of the gradient.
    pub enum GradientKind: mask = 0xFF {
        Linear = 0x10,
        Radial = 0x12,
    }
}

packed_enum! {
    /// How the gradient continues outside the gradient square.
    #[derive(Default)]
    pub enum Spread: mask = 0xC0 {
        #[default]
        Pad = 0x00,
        Reflect = 0x40,
        Repeat = 0x80,
    }
}

packed_enum! {
    /// Color space used to interpolate between control points.
    #[derive(Default)]
    pub enum Interpolation: mask = 0x30 {
        #[default]
        Normal = 0x00,
        Linear = 0x10,
    }
}

const _: () = assert!(packed::disjoint(&[COUNT_MASK, Spread::MASK, Interpolation::MASK]));
const _: () = assert!(MAX_GRADIENTS <= COUNT_MASK as usize);

/// One control point: position along the gradient (0..=255) and color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Gradient {
    pub ratio: u8,
    pub color: Color,
}

impl Gradient {
    pub const fn new(ratio: u8, color: Color) -> Self {
        Self { ratio, color }
    }
}

impl Structure for Gradient {
    const NAME: &'static str = "Gradient";
}

impl Encodable for Gradient {
    fn size_of(&self, ctx: &Context) -> usize {
        1 + self.color.size_of(ctx)
    }

    fn write_into(&self, writer: &mut BitWriter, ctx: &Context) -> Result<()> {
        writer.write_u8(self.ratio)?;
        self.color.write_into(writer, ctx)
    }
}

impl Decodable for Gradient {
    fn read_from(reader: &mut BitReader<'_>, ctx: &Context) -> Result<Self> {
        let ratio = reader.read_u8()?;
        let color = Color::read_from(reader, ctx)?;
        Ok(Self { ratio, color })
    }
}

/// A gradient fill style.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct GradientFill {
    kind: GradientKind,
    spread: Spread,
    interpolation: Interpolation,
    transform: CoordTransform,
    gradients: BoundedVec<Gradient, MAX_GRADIENTS>,
}

impl GradientFill {
    /// Creates a fill from a list of control points.
    ///
    /// More than [`MAX_GRADIENTS`] points is
    /// [`Error::CapacityExceeded`](crate::Error::CapacityExceeded).
    pub fn new(radial: bool, transform: CoordTransform, gradients: Vec<Gradient>) -> Result<Self> {
        Ok(Self {
            kind: if radial { GradientKind::Radial } else { GradientKind::Linear },
            spread: Spread::default(),
            interpolation: Interpolation::default(),
            transform,
            gradients: BoundedVec::try_from(gradients)?,
        })
    }

    /// Empty linear gradient.
    pub fn linear(transform: CoordTransform) -> Self {
        Self {
            kind: GradientKind::Linear,
            spread: Spread::default(),
            interpolation: Interpolation::default(),
            transform,
            gradients: BoundedVec::new(),
        }
    }

    /// Empty radial gradient.
    pub fn radial(transform: CoordTransform) -> Self {
        Self { kind: GradientKind::Radial, ..Self::linear(transform) }
    }

    pub fn kind(&self) -> GradientKind {
        self.kind
    }

    pub fn is_radial(&self) -> bool {
        self.kind == GradientKind::Radial
    }

    pub fn set_radial(&mut self, radial: bool) {
        self.kind = if radial { GradientKind::Radial } else { GradientKind::Linear };
    }

    pub fn spread(&self) -> Spread {
        self.spread
    }

    pub fn set_spread(&mut self, spread: Spread) {
        self.spread = spread;
    }

    pub fn interpolation(&self) -> Interpolation {
        self.interpolation
    }

    pub fn set_interpolation(&mut self, interpolation: Interpolation) {
        self.interpolation = interpolation;
    }

    pub fn transform(&self) -> &CoordTransform {
        &self.transform
    }

    pub fn set_transform(&mut self, transform: CoordTransform) {
        self.transform = transform;
    }

    /// The control points.
    pub fn gradients(&self) -> &[Gradient] {
        &self.gradients
    }

    /// Mutable access to the control points. The collection still refuses
    /// to grow past [`MAX_GRADIENTS`].
    pub fn gradients_mut(&mut self) -> &mut BoundedVec<Gradient, MAX_GRADIENTS> {
        &mut self.gradients
    }

    /// Replaces all control points. On error the old points are kept.
    pub fn set_gradients(&mut self, gradients: Vec<Gradient>) -> Result<()> {
        self.gradients.replace_all(gradients)
    }

    /// Appends a control point. On error the existing points are unchanged.
    pub fn add(&mut self, gradient: Gradient) -> Result<&mut Self> {
        self.gradients.push(gradient)?;
        Ok(self)
    }

    fn flags(&self) -> u8 {
        // len() <= MAX_GRADIENTS <= COUNT_MASK, siehe const-Assertion oben
        self.gradients.len() as u8 | self.spread.bits() | self.interpolation.bits()
    }
}

impl Structure for GradientFill {
    const NAME: &'static str = "GradientFill";
}

impl Encodable for GradientFill {
    fn size_of(&self, ctx: &Context) -> usize {
        2 + self.transform.size_of(ctx) + self.gradients.iter().map(|g| g.size_of(ctx)).sum::<usize>()
    }

    fn write_into(&self, writer: &mut BitWriter, ctx: &Context) -> Result<()> {
        writer.write_u8(self.kind.bits())?;
        coder::write_checked(&self.transform, writer, ctx)?;
        writer.write_u8(self.flags())?;
        for gradient in &self.gradients {
            gradient.write_into(writer, ctx)?;
        }
        Ok(())
    }
}

impl Decodable for GradientFill {
    fn read_from(reader: &mut BitReader<'_>, ctx: &Context) -> Result<Self> {
        let position = reader.bit_position();
        let kind = GradientKind::unpack(reader.read_u8()?, position)?;
        let transform = CoordTransform::read_from(reader, ctx)?;

        let position = reader.bit_position();
        let flags = reader.read_u8()?;
        let spread = Spread::unpack(flags, position)?;
        let interpolation = Interpolation::unpack(flags, position)?;
        let count = (flags & COUNT_MASK) as usize;

        let mut gradients = BoundedVec::new();
        for _ in 0..count {
            gradients.push(Gradient::read_from(reader, ctx)?)?;
        }
        Ok(Self { kind, spread, interpolation, transform, gradients })
    }
}
