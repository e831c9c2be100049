//! Two-phase structure protocol.
//!
//! Encoding always happens in two passes. [`Encodable::size_of`] computes the
//! exact number of bytes a structure will produce; only then is
//! [`Encodable::write_into`] called, usually on a [`BitWriter`] whose capacity
//! is exactly that size. Framers need the size up front to write length
//! prefixes without backpatching.
//!
//! Both directions are position-checked: [`write_sized`] verifies that a
//! structure wrote exactly what it announced and [`read_framed`] verifies that
//! a length-framed body consumed exactly its declared length. A mismatch is
//! [`Error::FramingConsistency`].
//!
//! # Beispiel
//!
//! ```
//! use swfx::coder::{decode, encode};
//! use swfx::context::Context;
//! use swfx::font::AlignmentZone;
//!
//! let ctx = Context::new();
//! let zone = AlignmentZone::new(0.5, 1.0);
//! let bytes = encode(&zone, &ctx).unwrap();
//! assert_eq!(bytes, [0x00, 0x38, 0x00, 0x3C]);
//! assert_eq!(decode::<AlignmentZone>(&bytes, &ctx).unwrap(), zone);
//! ```

use crate::bitstream::{BitReader, BitWriter};
use crate::context::Context;
use crate::{Error, Result};

/// Every format structure has a name used in diagnostics.
pub trait Structure {
    /// Name reported in [`Error::FramingConsistency`].
    const NAME: &'static str;
}

/// Encode side of the protocol.
pub trait Encodable: Structure {
    /// Exact number of bytes [`write_into`](Self::write_into) will emit under
    /// `ctx`. Pure: calling it twice with the same context gives the same
    /// answer.
    fn size_of(&self, ctx: &Context) -> usize;

    /// Writes exactly `self.size_of(ctx)` bytes.
    fn write_into(&self, writer: &mut BitWriter, ctx: &Context) -> Result<()>;
}

/// Decode side of the protocol.
pub trait Decodable: Structure + Sized {
    /// Reads one structure starting at the reader's position.
    fn read_from(reader: &mut BitReader<'_>, ctx: &Context) -> Result<Self>;
}

/// Rundet eine Bit-Differenz betragsmäßig auf ganze Bytes auf.
fn byte_delta(bits: i64) -> i64 {
    bits.signum() * ((bits.abs() + 7) / 8)
}

/// Checks that a structure starting at bit `start` with `expected` bytes ends
/// at bit `actual`.
pub fn check_end(structure: &'static str, start: usize, expected: usize, actual: usize) -> Result<()> {
    let end = start.saturating_add(expected.saturating_mul(8));
    if actual == end {
        return Ok(());
    }
    let delta = byte_delta(end as i64 - actual as i64);
    log::debug!(
        "{structure} at byte {}: declared {expected} bytes, off by {delta}",
        start / 8
    );
    Err(Error::FramingConsistency { structure, offset: start / 8, expected, delta })
}

/// Writes `value` whose size was already computed as `size`, then verifies
/// the writer advanced by exactly `8 * size` bits.
pub fn write_sized<T>(value: &T, size: usize, writer: &mut BitWriter, ctx: &Context) -> Result<()>
where
    T: Encodable + ?Sized,
{
    let start = writer.bit_position();
    value.write_into(writer, ctx)?;
    check_end(T::NAME, start, size, writer.bit_position())?;
    log::trace!("{} wrote {size} bytes at byte {}", T::NAME, start / 8);
    Ok(())
}

/// Computes the size of `value`, writes it and verifies the position.
/// Returns the number of bytes written.
pub fn write_checked<T>(value: &T, writer: &mut BitWriter, ctx: &Context) -> Result<usize>
where
    T: Encodable + ?Sized,
{
    let size = value.size_of(ctx);
    write_sized(value, size, writer, ctx)?;
    Ok(size)
}

/// Runs `read_body` on a body of `length` declared bytes and verifies that it
/// stopped exactly at the declared end.
pub fn read_framed<'a, T, F>(reader: &mut BitReader<'a>, structure: &'static str, length: usize, read_body: F) -> Result<T>
where
    F: FnOnce(&mut BitReader<'a>) -> Result<T>,
{
    let start = reader.bit_position();
    let bits = length
        .checked_mul(8)
        .ok_or(Error::OutOfData { position: start, requested: usize::MAX })?;
    if bits > reader.remaining_bits() {
        return Err(Error::OutOfData { position: start, requested: bits });
    }
    let value = read_body(reader)?;
    check_end(structure, start, length, reader.bit_position())?;
    Ok(value)
}

/// Encodes `value` into a buffer of exactly its size.
pub fn encode<T>(value: &T, ctx: &Context) -> Result<Vec<u8>>
where
    T: Encodable + ?Sized,
{
    let size = value.size_of(ctx);
    let mut writer = BitWriter::new(size);
    write_sized(value, size, &mut writer, ctx)?;
    Ok(writer.into_vec())
}

/// Decodes a `T` that must span all of `bytes`.
pub fn decode<T: Decodable>(bytes: &[u8], ctx: &Context) -> Result<T> {
    let mut reader = BitReader::new(bytes);
    read_framed(&mut reader, T::NAME, bytes.len(), |r| T::read_from(r, ctx))
}
