//! Bit-level reader and writer for SWF encoding.
//!
//! SWF mixes two granularities. Multi-byte integers are little-endian and
//! byte-addressed; bit fields (matrix records, shape records) are packed
//! MSB first, bit 7 of each byte is read/written first. Both cursors keep a
//! single bit position so the two granularities can be interleaved freely.
//! A byte read or write at an unaligned position simply consumes the next
//! eight bits.

use half::f16;
use memchr::memchr;

use crate::{Error, Result};

/// Reads bits and little-endian words from a byte slice.
#[derive(Clone, Copy)]
pub struct BitReader<'a> {
    data: &'a [u8],
    /// Bitposition, 0..=data.len() * 8.
    pos: usize,
}

/// Checkpoint für BitReader-Rollback.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BitReaderCheckpoint(usize);

impl<'a> BitReader<'a> {
    /// Creates a new `BitReader` positioned at the first bit of `data`.
    pub fn new(data: &'a [u8]) -> Self {
        Self { data, pos: 0 }
    }

    /// Prüft vorab, ob `bits` Bits verfügbar sind. Bei Fehler bleibt die
    /// Position unverändert.
    #[inline]
    fn ensure(&self, bits: usize) -> Result<()> {
        if bits > self.remaining_bits() {
            return Err(Error::OutOfData { position: self.pos, requested: bits });
        }
        Ok(())
    }

    /// Reads `n` bits (0..=32) as an unsigned value, MSB first.
    /// When `n` is 0 this is a no-op returning 0.
    pub fn read_bits(&mut self, n: u8) -> Result<u32> {
        debug_assert!(n <= 32, "bit count must be 0..=32, got {n}");
        if n == 0 {
            return Ok(0);
        }
        self.ensure(n as usize)?;

        let mut val: u32 = 0;
        let mut remaining = n as usize;
        while remaining > 0 {
            let byte = self.data[self.pos / 8];
            let avail = 8 - self.pos % 8;
            let take = avail.min(remaining);
            let bits = (byte >> (avail - take)) & (((1u16 << take) - 1) as u8);
            val = (val << take) | u32::from(bits);
            self.pos += take;
            remaining -= take;
        }
        Ok(val)
    }

    /// Reads `n` bits (0..=32) as a two's complement signed value.
    pub fn read_sbits(&mut self, n: u8) -> Result<i32> {
        let raw = self.read_bits(n)?;
        if n == 0 {
            return Ok(0);
        }
        let shift = 32 - u32::from(n);
        Ok(((raw << shift) as i32) >> shift)
    }

    /// Reads a single bit as a flag.
    pub fn read_bool(&mut self) -> Result<bool> {
        Ok(self.read_bits(1)? == 1)
    }

    /// Reads one byte.
    #[inline]
    pub fn read_u8(&mut self) -> Result<u8> {
        if self.pos % 8 == 0 {
            // Fast-Path: byte-aligned
            let idx = self.pos / 8;
            let Some(&b) = self.data.get(idx) else {
                return Err(Error::OutOfData { position: self.pos, requested: 8 });
            };
            self.pos += 8;
            Ok(b)
        } else {
            Ok(self.read_bits(8)? as u8)
        }
    }

    /// Reads a little-endian word of `num_bytes` (1..=4) bytes.
    ///
    /// With `signed` set the value is sign-extended from its top bit.
    pub fn read_word(&mut self, num_bytes: u8, signed: bool) -> Result<i64> {
        debug_assert!((1..=4).contains(&num_bytes), "word size must be 1..=4, got {num_bytes}");
        self.ensure(num_bytes as usize * 8)?;
        let mut val: u64 = 0;
        for i in 0..num_bytes {
            val |= u64::from(self.read_u8()?) << (8 * i);
        }
        if signed {
            let shift = 64 - 8 * u32::from(num_bytes);
            Ok(((val << shift) as i64) >> shift)
        } else {
            Ok(val as i64)
        }
    }

    /// Reads an unsigned little-endian 16-bit word.
    pub fn read_u16(&mut self) -> Result<u16> {
        Ok(self.read_word(2, false)? as u16)
    }

    /// Reads a signed little-endian 16-bit word.
    pub fn read_i16(&mut self) -> Result<i16> {
        Ok(self.read_word(2, true)? as i16)
    }

    /// Reads an unsigned little-endian 32-bit word.
    pub fn read_u32(&mut self) -> Result<u32> {
        Ok(self.read_word(4, false)? as u32)
    }

    /// Reads an IEEE 754 half-precision float (1-5-10 layout, little-endian).
    pub fn read_half(&mut self) -> Result<f32> {
        Ok(f16::from_bits(self.read_u16()?).to_f32())
    }

    /// Reads `n` raw bytes.
    pub fn read_bytes(&mut self, n: usize) -> Result<Vec<u8>> {
        let bits = n
            .checked_mul(8)
            .ok_or(Error::OutOfData { position: self.pos, requested: usize::MAX })?;
        self.ensure(bits)?;
        if self.pos % 8 == 0 {
            let start = self.pos / 8;
            self.pos += n * 8;
            return Ok(self.data[start..start + n].to_vec());
        }
        let mut out = Vec::with_capacity(n);
        for _ in 0..n {
            out.push(self.read_u8()?);
        }
        Ok(out)
    }

    /// Reads a null-terminated UTF-8 string. The terminator is consumed but
    /// not returned.
    pub fn read_string(&mut self) -> Result<String> {
        let start = self.pos;
        let bytes = if self.pos % 8 == 0 {
            let from = self.pos / 8;
            let Some(len) = memchr(0, &self.data[from..]) else {
                return Err(Error::OutOfData {
                    position: self.pos,
                    requested: self.remaining_bits() + 8,
                });
            };
            self.pos += (len + 1) * 8;
            self.data[from..from + len].to_vec()
        } else {
            let mut out = Vec::new();
            loop {
                let b = match self.read_u8() {
                    Ok(b) => b,
                    Err(e) => {
                        self.pos = start;
                        return Err(e);
                    }
                };
                if b == 0 {
                    break;
                }
                out.push(b);
            }
            out
        };
        String::from_utf8(bytes).map_err(|_| Error::InvalidString { position: start })
    }

    /// Discards bits up to the next byte boundary. No-op if already aligned.
    pub fn align(&mut self) {
        self.pos = self.pos.next_multiple_of(8);
    }

    /// Returns the current bit position.
    pub fn bit_position(&self) -> usize {
        self.pos
    }

    /// Returns the byte holding the current bit position.
    pub fn byte_position(&self) -> usize {
        self.pos / 8
    }

    /// Returns the number of bits left to read.
    pub fn remaining_bits(&self) -> usize {
        self.data.len() * 8 - self.pos
    }

    /// Returns the total number of bits in the buffer.
    pub fn total_bits(&self) -> usize {
        self.data.len() * 8
    }

    /// True once every bit has been consumed.
    pub fn at_end(&self) -> bool {
        self.pos == self.data.len() * 8
    }

    /// Speichert die aktuelle Leseposition.
    pub fn save_checkpoint(&self) -> BitReaderCheckpoint {
        BitReaderCheckpoint(self.pos)
    }

    /// Stellt eine zuvor gespeicherte Leseposition wieder her.
    pub fn restore_checkpoint(&mut self, cp: BitReaderCheckpoint) {
        debug_assert!(cp.0 <= self.data.len() * 8);
        self.pos = cp.0;
    }
}

/// Writes bits and little-endian words into a buffer of fixed capacity.
///
/// The capacity is the exact number of bytes computed by the size pass, so
/// any write past it is an encoder bug and fails with
/// [`Error::BufferOverrun`].
pub struct BitWriter {
    /// Vorab allokiert und genullt, Länge = Kapazität.
    buf: Vec<u8>,
    pos: usize,
}

/// Checkpoint für BitWriter-Rollback (Backpatching).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BitWriterCheckpoint(usize);

impl BitWriter {
    /// Creates a writer that accepts exactly `capacity` bytes.
    pub fn new(capacity: usize) -> Self {
        Self { buf: vec![0; capacity], pos: 0 }
    }

    #[inline]
    fn ensure(&self, bits: usize) -> Result<()> {
        if self.pos + bits > self.buf.len() * 8 {
            return Err(Error::BufferOverrun {
                position: self.pos,
                requested: bits,
                capacity: self.buf.len(),
            });
        }
        Ok(())
    }

    /// Number of bytes a null-terminated encoding of `s` occupies.
    pub fn string_len(s: &str) -> usize {
        s.len() + 1
    }

    /// Writes the lower `n` bits (0..=32) of `val`, MSB first.
    /// When `n` is 0 this is a no-op.
    pub fn write_bits(&mut self, val: u32, n: u8) -> Result<()> {
        debug_assert!(n <= 32, "bit count must be 0..=32, got {n}");
        if n == 0 {
            return Ok(());
        }
        self.ensure(n as usize)?;

        let mut remaining = n as usize;
        while remaining > 0 {
            let avail = 8 - self.pos % 8;
            let take = avail.min(remaining);
            let shift = avail - take;
            let mask = ((((1u16 << take) - 1) as u8) << shift) as u8;
            let bits = (((val >> (remaining - take)) as u8) << shift) & mask;
            let idx = self.pos / 8;
            // Alte Bits löschen: nach restore_checkpoint() kann hier schon etwas stehen
            self.buf[idx] = (self.buf[idx] & !mask) | bits;
            self.pos += take;
            remaining -= take;
        }
        Ok(())
    }

    /// Writes `val` as an `n`-bit two's complement field.
    pub fn write_sbits(&mut self, val: i32, n: u8) -> Result<()> {
        self.write_bits(val as u32, n)
    }

    /// Writes a single bit.
    pub fn write_bool(&mut self, val: bool) -> Result<()> {
        self.write_bits(u32::from(val), 1)
    }

    /// Writes one byte.
    #[inline]
    pub fn write_u8(&mut self, val: u8) -> Result<()> {
        if self.pos % 8 == 0 {
            self.ensure(8)?;
            self.buf[self.pos / 8] = val;
            self.pos += 8;
            Ok(())
        } else {
            self.write_bits(u32::from(val), 8)
        }
    }

    /// Writes the low `num_bytes` (1..=4) bytes of `val`, little-endian.
    pub fn write_word(&mut self, val: i64, num_bytes: u8) -> Result<()> {
        debug_assert!((1..=4).contains(&num_bytes), "word size must be 1..=4, got {num_bytes}");
        self.ensure(num_bytes as usize * 8)?;
        for i in 0..num_bytes {
            self.write_u8((val >> (8 * i)) as u8)?;
        }
        Ok(())
    }

    /// Writes a little-endian 16-bit word.
    pub fn write_u16(&mut self, val: u16) -> Result<()> {
        self.write_word(i64::from(val), 2)
    }

    /// Writes a little-endian 32-bit word.
    pub fn write_u32(&mut self, val: u32) -> Result<()> {
        self.write_word(i64::from(val), 4)
    }

    /// Writes an IEEE 754 half-precision float, little-endian.
    pub fn write_half(&mut self, val: f32) -> Result<()> {
        self.write_u16(f16::from_f32(val).to_bits())
    }

    /// Writes raw bytes.
    pub fn write_bytes(&mut self, bytes: &[u8]) -> Result<()> {
        self.ensure(bytes.len() * 8)?;
        if self.pos % 8 == 0 {
            let start = self.pos / 8;
            self.buf[start..start + bytes.len()].copy_from_slice(bytes);
            self.pos += bytes.len() * 8;
            return Ok(());
        }
        for &b in bytes {
            self.write_u8(b)?;
        }
        Ok(())
    }

    /// Writes `s` followed by a null terminator.
    ///
    /// Strings with an interior NUL cannot be represented and are rejected.
    pub fn write_string(&mut self, s: &str) -> Result<()> {
        if memchr(0, s.as_bytes()).is_some() {
            return Err(Error::invalid_value(format!("string {s:?} contains a NUL byte")));
        }
        self.ensure(Self::string_len(s) * 8)?;
        self.write_bytes(s.as_bytes())?;
        self.write_u8(0)
    }

    /// Pads with zero bits up to the next byte boundary. No-op if aligned.
    pub fn align(&mut self) -> Result<()> {
        let pad = (8 - self.pos % 8) % 8;
        self.write_bits(0, pad as u8)
    }

    /// Returns the current bit position.
    pub fn bit_position(&self) -> usize {
        self.pos
    }

    /// Returns the byte holding the current bit position.
    pub fn byte_position(&self) -> usize {
        self.pos / 8
    }

    /// Reserved capacity in bytes.
    pub fn capacity(&self) -> usize {
        self.buf.len()
    }

    /// True once the reserved capacity is completely filled.
    pub fn at_end(&self) -> bool {
        self.pos == self.buf.len() * 8
    }

    /// Speichert die aktuelle Schreibposition für Backpatching.
    pub fn save_checkpoint(&self) -> BitWriterCheckpoint {
        BitWriterCheckpoint(self.pos)
    }

    /// Springt auf eine gespeicherte Position zurück. Bereits geschriebene
    /// Bytes bleiben stehen, bis sie überschrieben werden.
    pub fn restore_checkpoint(&mut self, cp: BitWriterCheckpoint) {
        debug_assert!(cp.0 <= self.buf.len() * 8);
        self.pos = cp.0;
    }

    /// Returns the bytes written so far, the last one zero padded.
    pub fn as_bytes(&self) -> &[u8] {
        &self.buf[..self.pos.div_ceil(8)]
    }

    /// Finalises the writer and returns the written bytes.
    pub fn into_vec(mut self) -> Vec<u8> {
        self.buf.truncate(self.pos.div_ceil(8));
        self.buf
    }
}
