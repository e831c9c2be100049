//! Central error type for the SWF codec.
//!
//! All positions carried by the variants are bit offsets into the buffer of
//! the reader or writer that raised them. Byte offsets are `position / 8`.

use core::fmt;
use std::borrow::Cow;

/// Everything that can go wrong while decoding or encoding SWF structures.
///
/// None of the variants is transient: the codec only works on in-memory
/// buffers, so a failed operation is never worth retrying.
#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum Error {
    /// A read went past the end of the buffer (truncated or corrupt input).
    OutOfData {
        /// Bit position of the failed read.
        position: usize,
        /// Number of bits the read asked for.
        requested: usize,
    },
    /// A write went past the capacity reserved for the output.
    BufferOverrun {
        /// Bit position of the failed write.
        position: usize,
        /// Number of bits the write asked for.
        requested: usize,
        /// Reserved capacity in bytes.
        capacity: usize,
    },
    /// A structure did not consume (or produce) exactly its declared length.
    ///
    /// Signals an encoder bug, a decoder bug or a non-conforming file. Never
    /// swallow it.
    FramingConsistency {
        /// Name of the structure that was being read or written.
        structure: &'static str,
        /// Byte offset of the start of the structure.
        offset: usize,
        /// Declared length in bytes.
        expected: usize,
        /// Declared minus actual length in bytes.
        delta: i64,
    },
    /// A bit pattern has no symbol in the enumeration table.
    UnknownEnumValue {
        /// Name of the enumeration.
        kind: &'static str,
        /// The raw value that was decoded.
        value: u32,
        /// Bit position of the field.
        position: usize,
    },
    /// A mutation would grow a bounded collection past its maximum.
    CapacityExceeded {
        /// Name of the collection.
        kind: &'static str,
        /// Maximum number of entries.
        capacity: usize,
        /// Number of entries the mutation would have produced.
        requested: usize,
    },
    /// A null-terminated string is not valid UTF-8.
    InvalidString {
        /// Bit position of the first byte of the string.
        position: usize,
    },
    /// An action with an opcode below 0x80 was given a payload.
    UnexpectedPayload { code: u8 },
    /// An action with an opcode of 0x80 or above was built without a payload.
    MissingPayload { code: u8 },
    /// A character identifier is outside 1..=65535.
    IdentifierOutOfRange(u32),
    /// A bit-packed field needs more bits than its width field can express.
    FieldTooWide {
        /// Name of the field group.
        field: &'static str,
        /// Number of bits the value needs.
        bits: u32,
    },
    /// A length does not fit into the prefix that has to carry it.
    LengthOverflow {
        /// Name of the structure.
        structure: &'static str,
        /// The length in bytes.
        length: usize,
    },
    /// Catch-all for invalid arguments with a message.
    InvalidValue(Cow<'static, str>),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::OutOfData { position, requested } => write!(
                f,
                "out of data: read of {requested} bits at byte {} (bit {position}) runs past the end of the buffer",
                position / 8
            ),
            Self::BufferOverrun { position, requested, capacity } => write!(
                f,
                "buffer overrun: write of {requested} bits at byte {} (bit {position}) exceeds capacity of {capacity} bytes",
                position / 8
            ),
            Self::FramingConsistency { structure, offset, expected, delta } => write!(
                f,
                "framing error in {structure} at byte {offset}: expected {expected} bytes, delta {delta}"
            ),
            Self::UnknownEnumValue { kind, value, position } => write!(
                f,
                "unknown {kind} value {value:#x} at byte {} (bit {position})",
                position / 8
            ),
            Self::CapacityExceeded { kind, capacity, requested } => write!(
                f,
                "{kind} holds at most {capacity} entries, {requested} requested"
            ),
            Self::InvalidString { position } => {
                write!(f, "string at byte {} is not valid UTF-8", position / 8)
            }
            Self::UnexpectedPayload { code } => {
                write!(f, "action {code:#04x} cannot carry a payload (opcode < 0x80)")
            }
            Self::MissingPayload { code } => {
                write!(f, "action {code:#04x} requires a payload (opcode >= 0x80)")
            }
            Self::IdentifierOutOfRange(uid) => {
                write!(f, "identifier {uid} out of range 1..=65535")
            }
            Self::FieldTooWide { field, bits } => {
                write!(f, "{field} needs {bits} bits, at most 31 can be encoded")
            }
            Self::LengthOverflow { structure, length } => {
                write!(f, "{structure} length {length} does not fit its length field")
            }
            Self::InvalidValue(msg) => write!(f, "invalid value: {msg}"),
        }
    }
}

impl std::error::Error for Error {}

impl Error {
    /// Erstellt einen `InvalidValue` Fehler mit Nachricht.
    pub fn invalid_value(msg: impl Into<Cow<'static, str>>) -> Self {
        Self::InvalidValue(msg.into())
    }

    /// True for the variants that point at a bug in this crate or in the
    /// file producer rather than at a plain truncation.
    pub fn is_framing(&self) -> bool {
        matches!(self, Self::FramingConsistency { .. })
    }
}

/// A convenience `Result` type alias using [`Error`].
pub type Result<T> = core::result::Result<T, Error>;
