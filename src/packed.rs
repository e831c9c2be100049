//! Packed-field codec.
//!
//! Several SWF bytes multiplex a small count with one or more enumerations,
//! each occupying a fixed bit mask. Every such enumeration is declared with
//! [`packed_enum!`](crate::packed_enum), which produces a static
//! bits ↔ symbol table and checks at compile time that every bit pattern
//! fits inside the mask and that no two symbols share a pattern.
//!
//! Layouts combining several fields check that the masks are disjoint with
//! [`disjoint`] in a `const` assertion, so an OR of the parts can never
//! corrupt a neighbouring field.

use crate::{Error, Result};

/// An enumeration stored under a bit mask of a shared byte.
pub trait PackedEnum: Copy + Eq + Sized + 'static {
    /// Name reported in [`Error::UnknownEnumValue`].
    const KIND: &'static str;
    /// Bits of the byte owned by this enumeration.
    const MASK: u8;
    /// Every (bit pattern, symbol) pair, in declaration order.
    const TABLE: &'static [(u8, Self)];

    /// Bit pattern of this symbol, already shifted into place.
    fn bits(self) -> u8;

    /// Extracts the field from `byte` and maps it to its symbol.
    ///
    /// `position` is the bit offset of `byte`, used for the error.
    fn unpack(byte: u8, position: usize) -> Result<Self> {
        let bits = byte & Self::MASK;
        Self::TABLE
            .iter()
            .find(|(b, _)| *b == bits)
            .map(|(_, sym)| *sym)
            .ok_or(Error::UnknownEnumValue { kind: Self::KIND, value: u32::from(bits), position })
    }
}

/// True when every value lies inside `mask` and all values are distinct.
pub const fn fits(mask: u8, values: &[u8]) -> bool {
    let mut i = 0;
    while i < values.len() {
        if values[i] & !mask != 0 {
            return false;
        }
        let mut j = i + 1;
        while j < values.len() {
            if values[i] == values[j] {
                return false;
            }
            j += 1;
        }
        i += 1;
    }
    true
}

/// True when no two masks share a bit.
pub const fn disjoint(masks: &[u8]) -> bool {
    let mut i = 0;
    while i < masks.len() {
        let mut j = i + 1;
        while j < masks.len() {
            if masks[i] & masks[j] != 0 {
                return false;
            }
            j += 1;
        }
        i += 1;
    }
    true
}

/// Declares an enumeration together with its [`PackedEnum`] table.
///
/// ```
/// use swfx::packed::PackedEnum;
///
/// swfx::packed_enum! {
///     /// Two-bit mode in the top of a byte.
///     pub enum Mode: mask = 0xC0 {
///         Off = 0x00,
///         On = 0x40,
///     }
/// }
///
/// assert_eq!(Mode::On.bits(), 0x40);
/// assert_eq!(Mode::unpack(0x45, 0).unwrap(), Mode::On);
/// assert!(Mode::unpack(0x80, 0).is_err());
/// ```
#[macro_export]
macro_rules! packed_enum {
    (
        $(#[$meta:meta])*
        $vis:vis enum $name:ident : mask = $mask:literal {
            $( $(#[$vmeta:meta])* $variant:ident = $bits:expr ),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        $vis enum $name {
            $( $(#[$vmeta])* $variant ),+
        }

        impl $crate::packed::PackedEnum for $name {
            const KIND: &'static str = stringify!($name);
            const MASK: u8 = $mask;
            const TABLE: &'static [(u8, Self)] = &[ $( ($bits, Self::$variant) ),+ ];

            fn bits(self) -> u8 {
                match self {
                    $( Self::$variant => $bits ),+
                }
            }
        }

        const _: () = assert!(
            $crate::packed::fits($mask, &[ $( $bits ),+ ]),
            concat!(stringify!($name), ": bit patterns overlap or leave the mask")
        );
    };
}
