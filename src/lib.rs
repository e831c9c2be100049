//! swfx – byte-exact codec for SWF tags and action records
//!
//! Every structure computes its exact encoded size before it is written
//! ([`coder`]), container tags carry a 10-bit code and a 6-bit or 32-bit
//! length ([`tag`]), and action records carry an optional 16-bit length
//! prefixed payload ([`action`]). Decoding checks that every framed body ends
//! exactly where its header said it would.
//!
//! # Beispiel
//!
//! ```
//! use swfx::{Color, Context, CoordTransform, Gradient, GradientFill};
//! use swfx::coder::{decode, encode};
//!
//! let fill = GradientFill::new(
//!     false,
//!     CoordTransform::identity(),
//!     vec![
//!         Gradient::new(0, Color::rgb(255, 0, 0)),
//!         Gradient::new(255, Color::rgb(0, 0, 255)),
//!     ],
//! )
//! .unwrap();
//!
//! let ctx = Context::new();
//! let bytes = encode(&fill, &ctx).unwrap();
//! assert_eq!(bytes.len(), 11);
//! assert_eq!(decode::<GradientFill>(&bytes, &ctx).unwrap(), fill);
//! ```

pub mod action;
pub mod bitstream;
pub mod bounded;
pub mod coder;
pub mod color;
pub mod context;
pub mod error;
pub mod font;
pub mod gradient;
pub mod packed;
pub mod property;
pub mod tag;
pub mod transform;

pub use error::{Error, Result};

/// HashMap mit ahash (schneller, nicht DoS-resistent, nur für interne Tabellen).
pub(crate) type FastHashMap<K, V> = hashbrown::HashMap<K, V, ahash::RandomState>;

// Public API: Protokoll
pub use bitstream::{BitReader, BitWriter};
pub use coder::{Decodable, Encodable, Structure, decode, encode};
pub use context::{Context, Flag};

// Public API: Strukturen
pub use action::{ActionObject, DoAction};
pub use bounded::BoundedVec;
pub use color::Color;
pub use font::{AlignmentZone, DefineFontName};
pub use gradient::{Gradient, GradientFill, GradientKind, Interpolation, Spread};
pub use property::Property;
pub use tag::{MovieTag, Tag, TagHeader, UnknownTag, decode_tags, encode_tags};
pub use transform::CoordTransform;
