//! Per-pass encode/decode context.
//!
//! A [`Context`] carries the flags that select between layout variants of a
//! structure, e.g. whether colors carry an alpha channel. The driver builds it
//! once per pass; structures only ever see `&Context`.
//!
//! # Beispiel
//!
//! ```
//! use swfx::context::{Context, Flag};
//!
//! let ctx = Context::new().with_version(8).with_transparency();
//! assert_eq!(ctx.version(), 8);
//! assert!(ctx.is_transparent());
//! assert!(ctx.has(Flag::Transparent));
//! assert_eq!(Context::default().get(Flag::Version), None);
//! ```

use crate::FastHashMap;

/// Version assumed when the driver did not set [`Flag::Version`].
pub const DEFAULT_VERSION: u32 = 10;

/// Names of the flags a structure may consult.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Flag {
    /// Format version of the file being coded.
    Version,
    /// Colors are RGBA instead of RGB (set while coding shapes of
    /// DefineShape3 and later). A value of 0 counts as unset.
    Transparent,
}

/// Flag store scoped to one encode or decode pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Context {
    vars: FastHashMap<Flag, u32>,
}

impl Context {
    /// Empty context: every structure uses its default layout.
    pub fn new() -> Self {
        Self::default()
    }

    // --- Builder ---

    /// Sets the format version.
    pub fn with_version(mut self, version: u32) -> Self {
        self.set(Flag::Version, version);
        self
    }

    /// Switches colors to RGBA.
    pub fn with_transparency(mut self) -> Self {
        self.set(Flag::Transparent, 1);
        self
    }

    /// Sets an arbitrary flag.
    pub fn with_flag(mut self, flag: Flag, value: u32) -> Self {
        self.set(flag, value);
        self
    }

    // --- Driver-Seite ---

    /// Sets `flag` to `value`.
    pub fn set(&mut self, flag: Flag, value: u32) {
        self.vars.insert(flag, value);
    }

    /// Removes `flag`, returning it to its default meaning.
    pub fn clear(&mut self, flag: Flag) {
        self.vars.remove(&flag);
    }

    // --- Abfragen ---

    /// True when `flag` is present.
    pub fn has(&self, flag: Flag) -> bool {
        self.vars.contains_key(&flag)
    }

    /// Value of `flag`, `None` when absent.
    pub fn get(&self, flag: Flag) -> Option<u32> {
        self.vars.get(&flag).copied()
    }

    /// Format version, [`DEFAULT_VERSION`] when unset.
    pub fn version(&self) -> u32 {
        self.get(Flag::Version).unwrap_or(DEFAULT_VERSION)
    }

    /// True when colors carry an alpha channel.
    pub fn is_transparent(&self) -> bool {
        self.get(Flag::Transparent).is_some_and(|v| v != 0)
    }
}
