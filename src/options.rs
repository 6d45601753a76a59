//! Cache behavior options.
//!
//! A small set of named options controls lookup mode, pre-insert cloning and
//! the duplicate-key policy. Options combine with `|`:
//!
//! ```
//! use cache_manager::{CacheOption, CacheOptions};
//!
//! let options = CacheOption::ExactMatch | CacheOption::ThrowIfExists;
//! assert!(options.has(CacheOption::ExactMatch));
//! assert!(!options.has(CacheOption::CloneValue));
//! ```

use std::ops::BitOr;

/// A single cache behavior switch.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CacheOption {
    /// Compare lookup keys with raw structural equality, bypassing the
    /// customizer (including its key pre-processing).
    ExactMatch,
    /// Clone the key through the customizer before storing it.
    CloneKey,
    /// Clone the value through the customizer before storing it.
    CloneValue,
    /// Fail `set` with a duplicate-key error instead of replacing.
    ThrowIfExists,
}

impl CacheOption {
    const fn bit(self) -> u8 {
        match self {
            CacheOption::ExactMatch => 0b0001,
            CacheOption::CloneKey => 0b0010,
            CacheOption::CloneValue => 0b0100,
            CacheOption::ThrowIfExists => 0b1000,
        }
    }
}

/// A set of [`CacheOption`] values.
///
/// The empty set is the default and is contained in every set, preserving
/// the "no options always matches absence of options" semantic of the
/// flags-based ancestor of this type.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CacheOptions {
    bits: u8,
}

impl CacheOptions {
    /// The empty option set.
    pub const NONE: CacheOptions = CacheOptions { bits: 0 };

    /// Returns this set with `option` added.
    pub const fn with(self, option: CacheOption) -> Self {
        Self {
            bits: self.bits | option.bit(),
        }
    }

    /// Returns true if `option` is in the set.
    pub const fn has(self, option: CacheOption) -> bool {
        self.bits & option.bit() != 0
    }

    /// Returns true if every option of `other` is in this set.
    ///
    /// `contains(CacheOptions::NONE)` is true for every set.
    pub const fn contains(self, other: CacheOptions) -> bool {
        self.bits & other.bits == other.bits
    }

    /// Returns true if no option is set.
    pub const fn is_empty(self) -> bool {
        self.bits == 0
    }
}

impl From<CacheOption> for CacheOptions {
    fn from(option: CacheOption) -> Self {
        CacheOptions::NONE.with(option)
    }
}

impl BitOr for CacheOption {
    type Output = CacheOptions;

    fn bitor(self, rhs: CacheOption) -> CacheOptions {
        CacheOptions::NONE.with(self).with(rhs)
    }
}

impl BitOr<CacheOption> for CacheOptions {
    type Output = CacheOptions;

    fn bitor(self, rhs: CacheOption) -> CacheOptions {
        self.with(rhs)
    }
}

impl BitOr for CacheOptions {
    type Output = CacheOptions;

    fn bitor(self, rhs: CacheOptions) -> CacheOptions {
        CacheOptions {
            bits: self.bits | rhs.bits,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_empty() {
        let options = CacheOptions::default();
        assert!(options.is_empty());
        assert!(!options.has(CacheOption::ExactMatch));
        assert!(!options.has(CacheOption::ThrowIfExists));
    }

    #[test]
    fn test_empty_set_is_contained_everywhere() {
        assert!(CacheOptions::NONE.contains(CacheOptions::NONE));
        let options: CacheOptions = CacheOption::CloneKey.into();
        assert!(options.contains(CacheOptions::NONE));
    }

    #[test]
    fn test_bitor_composition() {
        let options = CacheOption::CloneKey | CacheOption::CloneValue;
        assert!(options.has(CacheOption::CloneKey));
        assert!(options.has(CacheOption::CloneValue));
        assert!(!options.has(CacheOption::ExactMatch));

        let options = options | CacheOption::ThrowIfExists;
        assert!(options.has(CacheOption::ThrowIfExists));
    }

    #[test]
    fn test_contains_requires_all_bits() {
        let both = CacheOption::CloneKey | CacheOption::CloneValue;
        let one: CacheOptions = CacheOption::CloneKey.into();
        assert!(both.contains(one));
        assert!(!one.contains(both));
    }
}
