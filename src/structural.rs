//! Deep structural equality.
//!
//! The cache compares keys without reference-identity bias: two keys are the
//! same key when they are built the same way, not when they are the same
//! allocation. [`StructuralEq`] is the seam for that comparison. It is the
//! default key comparison of the cache engine (both for exact-match lookups
//! and for the default customizer) and can be implemented for domain key
//! types that need structural semantics.
//!
//! For plain std types structural equality coincides with `PartialEq`, so
//! the implementations below simply delegate. The interesting implementation
//! lives on [`Value`](crate::Value), where object entries compare
//! independently of their insertion order.

use chrono::{DateTime, Utc};

/// Deep structural equality between two values of the same type.
///
/// Implementations must be reflexive and symmetric. Unlike `Eq`, float
/// implementations are allowed: `NaN` is simply unequal to everything,
/// matching the engine's "NaN-free primitive equality" rule.
pub trait StructuralEq {
    /// Returns true if `self` and `other` are structurally equal.
    fn structural_eq(&self, other: &Self) -> bool;
}

macro_rules! delegate_structural_eq {
    ($($t:ty),* $(,)?) => {
        $(
            impl StructuralEq for $t {
                fn structural_eq(&self, other: &Self) -> bool {
                    self == other
                }
            }
        )*
    };
}

delegate_structural_eq!(
    (),
    bool,
    char,
    u8,
    u16,
    u32,
    u64,
    u128,
    usize,
    i8,
    i16,
    i32,
    i64,
    i128,
    isize,
    f32,
    f64,
    String,
    str,
);

/// Dates compare by instant, regardless of how they were constructed.
impl StructuralEq for DateTime<Utc> {
    fn structural_eq(&self, other: &Self) -> bool {
        self == other
    }
}

impl<T: StructuralEq> StructuralEq for Option<T> {
    fn structural_eq(&self, other: &Self) -> bool {
        match (self, other) {
            (None, None) => true,
            (Some(a), Some(b)) => a.structural_eq(b),
            _ => false,
        }
    }
}

/// Sequences compare by index: order and length both matter.
impl<T: StructuralEq> StructuralEq for Vec<T> {
    fn structural_eq(&self, other: &Self) -> bool {
        self.as_slice().structural_eq(other.as_slice())
    }
}

impl<T: StructuralEq> StructuralEq for [T] {
    fn structural_eq(&self, other: &Self) -> bool {
        self.len() == other.len()
            && self
                .iter()
                .zip(other.iter())
                .all(|(a, b)| a.structural_eq(b))
    }
}

impl<T: StructuralEq + ?Sized> StructuralEq for Box<T> {
    fn structural_eq(&self, other: &Self) -> bool {
        (**self).structural_eq(&**other)
    }
}

impl<A: StructuralEq, B: StructuralEq> StructuralEq for (A, B) {
    fn structural_eq(&self, other: &Self) -> bool {
        self.0.structural_eq(&other.0) && self.1.structural_eq(&other.1)
    }
}

impl<A: StructuralEq, B: StructuralEq, C: StructuralEq> StructuralEq for (A, B, C) {
    fn structural_eq(&self, other: &Self) -> bool {
        self.0.structural_eq(&other.0)
            && self.1.structural_eq(&other.1)
            && self.2.structural_eq(&other.2)
    }
}
