//! Bit-vector shapes and minimum-width computations for integers.
//!
//! A [`Shape`] is the `(width, signed)` pair every hardware value resolves
//! to. Shapes are plain values: they carry no identity and compare by value.

use num_bigint::BigInt;
use num_traits::{One, Signed, Zero};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::Range;

/// Returns the minimum number of bits needed to represent `n`.
///
/// Non-negative values need their bit length (with `0` and `1` fitting in one
/// bit); negative values always include a sign bit. When `require_sign_bit`
/// is set, a sign bit is added for non-negative values too.
pub fn bits_for(n: &BigInt, require_sign_bit: bool) -> u32 {
    if n.is_zero() {
        return 1;
    }
    if n.is_negative() {
        let magnitude: BigInt = -n - BigInt::one();
        return magnitude.bits() as u32 + 1;
    }
    let bits = n.bits() as u32;
    if require_sign_bit {
        bits + 1
    } else {
        bits
    }
}

/// The width and signedness of a bit vector.
///
/// A zero-width shape is always unsigned; [`Shape::new`] enforces this.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Default, Serialize, Deserialize)]
pub struct Shape {
    width: u32,
    signed: bool,
}

impl Shape {
    /// Creates a shape, normalizing zero-width shapes to unsigned.
    pub fn new(width: u32, signed: bool) -> Self {
        Self {
            width,
            signed: signed && width > 0,
        }
    }

    /// An unsigned shape of the given width.
    pub fn unsigned(width: u32) -> Self {
        Self::new(width, false)
    }

    /// A signed shape of the given width.
    pub fn signed(width: u32) -> Self {
        Self::new(width, true)
    }

    /// Returns the number of bits.
    pub fn width(self) -> u32 {
        self.width
    }

    /// Returns `true` if the shape is two's complement signed.
    pub fn is_signed(self) -> bool {
        self.signed
    }

    /// The smallest shape that holds `n`: signed exactly when `n` is negative.
    pub fn for_int(n: &BigInt) -> Self {
        Self::new(bits_for(n, false), n.is_negative())
    }

    /// The smallest shape holding every value in the closed range `min..=max`.
    pub fn for_values(min: &BigInt, max: &BigInt) -> Self {
        let signed = min.is_negative() || max.is_negative();
        let width = bits_for(min, signed).max(bits_for(max, signed));
        Self::new(width, signed)
    }

    /// The smallest shape holding every value of the half-open range.
    ///
    /// An empty range produces the shape of its start value, so `0..0` and
    /// `0..1` are both a single unsigned bit.
    pub fn for_range(range: Range<i64>) -> Self {
        let low = BigInt::from(range.start);
        let high = if range.end > range.start {
            BigInt::from(range.end) - BigInt::one()
        } else {
            low.clone()
        };
        Self::for_values(&low, &high)
    }

    /// Reduces `value` modulo `2^width`, sign-extending when signed.
    pub fn normalize(self, value: &BigInt) -> BigInt {
        if self.width == 0 {
            return BigInt::zero();
        }
        if self.fits(value) {
            return value.clone();
        }
        let modulus = BigInt::one() << self.width;
        let mut masked = value & (&modulus - BigInt::one());
        if self.signed && masked.bit(u64::from(self.width - 1)) {
            masked -= modulus;
        }
        masked
    }

    /// Returns `true` if `value` is representable without truncation.
    pub fn fits(self, value: &BigInt) -> bool {
        if value.is_zero() {
            return true;
        }
        if value.is_negative() && !self.signed {
            return false;
        }
        bits_for(value, self.signed) <= self.width
    }
}

impl From<u32> for Shape {
    fn from(width: u32) -> Self {
        Shape::unsigned(width)
    }
}

impl From<(u32, bool)> for Shape {
    fn from((width, signed): (u32, bool)) -> Self {
        Shape::new(width, signed)
    }
}

impl fmt::Display for Shape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.signed {
            write!(f, "signed({})", self.width)
        } else {
            write!(f, "unsigned({})", self.width)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn big(n: i64) -> BigInt {
        BigInt::from(n)
    }

    #[test]
    fn bits_for_small_values() {
        assert_eq!(bits_for(&big(0), false), 1);
        assert_eq!(bits_for(&big(1), false), 1);
        assert_eq!(bits_for(&big(10), false), 4);
        assert_eq!(bits_for(&big(-10), false), 5);
        assert_eq!(bits_for(&big(-1), false), 1);
        assert_eq!(bits_for(&big(-4), false), 3);
        assert_eq!(bits_for(&big(-5), false), 4);
        assert_eq!(bits_for(&big(4), true), 4);
    }

    #[test]
    fn zero_width_is_unsigned() {
        let s = Shape::new(0, true);
        assert!(!s.is_signed());
        assert_eq!(s, Shape::unsigned(0));
    }

    #[test]
    fn for_int_shapes() {
        assert_eq!(Shape::for_int(&big(0)), Shape::unsigned(1));
        assert_eq!(Shape::for_int(&big(10)), Shape::unsigned(4));
        assert_eq!(Shape::for_int(&big(-10)), Shape::signed(5));
        assert_eq!(Shape::for_int(&big(-3)), Shape::signed(3));
    }

    #[test]
    fn for_range_shapes() {
        assert_eq!(Shape::for_range(0..16), Shape::unsigned(4));
        assert_eq!(Shape::for_range(4..16), Shape::unsigned(4));
        assert_eq!(Shape::for_range(-4..16), Shape::signed(5));
        assert_eq!(Shape::for_range(-20..16), Shape::signed(6));
        assert_eq!(Shape::for_range(0..0), Shape::unsigned(1));
        assert_eq!(Shape::for_range(0..1), Shape::unsigned(1));
        assert_eq!(Shape::for_range(-15..1), Shape::signed(5));
    }

    #[test]
    fn for_values_enum_like() {
        assert_eq!(Shape::for_values(&big(1), &big(3)), Shape::unsigned(2));
        assert_eq!(Shape::for_values(&big(-1), &big(1)), Shape::signed(2));
    }

    #[test]
    fn normalize_masks_and_sign_extends() {
        assert_eq!(Shape::signed(5).normalize(&big(0b10110)), big(-10));
        assert_eq!(Shape::unsigned(4).normalize(&big(-1)), big(15));
        assert_eq!(Shape::unsigned(0).normalize(&big(7)), big(0));
        assert_eq!(Shape::signed(4).normalize(&big(7)), big(7));
    }

    #[test]
    fn fits_checks_range() {
        assert!(Shape::unsigned(3).fits(&big(7)));
        assert!(!Shape::unsigned(3).fits(&big(8)));
        assert!(!Shape::signed(3).fits(&big(-5)));
        assert!(Shape::signed(3).fits(&big(-4)));
        assert!(Shape::signed(3).fits(&big(3)));
        assert!(!Shape::signed(3).fits(&big(4)));
        assert!(!Shape::unsigned(8).fits(&big(-1)));
        assert!(Shape::unsigned(0).fits(&big(0)));
        assert!(!Shape::unsigned(0).fits(&big(1)));
    }

    #[test]
    fn widest_shape_keeps_small_values() {
        let widest = Shape::signed(u32::MAX);
        assert!(widest.fits(&big(-1)));
        assert_eq!(widest.normalize(&big(-1)), big(-1));
        assert_eq!(Shape::unsigned(u32::MAX).normalize(&big(12)), big(12));
    }

    #[test]
    fn display() {
        assert_eq!(Shape::unsigned(4).to_string(), "unsigned(4)");
        assert_eq!(Shape::signed(2).to_string(), "signed(2)");
    }

    #[test]
    fn serde_roundtrip() {
        let s = Shape::signed(12);
        let json = serde_json::to_string(&s).unwrap();
        let back: Shape = serde_json::from_str(&json).unwrap();
        assert_eq!(s, back);
    }
}
