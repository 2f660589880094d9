//! Match patterns and the `matches` comparison builder.
//!
//! A pattern is an integer, a bit string over `0`, `1`, and `-` (don't
//! care), or an enumeration member. Bit strings and enumeration members are
//! compared under a mask; integers are compared for plain equality.

use crate::db::ValueDb;
use crate::enums::EnumValue;
use crate::errors::{HdlError, Result};
use crate::ids::ValueId;
use crate::warnings;
use num_bigint::BigInt;
use strata_common::{bits_for, Shape, SrcLoc};

/// One alternative of a `matches` call or a `Switch` case.
#[derive(Clone, Debug, PartialEq)]
pub enum Pattern {
    /// An integer compared for equality.
    Int(BigInt),
    /// A bit string, most significant bit first. Whitespace is ignored.
    Bits(String),
    /// An enumeration member, compared as its two's complement bit string.
    Enum(EnumValue),
}

impl From<&str> for Pattern {
    fn from(bits: &str) -> Self {
        Pattern::Bits(bits.to_string())
    }
}

impl From<String> for Pattern {
    fn from(bits: String) -> Self {
        Pattern::Bits(bits)
    }
}

impl From<BigInt> for Pattern {
    fn from(n: BigInt) -> Self {
        Pattern::Int(n)
    }
}

impl From<EnumValue> for Pattern {
    fn from(e: EnumValue) -> Self {
        Pattern::Enum(e)
    }
}

macro_rules! pattern_from_int {
    ($($ty:ty),*) => {
        $(
            impl From<$ty> for Pattern {
                fn from(n: $ty) -> Self {
                    Pattern::Int(BigInt::from(n))
                }
            }
        )*
    };
}

pattern_from_int!(i32, i64, u32, u64, usize);

/// A validated pattern, ready to be compiled into a comparison.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) enum Normalized {
    /// Plain equality against an integer.
    Equal(BigInt),
    /// A bit string exactly as wide as the matched value.
    Masked(String),
}

impl Normalized {
    /// The pattern as a bit string of `width` characters.
    pub(crate) fn to_bits(&self, width: u32) -> String {
        match self {
            Normalized::Equal(n) => to_bit_string(n, width),
            Normalized::Masked(bits) => bits.clone(),
        }
    }
}

/// Checks `pattern` against a value of `width` bits.
///
/// Returns `Ok(None)` for an integer pattern wider than the value, which can
/// never match; a `W302` warning is recorded in that case.
pub(crate) fn normalize(db: &ValueDb, pattern: &Pattern, width: u32, loc: &SrcLoc) -> Result<Option<Normalized>> {
    match pattern {
        Pattern::Int(n) => {
            if bits_for(n, false) > width {
                let rendered = format!("{n:b}");
                db.warn(warnings::warn_pattern_never_true(&rendered, width, loc.clone()));
                return Ok(None);
            }
            Ok(Some(Normalized::Equal(n.clone())))
        }
        Pattern::Bits(bits) => {
            let bits: String = bits.chars().filter(|c| !c.is_whitespace()).collect();
            if !bits.chars().all(|c| matches!(c, '0' | '1' | '-')) {
                return Err(HdlError::PatternBits { pattern: bits });
            }
            if bits.len() != width as usize {
                return Err(HdlError::PatternWidth { pattern: bits, width });
            }
            Ok(Some(Normalized::Masked(bits)))
        }
        Pattern::Enum(e) => Ok(Some(Normalized::Masked(to_bit_string(&e.value, width)))),
    }
}

/// Two's complement rendering of `n` in exactly `width` digits.
fn to_bit_string(n: &BigInt, width: u32) -> String {
    if width == 0 {
        return String::new();
    }
    let bits = Shape::unsigned(width).normalize(n);
    format!("{bits:0>width$b}", width = width as usize)
}

/// Splits a bit string into `(mask, value)` integers.
fn mask_and_value(bits: &str) -> (BigInt, BigInt) {
    bits.chars().fold((BigInt::from(0), BigInt::from(0)), |(mask, value), c| {
        let mask = (mask << 1u8) + u8::from(c != '-');
        let value = (value << 1u8) + u8::from(c == '1');
        (mask, value)
    })
}

impl ValueDb {
    /// A 1-bit value that is set when `value` matches any of `patterns`.
    ///
    /// No patterns give a constant zero. Integer patterns wider than the
    /// value are dropped with a `W302` warning.
    #[track_caller]
    pub fn matches<I, P>(&mut self, value: ValueId, patterns: I) -> Result<ValueId>
    where
        I: IntoIterator<Item = P>,
        P: Into<Pattern>,
    {
        let loc = SrcLoc::caller();
        let width = self.width(value)?;
        let mut terms = Vec::new();
        for pattern in patterns {
            let Some(normalized) = normalize(self, &pattern.into(), width, &loc)? else {
                continue;
            };
            let term = match normalized {
                Normalized::Equal(n) => self.eq(value, n)?,
                Normalized::Masked(bits) => {
                    let (mask, bits) = mask_and_value(&bits);
                    let mask = self.constant_with(mask, width);
                    let bits = self.constant_with(bits, width);
                    let masked = self.and(value, mask)?;
                    self.eq(masked, bits)?
                }
            };
            terms.push(term);
        }
        match terms.len() {
            0 => Ok(self.constant_with(0, 1u32)),
            1 => Ok(terms[0]),
            _ => {
                let cat = self.cat(terms)?;
                self.any(cat)
            }
        }
    }
}
