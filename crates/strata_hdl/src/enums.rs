//! Enumerations usable as signal shapes, operands, and match patterns.

use crate::value::Decoder;
use num_bigint::BigInt;
use std::rc::Rc;
use strata_common::Shape;

/// A Rust enumeration whose members map to integers.
///
/// ```ignore
/// #[derive(Clone, Copy)]
/// enum Color { Red = 1, Green = 2, Blue = 3 }
///
/// impl HdlEnum for Color {
///     fn members() -> &'static [(&'static str, i64)] {
///         &[("RED", 1), ("GREEN", 2), ("BLUE", 3)]
///     }
///     fn value(self) -> i64 { self as i64 }
/// }
/// ```
pub trait HdlEnum: Copy + 'static {
    /// All members as `(name, value)` pairs, in declaration order.
    fn members() -> &'static [(&'static str, i64)];

    /// The integer value of this member.
    fn value(self) -> i64;

    /// The smallest shape holding every member value.
    fn shape() -> Shape {
        let values = Self::members().iter().map(|(_, v)| *v);
        match (values.clone().min(), values.max()) {
            (Some(min), Some(max)) => Shape::for_values(&BigInt::from(min), &BigInt::from(max)),
            _ => Shape::unsigned(0),
        }
    }

    /// This member as a value of the enumeration's shape.
    fn to_value(self) -> EnumValue {
        EnumValue {
            value: BigInt::from(self.value()),
            shape: Self::shape(),
        }
    }

    /// A decoder rendering members as `NAME/value` and anything else in decimal.
    fn decoder() -> Decoder {
        Rc::new(|value: &BigInt| {
            Self::members()
                .iter()
                .find(|(_, v)| BigInt::from(*v) == *value)
                .map(|(name, v)| format!("{name}/{v}"))
                .unwrap_or_else(|| value.to_string())
        })
    }
}

/// An enumeration member lifted to a value: its integer and the enumeration shape.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct EnumValue {
    /// The member's integer value.
    pub value: BigInt,
    /// Shape of the whole enumeration.
    pub shape: Shape,
}
