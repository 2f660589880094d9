//! Shape inference rules for operators, multiplexers, and array proxies.
//!
//! All functions are pure over [`Shape`]s. Mixed-signedness operations
//! treat the unsigned operand as one bit wider so the result can hold both
//! operand ranges without overflow.

use crate::errors::{HdlError, Result};
use crate::value::{BinaryOp, UnaryOp};
use strata_common::Shape;

/// Shape of a unary operator applied to an operand of shape `a`.
pub fn unary(op: UnaryOp, a: Shape) -> Shape {
    match op {
        UnaryOp::Neg if a.is_signed() => a,
        UnaryOp::Neg => Shape::signed(a.width() + 1),
        UnaryOp::Invert => a,
        UnaryOp::Bool | UnaryOp::Any | UnaryOp::All | UnaryOp::Xor | UnaryOp::Not => {
            Shape::unsigned(1)
        }
    }
}

/// Shape shared by the bitwise operators and the multiplexer.
pub fn bitwise(a: Shape, b: Shape) -> Shape {
    match (a.is_signed(), b.is_signed()) {
        (false, true) => Shape::signed((a.width() + 1).max(b.width())),
        (true, false) => Shape::signed(a.width().max(b.width() + 1)),
        (signed, _) => Shape::new(a.width().max(b.width()), signed),
    }
}

/// Shape of a binary operator, or a Type error if the width overflows.
pub fn binary(op: BinaryOp, a: Shape, b: Shape) -> Result<Shape> {
    let shape = match op {
        BinaryOp::Add | BinaryOp::Sub => {
            let s = bitwise(a, b);
            Shape::new(s.width() + 1, s.is_signed())
        }
        BinaryOp::Mul => Shape::new(a.width() + b.width(), a.is_signed() || b.is_signed()),
        BinaryOp::And | BinaryOp::Or | BinaryOp::Xor => bitwise(a, b),
        BinaryOp::Shl | BinaryOp::Shr => shifted(op, a, b)?,
        BinaryOp::Eq | BinaryOp::Ne | BinaryOp::Lt | BinaryOp::Le | BinaryOp::Gt | BinaryOp::Ge => {
            Shape::unsigned(1)
        }
    };
    Ok(shape)
}

/// Widens `a` for a shift by a dynamic amount of shape `amount`.
///
/// `<<` grows by the largest amount, `>>` by the magnitude of the most
/// negative one.
fn shifted(op: BinaryOp, a: Shape, amount: Shape) -> Result<Shape> {
    let pow2 = |exp: u32| 1u64.checked_shl(exp);
    let magnitude_bits = amount.width() - u32::from(amount.is_signed());
    let extra = match (op, amount.is_signed()) {
        (BinaryOp::Shl, _) => pow2(magnitude_bits).map(|n| n - 1),
        (_, true) => pow2(magnitude_bits),
        (_, false) => Some(0),
    };
    extra
        .and_then(|extra| extra.checked_add(u64::from(a.width())))
        .and_then(|width| u32::try_from(width).ok())
        .map(|width| Shape::new(width, a.is_signed()))
        .ok_or_else(|| HdlError::WidthOverflow {
            what: format!("'{}' of a {a} value", op.symbol()),
        })
}

/// Shape of an array proxy over elements of the given shapes.
///
/// The width leaves room for a sign bit from any signed element and the
/// result is signed if any element is.
pub fn proxy(elements: impl IntoIterator<Item = Shape>) -> Shape {
    let (width, signed) = elements.into_iter().fold((0, false), |(width, signed), s| {
        (
            width.max(s.width() + u32::from(s.is_signed())),
            signed || s.is_signed(),
        )
    });
    Shape::new(width, signed)
}
