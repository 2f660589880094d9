//! Builders for constants, operators, indexing, concatenation, and samples.
//!
//! Every builder validates its operands and infers the result shape before
//! the node is allocated, so a returned [`ValueId`] always names a
//! well-formed node. Builders are `#[track_caller]` and record the caller's
//! location on the node.

use crate::db::ValueDb;
use crate::errors::{HdlError, Result};
use crate::ids::ValueId;
use crate::infer;
use crate::value::{BinaryOp, Const, Operand, Operator, UnaryOp, Value};
use crate::warnings;
use num_bigint::BigInt;
use strata_common::{Shape, SrcLoc};

impl ValueDb {
    /// Creates a constant of the smallest shape holding `value`.
    #[track_caller]
    pub fn constant(&mut self, value: impl Into<BigInt>) -> ValueId {
        self.alloc_const(Const::from_int(value), SrcLoc::caller())
    }

    /// Creates a constant of an explicit shape; the value is truncated to fit.
    #[track_caller]
    pub fn constant_with(&mut self, value: impl Into<BigInt>, shape: impl Into<Shape>) -> ValueId {
        self.alloc_const(Const::new(value, shape), SrcLoc::caller())
    }

    fn alloc_const(&mut self, c: Const, loc: SrcLoc) -> ValueId {
        let shape = c.shape();
        self.alloc(Value::Const(c), Some(shape), loc)
    }

    /// Turns an operand into a node, wrapping literals as constants.
    #[track_caller]
    pub fn operand(&mut self, operand: impl Into<Operand>) -> ValueId {
        let loc = SrcLoc::caller();
        match operand.into() {
            Operand::Value(id) => id,
            Operand::Int(n) => self.alloc_const(Const::from_int(n), loc),
            Operand::Bool(b) => self.alloc_const(Const::new(u8::from(b), 1u32), loc),
            Operand::Enum(e) => self.alloc_const(Const::new(e.value, e.shape), loc),
        }
    }

    /// Applies a unary operator.
    #[track_caller]
    pub fn unary(&mut self, op: UnaryOp, a: impl Into<Operand>) -> Result<ValueId> {
        let loc = SrcLoc::caller();
        let a = self.operand(a);
        let shape = infer::unary(op, self.shape(a)?);
        log::trace!("({} v{}) -> {shape}", op.symbol(), a.as_raw());
        Ok(self.alloc(Value::Operator(Operator::Unary(op, a)), Some(shape), loc))
    }

    /// Applies a binary operator.
    ///
    /// A signed shift amount is accepted with a `W303` warning.
    #[track_caller]
    pub fn binary(&mut self, op: BinaryOp, a: impl Into<Operand>, b: impl Into<Operand>) -> Result<ValueId> {
        let loc = SrcLoc::caller();
        let a = self.operand(a);
        let b = self.operand(b);
        let (sa, sb) = (self.shape(a)?, self.shape(b)?);
        if matches!(op, BinaryOp::Shl | BinaryOp::Shr) && sb.is_signed() {
            let repr = self.repr(b);
            self.warn(warnings::warn_signed_shift_amount(&repr, loc.clone()));
        }
        let shape = infer::binary(op, sa, sb)?;
        log::trace!("({} v{} v{}) -> {shape}", op.symbol(), a.as_raw(), b.as_raw());
        Ok(self.alloc(Value::Operator(Operator::Binary(op, a, b)), Some(shape), loc))
    }

    /// Arithmetic negation.
    #[track_caller]
    pub fn neg(&mut self, a: impl Into<Operand>) -> Result<ValueId> {
        self.unary(UnaryOp::Neg, a)
    }

    /// Bitwise inversion.
    #[track_caller]
    pub fn invert(&mut self, a: impl Into<Operand>) -> Result<ValueId> {
        self.unary(UnaryOp::Invert, a)
    }

    /// Converts to a 1-bit truth value.
    #[track_caller]
    pub fn as_bool(&mut self, a: impl Into<Operand>) -> Result<ValueId> {
        self.unary(UnaryOp::Bool, a)
    }

    /// OR-reduction.
    #[track_caller]
    pub fn any(&mut self, a: impl Into<Operand>) -> Result<ValueId> {
        self.unary(UnaryOp::Any, a)
    }

    /// AND-reduction.
    #[track_caller]
    pub fn all(&mut self, a: impl Into<Operand>) -> Result<ValueId> {
        self.unary(UnaryOp::All, a)
    }

    /// XOR-reduction (parity).
    #[track_caller]
    pub fn xor_reduce(&mut self, a: impl Into<Operand>) -> Result<ValueId> {
        self.unary(UnaryOp::Xor, a)
    }

    /// Logical not.
    #[track_caller]
    pub fn not(&mut self, a: impl Into<Operand>) -> Result<ValueId> {
        self.unary(UnaryOp::Not, a)
    }

    /// `a + b`, one bit wider than the operands.
    #[track_caller]
    pub fn add(&mut self, a: impl Into<Operand>, b: impl Into<Operand>) -> Result<ValueId> {
        self.binary(BinaryOp::Add, a, b)
    }

    /// `a - b`, one bit wider than the operands.
    #[track_caller]
    pub fn sub(&mut self, a: impl Into<Operand>, b: impl Into<Operand>) -> Result<ValueId> {
        self.binary(BinaryOp::Sub, a, b)
    }

    /// `a * b`.
    #[track_caller]
    pub fn mul(&mut self, a: impl Into<Operand>, b: impl Into<Operand>) -> Result<ValueId> {
        self.binary(BinaryOp::Mul, a, b)
    }

    /// Bitwise `a & b`.
    #[track_caller]
    pub fn and(&mut self, a: impl Into<Operand>, b: impl Into<Operand>) -> Result<ValueId> {
        self.binary(BinaryOp::And, a, b)
    }

    /// Bitwise `a | b`.
    #[track_caller]
    pub fn or(&mut self, a: impl Into<Operand>, b: impl Into<Operand>) -> Result<ValueId> {
        self.binary(BinaryOp::Or, a, b)
    }

    /// Bitwise `a ^ b`.
    #[track_caller]
    pub fn xor(&mut self, a: impl Into<Operand>, b: impl Into<Operand>) -> Result<ValueId> {
        self.binary(BinaryOp::Xor, a, b)
    }

    /// `a << b` for a dynamic amount `b`.
    #[track_caller]
    pub fn shl(&mut self, a: impl Into<Operand>, b: impl Into<Operand>) -> Result<ValueId> {
        self.binary(BinaryOp::Shl, a, b)
    }

    /// `a >> b` for a dynamic amount `b`.
    #[track_caller]
    pub fn shr(&mut self, a: impl Into<Operand>, b: impl Into<Operand>) -> Result<ValueId> {
        self.binary(BinaryOp::Shr, a, b)
    }

    /// `a == b`.
    #[track_caller]
    pub fn eq(&mut self, a: impl Into<Operand>, b: impl Into<Operand>) -> Result<ValueId> {
        self.binary(BinaryOp::Eq, a, b)
    }

    /// `a != b`.
    #[track_caller]
    pub fn ne(&mut self, a: impl Into<Operand>, b: impl Into<Operand>) -> Result<ValueId> {
        self.binary(BinaryOp::Ne, a, b)
    }

    /// `a < b`.
    #[track_caller]
    pub fn lt(&mut self, a: impl Into<Operand>, b: impl Into<Operand>) -> Result<ValueId> {
        self.binary(BinaryOp::Lt, a, b)
    }

    /// `a <= b`.
    #[track_caller]
    pub fn le(&mut self, a: impl Into<Operand>, b: impl Into<Operand>) -> Result<ValueId> {
        self.binary(BinaryOp::Le, a, b)
    }

    /// `a > b`.
    #[track_caller]
    pub fn gt(&mut self, a: impl Into<Operand>, b: impl Into<Operand>) -> Result<ValueId> {
        self.binary(BinaryOp::Gt, a, b)
    }

    /// `a >= b`.
    #[track_caller]
    pub fn ge(&mut self, a: impl Into<Operand>, b: impl Into<Operand>) -> Result<ValueId> {
        self.binary(BinaryOp::Ge, a, b)
    }

    /// Selects `then` when `sel` is nonzero, `otherwise` when it is zero.
    ///
    /// A selector wider than one bit is reduced with [`as_bool`](Self::as_bool).
    #[track_caller]
    pub fn mux(
        &mut self,
        sel: impl Into<Operand>,
        then: impl Into<Operand>,
        otherwise: impl Into<Operand>,
    ) -> Result<ValueId> {
        let loc = SrcLoc::caller();
        let mut sel = self.operand(sel);
        if self.width(sel)? != 1 {
            sel = self.as_bool(sel)?;
        }
        let then = self.operand(then);
        let otherwise = self.operand(otherwise);
        let shape = infer::bitwise(self.shape(then)?, self.shape(otherwise)?);
        Ok(self.alloc(Value::Mux { sel, then, otherwise }, Some(shape), loc))
    }

    /// The single bit `index`; negative indices count from the top.
    #[track_caller]
    pub fn bit(&mut self, value: impl Into<Operand>, index: i64) -> Result<ValueId> {
        let loc = SrcLoc::caller();
        let value = self.operand(value);
        let width = self.width(value)?;
        let w = i64::from(width);
        if index < -w || index >= w {
            return Err(HdlError::IndexOutOfRange { index, width });
        }
        let start = if index < 0 { index + w } else { index } as u32;
        Ok(self.alloc_slice(value, start, start + 1, loc))
    }

    /// The bits `start..end`; negative bounds count from the top.
    #[track_caller]
    pub fn slice(&mut self, value: impl Into<Operand>, start: i64, end: i64) -> Result<ValueId> {
        let loc = SrcLoc::caller();
        let value = self.operand(value);
        let width = self.width(value)?;
        let resolve = |bound: i64| -> Option<u32> {
            let w = i64::from(width);
            match bound {
                b if b < -w || b > w => None,
                b if b < 0 => Some((b + w) as u32),
                b => Some(b as u32),
            }
        };
        let start = resolve(start).ok_or(HdlError::SliceStartOutOfRange { start, width })?;
        let end = resolve(end).ok_or(HdlError::SliceEndOutOfRange { end, width })?;
        if start > end {
            return Err(HdlError::SliceReversed { start, end });
        }
        Ok(self.alloc_slice(value, start, end, loc))
    }

    /// Slicing with optional bounds and step, clamped like a sequence slice.
    ///
    /// A step of 1 produces a [`Value::Slice`]; any other step produces a
    /// concatenation of the selected single bits.
    #[track_caller]
    pub fn slice_step(
        &mut self,
        value: impl Into<Operand>,
        start: Option<i64>,
        end: Option<i64>,
        step: Option<i64>,
    ) -> Result<ValueId> {
        let value = self.operand(value);
        let width = i64::from(self.width(value)?);
        let step = step.unwrap_or(1);
        if step == 0 {
            return Err(HdlError::ZeroSliceStep);
        }
        let (lower, upper) = if step < 0 { (-1, width - 1) } else { (0, width) };
        let clamp = |bound: Option<i64>, default: i64| match bound {
            None => default,
            Some(b) if b < 0 => (b + width).max(lower),
            Some(b) => b.min(upper),
        };
        let start = clamp(start, if step < 0 { upper } else { lower });
        let end = clamp(end, if step < 0 { lower } else { upper });
        if step == 1 {
            return self.slice(value, start, end.max(start));
        }
        let mut bits = Vec::new();
        let mut i = start;
        while (step > 0 && i < end) || (step < 0 && i > end) {
            bits.push(self.bit(value, i)?);
            i += step;
        }
        self.cat(bits)
    }

    fn alloc_slice(&mut self, value: ValueId, start: u32, end: u32, loc: SrcLoc) -> ValueId {
        let shape = Shape::unsigned(end - start);
        self.alloc(Value::Slice { value, start, end }, Some(shape), loc)
    }

    /// A `width`-bit window starting at bit `offset`.
    ///
    /// A literal offset folds into a static slice.
    #[track_caller]
    pub fn bit_select(&mut self, value: impl Into<Operand>, offset: impl Into<Operand>, width: u32) -> Result<ValueId> {
        let value = self.operand(value);
        match offset.into() {
            Operand::Int(n) => {
                let start = saturate(&n);
                self.slice_step(value, Some(start), Some(start.saturating_add(i64::from(width))), None)
            }
            other => {
                let offset = self.operand(other);
                self.alloc_part(value, offset, width, 1, SrcLoc::caller())
            }
        }
    }

    /// The `offset`-th `width`-bit word.
    ///
    /// `width` must be positive. A literal offset folds into a static slice.
    #[track_caller]
    pub fn word_select(&mut self, value: impl Into<Operand>, offset: impl Into<Operand>, width: u32) -> Result<ValueId> {
        if width == 0 {
            return Err(HdlError::InvalidStride { stride: width });
        }
        let value = self.operand(value);
        match offset.into() {
            Operand::Int(n) => {
                let (word, w) = (saturate(&n), i64::from(width));
                let start = word.saturating_mul(w);
                self.slice_step(value, Some(start), Some(start.saturating_add(w)), None)
            }
            other => {
                let offset = self.operand(other);
                self.alloc_part(value, offset, width, width, SrcLoc::caller())
            }
        }
    }

    fn alloc_part(&mut self, value: ValueId, offset: ValueId, width: u32, stride: u32, loc: SrcLoc) -> Result<ValueId> {
        self.shape(value)?;
        self.shape(offset)?;
        Ok(self.alloc(
            Value::Part {
                value,
                offset,
                width,
                stride,
            },
            Some(Shape::unsigned(width)),
            loc,
        ))
    }

    /// Concatenates parts, the first part in the least significant bits.
    #[track_caller]
    pub fn cat<I, T>(&mut self, parts: I) -> Result<ValueId>
    where
        I: IntoIterator<Item = T>,
        T: Into<Operand>,
    {
        let loc = SrcLoc::caller();
        let parts: Vec<ValueId> = parts.into_iter().map(|p| self.operand(p)).collect();
        let mut width: u32 = 0;
        for &part in &parts {
            width = width
                .checked_add(self.width(part)?)
                .ok_or_else(|| HdlError::WidthOverflow { what: "concatenation".into() })?;
        }
        Ok(self.alloc(Value::Cat(parts), Some(Shape::unsigned(width)), loc))
    }

    /// `count` copies of `value` side by side.
    #[track_caller]
    pub fn repl(&mut self, value: impl Into<Operand>, count: u32) -> Result<ValueId> {
        let loc = SrcLoc::caller();
        let value = self.operand(value);
        let width = self
            .width(value)?
            .checked_mul(count)
            .ok_or_else(|| HdlError::WidthOverflow { what: "replication".into() })?;
        Ok(self.alloc(Value::Repl { value, count }, Some(Shape::unsigned(width)), loc))
    }

    /// The value of a signal or constant `clocks` cycles ago in `domain`.
    ///
    /// Only meaningful to simulators.
    #[track_caller]
    pub fn sample(&mut self, value: impl Into<Operand>, clocks: i64, domain: Option<&str>) -> Result<ValueId> {
        let loc = SrcLoc::caller();
        let value = self.operand(value);
        let sampleable = matches!(
            self.value(value),
            Value::Signal(_) | Value::Const(_) | Value::ClockSignal { .. } | Value::ResetSignal { .. }
        );
        if !sampleable {
            return Err(HdlError::NotSampleable { repr: self.repr(value) });
        }
        if clocks < 0 {
            return Err(HdlError::SampleFuture {
                clocks: clocks.saturating_neg(),
            });
        }
        let clocks = u32::try_from(clocks).map_err(|_| HdlError::WidthOverflow {
            what: "sample history".into(),
        })?;
        let shape = self.shape(value)?;
        let domain = domain.map(|d| self.intern(d));
        Ok(self.alloc(Value::Sample { value, clocks, domain }, Some(shape), loc))
    }

    /// A 1-bit marker that is set on the first simulated step.
    #[track_caller]
    pub fn initial(&mut self) -> ValueId {
        self.alloc(Value::Initial, Some(Shape::unsigned(1)), SrcLoc::caller())
    }
}

/// Clamps a literal offset into a range where bound arithmetic cannot overflow.
fn saturate(n: &BigInt) -> i64 {
    const LIMIT: i64 = i64::MAX / 4;
    match i64::try_from(n) {
        Ok(v) => v.clamp(-LIMIT, LIMIT),
        Err(_) if n.sign() == num_bigint::Sign::Minus => -LIMIT,
        Err(_) => LIMIT,
    }
}
