//! Value nodes: the closed set of hardware expression kinds.
//!
//! Nodes live in a [`ValueDb`](crate::db::ValueDb) and refer to each other
//! by [`ValueId`], so a sub-expression used twice is shared rather than
//! copied. Nodes are built through the database's builder methods, which
//! validate operands and infer the result [`Shape`] eagerly.

use crate::db::ValueDb;
use crate::enums::EnumValue;
use crate::errors::Result;
use crate::ids::{ArrayId, ValueId};
use num_bigint::BigInt;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::rc::Rc;
use strata_common::{Ident, Shape, SrcLoc};

/// A unary operator.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
pub enum UnaryOp {
    /// Arithmetic negation; the result is always signed.
    Neg,
    /// Bitwise inversion.
    Invert,
    /// `1` if any bit is set; used when a value acts as a condition.
    Bool,
    /// OR-reduction.
    Any,
    /// AND-reduction.
    All,
    /// XOR-reduction.
    Xor,
    /// Logical not: `1` if no bit is set.
    Not,
}

impl UnaryOp {
    /// The operator's symbol in printed node form.
    pub fn symbol(self) -> &'static str {
        match self {
            UnaryOp::Neg => "-",
            UnaryOp::Invert => "~",
            UnaryOp::Bool => "b",
            UnaryOp::Any => "r|",
            UnaryOp::All => "r&",
            UnaryOp::Xor => "r^",
            UnaryOp::Not => "!",
        }
    }
}

/// A binary operator.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
pub enum BinaryOp {
    /// Addition.
    Add,
    /// Subtraction.
    Sub,
    /// Multiplication.
    Mul,
    /// Bitwise AND.
    And,
    /// Bitwise OR.
    Or,
    /// Bitwise XOR.
    Xor,
    /// Left shift by a dynamic amount.
    Shl,
    /// Right shift by a dynamic amount.
    Shr,
    /// Equality.
    Eq,
    /// Inequality.
    Ne,
    /// Less than.
    Lt,
    /// Less than or equal.
    Le,
    /// Greater than.
    Gt,
    /// Greater than or equal.
    Ge,
}

impl BinaryOp {
    /// The operator's symbol in printed node form.
    pub fn symbol(self) -> &'static str {
        match self {
            BinaryOp::Add => "+",
            BinaryOp::Sub => "-",
            BinaryOp::Mul => "*",
            BinaryOp::And => "&",
            BinaryOp::Or => "|",
            BinaryOp::Xor => "^",
            BinaryOp::Shl => "<<",
            BinaryOp::Shr => ">>",
            BinaryOp::Eq => "==",
            BinaryOp::Ne => "!=",
            BinaryOp::Lt => "<",
            BinaryOp::Le => "<=",
            BinaryOp::Gt => ">",
            BinaryOp::Ge => ">=",
        }
    }
}

/// An operator applied to one or two operand nodes.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Operator {
    /// A unary operator.
    Unary(UnaryOp, ValueId),
    /// A binary operator.
    Binary(BinaryOp, ValueId, ValueId),
}

impl Operator {
    /// The operand nodes, left to right.
    pub fn operands(&self) -> Vec<ValueId> {
        match *self {
            Operator::Unary(_, a) => vec![a],
            Operator::Binary(_, a, b) => vec![a, b],
        }
    }
}

/// A constant bit vector.
///
/// The stored value is always normalized to the shape: masked to the width
/// and sign-extended when signed. Two constants compare equal when value and
/// shape agree, but `Const` is deliberately not `Hash`; node identity is
/// carried by [`ValueId`].
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct Const {
    value: BigInt,
    shape: Shape,
}

impl Const {
    /// Creates a constant of an explicit shape, normalizing the value.
    pub fn new(value: impl Into<BigInt>, shape: impl Into<Shape>) -> Self {
        let shape = shape.into();
        Self {
            value: shape.normalize(&value.into()),
            shape,
        }
    }

    /// Creates a constant of the smallest shape holding `value`.
    pub fn from_int(value: impl Into<BigInt>) -> Self {
        let value = value.into();
        Self {
            shape: Shape::for_int(&value),
            value,
        }
    }

    /// The normalized value.
    pub fn value(&self) -> &BigInt {
        &self.value
    }

    /// The constant's shape.
    pub fn shape(&self) -> Shape {
        self.shape
    }
}

/// A vendor attribute value attached to a signal or instance.
#[derive(Clone, PartialEq, Eq, Debug, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AttrValue {
    /// An integer attribute.
    Int(i64),
    /// A boolean attribute.
    Bool(bool),
    /// A string attribute.
    Str(String),
    /// A nested attribute map, used for grouped constraints.
    Nested(BTreeMap<String, AttrValue>),
}

impl From<i64> for AttrValue {
    fn from(v: i64) -> Self {
        AttrValue::Int(v)
    }
}

impl From<bool> for AttrValue {
    fn from(v: bool) -> Self {
        AttrValue::Bool(v)
    }
}

impl From<&str> for AttrValue {
    fn from(v: &str) -> Self {
        AttrValue::Str(v.to_string())
    }
}

impl From<String> for AttrValue {
    fn from(v: String) -> Self {
        AttrValue::Str(v)
    }
}

impl From<BTreeMap<String, AttrValue>> for AttrValue {
    fn from(v: BTreeMap<String, AttrValue>) -> Self {
        AttrValue::Nested(v)
    }
}

/// Renders a signal's integer value for waveform viewers.
pub type Decoder = Rc<dyn Fn(&BigInt) -> String>;

/// A named storage element.
#[derive(Clone)]
pub struct Signal {
    /// The signal's name.
    pub name: Ident,
    /// Value after reset, as given at construction.
    pub reset: BigInt,
    /// Whether the signal keeps its value when its domain is reset.
    pub reset_less: bool,
    /// Vendor attributes, including placement constraints.
    pub attrs: BTreeMap<String, AttrValue>,
    /// Optional display function for values of this signal.
    pub decoder: Option<Decoder>,
}

impl Signal {
    /// Renders `value` through the decoder, or in decimal if there is none.
    pub fn decode(&self, value: &BigInt) -> String {
        match &self.decoder {
            Some(decoder) => decoder(value),
            None => value.to_string(),
        }
    }
}

impl fmt::Debug for Signal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Signal")
            .field("name", &self.name)
            .field("reset", &self.reset)
            .field("reset_less", &self.reset_less)
            .field("attrs", &self.attrs)
            .field("decoder", &self.decoder.is_some())
            .finish()
    }
}

/// A deferred computation producing a value node.
///
/// Implemented for any `FnOnce(&mut ValueDb) -> Result<ValueId>` closure.
pub trait Lowerable {
    /// Builds the node this user value stands for.
    fn lower(self: Box<Self>, db: &mut ValueDb) -> Result<ValueId>;
}

impl<F> Lowerable for F
where
    F: FnOnce(&mut ValueDb) -> Result<ValueId>,
{
    fn lower(self: Box<Self>, db: &mut ValueDb) -> Result<ValueId> {
        (*self)(db)
    }
}

/// Lowering progress of a [`UserValue`].
pub(crate) enum LoweringState {
    Pending(Box<dyn Lowerable>),
    InProgress,
    Done(ValueId),
    Failed,
}

/// A value whose node is computed on first use and then memoized.
pub struct UserValue {
    pub(crate) state: LoweringState,
}

impl UserValue {
    /// The memoized lowering, if it has happened.
    pub fn lowered(&self) -> Option<ValueId> {
        match self.state {
            LoweringState::Done(id) => Some(id),
            _ => None,
        }
    }
}

impl fmt::Debug for UserValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UserValue")
            .field("lowered", &self.lowered())
            .finish()
    }
}

/// A hardware expression node.
#[derive(Debug)]
pub enum Value {
    /// A constant.
    Const(Const),
    /// A named signal.
    Signal(Signal),
    /// The clock of a domain.
    ClockSignal {
        /// Domain name.
        domain: Ident,
    },
    /// The reset of a domain.
    ResetSignal {
        /// Domain name.
        domain: Ident,
        /// Whether a domain without a reset yields constant zero instead of an error.
        allow_reset_less: bool,
    },
    /// A unary or binary operator.
    Operator(Operator),
    /// A static bit range `start..end`.
    Slice {
        /// The sliced value.
        value: ValueId,
        /// First bit, inclusive.
        start: u32,
        /// Last bit, exclusive.
        end: u32,
    },
    /// A dynamically addressed window of `width` bits starting at `offset * stride`.
    Part {
        /// The addressed value.
        value: ValueId,
        /// The dynamic offset.
        offset: ValueId,
        /// Result width.
        width: u32,
        /// Distance in bits between consecutive offsets.
        stride: u32,
    },
    /// Concatenation, least significant part first.
    Cat(Vec<ValueId>),
    /// Replication of a value `count` times.
    Repl {
        /// The replicated value.
        value: ValueId,
        /// Number of copies.
        count: u32,
    },
    /// Element of a frozen array selected by a dynamic index.
    ArrayProxy {
        /// The frozen array.
        array: ArrayId,
        /// The index expression.
        index: ValueId,
    },
    /// Two-way multiplexer on a 1-bit selector.
    Mux {
        /// The selector.
        sel: ValueId,
        /// Chosen when the selector is 1.
        then: ValueId,
        /// Chosen when the selector is 0.
        otherwise: ValueId,
    },
    /// The value of a signal `clocks` cycles in the past. Simulation only.
    Sample {
        /// The sampled signal or constant.
        value: ValueId,
        /// Number of cycles back.
        clocks: u32,
        /// Sampling domain; `None` means the default domain.
        domain: Option<Ident>,
    },
    /// `1` on the first simulated step. Simulation only.
    Initial,
    /// A lazily lowered user value.
    User(UserValue),
}

impl Value {
    /// Short name of the node kind.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Value::Const(_) => "Const",
            Value::Signal(_) => "Signal",
            Value::ClockSignal { .. } => "ClockSignal",
            Value::ResetSignal { .. } => "ResetSignal",
            Value::Operator(_) => "Operator",
            Value::Slice { .. } => "Slice",
            Value::Part { .. } => "Part",
            Value::Cat(_) => "Cat",
            Value::Repl { .. } => "Repl",
            Value::ArrayProxy { .. } => "ArrayProxy",
            Value::Mux { .. } => "Mux",
            Value::Sample { .. } => "Sample",
            Value::Initial => "Initial",
            Value::User(_) => "UserValue",
        }
    }

    /// Direct value operands of this node. Array elements are not included.
    pub fn children(&self) -> Vec<ValueId> {
        match self {
            Value::Const(_)
            | Value::Signal(_)
            | Value::ClockSignal { .. }
            | Value::ResetSignal { .. }
            | Value::Initial => Vec::new(),
            Value::Operator(op) => op.operands(),
            Value::Slice { value, .. } | Value::Repl { value, .. } | Value::Sample { value, .. } => {
                vec![*value]
            }
            Value::Part { value, offset, .. } => vec![*value, *offset],
            Value::Cat(parts) => parts.clone(),
            Value::ArrayProxy { index, .. } => vec![*index],
            Value::Mux {
                sel,
                then,
                otherwise,
            } => vec![*sel, *then, *otherwise],
            Value::User(user) => user.lowered().into_iter().collect(),
        }
    }
}

/// A node together with its inferred shape and creation site.
#[derive(Debug)]
pub struct Node {
    /// The expression.
    pub value: Value,
    /// Where the node was built.
    pub loc: SrcLoc,
    pub(crate) shape: Option<Shape>,
}

/// Anything accepted where a value operand is expected.
///
/// Integers become minimal-width constants, booleans become 1-bit
/// constants, and enumeration members become constants of their
/// enumeration's shape.
#[derive(Clone, Debug, PartialEq)]
pub enum Operand {
    /// An existing node.
    Value(ValueId),
    /// An integer literal.
    Int(BigInt),
    /// A boolean literal.
    Bool(bool),
    /// An enumeration member.
    Enum(EnumValue),
}

impl From<ValueId> for Operand {
    fn from(id: ValueId) -> Self {
        Operand::Value(id)
    }
}

impl From<&ValueId> for Operand {
    fn from(id: &ValueId) -> Self {
        Operand::Value(*id)
    }
}

impl From<BigInt> for Operand {
    fn from(n: BigInt) -> Self {
        Operand::Int(n)
    }
}

impl From<bool> for Operand {
    fn from(b: bool) -> Self {
        Operand::Bool(b)
    }
}

impl From<EnumValue> for Operand {
    fn from(e: EnumValue) -> Self {
        Operand::Enum(e)
    }
}

macro_rules! operand_from_int {
    ($($ty:ty),*) => {
        $(
            impl From<$ty> for Operand {
                fn from(n: $ty) -> Self {
                    Operand::Int(BigInt::from(n))
                }
            }
        )*
    };
}

operand_from_int!(i32, i64, u32, u64, usize);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn const_minimal_shapes() {
        assert_eq!(Const::from_int(0).shape(), Shape::unsigned(1));
        assert_eq!(Const::from_int(10).shape(), Shape::unsigned(4));
        assert_eq!(Const::from_int(-10).shape(), Shape::signed(5));
    }

    #[test]
    fn const_normalizes_value() {
        let c = Const::new(0b10110, Shape::signed(5));
        assert_eq!(*c.value(), BigInt::from(-10));
        let c = Const::new(-1, 4u32);
        assert_eq!(*c.value(), BigInt::from(15));
    }

    #[test]
    fn const_equality_is_structural() {
        assert_eq!(Const::new(3, 4u32), Const::new(3, 4u32));
        assert_ne!(Const::new(3, 4u32), Const::new(3, Shape::signed(4)));
    }

    #[test]
    fn symbols() {
        assert_eq!(UnaryOp::Any.symbol(), "r|");
        assert_eq!(BinaryOp::Shl.symbol(), "<<");
    }

    #[test]
    fn operand_conversions() {
        assert_eq!(Operand::from(5i64), Operand::Int(BigInt::from(5)));
        assert_eq!(Operand::from(true), Operand::Bool(true));
        let id = ValueId::from_raw(3);
        assert_eq!(Operand::from(id), Operand::Value(id));
    }

    #[test]
    fn signal_decode_default() {
        let s = Signal {
            name: Ident::from_raw(0),
            reset: BigInt::from(0),
            reset_less: false,
            attrs: BTreeMap::new(),
            decoder: None,
        };
        assert_eq!(s.decode(&BigInt::from(7)), "7");
    }

    #[test]
    fn attr_value_serde_untagged() {
        let mut nested = BTreeMap::new();
        nested.insert("IOSTANDARD".to_string(), AttrValue::from("LVCMOS33"));
        let attr = AttrValue::Nested(nested);
        let json = serde_json::to_string(&attr).unwrap();
        assert_eq!(json, r#"{"IOSTANDARD":"LVCMOS33"}"#);
        let back: AttrValue = serde_json::from_str(&json).unwrap();
        assert_eq!(attr, back);
    }
}
