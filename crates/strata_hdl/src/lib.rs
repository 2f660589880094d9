//! The Strata hardware description core.
//!
//! Designs are built as Rust objects implementing [`Elaboratable`]. Values
//! (signals, constants, operators, slices, array proxies) live in a
//! [`ValueDb`] arena and are referred to by [`ValueId`]; every value has a
//! [`Shape`] inferred from its operands. Statements assign values to
//! signals inside clock domains, and elaboration turns the object tree into
//! a [`Fragment`] hierarchy that [`prepare`] readies for an emitter.

#![warn(missing_docs)]

pub mod arena;
pub mod array;
pub mod db;
pub mod dsl;
pub mod elaborate;
pub mod enums;
pub mod errors;
pub mod fragment;
pub mod ids;
pub mod infer;
pub mod info;
pub mod instance;
pub mod ops;
pub mod pattern;
pub mod platform;
pub mod port;
pub mod prepare;
pub mod repr;
pub mod signal;
pub mod stmt;
pub mod value;
pub mod visit;
pub mod warnings;

pub use array::{ArrayState, Elem};
pub use db::ValueDb;
pub use dsl::Module;
pub use elaborate::{elaborate, Elaboratable, Elaborated, Elaborator};
pub use enums::{EnumValue, HdlEnum};
pub use errors::{ErrorKind, HdlError, Result};
pub use fragment::{Domain, Fragment, COMB_DOMAIN, DEFAULT_DOMAIN};
pub use ids::{ArrayId, ValueId};
pub use info::fragment_info;
pub use instance::{Instance, ParamValue, PortBinding};
pub use pattern::Pattern;
pub use platform::{DdrInputPins, DdrOutputPins, DiffInputPins, DiffOutputPins, Platform, TristatePins};
pub use port::PortDirection;
pub use prepare::{prepare, DomainSignals, PreparedFragment};
pub use signal::SignalBuilder;
pub use stmt::{Statement, SwitchCase};
pub use strata_common::{BigInt, Shape, SrcLoc};
pub use value::{AttrValue, BinaryOp, Lowerable, Operand, UnaryOp, UserValue, Value};
