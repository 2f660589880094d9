//! Reusable building blocks for Strata designs.
//!
//! The [`io`] module provides tri-state, differential, and double data rate
//! I/O primitives. Each one delegates to the target [`Platform`] and only
//! the tri-state buffer has a generic implementation.
//!
//! [`Platform`]: strata_hdl::Platform

#![warn(missing_docs)]

pub mod io;

pub use io::{DdrInput, DdrOutput, DifferentialInput, DifferentialOutput, Tristate, TsTriple, TsTripleBuilder};
