//! Shared foundational types used across the Strata HDL workspace.
//!
//! This crate provides bit-vector [`Shape`]s and the integer width helpers
//! every value is built from, interned identifiers, call-site locations,
//! content hashing, and frequency values.

#![warn(missing_docs)]

pub mod frequency;
pub mod hash;
pub mod ident;
pub mod shape;
pub mod src_loc;

pub use frequency::{Frequency, ParseFrequencyError};
pub use hash::ContentHash;
pub use ident::{Ident, Interner};
pub use num_bigint::BigInt;
pub use shape::{bits_for, Shape};
pub use src_loc::SrcLoc;
