//! Warnings raised while building a design.
//!
//! Construction-time problems that must not abort the design (a reset value
//! wider than its signal, a match pattern that can never be true, a signed
//! shift amount) are reported as [`Diagnostic`]s into a [`DiagnosticSink`]
//! owned by the value database. [`TerminalRenderer`] formats them for humans.

#![warn(missing_docs)]

pub mod code;
pub mod diagnostic;
pub mod renderer;
pub mod sink;

pub use code::DiagnosticCode;
pub use diagnostic::Diagnostic;
pub use renderer::{DiagnosticRenderer, TerminalRenderer};
pub use sink::DiagnosticSink;
