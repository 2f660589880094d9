//! Codes of the construction warnings.

use serde::{Deserialize, Serialize};
use std::fmt;

/// What a diagnostic warns about. Displayed as its `W3xx` number.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
pub enum DiagnosticCode {
    /// `W301`: a reset value needs more bits than its signal has.
    ResetTooWide,
    /// `W302`: an integer match pattern is wider than the matched value.
    PatternNeverTrue,
    /// `W303`: a shift amount operand is signed.
    SignedShiftAmount,
}

impl DiagnosticCode {
    /// The numeric part of the code.
    pub const fn number(self) -> u16 {
        match self {
            DiagnosticCode::ResetTooWide => 301,
            DiagnosticCode::PatternNeverTrue => 302,
            DiagnosticCode::SignedShiftAmount => 303,
        }
    }
}

impl fmt::Display for DiagnosticCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "W{}", self.number())
    }
}
