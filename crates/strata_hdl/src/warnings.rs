//! Constructors for the construction warnings.
//!
//! Each flags a construct that is legal but almost certainly not what the
//! author meant. They are emitted into the [`ValueDb`](crate::db::ValueDb)
//! sink and never abort construction.

use strata_common::SrcLoc;
use strata_diagnostics::{Diagnostic, DiagnosticCode};

/// W301: the reset value needs more bits than the signal has.
pub fn warn_reset_too_wide(reset: &str, needed: u32, width: u32, loc: SrcLoc) -> Diagnostic {
    Diagnostic::new(
        DiagnosticCode::ResetTooWide,
        format!(
            "Reset value {reset} requires {needed} bits to represent, but the signal only has {width} bits"
        ),
        loc,
    )
    .with_note("the reset value is stored as given; only its low bits are representable")
}

/// W302: `pattern` is the binary rendering of an integer match pattern.
pub fn warn_pattern_never_true(pattern: &str, width: u32, loc: SrcLoc) -> Diagnostic {
    Diagnostic::new(
        DiagnosticCode::PatternNeverTrue,
        format!(
            "Match pattern '{pattern}' is wider than match value (which has width {width}); comparison will never be true"
        ),
        loc,
    )
}

/// W303: the shift amount `repr` is signed.
pub fn warn_signed_shift_amount(repr: &str, loc: SrcLoc) -> Diagnostic {
    Diagnostic::new(DiagnosticCode::SignedShiftAmount, format!("Shift amount {repr} is signed"), loc)
        .with_help("a negative amount shifts in the opposite direction; widths account for both")
}
