//! Structured warning messages.

use crate::code::DiagnosticCode;
use serde::{Deserialize, Serialize};
use strata_common::SrcLoc;

/// A warning tied to the host-program location that caused it.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Diagnostic {
    /// What the warning is about.
    pub code: DiagnosticCode,
    /// The main message, naming the offending value.
    pub message: String,
    /// Where in the host program the offending object was built.
    pub loc: SrcLoc,
    /// Explanatory footnotes.
    pub notes: Vec<String>,
    /// Actionable suggestions.
    pub help: Vec<String>,
}

impl Diagnostic {
    /// Creates a diagnostic with no notes.
    pub fn new(code: DiagnosticCode, message: impl Into<String>, loc: SrcLoc) -> Self {
        Self {
            code,
            message: message.into(),
            loc,
            notes: Vec::new(),
            help: Vec::new(),
        }
    }

    /// Adds a note.
    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.notes.push(note.into());
        self
    }

    /// Adds a suggestion.
    pub fn with_help(mut self, help: impl Into<String>) -> Self {
        self.help.push(help.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn notes_and_help_accumulate() {
        let diag = Diagnostic::new(DiagnosticCode::SignedShiftAmount, "signed", SrcLoc::new("a.rs", 1, 1))
            .with_note("first")
            .with_help("second");
        assert_eq!(diag.code.to_string(), "W303");
        assert_eq!(diag.notes, vec!["first".to_string()]);
        assert_eq!(diag.help, vec!["second".to_string()]);
    }

    #[test]
    fn serde_roundtrip() {
        let diag = Diagnostic::new(DiagnosticCode::PatternNeverTrue, "never true", SrcLoc::new("m.rs", 4, 2));
        let json = serde_json::to_string(&diag).unwrap();
        let back: Diagnostic = serde_json::from_str(&json).unwrap();
        assert_eq!(diag, back);
    }
}
