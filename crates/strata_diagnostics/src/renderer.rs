//! Human-readable rendering of warnings.

use crate::diagnostic::Diagnostic;

/// Formats a diagnostic for some output target.
pub trait DiagnosticRenderer {
    /// Renders a single diagnostic into a formatted string.
    fn render(&self, diag: &Diagnostic) -> String;
}

/// Renders warnings in a rustc-style terminal format:
///
/// ```text
/// warning[W302]: Match pattern '10110' is wider than match value ...
///   --> src/top.rs:10:5
///    = note: ...
/// ```
pub struct TerminalRenderer {
    /// Whether to color the header yellow.
    pub color: bool,
}

impl TerminalRenderer {
    /// Creates a new terminal renderer.
    pub fn new(color: bool) -> Self {
        Self { color }
    }
}

impl DiagnosticRenderer for TerminalRenderer {
    fn render(&self, diag: &Diagnostic) -> String {
        let head = format!("warning[{}]", diag.code);
        let mut out = if self.color {
            format!("\x1b[1;33m{head}\x1b[0m: {}\n", diag.message)
        } else {
            format!("{head}: {}\n", diag.message)
        };
        if !diag.loc.is_unknown() {
            out.push_str(&format!("  --> {}\n", diag.loc));
        }
        for note in &diag.notes {
            out.push_str(&format!("   = note: {note}\n"));
        }
        for help in &diag.help {
            out.push_str(&format!("   = help: {help}\n"));
        }
        out
    }
}
