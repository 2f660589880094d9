//! Collector for the warnings of one design.

use crate::diagnostic::Diagnostic;
use std::cell::RefCell;

/// Collects warnings in emission order.
///
/// Emission only needs `&self`, so code holding a shared reference to the
/// owning database can still warn.
#[derive(Debug, Default)]
pub struct DiagnosticSink {
    diagnostics: RefCell<Vec<Diagnostic>>,
}

impl DiagnosticSink {
    /// Creates an empty sink.
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a warning.
    pub fn emit(&self, diag: Diagnostic) {
        self.diagnostics.borrow_mut().push(diag);
    }

    /// Takes all recorded warnings, leaving the sink empty.
    pub fn take_all(&self) -> Vec<Diagnostic> {
        self.diagnostics.take()
    }

    /// A snapshot of the recorded warnings.
    pub fn diagnostics(&self) -> Vec<Diagnostic> {
        self.diagnostics.borrow().clone()
    }
}
