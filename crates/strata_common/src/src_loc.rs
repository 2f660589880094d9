//! Source locations of the host program that built a design object.
//!
//! Values, signals, and frozen arrays remember where they were created so
//! that diagnostics can point back at user code. Locations are captured with
//! `#[track_caller]` rather than from any source file the library reads.

use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::fmt;
use std::panic::Location;

/// A `file:line:column` position in the host program.
#[derive(Clone, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
pub struct SrcLoc {
    /// Path of the source file as reported by the compiler.
    pub file: Cow<'static, str>,
    /// 1-based line number.
    pub line: u32,
    /// 1-based column number.
    pub column: u32,
}

impl SrcLoc {
    /// Placeholder for objects not created from user code.
    pub const UNKNOWN: SrcLoc = SrcLoc {
        file: Cow::Borrowed("<unknown>"),
        line: 0,
        column: 0,
    };

    /// Creates a location from its parts.
    pub fn new(file: impl Into<Cow<'static, str>>, line: u32, column: u32) -> Self {
        Self {
            file: file.into(),
            line,
            column,
        }
    }

    /// Captures the location of the outermost `#[track_caller]` frame.
    #[track_caller]
    pub fn caller() -> Self {
        Self::from(Location::caller())
    }

    /// Returns `true` for [`SrcLoc::UNKNOWN`].
    pub fn is_unknown(&self) -> bool {
        self.line == 0
    }
}

impl From<&'static Location<'static>> for SrcLoc {
    fn from(loc: &'static Location<'static>) -> Self {
        Self::new(loc.file(), loc.line(), loc.column())
    }
}

impl Default for SrcLoc {
    fn default() -> Self {
        Self::UNKNOWN
    }
}

impl fmt::Display for SrcLoc {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.file, self.line, self.column)
    }
}
