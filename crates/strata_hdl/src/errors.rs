//! Errors raised while building values, arrays, and fragments.
//!
//! Every check runs eagerly when a node is constructed; a returned error
//! means the node was not created. [`HdlError::kind`] groups the variants
//! into the broad classes callers usually dispatch on.

use serde::{Deserialize, Serialize};
use strata_common::SrcLoc;

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, HdlError>;

/// The broad class of an [`HdlError`].
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
pub enum ErrorKind {
    /// An operand has an invalid shape or an incompatible kind.
    Type,
    /// A static index, slice bound, or count falls outside its operand.
    Range,
    /// An array was mutated after a dynamic read froze it.
    Frozen,
    /// A clock or reset was requested for the combinational domain.
    Domain,
    /// The design hierarchy could not be elaborated.
    Elaboration,
}

/// Errors produced by value construction and elaboration.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum HdlError {
    /// A single-bit index outside `-width..width`.
    #[error("Cannot index {index} bits into {width}-bit value")]
    IndexOutOfRange {
        /// The requested bit index.
        index: i64,
        /// Width of the indexed value.
        width: u32,
    },

    /// A slice start bound outside `-width..=width`.
    #[error("Cannot start slice {start} bits into {width}-bit value")]
    SliceStartOutOfRange {
        /// The requested start bound.
        start: i64,
        /// Width of the sliced value.
        width: u32,
    },

    /// A slice end bound outside `-width..=width`.
    #[error("Cannot end slice {end} bits into {width}-bit value")]
    SliceEndOutOfRange {
        /// The requested end bound.
        end: i64,
        /// Width of the sliced value.
        width: u32,
    },

    /// A slice whose resolved start lies after its end.
    #[error("Slice start {start} must be less than slice end {end}")]
    SliceReversed {
        /// Resolved start bound.
        start: u32,
        /// Resolved end bound.
        end: u32,
    },

    /// A slice step of zero.
    #[error("Slice step cannot be zero")]
    ZeroSliceStep,

    /// A part select whose stride would be zero.
    #[error("Part stride must be a positive integer, not {stride}")]
    InvalidStride {
        /// The rejected stride.
        stride: u32,
    },

    /// A computed width does not fit in 32 bits.
    #[error("Width of {what} exceeds the largest representable width")]
    WidthOverflow {
        /// Description of the construct whose width overflowed.
        what: String,
    },

    /// A match pattern whose length differs from the matched value.
    #[error("Match pattern '{pattern}' must have the same width as match value (which is {width})")]
    PatternWidth {
        /// The offending pattern, whitespace removed.
        pattern: String,
        /// Width of the matched value.
        width: u32,
    },

    /// A match pattern containing characters other than `0`, `1`, and `-`.
    #[error("Match pattern '{pattern}' must consist of 0, 1, and - (don't care) bits")]
    PatternBits {
        /// The offending pattern.
        pattern: String,
    },

    /// The left-hand side of an assignment is not assignable.
    #[error("Value {repr} cannot be used in assignments")]
    NotAssignable {
        /// Printed form of the rejected value.
        repr: String,
    },

    /// A value that is neither a signal nor a constant was sampled.
    #[error("Sampled value must be a signal or a constant, not {repr}")]
    NotSampleable {
        /// Printed form of the rejected value.
        repr: String,
    },

    /// A sample with a negative cycle count.
    #[error("Cannot sample a value {clocks} cycles in the future")]
    SampleFuture {
        /// How many cycles into the future the sample reached.
        clocks: i64,
    },

    /// A port request naming something other than a signal.
    #[error("Only signals may be added as ports, not {repr}")]
    NotAPort {
        /// Printed form of the rejected value.
        repr: String,
    },

    /// An array element that cannot be viewed as a value.
    #[error("Array element {repr} is not a value")]
    NotAValue {
        /// Printed form of the element.
        repr: String,
    },

    /// An array proxy element indexed with a value although it is not an array.
    #[error("Cannot index {repr} with a value; only arrays support dynamic indexing")]
    NotIndexable {
        /// Printed form of the element.
        repr: String,
    },

    /// A record field missing from at least one array element.
    #[error("Array element {repr} has no field '{field}'")]
    UnknownField {
        /// Printed form of the element lacking the field.
        repr: String,
        /// The requested field name.
        field: String,
    },

    /// A static array index outside its length.
    #[error("Array index {index} is out of range for an array of length {len}")]
    ArrayIndexOutOfRange {
        /// The requested index.
        index: i64,
        /// Current length of the array.
        len: usize,
    },

    /// An array was mutated after a dynamic read froze it.
    #[error("Array can no longer be mutated after it was indexed with a value at {at}")]
    Frozen {
        /// Where the freezing read happened.
        at: SrcLoc,
    },

    /// The combinational domain has no clock or reset.
    #[error("Domain 'comb' does not have a {signal}")]
    CombDomain {
        /// `"clock"` or `"reset"`.
        signal: &'static str,
    },

    /// A design object was reached again while it was still elaborating.
    #[error("Elaboration of {object} depends on itself")]
    ElaborationCycle {
        /// Description of the object that closed the cycle.
        object: String,
    },

    /// A user value whose lowering is re-entrant or already failed.
    #[error("User value could not be lowered; its lowering is recursive or failed earlier")]
    LoweringFailed,

    /// A platform lacks support for a library primitive.
    #[error("{primitive} not implemented by platform '{platform}'")]
    Unsupported {
        /// Name of the primitive, e.g. `"DifferentialInput"`.
        primitive: &'static str,
        /// Name of the platform.
        platform: String,
    },
}

impl HdlError {
    /// Returns the broad class of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            HdlError::IndexOutOfRange { .. }
            | HdlError::SliceStartOutOfRange { .. }
            | HdlError::SliceEndOutOfRange { .. }
            | HdlError::SliceReversed { .. }
            | HdlError::PatternWidth { .. }
            | HdlError::SampleFuture { .. }
            | HdlError::ArrayIndexOutOfRange { .. } => ErrorKind::Range,
            HdlError::ZeroSliceStep
            | HdlError::InvalidStride { .. }
            | HdlError::WidthOverflow { .. }
            | HdlError::PatternBits { .. }
            | HdlError::NotAssignable { .. }
            | HdlError::NotSampleable { .. }
            | HdlError::NotAPort { .. }
            | HdlError::NotAValue { .. }
            | HdlError::NotIndexable { .. }
            | HdlError::UnknownField { .. } => ErrorKind::Type,
            HdlError::Frozen { .. } => ErrorKind::Frozen,
            HdlError::CombDomain { .. } => ErrorKind::Domain,
            HdlError::ElaborationCycle { .. }
            | HdlError::LoweringFailed
            | HdlError::Unsupported { .. } => ErrorKind::Elaboration,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn index_message_states_index_and_width() {
        let err = HdlError::IndexOutOfRange { index: 5, width: 4 };
        assert_eq!(err.to_string(), "Cannot index 5 bits into 4-bit value");
        assert_eq!(err.kind(), ErrorKind::Range);
    }

    #[test]
    fn frozen_message_points_at_freeze() {
        let err = HdlError::Frozen {
            at: SrcLoc::new("top.rs", 7, 13),
        };
        assert_eq!(
            err.to_string(),
            "Array can no longer be mutated after it was indexed with a value at top.rs:7:13"
        );
        assert_eq!(err.kind(), ErrorKind::Frozen);
    }

    #[test]
    fn comb_domain_messages() {
        let clk = HdlError::CombDomain { signal: "clock" };
        let rst = HdlError::CombDomain { signal: "reset" };
        assert_eq!(clk.to_string(), "Domain 'comb' does not have a clock");
        assert_eq!(rst.to_string(), "Domain 'comb' does not have a reset");
        assert_eq!(clk.kind(), ErrorKind::Domain);
    }

    #[test]
    fn pattern_errors_are_classified() {
        let width = HdlError::PatternWidth {
            pattern: "--".into(),
            width: 4,
        };
        let bits = HdlError::PatternBits {
            pattern: "abc".into(),
        };
        assert_eq!(width.kind(), ErrorKind::Range);
        assert_eq!(bits.kind(), ErrorKind::Type);
        assert_eq!(
            width.to_string(),
            "Match pattern '--' must have the same width as match value (which is 4)"
        );
    }

    #[test]
    fn stride_message() {
        let err = HdlError::InvalidStride { stride: 0 };
        assert_eq!(err.to_string(), "Part stride must be a positive integer, not 0");
    }
}
