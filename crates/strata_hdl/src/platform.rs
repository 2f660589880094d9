//! The platform seam: target-specific lowering of I/O primitives.
//!
//! Design objects receive an optional [`Platform`] during elaboration.
//! Library primitives ask it for a target-specific implementation and fall
//! back to a generic one, or fail, when the platform has none.

use crate::db::ValueDb;
use crate::errors::{HdlError, Result};
use crate::fragment::Fragment;
use crate::ids::ValueId;

/// Signals of a tri-state buffer: `io` is driven from `o` while `oe` is set
/// and is always readable on `i`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TristatePins {
    /// Value driven onto the pad.
    pub o: ValueId,
    /// Output enable, one bit.
    pub oe: ValueId,
    /// Value read back from the pad.
    pub i: ValueId,
    /// The pad.
    pub io: ValueId,
}

/// Signals of a differential input buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DiffInputPins {
    /// Positive pad.
    pub i_p: ValueId,
    /// Negative pad.
    pub i_n: ValueId,
    /// Received value.
    pub o: ValueId,
}

/// Signals of a differential output buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DiffOutputPins {
    /// Value to transmit.
    pub i: ValueId,
    /// Positive pad.
    pub o_p: ValueId,
    /// Negative pad.
    pub o_n: ValueId,
}

/// Signals of a double data rate input register.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DdrInputPins {
    /// The pad.
    pub i: ValueId,
    /// Value captured on the rising edge.
    pub o1: ValueId,
    /// Value captured on the falling edge.
    pub o2: ValueId,
    /// Clock domain of the register.
    pub domain: String,
}

/// Signals of a double data rate output register.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DdrOutputPins {
    /// Value emitted on the rising edge.
    pub i1: ValueId,
    /// Value emitted on the falling edge.
    pub i2: ValueId,
    /// The pad.
    pub o: ValueId,
    /// Clock domain of the register.
    pub domain: String,
}

/// A build target able to lower I/O primitives.
///
/// Every hook has a default: tri-states fall back to a generic buffer and
/// the other primitives report [`HdlError::Unsupported`].
pub trait Platform {
    /// Platform name, lower case.
    fn name(&self) -> &str;

    /// A target-specific tri-state buffer, or `None` to use the generic one.
    fn get_tristate(&self, _db: &mut ValueDb, _pins: &TristatePins) -> Option<Result<Fragment>> {
        None
    }

    /// A differential input buffer.
    fn get_differential_input(&self, _db: &mut ValueDb, _pins: &DiffInputPins) -> Result<Fragment> {
        Err(self.unsupported("DifferentialInput"))
    }

    /// A differential output buffer.
    fn get_differential_output(&self, _db: &mut ValueDb, _pins: &DiffOutputPins) -> Result<Fragment> {
        Err(self.unsupported("DifferentialOutput"))
    }

    /// A double data rate input register.
    fn get_ddr_input(&self, _db: &mut ValueDb, _pins: &DdrInputPins) -> Result<Fragment> {
        Err(self.unsupported("DDRInput"))
    }

    /// A double data rate output register.
    fn get_ddr_output(&self, _db: &mut ValueDb, _pins: &DdrOutputPins) -> Result<Fragment> {
        Err(self.unsupported("DDROutput"))
    }

    /// The error reported for a primitive this platform cannot build.
    fn unsupported(&self, primitive: &'static str) -> HdlError {
        HdlError::Unsupported {
            primitive,
            platform: self.name().to_string(),
        }
    }
}
