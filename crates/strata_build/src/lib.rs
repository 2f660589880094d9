//! Platform descriptions for Strata designs.
//!
//! This crate loads a board description from TOML into a [`BoardPlatform`]:
//! its I/O resources with their pin constraints, expansion connectors, and
//! clock constraints. Requesting a resource creates the port signals a
//! design drives, and the platform lowers I/O primitives for its family.

#![warn(missing_docs)]

pub mod constraint;
pub mod error;
pub mod loader;
pub mod platform;
pub mod types;

pub use constraint::{Connector, ConnectorPins, Constraint, PinKey, Pins, Subsignal};
pub use error::BuildError;
pub use loader::{load_platform, load_platform_from_str};
pub use platform::{BoardPlatform, ClockConstraint, RequestedIo, Resource, XILINX7};
pub use types::{ClockDef, ConstraintDef, PlatformConfig, ResourceDef};
