//! Platform description types deserialized from TOML.

use crate::constraint::{Constraint, ConnectorPins};
use serde::Deserialize;
use std::collections::BTreeMap;

/// The top-level platform description.
///
/// ```toml
/// name = "Arty_A7"
/// family = "xilinx7"
///
/// [[resources]]
/// name = "led"
/// number = 0
/// pins = "H5"
/// io_standard = "LVCMOS33"
///
/// [connectors]
/// pmod_a = ["G13 B11 A11 D12", "D13 B18 A18 K16"]
///
/// [[clocks]]
/// resource = "clk100"
/// frequency = "100MHz"
/// ```
#[derive(Debug, Deserialize)]
pub struct PlatformConfig {
    /// Board name; stored lower-cased.
    pub name: String,
    /// Device family selecting vendor primitives (e.g. `"xilinx7"`).
    #[serde(default)]
    pub family: Option<String>,
    /// Full part number.
    #[serde(default)]
    pub device: Option<String>,
    /// Requestable I/O resources.
    #[serde(default)]
    pub resources: Vec<ResourceDef>,
    /// Expansion connectors by name.
    #[serde(default)]
    pub connectors: BTreeMap<String, ConnectorPins>,
    /// Clock constraints on resources.
    #[serde(default)]
    pub clocks: Vec<ClockDef>,
}

/// One I/O resource: either pins of its own or a set of subsignals.
#[derive(Debug, Deserialize)]
pub struct ResourceDef {
    /// Resource name, e.g. `"led"`.
    pub name: String,
    /// Resource number distinguishing resources of the same name.
    #[serde(default)]
    pub number: u32,
    /// Constraints of the resource itself; inherited by its subsignals.
    #[serde(flatten)]
    pub constraints: ConstraintDef,
    /// Named subsignals.
    #[serde(default)]
    pub subsignals: BTreeMap<String, ConstraintDef>,
}

/// The constraint fields shared by resources and subsignals.
#[derive(Debug, Default, Deserialize)]
pub struct ConstraintDef {
    /// Whitespace-separated pins; `connector:key` refers to a connector pin.
    #[serde(default)]
    pub pins: Option<String>,
    /// I/O standard.
    #[serde(default)]
    pub io_standard: Option<String>,
    /// Drive strength.
    #[serde(default)]
    pub drive: Option<String>,
    /// Other vendor constraints, `KEY=VALUE` or a bare flag.
    #[serde(default)]
    pub misc: Vec<String>,
}

impl ConstraintDef {
    /// The constraints these fields describe.
    pub fn to_constraints(&self) -> Vec<Constraint> {
        let mut out = Vec::new();
        if let Some(pins) = &self.pins {
            out.push(Constraint::pins(pins));
        }
        if let Some(standard) = &self.io_standard {
            out.push(Constraint::io_standard(standard.as_str()));
        }
        if let Some(drive) = &self.drive {
            out.push(Constraint::drive(drive));
        }
        out.extend(self.misc.iter().map(|m| Constraint::misc(m)));
        out
    }
}

/// A clock frequency constraint on a resource.
#[derive(Debug, Deserialize)]
pub struct ClockDef {
    /// Name of the constrained resource.
    pub resource: String,
    /// Number of the constrained resource.
    #[serde(default)]
    pub number: u32,
    /// Frequency such as `"100MHz"`, parsed to [`Frequency`](strata_common::Frequency).
    pub frequency: String,
}
