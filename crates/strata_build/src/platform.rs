//! Boards described by their resources, connectors, and clocks.
//!
//! A [`BoardPlatform`] hands out port signals for its resources through
//! [`BoardPlatform::request`] and implements the [`Platform`] hooks with
//! vendor primitives for the device families it knows.

use crate::constraint::{Connector, Constraint, PinKey, Pins, Subsignal};
use crate::error::BuildError;
use std::collections::{BTreeMap, BTreeSet};
use strata_common::Frequency;
use strata_hdl::{
    AttrValue, DdrInputPins, DdrOutputPins, DiffInputPins, DiffOutputPins, Fragment, Platform,
    TristatePins, ValueDb, ValueId,
};

/// Family name selecting Xilinx 7-series primitives.
pub const XILINX7: &str = "xilinx7";

/// A requestable I/O resource.
#[derive(Debug, Clone)]
pub struct Resource {
    /// Resource name.
    pub name: String,
    /// Resource number.
    pub number: u32,
    /// Constraints of the resource itself.
    pub constraints: Vec<Constraint>,
    /// Subsignals, each inheriting the resource constraints other than pins.
    pub subsignals: Vec<Subsignal>,
}

impl Resource {
    /// The pins of the resource itself, if any.
    pub fn pins(&self) -> Option<&Pins> {
        self.constraints.iter().find_map(|c| match c {
            Constraint::Pins(pins) => Some(pins),
            _ => None,
        })
    }
}

/// A clock frequency attached to a resource.
#[derive(Debug, Clone, PartialEq)]
pub struct ClockConstraint {
    /// Name of the constrained resource.
    pub resource: String,
    /// Number of the constrained resource.
    pub number: u32,
    /// Clock frequency.
    pub frequency: Frequency,
}

/// The signals created for a requested resource.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RequestedIo {
    /// A resource with pins of its own.
    Single(ValueId),
    /// A resource made of subsignals, by subsignal name.
    Group(BTreeMap<String, ValueId>),
}

impl RequestedIo {
    /// The signal of a single-pin-list resource.
    pub fn single(&self) -> Option<ValueId> {
        match self {
            RequestedIo::Single(id) => Some(*id),
            RequestedIo::Group(_) => None,
        }
    }

    /// The signal of subsignal `name`.
    pub fn field(&self, name: &str) -> Option<ValueId> {
        match self {
            RequestedIo::Single(_) => None,
            RequestedIo::Group(fields) => fields.get(name).copied(),
        }
    }
}

/// A development board.
#[derive(Debug, Clone, Default)]
pub struct BoardPlatform {
    name: String,
    family: Option<String>,
    device: Option<String>,
    resources: Vec<Resource>,
    connectors: BTreeMap<String, Connector>,
    clocks: Vec<ClockConstraint>,
    requested: BTreeSet<(String, u32)>,
}

impl BoardPlatform {
    /// Creates an empty board; the name is stored lower-cased.
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_lowercase(),
            ..Self::default()
        }
    }

    /// Sets the device family.
    pub fn with_family(mut self, family: impl Into<String>) -> Self {
        self.family = Some(family.into().to_lowercase());
        self
    }

    /// Sets the part number.
    pub fn with_device(mut self, device: impl Into<String>) -> Self {
        self.device = Some(device.into());
        self
    }

    /// The device family, if known.
    pub fn family(&self) -> Option<&str> {
        self.family.as_deref()
    }

    /// The part number, if known.
    pub fn device(&self) -> Option<&str> {
        self.device.as_deref()
    }

    /// Adds a resource.
    pub fn add_resource(&mut self, resource: Resource) {
        self.resources.push(resource);
    }

    /// Adds a connector.
    pub fn add_connector(&mut self, connector: Connector) {
        self.connectors.insert(connector.name.clone(), connector);
    }

    /// Adds a clock constraint.
    pub fn add_clock(&mut self, clock: ClockConstraint) {
        self.clocks.push(clock);
    }

    /// All resources in declaration order.
    pub fn resources(&self) -> &[Resource] {
        &self.resources
    }

    /// The resource `name#number`.
    pub fn resource(&self, name: &str, number: u32) -> Option<&Resource> {
        self.resources.iter().find(|r| r.name == name && r.number == number)
    }

    /// The connector called `name`.
    pub fn connector(&self, name: &str) -> Option<&Connector> {
        self.connectors.get(name)
    }

    /// All clock constraints.
    pub fn clocks(&self) -> &[ClockConstraint] {
        &self.clocks
    }

    /// The clock frequency of resource `name#number`, if constrained.
    pub fn clock_frequency(&self, name: &str, number: u32) -> Option<Frequency> {
        self.clocks
            .iter()
            .find(|c| c.resource == name && c.number == number)
            .map(|c| c.frequency)
    }

    /// Replaces `connector:key` identifiers with the connector's pins.
    pub fn resolve_pins(&self, pins: &Pins) -> Result<Pins, BuildError> {
        let mut out = Vec::with_capacity(pins.len());
        for ident in pins.identifiers() {
            match ident.split_once(':') {
                Some((conn, key)) => {
                    let resolved = self
                        .connectors
                        .get(conn)
                        .and_then(|c| c.pin(&PinKey::parse(key)))
                        .ok_or_else(|| BuildError::UnknownConnectorPin(ident.clone()))?;
                    out.extend(resolved.identifiers().iter().cloned());
                }
                None => out.push(ident.clone()),
            }
        }
        Ok(Pins::from_identifiers(out))
    }

    /// Creates the port signals of resource `name#number`.
    ///
    /// Each signal is as wide as its pin list and carries its constraints
    /// as attributes. A resource can be requested once.
    pub fn request(&mut self, db: &mut ValueDb, name: &str, number: u32) -> Result<RequestedIo, BuildError> {
        let resource = self
            .resource(name, number)
            .ok_or_else(|| BuildError::UnknownResource {
                name: name.to_string(),
                number,
            })?;
        if self.requested.contains(&(name.to_string(), number)) {
            return Err(BuildError::ResourceInUse {
                name: name.to_string(),
                number,
            });
        }
        let frequency = self.clock_frequency(name, number);
        let inherited: Vec<&Constraint> = resource
            .constraints
            .iter()
            .filter(|c| !matches!(c, Constraint::Pins(_)))
            .collect();

        let io = match resource.pins() {
            Some(pins) => {
                let signal = self.port_signal(db, &format!("{name}_{number}"), pins, &inherited, frequency)?;
                RequestedIo::Single(signal)
            }
            None => {
                let mut fields = BTreeMap::new();
                for sub in &resource.subsignals {
                    let pins = sub.pins().cloned().unwrap_or_default();
                    let mut constraints = inherited.clone();
                    constraints.extend(sub.constraints().iter().filter(|c| !matches!(c, Constraint::Pins(_))));
                    let signal_name = format!("{name}_{number}__{}", sub.name());
                    let signal = self.port_signal(db, &signal_name, &pins, &constraints, frequency)?;
                    fields.insert(sub.name().to_string(), signal);
                }
                RequestedIo::Group(fields)
            }
        };
        log::debug!("requested {name}#{number} on {}", self.name);
        self.requested.insert((name.to_string(), number));
        Ok(io)
    }

    fn port_signal(
        &self,
        db: &mut ValueDb,
        name: &str,
        pins: &Pins,
        constraints: &[&Constraint],
        frequency: Option<Frequency>,
    ) -> Result<ValueId, BuildError> {
        let pins = self.resolve_pins(pins)?;
        let width = u32::try_from(pins.len()).map_err(|_| BuildError::ValidationError(format!("{name} has too many pins")))?;
        let mut builder = db
            .signal(width)
            .name(name)
            .attr("PINS", pins.identifiers().join(" "));
        for constraint in constraints {
            builder = match constraint {
                Constraint::IOStandard(standard) => builder.attr("IOSTANDARD", standard.as_str()),
                Constraint::Drive(strength) => builder.attr("DRIVE", strength.as_str()),
                Constraint::Misc(text) => match text.split_once('=') {
                    Some((key, value)) => builder.attr(key.trim(), value.trim()),
                    None => builder.attr(text.as_str(), true),
                },
                Constraint::Pins(_) | Constraint::Subsignal(_) => builder,
            };
        }
        if let Some(frequency) = frequency {
            builder = builder.attr("FREQUENCY", AttrValue::Str(frequency.to_string()));
        }
        Ok(builder.build())
    }

    fn is_xilinx7(&self) -> bool {
        self.family.as_deref() == Some(XILINX7)
    }
}

impl Platform for BoardPlatform {
    fn name(&self) -> &str {
        &self.name
    }

    fn get_tristate(&self, db: &mut ValueDb, pins: &TristatePins) -> Option<strata_hdl::Result<Fragment>> {
        self.is_xilinx7().then(|| xilinx::tristate(db, pins))
    }

    fn get_differential_input(&self, db: &mut ValueDb, pins: &DiffInputPins) -> strata_hdl::Result<Fragment> {
        if !self.is_xilinx7() {
            return Err(self.unsupported("DifferentialInput"));
        }
        xilinx::differential_input(db, pins)
    }

    fn get_differential_output(&self, db: &mut ValueDb, pins: &DiffOutputPins) -> strata_hdl::Result<Fragment> {
        if !self.is_xilinx7() {
            return Err(self.unsupported("DifferentialOutput"));
        }
        xilinx::differential_output(db, pins)
    }

    fn get_ddr_input(&self, db: &mut ValueDb, pins: &DdrInputPins) -> strata_hdl::Result<Fragment> {
        if !self.is_xilinx7() {
            return Err(self.unsupported("DDRInput"));
        }
        xilinx::ddr_input(db, pins)
    }

    fn get_ddr_output(&self, db: &mut ValueDb, pins: &DdrOutputPins) -> strata_hdl::Result<Fragment> {
        if !self.is_xilinx7() {
            return Err(self.unsupported("DDROutput"));
        }
        xilinx::ddr_output(db, pins)
    }
}

/// Xilinx 7-series I/O primitives, one cell per bit.
mod xilinx {
    use strata_hdl::{DdrInputPins, DdrOutputPins, DiffInputPins, DiffOutputPins, Fragment, Instance, Result, TristatePins, ValueDb};

    fn finish(instances: Vec<Instance>) -> Fragment {
        let mut fragment = Fragment::new();
        for instance in instances {
            fragment.add_instance(instance);
        }
        fragment.set_flatten(true);
        fragment
    }

    pub(super) fn tristate(db: &mut ValueDb, pins: &TristatePins) -> Result<Fragment> {
        // IOBUF drives the pad while T is low.
        let t = db.invert(pins.oe)?;
        let mut cells = Vec::new();
        for bit in 0..i64::from(db.width(pins.io)?) {
            cells.push(
                Instance::new("IOBUF")
                    .input("T", t)
                    .input("I", db.bit(pins.o, bit)?)
                    .output("O", db.bit(pins.i, bit)?)
                    .inout("IO", db.bit(pins.io, bit)?),
            );
        }
        Ok(finish(cells))
    }

    pub(super) fn differential_input(db: &mut ValueDb, pins: &DiffInputPins) -> Result<Fragment> {
        let mut cells = Vec::new();
        for bit in 0..i64::from(db.width(pins.o)?) {
            cells.push(
                Instance::new("IBUFDS")
                    .input("I", db.bit(pins.i_p, bit)?)
                    .input("IB", db.bit(pins.i_n, bit)?)
                    .output("O", db.bit(pins.o, bit)?),
            );
        }
        Ok(finish(cells))
    }

    pub(super) fn differential_output(db: &mut ValueDb, pins: &DiffOutputPins) -> Result<Fragment> {
        let mut cells = Vec::new();
        for bit in 0..i64::from(db.width(pins.i)?) {
            cells.push(
                Instance::new("OBUFDS")
                    .input("I", db.bit(pins.i, bit)?)
                    .output("O", db.bit(pins.o_p, bit)?)
                    .output("OB", db.bit(pins.o_n, bit)?),
            );
        }
        Ok(finish(cells))
    }

    pub(super) fn ddr_input(db: &mut ValueDb, pins: &DdrInputPins) -> Result<Fragment> {
        let clk = db.clock_signal(&pins.domain)?;
        let one = db.constant_with(1, 1u32);
        let zero = db.constant_with(0, 1u32);
        let mut cells = Vec::new();
        for bit in 0..i64::from(db.width(pins.i)?) {
            cells.push(
                Instance::new("IDDR")
                    .param("DDR_CLK_EDGE", "SAME_EDGE_PIPELINED")
                    .input("C", clk)
                    .input("CE", one)
                    .input("R", zero)
                    .input("S", zero)
                    .input("D", db.bit(pins.i, bit)?)
                    .output("Q1", db.bit(pins.o1, bit)?)
                    .output("Q2", db.bit(pins.o2, bit)?),
            );
        }
        Ok(finish(cells))
    }

    pub(super) fn ddr_output(db: &mut ValueDb, pins: &DdrOutputPins) -> Result<Fragment> {
        let clk = db.clock_signal(&pins.domain)?;
        let one = db.constant_with(1, 1u32);
        let zero = db.constant_with(0, 1u32);
        let mut cells = Vec::new();
        for bit in 0..i64::from(db.width(pins.o)?) {
            cells.push(
                Instance::new("ODDR")
                    .param("DDR_CLK_EDGE", "SAME_EDGE")
                    .input("C", clk)
                    .input("CE", one)
                    .input("R", zero)
                    .input("S", zero)
                    .input("D1", db.bit(pins.i1, bit)?)
                    .input("D2", db.bit(pins.i2, bit)?)
                    .output("Q", db.bit(pins.o, bit)?),
            );
        }
        Ok(finish(cells))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use strata_hdl::{ErrorKind, PortDirection};

    fn board() -> BoardPlatform {
        let mut board = BoardPlatform::new("Test_Board");
        board.add_resource(Resource {
            name: "led".into(),
            number: 0,
            constraints: vec![
                Constraint::pins("H5 J5 T9"),
                Constraint::io_standard("LVCMOS33"),
                Constraint::misc("SLEW=FAST"),
            ],
            subsignals: vec![],
        });
        board.add_resource(Resource {
            name: "uart".into(),
            number: 0,
            constraints: vec![Constraint::io_standard("LVCMOS33")],
            subsignals: vec![
                Subsignal::new("tx", [Constraint::pins("D10")]),
                Subsignal::new("rx", [Constraint::pins("A9"), Constraint::misc("PULLUP")]),
            ],
        });
        board.add_resource(Resource {
            name: "pmod".into(),
            number: 0,
            constraints: vec![Constraint::pins("ja:0 ja:1")],
            subsignals: vec![],
        });
        board.add_connector(Connector::make(
            "ja",
            crate::constraint::ConnectorPins::List(vec!["G13".into(), "B11 A11".into()]),
        ));
        board.add_clock(ClockConstraint {
            resource: "led".into(),
            number: 0,
            frequency: Frequency::from_mhz(100.0),
        });
        board
    }

    #[test]
    fn name_is_lower_case() {
        assert_eq!(board().name(), "test_board");
    }

    #[test]
    fn request_creates_constrained_signal() {
        let mut board = board();
        let mut db = ValueDb::new();
        let led = board.request(&mut db, "led", 0).unwrap().single().unwrap();
        assert_eq!(db.width(led).unwrap(), 3);
        assert_eq!(db.signal_name(led), Some("led_0"));
        let attrs = &db.as_signal(led).unwrap().attrs;
        assert_eq!(attrs["PINS"], AttrValue::Str("H5 J5 T9".into()));
        assert_eq!(attrs["IOSTANDARD"], AttrValue::Str("LVCMOS33".into()));
        assert_eq!(attrs["SLEW"], AttrValue::Str("FAST".into()));
        assert_eq!(attrs["FREQUENCY"], AttrValue::Str("100MHz".into()));
    }

    #[test]
    fn subsignals_inherit_resource_constraints() {
        let mut board = board();
        let mut db = ValueDb::new();
        let uart = board.request(&mut db, "uart", 0).unwrap();
        let rx = uart.field("rx").unwrap();
        let tx = uart.field("tx").unwrap();
        assert_eq!(db.signal_name(rx), Some("uart_0__rx"));
        let rx_attrs = &db.as_signal(rx).unwrap().attrs;
        assert_eq!(rx_attrs["IOSTANDARD"], AttrValue::Str("LVCMOS33".into()));
        assert_eq!(rx_attrs["PULLUP"], AttrValue::Bool(true));
        assert!(!db.as_signal(tx).unwrap().attrs.contains_key("PULLUP"));
        assert!(uart.single().is_none());
    }

    #[test]
    fn connector_pins_are_resolved() {
        let mut board = board();
        let mut db = ValueDb::new();
        let pmod = board.request(&mut db, "pmod", 0).unwrap().single().unwrap();
        assert_eq!(db.width(pmod).unwrap(), 3);
        assert_eq!(
            db.as_signal(pmod).unwrap().attrs["PINS"],
            AttrValue::Str("G13 B11 A11".into())
        );
        let err = board.resolve_pins(&Pins::new("jb:0")).unwrap_err();
        assert_eq!(err.to_string(), "unknown connector pin 'jb:0'");
    }

    #[test]
    fn resources_are_requested_once() {
        let mut board = board();
        let mut db = ValueDb::new();
        board.request(&mut db, "led", 0).unwrap();
        let err = board.request(&mut db, "led", 0).unwrap_err();
        assert!(matches!(err, BuildError::ResourceInUse { .. }));
        let err = board.request(&mut db, "led", 1).unwrap_err();
        assert_eq!(err.to_string(), "unknown resource led#1");
    }

    #[test]
    fn generic_board_has_no_vendor_primitives() {
        let board = board();
        let mut db = ValueDb::new();
        let a = db.signal(1u32).build();
        let b = db.signal(1u32).build();
        let c = db.signal(1u32).build();
        let pins = TristatePins { o: a, oe: b, i: c, io: a };
        assert!(board.get_tristate(&mut db, &pins).is_none());
        let err = board
            .get_differential_input(&mut db, &DiffInputPins { i_p: a, i_n: b, o: c })
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Elaboration);
        assert_eq!(err.to_string(), "DifferentialInput not implemented by platform 'test_board'");
    }

    #[test]
    fn xilinx_tristate_uses_one_iobuf_per_bit() {
        let board = board().with_family("Xilinx7");
        let mut db = ValueDb::new();
        let o = db.signal(2u32).name("o").build();
        let oe = db.signal(1u32).name("oe").build();
        let i = db.signal(2u32).name("i").build();
        let io = db.signal(2u32).name("io").build();
        let fragment = board
            .get_tristate(&mut db, &TristatePins { o, oe, i, io })
            .unwrap()
            .unwrap();
        assert!(fragment.flatten());
        assert_eq!(fragment.instances().len(), 2);
        let cell = &fragment.instances()[1];
        assert_eq!(cell.kind, "IOBUF");
        let names: Vec<_> = cell.ports.iter().map(|p| (p.name.as_str(), p.direction)).collect();
        assert_eq!(
            names,
            [
                ("T", PortDirection::Input),
                ("I", PortDirection::Input),
                ("O", PortDirection::Output),
                ("IO", PortDirection::InOut),
            ]
        );
        assert_eq!(db.repr(cell.ports[3].value), "(slice (sig io) 1:2)");
    }

    #[test]
    fn xilinx_ddr_uses_domain_clock() {
        let board = board().with_family("xilinx7");
        let mut db = ValueDb::new();
        let i = db.signal(1u32).build();
        let o1 = db.signal(1u32).build();
        let o2 = db.signal(1u32).build();
        let pins = DdrInputPins {
            i,
            o1,
            o2,
            domain: "pix".into(),
        };
        let fragment = board.get_ddr_input(&mut db, &pins).unwrap();
        let cell = &fragment.instances()[0];
        assert_eq!(cell.kind, "IDDR");
        assert_eq!(db.repr(cell.ports[0].value), "(clk pix)");

        let comb = DdrInputPins {
            domain: "comb".into(),
            ..pins
        };
        assert_eq!(board.get_ddr_input(&mut db, &comb).unwrap_err().kind(), ErrorKind::Domain);
    }
}
