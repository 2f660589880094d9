//! I/O buffer primitives.
//!
//! Each primitive owns the signals a design connects to and asks the
//! platform for an implementation when elaborated. Only the tri-state
//! buffer has a generic fallback; the others fail on platforms that do not
//! provide them.

use std::rc::Rc;
use strata_hdl::{
    BigInt, DdrInputPins, DdrOutputPins, DiffInputPins, DiffOutputPins, Domain, Elaboratable, Elaborated, Fragment,
    HdlError, Instance, Platform, Result, Shape, TristatePins, ValueDb, ValueId, DEFAULT_DOMAIN,
};

/// Signal name `{prefix}_{field}`, or just `field` without a prefix.
fn field_name(prefix: Option<&str>, field: &str) -> String {
    match prefix {
        Some(prefix) => format!("{prefix}_{field}"),
        None => field.to_string(),
    }
}

/// The error for a primitive elaborated without any platform.
fn no_platform(primitive: &'static str) -> HdlError {
    HdlError::Unsupported {
        primitive,
        platform: "<none>".to_string(),
    }
}

/// Output, output-enable, and input of a tri-state pad.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TsTriple {
    /// Value driven onto the pad.
    pub o: ValueId,
    /// Output enable, one bit.
    pub oe: ValueId,
    /// Value read from the pad.
    pub i: ValueId,
}

/// Options for [`TsTriple::build`].
#[derive(Debug, Clone, Default)]
pub struct TsTripleBuilder {
    shape: Shape,
    name: Option<String>,
    reset_o: BigInt,
    reset_oe: BigInt,
    reset_i: BigInt,
}

impl TsTripleBuilder {
    /// Prefixes the signal names with `name`.
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Reset value of `o`.
    pub fn reset_o(mut self, reset: impl Into<BigInt>) -> Self {
        self.reset_o = reset.into();
        self
    }

    /// Reset value of `oe`.
    pub fn reset_oe(mut self, reset: impl Into<BigInt>) -> Self {
        self.reset_oe = reset.into();
        self
    }

    /// Reset value of `i`.
    pub fn reset_i(mut self, reset: impl Into<BigInt>) -> Self {
        self.reset_i = reset.into();
        self
    }

    /// Creates the three signals.
    pub fn build(self, db: &mut ValueDb) -> TsTriple {
        let prefix = self.name.as_deref();
        let o = db
            .signal(self.shape)
            .name(field_name(prefix, "o"))
            .reset(self.reset_o)
            .build();
        let oe = db
            .signal(1u32)
            .name(field_name(prefix, "oe"))
            .reset(self.reset_oe)
            .build();
        let i = db
            .signal(self.shape)
            .name(field_name(prefix, "i"))
            .reset(self.reset_i)
            .build();
        TsTriple { o, oe, i }
    }
}

impl TsTriple {
    /// Starts a triple whose `o` and `i` have `shape`.
    pub fn builder(shape: impl Into<Shape>) -> TsTripleBuilder {
        TsTripleBuilder {
            shape: shape.into(),
            ..TsTripleBuilder::default()
        }
    }

    /// Width of the data signals.
    pub fn len(&self, db: &mut ValueDb) -> Result<u32> {
        db.width(self.o)
    }

    /// A tri-state buffer connecting this triple to `io`.
    pub fn get_tristate(&self, io: ValueId) -> Tristate {
        Tristate { triple: *self, io }
    }
}

impl Elaboratable for TsTriple {
    fn elaborate(&self, _db: &mut ValueDb, _platform: Option<&dyn Platform>) -> Result<Elaborated> {
        Ok(Elaborated::Fragment(Fragment::new()))
    }
}

/// A tri-state buffer driving `io` from a [`TsTriple`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Tristate {
    /// The controlling triple.
    pub triple: TsTriple,
    /// The pad.
    pub io: ValueId,
}

impl Tristate {
    /// `$tribuf` cell plus `i = io`, merged into the parent fragment.
    fn generic(&self, db: &mut ValueDb) -> Result<Fragment> {
        let width = db.width(self.io)?;
        let mut fragment = Fragment::new();
        let read_back = db.assign(self.triple.i, self.io)?;
        fragment.add_statements(db, Domain::Comb, [read_back]);
        fragment.add_instance(
            Instance::new("$tribuf")
                .param("WIDTH", width)
                .input("EN", self.triple.oe)
                .input("A", self.triple.o)
                .output("Y", self.io),
        );
        fragment.set_flatten(true);
        Ok(fragment)
    }
}

impl Elaboratable for Tristate {
    fn elaborate(&self, db: &mut ValueDb, platform: Option<&dyn Platform>) -> Result<Elaborated> {
        let pins = TristatePins {
            o: self.triple.o,
            oe: self.triple.oe,
            i: self.triple.i,
            io: self.io,
        };
        if let Some(fragment) = platform.and_then(|p| p.get_tristate(db, &pins)) {
            return fragment.map(Elaborated::Fragment);
        }
        log::debug!("using generic tri-state buffer");
        self.generic(db).map(Elaborated::Fragment)
    }
}

/// A differential input buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DifferentialInput {
    /// Positive pad.
    pub i_p: ValueId,
    /// Negative pad.
    pub i_n: ValueId,
    /// Received value.
    pub o: ValueId,
}

impl DifferentialInput {
    /// Creates the buffer signals, named `{name}_i_p`, `{name}_i_n`, `{name}_o`.
    pub fn new(db: &mut ValueDb, shape: impl Into<Shape>, name: Option<&str>) -> Self {
        let shape = shape.into();
        Self {
            i_p: db.signal(shape).name(field_name(name, "i_p")).build(),
            i_n: db.signal(shape).name(field_name(name, "i_n")).build(),
            o: db.signal(shape).name(field_name(name, "o")).build(),
        }
    }

    /// Width of the buffer.
    pub fn len(&self, db: &mut ValueDb) -> Result<u32> {
        db.width(self.i_p)
    }
}

impl Elaboratable for DifferentialInput {
    fn elaborate(&self, db: &mut ValueDb, platform: Option<&dyn Platform>) -> Result<Elaborated> {
        let platform = platform.ok_or_else(|| no_platform("DifferentialInput"))?;
        let pins = DiffInputPins {
            i_p: self.i_p,
            i_n: self.i_n,
            o: self.o,
        };
        platform.get_differential_input(db, &pins).map(Elaborated::Fragment)
    }
}

/// A differential output buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DifferentialOutput {
    /// Value to transmit.
    pub i: ValueId,
    /// Positive pad.
    pub o_p: ValueId,
    /// Negative pad.
    pub o_n: ValueId,
}

impl DifferentialOutput {
    /// Creates the buffer signals, named `{name}_o_p`, `{name}_o_n`, `{name}_i`.
    pub fn new(db: &mut ValueDb, shape: impl Into<Shape>, name: Option<&str>) -> Self {
        let shape = shape.into();
        let o_p = db.signal(shape).name(field_name(name, "o_p")).build();
        let o_n = db.signal(shape).name(field_name(name, "o_n")).build();
        let i = db.signal(shape).name(field_name(name, "i")).build();
        Self { i, o_p, o_n }
    }

    /// Width of the buffer.
    pub fn len(&self, db: &mut ValueDb) -> Result<u32> {
        db.width(self.i)
    }
}

impl Elaboratable for DifferentialOutput {
    fn elaborate(&self, db: &mut ValueDb, platform: Option<&dyn Platform>) -> Result<Elaborated> {
        let platform = platform.ok_or_else(|| no_platform("DifferentialOutput"))?;
        let pins = DiffOutputPins {
            i: self.i,
            o_p: self.o_p,
            o_n: self.o_n,
        };
        platform.get_differential_output(db, &pins).map(Elaborated::Fragment)
    }
}

/// A double data rate input register.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DdrInput {
    /// The pad.
    pub i: ValueId,
    /// Value captured on the rising edge.
    pub o1: ValueId,
    /// Value captured on the falling edge.
    pub o2: ValueId,
    /// Clock domain, `sync` unless set.
    pub domain: String,
}

impl DdrInput {
    /// Creates the register signals in the default domain.
    pub fn new(db: &mut ValueDb, shape: impl Into<Shape>, name: Option<&str>) -> Self {
        let shape = shape.into();
        Self {
            i: db.signal(shape).name(field_name(name, "i")).build(),
            o1: db.signal(shape).name(field_name(name, "o1")).build(),
            o2: db.signal(shape).name(field_name(name, "o2")).build(),
            domain: DEFAULT_DOMAIN.to_string(),
        }
    }

    /// Moves the register to `domain`.
    pub fn in_domain(mut self, domain: impl Into<String>) -> Self {
        self.domain = domain.into();
        self
    }

    /// Width of the register.
    pub fn len(&self, db: &mut ValueDb) -> Result<u32> {
        db.width(self.i)
    }
}

impl Elaboratable for DdrInput {
    fn elaborate(&self, db: &mut ValueDb, platform: Option<&dyn Platform>) -> Result<Elaborated> {
        let platform = platform.ok_or_else(|| no_platform("DDRInput"))?;
        let pins = DdrInputPins {
            i: self.i,
            o1: self.o1,
            o2: self.o2,
            domain: self.domain.clone(),
        };
        platform.get_ddr_input(db, &pins).map(Elaborated::Fragment)
    }
}

/// A double data rate output register.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DdrOutput {
    /// Value emitted on the rising edge.
    pub i1: ValueId,
    /// Value emitted on the falling edge.
    pub i2: ValueId,
    /// The pad.
    pub o: ValueId,
    /// Clock domain, `sync` unless set.
    pub domain: String,
}

impl DdrOutput {
    /// Creates the register signals in the default domain.
    pub fn new(db: &mut ValueDb, shape: impl Into<Shape>, name: Option<&str>) -> Self {
        let shape = shape.into();
        Self {
            i1: db.signal(shape).name(field_name(name, "i1")).build(),
            i2: db.signal(shape).name(field_name(name, "i2")).build(),
            o: db.signal(shape).name(field_name(name, "o")).build(),
            domain: DEFAULT_DOMAIN.to_string(),
        }
    }

    /// Moves the register to `domain`.
    pub fn in_domain(mut self, domain: impl Into<String>) -> Self {
        self.domain = domain.into();
        self
    }

    /// Width of the register.
    pub fn len(&self, db: &mut ValueDb) -> Result<u32> {
        db.width(self.i1)
    }
}

impl Elaboratable for DdrOutput {
    fn elaborate(&self, db: &mut ValueDb, platform: Option<&dyn Platform>) -> Result<Elaborated> {
        let platform = platform.ok_or_else(|| no_platform("DDROutput"))?;
        let pins = DdrOutputPins {
            i1: self.i1,
            i2: self.i2,
            o: self.o,
            domain: self.domain.clone(),
        };
        platform.get_ddr_output(db, &pins).map(Elaborated::Fragment)
    }
}

/// Shares a primitive as a submodule.
pub fn shared<T: Elaboratable + 'static>(primitive: T) -> Rc<dyn Elaboratable> {
    Rc::new(primitive)
}
