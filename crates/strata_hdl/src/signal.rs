//! Signal construction and domain clock/reset references.

use crate::db::ValueDb;
use crate::enums::HdlEnum;
use crate::errors::{HdlError, Result};
use crate::ids::ValueId;
use crate::value::{AttrValue, Decoder, Signal, Value};
use crate::warnings;
use num_bigint::BigInt;
use num_traits::Zero;
use std::collections::BTreeMap;
use std::ops::Range;
use strata_common::{bits_for, Shape, SrcLoc};

/// Name given to signals built without an explicit name.
pub const DEFAULT_SIGNAL_NAME: &str = "$signal";

/// Name given to [`ValueDb::signal_like`] copies built without a name or suffix.
pub const DEFAULT_LIKE_NAME: &str = "$like";

/// Builder for a [`Signal`] node, returned by [`ValueDb::signal`].
///
/// ```ignore
/// let counter = db.signal(8u32).name("counter").reset(3).build();
/// ```
#[must_use = "a signal is only created by calling `build`"]
pub struct SignalBuilder<'db> {
    db: &'db mut ValueDb,
    shape: Shape,
    name: Option<String>,
    like: Option<String>,
    suffix: Option<String>,
    reset: BigInt,
    reset_less: bool,
    attrs: BTreeMap<String, AttrValue>,
    decoder: Option<Decoder>,
    loc: SrcLoc,
}

impl<'db> SignalBuilder<'db> {
    fn new(db: &'db mut ValueDb, shape: Shape, loc: SrcLoc) -> Self {
        Self {
            db,
            shape,
            name: None,
            like: None,
            suffix: None,
            reset: BigInt::zero(),
            reset_less: false,
            attrs: BTreeMap::new(),
            decoder: None,
            loc,
        }
    }

    /// Sets the signal name.
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// For [`ValueDb::signal_like`], names the copy after the original plus `suffix`.
    ///
    /// Ignored when an explicit [`name`](Self::name) is given or the builder
    /// does not copy another signal.
    pub fn name_suffix(mut self, suffix: impl Into<String>) -> Self {
        self.suffix = Some(suffix.into());
        self
    }

    /// Sets the value the signal takes on reset.
    pub fn reset(mut self, reset: impl Into<BigInt>) -> Self {
        self.reset = reset.into();
        self
    }

    /// Makes the signal keep its value when its domain is reset.
    pub fn reset_less(mut self, reset_less: bool) -> Self {
        self.reset_less = reset_less;
        self
    }

    /// Attaches a vendor attribute.
    pub fn attr(mut self, key: impl Into<String>, value: impl Into<AttrValue>) -> Self {
        self.attrs.insert(key.into(), value.into());
        self
    }

    /// Sets the function rendering the signal's values.
    pub fn decoder(mut self, decoder: Decoder) -> Self {
        self.decoder = Some(decoder);
        self
    }

    /// Creates the signal node.
    ///
    /// A nonzero reset value that needs more bits than the signal has is
    /// accepted with a `W301` warning and kept as given.
    pub fn build(self) -> ValueId {
        let name = match (self.name, self.like, self.suffix) {
            (Some(name), _, _) => name,
            (None, Some(like), Some(suffix)) => format!("{like}{suffix}"),
            (None, Some(_), None) => DEFAULT_LIKE_NAME.to_string(),
            (None, None, _) => DEFAULT_SIGNAL_NAME.to_string(),
        };
        if !self.reset.is_zero() {
            let needed = bits_for(&self.reset, self.shape.is_signed());
            if needed > self.shape.width() {
                self.db.warn(warnings::warn_reset_too_wide(
                    &self.reset.to_string(),
                    needed,
                    self.shape.width(),
                    self.loc.clone(),
                ));
            }
        }
        let signal = Signal {
            name: self.db.intern(&name),
            reset: self.reset,
            reset_less: self.reset_less,
            attrs: self.attrs,
            decoder: self.decoder,
        };
        log::trace!("signal '{name}': {}", self.shape);
        self.db.alloc(Value::Signal(signal), Some(self.shape), self.loc)
    }
}

impl ValueDb {
    /// Starts building a signal of the given shape.
    #[track_caller]
    pub fn signal(&mut self, shape: impl Into<Shape>) -> SignalBuilder<'_> {
        SignalBuilder::new(self, shape.into(), SrcLoc::caller())
    }

    /// Starts building a signal able to hold every value of `range`.
    ///
    /// An empty range takes the shape of its start value.
    #[track_caller]
    pub fn signal_range(&mut self, range: Range<i64>) -> SignalBuilder<'_> {
        SignalBuilder::new(self, Shape::for_range(range), SrcLoc::caller())
    }

    /// Starts building a signal of an enumeration's shape, decoding member names.
    #[track_caller]
    pub fn signal_enum<E: HdlEnum>(&mut self) -> SignalBuilder<'_> {
        SignalBuilder::new(self, E::shape(), SrcLoc::caller()).decoder(E::decoder())
    }

    /// Starts building a copy of `other` with the same shape, reset, and attributes.
    ///
    /// `other` may be any value; properties a non-signal lacks take their
    /// defaults.
    #[track_caller]
    pub fn signal_like(&mut self, other: ValueId) -> Result<SignalBuilder<'_>> {
        let loc = SrcLoc::caller();
        let shape = self.shape(other)?;
        let template = self.as_signal(other).cloned();
        let mut builder = SignalBuilder::new(self, shape, loc);
        if let Some(signal) = template {
            builder.like = Some(builder.db.name(signal.name).to_string());
            builder.reset = signal.reset;
            builder.reset_less = signal.reset_less;
            builder.attrs = signal.attrs;
            builder.decoder = signal.decoder;
        } else {
            builder.like = Some(DEFAULT_LIKE_NAME.to_string());
        }
        Ok(builder)
    }

    /// The clock of `domain`. Fails for the combinational domain.
    #[track_caller]
    pub fn clock_signal(&mut self, domain: &str) -> Result<ValueId> {
        if domain == crate::fragment::COMB_DOMAIN {
            return Err(HdlError::CombDomain { signal: "clock" });
        }
        let domain = self.intern(domain);
        Ok(self.alloc(Value::ClockSignal { domain }, Some(Shape::unsigned(1)), SrcLoc::caller()))
    }

    /// The reset of `domain`. Fails for the combinational domain.
    ///
    /// With `allow_reset_less`, a domain without a reset later resolves to a
    /// constant zero instead of an error.
    #[track_caller]
    pub fn reset_signal(&mut self, domain: &str, allow_reset_less: bool) -> Result<ValueId> {
        if domain == crate::fragment::COMB_DOMAIN {
            return Err(HdlError::CombDomain { signal: "reset" });
        }
        let domain = self.intern(domain);
        Ok(self.alloc(
            Value::ResetSignal {
                domain,
                allow_reset_less,
            },
            Some(Shape::unsigned(1)),
            SrcLoc::caller(),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::enums::tests::{Color, Signed};
    use crate::errors::ErrorKind;
    use strata_diagnostics::DiagnosticCode;

    #[test]
    fn default_name_and_shape() {
        let mut db = ValueDb::new();
        let s = db.signal(4u32).build();
        assert_eq!(db.signal_name(s), Some(DEFAULT_SIGNAL_NAME));
        assert_eq!(db.shape(s).unwrap(), Shape::unsigned(4));
        assert!(db.take_diagnostics().is_empty());
    }

    #[test]
    fn range_shapes() {
        let mut db = ValueDb::new();
        let a = db.signal_range(-10..11).build();
        assert_eq!(db.shape(a).unwrap(), Shape::signed(5));
        let b = db.signal_range(0..16).build();
        assert_eq!(db.shape(b).unwrap(), Shape::unsigned(4));
        let c = db.signal_range(0..0).build();
        assert_eq!(db.shape(c).unwrap(), Shape::unsigned(1));
    }

    #[test]
    fn oversized_reset_warns_and_is_kept() {
        let mut db = ValueDb::new();
        let s = db.signal(3u32).reset(8).build();
        assert_eq!(db.as_signal(s).unwrap().reset, BigInt::from(8));
        let diags = db.take_diagnostics();
        assert_eq!(diags.len(), 1);
        assert_eq!(diags[0].code, DiagnosticCode::ResetTooWide);
        assert_eq!(
            diags[0].message,
            "Reset value 8 requires 4 bits to represent, but the signal only has 3 bits"
        );
    }

    #[test]
    fn signed_reset_width_check() {
        let mut db = ValueDb::new();
        db.signal(Shape::signed(4)).reset(-8).build();
        assert!(db.take_diagnostics().is_empty());
        db.signal(Shape::signed(4)).reset(8).build();
        assert_eq!(db.take_diagnostics().len(), 1);
        db.signal(0u32).reset(0).build();
        assert!(db.take_diagnostics().is_empty());
    }

    #[test]
    fn enum_signal_decodes_members() {
        let mut db = ValueDb::new();
        let c = db.signal_enum::<Color>().build();
        assert_eq!(db.shape(c).unwrap(), Shape::unsigned(2));
        let sig = db.as_signal(c).unwrap();
        assert_eq!(sig.decode(&BigInt::from(1)), "RED/1");
        assert_eq!(sig.decode(&BigInt::from(0)), "0");
        let s = db.signal_enum::<Signed>().build();
        assert_eq!(db.as_signal(s).unwrap().decode(&BigInt::from(-1)), "FOO/-1");
    }

    #[test]
    fn like_copies_properties() {
        let mut db = ValueDb::new();
        let orig = db
            .signal(Shape::signed(4))
            .name("orig")
            .reset(-3)
            .reset_less(true)
            .attr("keep", 1)
            .build();
        let copy = db.signal_like(orig).unwrap().build();
        assert_eq!(db.signal_name(copy), Some(DEFAULT_LIKE_NAME));
        assert_eq!(db.shape(copy).unwrap(), Shape::signed(4));
        let sig = db.as_signal(copy).unwrap();
        assert_eq!(sig.reset, BigInt::from(-3));
        assert!(sig.reset_less);
        assert_eq!(sig.attrs.get("keep"), Some(&AttrValue::Int(1)));

        let suffixed = db.signal_like(orig).unwrap().name_suffix("_ff").build();
        assert_eq!(db.signal_name(suffixed), Some("orig_ff"));
        let named = db.signal_like(orig).unwrap().name("other").build();
        assert_eq!(db.signal_name(named), Some("other"));
    }

    #[test]
    fn like_of_expression_takes_shape() {
        let mut db = ValueDb::new();
        let a = db.signal(4u32).build();
        let sum = db.add(a, 1).unwrap();
        let copy = db.signal_like(sum).unwrap().build();
        assert_eq!(db.shape(copy).unwrap(), Shape::unsigned(5));
        assert_eq!(db.as_signal(copy).unwrap().reset, BigInt::zero());
    }

    #[test]
    fn domain_signals() {
        let mut db = ValueDb::new();
        let clk = db.clock_signal("sync").unwrap();
        assert_eq!(db.shape(clk).unwrap(), Shape::unsigned(1));
        let rst = db.reset_signal("pix", true).unwrap();
        assert!(matches!(
            db.value(rst),
            Value::ResetSignal {
                allow_reset_less: true,
                ..
            }
        ));
        let err = db.clock_signal("comb").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Domain);
        assert_eq!(
            db.reset_signal("comb", false).unwrap_err().to_string(),
            "Domain 'comb' does not have a reset"
        );
    }
}
