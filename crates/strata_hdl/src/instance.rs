//! Instances of primitives and black-box cells.
//!
//! An [`Instance`] names a cell type understood by a downstream tool
//! (`$tribuf`, `IOBUF`, ...), its parameters, and the values bound to its
//! ports. Port bindings keep their insertion order.

use crate::ids::ValueId;
use crate::port::PortDirection;
use crate::value::AttrValue;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use strata_common::SrcLoc;

/// A parameter value of an [`Instance`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ParamValue {
    /// An integer parameter.
    Int(i64),
    /// A boolean parameter.
    Bool(bool),
    /// A string parameter.
    Str(String),
}

impl From<i64> for ParamValue {
    fn from(v: i64) -> Self {
        ParamValue::Int(v)
    }
}

impl From<u32> for ParamValue {
    fn from(v: u32) -> Self {
        ParamValue::Int(i64::from(v))
    }
}

impl From<bool> for ParamValue {
    fn from(v: bool) -> Self {
        ParamValue::Bool(v)
    }
}

impl From<&str> for ParamValue {
    fn from(v: &str) -> Self {
        ParamValue::Str(v.to_string())
    }
}

impl From<String> for ParamValue {
    fn from(v: String) -> Self {
        ParamValue::Str(v)
    }
}

/// A port binding of an [`Instance`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PortBinding {
    /// The cell's port name.
    pub name: String,
    /// Direction as seen from the cell.
    pub direction: PortDirection,
    /// The bound value.
    pub value: ValueId,
}

/// An instantiated primitive or black-box cell.
#[derive(Debug, Clone, PartialEq)]
pub struct Instance {
    /// The cell type.
    pub kind: String,
    /// Instance name, if one was given.
    pub name: Option<String>,
    /// Parameters by name.
    pub params: BTreeMap<String, ParamValue>,
    /// Vendor attributes by name.
    pub attrs: BTreeMap<String, AttrValue>,
    /// Port bindings in insertion order.
    pub ports: Vec<PortBinding>,
    /// Where the instance was created.
    pub loc: SrcLoc,
}

impl Instance {
    /// Starts an instance of the cell type `kind`.
    #[track_caller]
    pub fn new(kind: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            name: None,
            params: BTreeMap::new(),
            attrs: BTreeMap::new(),
            ports: Vec::new(),
            loc: SrcLoc::caller(),
        }
    }

    /// Names the instance.
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Sets a parameter.
    pub fn param(mut self, name: impl Into<String>, value: impl Into<ParamValue>) -> Self {
        self.params.insert(name.into(), value.into());
        self
    }

    /// Sets a vendor attribute.
    pub fn attr(mut self, name: impl Into<String>, value: impl Into<AttrValue>) -> Self {
        self.attrs.insert(name.into(), value.into());
        self
    }

    /// Binds a port.
    pub fn port(mut self, name: impl Into<String>, direction: PortDirection, value: ValueId) -> Self {
        self.ports.push(PortBinding {
            name: name.into(),
            direction,
            value,
        });
        self
    }

    /// Binds an input port.
    pub fn input(self, name: impl Into<String>, value: ValueId) -> Self {
        self.port(name, PortDirection::Input, value)
    }

    /// Binds an output port.
    pub fn output(self, name: impl Into<String>, value: ValueId) -> Self {
        self.port(name, PortDirection::Output, value)
    }

    /// Binds a bidirectional port.
    pub fn inout(self, name: impl Into<String>, value: ValueId) -> Self {
        self.port(name, PortDirection::InOut, value)
    }

    /// Port bindings with the given direction, in insertion order.
    pub fn ports_with(&self, direction: PortDirection) -> impl Iterator<Item = &PortBinding> {
        self.ports.iter().filter(move |p| p.direction == direction)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_keeps_port_order() {
        let a = ValueId::from_raw(0);
        let y = ValueId::from_raw(1);
        let en = ValueId::from_raw(2);
        let inst = Instance::new("$tribuf")
            .param("WIDTH", 4u32)
            .input("EN", en)
            .input("A", a)
            .output("Y", y);
        assert_eq!(inst.kind, "$tribuf");
        assert_eq!(inst.params["WIDTH"], ParamValue::Int(4));
        let names: Vec<_> = inst.ports.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, ["EN", "A", "Y"]);
        assert_eq!(inst.ports_with(PortDirection::Output).count(), 1);
        assert!(!inst.loc.is_unknown());
    }

    #[test]
    fn param_serde_untagged() {
        let json = serde_json::to_string(&ParamValue::from("LVCMOS33")).unwrap();
        assert_eq!(json, "\"LVCMOS33\"");
        let back: ParamValue = serde_json::from_str("7").unwrap();
        assert_eq!(back, ParamValue::Int(7));
    }
}
