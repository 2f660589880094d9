//! Pin constraints and connectors.
//!
//! Constraints compare and hash by their normalized textual form, so
//! `Pins::new("1 ")` and `Pins::new(" 1 ")` are the same constraint.

use serde::Deserialize;
use std::collections::BTreeMap;
use std::fmt;
use std::hash::{Hash, Hasher};
use strata_common::ContentHash;

/// A whitespace-separated list of package pins.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct Pins {
    identifiers: Vec<String>,
}

impl Pins {
    /// Splits `text` on whitespace into pin identifiers.
    pub fn new(text: &str) -> Self {
        Self {
            identifiers: text.split_whitespace().map(str::to_string).collect(),
        }
    }

    /// Creates a pin list from already separated identifiers.
    pub fn from_identifiers(identifiers: Vec<String>) -> Self {
        Self { identifiers }
    }

    /// The pin identifiers, least significant bit first.
    pub fn identifiers(&self) -> &[String] {
        &self.identifiers
    }

    /// Number of pins.
    pub fn len(&self) -> usize {
        self.identifiers.len()
    }

    /// Returns `true` if there are no pins.
    pub fn is_empty(&self) -> bool {
        self.identifiers.is_empty()
    }
}

impl fmt::Display for Pins {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Pins('{}')", self.identifiers.join(" "))
    }
}

/// A named group of constraints inside a resource.
#[derive(Debug, Clone)]
pub struct Subsignal {
    name: String,
    constraints: Vec<Constraint>,
}

impl Subsignal {
    /// Creates a subsignal; duplicate constraints are dropped.
    pub fn new(name: impl Into<String>, constraints: impl IntoIterator<Item = Constraint>) -> Self {
        let mut constraints: Vec<Constraint> = constraints.into_iter().collect();
        constraints.sort_by_cached_key(ToString::to_string);
        constraints.dedup();
        Self {
            name: name.into(),
            constraints,
        }
    }

    /// The subsignal name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The constraints, ordered by their textual form.
    pub fn constraints(&self) -> &[Constraint] {
        &self.constraints
    }

    /// The pins of this subsignal, if any.
    pub fn pins(&self) -> Option<&Pins> {
        self.constraints.iter().find_map(|c| match c {
            Constraint::Pins(pins) => Some(pins),
            _ => None,
        })
    }
}

/// A single pin constraint.
#[derive(Debug, Clone)]
pub enum Constraint {
    /// Package pins.
    Pins(Pins),
    /// I/O standard name, kept verbatim.
    IOStandard(String),
    /// Drive strength, trimmed.
    Drive(String),
    /// Any other vendor constraint, trimmed.
    Misc(String),
    /// A nested group of constraints.
    Subsignal(Subsignal),
}

impl Constraint {
    /// `Pins` from a whitespace-separated list.
    pub fn pins(text: &str) -> Self {
        Constraint::Pins(Pins::new(text))
    }

    /// `IOStandard` with the name as given.
    pub fn io_standard(name: impl Into<String>) -> Self {
        Constraint::IOStandard(name.into())
    }

    /// `Drive` with surrounding whitespace removed.
    pub fn drive(strength: &str) -> Self {
        Constraint::Drive(strength.trim().to_string())
    }

    /// `Misc` with surrounding whitespace removed.
    pub fn misc(text: &str) -> Self {
        Constraint::Misc(text.trim().to_string())
    }

    /// A `Subsignal` grouping `constraints` under `name`.
    pub fn subsignal(name: impl Into<String>, constraints: impl IntoIterator<Item = Constraint>) -> Self {
        Constraint::Subsignal(Subsignal::new(name, constraints))
    }

    /// Hash of the normalized textual form.
    pub fn content_hash(&self) -> ContentHash {
        ContentHash::of_display(self)
    }
}

impl fmt::Display for Constraint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Constraint::Pins(pins) => pins.fmt(f),
            Constraint::IOStandard(name) => write!(f, "IOStandard('{name}')"),
            Constraint::Drive(strength) => write!(f, "Drive('{strength}')"),
            Constraint::Misc(text) => write!(f, "Misc({})", quote(text)),
            Constraint::Subsignal(sub) => {
                write!(f, "Subsignal('{}'", sub.name)?;
                for c in &sub.constraints {
                    write!(f, ", {c}")?;
                }
                f.write_str(")")
            }
        }
    }
}

impl PartialEq for Constraint {
    fn eq(&self, other: &Self) -> bool {
        self.content_hash() == other.content_hash()
    }
}

impl Eq for Constraint {}

impl Hash for Constraint {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.content_hash().hash(state);
    }
}

/// Quotes free text, preferring single quotes.
fn quote(text: &str) -> String {
    if text.contains('\'') && !text.contains('"') {
        format!("\"{text}\"")
    } else {
        format!("'{}'", text.replace('\'', "\\'"))
    }
}

/// Key of a connector pin: its position or its name.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum PinKey {
    /// Position in a pin list.
    Index(usize),
    /// Name in a pin map.
    Name(String),
}

impl PinKey {
    /// Numeric text becomes an index, anything else a name.
    pub fn parse(text: &str) -> Self {
        text.parse().map_or_else(|_| PinKey::Name(text.to_string()), PinKey::Index)
    }
}

impl fmt::Display for PinKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PinKey::Index(i) => write!(f, "{i}"),
            PinKey::Name(name) => f.write_str(name),
        }
    }
}

/// How a connector lists its pins.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum ConnectorPins {
    /// One pin list, stored under index 0.
    Single(String),
    /// Pin lists stored under their positions.
    List(Vec<String>),
    /// Pin lists stored under their names.
    Named(BTreeMap<String, String>),
}

/// An expansion header whose pins resources can refer to as `name:key`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Connector {
    /// Connector name.
    pub name: String,
    /// Pins by key.
    pub pins: BTreeMap<PinKey, Pins>,
}

impl Connector {
    /// Builds a connector from a single pin list, a list, or a map of pin lists.
    pub fn make(name: impl Into<String>, pins: ConnectorPins) -> Self {
        let pins = match pins {
            ConnectorPins::Single(text) => BTreeMap::from([(PinKey::Index(0), Pins::new(&text))]),
            ConnectorPins::List(list) => list
                .iter()
                .enumerate()
                .map(|(i, text)| (PinKey::Index(i), Pins::new(text)))
                .collect(),
            ConnectorPins::Named(map) => map
                .iter()
                .map(|(key, text)| (PinKey::Name(key.clone()), Pins::new(text)))
                .collect(),
        };
        Self {
            name: name.into(),
            pins,
        }
    }

    /// The pins stored under `key`.
    pub fn pin(&self, key: &PinKey) -> Option<&Pins> {
        self.pins.get(key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn pins_normalize_whitespace() {
        assert_eq!(Constraint::pins("1  2  3").to_string(), "Pins('1 2 3')");
        assert_eq!(Constraint::pins("1 "), Constraint::pins(" 1 "));
        assert!(Pins::new("").is_empty());
    }

    #[test]
    fn io_standard_is_verbatim() {
        assert_eq!(Constraint::io_standard("CMOS").to_string(), "IOStandard('CMOS')");
        assert_eq!(Constraint::io_standard("CMOS"), Constraint::io_standard("CMOS"));
    }

    #[test]
    fn drive_and_misc_are_trimmed() {
        assert_eq!(Constraint::drive("  high ").to_string(), "Drive('high')");
        assert_eq!(Constraint::drive("high"), Constraint::drive(" high "));
        assert_eq!(Constraint::misc("  misc ").to_string(), "Misc('misc')");
        assert_eq!(Constraint::misc("misc"), Constraint::misc(" misc "));
        assert_eq!(Constraint::misc("it's").to_string(), "Misc(\"it's\")");
    }

    #[test]
    fn subsignal_repr_and_equality() {
        let sub = Constraint::subsignal("foo", [Constraint::pins("  1 2 3 ")]);
        assert_eq!(sub.to_string(), format!("Subsignal('foo', {})", Constraint::pins("1 2 3")));
        assert_eq!(sub, Constraint::subsignal("foo", [Constraint::pins("1 2 3")]));
    }

    #[test]
    fn subsignal_constraints_are_a_set() {
        let a = Constraint::subsignal(
            "tx",
            [Constraint::io_standard("LVCMOS33"), Constraint::pins("A1"), Constraint::pins(" A1")],
        );
        let b = Constraint::subsignal("tx", [Constraint::pins("A1"), Constraint::io_standard("LVCMOS33")]);
        assert_eq!(a, b);
        let Constraint::Subsignal(sub) = &a else { unreachable!() };
        assert_eq!(sub.constraints().len(), 2);
        assert_eq!(sub.pins().map(Pins::len), Some(1));
    }

    #[test]
    fn constraints_hash_by_text() {
        let set: HashSet<Constraint> = [Constraint::pins("1 2"), Constraint::pins(" 1   2 ")].into_iter().collect();
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn connector_from_string() {
        let c = Connector::make("x", ConnectorPins::Single("1 2 3".into()));
        assert_eq!(c.pin(&PinKey::Index(0)), Some(&Pins::new("1 2 3")));
    }

    #[test]
    fn connector_from_list() {
        let c = Connector::make("x", ConnectorPins::List(vec!["1 2 3".into(), "4 5 6".into()]));
        assert_eq!(c.pin(&PinKey::Index(1)), Some(&Pins::new("4 5 6")));
    }

    #[test]
    fn connector_pins_accept_any_form() {
        let single: ConnectorPins = serde_json::from_str("\"1 2\"").unwrap();
        let list: ConnectorPins = serde_json::from_str("[\"1\", \"2\"]").unwrap();
        let named: ConnectorPins = serde_json::from_str("{\"a\": \"1\"}").unwrap();
        assert!(matches!(single, ConnectorPins::Single(_)));
        assert!(matches!(list, ConnectorPins::List(ref l) if l.len() == 2));
        assert!(matches!(named, ConnectorPins::Named(_)));
    }

    #[test]
    fn connector_from_map() {
        let map = BTreeMap::from([("Pin1".to_string(), "1".to_string())]);
        let c = Connector::make("x", ConnectorPins::Named(map));
        assert_eq!(c.pin(&PinKey::parse("Pin1")), Some(&Pins::new("1")));
        assert_eq!(c.pin(&PinKey::parse("0")), None);
    }
}
