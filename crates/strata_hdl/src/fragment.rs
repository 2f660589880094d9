//! Fragments: the nodes of an elaborated design hierarchy.
//!
//! A [`Fragment`] owns the statements of one design object grouped by
//! domain, the signals each domain drives, the primitive instances it
//! contains, and its child fragments. Port annotations are filled in by
//! [`prepare`](crate::prepare::prepare).

use crate::db::ValueDb;
use crate::ids::ValueId;
use crate::instance::Instance;
use crate::port::PortDirection;
use crate::stmt::Statement;
use crate::visit;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use strata_common::Ident;

/// Name of the combinational domain.
pub const COMB_DOMAIN: &str = "comb";

/// Name of the domain used when none is specified.
pub const DEFAULT_DOMAIN: &str = "sync";

/// The domain a statement belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Domain {
    /// Combinational logic, without a clock.
    Comb,
    /// Logic updated on the clock edge of a named domain.
    Clocked(Ident),
}

impl ValueDb {
    /// The domain called `name`; `"comb"` is the combinational domain.
    pub fn domain(&self, name: &str) -> Domain {
        if name == COMB_DOMAIN {
            Domain::Comb
        } else {
            Domain::Clocked(self.intern(name))
        }
    }

    /// The name of `domain`.
    pub fn domain_name(&self, domain: Domain) -> &str {
        match domain {
            Domain::Comb => COMB_DOMAIN,
            Domain::Clocked(name) => self.name(name),
        }
    }
}

/// One node of the design hierarchy.
#[derive(Debug, Clone, Default)]
pub struct Fragment {
    ports: BTreeMap<ValueId, PortDirection>,
    drivers: BTreeMap<Domain, BTreeSet<ValueId>>,
    statements: BTreeMap<Domain, Vec<Statement>>,
    instances: Vec<Instance>,
    subfragments: Vec<(Fragment, Option<String>)>,
    required_domains: BTreeSet<Ident>,
    flatten: bool,
}

impl Fragment {
    /// Creates an empty fragment.
    pub fn new() -> Self {
        Self::default()
    }

    /// Annotates signals as ports with the given direction.
    pub fn add_ports(&mut self, signals: impl IntoIterator<Item = ValueId>, direction: PortDirection) {
        for signal in signals {
            self.ports.insert(signal, direction);
        }
    }

    /// Ports with the given direction, or all ports, in signal creation order.
    pub fn iter_ports(&self, direction: Option<PortDirection>) -> impl Iterator<Item = (ValueId, PortDirection)> + '_ {
        self.ports
            .iter()
            .filter(move |(_, d)| direction.map_or(true, |want| **d == want))
            .map(|(s, d)| (*s, *d))
    }

    pub(crate) fn clear_ports(&mut self) {
        self.ports.clear();
    }

    /// Records that `domain` drives `signal`.
    pub fn add_driver(&mut self, signal: ValueId, domain: Domain) {
        self.drivers.entry(domain).or_default().insert(signal);
    }

    /// Every `(domain, signal)` driver pair.
    pub fn iter_drivers(&self) -> impl Iterator<Item = (Domain, ValueId)> + '_ {
        self.drivers
            .iter()
            .flat_map(|(domain, signals)| signals.iter().map(move |s| (*domain, *s)))
    }

    /// Signals driven by `domain`.
    pub fn drivers_for(&self, domain: Domain) -> impl Iterator<Item = ValueId> + '_ {
        self.drivers.get(&domain).into_iter().flatten().copied()
    }

    /// Appends statements to `domain` and records the signals they drive.
    pub fn add_statements(&mut self, db: &ValueDb, domain: Domain, stmts: impl IntoIterator<Item = Statement>) {
        for stmt in stmts {
            for signal in db.lhs_signals(&stmt) {
                self.add_driver(signal, domain);
            }
            self.statements.entry(domain).or_default().push(stmt);
        }
    }

    /// Statements of `domain` in insertion order.
    pub fn statements(&self, domain: Domain) -> &[Statement] {
        self.statements.get(&domain).map_or(&[][..], Vec::as_slice)
    }

    /// Every `(domain, statement)` pair.
    pub fn iter_statements(&self) -> impl Iterator<Item = (Domain, &Statement)> + '_ {
        self.statements
            .iter()
            .flat_map(|(domain, stmts)| stmts.iter().map(move |s| (*domain, s)))
    }

    /// Adds a primitive instance.
    pub fn add_instance(&mut self, instance: Instance) {
        self.instances.push(instance);
    }

    /// Instances directly in this fragment.
    pub fn instances(&self) -> &[Instance] {
        &self.instances
    }

    /// Adds a child fragment, optionally named.
    pub fn add_subfragment(&mut self, fragment: Fragment, name: Option<String>) {
        self.subfragments.push((fragment, name));
    }

    /// Child fragments with their names.
    pub fn subfragments(&self) -> &[(Fragment, Option<String>)] {
        &self.subfragments
    }

    pub(crate) fn take_subfragments(&mut self) -> Vec<(Fragment, Option<String>)> {
        std::mem::take(&mut self.subfragments)
    }

    /// Declares that this fragment needs the clock domain `name`.
    pub fn require_domain(&mut self, name: Ident) {
        self.required_domains.insert(name);
    }

    /// Clocked domains used by this fragment: driven, holding statements, or required.
    pub fn iter_domains(&self) -> impl Iterator<Item = Ident> + '_ {
        let used = self.drivers.keys().chain(self.statements.keys());
        let mut domains: BTreeSet<Ident> = used
            .filter_map(|d| match d {
                Domain::Comb => None,
                Domain::Clocked(name) => Some(*name),
            })
            .collect();
        domains.extend(self.required_domains.iter().copied());
        domains.into_iter()
    }

    /// Whether this fragment is merged into its parent during preparation.
    pub fn flatten(&self) -> bool {
        self.flatten
    }

    /// Marks this fragment to be merged into its parent.
    pub fn set_flatten(&mut self, flatten: bool) {
        self.flatten = flatten;
    }

    /// Merges `other` into this fragment, keeping its children as children.
    pub(crate) fn absorb(&mut self, other: Fragment) {
        for (signal, direction) in other.ports {
            self.ports.entry(signal).or_insert(direction);
        }
        for (domain, signals) in other.drivers {
            self.drivers.entry(domain).or_default().extend(signals);
        }
        for (domain, stmts) in other.statements {
            self.statements.entry(domain).or_default().extend(stmts);
        }
        self.instances.extend(other.instances);
        self.subfragments.extend(other.subfragments);
        self.required_domains.extend(other.required_domains);
    }

    /// Signals used by this fragment, children excluded, in creation order.
    ///
    /// Covers ports, drivers, every signal read or written by a statement,
    /// and signals bound to instance ports.
    pub fn iter_signals(&self, db: &ValueDb) -> Vec<ValueId> {
        let mut signals: BTreeSet<ValueId> = self.ports.keys().copied().collect();
        signals.extend(self.iter_drivers().map(|(_, s)| s));
        for (_, stmt) in self.iter_statements() {
            signals.extend(db.lhs_signals(stmt));
            signals.extend(db.rhs_signals(stmt));
        }
        for binding in self.instances.iter().flat_map(|i| &i.ports) {
            visit::read_signals(db, binding.value, &mut signals);
        }
        signals.into_iter().collect()
    }
}
