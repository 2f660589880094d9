//! Preparation of an elaborated hierarchy for code generation.
//!
//! [`prepare`] merges fragments marked `flatten` into their parents,
//! creates the clock and reset signals of every domain the hierarchy uses,
//! and resolves the direction of each requested port from how the whole
//! hierarchy uses it.

use crate::db::ValueDb;
use crate::errors::{HdlError, Result};
use crate::fragment::{Fragment, DEFAULT_DOMAIN};
use crate::ids::ValueId;
use crate::info::fragment_info;
use crate::port::PortDirection;
use crate::value::Value;
use crate::visit;
use std::collections::BTreeSet;
use strata_common::Ident;

/// The clock and reset created for one domain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DomainSignals {
    /// Domain name.
    pub name: Ident,
    /// The domain clock, an input of the top fragment.
    pub clk: ValueId,
    /// The domain reset, an input of the top fragment.
    pub rst: ValueId,
}

/// A top fragment ready for an emitter.
#[derive(Debug, Clone)]
pub struct PreparedFragment {
    /// The top fragment, its ports annotated.
    pub fragment: Fragment,
    /// Domains in order of first use, with their clock and reset signals.
    pub domains: Vec<DomainSignals>,
}

impl PreparedFragment {
    /// The clock and reset of `domain`, if the hierarchy uses it.
    pub fn domain(&self, db: &ValueDb, domain: &str) -> Option<&DomainSignals> {
        self.domains.iter().find(|d| db.name(d.name) == domain)
    }

    /// Resolved ports in signal creation order.
    pub fn ports(&self) -> Vec<(ValueId, PortDirection)> {
        self.fragment.iter_ports(None).collect()
    }
}

/// Prepares `fragment` as the top of a design exposing `ports`.
///
/// A requested port that the hierarchy both drives and reads becomes an
/// inout, one it only drives an output, and any other an input. The clock
/// and reset of every used domain are added as inputs.
pub fn prepare(db: &mut ValueDb, mut fragment: Fragment, ports: &[ValueId]) -> Result<PreparedFragment> {
    for &port in ports {
        if db.as_signal(port).is_none() {
            return Err(HdlError::NotAPort { repr: db.repr(port) });
        }
    }
    flatten(&mut fragment);
    lower_user_values(db, &fragment)?;

    let mut usage = Usage::default();
    usage.collect(db, &fragment);

    let mut domains = Vec::with_capacity(usage.domains.len());
    for name in usage.domains {
        let domain = db.name(name).to_string();
        let (clk_name, rst_name) = if domain == DEFAULT_DOMAIN {
            ("clk".to_string(), "rst".to_string())
        } else {
            (format!("{domain}_clk"), format!("{domain}_rst"))
        };
        let clk = db.signal(1u32).name(clk_name).build();
        let rst = db.signal(1u32).name(rst_name).reset_less(true).build();
        domains.push(DomainSignals { name, clk, rst });
    }

    fragment.clear_ports();
    for &port in ports {
        let direction = match (usage.driven.contains(&port), usage.read.contains(&port)) {
            (true, true) => PortDirection::InOut,
            (true, false) => PortDirection::Output,
            (false, _) => PortDirection::Input,
        };
        fragment.add_ports([port], direction);
    }
    for d in &domains {
        fragment.add_ports([d.clk, d.rst], PortDirection::Input);
    }

    log::debug!("prepared fragment\n{}", fragment_info(db, &fragment));
    Ok(PreparedFragment { fragment, domains })
}

/// Merges `flatten` children into their parent, recursively.
fn flatten(fragment: &mut Fragment) {
    for (mut child, name) in fragment.take_subfragments() {
        flatten(&mut child);
        if child.flatten() {
            fragment.absorb(child);
        } else {
            fragment.add_subfragment(child, name);
        }
    }
}

/// Lowers every user value the hierarchy references, so walks can see
/// through them.
fn lower_user_values(db: &mut ValueDb, fragment: &Fragment) -> Result<()> {
    let mut roots = Vec::new();
    hierarchy_roots(fragment, &mut roots);
    loop {
        let mut pending = BTreeSet::new();
        for &root in &roots {
            visit::walk(db, root, &mut |id, value| {
                if matches!(value, Value::User(user) if user.lowered().is_none()) {
                    pending.insert(id);
                }
            });
        }
        if pending.is_empty() {
            return Ok(());
        }
        for id in pending {
            db.lower(id)?;
        }
    }
}

/// Statement operands and instance bindings of `fragment` and its children.
fn hierarchy_roots(fragment: &Fragment, roots: &mut Vec<ValueId>) {
    for (_, stmt) in fragment.iter_statements() {
        collect_roots(stmt, roots);
    }
    roots.extend(fragment.instances().iter().flat_map(|i| &i.ports).map(|p| p.value));
    for (child, _) in fragment.subfragments() {
        hierarchy_roots(child, roots);
    }
}

/// Signal and domain usage gathered over a whole hierarchy.
#[derive(Default)]
struct Usage {
    driven: BTreeSet<ValueId>,
    read: BTreeSet<ValueId>,
    domains: Vec<Ident>,
}

impl Usage {
    fn add_domain(&mut self, name: Ident) {
        if !self.domains.contains(&name) {
            self.domains.push(name);
        }
    }

    fn collect(&mut self, db: &ValueDb, fragment: &Fragment) {
        for name in fragment.iter_domains() {
            self.add_domain(name);
        }
        self.driven.extend(fragment.iter_drivers().map(|(_, s)| s));
        let mut roots = Vec::new();
        for (_, stmt) in fragment.iter_statements() {
            self.driven.extend(db.lhs_signals(stmt));
            self.read.extend(db.rhs_signals(stmt));
            collect_roots(stmt, &mut roots);
        }
        for instance in fragment.instances() {
            roots.extend(instance.ports.iter().map(|p| p.value));
            for binding in instance.ports_with(PortDirection::Input) {
                visit::read_signals(db, binding.value, &mut self.read);
            }
            for binding in instance.ports_with(PortDirection::Output) {
                visit::assigned_signals(db, binding.value, &mut self.driven);
                visit::lhs_read_signals(db, binding.value, &mut self.read);
            }
            for binding in instance.ports_with(PortDirection::InOut) {
                visit::assigned_signals(db, binding.value, &mut self.driven);
                visit::read_signals(db, binding.value, &mut self.read);
            }
        }
        let default = db.intern(DEFAULT_DOMAIN);
        for root in roots {
            visit::walk(db, root, &mut |_, value| match value {
                Value::ClockSignal { domain } | Value::ResetSignal { domain, .. } => self.add_domain(*domain),
                Value::Sample { domain, .. } => self.add_domain(domain.unwrap_or(default)),
                _ => {}
            });
        }
        for (child, _) in fragment.subfragments() {
            self.collect(db, child);
        }
    }
}

fn collect_roots(stmt: &crate::stmt::Statement, roots: &mut Vec<ValueId>) {
    use crate::stmt::Statement;
    match stmt {
        Statement::Assign { lhs, rhs, .. } => roots.extend([*lhs, *rhs]),
        Statement::Switch { test, cases, .. } => {
            roots.push(*test);
            for stmt in cases.iter().flat_map(|c| &c.body) {
                collect_roots(stmt, roots);
            }
        }
    }
}
