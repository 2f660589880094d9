//! The module builder: the usual way to describe a design object.
//!
//! ```ignore
//! let mut m = Module::new();
//! m.comb(db.assign(o, i)?);
//! m.sync(db.assign(count, db.add(count, 1)?)?);
//! m.submodule(Rc::new(child));
//! Ok(Elaborated::Module(m))
//! ```

use crate::db::ValueDb;
use crate::elaborate::{Elaboratable, Elaborated, Elaborator};
use crate::errors::Result;
use crate::fragment::{Fragment, COMB_DOMAIN, DEFAULT_DOMAIN};
use crate::instance::Instance;
use crate::platform::Platform;
use crate::stmt::Statement;
use std::fmt;
use std::rc::Rc;

/// Statements, submodules, and instances collected for one design object.
#[derive(Clone, Default)]
pub struct Module {
    statements: Vec<(String, Statement)>,
    submodules: Vec<(Rc<dyn Elaboratable>, Option<String>)>,
    instances: Vec<Instance>,
    domains: Vec<String>,
}

impl Module {
    /// Creates an empty module.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a combinational statement.
    pub fn comb(&mut self, stmt: Statement) {
        self.domain(COMB_DOMAIN, stmt);
    }

    /// Adds a statement to the default clocked domain.
    pub fn sync(&mut self, stmt: Statement) {
        self.domain(DEFAULT_DOMAIN, stmt);
    }

    /// Adds a statement to the domain called `domain`.
    pub fn domain(&mut self, domain: &str, stmt: Statement) {
        self.statements.push((domain.to_string(), stmt));
    }

    /// Adds several statements to `domain`.
    pub fn extend(&mut self, domain: &str, stmts: impl IntoIterator<Item = Statement>) {
        for stmt in stmts {
            self.domain(domain, stmt);
        }
    }

    /// Adds an anonymous submodule.
    pub fn submodule(&mut self, sub: Rc<dyn Elaboratable>) {
        self.submodules.push((sub, None));
    }

    /// Adds a named submodule.
    pub fn named_submodule(&mut self, name: impl Into<String>, sub: Rc<dyn Elaboratable>) {
        self.submodules.push((sub, Some(name.into())));
    }

    /// Adds a primitive instance.
    pub fn instance(&mut self, instance: Instance) {
        self.instances.push(instance);
    }

    /// Declares a clock domain the module needs even if no statement uses it.
    pub fn require_domain(&mut self, name: impl Into<String>) {
        self.domains.push(name.into());
    }

    /// Builds the fragment, elaborating submodules through `elaborator`.
    pub(crate) fn into_fragment(self, db: &mut ValueDb, elaborator: &mut Elaborator<'_>) -> Result<Fragment> {
        let mut fragment = Fragment::new();
        for (domain, stmt) in self.statements {
            let domain = db.domain(&domain);
            fragment.add_statements(db, domain, [stmt]);
        }
        for (sub, name) in self.submodules {
            let child = elaborator.get_fragment(db, &sub)?;
            fragment.add_subfragment(child, name);
        }
        for instance in self.instances {
            fragment.add_instance(instance);
        }
        for domain in self.domains {
            fragment.require_domain(db.intern(&domain));
        }
        Ok(fragment)
    }
}

impl fmt::Debug for Module {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Module")
            .field("statements", &self.statements.len())
            .field("submodules", &self.submodules.len())
            .field("instances", &self.instances.len())
            .field("domains", &self.domains)
            .finish()
    }
}

impl Elaboratable for Module {
    fn elaborate(&self, _db: &mut ValueDb, _platform: Option<&dyn Platform>) -> Result<Elaborated> {
        Ok(Elaborated::Module(self.clone()))
    }
}
