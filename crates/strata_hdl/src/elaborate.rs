//! Elaboration: turning a tree of design objects into fragments.
//!
//! A design object implements [`Elaboratable`] and returns either a
//! finished [`Fragment`], a [`Module`] whose submodules still need
//! elaborating, or another object to delegate to. The [`Elaborator`]
//! walks the tree depth-first, elaborates each object once, and rejects
//! objects that reach themselves through delegation or submodules.

use crate::db::ValueDb;
use crate::dsl::Module;
use crate::errors::{HdlError, Result};
use crate::fragment::Fragment;
use crate::platform::Platform;
use std::collections::{HashMap, HashSet};
use std::rc::Rc;

/// Something that can describe itself as hardware.
pub trait Elaboratable {
    /// Produces this object's hardware for the given platform.
    fn elaborate(&self, db: &mut ValueDb, platform: Option<&dyn Platform>) -> Result<Elaborated>;

    /// A human-readable name for error messages.
    fn describe(&self) -> String {
        std::any::type_name::<Self>().to_string()
    }
}

/// The result of [`Elaboratable::elaborate`].
pub enum Elaborated {
    /// A finished fragment.
    Fragment(Fragment),
    /// A module to be turned into a fragment.
    Module(Module),
    /// Another object to elaborate in this one's place.
    Delegate(Rc<dyn Elaboratable>),
}

type ObjectKey = *const ();

fn key_of(obj: &Rc<dyn Elaboratable>) -> ObjectKey {
    Rc::as_ptr(obj) as *const ()
}

/// Drives elaboration of a design hierarchy.
///
/// Objects are identified by their `Rc` allocation; an object reached twice
/// is elaborated once and its fragment is cloned for the second use.
pub struct Elaborator<'p> {
    platform: Option<&'p dyn Platform>,
    cache: HashMap<ObjectKey, Fragment>,
    active: HashSet<ObjectKey>,
    // Keeps elaborated objects alive so their addresses stay unique.
    retained: Vec<Rc<dyn Elaboratable>>,
}

impl<'p> Elaborator<'p> {
    /// Creates an elaborator targeting `platform`.
    pub fn new(platform: Option<&'p dyn Platform>) -> Self {
        Self {
            platform,
            cache: HashMap::new(),
            active: HashSet::new(),
            retained: Vec::new(),
        }
    }

    /// Elaborates `obj` and everything below it into a fragment.
    pub fn get_fragment(&mut self, db: &mut ValueDb, obj: &Rc<dyn Elaboratable>) -> Result<Fragment> {
        let key = key_of(obj);
        if let Some(fragment) = self.cache.get(&key) {
            log::debug!("reusing fragment of {}", obj.describe());
            return Ok(fragment.clone());
        }
        if !self.active.insert(key) {
            return Err(HdlError::ElaborationCycle {
                object: obj.describe(),
            });
        }
        log::debug!("elaborating {}", obj.describe());
        let result = self.elaborate_uncached(db, obj);
        self.active.remove(&key);
        let fragment = result?;
        self.cache.insert(key, fragment.clone());
        self.retained.push(Rc::clone(obj));
        Ok(fragment)
    }

    fn elaborate_uncached(&mut self, db: &mut ValueDb, obj: &Rc<dyn Elaboratable>) -> Result<Fragment> {
        match obj.elaborate(db, self.platform)? {
            Elaborated::Fragment(fragment) => Ok(fragment),
            Elaborated::Module(module) => module.into_fragment(db, self),
            Elaborated::Delegate(next) => {
                log::debug!("{} delegates to {}", obj.describe(), next.describe());
                self.get_fragment(db, &next)
            }
        }
    }
}

/// Elaborates `top` with a fresh [`Elaborator`].
pub fn elaborate(db: &mut ValueDb, top: &Rc<dyn Elaboratable>, platform: Option<&dyn Platform>) -> Result<Fragment> {
    Elaborator::new(platform).get_fragment(db, top)
}
