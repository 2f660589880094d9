//! The value database: storage for every node and array of a design.
//!
//! [`ValueDb`] owns the node and array arenas, the name interner, and the
//! sink collecting advisory diagnostics. Builder methods that create nodes
//! are spread over the modules that define their semantics (`ops`,
//! `signal`, `pattern`, `array`), each as an `impl ValueDb` block.

use crate::arena::Arena;
use crate::array::Array;
use crate::errors::{HdlError, Result};
use crate::ids::{ArrayId, ValueId};
use crate::value::{Lowerable, LoweringState, Node, Signal, UserValue, Value};
use strata_common::{Ident, Interner, Shape, SrcLoc};
use strata_diagnostics::{Diagnostic, DiagnosticSink};

/// Owner of all value nodes, arrays, and names of one design.
pub struct ValueDb {
    pub(crate) nodes: Arena<ValueId, Node>,
    pub(crate) arrays: Arena<ArrayId, Array>,
    interner: Interner,
    sink: DiagnosticSink,
}

impl ValueDb {
    /// Creates an empty database.
    pub fn new() -> Self {
        Self {
            nodes: Arena::new(),
            arrays: Arena::new(),
            interner: Interner::new(),
            sink: DiagnosticSink::new(),
        }
    }

    /// Interns a name.
    pub fn intern(&self, name: &str) -> Ident {
        self.interner.get_or_intern(name)
    }

    /// Resolves an interned name.
    pub fn name(&self, ident: Ident) -> &str {
        self.interner.resolve(ident)
    }

    /// The node stored under `id`.
    pub fn node(&self, id: ValueId) -> &Node {
        &self.nodes[id]
    }

    /// The expression stored under `id`.
    pub fn value(&self, id: ValueId) -> &Value {
        &self.nodes[id].value
    }

    /// Where the node `id` was built.
    pub fn loc(&self, id: ValueId) -> &SrcLoc {
        &self.nodes[id].loc
    }

    /// The signal payload if `id` is a signal.
    pub fn as_signal(&self, id: ValueId) -> Option<&Signal> {
        match &self.nodes[id].value {
            Value::Signal(signal) => Some(signal),
            _ => None,
        }
    }

    /// The name of the signal `id`, if it is one.
    pub fn signal_name(&self, id: ValueId) -> Option<&str> {
        self.as_signal(id).map(|s| self.name(s.name))
    }

    /// Number of nodes created so far.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Returns `true` if no node has been created.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Iterates over all signals in creation order.
    pub fn iter_signals(&self) -> impl Iterator<Item = (ValueId, &Signal)> {
        self.nodes.iter().filter_map(|(id, node)| match &node.value {
            Value::Signal(signal) => Some((id, signal)),
            _ => None,
        })
    }

    pub(crate) fn alloc(&mut self, value: Value, shape: Option<Shape>, loc: SrcLoc) -> ValueId {
        self.nodes.alloc(Node { value, loc, shape })
    }

    /// The shape of `id`, lowering a user value first if needed.
    ///
    /// Proxy shapes are computed on first request, since a proxy over
    /// arrays or records only becomes a value once indexed further.
    pub fn shape(&mut self, id: ValueId) -> Result<Shape> {
        if let Some(shape) = self.nodes[id].shape {
            return Ok(shape);
        }
        let shape = match self.nodes[id].value {
            Value::ArrayProxy { array, .. } => self.proxy_shape(array)?,
            _ => {
                let lowered = self.lower(id)?;
                self.shape(lowered)?
            }
        };
        self.nodes[id].shape = Some(shape);
        Ok(shape)
    }

    /// Shorthand for the width of [`shape`](Self::shape).
    pub fn width(&mut self, id: ValueId) -> Result<u32> {
        Ok(self.shape(id)?.width())
    }

    /// The shape of `id` if it is already known.
    ///
    /// User values that were never lowered and proxies whose shape was
    /// never requested have no known shape.
    pub fn known_shape(&self, id: ValueId) -> Option<Shape> {
        self.nodes[id].shape
    }

    /// Wraps a deferred computation as a value node.
    ///
    /// The computation runs on the first call to [`lower`](Self::lower) or
    /// [`shape`](Self::shape) and its result is memoized.
    #[track_caller]
    pub fn user_value(&mut self, lowerable: impl Lowerable + 'static) -> ValueId {
        let state = LoweringState::Pending(Box::new(lowerable));
        self.alloc(Value::User(UserValue { state }), None, SrcLoc::caller())
    }

    /// Resolves user values to the node they lower to; other nodes map to themselves.
    pub fn lower(&mut self, id: ValueId) -> Result<ValueId> {
        let Value::User(user) = &mut self.nodes[id].value else {
            return Ok(id);
        };
        let lowerable = match std::mem::replace(&mut user.state, LoweringState::InProgress) {
            LoweringState::Pending(lowerable) => lowerable,
            LoweringState::Done(lowered) => {
                user.state = LoweringState::Done(lowered);
                return Ok(lowered);
            }
            LoweringState::InProgress | LoweringState::Failed => {
                user.state = LoweringState::Failed;
                return Err(HdlError::LoweringFailed);
            }
        };
        log::debug!("lowering user value {}", id.as_raw());
        let lowered = lowerable.lower(self).and_then(|first| self.lower(first));
        let state = match &lowered {
            Ok(target) => LoweringState::Done(*target),
            Err(_) => LoweringState::Failed,
        };
        if let Value::User(user) = &mut self.nodes[id].value {
            user.state = state;
        }
        lowered
    }

    /// Records an advisory diagnostic and mirrors it to the log.
    pub(crate) fn warn(&self, diag: Diagnostic) {
        log::warn!("{}: {} ({})", diag.code, diag.message, diag.loc);
        self.sink.emit(diag);
    }

    /// A snapshot of the diagnostics emitted so far.
    pub fn diagnostics(&self) -> Vec<Diagnostic> {
        self.sink.diagnostics()
    }

    /// Drains the diagnostics emitted so far.
    pub fn take_diagnostics(&self) -> Vec<Diagnostic> {
        self.sink.take_all()
    }
}

impl Default for ValueDb {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use std::rc::Rc;

    #[test]
    fn user_value_lowers_once() {
        let mut db = ValueDb::new();
        let calls = Rc::new(Cell::new(0));
        let counter = Rc::clone(&calls);
        let uv = db.user_value(move |db: &mut ValueDb| -> Result<ValueId> {
            counter.set(counter.get() + 1);
            Ok(db.constant(1))
        });
        assert_eq!(db.shape(uv).unwrap(), Shape::unsigned(1));
        assert_eq!(db.shape(uv).unwrap(), Shape::unsigned(1));
        let a = db.lower(uv).unwrap();
        let b = db.lower(uv).unwrap();
        assert_eq!(a, b);
        assert_eq!(calls.get(), 1);
    }

    #[test]
    fn user_value_lowering_to_user_value_is_followed() {
        let mut db = ValueDb::new();
        let inner = db.user_value(|db: &mut ValueDb| -> Result<ValueId> { Ok(db.constant(10)) });
        let outer = db.user_value(move |_: &mut ValueDb| -> Result<ValueId> { Ok(inner) });
        let target = db.lower(outer).unwrap();
        assert!(matches!(db.value(target), Value::Const(_)));
        assert_eq!(db.shape(outer).unwrap(), Shape::unsigned(4));
    }

    #[test]
    fn failed_lowering_is_sticky() {
        let mut db = ValueDb::new();
        let uv = db.user_value(|_: &mut ValueDb| -> Result<ValueId> { Err(HdlError::ZeroSliceStep) });
        assert_eq!(db.lower(uv), Err(HdlError::ZeroSliceStep));
        assert_eq!(db.lower(uv), Err(HdlError::LoweringFailed));
    }

    #[test]
    fn non_user_values_lower_to_themselves() {
        let mut db = ValueDb::new();
        let c = db.constant(3);
        assert_eq!(db.lower(c).unwrap(), c);
        assert_eq!(db.known_shape(c), Some(Shape::unsigned(2)));
    }

    #[test]
    fn iter_signals_in_creation_order() {
        let mut db = ValueDb::new();
        let a = db.signal(1u32).name("a").build();
        db.constant(0);
        let b = db.signal(2u32).name("b").build();
        let ids: Vec<_> = db.iter_signals().map(|(id, _)| id).collect();
        assert_eq!(ids, vec![a, b]);
        assert_eq!(db.signal_name(b), Some("b"));
        assert_eq!(db.len(), 3);
    }
}
