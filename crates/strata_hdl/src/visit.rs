//! Traversals over value graphs.
//!
//! Walks follow operator operands, array proxy elements, and the lowering
//! of user values that were already lowered. Each node is visited once.

use crate::array::Elem;
use crate::db::ValueDb;
use crate::ids::{ArrayId, ValueId};
use crate::value::Value;
use std::collections::{BTreeSet, HashSet};

/// Calls `f` on every node reachable from `root`, `root` included.
pub fn walk(db: &ValueDb, root: ValueId, f: &mut impl FnMut(ValueId, &Value)) {
    let mut seen = HashSet::new();
    let mut stack = vec![root];
    while let Some(id) = stack.pop() {
        if !seen.insert(id) {
            continue;
        }
        let value = db.value(id);
        f(id, value);
        stack.extend(value.children());
        if let Value::ArrayProxy { array, .. } = value {
            push_array_values(db, *array, &mut stack);
        }
    }
}

fn push_array_values(db: &ValueDb, array: ArrayId, stack: &mut Vec<ValueId>) {
    for elem in db.array_elems(array) {
        push_elem_values(db, elem, stack);
    }
}

fn push_elem_values(db: &ValueDb, elem: &Elem, stack: &mut Vec<ValueId>) {
    match elem {
        Elem::Int(_) => {}
        Elem::Value(v) => stack.push(*v),
        Elem::Array(a) => push_array_values(db, *a, stack),
        Elem::Record(fields) => {
            for field in fields.values() {
                push_elem_values(db, field, stack);
            }
        }
    }
}

/// Adds every signal reachable from `root` to `out`.
pub fn read_signals(db: &ValueDb, root: ValueId, out: &mut BTreeSet<ValueId>) {
    walk(db, root, &mut |id, value| {
        if let Value::Signal(_) = value {
            out.insert(id);
        }
    });
}

/// Adds the signals an assignment to `lhs` writes.
pub fn assigned_signals(db: &ValueDb, lhs: ValueId, out: &mut BTreeSet<ValueId>) {
    match db.value(lhs) {
        Value::Signal(_) => {
            out.insert(lhs);
        }
        Value::Slice { value, .. } | Value::Part { value, .. } => assigned_signals(db, *value, out),
        Value::Cat(parts) => {
            for part in parts {
                assigned_signals(db, *part, out);
            }
        }
        Value::ArrayProxy { array, .. } => {
            let mut targets = Vec::new();
            push_array_values(db, *array, &mut targets);
            for target in targets {
                assigned_signals(db, target, out);
            }
        }
        Value::User(user) => {
            if let Some(lowered) = user.lowered() {
                assigned_signals(db, lowered, out);
            }
        }
        _ => {}
    }
}

/// Adds the signals an assignment to `lhs` reads: part offsets and proxy indices.
pub fn lhs_read_signals(db: &ValueDb, lhs: ValueId, out: &mut BTreeSet<ValueId>) {
    match db.value(lhs) {
        Value::Slice { value, .. } => lhs_read_signals(db, *value, out),
        Value::Part { value, offset, .. } => {
            read_signals(db, *offset, out);
            lhs_read_signals(db, *value, out);
        }
        Value::Cat(parts) => {
            for part in parts {
                lhs_read_signals(db, *part, out);
            }
        }
        Value::ArrayProxy { array, index } => {
            read_signals(db, *index, out);
            let mut targets = Vec::new();
            push_array_values(db, *array, &mut targets);
            for target in targets {
                lhs_read_signals(db, target, out);
            }
        }
        Value::User(user) => {
            if let Some(lowered) = user.lowered() {
                lhs_read_signals(db, lowered, out);
            }
        }
        _ => {}
    }
}
