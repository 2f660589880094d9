//! Arrays of values and the proxies produced by indexing them dynamically.
//!
//! An [`Array`] starts out mutable. The first time it is indexed with a
//! value it freezes: the proxy returned by [`ValueDb::array_index`] refers
//! to the elements as they were at that point, so later mutation is
//! rejected with [`HdlError::Frozen`]. Static reads never freeze.

use crate::db::ValueDb;
use crate::errors::{HdlError, Result};
use crate::ids::{ArrayId, ValueId};
use crate::value::Value;
use num_bigint::BigInt;
use std::collections::BTreeMap;
use strata_common::{Shape, SrcLoc};

/// One element of an [`Array`].
#[derive(Clone, Debug, PartialEq)]
pub enum Elem {
    /// An integer, viewed as a minimal-width constant.
    Int(BigInt),
    /// A value node.
    Value(ValueId),
    /// A nested array.
    Array(ArrayId),
    /// A record of named fields.
    Record(BTreeMap<String, Elem>),
}

impl From<ValueId> for Elem {
    fn from(id: ValueId) -> Self {
        Elem::Value(id)
    }
}

impl From<ArrayId> for Elem {
    fn from(id: ArrayId) -> Self {
        Elem::Array(id)
    }
}

impl From<i64> for Elem {
    fn from(n: i64) -> Self {
        Elem::Int(BigInt::from(n))
    }
}

impl From<i32> for Elem {
    fn from(n: i32) -> Self {
        Elem::Int(BigInt::from(n))
    }
}

impl From<BTreeMap<String, Elem>> for Elem {
    fn from(fields: BTreeMap<String, Elem>) -> Self {
        Elem::Record(fields)
    }
}

/// Whether an array may still be mutated.
#[derive(Clone, Debug, PartialEq)]
pub enum ArrayState {
    /// Never indexed with a value.
    Mutable,
    /// Indexed with a value; the first such read is recorded.
    Frozen {
        /// The index value of the freezing read.
        by: ValueId,
        /// Where the freezing read happened.
        at: SrcLoc,
    },
}

/// An ordered sequence of elements, stored in a [`ValueDb`].
#[derive(Clone, Debug)]
pub struct Array {
    elems: Vec<Elem>,
    state: ArrayState,
}

impl Array {
    /// The elements in order.
    pub fn elems(&self) -> &[Elem] {
        &self.elems
    }

    /// The mutability state.
    pub fn state(&self) -> &ArrayState {
        &self.state
    }

    /// Returns `true` once the array has been indexed with a value.
    pub fn is_frozen(&self) -> bool {
        matches!(self.state, ArrayState::Frozen { .. })
    }
}

fn resolve_index(index: i64, len: usize) -> Result<usize> {
    let signed_len = len as i64;
    let resolved = if index < 0 { index + signed_len } else { index };
    if resolved < 0 || resolved >= signed_len {
        return Err(HdlError::ArrayIndexOutOfRange { index, len });
    }
    Ok(resolved as usize)
}

impl ValueDb {
    /// Creates a mutable array.
    pub fn array<I, E>(&mut self, elems: I) -> ArrayId
    where
        I: IntoIterator<Item = E>,
        E: Into<Elem>,
    {
        self.arrays.alloc(Array {
            elems: elems.into_iter().map(Into::into).collect(),
            state: ArrayState::Mutable,
        })
    }

    /// The array stored under `id`.
    pub fn array_ref(&self, id: ArrayId) -> &Array {
        &self.arrays[id]
    }

    /// The elements of `id` in order.
    pub fn array_elems(&self, id: ArrayId) -> &[Elem] {
        &self.arrays[id].elems
    }

    /// Number of elements in `id`.
    pub fn array_len(&self, id: ArrayId) -> usize {
        self.arrays[id].elems.len()
    }

    /// The element at a static index; negative indices count from the end.
    pub fn array_get(&self, id: ArrayId, index: i64) -> Result<Elem> {
        let array = &self.arrays[id];
        let index = resolve_index(index, array.elems.len())?;
        Ok(array.elems[index].clone())
    }

    fn mutable_array(&mut self, id: ArrayId) -> Result<&mut Array> {
        let array = &mut self.arrays[id];
        match &array.state {
            ArrayState::Mutable => Ok(array),
            ArrayState::Frozen { at, .. } => Err(HdlError::Frozen { at: at.clone() }),
        }
    }

    /// Replaces the element at a static index.
    pub fn array_set(&mut self, id: ArrayId, index: i64, elem: impl Into<Elem>) -> Result<()> {
        let array = self.mutable_array(id)?;
        let index = resolve_index(index, array.elems.len())?;
        array.elems[index] = elem.into();
        Ok(())
    }

    /// Removes and returns the element at a static index.
    pub fn array_remove(&mut self, id: ArrayId, index: i64) -> Result<Elem> {
        let array = self.mutable_array(id)?;
        let index = resolve_index(index, array.elems.len())?;
        Ok(array.elems.remove(index))
    }

    /// Inserts an element before `index`, clamping out-of-range positions to the ends.
    pub fn array_insert(&mut self, id: ArrayId, index: i64, elem: impl Into<Elem>) -> Result<()> {
        let array = self.mutable_array(id)?;
        let len = array.elems.len() as i64;
        let index = if index < 0 { (index + len).max(0) } else { index.min(len) };
        array.elems.insert(index as usize, elem.into());
        Ok(())
    }

    /// Appends an element.
    pub fn array_push(&mut self, id: ArrayId, elem: impl Into<Elem>) -> Result<()> {
        self.mutable_array(id)?.elems.push(elem.into());
        Ok(())
    }

    /// Indexes `id` with a value, freezing the array.
    ///
    /// The returned proxy behaves like the selected element. Repeated
    /// dynamic reads keep the location of the first one.
    #[track_caller]
    pub fn array_index(&mut self, id: ArrayId, index: ValueId) -> Result<ValueId> {
        let loc = SrcLoc::caller();
        self.shape(index)?;
        let array = &mut self.arrays[id];
        if let ArrayState::Mutable = array.state {
            log::debug!("array {} frozen at {loc}", id.as_raw());
            array.state = ArrayState::Frozen {
                by: index,
                at: loc.clone(),
            };
        }
        Ok(self.alloc(Value::ArrayProxy { array: id, index }, None, loc))
    }

    fn proxy_parts(&self, proxy: ValueId) -> Result<(ArrayId, ValueId)> {
        match *self.value(proxy) {
            Value::ArrayProxy { array, index } => Ok((array, index)),
            _ => Err(HdlError::NotIndexable { repr: self.repr(proxy) }),
        }
    }

    fn derived_proxy(&mut self, elems: Vec<Elem>, index: ValueId, loc: SrcLoc) -> ValueId {
        let array = self.arrays.alloc(Array {
            elems,
            state: ArrayState::Frozen {
                by: index,
                at: loc.clone(),
            },
        });
        self.alloc(Value::ArrayProxy { array, index }, None, loc)
    }

    /// Indexes every element of a proxy with `index`.
    ///
    /// Each element must be an array, or a proxy over arrays. The result is
    /// a proxy with the same outer index over the per-element selections.
    #[track_caller]
    pub fn proxy_index(&mut self, proxy: ValueId, index: ValueId) -> Result<ValueId> {
        let loc = SrcLoc::caller();
        let (array, outer) = self.proxy_parts(proxy)?;
        let mut selected = Vec::new();
        for elem in self.arrays[array].elems.clone() {
            let inner = match elem {
                Elem::Array(inner) => self.array_index(inner, index)?,
                Elem::Value(v) if matches!(self.value(v), Value::ArrayProxy { .. }) => {
                    self.proxy_index(v, index)?
                }
                other => {
                    return Err(HdlError::NotIndexable {
                        repr: self.elem_repr(&other),
                    })
                }
            };
            selected.push(Elem::Value(inner));
        }
        Ok(self.derived_proxy(selected, outer, loc))
    }

    /// Selects record field `name` from every element of a proxy.
    #[track_caller]
    pub fn proxy_field(&mut self, proxy: ValueId, name: &str) -> Result<ValueId> {
        let loc = SrcLoc::caller();
        let (array, outer) = self.proxy_parts(proxy)?;
        let mut selected = Vec::new();
        for elem in self.arrays[array].elems.clone() {
            let field = match &elem {
                Elem::Record(fields) => fields.get(name).cloned(),
                Elem::Value(v) if matches!(self.value(*v), Value::ArrayProxy { .. }) => {
                    Some(Elem::Value(self.proxy_field(*v, name)?))
                }
                _ => None,
            };
            let field = field.ok_or_else(|| HdlError::UnknownField {
                repr: self.elem_repr(&elem),
                field: name.to_string(),
            })?;
            selected.push(field);
        }
        Ok(self.derived_proxy(selected, outer, loc))
    }

    /// Views an element as a value node; integers become constants.
    #[track_caller]
    pub fn elem_value(&mut self, elem: &Elem) -> Result<ValueId> {
        match elem {
            Elem::Int(n) => Ok(self.constant(n.clone())),
            Elem::Value(v) => Ok(*v),
            other => Err(HdlError::NotAValue {
                repr: self.elem_repr(other),
            }),
        }
    }

    /// Shape of a proxy over `array`: wide enough for every element.
    pub(crate) fn proxy_shape(&mut self, array: ArrayId) -> Result<Shape> {
        let mut shapes = Vec::new();
        for elem in self.arrays[array].elems.clone() {
            let shape = match &elem {
                Elem::Int(n) => Shape::for_int(n),
                Elem::Value(v) => self.shape(*v)?,
                other => {
                    return Err(HdlError::NotAValue {
                        repr: self.elem_repr(other),
                    })
                }
            };
            shapes.push(shape);
        }
        Ok(crate::infer::proxy(shapes))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::ErrorKind;

    #[test]
    fn static_access_does_not_freeze() {
        let mut db = ValueDb::new();
        let a = db.array([1, 2, 3]);
        assert_eq!(db.array_get(a, 0).unwrap(), Elem::from(1));
        assert_eq!(db.array_get(a, -1).unwrap(), Elem::from(3));
        db.array_set(a, 1, 5).unwrap();
        assert_eq!(db.array_get(a, 1).unwrap(), Elem::from(5));
        assert!(!db.array_ref(a).is_frozen());
        let err = db.array_get(a, 3).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Range);
    }

    #[test]
    fn mutation_before_freeze() {
        let mut db = ValueDb::new();
        let a = db.array([1, 2, 3]);
        db.array_push(a, 4).unwrap();
        db.array_insert(a, 0, 0).unwrap();
        db.array_insert(a, 100, 9).unwrap();
        assert_eq!(db.array_remove(a, -1).unwrap(), Elem::from(9));
        assert_eq!(db.array_len(a), 5);
        assert_eq!(db.array_get(a, 0).unwrap(), Elem::from(0));
    }

    #[test]
    fn dynamic_index_freezes() {
        let mut db = ValueDb::new();
        let a = db.array([1, 2, 3]);
        let s = db.signal(2u32).build();
        db.array_index(a, s).unwrap();
        assert!(db.array_ref(a).is_frozen());
        let ArrayState::Frozen { by, at } = db.array_ref(a).state().clone() else {
            panic!("not frozen");
        };
        assert_eq!(by, s);

        for err in [
            db.array_set(a, 0, 1).unwrap_err(),
            db.array_push(a, 1).unwrap_err(),
            db.array_insert(a, 0, 1).unwrap_err(),
            db.array_remove(a, 0).unwrap_err(),
        ] {
            assert_eq!(err, HdlError::Frozen { at: at.clone() });
            assert_eq!(err.kind(), ErrorKind::Frozen);
        }
        assert!(db.array_get(a, 0).is_ok());
    }

    #[test]
    fn refreeze_keeps_first_location() {
        let mut db = ValueDb::new();
        let a = db.array([1, 2]);
        let s = db.signal(1u32).build();
        let t = db.signal(1u32).build();
        db.array_index(a, s).unwrap();
        let first = db.array_ref(a).state().clone();
        db.array_index(a, t).unwrap();
        assert_eq!(db.array_ref(a).state(), &first);
    }

    #[test]
    fn proxy_shape_rules() {
        let mut db = ValueDb::new();
        let a = db.signal(1u32).build();
        let b = db.signal(Shape::signed(5)).build();
        let c = db.signal(Shape::signed(2)).build();
        let arr = db.array([a, b, c]);
        let i = db.signal(2u32).build();
        let p = db.array_index(arr, i).unwrap();
        assert_eq!(db.shape(p).unwrap(), Shape::signed(6));

        let ints = db.array([1, 10, 3]);
        let q = db.array_index(ints, i).unwrap();
        assert_eq!(db.shape(q).unwrap(), Shape::unsigned(4));
    }

    #[test]
    fn nested_proxy_indexing() {
        let mut db = ValueDb::new();
        let row0 = db.array([1, 2, 3]);
        let row1 = db.array([4, 5, 6]);
        let grid = db.array([row0, row1]);
        let x = db.signal(1u32).name("x").build();
        let y = db.signal(2u32).name("y").build();
        let rows = db.array_index(grid, x).unwrap();
        let cell = db.proxy_index(rows, y).unwrap();
        assert!(db.array_ref(row0).is_frozen());
        assert!(db.array_ref(row1).is_frozen());
        assert_eq!(db.shape(cell).unwrap(), Shape::unsigned(3));
        let Value::ArrayProxy { index, .. } = *db.value(cell) else {
            panic!("not a proxy");
        };
        assert_eq!(index, x);
    }

    #[test]
    fn proxy_of_arrays_is_not_a_value() {
        let mut db = ValueDb::new();
        let inner = db.array([1]);
        let outer = db.array([inner]);
        let i = db.signal(1u32).build();
        let p = db.array_index(outer, i).unwrap();
        assert_eq!(db.shape(p).unwrap_err().kind(), ErrorKind::Type);
    }

    #[test]
    fn record_fields() {
        let mut db = ValueDb::new();
        let a = db.signal(4u32).name("a").build();
        let b = db.signal(8u32).name("b").build();
        let r0: BTreeMap<String, Elem> = [("f".to_string(), Elem::from(a))].into_iter().collect();
        let r1: BTreeMap<String, Elem> = [("f".to_string(), Elem::from(b))].into_iter().collect();
        let arr = db.array([r0, r1]);
        let i = db.signal(1u32).build();
        let p = db.array_index(arr, i).unwrap();
        let f = db.proxy_field(p, "f").unwrap();
        assert_eq!(db.shape(f).unwrap(), Shape::unsigned(8));
        let err = db.proxy_field(p, "g").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Type);
    }

    #[test]
    fn indexing_plain_values_is_rejected() {
        let mut db = ValueDb::new();
        let s = db.signal(4u32).build();
        let arr = db.array([s]);
        let i = db.signal(1u32).build();
        let p = db.array_index(arr, i).unwrap();
        assert_eq!(db.proxy_index(p, i).unwrap_err().kind(), ErrorKind::Type);
    }

    #[test]
    fn elem_values() {
        let mut db = ValueDb::new();
        let c = db.elem_value(&Elem::from(10)).unwrap();
        assert_eq!(db.shape(c).unwrap(), Shape::unsigned(4));
        let arr = db.array(Vec::<Elem>::new());
        assert!(db.elem_value(&Elem::Array(arr)).is_err());
    }
}
