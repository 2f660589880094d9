//! End-to-end behaviour of the value algebra, arrays, and elaboration.
//!
//! Each test builds a small design through the public API and checks the
//! resulting shapes, nodes, diagnostics, or port map.

use std::rc::Rc;
use strata_diagnostics::{DiagnosticCode, DiagnosticRenderer, TerminalRenderer};
use strata_hdl::{
    elaborate, prepare, Elaboratable, Elaborated, ErrorKind, Instance, Module, Platform, PortDirection, Result,
    Shape, Value, ValueDb, ValueId,
};

#[test]
fn unsigned_addition_widens_by_one() {
    let mut db = ValueDb::new();
    let a = db.signal(3u32).build();
    let b = db.signal(7u32).build();
    let sum = db.add(a, b).unwrap();
    assert_eq!(db.shape(sum).unwrap(), Shape::unsigned(8));
}

#[test]
fn mixed_sign_addition_is_symmetric() {
    let mut db = ValueDb::new();
    let u = db.signal(4u32).build();
    let s = db.signal(Shape::signed(4)).build();
    let us = db.add(u, s).unwrap();
    let su = db.add(s, u).unwrap();
    assert_eq!(db.shape(us).unwrap(), Shape::signed(6));
    assert_eq!(db.shape(su).unwrap(), Shape::signed(6));
}

#[test]
fn constant_bit_indexing() {
    let mut db = ValueDb::new();
    let c = db.constant(10);
    for index in [0, -1] {
        let bit = db.bit(c, index).unwrap();
        match db.value(bit) {
            Value::Slice { start, end, .. } => assert_eq!(end - start, 1),
            other => panic!("expected a slice, got {}", other.kind_name()),
        }
    }
    let err = db.bit(c, 5).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Range);
    assert_eq!(err.to_string(), "Cannot index 5 bits into 4-bit value");
}

#[test]
fn concatenation_shapes() {
    let mut db = ValueDb::new();
    let empty = db.cat(Vec::<ValueId>::new()).unwrap();
    assert_eq!(db.shape(empty).unwrap(), Shape::unsigned(0));
    let ten = db.constant(10);
    let one = db.constant(1);
    let both = db.cat([ten, one]).unwrap();
    assert_eq!(db.shape(both).unwrap(), Shape::unsigned(5));
}

#[test]
fn mux_of_mixed_sign_arms() {
    let mut db = ValueDb::new();
    let sel = db.signal(1u32).build();
    let signed = db.constant_with(0, Shape::signed(4));
    let unsigned = db.constant_with(0, Shape::unsigned(4));
    let m = db.mux(sel, signed, unsigned).unwrap();
    assert_eq!(db.shape(m).unwrap(), Shape::signed(5));
}

#[test]
fn pattern_matching() {
    let mut db = ValueDb::new();
    let s = db.signal(4u32).name("s").build();

    let matched = db.matches(s, ["10--"]).unwrap();
    let mask = db.constant_with(0b1100, 4u32);
    let bits = db.constant_with(0b1000, 4u32);
    let masked = db.and(s, mask).unwrap();
    let expected = db.eq(masked, bits).unwrap();
    assert_eq!(db.repr(matched), db.repr(expected));

    db.matches(s, [0b10110]).unwrap();
    let diags = db.take_diagnostics();
    assert_eq!(diags.len(), 1);
    assert_eq!(diags[0].code, DiagnosticCode::PatternNeverTrue);
    let rendered = TerminalRenderer::new(false).render(&diags[0]);
    assert!(rendered.starts_with("warning[W302]: Match pattern '10110' is wider than match value (which has width 4)"));

    assert_eq!(db.matches(s, ["abc"]).unwrap_err().kind(), ErrorKind::Type);
    assert_eq!(db.matches(s, ["--"]).unwrap_err().kind(), ErrorKind::Range);
}

#[test]
fn dynamic_read_freezes_array() {
    let mut db = ValueDb::new();
    let arr = db.array([1, 2, 3]);
    let first = db.signal(2u32).build();
    let second = db.signal(2u32).build();
    db.array_index(arr, first).unwrap();

    assert_eq!(db.array_set(arr, 0, 5).unwrap_err().kind(), ErrorKind::Frozen);
    assert_eq!(db.array_remove(arr, 0).unwrap_err().kind(), ErrorKind::Frozen);
    assert_eq!(db.array_insert(arr, 0, 5).unwrap_err().kind(), ErrorKind::Frozen);
    assert_eq!(db.array_push(arr, 5).unwrap_err().kind(), ErrorKind::Frozen);

    let proxy = db.array_index(arr, second).unwrap();
    assert_eq!(db.shape(proxy).unwrap(), Shape::unsigned(2));
    assert_eq!(db.array_len(arr), 3);
}

#[test]
fn clock_and_reset_domains() {
    let mut db = ValueDb::new();
    assert_eq!(db.clock_signal("comb").unwrap_err().kind(), ErrorKind::Domain);
    assert_eq!(db.reset_signal("comb", false).unwrap_err().kind(), ErrorKind::Domain);

    let clk = db.clock_signal("pix").unwrap();
    assert_eq!(db.shape(clk).unwrap(), Shape::unsigned(1));
    match db.value(clk) {
        Value::ClockSignal { domain } => assert_eq!(db.name(*domain), "pix"),
        other => panic!("expected a clock, got {}", other.kind_name()),
    }
}

struct Passthrough {
    x: ValueId,
    y: ValueId,
}

impl Elaboratable for Passthrough {
    fn elaborate(&self, db: &mut ValueDb, _platform: Option<&dyn Platform>) -> Result<Elaborated> {
        let mut m = Module::new();
        m.comb(db.assign(self.x, self.y)?);
        Ok(Elaborated::Module(m))
    }
}

#[test]
fn written_signals_become_outputs_and_read_signals_inputs() {
    let mut db = ValueDb::new();
    let x = db.signal(8u32).name("x").build();
    let y = db.signal(8u32).name("y").build();
    let top: Rc<dyn Elaboratable> = Rc::new(Passthrough { x, y });

    let fragment = elaborate(&mut db, &top, None).unwrap();
    let prepared = prepare(&mut db, fragment, &[x, y]).unwrap();
    assert_eq!(
        prepared.ports(),
        vec![(x, PortDirection::Output), (y, PortDirection::Input)]
    );
}

#[test]
fn user_value_is_computed_once() {
    use std::cell::Cell;

    let mut db = ValueDb::new();
    let calls = Rc::new(Cell::new(0u32));
    let seen = Rc::clone(&calls);
    let base = db.signal(4u32).build();
    let uv = db.user_value(move |db: &mut ValueDb| -> Result<ValueId> {
        seen.set(seen.get() + 1);
        db.add(base, 1)
    });

    assert_eq!(db.shape(uv).unwrap(), Shape::unsigned(5));
    assert_eq!(db.width(uv).unwrap(), 5);
    let first = db.lower(uv).unwrap();
    assert_eq!(db.lower(uv).unwrap(), first);
    let doubled = db.add(uv, uv).unwrap();
    assert_eq!(db.shape(doubled).unwrap(), Shape::unsigned(6));
    assert_eq!(calls.get(), 1);
}

#[test]
fn sync_counter_prepares_with_clock_and_reset() {
    let mut db = ValueDb::new();
    let count = db.signal(4u32).name("count").reset(3).build();
    let next = db.add(count, 1).unwrap();
    let truncated = db.slice(next, 0, 4).unwrap();
    let mut m = Module::new();
    m.sync(db.assign(count, truncated).unwrap());
    let top: Rc<dyn Elaboratable> = Rc::new(m);

    let fragment = elaborate(&mut db, &top, None).unwrap();
    let prepared = prepare(&mut db, fragment, &[count]).unwrap();
    let sync = prepared.domain(&db, "sync").unwrap().clone();
    assert_eq!(
        prepared.ports(),
        vec![
            (count, PortDirection::InOut),
            (sync.clk, PortDirection::Input),
            (sync.rst, PortDirection::Input),
        ]
    );
    assert!(db.diagnostics().is_empty());
}

#[test]
fn submodule_instance_bound_through_user_value() {
    let mut db = ValueDb::new();
    let q = db.signal(1u32).name("q").build();
    let d = db.signal(1u32).name("d").build();
    let lazy_q = db.user_value(move |_: &mut ValueDb| -> Result<ValueId> { Ok(q) });
    let lazy_clk = db.user_value(|db: &mut ValueDb| db.clock_signal("core"));

    let mut flop = Module::new();
    flop.instance(
        Instance::new("DFF")
            .input("C", lazy_clk)
            .input("D", d)
            .output("Q", lazy_q),
    );
    let mut top = Module::new();
    top.submodule(Rc::new(flop));
    let top: Rc<dyn Elaboratable> = Rc::new(top);

    let fragment = elaborate(&mut db, &top, None).unwrap();
    let prepared = prepare(&mut db, fragment, &[q, d]).unwrap();
    let core = prepared.domain(&db, "core").unwrap().clone();
    assert_eq!(db.signal_name(core.clk), Some("core_clk"));
    assert_eq!(
        prepared.ports(),
        vec![
            (q, PortDirection::Output),
            (d, PortDirection::Input),
            (core.clk, PortDirection::Input),
            (core.rst, PortDirection::Input),
        ]
    );
}
