//! S-expression rendering of values, arrays, and statements.
//!
//! The printed form is used in error messages and by tests; it is stable
//! but not a serialization format.

use crate::array::{ArrayState, Elem};
use crate::db::ValueDb;
use crate::ids::{ArrayId, ValueId};
use crate::stmt::Statement;
use crate::value::{Operator, Value};
use std::fmt::Write;

impl ValueDb {
    /// Renders the node `id`, e.g. `(+ (sig a) (const 1'd1))`.
    pub fn repr(&self, id: ValueId) -> String {
        let mut out = String::new();
        self.write_value(&mut out, id);
        out
    }

    /// Renders an array, e.g. `(array mutable [1, (sig a)])`.
    pub fn array_repr(&self, id: ArrayId) -> String {
        let mut out = String::new();
        self.write_array(&mut out, id);
        out
    }

    /// Renders an array element.
    pub fn elem_repr(&self, elem: &Elem) -> String {
        let mut out = String::new();
        self.write_elem(&mut out, elem);
        out
    }

    /// Renders a statement, e.g. `(eq (sig o) (sig i))`.
    pub fn stmt_repr(&self, stmt: &Statement) -> String {
        let mut out = String::new();
        self.write_stmt(&mut out, stmt);
        out
    }

    fn write_value(&self, out: &mut String, id: ValueId) {
        match self.value(id) {
            Value::Const(c) => {
                let sign = if c.shape().is_signed() { "s" } else { "" };
                let _ = write!(out, "(const {}'{sign}d{})", c.shape().width(), c.value());
            }
            Value::Signal(s) => {
                let _ = write!(out, "(sig {})", self.name(s.name));
            }
            Value::ClockSignal { domain } => {
                let _ = write!(out, "(clk {})", self.name(*domain));
            }
            Value::ResetSignal { domain, .. } => {
                let _ = write!(out, "(rst {})", self.name(*domain));
            }
            Value::Operator(op) => {
                let symbol = match op {
                    Operator::Unary(op, _) => op.symbol(),
                    Operator::Binary(op, _, _) => op.symbol(),
                };
                out.push('(');
                out.push_str(symbol);
                for operand in op.operands() {
                    out.push(' ');
                    self.write_value(out, operand);
                }
                out.push(')');
            }
            Value::Slice { value, start, end } => {
                out.push_str("(slice ");
                self.write_value(out, *value);
                let _ = write!(out, " {start}:{end})");
            }
            Value::Part {
                value,
                offset,
                width,
                stride,
            } => {
                out.push_str("(part ");
                self.write_value(out, *value);
                out.push(' ');
                self.write_value(out, *offset);
                let _ = write!(out, " {width} {stride})");
            }
            Value::Cat(parts) => {
                out.push_str("(cat");
                for part in parts {
                    out.push(' ');
                    self.write_value(out, *part);
                }
                out.push(')');
            }
            Value::Repl { value, count } => {
                out.push_str("(repl ");
                self.write_value(out, *value);
                let _ = write!(out, " {count})");
            }
            Value::ArrayProxy { array, index } => {
                out.push_str("(proxy ");
                self.write_array(out, *array);
                out.push(' ');
                self.write_value(out, *index);
                out.push(')');
            }
            Value::Mux {
                sel,
                then,
                otherwise,
            } => {
                out.push_str("(m");
                for v in [sel, then, otherwise] {
                    out.push(' ');
                    self.write_value(out, *v);
                }
                out.push(')');
            }
            Value::Sample {
                value,
                clocks,
                domain,
            } => {
                out.push_str("(sample ");
                self.write_value(out, *value);
                let domain = domain.map_or("<default>", |d| self.name(d));
                let _ = write!(out, " @ {domain}[{clocks}])");
            }
            Value::Initial => out.push_str("(initial)"),
            Value::User(user) => match user.lowered() {
                Some(lowered) => self.write_value(out, lowered),
                None => out.push_str("(user)"),
            },
        }
    }

    fn write_array(&self, out: &mut String, id: ArrayId) {
        let array = self.array_ref(id);
        out.push_str("(array ");
        if let ArrayState::Mutable = array.state() {
            out.push_str("mutable ");
        }
        out.push('[');
        for (i, elem) in array.elems().iter().enumerate() {
            if i > 0 {
                out.push_str(", ");
            }
            self.write_elem(out, elem);
        }
        out.push_str("])");
    }

    fn write_elem(&self, out: &mut String, elem: &Elem) {
        match elem {
            Elem::Int(n) => {
                let _ = write!(out, "{n}");
            }
            Elem::Value(v) => self.write_value(out, *v),
            Elem::Array(a) => self.write_array(out, *a),
            Elem::Record(fields) => {
                out.push_str("(rec");
                for (name, field) in fields {
                    let _ = write!(out, " {name}=");
                    self.write_elem(out, field);
                }
                out.push(')');
            }
        }
    }

    fn write_stmt(&self, out: &mut String, stmt: &Statement) {
        match stmt {
            Statement::Assign { lhs, rhs, .. } => {
                out.push_str("(eq ");
                self.write_value(out, *lhs);
                out.push(' ');
                self.write_value(out, *rhs);
                out.push(')');
            }
            Statement::Switch { test, cases, .. } => {
                out.push_str("(switch ");
                self.write_value(out, *test);
                for case in cases {
                    if case.patterns.is_empty() {
                        out.push_str(" (default");
                    } else {
                        out.push_str(" (case");
                        for pattern in &case.patterns {
                            out.push(' ');
                            out.push_str(pattern);
                        }
                    }
                    for body in &case.body {
                        out.push(' ');
                        self.write_stmt(out, body);
                    }
                    out.push(')');
                }
                out.push(')');
            }
        }
    }
}
