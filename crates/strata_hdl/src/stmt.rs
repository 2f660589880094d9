//! Assignments and switches: the statements placed in fragment domains.

use crate::array::Elem;
use crate::db::ValueDb;
use crate::errors::{HdlError, Result};
use crate::ids::ValueId;
use crate::pattern::{self, Pattern};
use crate::value::{Operand, Value};
use crate::visit;
use std::collections::BTreeSet;
use strata_common::SrcLoc;

/// One arm of a [`Statement::Switch`].
#[derive(Clone, Debug, PartialEq)]
pub struct SwitchCase {
    /// Bit-string patterns as wide as the switch test; empty for the default arm.
    pub patterns: Vec<String>,
    /// Statements executed when the arm is taken.
    pub body: Vec<Statement>,
}

impl SwitchCase {
    /// Returns `true` for the catch-all arm.
    pub fn is_default(&self) -> bool {
        self.patterns.is_empty()
    }
}

/// A behavioral statement.
#[derive(Clone, Debug, PartialEq)]
pub enum Statement {
    /// `lhs = rhs`, truncating or extending `rhs` to the width of `lhs`.
    Assign {
        /// The assigned value.
        lhs: ValueId,
        /// The assigned expression.
        rhs: ValueId,
        /// Where the assignment was built.
        loc: SrcLoc,
    },
    /// The first arm whose patterns match `test` is executed.
    Switch {
        /// The value switched on.
        test: ValueId,
        /// Arms in priority order.
        cases: Vec<SwitchCase>,
        /// Where the switch was built.
        loc: SrcLoc,
    },
}

impl Statement {
    /// Where the statement was built.
    pub fn loc(&self) -> &SrcLoc {
        match self {
            Statement::Assign { loc, .. } | Statement::Switch { loc, .. } => loc,
        }
    }
}

impl ValueDb {
    /// Builds `lhs = rhs`.
    ///
    /// `lhs` must be assignable: a signal, a domain clock or reset, or a
    /// slice, part, concatenation, or proxy built only from assignable values.
    #[track_caller]
    pub fn assign(&mut self, lhs: ValueId, rhs: impl Into<Operand>) -> Result<Statement> {
        let loc = SrcLoc::caller();
        let lhs = self.lower(lhs)?;
        if !self.is_assignable(lhs)? {
            return Err(HdlError::NotAssignable { repr: self.repr(lhs) });
        }
        let rhs = self.operand(rhs);
        self.shape(rhs)?;
        Ok(Statement::Assign { lhs, rhs, loc })
    }

    fn is_assignable(&mut self, id: ValueId) -> Result<bool> {
        let id = self.lower(id)?;
        let assignable = match self.value(id) {
            Value::Signal(_) | Value::ClockSignal { .. } | Value::ResetSignal { .. } => true,
            Value::Slice { value, .. } | Value::Part { value, .. } => {
                let value = *value;
                self.is_assignable(value)?
            }
            Value::Cat(parts) => {
                for part in parts.clone() {
                    if !self.is_assignable(part)? {
                        return Ok(false);
                    }
                }
                true
            }
            Value::ArrayProxy { array, .. } => {
                for elem in self.array_elems(*array).to_vec() {
                    let ok = match elem {
                        Elem::Value(v) => self.is_assignable(v)?,
                        _ => false,
                    };
                    if !ok {
                        return Ok(false);
                    }
                }
                true
            }
            _ => false,
        };
        Ok(assignable)
    }

    /// Builds a switch over `test`.
    ///
    /// Each case lists its patterns; an empty list marks the default arm.
    /// Patterns are validated like [`matches`](Self::matches) patterns. A
    /// case whose patterns were all dropped as never matching is omitted.
    #[track_caller]
    pub fn switch(&mut self, test: impl Into<Operand>, cases: Vec<(Vec<Pattern>, Vec<Statement>)>) -> Result<Statement> {
        let loc = SrcLoc::caller();
        let test = self.operand(test);
        let width = self.width(test)?;
        let mut normalized = Vec::with_capacity(cases.len());
        for (patterns, body) in cases {
            let is_default = patterns.is_empty();
            let mut bits = Vec::with_capacity(patterns.len());
            for p in &patterns {
                if let Some(n) = pattern::normalize(self, p, width, &loc)? {
                    bits.push(n.to_bits(width));
                }
            }
            if !is_default && bits.is_empty() {
                log::debug!("dropping switch case that can never match");
                continue;
            }
            normalized.push(SwitchCase { patterns: bits, body });
        }
        Ok(Statement::Switch {
            test,
            cases: normalized,
            loc,
        })
    }

    /// Builds `if cond { then } else { otherwise }` as a switch on a 1-bit test.
    #[track_caller]
    pub fn if_else(&mut self, cond: impl Into<Operand>, then: Vec<Statement>, otherwise: Vec<Statement>) -> Result<Statement> {
        let loc = SrcLoc::caller();
        let mut cond = self.operand(cond);
        if self.width(cond)? != 1 {
            cond = self.as_bool(cond)?;
        }
        let mut cases = vec![SwitchCase {
            patterns: vec!["1".to_string()],
            body: then,
        }];
        if !otherwise.is_empty() {
            cases.push(SwitchCase {
                patterns: Vec::new(),
                body: otherwise,
            });
        }
        Ok(Statement::Switch { test: cond, cases, loc })
    }

    /// Signals written by `stmt`, including inside switch arms.
    pub fn lhs_signals(&self, stmt: &Statement) -> BTreeSet<ValueId> {
        let mut out = BTreeSet::new();
        self.collect_lhs(stmt, &mut out);
        out
    }

    fn collect_lhs(&self, stmt: &Statement, out: &mut BTreeSet<ValueId>) {
        match stmt {
            Statement::Assign { lhs, .. } => visit::assigned_signals(self, *lhs, out),
            Statement::Switch { cases, .. } => {
                for stmt in cases.iter().flat_map(|c| &c.body) {
                    self.collect_lhs(stmt, out);
                }
            }
        }
    }

    /// Signals read by `stmt`: right-hand sides, switch tests, and dynamic
    /// offsets or indices on left-hand sides.
    pub fn rhs_signals(&self, stmt: &Statement) -> BTreeSet<ValueId> {
        let mut out = BTreeSet::new();
        self.collect_rhs(stmt, &mut out);
        out
    }

    fn collect_rhs(&self, stmt: &Statement, out: &mut BTreeSet<ValueId>) {
        match stmt {
            Statement::Assign { lhs, rhs, .. } => {
                visit::read_signals(self, *rhs, out);
                visit::lhs_read_signals(self, *lhs, out);
            }
            Statement::Switch { test, cases, .. } => {
                visit::read_signals(self, *test, out);
                for stmt in cases.iter().flat_map(|c| &c.body) {
                    self.collect_rhs(stmt, out);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::ErrorKind;
    use strata_diagnostics::DiagnosticCode;

    #[test]
    fn assign_to_signal_and_slices() {
        let mut db = ValueDb::new();
        let a = db.signal(8u32).name("a").build();
        let b = db.signal(8u32).name("b").build();
        let lo = db.slice(a, 0, 4).unwrap();
        let cat = db.cat([lo, b]).unwrap();
        assert!(db.assign(a, 1).is_ok());
        assert!(db.assign(lo, b).is_ok());
        assert!(db.assign(cat, 0).is_ok());
    }

    #[test]
    fn assign_to_expression_fails() {
        let mut db = ValueDb::new();
        let a = db.signal(8u32).name("a").build();
        let sum = db.add(a, 1).unwrap();
        let err = db.assign(sum, 0).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Type);
        assert_eq!(
            err.to_string(),
            "Value (+ (sig a) (const 1'd1)) cannot be used in assignments"
        );
        let c = db.constant(3);
        assert!(db.assign(c, 0).is_err());
    }

    #[test]
    fn assign_through_proxy() {
        let mut db = ValueDb::new();
        let a = db.signal(4u32).name("a").build();
        let b = db.signal(4u32).name("b").build();
        let i = db.signal(1u32).name("i").build();
        let arr = db.array([a, b]);
        let p = db.array_index(arr, i).unwrap();
        let stmt = db.assign(p, 3).unwrap();
        assert_eq!(db.lhs_signals(&stmt), [a, b].into_iter().collect());
        assert_eq!(db.rhs_signals(&stmt), [i].into_iter().collect());

        let consts = db.array([1, 2]);
        let q = db.array_index(consts, i).unwrap();
        assert!(db.assign(q, 0).is_err());
    }

    #[test]
    fn switch_normalizes_patterns() {
        let mut db = ValueDb::new();
        let s = db.signal(4u32).name("s").build();
        let o = db.signal(1u32).name("o").build();
        let body = vec![db.assign(o, 1).unwrap()];
        let sw = db
            .switch(
                s,
                vec![
                    (vec![Pattern::from(3), Pattern::from("1 0 - -")], body.clone()),
                    (vec![Pattern::from(0b10110)], body.clone()),
                    (vec![], body),
                ],
            )
            .unwrap();
        let Statement::Switch { cases, .. } = &sw else {
            panic!("not a switch");
        };
        assert_eq!(cases.len(), 2);
        assert_eq!(cases[0].patterns, vec!["0011".to_string(), "10--".to_string()]);
        assert!(cases[1].is_default());
        assert_eq!(db.take_diagnostics()[0].code, DiagnosticCode::PatternNeverTrue);
        assert_eq!(db.lhs_signals(&sw), [o].into_iter().collect());
        assert_eq!(db.rhs_signals(&sw), [s].into_iter().collect());
    }

    #[test]
    fn switch_rejects_bad_patterns() {
        let mut db = ValueDb::new();
        let s = db.signal(4u32).build();
        let err = db.switch(s, vec![(vec![Pattern::from("--")], vec![])]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Range);
    }

    #[test]
    fn if_else_reduces_wide_condition() {
        let mut db = ValueDb::new();
        let c = db.signal(3u32).name("c").build();
        let o = db.signal(1u32).name("o").build();
        let then = vec![db.assign(o, 1).unwrap()];
        let otherwise = vec![db.assign(o, 0).unwrap()];
        let stmt = db.if_else(c, then, otherwise).unwrap();
        assert_eq!(
            db.stmt_repr(&stmt),
            "(switch (b (sig c)) (case 1 (eq (sig o) (const 1'd1))) (default (eq (sig o) (const 1'd0))))"
        );
    }

    #[test]
    fn part_offsets_are_reads() {
        let mut db = ValueDb::new();
        let a = db.signal(8u32).name("a").build();
        let off = db.signal(3u32).name("off").build();
        let part = db.bit_select(a, off, 2).unwrap();
        let stmt = db.assign(part, 0).unwrap();
        assert_eq!(db.lhs_signals(&stmt), [a].into_iter().collect());
        assert_eq!(db.rhs_signals(&stmt), [off].into_iter().collect());
    }
}
