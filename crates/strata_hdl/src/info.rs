//! Human-readable summary of a prepared fragment.

use crate::db::ValueDb;
use crate::fragment::Fragment;
use crate::ids::ValueId;
use crate::port::PortDirection;
use std::fmt::Write;

/// Lists the ports by direction and every signal of `fragment`.
///
/// Empty sections are omitted:
///
/// ```text
/// converted Fragment
/// inputs:
///   name: clk                  nbits: 1   signed: false
/// signals:
///   name: clk                  nbits: 1   signed: false
/// ```
pub fn fragment_info(db: &ValueDb, fragment: &Fragment) -> String {
    let mut out = String::from("converted Fragment\n");
    let sections = [
        ("inputs", ports_of(fragment, PortDirection::Input)),
        ("outputs", ports_of(fragment, PortDirection::Output)),
        ("inouts", ports_of(fragment, PortDirection::InOut)),
        ("signals", fragment.iter_signals(db)),
    ];
    for (title, signals) in sections {
        if signals.is_empty() {
            continue;
        }
        let _ = writeln!(out, "{title}:");
        for signal in signals {
            write_signal(db, &mut out, signal);
        }
    }
    out
}

fn ports_of(fragment: &Fragment, direction: PortDirection) -> Vec<ValueId> {
    fragment.iter_ports(Some(direction)).map(|(s, _)| s).collect()
}

fn write_signal(db: &ValueDb, out: &mut String, signal: ValueId) {
    let name = db.signal_name(signal).unwrap_or("?");
    let (width, signed) = db
        .known_shape(signal)
        .map_or((0, false), |s| (s.width(), s.is_signed()));
    let _ = writeln!(out, "  name: {name:<20} nbits: {width:<3} signed: {signed}");
}
