//! Circular-reference detection over raw formula text.

use std::collections::HashSet;
use tabula_core::{Cell, Matrix, Point, Value, extract_formula, is_formula};

use crate::deps::extract_dependencies;

/// Whether evaluating `formula` at `start` would close a reference cycle.
///
/// Dependencies are read from raw formula text in the snapshot, so the walk
/// needs no evaluation; a formula that transitively includes its own
/// coordinate, or that depends on any cycle, is reported before the script
/// engine ever runs.
pub fn has_cycle(start: Point, formula: &str, data: &Matrix<Cell>) -> bool {
    let mut visiting = HashSet::new();
    visiting.insert(start);
    extract_dependencies(formula, data.size())
        .into_iter()
        .any(|dep| visit(dep, data, &mut visiting))
}

fn visit(current: Point, data: &Matrix<Cell>, visiting: &mut HashSet<Point>) -> bool {
    if !visiting.insert(current) {
        return true;
    }

    let deps = match data.get(current).and_then(|cell| cell.value.as_ref()) {
        Some(Value::Text(text)) if is_formula(text) => {
            extract_dependencies(extract_formula(text), data.size())
        }
        _ => Vec::new(),
    };

    for dep in deps {
        if visit(dep, data, visiting) {
            return true;
        }
    }

    visiting.remove(&current);
    false
}
