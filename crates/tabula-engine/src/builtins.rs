//! Script-facing builtins bound to one raw-matrix snapshot.
//!
//! Conventions:
//! - Formula-facing builtin names are ALL CAPS (e.g. `SUM`, `AVG`).
//! - Range builtins rewrite to ALLCAPS script function names (e.g.
//!   `SUM_RANGE`).
//! - If you add a new range builtin, update `RANGE_BUILTINS` and register its
//!   implementation in `register_builtins`.

use regex::Regex;
use rhai::{Dynamic, Engine};
use std::sync::{Arc, OnceLock};
use tabula_core::{Cell, Matrix, Point, Value};

pub struct RangeBuiltin {
    pub formula_name: &'static str,
    pub script_name: &'static str,
}

pub const RANGE_BUILTINS: &[RangeBuiltin] = &[
    RangeBuiltin {
        formula_name: "SUM",
        script_name: "SUM_RANGE",
    },
    RangeBuiltin {
        formula_name: "AVG",
        script_name: "AVG_RANGE",
    },
    RangeBuiltin {
        formula_name: "COUNT",
        script_name: "COUNT_RANGE",
    },
    RangeBuiltin {
        formula_name: "MIN",
        script_name: "MIN_RANGE",
    },
    RangeBuiltin {
        formula_name: "MAX",
        script_name: "MAX_RANGE",
    },
];

/// Regex that matches builtin range calls like `SUM(A1:B5)` or `SUM(A:A)`.
///
/// Captures:
/// - group 1: builtin name (e.g. `SUM`)
/// - group 2: the range token, cell-to-cell or whole-column form
/// - group 3: any trailing arguments
pub fn range_fn_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        let names = RANGE_BUILTINS
            .iter()
            .map(|b| b.formula_name)
            .collect::<Vec<_>>()
            .join("|");
        Regex::new(&format!(
            r"\b({})\(\s*([A-Za-z]+[0-9]+:[A-Za-z]+[0-9]+|[A-Za-z]+:[A-Za-z]+)\s*(,[^)]*)?\)",
            names
        ))
        .expect("builtin range regex must compile")
    })
}

pub fn range_script_name(formula_name: &str) -> Option<&'static str> {
    RANGE_BUILTINS
        .iter()
        .find(|b| b.formula_name == formula_name)
        .map(|b| b.script_name)
}

/// Raw value at a point as a script value.
///
/// Reference resolution is raw by contract: a formula cell yields its own
/// formula text, never a computed value. Dependent-formula consistency
/// comes from the whole-grid re-evaluation pass, not from lookup-time
/// recursion. Empty cells and out-of-bounds points read as 0.
fn raw_value(data: &Matrix<Cell>, point: Point) -> Dynamic {
    let Some(value) = data.get(point).and_then(|cell| cell.value.as_ref()) else {
        return Dynamic::from(0_i64);
    };
    match value {
        Value::Number(n) => Dynamic::from(*n),
        Value::Text(s) => Dynamic::from(s.clone()),
        Value::Bool(b) => Dynamic::from(*b),
        Value::Error(e) => Dynamic::from(e.to_string()),
    }
}

/// Numeric view of a cell for aggregation; non-numeric and empty cells are
/// ignored.
fn number_at(data: &Matrix<Cell>, row: usize, column: usize) -> Option<f64> {
    data.get(Point { row, column })
        .and_then(|cell| cell.value.as_ref())
        .and_then(Value::as_number)
}

fn normalize(r1: i64, c1: i64, r2: i64, c2: i64) -> (usize, usize, usize, usize) {
    (
        r1.min(r2).max(0) as usize,
        c1.min(c2).max(0) as usize,
        r1.max(r2).max(0) as usize,
        c1.max(c2).max(0) as usize,
    )
}

/// Register all builtin functions into the script engine, closed over the
/// raw-matrix snapshot.
pub fn register_builtins(engine: &mut Engine, data: Arc<Matrix<Cell>>) {
    // CELL(row, col): raw typed value at a zero-based coordinate.
    let data_cell = data.clone();
    engine.register_fn("CELL", move |row: i64, column: i64| -> Dynamic {
        if row < 0 || column < 0 {
            return Dynamic::from(0_i64);
        }
        raw_value(
            &data_cell,
            Point {
                row: row as usize,
                column: column as usize,
            },
        )
    });

    // SUM_RANGE(r1, c1, r2, c2)
    let data_sum = data.clone();
    engine.register_fn(
        "SUM_RANGE",
        move |r1: i64, c1: i64, r2: i64, c2: i64| -> f64 {
            let (min_row, min_col, max_row, max_col) = normalize(r1, c1, r2, c2);
            let mut sum = 0.0;
            for row in min_row..=max_row {
                for column in min_col..=max_col {
                    sum += number_at(&data_sum, row, column).unwrap_or(0.0);
                }
            }
            sum
        },
    );

    // AVG_RANGE(r1, c1, r2, c2): mean of the numeric cells in the range.
    let data_avg = data.clone();
    engine.register_fn(
        "AVG_RANGE",
        move |r1: i64, c1: i64, r2: i64, c2: i64| -> f64 {
            let (min_row, min_col, max_row, max_col) = normalize(r1, c1, r2, c2);
            let mut sum = 0.0;
            let mut count = 0;
            for row in min_row..=max_row {
                for column in min_col..=max_col {
                    if let Some(n) = number_at(&data_avg, row, column) {
                        sum += n;
                        count += 1;
                    }
                }
            }
            if count > 0 { sum / count as f64 } else { 0.0 }
        },
    );

    // COUNT_RANGE(r1, c1, r2, c2): count non-empty cells.
    let data_count = data.clone();
    engine.register_fn(
        "COUNT_RANGE",
        move |r1: i64, c1: i64, r2: i64, c2: i64| -> f64 {
            let (min_row, min_col, max_row, max_col) = normalize(r1, c1, r2, c2);
            let mut count = 0;
            for row in min_row..=max_row {
                for column in min_col..=max_col {
                    let occupied = data_count
                        .get(Point { row, column })
                        .is_some_and(|cell| cell.value.is_some());
                    if occupied {
                        count += 1;
                    }
                }
            }
            count as f64
        },
    );

    // MIN_RANGE(r1, c1, r2, c2)
    let data_min = data.clone();
    engine.register_fn(
        "MIN_RANGE",
        move |r1: i64, c1: i64, r2: i64, c2: i64| -> f64 {
            let (min_row, min_col, max_row, max_col) = normalize(r1, c1, r2, c2);
            let mut min_val = f64::INFINITY;
            for row in min_row..=max_row {
                for column in min_col..=max_col {
                    if let Some(n) = number_at(&data_min, row, column) {
                        min_val = min_val.min(n);
                    }
                }
            }
            if min_val == f64::INFINITY { 0.0 } else { min_val }
        },
    );

    // MAX_RANGE(r1, c1, r2, c2)
    let data_max = data;
    engine.register_fn(
        "MAX_RANGE",
        move |r1: i64, c1: i64, r2: i64, c2: i64| -> f64 {
            let (min_row, min_col, max_row, max_col) = normalize(r1, c1, r2, c2);
            let mut max_val = f64::NEG_INFINITY;
            for row in min_row..=max_row {
                for column in min_col..=max_col {
                    if let Some(n) = number_at(&data_max, row, column) {
                        max_val = max_val.max(n);
                    }
                }
            }
            if max_val == f64::NEG_INFINITY { 0.0 } else { max_val }
        },
    );
}
