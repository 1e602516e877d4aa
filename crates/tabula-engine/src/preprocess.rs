//! Formula-to-script rewriting.
//!
//! Turns a spreadsheet formula into a script the engine can evaluate:
//! `ROW()`/`COL()`/`SHEET()` are resolved from the evaluation context, range
//! builtins like `SUM(A1:B5)` become `SUM_RANGE(0, 0, 4, 1)` calls, and bare
//! references like `A1` become `CELL(0, 0)` lookups. Cell references inside
//! string literals are left untouched.

use regex::Regex;
use std::sync::OnceLock;
use tabula_core::Size;

use crate::builtins::{range_fn_re, range_script_name};
use crate::deps::parse_range;
use crate::parser::EvalContext;
use crate::refs::parse_a1;

fn cell_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\b([A-Za-z]+[0-9]+)\b").expect("cell ref regex must compile"))
}

fn row_fn_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\bROW\(\s*\)").expect("ROW() regex must compile"))
}

fn col_fn_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\bCOL\(\s*\)").expect("COL() regex must compile"))
}

fn sheet_fn_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\bSHEET\(\s*\)").expect("SHEET() regex must compile"))
}

/// Rewrite a formula into an evaluatable script against the 1-based
/// evaluation context and the snapshot's bounding `size` (needed to expand
/// whole-column ranges).
pub fn preprocess_formula(formula: &str, context: &EvalContext, size: Size) -> String {
    let script = resolve_context(formula, context);
    let script = rewrite_ranges(&script, size);
    replace_cell_refs_outside_strings(&script)
}

/// Replace `ROW()`, `COL()`, and `SHEET()` with the 1-based coordinates and
/// sheet name of the cell being evaluated.
fn resolve_context(formula: &str, context: &EvalContext) -> String {
    let script = row_fn_re().replace_all(formula, context.row.to_string());
    let script = col_fn_re().replace_all(&script, context.column.to_string());
    sheet_fn_re()
        .replace_all(&script, format!("\"{}\"", context.sheet))
        .to_string()
}

/// Transform range builtins like `SUM(A1:B5, ...)` into
/// `SUM_RANGE(0, 0, 4, 1, ...)`.
fn rewrite_ranges(script: &str, size: Size) -> String {
    range_fn_re()
        .replace_all(script, |caps: &regex::Captures| {
            let rest = caps.get(3).map(|m| m.as_str()).unwrap_or("");

            let Some(script_name) = range_script_name(&caps[1]) else {
                return caps[0].to_string();
            };

            match parse_range(&caps[2], size) {
                Some((start, end)) => format!(
                    "{}({}, {}, {}, {}{})",
                    script_name, start.row, start.column, end.row, end.column, rest
                ),
                None => caps[0].to_string(),
            }
        })
        .to_string()
}

fn replace_cells(segment: &str) -> String {
    cell_re()
        .replace_all(segment, |caps: &regex::Captures| {
            match parse_a1(&caps[1]) {
                Some(point) => format!("CELL({}, {})", point.row, point.column),
                None => caps[0].to_string(),
            }
        })
        .to_string()
}

/// Apply [`replace_cells`] to every segment outside double-quoted string
/// literals; literal contents pass through byte for byte.
fn replace_cell_refs_outside_strings(script: &str) -> String {
    let bytes = script.as_bytes();
    let mut out = String::new();
    let mut seg_start = 0;
    let mut in_string = false;
    let mut backslashes = 0usize;

    for (i, &b) in bytes.iter().enumerate() {
        if in_string {
            if b == b'\\' {
                backslashes += 1;
                continue;
            }
            if b == b'"' && backslashes % 2 == 0 {
                out.push_str(&script[seg_start..=i]);
                in_string = false;
                seg_start = i + 1;
            }
            backslashes = 0;
        } else if b == b'"' {
            out.push_str(&replace_cells(&script[seg_start..i]));
            in_string = true;
            seg_start = i;
            backslashes = 0;
        }
    }

    if seg_start < script.len() {
        if in_string {
            out.push_str(&script[seg_start..]);
        } else {
            out.push_str(&replace_cells(&script[seg_start..]));
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use tabula_core::Point;

    fn context() -> EvalContext {
        EvalContext::at(Point::new(1, 2))
    }

    fn size(rows: usize, columns: usize) -> Size {
        Size { rows, columns }
    }

    #[test]
    fn bare_references_become_cell_lookups() {
        assert_eq!(
            preprocess_formula("A1 + b2", &context(), size(5, 5)),
            "CELL(0, 0) + CELL(1, 1)"
        );
    }

    #[test]
    fn cell_ranges_become_range_calls() {
        assert_eq!(
            preprocess_formula("SUM(A1:B5)", &context(), size(9, 9)),
            "SUM_RANGE(0, 0, 4, 1)"
        );
    }

    #[test]
    fn column_ranges_span_the_snapshot_rows() {
        assert_eq!(
            preprocess_formula("SUM(A:A)", &context(), size(2, 1)),
            "SUM_RANGE(0, 0, 1, 0)"
        );
    }

    #[test]
    fn string_literals_are_left_untouched() {
        assert_eq!(
            preprocess_formula(r#""A1" + A1"#, &context(), size(2, 2)),
            r#""A1" + CELL(0, 0)"#
        );
    }

    #[test]
    fn escaped_quotes_stay_inside_the_literal() {
        assert_eq!(
            preprocess_formula(r#""say \"A1\"" + A1"#, &context(), size(2, 2)),
            r#""say \"A1\"" + CELL(0, 0)"#
        );
    }

    #[test]
    fn context_calls_resolve_to_one_based_coordinates() {
        assert_eq!(
            preprocess_formula("ROW() + COL()", &context(), size(2, 2)),
            "2 + 3"
        );
        assert_eq!(
            preprocess_formula("SHEET()", &context(), size(2, 2)),
            "\"Sheet1\""
        );
    }

    #[test]
    fn invalid_references_pass_through() {
        assert_eq!(preprocess_formula("A0 + 1", &context(), size(2, 2)), "A0 + 1");
    }
}
