//! Formula dependency extraction.

use regex::Regex;
use std::sync::OnceLock;
use tabula_core::{Point, Size};

use crate::builtins::range_fn_re;
use crate::refs::{parse_a1, parse_column_letters};

fn cell_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\b([A-Za-z]+[0-9]+)\b").expect("cell ref regex must compile"))
}

/// Parse a range token into its normalized zero-based corners.
///
/// Accepts the cell-to-cell form "A1:B5" and the whole-column form "A:C";
/// column ranges span the snapshot's current row bounds, which is why the
/// bounding `size` is required.
pub fn parse_range(token: &str, size: Size) -> Option<(Point, Point)> {
    let (start, end) = token.split_once(':')?;

    if let (Some(start), Some(end)) = (parse_a1(start), parse_a1(end)) {
        return Some(normalized(start, end));
    }

    let start_column = parse_column_letters(start)?;
    let end_column = parse_column_letters(end)?;
    let last_row = size.rows.saturating_sub(1);
    Some(normalized(
        Point { row: 0, column: start_column },
        Point { row: last_row, column: end_column },
    ))
}

fn normalized(a: Point, b: Point) -> (Point, Point) {
    (
        Point { row: a.row.min(b.row), column: a.column.min(b.column) },
        Point { row: a.row.max(b.row), column: a.column.max(b.column) },
    )
}

/// Extract every cell a formula references, ranges expanded.
///
/// References inside string literals are ignored. `size` bounds the
/// expansion of whole-column ranges.
pub fn extract_dependencies(formula: &str, size: Size) -> Vec<Point> {
    let mut deps = Vec::new();

    let formula = strip_string_literals(formula);

    let range_re = range_fn_re();

    // Remove range calls first so their cell refs are not double-counted.
    let without_ranges = range_re.replace_all(&formula, "").to_string();

    for caps in range_re.captures_iter(&formula) {
        if let Some((start, end)) = parse_range(&caps[2], size) {
            for row in start.row..=end.row {
                for column in start.column..=end.column {
                    deps.push(Point { row, column });
                }
            }
        }
    }

    for caps in cell_re().captures_iter(&without_ranges) {
        if let Some(point) = parse_a1(&caps[1]) {
            deps.push(point);
        }
    }

    deps
}

/// Blank out string literal contents so refs inside them are not treated as
/// dependencies; quotes are kept so segment boundaries stay intact.
fn strip_string_literals(formula: &str) -> String {
    let mut out = String::with_capacity(formula.len());
    let mut in_string = false;
    let mut escaped = false;

    for ch in formula.chars() {
        if in_string {
            if escaped {
                escaped = false;
                out.push(' ');
                continue;
            }
            if ch == '\\' {
                escaped = true;
                out.push(' ');
                continue;
            }
            if ch == '"' {
                in_string = false;
                out.push('"');
            } else {
                out.push(' ');
            }
        } else if ch == '"' {
            in_string = true;
            out.push('"');
        } else {
            out.push(ch);
        }
    }

    out
}
