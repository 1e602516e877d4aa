//! tabula-engine - Rhai-backed formula evaluation capability for the tabula
//! spreadsheet core.
//!
//! This crate is one conformant implementation of the core's
//! [`FormulaParser`](tabula_core::FormulaParser) boundary:
//!
//! - [`parse_a1`] / [`to_a1`] - A1 notation ↔ zero-based points
//! - [`extract_dependencies`] - parse formula dependencies, ranges expanded
//! - [`has_cycle`] - circular-reference detection over raw formula text
//! - [`preprocess_formula`] - rewrite formulas into evaluatable scripts
//! - [`RhaiParser`] / [`create_formula_parser`] - the capability itself
//!
//! Reference resolution is raw by contract: a formula cell referenced by
//! another formula yields its literal text. The core's whole-grid
//! re-evaluation pass is what keeps dependent formulas consistent.

mod builtins;
mod cycle;
mod deps;
mod parser;
mod preprocess;
mod refs;

pub use builtins::{RANGE_BUILTINS, RangeBuiltin, range_fn_re, range_script_name};
pub use cycle::has_cycle;
pub use deps::{extract_dependencies, parse_range};
pub use parser::{EvalContext, RhaiParser, SHEET_NAME, create_formula_parser};
pub use preprocess::preprocess_formula;
pub use refs::{column_letters, parse_a1, parse_column_letters, to_a1};
