//! tabula-core - spreadsheet evaluation core.
//!
//! The dual raw/evaluated grid model and its update protocol:
//!
//! - [`Point`] - zero-based cell coordinates
//! - [`Matrix`] - ragged, sparse, copy-on-write grid container
//! - [`Cell`], [`Value`] - cell data with host-facing attributes
//! - [`is_formula`], [`extract_formula`] - formula-marker handling
//! - [`FormulaParser`], [`ParserFactory`] - the pluggable evaluation capability
//! - [`Model`] - raw + evaluated grids with whole-grid re-evaluation per edit
//! - [`FormulaError`] - per-cell error tags, carried as values and never thrown
//!
//! The core never depends on a concrete formula-parsing library; a conformant
//! capability (such as the Rhai-backed `tabula-engine`) is injected through
//! [`ParserFactory`].

pub mod cell;
pub mod error;
pub mod formula;
pub mod matrix;
pub mod model;
pub mod point;

pub use cell::{Cell, Value, format_number};
pub use error::FormulaError;
pub use formula::{FORMULA_MARKER, FormulaParser, ParserFactory, extract_formula, is_formula};
pub use matrix::{Matrix, Size};
pub use model::Model;
pub use point::Point;
