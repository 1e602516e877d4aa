//! Cell coordinates.

use serde::{Deserialize, Serialize};

/// A zero-based (row, column) address of a cell.
#[derive(Clone, Copy, Debug, Default, Hash, Eq, PartialEq, Ord, PartialOrd, Serialize, Deserialize)]
pub struct Point {
    pub row: usize,
    pub column: usize,
}

impl Point {
    /// The top-left cell.
    pub const ORIGIN: Point = Point { row: 0, column: 0 };

    pub fn new(row: usize, column: usize) -> Point {
        Point { row, column }
    }
}
