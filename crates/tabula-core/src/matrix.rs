//! Rectangular, possibly sparse cell container.

use serde::{Deserialize, Serialize};

use crate::point::Point;

/// Bounding extents of a matrix.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
pub struct Size {
    pub rows: usize,
    pub columns: usize,
}

/// Ragged rows of optional entries addressed by [`Point`].
///
/// `None` entries and rows shorter than the bounding width are sparse holes;
/// callers treat them as empty cells. A matrix is an immutable value: writes
/// go through [`Matrix::set`], which returns a new matrix and leaves the
/// receiver untouched.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Matrix<T> {
    rows: Vec<Vec<Option<T>>>,
}

impl<T> Matrix<T> {
    pub fn new() -> Matrix<T> {
        Matrix { rows: Vec::new() }
    }

    pub fn from_rows(rows: Vec<Vec<Option<T>>>) -> Matrix<T> {
        Matrix { rows }
    }

    /// Value at `point`, or `None` for a hole or an out-of-bounds coordinate.
    pub fn get(&self, point: Point) -> Option<&T> {
        self.rows.get(point.row)?.get(point.column)?.as_ref()
    }

    /// Current bounding extents, computed from what is actually populated so
    /// it self-corrects after growth or truncation.
    pub fn size(&self) -> Size {
        Size {
            rows: self.rows.len(),
            columns: self.rows.iter().map(Vec::len).max().unwrap_or(0),
        }
    }

    /// Lazy row-major iteration over the bounding rectangle. Holes and short
    /// rows yield `None`.
    pub fn entries(&self) -> impl Iterator<Item = (Point, Option<&T>)> {
        let Size { rows, columns } = self.size();
        (0..rows).flat_map(move |row| {
            (0..columns).map(move |column| {
                let point = Point { row, column };
                (point, self.get(point))
            })
        })
    }

    /// Shape-preserving transform: holes stay holes and row lengths are kept,
    /// so the result has the identical bounding size.
    pub fn map<U>(&self, mut f: impl FnMut(Point, &T) -> U) -> Matrix<U> {
        Matrix {
            rows: self
                .rows
                .iter()
                .enumerate()
                .map(|(row, cells)| {
                    cells
                        .iter()
                        .enumerate()
                        .map(|(column, cell)| {
                            cell.as_ref().map(|value| f(Point { row, column }, value))
                        })
                        .collect()
                })
                .collect(),
        }
    }
}

impl<T: Clone> Matrix<T> {
    /// Returns a new matrix equal to the receiver except that `point` holds
    /// `value`. A point outside the current bounds grows the matrix with
    /// holes; growth is silent and never an error.
    pub fn set(&self, point: Point, value: T) -> Matrix<T> {
        let mut rows = self.rows.clone();
        if rows.len() <= point.row {
            rows.resize_with(point.row + 1, Vec::new);
        }
        let row = &mut rows[point.row];
        if row.len() <= point.column {
            row.resize_with(point.column + 1, || None);
        }
        row[point.column] = Some(value);
        Matrix { rows }
    }
}

impl<T> Default for Matrix<T> {
    fn default() -> Matrix<T> {
        Matrix::new()
    }
}

/// Dense construction: every given cell is present.
impl<T> From<Vec<Vec<T>>> for Matrix<T> {
    fn from(rows: Vec<Vec<T>>) -> Matrix<T> {
        Matrix {
            rows: rows
                .into_iter()
                .map(|row| row.into_iter().map(Some).collect())
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn get_out_of_bounds_is_none() {
        let matrix = Matrix::from(vec![vec![1], vec![2]]);
        assert_eq!(matrix.get(Point::new(0, 0)), Some(&1));
        assert_eq!(matrix.get(Point::new(0, 1)), None);
        assert_eq!(matrix.get(Point::new(5, 0)), None);
    }

    #[test]
    fn size_is_computed_from_extents() {
        let matrix = Matrix::from_rows(vec![vec![Some(1), None, Some(3)], vec![Some(4)]]);
        assert_eq!(matrix.size(), Size { rows: 2, columns: 3 });
        assert_eq!(Matrix::<i32>::new().size(), Size { rows: 0, columns: 0 });
    }

    #[test]
    fn set_leaves_the_original_untouched() {
        let matrix = Matrix::from(vec![vec![1]]);
        let next = matrix.set(Point::new(0, 0), 9);
        assert_eq!(matrix.get(Point::new(0, 0)), Some(&1));
        assert_eq!(next.get(Point::new(0, 0)), Some(&9));
    }

    #[test]
    fn set_beyond_bounds_grows_losslessly() {
        let matrix = Matrix::from(vec![vec![1], vec![2]]);
        let grown = matrix.set(Point::new(2, 3), 7);
        assert_eq!(grown.size(), Size { rows: 3, columns: 4 });
        assert_eq!(grown.get(Point::new(0, 0)), Some(&1));
        assert_eq!(grown.get(Point::new(1, 0)), Some(&2));
        assert_eq!(grown.get(Point::new(2, 3)), Some(&7));
        assert_eq!(grown.get(Point::new(2, 0)), None);
    }

    #[test]
    fn entries_are_row_major_over_the_bounding_rectangle() {
        let matrix = Matrix::from_rows(vec![vec![Some('a'), Some('b')], vec![Some('c')]]);
        let entries: Vec<_> = matrix.entries().collect();
        assert_eq!(
            entries,
            vec![
                (Point::new(0, 0), Some(&'a')),
                (Point::new(0, 1), Some(&'b')),
                (Point::new(1, 0), Some(&'c')),
                (Point::new(1, 1), None),
            ]
        );
    }

    #[test]
    fn map_preserves_shape_and_holes() {
        let matrix = Matrix::from_rows(vec![vec![Some(1), None], vec![Some(3)]]);
        let doubled = matrix.map(|_, n| n * 2);
        assert_eq!(
            doubled,
            Matrix::from_rows(vec![vec![Some(2), None], vec![Some(6)]])
        );
        assert_eq!(doubled.size(), matrix.size());
    }
}
