//! The stateful aggregate: raw grid, evaluated grid, update protocol.

use std::sync::Arc;

use crate::cell::{Cell, Value};
use crate::formula::{self, FormulaParser, ParserFactory};
use crate::matrix::Matrix;
use crate::point::Point;

/// Raw and evaluated grids plus the factory that rebinds the evaluation
/// capability to each new raw snapshot.
///
/// A model is an immutable snapshot: every edit produces a new model and
/// leaves the old one untouched, so concurrent readers of a model are always
/// safe. The raw grid is the editable source of truth; the evaluated grid is
/// derived state, recomputed in full whenever the raw grid changes.
#[derive(Clone)]
pub struct Model {
    create_parser: ParserFactory,
    data: Arc<Matrix<Cell>>,
    evaluated_data: Arc<Matrix<Cell>>,
}

impl Model {
    /// Build a model from an initial raw grid. Evaluated data is computed
    /// immediately, exactly as it is recomputed after any edit.
    pub fn new(create_parser: ParserFactory, data: Matrix<Cell>) -> Model {
        let data = Arc::new(data);
        let evaluated_data = Arc::new(evaluate(&create_parser, data.clone()));
        Model {
            create_parser,
            data,
            evaluated_data,
        }
    }

    /// The raw grid, formulas included as literal text.
    pub fn data(&self) -> &Matrix<Cell> {
        &self.data
    }

    /// The derived grid with every formula replaced by its computed value or
    /// error tag. Derived state: callers never mutate it, only
    /// [`Model::update_cell_value`] recomputes it.
    pub fn evaluated_data(&self) -> &Matrix<Cell> {
        &self.evaluated_data
    }

    /// Apply one edit and re-derive the whole evaluated grid against the new
    /// raw snapshot.
    ///
    /// Total by construction: per-cell formula failures land in the affected
    /// evaluated cells as [`Value::Error`] values and never prevent the new
    /// model from being returned.
    pub fn update_cell_value(&self, point: Point, cell: Cell) -> Model {
        let next_data = Arc::new(self.data.set(point, cell));
        let next_evaluated = Arc::new(evaluate(&self.create_parser, next_data.clone()));
        Model {
            create_parser: self.create_parser.clone(),
            data: next_data,
            evaluated_data: next_evaluated,
        }
    }
}

/// One whole-grid pass: bind a fresh parser to the snapshot, then visit every
/// cell in row-major order. There is no dependency graph; reference
/// resolution reads raw values, so visit order cannot affect results.
fn evaluate(create_parser: &ParserFactory, data: Arc<Matrix<Cell>>) -> Matrix<Cell> {
    let parser = create_parser(data.clone());
    data.map(|point, cell| evaluate_cell(parser.as_ref(), point, cell))
}

fn evaluate_cell(parser: &dyn FormulaParser, point: Point, cell: &Cell) -> Cell {
    match &cell.value {
        Some(Value::Text(text)) if formula::is_formula(text) => Cell {
            value: Some(parser.evaluate(formula::extract_formula(text), point)),
            ..cell.clone()
        },
        _ => cell.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::FormulaError;
    use std::sync::Mutex;

    /// Returns a fixed value for every formula.
    struct FixedParser(Value);

    impl FormulaParser for FixedParser {
        fn evaluate(&self, _formula: &str, _at: Point) -> Value {
            self.0.clone()
        }
    }

    fn fixed(value: Value) -> ParserFactory {
        Arc::new(move |_| Box::new(FixedParser(value.clone())) as Box<dyn FormulaParser>)
    }

    /// Records every (formula, at) call.
    struct RecordingParser {
        calls: Arc<Mutex<Vec<(String, Point)>>>,
    }

    impl FormulaParser for RecordingParser {
        fn evaluate(&self, formula: &str, at: Point) -> Value {
            self.calls.lock().unwrap().push((formula.to_string(), at));
            Value::Number(42.0)
        }
    }

    #[test]
    fn non_formula_edit_passes_through_unchanged() {
        let model = Model::new(fixed(Value::Number(0.0)), Matrix::new());
        let cell = Cell::new("1");
        let next = model.update_cell_value(Point::ORIGIN, cell.clone());
        assert_eq!(next.data(), &Matrix::from(vec![vec![cell.clone()]]));
        assert_eq!(next.evaluated_data(), &Matrix::from(vec![vec![cell]]));
    }

    #[test]
    fn formula_cell_takes_the_parser_result() {
        let model = Model::new(fixed(Value::Number(42.0)), Matrix::new());
        let next = model.update_cell_value(Point::ORIGIN, Cell::new("=A1"));
        assert_eq!(
            next.evaluated_data().get(Point::ORIGIN),
            Some(&Cell::new(42.0))
        );
        // The raw grid keeps the formula text.
        assert_eq!(next.data().get(Point::ORIGIN), Some(&Cell::new("=A1")));
    }

    #[test]
    fn parser_errors_become_cell_values() {
        let model = Model::new(fixed(Value::Error(FormulaError::Ref)), Matrix::new());
        let next = model.update_cell_value(Point::ORIGIN, Cell::new("=A1"));
        assert_eq!(
            next.evaluated_data().get(Point::ORIGIN),
            Some(&Cell::new(Value::Error(FormulaError::Ref)))
        );
    }

    #[test]
    fn evaluated_cell_keeps_raw_attributes() {
        let model = Model::new(fixed(Value::Number(7.0)), Matrix::new());
        let cell = Cell {
            value: Some(Value::from("=A1")),
            read_only: true,
            class_name: Some("total".to_string()),
        };
        let next = model.update_cell_value(Point::ORIGIN, cell);
        let evaluated = next.evaluated_data().get(Point::ORIGIN).unwrap();
        assert_eq!(evaluated.value, Some(Value::Number(7.0)));
        assert!(evaluated.read_only);
        assert_eq!(evaluated.class_name.as_deref(), Some("total"));
    }

    #[test]
    fn parser_sees_the_extracted_expression_and_coordinate() {
        let calls = Arc::new(Mutex::new(Vec::new()));
        let factory: ParserFactory = {
            let calls = calls.clone();
            Arc::new(move |_| {
                Box::new(RecordingParser { calls: calls.clone() }) as Box<dyn FormulaParser>
            })
        };
        let model = Model::new(factory, Matrix::new());
        model.update_cell_value(Point::new(1, 2), Cell::new("=SUM(A:A)"));
        assert_eq!(
            calls.lock().unwrap().as_slice(),
            &[("SUM(A:A)".to_string(), Point::new(1, 2))]
        );
    }

    #[test]
    fn prior_model_is_left_unmodified() {
        let model = Model::new(fixed(Value::Number(0.0)), Matrix::from(vec![vec![Cell::new(1.0)]]));
        let _next = model.update_cell_value(Point::new(0, 0), Cell::new(2.0));
        assert_eq!(model.data().get(Point::ORIGIN), Some(&Cell::new(1.0)));
        assert_eq!(model.evaluated_data().get(Point::ORIGIN), Some(&Cell::new(1.0)));
    }

    #[test]
    fn grids_always_share_one_bounding_size() {
        let model = Model::new(fixed(Value::Number(0.0)), Matrix::new());
        let next = model.update_cell_value(Point::new(3, 1), Cell::new(5.0));
        assert_eq!(next.data().size(), next.evaluated_data().size());
    }
}
