//! The Rhai-backed evaluation capability.

use rhai::{Dynamic, Engine, EvalAltResult};
use std::sync::Arc;
use tabula_core::{Cell, FormulaError, FormulaParser, Matrix, ParserFactory, Point, Value};

use crate::builtins::register_builtins;
use crate::cycle::has_cycle;
use crate::preprocess::preprocess_formula;
use crate::refs::is_ref_shaped;

/// Sheet name presented to formulas; this engine models a single grid, not a
/// multi-sheet workbook.
pub const SHEET_NAME: &str = "Sheet1";

/// 1-based cell context handed to the script engine.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct EvalContext {
    pub row: usize,
    pub column: usize,
    pub sheet: &'static str,
}

impl EvalContext {
    /// Translate a zero-based grid coordinate into the 1-based context.
    pub fn at(point: Point) -> EvalContext {
        EvalContext {
            row: point.row + 1,
            column: point.column + 1,
            sheet: SHEET_NAME,
        }
    }
}

/// A formula evaluator bound to one raw-matrix snapshot.
///
/// The snapshot is captured both here (for cycle detection and range bounds)
/// and inside the engine's registered builtins (for reference resolution), so
/// a parser instance always evaluates against exactly one grid state.
pub struct RhaiParser {
    data: Arc<Matrix<Cell>>,
    engine: Engine,
}

impl RhaiParser {
    pub fn new(data: Arc<Matrix<Cell>>) -> RhaiParser {
        let mut engine = Engine::new();
        register_builtins(&mut engine, data.clone());
        RhaiParser { data, engine }
    }
}

impl FormulaParser for RhaiParser {
    fn evaluate(&self, formula: &str, at: Point) -> Value {
        if has_cycle(at, formula, &self.data) {
            return Value::Error(FormulaError::Ref);
        }

        let context = EvalContext::at(at);
        let script = preprocess_formula(formula, &context, self.data.size());
        match self.engine.eval::<Dynamic>(&script) {
            Ok(result) => dynamic_to_value(result),
            Err(err) => Value::Error(classify(&err)),
        }
    }
}

/// Factory in the shape the model consumes: one parser per raw snapshot.
pub fn create_formula_parser() -> ParserFactory {
    Arc::new(|data| Box::new(RhaiParser::new(data)) as Box<dyn FormulaParser>)
}

fn dynamic_to_value(result: Dynamic) -> Value {
    if let Ok(n) = result.as_float() {
        Value::Number(n)
    } else if let Ok(n) = result.as_int() {
        Value::Number(n as f64)
    } else if let Ok(b) = result.as_bool() {
        Value::Bool(b)
    } else if result.is_unit() {
        Value::Text(String::new())
    } else if let Ok(s) = result.into_string() {
        Value::Text(s)
    } else {
        // Arrays and other script-only types have no cell representation.
        Value::Error(FormulaError::Value)
    }
}

/// Map a script failure onto the closed per-cell error taxonomy.
fn classify(err: &EvalAltResult) -> FormulaError {
    match err {
        // An unresolved identifier shaped like "A1" is a reference that did
        // not survive rewriting (e.g. the invalid "A0"); anything else is an
        // unknown name.
        EvalAltResult::ErrorVariableNotFound(name, _) => {
            if is_ref_shaped(name) {
                FormulaError::Ref
            } else {
                FormulaError::Name
            }
        }
        // Operator resolution failures also surface as function-not-found;
        // their signatures start with the operator symbol.
        EvalAltResult::ErrorFunctionNotFound(signature, _) => {
            if signature.chars().next().is_some_and(|c| c.is_ascii_alphabetic()) {
                FormulaError::Name
            } else {
                FormulaError::Value
            }
        }
        EvalAltResult::ErrorArithmetic(message, _) => {
            if message.to_ascii_lowercase().contains("zero") {
                FormulaError::Div0
            } else {
                FormulaError::Num
            }
        }
        EvalAltResult::ErrorMismatchDataType(..) | EvalAltResult::ErrorMismatchOutputType(..) => {
            FormulaError::Value
        }
        _ => FormulaError::Error,
    }
}
