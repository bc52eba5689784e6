pub mod constants;
pub mod engine;
pub mod error;
pub mod evaluator;
pub mod formula;
pub mod serializer;
pub mod sheet;
pub mod types;
pub mod utils;

pub use engine::Engine;
pub use error::{EngineError, Result};
pub use formula::{Expr, FormulaParser, OpKind};
pub use types::{Address, Value};
