//! Dice expressions such as `2d6+3` or `4d6kh3`, rolled with a trace of every die.
//!
//! ```
//! use dice_expr::{compile, RollContext, ScriptedRoller};
//!
//! let mut tree = compile("4d6kh3 + 2").unwrap();
//! let mut ctx = RollContext::with_roller(ScriptedRoller::new([6, 1, 5, 4]));
//! assert_eq!(tree.evaluate(&mut ctx), Ok(17));
//! assert_eq!(tree.verbose_result().unwrap(), "4d6kh3 + 2 = [6, (1), 5, 4] + 2 = 17");
//! ```

mod cache;
pub mod common;
mod error;
pub mod parse;
pub mod roll;

pub use cache::ExpressionCache;
pub use error::RollError;
pub use parse::{ast::ExpressionTree, SyntaxError, SyntaxErrorKind};
pub use roll::{
    DefaultRoller, EvaluationError, Limits, Outcome, Roll, RollContext, Roller, ScriptedRoller,
};

/// Compiles `expression` into a tree that can be evaluated any number of times.
pub fn compile(expression: &str) -> Result<ExpressionTree, SyntaxError> {
    compile_with_limits(expression, &Limits::default())
}

/// Like [compile], rejecting expressions nested deeper than `limits.max_depth`.
pub fn compile_with_limits(expression: &str, limits: &Limits) -> Result<ExpressionTree, SyntaxError> {
    parse::parse(expression, limits)
}

/// Compiles and rolls `expression` once with the thread-local generator, returning the
/// verbose result.
pub fn roll(expression: &str) -> Result<String, RollError> {
    let tree = compile(expression)?;
    let roll = tree.roll(&mut RollContext::default())?;
    Ok(roll.verbose_result())
}
