//! The rate-limited `calc` command.

mod cooldown;
mod error;
mod evaluator;
mod parser;

pub use cooldown::CooldownTracker;
pub use error::CalcError;
pub use evaluator::RateLimitedEvaluator;
pub use parser::{evaluate_expression, format_result, MAX_DEPTH, MAX_EXPRESSION_LEN};
