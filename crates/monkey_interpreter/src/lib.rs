mod builtin;
mod environment;
pub mod error;
mod evaluator;
pub mod macro_expansion;
pub mod object;
mod quote;

pub use builtin::Builtin;
pub use environment::Environment;
pub use error::RuntimeError;
pub use evaluator::Evaluator;
pub use macro_expansion::{define_macros, expand_macros, MacroError};
