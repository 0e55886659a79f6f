use thiserror::Error;

use crate::builtin::Builtin;
use monkey_parser::token::Token;

/// Everything that can go wrong while evaluating a program.
///
/// Operand types are reported by their `Object::typename()`.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RuntimeError {
    /// When referencing an identifier that does not exist/has not been defined
    #[error("identifier not found: {0}")]
    IdentifierNotFound(String),
    /// When attempting a prefix operation on an unsupported type (e.g. `-true`)
    #[error("unknown operator: {operator}{right}")]
    UnknownPrefixOperator {
        operator: Token,
        right: &'static str,
    },
    /// When attempting an infix operation the operand types do not support (e.g. `true + false`)
    #[error("unknown operator: {left} {operator} {right}")]
    UnknownInfixOperator {
        operator: Token,
        left: &'static str,
        right: &'static str,
    },
    /// When the operands of an infix operation have different types (e.g. `1 + true`)
    #[error("type mismatch: {left} {operator} {right}")]
    TypeMismatch {
        operator: Token,
        left: &'static str,
        right: &'static str,
    },
    #[error("division by zero")]
    DivisionByZero,
    /// When an object that is not a function is used with function call syntax
    #[error("not a function: {0}")]
    NotAFunction(&'static str),
    /// When an object that cannot be hashed is used as a hash key
    #[error("unusable as hash key: {0}")]
    UnusableAsHashKey(&'static str),
    /// When attempting to index an object that does not support it (e.g. `1[0]`)
    #[error("index operator not supported: {0}")]
    IndexNotSupported(&'static str),
    /// When a builtin is called with the wrong number of arguments
    #[error("wrong number of arguments. want={expected}, got={got}")]
    BadArity { expected: usize, got: usize },
    /// When a call to builtin function passes an argument of an invalid/unsupported type
    #[error("argument to `{}` not supported. got {}", .builtin.name(), .got)]
    InvalidArgumentType {
        builtin: Builtin,
        got: &'static str,
    },
    /// When `unquote` produces something that has no literal syntax
    #[error("cannot unquote {0} back into an expression")]
    UnquoteNotConvertible(&'static str),
}
