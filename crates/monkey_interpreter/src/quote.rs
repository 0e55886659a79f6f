use std::rc::Rc;

use monkey_parser::ast::{modify::modify_expression, Expression};

use crate::{
    error::RuntimeError,
    evaluator::{EvalResult, Evaluator, Halt},
    object::Object,
};

const UNQUOTE: &str = "unquote";

/// Wrap `node` unevaluated, after splicing in the value of every `unquote(...)` inside it.
pub(crate) fn quote(node: Expression, evaluator: &mut Evaluator) -> EvalResult {
    let node = eval_unquote_calls(node, evaluator)?;
    Ok(Rc::new(Object::Quote(node)))
}

fn eval_unquote_calls(quoted: Expression, evaluator: &mut Evaluator) -> Result<Expression, Halt> {
    modify_expression(quoted, &mut |node: Expression| {
        if node.called_name() != Some(UNQUOTE) {
            return Ok(node);
        }

        match node {
            Expression::Call(call) if call.arguments.len() == 1 => {
                let unquoted = evaluator.eval_expression(&call.arguments[0])?;
                Ok(object_to_expression(&unquoted)?)
            }
            // Unquote calls with the wrong number of arguments are left as they are
            other => Ok(other),
        }
    })
}

fn object_to_expression(obj: &Object) -> Result<Expression, RuntimeError> {
    match obj {
        Object::Integer(value) => Ok(Expression::Integer(*value)),
        Object::Boolean(value) => Ok(Expression::Boolean(*value)),
        Object::Quote(node) => Ok(node.clone()),
        other => Err(RuntimeError::UnquoteNotConvertible(other.typename())),
    }
}
