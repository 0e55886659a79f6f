use std::{cell::RefCell, rc::Rc};

use tracing::trace;

use crate::{
    builtin::Builtin,
    environment::Environment,
    error::RuntimeError,
    object::{Array, Function, Hash, HashPair, Macro, Object},
    quote,
};

use monkey_parser::{
    ast::{BlockStatement, Expression, HashLiteral, IdentifierLiteral, IfExpression, Program, Statement},
    token::Token,
};

/// Why evaluation of a node stopped before producing a value.
#[derive(Debug)]
pub(crate) enum Halt {
    /// A `return` on its way up to the nearest function boundary
    Return(Rc<Object>),
    Error(RuntimeError),
}

impl From<RuntimeError> for Halt {
    fn from(err: RuntimeError) -> Self {
        Halt::Error(err)
    }
}

pub(crate) type EvalResult = Result<Rc<Object>, Halt>;

type OperatorResult = Result<Rc<Object>, RuntimeError>;

const QUOTE: &str = "quote";

pub struct Evaluator {
    env: Rc<RefCell<Environment>>,
}

impl Default for Evaluator {
    fn default() -> Self {
        Self::new()
    }
}

impl Evaluator {
    pub fn new() -> Self {
        Self::new_with_env(Rc::new(RefCell::new(Environment::new())))
    }

    pub fn new_with_env(env: Rc<RefCell<Environment>>) -> Self {
        Evaluator { env }
    }

    /// The environment top-level bindings go into.
    pub fn env(&self) -> &Rc<RefCell<Environment>> {
        &self.env
    }

    /// Evaluate every statement of `prog`, yielding the value of the last one.
    ///
    /// A runtime error stops evaluation and is returned as an `Object::Error`.
    pub fn eval(&mut self, prog: &Program) -> Rc<Object> {
        match self.eval_program(prog) {
            Ok(obj) => obj,
            Err(err) => {
                trace!(error = %err, "evaluation halted");
                Rc::new(Object::Error(err))
            }
        }
    }

    fn eval_program(&mut self, prog: &Program) -> Result<Rc<Object>, RuntimeError> {
        let mut result = Object::null();

        for stmt in &prog.statements {
            match self.eval_statement(stmt) {
                Ok(val) => result = val,
                // A top-level return ends the program with its value
                Err(Halt::Return(val)) => return Ok(val),
                Err(Halt::Error(err)) => return Err(err),
            }
        }

        Ok(result)
    }

    /// Evaluate the body of a function or macro. A `return` inside it stops here.
    pub(crate) fn eval_body(&mut self, body: &BlockStatement) -> Result<Rc<Object>, RuntimeError> {
        match self.eval_block_statement(body) {
            Ok(val) | Err(Halt::Return(val)) => Ok(val),
            Err(Halt::Error(err)) => Err(err),
        }
    }

    fn eval_block_statement(&mut self, block: &BlockStatement) -> EvalResult {
        let mut result = Object::null();

        for stmt in &block.statements {
            result = self.eval_statement(stmt)?;
        }

        Ok(result)
    }

    fn eval_statement(&mut self, stmt: &Statement) -> EvalResult {
        match stmt {
            Statement::Expression { expression } => self.eval_expression(expression),
            Statement::Return { value } => {
                let obj = self.eval_expression(value)?;
                Err(Halt::Return(obj))
            }
            Statement::Let { name, value } => {
                let obj = self.eval_expression(value)?;
                self.env.borrow_mut().set(name.name.clone(), obj);
                Ok(Object::null())
            }
        }
    }

    pub(crate) fn eval_expression(&mut self, expr: &Expression) -> EvalResult {
        match expr {
            Expression::Integer(value) => Ok(Rc::new(Object::Integer(*value))),
            Expression::Boolean(value) => Ok(Object::boolean(*value)),
            Expression::String(value) => Ok(Rc::new(Object::String(value.clone()))),
            Expression::Null => Ok(Object::null()),
            Expression::Identifier(identifier) => self.eval_identifier_expression(identifier),

            Expression::Prefix(prefix) => {
                let right = self.eval_expression(&prefix.right)?;
                Ok(eval_prefix_expression(&prefix.operator, right)?)
            }
            Expression::Infix(infix) => {
                let left = self.eval_expression(&infix.left)?;
                let right = self.eval_expression(&infix.right)?;
                Ok(eval_infix_expression(&infix.operator, left, right)?)
            }

            Expression::If(if_expr) => self.eval_if_expression(if_expr),

            Expression::Array(arr) => {
                let elements = self.eval_expressions(&arr.elements)?;
                Ok(Rc::new(Object::Array(Array { elements })))
            }
            Expression::Hash(hash) => self.eval_hash_literal(hash),
            Expression::Index(expr) => {
                let left = self.eval_expression(&expr.left)?;
                let index = self.eval_expression(&expr.index)?;
                Ok(eval_index_expression(left, index)?)
            }

            Expression::Function(func) => Ok(Rc::new(Object::Function(Function {
                parameters: func.parameters.clone(),
                body: Rc::clone(&func.body),
                env: Rc::clone(&self.env),
            }))),
            Expression::Macro(mac) => Ok(Rc::new(Object::Macro(Macro {
                parameters: mac.parameters.clone(),
                body: Rc::clone(&mac.body),
                env: Rc::clone(&self.env),
            }))),
            Expression::Call(call) => {
                // `quote` takes its argument unevaluated
                if expr.called_name() == Some(QUOTE) {
                    return self.eval_quote(&call.arguments);
                }

                let func = self.eval_expression(&call.function)?;
                let args = self.eval_expressions(&call.arguments)?;
                self.apply_function(func, args)
            }
        }
    }

    /// Evaluate left to right, stopping at the first error or return.
    fn eval_expressions(&mut self, exprs: &[Expression]) -> Result<Vec<Rc<Object>>, Halt> {
        exprs.iter().map(|expr| self.eval_expression(expr)).collect()
    }

    fn eval_identifier_expression(&self, identifier: &IdentifierLiteral) -> EvalResult {
        let result = self.env.borrow().get(&identifier.name);

        match result {
            Some(obj) => Ok(obj),
            // If we don't find the identifier, look it up as a builtin
            // NOTE: This means that builtins are not "in environment/scope" like other variables
            None => match Builtin::lookup(&identifier.name) {
                Some(builtin) => Ok(Rc::new(Object::Builtin(builtin))),
                None => Err(RuntimeError::IdentifierNotFound(identifier.name.clone()).into()),
            },
        }
    }

    fn eval_if_expression(&mut self, if_expr: &IfExpression) -> EvalResult {
        let condition = self.eval_expression(&if_expr.condition)?;

        if condition.is_truthy() {
            self.eval_block_statement(&if_expr.consequence)
        } else if let Some(alternative) = &if_expr.alternative {
            self.eval_block_statement(alternative)
        } else {
            Ok(Object::null())
        }
    }

    fn eval_hash_literal(&mut self, hash: &HashLiteral) -> EvalResult {
        let mut result = Hash::default();

        for (key_expr, value_expr) in &hash.pairs {
            let key = self.eval_expression(key_expr)?;
            let hash_key = key.hash_key()?;
            let value = self.eval_expression(value_expr)?;
            // A repeated key keeps its first position but takes the latest value
            result.pairs.insert(hash_key, HashPair { key, value });
        }

        Ok(Rc::new(Object::Hash(result)))
    }

    fn eval_quote(&mut self, args: &[Expression]) -> EvalResult {
        match args {
            [node] => quote::quote(node.clone(), self),
            _ => Err(RuntimeError::BadArity {
                expected: 1,
                got: args.len(),
            }
            .into()),
        }
    }

    fn apply_function(&mut self, func: Rc<Object>, args: Vec<Rc<Object>>) -> EvalResult {
        match func.as_ref() {
            Object::Function(func) => {
                // Create a new scoped environment for function
                let mut scoped_env = Environment::new_enclosed(Rc::clone(&func.env));

                // Add arguments as variables in function's environment
                // Extra arguments are dropped and missing ones are null
                let mut args = args.into_iter();
                for ident in &func.parameters {
                    scoped_env.set(ident.name.clone(), args.next().unwrap_or_else(Object::null));
                }

                // Remember current environment (when exiting from call)
                let current_env = std::mem::replace(&mut self.env, Rc::new(RefCell::new(scoped_env)));
                trace!(depth = self.env.borrow().depth(), "applying function");

                // Actually evaluate the function
                let result = self.eval_body(&func.body);

                self.env = current_env;

                Ok(result?)
            }
            // Builtins handle themselves
            Object::Builtin(builtin) => {
                trace!(builtin = builtin.name(), "applying builtin");
                Ok(builtin.apply(args)?)
            }
            other => Err(RuntimeError::NotAFunction(other.typename()).into()),
        }
    }
}

fn eval_prefix_expression(operator: &Token, right: Rc<Object>) -> OperatorResult {
    match (operator, right.as_ref()) {
        (Token::Bang, _) => Ok(Object::boolean(!right.is_truthy())),
        (Token::Minus, Object::Integer(value)) => Ok(Rc::new(Object::Integer(value.wrapping_neg()))),
        _ => Err(RuntimeError::UnknownPrefixOperator {
            operator: operator.clone(),
            right: right.typename(),
        }),
    }
}

fn eval_infix_expression(operator: &Token, left: Rc<Object>, right: Rc<Object>) -> OperatorResult {
    match (left.as_ref(), right.as_ref()) {
        (Object::Integer(left_value), Object::Integer(right_value)) => {
            eval_integer_infix_expression(operator, *left_value, *right_value)
        }
        (Object::String(left_value), Object::String(right_value)) => {
            eval_string_infix_expression(operator, left_value, right_value)
        }
        _ => match operator {
            Token::EqualEqual => Ok(Object::boolean(is_same_object(&left, &right))),
            Token::BangEqual => Ok(Object::boolean(!is_same_object(&left, &right))),
            _ if left.typename() != right.typename() => Err(RuntimeError::TypeMismatch {
                operator: operator.clone(),
                left: left.typename(),
                right: right.typename(),
            }),
            _ => Err(RuntimeError::UnknownInfixOperator {
                operator: operator.clone(),
                left: left.typename(),
                right: right.typename(),
            }),
        },
    }
}

/// Booleans and null compare by value, everything else by identity.
fn is_same_object(left: &Rc<Object>, right: &Rc<Object>) -> bool {
    match (left.as_ref(), right.as_ref()) {
        (Object::Boolean(left_value), Object::Boolean(right_value)) => left_value == right_value,
        (Object::Null, Object::Null) => true,
        _ => Rc::ptr_eq(left, right),
    }
}

fn eval_integer_infix_expression(operator: &Token, left_value: i64, right_value: i64) -> OperatorResult {
    match operator {
        Token::Plus => Ok(Rc::new(Object::Integer(left_value.wrapping_add(right_value)))),
        Token::Minus => Ok(Rc::new(Object::Integer(left_value.wrapping_sub(right_value)))),
        Token::Star => Ok(Rc::new(Object::Integer(left_value.wrapping_mul(right_value)))),
        Token::Slash => match right_value {
            0 => Err(RuntimeError::DivisionByZero),
            _ => Ok(Rc::new(Object::Integer(left_value.wrapping_div(right_value)))),
        },

        Token::LessThan => Ok(Object::boolean(left_value < right_value)),
        Token::GreaterThan => Ok(Object::boolean(left_value > right_value)),
        Token::EqualEqual => Ok(Object::boolean(left_value == right_value)),
        Token::BangEqual => Ok(Object::boolean(left_value != right_value)),

        operator => Err(RuntimeError::UnknownInfixOperator {
            operator: operator.clone(),
            left: "INTEGER",
            right: "INTEGER",
        }),
    }
}

fn eval_string_infix_expression(operator: &Token, left_value: &str, right_value: &str) -> OperatorResult {
    match operator {
        Token::Plus => Ok(Rc::new(Object::String(left_value.to_owned() + right_value))),
        operator => Err(RuntimeError::UnknownInfixOperator {
            operator: operator.clone(),
            left: "STRING",
            right: "STRING",
        }),
    }
}

fn eval_index_expression(left: Rc<Object>, index: Rc<Object>) -> OperatorResult {
    match (left.as_ref(), index.as_ref()) {
        (Object::Array(arr), Object::Integer(i)) => {
            // Out of bounds yields null
            let element = usize::try_from(*i).ok().and_then(|i| arr.elements.get(i));
            Ok(element.map_or_else(Object::null, Rc::clone))
        }
        (Object::Hash(hash), _) => {
            let key = index.hash_key()?;
            Ok(hash
                .pairs
                .get(&key)
                .map_or_else(Object::null, |pair| Rc::clone(&pair.value)))
        }
        _ => Err(RuntimeError::IndexNotSupported(left.typename())),
    }
}
