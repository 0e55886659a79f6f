//! Compile-time macros.
//!
//! Macros are defined by top-level `let name = macro(params) { body };`
//! statements. [`define_macros`] moves those definitions out of the program
//! into a macro environment, then [`expand_macros`] replaces every call to a
//! defined macro with the syntax tree its body quotes. Arguments reach the
//! macro body unevaluated, as `Quote` objects.

use std::{cell::RefCell, rc::Rc};

use thiserror::Error;
use tracing::debug;

use monkey_parser::ast::{
    modify::modify_program, Expression, IdentifierLiteral, MacroLiteral, Program, Statement,
};

use crate::{
    environment::Environment,
    error::RuntimeError,
    evaluator::Evaluator,
    object::{Macro, Object},
};

/// Failures of macro expansion. These point at a broken macro rather than bad input.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum MacroError {
    #[error("macro must return a quoted expression, got {0}")]
    NotAQuote(&'static str),
    #[error("macro evaluation failed: {0}")]
    Eval(#[from] RuntimeError),
}

/// Remove every top-level macro definition from `program`, binding each in `env`.
///
/// Definitions nested in blocks or bound by anything but `let` stay in place.
#[tracing::instrument(level = "debug", skip_all)]
pub fn define_macros(program: &mut Program, env: &Rc<RefCell<Environment>>) {
    let statements = std::mem::take(&mut program.statements);

    for statement in statements {
        match statement {
            Statement::Let {
                name,
                value: Expression::Macro(mac),
            } => add_macro(name, *mac, env),
            other => program.statements.push(other),
        }
    }
}

fn add_macro(name: IdentifierLiteral, mac: MacroLiteral, env: &Rc<RefCell<Environment>>) {
    debug!(name = %name, parameters = mac.parameters.len(), "defining macro");

    let obj = Object::Macro(Macro {
        parameters: mac.parameters,
        body: mac.body,
        env: Rc::clone(env),
    });
    env.borrow_mut().set(name.name, Rc::new(obj));
}

/// Replace every call to a macro bound in `env` with the expansion of that call.
///
/// Arguments are expanded before the call that receives them. The tree a
/// macro produces is not expanded again.
#[tracing::instrument(level = "debug", skip_all)]
pub fn expand_macros(program: Program, env: &Rc<RefCell<Environment>>) -> Result<Program, MacroError> {
    modify_program(program, &mut |expression: Expression| {
        let bound = expression
            .called_name()
            .and_then(|name| env.borrow().get(name));

        match (bound.as_deref(), expression) {
            (Some(Object::Macro(mac)), Expression::Call(call)) => expand_call(mac, call.arguments),
            (_, other) => Ok(other),
        }
    })
}

fn expand_call(mac: &Macro, arguments: Vec<Expression>) -> Result<Expression, MacroError> {
    let mut macro_env = Environment::new_enclosed(Rc::clone(&mac.env));

    // Missing arguments are null, like they are for functions
    let mut arguments = arguments.into_iter();
    for ident in &mac.parameters {
        let quoted = arguments
            .next()
            .map_or_else(Object::null, |arg| Rc::new(Object::Quote(arg)));
        macro_env.set(ident.name.clone(), quoted);
    }

    debug!(depth = macro_env.depth(), "expanding macro call");

    let mut evaluator = Evaluator::new_with_env(Rc::new(RefCell::new(macro_env)));
    let evaluated = evaluator.eval_body(&mac.body)?;

    match evaluated.as_ref() {
        Object::Quote(node) => Ok(node.clone()),
        other => Err(MacroError::NotAQuote(other.typename())),
    }
}
