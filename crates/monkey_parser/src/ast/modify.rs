//! Post-order rewriting of syntax trees.
//!
//! Every function here takes ownership of a node, rebuilds its children
//! first and then hands each rebuilt expression to the `modifier`, whose
//! result takes the expression's place in the parent. The modifier may fail,
//! which aborts the whole rewrite.

use std::rc::Rc;

use crate::ast::{
    ArrayLiteral, BlockStatement, CallExpression, Expression, FunctionLiteral, HashLiteral,
    IfExpression, IndexExpression, InfixExpression, MacroLiteral, PrefixExpression, Program,
    Statement,
};

pub fn modify_program<E, F>(program: Program, modifier: &mut F) -> Result<Program, E>
where
    F: FnMut(Expression) -> Result<Expression, E>,
{
    let statements = modify_statements(program.statements, modifier)?;
    Ok(Program { statements })
}

pub fn modify_block<E, F>(block: BlockStatement, modifier: &mut F) -> Result<BlockStatement, E>
where
    F: FnMut(Expression) -> Result<Expression, E>,
{
    let statements = modify_statements(block.statements, modifier)?;
    Ok(BlockStatement { statements })
}

pub fn modify_statement<E, F>(statement: Statement, modifier: &mut F) -> Result<Statement, E>
where
    F: FnMut(Expression) -> Result<Expression, E>,
{
    Ok(match statement {
        Statement::Let { name, value } => Statement::Let {
            name,
            value: modify_expression(value, modifier)?,
        },
        Statement::Return { value } => Statement::Return {
            value: modify_expression(value, modifier)?,
        },
        Statement::Expression { expression } => Statement::Expression {
            expression: modify_expression(expression, modifier)?,
        },
    })
}

pub fn modify_expression<E, F>(expression: Expression, modifier: &mut F) -> Result<Expression, E>
where
    F: FnMut(Expression) -> Result<Expression, E>,
{
    let rebuilt = match expression {
        Expression::Prefix(prefix) => {
            let PrefixExpression { operator, right } = *prefix;
            Expression::Prefix(Box::new(PrefixExpression {
                operator,
                right: modify_expression(right, modifier)?,
            }))
        }
        Expression::Infix(infix) => {
            let InfixExpression {
                left,
                operator,
                right,
            } = *infix;
            Expression::Infix(Box::new(InfixExpression {
                left: modify_expression(left, modifier)?,
                operator,
                right: modify_expression(right, modifier)?,
            }))
        }
        Expression::If(if_expr) => {
            let IfExpression {
                condition,
                consequence,
                alternative,
            } = *if_expr;
            Expression::If(Box::new(IfExpression {
                condition: modify_expression(condition, modifier)?,
                consequence: modify_block(consequence, modifier)?,
                alternative: alternative
                    .map(|alt| modify_block(alt, modifier))
                    .transpose()?,
            }))
        }
        Expression::Function(func) => {
            let FunctionLiteral { parameters, body } = *func;
            Expression::Function(Box::new(FunctionLiteral {
                parameters,
                body: Rc::new(modify_block(unshare(body), modifier)?),
            }))
        }
        Expression::Macro(mac) => {
            let MacroLiteral { parameters, body } = *mac;
            Expression::Macro(Box::new(MacroLiteral {
                parameters,
                body: Rc::new(modify_block(unshare(body), modifier)?),
            }))
        }
        Expression::Call(call) => {
            let CallExpression {
                function,
                arguments,
            } = *call;
            Expression::Call(Box::new(CallExpression {
                function: modify_expression(function, modifier)?,
                arguments: modify_expressions(arguments, modifier)?,
            }))
        }
        Expression::Array(array) => Expression::Array(Box::new(ArrayLiteral {
            elements: modify_expressions(array.elements, modifier)?,
        })),
        Expression::Hash(hash) => {
            let pairs = hash
                .pairs
                .into_iter()
                .map(|(key, value)| {
                    Ok((
                        modify_expression(key, modifier)?,
                        modify_expression(value, modifier)?,
                    ))
                })
                .collect::<Result<Vec<_>, E>>()?;
            Expression::Hash(Box::new(HashLiteral { pairs }))
        }
        Expression::Index(index) => {
            let IndexExpression { left, index } = *index;
            Expression::Index(Box::new(IndexExpression {
                left: modify_expression(left, modifier)?,
                index: modify_expression(index, modifier)?,
            }))
        }
        // Leaves have no children to rewrite
        leaf @ (Expression::Identifier(_)
        | Expression::Integer(_)
        | Expression::Boolean(_)
        | Expression::String(_)
        | Expression::Null) => leaf,
    };

    modifier(rebuilt)
}

fn modify_statements<E, F>(statements: Vec<Statement>, modifier: &mut F) -> Result<Vec<Statement>, E>
where
    F: FnMut(Expression) -> Result<Expression, E>,
{
    statements
        .into_iter()
        .map(|statement| modify_statement(statement, modifier))
        .collect()
}

fn modify_expressions<E, F>(
    expressions: Vec<Expression>,
    modifier: &mut F,
) -> Result<Vec<Expression>, E>
where
    F: FnMut(Expression) -> Result<Expression, E>,
{
    expressions
        .into_iter()
        .map(|expression| modify_expression(expression, modifier))
        .collect()
}

/// Take the block out of its `Rc`, cloning only if a function object still holds it.
fn unshare(body: Rc<BlockStatement>) -> BlockStatement {
    Rc::try_unwrap(body).unwrap_or_else(|shared| (*shared).clone())
}
