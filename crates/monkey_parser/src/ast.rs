use crate::token::Token;
use std::{fmt::Display, rc::Rc};

pub mod modify;

#[derive(Debug, Default, PartialEq, Clone)]
pub struct Program {
    pub statements: Vec<Statement>,
}

impl Program {
    pub fn new() -> Program {
        Program {
            statements: Vec::new(),
        }
    }
}

impl Display for Program {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for stmt in &self.statements {
            write!(f, "{}", stmt)?;
        }
        Ok(())
    }
}

#[derive(Debug, PartialEq, Clone)]
pub enum Statement {
    Let {
        /// The name/identifier of the variable
        name: IdentifierLiteral,
        /// The value being assigned
        value: Expression,
    },
    Return {
        /// The value being returned
        value: Expression,
    },
    Expression {
        /// The expression for this statement
        expression: Expression,
    },
}

impl Statement {
    /// The token this statement starts with.
    pub fn token(&self) -> Token {
        match self {
            Statement::Let { .. } => Token::Let,
            Statement::Return { .. } => Token::Return,
            Statement::Expression { expression } => expression.token(),
        }
    }
}

impl Display for Statement {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        use Statement::*;

        match self {
            Let { name, value } => write!(
                f,
                "{tok} {ident} = {val};",
                tok = Token::Let,
                ident = name,
                val = value
            ),
            Return { value } => write!(f, "{} {};", Token::Return, value),
            Expression { expression } => write!(f, "{}", expression),
        }
    }
}

#[derive(Debug, Default, PartialEq, Clone)]
pub struct BlockStatement {
    pub statements: Vec<Statement>,
}

impl Display for BlockStatement {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for stmt in &self.statements {
            write!(f, "{}", stmt)?;
        }
        Ok(())
    }
}

#[derive(Debug, PartialEq, Clone)]
pub enum Expression {
    // Literal
    Identifier(IdentifierLiteral),
    Integer(i64),
    Boolean(bool),
    String(String),
    Null,

    // Complex
    Prefix(Box<PrefixExpression>),
    Infix(Box<InfixExpression>),
    If(Box<IfExpression>),
    Function(Box<FunctionLiteral>),
    Macro(Box<MacroLiteral>),
    Call(Box<CallExpression>),
    Array(Box<ArrayLiteral>),
    Hash(Box<HashLiteral>),
    Index(Box<IndexExpression>),
}

impl Expression {
    /// Re-derive the token this expression was parsed from.
    ///
    /// Composite expressions report the token that introduced them, e.g. the
    /// operator of an infix expression or the `(` of a call.
    pub fn token(&self) -> Token {
        use Expression::*;

        match self {
            Identifier(ident) => Token::Identifier(ident.name.clone()),
            Integer(value) => Token::Integer(value.to_string()),
            Boolean(true) => Token::True,
            Boolean(false) => Token::False,
            String(value) => Token::String(value.clone()),
            Null => Token::Null,

            Prefix(prefix) => prefix.operator.clone(),
            Infix(infix) => infix.operator.clone(),
            If(_) => Token::If,
            Function(_) => Token::Fn,
            Macro(_) => Token::Macro,
            Call(_) => Token::LeftParen,
            Array(_) => Token::LeftBracket,
            Hash(_) => Token::LeftBrace,
            Index(_) => Token::LeftBracket,
        }
    }

    /// The name of the function being called, if this is a call of a plain
    /// identifier (e.g. `quote(x)`).
    pub fn called_name(&self) -> Option<&str> {
        match self {
            Expression::Call(call) => match &call.function {
                Expression::Identifier(ident) => Some(&ident.name),
                _ => None,
            },
            _ => None,
        }
    }
}

impl Display for Expression {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        use Expression::*;

        match self {
            Identifier(name) => write!(f, "{}", name),
            Integer(value) => write!(f, "{}", value),
            Boolean(value) => write!(f, "{}", value),
            String(value) => write!(f, "\"{}\"", value),
            Null => write!(f, "{}", Token::Null),

            Prefix(prefix) => write!(f, "{}", prefix),
            Infix(infix) => write!(f, "{}", infix),
            If(if_exp) => write!(f, "{}", if_exp),
            Function(func) => write!(f, "{}", func),
            Macro(mac) => write!(f, "{}", mac),
            Call(call) => write!(f, "{}", call),
            Array(arr) => write!(f, "{}", arr),
            Hash(hash) => write!(f, "{}", hash),
            Index(index) => write!(f, "{}", index),
        }
    }
}

#[derive(Debug, PartialEq, Clone)]
pub struct IdentifierLiteral {
    pub name: String,
}

impl Display for IdentifierLiteral {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name)
    }
}

impl From<&str> for IdentifierLiteral {
    fn from(name: &str) -> Self {
        Self {
            name: name.to_owned(),
        }
    }
}

impl From<String> for IdentifierLiteral {
    fn from(name: String) -> Self {
        Self { name }
    }
}

#[derive(Debug, PartialEq, Clone)]
pub struct PrefixExpression {
    pub operator: Token,
    pub right: Expression,
}

impl Display for PrefixExpression {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({op}{r})", op = self.operator, r = self.right)
    }
}

#[derive(Debug, PartialEq, Clone)]
pub struct InfixExpression {
    pub left: Expression,
    pub operator: Token,
    pub right: Expression,
}

impl Display for InfixExpression {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "({l} {op} {r})",
            l = self.left,
            op = self.operator,
            r = self.right
        )
    }
}

#[derive(Debug, PartialEq, Clone)]
pub struct IfExpression {
    pub condition: Expression,
    /// Block if condition is true
    pub consequence: BlockStatement,
    /// Block if condition is false
    pub alternative: Option<BlockStatement>,
}

impl Display for IfExpression {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "if {} {}", self.condition, self.consequence)?;

        if let Some(ref alt) = self.alternative {
            write!(f, " else {}", alt)?;
        }

        Ok(())
    }
}

#[derive(Debug, PartialEq, Clone)]
pub struct FunctionLiteral {
    /// Parameter identifiers
    pub parameters: Vec<IdentifierLiteral>,
    /// Shared with every function object created from this literal
    pub body: Rc<BlockStatement>,
}

impl Display for FunctionLiteral {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}({}) {}",
            Token::Fn,
            join(&self.parameters),
            self.body
        )
    }
}

#[derive(Debug, PartialEq, Clone)]
pub struct MacroLiteral {
    pub parameters: Vec<IdentifierLiteral>,
    pub body: Rc<BlockStatement>,
}

impl Display for MacroLiteral {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}({}) {}",
            Token::Macro,
            join(&self.parameters),
            self.body
        )
    }
}

#[derive(Debug, PartialEq, Clone)]
pub struct CallExpression {
    pub function: Expression,
    pub arguments: Vec<Expression>,
}

impl Display for CallExpression {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}({})", self.function, join(&self.arguments))
    }
}

#[derive(Debug, PartialEq, Clone)]
pub struct ArrayLiteral {
    pub elements: Vec<Expression>,
}

impl Display for ArrayLiteral {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}]", join(&self.elements))
    }
}

#[derive(Debug, PartialEq, Clone)]
pub struct HashLiteral {
    /// Key/value pairs in source order
    pub pairs: Vec<(Expression, Expression)>,
}

impl Display for HashLiteral {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let pairs = self
            .pairs
            .iter()
            .map(|(key, value)| format!("{}: {}", key, value))
            .collect::<Vec<String>>()
            .join(", ");

        write!(f, "{{{}}}", pairs)
    }
}

#[derive(Debug, PartialEq, Clone)]
pub struct IndexExpression {
    pub left: Expression,
    pub index: Expression,
}

impl Display for IndexExpression {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}[{}])", self.left, self.index)
    }
}

fn join<T: Display>(items: &[T]) -> String {
    items
        .iter()
        .map(|item| item.to_string())
        .collect::<Vec<String>>()
        .join(", ")
}
