use std::rc::Rc;

use thiserror::Error;
use tracing::debug;

use crate::ast::{
    ArrayLiteral, BlockStatement, CallExpression, Expression, FunctionLiteral, HashLiteral,
    IdentifierLiteral, IfExpression, IndexExpression, InfixExpression, MacroLiteral,
    PrefixExpression, Program, Statement,
};
use crate::span::{Span, WithSpan};
use crate::{lexer::Lexer, token::Token};

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ParseError {
    /// A required token (delimiter, identifier, ...) was missing
    #[error("expected next token to be {expected}, got {got} instead")]
    Expected {
        expected: String,
        got: Token,
        span: Span,
    },
    /// The token cannot start an expression
    #[error("no prefix parse function for {token} found")]
    NoPrefixParseFn { token: Token, span: Span },
    /// An integer literal that does not fit in an i64
    #[error("could not parse {literal} as integer")]
    InvalidInteger { literal: String, span: Span },
}

impl ParseError {
    /// Where in the source the offending token is.
    pub fn span(&self) -> Span {
        match self {
            ParseError::Expected { span, .. }
            | ParseError::NoPrefixParseFn { span, .. }
            | ParseError::InvalidInteger { span, .. } => *span,
        }
    }
}

type ParseResult<T> = Result<T, ParseError>;

/// Binding power of operators, weakest first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum Precedence {
    Lowest,
    Equals,
    LessGreater,
    Sum,
    Product,
    Prefix,
    Call,
    Index,
}

impl From<&Token> for Precedence {
    fn from(token: &Token) -> Self {
        match token {
            Token::EqualEqual | Token::BangEqual => Precedence::Equals,
            Token::LessThan | Token::GreaterThan => Precedence::LessGreater,
            Token::Plus | Token::Minus => Precedence::Sum,
            Token::Star | Token::Slash => Precedence::Product,
            Token::LeftParen => Precedence::Call,
            Token::LeftBracket => Precedence::Index,
            _ => Precedence::Lowest,
        }
    }
}

pub struct Parser<'a> {
    lexer: Lexer<'a>,

    current_token: WithSpan<Token>,
    peek_token: WithSpan<Token>,

    errors: Vec<ParseError>,
}

impl<'a> Parser<'a> {
    pub fn new(mut lexer: Lexer<'a>) -> Parser<'a> {
        let cur = lexer.next_token();
        let next = lexer.next_token();
        Parser {
            lexer,
            current_token: cur,
            peek_token: next,
            errors: Vec::new(),
        }
    }

    /// Parse the whole input.
    ///
    /// Statements that fail to parse are left out of the program and their
    /// error is recorded, so check `errors()` before trusting the result.
    pub fn parse_program(&mut self) -> Program {
        let mut program = Program::new();

        while !self.current_token_is(&Token::Eof) {
            match self.parse_statement() {
                Ok(statement) => program.statements.push(statement),
                Err(error) => self.record(error),
            }
            self.next_token();
        }

        program
    }

    /// Every error encountered so far, in source order.
    pub fn errors(&self) -> &[ParseError] {
        &self.errors
    }

    /// Parse the whole input, failing if any error was encountered.
    pub fn finish(mut self) -> Result<Program, Vec<ParseError>> {
        let program = self.parse_program();

        if self.errors.is_empty() {
            Ok(program)
        } else {
            Err(self.errors)
        }
    }

    fn record(&mut self, error: ParseError) {
        debug!(%error, span = %error.span(), "parse error");
        self.errors.push(error);
    }

    fn parse_statement(&mut self) -> ParseResult<Statement> {
        match self.current_token.value {
            Token::Let => self.parse_let_statement(),
            Token::Return => self.parse_return_statement(),
            _ => self.parse_expression_statement(),
        }
    }

    fn parse_let_statement(&mut self) -> ParseResult<Statement> {
        let name = self.expect_peek_identifier()?;

        self.expect_peek(Token::Equal)?;
        self.next_token();

        let value = self.parse_expression(Precedence::Lowest)?;

        if self.peek_token_is(&Token::Semicolon) {
            self.next_token();
        }

        Ok(Statement::Let { name, value })
    }

    fn parse_return_statement(&mut self) -> ParseResult<Statement> {
        // Consume the `return` token
        self.next_token();

        let value = self.parse_expression(Precedence::Lowest)?;

        if self.peek_token_is(&Token::Semicolon) {
            self.next_token();
        }

        Ok(Statement::Return { value })
    }

    fn parse_expression_statement(&mut self) -> ParseResult<Statement> {
        let expression = self.parse_expression(Precedence::Lowest)?;

        if self.peek_token_is(&Token::Semicolon) {
            self.next_token();
        }

        Ok(Statement::Expression { expression })
    }

    /// Pratt loop: parse a prefix expression, then keep folding it into infix
    /// expressions while the next operator binds tighter than `precedence`.
    fn parse_expression(&mut self, precedence: Precedence) -> ParseResult<Expression> {
        let mut left = self.parse_prefix()?;

        while !self.peek_token_is(&Token::Semicolon) && precedence < self.peek_precedence() {
            left = match self.peek_token.value {
                Token::Plus
                | Token::Minus
                | Token::Star
                | Token::Slash
                | Token::EqualEqual
                | Token::BangEqual
                | Token::LessThan
                | Token::GreaterThan => {
                    self.next_token();
                    self.parse_infix_expression(left)?
                }
                Token::LeftParen => {
                    self.next_token();
                    self.parse_call_expression(left)?
                }
                Token::LeftBracket => {
                    self.next_token();
                    self.parse_index_expression(left)?
                }
                _ => return Ok(left),
            };
        }

        Ok(left)
    }

    fn parse_prefix(&mut self) -> ParseResult<Expression> {
        match &self.current_token.value {
            Token::Identifier(name) => Ok(Expression::Identifier(IdentifierLiteral::from(
                name.as_str(),
            ))),
            Token::Integer(digits) => match digits.parse() {
                Ok(value) => Ok(Expression::Integer(value)),
                Err(_) => Err(ParseError::InvalidInteger {
                    literal: digits.clone(),
                    span: self.current_token.span,
                }),
            },
            Token::String(value) => Ok(Expression::String(value.clone())),
            Token::True => Ok(Expression::Boolean(true)),
            Token::False => Ok(Expression::Boolean(false)),
            Token::Null => Ok(Expression::Null),

            Token::Bang | Token::Minus => self.parse_prefix_expression(),
            Token::LeftParen => self.parse_grouped_expression(),
            Token::If => self.parse_if_expression(),
            Token::Fn => self.parse_function_literal(),
            Token::Macro => self.parse_macro_literal(),
            Token::LeftBracket => self.parse_array_literal(),
            Token::LeftBrace => self.parse_hash_literal(),

            token => Err(ParseError::NoPrefixParseFn {
                token: token.clone(),
                span: self.current_token.span,
            }),
        }
    }

    fn parse_prefix_expression(&mut self) -> ParseResult<Expression> {
        let operator = self.current_token.value.clone();

        self.next_token();

        let right = self.parse_expression(Precedence::Prefix)?;

        Ok(Expression::Prefix(Box::new(PrefixExpression {
            operator,
            right,
        })))
    }

    fn parse_infix_expression(&mut self, left: Expression) -> ParseResult<Expression> {
        let operator = self.current_token.value.clone();
        let precedence = self.current_precedence();

        self.next_token();

        let right = self.parse_expression(precedence)?;

        Ok(Expression::Infix(Box::new(InfixExpression {
            left,
            operator,
            right,
        })))
    }

    fn parse_grouped_expression(&mut self) -> ParseResult<Expression> {
        self.next_token();

        let expression = self.parse_expression(Precedence::Lowest)?;

        self.expect_peek(Token::RightParen)?;

        Ok(expression)
    }

    fn parse_if_expression(&mut self) -> ParseResult<Expression> {
        self.expect_peek(Token::LeftParen)?;
        self.next_token();

        let condition = self.parse_expression(Precedence::Lowest)?;

        self.expect_peek(Token::RightParen)?;
        self.expect_peek(Token::LeftBrace)?;

        let consequence = self.parse_block_statement();

        let alternative = if self.peek_token_is(&Token::Else) {
            self.next_token();
            self.expect_peek(Token::LeftBrace)?;
            Some(self.parse_block_statement())
        } else {
            None
        };

        Ok(Expression::If(Box::new(IfExpression {
            condition,
            consequence,
            alternative,
        })))
    }

    /// Parse statements up to the closing `}` (or the end of input).
    ///
    /// Like `parse_program`, a statement that fails is recorded and skipped so
    /// the rest of the block is still checked.
    fn parse_block_statement(&mut self) -> BlockStatement {
        let mut block = BlockStatement::default();

        self.next_token();

        while !self.current_token_is(&Token::RightBrace) && !self.current_token_is(&Token::Eof) {
            match self.parse_statement() {
                Ok(statement) => block.statements.push(statement),
                Err(error) => self.record(error),
            }
            self.next_token();
        }

        block
    }

    fn parse_function_literal(&mut self) -> ParseResult<Expression> {
        self.expect_peek(Token::LeftParen)?;

        let parameters = self.parse_function_parameters()?;

        self.expect_peek(Token::LeftBrace)?;

        let body = Rc::new(self.parse_block_statement());

        Ok(Expression::Function(Box::new(FunctionLiteral {
            parameters,
            body,
        })))
    }

    fn parse_macro_literal(&mut self) -> ParseResult<Expression> {
        self.expect_peek(Token::LeftParen)?;

        let parameters = self.parse_function_parameters()?;

        self.expect_peek(Token::LeftBrace)?;

        let body = Rc::new(self.parse_block_statement());

        Ok(Expression::Macro(Box::new(MacroLiteral { parameters, body })))
    }

    fn parse_function_parameters(&mut self) -> ParseResult<Vec<IdentifierLiteral>> {
        let mut parameters = Vec::new();

        if self.peek_token_is(&Token::RightParen) {
            self.next_token();
            return Ok(parameters);
        }

        parameters.push(self.expect_peek_identifier()?);

        while self.peek_token_is(&Token::Comma) {
            self.next_token();
            parameters.push(self.expect_peek_identifier()?);
        }

        self.expect_peek(Token::RightParen)?;

        Ok(parameters)
    }

    fn parse_call_expression(&mut self, function: Expression) -> ParseResult<Expression> {
        let arguments = self.parse_expression_list(Token::RightParen)?;

        Ok(Expression::Call(Box::new(CallExpression {
            function,
            arguments,
        })))
    }

    fn parse_array_literal(&mut self) -> ParseResult<Expression> {
        let elements = self.parse_expression_list(Token::RightBracket)?;

        Ok(Expression::Array(Box::new(ArrayLiteral { elements })))
    }

    /// Parse comma separated expressions up to (and including) `end`.
    fn parse_expression_list(&mut self, end: Token) -> ParseResult<Vec<Expression>> {
        let mut list = Vec::new();

        if self.peek_token_is(&end) {
            self.next_token();
            return Ok(list);
        }

        self.next_token();
        list.push(self.parse_expression(Precedence::Lowest)?);

        while self.peek_token_is(&Token::Comma) {
            self.next_token();
            self.next_token();
            list.push(self.parse_expression(Precedence::Lowest)?);
        }

        self.expect_peek(end)?;

        Ok(list)
    }

    fn parse_index_expression(&mut self, left: Expression) -> ParseResult<Expression> {
        self.next_token();

        let index = self.parse_expression(Precedence::Lowest)?;

        self.expect_peek(Token::RightBracket)?;

        Ok(Expression::Index(Box::new(IndexExpression { left, index })))
    }

    fn parse_hash_literal(&mut self) -> ParseResult<Expression> {
        let mut pairs = Vec::new();

        while !self.peek_token_is(&Token::RightBrace) {
            self.next_token();
            let key = self.parse_expression(Precedence::Lowest)?;

            self.expect_peek(Token::Colon)?;

            self.next_token();
            let value = self.parse_expression(Precedence::Lowest)?;

            pairs.push((key, value));

            if !self.peek_token_is(&Token::RightBrace) {
                self.expect_peek(Token::Comma)?;
            }
        }

        self.expect_peek(Token::RightBrace)?;

        Ok(Expression::Hash(Box::new(HashLiteral { pairs })))
    }

    fn next_token(&mut self) {
        self.current_token = std::mem::replace(&mut self.peek_token, self.lexer.next_token());
    }

    fn current_token_is(&self, token: &Token) -> bool {
        &self.current_token.value == token
    }

    fn peek_token_is(&self, token: &Token) -> bool {
        &self.peek_token.value == token
    }

    fn current_precedence(&self) -> Precedence {
        Precedence::from(&self.current_token.value)
    }

    fn peek_precedence(&self) -> Precedence {
        Precedence::from(&self.peek_token.value)
    }

    /// Advance if the next token is `token`, otherwise report what was found instead.
    fn expect_peek(&mut self, token: Token) -> ParseResult<()> {
        if self.peek_token_is(&token) {
            self.next_token();
            Ok(())
        } else {
            Err(ParseError::Expected {
                expected: token.to_string(),
                got: self.peek_token.value.clone(),
                span: self.peek_token.span,
            })
        }
    }

    fn expect_peek_identifier(&mut self) -> ParseResult<IdentifierLiteral> {
        let name = match &self.peek_token.value {
            Token::Identifier(name) => name.to_owned(),
            _ => {
                return Err(ParseError::Expected {
                    expected: String::from("identifier"),
                    got: self.peek_token.value.clone(),
                    span: self.peek_token.span,
                })
            }
        };

        self.next_token();
        Ok(IdentifierLiteral::from(name))
    }
}

/// Parse `input` into a program, or every error found while trying.
pub fn parse(input: &str) -> Result<Program, Vec<ParseError>> {
    Parser::new(Lexer::new(input)).finish()
}
