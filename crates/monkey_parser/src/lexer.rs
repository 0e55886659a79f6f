use std::iter::Peekable;
use std::str::Chars;

use crate::span::{BytePos, Span, WithSpan};
use crate::token::Token;

pub struct Lexer<'a> {
    input_iter: Peekable<Chars<'a>>,
    current_position: BytePos,
    /// Set once the iterator has handed out the EOF token
    finished: bool,
}

impl<'a> Lexer<'a> {
    pub fn new(input: &'a str) -> Lexer<'a> {
        Lexer {
            input_iter: input.chars().peekable(),
            current_position: BytePos::new(0),
            finished: false,
        }
    }

    /// Consume the next character from the list.
    fn read_char(&mut self) -> Option<char> {
        let next = self.input_iter.next();
        if let Some(c) = next {
            self.current_position = self.current_position.shift(c);
        }
        next
    }

    /// Get the next character from the list without consuming it.
    fn peek_char(&mut self) -> Option<&char> {
        self.input_iter.peek()
    }

    /// Consume whitespace until a non-whitespace character is found.
    fn skip_whitespace(&mut self) {
        while let Some(&c) = self.peek_char() {
            if c.is_whitespace() {
                self.read_char();
            } else {
                break;
            }
        }
    }

    /// Read everything up to the closing quote as the contents of a string.
    ///
    /// There are no escape sequences. A string that is never closed runs to the
    /// end of the input.
    fn read_string(&mut self) -> Token {
        let mut str = String::new();

        while let Some(ch) = self.read_char() {
            if ch == '"' {
                break;
            }
            str.push(ch);
        }

        Token::String(str)
    }

    /// Read the current and following digits as an integer token.
    fn read_number(&mut self, first: char) -> Token {
        let mut digits = String::new();
        digits.push(first);

        while let Some(&ch) = self.peek_char() {
            if is_digit(ch) {
                digits.push(ch);
                self.read_char();
            } else {
                break;
            }
        }

        Token::Integer(digits)
    }

    /// Read the current and following characters as an identifier or a keyword (if it exists).
    fn read_identifier_or_keyword(&mut self, first: char) -> Token {
        let mut identifier = String::new();
        identifier.push(first);

        // Digits are allowed anywhere but the start
        while let Some(&ch) = self.peek_char() {
            if is_identifier_char(ch) || is_digit(ch) {
                identifier.push(ch);
                self.read_char();
            } else {
                break;
            }
        }

        Token::lookup_keyword(&identifier).unwrap_or(Token::Identifier(identifier))
    }

    /// Read a new token from the characters list.
    ///
    /// Once the input is exhausted every call returns `Token::Eof`.
    pub fn next_token(&mut self) -> WithSpan<Token> {
        self.skip_whitespace();

        let initial_position = self.current_position;

        let token = if let Some(c) = self.read_char() {
            match c {
                '+' => Token::Plus,
                '-' => Token::Minus,
                '*' => Token::Star,
                '/' => Token::Slash,

                '=' => match self.peek_char() {
                    Some('=') => {
                        self.read_char();
                        Token::EqualEqual
                    }
                    _ => Token::Equal,
                },
                '!' => match self.peek_char() {
                    Some('=') => {
                        self.read_char();
                        Token::BangEqual
                    }
                    _ => Token::Bang,
                },
                '<' => Token::LessThan,
                '>' => Token::GreaterThan,

                ',' => Token::Comma,
                ';' => Token::Semicolon,
                ':' => Token::Colon,

                '(' => Token::LeftParen,
                ')' => Token::RightParen,
                '{' => Token::LeftBrace,
                '}' => Token::RightBrace,
                '[' => Token::LeftBracket,
                ']' => Token::RightBracket,

                '"' => self.read_string(),

                c if is_digit(c) => self.read_number(c),
                c if is_identifier_char(c) => self.read_identifier_or_keyword(c),

                c => Token::Illegal(c),
            }
        } else {
            Token::Eof
        };

        let span = Span::new(initial_position, self.current_position);

        WithSpan::new(token, span)
    }
}

impl<'a> Iterator for Lexer<'a> {
    type Item = WithSpan<Token>;

    /// Yields every token including a single trailing `Token::Eof`.
    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }

        let token = self.next_token();
        if token.value == Token::Eof {
            self.finished = true;
        }
        Some(token)
    }
}

/// Whether or not the given character is a digit
fn is_digit(c: char) -> bool {
    c.is_ascii_digit()
}

/// Whether or not the given character can start an identifier
fn is_identifier_char(c: char) -> bool {
    c.is_alphabetic() || c == '_'
}

#[cfg(test)]
mod tests {
    use crate::lexer::Lexer;
    use crate::span::{BytePos, Span};
    use crate::token::Token;

    fn ident(name: &str) -> Token {
        Token::Identifier(name.to_owned())
    }

    fn int(digits: &str) -> Token {
        Token::Integer(digits.to_owned())
    }

    #[test]
    fn test_operators() {
        let input = "=+-!*/<> == !=";
        let mut lex = Lexer::new(input);

        assert_eq!(lex.next_token().value, Token::Equal);
        assert_eq!(lex.next_token().value, Token::Plus);
        assert_eq!(lex.next_token().value, Token::Minus);
        assert_eq!(lex.next_token().value, Token::Bang);
        assert_eq!(lex.next_token().value, Token::Star);
        assert_eq!(lex.next_token().value, Token::Slash);
        assert_eq!(lex.next_token().value, Token::LessThan);
        assert_eq!(lex.next_token().value, Token::GreaterThan);
        assert_eq!(lex.next_token().value, Token::EqualEqual);
        assert_eq!(lex.next_token().value, Token::BangEqual);
        assert_eq!(lex.next_token().value, Token::Eof);
    }

    #[test]
    fn test_delimiters() {
        let input = ",;:(){}[]";
        let mut lex = Lexer::new(input);

        assert_eq!(lex.next_token().value, Token::Comma);
        assert_eq!(lex.next_token().value, Token::Semicolon);
        assert_eq!(lex.next_token().value, Token::Colon);

        assert_eq!(lex.next_token().value, Token::LeftParen);
        assert_eq!(lex.next_token().value, Token::RightParen);
        assert_eq!(lex.next_token().value, Token::LeftBrace);
        assert_eq!(lex.next_token().value, Token::RightBrace);
        assert_eq!(lex.next_token().value, Token::LeftBracket);
        assert_eq!(lex.next_token().value, Token::RightBracket);
    }

    #[test]
    fn test_identifier() {
        let input = "hello _world _hello_world_ add2 x1y";
        let mut lex = Lexer::new(input);

        assert_eq!(lex.next_token().value, ident("hello"));
        assert_eq!(lex.next_token().value, ident("_world"));
        assert_eq!(lex.next_token().value, ident("_hello_world_"));
        assert_eq!(lex.next_token().value, ident("add2"));
        assert_eq!(lex.next_token().value, ident("x1y"));
    }

    #[test]
    fn test_integer() {
        let input = "5 012312 2a";
        let mut lex = Lexer::new(input);

        assert_eq!(lex.next_token().value, int("5"));
        assert_eq!(lex.next_token().value, int("012312"));
        // A digit run ends where the letters start
        assert_eq!(lex.next_token().value, int("2"));
        assert_eq!(lex.next_token().value, ident("a"));
    }

    #[test]
    fn test_string() {
        let input = "\"foobar\" \"foo bar\" \"a\\nb\" \"\"";
        let mut lex = Lexer::new(input);

        assert_eq!(lex.next_token().value, Token::String("foobar".into()));
        assert_eq!(lex.next_token().value, Token::String("foo bar".into()));
        // No escape processing
        assert_eq!(lex.next_token().value, Token::String("a\\nb".into()));
        assert_eq!(lex.next_token().value, Token::String("".into()));
        assert_eq!(lex.next_token().value, Token::Eof);
    }

    #[test]
    fn test_unterminated_string_runs_to_eof() {
        let mut lex = Lexer::new("\"not closed");

        assert_eq!(lex.next_token().value, Token::String("not closed".into()));
        assert_eq!(lex.next_token().value, Token::Eof);
    }

    #[test]
    fn test_keywords() {
        let input = "true false null fn let if else return macro";
        let mut lex = Lexer::new(input);

        assert_eq!(lex.next_token().value, Token::True);
        assert_eq!(lex.next_token().value, Token::False);
        assert_eq!(lex.next_token().value, Token::Null);
        assert_eq!(lex.next_token().value, Token::Fn);
        assert_eq!(lex.next_token().value, Token::Let);
        assert_eq!(lex.next_token().value, Token::If);
        assert_eq!(lex.next_token().value, Token::Else);
        assert_eq!(lex.next_token().value, Token::Return);
        assert_eq!(lex.next_token().value, Token::Macro);
    }

    #[test]
    fn test_illegal() {
        let mut lex = Lexer::new("a @ & |");

        assert_eq!(lex.next_token().value, ident("a"));
        assert_eq!(lex.next_token().value, Token::Illegal('@'));
        assert_eq!(lex.next_token().value, Token::Illegal('&'));
        assert_eq!(lex.next_token().value, Token::Illegal('|'));
        assert_eq!(lex.next_token().value, Token::Eof);
    }

    #[test]
    fn test_program() {
        let input = "
            let add = fn(x, y) {
                x + y;
            };
            let result = add(five, ten);
            [1, 2];
            {\"foo\": \"bar\"}
            let unless = macro(x) { x };
        ";

        let expected = vec![
            Token::Let,
            ident("add"),
            Token::Equal,
            Token::Fn,
            Token::LeftParen,
            ident("x"),
            Token::Comma,
            ident("y"),
            Token::RightParen,
            Token::LeftBrace,
            ident("x"),
            Token::Plus,
            ident("y"),
            Token::Semicolon,
            Token::RightBrace,
            Token::Semicolon,
            Token::Let,
            ident("result"),
            Token::Equal,
            ident("add"),
            Token::LeftParen,
            ident("five"),
            Token::Comma,
            ident("ten"),
            Token::RightParen,
            Token::Semicolon,
            Token::LeftBracket,
            int("1"),
            Token::Comma,
            int("2"),
            Token::RightBracket,
            Token::Semicolon,
            Token::LeftBrace,
            Token::String("foo".into()),
            Token::Colon,
            Token::String("bar".into()),
            Token::RightBrace,
            Token::Let,
            ident("unless"),
            Token::Equal,
            Token::Macro,
            Token::LeftParen,
            ident("x"),
            Token::RightParen,
            Token::LeftBrace,
            ident("x"),
            Token::RightBrace,
            Token::Semicolon,
            Token::Eof,
        ];

        let tokens: Vec<Token> = Lexer::new(input).map(|token| token.value).collect();
        assert_eq!(tokens, expected);
    }

    #[test]
    fn test_eof_repeats() {
        let mut lex = Lexer::new("");
        assert_eq!(lex.next_token().value, Token::Eof);
        assert_eq!(lex.next_token().value, Token::Eof);
        assert_eq!(lex.next_token().value, Token::Eof);
    }

    #[test]
    fn test_iterator_stops_after_eof() {
        let tokens: Vec<_> = Lexer::new("1").collect();
        assert_eq!(tokens.len(), 2);
        assert_eq!(tokens[1].value, Token::Eof);
    }

    #[test]
    fn test_spans_eof() {
        let input = "1";
        let mut lex = Lexer::new(input);

        // Skip the `1`
        lex.next_token();

        let final_span = Span::new(BytePos::new(1), BytePos::new(1));
        // Make sure that the span does not change upon hitting eof
        assert_eq!(lex.next_token().span, final_span);
        assert_eq!(lex.next_token().span, final_span);
    }

    #[test]
    fn test_spans() {
        let input = "abc 12 != \"hi\"";
        let mut lex = Lexer::new(input);

        assert_eq!(
            lex.next_token().span,
            Span::new(BytePos::new(0), BytePos::new(3))
        );
        assert_eq!(
            lex.next_token().span,
            Span::new(BytePos::new(4), BytePos::new(6))
        );
        assert_eq!(
            lex.next_token().span,
            Span::new(BytePos::new(7), BytePos::new(9))
        );
        assert_eq!(
            lex.next_token().span,
            Span::new(BytePos::new(10), BytePos::new(14))
        );
    }
}
