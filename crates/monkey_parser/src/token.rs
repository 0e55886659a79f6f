use std::fmt;

#[derive(Debug, PartialEq, Clone)]
pub enum Token {
    // Operators
    Plus,
    Minus,
    Star,
    Slash,
    Equal,
    Bang,

    EqualEqual,
    BangEqual,
    LessThan,
    GreaterThan,

    // Delimiters
    Comma,
    Semicolon,
    Colon,

    LeftParen,
    RightParen,
    LeftBrace,
    RightBrace,
    LeftBracket,
    RightBracket,

    // Identifiers & Literals
    Identifier(String),
    /// Digits exactly as written; converted to an i64 by the parser
    Integer(String),
    String(String),

    // Keywords
    True,
    False,
    Null,
    Fn,
    Let,
    If,
    Else,
    Return,
    Macro,

    // Special
    Illegal(char),
    Eof,
}

impl Token {
    /// Get the Token for the given keyword, if valid.
    pub fn lookup_keyword(s: &str) -> Option<Token> {
        use Token::*;

        match s {
            "true" => Some(True),
            "false" => Some(False),
            "null" => Some(Null),
            "fn" => Some(Fn),
            "let" => Some(Let),
            "if" => Some(If),
            "else" => Some(Else),
            "return" => Some(Return),
            "macro" => Some(Macro),
            _ => None,
        }
    }

    /// The exact source text this token was read from.
    ///
    /// String literals give their contents without the surrounding quotes and
    /// the end of input has no text at all.
    pub fn literal(&self) -> String {
        use Token::*;

        match self {
            Identifier(name) => name.clone(),
            Integer(digits) => digits.clone(),
            String(value) => value.clone(),
            Illegal(ch) => ch.to_string(),
            Eof => std::string::String::new(),
            other => other.to_string(),
        }
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        use Token::*;

        match self {
            Plus => write!(f, "+"),
            Minus => write!(f, "-"),
            Star => write!(f, "*"),
            Slash => write!(f, "/"),
            Equal => write!(f, "="),
            Bang => write!(f, "!"),

            EqualEqual => write!(f, "=="),
            BangEqual => write!(f, "!="),
            LessThan => write!(f, "<"),
            GreaterThan => write!(f, ">"),

            Comma => write!(f, ","),
            Semicolon => write!(f, ";"),
            Colon => write!(f, ":"),

            LeftParen => write!(f, "("),
            RightParen => write!(f, ")"),
            LeftBrace => write!(f, "{{"),
            RightBrace => write!(f, "}}"),
            LeftBracket => write!(f, "["),
            RightBracket => write!(f, "]"),

            Identifier(name) => write!(f, "{}", name),
            Integer(digits) => write!(f, "{}", digits),
            String(value) => write!(f, "\"{}\"", value),

            True => write!(f, "true"),
            False => write!(f, "false"),
            Null => write!(f, "null"),
            Fn => write!(f, "fn"),
            Let => write!(f, "let"),
            If => write!(f, "if"),
            Else => write!(f, "else"),
            Return => write!(f, "return"),
            Macro => write!(f, "macro"),

            Illegal(ch) => write!(f, "ILLEGAL({})", ch),
            Eof => write!(f, "EOF"),
        }
    }
}
