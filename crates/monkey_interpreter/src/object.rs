use std::{cell::RefCell, fmt, fmt::Display, rc::Rc};

use indexmap::IndexMap;

use crate::{builtin::Builtin, environment::Environment, error::RuntimeError};

use monkey_parser::ast::{BlockStatement, Expression, IdentifierLiteral};

thread_local! {
    static TRUE: Rc<Object> = Rc::new(Object::Boolean(true));
    static FALSE: Rc<Object> = Rc::new(Object::Boolean(false));
    static NULL: Rc<Object> = Rc::new(Object::Null);
}

#[derive(Debug, PartialEq)]
pub enum Object {
    Integer(i64),
    Boolean(bool),
    String(String),
    Null,
    Array(Array),
    Hash(Hash),
    Function(Function),
    Builtin(Builtin),
    Macro(Macro),
    /// An unevaluated expression, produced by `quote`
    Quote(Expression),
    Error(RuntimeError),
}

impl Object {
    /// The shared `true` or `false` object.
    pub fn boolean(value: bool) -> Rc<Object> {
        if value {
            TRUE.with(Rc::clone)
        } else {
            FALSE.with(Rc::clone)
        }
    }

    /// The shared `null` object.
    pub fn null() -> Rc<Object> {
        NULL.with(Rc::clone)
    }

    pub fn typename(&self) -> &'static str {
        use Object::*;

        match self {
            Integer(_) => "INTEGER",
            Boolean(_) => "BOOLEAN",
            String(_) => "STRING",
            Null => "NULL",
            Array(_) => "ARRAY",
            Hash(_) => "HASH",
            Function(_) => "FUNCTION",
            Builtin(_) => "BUILTIN",
            Macro(_) => "MACRO",
            Quote(_) => "QUOTE",
            Error(_) => "ERROR",
        }
    }

    /// Only `false` and `null` are falsy.
    pub fn is_truthy(&self) -> bool {
        !matches!(self, Object::Boolean(false) | Object::Null)
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Object::Null)
    }

    /// The key this object is stored under when used in a hash.
    pub fn hash_key(&self) -> Result<HashKey, RuntimeError> {
        match self {
            Object::Integer(value) => Ok(HashKey::Integer(*value)),
            Object::Boolean(value) => Ok(HashKey::Boolean(*value)),
            Object::String(value) => Ok(HashKey::String(value.clone())),
            other => Err(RuntimeError::UnusableAsHashKey(other.typename())),
        }
    }
}

impl Display for Object {
    /// Inspect form shown to the user
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        use Object::*;

        match self {
            Integer(value) => write!(f, "{}", value),
            Boolean(value) => write!(f, "{}", value),
            String(value) => write!(f, "{}", value),
            Null => write!(f, "null"),
            Array(array) => write!(f, "{}", array),
            Hash(hash) => write!(f, "{}", hash),
            Function(func) => write!(f, "{}", func),
            Builtin(builtin) => write!(f, "{}", builtin),
            Macro(mac) => write!(f, "{}", mac),
            Quote(node) => write!(f, "QUOTE({})", node),
            Error(message) => write!(f, "ERROR: {}", message),
        }
    }
}

#[derive(Debug, Default, PartialEq)]
pub struct Array {
    pub elements: Vec<Rc<Object>>,
}

impl Display for Array {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let elements: Vec<String> = self.elements.iter().map(|e| e.to_string()).collect();
        write!(f, "[{}]", elements.join(", "))
    }
}

/// Identity of a hashable object: its type plus its value.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum HashKey {
    Integer(i64),
    Boolean(bool),
    String(String),
}

#[derive(Debug, PartialEq)]
pub struct HashPair {
    /// The object the key was computed from, kept for display
    pub key: Rc<Object>,
    pub value: Rc<Object>,
}

#[derive(Debug, Default, PartialEq)]
pub struct Hash {
    /// Pairs in insertion order
    pub pairs: IndexMap<HashKey, HashPair>,
}

impl Display for Hash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let pairs: Vec<String> = self
            .pairs
            .values()
            .map(|pair| format!("{}: {}", pair.key, pair.value))
            .collect();
        write!(f, "{{{}}}", pairs.join(", "))
    }
}

pub struct Function {
    pub parameters: Vec<IdentifierLiteral>,
    pub body: Rc<BlockStatement>,
    /// Environment the function was defined in
    pub env: Rc<RefCell<Environment>>,
}

impl Display for Function {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "fn({}) {{\n{}\n}}",
            join_parameters(&self.parameters),
            self.body
        )
    }
}

// The environment is left out: it usually contains the function itself.
impl fmt::Debug for Function {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Function")
            .field("parameters", &self.parameters)
            .field("body", &self.body)
            .finish_non_exhaustive()
    }
}

impl PartialEq for Function {
    /// Same code closing over the very same environment
    fn eq(&self, other: &Function) -> bool {
        Rc::ptr_eq(&self.env, &other.env)
            && self.parameters == other.parameters
            && self.body == other.body
    }
}

/// A macro bound by a top-level `let name = macro(...) { ... }`.
pub struct Macro {
    pub parameters: Vec<IdentifierLiteral>,
    pub body: Rc<BlockStatement>,
    pub env: Rc<RefCell<Environment>>,
}

impl Display for Macro {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "macro({}) {{\n{}\n}}",
            join_parameters(&self.parameters),
            self.body
        )
    }
}

impl fmt::Debug for Macro {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Macro")
            .field("parameters", &self.parameters)
            .field("body", &self.body)
            .finish_non_exhaustive()
    }
}

impl PartialEq for Macro {
    fn eq(&self, other: &Macro) -> bool {
        Rc::ptr_eq(&self.env, &other.env)
            && self.parameters == other.parameters
            && self.body == other.body
    }
}

fn join_parameters(parameters: &[IdentifierLiteral]) -> String {
    parameters
        .iter()
        .map(|p| p.to_string())
        .collect::<Vec<String>>()
        .join(", ")
}
