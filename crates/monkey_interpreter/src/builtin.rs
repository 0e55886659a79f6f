use std::{fmt::Display, rc::Rc};

use crate::{
    error::RuntimeError,
    object::{Array, Object},
};

/// Functions available in every program without being defined.
/// User bindings with the same name shadow them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Builtin {
    Len,
    First,
    Last,
    Rest,
    Push,
}

impl Builtin {
    pub fn lookup(name: &str) -> Option<Builtin> {
        match name {
            "len" => Some(Builtin::Len),
            "first" => Some(Builtin::First),
            "last" => Some(Builtin::Last),
            "rest" => Some(Builtin::Rest),
            "push" => Some(Builtin::Push),
            _ => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Builtin::Len => "len",
            Builtin::First => "first",
            Builtin::Last => "last",
            Builtin::Rest => "rest",
            Builtin::Push => "push",
        }
    }

    pub fn apply(&self, args: Vec<Rc<Object>>) -> Result<Rc<Object>, RuntimeError> {
        match self {
            Builtin::Len => {
                let arg = single_argument(&args)?;
                match arg.as_ref() {
                    Object::String(str) => Ok(Rc::new(Object::Integer(str.chars().count() as i64))),
                    Object::Array(arr) => Ok(Rc::new(Object::Integer(arr.elements.len() as i64))),
                    other => Err(self.unsupported(other)),
                }
            }
            Builtin::First => {
                let arg = single_argument(&args)?;
                match arg.as_ref() {
                    Object::String(str) => Ok(str.chars().next().map_or_else(Object::null, character)),
                    Object::Array(arr) => Ok(arr.elements.first().map_or_else(Object::null, Rc::clone)),
                    other => Err(self.unsupported(other)),
                }
            }
            Builtin::Last => {
                let arg = single_argument(&args)?;
                match arg.as_ref() {
                    Object::String(str) => Ok(str.chars().last().map_or_else(Object::null, character)),
                    Object::Array(arr) => Ok(arr.elements.last().map_or_else(Object::null, Rc::clone)),
                    other => Err(self.unsupported(other)),
                }
            }
            Builtin::Rest => {
                let arg = single_argument(&args)?;
                match arg.as_ref() {
                    Object::String(str) => Ok(Rc::new(Object::String(str.chars().skip(1).collect()))),
                    Object::Array(arr) => {
                        let elements = arr.elements.iter().skip(1).cloned().collect();
                        Ok(Rc::new(Object::Array(Array { elements })))
                    }
                    other => Err(self.unsupported(other)),
                }
            }
            Builtin::Push => {
                let (target, values) = match args.split_first() {
                    Some((target, values)) if !values.is_empty() => (target, values),
                    _ => {
                        return Err(RuntimeError::BadArity {
                            expected: 2,
                            got: args.len(),
                        })
                    }
                };

                // The target is never modified, a new object is built instead
                match target.as_ref() {
                    Object::Array(arr) => {
                        let elements = arr.elements.iter().chain(values).cloned().collect();
                        Ok(Rc::new(Object::Array(Array { elements })))
                    }
                    Object::String(str) => {
                        let mut pushed = str.clone();
                        for value in values {
                            match value.as_ref() {
                                Object::String(suffix) => pushed.push_str(suffix),
                                other => return Err(self.unsupported(other)),
                            }
                        }
                        Ok(Rc::new(Object::String(pushed)))
                    }
                    other => Err(self.unsupported(other)),
                }
            }
        }
    }

    fn unsupported(&self, arg: &Object) -> RuntimeError {
        RuntimeError::InvalidArgumentType {
            builtin: *self,
            got: arg.typename(),
        }
    }
}

impl Display for Builtin {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "builtin function {}", self.name())
    }
}

fn single_argument(args: &[Rc<Object>]) -> Result<&Rc<Object>, RuntimeError> {
    match args {
        [arg] => Ok(arg),
        _ => Err(RuntimeError::BadArity {
            expected: 1,
            got: args.len(),
        }),
    }
}

fn character(c: char) -> Rc<Object> {
    Rc::new(Object::String(c.to_string()))
}
