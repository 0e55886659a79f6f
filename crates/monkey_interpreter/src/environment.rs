use std::{cell::RefCell, collections::HashMap, rc::Rc};

use crate::object::Object;

/// A scope of bindings, linked to the scope it was created in.
#[derive(Debug, Default)]
pub struct Environment {
    store: HashMap<String, Rc<Object>>,
    outer: Option<Rc<RefCell<Environment>>>,
}

impl Environment {
    pub fn new() -> Self {
        Environment {
            store: HashMap::new(),
            outer: None,
        }
    }

    /// Create a new environment that is enclosed by a given outer environment
    pub fn new_enclosed(outer: Rc<RefCell<Environment>>) -> Self {
        Environment {
            store: HashMap::new(),
            outer: Some(outer),
        }
    }

    pub fn get(&self, name: &str) -> Option<Rc<Object>> {
        match self.store.get(name) {
            Some(obj) => Some(Rc::clone(obj)),
            // If not found in this environment, look for it in the outer environment
            None => match self.outer {
                Some(ref outer) => outer.borrow().get(name),
                None => None,
            },
        }
    }

    /// Bind `name` in this scope only, shadowing any outer binding.
    pub fn set(&mut self, name: String, value: Rc<Object>) -> Rc<Object> {
        self.store.insert(name, Rc::clone(&value));
        value
    }

    pub fn depth(&self) -> usize {
        match &self.outer {
            // Recursively add the depth
            Some(parent_env) => 1 + parent_env.borrow().depth(),
            None => 1,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::{cell::RefCell, rc::Rc};

    use crate::environment::Environment;
    use crate::object::Object;

    #[test]
    pub fn test_depth() {
        let env1 = Rc::new(RefCell::new(Environment::new()));
        assert_eq!(env1.borrow().depth(), 1);

        let env2 = Rc::new(RefCell::new(Environment::new_enclosed(Rc::clone(&env1))));
        assert_eq!(env1.borrow().depth(), 1);
        assert_eq!(env2.borrow().depth(), 2);

        let env3 = Rc::new(RefCell::new(Environment::new_enclosed(Rc::clone(&env2))));
        assert_eq!(env2.borrow().depth(), 2);
        assert_eq!(env3.borrow().depth(), 3);
    }

    #[test]
    pub fn test_lookup_through_outer() {
        let outer = Rc::new(RefCell::new(Environment::new()));
        outer
            .borrow_mut()
            .set("a".into(), Rc::new(Object::Integer(1)));

        let inner = Environment::new_enclosed(Rc::clone(&outer));
        assert_eq!(inner.get("a"), Some(Rc::new(Object::Integer(1))));
        assert_eq!(inner.get("b"), None);
    }

    #[test]
    pub fn test_set_shadows_without_touching_outer() {
        let outer = Rc::new(RefCell::new(Environment::new()));
        outer
            .borrow_mut()
            .set("a".into(), Rc::new(Object::Integer(1)));

        let mut inner = Environment::new_enclosed(Rc::clone(&outer));
        let returned = inner.set("a".into(), Rc::new(Object::Integer(2)));

        assert_eq!(*returned, Object::Integer(2));
        assert_eq!(inner.get("a"), Some(Rc::new(Object::Integer(2))));
        assert_eq!(outer.borrow().get("a"), Some(Rc::new(Object::Integer(1))));
    }
}
