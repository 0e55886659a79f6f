use std::{cell::RefCell, rc::Rc};

use monkey_interpreter::{define_macros, expand_macros, object::Object, Environment, Evaluator};
use monkey_parser::parse;

/// Runs `input` through the whole pipeline with fresh environments, returning the inspected result.
fn run(input: &str) -> String {
    let mut program = match parse(input) {
        Ok(program) => program,
        Err(errors) => panic!("parser has {} errors: {:?}", errors.len(), errors),
    };

    let macro_env = Rc::new(RefCell::new(Environment::new()));
    define_macros(&mut program, &macro_env);
    let expanded = match expand_macros(program, &macro_env) {
        Ok(expanded) => expanded,
        Err(err) => panic!("macro expansion failed: {}", err),
    };

    Evaluator::new().eval(&expanded).to_string()
}

#[test]
fn programs() {
    let tests = vec![
        (
            "let newAdder = fn(x) { fn(y) { x + y } };
            let addTwo = newAdder(2);
            addTwo(3);",
            "5",
        ),
        (
            "let counter = fn(x) {
                if (x > 100) {
                    return true;
                } else {
                    let foobar = 9999;
                    counter(x + 1);
                }
            };
            counter(0);",
            "true",
        ),
        (
            "let map = fn(arr, f) {
                let iter = fn(arr, accumulated) {
                    if (len(arr) == 0) {
                        accumulated
                    } else {
                        iter(rest(arr), push(accumulated, f(first(arr))));
                    }
                };
                iter(arr, []);
            };
            let double = fn(x) { x * 2 };
            map([1, 2, 3, 4], double);",
            "[2, 4, 6, 8]",
        ),
        (
            "let reduce = fn(arr, initial, f) {
                let iter = fn(arr, result) {
                    if (len(arr) == 0) {
                        result
                    } else {
                        iter(rest(arr), f(result, first(arr)));
                    }
                };
                iter(arr, initial);
            };
            let sum = fn(arr) { reduce(arr, 0, fn(initial, el) { initial + el }) };
            sum([1, 2, 3, 4, 5]);",
            "15",
        ),
        ("let a = [1, 2]; let b = push(a, 3); a;", "[1, 2]"),
        ("let a = [1, 2]; let b = push(a, 3); b;", "[1, 2, 3]"),
        (
            "let people = [{\"name\": \"Alice\", \"age\": 24}, {\"name\": \"Anna\", \"age\": 28}];
            people[1][\"name\"];",
            "Anna",
        ),
        ("{\"b\": 1, \"a\": [true, null]}", "{b: 1, a: [true, null]}"),
        ("fn(x, y) { x + y }", "fn(x, y) {\n(x + y)\n}"),
        ("len", "builtin function len"),
        ("quote(1 + unquote(2 * 2))", "QUOTE((1 + 4))"),
        ("let x = 5; x * undefined; x", "ERROR: identifier not found: undefined"),
        ("let f = fn() { 1 + true }; f(); 10", "ERROR: type mismatch: INTEGER + BOOLEAN"),
        (
            "let unless = macro(condition, consequence, alternative) {
                quote(if (!(unquote(condition))) {
                    unquote(consequence);
                } else {
                    unquote(alternative);
                });
            };
            unless(10 > 5, \"not greater\", \"greater\");",
            "greater",
        ),
        (
            "let unless = macro(condition, consequence) {
                quote(if (!(unquote(condition))) { unquote(consequence) })
            };
            unless(1 > 2, undefined);",
            "ERROR: identifier not found: undefined",
        ),
        // The wrong branch is never evaluated
        (
            "let unless = macro(condition, consequence, alternative) {
                quote(if (!(unquote(condition))) { unquote(consequence) } else { unquote(alternative) })
            };
            unless(1 < 2, undefined, 7);",
            "7",
        ),
    ];

    for (input, expected) in tests {
        assert_eq!(run(input), expected, "running {}", input);
    }
}

#[test]
fn bindings_persist_between_evaluations() {
    let mut evaluator = Evaluator::new();
    let macro_env = Rc::new(RefCell::new(Environment::new()));

    let lines = vec![
        ("let double = macro(x) { quote(unquote(x) * 2) };", "null"),
        ("let base = 20;", "null"),
        ("let add = fn(a, b) { a + b };", "null"),
        ("add(double(base), 2)", "42"),
        ("add(base)", "ERROR: type mismatch: INTEGER + NULL"),
    ];

    for (line, expected) in lines {
        let mut program = parse(line).unwrap();
        define_macros(&mut program, &macro_env);
        let expanded = expand_macros(program, &macro_env).unwrap();
        let evaluated = evaluator.eval(&expanded);

        assert_eq!(evaluated.to_string(), expected, "evaluating {}", line);
    }
}

#[test]
fn errors_are_objects() {
    let program = parse("-\"text\"").unwrap();
    let evaluated = Evaluator::new().eval(&program);

    assert!(matches!(evaluated.as_ref(), Object::Error(_)));
    assert_eq!(evaluated.to_string(), "ERROR: unknown operator: -STRING");
}
