use std::cell::RefCell;
use std::rc::Rc;

use rustyline::error::ReadlineError;
use rustyline::Editor;
use tracing::debug;

use monkey_interpreter::{define_macros, expand_macros, Environment, Evaluator};
use monkey_parser::{parse, ParseError};

const VERSION: &str = env!("CARGO_PKG_VERSION");
const PROMPT: &str = ">> ";
const EXIT_COMMAND: &str = ".exit";

pub fn repl() {
    println!("monkey v{}", VERSION);

    let mut session = Session::new();

    // `()` can be used when no completer is required
    let mut rl = Editor::<()>::new();
    loop {
        let readline = rl.readline(PROMPT);
        match readline {
            Ok(line) => {
                if line.trim() == EXIT_COMMAND {
                    break;
                }
                // Skip empty lines
                else if line.trim().is_empty() {
                    continue;
                }

                rl.add_history_entry(line.as_str());

                if let Some(output) = session.run(&line) {
                    println!("{}", output);
                }
            }
            Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => break,
            Err(err) => {
                println!("Error: {:?}", err);
                break;
            }
        }
    }
}

/// Bindings and macros that live for the whole REPL session.
struct Session {
    evaluator: Evaluator,
    macro_env: Rc<RefCell<Environment>>,
}

impl Session {
    fn new() -> Self {
        Session {
            evaluator: Evaluator::new(),
            macro_env: Rc::new(RefCell::new(Environment::new())),
        }
    }

    /// Run one line of input, returning what should be printed for it.
    fn run(&mut self, line: &str) -> Option<String> {
        let mut program = match parse(line) {
            Ok(program) => program,
            Err(errors) => return Some(format_parse_errors(line, &errors)),
        };

        define_macros(&mut program, &self.macro_env);
        let expanded = match expand_macros(program, &self.macro_env) {
            Ok(expanded) => expanded,
            Err(err) => {
                debug!(error = %err, "macro expansion failed");
                return Some(format!("macro error: {}", err));
            }
        };

        let result = self.evaluator.eval(&expanded);
        if result.is_null() {
            None
        } else {
            Some(result.to_string())
        }
    }
}

fn format_parse_errors(line: &str, errors: &[ParseError]) -> String {
    let mut output = String::from("parser errors:");
    for error in errors {
        output.push_str(&format!(
            "\n\t{} {}\n\t{}\n\t{}",
            error,
            error.span().at_str(),
            line,
            error.span().underline(line)
        ));
    }
    output
}
