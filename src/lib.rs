pub mod ast;
pub mod environment;
pub mod error;
pub mod interpreter;
pub mod lexer;
pub mod parser;
pub mod symbol_table;
pub mod type_checker;
pub mod value;

pub use error::{Error, ErrorCategory, MiniResult, SourceLocation};
pub use interpreter::Interpreter;
pub use type_checker::TypeChecker;
pub use value::Value;

use std::io::{self, Write};
use tracing::{debug, info_span};

/// A pipeline whose declarations persist across calls to [`Session::execute`].
pub struct Session<W: Write = io::Stdout> {
    checker: TypeChecker,
    interpreter: Interpreter<W>,
}

impl Session<io::Stdout> {
    pub fn new() -> Self {
        Self::with_output(io::stdout())
    }
}

impl Default for Session<io::Stdout> {
    fn default() -> Self {
        Self::new()
    }
}

impl<W: Write> Session<W> {
    pub fn with_output(output: W) -> Self {
        Self {
            checker: TypeChecker::new(),
            interpreter: Interpreter::with_output(output),
        }
    }

    /// Lex, parse, check and run `source`. Nothing executes unless analysis succeeds;
    /// output printed before a runtime failure stays written. A failing call leaves no new
    /// declarations behind in the checker.
    pub fn execute(&mut self, source: &str) -> MiniResult<()> {
        let tokens = lexer::tokenize(source)?;
        debug!(tokens = tokens.len(), "lexed source");

        let program = parser::parse(tokens)?;
        debug!(statements = program.statements.len(), "parsed program");

        let snapshot = self.checker.snapshot();
        self.checker.check_program(&program)?;
        debug!("semantic analysis passed");

        if let Err(error) = self.interpreter.interpret(&program) {
            self.checker.restore(snapshot);
            return Err(error.into());
        }
        Ok(())
    }

    pub fn interpreter(&self) -> &Interpreter<W> {
        &self.interpreter
    }

    pub fn checker(&self) -> &TypeChecker {
        &self.checker
    }

    pub fn into_output(self) -> W {
        self.interpreter.into_output()
    }
}

/// Run one program with fresh state, printing to stdout.
pub fn run(source: &str, display_name: &str) -> MiniResult<()> {
    let _span = info_span!("run", file = display_name).entered();
    Session::new().execute(source)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session() -> Session<Vec<u8>> {
        Session::with_output(Vec::new())
    }

    #[test]
    fn test_declarations_persist_across_calls() {
        let mut session = session();
        session.execute("int x = 5;").unwrap();
        session.execute("print(x * 2);").unwrap();
        assert_eq!(String::from_utf8(session.into_output()).unwrap(), "10\n");
    }

    #[test]
    fn test_failed_analysis_leaves_no_declarations() {
        let mut session = session();
        let err = session.execute("int y = 1; print(missing);").unwrap_err();
        assert_eq!(err.category(), ErrorCategory::Semantic);

        // `y` was rolled back with the failed line, so declaring it again is fine.
        session.execute("int y = 2; print(y);").unwrap();
        assert_eq!(String::from_utf8(session.into_output()).unwrap(), "2\n");
    }

    #[test]
    fn test_runtime_failure_leaves_no_declarations() {
        let mut session = session();
        let err = session.execute("int a = 1 / 0;").unwrap_err();
        assert_eq!(err.category(), ErrorCategory::Runtime);

        session.execute("int a = 2;").unwrap();
        session.execute("print(a);").unwrap();
        assert_eq!(String::from_utf8(session.into_output()).unwrap(), "2\n");
    }

    #[test]
    fn test_error_categories() {
        let cases = [
            ("int x = 1 @ 2;", ErrorCategory::Lexical),
            ("int x = ;", ErrorCategory::Syntax),
            ("print(y);", ErrorCategory::Semantic),
            ("print(1 / 0);", ErrorCategory::Runtime),
        ];
        for (source, category) in cases {
            let err = session().execute(source).unwrap_err();
            assert_eq!(err.category(), category, "{}", source);
            assert!(err.location().is_some());
        }
    }

    #[test]
    fn test_semantic_failure_runs_nothing() {
        let mut session = session();
        assert!(session.execute("print(1); print(undefined_name);").is_err());
        assert!(session.into_output().is_empty());
    }
}
