use serde::Serialize;
use std::fmt;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SourceLocation {
    pub line: usize,
    pub column: usize,
}

impl SourceLocation {
    pub fn new(line: usize, column: usize) -> Self {
        Self { line, column }
    }
}

impl fmt::Display for SourceLocation {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

// Lexer Errors
#[derive(Debug, Clone, PartialEq, Error)]
pub enum LexError {
    #[error("Invalid character '{character}'")]
    UnexpectedCharacter {
        character: char,
        location: SourceLocation,
    },
    #[error("Unterminated string literal")]
    UnterminatedString { location: SourceLocation },
    #[error("Invalid number '{value}'")]
    InvalidNumber {
        value: String,
        location: SourceLocation,
    },
}

impl LexError {
    pub fn location(&self) -> SourceLocation {
        match self {
            LexError::UnexpectedCharacter { location, .. }
            | LexError::UnterminatedString { location }
            | LexError::InvalidNumber { location, .. } => *location,
        }
    }
}

// Parser Errors
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ParseError {
    #[error("Expected {expected}, found {found}")]
    UnexpectedToken {
        expected: String,
        found: String,
        location: SourceLocation,
    },
    #[error("Unexpected end of file, expected {expected}")]
    UnexpectedEof {
        expected: String,
        location: SourceLocation,
    },
    #[error("{message}")]
    InvalidSyntax {
        message: String,
        location: SourceLocation,
    },
}

impl ParseError {
    pub fn location(&self) -> SourceLocation {
        match self {
            ParseError::UnexpectedToken { location, .. }
            | ParseError::UnexpectedEof { location, .. }
            | ParseError::InvalidSyntax { location, .. } => *location,
        }
    }
}

// Semantic Errors
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SemanticError {
    #[error("Undeclared name '{name}'")]
    Undeclared {
        name: String,
        location: SourceLocation,
    },
    #[error("Name '{name}' is already declared in this scope")]
    Redeclared {
        name: String,
        location: SourceLocation,
    },
    #[error("Incompatible types {left} and {right} for {operation}")]
    TypeMismatch {
        left: String,
        right: String,
        operation: String,
        location: SourceLocation,
    },
    #[error("Operator {operator} is not supported for types {operand_types}")]
    UnsupportedOperands {
        operator: String,
        operand_types: String,
        location: SourceLocation,
    },
    #[error("Condition of {statement} must be bool, found {found}")]
    InvalidCondition {
        statement: &'static str,
        found: String,
        location: SourceLocation,
    },
    #[error("Return outside of a function")]
    ReturnOutsideFunction { location: SourceLocation },
    #[error("'{name}' is not a function")]
    NotCallable {
        name: String,
        location: SourceLocation,
    },
    #[error("Cannot index into a value of type {found}")]
    NotIndexable {
        found: String,
        location: SourceLocation,
    },
    #[error("Array index must be int, found {found}")]
    InvalidIndex {
        found: String,
        location: SourceLocation,
    },
    #[error("Array size must be int, found {found}")]
    InvalidArraySize {
        found: String,
        location: SourceLocation,
    },
    #[error("Initializer of type {found} is incompatible with an array of {element_type}")]
    InvalidArrayInitializer {
        element_type: String,
        found: String,
        location: SourceLocation,
    },
    #[error("Invalid assignment target")]
    InvalidAssignmentTarget { location: SourceLocation },
}

impl SemanticError {
    pub fn location(&self) -> SourceLocation {
        match self {
            SemanticError::Undeclared { location, .. }
            | SemanticError::Redeclared { location, .. }
            | SemanticError::TypeMismatch { location, .. }
            | SemanticError::UnsupportedOperands { location, .. }
            | SemanticError::InvalidCondition { location, .. }
            | SemanticError::ReturnOutsideFunction { location }
            | SemanticError::NotCallable { location, .. }
            | SemanticError::NotIndexable { location, .. }
            | SemanticError::InvalidIndex { location, .. }
            | SemanticError::InvalidArraySize { location, .. }
            | SemanticError::InvalidArrayInitializer { location, .. }
            | SemanticError::InvalidAssignmentTarget { location } => *location,
        }
    }
}

// Runtime Errors
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RuntimeError {
    #[error("Undefined variable '{name}'")]
    UndefinedVariable {
        name: String,
        location: SourceLocation,
    },
    #[error("Division by zero")]
    DivisionByZero { location: SourceLocation },
    #[error("Modulo by zero")]
    ModuloByZero { location: SourceLocation },
    #[error("Index {index} out of bounds for array of length {length}")]
    IndexOutOfBounds {
        index: i64,
        length: usize,
        location: SourceLocation,
    },
    #[error("Array index must be an integer, found {found}")]
    NonIntegerIndex {
        found: String,
        location: SourceLocation,
    },
    #[error("Cannot index into {found}")]
    NotAnArray {
        found: String,
        location: SourceLocation,
    },
    #[error("'{name}' is not a function")]
    NotCallable {
        name: String,
        location: SourceLocation,
    },
    #[error("Operator {operator} cannot be applied to {operand_types}")]
    InvalidOperands {
        operator: String,
        operand_types: String,
        location: SourceLocation,
    },
    #[error("Array size must be a non-negative integer, found {found}")]
    InvalidArraySize {
        found: String,
        location: SourceLocation,
    },
    #[error("Invalid assignment target")]
    InvalidAssignmentTarget { location: SourceLocation },
    #[error("Return outside of a function")]
    StrayReturn { location: SourceLocation },
    #[error("Failed to write output: {message}")]
    Output {
        message: String,
        location: SourceLocation,
    },
}

impl RuntimeError {
    pub fn location(&self) -> SourceLocation {
        match self {
            RuntimeError::UndefinedVariable { location, .. }
            | RuntimeError::DivisionByZero { location }
            | RuntimeError::ModuloByZero { location }
            | RuntimeError::IndexOutOfBounds { location, .. }
            | RuntimeError::NonIntegerIndex { location, .. }
            | RuntimeError::NotAnArray { location, .. }
            | RuntimeError::NotCallable { location, .. }
            | RuntimeError::InvalidOperands { location, .. }
            | RuntimeError::InvalidArraySize { location, .. }
            | RuntimeError::InvalidAssignmentTarget { location }
            | RuntimeError::StrayReturn { location }
            | RuntimeError::Output { location, .. } => *location,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Lexical,
    Syntax,
    Semantic,
    Runtime,
    Io,
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let name = match self {
            ErrorCategory::Lexical => "Lexical",
            ErrorCategory::Syntax => "Syntax",
            ErrorCategory::Semantic => "Semantic",
            ErrorCategory::Runtime => "Runtime",
            ErrorCategory::Io => "I/O",
        };
        write!(f, "{}", name)
    }
}

/// Failure of any pipeline stage, categorized by the stage that raised it.
#[derive(Debug, Error)]
pub enum Error {
    #[error("Lexical error: {0} ({loc})", loc = .0.location())]
    Lex(#[from] LexError),
    #[error("Syntax error: {0} ({loc})", loc = .0.location())]
    Parse(#[from] ParseError),
    #[error("Semantic error: {0} ({loc})", loc = .0.location())]
    Semantic(#[from] SemanticError),
    #[error("Runtime error: {0} ({loc})", loc = .0.location())]
    Runtime(#[from] RuntimeError),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    pub fn category(&self) -> ErrorCategory {
        match self {
            Error::Lex(_) => ErrorCategory::Lexical,
            Error::Parse(_) => ErrorCategory::Syntax,
            Error::Semantic(_) => ErrorCategory::Semantic,
            Error::Runtime(_) => ErrorCategory::Runtime,
            Error::Io(_) => ErrorCategory::Io,
        }
    }

    /// Source position of the failure; `None` for I/O failures.
    pub fn location(&self) -> Option<SourceLocation> {
        match self {
            Error::Lex(e) => Some(e.location()),
            Error::Parse(e) => Some(e.location()),
            Error::Semantic(e) => Some(e.location()),
            Error::Runtime(e) => Some(e.location()),
            Error::Io(_) => None,
        }
    }

    /// The human-readable message without category or position.
    pub fn message(&self) -> String {
        match self {
            Error::Lex(e) => e.to_string(),
            Error::Parse(e) => e.to_string(),
            Error::Semantic(e) => e.to_string(),
            Error::Runtime(e) => e.to_string(),
            Error::Io(e) => e.to_string(),
        }
    }
}

// Result types
pub type LexResult<T> = Result<T, LexError>;
pub type ParseResult<T> = Result<T, ParseError>;
pub type SemanticResult<T> = Result<T, SemanticError>;
pub type RuntimeResult<T> = Result<T, RuntimeError>;
pub type MiniResult<T> = Result<T, Error>;
