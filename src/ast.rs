use crate::error::SourceLocation;
use serde::Serialize;
use std::fmt;
use std::rc::Rc;

/// Static type of an expression or declaration.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum Type {
    Int,
    Float,
    String,
    Bool,
    Any,
    Array(Box<Type>),
    Function(Vec<Type>),
}

impl Type {
    pub fn is_numeric_or_any(&self) -> bool {
        matches!(self, Type::Int | Type::Float | Type::Any)
    }

    pub fn is_bool_or_any(&self) -> bool {
        matches!(self, Type::Bool | Type::Any)
    }
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Type::Int => write!(f, "int"),
            Type::Float => write!(f, "float"),
            Type::String => write!(f, "string"),
            Type::Bool => write!(f, "bool"),
            Type::Any => write!(f, "any"),
            Type::Array(element) => write!(f, "{}[]", element),
            Type::Function(params) => {
                write!(f, "function(")?;
                for (i, param) in params.iter().enumerate() {
                    if i > 0 {
                        write!(f, ",")?;
                    }
                    write!(f, "{}", param)?;
                }
                write!(f, ")")
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum LiteralValue {
    Integer(i64),
    Float(f64),
    String(String),
    Bool(bool),
}

impl LiteralValue {
    pub fn static_type(&self) -> Type {
        match self {
            LiteralValue::Integer(_) => Type::Int,
            LiteralValue::Float(_) => Type::Float,
            LiteralValue::String(_) => Type::String,
            LiteralValue::Bool(_) => Type::Bool,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum BinaryOperator {
    Add,
    Subtract,
    Multiply,
    Divide,
    Modulo,
    Equal,
    NotEqual,
    Less,
    LessEqual,
    Greater,
    GreaterEqual,
    And,
    Or,
}

impl fmt::Display for BinaryOperator {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let symbol = match self {
            BinaryOperator::Add => "+",
            BinaryOperator::Subtract => "-",
            BinaryOperator::Multiply => "*",
            BinaryOperator::Divide => "/",
            BinaryOperator::Modulo => "%",
            BinaryOperator::Equal => "==",
            BinaryOperator::NotEqual => "!=",
            BinaryOperator::Less => "<",
            BinaryOperator::LessEqual => "<=",
            BinaryOperator::Greater => ">",
            BinaryOperator::GreaterEqual => ">=",
            BinaryOperator::And => "and",
            BinaryOperator::Or => "or",
        };
        write!(f, "{}", symbol)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum UnaryOperator {
    Negate,
    Not,
}

impl fmt::Display for UnaryOperator {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            UnaryOperator::Negate => write!(f, "-"),
            UnaryOperator::Not => write!(f, "not"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Expression {
    pub kind: ExpressionKind,
    pub location: SourceLocation,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum ExpressionKind {
    BinaryOp {
        left: Box<Expression>,
        operator: BinaryOperator,
        right: Box<Expression>,
    },
    UnaryOp {
        operator: UnaryOperator,
        operand: Box<Expression>,
    },
    Literal(LiteralValue),
    Identifier(String),
    Call {
        name: String,
        args: Vec<Expression>,
    },
    IndexAccess {
        base: Box<Expression>,
        index: Box<Expression>,
    },
    ArrayLiteral(Vec<Expression>),
}

impl Expression {
    pub fn new(kind: ExpressionKind, location: SourceLocation) -> Self {
        Self { kind, location }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Parameter {
    /// `None` for an untyped parameter, which is treated as `any`.
    pub declared_type: Option<Type>,
    pub name: String,
    pub location: SourceLocation,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FunctionDecl {
    pub name: String,
    pub params: Vec<Parameter>,
    pub body: Vec<Statement>,
    pub location: SourceLocation,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Statement {
    pub kind: StatementKind,
    pub location: SourceLocation,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum StatementKind {
    VarDecl {
        declared_type: Type,
        name: String,
        initializer: Option<Expression>,
    },
    ArrayDecl {
        element_type: Type,
        name: String,
        size: Option<Expression>,
        initializer: Option<Expression>,
    },
    // Shared with every closure created from this declaration.
    FunctionDecl(Rc<FunctionDecl>),
    Assign {
        target: Expression,
        value: Expression,
    },
    If {
        condition: Expression,
        then_branch: Box<Statement>,
        else_branch: Option<Box<Statement>>,
    },
    While {
        condition: Expression,
        body: Box<Statement>,
    },
    For {
        init: Option<Box<Statement>>,
        condition: Option<Expression>,
        update: Option<Box<Statement>>,
        body: Box<Statement>,
    },
    Return(Option<Expression>),
    Print(Expression),
    Expression(Expression),
    Block(Vec<Statement>),
}

impl Statement {
    pub fn new(kind: StatementKind, location: SourceLocation) -> Self {
        Self { kind, location }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Program {
    pub statements: Vec<Statement>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_type_display() {
        assert_eq!(Type::Array(Box::new(Type::Int)).to_string(), "int[]");
        assert_eq!(
            Type::Array(Box::new(Type::Array(Box::new(Type::Float)))).to_string(),
            "float[][]"
        );
        assert_eq!(
            Type::Function(vec![Type::Int, Type::Any]).to_string(),
            "function(int,any)"
        );
        assert_eq!(Type::Function(vec![]).to_string(), "function()");
    }

    #[test]
    fn test_literal_static_type() {
        assert_eq!(LiteralValue::Integer(1).static_type(), Type::Int);
        assert_eq!(LiteralValue::Float(1.5).static_type(), Type::Float);
        assert_eq!(LiteralValue::String("a".into()).static_type(), Type::String);
        assert_eq!(LiteralValue::Bool(true).static_type(), Type::Bool);
    }
}
