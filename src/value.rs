use crate::ast::{FunctionDecl, Type};
use crate::environment::FrameId;
use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

/// A function value: its declaration plus the frame that was active when it was declared.
#[derive(Debug)]
pub struct Closure {
    pub declaration: Rc<FunctionDecl>,
    pub captured: FrameId,
}

/// Runtime value. Arrays and closures are shared references; cloning a `Value`
/// aliases them instead of copying.
#[derive(Debug, Clone)]
pub enum Value {
    Int(i64),
    Float(f64),
    Str(String),
    Bool(bool),
    Array(Rc<RefCell<Vec<Value>>>),
    Closure(Rc<Closure>),
    Null,
}

impl Value {
    pub fn array(elements: Vec<Value>) -> Self {
        Value::Array(Rc::new(RefCell::new(elements)))
    }

    /// Zero value used to fill a sized array declaration.
    pub fn zero_of(element_type: &Type) -> Self {
        match element_type {
            Type::Int => Value::Int(0),
            Type::Float => Value::Float(0.0),
            Type::Bool => Value::Bool(false),
            Type::String => Value::Str(String::new()),
            _ => Value::Null,
        }
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Int(_) => "int",
            Value::Float(_) => "float",
            Value::Str(_) => "string",
            Value::Bool(_) => "bool",
            Value::Array(_) => "array",
            Value::Closure(_) => "function",
            Value::Null => "null",
        }
    }

    /// Truthiness for conditions and logical operators: null is false, a boolean is
    /// itself, everything else is true.
    pub fn is_truthy(&self) -> bool {
        match self {
            Value::Null => false,
            Value::Bool(b) => *b,
            _ => true,
        }
    }

    /// Coerce a value to the declared primitive type of a variable. `Null` is left alone.
    pub fn coerce_to(self, declared: &Type) -> Value {
        match (declared, self) {
            (_, Value::Null) => Value::Null,
            (Type::Int, Value::Float(f)) => Value::Int(f.trunc() as i64),
            (Type::Float, Value::Int(i)) => Value::Float(i as f64),
            (Type::String, Value::Str(s)) => Value::Str(s),
            (Type::String, other) => Value::Str(other.to_string()),
            (Type::Bool, other) => Value::Bool(other.as_bool()),
            (_, other) => other,
        }
    }

    // Conversion used by `bool` declarations; zero, empty string and empty array are false.
    fn as_bool(&self) -> bool {
        match self {
            Value::Int(i) => *i != 0,
            Value::Float(f) => *f != 0.0,
            Value::Str(s) => !s.is_empty(),
            Value::Bool(b) => *b,
            Value::Array(elements) => !elements.borrow().is_empty(),
            Value::Closure(_) => true,
            Value::Null => false,
        }
    }

    /// Equality used by `==` and `!=`.
    pub fn equals(&self, other: &Value) -> bool {
        match (self, other) {
            (Value::Int(a), Value::Int(b)) => a == b,
            (Value::Float(a), Value::Float(b)) => a == b,
            (Value::Int(a), Value::Float(b)) | (Value::Float(b), Value::Int(a)) => {
                (*a as f64) == *b
            }
            (Value::Str(a), Value::Str(b)) => a == b,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Array(a), Value::Array(b)) => {
                if Rc::ptr_eq(a, b) {
                    return true;
                }
                let (a, b) = (a.borrow(), b.borrow());
                a.len() == b.len() && a.iter().zip(b.iter()).all(|(x, y)| x.equals(y))
            }
            (Value::Closure(a), Value::Closure(b)) => Rc::ptr_eq(a, b),
            (Value::Null, Value::Null) => true,
            _ => false,
        }
    }

    fn fmt_element(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Value::Str(s) => write!(f, "\"{}\"", s),
            other => write!(f, "{}", other),
        }
    }
}

/// The print format: `null`, `true`/`false`, floats without a redundant `.0`.
impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Value::Int(i) => write!(f, "{}", i),
            // f64's Display already omits a trailing ".0" (2.0 prints as "2").
            Value::Float(x) => write!(f, "{}", x),
            Value::Str(s) => write!(f, "{}", s),
            Value::Bool(b) => write!(f, "{}", b),
            Value::Array(elements) => {
                write!(f, "[")?;
                for (i, element) in elements.borrow().iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    element.fmt_element(f)?;
                }
                write!(f, "]")
            }
            Value::Closure(closure) => write!(f, "<function {}>", closure.declaration.name),
            Value::Null => write!(f, "null"),
        }
    }
}
