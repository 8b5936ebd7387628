use crate::ast::{
    BinaryOperator, Expression, ExpressionKind, LiteralValue, Program, Statement, StatementKind,
    UnaryOperator,
};
use crate::environment::{Environment, FrameId, GLOBAL_FRAME};
use crate::error::{RuntimeError, RuntimeResult, SourceLocation};
use crate::value::{Closure, Value};
use std::cell::RefCell;
use std::fmt;
use std::io::{self, Write};
use std::rc::Rc;
use tracing::{debug, trace};

/// Outcome of executing a statement.
#[derive(Debug)]
pub enum Flow {
    Completed,
    Returned(Value),
}

/// Tree-walking evaluator. Expects a program that already passed the type checker.
pub struct Interpreter<W: Write = io::Stdout> {
    env: Environment,
    current: FrameId,
    output: W,
}

impl Interpreter<io::Stdout> {
    pub fn new() -> Self {
        Self::with_output(io::stdout())
    }
}

impl Default for Interpreter<io::Stdout> {
    fn default() -> Self {
        Self::new()
    }
}

impl<W: Write> Interpreter<W> {
    /// Interpreter whose `print` statements write to `output`.
    pub fn with_output(output: W) -> Self {
        Self {
            env: Environment::new(),
            current: GLOBAL_FRAME,
            output,
        }
    }

    pub fn output(&self) -> &W {
        &self.output
    }

    pub fn into_output(self) -> W {
        self.output
    }

    pub fn environment(&self) -> &Environment {
        &self.env
    }

    /// Read a variable from the globals frame, which persists across `interpret` calls.
    pub fn global(&self, name: &str) -> Option<Value> {
        self.env.get(GLOBAL_FRAME, name).cloned()
    }

    pub fn interpret(&mut self, program: &Program) -> RuntimeResult<()> {
        debug!(statements = program.statements.len(), "interpreting program");
        self.current = GLOBAL_FRAME;

        let result = self.execute_top_level(&program.statements);
        self.env.collect_garbage();
        result
    }

    // Between top-level statements no values are held outside the environment, so frames
    // left behind by closures can be collected there.
    fn execute_top_level(&mut self, statements: &[Statement]) -> RuntimeResult<()> {
        for statement in statements {
            if let Flow::Returned(_) = self.execute(statement)? {
                return Err(RuntimeError::StrayReturn {
                    location: statement.location,
                });
            }
            if self.env.should_collect() {
                self.env.collect_garbage();
            }
        }
        Ok(())
    }

    // Makes `frame` current while `f` runs, then restores the previous frame and releases
    // `frame` on every exit path.
    fn execute_in_frame<T>(
        &mut self,
        frame: FrameId,
        f: impl FnOnce(&mut Self) -> RuntimeResult<T>,
    ) -> RuntimeResult<T> {
        let previous = std::mem::replace(&mut self.current, frame);
        let result = f(self);
        self.current = previous;
        self.env.pop(frame);
        result
    }

    fn execute_statements(&mut self, statements: &[Statement]) -> RuntimeResult<Flow> {
        for statement in statements {
            if let flow @ Flow::Returned(_) = self.execute(statement)? {
                return Ok(flow);
            }
        }
        Ok(Flow::Completed)
    }

    fn execute(&mut self, statement: &Statement) -> RuntimeResult<Flow> {
        let location = statement.location;

        match &statement.kind {
            StatementKind::VarDecl {
                declared_type,
                name,
                initializer,
            } => {
                let value = match initializer {
                    Some(initializer) => self.evaluate(initializer)?,
                    None => Value::Null,
                };
                self.env
                    .define(self.current, name, value.coerce_to(declared_type));
            }
            StatementKind::ArrayDecl {
                element_type,
                name,
                size,
                initializer,
            } => {
                let value = match (size, initializer) {
                    (Some(size), _) => {
                        let size = self.evaluate(size)?;
                        let invalid_size = || RuntimeError::InvalidArraySize {
                            found: size.to_string(),
                            location,
                        };
                        let length = match size {
                            Value::Int(n) if n >= 0 => n as usize,
                            _ => return Err(invalid_size()),
                        };
                        let mut elements = Vec::new();
                        elements
                            .try_reserve_exact(length)
                            .map_err(|_| invalid_size())?;
                        elements.resize(length, Value::zero_of(element_type));
                        Value::array(elements)
                    }
                    (None, Some(initializer)) => self.evaluate(initializer)?,
                    (None, None) => Value::array(Vec::new()),
                };
                self.env.define(self.current, name, value);
            }
            StatementKind::FunctionDecl(declaration) => {
                self.env.capture(self.current);
                let closure = Value::Closure(Rc::new(Closure {
                    declaration: Rc::clone(declaration),
                    captured: self.current,
                }));
                self.env.define(self.current, &declaration.name, closure);
            }
            StatementKind::Assign { target, value } => {
                let value = self.evaluate(value)?;
                self.assign(target, value)?;
            }
            StatementKind::If {
                condition,
                then_branch,
                else_branch,
            } => {
                if self.evaluate(condition)?.is_truthy() {
                    return self.execute(then_branch);
                } else if let Some(else_branch) = else_branch {
                    return self.execute(else_branch);
                }
            }
            StatementKind::While { condition, body } => {
                while self.evaluate(condition)?.is_truthy() {
                    if let flow @ Flow::Returned(_) = self.execute(body)? {
                        return Ok(flow);
                    }
                }
            }
            StatementKind::For {
                init,
                condition,
                update,
                body,
            } => {
                let frame = self.env.push(self.current);
                return self.execute_in_frame(frame, |this| {
                    if let Some(init) = init {
                        this.execute(init)?;
                    }
                    loop {
                        if let Some(condition) = condition {
                            if !this.evaluate(condition)?.is_truthy() {
                                break;
                            }
                        }
                        if let flow @ Flow::Returned(_) = this.execute(body)? {
                            return Ok(flow);
                        }
                        if let Some(update) = update {
                            this.execute(update)?;
                        }
                    }
                    Ok(Flow::Completed)
                });
            }
            StatementKind::Return(value) => {
                let value = match value {
                    Some(value) => self.evaluate(value)?,
                    None => Value::Null,
                };
                return Ok(Flow::Returned(value));
            }
            StatementKind::Print(expression) => {
                let value = self.evaluate(expression)?;
                writeln!(self.output, "{}", value)
                    .and_then(|_| self.output.flush())
                    .map_err(|e| RuntimeError::Output {
                        message: e.to_string(),
                        location,
                    })?;
            }
            StatementKind::Expression(expression) => {
                self.evaluate(expression)?;
            }
            StatementKind::Block(statements) => {
                let frame = self.env.push(self.current);
                return self.execute_in_frame(frame, |this| this.execute_statements(statements));
            }
        }

        Ok(Flow::Completed)
    }

    fn assign(&mut self, target: &Expression, value: Value) -> RuntimeResult<()> {
        match &target.kind {
            ExpressionKind::Identifier(name) => {
                if self.env.assign(self.current, name, value) {
                    Ok(())
                } else {
                    Err(RuntimeError::UndefinedVariable {
                        name: name.clone(),
                        location: target.location,
                    })
                }
            }
            ExpressionKind::IndexAccess { base, index } => {
                let base = self.evaluate(base)?;
                let index = self.evaluate(index)?;
                let (elements, slot) = checked_index(base, index, target.location)?;
                elements.borrow_mut()[slot] = value;
                Ok(())
            }
            _ => Err(RuntimeError::InvalidAssignmentTarget {
                location: target.location,
            }),
        }
    }

    fn evaluate(&mut self, expression: &Expression) -> RuntimeResult<Value> {
        let location = expression.location;

        match &expression.kind {
            ExpressionKind::Literal(literal) => Ok(match literal {
                LiteralValue::Integer(i) => Value::Int(*i),
                LiteralValue::Float(f) => Value::Float(*f),
                LiteralValue::String(s) => Value::Str(s.clone()),
                LiteralValue::Bool(b) => Value::Bool(*b),
            }),
            ExpressionKind::Identifier(name) => self.lookup(name, location),
            ExpressionKind::BinaryOp {
                left,
                operator,
                right,
            } => {
                // Both operands are evaluated, including for `and`/`or`.
                let left = self.evaluate(left)?;
                let right = self.evaluate(right)?;
                binary_operation(*operator, left, right, location)
            }
            ExpressionKind::UnaryOp { operator, operand } => {
                let operand = self.evaluate(operand)?;
                unary_operation(*operator, operand, location)
            }
            ExpressionKind::Call { name, args } => {
                let closure = match self.lookup(name, location)? {
                    Value::Closure(closure) => closure,
                    _ => {
                        return Err(RuntimeError::NotCallable {
                            name: name.clone(),
                            location,
                        })
                    }
                };
                let args = args
                    .iter()
                    .map(|arg| self.evaluate(arg))
                    .collect::<RuntimeResult<Vec<_>>>()?;
                self.call(&closure, args)
            }
            ExpressionKind::IndexAccess { base, index } => {
                let base = self.evaluate(base)?;
                let index = self.evaluate(index)?;
                let (elements, slot) = checked_index(base, index, location)?;
                let value = elements.borrow()[slot].clone();
                Ok(value)
            }
            ExpressionKind::ArrayLiteral(elements) => {
                let values = elements
                    .iter()
                    .map(|element| self.evaluate(element))
                    .collect::<RuntimeResult<Vec<_>>>()?;
                Ok(Value::array(values))
            }
        }
    }

    fn lookup(&self, name: &str, location: SourceLocation) -> RuntimeResult<Value> {
        self.env
            .get(self.current, name)
            .cloned()
            .ok_or_else(|| RuntimeError::UndefinedVariable {
                name: name.to_string(),
                location,
            })
    }

    /// Invoke `closure` in a new frame whose parent is the captured frame. Missing
    /// arguments are bound to null and extra ones are ignored.
    fn call(&mut self, closure: &Closure, args: Vec<Value>) -> RuntimeResult<Value> {
        let declaration = Rc::clone(&closure.declaration);
        trace!(function = %declaration.name, args = args.len(), "call");

        let frame = self.env.push(closure.captured);
        let mut args = args.into_iter();
        for param in &declaration.params {
            self.env
                .define(frame, &param.name, args.next().unwrap_or(Value::Null));
        }

        let flow = self.execute_in_frame(frame, |this| this.execute_statements(&declaration.body))?;
        Ok(match flow {
            Flow::Returned(value) => value,
            Flow::Completed => Value::Null,
        })
    }
}

type Elements = Rc<RefCell<Vec<Value>>>;

fn checked_index(
    base: Value,
    index: Value,
    location: SourceLocation,
) -> RuntimeResult<(Elements, usize)> {
    let elements = match base {
        Value::Array(elements) => elements,
        other => {
            return Err(RuntimeError::NotAnArray {
                found: other.type_name().to_string(),
                location,
            })
        }
    };
    let index = match index {
        Value::Int(i) => i,
        other => {
            return Err(RuntimeError::NonIntegerIndex {
                found: other.type_name().to_string(),
                location,
            })
        }
    };

    let length = elements.borrow().len();
    if index < 0 || index as usize >= length {
        return Err(RuntimeError::IndexOutOfBounds {
            index,
            length,
            location,
        });
    }
    Ok((elements, index as usize))
}

fn invalid_operands(
    operator: impl fmt::Display,
    left: &Value,
    right: &Value,
    location: SourceLocation,
) -> RuntimeError {
    RuntimeError::InvalidOperands {
        operator: operator.to_string(),
        operand_types: format!("{} and {}", left.type_name(), right.type_name()),
        location,
    }
}

fn binary_operation(
    operator: BinaryOperator,
    left: Value,
    right: Value,
    location: SourceLocation,
) -> RuntimeResult<Value> {
    use BinaryOperator::*;

    match operator {
        Add if matches!(left, Value::Str(_)) || matches!(right, Value::Str(_)) => {
            Ok(Value::Str(format!("{}{}", left, right)))
        }
        Add | Subtract | Multiply | Divide | Modulo => arithmetic(operator, left, right, location),
        Less | LessEqual | Greater | GreaterEqual => compare(operator, &left, &right, location),
        Equal => Ok(Value::Bool(left.equals(&right))),
        NotEqual => Ok(Value::Bool(!left.equals(&right))),
        And => Ok(Value::Bool(left.is_truthy() && right.is_truthy())),
        Or => Ok(Value::Bool(left.is_truthy() || right.is_truthy())),
    }
}

fn arithmetic(
    operator: BinaryOperator,
    left: Value,
    right: Value,
    location: SourceLocation,
) -> RuntimeResult<Value> {
    match (&left, &right) {
        (Value::Int(a), Value::Int(b)) => int_arithmetic(operator, *a, *b, location),
        (Value::Int(a), Value::Float(b)) => float_arithmetic(operator, *a as f64, *b, location),
        (Value::Float(a), Value::Int(b)) => float_arithmetic(operator, *a, *b as f64, location),
        (Value::Float(a), Value::Float(b)) => float_arithmetic(operator, *a, *b, location),
        _ => Err(invalid_operands(operator, &left, &right, location)),
    }
}

// `+ - *` wrap on overflow. `/` always divides as floats; `%` takes the divisor's sign.
fn int_arithmetic(
    operator: BinaryOperator,
    a: i64,
    b: i64,
    location: SourceLocation,
) -> RuntimeResult<Value> {
    let result = match operator {
        BinaryOperator::Add => a.wrapping_add(b),
        BinaryOperator::Subtract => a.wrapping_sub(b),
        BinaryOperator::Multiply => a.wrapping_mul(b),
        BinaryOperator::Divide => return float_arithmetic(operator, a as f64, b as f64, location),
        BinaryOperator::Modulo if b == 0 => return Err(RuntimeError::ModuloByZero { location }),
        BinaryOperator::Modulo => {
            let remainder = a.wrapping_rem(b);
            if remainder != 0 && (remainder < 0) != (b < 0) {
                remainder + b
            } else {
                remainder
            }
        }
        _ => {
            return Err(invalid_operands(
                operator,
                &Value::Int(a),
                &Value::Int(b),
                location,
            ))
        }
    };
    Ok(Value::Int(result))
}

fn float_arithmetic(
    operator: BinaryOperator,
    a: f64,
    b: f64,
    location: SourceLocation,
) -> RuntimeResult<Value> {
    let result = match operator {
        BinaryOperator::Add => a + b,
        BinaryOperator::Subtract => a - b,
        BinaryOperator::Multiply => a * b,
        BinaryOperator::Divide if b == 0.0 => {
            return Err(RuntimeError::DivisionByZero { location })
        }
        BinaryOperator::Divide => a / b,
        BinaryOperator::Modulo if b == 0.0 => return Err(RuntimeError::ModuloByZero { location }),
        BinaryOperator::Modulo => {
            let remainder = a % b;
            if remainder != 0.0 && (remainder < 0.0) != (b < 0.0) {
                remainder + b
            } else {
                remainder
            }
        }
        _ => {
            return Err(invalid_operands(
                operator,
                &Value::Float(a),
                &Value::Float(b),
                location,
            ))
        }
    };
    Ok(Value::Float(result))
}

fn compare(
    operator: BinaryOperator,
    left: &Value,
    right: &Value,
    location: SourceLocation,
) -> RuntimeResult<Value> {
    let ordering = match (left, right) {
        (Value::Int(a), Value::Int(b)) => a.partial_cmp(b),
        (Value::Int(a), Value::Float(b)) => (*a as f64).partial_cmp(b),
        (Value::Float(a), Value::Int(b)) => a.partial_cmp(&(*b as f64)),
        (Value::Float(a), Value::Float(b)) => a.partial_cmp(b),
        (Value::Str(a), Value::Str(b)) => a.partial_cmp(b),
        _ => return Err(invalid_operands(operator, left, right, location)),
    };

    // NaN compares false with everything.
    let result = ordering.map_or(false, |ordering| match operator {
        BinaryOperator::Less => ordering.is_lt(),
        BinaryOperator::LessEqual => ordering.is_le(),
        BinaryOperator::Greater => ordering.is_gt(),
        BinaryOperator::GreaterEqual => ordering.is_ge(),
        _ => false,
    });
    Ok(Value::Bool(result))
}

fn unary_operation(
    operator: UnaryOperator,
    operand: Value,
    location: SourceLocation,
) -> RuntimeResult<Value> {
    match (operator, operand) {
        (UnaryOperator::Negate, Value::Int(i)) => Ok(Value::Int(i.wrapping_neg())),
        (UnaryOperator::Negate, Value::Float(f)) => Ok(Value::Float(-f)),
        (UnaryOperator::Negate, other) => Err(RuntimeError::InvalidOperands {
            operator: operator.to_string(),
            operand_types: other.type_name().to_string(),
            location,
        }),
        (UnaryOperator::Not, operand) => Ok(Value::Bool(!operand.is_truthy())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer::tokenize;
    use crate::parser::parse;

    fn interpreter_for(source: &str) -> (Interpreter<Vec<u8>>, RuntimeResult<()>) {
        let program = parse(tokenize(source).unwrap()).unwrap();
        let mut interpreter = Interpreter::with_output(Vec::new());
        let result = interpreter.interpret(&program);
        (interpreter, result)
    }

    fn output_of(source: &str) -> String {
        let (interpreter, result) = interpreter_for(source);
        result.unwrap();
        String::from_utf8(interpreter.into_output()).unwrap()
    }

    #[test]
    fn test_globals_after_run() {
        let (interpreter, result) = interpreter_for(
            "int x = 10; float y = 3.14; string name = \"MiniLang\"; bool active = true;",
        );
        result.unwrap();
        assert!(matches!(interpreter.global("x"), Some(Value::Int(10))));
        assert!(matches!(interpreter.global("y"), Some(Value::Float(f)) if f == 3.14));
        assert!(matches!(interpreter.global("name"), Some(Value::Str(s)) if s == "MiniLang"));
        assert!(matches!(interpreter.global("active"), Some(Value::Bool(true))));
    }

    #[test]
    fn test_declaration_coercion() {
        let (interpreter, result) =
            interpreter_for("int i = 7.9; float f = 2; string s = 42; bool b = 0; int n;");
        result.unwrap();
        assert!(matches!(interpreter.global("i"), Some(Value::Int(7))));
        assert!(matches!(interpreter.global("f"), Some(Value::Float(x)) if x == 2.0));
        assert!(matches!(interpreter.global("s"), Some(Value::Str(s)) if s == "42"));
        assert!(matches!(interpreter.global("b"), Some(Value::Bool(false))));
        assert!(matches!(interpreter.global("n"), Some(Value::Null)));
    }

    #[test]
    fn test_arithmetic() {
        let output = output_of(
            "int a = 10; int b = 5; print(a + b); print(a - b); print(a * b); print(a / b); print(a % b); print(7 / 2); print(7.0 / 2); print(10 + 3.14);",
        );
        assert_eq!(output, "15\n5\n50\n2\n0\n3.5\n3.5\n13.14\n");
    }

    #[test]
    fn test_division_and_modulo_signs() {
        let output = output_of(
            "print(-7 / 2); print(-7 % 3); print(7 % -3); print(-7 % -3); print(-7.5 % 2); print(7.5 % -2);",
        );
        assert_eq!(output, "-3.5\n2\n-2\n-1\n0.5\n-0.5\n");

        // An int declaration truncates the quotient.
        let (interpreter, result) = interpreter_for("int q = 7 / 2; float r = 1 / 4;");
        result.unwrap();
        assert!(matches!(interpreter.global("q"), Some(Value::Int(3))));
        assert!(matches!(interpreter.global("r"), Some(Value::Float(f)) if f == 0.25));
    }

    #[test]
    fn test_string_concatenation() {
        let output = output_of(
            "print(\"Hello\" + \" \" + \"World\"); print(\"Fibonacci(\" + 0 + \")\"); print(\"x=\" + 2.5 + \" ok=\" + true); print(\"v=\" + 2.0);",
        );
        assert_eq!(output, "Hello World\nFibonacci(0)\nx=2.5 ok=true\nv=2\n");
    }

    #[test]
    fn test_logic_and_comparison() {
        let output = output_of(
            "print(10 > 5); print(10 < 5); print(1 == 1.0); print(\"a\" != \"b\"); print(true and false); print(false or true); print(not true); print(\"abc\" < \"abd\");",
        );
        assert_eq!(output, "true\nfalse\ntrue\ntrue\nfalse\ntrue\nfalse\ntrue\n");
    }

    #[test]
    fn test_division_by_zero() {
        let (_, result) = interpreter_for("int x = 10 / 0;");
        assert!(matches!(
            result,
            Err(RuntimeError::DivisionByZero { location }) if location == SourceLocation::new(1, 12)
        ));
        let (_, result) = interpreter_for("float y = 1.5 / 0.0;");
        assert!(matches!(result, Err(RuntimeError::DivisionByZero { .. })));
        let (_, result) = interpreter_for("int z = 4 % 0;");
        assert!(matches!(result, Err(RuntimeError::ModuloByZero { .. })));
    }

    #[test]
    fn test_array_index_errors() {
        let (_, result) = interpreter_for("int[] arr = [1, 2, 3]; print(arr[5]);");
        assert!(matches!(
            result,
            Err(RuntimeError::IndexOutOfBounds {
                index: 5,
                length: 3,
                ..
            })
        ));
        let (_, result) = interpreter_for("int[] arr = [1]; arr[-1] = 2;");
        assert!(matches!(result, Err(RuntimeError::IndexOutOfBounds { .. })));
    }

    #[test]
    fn test_partial_output_before_failure() {
        let (interpreter, result) = interpreter_for("print(1); print(2 / 0); print(3);");
        assert!(result.is_err());
        assert_eq!(String::from_utf8(interpreter.into_output()).unwrap(), "1\n");
    }

    #[test]
    fn test_sized_array_zero_values() {
        let output = output_of(
            "int[3] a; float[2] f; bool[1] b; string[2] s; print(a); print(f); print(b); print(s);",
        );
        assert_eq!(output, "[0, 0, 0]\n[0, 0]\n[false]\n[\"\", \"\"]\n");
    }

    #[test]
    fn test_array_mutation_and_aliasing() {
        let (interpreter, result) =
            interpreter_for("int[] arr = [1, 2, 3]; arr[0] = 10; int[] alias = arr; alias[2] = 30;");
        result.unwrap();
        assert_eq!(interpreter.global("arr").unwrap().to_string(), "[10, 2, 30]");
    }

    #[test]
    fn test_return_short_circuits_loops_and_blocks() {
        let output = output_of(
            r#"
            function find(int target) {
                for (int i = 0; i < 10; i = i + 1) {
                    while (true) {
                        if (i == target) { return i * 100; }
                        print(i);
                        i = i + 1;
                    }
                }
                return -1;
            }
            print(find(2));
            "#,
        );
        assert_eq!(output, "0\n1\n200\n");
    }

    #[test]
    fn test_missing_arguments_are_null() {
        let output = output_of("function f(a, b) { print(a); print(b); } f(1); f(1, 2, 3);");
        assert_eq!(output, "1\nnull\n1\n2\n");
    }

    #[test]
    fn test_function_without_return_yields_null() {
        let output = output_of("function f() { int x = 1; } print(f());");
        assert_eq!(output, "null\n");
    }

    #[test]
    fn test_closures_see_later_mutation() {
        let output = output_of(
            r#"
            int counter = 0;
            function show() { print(counter); }
            counter = 5;
            show();
            "#,
        );
        assert_eq!(output, "5\n");
    }

    #[test]
    fn test_closure_captures_declaration_scope() {
        let output = output_of(
            r#"
            int x = 1;
            function show() { print(x); }
            function shadow() {
                int x = 2;
                show();
            }
            shadow();
            "#,
        );
        assert_eq!(output, "1\n");

        let (interpreter, result) = interpreter_for(
            r#"
            int total = 0;
            {
                int step = 3;
                function bump() { total = total + step; }
                bump();
                bump();
            }
            "#,
        );
        result.unwrap();
        assert!(matches!(interpreter.global("total"), Some(Value::Int(6))));
    }

    #[test]
    fn test_recursion_locals_do_not_alias() {
        let output = output_of(
            r#"
            function fact(n) {
                int local = n;
                if (n <= 1) { return 1; }
                int rest = fact(n - 1);
                return local * rest;
            }
            print(fact(5));
            "#,
        );
        assert_eq!(output, "120\n");
    }

    #[test]
    fn test_frames_released_after_blocks_and_calls() {
        let (interpreter, result) = interpreter_for(
            "function f(x) { { int y = x; } return x; } for (int i = 0; i < 5; i = i + 1) { f(i); }",
        );
        result.unwrap();
        // Only the globals frame is left; f was declared at top level.
        assert_eq!(interpreter.environment().live_frames(), 1);
    }

    #[test]
    fn test_frame_restored_after_error() {
        let program = parse(tokenize("int x = 1; function f() { int y = 1 / 0; } f();").unwrap())
            .unwrap();
        let mut interpreter = Interpreter::with_output(Vec::new());
        assert!(interpreter.interpret(&program).is_err());
        assert_eq!(interpreter.current, GLOBAL_FRAME);
        assert_eq!(interpreter.environment().live_frames(), 1);
    }

    #[test]
    fn test_logical_operators_evaluate_both_sides() {
        let output = output_of(
            "function side(bool v) { print(\"side\"); return v; } print(false and side(true));",
        );
        assert_eq!(output, "side\nfalse\n");
    }

    #[test]
    fn test_negative_array_size() {
        let (_, result) = interpreter_for("int n = -1; int[n] a;");
        assert!(matches!(result, Err(RuntimeError::InvalidArraySize { .. })));
    }

    #[test]
    fn test_unallocatable_array_size() {
        let (_, result) = interpreter_for("int[9223372036854775807] huge;");
        assert!(matches!(
            result,
            Err(RuntimeError::InvalidArraySize { ref found, .. }) if found == "9223372036854775807"
        ));
    }

    #[test]
    fn test_inner_function_frames_are_reclaimed() {
        let (interpreter, result) = interpreter_for(
            r#"
            function outer(n) {
                function inner() { return n; }
                return inner();
            }
            int total = 0;
            for (int i = 0; i < 10000; i = i + 1) {
                total = total + outer(i);
            }
            "#,
        );
        result.unwrap();
        assert!(matches!(interpreter.global("total"), Some(Value::Int(49995000))));
        assert_eq!(interpreter.environment().live_frames(), 1);
    }

    #[test]
    fn test_calling_a_non_function_at_runtime() {
        let (_, result) = interpreter_for("int x = 1; x();");
        assert!(matches!(result, Err(RuntimeError::NotCallable { .. })));
    }
}
