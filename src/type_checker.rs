use crate::ast::{
    BinaryOperator, Expression, ExpressionKind, FunctionDecl, Program, Statement, StatementKind,
    Type, UnaryOperator,
};
use crate::error::{SemanticError, SemanticResult, SourceLocation};
use crate::symbol_table::{ScopeKind, SymbolKind, SymbolTable};
use tracing::debug;

/// Static scope and type checking. Stops at the first error found.
pub struct TypeChecker {
    symbols: SymbolTable,
    // Depth of enclosing function bodies; `return` is only legal when non-zero.
    function_depth: usize,
}

/// Check `program` against a fresh symbol table.
pub fn analyze(program: &Program) -> SemanticResult<()> {
    TypeChecker::new().check_program(program)
}

impl TypeChecker {
    pub fn new() -> Self {
        Self {
            symbols: SymbolTable::new(),
            function_depth: 0,
        }
    }

    pub fn symbol_table(&self) -> &SymbolTable {
        &self.symbols
    }

    /// Check every top-level statement. Declarations are kept in the global scope, so a
    /// checker reused across programs sees earlier declarations. On failure the symbol table
    /// is restored to its state before the call.
    pub fn check_program(&mut self, program: &Program) -> SemanticResult<()> {
        let snapshot = self.snapshot();

        let result = program
            .statements
            .iter()
            .try_for_each(|statement| self.check_statement(statement));

        match result {
            Ok(()) => {
                for symbol in self.symbols.get_unused_variables() {
                    debug!(
                        name = %symbol.name,
                        line = symbol.declared_at.line,
                        column = symbol.declared_at.column,
                        "variable is never read"
                    );
                }
                Ok(())
            }
            Err(error) => {
                self.restore(snapshot);
                Err(error)
            }
        }
    }

    /// Copy of the current declarations, for [`TypeChecker::restore`].
    pub fn snapshot(&self) -> SymbolTable {
        self.symbols.clone()
    }

    /// Roll declarations back to an earlier [`TypeChecker::snapshot`].
    pub fn restore(&mut self, snapshot: SymbolTable) {
        self.symbols = snapshot;
        self.function_depth = 0;
    }

    // Runs `f` inside a fresh scope and always leaves it afterwards.
    fn with_scope<T>(
        &mut self,
        kind: ScopeKind,
        f: impl FnOnce(&mut Self) -> SemanticResult<T>,
    ) -> SemanticResult<T> {
        self.symbols.enter_scope(kind);
        let result = f(self);
        self.symbols.exit_scope();
        result
    }

    fn check_statement(&mut self, statement: &Statement) -> SemanticResult<()> {
        let location = statement.location;

        match &statement.kind {
            StatementKind::VarDecl {
                declared_type,
                name,
                initializer,
            } => {
                self.symbols
                    .declare(name, declared_type.clone(), SymbolKind::Variable, location)?;

                if let Some(initializer) = initializer {
                    let init_type = self.check_expression(initializer)?;
                    self.require_compatible(declared_type, &init_type, "=", location)?;
                }
                Ok(())
            }
            StatementKind::ArrayDecl {
                element_type,
                name,
                size,
                initializer,
            } => {
                let array_type = Type::Array(Box::new(element_type.clone()));
                self.symbols
                    .declare(name, array_type, SymbolKind::Variable, location)?;

                if let Some(size) = size {
                    let size_type = self.check_expression(size)?;
                    if size_type != Type::Int {
                        return Err(SemanticError::InvalidArraySize {
                            found: size_type.to_string(),
                            location,
                        });
                    }
                }

                if let Some(initializer) = initializer {
                    let init_type = self.check_expression(initializer)?;
                    // Prefix match on the rendered type names, so `int` and `int[][]` both
                    // satisfy an `int` array.
                    if !init_type
                        .to_string()
                        .starts_with(&element_type.to_string())
                    {
                        return Err(SemanticError::InvalidArrayInitializer {
                            element_type: element_type.to_string(),
                            found: init_type.to_string(),
                            location,
                        });
                    }
                }
                Ok(())
            }
            StatementKind::FunctionDecl(decl) => self.check_function(decl),
            StatementKind::Assign { target, value } => {
                let target_type = match &target.kind {
                    ExpressionKind::Identifier(name) => self
                        .symbols
                        .resolve(name, target.location)?
                        .symbol_type
                        .clone(),
                    ExpressionKind::IndexAccess { .. } => self.check_expression(target)?,
                    _ => return Err(SemanticError::InvalidAssignmentTarget { location }),
                };

                let value_type = self.check_expression(value)?;
                self.require_compatible(&target_type, &value_type, "=", location)
            }
            StatementKind::If {
                condition,
                then_branch,
                else_branch,
            } => {
                self.check_condition(condition, "if")?;
                self.check_statement(then_branch)?;
                if let Some(else_branch) = else_branch {
                    self.check_statement(else_branch)?;
                }
                Ok(())
            }
            StatementKind::While { condition, body } => {
                self.check_condition(condition, "while")?;
                self.check_statement(body)
            }
            StatementKind::For {
                init,
                condition,
                update,
                body,
            } => self.with_scope(ScopeKind::ForLoop, |this| {
                if let Some(init) = init {
                    this.check_statement(init)?;
                }
                if let Some(condition) = condition {
                    this.check_condition(condition, "for")?;
                }
                if let Some(update) = update {
                    this.check_statement(update)?;
                }
                this.check_statement(body)
            }),
            StatementKind::Return(value) => {
                if self.function_depth == 0 {
                    return Err(SemanticError::ReturnOutsideFunction { location });
                }
                if let Some(value) = value {
                    self.check_expression(value)?;
                }
                Ok(())
            }
            StatementKind::Print(expression) | StatementKind::Expression(expression) => {
                self.check_expression(expression).map(|_| ())
            }
            StatementKind::Block(statements) => {
                self.with_scope(ScopeKind::Block, |this| this.check_block(statements))
            }
        }
    }

    fn check_block(&mut self, statements: &[Statement]) -> SemanticResult<()> {
        statements
            .iter()
            .try_for_each(|statement| self.check_statement(statement))
    }

    fn check_function(&mut self, decl: &FunctionDecl) -> SemanticResult<()> {
        let param_types: Vec<Type> = decl
            .params
            .iter()
            .map(|param| param.declared_type.clone().unwrap_or(Type::Any))
            .collect();
        self.symbols.declare(
            &decl.name,
            Type::Function(param_types.clone()),
            SymbolKind::Function,
            decl.location,
        )?;

        let scope = ScopeKind::Function {
            name: decl.name.clone(),
        };
        self.function_depth += 1;
        let result = self.with_scope(scope, |this| {
            for (param, param_type) in decl.params.iter().zip(param_types) {
                this.symbols
                    .declare(&param.name, param_type, SymbolKind::Parameter, param.location)?;
            }
            // The body is a block of its own, nested inside the parameter scope.
            this.with_scope(ScopeKind::Block, |this| this.check_block(&decl.body))
        });
        self.function_depth -= 1;
        result
    }

    fn check_condition(
        &mut self,
        condition: &Expression,
        statement: &'static str,
    ) -> SemanticResult<()> {
        let condition_type = self.check_expression(condition)?;
        if condition_type.is_bool_or_any() {
            Ok(())
        } else {
            Err(SemanticError::InvalidCondition {
                statement,
                found: condition_type.to_string(),
                location: condition.location,
            })
        }
    }

    fn check_expression(&mut self, expression: &Expression) -> SemanticResult<Type> {
        let location = expression.location;

        match &expression.kind {
            ExpressionKind::Literal(value) => Ok(value.static_type()),
            ExpressionKind::Identifier(name) => {
                Ok(self.symbols.resolve(name, location)?.symbol_type.clone())
            }
            ExpressionKind::BinaryOp {
                left,
                operator,
                right,
            } => {
                let left_type = self.check_expression(left)?;
                let right_type = self.check_expression(right)?;
                check_binary_operation(&left_type, *operator, &right_type, location)
            }
            ExpressionKind::UnaryOp { operator, operand } => {
                let operand_type = self.check_expression(operand)?;
                check_unary_operation(*operator, operand_type, location)
            }
            ExpressionKind::Call { name, args } => {
                let callee_type = self.symbols.resolve(name, location)?.symbol_type.clone();
                if !matches!(callee_type, Type::Function(_)) {
                    return Err(SemanticError::NotCallable {
                        name: name.clone(),
                        location,
                    });
                }
                for arg in args {
                    self.check_expression(arg)?;
                }
                // Functions have no declared return type.
                Ok(Type::Any)
            }
            ExpressionKind::IndexAccess { base, index } => {
                let base_type = self.check_expression(base)?;
                let index_type = self.check_expression(index)?;

                match base_type {
                    Type::Any => Ok(Type::Any),
                    Type::Array(element_type) => {
                        if matches!(index_type, Type::Int | Type::Any) {
                            Ok(*element_type)
                        } else {
                            Err(SemanticError::InvalidIndex {
                                found: index_type.to_string(),
                                location,
                            })
                        }
                    }
                    other => Err(SemanticError::NotIndexable {
                        found: other.to_string(),
                        location,
                    }),
                }
            }
            ExpressionKind::ArrayLiteral(elements) => {
                let Some((first, rest)) = elements.split_first() else {
                    return Ok(Type::Array(Box::new(Type::Any)));
                };

                let element_type = self.check_expression(first)?;
                for element in rest {
                    let other = self.check_expression(element)?;
                    self.require_compatible(&element_type, &other, "array element", location)?;
                }
                Ok(Type::Array(Box::new(element_type)))
            }
        }
    }

    fn require_compatible(
        &self,
        expected: &Type,
        actual: &Type,
        operation: &str,
        location: SourceLocation,
    ) -> SemanticResult<()> {
        if types_compatible(expected, actual) {
            Ok(())
        } else {
            Err(SemanticError::TypeMismatch {
                left: expected.to_string(),
                right: actual.to_string(),
                operation: operation.to_string(),
                location,
            })
        }
    }
}

impl Default for TypeChecker {
    fn default() -> Self {
        Self::new()
    }
}

/// Identical types, `any` on either side, and int/float in either direction.
pub fn types_compatible(expected: &Type, actual: &Type) -> bool {
    match (expected, actual) {
        (Type::Any, _) | (_, Type::Any) => true,
        (Type::Int, Type::Float) | (Type::Float, Type::Int) => true,
        _ => expected == actual,
    }
}

fn check_binary_operation(
    left: &Type,
    operator: BinaryOperator,
    right: &Type,
    location: SourceLocation,
) -> SemanticResult<Type> {
    use BinaryOperator::*;

    let unsupported = || SemanticError::UnsupportedOperands {
        operator: operator.to_string(),
        operand_types: format!("{} and {}", left, right),
        location,
    };

    match operator {
        Add | Subtract | Multiply | Divide | Modulo => {
            if operator == Add && (*left == Type::String || *right == Type::String) {
                return Ok(Type::String);
            }
            if !left.is_numeric_or_any() || !right.is_numeric_or_any() {
                return Err(unsupported());
            }
            Ok(match (left, right) {
                (Type::Any, Type::Any) => Type::Any,
                (Type::Float, _) | (_, Type::Float) => Type::Float,
                _ => Type::Int,
            })
        }
        Less | LessEqual | Greater | GreaterEqual => {
            if left.is_numeric_or_any() && right.is_numeric_or_any() {
                Ok(Type::Bool)
            } else {
                Err(unsupported())
            }
        }
        Equal | NotEqual => Ok(Type::Bool),
        And | Or => {
            if left.is_bool_or_any() && right.is_bool_or_any() {
                Ok(Type::Bool)
            } else {
                Err(unsupported())
            }
        }
    }
}

fn check_unary_operation(
    operator: UnaryOperator,
    operand: Type,
    location: SourceLocation,
) -> SemanticResult<Type> {
    let supported = match operator {
        UnaryOperator::Negate => operand.is_numeric_or_any(),
        UnaryOperator::Not => operand.is_bool_or_any(),
    };
    if !supported {
        return Err(SemanticError::UnsupportedOperands {
            operator: operator.to_string(),
            operand_types: operand.to_string(),
            location,
        });
    }

    Ok(match operator {
        UnaryOperator::Negate => operand,
        UnaryOperator::Not => Type::Bool,
    })
}
