use crate::ast::{
    BinaryOperator, Expression, ExpressionKind, FunctionDecl, LiteralValue, Parameter, Program,
    Statement, StatementKind, Type, UnaryOperator,
};
use crate::error::{ParseError, ParseResult, SourceLocation};
use crate::lexer::{Token, TokenType};
use std::rc::Rc;

pub struct Parser {
    tokens: Vec<Token>,
    current: usize,
}

/// Parse a full token stream (as produced by the lexer) into a program.
pub fn parse(tokens: Vec<Token>) -> ParseResult<Program> {
    Parser::new(tokens).parse()
}

impl Parser {
    pub fn new(mut tokens: Vec<Token>) -> Self {
        if tokens.last().map(|t| t.token_type) != Some(TokenType::Eof) {
            let (line, column) = tokens.last().map_or((1, 1), |t| (t.line, t.column));
            tokens.push(Token {
                token_type: TokenType::Eof,
                lexeme: String::new(),
                line,
                column,
            });
        }
        Self { tokens, current: 0 }
    }

    pub fn parse(&mut self) -> ParseResult<Program> {
        let mut statements = Vec::new();

        while !self.is_at_end() {
            statements.push(self.parse_statement()?);
        }

        Ok(Program { statements })
    }

    fn parse_statement(&mut self) -> ParseResult<Statement> {
        let token_type = self.peek().token_type;
        match token_type {
            t if t.is_type_keyword() => {
                let declaration = self.parse_declaration()?;
                self.consume(TokenType::Semicolon, "';' after declaration")?;
                Ok(declaration)
            }
            TokenType::Function => self.parse_function_decl(),
            TokenType::If => self.parse_if_statement(),
            TokenType::While => self.parse_while_statement(),
            TokenType::For => self.parse_for_statement(),
            TokenType::Return => self.parse_return(),
            TokenType::Print => self.parse_print(),
            TokenType::LeftBrace => self.parse_block(),
            _ => {
                let statement = self.parse_simple_statement()?;
                self.consume(TokenType::Semicolon, "';' after expression")?;
                Ok(statement)
            }
        }
    }

    /// Variable or array declaration without its trailing ';'.
    fn parse_declaration(&mut self) -> ParseResult<Statement> {
        let type_token = self.advance().clone();
        let declared_type = primitive_type(type_token.token_type).ok_or_else(|| {
            ParseError::UnexpectedToken {
                expected: "type name".to_string(),
                found: describe(&type_token),
                location: type_token.location(),
            }
        })?;

        if self.check(TokenType::LeftBracket) {
            self.advance(); // consume '['
            let size = if self.check(TokenType::RightBracket) {
                None
            } else {
                Some(self.parse_expression()?)
            };
            self.consume(TokenType::RightBracket, "']' after array size")?;

            let name = self.consume(TokenType::Identifier, "variable name")?.lexeme;
            let initializer = self.parse_initializer()?;

            return Ok(Statement::new(
                StatementKind::ArrayDecl {
                    element_type: declared_type,
                    name,
                    size,
                    initializer,
                },
                type_token.location(),
            ));
        }

        let name = self.consume(TokenType::Identifier, "variable name")?.lexeme;
        let initializer = self.parse_initializer()?;

        Ok(Statement::new(
            StatementKind::VarDecl {
                declared_type,
                name,
                initializer,
            },
            type_token.location(),
        ))
    }

    fn parse_initializer(&mut self) -> ParseResult<Option<Expression>> {
        if self.check(TokenType::Equal) {
            self.advance(); // consume '='
            Ok(Some(self.parse_expression()?))
        } else {
            Ok(None)
        }
    }

    fn parse_function_decl(&mut self) -> ParseResult<Statement> {
        let function_token = self.advance().clone(); // consume 'function'
        let name = self.consume(TokenType::Identifier, "function name")?.lexeme;
        self.consume(TokenType::LeftParen, "'(' after function name")?;

        let mut params = Vec::new();
        if !self.check(TokenType::RightParen) {
            loop {
                params.push(self.parse_parameter()?);
                if !self.check(TokenType::Comma) {
                    break;
                }
                self.advance(); // consume ','
            }
        }
        self.consume(TokenType::RightParen, "')' after parameters")?;

        let body = self.parse_block_statements()?;

        Ok(Statement::new(
            StatementKind::FunctionDecl(Rc::new(FunctionDecl {
                name,
                params,
                body,
                location: function_token.location(),
            })),
            function_token.location(),
        ))
    }

    fn parse_parameter(&mut self) -> ParseResult<Parameter> {
        let declared_type = primitive_type(self.peek().token_type);
        if declared_type.is_some() {
            self.advance(); // consume type keyword
        }
        let name_token = self.consume(TokenType::Identifier, "parameter name")?;
        Ok(Parameter {
            declared_type,
            location: name_token.location(),
            name: name_token.lexeme,
        })
    }

    fn parse_if_statement(&mut self) -> ParseResult<Statement> {
        let if_token = self.advance().clone(); // consume 'if'

        self.consume(TokenType::LeftParen, "'(' after 'if'")?;
        let condition = self.parse_expression()?;
        self.consume(TokenType::RightParen, "')' after if condition")?;

        let then_branch = Box::new(self.parse_statement()?);

        let else_branch = if self.check(TokenType::Else) {
            self.advance(); // consume 'else'
            Some(Box::new(self.parse_statement()?))
        } else {
            None
        };

        Ok(Statement::new(
            StatementKind::If {
                condition,
                then_branch,
                else_branch,
            },
            if_token.location(),
        ))
    }

    fn parse_while_statement(&mut self) -> ParseResult<Statement> {
        let while_token = self.advance().clone(); // consume 'while'

        self.consume(TokenType::LeftParen, "'(' after 'while'")?;
        let condition = self.parse_expression()?;
        self.consume(TokenType::RightParen, "')' after while condition")?;

        let body = Box::new(self.parse_statement()?);

        Ok(Statement::new(
            StatementKind::While { condition, body },
            while_token.location(),
        ))
    }

    fn parse_for_statement(&mut self) -> ParseResult<Statement> {
        let for_token = self.advance().clone(); // consume 'for'
        self.consume(TokenType::LeftParen, "'(' after 'for'")?;

        let init = if self.check(TokenType::Semicolon) {
            None
        } else if self.peek().token_type.is_type_keyword() {
            Some(Box::new(self.parse_declaration()?))
        } else {
            Some(Box::new(self.parse_simple_statement()?))
        };
        self.consume(TokenType::Semicolon, "';' after for initializer")?;

        let condition = if self.check(TokenType::Semicolon) {
            None
        } else {
            Some(self.parse_expression()?)
        };
        self.consume(TokenType::Semicolon, "';' after for condition")?;

        let update = if self.check(TokenType::RightParen) {
            None
        } else {
            Some(Box::new(self.parse_simple_statement()?))
        };
        self.consume(TokenType::RightParen, "')' after for clauses")?;

        let body = Box::new(self.parse_statement()?);

        Ok(Statement::new(
            StatementKind::For {
                init,
                condition,
                update,
                body,
            },
            for_token.location(),
        ))
    }

    fn parse_return(&mut self) -> ParseResult<Statement> {
        let return_token = self.advance().clone(); // consume 'return'

        let value = if self.check(TokenType::Semicolon) {
            None
        } else {
            Some(self.parse_expression()?)
        };
        self.consume(TokenType::Semicolon, "';' after return")?;

        Ok(Statement::new(
            StatementKind::Return(value),
            return_token.location(),
        ))
    }

    fn parse_print(&mut self) -> ParseResult<Statement> {
        let print_token = self.advance().clone(); // consume 'print'

        self.consume(TokenType::LeftParen, "'(' after 'print'")?;
        let expression = self.parse_expression()?;
        self.consume(TokenType::RightParen, "')' after expression")?;
        self.consume(TokenType::Semicolon, "';' after print")?;

        Ok(Statement::new(
            StatementKind::Print(expression),
            print_token.location(),
        ))
    }

    fn parse_block(&mut self) -> ParseResult<Statement> {
        let location = self.peek().location();
        let statements = self.parse_block_statements()?;
        Ok(Statement::new(StatementKind::Block(statements), location))
    }

    fn parse_block_statements(&mut self) -> ParseResult<Vec<Statement>> {
        self.consume(TokenType::LeftBrace, "'{'")?;

        let mut statements = Vec::new();
        while !self.check(TokenType::RightBrace) && !self.is_at_end() {
            statements.push(self.parse_statement()?);
        }

        self.consume(TokenType::RightBrace, "'}' to close block")?;
        Ok(statements)
    }

    /// Assignment or expression statement without its trailing ';'.
    fn parse_simple_statement(&mut self) -> ParseResult<Statement> {
        let expression = self.parse_expression()?;
        let location = expression.location;

        if self.check(TokenType::Equal) {
            self.advance(); // consume '='
            let value = self.parse_expression()?;
            return Ok(Statement::new(
                StatementKind::Assign {
                    target: expression,
                    value,
                },
                location,
            ));
        }

        Ok(Statement::new(StatementKind::Expression(expression), location))
    }

    pub fn parse_expression(&mut self) -> ParseResult<Expression> {
        self.parse_logical_or()
    }

    fn parse_logical_or(&mut self) -> ParseResult<Expression> {
        let mut expr = self.parse_logical_and()?;

        while self.check(TokenType::Or) {
            let location = self.advance().location(); // consume 'or'
            let right = self.parse_logical_and()?;
            expr = binary(expr, BinaryOperator::Or, right, location);
        }

        Ok(expr)
    }

    fn parse_logical_and(&mut self) -> ParseResult<Expression> {
        let mut expr = self.parse_equality()?;

        while self.check(TokenType::And) {
            let location = self.advance().location(); // consume 'and'
            let right = self.parse_equality()?;
            expr = binary(expr, BinaryOperator::And, right, location);
        }

        Ok(expr)
    }

    fn parse_equality(&mut self) -> ParseResult<Expression> {
        let mut expr = self.parse_comparison()?;

        while matches!(
            self.peek().token_type,
            TokenType::EqualEqual | TokenType::NotEqual
        ) {
            let token = self.advance().clone();
            let operator = match token.token_type {
                TokenType::EqualEqual => BinaryOperator::Equal,
                TokenType::NotEqual => BinaryOperator::NotEqual,
                _ => unreachable!(),
            };
            let right = self.parse_comparison()?;
            expr = binary(expr, operator, right, token.location());
        }

        Ok(expr)
    }

    fn parse_comparison(&mut self) -> ParseResult<Expression> {
        let mut expr = self.parse_additive()?;

        while matches!(
            self.peek().token_type,
            TokenType::Less | TokenType::LessEqual | TokenType::Greater | TokenType::GreaterEqual
        ) {
            let token = self.advance().clone();
            let operator = match token.token_type {
                TokenType::Less => BinaryOperator::Less,
                TokenType::LessEqual => BinaryOperator::LessEqual,
                TokenType::Greater => BinaryOperator::Greater,
                TokenType::GreaterEqual => BinaryOperator::GreaterEqual,
                _ => unreachable!(),
            };
            let right = self.parse_additive()?;
            expr = binary(expr, operator, right, token.location());
        }

        Ok(expr)
    }

    fn parse_additive(&mut self) -> ParseResult<Expression> {
        let mut expr = self.parse_multiplicative()?;

        while matches!(self.peek().token_type, TokenType::Plus | TokenType::Minus) {
            let token = self.advance().clone();
            let operator = match token.token_type {
                TokenType::Plus => BinaryOperator::Add,
                TokenType::Minus => BinaryOperator::Subtract,
                _ => unreachable!(),
            };
            let right = self.parse_multiplicative()?;
            expr = binary(expr, operator, right, token.location());
        }

        Ok(expr)
    }

    fn parse_multiplicative(&mut self) -> ParseResult<Expression> {
        let mut expr = self.parse_unary()?;

        while matches!(
            self.peek().token_type,
            TokenType::Star | TokenType::Slash | TokenType::Percent
        ) {
            let token = self.advance().clone();
            let operator = match token.token_type {
                TokenType::Star => BinaryOperator::Multiply,
                TokenType::Slash => BinaryOperator::Divide,
                TokenType::Percent => BinaryOperator::Modulo,
                _ => unreachable!(),
            };
            let right = self.parse_unary()?;
            expr = binary(expr, operator, right, token.location());
        }

        Ok(expr)
    }

    fn parse_unary(&mut self) -> ParseResult<Expression> {
        let operator = match self.peek().token_type {
            TokenType::Minus => UnaryOperator::Negate,
            TokenType::Not => UnaryOperator::Not,
            _ => return self.parse_postfix(),
        };
        let location = self.advance().location();
        let operand = self.parse_unary()?;

        Ok(Expression::new(
            ExpressionKind::UnaryOp {
                operator,
                operand: Box::new(operand),
            },
            location,
        ))
    }

    fn parse_postfix(&mut self) -> ParseResult<Expression> {
        let mut expr = self.parse_primary()?;

        loop {
            match self.peek().token_type {
                TokenType::LeftBracket => {
                    self.advance(); // consume '['
                    let index = self.parse_expression()?;
                    self.consume(TokenType::RightBracket, "']' after index")?;
                    let location = expr.location;
                    expr = Expression::new(
                        ExpressionKind::IndexAccess {
                            base: Box::new(expr),
                            index: Box::new(index),
                        },
                        location,
                    );
                }
                TokenType::LeftParen => {
                    self.advance(); // consume '('
                    let args = self.parse_arguments()?;

                    let location = expr.location;
                    let name = match expr.kind {
                        ExpressionKind::Identifier(name) => name,
                        _ => {
                            return Err(ParseError::InvalidSyntax {
                                message: "Invalid function call: callee must be a name"
                                    .to_string(),
                                location,
                            })
                        }
                    };
                    expr = Expression::new(ExpressionKind::Call { name, args }, location);
                }
                _ => break,
            }
        }

        Ok(expr)
    }

    fn parse_arguments(&mut self) -> ParseResult<Vec<Expression>> {
        let mut args = Vec::new();

        if !self.check(TokenType::RightParen) {
            args.push(self.parse_expression()?);
            while self.check(TokenType::Comma) {
                self.advance(); // consume ','
                args.push(self.parse_expression()?);
            }
        }

        self.consume(TokenType::RightParen, "')' after arguments")?;
        Ok(args)
    }

    fn parse_primary(&mut self) -> ParseResult<Expression> {
        let token = self.peek().clone();
        let location = token.location();

        let kind = match token.token_type {
            TokenType::Number => {
                self.advance();
                ExpressionKind::Literal(number_literal(&token)?)
            }
            TokenType::String => {
                self.advance();
                ExpressionKind::Literal(LiteralValue::String(token.lexeme))
            }
            TokenType::True | TokenType::False => {
                self.advance();
                ExpressionKind::Literal(LiteralValue::Bool(token.token_type == TokenType::True))
            }
            TokenType::Identifier => {
                self.advance();
                ExpressionKind::Identifier(token.lexeme)
            }
            TokenType::LeftParen => {
                self.advance(); // consume '('
                let expr = self.parse_expression()?;
                self.consume(TokenType::RightParen, "')' after expression")?;
                return Ok(expr);
            }
            TokenType::LeftBracket => {
                self.advance(); // consume '['
                let mut elements = Vec::new();

                if !self.check(TokenType::RightBracket) {
                    elements.push(self.parse_expression()?);
                    while self.check(TokenType::Comma) {
                        self.advance(); // consume ','
                        elements.push(self.parse_expression()?);
                    }
                }

                self.consume(TokenType::RightBracket, "']' after array elements")?;
                ExpressionKind::ArrayLiteral(elements)
            }
            _ => return Err(self.error_at_current("expression")),
        };

        Ok(Expression::new(kind, location))
    }

    fn consume(&mut self, token_type: TokenType, expected: &str) -> ParseResult<Token> {
        if self.check(token_type) {
            Ok(self.advance().clone())
        } else {
            Err(self.error_at_current(expected))
        }
    }

    fn error_at_current(&self, expected: &str) -> ParseError {
        let token = self.peek();
        if token.token_type == TokenType::Eof {
            ParseError::UnexpectedEof {
                expected: expected.to_string(),
                location: token.location(),
            }
        } else {
            ParseError::UnexpectedToken {
                expected: expected.to_string(),
                found: describe(token),
                location: token.location(),
            }
        }
    }

    fn check(&self, token_type: TokenType) -> bool {
        self.peek().token_type == token_type
    }

    fn peek(&self) -> &Token {
        &self.tokens[self.current]
    }

    fn advance(&mut self) -> &Token {
        if !self.is_at_end() {
            self.current += 1;
        }
        &self.tokens[self.current - 1]
    }

    fn is_at_end(&self) -> bool {
        self.peek().token_type == TokenType::Eof
    }
}

fn binary(
    left: Expression,
    operator: BinaryOperator,
    right: Expression,
    location: SourceLocation,
) -> Expression {
    Expression::new(
        ExpressionKind::BinaryOp {
            left: Box::new(left),
            operator,
            right: Box::new(right),
        },
        location,
    )
}

fn primitive_type(token_type: TokenType) -> Option<Type> {
    match token_type {
        TokenType::Int => Some(Type::Int),
        TokenType::Float => Some(Type::Float),
        TokenType::StringType => Some(Type::String),
        TokenType::Bool => Some(Type::Bool),
        _ => None,
    }
}

fn number_literal(token: &Token) -> ParseResult<LiteralValue> {
    let invalid = || ParseError::InvalidSyntax {
        message: format!("Invalid number literal '{}'", token.lexeme),
        location: token.location(),
    };
    if token.lexeme.contains('.') {
        token
            .lexeme
            .parse::<f64>()
            .map(LiteralValue::Float)
            .map_err(|_| invalid())
    } else {
        token
            .lexeme
            .parse::<i64>()
            .map(LiteralValue::Integer)
            .map_err(|_| invalid())
    }
}

fn describe(token: &Token) -> String {
    match token.token_type {
        TokenType::String => format!("string \"{}\"", token.lexeme),
        TokenType::Eof => "end of input".to_string(),
        _ => format!("'{}'", token.lexeme),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer::tokenize;

    fn parse_program(input: &str) -> ParseResult<Program> {
        parse(tokenize(input).unwrap())
    }

    fn parse_statement_from_string(input: &str) -> Statement {
        let mut program = parse_program(input).unwrap();
        assert_eq!(program.statements.len(), 1);
        program.statements.remove(0)
    }

    fn parse_expression_from_string(input: &str) -> Expression {
        let mut parser = Parser::new(tokenize(input).unwrap());
        parser.parse_expression().unwrap()
    }

    #[test]
    fn test_operator_precedence() {
        let expr = parse_expression_from_string("10 + 5 * 2");
        match expr.kind {
            ExpressionKind::BinaryOp {
                left,
                operator: BinaryOperator::Add,
                right,
            } => {
                assert!(matches!(
                    left.kind,
                    ExpressionKind::Literal(LiteralValue::Integer(10))
                ));
                assert!(matches!(
                    right.kind,
                    ExpressionKind::BinaryOp {
                        operator: BinaryOperator::Multiply,
                        ..
                    }
                ));
            }
            other => panic!("Expected '+' at the root, got {:?}", other),
        }
    }

    #[test]
    fn test_left_associativity() {
        // (10 - 4) - 3
        let expr = parse_expression_from_string("10 - 4 - 3");
        match expr.kind {
            ExpressionKind::BinaryOp { left, right, .. } => {
                assert!(matches!(
                    left.kind,
                    ExpressionKind::BinaryOp {
                        operator: BinaryOperator::Subtract,
                        ..
                    }
                ));
                assert!(matches!(
                    right.kind,
                    ExpressionKind::Literal(LiteralValue::Integer(3))
                ));
            }
            other => panic!("Expected binary op, got {:?}", other),
        }
    }

    #[test]
    fn test_logical_precedence() {
        // a or (b and (c == d))
        let expr = parse_expression_from_string("a or b and c == d");
        match expr.kind {
            ExpressionKind::BinaryOp {
                operator: BinaryOperator::Or,
                right,
                ..
            } => match right.kind {
                ExpressionKind::BinaryOp {
                    operator: BinaryOperator::And,
                    right,
                    ..
                } => assert!(matches!(
                    right.kind,
                    ExpressionKind::BinaryOp {
                        operator: BinaryOperator::Equal,
                        ..
                    }
                )),
                other => panic!("Expected 'and', got {:?}", other),
            },
            other => panic!("Expected 'or', got {:?}", other),
        }
    }

    #[test]
    fn test_unary_binds_tighter_than_binary() {
        let expr = parse_expression_from_string("-a * b");
        match expr.kind {
            ExpressionKind::BinaryOp { left, .. } => assert!(matches!(
                left.kind,
                ExpressionKind::UnaryOp {
                    operator: UnaryOperator::Negate,
                    ..
                }
            )),
            other => panic!("Expected binary op, got {:?}", other),
        }

        let expr = parse_expression_from_string("not not flag");
        match expr.kind {
            ExpressionKind::UnaryOp { operand, .. } => assert!(matches!(
                operand.kind,
                ExpressionKind::UnaryOp {
                    operator: UnaryOperator::Not,
                    ..
                }
            )),
            other => panic!("Expected unary op, got {:?}", other),
        }
    }

    #[test]
    fn test_postfix_chain() {
        let expr = parse_expression_from_string("grid[1][2]");
        match expr.kind {
            ExpressionKind::IndexAccess { base, .. } => {
                assert!(matches!(base.kind, ExpressionKind::IndexAccess { .. }))
            }
            other => panic!("Expected index access, got {:?}", other),
        }

        let expr = parse_expression_from_string("f(1, x + 2)[0]");
        match expr.kind {
            ExpressionKind::IndexAccess { base, .. } => match base.kind {
                ExpressionKind::Call { name, args } => {
                    assert_eq!(name, "f");
                    assert_eq!(args.len(), 2);
                }
                other => panic!("Expected call, got {:?}", other),
            },
            other => panic!("Expected index access, got {:?}", other),
        }
    }

    #[test]
    fn test_call_on_non_identifier_fails() {
        let result = parse_program("f(1)(2);");
        assert!(matches!(result, Err(ParseError::InvalidSyntax { .. })));

        let result = parse_program("(f)[0](1);");
        assert!(matches!(result, Err(ParseError::InvalidSyntax { .. })));
    }

    #[test]
    fn test_var_declaration() {
        let stmt = parse_statement_from_string("float y = 3.14;");
        match stmt.kind {
            StatementKind::VarDecl {
                declared_type,
                name,
                initializer: Some(init),
            } => {
                assert_eq!(declared_type, Type::Float);
                assert_eq!(name, "y");
                assert!(matches!(
                    init.kind,
                    ExpressionKind::Literal(LiteralValue::Float(v)) if v == 3.14
                ));
            }
            other => panic!("Expected var declaration, got {:?}", other),
        }

        let stmt = parse_statement_from_string("string s;");
        assert!(matches!(
            stmt.kind,
            StatementKind::VarDecl {
                declared_type: Type::String,
                initializer: None,
                ..
            }
        ));
    }

    #[test]
    fn test_array_declarations() {
        let stmt = parse_statement_from_string("int[5] results;");
        match stmt.kind {
            StatementKind::ArrayDecl {
                element_type,
                name,
                size: Some(size),
                initializer: None,
            } => {
                assert_eq!(element_type, Type::Int);
                assert_eq!(name, "results");
                assert!(matches!(
                    size.kind,
                    ExpressionKind::Literal(LiteralValue::Integer(5))
                ));
            }
            other => panic!("Expected array declaration, got {:?}", other),
        }

        let stmt = parse_statement_from_string("int[] arr = [1, 2, 3];");
        match stmt.kind {
            StatementKind::ArrayDecl {
                size: None,
                initializer: Some(init),
                ..
            } => match init.kind {
                ExpressionKind::ArrayLiteral(elements) => assert_eq!(elements.len(), 3),
                other => panic!("Expected array literal, got {:?}", other),
            },
            other => panic!("Expected array declaration, got {:?}", other),
        }
    }

    #[test]
    fn test_array_size_is_an_expression() {
        let stmt = parse_statement_from_string("bool[n * 2] flags;");
        match stmt.kind {
            StatementKind::ArrayDecl {
                size: Some(size), ..
            } => assert!(matches!(
                size.kind,
                ExpressionKind::BinaryOp {
                    operator: BinaryOperator::Multiply,
                    ..
                }
            )),
            other => panic!("Expected array declaration, got {:?}", other),
        }
    }

    #[test]
    fn test_function_declaration() {
        let stmt = parse_statement_from_string("function add(int x, y) { return x + y; }");
        match stmt.kind {
            StatementKind::FunctionDecl(decl) => {
                assert_eq!(decl.name, "add");
                assert_eq!(decl.params.len(), 2);
                assert_eq!(decl.params[0].declared_type, Some(Type::Int));
                assert_eq!(decl.params[0].name, "x");
                assert_eq!(decl.params[1].declared_type, None);
                assert_eq!(decl.body.len(), 1);
                assert!(matches!(decl.body[0].kind, StatementKind::Return(Some(_))));
            }
            other => panic!("Expected function declaration, got {:?}", other),
        }
    }

    #[test]
    fn test_for_statement() {
        let stmt = parse_statement_from_string("for (int i = 0; i < 3; i = i + 1) print(i);");
        match stmt.kind {
            StatementKind::For {
                init: Some(init),
                condition: Some(_),
                update: Some(update),
                body,
            } => {
                assert!(matches!(init.kind, StatementKind::VarDecl { .. }));
                assert!(matches!(update.kind, StatementKind::Assign { .. }));
                assert!(matches!(body.kind, StatementKind::Print(_)));
            }
            other => panic!("Expected for statement, got {:?}", other),
        }

        let stmt = parse_statement_from_string("for (;;) {}");
        assert!(matches!(
            stmt.kind,
            StatementKind::For {
                init: None,
                condition: None,
                update: None,
                ..
            }
        ));
    }

    #[test]
    fn test_if_else_and_while() {
        let stmt = parse_statement_from_string("if (x > 5) print(1); else { print(2); }");
        match stmt.kind {
            StatementKind::If {
                then_branch,
                else_branch: Some(else_branch),
                ..
            } => {
                assert!(matches!(then_branch.kind, StatementKind::Print(_)));
                assert!(matches!(else_branch.kind, StatementKind::Block(_)));
            }
            other => panic!("Expected if statement, got {:?}", other),
        }

        let stmt = parse_statement_from_string("while (i < 3) { i = i + 1; }");
        assert!(matches!(stmt.kind, StatementKind::While { .. }));
    }

    #[test]
    fn test_assignment_and_expression_statements() {
        let stmt = parse_statement_from_string("arr[0] = 10;");
        match stmt.kind {
            StatementKind::Assign { target, .. } => {
                assert!(matches!(target.kind, ExpressionKind::IndexAccess { .. }))
            }
            other => panic!("Expected assignment, got {:?}", other),
        }

        let stmt = parse_statement_from_string("test();");
        assert!(matches!(
            stmt.kind,
            StatementKind::Expression(Expression {
                kind: ExpressionKind::Call { .. },
                ..
            })
        ));
    }

    #[test]
    fn test_return_without_value() {
        let stmt = parse_statement_from_string("return;");
        assert!(matches!(stmt.kind, StatementKind::Return(None)));
    }

    #[test]
    fn test_missing_semicolon_reports_position() {
        match parse_program("int x = 1\nprint(x);") {
            Err(ParseError::UnexpectedToken {
                found, location, ..
            }) => {
                assert_eq!(found, "'print'");
                assert_eq!(location, SourceLocation::new(2, 1));
            }
            other => panic!("Expected unexpected token, got {:?}", other),
        }
    }

    #[test]
    fn test_unexpected_eof() {
        assert!(matches!(
            parse_program("function f() { print(1);"),
            Err(ParseError::UnexpectedEof { .. })
        ));
    }

    #[test]
    fn test_node_positions() {
        let program = parse_program("int a = 1;\n  print(a + 2);").unwrap();
        assert_eq!(program.statements[0].location, SourceLocation::new(1, 1));
        assert_eq!(program.statements[1].location, SourceLocation::new(2, 3));
        match &program.statements[1].kind {
            StatementKind::Print(expr) => assert_eq!(expr.location, SourceLocation::new(2, 11)),
            other => panic!("Expected print, got {:?}", other),
        }
    }
}
