use crate::error::{LexError, LexResult, SourceLocation};
use serde::Serialize;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum TokenType {
    // Literals
    Number,
    String,
    Identifier,
    // Keywords
    If,
    Else,
    While,
    For,
    Function,
    Return,
    Print,
    Int,
    Float,
    StringType,
    Bool,
    True,
    False,
    And,
    Or,
    Not,
    // Operators and punctuation
    Plus,
    Minus,
    Star,
    Slash,
    Percent,
    Equal,
    EqualEqual,
    NotEqual,
    Less,
    LessEqual,
    Greater,
    GreaterEqual,
    LeftParen,
    RightParen,
    LeftBrace,
    RightBrace,
    LeftBracket,
    RightBracket,
    Semicolon,
    Comma,
    Eof,
}

impl TokenType {
    /// Keywords that name a primitive type and start a declaration.
    pub fn is_type_keyword(self) -> bool {
        matches!(
            self,
            TokenType::Int | TokenType::Float | TokenType::StringType | TokenType::Bool
        )
    }

    fn keyword(word: &str) -> Option<TokenType> {
        let token_type = match word {
            "if" => TokenType::If,
            "else" => TokenType::Else,
            "while" => TokenType::While,
            "for" => TokenType::For,
            "function" => TokenType::Function,
            "return" => TokenType::Return,
            "print" => TokenType::Print,
            "int" => TokenType::Int,
            "float" => TokenType::Float,
            "string" => TokenType::StringType,
            "bool" => TokenType::Bool,
            "true" => TokenType::True,
            "false" => TokenType::False,
            "and" => TokenType::And,
            "or" => TokenType::Or,
            "not" => TokenType::Not,
            _ => return None,
        };
        Some(token_type)
    }
}

impl fmt::Display for TokenType {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let text = match self {
            TokenType::Number => "number",
            TokenType::String => "string literal",
            TokenType::Identifier => "identifier",
            TokenType::If => "'if'",
            TokenType::Else => "'else'",
            TokenType::While => "'while'",
            TokenType::For => "'for'",
            TokenType::Function => "'function'",
            TokenType::Return => "'return'",
            TokenType::Print => "'print'",
            TokenType::Int => "'int'",
            TokenType::Float => "'float'",
            TokenType::StringType => "'string'",
            TokenType::Bool => "'bool'",
            TokenType::True => "'true'",
            TokenType::False => "'false'",
            TokenType::And => "'and'",
            TokenType::Or => "'or'",
            TokenType::Not => "'not'",
            TokenType::Plus => "'+'",
            TokenType::Minus => "'-'",
            TokenType::Star => "'*'",
            TokenType::Slash => "'/'",
            TokenType::Percent => "'%'",
            TokenType::Equal => "'='",
            TokenType::EqualEqual => "'=='",
            TokenType::NotEqual => "'!='",
            TokenType::Less => "'<'",
            TokenType::LessEqual => "'<='",
            TokenType::Greater => "'>'",
            TokenType::GreaterEqual => "'>='",
            TokenType::LeftParen => "'('",
            TokenType::RightParen => "')'",
            TokenType::LeftBrace => "'{'",
            TokenType::RightBrace => "'}'",
            TokenType::LeftBracket => "'['",
            TokenType::RightBracket => "']'",
            TokenType::Semicolon => "';'",
            TokenType::Comma => "','",
            TokenType::Eof => "end of input",
        };
        write!(f, "{}", text)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Token {
    pub token_type: TokenType,
    /// Source text of the token; for string literals, the unescaped contents.
    pub lexeme: String,
    pub line: usize,
    pub column: usize,
}

impl Token {
    pub fn location(&self) -> SourceLocation {
        SourceLocation::new(self.line, self.column)
    }
}

pub struct Lexer {
    input: Vec<char>,
    position: usize,
    line: usize,
    column: usize,
}

/// Tokenize `source` in one pass; the result always ends with an `Eof` token.
pub fn tokenize(source: &str) -> LexResult<Vec<Token>> {
    Lexer::new(source).tokenize()
}

impl Lexer {
    pub fn new(input: &str) -> Self {
        Self {
            input: input.chars().collect(),
            position: 0,
            line: 1,
            column: 1,
        }
    }

    pub fn tokenize(&mut self) -> LexResult<Vec<Token>> {
        let mut tokens = Vec::new();

        loop {
            self.skip_whitespace_and_comments();
            if self.is_at_end() {
                break;
            }

            tokens.push(self.next_token()?);
        }

        tokens.push(Token {
            token_type: TokenType::Eof,
            lexeme: String::new(),
            line: self.line,
            column: self.column,
        });

        Ok(tokens)
    }

    fn next_token(&mut self) -> LexResult<Token> {
        let line = self.line;
        let column = self.column;
        let start = self.position;

        let ch = self.current_char();

        if ch.is_ascii_digit() {
            return self.read_number();
        }
        if ch == '"' || ch == '\'' {
            return self.read_string();
        }
        if ch.is_ascii_alphabetic() || ch == '_' {
            return Ok(self.read_identifier());
        }

        let token_type = match ch {
            '=' => self.one_or_two('=', TokenType::Equal, TokenType::EqualEqual),
            '<' => self.one_or_two('=', TokenType::Less, TokenType::LessEqual),
            '>' => self.one_or_two('=', TokenType::Greater, TokenType::GreaterEqual),
            '!' if self.peek_char() == '=' => {
                self.advance();
                self.advance();
                TokenType::NotEqual
            }
            '+' => self.single(TokenType::Plus),
            '-' => self.single(TokenType::Minus),
            '*' => self.single(TokenType::Star),
            '/' => self.single(TokenType::Slash),
            '%' => self.single(TokenType::Percent),
            '(' => self.single(TokenType::LeftParen),
            ')' => self.single(TokenType::RightParen),
            '{' => self.single(TokenType::LeftBrace),
            '}' => self.single(TokenType::RightBrace),
            '[' => self.single(TokenType::LeftBracket),
            ']' => self.single(TokenType::RightBracket),
            ';' => self.single(TokenType::Semicolon),
            ',' => self.single(TokenType::Comma),
            _ => {
                return Err(LexError::UnexpectedCharacter {
                    character: ch,
                    location: SourceLocation::new(line, column),
                })
            }
        };

        let lexeme: String = self.input[start..self.position].iter().collect();

        Ok(Token {
            token_type,
            lexeme,
            line,
            column,
        })
    }

    fn single(&mut self, token_type: TokenType) -> TokenType {
        self.advance();
        token_type
    }

    fn one_or_two(&mut self, second: char, one: TokenType, two: TokenType) -> TokenType {
        self.advance();
        if self.current_char() == second {
            self.advance();
            two
        } else {
            one
        }
    }

    fn read_number(&mut self) -> LexResult<Token> {
        let line = self.line;
        let column = self.column;
        let mut value = String::new();

        while !self.is_at_end() && self.current_char().is_ascii_digit() {
            value.push(self.current_char());
            self.advance();
        }

        // A '.' is only part of the number when a digit follows it.
        let mut is_float = false;
        if self.current_char() == '.' && self.peek_char().is_ascii_digit() {
            is_float = true;
            value.push('.');
            self.advance();
            while !self.is_at_end() && self.current_char().is_ascii_digit() {
                value.push(self.current_char());
                self.advance();
            }
        }

        let valid = if is_float {
            value.parse::<f64>().is_ok()
        } else {
            value.parse::<i64>().is_ok()
        };
        if !valid {
            return Err(LexError::InvalidNumber {
                value,
                location: SourceLocation::new(line, column),
            });
        }

        Ok(Token {
            token_type: TokenType::Number,
            lexeme: value,
            line,
            column,
        })
    }

    fn read_string(&mut self) -> LexResult<Token> {
        let line = self.line;
        let column = self.column;
        let quote = self.current_char();
        self.advance(); // Skip opening quote
        let mut value = String::new();

        while !self.is_at_end() && self.current_char() != quote {
            if self.current_char() == '\\' {
                self.advance();
                if self.is_at_end() {
                    break;
                }
                match self.current_char() {
                    'n' => value.push('\n'),
                    't' => value.push('\t'),
                    'r' => value.push('\r'),
                    other => value.push(other),
                }
                self.advance();
            } else {
                value.push(self.current_char());
                self.advance();
            }
        }

        if self.is_at_end() {
            return Err(LexError::UnterminatedString {
                location: SourceLocation::new(line, column),
            });
        }
        self.advance(); // Skip closing quote

        Ok(Token {
            token_type: TokenType::String,
            lexeme: value,
            line,
            column,
        })
    }

    fn read_identifier(&mut self) -> Token {
        let line = self.line;
        let column = self.column;
        let mut value = String::new();

        while !self.is_at_end()
            && (self.current_char().is_ascii_alphanumeric() || self.current_char() == '_')
        {
            value.push(self.current_char());
            self.advance();
        }

        let token_type = TokenType::keyword(&value).unwrap_or(TokenType::Identifier);
        Token {
            token_type,
            lexeme: value,
            line,
            column,
        }
    }

    fn skip_whitespace_and_comments(&mut self) {
        while !self.is_at_end() {
            match self.current_char() {
                ' ' | '\r' | '\t' | '\n' => self.advance(),
                '/' if self.peek_char() == '/' => {
                    while !self.is_at_end() && self.current_char() != '\n' {
                        self.advance();
                    }
                }
                _ => break,
            }
        }
    }

    fn current_char(&self) -> char {
        if self.is_at_end() {
            '\0'
        } else {
            self.input[self.position]
        }
    }

    fn peek_char(&self) -> char {
        self.input.get(self.position + 1).copied().unwrap_or('\0')
    }

    fn advance(&mut self) {
        if !self.is_at_end() {
            if self.current_char() == '\n' {
                self.line += 1;
                self.column = 1;
            } else {
                self.column += 1;
            }
            self.position += 1;
        }
    }

    fn is_at_end(&self) -> bool {
        self.position >= self.input.len()
    }
}
