use crate::{
    ast::{SpannedToken, Token},
    error::{Position, SyntaxError},
    outcome::Span,
};

#[derive(Debug, Clone)]
pub struct Lexer {
    input: Vec<char>,
    position: usize,
}

impl Lexer {
    pub fn new(input: &str) -> Self {
        Lexer {
            input: input.chars().collect(),
            position: 0,
        }
    }

    /// The formula text as characters; spans index into this.
    pub fn source(&self) -> &[char] {
        &self.input
    }

    pub fn position_at(&self, offset: usize) -> Position {
        Position::locate(&self.input, offset)
    }

    fn error_at(&self, offset: usize, message: impl Into<String>) -> SyntaxError {
        SyntaxError::new(message, self.position_at(offset))
    }

    fn current_char(&self) -> Option<char> {
        self.input.get(self.position).copied()
    }

    fn peek_char(&self, offset: usize) -> Option<char> {
        self.input.get(self.position + offset).copied()
    }

    fn advance(&mut self) {
        self.position += 1;
    }

    fn skip_whitespace(&mut self) {
        while let Some(ch) = self.current_char() {
            if ch.is_whitespace() {
                self.advance();
            } else {
                break;
            }
        }
    }

    fn is_identifier_start(ch: char) -> bool {
        ch.is_alphabetic() || ch == '_' || ch == '@'
    }

    fn is_identifier_char(ch: char) -> bool {
        ch.is_alphanumeric() || ch == '_' || ch == '.' || ch == '@'
    }

    fn read_identifier(&mut self) -> String {
        let mut result = String::new();
        while let Some(ch) = self.current_char() {
            if Self::is_identifier_char(ch) {
                result.push(ch);
                self.advance();
            } else {
                break;
            }
        }
        result
    }

    fn read_string(&mut self, quote: char) -> Result<String, SyntaxError> {
        let start = self.position;
        let mut result = String::new();
        self.advance(); // opening quote

        while let Some(ch) = self.current_char() {
            match ch {
                c if c == quote => {
                    self.advance();
                    return Ok(result);
                }
                '\\' => {
                    let escape_at = self.position;
                    self.advance();
                    match self.current_char() {
                        Some('n') => result.push('\n'),
                        Some('t') => result.push('\t'),
                        Some('r') => result.push('\r'),
                        Some('"') => result.push('"'),
                        Some('\'') => result.push('\''),
                        Some('\\') => result.push('\\'),
                        Some(ch) => {
                            return Err(self.error_at(
                                escape_at,
                                format!("Invalid escape sequence: \\{}", ch),
                            ));
                        }
                        None => {
                            return Err(self.error_at(
                                escape_at,
                                "Unexpected end of input after backslash",
                            ));
                        }
                    }
                    self.advance();
                }
                _ => {
                    result.push(ch);
                    self.advance();
                }
            }
        }

        Err(self.error_at(start, "Unterminated string: missing closing quote"))
    }

    fn read_number(&mut self) -> Result<Token, SyntaxError> {
        let start = self.position;
        let mut number = String::new();
        let mut is_float = false;

        while let Some(ch) = self.current_char() {
            if ch.is_ascii_digit() {
                number.push(ch);
                self.advance();
            } else if ch == '.'
                && !is_float
                && self.peek_char(1).is_some_and(|c| c.is_ascii_digit())
            {
                is_float = true;
                number.push(ch);
                self.advance();
            } else {
                break;
            }
        }

        // Exponent: only when digits follow, so `2e` stays a number then an identifier
        if matches!(self.current_char(), Some('e' | 'E')) {
            let digits_at = match self.peek_char(1) {
                Some('+' | '-') => 2,
                _ => 1,
            };
            if self.peek_char(digits_at).is_some_and(|c| c.is_ascii_digit()) {
                is_float = true;
                for _ in 0..digits_at {
                    if let Some(ch) = self.current_char() {
                        number.push(ch);
                    }
                    self.advance();
                }
                while let Some(ch) = self.current_char().filter(|c| c.is_ascii_digit()) {
                    number.push(ch);
                    self.advance();
                }
            }
        }

        if is_float {
            match number.parse::<f64>() {
                Ok(n) if n.is_finite() => Ok(Token::Float(n)),
                _ => Err(self.error_at(start, format!("Invalid number '{}'", number))),
            }
        } else {
            number
                .parse::<i64>()
                .map(Token::Integer)
                .map_err(|_| self.error_at(start, format!("Invalid number '{}'", number)))
        }
    }

    fn single(&mut self, token: Token) -> Token {
        self.advance();
        token
    }

    fn with_equals(&mut self, plain: Token, with_eq: Token) -> Token {
        self.advance();
        if self.current_char() == Some('=') {
            self.advance();
            with_eq
        } else {
            plain
        }
    }

    pub fn next_token(&mut self) -> Result<Token, SyntaxError> {
        self.next_spanned().map(|spanned| spanned.token)
    }

    pub fn next_spanned(&mut self) -> Result<SpannedToken, SyntaxError> {
        self.skip_whitespace();
        let start = self.position;

        let token = match self.current_char() {
            None => Token::Eof,
            Some(',') => self.single(Token::Comma),
            Some('+') => self.single(Token::Plus),
            Some('-') => self.single(Token::Minus),
            Some('*') => self.single(Token::Star),
            Some('/') => self.single(Token::Slash),
            Some('(') => self.single(Token::LParen),
            Some(')') => self.single(Token::RParen),
            Some('=') => self.with_equals(Token::Equals, Token::EqEq),
            Some('>') => self.with_equals(Token::Gt, Token::GtEq),
            Some('<') => self.with_equals(Token::Lt, Token::LtEq),
            Some('"') => Token::String(self.read_string('"')?),
            Some('\'') => Token::String(self.read_string('\'')?),
            Some(ch) if Self::is_identifier_start(ch) => Token::Identifier(self.read_identifier()),
            Some(ch) if ch.is_ascii_digit() => self.read_number()?,
            Some(ch) => {
                return Err(self.error_at(start, format!("Unexpected character '{}'", ch)));
            }
        };

        Ok(SpannedToken {
            token,
            span: Span::new(start, self.position),
        })
    }
}

#[test]
fn test_named_argument_tokens() {
    let mut lexer = Lexer::new("count(kql='status:error')");
    assert_eq!(lexer.next_token().unwrap(), Token::Identifier("count".to_string()));
    assert_eq!(lexer.next_token().unwrap(), Token::LParen);
    assert_eq!(lexer.next_token().unwrap(), Token::Identifier("kql".to_string()));
    assert_eq!(lexer.next_token().unwrap(), Token::Equals);
    assert_eq!(lexer.next_token().unwrap(), Token::String("status:error".to_string()));
    assert_eq!(lexer.next_token().unwrap(), Token::RParen);
    assert_eq!(lexer.next_token().unwrap(), Token::Eof);
}

#[test]
fn test_comparison_tokens() {
    let mut lexer = Lexer::new("count() >= 5");
    assert_eq!(lexer.next_token().unwrap(), Token::Identifier("count".to_string()));
    assert_eq!(lexer.next_token().unwrap(), Token::LParen);
    assert_eq!(lexer.next_token().unwrap(), Token::RParen);
    assert_eq!(lexer.next_token().unwrap(), Token::GtEq);
    assert_eq!(lexer.next_token().unwrap(), Token::Integer(5));
}

#[test]
fn test_spans_count_characters() {
    let mut lexer = Lexer::new("  avg(x)");
    let spanned = lexer.next_spanned().unwrap();
    assert_eq!(spanned.span, Span::new(2, 5));
}
