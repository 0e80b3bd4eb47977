use crate::outcome::Span;

#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    // Literals
    /// Floating-point number
    ///
    /// # Examples
    /// ```text
    /// 3.14
    /// 1e3
    /// 0.5
    /// ```
    Float(f64),

    /// Integer
    ///
    /// # Examples
    /// ```text
    /// 42
    /// 100
    /// ```
    Integer(i64),

    /// String literal enclosed in single or double quotes
    ///
    /// # Examples
    /// ```text
    /// 'status:error'
    /// "1d"
    /// ```
    String(String),

    /// Function name, field name or named-argument key
    ///
    /// Starts with a letter, underscore or `@`, followed by letters, digits,
    /// underscores, dots or `@`.
    ///
    /// # Examples
    /// ```text
    /// count
    /// cpu.usage
    /// @timestamp
    /// ```
    Identifier(String),

    // Arithmetic
    /// Addition
    Plus,

    /// Subtraction or unary negation
    Minus,

    /// Multiplication
    Star,

    /// Division
    Slash,

    // Comparison
    /// Equality operator
    EqEq,

    /// Less than
    Lt,

    /// Greater than
    Gt,

    /// Less than or equal
    LtEq,

    /// Greater than or equal
    GtEq,

    // Delimiters
    /// Named argument binding
    ///
    /// # Examples
    /// ```text
    /// count(kql='status:error')
    /// percentile(bytes, percentile=95)
    /// ```
    Equals,

    /// Left parenthesis for grouping or function calls
    LParen,

    /// Right parenthesis
    RParen,

    /// Comma for separating arguments
    Comma,

    /// End of input
    Eof,
}

impl Token {
    /// Short description used in error messages.
    pub fn describe(&self) -> String {
        match self {
            Token::Float(n) => format!("number {}", n),
            Token::Integer(n) => format!("number {}", n),
            Token::String(s) => format!("string '{}'", s),
            Token::Identifier(name) => format!("identifier '{}'", name),
            Token::Plus => "'+'".to_string(),
            Token::Minus => "'-'".to_string(),
            Token::Star => "'*'".to_string(),
            Token::Slash => "'/'".to_string(),
            Token::EqEq => "'=='".to_string(),
            Token::Lt => "'<'".to_string(),
            Token::Gt => "'>'".to_string(),
            Token::LtEq => "'<='".to_string(),
            Token::GtEq => "'>='".to_string(),
            Token::Equals => "'='".to_string(),
            Token::LParen => "'('".to_string(),
            Token::RParen => "')'".to_string(),
            Token::Comma => "','".to_string(),
            Token::Eof => "end of input".to_string(),
        }
    }
}

/// A token together with the characters it was read from.
#[derive(Debug, Clone, PartialEq)]
pub struct SpannedToken {
    pub token: Token,
    pub span: Span,
}
