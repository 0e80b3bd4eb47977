use std::fmt;

use thiserror::Error;

/// Location of a character in the formula text.
///
/// `offset` counts characters (not bytes) from the start of the text;
/// `line` and `column` are 1-based.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, serde::Serialize)]
pub struct Position {
    pub offset: usize,
    pub line: usize,
    pub column: usize,
}

impl Position {
    /// Locate a character offset within `input`.
    pub fn locate(input: &[char], offset: usize) -> Self {
        let mut line = 1;
        let mut column = 1;

        for ch in input.iter().take(offset) {
            if *ch == '\n' {
                line += 1;
                column = 1;
            } else {
                column += 1;
            }
        }

        Position {
            offset,
            line,
            column,
        }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "line {}, column {}", self.line, self.column)
    }
}

/// The one failure a parse can produce.
///
/// Raised for anything the grammar cannot fully consume: unbalanced
/// parentheses, truncated argument lists, unexpected tokens, and
/// malformed or misplaced arguments. There is never a partial result.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("{message} at {position}")]
pub struct SyntaxError {
    pub message: String,
    pub position: Position,
}

impl SyntaxError {
    pub fn new(message: impl Into<String>, position: Position) -> Self {
        SyntaxError {
            message: message.into(),
            position,
        }
    }
}

/// Errors surfaced by the compiler's public entry points.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum FormulaError {
    /// The formula text could not be parsed
    #[error(transparent)]
    Syntax(#[from] SyntaxError),

    /// No identifier was supplied for an aggregation index
    #[error("No identifier supplied for aggregation #{index}")]
    MissingIdentifier { index: usize },

    /// Pipeline operations cannot be substituted into an arithmetic tree
    #[error("Cannot substitute pipeline operation '{name}' (pipeline #{index})")]
    UnresolvedPipeline { name: String, index: usize },
}
