use thiserror::Error;

use crate::scalar::LiteralError;

/// Category of a filter parse failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ParseErrorKind {
    /// Malformed token: lone `|`, `&` or `=`, or a character outside the
    /// filter alphabet.
    Lexical,
    /// A factor started with a token that cannot begin one.
    UnexpectedToken,
    /// `(` without its matching `)`.
    UnmatchedParenthesis,
    /// Input continued after a complete expression.
    PrematureEnd,
    /// An attribute was not followed by an operator.
    MissingOperator,
    /// An operator was not followed by a literal.
    MissingOperand,
    /// Lexically valid operator without comparison semantics (`!in`).
    UnsupportedOperator,
    /// Nesting exceeded the configured depth limit.
    TooDeep,
    /// The filter holds more predicates than the configured limit.
    TooManyPredicates,
}

/// A filter string that could not be turned into an expression.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("{message} at position {position}")]
pub struct ParseError {
    kind: ParseErrorKind,
    position: usize,
    message: String,
}

impl ParseError {
    pub(crate) fn new(kind: ParseErrorKind, position: usize, message: impl Into<String>) -> Self {
        Self {
            kind,
            position,
            message: message.into(),
        }
    }

    pub fn kind(&self) -> ParseErrorKind {
        self.kind
    }

    /// Byte offset into the filter string where the failure was detected.
    pub fn position(&self) -> usize {
        self.position
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

/// Failure to evaluate a parsed expression against a schema.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum EvalError {
    #[error("Unknown attribute: {0}")]
    UnknownAttribute(String),
    #[error("Invalid literal for attribute '{attr}': {source}")]
    Literal {
        attr: String,
        #[source]
        source: LiteralError,
    },
}
