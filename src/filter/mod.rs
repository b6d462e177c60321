//! Filter strings: lexing, parsing with negation pushdown, and evaluation.
//!
//! A filter is a boolean expression over `attribute OP literal`
//! comparisons, e.g. `"!(latency>=100 || region==eu) && ok==true"`. Parsing
//! is independent of any schema and yields an [`Expr`] containing only
//! conjunctions, disjunctions and predicates; binding to a schema happens
//! when the expression is evaluated or compiled.

mod ast;
mod error;
mod eval;
mod lexer;
mod parser;

pub use ast::{Expr, Predicate, Predicates};
pub use error::{EvalError, ParseError, ParseErrorKind};
pub use eval::CompiledFilter;
pub use lexer::{Lexer, Token, TokenKind};
pub use parser::{Parser, DEFAULT_MAX_DEPTH, DEFAULT_MAX_PREDICATES};

use crate::option::StreamOption;

/// Parse `input` with the default nesting limit.
pub fn parse(input: &str) -> Result<Expr, ParseError> {
    Parser::new(input).parse()
}

/// Parse `input` under the limits configured in `option`.
pub fn parse_with(input: &str, option: &StreamOption) -> Result<Expr, ParseError> {
    Parser::new(input)
        .with_max_depth(option.max_filter_depth)
        .with_max_predicates(option.max_filter_predicates)
        .parse()
}
