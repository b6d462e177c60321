use std::{fmt, str::FromStr};

use super::{error::ParseError, parser::Parser};
use crate::relop::RelOp;

/// `attribute OP literal` leaf. The literal stays textual until it is
/// checked against a column type.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Predicate {
    pub attr: String,
    pub op: RelOp,
    pub value: String,
}

impl Predicate {
    pub fn new(attr: impl Into<String>, op: RelOp, value: impl Into<String>) -> Self {
        Self {
            attr: attr.into(),
            op,
            value: value.into(),
        }
    }

    /// The complementary predicate.
    #[must_use]
    pub fn negated(self) -> Self {
        Self {
            op: self.op.negated(),
            ..self
        }
    }
}

impl fmt::Display for Predicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}{}", self.attr, self.op, self.value)
    }
}

/// Negation-free boolean filter tree.
///
/// Parsing resolves `!` on the spot, so only conjunctions, disjunctions and
/// predicates survive. Connectives are right-nested: `a || b || c` is
/// `Or(a, Or(b, c))`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Expr {
    And(Box<Expr>, Box<Expr>),
    Or(Box<Expr>, Box<Expr>),
    Predicate(Predicate),
}

impl Expr {
    pub fn and(left: Expr, right: Expr) -> Self {
        Expr::And(Box::new(left), Box::new(right))
    }

    pub fn or(left: Expr, right: Expr) -> Self {
        Expr::Or(Box::new(left), Box::new(right))
    }

    pub fn predicate(attr: impl Into<String>, op: RelOp, value: impl Into<String>) -> Self {
        Expr::Predicate(Predicate::new(attr, op, value))
    }

    /// Push a negation through the tree with De Morgan's laws.
    #[must_use]
    pub fn negate(self) -> Self {
        match self {
            Expr::And(left, right) => Expr::or(left.negate(), right.negate()),
            Expr::Or(left, right) => Expr::and(left.negate(), right.negate()),
            Expr::Predicate(predicate) => Expr::Predicate(predicate.negated()),
        }
    }

    /// Leaves in left-to-right order.
    pub fn predicates(&self) -> Predicates<'_> {
        Predicates { stack: vec![self] }
    }
}

/// Iterator over the leaves of an [`Expr`].
#[derive(Debug)]
pub struct Predicates<'a> {
    stack: Vec<&'a Expr>,
}

impl<'a> Iterator for Predicates<'a> {
    type Item = &'a Predicate;

    fn next(&mut self) -> Option<Self::Item> {
        while let Some(expr) = self.stack.pop() {
            match expr {
                Expr::And(left, right) | Expr::Or(left, right) => {
                    self.stack.push(right);
                    self.stack.push(left);
                }
                Expr::Predicate(predicate) => return Some(predicate),
            }
        }
        None
    }
}

impl FromStr for Expr {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Parser::new(s).parse()
    }
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expr::And(left, right) => write!(f, "AND({left}, {right})"),
            Expr::Or(left, right) => write!(f, "OR({left}, {right})"),
            Expr::Predicate(p) => write!(f, "[{} {} {}]", p.attr, p.op, p.value),
        }
    }
}
