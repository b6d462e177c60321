//! Relational operators used by filter predicates.

use std::{cmp::Ordering, fmt, str::FromStr};

/// Comparison operator of an `attribute OP literal` predicate.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum RelOp {
    /// Equals (`==`).
    Eq,
    /// Not equals (`!=`).
    Neq,
    /// Less than (`<`).
    Lt,
    /// Greater than (`>`).
    Gt,
    /// Less than or equal to (`<=`).
    Le,
    /// Greater than or equal to (`>=`).
    Ge,
}

impl RelOp {
    /// Every operator, in declaration order.
    pub const ALL: [RelOp; 6] = [
        RelOp::Eq,
        RelOp::Neq,
        RelOp::Lt,
        RelOp::Gt,
        RelOp::Le,
        RelOp::Ge,
    ];

    /// Returns the logical complement of this operator over a totally
    /// ordered domain.
    #[must_use]
    pub fn negated(self) -> Self {
        match self {
            RelOp::Eq => RelOp::Neq,
            RelOp::Neq => RelOp::Eq,
            RelOp::Lt => RelOp::Ge,
            RelOp::Ge => RelOp::Lt,
            RelOp::Gt => RelOp::Le,
            RelOp::Le => RelOp::Gt,
        }
    }

    /// Textual form accepted by the filter lexer.
    pub fn as_str(self) -> &'static str {
        match self {
            RelOp::Eq => "==",
            RelOp::Neq => "!=",
            RelOp::Lt => "<",
            RelOp::Gt => ">",
            RelOp::Le => "<=",
            RelOp::Ge => ">=",
        }
    }

    /// Whether `lhs OP rhs` holds, given `lhs.cmp(rhs)`.
    pub fn holds(self, ordering: Ordering) -> bool {
        match self {
            RelOp::Eq => ordering == Ordering::Equal,
            RelOp::Neq => ordering != Ordering::Equal,
            RelOp::Lt => ordering == Ordering::Less,
            RelOp::Gt => ordering == Ordering::Greater,
            RelOp::Le => ordering != Ordering::Greater,
            RelOp::Ge => ordering != Ordering::Less,
        }
    }
}

/// Operator text with no [`RelOp`] counterpart.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownRelOp(pub String);

impl FromStr for RelOp {
    type Err = UnknownRelOp;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        RelOp::ALL
            .into_iter()
            .find(|op| op.as_str() == s)
            .ok_or_else(|| UnknownRelOp(s.to_string()))
    }
}

impl fmt::Display for RelOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
