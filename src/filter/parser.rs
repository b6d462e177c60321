use super::{
    ast::{Expr, Predicate},
    error::{ParseError, ParseErrorKind},
    lexer::{Lexer, Token, TokenKind},
};
use crate::{
    logging::{strata_log, FILTER_CTX},
    relop::RelOp,
};

/// Default bound on `!` and parenthesis nesting.
pub const DEFAULT_MAX_DEPTH: usize = 256;

/// Default bound on the number of predicates in one filter.
pub const DEFAULT_MAX_PREDICATES: usize = 4096;

/// Recursive-descent parser for filter strings.
///
/// ```text
/// expr    := term ('||' term)*
/// term    := factor ('&&' factor)*
/// factor  := '!' factor
///          | '(' expr ')'
///          | OPERAND OPERATOR OPERAND
/// ```
///
/// Chains are read iteratively and folded to the right, so
/// `a || b || c` becomes `Or(a, Or(b, c))`.
#[derive(Debug)]
pub struct Parser<'a> {
    lexer: Lexer<'a>,
    input: &'a str,
    max_depth: usize,
    depth: usize,
    max_predicates: usize,
    predicates: usize,
}

impl<'a> Parser<'a> {
    pub fn new(input: &'a str) -> Self {
        Self {
            lexer: Lexer::new(input),
            input,
            max_depth: DEFAULT_MAX_DEPTH,
            depth: 0,
            max_predicates: DEFAULT_MAX_PREDICATES,
            predicates: 0,
        }
    }

    pub fn with_max_depth(self, max_depth: usize) -> Self {
        Self { max_depth, ..self }
    }

    /// Cap on predicates per filter. Chains of `||` and `&&` are not
    /// nesting, but each link adds one level to the right-nested tree.
    pub fn with_max_predicates(self, max_predicates: usize) -> Self {
        Self {
            max_predicates,
            ..self
        }
    }

    /// Parse the whole input into a negation-free expression.
    pub fn parse(mut self) -> Result<Expr, ParseError> {
        let input = self.input;
        self.parse_all().inspect_err(|err| {
            strata_log!(
                log::Level::Debug,
                ctx: FILTER_CTX,
                "filter_parse_failed",
                "kind={:?} position={} filter={:?}",
                err.kind(),
                err.position(),
                input
            );
        })
    }

    fn parse_all(&mut self) -> Result<Expr, ParseError> {
        let expr = self.expr()?;
        let token = self.lexer.next_token()?;
        if token.kind != TokenKind::End {
            return Err(ParseError::new(
                ParseErrorKind::PrematureEnd,
                token.position,
                format!("parsing ended prematurely at {}", describe(&token)),
            ));
        }
        Ok(expr)
    }

    fn descend<T>(
        &mut self,
        f: impl FnOnce(&mut Self) -> Result<T, ParseError>,
    ) -> Result<T, ParseError> {
        if self.depth >= self.max_depth {
            return Err(ParseError::new(
                ParseErrorKind::TooDeep,
                self.lexer.position(),
                format!("expression nests deeper than {}", self.max_depth),
            ));
        }
        self.depth += 1;
        let result = f(self);
        self.depth -= 1;
        result
    }

    fn expr(&mut self) -> Result<Expr, ParseError> {
        let first = self.term()?;
        let mut rest = Vec::new();
        while self.lexer.peek_token()?.kind == TokenKind::Or {
            self.lexer.next_token()?;
            rest.push(self.term()?);
        }
        Ok(fold_right(first, rest, Expr::or))
    }

    fn term(&mut self) -> Result<Expr, ParseError> {
        let first = self.factor()?;
        let mut rest = Vec::new();
        while self.lexer.peek_token()?.kind == TokenKind::And {
            self.lexer.next_token()?;
            rest.push(self.factor()?);
        }
        Ok(fold_right(first, rest, Expr::and))
    }

    fn factor(&mut self) -> Result<Expr, ParseError> {
        let token = self.lexer.next_token()?;
        match token.kind {
            TokenKind::Not => Ok(self.descend(Self::factor)?.negate()),
            TokenKind::Left => {
                let expr = self.descend(Self::expr)?;
                let right = self.lexer.next_token()?;
                if right.kind != TokenKind::Right {
                    return Err(ParseError::new(
                        ParseErrorKind::UnmatchedParenthesis,
                        token.position,
                        "could not find matching right parenthesis",
                    ));
                }
                Ok(expr)
            }
            TokenKind::Operand => self.predicate(token),
            _ => Err(ParseError::new(
                ParseErrorKind::UnexpectedToken,
                token.position,
                format!("unexpected token {}", describe(&token)),
            )),
        }
    }

    fn predicate(&mut self, attr: Token<'a>) -> Result<Expr, ParseError> {
        if self.predicates >= self.max_predicates {
            return Err(ParseError::new(
                ParseErrorKind::TooManyPredicates,
                attr.position,
                format!("filter has more than {} predicates", self.max_predicates),
            ));
        }
        self.predicates += 1;
        let op = self.lexer.next_token()?;
        if op.kind != TokenKind::Operator {
            return Err(ParseError::new(
                ParseErrorKind::MissingOperator,
                op.position,
                "first operand must be followed by operator in all predicates",
            ));
        }
        let rel_op = op.text.parse::<RelOp>().map_err(|unknown| {
            ParseError::new(
                ParseErrorKind::UnsupportedOperator,
                op.position,
                format!("operator '{}' is not supported", unknown.0),
            )
        })?;
        let value = self.lexer.next_token()?;
        if value.kind != TokenKind::Operand {
            return Err(ParseError::new(
                ParseErrorKind::MissingOperand,
                value.position,
                "operator must be followed by operand in all predicates",
            ));
        }
        Ok(Expr::Predicate(Predicate::new(attr.text, rel_op, value.text)))
    }
}

// `a, [b, c]` becomes `f(a, f(b, c))`.
fn fold_right(first: Expr, mut rest: Vec<Expr>, f: fn(Expr, Expr) -> Expr) -> Expr {
    let Some(mut acc) = rest.pop() else {
        return first;
    };
    while let Some(item) = rest.pop() {
        acc = f(item, acc);
    }
    f(first, acc)
}

fn describe(token: &Token<'_>) -> String {
    match token.kind {
        TokenKind::End => "end of input".to_string(),
        _ => format!("'{}'", token.text),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(input: &str) -> Result<Expr, ParseError> {
        Parser::new(input).parse()
    }

    fn p(attr: &str, op: RelOp, value: &str) -> Expr {
        Expr::predicate(attr, op, value)
    }

    #[test]
    fn single_predicate() {
        assert_eq!(parse("a==1").unwrap(), p("a", RelOp::Eq, "1"));
        assert_eq!(parse("  a  <=  -4.5 ").unwrap(), p("a", RelOp::Le, "-4.5"));
    }

    #[test]
    fn and_binds_tighter_than_or() {
        assert_eq!(
            parse("a==1 || b==2 && c==3").unwrap(),
            Expr::or(
                p("a", RelOp::Eq, "1"),
                Expr::and(p("b", RelOp::Eq, "2"), p("c", RelOp::Eq, "3")),
            )
        );
    }

    #[test]
    fn connectives_nest_to_the_right() {
        assert_eq!(
            parse("a==1 && b==2 && c==3").unwrap(),
            Expr::and(
                p("a", RelOp::Eq, "1"),
                Expr::and(p("b", RelOp::Eq, "2"), p("c", RelOp::Eq, "3")),
            )
        );
        assert_eq!(
            parse("(a==1 || b==2) || c==3").unwrap(),
            Expr::or(
                Expr::or(p("a", RelOp::Eq, "1"), p("b", RelOp::Eq, "2")),
                p("c", RelOp::Eq, "3"),
            )
        );
    }

    #[test]
    fn negation_is_pushed_to_leaves() {
        assert_eq!(parse("!x<=5").unwrap(), p("x", RelOp::Gt, "5"));
        assert_eq!(
            parse("!(a<5 || b>10)").unwrap(),
            Expr::and(p("a", RelOp::Ge, "5"), p("b", RelOp::Le, "10"))
        );
        assert_eq!(parse("!!!(a==1)").unwrap(), p("a", RelOp::Neq, "1"));
    }

    #[test]
    fn not_binds_to_a_single_factor() {
        assert_eq!(
            parse("!a==1 && b==2").unwrap(),
            Expr::and(p("a", RelOp::Neq, "1"), p("b", RelOp::Eq, "2"))
        );
    }

    #[test]
    fn structural_errors() {
        let cases = [
            ("a==1 b==2", ParseErrorKind::PrematureEnd, 5),
            ("a==1)", ParseErrorKind::PrematureEnd, 4),
            ("(a==1", ParseErrorKind::UnmatchedParenthesis, 0),
            ("&& a==1", ParseErrorKind::UnexpectedToken, 0),
            ("", ParseErrorKind::UnexpectedToken, 0),
            ("a==1 ||", ParseErrorKind::UnexpectedToken, 7),
            ("a b", ParseErrorKind::MissingOperator, 2),
            ("a ==", ParseErrorKind::MissingOperand, 4),
            ("a == (", ParseErrorKind::MissingOperand, 5),
            ("a !in b", ParseErrorKind::UnsupportedOperator, 2),
            ("a = 1", ParseErrorKind::Lexical, 2),
        ];
        for (input, kind, position) in cases {
            let err = parse(input).unwrap_err();
            assert_eq!(err.kind(), kind, "{input}: {err}");
            assert_eq!(err.position(), position, "{input}: {err}");
        }
    }

    #[test]
    fn premature_end_message() {
        let err = parse("a==1 b").unwrap_err();
        assert_eq!(err.to_string(), "parsing ended prematurely at 'b' at position 5");
    }

    #[test]
    fn depth_limit_rejects_runaway_nesting() {
        let deep = format!("{}a==1{}", "(".repeat(10), ")".repeat(10));
        assert!(Parser::new(&deep).with_max_depth(16).parse().is_ok());

        let err = Parser::new(&deep).with_max_depth(4).parse().unwrap_err();
        assert_eq!(err.kind(), ParseErrorKind::TooDeep);

        let bangs = format!("{}a==1", "!".repeat(DEFAULT_MAX_DEPTH + 1));
        assert_eq!(parse(&bangs).unwrap_err().kind(), ParseErrorKind::TooDeep);
    }

    #[test]
    fn long_flat_chains_are_not_nesting() {
        let members: Vec<String> = (0..1_000).map(|i| format!("a=={i}")).collect();
        let expr = Parser::new(&members.join(" || "))
            .with_max_depth(1)
            .parse()
            .unwrap();
        assert_eq!(expr.predicates().count(), 1_000);
        assert!(matches!(&expr, Expr::Or(left, _) if **left == p("a", RelOp::Eq, "0")));

        let conjunction = members.join(" && ");
        assert_eq!(parse(&conjunction).unwrap().predicates().count(), 1_000);
    }

    #[test]
    fn predicate_limit_bounds_filter_size() {
        let err = Parser::new("a==1 || (b==2 && c==3)")
            .with_max_predicates(2)
            .parse()
            .unwrap_err();
        assert_eq!(err.kind(), ParseErrorKind::TooManyPredicates);
        assert_eq!(err.position(), 17);

        let members: Vec<String> = (0..=DEFAULT_MAX_PREDICATES)
            .map(|i| format!("a=={i}"))
            .collect();
        assert_eq!(
            parse(&members.join(" || ")).unwrap_err().kind(),
            ParseErrorKind::TooManyPredicates
        );
    }
}
