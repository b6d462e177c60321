use super::{
    ast::{Expr, Predicate},
    error::EvalError,
};
use crate::{
    logging::{strata_log, FILTER_CTX},
    relop::RelOp,
    scalar::{Scalar, ScalarType},
    schema::{SchemaSnapshot, TIMESTAMP_COLUMN},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Target {
    Timestamp,
    Column(usize),
}

/// A predicate with its attribute resolved and its literal typed.
#[derive(Debug, Clone, PartialEq)]
struct Comparison {
    target: Target,
    op: RelOp,
    literal: Scalar,
}

impl Comparison {
    fn resolve(predicate: &Predicate, snapshot: &SchemaSnapshot) -> Result<Self, EvalError> {
        let (target, ty) = if predicate.attr.eq_ignore_ascii_case(TIMESTAMP_COLUMN) {
            (Target::Timestamp, ScalarType::Int64)
        } else {
            let i = snapshot
                .column_index(&predicate.attr)
                .ok_or_else(|| EvalError::UnknownAttribute(predicate.attr.clone()))?;
            (Target::Column(i), snapshot.column(i).scalar_type())
        };
        let literal = Scalar::parse(ty, &predicate.value).map_err(|source| EvalError::Literal {
            attr: predicate.attr.clone(),
            source,
        })?;
        Ok(Self {
            target,
            op: predicate.op,
            literal,
        })
    }

    fn matches(&self, snapshot: &SchemaSnapshot, record: &[u8]) -> bool {
        let ordering = match self.target {
            Target::Timestamp => Scalar::Int64(snapshot.timestamp(record)).compare(&self.literal),
            Target::Column(i) => snapshot.field(record, i).compare(&self.literal),
        };
        self.op.holds(ordering)
    }
}

impl Expr {
    /// Evaluate against one record, resolving attributes as they are reached.
    ///
    /// Connectives short-circuit left to right, so an unknown attribute on a
    /// branch that is never reached does not surface.
    pub fn evaluate(&self, snapshot: &SchemaSnapshot, record: &[u8]) -> Result<bool, EvalError> {
        match self {
            Expr::And(left, right) => {
                Ok(left.evaluate(snapshot, record)? && right.evaluate(snapshot, record)?)
            }
            Expr::Or(left, right) => {
                Ok(left.evaluate(snapshot, record)? || right.evaluate(snapshot, record)?)
            }
            Expr::Predicate(predicate) => {
                Ok(Comparison::resolve(predicate, snapshot)?.matches(snapshot, record))
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
enum Node {
    And(Box<Node>, Box<Node>),
    Or(Box<Node>, Box<Node>),
    Compare(Comparison),
}

impl Node {
    fn compile(expr: &Expr, snapshot: &SchemaSnapshot) -> Result<Self, EvalError> {
        Ok(match expr {
            Expr::And(left, right) => Node::And(
                Box::new(Node::compile(left, snapshot)?),
                Box::new(Node::compile(right, snapshot)?),
            ),
            Expr::Or(left, right) => Node::Or(
                Box::new(Node::compile(left, snapshot)?),
                Box::new(Node::compile(right, snapshot)?),
            ),
            Expr::Predicate(predicate) => Node::Compare(Comparison::resolve(predicate, snapshot)?),
        })
    }

    fn matches(&self, snapshot: &SchemaSnapshot, record: &[u8]) -> bool {
        match self {
            Node::And(left, right) => {
                left.matches(snapshot, record) && right.matches(snapshot, record)
            }
            Node::Or(left, right) => {
                left.matches(snapshot, record) || right.matches(snapshot, record)
            }
            Node::Compare(comparison) => comparison.matches(snapshot, record),
        }
    }
}

/// An expression bound to one schema: every attribute resolved and every
/// literal typed up front, so per-record evaluation cannot fail.
#[derive(Debug, Clone)]
pub struct CompiledFilter {
    root: Node,
    snapshot: SchemaSnapshot,
}

impl CompiledFilter {
    pub fn compile(expr: &Expr, snapshot: &SchemaSnapshot) -> Result<Self, EvalError> {
        let root = Node::compile(expr, snapshot)?;
        strata_log!(
            log::Level::Debug,
            ctx: FILTER_CTX,
            "filter_compiled",
            "predicates={}",
            expr.predicates().count()
        );
        Ok(Self {
            root,
            snapshot: snapshot.clone(),
        })
    }

    pub fn matches(&self, record: &[u8]) -> bool {
        self.root.matches(&self.snapshot, record)
    }

    pub fn snapshot(&self) -> &SchemaSnapshot {
        &self.snapshot
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::Schema;

    fn snapshot() -> SchemaSnapshot {
        Schema::builder()
            .column("a", ScalarType::Int32)
            .column("b", ScalarType::Float64)
            .column("ok", ScalarType::Bool)
            .column("code", ScalarType::Bytes(2))
            .build()
            .unwrap()
            .into()
    }

    fn row(snapshot: &SchemaSnapshot, ts: i64, a: i32, b: f64, ok: bool, code: &str) -> Vec<u8> {
        snapshot
            .schema()
            .encode_record(
                ts,
                &[
                    Scalar::Int32(a),
                    Scalar::Float64(b),
                    Scalar::Bool(ok),
                    Scalar::from(code.as_bytes()),
                ],
            )
            .unwrap()
    }

    fn eval(filter: &str, snapshot: &SchemaSnapshot, record: &[u8]) -> Result<bool, EvalError> {
        filter.parse::<Expr>().unwrap().evaluate(snapshot, record)
    }

    #[test]
    fn compares_each_kind() {
        let snapshot = snapshot();
        let record = row(&snapshot, 100, 3, 2.5, true, "GB");

        assert_eq!(eval("a==3", &snapshot, &record), Ok(true));
        assert_eq!(eval("a>=4", &snapshot, &record), Ok(false));
        assert_eq!(eval("b<2.75", &snapshot, &record), Ok(true));
        assert_eq!(eval("ok==true", &snapshot, &record), Ok(true));
        assert_eq!(eval("code!=US", &snapshot, &record), Ok(true));
        assert_eq!(eval("A==3 && B>2", &snapshot, &record), Ok(true));
        assert_eq!(eval("_ts>99 && _ts<=100", &snapshot, &record), Ok(true));
    }

    #[test]
    fn negated_filter_is_the_complement() {
        let snapshot = snapshot();
        for a in -3..3 {
            let record = row(&snapshot, 0, a, a as f64, a > 0, "xx");
            let plain = eval("a<0 || (b>=1 && ok==1)", &snapshot, &record).unwrap();
            let negated = eval("!(a<0 || (b>=1 && ok==1))", &snapshot, &record).unwrap();
            assert_ne!(plain, negated, "a={a}");
        }
    }

    #[test]
    fn errors_surface_instead_of_false() {
        let snapshot = snapshot();
        let record = row(&snapshot, 0, 1, 0.0, false, "ab");

        assert_eq!(
            eval("missing==1", &snapshot, &record),
            Err(EvalError::UnknownAttribute("missing".into()))
        );
        assert!(matches!(
            eval("a==1.5", &snapshot, &record),
            Err(EvalError::Literal { ref attr, .. }) if attr == "a"
        ));
        assert!(eval("code==abc", &snapshot, &record).is_err());
    }

    #[test]
    fn evaluation_short_circuits() {
        let snapshot = snapshot();
        let record = row(&snapshot, 0, 1, 0.0, false, "ab");

        assert_eq!(eval("a==1 || missing==1", &snapshot, &record), Ok(true));
        assert_eq!(eval("a==2 && missing==1", &snapshot, &record), Ok(false));
        assert!(eval("a==2 || missing==1", &snapshot, &record).is_err());
    }

    #[test]
    fn compiled_filter_matches_like_evaluate() {
        let snapshot = snapshot();
        let expr: Expr = "a>0 && (code==ab || b<0)".parse().unwrap();
        let filter = CompiledFilter::compile(&expr, &snapshot).unwrap();

        for (a, b, code) in [(1, 1.0, "ab"), (1, -1.0, "cd"), (0, -1.0, "ab"), (5, 3.0, "zz")] {
            let record = row(&snapshot, 0, a, b, false, code);
            assert_eq!(
                filter.matches(&record),
                expr.evaluate(&snapshot, &record).unwrap()
            );
        }

        let unknown: Expr = "a==1 || nope==2".parse().unwrap();
        assert_eq!(
            CompiledFilter::compile(&unknown, &snapshot).unwrap_err(),
            EvalError::UnknownAttribute("nope".into())
        );
    }
}
