use crate::{
    aggregate::AggregateKind,
    filter::{DEFAULT_MAX_DEPTH, DEFAULT_MAX_PREDICATES},
};

/// Per-stream configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StreamOption {
    pub(crate) tracked: Vec<(String, AggregateKind)>,
    pub(crate) max_filter_depth: usize,
    pub(crate) max_filter_predicates: usize,
}

impl Default for StreamOption {
    fn default() -> Self {
        StreamOption {
            tracked: Vec::new(),
            max_filter_depth: DEFAULT_MAX_DEPTH,
            max_filter_predicates: DEFAULT_MAX_PREDICATES,
        }
    }
}

impl StreamOption {
    /// Maintain a versioned `kind` aggregate over `column`.
    pub fn track(mut self, column: impl Into<String>, kind: AggregateKind) -> Self {
        self.tracked.push((column.into(), kind));
        self
    }

    /// Bound on `!` and parenthesis nesting accepted by the filter parser.
    pub fn max_filter_depth(self, max_filter_depth: usize) -> Self {
        StreamOption {
            max_filter_depth,
            ..self
        }
    }

    /// Bound on the number of predicates in one filter.
    pub fn max_filter_predicates(self, max_filter_predicates: usize) -> Self {
        StreamOption {
            max_filter_predicates,
            ..self
        }
    }

    pub fn tracked(&self) -> &[(String, AggregateKind)] {
        &self.tracked
    }
}
