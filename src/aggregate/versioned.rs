use std::{ops::Bound, sync::Arc};

use crossbeam_skiplist::SkipMap;

use super::AggregateKind;
use crate::{
    logging::{strata_log, AGGREGATE_CTX},
    scalar::{Scalar, ScalarType},
};

// Entries are keyed by `(offset, seq)`: updates sharing an offset append
// with a higher `seq` instead of replacing, so no entry ever leaves the map.
#[derive(Debug)]
struct Inner {
    entries: SkipMap<(u64, u64), Scalar>,
    kind: AggregateKind,
    ty: ScalarType,
}

impl Inner {
    fn get(&self, offset: u64) -> Scalar {
        self.entries
            .upper_bound(Bound::Included(&(offset, u64::MAX)))
            .map(|entry| entry.value().clone())
            .unwrap_or_else(|| self.kind.identity(self.ty))
    }
}

/// Offset-indexed cumulative aggregate with a single writer.
///
/// Every update appends `(offset, combine(previous, value))`; entries are
/// never mutated or removed afterwards, so a read at offset `o` always
/// returns the newest entry at or before `o`, even while updates at `o`
/// itself are still arriving. Writing takes `&mut self`,
/// which makes the single-writer rule a compile-time property, while any
/// number of [`AggregateReader`]s read concurrently without blocking.
#[derive(Debug)]
pub struct VersionedAggregate {
    inner: Arc<Inner>,
}

impl VersionedAggregate {
    /// # Panics
    /// Panics when `kind` cannot run over `ty` (sum over booleans or blobs).
    pub fn new(ty: ScalarType, kind: AggregateKind) -> Self {
        assert!(
            kind.supports(ty),
            "{kind} aggregation needs an arithmetic type, got {ty}"
        );
        strata_log!(
            log::Level::Debug,
            ctx: AGGREGATE_CTX,
            "aggregate_created",
            "kind={} type={}",
            kind,
            ty
        );
        Self {
            inner: Arc::new(Inner {
                entries: SkipMap::new(),
                kind,
                ty,
            }),
        }
    }

    /// Fold `value` in at `offset`.
    ///
    /// An update at the same offset as the previous one folds over it; a
    /// read at that offset sees the newest fold.
    ///
    /// # Panics
    /// Panics if `offset` is below the last appended offset, or if `value`
    /// is not of the aggregate's type (count accepts any value).
    pub fn update(&mut self, value: &Scalar, offset: u64) {
        let inner = &self.inner;
        if inner.kind != AggregateKind::Count {
            assert_eq!(
                value.scalar_type(),
                inner.ty,
                "{} aggregate over {} fed a {}",
                inner.kind,
                inner.ty,
                value.scalar_type()
            );
        }
        let (seq, last) = match inner.entries.back() {
            Some(entry) => {
                let (last_offset, last_seq) = *entry.key();
                assert!(
                    offset >= last_offset,
                    "aggregate offsets must not go backwards: {offset} after {last_offset}"
                );
                let seq = if offset == last_offset { last_seq + 1 } else { 0 };
                (seq, entry.value().clone())
            }
            None => (0, inner.kind.identity(inner.ty)),
        };
        inner
            .entries
            .insert((offset, seq), inner.kind.combine(&last, value));
    }

    /// Aggregate as of `offset`: the newest entry at or before it, or the
    /// kind's identity when there is none.
    pub fn get(&self, offset: u64) -> Scalar {
        self.inner.get(offset)
    }

    /// A cloneable, thread-safe read handle.
    pub fn reader(&self) -> AggregateReader {
        AggregateReader {
            inner: Arc::clone(&self.inner),
        }
    }

    /// Number of updates recorded.
    pub fn len(&self) -> usize {
        self.inner.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.entries.is_empty()
    }

    pub fn last_offset(&self) -> Option<u64> {
        self.inner.entries.back().map(|entry| entry.key().0)
    }

    pub fn kind(&self) -> AggregateKind {
        self.inner.kind
    }

    /// Kind of the column being aggregated.
    pub fn scalar_type(&self) -> ScalarType {
        self.inner.ty
    }
}

/// Read-only handle onto a [`VersionedAggregate`].
#[derive(Debug, Clone)]
pub struct AggregateReader {
    inner: Arc<Inner>,
}

impl AggregateReader {
    pub fn get(&self, offset: u64) -> Scalar {
        self.inner.get(offset)
    }

    pub fn kind(&self) -> AggregateKind {
        self.inner.kind
    }

    pub fn scalar_type(&self) -> ScalarType {
        self.inner.ty
    }
}
