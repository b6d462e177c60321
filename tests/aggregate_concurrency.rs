use std::thread;

use strata::{
    aggregate::{AggregateKind, VersionedAggregate},
    scalar::{Scalar, ScalarType},
};

const WRITES: u64 = 20_000;
const READERS: usize = 4;
const FOLDS_PER_OFFSET: i64 = 5;

fn as_i64(value: Scalar) -> i64 {
    match value {
        Scalar::Int64(v) => v,
        other => panic!("expected int64, got {other:?}"),
    }
}

// Index t with t * (t + 1) / 2 == v, if v is triangular.
fn triangular_root(v: i64) -> Option<i64> {
    let guess = (((8.0 * v as f64 + 1.0).sqrt() - 1.0) / 2.0) as i64;
    (guess.saturating_sub(1)..=guess + 1).find(|t| t * (t + 1) / 2 == v)
}

#[test]
fn readers_observe_only_complete_prefixes() {
    let mut agg = VersionedAggregate::new(ScalarType::Int64, AggregateKind::Sum);
    let reader = agg.reader();
    let total = (WRITES * (WRITES + 1) / 2) as i64;

    thread::scope(|scope| {
        for seed in 0..READERS {
            let reader = reader.clone();
            scope.spawn(move || {
                let mut rng = fastrand::Rng::with_seed(seed as u64);
                let mut last = 0i64;
                loop {
                    let latest = as_i64(reader.get(u64::MAX));
                    assert!(latest >= last, "aggregate went backwards");
                    let written = triangular_root(latest).expect("torn sum observed");

                    // Any earlier offset must report the prefix sum ending there.
                    let probe = rng.u64(0..=written as u64);
                    assert_eq!(
                        as_i64(reader.get(probe)),
                        (probe * (probe + 1) / 2) as i64
                    );

                    last = latest;
                    if latest == total {
                        break;
                    }
                }
            });
        }

        scope.spawn(move || {
            for offset in 1..=WRITES {
                agg.update(&Scalar::Int64(offset as i64), offset);
            }
        });
    });

    assert_eq!(as_i64(reader.get(WRITES)), total);
}

#[test]
fn readers_never_lose_a_shared_offset() {
    let mut agg = VersionedAggregate::new(ScalarType::Int32, AggregateKind::Count);
    let reader = agg.reader();
    let total = WRITES as i64 * FOLDS_PER_OFFSET;

    thread::scope(|scope| {
        for seed in 0..READERS {
            let reader = reader.clone();
            scope.spawn(move || {
                let mut rng = fastrand::Rng::with_seed(seed as u64 + 100);
                let mut last = 0i64;
                loop {
                    let latest = as_i64(reader.get(u64::MAX));
                    assert!(latest >= last, "count went backwards: {latest} after {last}");

                    // Offsets below the one being folded are complete.
                    let complete = (latest / FOLDS_PER_OFFSET) as u64;
                    let probe = rng.u64(0..=complete);
                    assert_eq!(as_i64(reader.get(probe)), probe as i64 * FOLDS_PER_OFFSET);

                    // The offset being folded never reads below its predecessor.
                    let current = as_i64(reader.get(complete + 1));
                    assert!(current >= complete as i64 * FOLDS_PER_OFFSET);

                    last = latest;
                    if latest == total {
                        break;
                    }
                }
            });
        }

        scope.spawn(move || {
            for offset in 1..=WRITES {
                for _ in 0..FOLDS_PER_OFFSET {
                    agg.update(&Scalar::Int32(0), offset);
                }
            }
        });
    });

    assert_eq!(as_i64(reader.get(WRITES)), total);
}

#[test]
fn randomized_floor_lookup_matches_linear_scan() {
    let mut rng = fastrand::Rng::with_seed(42);

    for kind in [
        AggregateKind::Sum,
        AggregateKind::Min,
        AggregateKind::Max,
        AggregateKind::Count,
    ] {
        let mut agg = VersionedAggregate::new(ScalarType::Int64, kind);
        let mut model: Vec<(u64, Scalar)> = Vec::new();
        let mut offset = rng.u64(0..10);

        for _ in 0..500 {
            let value = Scalar::Int64(rng.i64(-1_000..1_000));
            let previous = model
                .last()
                .map(|(_, v)| v.clone())
                .unwrap_or_else(|| kind.identity(ScalarType::Int64));
            model.push((offset, kind.combine(&previous, &value)));
            agg.update(&value, offset);
            // Zero steps fold several updates into one offset.
            offset += rng.u64(0..8);
        }

        for _ in 0..2_000 {
            let query = rng.u64(0..offset + 10);
            let expected = model
                .iter()
                .take_while(|(o, _)| *o <= query)
                .last()
                .map(|(_, v)| v.clone())
                .unwrap_or_else(|| kind.identity(ScalarType::Int64));
            assert_eq!(agg.get(query), expected, "{kind} at {query}");
        }
    }
}

#[test]
fn count_reports_number_of_updates() {
    let mut rng = fastrand::Rng::with_seed(7);
    let mut agg = VersionedAggregate::new(ScalarType::Int32, AggregateKind::Count);
    let mut offset = 0;
    for _ in 0..100 {
        offset += rng.u64(1..100);
        agg.update(&Scalar::Int32(rng.i32(..)), offset);
    }
    assert_eq!(agg.get(offset), Scalar::Int64(100));
}
