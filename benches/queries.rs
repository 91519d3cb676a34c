//! Query Benchmarks
//!
//! Measures the two analytical queries and visit reassignment over a
//! synthetic dataset held entirely in memory.
//!
//! ## Running
//!
//! ```bash
//! cargo bench --bench queries
//! ```

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tripstore::{
    AverageFilter, Database, Field, Gender, Location, StoreConfig, User, Visit, VisitFilter,
    VisitPatch,
};

// =============================================================================
// Test Utilities
// =============================================================================

const USERS: i64 = 1_000;
const LOCATIONS: i64 = 500;

fn populate(visits: i64) -> Database {
    let db = Database::with_config(
        StoreConfig::new()
            .reference_instant(1_503_695_452)
            .initial_capacity(visits as usize),
    )
    .unwrap();
    let mut rng = StdRng::seed_from_u64(7);

    for id in 1..=LOCATIONS {
        db.create_location(Location {
            id,
            distance: rng.gen_range(1..100),
            city: format!("city{}", id % 40),
            place: format!("place{}", id),
            country: format!("country{}", id % 12),
        })
        .unwrap();
    }
    for id in 1..=USERS {
        db.create_user(User {
            id,
            first_name: "Bench".to_string(),
            last_name: format!("User{}", id),
            birth_date: rng.gen_range(-1_000_000_000..1_000_000_000),
            gender: if id % 2 == 0 { Gender::Male } else { Gender::Female },
            email: format!("u{}@bench.test", id),
        })
        .unwrap();
    }
    for id in 1..=visits {
        db.create_visit(Visit {
            id,
            user: rng.gen_range(1..=USERS),
            location: rng.gen_range(1..=LOCATIONS),
            visited_at: rng.gen_range(900_000_000..1_500_000_000),
            mark: rng.gen_range(0..=5),
        })
        .unwrap();
    }
    db
}

// =============================================================================
// Benchmarks
// =============================================================================

fn bench_visits_for_user(c: &mut Criterion) {
    let mut group = c.benchmark_group("visits_for_user");
    for visits in [10_000i64, 100_000] {
        let db = populate(visits);
        let filter = VisitFilter {
            from_date: Some(1_000_000_000),
            to_distance: Some(60),
            ..Default::default()
        };
        group.bench_with_input(BenchmarkId::new("filtered", visits), &db, |b, db| {
            let mut user = 0;
            b.iter(|| {
                user = user % USERS + 1;
                black_box(db.visits_for_user(user, &filter).unwrap())
            })
        });
    }
    group.finish();
}

fn bench_average_mark(c: &mut Criterion) {
    let mut group = c.benchmark_group("average_mark");
    for visits in [10_000i64, 100_000] {
        let db = populate(visits);
        let plain = AverageFilter::default();
        let by_age = AverageFilter {
            from_age: Some(20),
            to_age: Some(40),
            gender: Some("f".to_string()),
            ..Default::default()
        };
        group.bench_with_input(BenchmarkId::new("unfiltered", visits), &db, |b, db| {
            let mut location = 0;
            b.iter(|| {
                location = location % LOCATIONS + 1;
                black_box(db.average_mark(location, &plain).unwrap())
            })
        });
        group.bench_with_input(BenchmarkId::new("age_gender", visits), &db, |b, db| {
            let mut location = 0;
            b.iter(|| {
                location = location % LOCATIONS + 1;
                black_box(db.average_mark(location, &by_age).unwrap())
            })
        });
    }
    group.finish();
}

fn bench_reassign(c: &mut Criterion) {
    let db = populate(100_000);
    let mut rng = StdRng::seed_from_u64(11);
    c.bench_function("update_visit/reassign", |b| {
        b.iter(|| {
            let patch = VisitPatch {
                user: Field::Value(rng.gen_range(1..=USERS)),
                location: Field::Value(rng.gen_range(1..=LOCATIONS)),
                ..Default::default()
            };
            black_box(db.update_visit(rng.gen_range(1..=100_000), patch).unwrap())
        })
    });
}

criterion_group!(benches, bench_visits_for_user, bench_average_mark, bench_reassign);
criterion_main!(benches);
