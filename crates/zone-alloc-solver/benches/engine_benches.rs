// Copyright (c) 2025 Felix Kahle.
//
// Permission is hereby granted, free of charge, to any person obtaining
// a copy of this software and associated documentation files (the
// "Software"), to deal in the Software without restriction, including
// without limitation the rights to use, copy, modify, merge, publish,
// distribute, sublicense, and/or sell copies of the Software, and to
// permit persons to whom the Software is furnished to do so, subject to
// the following conditions:
//
// The above copyright notice and this permission notice shall be
// included in all copies or substantial portions of the Software.
//
// THE SOFTWARE IS PROVIDED "AS IS", WITHOUT WARRANTY OF ANY KIND,
// EXPRESS OR IMPLIED, INCLUDING BUT NOT LIMITED TO THE WARRANTIES OF
// MERCHANTABILITY, FITNESS FOR A PARTICULAR PURPOSE AND
// NONINFRINGEMENT. IN NO EVENT SHALL THE AUTHORS OR COPYRIGHT HOLDERS BE
// LIABLE FOR ANY CLAIM, DAMAGES OR OTHER LIABILITY, WHETHER IN AN ACTION
// OF CONTRACT, TORT OR OTHERWISE, ARISING FROM, OUT OF OR IN CONNECTION
// WITH THE SOFTWARE OR THE USE OR OTHER DEALINGS IN THE SOFTWARE.

use criterion::{Criterion, criterion_group, criterion_main};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use std::hint::black_box;
use zone_alloc_core::prelude::{GeoPoint, Ring};
use zone_alloc_model::prelude::*;
use zone_alloc_solver::prelude::*;

const KM_PER_DEG: f64 = 111.195;

/// --- helpers ---
#[inline]
fn km(x: f64, y: f64) -> GeoPoint<f64> {
    GeoPoint::new(x / KM_PER_DEG, y / KM_PER_DEG)
}

/// Random city-sized instance: `zones` squares and `facilities` facilities
/// spread over three groups.
fn build_problem(zones: u64, facilities: u64, seed: u64) -> Problem {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let mut builder = ProblemBuilder::new();
    for i in 0..zones {
        let (cx, cy) = (rng.gen_range(-15.0..15.0), rng.gen_range(-15.0..15.0));
        let h = rng.gen_range(0.2..1.2);
        let ring = Ring::new(vec![
            km(cx - h, cy - h),
            km(cx + h, cy - h),
            km(cx + h, cy + h),
            km(cx - h, cy + h),
        ])
        .expect("ring ok");
        builder.add_zone(
            Zone::new(ZoneIdentifier::new(i), format!("Z{i}"), ring)
                .with_demand(rng.gen_range(1.0..25.0)),
        );
    }
    for i in 0..facilities {
        let loc = km(rng.gen_range(-12.0..12.0), rng.gen_range(-12.0..12.0));
        builder.add_facility(
            Facility::new(FacilityIdentifier::new(i), format!("F{i}"), loc)
                .with_capacity(rng.gen_range(1.0..5.0))
                .with_group(GroupIdentifier::new(i % 3)),
        );
    }
    builder.build().expect("problem ok")
}

fn bench_engine_run(c: &mut Criterion) {
    let problem = build_problem(500, 24, 42);
    let token = CancellationToken::new();

    let strict = AssignmentEngine::new(EngineConfig::default(), HaversineOracle::new());
    c.bench_function("AssignmentEngine run strict (500 zones, 24 facilities)", |b| {
        b.iter(|| {
            let out = strict.run(black_box(&problem), &token).expect("run ok");
            black_box(out.assignments.len())
        })
    });

    let rebalanced = AssignmentEngine::new(
        EngineConfig::default().with_rebalance(true),
        HaversineOracle::new(),
    );
    c.bench_function("AssignmentEngine run strict + rebalance (500 zones, 24 facilities)", |b| {
        b.iter(|| {
            let out = rebalanced.run(black_box(&problem), &token).expect("run ok");
            black_box(out.moves.len())
        })
    });

    let gravity = AssignmentEngine::new(
        EngineConfig::default().with_scoring(ScoringMode::Gravity),
        HaversineOracle::new(),
    );
    c.bench_function("AssignmentEngine run gravity (500 zones, 24 facilities)", |b| {
        b.iter(|| {
            let out = gravity.run(black_box(&problem), &token).expect("run ok");
            black_box(out.assignments.len())
        })
    });
}

fn bench_override_merge(c: &mut Criterion) {
    let problem = build_problem(500, 24, 7);
    let engine = AssignmentEngine::new(EngineConfig::default(), HaversineOracle::new());
    let outcome = engine
        .run(&problem, &CancellationToken::new())
        .expect("run ok");
    let overrides: OverrideSet = (0..500u64)
        .step_by(5)
        .map(|z| {
            Override::new(
                ZoneIdentifier::new(z),
                GroupIdentifier::new(z % 3).into(),
                FacilityIdentifier::new(z % 24),
            )
        })
        .collect();

    c.bench_function("OverrideSet merge (100 overrides over 1500 assignments)", |b| {
        b.iter(|| black_box(overrides.merge(black_box(&outcome.assignments)).len()))
    });
}

criterion_group!(benches, bench_engine_run, bench_override_merge);
criterion_main!(benches);
