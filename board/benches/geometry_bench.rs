use std::rc::Rc;

use board::direction::Direction::{N, Ne, E, Se, S, Sw, W, Nw};
use board::geometry::Geometry;
use board::state::State;
use criterion::{black_box, criterion_group, criterion_main, Criterion};

fn build_soccer_bench(c: &mut Criterion) {
    c.bench_function("build soccer 9x11", |b| {
        b.iter(|| black_box(Geometry::build_soccer(9, 11, 2, None).unwrap()));
    });
}

fn build_soccer_with_free_kicks_bench(c: &mut Criterion) {
    c.bench_function("build soccer 15x15 free kicks", |b| {
        b.iter(|| black_box(Geometry::build_soccer(15, 15, 2, Some(5)).unwrap()));
    });
}

fn build_hockey_bench(c: &mut Criterion) {
    c.bench_function("build hockey 9x11 depth 2", |b| {
        b.iter(|| black_box(Geometry::build_hockey(9, 11, 2, 2).unwrap()));
    });
}

fn step_and_rollback_bench(c: &mut Criterion) {
    let geometry = Rc::new(Geometry::build_soccer(9, 11, 2, None).unwrap());
    c.bench_function("step then rollback", |b| {
        b.iter(|| {
            let mut state = State::new(geometry.clone());
            for dir in [N, Ne, E, Se, S, Sw, W, Nw] {
                let (to, changes) = state.step(dir);
                if to != board::NO_WAY {
                    state.rollback(&changes);
                }
            }
            black_box(state)
        });
    });
}

criterion_group!(geometry_benches, build_soccer_bench, build_soccer_with_free_kicks_bench, build_hockey_bench, step_and_rollback_bench);
criterion_main!(geometry_benches);
