use std::rc::Rc;

use board::geometry::Geometry;
use criterion::{black_box, criterion_group, criterion_main, Criterion};
use engine::engine_trait::Engine;
use engine::mcts::MctsAi;

fn soccer_9x11() -> Rc<Geometry> {
    Rc::new(Geometry::build_soccer(9, 11, 2, None).unwrap())
}

fn go_small_budget_bench(c: &mut Criterion) {
    c.bench_function("go, qthink=200 from the opening position", |b| {
        b.iter(|| {
            let mut ai = MctsAi::with_seed(soccer_9x11(), 42);
            ai.set_param("qthink", "200").unwrap();
            black_box(ai.go(false).unwrap())
        });
    });
}

fn go_large_budget_bench(c: &mut Criterion) {
    c.bench_function("go, qthink=5000 from the opening position", |b| {
        b.iter(|| {
            let mut ai = MctsAi::with_seed(soccer_9x11(), 42);
            ai.set_param("qthink", "5000").unwrap();
            black_box(ai.go(false).unwrap())
        });
    });
}

fn go_after_a_few_moves_bench(c: &mut Criterion) {
    c.bench_function("go, qthink=1000 five moves into the game", |b| {
        b.iter(|| {
            let mut ai = MctsAi::with_seed(soccer_9x11(), 7);
            ai.set_param("qthink", "1000").unwrap();
            for _ in 0..5 {
                let (dir, _) = ai.go(false).unwrap();
                ai.do_step(dir).unwrap();
            }
            black_box(ai.go(false).unwrap())
        });
    });
}

criterion_group!(mcts_benches, go_small_budget_bench, go_large_budget_bench, go_after_a_few_moves_bench);
criterion_main!(mcts_benches);
