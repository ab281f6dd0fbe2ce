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

use court_plan_model::{
    config::ScoringConfig,
    generator::{RosterGenConfig, RosterGenerator},
    id::Week,
    roster::Roster,
};
use court_plan_solver::prelude::{GreedyPlanBuilder, ImprovementEngine, PlanSolver};
use criterion::{Criterion, criterion_group, criterion_main};

fn roster_of(players: usize, seed: u64) -> Roster {
    let cfg = RosterGenConfig::new(seed, players, 3, 3, 8, 0.5, 0.2, 0.3, 0.1, 42.0, 12.0)
        .expect("valid generator config");
    RosterGenerator::new(cfg).generate()
}

fn bench_greedy_build(c: &mut Criterion) {
    let cfg = ScoringConfig::default();
    let builder = GreedyPlanBuilder::new();
    for &players in &[48usize, 96, 192] {
        let roster = roster_of(players, 42);
        c.bench_function(&format!("greedy_build_{players}"), |b| {
            b.iter(|| builder.solve(&roster, Week::new(1), &cfg))
        });
    }
}

fn bench_improvement(c: &mut Criterion) {
    let cfg = ScoringConfig::default();
    let builder = GreedyPlanBuilder::new();
    let engine = ImprovementEngine::new(GreedyPlanBuilder::new());
    for &players in &[48usize, 96] {
        let roster = roster_of(players, 42);
        let draft = builder.solve(&roster, Week::new(1), &cfg);
        c.bench_function(&format!("improve_{players}"), |b| {
            b.iter(|| {
                let mut plan = draft.clone();
                engine.improve(&mut plan, &roster, &cfg)
            })
        });
    }
}

criterion_group!(benches, bench_greedy_build, bench_improvement);
criterion_main!(benches);
