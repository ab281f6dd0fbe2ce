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
    group::{GenderBalance, level_range},
    id::Week,
    plan::WeeklyPlan,
    roster::Roster,
};
use court_plan_solver::prelude::{GreedyPlanBuilder, ImprovementEngine, PlanSolver};
use serde::Serialize;
use std::{fs::File, io::BufWriter, time::Instant};
use tracing_subscriber::EnvFilter;

fn enable_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();
}

#[derive(Debug, Clone, Serialize)]
struct InstanceInfo {
    idx: usize,
    seed: u64,
    players: usize,
    locations: u32,
}

#[derive(Debug, Clone, Serialize)]
struct GroupRow {
    group: u64,
    location: u32,
    players: Vec<u64>,
    levels: String,
    gender_balance: String,
    score: f64,
    quality: String,
}

#[derive(Debug, Clone, Serialize)]
struct WeekResult {
    week: u32,
    groups: usize,
    unassigned: usize,
    residual_stand_ins: usize,
    total_score: f64,
    mean_score: f64,
    best_score: f64,
    excellent: usize,
    normal: usize,
    poor: usize,
    below_quality_floor: bool,
    elapsed_ms: u128,
    rows: Vec<GroupRow>,
}

fn group_rows(plan: &WeeklyPlan, roster: &Roster) -> Vec<GroupRow> {
    plan.groups()
        .iter()
        .map(|g| {
            let members = roster
                .members(g.members())
                .expect("plan members come from the roster");
            let levels = match level_range(members.iter().copied()) {
                Some((lo, hi)) if lo == hi => format!("{}", lo.value()),
                Some((lo, hi)) => format!("{}-{}", lo.value(), hi.value()),
                None => String::new(),
            };
            GroupRow {
                group: g.id().value(),
                location: g.location().value(),
                players: g.members().iter().map(|id| id.value()).collect(),
                levels,
                gender_balance: GenderBalance::of(members.iter().copied()).to_string(),
                score: g.total().value(),
                quality: g.quality().to_string(),
            }
        })
        .collect()
}

#[derive(Debug, Clone, Serialize)]
struct RunResult {
    instance: InstanceInfo,
    weeks: Vec<WeekResult>,
}

#[derive(Debug, Clone, Serialize)]
struct PlanningReport {
    description: String,
    instances: Vec<RunResult>,
}

fn interpolate_u(val0: usize, val1: usize, step: usize, steps: usize) -> usize {
    if steps <= 1 {
        return val1;
    }
    let num = (val1 as isize - val0 as isize) * step as isize;
    (val0 as isize + num / (steps as isize - 1)).max(0) as usize
}

fn main() {
    enable_tracing();

    let cfg = ScoringConfig::default();
    cfg.validate().expect("default config is valid");
    let engine = ImprovementEngine::new(GreedyPlanBuilder::new());

    let n_instances = 4usize;
    let min_players = 32usize;
    let max_players = 160usize;
    let locations = 3u32;
    let weeks = cfg.planning.default_weeks;

    let mut results: Vec<RunResult> = Vec::with_capacity(n_instances);

    for i in 0..n_instances {
        let players = interpolate_u(min_players, max_players, i, n_instances);
        let seed = 42 + i as u64;

        let gen_cfg =
            RosterGenConfig::new(seed, players, locations, 3, 8, 0.5, 0.2, 0.3, 0.1, 42.0, 12.0)
                .expect("valid roster generator config");
        let mut generator = RosterGenerator::new(gen_cfg);
        let mut roster = generator.generate();

        let mut week_results = Vec::with_capacity(weeks as usize);
        for week in 1..=weeks {
            let t0 = Instant::now();
            let plan = engine.solve(&roster, Week::new(week), &cfg);
            let elapsed = t0.elapsed();
            plan.validate(&roster).expect("plan covers the roster");

            let stats = plan.stats();
            week_results.push(WeekResult {
                week,
                groups: stats.group_count(),
                unassigned: stats.unassigned_count(),
                residual_stand_ins: plan.residual().map_or(0, |r| r.stand_ins()),
                total_score: stats.total_score().value(),
                mean_score: stats.mean_score().value(),
                best_score: stats.best_score().value(),
                excellent: stats.excellent(),
                normal: stats.normal(),
                poor: stats.poor(),
                below_quality_floor: plan.is_below_quality_floor(),
                elapsed_ms: elapsed.as_millis(),
                rows: group_rows(&plan, &roster),
            });

            // Next week reads this plan as its continuity signal.
            roster = roster.advance(&plan);
        }

        results.push(RunResult {
            instance: InstanceInfo {
                idx: i,
                seed,
                players,
                locations,
            },
            weeks: week_results,
        });
    }

    let report = PlanningReport {
        description: format!(
            "Weekly group planning: {n_instances} instances from {min_players} to \
             {max_players} players, {weeks} consecutive weeks each."
        ),
        instances: results,
    };

    let file = File::create("plan_report.json").expect("create plan_report.json");
    let mut writer = BufWriter::new(file);
    serde_json::to_writer_pretty(&mut writer, &report).expect("write json report");

    println!();
    println!("=================================================================");
    println!("======================== Planning Done ==========================");
    println!("=================================================================");
    println!();
    for run in &report.instances {
        let means: Vec<f64> = run.weeks.iter().map(|w| w.mean_score).collect();
        let overall = means.iter().sum::<f64>() / means.len().max(1) as f64;
        let excellent: usize = run.weeks.iter().map(|w| w.excellent).sum();
        let poor: usize = run.weeks.iter().map(|w| w.poor).sum();
        let unassigned: usize = run.weeks.iter().map(|w| w.unassigned).sum();
        println!(
            "instance {} ({} players): mean score {:.2}, {} excellent / {} poor groups, {} unassigned player-weeks",
            run.instance.idx, run.instance.players, overall, excellent, poor, unassigned
        );
    }
    println!();
    println!("Wrote: plan_report.json");
}
