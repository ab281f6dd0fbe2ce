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

//! The budgeted improvement engine.
//!
//! Rounds over a completed plan: rank groups ascending, repair the ones at
//! or below the poor threshold via the cheapest sufficient move (a
//! single-player swap first, a full recomposition of two or three groups
//! when no swap helps). Groups at or above the excellence threshold are
//! frozen and never touched. Every move is computed against the current
//! plan, re-validated against the hard filters and applied atomically;
//! rejected moves leave no trace. Budget exhaustion is the designed
//! stopping rule, not a failure.

use crate::{
    builder::PlanSolver,
    candidates::{CandidateIter, capped_subset, complete_group, passes_hard_filters},
    scoring::GroupScorer,
};
use court_plan_core::score::Score;
use court_plan_model::{
    config::ScoringConfig,
    group::{GROUP_SIZE, ScoreBreakdown},
    id::{LocationId, PlayerId, Week},
    plan::WeeklyPlan,
    player::Player,
    roster::Roster,
};
use std::fmt::Display;
use tracing::{debug, info, instrument};

/// Outcome counters for one improvement run.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ImproveStats {
    rounds: usize,
    swaps: usize,
    rebuilt_groups: usize,
    gain: Score,
}

impl ImproveStats {
    #[inline]
    pub fn rounds(&self) -> usize {
        self.rounds
    }

    #[inline]
    pub fn swaps(&self) -> usize {
        self.swaps
    }

    #[inline]
    pub fn rebuilt_groups(&self) -> usize {
        self.rebuilt_groups
    }

    /// Total plan-score improvement over the whole run.
    #[inline]
    pub fn gain(&self) -> Score {
        self.gain
    }
}

impl Display for ImproveStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} rounds, {} swaps, {} rebuilt groups, +{}",
            self.rounds, self.swaps, self.rebuilt_groups, self.gain
        )
    }
}

#[derive(Debug, Clone)]
struct SwapMove {
    other: usize,
    target_members: [PlayerId; GROUP_SIZE],
    other_members: [PlayerId; GROUP_SIZE],
    target_breakdown: ScoreBreakdown,
    other_breakdown: ScoreBreakdown,
    delta: Score,
}

#[derive(Debug, Clone)]
struct RebuildMove {
    slots: Vec<(usize, [PlayerId; GROUP_SIZE], ScoreBreakdown)>,
    delta: Score,
}

/// Wraps a constructive solver and refines its draft within the configured
/// budgets.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImprovementEngine<S> {
    construction: S,
}

impl<S> ImprovementEngine<S> {
    pub fn new(construction: S) -> Self {
        Self { construction }
    }

    #[inline]
    pub fn construction(&self) -> &S {
        &self.construction
    }
}

impl<S> ImprovementEngine<S> {
    /// Refines `plan` in place and reports what happened. Never decreases
    /// the plan's total score; every intermediate state is a valid,
    /// fully-covering plan.
    #[instrument(skip_all, fields(week = plan.week().value(), groups = plan.groups().len()))]
    pub fn improve(
        &self,
        plan: &mut WeeklyPlan,
        roster: &Roster,
        cfg: &ScoringConfig,
    ) -> ImproveStats {
        let imp = &cfg.improvement;
        let scorer = GroupScorer::new(roster, cfg);
        let mut stats = ImproveStats::default();
        let mut swaps_left = imp.max_swaps;
        let mut rebuilds_left = imp.max_rebuilds;

        for round in 0..imp.max_rounds {
            stats.rounds = round + 1;
            let mut moves = 0usize;
            // Groups that already received a move this round; one accepted
            // move per group per round, whether as target or as partner.
            let mut touched: std::collections::BTreeSet<usize> = std::collections::BTreeSet::new();

            let mut order: Vec<usize> = (0..plan.groups().len()).collect();
            order.sort_by(|&a, &b| {
                plan.groups()[a]
                    .total()
                    .total_cmp(&plan.groups()[b].total())
                    .then(plan.groups()[a].id().cmp(&plan.groups()[b].id()))
            });
            let targets: Vec<usize> = order
                .into_iter()
                .filter(|&i| plan.groups()[i].total() <= imp.poor_threshold)
                .collect();

            for &idx in &targets {
                if swaps_left == 0 && rebuilds_left < 2 {
                    break;
                }
                // An earlier move this round may have lifted the group out
                // of the repair range already.
                if touched.contains(&idx) || plan.groups()[idx].total() > imp.poor_threshold {
                    continue;
                }

                if swaps_left > 0
                    && let Some(mv) = self.best_swap(plan, idx, roster, cfg, &scorer)
                {
                    debug!(group = %plan.groups()[idx].id(), delta = %mv.delta, "swap accepted");
                    self.apply_swap(plan, idx, &mv, cfg);
                    touched.insert(idx);
                    touched.insert(mv.other);
                    swaps_left -= 1;
                    stats.swaps += 1;
                    stats.gain += mv.delta;
                    moves += 1;
                    continue;
                }

                if rebuilds_left >= 2
                    && let Some(mv) =
                        self.best_rebuild(plan, idx, &targets, rebuilds_left, roster, cfg, &scorer)
                {
                    debug!(
                        group = %plan.groups()[idx].id(),
                        groups = mv.slots.len(),
                        delta = %mv.delta,
                        "recomposition accepted"
                    );
                    rebuilds_left -= mv.slots.len();
                    stats.rebuilt_groups += mv.slots.len();
                    stats.gain += mv.delta;
                    moves += 1;
                    for (slot, _, _) in &mv.slots {
                        touched.insert(*slot);
                    }
                    self.apply_rebuild(plan, mv, cfg);
                }
            }

            if moves == 0 {
                debug!(round, "fixed point, stopping early");
                break;
            }
            if plan
                .groups()
                .iter()
                .all(|g| g.total() >= imp.excellent_threshold)
            {
                debug!(round, "all groups excellent, stopping early");
                break;
            }
            if swaps_left == 0 && rebuilds_left < 2 {
                debug!(round, "move budgets exhausted, stopping early");
                break;
            }
        }

        plan.set_below_quality_floor(plan.mean_score() < imp.plan_quality_floor);
        info!(
            rounds = stats.rounds,
            swaps = stats.swaps,
            rebuilt = stats.rebuilt_groups,
            gain = %stats.gain,
            flagged = plan.is_below_quality_floor(),
            "improvement finished"
        );
        stats
    }

    /// Best single-player swap between the target and any non-frozen other
    /// group that lifts the two-group score sum by at least the acceptance
    /// delta. Both resulting groups are re-validated against the hard
    /// filters before the move is even considered.
    fn best_swap(
        &self,
        plan: &WeeklyPlan,
        idx: usize,
        roster: &Roster,
        cfg: &ScoringConfig,
        scorer: &GroupScorer<'_>,
    ) -> Option<SwapMove> {
        let imp = &cfg.improvement;
        let target = &plan.groups()[idx];
        let target_players = roster.members(target.members()).ok()?;
        let mut best: Option<SwapMove> = None;

        for (other_idx, other) in plan.groups().iter().enumerate() {
            if other_idx == idx || other.total() >= imp.excellent_threshold {
                continue;
            }
            let Ok(other_players) = roster.members(other.members()) else {
                continue;
            };
            for i in 0..GROUP_SIZE {
                for j in 0..GROUP_SIZE {
                    let mut a = target_players;
                    let mut b = other_players;
                    a[i] = other_players[j];
                    b[j] = target_players[i];
                    if !passes_hard_filters(&a, Some(target.location()), cfg)
                        || !passes_hard_filters(&b, Some(other.location()), cfg)
                    {
                        continue;
                    }
                    let a_breakdown = scorer.score(&a, target.location());
                    let b_breakdown = scorer.score(&b, other.location());
                    let delta =
                        (a_breakdown.total + b_breakdown.total) - (target.total() + other.total());
                    if delta < imp.min_accept_delta {
                        continue;
                    }
                    // Strictly-greater keeps the first find on ties, which
                    // makes the search deterministic.
                    if best.as_ref().is_none_or(|incumbent| delta > incumbent.delta) {
                        best = Some(SwapMove {
                            other: other_idx,
                            target_members: a.map(Player::id),
                            other_members: b.map(Player::id),
                            target_breakdown: a_breakdown,
                            other_breakdown: b_breakdown,
                            delta,
                        });
                    }
                }
            }
        }
        best
    }

    fn apply_swap(&self, plan: &mut WeeklyPlan, idx: usize, mv: &SwapMove, cfg: &ScoringConfig) {
        let reshaped_target = plan.groups()[idx]
            .reshape(mv.target_members, mv.target_breakdown, &cfg.improvement)
            .expect("swapping disjoint groups keeps members distinct");
        plan.replace_group(idx, reshaped_target);
        let reshaped_other = plan.groups()[mv.other]
            .reshape(mv.other_members, mv.other_breakdown, &cfg.improvement)
            .expect("swapping disjoint groups keeps members distinct");
        plan.replace_group(mv.other, reshaped_other);
    }

    /// Full recomposition: pool the non-anchored members of the target and
    /// one or two further repair targets, then greedily refill the released
    /// slots. Accepted only when every slot refills legally and the total
    /// improves enough; otherwise the plan is left untouched.
    #[allow(clippy::too_many_arguments)]
    fn best_rebuild(
        &self,
        plan: &WeeklyPlan,
        idx: usize,
        targets: &[usize],
        rebuilds_left: usize,
        roster: &Roster,
        cfg: &ScoringConfig,
        scorer: &GroupScorer<'_>,
    ) -> Option<RebuildMove> {
        let imp = &cfg.improvement;
        let groups = plan.groups();

        let mut indices = vec![idx];
        for &t in targets {
            if indices.len() >= 3 || indices.len() >= rebuilds_left {
                break;
            }
            if t == idx || groups[t].total() > imp.poor_threshold {
                continue;
            }
            if cfg.generation.strict_location && groups[t].location() != groups[idx].location() {
                continue;
            }
            indices.push(t);
        }
        if indices.len() < 2 {
            return None;
        }

        let old_sum: Score = indices.iter().map(|&i| groups[i].total()).sum();

        // Anchored continuity cores stay in their slots; everyone else is
        // released into the transient pool.
        let mut pool: Vec<PlayerId> = Vec::new();
        let mut slots: Vec<(usize, LocationId, Vec<PlayerId>)> = Vec::new();
        for &i in &indices {
            let group = &groups[i];
            let (_, core_gid) = roster.retained_core(group.members());
            let core: Vec<PlayerId> = match core_gid {
                Some(gid) => group
                    .members()
                    .iter()
                    .copied()
                    .filter(|&m| {
                        roster.get(m).and_then(Player::previous_group) == Some(gid)
                    })
                    .collect(),
                None => Vec::new(),
            };
            pool.extend(
                group
                    .members()
                    .iter()
                    .copied()
                    .filter(|m| !core.contains(m)),
            );
            slots.push((i, group.location(), core));
        }
        pool.sort_unstable();

        let mut refilled: Vec<(usize, [PlayerId; GROUP_SIZE], ScoreBreakdown)> = Vec::new();
        for (slot_idx, location, core) in &slots {
            let pool_location = cfg.generation.strict_location.then_some(*location);
            let best = if core.is_empty() {
                let subset_ids = capped_subset(&pool, roster, cfg);
                let subset: Vec<&Player> =
                    subset_ids.iter().filter_map(|&id| roster.get(id)).collect();
                let mut best: Option<([&Player; GROUP_SIZE], ScoreBreakdown)> = None;
                for cand in CandidateIter::new(subset, pool_location, cfg) {
                    let bd = scorer.score(&cand.players, *location);
                    if best
                        .as_ref()
                        .is_none_or(|(_, incumbent)| bd.total > incumbent.total)
                    {
                        best = Some((cand.players, bd));
                    }
                }
                best
            } else {
                let core_players: Vec<&Player> =
                    core.iter().filter_map(|&id| roster.get(id)).collect();
                let fill: Vec<&Player> = pool.iter().filter_map(|&id| roster.get(id)).collect();
                let mut best: Option<([&Player; GROUP_SIZE], ScoreBreakdown)> = None;
                for players in complete_group(&core_players, &fill, pool_location, cfg) {
                    let bd = scorer.score(&players, *location);
                    if best
                        .as_ref()
                        .is_none_or(|(_, incumbent)| bd.total > incumbent.total)
                    {
                        best = Some((players, bd));
                    }
                }
                best
            };

            // One unfillable slot aborts the whole recomposition.
            let (players, breakdown) = best?;
            let members = players.map(Player::id);
            pool.retain(|id| !members.contains(id));
            refilled.push((*slot_idx, members, breakdown));
        }

        let new_sum: Score = refilled.iter().map(|(_, _, bd)| bd.total).sum();
        let delta = new_sum - old_sum;
        if delta < imp.min_accept_delta {
            return None;
        }
        Some(RebuildMove {
            slots: refilled,
            delta,
        })
    }

    fn apply_rebuild(&self, plan: &mut WeeklyPlan, mv: RebuildMove, cfg: &ScoringConfig) {
        for (idx, members, breakdown) in mv.slots {
            let reshaped = plan.groups()[idx]
                .reshape(members, breakdown, &cfg.improvement)
                .expect("recomposed groups draw from disjoint member sets");
            plan.replace_group(idx, reshaped);
        }
    }
}

impl<S: PlanSolver> PlanSolver for ImprovementEngine<S> {
    fn solve(&self, roster: &Roster, week: Week, cfg: &ScoringConfig) -> WeeklyPlan {
        let mut plan = self.construction.solve(roster, week, cfg);
        if cfg.improvement.enabled {
            self.improve(&mut plan, roster, cfg);
        }
        plan
    }
}
