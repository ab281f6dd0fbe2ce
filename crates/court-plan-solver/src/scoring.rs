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

//! The multi-component group scorer.
//!
//! Scores are deterministic functions of the four players' attributes, the
//! previous week's memberships and the placement location; no randomness
//! anywhere. A grouping that kept enough of a previous-week group together
//! takes the continuity branch; everything else is scored purely on its
//! fresh composition.

use court_plan_core::{level::spread, score::Score};
use court_plan_model::{
    config::ScoringConfig,
    group::{GROUP_SIZE, GenderBalance, ScoreBreakdown},
    id::LocationId,
    player::Player,
    roster::Roster,
};
use std::collections::BTreeSet;

/// Most common home location over a set of players, lowest location id on
/// a tie. `None` only for an empty set.
pub fn majority_home<'a, I: IntoIterator<Item = &'a Player>>(players: I) -> Option<LocationId> {
    let mut counts: std::collections::BTreeMap<LocationId, usize> = std::collections::BTreeMap::new();
    for p in players {
        *counts.entry(p.home()).or_insert(0) += 1;
    }
    counts
        .into_iter()
        .max_by_key(|&(loc, n)| (n, std::cmp::Reverse(loc)))
        .map(|(loc, _)| loc)
}

/// The location a candidate group would play at: the pool's own location
/// when pooling was location-based, otherwise the majority home of its
/// members (lowest location id on a tie).
pub fn group_location(
    players: &[&Player; GROUP_SIZE],
    pool_location: Option<LocationId>,
) -> LocationId {
    if let Some(loc) = pool_location {
        return loc;
    }
    majority_home(players.iter().copied()).expect("a group always has members")
}

/// Scores four-player groupings against one roster and configuration.
#[derive(Debug, Clone, Copy)]
pub struct GroupScorer<'r> {
    roster: &'r Roster,
    cfg: &'r ScoringConfig,
}

impl<'r> GroupScorer<'r> {
    pub fn new(roster: &'r Roster, cfg: &'r ScoringConfig) -> Self {
        Self { roster, cfg }
    }

    /// Full score for a grouping placed at `location`.
    pub fn score(&self, players: &[&Player; GROUP_SIZE], location: LocationId) -> ScoreBreakdown {
        let max_total = self.cfg.max_total();
        let mut breakdown = self.fresh_breakdown(players, location);
        let fresh_total = breakdown.fresh_sum().capped(max_total);

        let ids = players.map(Player::id);
        let (retained, core) = self.roster.retained_core(&ids);
        breakdown.retained = if core.is_some() { retained } else { 0 };

        let table = &self.cfg.scores.retention;
        breakdown.total = match breakdown.retained {
            4 => table.full_retention,
            3 => scaled_retention(table.three_of_four_base, table.full_retention, fresh_total, max_total),
            2 => scaled_retention(table.two_of_four_base, table.full_retention, fresh_total, max_total),
            _ => fresh_total,
        }
        .capped(max_total);
        breakdown
    }

    fn fresh_breakdown(
        &self,
        players: &[&Player; GROUP_SIZE],
        location: LocationId,
    ) -> ScoreBreakdown {
        ScoreBreakdown {
            retained: 0,
            level: self.level_component(players),
            preference: self.preference_component(players),
            gender: self.gender_component(players),
            age: self.age_component(players),
            flexibility: self.flexibility_bonus(players, location),
            total: Score::ZERO,
        }
    }

    fn level_component(&self, players: &[&Player; GROUP_SIZE]) -> Score {
        let table = &self.cfg.scores.level;
        let gap = spread(players.iter().map(|p| p.level(&self.cfg.compensation)))
            .expect("a group always has members");
        let raw = if gap.is_zero() {
            table.exact_match
        } else if gap <= self.cfg.generation.max_level_gap {
            table.near_match
        } else {
            // Only reachable when the hard filters were relaxed.
            table.far_match
        };
        raw.min(table.cap)
    }

    fn preference_component(&self, players: &[&Player; GROUP_SIZE]) -> Score {
        let table = &self.cfg.scores.preference;
        if players.iter().all(|p| !p.has_preferences()) {
            return table.baseline;
        }

        let member_ids: BTreeSet<_> = players.iter().map(|p| p.id()).collect();
        let mut score = table.baseline;

        // The six in-group pairs.
        for i in 0..GROUP_SIZE {
            for j in i + 1..GROUP_SIZE {
                let a = players[i];
                let b = players[j];
                let ab = a.wants_player(b.id());
                let ba = b.wants_player(a.id());
                if ab && ba {
                    score += table.mutual_fulfilled;
                } else if ab || ba {
                    score += table.one_way_fulfilled;
                }
            }
        }

        // Wishes pointing outside the grouping. A wanted partner who is in
        // this week's roster but not in this grouping counts as
        // unfulfilled; partners absent from the roster are ignored.
        for member in players {
            for &wanted in member.wants() {
                if member_ids.contains(&wanted) {
                    continue;
                }
                let Some(partner) = self.roster.get(wanted) else {
                    continue;
                };
                if partner.wants_player(member.id()) {
                    score -= table.mutual_unfulfilled_penalty;
                } else {
                    score -= table.one_way_unfulfilled_penalty;
                }
            }
        }

        score.capped(table.cap)
    }

    fn gender_component(&self, players: &[&Player; GROUP_SIZE]) -> Score {
        let table = &self.cfg.scores.gender;
        let raw = match GenderBalance::of(players.iter().copied()) {
            GenderBalance::Homogeneous => table.homogeneous,
            GenderBalance::Balanced => table.balanced,
            GenderBalance::ThreeOne => table.three_one,
            GenderBalance::Skewed => table.skewed,
        };
        raw.min(table.cap)
    }

    fn age_component(&self, players: &[&Player; GROUP_SIZE]) -> Score {
        let table = &self.cfg.scores.age;
        let mut brackets = BTreeSet::new();
        for p in players {
            match p.age() {
                None => return table.unknown_age.min(table.cap),
                Some(age) => {
                    brackets.insert(self.cfg.age_brackets.bracket_of(age));
                }
            }
        }
        let raw = match brackets.len() {
            1 => table.single_bracket,
            2 => {
                let mut it = brackets.iter();
                let (a, b) = (*it.next().expect("two brackets"), *it.next().expect("two brackets"));
                if a.is_adjacent(b) {
                    table.adjacent_brackets
                } else {
                    table.spread
                }
            }
            _ => table.spread,
        };
        raw.min(table.cap)
    }

    fn flexibility_bonus(&self, players: &[&Player; GROUP_SIZE], location: LocationId) -> Score {
        let table = &self.cfg.scores.flexibility;
        let away = players
            .iter()
            .filter(|p| p.is_flexible() && p.home() != location)
            .count();
        (table.per_player * away as f64).min(table.cap)
    }
}

#[inline]
fn scaled_retention(base: Score, full: Score, fresh_total: Score, max_total: Score) -> Score {
    let headroom = full - base;
    if max_total.value() <= 0.0 {
        return base;
    }
    base + headroom * (fresh_total.value() / max_total.value())
}

#[cfg(test)]
mod tests {
    use super::*;
    use court_plan_core::level::Level;
    use court_plan_model::{
        id::{GroupId, PlayerId},
        player::Gender,
    };
    use std::collections::BTreeSet;

    struct Setup {
        roster: Roster,
        cfg: ScoringConfig,
    }

    fn loc(id: u32) -> LocationId {
        LocationId::new(id)
    }

    #[derive(Clone)]
    struct PlayerSpec {
        id: u64,
        level: u8,
        gender: Gender,
        age: Option<u8>,
        home: u32,
        flexible: bool,
        wants: Vec<u64>,
        prior: Option<u64>,
    }

    impl PlayerSpec {
        fn new(id: u64) -> Self {
            Self {
                id,
                level: 5,
                gender: Gender::Male,
                age: Some(40),
                home: 0,
                flexible: false,
                wants: Vec::new(),
                prior: None,
            }
        }

        fn level(mut self, level: u8) -> Self {
            self.level = level;
            self
        }

        fn gender(mut self, gender: Gender) -> Self {
            self.gender = gender;
            self
        }

        fn age(mut self, age: Option<u8>) -> Self {
            self.age = age;
            self
        }

        fn flexible(mut self, home: u32) -> Self {
            self.home = home;
            self.flexible = true;
            self
        }

        fn wants(mut self, ids: &[u64]) -> Self {
            self.wants = ids.to_vec();
            self
        }

        fn prior(mut self, gid: u64) -> Self {
            self.prior = Some(gid);
            self
        }

        fn build(self) -> Player {
            Player::new(
                PlayerId::new(self.id),
                Level::new(self.level),
                self.gender,
                self.age,
                loc(self.home),
                self.flexible,
                self.wants.iter().copied().map(PlayerId::new).collect::<BTreeSet<_>>(),
                self.prior.map(GroupId::new),
            )
            .unwrap()
        }
    }

    fn setup(specs: Vec<PlayerSpec>) -> Setup {
        let players = specs.into_iter().map(PlayerSpec::build).collect();
        Setup {
            roster: Roster::new(players).unwrap(),
            cfg: ScoringConfig::default(),
        }
    }

    fn score_of(setup: &Setup, ids: [u64; 4]) -> ScoreBreakdown {
        let scorer = GroupScorer::new(&setup.roster, &setup.cfg);
        let ids = ids.map(PlayerId::new);
        let players = setup.roster.members(&ids).unwrap();
        scorer.score(&players, loc(0))
    }

    #[test]
    fn test_score_stays_within_bounds() {
        let s = setup(
            (1..=4)
                .map(|i| PlayerSpec::new(i).prior(1).wants(&[((i % 4) + 1)]))
                .collect(),
        );
        let bd = score_of(&s, [1, 2, 3, 4]);
        assert!(bd.total.value() >= 0.0 && bd.total.value() <= 10.0);
        assert!(bd.preference.value() <= 4.0);
        assert!(bd.gender.value() <= 2.5);
        assert!(bd.level.value() <= 2.5);
        assert!(bd.age.value() <= 1.0);
    }

    #[test]
    fn test_full_retention_scores_maximum() {
        let s = setup((1..=4).map(|i| PlayerSpec::new(i).prior(7)).collect());
        let bd = score_of(&s, [1, 2, 3, 4]);
        assert_eq!(bd.retained, 4);
        assert_eq!(bd.total, Score::new(10.0));
    }

    #[test]
    fn test_retention_monotonicity() {
        // Same eight otherwise-identical players; vary how many of group 7
        // stay together.
        let mk = |kept: usize| {
            let specs = (1..=8u64)
                .map(|i| {
                    let spec = PlayerSpec::new(i);
                    if i as usize <= kept { spec.prior(7) } else { spec }
                })
                .collect();
            let s = setup(specs);
            score_of(&s, [1, 2, 3, 4]).total
        };
        let four = mk(4);
        let three = mk(3);
        let two = mk(2);
        let none = mk(1);
        assert!(four > three, "4/4 {four} must beat 3/4 {three}");
        assert!(three > two, "3/4 {three} must beat 2/4 {two}");
        assert!(two > none, "2/4 {two} must beat non-retained {none}");
    }

    #[test]
    fn test_partial_retention_earns_headroom_from_fresh_components() {
        // Two retained players; the fresh composition is perfect except for
        // preferences, so the total sits between the base and the cap.
        let s = setup(vec![
            PlayerSpec::new(1).prior(7),
            PlayerSpec::new(2).prior(7),
            PlayerSpec::new(3),
            PlayerSpec::new(4),
        ]);
        let bd = score_of(&s, [1, 2, 3, 4]);
        assert_eq!(bd.retained, 2);
        assert!(bd.total > Score::new(8.0));
        assert!(bd.total < Score::new(10.0));
    }

    #[test]
    fn test_mutual_preference_fulfilled() {
        // Exactly one mutual pair, nobody else has wishes:
        // baseline 2.0 + 1.2 = 3.2.
        let s = setup(vec![
            PlayerSpec::new(1).wants(&[2]),
            PlayerSpec::new(2).wants(&[1]),
            PlayerSpec::new(3),
            PlayerSpec::new(4),
        ]);
        let bd = score_of(&s, [1, 2, 3, 4]);
        assert!((bd.preference.value() - 3.2).abs() < 1e-9);
    }

    #[test]
    fn test_no_preferences_scores_baseline() {
        let s = setup((1..=4).map(PlayerSpec::new).collect());
        let bd = score_of(&s, [1, 2, 3, 4]);
        assert_eq!(bd.preference, Score::new(2.0));
    }

    #[test]
    fn test_one_way_preference_fulfilled() {
        let s = setup(vec![
            PlayerSpec::new(1).wants(&[2]),
            PlayerSpec::new(2),
            PlayerSpec::new(3),
            PlayerSpec::new(4),
        ]);
        let bd = score_of(&s, [1, 2, 3, 4]);
        assert!((bd.preference.value() - 2.6).abs() < 1e-9);
    }

    #[test]
    fn test_unfulfilled_preferences_penalized() {
        // 1 and 5 want each other but 5 is outside the grouping: -0.4.
        // 2 wants 6 one-way: -0.2. Starting point is the 2.0 baseline.
        let s = setup(vec![
            PlayerSpec::new(1).wants(&[5]),
            PlayerSpec::new(2).wants(&[6]),
            PlayerSpec::new(3),
            PlayerSpec::new(4),
            PlayerSpec::new(5).wants(&[1]),
            PlayerSpec::new(6),
        ]);
        let bd = score_of(&s, [1, 2, 3, 4]);
        assert!((bd.preference.value() - 1.4).abs() < 1e-9);
    }

    #[test]
    fn test_preference_clipped_at_zero() {
        let s = setup(vec![
            PlayerSpec::new(1).wants(&[5, 6, 7, 8]),
            PlayerSpec::new(2).wants(&[5, 6, 7, 8]),
            PlayerSpec::new(3).wants(&[5, 6, 7, 8]),
            PlayerSpec::new(4).wants(&[5, 6, 7, 8]),
            PlayerSpec::new(5).wants(&[1, 2, 3, 4]),
            PlayerSpec::new(6).wants(&[1, 2, 3, 4]),
            PlayerSpec::new(7).wants(&[1, 2, 3, 4]),
            PlayerSpec::new(8).wants(&[1, 2, 3, 4]),
        ]);
        let bd = score_of(&s, [1, 2, 3, 4]);
        assert_eq!(bd.preference, Score::ZERO);
    }

    #[test]
    fn test_gender_component_tiers() {
        let with_women = |n: u64| {
            let specs = (1..=4u64)
                .map(|i| {
                    let spec = PlayerSpec::new(i);
                    if i <= n { spec.gender(Gender::Female) } else { spec }
                })
                .collect();
            let s = setup(specs);
            score_of(&s, [1, 2, 3, 4]).gender
        };
        assert_eq!(with_women(0), Score::new(2.5)); // homogeneous
        assert_eq!(with_women(4), Score::new(2.5)); // homogeneous
        assert_eq!(with_women(2), Score::new(2.0)); // balanced
        assert_eq!(with_women(1), Score::new(1.0)); // three-one
    }

    #[test]
    fn test_level_component_reads_normalized_levels() {
        // A level-6 woman plays as a 7; with three level-7 men the group is
        // exactly homogeneous.
        let s = setup(vec![
            PlayerSpec::new(1).level(7),
            PlayerSpec::new(2).level(7),
            PlayerSpec::new(3).level(7),
            PlayerSpec::new(4).level(6).gender(Gender::Female),
        ]);
        let bd = score_of(&s, [1, 2, 3, 4]);
        assert_eq!(bd.level, Score::new(2.5)); // exact match, capped at 2.5
    }

    #[test]
    fn test_age_component_tiers() {
        let with_ages = |ages: [Option<u8>; 4]| {
            let specs = (1..=4u64)
                .zip(ages)
                .map(|(i, age)| PlayerSpec::new(i).age(age))
                .collect();
            let s = setup(specs);
            score_of(&s, [1, 2, 3, 4]).age
        };
        assert_eq!(with_ages([Some(25), Some(22), Some(28), Some(29)]), Score::new(1.0));
        assert_eq!(with_ages([Some(25), Some(35), Some(28), Some(29)]), Score::new(0.7));
        assert_eq!(with_ages([Some(25), Some(35), Some(55), Some(29)]), Score::new(0.3));
        // Two non-adjacent brackets spread just as wide.
        assert_eq!(with_ages([Some(25), Some(55), Some(28), Some(29)]), Score::new(0.3));
        assert_eq!(with_ages([Some(25), None, Some(28), Some(29)]), Score::new(0.5));
    }

    #[test]
    fn test_flexibility_bonus_for_players_placed_away() {
        let s = setup(vec![
            PlayerSpec::new(1),
            PlayerSpec::new(2),
            PlayerSpec::new(3).flexible(1),
            PlayerSpec::new(4).flexible(1),
        ]);
        let bd = score_of(&s, [1, 2, 3, 4]);
        assert!((bd.flexibility.value() - 0.2).abs() < 1e-9);
    }

    #[test]
    fn test_group_location_majority_home() {
        let players: Vec<Player> = vec![
            PlayerSpec::new(1).build(),
            PlayerSpec::new(2).build(),
            PlayerSpec::new(3).flexible(1).build(),
            PlayerSpec::new(4).flexible(1).build(),
        ];
        let arr = [&players[0], &players[1], &players[2], &players[3]];
        // 2 vs 2 tie: lowest location id wins.
        assert_eq!(group_location(&arr, None), loc(0));
        assert_eq!(group_location(&arr, Some(loc(5))), loc(5));
    }
}
