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

//! Lazy generation of legal four-player groupings from one pool.
//!
//! A candidate only ever exists after it has passed every hard filter;
//! combinations that fail a filter are discarded before scoring and are
//! never surfaced. Running out of combinations is the normal end of the
//! sequence, not an error.

use court_plan_core::{iter::IndexCombinations, level::spread};
use court_plan_model::{
    config::ScoringConfig,
    group::GROUP_SIZE,
    id::{LocationId, PlayerId},
    player::Player,
    roster::Roster,
};
use std::collections::BTreeMap;

/// A four-player grouping that passed all hard filters.
#[derive(Debug, Clone, Copy)]
pub struct Candidate<'r> {
    pub players: [&'r Player; GROUP_SIZE],
}

impl<'r> Candidate<'r> {
    #[inline]
    pub fn ids(&self) -> [PlayerId; GROUP_SIZE] {
        self.players.map(Player::id)
    }
}

/// Every hard constraint a committed group must satisfy. Used both by the
/// generator and by the improvement engine when it re-validates a move.
pub fn passes_hard_filters(
    players: &[&Player; GROUP_SIZE],
    location: Option<LocationId>,
    cfg: &ScoringConfig,
) -> bool {
    let levels: Vec<_> = players
        .iter()
        .map(|p| p.level(&cfg.compensation))
        .collect();
    match spread(levels.iter().copied()) {
        Some(gap) if gap <= cfg.generation.max_level_gap => {}
        _ => return false,
    }

    if cfg.generation.strict_location {
        if let Some(loc) = location
            && players.iter().any(|p| p.home() != loc && !p.is_flexible())
        {
            return false;
        }
    }

    if cfg.generation.require_even_level_mix {
        let mut counts: BTreeMap<_, usize> = BTreeMap::new();
        for level in &levels {
            *counts.entry(*level).or_insert(0) += 1;
        }
        match counts.len() {
            1 => {}
            2 => {
                if counts.values().any(|&n| n != 2) {
                    return false;
                }
            }
            _ => return false,
        }
    }

    true
}

/// Deterministically bounds a pool to the configured candidate cap:
/// players holding a continuity anchor first, then stable ascending id
/// order. Players beyond the cap simply wait for the next fill round.
pub fn capped_subset(pool: &[PlayerId], roster: &Roster, cfg: &ScoringConfig) -> Vec<PlayerId> {
    let cap = cfg.generation.max_pool_candidates;
    if pool.len() <= cap {
        return pool.to_vec();
    }
    let mut ordered: Vec<PlayerId> = pool.to_vec();
    ordered.sort_unstable_by_key(|&id| (!roster.has_continuity_anchor(id), id));
    ordered.truncate(cap);
    ordered
}

/// Lazy sequence of legal candidates over a capped subset.
///
/// The enumeration budget (`max_combination_checks`) counts raw
/// combinations examined, filtered or not; once spent, the sequence ends
/// even if untried combinations remain.
#[derive(Debug, Clone)]
pub struct CandidateIter<'r> {
    subset: Vec<&'r Player>,
    combinations: IndexCombinations<GROUP_SIZE>,
    checks_left: usize,
    location: Option<LocationId>,
    cfg: &'r ScoringConfig,
}

impl<'r> CandidateIter<'r> {
    pub fn new(
        subset: Vec<&'r Player>,
        location: Option<LocationId>,
        cfg: &'r ScoringConfig,
    ) -> Self {
        let combinations = IndexCombinations::new(subset.len());
        Self {
            subset,
            combinations,
            checks_left: cfg.generation.max_combination_checks,
            location,
            cfg,
        }
    }
}

impl<'r> Iterator for CandidateIter<'r> {
    type Item = Candidate<'r>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if self.checks_left == 0 {
                return None;
            }
            let indices = self.combinations.next()?;
            self.checks_left -= 1;
            let players = indices.map(|i| self.subset[i]);
            if passes_hard_filters(&players, self.location, self.cfg) {
                return Some(Candidate { players });
            }
        }
    }
}

impl std::iter::FusedIterator for CandidateIter<'_> {}

/// All legal completions of a partial group (a continuity core or a rebuild
/// seed) using players drawn from `fill`. The core must hold at least two
/// players; completions beyond the enumeration budget are not produced.
pub fn complete_group<'r>(
    core: &[&'r Player],
    fill: &[&'r Player],
    location: Option<LocationId>,
    cfg: &'r ScoringConfig,
) -> Vec<[&'r Player; GROUP_SIZE]> {
    let needed = GROUP_SIZE.saturating_sub(core.len());
    let mut checks = cfg.generation.max_combination_checks;
    let mut out = Vec::new();

    let mut push = |players: [&'r Player; GROUP_SIZE], checks: &mut usize| -> bool {
        if *checks == 0 {
            return false;
        }
        *checks -= 1;
        if passes_hard_filters(&players, location, cfg) {
            out.push(players);
        }
        true
    };

    match needed {
        0 => {
            if core.len() == GROUP_SIZE {
                let players = [core[0], core[1], core[2], core[3]];
                push(players, &mut checks);
            }
        }
        1 => {
            for f in fill {
                let players = [core[0], core[1], core[2], *f];
                if !push(players, &mut checks) {
                    break;
                }
            }
        }
        2 => {
            'outer: for (i, a) in fill.iter().enumerate() {
                for b in &fill[i + 1..] {
                    let players = [core[0], core[1], *a, *b];
                    if !push(players, &mut checks) {
                        break 'outer;
                    }
                }
            }
        }
        _ => {}
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use court_plan_core::level::Level;
    use court_plan_model::player::Gender;
    use std::collections::BTreeSet;

    fn player(id: u64, level: u8, home: u32) -> Player {
        Player::new(
            PlayerId::new(id),
            Level::new(level),
            Gender::Male,
            Some(40),
            LocationId::new(home),
            false,
            BTreeSet::new(),
            None,
        )
        .unwrap()
    }

    fn refs(players: &[Player]) -> Vec<&Player> {
        players.iter().collect()
    }

    #[test]
    fn test_level_gap_hard_filter() {
        let cfg = ScoringConfig::default();
        let ps = [
            player(1, 4, 0),
            player(2, 4, 0),
            player(3, 5, 0),
            player(4, 6, 0),
        ];
        let arr = [&ps[0], &ps[1], &ps[2], &ps[3]];
        assert!(!passes_hard_filters(&arr, Some(LocationId::new(0)), &cfg));

        let ps = [
            player(1, 4, 0),
            player(2, 4, 0),
            player(3, 5, 0),
            player(4, 5, 0),
        ];
        let arr = [&ps[0], &ps[1], &ps[2], &ps[3]];
        assert!(passes_hard_filters(&arr, Some(LocationId::new(0)), &cfg));
    }

    #[test]
    fn test_strict_location_hard_filter() {
        let cfg = ScoringConfig::default();
        let ps = [
            player(1, 5, 0),
            player(2, 5, 0),
            player(3, 5, 0),
            player(4, 5, 1),
        ];
        let arr = [&ps[0], &ps[1], &ps[2], &ps[3]];
        assert!(!passes_hard_filters(&arr, Some(LocationId::new(0)), &cfg));
    }

    #[test]
    fn test_flexible_player_passes_strict_location() {
        let cfg = ScoringConfig::default();
        let away = Player::new(
            PlayerId::new(4),
            Level::new(5),
            Gender::Male,
            Some(40),
            LocationId::new(1),
            true,
            BTreeSet::new(),
            None,
        )
        .unwrap();
        let ps = [player(1, 5, 0), player(2, 5, 0), player(3, 5, 0)];
        let arr = [&ps[0], &ps[1], &ps[2], &away];
        assert!(passes_hard_filters(&arr, Some(LocationId::new(0)), &cfg));
    }

    #[test]
    fn test_three_one_level_split_rejected_when_mix_required() {
        // Levels {3, 3, 3, 4} satisfy the gap filter but violate the
        // mandatory two-and-two split.
        let mut cfg = ScoringConfig::default();
        cfg.generation.require_even_level_mix = true;
        let ps = [
            player(1, 3, 0),
            player(2, 3, 0),
            player(3, 3, 0),
            player(4, 4, 0),
        ];
        let arr = [&ps[0], &ps[1], &ps[2], &ps[3]];
        assert!(!passes_hard_filters(&arr, Some(LocationId::new(0)), &cfg));

        let ps = [
            player(1, 3, 0),
            player(2, 3, 0),
            player(3, 4, 0),
            player(4, 4, 0),
        ];
        let arr = [&ps[0], &ps[1], &ps[2], &ps[3]];
        assert!(passes_hard_filters(&arr, Some(LocationId::new(0)), &cfg));
    }

    #[test]
    fn test_candidate_iter_yields_only_legal_combinations() {
        let cfg = ScoringConfig::default();
        let ps: Vec<_> = (1..=4).map(|i| player(i, 5, 0)).collect::<Vec<_>>();
        let mut extra = ps.clone();
        extra.push(player(5, 8, 0)); // out of level reach of the rest
        let it = CandidateIter::new(refs(&extra), Some(LocationId::new(0)), &cfg);
        let found: Vec<_> = it.collect();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].ids(), [1, 2, 3, 4].map(PlayerId::new));
    }

    #[test]
    fn test_candidate_iter_exhaustion_is_terminal() {
        let cfg = ScoringConfig::default();
        let ps: Vec<_> = (1..=3).map(|i| player(i, 5, 0)).collect();
        let mut it = CandidateIter::new(refs(&ps), Some(LocationId::new(0)), &cfg);
        assert!(it.next().is_none());
        assert!(it.next().is_none());
    }

    #[test]
    fn test_enumeration_budget_bounds_the_search() {
        let mut cfg = ScoringConfig::default();
        cfg.generation.max_combination_checks = 3;
        let ps: Vec<_> = (1..=6).map(|i| player(i, 5, 0)).collect();
        let it = CandidateIter::new(refs(&ps), Some(LocationId::new(0)), &cfg);
        assert_eq!(it.count(), 3);
    }

    #[test]
    fn test_capped_subset_prefers_anchored_players() {
        let mut cfg = ScoringConfig::default();
        cfg.generation.max_pool_candidates = 4;
        let mut players: Vec<Player> = (1..=6).map(|i| player(i, 5, 0)).collect();
        // Players 5 and 6 carry a shared previous-week group.
        players[4] = players[4].with_previous_group(Some(court_plan_model::id::GroupId::new(1)));
        players[5] = players[5].with_previous_group(Some(court_plan_model::id::GroupId::new(1)));
        let roster = Roster::new(players).unwrap();
        let pool: Vec<_> = roster.ids().collect();
        let subset = capped_subset(&pool, &roster, &cfg);
        assert_eq!(
            subset,
            [5, 6, 1, 2].map(PlayerId::new).to_vec()
        );
    }

    #[test]
    fn test_complete_group_with_core_of_two() {
        let cfg = ScoringConfig::default();
        let core = [player(1, 5, 0), player(2, 5, 0)];
        let fill = [player(3, 5, 0), player(4, 5, 0), player(5, 8, 0)];
        let core_refs: Vec<&Player> = core.iter().collect();
        let fill_refs: Vec<&Player> = fill.iter().collect();
        let out = complete_group(&core_refs, &fill_refs, Some(LocationId::new(0)), &cfg);
        // Only {3, 4} completes legally; pairs with player 5 break the gap.
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].map(Player::id), [1, 2, 3, 4].map(PlayerId::new));
    }
}
