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

//! Splits a week's free players into independent generation units.
//!
//! Under strict location mode every location forms its own pool; with the
//! restriction lifted, players are pooled by normalized-level band instead.
//! Pools are disjoint, so candidate generation and scoring for different
//! pools can run on parallel workers without shared mutable state.

use court_plan_model::{
    config::ScoringConfig,
    group::GROUP_SIZE,
    id::{LocationId, PlayerId},
    roster::Roster,
};
use std::{collections::BTreeMap, fmt::Display};

/// Identity of one generation unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum PoolKey {
    Location(LocationId),
    LevelBand(u8),
}

impl Display for PoolKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PoolKey::Location(loc) => write!(f, "Pool({})", loc),
            PoolKey::LevelBand(band) => write!(f, "Pool(band {})", band),
        }
    }
}

/// One disjoint generation unit: the players it owns, ascending by id, and
/// the location all its groups will play at (absent for level-band pools).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pool {
    key: PoolKey,
    location: Option<LocationId>,
    players: Vec<PlayerId>,
}

impl Pool {
    #[inline]
    pub fn key(&self) -> PoolKey {
        self.key
    }

    #[inline]
    pub fn location(&self) -> Option<LocationId> {
        self.location
    }

    #[inline]
    pub fn players(&self) -> &[PlayerId] {
        &self.players
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.players.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.players.is_empty()
    }
}

/// Partitions `free` into pools, ascending by pool key.
///
/// Strict mode pools by location. Location-flexible players are steered
/// towards the pool that is closest to completing another full group; when
/// no pool needs filling they stay home. That steering is the only way a
/// flexible player ends up away from their home location, which is exactly
/// the case the scorer's flexibility bonus rewards.
pub fn partition(roster: &Roster, free: &[PlayerId], cfg: &ScoringConfig) -> Vec<Pool> {
    if cfg.generation.strict_location {
        partition_by_location(roster, free)
    } else {
        partition_by_level_band(roster, free, cfg)
    }
}

fn partition_by_location(roster: &Roster, free: &[PlayerId]) -> Vec<Pool> {
    let mut pools: BTreeMap<LocationId, Vec<PlayerId>> = BTreeMap::new();
    let mut flexible: Vec<PlayerId> = Vec::new();

    for &id in free {
        let Some(player) = roster.get(id) else {
            continue;
        };
        if player.is_flexible() {
            flexible.push(id);
        } else {
            pools.entry(player.home()).or_default().push(id);
        }
    }

    // Ascending id keeps the steering deterministic.
    flexible.sort_unstable();
    for id in flexible {
        let Some(player) = roster.get(id) else {
            continue;
        };
        let home = player.home();
        let deficit = |len: usize| (GROUP_SIZE - len % GROUP_SIZE) % GROUP_SIZE;
        let target = pools
            .iter()
            .filter(|(loc, members)| **loc != home && deficit(members.len()) > 0)
            .max_by_key(|(loc, members)| (deficit(members.len()), std::cmp::Reverse(**loc)))
            .map(|(loc, _)| *loc);
        let dest = match target {
            Some(loc) if deficit(pools.get(&home).map_or(0, Vec::len)) == 0 => loc,
            _ => home,
        };
        pools.entry(dest).or_default().push(id);
    }

    pools
        .into_iter()
        .map(|(loc, mut players)| {
            players.sort_unstable();
            Pool {
                key: PoolKey::Location(loc),
                location: Some(loc),
                players,
            }
        })
        .collect()
}

fn partition_by_level_band(roster: &Roster, free: &[PlayerId], cfg: &ScoringConfig) -> Vec<Pool> {
    let width = cfg.generation.max_level_gap.value() as u16 + 1;
    let mut pools: BTreeMap<u8, Vec<PlayerId>> = BTreeMap::new();
    for &id in free {
        let Some(player) = roster.get(id) else {
            continue;
        };
        let band = (player.level(&cfg.compensation).value() as u16 / width) as u8;
        pools.entry(band).or_default().push(id);
    }
    pools
        .into_iter()
        .map(|(band, mut players)| {
            players.sort_unstable();
            Pool {
                key: PoolKey::LevelBand(band),
                location: None,
                players,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use court_plan_model::player::{Gender, Player};
    use court_plan_core::level::Level;
    use std::collections::BTreeSet;

    fn player(id: u64, level: u8, home: u32, flexible: bool) -> Player {
        Player::new(
            PlayerId::new(id),
            Level::new(level),
            Gender::Male,
            Some(40),
            LocationId::new(home),
            flexible,
            BTreeSet::new(),
            None,
        )
        .unwrap()
    }

    fn roster(players: Vec<Player>) -> Roster {
        Roster::new(players).unwrap()
    }

    #[test]
    fn test_strict_partition_pools_by_location() {
        let r = roster(vec![
            player(1, 5, 0, false),
            player(2, 5, 1, false),
            player(3, 5, 0, false),
        ]);
        let free: Vec<_> = r.ids().collect();
        let pools = partition(&r, &free, &ScoringConfig::default());
        assert_eq!(pools.len(), 2);
        assert_eq!(pools[0].key(), PoolKey::Location(LocationId::new(0)));
        assert_eq!(pools[0].players().len(), 2);
        assert_eq!(pools[1].players().len(), 1);
    }

    #[test]
    fn test_flexible_player_fills_deficit_elsewhere() {
        // Location 0 holds a full quad, location 1 is one short; the
        // flexible player at home 0 should be steered to location 1.
        let mut players: Vec<_> = (1..=4).map(|i| player(i, 5, 0, false)).collect();
        players.extend((5..=7).map(|i| player(i, 5, 1, false)));
        players.push(player(8, 5, 0, true));
        let r = roster(players);
        let free: Vec<_> = r.ids().collect();
        let pools = partition(&r, &free, &ScoringConfig::default());
        assert_eq!(pools.len(), 2);
        assert_eq!(pools[0].len(), 4);
        assert_eq!(pools[1].len(), 4);
        assert!(pools[1].players().contains(&PlayerId::new(8)));
    }

    #[test]
    fn test_flexible_player_stays_home_when_needed_there() {
        // Home is one short itself; no steering away.
        let mut players: Vec<_> = (1..=3).map(|i| player(i, 5, 0, false)).collect();
        players.extend((4..=6).map(|i| player(i, 5, 1, false)));
        players.push(player(7, 5, 0, true));
        let r = roster(players);
        let free: Vec<_> = r.ids().collect();
        let pools = partition(&r, &free, &ScoringConfig::default());
        assert!(pools[0].players().contains(&PlayerId::new(7)));
    }

    #[test]
    fn test_level_band_partition() {
        let mut cfg = ScoringConfig::default();
        cfg.generation.strict_location = false;
        // Width 2 with the default gap of 1: levels {4, 5} share a band,
        // level 6 starts the next one.
        let r = roster(vec![
            player(1, 4, 0, false),
            player(2, 5, 1, false),
            player(3, 6, 0, false),
        ]);
        let free: Vec<_> = r.ids().collect();
        let pools = partition(&r, &free, &cfg);
        assert_eq!(pools.len(), 2);
        assert_eq!(pools[0].key(), PoolKey::LevelBand(2));
        assert_eq!(pools[0].len(), 2);
        assert_eq!(pools[1].key(), PoolKey::LevelBand(3));
    }
}
