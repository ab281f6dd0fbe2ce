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

use crate::{
    err::{DuplicatePlayerError, UnknownPlayerError},
    group::GROUP_SIZE,
    id::{GroupId, PlayerId},
    plan::WeeklyPlan,
    player::Player,
};
use std::collections::BTreeMap;

/// The eligible players of one planning week, together with the
/// previous-week membership index that drives every continuity decision.
#[derive(Debug, Clone, PartialEq)]
pub struct Roster {
    players: BTreeMap<PlayerId, Player>,
    prior_groups: BTreeMap<GroupId, Vec<PlayerId>>,
}

impl Roster {
    pub fn new(players: Vec<Player>) -> Result<Self, DuplicatePlayerError> {
        let mut map = BTreeMap::new();
        let mut prior_groups: BTreeMap<GroupId, Vec<PlayerId>> = BTreeMap::new();
        for p in players {
            let id = p.id();
            if let Some(gid) = p.previous_group() {
                prior_groups.entry(gid).or_default().push(id);
            }
            if map.insert(id, p).is_some() {
                return Err(DuplicatePlayerError::new(id));
            }
        }
        for members in prior_groups.values_mut() {
            members.sort_unstable();
        }
        Ok(Self {
            players: map,
            prior_groups,
        })
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.players.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.players.is_empty()
    }

    #[inline]
    pub fn contains(&self, id: PlayerId) -> bool {
        self.players.contains_key(&id)
    }

    #[inline]
    pub fn get(&self, id: PlayerId) -> Option<&Player> {
        self.players.get(&id)
    }

    /// Player ids in ascending order.
    pub fn ids(&self) -> impl Iterator<Item = PlayerId> + '_ {
        self.players.keys().copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Player> {
        self.players.values()
    }

    /// Resolves a full group membership to player references.
    pub fn members(
        &self,
        ids: &[PlayerId; GROUP_SIZE],
    ) -> Result<[&Player; GROUP_SIZE], UnknownPlayerError> {
        let resolve = |id: PlayerId| self.get(id).ok_or(UnknownPlayerError::new(id));
        Ok([
            resolve(ids[0])?,
            resolve(ids[1])?,
            resolve(ids[2])?,
            resolve(ids[3])?,
        ])
    }

    /// Previous-week groups that have at least one member in this roster,
    /// ascending by group id, members sorted.
    pub fn prior_groups(&self) -> impl Iterator<Item = (GroupId, &[PlayerId])> {
        self.prior_groups
            .iter()
            .map(|(gid, members)| (*gid, members.as_slice()))
    }

    /// Whether the player's previous-week group still has a second member
    /// in this roster, i.e. the player carries a continuity anchor.
    pub fn has_continuity_anchor(&self, id: PlayerId) -> bool {
        self.get(id)
            .and_then(Player::previous_group)
            .and_then(|gid| self.prior_groups.get(&gid))
            .is_some_and(|members| members.len() >= 2)
    }

    /// The largest subset of `members` that shared one previous-week group,
    /// as `(count, group)`. Returns a count below two with `None` when no
    /// two members share a prior group.
    pub fn retained_core(
        &self,
        members: &[PlayerId; GROUP_SIZE],
    ) -> (u8, Option<GroupId>) {
        let mut counts: BTreeMap<GroupId, u8> = BTreeMap::new();
        for &id in members {
            if let Some(gid) = self.get(id).and_then(Player::previous_group) {
                *counts.entry(gid).or_insert(0) += 1;
            }
        }
        // BTreeMap order makes the lowest group id win ties.
        let best = counts
            .into_iter()
            .max_by_key(|&(gid, n)| (n, std::cmp::Reverse(gid)));
        match best {
            Some((gid, n)) if n >= 2 => (n, Some(gid)),
            Some((_, n)) => (n, None),
            None => (0, None),
        }
    }

    /// Next week's roster: the same players, with previous-week membership
    /// replaced by this plan's outcome. Residual and unassigned players
    /// carry no membership forward.
    pub fn advance(&self, plan: &WeeklyPlan) -> Roster {
        let mut assigned: BTreeMap<PlayerId, GroupId> = BTreeMap::new();
        for g in plan.groups() {
            for &id in g.members() {
                assigned.insert(id, g.id());
            }
        }
        let players = self
            .players
            .values()
            .map(|p| p.with_previous_group(assigned.get(&p.id()).copied()))
            .collect::<Vec<_>>();
        Roster::new(players).expect("ids stay unique when advancing")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        config::ImprovementConfig,
        group::{Group, ScoreBreakdown},
        id::{LocationId, Week},
        player::Gender,
    };
    use court_plan_core::{level::Level, score::Score};
    use std::collections::BTreeSet;

    fn player(id: u64, prior: Option<u64>) -> Player {
        Player::new(
            PlayerId::new(id),
            Level::new(5),
            Gender::Male,
            Some(40),
            LocationId::new(0),
            false,
            BTreeSet::new(),
            prior.map(GroupId::new),
        )
        .unwrap()
    }

    #[test]
    fn test_duplicate_player_rejected() {
        let res = Roster::new(vec![player(1, None), player(1, None)]);
        assert_eq!(res.unwrap_err(), DuplicatePlayerError::new(PlayerId::new(1)));
    }

    #[test]
    fn test_members_resolution() {
        let roster = Roster::new((1..=4).map(|i| player(i, None)).collect()).unwrap();
        let ids = [1, 2, 3, 4].map(PlayerId::new);
        assert!(roster.members(&ids).is_ok());
        let missing = [1, 2, 3, 9].map(PlayerId::new);
        assert_eq!(
            roster.members(&missing).unwrap_err(),
            UnknownPlayerError::new(PlayerId::new(9))
        );
    }

    #[test]
    fn test_retained_core_counts() {
        let roster = Roster::new(vec![
            player(1, Some(10)),
            player(2, Some(10)),
            player(3, Some(10)),
            player(4, Some(11)),
            player(5, None),
        ])
        .unwrap();
        let (n, gid) = roster.retained_core(&[1, 2, 3, 4].map(PlayerId::new));
        assert_eq!((n, gid), (3, Some(GroupId::new(10))));
        let (n, gid) = roster.retained_core(&[1, 4, 5, 3].map(PlayerId::new));
        assert_eq!((n, gid), (2, Some(GroupId::new(10))));
        let (n, gid) = roster.retained_core(&[4, 5, 1, 2].map(PlayerId::new));
        assert_eq!((n, gid), (2, Some(GroupId::new(10))));
    }

    #[test]
    fn test_retained_core_below_two_is_none() {
        let roster = Roster::new(vec![
            player(1, Some(10)),
            player(2, Some(11)),
            player(3, None),
            player(4, None),
        ])
        .unwrap();
        let (n, gid) = roster.retained_core(&[1, 2, 3, 4].map(PlayerId::new));
        assert_eq!(n, 1);
        assert_eq!(gid, None);
    }

    #[test]
    fn test_continuity_anchor() {
        let roster = Roster::new(vec![
            player(1, Some(10)),
            player(2, Some(10)),
            player(3, Some(11)),
        ])
        .unwrap();
        assert!(roster.has_continuity_anchor(PlayerId::new(1)));
        assert!(!roster.has_continuity_anchor(PlayerId::new(3)));
    }

    #[test]
    fn test_advance_rewrites_memberships() {
        let roster = Roster::new((1..=5).map(|i| player(i, Some(99))).collect()).unwrap();
        let mut plan = WeeklyPlan::new(Week::new(2));
        plan.push_group(
            Group::new(
                GroupId::new(7),
                Week::new(2),
                LocationId::new(0),
                [1, 2, 3, 4].map(PlayerId::new),
                ScoreBreakdown {
                    total: Score::new(8.0),
                    ..ScoreBreakdown::default()
                },
                &ImprovementConfig::default(),
            )
            .unwrap(),
        );
        plan.push_unassigned(PlayerId::new(5));

        let next = roster.advance(&plan);
        assert_eq!(
            next.get(PlayerId::new(1)).unwrap().previous_group(),
            Some(GroupId::new(7))
        );
        assert_eq!(next.get(PlayerId::new(5)).unwrap().previous_group(), None);
    }
}
