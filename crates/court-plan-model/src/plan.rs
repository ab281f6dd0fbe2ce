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
    err::PlanValidationError,
    group::{GROUP_SIZE, Group, QualityClass},
    id::{LocationId, PlayerId, Week},
    roster::Roster,
};
use court_plan_core::score::Score;
use std::{collections::BTreeSet, fmt::Display};

/// The sub-four remainder of a week, either carried incomplete or padded to
/// full size with placeholder stand-ins.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResidualGroup {
    members: Vec<PlayerId>,
    location: LocationId,
    stand_ins: usize,
}

impl ResidualGroup {
    pub fn new(members: Vec<PlayerId>, location: LocationId, stand_ins: usize) -> Self {
        debug_assert!(!members.is_empty() && members.len() < GROUP_SIZE);
        Self {
            members,
            location,
            stand_ins,
        }
    }

    #[inline]
    pub fn members(&self) -> &[PlayerId] {
        &self.members
    }

    #[inline]
    pub fn location(&self) -> LocationId {
        self.location
    }

    /// Placeholder participants filling the group up.
    #[inline]
    pub fn stand_ins(&self) -> usize {
        self.stand_ins
    }

    #[inline]
    pub fn is_padded(&self) -> bool {
        self.members.len() + self.stand_ins == GROUP_SIZE
    }
}

impl Display for ResidualGroup {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "residual @ {}: {} players + {} stand-ins",
            self.location,
            self.members.len(),
            self.stand_ins
        )
    }
}

/// Aggregate quality numbers over one weekly plan.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlanStats {
    group_count: usize,
    unassigned_count: usize,
    total_score: Score,
    mean_score: Score,
    best_score: Score,
    excellent: usize,
    normal: usize,
    poor: usize,
}

impl PlanStats {
    #[inline]
    pub fn group_count(&self) -> usize {
        self.group_count
    }

    #[inline]
    pub fn unassigned_count(&self) -> usize {
        self.unassigned_count
    }

    #[inline]
    pub fn total_score(&self) -> Score {
        self.total_score
    }

    #[inline]
    pub fn mean_score(&self) -> Score {
        self.mean_score
    }

    #[inline]
    pub fn best_score(&self) -> Score {
        self.best_score
    }

    #[inline]
    pub fn excellent(&self) -> usize {
        self.excellent
    }

    #[inline]
    pub fn normal(&self) -> usize {
        self.normal
    }

    #[inline]
    pub fn poor(&self) -> usize {
        self.poor
    }
}

impl Display for PlanStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Plan statistics:")?;
        writeln!(f, "  Groups: {}", self.group_count)?;
        writeln!(f, "  Unassigned players: {}", self.unassigned_count)?;
        writeln!(f, "  Total score: {}", self.total_score)?;
        writeln!(f, "  Mean score: {}", self.mean_score)?;
        writeln!(f, "  Best score: {}", self.best_score)?;
        write!(
            f,
            "  Quality: {} excellent / {} normal / {} poor",
            self.excellent, self.normal, self.poor
        )
    }
}

/// One week's complete assignment: committed groups, the optional residual
/// group, and players that could not be placed at all.
#[derive(Debug, Clone, PartialEq)]
pub struct WeeklyPlan {
    week: Week,
    groups: Vec<Group>,
    residual: Option<ResidualGroup>,
    unassigned: Vec<PlayerId>,
    below_quality_floor: bool,
}

impl WeeklyPlan {
    pub fn new(week: Week) -> Self {
        Self {
            week,
            groups: Vec::new(),
            residual: None,
            unassigned: Vec::new(),
            below_quality_floor: false,
        }
    }

    #[inline]
    pub fn week(&self) -> Week {
        self.week
    }

    #[inline]
    pub fn groups(&self) -> &[Group] {
        &self.groups
    }

    #[inline]
    pub fn residual(&self) -> Option<&ResidualGroup> {
        self.residual.as_ref()
    }

    #[inline]
    pub fn unassigned(&self) -> &[PlayerId] {
        &self.unassigned
    }

    /// Whether the mean group score ended below the configured floor after
    /// improvement. A flag for the caller, never a failure.
    #[inline]
    pub fn is_below_quality_floor(&self) -> bool {
        self.below_quality_floor
    }

    pub fn push_group(&mut self, group: Group) {
        self.groups.push(group);
    }

    pub fn set_residual(&mut self, residual: Option<ResidualGroup>) {
        self.residual = residual;
    }

    pub fn push_unassigned(&mut self, id: PlayerId) {
        self.unassigned.push(id);
    }

    pub fn set_below_quality_floor(&mut self, flagged: bool) {
        self.below_quality_floor = flagged;
    }

    /// Swaps the group at `index` for a reshaped one. The caller is the
    /// improvement engine, which keeps id and week stable via
    /// [`Group::reshape`].
    pub fn replace_group(&mut self, index: usize, group: Group) {
        self.groups[index] = group;
    }

    #[inline]
    pub fn total_score(&self) -> Score {
        self.groups.iter().map(Group::total).sum()
    }

    pub fn mean_score(&self) -> Score {
        if self.groups.is_empty() {
            Score::ZERO
        } else {
            Score::new(self.total_score().value() / self.groups.len() as f64)
        }
    }

    pub fn stats(&self) -> PlanStats {
        let mut excellent = 0;
        let mut normal = 0;
        let mut poor = 0;
        let mut best = Score::ZERO;
        for g in &self.groups {
            match g.quality() {
                QualityClass::Excellent => excellent += 1,
                QualityClass::Normal => normal += 1,
                QualityClass::Poor => poor += 1,
            }
            best = best.max(g.total());
        }
        PlanStats {
            group_count: self.groups.len(),
            unassigned_count: self.unassigned.len(),
            total_score: self.total_score(),
            mean_score: self.mean_score(),
            best_score: best,
            excellent,
            normal,
            poor,
        }
    }

    /// Checks the coverage invariant: every roster player sits in exactly
    /// one group, in the residual group, or in the unassigned list.
    pub fn validate(&self, roster: &Roster) -> Result<(), PlanValidationError> {
        let mut seen: BTreeSet<PlayerId> = BTreeSet::new();
        for g in &self.groups {
            for &id in g.members() {
                if !roster.contains(id) {
                    return Err(PlanValidationError::UnknownMember { group: g.id(), id });
                }
                if !seen.insert(id) {
                    return Err(PlanValidationError::DoubleAssignment { id });
                }
            }
        }
        let loose = self
            .residual
            .iter()
            .flat_map(|r| r.members().iter())
            .chain(self.unassigned.iter());
        for &id in loose {
            if !seen.insert(id) {
                return Err(PlanValidationError::DoubleAssignment { id });
            }
        }
        for id in roster.ids() {
            if !seen.contains(&id) {
                return Err(PlanValidationError::MissingPlayer { id });
            }
        }
        Ok(())
    }
}

impl Display for WeeklyPlan {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "{}:", self.week)?;
        for g in &self.groups {
            writeln!(f, "  {}", g)?;
        }
        if let Some(r) = &self.residual {
            writeln!(f, "  {}", r)?;
        }
        if !self.unassigned.is_empty() {
            writeln!(f, "  unassigned: {}", self.unassigned.len())?;
        }
        write!(f, "{}", self.stats())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        config::ImprovementConfig,
        group::ScoreBreakdown,
        id::GroupId,
        player::{Gender, Player},
    };
    use court_plan_core::level::Level;
    use std::collections::BTreeSet;

    fn roster_of(n: u64) -> Roster {
        let players = (1..=n)
            .map(|i| {
                Player::new(
                    PlayerId::new(i),
                    Level::new(5),
                    Gender::Male,
                    Some(40),
                    LocationId::new(0),
                    false,
                    BTreeSet::new(),
                    None,
                )
                .unwrap()
            })
            .collect();
        Roster::new(players).unwrap()
    }

    fn group(id: u64, members: [u64; 4], total: f64) -> Group {
        Group::new(
            GroupId::new(id),
            Week::new(1),
            LocationId::new(0),
            members.map(PlayerId::new),
            ScoreBreakdown {
                total: Score::new(total),
                ..ScoreBreakdown::default()
            },
            &ImprovementConfig::default(),
        )
        .unwrap()
    }

    #[test]
    fn test_validate_accepts_full_coverage() {
        let roster = roster_of(6);
        let mut plan = WeeklyPlan::new(Week::new(1));
        plan.push_group(group(1, [1, 2, 3, 4], 7.0));
        plan.push_unassigned(PlayerId::new(5));
        plan.push_unassigned(PlayerId::new(6));
        assert_eq!(plan.validate(&roster), Ok(()));
    }

    #[test]
    fn test_validate_catches_missing_player() {
        let roster = roster_of(5);
        let mut plan = WeeklyPlan::new(Week::new(1));
        plan.push_group(group(1, [1, 2, 3, 4], 7.0));
        assert_eq!(
            plan.validate(&roster),
            Err(PlanValidationError::MissingPlayer {
                id: PlayerId::new(5)
            })
        );
    }

    #[test]
    fn test_validate_catches_double_assignment() {
        let roster = roster_of(8);
        let mut plan = WeeklyPlan::new(Week::new(1));
        plan.push_group(group(1, [1, 2, 3, 4], 7.0));
        plan.push_group(group(2, [4, 5, 6, 7], 7.0));
        assert_eq!(
            plan.validate(&roster),
            Err(PlanValidationError::DoubleAssignment {
                id: PlayerId::new(4)
            })
        );
    }

    #[test]
    fn test_stats_quality_counts() {
        let mut plan = WeeklyPlan::new(Week::new(1));
        plan.push_group(group(1, [1, 2, 3, 4], 9.5));
        plan.push_group(group(2, [5, 6, 7, 8], 7.0));
        plan.push_group(group(3, [9, 10, 11, 12], 4.0));
        let stats = plan.stats();
        assert_eq!(stats.excellent(), 1);
        assert_eq!(stats.normal(), 1);
        assert_eq!(stats.poor(), 1);
        assert_eq!(stats.best_score(), Score::new(9.5));
        assert!((stats.mean_score().value() - 20.5 / 3.0).abs() < 1e-9);
    }

    #[test]
    fn test_residual_padding() {
        let r = ResidualGroup::new(
            vec![PlayerId::new(1), PlayerId::new(2)],
            LocationId::new(0),
            2,
        );
        assert!(r.is_padded());
        let r = ResidualGroup::new(vec![PlayerId::new(1)], LocationId::new(0), 0);
        assert!(!r.is_padded());
    }
}
