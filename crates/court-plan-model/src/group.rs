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
    config::ImprovementConfig,
    err::DuplicateMemberError,
    id::{GroupId, LocationId, PlayerId, Week},
    player::{Gender, Player},
};
use court_plan_core::{level::Level, score::Score};
use std::fmt::Display;

/// Number of players in every committed group. Never relaxed.
pub const GROUP_SIZE: usize = 4;

/// Per-component score record for one group.
///
/// `retained` is the number of members carried over from one shared
/// previous-week group (0 or 1 means the continuity branch did not apply).
/// The component fields hold the fresh-composition scores that were actually
/// earned; `total` is the final capped result, including any continuity base.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ScoreBreakdown {
    pub retained: u8,
    pub level: Score,
    pub preference: Score,
    pub gender: Score,
    pub age: Score,
    pub flexibility: Score,
    pub total: Score,
}

impl ScoreBreakdown {
    /// Sum of the four capped components plus the flexibility bonus.
    #[inline]
    pub fn fresh_sum(&self) -> Score {
        self.level + self.preference + self.gender + self.age + self.flexibility
    }
}

impl Display for ScoreBreakdown {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "total {} (retained {}, level {}, pref {}, gender {}, age {}, flex {})",
            self.total,
            self.retained,
            self.level,
            self.preference,
            self.gender,
            self.age,
            self.flexibility
        )
    }
}

/// Quality label derived from a group's total score against the configured
/// thresholds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum QualityClass {
    Excellent,
    Normal,
    Poor,
}

impl QualityClass {
    pub fn classify(total: Score, cfg: &ImprovementConfig) -> Self {
        if total >= cfg.excellent_threshold {
            QualityClass::Excellent
        } else if total <= cfg.poor_threshold {
            QualityClass::Poor
        } else {
            QualityClass::Normal
        }
    }
}

impl Display for QualityClass {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            QualityClass::Excellent => write!(f, "excellent"),
            QualityClass::Normal => write!(f, "normal"),
            QualityClass::Poor => write!(f, "poor"),
        }
    }
}

/// Gender composition label for reporting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GenderBalance {
    Homogeneous,
    Balanced,
    ThreeOne,
    Skewed,
}

impl GenderBalance {
    pub fn of<'a, I: IntoIterator<Item = &'a Player>>(players: I) -> Self {
        let (mut male, mut female) = (0usize, 0usize);
        for p in players {
            match p.gender() {
                Gender::Male => male += 1,
                Gender::Female => female += 1,
            }
        }
        match (male, female) {
            (_, 0) | (0, _) => GenderBalance::Homogeneous,
            (2, 2) => GenderBalance::Balanced,
            (3, 1) | (1, 3) => GenderBalance::ThreeOne,
            _ => GenderBalance::Skewed,
        }
    }
}

impl Display for GenderBalance {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GenderBalance::Homogeneous => write!(f, "homogeneous"),
            GenderBalance::Balanced => write!(f, "2/2"),
            GenderBalance::ThreeOne => write!(f, "3/1"),
            GenderBalance::Skewed => write!(f, "skewed"),
        }
    }
}

/// Raw level range over a set of players, for reporting.
pub fn level_range<'a, I: IntoIterator<Item = &'a Player>>(players: I) -> Option<(Level, Level)> {
    let mut it = players.into_iter().map(Player::raw_level);
    let first = it.next()?;
    Some(it.fold((first, first), |(lo, hi), l| (lo.min(l), hi.max(l))))
}

/// One committed group of exactly four distinct players.
#[derive(Debug, Clone, PartialEq)]
pub struct Group {
    id: GroupId,
    week: Week,
    location: LocationId,
    members: [PlayerId; GROUP_SIZE],
    breakdown: ScoreBreakdown,
    quality: QualityClass,
}

impl Group {
    pub fn new(
        id: GroupId,
        week: Week,
        location: LocationId,
        members: [PlayerId; GROUP_SIZE],
        breakdown: ScoreBreakdown,
        cfg: &ImprovementConfig,
    ) -> Result<Self, DuplicateMemberError> {
        for i in 0..GROUP_SIZE {
            for j in i + 1..GROUP_SIZE {
                if members[i] == members[j] {
                    return Err(DuplicateMemberError::new(members[i]));
                }
            }
        }
        let quality = QualityClass::classify(breakdown.total, cfg);
        Ok(Self {
            id,
            week,
            location,
            members,
            breakdown,
            quality,
        })
    }

    #[inline]
    pub fn id(&self) -> GroupId {
        self.id
    }

    #[inline]
    pub fn week(&self) -> Week {
        self.week
    }

    #[inline]
    pub fn location(&self) -> LocationId {
        self.location
    }

    #[inline]
    pub fn members(&self) -> &[PlayerId; GROUP_SIZE] {
        &self.members
    }

    #[inline]
    pub fn contains(&self, id: PlayerId) -> bool {
        self.members.contains(&id)
    }

    #[inline]
    pub fn breakdown(&self) -> &ScoreBreakdown {
        &self.breakdown
    }

    #[inline]
    pub fn total(&self) -> Score {
        self.breakdown.total
    }

    #[inline]
    pub fn quality(&self) -> QualityClass {
        self.quality
    }

    /// Replaces members and score in one step, re-deriving the quality
    /// class. Used by the improvement engine when it commits a move.
    pub fn reshape(
        &self,
        members: [PlayerId; GROUP_SIZE],
        breakdown: ScoreBreakdown,
        cfg: &ImprovementConfig,
    ) -> Result<Self, DuplicateMemberError> {
        Group::new(self.id, self.week, self.location, members, breakdown, cfg)
    }
}

impl Display for Group {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} @ {} [{}]: {}",
            self.id,
            self.location,
            self.quality,
            self.breakdown.total
        )
    }
}
