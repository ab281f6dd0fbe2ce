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
    config::GenderCompensation,
    err::SelfPreferenceError,
    id::{GroupId, LocationId, PlayerId},
};
use court_plan_core::level::Level;
use std::{collections::BTreeSet, fmt::Display};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Gender {
    Male,
    Female,
}

impl Display for Gender {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Gender::Male => write!(f, "M"),
            Gender::Female => write!(f, "F"),
        }
    }
}

/// Age bracket a player falls into, derived from the configured boundaries.
///
/// `Outside` covers ages beyond all configured brackets; it forms a bracket
/// of its own and is adjacent to none of the others.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum AgeBracket {
    Young,
    Middle,
    Senior,
    Outside,
}

impl AgeBracket {
    /// Whether two brackets sit next to each other on the age axis.
    #[inline]
    pub fn is_adjacent(self, other: AgeBracket) -> bool {
        matches!(
            (self, other),
            (AgeBracket::Young, AgeBracket::Middle)
                | (AgeBracket::Middle, AgeBracket::Young)
                | (AgeBracket::Middle, AgeBracket::Senior)
                | (AgeBracket::Senior, AgeBracket::Middle)
        )
    }
}

impl Display for AgeBracket {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AgeBracket::Young => write!(f, "young"),
            AgeBracket::Middle => write!(f, "middle"),
            AgeBracket::Senior => write!(f, "senior"),
            AgeBracket::Outside => write!(f, "outside"),
        }
    }
}

/// One eligible participant for a planning week.
///
/// Immutable for the duration of a run; the engine never mutates a player,
/// it only decides which group the player's id ends up in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Player {
    id: PlayerId,
    level: Level,
    gender: Gender,
    age: Option<u8>,
    home: LocationId,
    flexible: bool,
    wants: BTreeSet<PlayerId>,
    previous_group: Option<GroupId>,
}

impl Player {
    pub fn new(
        id: PlayerId,
        level: Level,
        gender: Gender,
        age: Option<u8>,
        home: LocationId,
        flexible: bool,
        wants: BTreeSet<PlayerId>,
        previous_group: Option<GroupId>,
    ) -> Result<Self, SelfPreferenceError> {
        if wants.contains(&id) {
            return Err(SelfPreferenceError::new(id));
        }
        Ok(Self {
            id,
            level,
            gender,
            age,
            home,
            flexible,
            wants,
            previous_group,
        })
    }

    #[inline]
    pub fn id(&self) -> PlayerId {
        self.id
    }

    /// Raw stored level, kept for display and audit.
    #[inline]
    pub fn raw_level(&self) -> Level {
        self.level
    }

    /// Level as every comparison in the engine reads it: raised by the
    /// configured compensation bonus for the compensated gender.
    #[inline]
    pub fn level(&self, compensation: &GenderCompensation) -> Level {
        if self.gender == compensation.compensated_gender() {
            self.level.with_bonus(compensation.level_bonus())
        } else {
            self.level
        }
    }

    #[inline]
    pub fn gender(&self) -> Gender {
        self.gender
    }

    #[inline]
    pub fn age(&self) -> Option<u8> {
        self.age
    }

    #[inline]
    pub fn home(&self) -> LocationId {
        self.home
    }

    /// Whether the player accepts placement away from their home location.
    #[inline]
    pub fn is_flexible(&self) -> bool {
        self.flexible
    }

    /// Directed "wants to play with" preferences.
    #[inline]
    pub fn wants(&self) -> &BTreeSet<PlayerId> {
        &self.wants
    }

    #[inline]
    pub fn wants_player(&self, other: PlayerId) -> bool {
        self.wants.contains(&other)
    }

    #[inline]
    pub fn has_preferences(&self) -> bool {
        !self.wants.is_empty()
    }

    /// Group the player belonged to in the previous planning week.
    #[inline]
    pub fn previous_group(&self) -> Option<GroupId> {
        self.previous_group
    }

    /// Copy of this player carrying a new previous-week membership, used
    /// when advancing the roster from one week to the next.
    pub fn with_previous_group(&self, previous_group: Option<GroupId>) -> Self {
        Self {
            previous_group,
            ..self.clone()
        }
    }
}
