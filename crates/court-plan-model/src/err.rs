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

use crate::id::{GroupId, PlayerId};
use std::fmt::Display;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DuplicatePlayerError {
    id: PlayerId,
}

impl DuplicatePlayerError {
    #[inline]
    pub fn new(id: PlayerId) -> Self {
        Self { id }
    }

    #[inline]
    pub fn id(&self) -> PlayerId {
        self.id
    }
}

impl Display for DuplicatePlayerError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Player {} appears more than once in the roster", self.id)
    }
}

impl std::error::Error for DuplicatePlayerError {}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SelfPreferenceError {
    id: PlayerId,
}

impl SelfPreferenceError {
    #[inline]
    pub fn new(id: PlayerId) -> Self {
        Self { id }
    }

    #[inline]
    pub fn id(&self) -> PlayerId {
        self.id
    }
}

impl Display for SelfPreferenceError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Player {} lists themselves as a wanted partner", self.id)
    }
}

impl std::error::Error for SelfPreferenceError {}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DuplicateMemberError {
    id: PlayerId,
}

impl DuplicateMemberError {
    #[inline]
    pub fn new(id: PlayerId) -> Self {
        Self { id }
    }

    #[inline]
    pub fn id(&self) -> PlayerId {
        self.id
    }
}

impl Display for DuplicateMemberError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Player {} appears more than once in a group", self.id)
    }
}

impl std::error::Error for DuplicateMemberError {}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct UnknownPlayerError {
    id: PlayerId,
}

impl UnknownPlayerError {
    #[inline]
    pub fn new(id: PlayerId) -> Self {
        Self { id }
    }

    #[inline]
    pub fn id(&self) -> PlayerId {
        self.id
    }
}

impl Display for UnknownPlayerError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Player {} is not part of the roster", self.id)
    }
}

impl std::error::Error for UnknownPlayerError {}

/// Violations detected when checking a weekly plan against its roster.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PlanValidationError {
    /// A roster player is neither grouped, in the residual group, nor
    /// reported unassigned.
    MissingPlayer { id: PlayerId },
    /// A player occurs in more than one place in the plan.
    DoubleAssignment { id: PlayerId },
    /// A group references a player the roster does not know.
    UnknownMember { group: GroupId, id: PlayerId },
}

impl Display for PlanValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PlanValidationError::MissingPlayer { id } => {
                write!(f, "Player {id} is missing from the plan")
            }
            PlanValidationError::DoubleAssignment { id } => {
                write!(f, "Player {id} is assigned more than once")
            }
            PlanValidationError::UnknownMember { group, id } => {
                write!(f, "Group {group} references unknown player {id}")
            }
        }
    }
}

impl std::error::Error for PlanValidationError {}

/// Structural problems in a scoring configuration.
///
/// Config loading and validation belong to the caller; this type exists so
/// that the loading side has something precise to report before a run starts.
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigValidationError {
    GroupSizeNotFour { got: usize },
    EmptyCandidateCap,
    NegativeScoreEntry { name: &'static str, value: f64 },
    InvertedAgeBracket { lo: u8, hi: u8 },
    ThresholdsOutOfOrder { poor: f64, excellent: f64 },
}

impl Display for ConfigValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigValidationError::GroupSizeNotFour { got } => {
                write!(f, "Group size is fixed at four, got {got}")
            }
            ConfigValidationError::EmptyCandidateCap => {
                write!(f, "Candidate caps must allow at least one full group")
            }
            ConfigValidationError::NegativeScoreEntry { name, value } => {
                write!(f, "Score table entry `{name}` is negative: {value}")
            }
            ConfigValidationError::InvertedAgeBracket { lo, hi } => {
                write!(f, "Age bracket [{lo}, {hi}) is inverted")
            }
            ConfigValidationError::ThresholdsOutOfOrder { poor, excellent } => {
                write!(
                    f,
                    "Poor threshold {poor} must stay below excellent threshold {excellent}"
                )
            }
        }
    }
}

impl std::error::Error for ConfigValidationError {}
