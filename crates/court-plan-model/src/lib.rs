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

//! # Court Plan Model (`court-plan-model`)
//!
//! Domain model for the weekly group assignment engine. It builds on the
//! typed primitives of `court-plan-core` and gives the solver a precise
//! vocabulary for rosters, groups, plans and configuration.
//!
//! ## Key data structures
//!
//! - **[`id::PlayerId`] / [`id::GroupId`] / [`id::LocationId`] /
//!   [`id::Week`]**: identifier newtypes.
//!
//! - **[`player::Player`]**: one eligible participant with raw and
//!   normalized playing level, gender, optional age, home location, a
//!   flexibility flag, directed partner preferences and the previous-week
//!   membership.
//!
//! - **[`roster::Roster`]**: the pool of one planning week together with
//!   the previous-week group index that drives continuity decisions.
//!
//! - **[`group::Group`]**: a committed four-player group carrying its
//!   per-component [`group::ScoreBreakdown`] and derived
//!   [`group::QualityClass`].
//!
//! - **[`plan::WeeklyPlan`]**: the week's groups plus the residual group
//!   and unassigned players, with [`plan::PlanStats`] and validation of
//!   the coverage invariant.
//!
//! - **[`config::ScoringConfig`]**: the immutable weight/cap/budget tables
//!   every component reads; built and validated by the loading side.
//!
//! A seeded [`generator::RosterGenerator`] produces synthetic rosters for
//! benchmarks and the demo binary.

pub mod config;
pub mod err;
pub mod generator;
pub mod group;
pub mod id;
pub mod plan;
pub mod player;
pub mod roster;

pub mod prelude {
    pub use crate::config::{
        AgeBrackets, GenderCompensation, GenerationConfig, ImprovementConfig, PlanningParams,
        ScoringConfig,
    };
    pub use crate::err::{
        ConfigValidationError, DuplicateMemberError, DuplicatePlayerError, PlanValidationError,
        SelfPreferenceError, UnknownPlayerError,
    };
    pub use crate::generator::{RosterGenConfig, RosterGenError, RosterGenerator};
    pub use crate::group::{
        GROUP_SIZE, GenderBalance, Group, QualityClass, ScoreBreakdown, level_range,
    };
    pub use crate::id::{GroupId, LocationId, PlayerId, Week};
    pub use crate::plan::{PlanStats, ResidualGroup, WeeklyPlan};
    pub use crate::player::{AgeBracket, Gender, Player};
    pub use crate::roster::Roster;
}
