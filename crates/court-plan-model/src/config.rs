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

//! The immutable configuration driving every component of the engine.
//!
//! One [`ScoringConfig`] is built by the loading collaborator, validated
//! once, and then passed by shared reference into candidate generation,
//! scoring, plan building and improvement. The engine never mutates it.

use crate::{
    err::ConfigValidationError,
    player::{AgeBracket, Gender},
};
use court_plan_core::{level::LevelGap, score::Score};

/// Fixed planning-run parameters.
#[derive(Debug, Clone, PartialEq)]
pub struct PlanningParams {
    /// Players per group. The engine assumes four throughout; the field
    /// exists so a misconfigured value is caught by [`ScoringConfig::validate`].
    pub group_size: usize,
    /// Standard number of consecutive weeks a driver plans.
    pub default_weeks: u32,
    /// Placeholder participants available to pad one undersized residual
    /// group up to full size.
    pub stand_in_budget: usize,
}

impl Default for PlanningParams {
    fn default() -> Self {
        Self {
            group_size: 4,
            default_weeks: 12,
            stand_in_budget: 2,
        }
    }
}

/// Caps and hard-filter settings for candidate generation.
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationConfig {
    /// Upper bound on the pool subset one generation unit enumerates over.
    pub max_pool_candidates: usize,
    /// Upper bound on raw combinations one generation unit may examine.
    pub max_combination_checks: usize,
    /// Widest allowed pairwise normalized-level gap inside a group.
    pub max_level_gap: LevelGap,
    /// When set, all four members of a group must share one location.
    pub strict_location: bool,
    /// When set, a group spanning two levels must split exactly two-and-two.
    pub require_even_level_mix: bool,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            max_pool_candidates: 8,
            max_combination_checks: 70,
            max_level_gap: LevelGap::new(1),
            strict_location: true,
            require_even_level_mix: false,
        }
    }
}

/// Points for the continuity branch of the scorer.
#[derive(Debug, Clone, PartialEq)]
pub struct RetentionTable {
    /// All four players stayed together: fixed score, nothing left to earn.
    pub full_retention: Score,
    /// Base for a three-of-four carry-over; the gap up to
    /// `full_retention` is earned from the fresh-composition components.
    pub three_of_four_base: Score,
    /// Base for a two-of-four carry-over.
    pub two_of_four_base: Score,
}

impl Default for RetentionTable {
    fn default() -> Self {
        Self {
            full_retention: Score::new(10.0),
            three_of_four_base: Score::new(9.0),
            two_of_four_base: Score::new(8.0),
        }
    }
}

/// Points for the "wants to play with" pairing component.
#[derive(Debug, Clone, PartialEq)]
pub struct PreferenceTable {
    pub baseline: Score,
    pub mutual_fulfilled: Score,
    pub one_way_fulfilled: Score,
    pub mutual_unfulfilled_penalty: Score,
    pub one_way_unfulfilled_penalty: Score,
    pub cap: Score,
}

impl Default for PreferenceTable {
    fn default() -> Self {
        Self {
            baseline: Score::new(2.0),
            mutual_fulfilled: Score::new(1.2),
            one_way_fulfilled: Score::new(0.6),
            mutual_unfulfilled_penalty: Score::new(0.4),
            one_way_unfulfilled_penalty: Score::new(0.2),
            cap: Score::new(4.0),
        }
    }
}

/// Points for the gender-balance component.
#[derive(Debug, Clone, PartialEq)]
pub struct GenderTable {
    pub homogeneous: Score,
    pub balanced: Score,
    pub three_one: Score,
    pub skewed: Score,
    pub cap: Score,
}

impl Default for GenderTable {
    fn default() -> Self {
        Self {
            homogeneous: Score::new(2.5),
            balanced: Score::new(2.0),
            three_one: Score::new(1.0),
            skewed: Score::new(0.5),
            cap: Score::new(2.5),
        }
    }
}

/// Points for the level-homogeneity component.
#[derive(Debug, Clone, PartialEq)]
pub struct LevelTable {
    pub exact_match: Score,
    pub near_match: Score,
    pub far_match: Score,
    pub cap: Score,
}

impl Default for LevelTable {
    fn default() -> Self {
        Self {
            exact_match: Score::new(3.0),
            near_match: Score::new(2.5),
            far_match: Score::new(1.0),
            cap: Score::new(2.5),
        }
    }
}

/// Points for the age-matching component.
#[derive(Debug, Clone, PartialEq)]
pub struct AgeTable {
    pub single_bracket: Score,
    pub adjacent_brackets: Score,
    pub spread: Score,
    pub unknown_age: Score,
    pub cap: Score,
}

impl Default for AgeTable {
    fn default() -> Self {
        Self {
            single_bracket: Score::new(1.0),
            adjacent_brackets: Score::new(0.7),
            spread: Score::new(0.3),
            unknown_age: Score::new(0.5),
            cap: Score::new(1.0),
        }
    }
}

/// Per-player bonus for flexible players placed away from home, additive on
/// top of the four capped components.
#[derive(Debug, Clone, PartialEq)]
pub struct FlexibilityTable {
    pub per_player: Score,
    pub cap: Score,
}

impl Default for FlexibilityTable {
    fn default() -> Self {
        Self {
            per_player: Score::new(0.1),
            cap: Score::new(0.5),
        }
    }
}

/// All component tables plus the overall total cap.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoreTable {
    pub retention: RetentionTable,
    pub preference: PreferenceTable,
    pub gender: GenderTable,
    pub level: LevelTable,
    pub age: AgeTable,
    pub flexibility: FlexibilityTable,
    pub max_total: Score,
}

impl Default for ScoreTable {
    fn default() -> Self {
        Self {
            retention: RetentionTable::default(),
            preference: PreferenceTable::default(),
            gender: GenderTable::default(),
            level: LevelTable::default(),
            age: AgeTable::default(),
            flexibility: FlexibilityTable::default(),
            max_total: Score::new(10.0),
        }
    }
}

/// Three half-open age ranges `[lo, hi)`; everything else is `Outside`.
#[derive(Debug, Clone, PartialEq)]
pub struct AgeBrackets {
    pub young: (u8, u8),
    pub middle: (u8, u8),
    pub senior: (u8, u8),
}

impl Default for AgeBrackets {
    fn default() -> Self {
        Self {
            young: (18, 30),
            middle: (30, 50),
            senior: (50, 71),
        }
    }
}

impl AgeBrackets {
    pub fn bracket_of(&self, age: u8) -> AgeBracket {
        let within = |(lo, hi): (u8, u8)| lo <= age && age < hi;
        if within(self.young) {
            AgeBracket::Young
        } else if within(self.middle) {
            AgeBracket::Middle
        } else if within(self.senior) {
            AgeBracket::Senior
        } else {
            AgeBracket::Outside
        }
    }
}

/// Additive level bonus that makes cross-gender level comparisons fair.
#[derive(Debug, Clone, PartialEq)]
pub struct GenderCompensation {
    compensated_gender: Gender,
    level_bonus: u8,
}

impl GenderCompensation {
    pub fn new(compensated_gender: Gender, level_bonus: u8) -> Self {
        Self {
            compensated_gender,
            level_bonus,
        }
    }

    #[inline]
    pub fn compensated_gender(&self) -> Gender {
        self.compensated_gender
    }

    #[inline]
    pub fn level_bonus(&self) -> u8 {
        self.level_bonus
    }
}

impl Default for GenderCompensation {
    fn default() -> Self {
        Self {
            compensated_gender: Gender::Female,
            level_bonus: 1,
        }
    }
}

/// Budgets and thresholds for the improvement engine.
#[derive(Debug, Clone, PartialEq)]
pub struct ImprovementConfig {
    /// When false the builder's draft is the final plan.
    pub enabled: bool,
    /// Round budget.
    pub max_rounds: usize,
    /// Minimum combined score delta a move must bring to be accepted.
    pub min_accept_delta: Score,
    /// Plans whose mean group score ends below this are flagged, not failed.
    pub plan_quality_floor: Score,
    /// Groups at or above this score are frozen.
    pub excellent_threshold: Score,
    /// Groups at or below this score become repair targets.
    pub poor_threshold: Score,
    /// Total single-player swaps allowed per week.
    pub max_swaps: usize,
    /// Total groups that may be torn down and recomposed per week.
    pub max_rebuilds: usize,
}

impl Default for ImprovementConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            max_rounds: 10,
            min_accept_delta: Score::new(0.1),
            plan_quality_floor: Score::new(5.0),
            excellent_threshold: Score::new(9.0),
            poor_threshold: Score::new(6.0),
            max_swaps: 10,
            max_rebuilds: 5,
        }
    }
}

/// The complete, read-only configuration for one planning run.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ScoringConfig {
    pub planning: PlanningParams,
    pub generation: GenerationConfig,
    pub scores: ScoreTable,
    pub age_brackets: AgeBrackets,
    pub compensation: GenderCompensation,
    pub improvement: ImprovementConfig,
}

impl ScoringConfig {
    /// Structural checks for the loading collaborator. The engine itself
    /// assumes a config that passed this.
    pub fn validate(&self) -> Result<(), ConfigValidationError> {
        if self.planning.group_size != 4 {
            return Err(ConfigValidationError::GroupSizeNotFour {
                got: self.planning.group_size,
            });
        }
        if self.generation.max_pool_candidates < 4 || self.generation.max_combination_checks == 0 {
            return Err(ConfigValidationError::EmptyCandidateCap);
        }
        let entries: [(&'static str, Score); 18] = [
            ("retention.full_retention", self.scores.retention.full_retention),
            ("retention.three_of_four_base", self.scores.retention.three_of_four_base),
            ("retention.two_of_four_base", self.scores.retention.two_of_four_base),
            ("preference.baseline", self.scores.preference.baseline),
            ("preference.mutual_fulfilled", self.scores.preference.mutual_fulfilled),
            ("preference.one_way_fulfilled", self.scores.preference.one_way_fulfilled),
            ("preference.cap", self.scores.preference.cap),
            ("gender.homogeneous", self.scores.gender.homogeneous),
            ("gender.balanced", self.scores.gender.balanced),
            ("gender.cap", self.scores.gender.cap),
            ("level.exact_match", self.scores.level.exact_match),
            ("level.near_match", self.scores.level.near_match),
            ("level.cap", self.scores.level.cap),
            ("age.single_bracket", self.scores.age.single_bracket),
            ("age.cap", self.scores.age.cap),
            ("flexibility.per_player", self.scores.flexibility.per_player),
            ("flexibility.cap", self.scores.flexibility.cap),
            ("max_total", self.scores.max_total),
        ];
        for (name, value) in entries {
            if value.value() < 0.0 {
                return Err(ConfigValidationError::NegativeScoreEntry {
                    name,
                    value: value.value(),
                });
            }
        }
        for (lo, hi) in [
            self.age_brackets.young,
            self.age_brackets.middle,
            self.age_brackets.senior,
        ] {
            if lo >= hi {
                return Err(ConfigValidationError::InvertedAgeBracket { lo, hi });
            }
        }
        let imp = &self.improvement;
        if imp.poor_threshold.value() >= imp.excellent_threshold.value() {
            return Err(ConfigValidationError::ThresholdsOutOfOrder {
                poor: imp.poor_threshold.value(),
                excellent: imp.excellent_threshold.value(),
            });
        }
        Ok(())
    }

    /// Overall score cap for one group.
    #[inline]
    pub fn max_total(&self) -> Score {
        self.scores.max_total
    }
}
