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

//! Seeded synthetic roster generation for benchmarks and the demo binary.
//!
//! Attribute distributions are deliberately simple: uniform levels and
//! locations, normally distributed ages, Bernoulli draws for gender,
//! flexibility, preferences and unknown ages. The same seed always yields
//! the same roster.

use crate::{
    id::{LocationId, PlayerId},
    player::{Gender, Player},
    roster::Roster,
};
use court_plan_core::level::Level;
use rand::{Rng, SeedableRng, rngs::SmallRng};
use rand_distr::{Distribution, Normal};
use std::{collections::BTreeSet, fmt::Display};

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RosterGenError {
    LevelRangeInverted { min: u8, max: u8 },
    ShareOutOfRange { name: &'static str, value: f64 },
    NonPositiveAgeStd { value: f64 },
    NoLocations,
}

impl Display for RosterGenError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RosterGenError::LevelRangeInverted { min, max } => {
                write!(f, "Level range [{min}, {max}] is inverted")
            }
            RosterGenError::ShareOutOfRange { name, value } => {
                write!(f, "Share `{name}` must lie in [0, 1], got {value}")
            }
            RosterGenError::NonPositiveAgeStd { value } => {
                write!(f, "Age standard deviation must be positive, got {value}")
            }
            RosterGenError::NoLocations => write!(f, "At least one location is required"),
        }
    }
}

impl std::error::Error for RosterGenError {}

/// Configuration for one synthetic roster.
#[derive(Debug, Clone, PartialEq)]
pub struct RosterGenConfig {
    seed: u64,
    player_count: usize,
    location_count: u32,
    min_level: u8,
    max_level: u8,
    female_share: f64,
    flexible_share: f64,
    preference_share: f64,
    unknown_age_share: f64,
    age_mean: f64,
    age_std: f64,
}

impl RosterGenConfig {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        seed: u64,
        player_count: usize,
        location_count: u32,
        min_level: u8,
        max_level: u8,
        female_share: f64,
        flexible_share: f64,
        preference_share: f64,
        unknown_age_share: f64,
        age_mean: f64,
        age_std: f64,
    ) -> Result<Self, RosterGenError> {
        if min_level > max_level {
            return Err(RosterGenError::LevelRangeInverted {
                min: min_level,
                max: max_level,
            });
        }
        if location_count == 0 {
            return Err(RosterGenError::NoLocations);
        }
        if age_std <= 0.0 {
            return Err(RosterGenError::NonPositiveAgeStd { value: age_std });
        }
        let shares = [
            ("female_share", female_share),
            ("flexible_share", flexible_share),
            ("preference_share", preference_share),
            ("unknown_age_share", unknown_age_share),
        ];
        for (name, value) in shares {
            if !(0.0..=1.0).contains(&value) {
                return Err(RosterGenError::ShareOutOfRange { name, value });
            }
        }
        Ok(Self {
            seed,
            player_count,
            location_count,
            min_level,
            max_level,
            female_share,
            flexible_share,
            preference_share,
            unknown_age_share,
            age_mean,
            age_std,
        })
    }

    #[inline]
    pub fn seed(&self) -> u64 {
        self.seed
    }

    #[inline]
    pub fn player_count(&self) -> usize {
        self.player_count
    }

    #[inline]
    pub fn location_count(&self) -> u32 {
        self.location_count
    }
}

impl Default for RosterGenConfig {
    fn default() -> Self {
        Self {
            seed: 42,
            player_count: 48,
            location_count: 2,
            min_level: 3,
            max_level: 8,
            female_share: 0.5,
            flexible_share: 0.2,
            preference_share: 0.3,
            unknown_age_share: 0.1,
            age_mean: 42.0,
            age_std: 12.0,
        }
    }
}

/// Deterministic roster generator over a [`RosterGenConfig`].
#[derive(Debug, Clone)]
pub struct RosterGenerator {
    config: RosterGenConfig,
    rng: SmallRng,
}

impl RosterGenerator {
    pub fn new(config: RosterGenConfig) -> Self {
        let rng = SmallRng::seed_from_u64(config.seed);
        Self { config, rng }
    }

    #[inline]
    pub fn config(&self) -> &RosterGenConfig {
        &self.config
    }

    pub fn generate(&mut self) -> Roster {
        let cfg = &self.config;
        let ages = Normal::new(cfg.age_mean, cfg.age_std).expect("age std validated on build");
        let mut players = Vec::with_capacity(cfg.player_count);

        for i in 0..cfg.player_count {
            let id = PlayerId::new(i as u64 + 1);
            let level = Level::new(self.rng.gen_range(cfg.min_level..=cfg.max_level));
            let gender = if self.rng.gen_bool(cfg.female_share) {
                Gender::Female
            } else {
                Gender::Male
            };
            let age = if self.rng.gen_bool(cfg.unknown_age_share) {
                None
            } else {
                Some(ages.sample(&mut self.rng).clamp(16.0, 84.0) as u8)
            };
            let home = LocationId::new(self.rng.gen_range(0..cfg.location_count));
            let flexible = self.rng.gen_bool(cfg.flexible_share);

            let mut wants = BTreeSet::new();
            if cfg.player_count > 1 && self.rng.gen_bool(cfg.preference_share) {
                let partners = self.rng.gen_range(1..=2usize);
                for _ in 0..partners {
                    let other = PlayerId::new(self.rng.gen_range(1..=cfg.player_count as u64));
                    if other != id {
                        wants.insert(other);
                    }
                }
            }

            let player = Player::new(id, level, gender, age, home, flexible, wants, None)
                .expect("generated players never list themselves");
            players.push(player);
        }

        Roster::new(players).expect("generated ids are unique")
    }
}
