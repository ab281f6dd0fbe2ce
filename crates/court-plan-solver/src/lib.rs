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

//! # Court Plan Solver (`court-plan-solver`)
//!
//! The planning engine: pool partitioning, hard-filtered candidate
//! generation, the multi-component group scorer, the greedy plan builder
//! and the budgeted improvement engine.
//!
//! The pipeline mirrors the data flow of the system: a roster and the
//! previous week's memberships feed candidate generation and scoring, the
//! greedy builder turns them into a draft [`court_plan_model::plan::WeeklyPlan`],
//! and the improvement engine repairs underperforming groups via swaps and
//! recompositions until a budget or a fixed point is reached.

pub mod builder;
pub mod candidates;
pub mod improve;
pub mod pool;
pub mod scoring;

pub mod prelude {
    pub use crate::builder::{GreedyPlanBuilder, PlanSolver};
    pub use crate::candidates::{Candidate, CandidateIter, capped_subset, passes_hard_filters};
    pub use crate::improve::{ImproveStats, ImprovementEngine};
    pub use crate::pool::{Pool, PoolKey, partition};
    pub use crate::scoring::{GroupScorer, group_location};
}
