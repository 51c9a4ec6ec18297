//! `stratmux`: Thompson-sampling strategy selection with context partitioning and a
//! confidence safety gate.
//!
//! Built for control loops that repeatedly pick one corrective strategy out of a small
//! fixed set, observe a bounded reward, and should pick better next time. The running
//! example is runtime error correction: choose a correction strategy conditioned on
//! the observed noise regime, then choose a post-processing (mitigation) technique.
//!
//! **Learners:**
//! - [`ContextualBandit`]: Beta-Bernoulli Thompson sampling with beliefs keyed by
//!   `(context, strategy)`. Unseen contexts start from the prior.
//! - [`NonContextualBandit`]: the same mechanics with one belief per strategy.
//! - [`SharedContextualBandit`]: `&self` variant with per-context locking for several
//!   concurrent loops.
//!
//! All three sit on one primitive, [`KeyedThompson`], over an owned [`BeliefStore`].
//!
//! **Safety and orchestration:**
//! - [`SafetyGate`]: per-strategy minimum confidence; substitutes a fallback when the
//!   forecaster's confidence is below a strategy's threshold.
//! - [`DecisionCycle`]: select → gate → execute → learn, for both pools, with
//!   all-or-nothing belief updates.
//!
//! **Collaborators** are traits: [`ConfidenceSource`], [`Executor`],
//! [`MitigationModel`], [`ContextSource`]. The [`sim`] module ships table-driven
//! reference implementations.
//!
//! **Goals:**
//! - **Deterministic by default**: same seed + same call sequence → same choices.
//! - **Validated configuration**: empty pools, duplicates, missing thresholds and bad
//!   priors fail at construction.
//! - **Strict rewards**: rewards outside `[0, 1]` are rejected, never clamped.
//! - **Small K**: designed for 2–10 strategies.
//!
//! **Non-goals:**
//! - No persistence, no metrics export, no orchestration loop beyond one cycle.
//! - The reference collaborators are lookup tables, not noise or circuit models.
//!
//! # The update rule
//!
//! Each belief is a pair of positive weights `(α, β)` starting at the prior (default
//! `(1, 1)`, the uniform distribution). A reward `r ∈ [0, 1]` counts as a fractional
//! success:
//!
//! ```text
//!   α += r
//!   β += 1 - r
//! ```
//!
//! Every update adds exactly one unit of mass. Selection draws `x_s ~ Beta(α_s, β_s)`
//! for each strategy and plays `argmax_s x_s`, taking the first strategy in pool
//! order on ties. No explore-first schedule is needed: a strategy with few
//! observations has a wide posterior and wins its share of draws until the evidence
//! says otherwise.
//!
//! # Learning from what ran
//!
//! When the gate substitutes the fallback, the fallback executes and the fallback's
//! belief receives the reward. The bandit never credits a strategy that did not run.
//!
//! ```rust
//! use stratmux::sim::{reference_cycle, UniformRegimeSource};
//!
//! let mut cycle = reference_cycle(7).unwrap();
//! let mut regimes = UniformRegimeSource::new(7);
//! for _ in 0..20 {
//!     let rec = cycle.run_next(&mut regimes).unwrap();
//!     assert!((0.0..=1.0).contains(&rec.final_reward));
//! }
//! assert_eq!(cycle.completed(), 20);
//! ```

#![forbid(unsafe_code)]

mod error;
pub use error::*;

mod pool;
pub use pool::*;

mod belief;
pub use belief::*;

mod decision;
pub use decision::*;

mod seed;
pub use seed::*;

mod thompson;
pub use thompson::*;

mod contextual;
pub use contextual::*;

mod noncontextual;
pub use noncontextual::*;

mod shared;
pub use shared::*;

mod gate;
pub use gate::*;

mod cycle;
pub use cycle::*;

pub mod sim;
