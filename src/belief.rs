//! Beta belief state and its owned store.
//!
//! A [`BetaBelief`] is a pair of positive pseudo-counts `(success, failure)`. A
//! bounded reward `r ∈ [0, 1]` is treated as a fractional success:
//!
//! ```text
//!   success += r
//!   failure += 1 - r
//! ```
//!
//! so every update adds exactly one unit of mass regardless of `r`.

use std::collections::BTreeMap;

use rand::Rng;
use rand_distr::{Beta, Distribution};
use tracing::warn;

use crate::error::check_reward;
use crate::{Error, Result};

/// Prior pseudo-counts for every fresh belief.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BeliefPrior {
    /// Prior success weight (must be finite and > 0).
    pub success: f64,
    /// Prior failure weight (must be finite and > 0).
    pub failure: f64,
}

impl Default for BeliefPrior {
    /// The non-informative `(1, 1)` prior.
    fn default() -> Self {
        Self {
            success: 1.0,
            failure: 1.0,
        }
    }
}

impl BeliefPrior {
    pub fn new(success: f64, failure: f64) -> Result<Self> {
        let p = Self { success, failure };
        p.validate()?;
        Ok(p)
    }

    pub fn validate(&self) -> Result<()> {
        let ok = |x: f64| x.is_finite() && x > 0.0;
        if ok(self.success) && ok(self.failure) {
            Ok(())
        } else {
            Err(Error::InvalidPrior {
                success: self.success,
                failure: self.failure,
            })
        }
    }

    pub fn belief(&self) -> BetaBelief {
        BetaBelief {
            success: self.success,
            failure: self.failure,
            observations: 0,
        }
    }
}

/// Beta posterior state for one key.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BetaBelief {
    pub success: f64,
    pub failure: f64,
    /// Number of rewards folded in (prior excluded).
    pub observations: u64,
}

impl BetaBelief {
    /// Posterior mean `success / (success + failure)`.
    pub fn expected_value(&self) -> f64 {
        self.success / (self.success + self.failure)
    }

    /// Total pseudo-count mass.
    pub fn mass(&self) -> f64 {
        self.success + self.failure
    }

    /// Fold in a reward. All-or-nothing: an invalid reward changes nothing.
    pub fn observe(&mut self, reward: f64) -> Result<()> {
        let r = check_reward(reward)?;
        self.success += r;
        self.failure += 1.0 - r;
        self.observations = self.observations.saturating_add(1);
        Ok(())
    }

    /// Draw one sample from `Beta(success, failure)`.
    ///
    /// Weights reached through a validated prior and [`observe`](Self::observe) are
    /// always positive and finite. The fields are public, so a hand-built belief can
    /// still be invalid: `rand_distr` then rejects it, the posterior mean is returned
    /// and the event is logged at `warn`.
    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> f64 {
        match Beta::new(self.success, self.failure) {
            Ok(dist) => dist.sample(rng),
            Err(e) => {
                warn!(
                    success = self.success,
                    failure = self.failure,
                    error = %e,
                    "beta parameters rejected; using posterior mean"
                );
                self.expected_value()
            }
        }
    }
}

/// Owned map from key to [`BetaBelief`].
///
/// Entries are created on first update and never removed (short of [`BeliefStore::clear`]).
/// Reads of unknown keys return the prior without inserting anything.
#[derive(Debug, Clone)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(bound(deserialize = "K: Ord + serde::Deserialize<'de>"))
)]
pub struct BeliefStore<K> {
    prior: BeliefPrior,
    beliefs: BTreeMap<K, BetaBelief>,
}

impl<K: Ord> BeliefStore<K> {
    pub fn new(prior: BeliefPrior) -> Result<Self> {
        prior.validate()?;
        Ok(Self {
            prior,
            beliefs: BTreeMap::new(),
        })
    }

    pub fn prior(&self) -> BeliefPrior {
        self.prior
    }

    /// Current belief for `key`, or the prior if the key was never updated.
    pub fn get(&self, key: &K) -> BetaBelief {
        self.beliefs
            .get(key)
            .copied()
            .unwrap_or_else(|| self.prior.belief())
    }

    /// Whether `key` has ever been updated.
    pub fn contains(&self, key: &K) -> bool {
        self.beliefs.contains_key(key)
    }

    /// Fold `reward` into `key`'s belief, creating it from the prior if needed.
    ///
    /// The reward is checked before the entry is created, so a rejected update leaves
    /// the store exactly as it was.
    pub fn observe(&mut self, key: K, reward: f64) -> Result<()> {
        check_reward(reward)?;
        let prior = self.prior;
        self.beliefs
            .entry(key)
            .or_insert_with(|| prior.belief())
            .observe(reward)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&K, &BetaBelief)> {
        self.beliefs.iter()
    }

    /// Number of materialized entries.
    pub fn len(&self) -> usize {
        self.beliefs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.beliefs.is_empty()
    }

    pub fn clear(&mut self) {
        self.beliefs.clear();
    }
}
