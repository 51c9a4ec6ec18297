//! Keyed Thompson sampling over Beta beliefs.
//!
//! [`KeyedThompson`] is the single sampling/update primitive behind both learners:
//! [`ContextualBandit`](crate::ContextualBandit) keys it by context, and
//! [`NonContextualBandit`](crate::NonContextualBandit) keys it by `()`.
//!
//! Notes:
//! - Every arm starts from the same prior; there is no explore-first schedule. A wide
//!   posterior wins its share of draws on its own.
//! - This policy is **seedable**; default construction uses seed 0.
//! - Selection never writes to the belief store.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::trace;

use crate::{Arm, BeliefPrior, BeliefStore, BetaBelief, Context, Pool, Result, Selection};

/// Configuration shared by both bandits.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BanditConfig {
    /// Prior for every fresh belief. Default `(1, 1)`.
    pub prior: BeliefPrior,
    /// RNG seed. Same seed + same call sequence gives the same choices.
    pub seed: u64,
}

impl BanditConfig {
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    pub fn with_prior(mut self, prior: BeliefPrior) -> Self {
        self.prior = prior;
        self
    }
}

/// Draw one sample per arm and return the max (first in iteration order on ties).
pub(crate) fn sample_max<S, R, I>(beliefs: I, rng: &mut R) -> Option<Selection<S>>
where
    S: Arm,
    R: Rng + ?Sized,
    I: IntoIterator<Item = (S, BetaBelief)>,
{
    let samples: Vec<(S, f64)> = beliefs
        .into_iter()
        .map(|(arm, belief)| {
            let x = belief.sample(rng);
            trace!(
                arm = ?arm,
                alpha = belief.success,
                beta = belief.failure,
                sample = x,
                "thompson draw"
            );
            (arm, x)
        })
        .collect();
    let chosen = first_max(&samples)?;
    Some(Selection { chosen, samples })
}

/// Arm with the largest value; strict comparison keeps the earliest on ties.
fn first_max<S: Copy>(samples: &[(S, f64)]) -> Option<S> {
    let mut best: Option<(S, f64)> = None;
    for &(arm, x) in samples {
        if best.map_or(true, |(_, b)| x > b) {
            best = Some((arm, x));
        }
    }
    best.map(|(arm, _)| arm)
}

/// Seedable Thompson sampler with beliefs partitioned by key `K`.
#[derive(Debug, Clone)]
pub struct KeyedThompson<K, S> {
    pool: Pool<S>,
    store: BeliefStore<(K, S)>,
    rng: StdRng,
}

impl<K: Context, S: Arm> KeyedThompson<K, S> {
    /// Build a sampler. Fails only if `cfg.prior` is invalid (the pool is already validated).
    pub fn new(pool: Pool<S>, cfg: BanditConfig) -> Result<Self> {
        Ok(Self {
            pool,
            store: BeliefStore::new(cfg.prior)?,
            rng: StdRng::seed_from_u64(cfg.seed),
        })
    }

    pub fn pool(&self) -> &Pool<S> {
        &self.pool
    }

    pub fn store(&self) -> &BeliefStore<(K, S)> {
        &self.store
    }

    pub fn belief(&self, key: &K, arm: S) -> BetaBelief {
        self.store.get(&(key.clone(), arm))
    }

    /// Thompson draw for `key`, with every sampled value.
    pub fn select_explain(&mut self, key: &K) -> Selection<S> {
        let beliefs: Vec<(S, BetaBelief)> = self
            .pool
            .iter()
            .map(|a| (a, self.store.get(&(key.clone(), a))))
            .collect();
        match sample_max(beliefs, &mut self.rng) {
            Some(sel) => sel,
            // Pools are non-empty by construction.
            None => unreachable!("empty strategy pool"),
        }
    }

    pub fn select(&mut self, key: &K) -> S {
        self.select_explain(key).chosen
    }

    /// Fold a `[0, 1]` reward into `(key, arm)`.
    ///
    /// Rejects unknown arms and out-of-range rewards without touching state.
    pub fn update(&mut self, key: K, arm: S, reward: f64) -> Result<()> {
        self.pool.require(arm)?;
        self.store.observe((key, arm), reward)
    }

    /// Check an update without applying it.
    pub(crate) fn check_update(&self, arm: S, reward: f64) -> Result<()> {
        self.pool.require(arm)?;
        crate::error::check_reward(reward).map(|_| ())
    }

    /// Forget everything learned; the pool, prior and RNG stream are kept.
    pub fn reset(&mut self) {
        self.store.clear();
    }
}
