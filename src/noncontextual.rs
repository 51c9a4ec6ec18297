//! Context-free Thompson sampling for the post-processing pool.
//!
//! Same Beta-counter mechanics as [`ContextualBandit`](crate::ContextualBandit), with a
//! single implicit context.

use tracing::debug;

use crate::{Arm, BanditConfig, BetaBelief, KeyedThompson, Pool, Result, Selection};

/// Thompson-sampling bandit with one belief per strategy.
#[derive(Debug, Clone)]
pub struct NonContextualBandit<S> {
    inner: KeyedThompson<(), S>,
}

impl<S: Arm> NonContextualBandit<S> {
    pub fn new(pool: Pool<S>, cfg: BanditConfig) -> Result<Self> {
        Ok(Self {
            inner: KeyedThompson::new(pool, cfg)?,
        })
    }

    pub fn pool(&self) -> &Pool<S> {
        self.inner.pool()
    }

    pub fn select(&mut self) -> S {
        self.select_explain().chosen
    }

    pub fn select_explain(&mut self) -> Selection<S> {
        let sel = self.inner.select_explain(&());
        debug!(chosen = ?sel.chosen, "select");
        sel
    }

    /// Fold `reward` into `strategy`'s belief. Same contract as the contextual update.
    pub fn update(&mut self, strategy: S, reward: f64) -> Result<()> {
        self.inner.update((), strategy, reward)?;
        debug!(strategy = ?strategy, reward, "update");
        Ok(())
    }

    pub(crate) fn check_update(&self, strategy: S, reward: f64) -> Result<()> {
        self.inner.check_update(strategy, reward)
    }

    pub fn belief(&self, strategy: S) -> BetaBelief {
        self.inner.belief(&(), strategy)
    }

    pub fn expected_value(&self, strategy: S) -> f64 {
        self.belief(strategy).expected_value()
    }

    pub fn reset(&mut self) {
        self.inner.reset();
    }
}
