//! Context-aware Thompson sampling.
//!
//! Beliefs are partitioned by an opaque context label: what the bandit learns in one
//! regime says nothing about another. Contexts are never registered up front; the
//! first update for a context creates its beliefs from the prior, and a select on a
//! context never seen samples straight from the prior.
//!
//! ## Why a separate partition per context
//!
//! A strategy that is clearly best under one regime (say, heavy correction under
//! readout errors) can be wasteful under another (idle). Pooling the two regimes
//! would average the evidence and converge on neither optimum. Partitioning trades
//! sample efficiency for that resolution, which is the right trade when the context
//! space is small and observed often.
//!
//! ## Design
//!
//! - Rewards are scalar in `[0, 1]`; anything else is rejected, not clamped.
//! - Policies are **seedable** and deterministic given a seed and call sequence.
//! - Ties go to the first strategy in pool order.

use std::collections::BTreeSet;

use tracing::debug;

use crate::{Arm, BanditConfig, BetaBelief, Context, KeyedThompson, Pool, Result, Selection};

/// Thompson-sampling bandit with beliefs keyed by `(context, strategy)`.
///
/// Usage:
/// - call `select(&context)` to pick a strategy
/// - call `update(&context, strategy, reward)` with the strategy that actually ran
///
/// ```rust
/// use stratmux::{BanditConfig, ContextualBandit, Correction, Pool, Regime};
///
/// let pool = Pool::new(Correction::ALL).unwrap();
/// let mut bandit = ContextualBandit::new(pool, BanditConfig::default()).unwrap();
///
/// let chosen = bandit.select(&Regime::Idle);
/// bandit.update(&Regime::Idle, chosen, 0.97).unwrap();
/// assert_eq!(bandit.belief(&Regime::Idle, chosen).observations, 1);
/// ```
#[derive(Debug, Clone)]
pub struct ContextualBandit<C, S> {
    inner: KeyedThompson<C, S>,
}

impl<C: Context, S: Arm> ContextualBandit<C, S> {
    pub fn new(pool: Pool<S>, cfg: BanditConfig) -> Result<Self> {
        Ok(Self {
            inner: KeyedThompson::new(pool, cfg)?,
        })
    }

    pub fn pool(&self) -> &Pool<S> {
        self.inner.pool()
    }

    /// Pick a strategy for `context`.
    pub fn select(&mut self, context: &C) -> S {
        self.select_explain(context).chosen
    }

    /// Pick a strategy for `context`, returning every sampled value.
    pub fn select_explain(&mut self, context: &C) -> Selection<S> {
        let sel = self.inner.select_explain(context);
        debug!(context = ?context, chosen = ?sel.chosen, "contextual select");
        sel
    }

    /// Fold `reward` into the belief for `(context, strategy)`.
    ///
    /// Errors with a contract violation (and changes nothing) when `reward` is not a
    /// finite value in `[0, 1]` or `strategy` is not in the pool.
    pub fn update(&mut self, context: &C, strategy: S, reward: f64) -> Result<()> {
        self.inner.update(context.clone(), strategy, reward)?;
        debug!(context = ?context, strategy = ?strategy, reward, "contextual update");
        Ok(())
    }

    pub(crate) fn check_update(&self, strategy: S, reward: f64) -> Result<()> {
        self.inner.check_update(strategy, reward)
    }

    /// Current belief for `(context, strategy)`; the prior if never updated.
    pub fn belief(&self, context: &C, strategy: S) -> BetaBelief {
        self.inner.belief(context, strategy)
    }

    /// Posterior mean for `(context, strategy)`.
    pub fn expected_value(&self, context: &C, strategy: S) -> f64 {
        self.belief(context, strategy).expected_value()
    }

    /// Contexts that have received at least one update, in order.
    pub fn contexts(&self) -> Vec<C> {
        self.inner
            .store()
            .iter()
            .map(|((c, _), _)| c.clone())
            .collect::<BTreeSet<C>>()
            .into_iter()
            .collect()
    }

    /// The strategy with the highest posterior mean for `context` (no sampling).
    ///
    /// Useful for reporting what the bandit currently believes; selection itself
    /// always samples.
    pub fn best_mean(&self, context: &C) -> S {
        let mut best: Option<(S, f64)> = None;
        for s in self.pool().iter() {
            let m = self.expected_value(context, s);
            if best.map_or(true, |(_, b)| m > b) {
                best = Some((s, m));
            }
        }
        match best {
            Some((s, _)) => s,
            None => unreachable!("empty strategy pool"),
        }
    }

    /// Forget everything learned.
    pub fn reset(&mut self) {
        self.inner.reset();
    }
}
