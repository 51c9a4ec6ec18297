//! Thread-safe contextual bandit for several concurrent control loops.
//!
//! Locking is scoped per context: an outer `RwLock` guards the context map (written
//! only when a context is seen for the first time), and each context has its own
//! `RwLock` over its beliefs. Selects on a context share its read lock; an update
//! takes its write lock, excluding other selects and updates on that context only.
//! Unrelated contexts never contend.
//!
//! Each call draws from its own RNG stream, derived from the configured seed and a
//! call counter, so no lock is needed for randomness.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, RwLock};

use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::debug;

use crate::error::check_reward;
use crate::thompson::sample_max;
use crate::{
    mix_seed, Arm, BanditConfig, BeliefPrior, BetaBelief, Context, Error, Pool, Result, Selection,
};

type Cell<S> = Arc<RwLock<BTreeMap<S, BetaBelief>>>;

/// Shared-reference counterpart of [`ContextualBandit`](crate::ContextualBandit).
///
/// All methods take `&self`; wrap it in an `Arc` to share across threads.
#[derive(Debug)]
pub struct SharedContextualBandit<C, S> {
    pool: Pool<S>,
    prior: BeliefPrior,
    seed: u64,
    calls: AtomicU64,
    cells: RwLock<BTreeMap<C, Cell<S>>>,
}

impl<C: Context, S: Arm> SharedContextualBandit<C, S> {
    pub fn new(pool: Pool<S>, cfg: BanditConfig) -> Result<Self> {
        cfg.prior.validate()?;
        Ok(Self {
            pool,
            prior: cfg.prior,
            seed: cfg.seed,
            calls: AtomicU64::new(0),
            cells: RwLock::new(BTreeMap::new()),
        })
    }

    pub fn pool(&self) -> &Pool<S> {
        &self.pool
    }

    fn cell(&self, context: &C) -> Result<Option<Cell<S>>> {
        let map = self.cells.read().map_err(|_| Error::LockPoisoned)?;
        Ok(map.get(context).cloned())
    }

    fn cell_or_insert(&self, context: &C) -> Result<Cell<S>> {
        if let Some(cell) = self.cell(context)? {
            return Ok(cell);
        }
        let mut map = self.cells.write().map_err(|_| Error::LockPoisoned)?;
        Ok(map.entry(context.clone()).or_default().clone())
    }

    fn rng(&self) -> StdRng {
        let n = self.calls.fetch_add(1, Ordering::Relaxed);
        StdRng::seed_from_u64(mix_seed(self.seed, n))
    }

    /// Thompson draw for `context`, with every sampled value.
    pub fn select_explain(&self, context: &C) -> Result<Selection<S>> {
        let mut rng = self.rng();
        let prior = self.prior.belief();
        let sel = match self.cell(context)? {
            Some(cell) => {
                let beliefs = cell.read().map_err(|_| Error::LockPoisoned)?;
                sample_max(
                    self.pool
                        .iter()
                        .map(|s| (s, beliefs.get(&s).copied().unwrap_or(prior))),
                    &mut rng,
                )
            }
            None => sample_max(self.pool.iter().map(|s| (s, prior)), &mut rng),
        };
        match sel {
            Some(sel) => {
                debug!(context = ?context, chosen = ?sel.chosen, "shared select");
                Ok(sel)
            }
            None => unreachable!("empty strategy pool"),
        }
    }

    pub fn select(&self, context: &C) -> Result<S> {
        self.select_explain(context).map(|s| s.chosen)
    }

    /// Same contract as [`ContextualBandit::update`](crate::ContextualBandit::update).
    pub fn update(&self, context: &C, strategy: S, reward: f64) -> Result<()> {
        self.pool.require(strategy)?;
        check_reward(reward)?;
        let cell = self.cell_or_insert(context)?;
        let mut beliefs = cell.write().map_err(|_| Error::LockPoisoned)?;
        let prior = self.prior;
        beliefs
            .entry(strategy)
            .or_insert_with(|| prior.belief())
            .observe(reward)?;
        debug!(context = ?context, strategy = ?strategy, reward, "shared update");
        Ok(())
    }

    pub fn belief(&self, context: &C, strategy: S) -> Result<BetaBelief> {
        let Some(cell) = self.cell(context)? else {
            return Ok(self.prior.belief());
        };
        let beliefs = cell.read().map_err(|_| Error::LockPoisoned)?;
        Ok(beliefs
            .get(&strategy)
            .copied()
            .unwrap_or_else(|| self.prior.belief()))
    }

    /// Contexts with materialized beliefs, in order.
    pub fn contexts(&self) -> Result<Vec<C>> {
        let map = self.cells.read().map_err(|_| Error::LockPoisoned)?;
        Ok(map.keys().cloned().collect())
    }
}
