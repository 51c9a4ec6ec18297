//! One decision round, end to end.
//!
//! [`DecisionCycle`] owns both learners, the safety gate and the external
//! collaborators, and walks a fixed sequence of phases:
//!
//! ```text
//! AwaitContext → Select → Gate → Execute → UpdatePrimary
//!     → SelectMitigation → ApplyMitigation → UpdateSecondary → Done
//! ```
//!
//! Only the two belief stores carry over between cycles; that carry-over is what
//! lets one cycle's reward shape the next cycle's draw.
//!
//! ## Atomicity
//!
//! A cycle either completes (both updates applied) or fails with neither applied.
//! The update phases validate their update and stage it; both staged updates are
//! committed together once the mitigation reward is in hand. A failing collaborator
//! anywhere in the cycle therefore leaves learned state exactly as it was. Missing
//! data is never recorded as a zero reward.
//!
//! The bandits' RNG streams do advance on an aborted cycle (the draws happened);
//! only belief state is protected.

use tracing::{debug, debug_span, warn};

use crate::error::check_unit;
use crate::{
    Arm, Context, ContextualBandit, CycleRecord, Error, ExternalError, NonContextualBandit,
    Result, SafetyGate,
};
use crate::gate::ConfidenceSource;

/// External strategy execution: runs `strategy` under `context` and reports a reward.
pub trait Executor<C, S> {
    /// Observed reward in `[0, 1]`.
    fn execute(&mut self, strategy: S, context: &C) -> Result<f64, ExternalError>;
}

/// External post-processing model.
pub trait MitigationModel<M> {
    /// Reward after applying `mitigation` to a run that scored `base_reward`.
    ///
    /// Must be in `[0, 1]` and nondecreasing in `base_reward`.
    fn mitigation_gain(&self, mitigation: M, base_reward: f64) -> Result<f64, ExternalError>;
}

/// External context acquisition.
pub trait ContextSource<C> {
    fn next_context(&mut self) -> Result<C, ExternalError>;
}

/// Phases of a decision cycle, in order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum CyclePhase {
    AwaitContext,
    Select,
    Gate,
    Execute,
    UpdatePrimary,
    SelectMitigation,
    ApplyMitigation,
    UpdateSecondary,
    Done,
}

/// Orchestrates select → gate → execute → learn for both strategy pools.
///
/// Type parameters: context `C`, primary strategy `S`, mitigation `M`, forecaster `F`,
/// executor `E`, mitigation model `G`.
#[derive(Debug)]
pub struct DecisionCycle<C, S, M, F, E, G> {
    primary: ContextualBandit<C, S>,
    secondary: NonContextualBandit<M>,
    gate: SafetyGate<S>,
    fallback: S,
    forecaster: F,
    executor: E,
    gain: G,
    completed: u64,
}

impl<C, S, M, F, E, G> DecisionCycle<C, S, M, F, E, G>
where
    C: Context,
    S: Arm,
    M: Arm,
    F: ConfidenceSource<C>,
    E: Executor<C, S>,
    G: MitigationModel<M>,
{
    /// Assemble a cycle.
    ///
    /// `fallback` must be a member of the primary pool, and `gate` must carry a
    /// threshold for every primary strategy.
    pub fn new(
        primary: ContextualBandit<C, S>,
        secondary: NonContextualBandit<M>,
        gate: SafetyGate<S>,
        fallback: S,
        forecaster: F,
        executor: E,
        gain: G,
    ) -> Result<Self> {
        if !primary.pool().contains(fallback) {
            return Err(Error::FallbackNotInPool {
                strategy: format!("{fallback:?}"),
            });
        }
        for s in primary.pool().iter() {
            if gate.threshold(s).is_err() {
                return Err(Error::MissingThreshold {
                    strategy: format!("{s:?}"),
                });
            }
        }
        Ok(Self {
            primary,
            secondary,
            gate,
            fallback,
            forecaster,
            executor,
            gain,
            completed: 0,
        })
    }

    /// Pull a context from `source`, then [`run`](Self::run) it.
    pub fn run_next<Src>(&mut self, source: &mut Src) -> Result<CycleRecord<C, S, M>>
    where
        Src: ContextSource<C> + ?Sized,
    {
        debug!(phase = ?CyclePhase::AwaitContext);
        let context = source
            .next_context()
            .map_err(|e| abort(CyclePhase::AwaitContext, e.into()))?;
        self.run(context)
    }

    /// Run one full cycle for `context`.
    pub fn run(&mut self, context: C) -> Result<CycleRecord<C, S, M>> {
        let _span =
            debug_span!("decision_cycle", cycle = self.completed, context = ?context).entered();

        debug!(phase = ?CyclePhase::Select);
        let sampled = self.primary.select(&context);

        debug!(phase = ?CyclePhase::Gate, sampled = ?sampled);
        let decision = self
            .gate
            .gate(&self.forecaster, &context, sampled, self.fallback)
            .map_err(|e| abort(CyclePhase::Gate, e))?;
        let strategy = decision.strategy;

        debug!(phase = ?CyclePhase::Execute, strategy = ?strategy);
        let reward = self
            .executor
            .execute(strategy, &context)
            .and_then(|r| check_unit("executor", r))
            .map_err(|e| abort(CyclePhase::Execute, e.into()))?;

        // Staged: validated now, applied after the mitigation half succeeds.
        debug!(phase = ?CyclePhase::UpdatePrimary, reward);
        self.primary
            .check_update(strategy, reward)
            .map_err(|e| abort(CyclePhase::UpdatePrimary, e))?;

        debug!(phase = ?CyclePhase::SelectMitigation);
        let mitigation = self.secondary.select();

        debug!(phase = ?CyclePhase::ApplyMitigation, mitigation = ?mitigation);
        let final_reward = self
            .gain
            .mitigation_gain(mitigation, reward)
            .and_then(|r| check_unit("mitigation model", r))
            .map_err(|e| abort(CyclePhase::ApplyMitigation, e.into()))?;

        debug!(phase = ?CyclePhase::UpdateSecondary, final_reward);
        self.secondary
            .check_update(mitigation, final_reward)
            .map_err(|e| abort(CyclePhase::UpdateSecondary, e))?;

        self.primary.update(&context, strategy, reward)?;
        self.secondary.update(mitigation, final_reward)?;
        self.completed += 1;

        debug!(phase = ?CyclePhase::Done);
        Ok(CycleRecord {
            context,
            sampled,
            strategy,
            gated: decision.substituted,
            confidence: decision.confidence,
            reward,
            mitigation,
            final_reward,
        })
    }

    pub fn primary(&self) -> &ContextualBandit<C, S> {
        &self.primary
    }

    pub fn secondary(&self) -> &NonContextualBandit<M> {
        &self.secondary
    }

    pub fn gate(&self) -> &SafetyGate<S> {
        &self.gate
    }

    pub fn fallback(&self) -> S {
        self.fallback
    }

    pub fn executor(&self) -> &E {
        &self.executor
    }

    pub fn executor_mut(&mut self) -> &mut E {
        &mut self.executor
    }

    /// Number of cycles that ran to completion.
    pub fn completed(&self) -> u64 {
        self.completed
    }
}

fn abort(phase: CyclePhase, error: Error) -> Error {
    warn!(phase = ?phase, error = %error, "decision cycle aborted; beliefs unchanged");
    error
}
