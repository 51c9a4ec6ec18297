//! Audit records for policy output.
//!
//! A [`Selection`] captures what a Thompson draw saw, so a caller can log or replay
//! why an arm won. [`CycleRecord`] is the end-of-cycle tuple produced by
//! [`DecisionCycle`](crate::DecisionCycle).

/// Outcome of one Thompson draw over a pool.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Selection<S> {
    /// The arm with the largest sample (first in pool order on ties).
    pub chosen: S,
    /// One `(arm, sample)` pair per pool member, in pool order.
    pub samples: Vec<(S, f64)>,
}

impl<S: PartialEq> Selection<S> {
    /// The sample drawn for `arm`, if it was part of the draw.
    pub fn sample_for(&self, arm: &S) -> Option<f64> {
        self.samples
            .iter()
            .find(|(a, _)| a == arm)
            .map(|&(_, x)| x)
    }
}

/// Everything one completed decision cycle did.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CycleRecord<C, S, M> {
    pub context: C,
    /// The strategy the contextual bandit sampled.
    pub sampled: S,
    /// The strategy that actually ran (the fallback when `gated` is true).
    pub strategy: S,
    /// Whether the safety gate substituted the fallback.
    pub gated: bool,
    /// Forecaster confidence for `context`.
    pub confidence: f64,
    /// Reward observed for `strategy`.
    pub reward: f64,
    pub mitigation: M,
    /// Reward after applying `mitigation`.
    pub final_reward: f64,
}
