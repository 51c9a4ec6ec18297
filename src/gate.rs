//! Confidence safety gate.
//!
//! A hard, non-learned override placed between the bandit's choice and execution.
//! Each strategy carries a minimum confidence; when the forecaster's confidence for
//! the current context falls below it, the designated fallback runs instead. The
//! gate holds no mutable state: the only side effect of a check is the confidence
//! query.

use std::collections::BTreeMap;

use tracing::warn;

use crate::error::check_unit;
use crate::{Arm, Error, ExternalError, Pool, Result};

/// External forecaster: how far the current telemetry can be trusted for `context`.
pub trait ConfidenceSource<C> {
    /// Confidence in `[0, 1]`. Values outside that range are treated as a collaborator failure.
    fn confidence(&self, context: &C) -> Result<f64, ExternalError>;
}

impl<C, F> ConfidenceSource<C> for F
where
    F: Fn(&C) -> Result<f64, ExternalError>,
{
    fn confidence(&self, context: &C) -> Result<f64, ExternalError> {
        self(context)
    }
}

/// Output of [`SafetyGate::gate`].
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GateDecision<S> {
    /// The strategy to execute.
    pub strategy: S,
    /// Whether `strategy` is the fallback substituted for the requested one.
    pub substituted: bool,
    /// Confidence reported for the context.
    pub confidence: f64,
    /// Threshold the requested strategy had to meet.
    pub threshold: f64,
}

/// Per-strategy minimum confidence.
///
/// A strategy is allowed iff `confidence(context) >= threshold[strategy]` (equality
/// allows).
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct SafetyGate<S> {
    thresholds: BTreeMap<S, f64>,
}

impl<S: Arm> SafetyGate<S> {
    /// Build a gate covering every strategy in `pool`.
    ///
    /// Fails if any pool member lacks a threshold or a threshold is not a finite value
    /// in `[0, 1]`. Extra entries for strategies outside the pool are ignored.
    pub fn new(pool: &Pool<S>, thresholds: impl IntoIterator<Item = (S, f64)>) -> Result<Self> {
        let given: BTreeMap<S, f64> = thresholds.into_iter().collect();
        let mut kept = BTreeMap::new();
        for s in pool.iter() {
            let Some(&t) = given.get(&s) else {
                return Err(Error::MissingThreshold {
                    strategy: format!("{s:?}"),
                });
            };
            if !(t.is_finite() && (0.0..=1.0).contains(&t)) {
                return Err(Error::InvalidThreshold {
                    strategy: format!("{s:?}"),
                    value: t,
                });
            }
            kept.insert(s, t);
        }
        Ok(Self { thresholds: kept })
    }

    /// Configured threshold for `strategy`.
    pub fn threshold(&self, strategy: S) -> Result<f64> {
        self.thresholds
            .get(&strategy)
            .copied()
            .ok_or_else(|| Error::UnknownStrategy {
                strategy: format!("{strategy:?}"),
            })
    }

    pub fn thresholds(&self) -> &BTreeMap<S, f64> {
        &self.thresholds
    }

    /// Whether `strategy` may run in `context`.
    pub fn allow<C, F>(&self, source: &F, context: &C, strategy: S) -> Result<bool>
    where
        F: ConfidenceSource<C> + ?Sized,
    {
        let threshold = self.threshold(strategy)?;
        let confidence = check_unit("confidence source", source.confidence(context)?)?;
        Ok(confidence >= threshold)
    }

    /// Return `strategy` if allowed, otherwise `fallback`.
    ///
    /// The fallback is not itself checked against its threshold: it is the designated
    /// safe default.
    pub fn gate<C, F>(
        &self,
        source: &F,
        context: &C,
        strategy: S,
        fallback: S,
    ) -> Result<GateDecision<S>>
    where
        C: std::fmt::Debug,
        F: ConfidenceSource<C> + ?Sized,
    {
        let threshold = self.threshold(strategy)?;
        let confidence = check_unit("confidence source", source.confidence(context)?)?;
        if confidence >= threshold {
            return Ok(GateDecision {
                strategy,
                substituted: false,
                confidence,
                threshold,
            });
        }
        warn!(
            context = ?context,
            requested = ?strategy,
            fallback = ?fallback,
            confidence,
            threshold,
            "safety gate substituted fallback"
        );
        Ok(GateDecision {
            strategy: fallback,
            substituted: true,
            confidence,
            threshold,
        })
    }
}
