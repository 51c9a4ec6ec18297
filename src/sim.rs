//! Table-driven reference collaborators.
//!
//! Deterministic stand-ins for the forecaster, executor, mitigation model and context
//! feed. They are lookup tables, not physical models: useful for wiring a
//! [`DecisionCycle`] end to end in tests, benchmarks and dry runs.
//!
//! | regime         | confidence | base noise |
//! |----------------|-----------:|-----------:|
//! | idle           | 0.90       | 0.05       |
//! | coherent-noise | 0.60       | 0.15       |
//! | readout-error  | 0.40       | 0.25       |
//!
//! Correction scales the base noise by a suppression factor (full 0.3, light 0.6,
//! no-action 1.0); the executor's reward is `1 - noise`. Mitigation adds a fixed gain
//! (ZNE 0.03, PEC 0.05, MEM 0.02, none 0.0), capped at 1.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::cycle::{ContextSource, Executor, MitigationModel};
use crate::gate::ConfidenceSource;
use crate::{
    BanditConfig, ContextualBandit, Correction, DecisionCycle, ExternalError, Mitigation,
    NonContextualBandit, Pool, Regime, Result, SafetyGate,
};

/// Forecast for one regime.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct NoiseForecast {
    pub confidence: f64,
    pub expected_noise: f64,
}

/// Per-regime confidence table.
#[derive(Debug, Clone, Copy, Default)]
pub struct RegimeForecaster;

impl RegimeForecaster {
    pub fn forecast(&self, regime: Regime) -> NoiseForecast {
        let (confidence, expected_noise) = match regime {
            Regime::Idle => (0.9, 0.05),
            Regime::CoherentNoise => (0.6, 0.15),
            Regime::ReadoutError => (0.4, 0.25),
        };
        NoiseForecast {
            confidence,
            expected_noise,
        }
    }
}

impl ConfidenceSource<Regime> for RegimeForecaster {
    fn confidence(&self, context: &Regime) -> Result<f64, ExternalError> {
        Ok(self.forecast(*context).confidence)
    }
}

/// Toy fidelity model: `1 - base_noise(regime) * suppression(strategy)`.
#[derive(Debug, Clone, Default)]
pub struct ToyFidelityExecutor {
    runs: u64,
}

impl ToyFidelityExecutor {
    pub fn base_noise(regime: Regime) -> f64 {
        RegimeForecaster.forecast(regime).expected_noise
    }

    pub fn suppression(strategy: Correction) -> f64 {
        match strategy {
            Correction::Full => 0.3,
            Correction::Light => 0.6,
            Correction::NoAction => 1.0,
        }
    }

    pub fn fidelity(strategy: Correction, regime: Regime) -> f64 {
        1.0 - Self::base_noise(regime) * Self::suppression(strategy)
    }

    /// Number of executions so far.
    pub fn runs(&self) -> u64 {
        self.runs
    }
}

impl Executor<Regime, Correction> for ToyFidelityExecutor {
    fn execute(&mut self, strategy: Correction, context: &Regime) -> Result<f64, ExternalError> {
        self.runs += 1;
        Ok(Self::fidelity(strategy, *context))
    }
}

/// Fixed additive gain per mitigation technique.
#[derive(Debug, Clone, Copy, Default)]
pub struct FixedGainMitigation;

impl FixedGainMitigation {
    pub fn gain(mitigation: Mitigation) -> f64 {
        match mitigation {
            Mitigation::Zne => 0.03,
            Mitigation::Pec => 0.05,
            Mitigation::Mem => 0.02,
            Mitigation::None => 0.0,
        }
    }
}

impl MitigationModel<Mitigation> for FixedGainMitigation {
    fn mitigation_gain(
        &self,
        mitigation: Mitigation,
        base_reward: f64,
    ) -> Result<f64, ExternalError> {
        Ok((base_reward + Self::gain(mitigation)).min(1.0))
    }
}

/// Seeded uniform draw over [`Regime::ALL`].
#[derive(Debug, Clone)]
pub struct UniformRegimeSource {
    rng: StdRng,
}

impl UniformRegimeSource {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }
}

impl ContextSource<Regime> for UniformRegimeSource {
    fn next_context(&mut self) -> Result<Regime, ExternalError> {
        let i = self.rng.random_range(0..Regime::ALL.len());
        Ok(Regime::ALL[i])
    }
}

/// Default per-strategy minimum confidence: full 0.5, light 0.2, no-action 0.0.
pub fn default_thresholds() -> [(Correction, f64); 3] {
    [
        (Correction::Full, 0.5),
        (Correction::Light, 0.2),
        (Correction::NoAction, 0.0),
    ]
}

/// The reference cycle.
pub type ReferenceCycle = DecisionCycle<
    Regime,
    Correction,
    Mitigation,
    RegimeForecaster,
    ToyFidelityExecutor,
    FixedGainMitigation,
>;

/// A fully wired cycle over the reference collaborators.
///
/// Both bandits derive their seed from `seed` (the mitigation bandit uses `seed + 1`).
pub fn reference_cycle(seed: u64) -> Result<ReferenceCycle> {
    let pool = Pool::new(Correction::ALL)?;
    let gate = SafetyGate::new(&pool, default_thresholds())?;
    DecisionCycle::new(
        ContextualBandit::new(pool, BanditConfig::default().with_seed(seed))?,
        NonContextualBandit::new(
            Pool::new(Mitigation::ALL)?,
            BanditConfig::default().with_seed(seed.wrapping_add(1)),
        )?,
        gate,
        Correction::NoAction,
        RegimeForecaster,
        ToyFidelityExecutor::default(),
        FixedGainMitigation,
    )
}
