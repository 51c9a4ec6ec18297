//! Strategy pools and the closed enumerations used by the decision cycle.
//!
//! Bandits are generic over any [`Arm`] and any [`Context`]; the concrete enums here
//! ([`Correction`], [`Mitigation`], [`Regime`]) cover the error-correction use case.
//! A [`Pool`] is validated once, at construction, so pool-membership mistakes show
//! up as configuration errors instead of surprises at selection time.

use std::collections::BTreeSet;
use std::fmt;
use std::hash::Hash;

use crate::{Error, Result};

/// A strategy identifier a bandit can choose.
///
/// Blanket-implemented: any small `Copy + Ord + Hash + Debug` type works, including
/// field-less enums and `&'static str`.
pub trait Arm: Copy + Ord + Hash + fmt::Debug {}

impl<T: Copy + Ord + Hash + fmt::Debug> Arm for T {}

/// An operating-regime label used to partition contextual beliefs.
///
/// Opaque to the bandits: it is only compared, hashed and cloned.
pub trait Context: Clone + Ord + Hash + fmt::Debug {}

impl<T: Clone + Ord + Hash + fmt::Debug> Context for T {}

/// A non-empty, duplicate-free, ordered set of strategies.
///
/// Order matters: it is the tie-break order for selection.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(
        try_from = "Vec<S>",
        into = "Vec<S>",
        bound(
            serialize = "S: Arm + serde::Serialize",
            deserialize = "S: Arm + serde::Deserialize<'de>"
        )
    )
)]
pub struct Pool<S> {
    arms: Vec<S>,
}

impl<S: Arm> TryFrom<Vec<S>> for Pool<S> {
    type Error = Error;

    fn try_from(arms: Vec<S>) -> Result<Self> {
        Self::new(arms)
    }
}

impl<S> From<Pool<S>> for Vec<S> {
    fn from(pool: Pool<S>) -> Self {
        pool.arms
    }
}

impl<S: Arm> Pool<S> {
    /// Build a pool, rejecting empty input and duplicates.
    pub fn new(arms: impl IntoIterator<Item = S>) -> Result<Self> {
        let arms: Vec<S> = arms.into_iter().collect();
        if arms.is_empty() {
            return Err(Error::EmptyPool);
        }
        let mut seen = BTreeSet::new();
        for a in &arms {
            if !seen.insert(*a) {
                return Err(Error::DuplicateStrategy {
                    strategy: format!("{a:?}"),
                });
            }
        }
        Ok(Self { arms })
    }

    pub fn as_slice(&self) -> &[S] {
        &self.arms
    }

    pub fn iter(&self) -> impl Iterator<Item = S> + '_ {
        self.arms.iter().copied()
    }

    pub fn contains(&self, arm: S) -> bool {
        self.arms.contains(&arm)
    }

    pub fn len(&self) -> usize {
        self.arms.len()
    }

    /// Always `false`; kept for API symmetry with `len`.
    pub fn is_empty(&self) -> bool {
        self.arms.is_empty()
    }

    pub(crate) fn require(&self, arm: S) -> Result<()> {
        if self.contains(arm) {
            Ok(())
        } else {
            Err(Error::UnknownStrategy {
                strategy: format!("{arm:?}"),
            })
        }
    }
}

/// Runtime error-correction strategies, strongest first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "kebab-case")
)]
pub enum Correction {
    Full,
    Light,
    NoAction,
}

impl Correction {
    pub const ALL: [Correction; 3] = [Correction::Full, Correction::Light, Correction::NoAction];

    pub fn name(self) -> &'static str {
        match self {
            Correction::Full => "full-correction",
            Correction::Light => "light-correction",
            Correction::NoAction => "no-action",
        }
    }
}

impl fmt::Display for Correction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Post-processing (error-mitigation) techniques.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "kebab-case")
)]
pub enum Mitigation {
    /// Zero-noise extrapolation.
    Zne,
    /// Probabilistic error cancellation.
    Pec,
    /// Measurement-error mitigation.
    Mem,
    None,
}

impl Mitigation {
    pub const ALL: [Mitigation; 4] = [
        Mitigation::Zne,
        Mitigation::Pec,
        Mitigation::Mem,
        Mitigation::None,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Mitigation::Zne => "zne",
            Mitigation::Pec => "pec",
            Mitigation::Mem => "mem",
            Mitigation::None => "none",
        }
    }
}

impl fmt::Display for Mitigation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Observed operating regime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "kebab-case")
)]
pub enum Regime {
    Idle,
    CoherentNoise,
    ReadoutError,
}

impl Regime {
    pub const ALL: [Regime; 3] = [Regime::Idle, Regime::CoherentNoise, Regime::ReadoutError];

    pub fn name(self) -> &'static str {
        match self {
            Regime::Idle => "idle",
            Regime::CoherentNoise => "coherent-noise",
            Regime::ReadoutError => "readout-error",
        }
    }
}

impl fmt::Display for Regime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
