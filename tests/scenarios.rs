//! End-to-end decision-cycle scenarios.

use stratmux::{
    BanditConfig, ContextualBandit, DecisionCycle, ErrorKind, Executor, ExternalError,
    MitigationModel, NonContextualBandit, Pool, SafetyGate,
};
use tracing_subscriber::EnvFilter;

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// Fixed reward per strategy.
struct FixedRewards {
    a: f64,
    b: f64,
    log: Vec<&'static str>,
}

impl Executor<&'static str, &'static str> for FixedRewards {
    fn execute(
        &mut self,
        strategy: &'static str,
        _: &&'static str,
    ) -> Result<f64, ExternalError> {
        self.log.push(strategy);
        Ok(if strategy == "A" { self.a } else { self.b })
    }
}

struct Passthrough;

impl MitigationModel<&'static str> for Passthrough {
    fn mitigation_gain(&self, _: &'static str, base: f64) -> Result<f64, ExternalError> {
        Ok(base)
    }
}

type Confidence = Box<dyn Fn(&&'static str) -> Result<f64, ExternalError>>;

fn constant(v: f64) -> Confidence {
    Box::new(move |_: &&'static str| -> Result<f64, ExternalError> { Ok(v) })
}

fn two_arm_cycle(
    seed: u64,
    threshold_a: f64,
    confidence: Confidence,
    rewards: FixedRewards,
) -> DecisionCycle<&'static str, &'static str, &'static str, Confidence, FixedRewards, Passthrough>
{
    let pool = Pool::new(["A", "B"]).unwrap();
    let gate = SafetyGate::new(&pool, [("A", threshold_a), ("B", 0.0)]).unwrap();
    DecisionCycle::new(
        ContextualBandit::new(pool, BanditConfig::default().with_seed(seed)).unwrap(),
        NonContextualBandit::new(
            Pool::new(["none"]).unwrap(),
            BanditConfig::default().with_seed(seed ^ 1),
        )
        .unwrap(),
        gate,
        "B",
        confidence,
        rewards,
        Passthrough,
    )
    .unwrap()
}

#[test]
fn better_strategy_dominates_after_200_cycles() {
    init_tracing();
    for seed in 0..5u64 {
        let mut cycle = two_arm_cycle(
            seed,
            0.0,
            constant(1.0),
            FixedRewards {
                a: 0.9,
                b: 0.1,
                log: Vec::new(),
            },
        );
        for _ in 0..200 {
            cycle.run("ctx").unwrap();
        }
        let log = &cycle.executor().log;
        assert_eq!(log.len(), 200);
        let share = log.iter().filter(|s| **s == "A").count() as f64 / log.len() as f64;
        assert!(share >= 0.85, "seed={seed} share={share}");
    }
}

#[test]
fn low_confidence_forces_fallback_every_cycle() {
    init_tracing();
    let mut cycle = two_arm_cycle(
        3,
        0.5,
        constant(0.3),
        FixedRewards {
            a: 0.9,
            b: 0.1,
            log: Vec::new(),
        },
    );
    let mut sampled_a = 0;
    for _ in 0..100 {
        let rec = cycle.run("ctx").unwrap();
        if rec.sampled == "A" {
            sampled_a += 1;
            assert!(rec.gated);
        }
        assert_eq!(rec.strategy, "B");
    }
    assert!(cycle.executor().log.iter().all(|s| *s == "B"));

    // Executor state is reachable between cycles; the learned beliefs are not reset.
    cycle.executor_mut().log.clear();
    cycle.run("ctx").unwrap();
    assert_eq!(cycle.executor().log, vec!["B"]);
    assert_eq!(cycle.primary().belief(&"ctx", "B").observations, 101);
    // The bandit learned only from what ran.
    assert_eq!(cycle.primary().belief(&"ctx", "A").observations, 0);
    assert_eq!(cycle.primary().belief(&"ctx", "B").observations, 100);
    // With A never updated its prior stays wide, so it keeps getting sampled.
    assert!(sampled_a > 0);
}

#[test]
fn confidence_at_threshold_allows_strategy() {
    let mut cycle = two_arm_cycle(
        0,
        0.5,
        constant(0.5),
        FixedRewards {
            a: 1.0,
            b: 0.0,
            log: Vec::new(),
        },
    );
    for _ in 0..50 {
        let rec = cycle.run("ctx").unwrap();
        assert!(!rec.gated);
        assert_eq!(rec.sampled, rec.strategy);
    }
}

#[test]
fn forecaster_failure_aborts_without_learning() {
    init_tracing();
    let mut cycle = two_arm_cycle(
        0,
        0.5,
        Box::new(|_: &&'static str| -> Result<f64, ExternalError> {
            Err(ExternalError::failed("forecaster", "no telemetry"))
        }),
        FixedRewards {
            a: 1.0,
            b: 0.0,
            log: Vec::new(),
        },
    );
    for _ in 0..10 {
        let e = cycle.run("ctx").unwrap_err();
        assert_eq!(e.kind(), ErrorKind::ExternalFailure);
    }
    assert!(cycle.executor().log.is_empty());
    assert!(cycle.primary().contexts().is_empty());
    assert_eq!(cycle.secondary().belief("none").observations, 0);
    assert_eq!(cycle.completed(), 0);
}

#[test]
fn contexts_learn_independently() {
    struct ByContext;

    impl Executor<&'static str, &'static str> for ByContext {
        fn execute(&mut self, s: &'static str, ctx: &&'static str) -> Result<f64, ExternalError> {
            // "A" wins in "hot", "B" wins in "cold".
            Ok(match (*ctx, s) {
                ("hot", "A") | ("cold", "B") => 1.0,
                _ => 0.0,
            })
        }
    }

    let pool = Pool::new(["A", "B"]).unwrap();
    let gate = SafetyGate::new(&pool, [("A", 0.0), ("B", 0.0)]).unwrap();
    let always = |_: &&'static str| -> Result<f64, ExternalError> { Ok(1.0) };
    let mut cycle = DecisionCycle::new(
        ContextualBandit::new(pool, BanditConfig::default().with_seed(17)).unwrap(),
        NonContextualBandit::new(Pool::new(["none"]).unwrap(), BanditConfig::default()).unwrap(),
        gate,
        "B",
        always,
        ByContext,
        Passthrough,
    )
    .unwrap();

    for t in 0..400 {
        let ctx = if t % 2 == 0 { "hot" } else { "cold" };
        cycle.run(ctx).unwrap();
    }
    assert_eq!(cycle.primary().best_mean(&"hot"), "A");
    assert_eq!(cycle.primary().best_mean(&"cold"), "B");
    assert_eq!(cycle.primary().contexts(), vec!["cold", "hot"]);
}

#[cfg(feature = "serde")]
#[test]
fn cycle_record_serializes_with_kebab_case_names() {
    let mut cycle = stratmux::sim::reference_cycle(1).unwrap();
    let rec = cycle.run(stratmux::Regime::CoherentNoise).unwrap();
    let v = serde_json::to_value(&rec).unwrap();
    assert_eq!(v["context"], "coherent-noise");
}
