//! Property tests for the bandits and the safety gate.

use proptest::prelude::*;
use stratmux::{
    BanditConfig, BeliefPrior, ContextualBandit, ErrorKind, ExternalError, NonContextualBandit,
    Pool, SafetyGate,
};

fn arms(n: usize) -> Vec<u8> {
    (0..n as u8).collect()
}

// ---------------------------------------------------------------------------
// Property tests
// ---------------------------------------------------------------------------

proptest! {
    /// select always returns a pool member, for any context, seen or not.
    #[test]
    fn select_returns_pool_member(
        n_arms in 1usize..8,
        seed in any::<u64>(),
        contexts in proptest::collection::vec(any::<u16>(), 1..20),
    ) {
        let a = arms(n_arms);
        let cfg = BanditConfig::default().with_seed(seed);
        let mut b = ContextualBandit::new(Pool::new(a.clone()).unwrap(), cfg).unwrap();
        for ctx in &contexts {
            let s = b.select(ctx);
            prop_assert!(a.contains(&s));
        }
    }

    /// update adds exactly one unit of mass and keeps both weights positive.
    #[test]
    fn update_mass_is_exact(
        prior_s in 0.01f64..10.0,
        prior_f in 0.01f64..10.0,
        rewards in proptest::collection::vec(0.0f64..=1.0f64, 1..50),
    ) {
        let prior = BeliefPrior::new(prior_s, prior_f).unwrap();
        let mut b = NonContextualBandit::new(
            Pool::new(arms(2)).unwrap(),
            BanditConfig::default().with_prior(prior),
        ).unwrap();
        for r in rewards {
            let before = b.belief(0).mass();
            b.update(0, r).unwrap();
            let after = b.belief(0);
            prop_assert!((after.mass() - before - 1.0).abs() < 1e-9);
            prop_assert!(after.success > 0.0 && after.failure > 0.0);
        }
        prop_assert_eq!(b.belief(1).mass(), prior_s + prior_f);
    }

    /// Out-of-range rewards are contract violations and change nothing.
    #[test]
    fn out_of_range_rewards_are_rejected(
        bad in prop_oneof![
            1.0f64 + f64::EPSILON..1.0e6,
            -1.0e6f64..-f64::MIN_POSITIVE,
            Just(f64::NAN),
            Just(f64::INFINITY),
        ],
        ctx in any::<u8>(),
    ) {
        let pool = Pool::new(arms(3)).unwrap();
        let mut b = ContextualBandit::new(pool, BanditConfig::default()).unwrap();
        b.update(&ctx, 1, 0.5).unwrap();
        let before = b.belief(&ctx, 1);
        let e = b.update(&ctx, 1, bad).unwrap_err();
        prop_assert_eq!(e.kind(), ErrorKind::ContractViolation);
        prop_assert_eq!(b.belief(&ctx, 1), before);
        prop_assert_eq!(b.contexts(), vec![ctx]);
    }

    /// Same seed and call sequence → same choices.
    #[test]
    fn selection_is_reproducible(
        seed in any::<u64>(),
        rewards in proptest::collection::vec(0.0f64..=1.0f64, 0..40),
    ) {
        let pool = Pool::new(arms(4)).unwrap();
        let cfg = BanditConfig::default().with_seed(seed);
        let mut b1 = NonContextualBandit::new(pool.clone(), cfg).unwrap();
        let mut b2 = NonContextualBandit::new(pool, cfg).unwrap();
        for r in rewards {
            let s1 = b1.select();
            let s2 = b2.select();
            prop_assert_eq!(s1, s2);
            b1.update(s1, r).unwrap();
            b2.update(s2, r).unwrap();
        }
    }

    /// The gate allows iff confidence >= threshold.
    #[test]
    fn gate_allows_iff_confidence_meets_threshold(
        thresholds in proptest::collection::vec(0.0f64..=1.0f64, 1..6),
        confidence in 0.0f64..=1.0f64,
    ) {
        let pool = Pool::new(arms(thresholds.len())).unwrap();
        let gate = SafetyGate::new(
            &pool,
            thresholds.iter().enumerate().map(|(i, t)| (i as u8, *t)),
        ).unwrap();
        let src = move |_: &()| -> Result<f64, ExternalError> { Ok(confidence) };
        for (i, t) in thresholds.iter().enumerate() {
            let allowed = gate.allow(&src, &(), i as u8).unwrap();
            prop_assert_eq!(allowed, confidence >= *t);
            let d = gate.gate(&src, &(), i as u8, 0).unwrap();
            prop_assert_eq!(d.strategy, if allowed { i as u8 } else { 0 });
        }
    }
}

// ---------------------------------------------------------------------------
// Convergence
// ---------------------------------------------------------------------------

#[test]
fn deterministic_winner_exceeds_ninety_percent() {
    for seed in [1u64, 2, 3] {
        let mut b = ContextualBandit::new(
            Pool::new(["w", "l1", "l2", "l3"]).unwrap(),
            BanditConfig::default().with_seed(seed),
        )
        .unwrap();
        let n = 1_000;
        let mut wins = 0;
        for _ in 0..n {
            let s = b.select(&"fixed");
            let r = if s == "w" { 1.0 } else { 0.0 };
            wins += usize::from(s == "w");
            b.update(&"fixed", s, r).unwrap();
        }
        let share = wins as f64 / n as f64;
        assert!(share > 0.9, "seed={seed} share={share}");
    }
}

#[test]
fn duplicate_and_empty_pools_fail_at_construction() {
    assert_eq!(
        Pool::<u8>::new([]).unwrap_err().kind(),
        ErrorKind::Configuration
    );
    assert_eq!(
        Pool::new([1u8, 2, 1]).unwrap_err().kind(),
        ErrorKind::Configuration
    );
    let e = ContextualBandit::<u8, u8>::new(
        Pool::new([1u8]).unwrap(),
        BanditConfig::default().with_prior(BeliefPrior {
            success: 0.0,
            failure: 1.0,
        }),
    )
    .unwrap_err();
    assert_eq!(e.kind(), ErrorKind::Configuration);
}
