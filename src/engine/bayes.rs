//! Bayes' rule over a single binary hypothesis.
//!
//! P(E)   = P(E|H)·P(H) + P(E|¬H)·(1 − P(H))
//! P(H|E) = P(E|H)·P(H) / P(E)
//!
//! When P(E) = 0 the evidence can never be observed, so it carries no
//! information: the posterior is defined as the prior. This keeps every
//! derived value finite and inside [0, 1].

use crate::types::{ProbabilityField, ProbabilityRecord};

/// P(E) from the three inputs.
pub fn marginal(prior: f64, likelihood: f64, alt_likelihood: f64) -> f64 {
    likelihood * prior + alt_likelihood * (1.0 - prior)
}

/// P(H|E) given an already computed marginal.
pub fn posterior(prior: f64, likelihood: f64, marginal: f64) -> f64 {
    if marginal > 0.0 {
        likelihood * prior / marginal
    } else {
        prior
    }
}

/// Replace one input and re-derive marginal and posterior.
///
/// The other two inputs and all rationale text are carried over unchanged.
/// `new_value` is clamped into [0, 1] (NaN becomes 0). Calling this twice with
/// the same arguments yields the same record as calling it once.
pub fn recompute(
    record: &ProbabilityRecord,
    field: ProbabilityField,
    new_value: f64,
) -> ProbabilityRecord {
    record.with_input(field, new_value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Rationale;
    use proptest::prelude::*;

    fn record(prior: f64, likelihood: f64, alt: f64) -> ProbabilityRecord {
        ProbabilityRecord::new(prior, likelihood, alt, Rationale::default()).unwrap()
    }

    #[test]
    fn test_drag_prior_scenario() {
        let base = record(0.3, 0.8, 0.1);
        let edited = recompute(&base, ProbabilityField::Prior, 0.6);

        assert_eq!(edited.prior(), 0.6);
        assert_eq!(edited.likelihood(), 0.8);
        assert_eq!(edited.alt_likelihood(), 0.1);
        assert!((edited.marginal() - 0.52).abs() < 1e-12);
        assert!((edited.posterior() - 0.48 / 0.52).abs() < 1e-12);
        assert!((edited.posterior() - 0.923).abs() < 1e-3);
    }

    #[test]
    fn test_zero_marginal_posterior_is_prior() {
        let r = record(0.4, 0.0, 0.0);
        assert_eq!(r.marginal(), 0.0);
        assert_eq!(r.posterior(), 0.4);

        // P(H) = 1 and P(E|H) = 0 also zeroes the marginal
        let r = record(1.0, 0.0, 0.7);
        assert_eq!(r.marginal(), 0.0);
        assert_eq!(r.posterior(), 1.0);
    }

    #[test]
    fn test_recompute_keeps_rationale() {
        let base = ProbabilityRecord::new(0.3, 0.8, 0.1, Rationale {
            likelihood_reasoning: "shy people are often librarians".into(),
            ..Default::default()
        })
        .unwrap();
        let edited = recompute(&base, ProbabilityField::Likelihood, 0.2);
        assert_eq!(edited.rationale(), base.rationale());
        assert_eq!(edited.likelihood(), 0.2);
    }

    #[test]
    fn test_recompute_clamps_and_sanitizes() {
        let base = record(0.3, 0.8, 0.1);
        assert_eq!(recompute(&base, ProbabilityField::Prior, 1.5).prior(), 1.0);
        assert_eq!(recompute(&base, ProbabilityField::AltLikelihood, -0.2).alt_likelihood(), 0.0);
        assert_eq!(recompute(&base, ProbabilityField::Likelihood, f64::NAN).likelihood(), 0.0);
    }

    fn field_strategy() -> impl Strategy<Value = ProbabilityField> {
        prop_oneof![
            Just(ProbabilityField::Prior),
            Just(ProbabilityField::Likelihood),
            Just(ProbabilityField::AltLikelihood),
        ]
    }

    proptest! {
        #[test]
        fn prop_posterior_matches_formula(
            prior in 0.0f64..=1.0,
            likelihood in 0.0f64..=1.0,
            alt in 0.0f64..=1.0,
        ) {
            let r = record(prior, likelihood, alt);
            let expected_marginal = likelihood * prior + alt * (1.0 - prior);
            prop_assert_eq!(r.marginal(), expected_marginal);
            if r.marginal() > 0.0 {
                prop_assert_eq!(r.posterior(), likelihood * prior / expected_marginal);
            }
            prop_assert!(r.posterior().is_finite());
            prop_assert!((0.0..=1.0).contains(&r.posterior()));
            prop_assert!(r.marginal() >= 0.0 && r.marginal() <= 1.0 + 1e-12);
        }

        #[test]
        fn prop_recompute_idempotent(
            prior in 0.0f64..=1.0,
            likelihood in 0.0f64..=1.0,
            alt in 0.0f64..=1.0,
            field in field_strategy(),
            value in 0.0f64..=1.0,
        ) {
            let base = record(prior, likelihood, alt);
            let once = recompute(&base, field, value);
            let twice = recompute(&once, field, value);
            prop_assert_eq!(once.clone(), twice);
            prop_assert_eq!(once.input(field), value);
        }

        #[test]
        fn prop_recompute_leaves_other_inputs(
            prior in 0.0f64..=1.0,
            likelihood in 0.0f64..=1.0,
            alt in 0.0f64..=1.0,
            field in field_strategy(),
            value in 0.0f64..=1.0,
        ) {
            let base = record(prior, likelihood, alt);
            let edited = recompute(&base, field, value);
            for other in ProbabilityField::ALL.into_iter().filter(|f| *f != field) {
                prop_assert_eq!(edited.input(other), base.input(other));
            }
        }
    }
}
