//! Joint-probability geometry of the hypothesis × evidence grid.
//!
//! The unit square is split horizontally by P(H), then each column is split
//! vertically by its likelihood:
//!
//! ```text
//!            P(H)                 P(¬H)
//!   ┌──────────────────┬──────────────────────┐
//!   │  H ∧ ¬E          │  ¬H ∧ ¬E             │  1 − P(E|·)
//!   ├──────────────────┤                      │
//!   │  H ∧ E           ├──────────────────────┤
//!   │                  │  ¬H ∧ E              │  P(E|·)
//!   └──────────────────┴──────────────────────┘
//! ```
//!
//! `Quadrants` holds the exact areas. `PanelLayout` holds what a resizable
//! panel UI should show, which differs only in the degenerate case where both
//! likelihoods are zero: then every split is 50/50 so no region collapses.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::types::{ProbabilityField, ProbabilityRecord};

/// Areas of the four joint regions. Always sums to 1 for valid inputs.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Quadrants {
    /// P(H)·P(E|H)
    pub hypothesis_evidence: f64,
    /// P(H)·(1 − P(E|H))
    pub hypothesis_not_evidence: f64,
    /// P(E|¬H)·(1 − P(H))
    pub not_hypothesis_evidence: f64,
    /// (1 − P(H))·(1 − P(E|¬H))
    pub not_hypothesis_not_evidence: f64,
}

impl Quadrants {
    pub fn from_inputs(prior: f64, likelihood: f64, alt_likelihood: f64) -> Self {
        Self {
            hypothesis_evidence: prior * likelihood,
            hypothesis_not_evidence: prior * (1.0 - likelihood),
            not_hypothesis_evidence: alt_likelihood * (1.0 - prior),
            not_hypothesis_not_evidence: (1.0 - prior) * (1.0 - alt_likelihood),
        }
    }

    pub fn from_record(record: &ProbabilityRecord) -> Self {
        Self::from_inputs(record.prior(), record.likelihood(), record.alt_likelihood())
    }

    pub fn total(&self) -> f64 {
        self.hypothesis_evidence
            + self.hypothesis_not_evidence
            + self.not_hypothesis_evidence
            + self.not_hypothesis_not_evidence
    }

    /// Same regions scaled to percent.
    pub fn percentages(&self) -> Self {
        Self {
            hypothesis_evidence: self.hypothesis_evidence * 100.0,
            hypothesis_not_evidence: self.hypothesis_not_evidence * 100.0,
            not_hypothesis_evidence: self.not_hypothesis_evidence * 100.0,
            not_hypothesis_not_evidence: self.not_hypothesis_not_evidence * 100.0,
        }
    }
}

/// One of the three resizable panel groups.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "kebab-case")]
pub enum PanelGroup {
    /// Horizontal split: [P(H), P(¬H)]
    Hypothesis,
    /// Vertical split of the H column: [1 − P(E|H), P(E|H)]
    Likelihood,
    /// Vertical split of the ¬H column: [1 − P(E|¬H), P(E|¬H)]
    AltLikelihood,
}

impl PanelGroup {
    /// The input a drag on this group edits.
    pub fn field(self) -> ProbabilityField {
        match self {
            PanelGroup::Hypothesis => ProbabilityField::Prior,
            PanelGroup::Likelihood => ProbabilityField::Likelihood,
            PanelGroup::AltLikelihood => ProbabilityField::AltLikelihood,
        }
    }

    /// Index within the group's sizes that carries the probability mass.
    fn mass_index(self) -> usize {
        match self {
            PanelGroup::Hypothesis => 0,
            PanelGroup::Likelihood | PanelGroup::AltLikelihood => 1,
        }
    }
}

impl std::str::FromStr for PanelGroup {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().replace('_', "-").as_str() {
            "hypothesis" | "prior" | "1" => Ok(PanelGroup::Hypothesis),
            "likelihood" | "2" => Ok(PanelGroup::Likelihood),
            "alt-likelihood" | "alternative-likelihood" | "3" => Ok(PanelGroup::AltLikelihood),
            _ => Err(format!(
                "Unknown panel group: {}. Use 'hypothesis', 'likelihood', or 'alt-likelihood'",
                s
            )),
        }
    }
}

/// Panel sizes in percent, as a resizable-panel UI would lay them out.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct PanelLayout {
    /// [P(H), P(¬H)]
    pub hypothesis: [f64; 2],
    /// [1 − P(E|H), P(E|H)]
    pub likelihood: [f64; 2],
    /// [1 − P(E|¬H), P(E|¬H)]
    pub alt_likelihood: [f64; 2],
}

const EVEN_SPLIT: [f64; 2] = [50.0, 50.0];

impl PanelLayout {
    pub fn from_record(record: &ProbabilityRecord) -> Self {
        if Self::is_degenerate(record) {
            return Self {
                hypothesis: EVEN_SPLIT,
                likelihood: EVEN_SPLIT,
                alt_likelihood: EVEN_SPLIT,
            };
        }

        let width = record.prior() * 100.0;
        let likelihood = record.likelihood() * 100.0;
        let alt_likelihood = record.alt_likelihood() * 100.0;
        Self {
            hypothesis: [width, 100.0 - width],
            likelihood: [100.0 - likelihood, likelihood],
            alt_likelihood: [100.0 - alt_likelihood, alt_likelihood],
        }
    }

    /// Both likelihoods zero: the evidence is impossible and the panels fall
    /// back to an even split.
    pub fn is_degenerate(record: &ProbabilityRecord) -> bool {
        record.likelihood() == 0.0 && record.alt_likelihood() == 0.0
    }

    pub fn sizes(&self, group: PanelGroup) -> [f64; 2] {
        match group {
            PanelGroup::Hypothesis => self.hypothesis,
            PanelGroup::Likelihood => self.likelihood,
            PanelGroup::AltLikelihood => self.alt_likelihood,
        }
    }

    /// Region areas as displayed, in percent.
    ///
    /// Equal to `Quadrants::percentages` except in the degenerate case,
    /// where each region shows 25%.
    pub fn displayed_percentages(&self) -> Quadrants {
        let [h, not_h] = self.hypothesis;
        let [h_not_e, h_e] = self.likelihood;
        let [not_h_not_e, not_h_e] = self.alt_likelihood;
        Quadrants {
            hypothesis_evidence: h * h_e / 100.0,
            hypothesis_not_evidence: h * h_not_e / 100.0,
            not_hypothesis_evidence: not_h * not_h_e / 100.0,
            not_hypothesis_not_evidence: not_h * not_h_not_e / 100.0,
        }
    }

    /// Translate a dragged panel group into the edit it represents.
    ///
    /// Sizes are normalized by their sum, so both percentages and fractions
    /// work. An all-zero drag maps to 0.5.
    pub fn drag(group: PanelGroup, sizes: [f64; 2]) -> (ProbabilityField, f64) {
        let total = sizes[0] + sizes[1];
        let value = if total > 0.0 && total.is_finite() {
            sizes[group.mass_index()] / total
        } else {
            0.5
        };
        (group.field(), value)
    }
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
    fn test_quadrant_values() {
        let q = Quadrants::from_record(&record(0.3, 0.8, 0.1));
        assert!((q.hypothesis_evidence - 0.24).abs() < 1e-12);
        assert!((q.hypothesis_not_evidence - 0.06).abs() < 1e-12);
        assert!((q.not_hypothesis_evidence - 0.07).abs() < 1e-12);
        assert!((q.not_hypothesis_not_evidence - 0.63).abs() < 1e-12);
    }

    #[test]
    fn test_degenerate_layout_is_even_split() {
        let r = record(0.3, 0.0, 0.0);
        let layout = PanelLayout::from_record(&r);
        assert!(PanelLayout::is_degenerate(&r));
        assert_eq!(layout.hypothesis, [50.0, 50.0]);
        assert_eq!(layout.likelihood, [50.0, 50.0]);
        assert_eq!(layout.alt_likelihood, [50.0, 50.0]);

        let shown = layout.displayed_percentages();
        for value in [
            shown.hypothesis_evidence,
            shown.hypothesis_not_evidence,
            shown.not_hypothesis_evidence,
            shown.not_hypothesis_not_evidence,
        ] {
            assert_eq!(value, 25.0);
            assert!(!value.is_nan());
        }
    }

    #[test]
    fn test_layout_follows_record() {
        let layout = PanelLayout::from_record(&record(0.3, 0.8, 0.1));
        assert!((layout.hypothesis[0] - 30.0).abs() < 1e-9);
        assert!((layout.likelihood[1] - 80.0).abs() < 1e-9);
        assert!((layout.alt_likelihood[0] - 90.0).abs() < 1e-9);
        assert_eq!(layout.sizes(PanelGroup::Likelihood), layout.likelihood);
    }

    #[test]
    fn test_drag_mapping() {
        assert_eq!(
            PanelLayout::drag(PanelGroup::Hypothesis, [60.0, 40.0]),
            (ProbabilityField::Prior, 0.6)
        );
        assert_eq!(
            PanelLayout::drag(PanelGroup::Likelihood, [25.0, 75.0]),
            (ProbabilityField::Likelihood, 0.75)
        );
        assert_eq!(
            PanelLayout::drag(PanelGroup::AltLikelihood, [0.9, 0.1]).0,
            ProbabilityField::AltLikelihood
        );
        assert_eq!(PanelLayout::drag(PanelGroup::Hypothesis, [0.0, 0.0]).1, 0.5);
    }

    #[test]
    fn test_group_parsing() {
        assert_eq!("hypothesis".parse::<PanelGroup>(), Ok(PanelGroup::Hypothesis));
        assert_eq!("3".parse::<PanelGroup>(), Ok(PanelGroup::AltLikelihood));
        assert!("posterior".parse::<PanelGroup>().is_err());
    }

    proptest! {
        #[test]
        fn prop_quadrants_sum_to_one(
            prior in 0.0f64..=1.0,
            likelihood in 0.0f64..=1.0,
            alt in 0.0f64..=1.0,
        ) {
            let q = Quadrants::from_inputs(prior, likelihood, alt);
            prop_assert!((q.total() - 1.0).abs() < 1e-9);
            prop_assert!(q.hypothesis_evidence >= 0.0);
            prop_assert!(q.hypothesis_not_evidence >= 0.0);
            prop_assert!(q.not_hypothesis_evidence >= 0.0);
            prop_assert!(q.not_hypothesis_not_evidence >= 0.0);
        }

        #[test]
        fn prop_displayed_matches_exact_unless_degenerate(
            prior in 0.0f64..=1.0,
            likelihood in 0.0f64..=1.0,
            alt in 0.0f64..=1.0,
        ) {
            let r = record(prior, likelihood, alt);
            let shown = PanelLayout::from_record(&r).displayed_percentages();
            prop_assert!((shown.total() - 100.0).abs() < 1e-7);
            if !PanelLayout::is_degenerate(&r) {
                let exact = Quadrants::from_record(&r).percentages();
                prop_assert!((shown.hypothesis_evidence - exact.hypothesis_evidence).abs() < 1e-7);
                prop_assert!((shown.not_hypothesis_evidence - exact.not_hypothesis_evidence).abs() < 1e-7);
            }
        }
    }
}
