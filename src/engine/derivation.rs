//! Step-by-step derivation of P(E) and P(H|E) for display.
//!
//! Step 1: P(E) = P(E|H)·P(H) + P(E|¬H)·P(¬H), then with values substituted,
//! then with both products evaluated. Step 2: P(H|E) = P(E|H)·P(H) / P(E),
//! substituted, then evaluated. Values are shown to two decimals.

use schemars::JsonSchema;
use serde::Serialize;

use crate::types::ProbabilityRecord;

/// Output notation for equation lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Notation {
    /// Unicode text for terminals: `P(E|¬H) · P(¬H)`
    #[default]
    Plain,
    /// KaTeX/LaTeX source for web front ends: `P(E|\neg H) \cdot P(\neg H)`
    Latex,
}

/// All intermediate values of the two-step Bayes update.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, JsonSchema)]
pub struct Derivation {
    pub prior: f64,
    pub not_prior: f64,
    pub likelihood: f64,
    pub alt_likelihood: f64,
    /// P(E|H)·P(H)
    pub weighted_likelihood: f64,
    /// P(E|¬H)·P(¬H)
    pub weighted_alt_likelihood: f64,
    pub marginal: f64,
    pub posterior: f64,
}

impl Derivation {
    pub fn from_record(record: &ProbabilityRecord) -> Self {
        Self {
            prior: record.prior(),
            not_prior: 1.0 - record.prior(),
            likelihood: record.likelihood(),
            alt_likelihood: record.alt_likelihood(),
            weighted_likelihood: record.likelihood() * record.prior(),
            weighted_alt_likelihood: record.alt_likelihood() * (1.0 - record.prior()),
            marginal: record.marginal(),
            posterior: record.posterior(),
        }
    }

    /// Three lines: formula, substitution, evaluated products.
    pub fn marginal_steps(&self, notation: Notation) -> [String; 3] {
        let (dot, not) = symbols(notation);
        [
            format!("P(E) = P(E|H) {dot} P(H) + P(E|{not}H) {dot} P({not}H)"),
            format!(
                "P(E) = {:.2} {dot} {:.2} + {:.2} {dot} {:.2}",
                self.likelihood, self.prior, self.alt_likelihood, self.not_prior
            ),
            format!(
                "P(E) = {:.2} + {:.2}",
                self.weighted_likelihood, self.weighted_alt_likelihood
            ),
        ]
    }

    /// Three lines: formula, substitution, result.
    pub fn posterior_steps(&self, notation: Notation) -> [String; 3] {
        let (dot, _) = symbols(notation);
        match notation {
            Notation::Plain => [
                format!("P(H|E) = P(E|H) {dot} P(H) / P(E)"),
                format!(
                    "P(H|E) = {:.2} {dot} {:.2} / {:.2}",
                    self.likelihood, self.prior, self.marginal
                ),
                format!("P(H|E) = {:.2}", self.posterior),
            ],
            Notation::Latex => [
                format!("P(H|E) = \\frac{{P(E|H) {dot} P(H)}}{{P(E)}}"),
                format!(
                    "P(H|E) = \\frac{{{:.2} {dot} {:.2}}}{{{:.2}}}",
                    self.likelihood, self.prior, self.marginal
                ),
                format!("P(H|E) = {:.2}", self.posterior),
            ],
        }
    }
}

fn symbols(notation: Notation) -> (&'static str, &'static str) {
    match notation {
        Notation::Plain => ("·", "¬"),
        Notation::Latex => ("\\cdot", "\\neg "),
    }
}
