//! Core types for bayesgpt.
//!
//! `ProbabilityRecord` is the value handed between every stage: the
//! estimator produces it, the cache stores it, the engine regenerates it on
//! every edit, and the renderers display it. Key design decisions:
//! - Only the three inputs (prior, likelihood, alternative likelihood) can be
//!   set. Marginal and posterior are private and re-derived on construction,
//!   on every edit, and on deserialization.
//! - Records are values. Edits return a new record; nothing mutates a cached
//!   record in place.

use std::fmt;
use std::str::FromStr;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::engine::bayes;

/// Minimum length (in characters, after trimming) of a hypothesis or evidence text.
pub const MIN_SCENARIO_CHARS: usize = 10;

/// Errors raised when building a record from raw probabilities.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RecordError {
    #[error("{field} must be a finite probability in [0, 1], got {value}")]
    OutOfRange { field: &'static str, value: f64 },
}

/// Errors raised when validating a submitted scenario.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ScenarioError {
    #[error("{field} must be at least {min} characters (got {len})")]
    TooShort {
        field: &'static str,
        min: usize,
        len: usize,
    },
}

/// A submitted (hypothesis, evidence) pair.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, JsonSchema)]
pub struct Scenario {
    /// The proposition under evaluation.
    pub hypothesis: String,
    /// Observed data bearing on the hypothesis.
    pub evidence: String,
}

impl Scenario {
    /// Build a scenario without validation (cache keys, tests).
    pub fn new(hypothesis: impl Into<String>, evidence: impl Into<String>) -> Self {
        Self {
            hypothesis: hypothesis.into(),
            evidence: evidence.into(),
        }
    }

    /// Trim both texts and reject anything shorter than [`MIN_SCENARIO_CHARS`].
    pub fn validated(
        hypothesis: impl AsRef<str>,
        evidence: impl AsRef<str>,
    ) -> Result<Self, ScenarioError> {
        let scenario = Self::new(hypothesis.as_ref().trim(), evidence.as_ref().trim());
        scenario.validate()?;
        Ok(scenario)
    }

    pub fn validate(&self) -> Result<(), ScenarioError> {
        for (field, text) in [("hypothesis", &self.hypothesis), ("evidence", &self.evidence)] {
            let len = text.trim().chars().count();
            if len < MIN_SCENARIO_CHARS {
                return Err(ScenarioError::TooShort {
                    field,
                    min: MIN_SCENARIO_CHARS,
                    len,
                });
            }
        }
        Ok(())
    }

    /// Built-in scenarios offered when nothing has been explored yet.
    pub fn examples() -> Vec<Scenario> {
        vec![
            Scenario::new(
                "Election fraud occurred.",
                "In a small town called Fairview, there's an election for the mayor's office. \
                 The main candidates are Alice and Bob. On election night, Bob wins by a narrow \
                 margin. However, Alice's supporters suspect election fraud and demand an investigation.",
            ),
            Scenario::new(
                "Steve is a librarian",
                "Steve is very shy and withdrawn, invariably helpful but with very little \
                 interest in people or in the world of reality. A meek and tidy soul, he has a \
                 need for order and structure, and a passion for detail.",
            ),
        ]
    }
}

/// The three independently adjustable probabilities.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "kebab-case")]
pub enum ProbabilityField {
    /// P(H)
    Prior,
    /// P(E|H)
    Likelihood,
    /// P(E|¬H)
    AltLikelihood,
}

impl ProbabilityField {
    pub const ALL: [ProbabilityField; 3] = [
        ProbabilityField::Prior,
        ProbabilityField::Likelihood,
        ProbabilityField::AltLikelihood,
    ];

    /// Probability notation, e.g. `P(E|H)`.
    pub fn notation(self) -> &'static str {
        match self {
            ProbabilityField::Prior => "P(H)",
            ProbabilityField::Likelihood => "P(E|H)",
            ProbabilityField::AltLikelihood => "P(E|¬H)",
        }
    }
}

impl FromStr for ProbabilityField {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().replace('_', "-").as_str() {
            "prior" | "p-h" => Ok(ProbabilityField::Prior),
            "likelihood" | "p-e-given-h" => Ok(ProbabilityField::Likelihood),
            "alt-likelihood" | "alternative-likelihood" | "p-e-given-not-h" => {
                Ok(ProbabilityField::AltLikelihood)
            }
            _ => Err(format!(
                "Unknown probability: {}. Use 'prior', 'likelihood', or 'alt-likelihood'",
                s
            )),
        }
    }
}

impl fmt::Display for ProbabilityField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProbabilityField::Prior => write!(f, "prior"),
            ProbabilityField::Likelihood => write!(f, "likelihood"),
            ProbabilityField::AltLikelihood => write!(f, "alt-likelihood"),
        }
    }
}

/// Short captions for the four cells of the hypothesis × evidence grid.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct QuadrantCaptions {
    /// H true, E observed.
    pub hypothesis_evidence: String,
    /// H true, E not observed.
    pub hypothesis_not_evidence: String,
    /// H false, E observed.
    pub not_hypothesis_evidence: String,
    /// H false, E not observed.
    pub not_hypothesis_not_evidence: String,
}

/// Free-text justification that accompanies the numbers.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct Rationale {
    pub prior_reasoning: String,
    pub likelihood_reasoning: String,
    pub alt_likelihood_reasoning: String,
    /// Never produced by the estimator; left for callers that annotate the update.
    pub posterior_reasoning: String,
    /// e.g. "people", "students"
    pub population_noun: String,
    /// e.g. "all people in the world"
    pub population_description: String,
    pub captions: QuadrantCaptions,
}

/// Prior, likelihoods and their Bayes-derived marginal and posterior.
///
/// The derived fields are serialized for readers of the cache, but ignored on
/// the way back in: deserialization validates the inputs and re-derives.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(try_from = "StoredRecord")]
pub struct ProbabilityRecord {
    prior: f64,
    likelihood: f64,
    alt_likelihood: f64,
    marginal: f64,
    posterior: f64,
    rationale: Rationale,
}

/// Wire shape of a record. Field order matches `ProbabilityRecord` so that
/// non-self-describing formats (bincode) round-trip.
#[derive(Deserialize, JsonSchema)]
struct StoredRecord {
    prior: f64,
    likelihood: f64,
    alt_likelihood: f64,
    #[serde(default)]
    #[allow(dead_code)]
    marginal: f64,
    #[serde(default)]
    #[allow(dead_code)]
    posterior: f64,
    #[serde(default)]
    rationale: Rationale,
}

impl TryFrom<StoredRecord> for ProbabilityRecord {
    type Error = RecordError;

    fn try_from(stored: StoredRecord) -> Result<Self, Self::Error> {
        ProbabilityRecord::new(
            stored.prior,
            stored.likelihood,
            stored.alt_likelihood,
            stored.rationale,
        )
    }
}

fn check_probability(field: &'static str, value: f64) -> Result<f64, RecordError> {
    if value.is_finite() && (0.0..=1.0).contains(&value) {
        Ok(value)
    } else {
        Err(RecordError::OutOfRange { field, value })
    }
}

impl ProbabilityRecord {
    /// Build a record from the three inputs, deriving marginal and posterior.
    pub fn new(
        prior: f64,
        likelihood: f64,
        alt_likelihood: f64,
        rationale: Rationale,
    ) -> Result<Self, RecordError> {
        let prior = check_probability("prior", prior)?;
        let likelihood = check_probability("likelihood", likelihood)?;
        let alt_likelihood = check_probability("alt_likelihood", alt_likelihood)?;
        Ok(Self::derive(prior, likelihood, alt_likelihood, rationale))
    }

    /// Inputs must already be valid probabilities.
    fn derive(prior: f64, likelihood: f64, alt_likelihood: f64, rationale: Rationale) -> Self {
        let marginal = bayes::marginal(prior, likelihood, alt_likelihood);
        let posterior = bayes::posterior(prior, likelihood, marginal);
        Self {
            prior,
            likelihood,
            alt_likelihood,
            marginal,
            posterior,
            rationale,
        }
    }

    /// Copy of this record with one input replaced and everything re-derived.
    ///
    /// `value` is clamped into [0, 1]; NaN becomes 0.
    pub(crate) fn with_input(&self, field: ProbabilityField, value: f64) -> Self {
        let value = if value.is_nan() { 0.0 } else { value.clamp(0.0, 1.0) };
        let (mut prior, mut likelihood, mut alt_likelihood) =
            (self.prior, self.likelihood, self.alt_likelihood);
        match field {
            ProbabilityField::Prior => prior = value,
            ProbabilityField::Likelihood => likelihood = value,
            ProbabilityField::AltLikelihood => alt_likelihood = value,
        }
        Self::derive(prior, likelihood, alt_likelihood, self.rationale.clone())
    }

    /// P(H)
    pub fn prior(&self) -> f64 {
        self.prior
    }

    /// P(E|H)
    pub fn likelihood(&self) -> f64 {
        self.likelihood
    }

    /// P(E|¬H)
    pub fn alt_likelihood(&self) -> f64 {
        self.alt_likelihood
    }

    /// P(E), always derived.
    pub fn marginal(&self) -> f64 {
        self.marginal
    }

    /// P(H|E), always derived.
    pub fn posterior(&self) -> f64 {
        self.posterior
    }

    pub fn input(&self, field: ProbabilityField) -> f64 {
        match field {
            ProbabilityField::Prior => self.prior,
            ProbabilityField::Likelihood => self.likelihood,
            ProbabilityField::AltLikelihood => self.alt_likelihood,
        }
    }

    pub fn rationale(&self) -> &Rationale {
        &self.rationale
    }

    pub fn with_rationale(mut self, rationale: Rationale) -> Self {
        self.rationale = rationale;
        self
    }

    /// True for the all-zero placeholder returned when estimation fails.
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

impl Default for ProbabilityRecord {
    fn default() -> Self {
        Self::derive(0.0, 0.0, 0.0, Rationale::default())
    }
}
