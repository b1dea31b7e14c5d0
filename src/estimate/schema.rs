//! Structured response schema for the estimation call.
//!
//! The model fills one function call whose arguments match
//! `EstimateResponse`. All probabilities arrive as strings and are parsed
//! here; a response either maps onto a complete `ProbabilityRecord` or is
//! rejected with the offending field named.

use once_cell::sync::Lazy;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use super::error::EstimationError;
use crate::types::{ProbabilityRecord, QuadrantCaptions, Rationale};

/// Name of the function the model is forced to call.
pub const RESPONSE_NAME: &str = "Probability";

/// Arguments of the `Probability` function call.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct EstimateResponse {
    /// The estimated prior probability, between 0 and 1
    pub prior: String,
    /// The estimated likelihood probability, between 0 and 1
    pub likelihood: String,
    /// The estimated alternative likelihood, between 0 and 1
    pub alternative_likelihood: String,
    /// Sequential reasoning to determine the correct likelihood
    pub likelihood_chain_of_thought: String,
    /// Sequential reasoning to determine the correct alternative likelihood
    pub alternative_likelihood_chain_of_thought: String,
    /// Sequential reasoning to determine the correct prior
    pub prior_chain_of_thought: String,
    /// The noun representing the population, for example 'people' or 'students' or 'proportion'
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub population_noun: Option<String>,
    /// A short description of the population, for example 'all people in the world' or 'students in a classroom' or 'all possible outcomes'
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub short_description_of_population: Option<String>,
    /// A short human readable description of where the hypothesis is true, and the evidence is observed
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hypothesis_evidence: Option<String>,
    /// A short human readable description of where the hypothesis is true, and the evidence is not observed
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hypothesis_not_evidence: Option<String>,
    /// A short human readable description of where the hypothesis is false, and the evidence is observed
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub not_hypothesis_evidence: Option<String>,
    /// A short human readable description of where the hypothesis is false, and the evidence is not observed
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub not_hypothesis_not_evidence: Option<String>,
}

/// JSON schema of `EstimateResponse`, stripped of the keys function-calling
/// endpoints do not accept in `parameters`.
pub static RESPONSE_SCHEMA: Lazy<serde_json::Value> = Lazy::new(|| {
    let mut schema = serde_json::to_value(schemars::schema_for!(EstimateResponse))
        .unwrap_or_else(|_| serde_json::json!({ "type": "object" }));
    if let Some(obj) = schema.as_object_mut() {
        obj.remove("$schema");
        obj.remove("title");
    }
    schema
});

/// Parse one probability string.
///
/// Accepts surrounding whitespace, exponent notation, trailing commentary
/// after the number, and a `%` suffix (divided by 100). The longest leading
/// run that parses as a number wins. Rejects anything outside [0, 1].
pub fn parse_probability(field: &'static str, raw: &str) -> Result<f64, EstimationError> {
    let parse_err = |reason: &str| EstimationError::Parse {
        field,
        raw: raw.to_string(),
        reason: reason.to_string(),
    };

    let trimmed = raw.trim();
    let end = trimmed
        .find(|c: char| !(c.is_ascii_digit() || matches!(c, '.' | '-' | '+' | 'e' | 'E')))
        .unwrap_or(trimmed.len());
    // All scanned chars are ASCII, so every prefix length is a char boundary
    let (mut value, used) = (1..=end)
        .rev()
        .find_map(|len| trimmed[..len].parse::<f64>().ok().map(|v| (v, len)))
        .ok_or_else(|| parse_err("not a number"))?;

    if trimmed[used..].trim_start().starts_with('%') {
        value /= 100.0;
    }

    if !value.is_finite() || !(0.0..=1.0).contains(&value) {
        return Err(parse_err("outside [0, 1]"));
    }
    Ok(value)
}

impl EstimateResponse {
    /// Map onto a complete record, or fail naming the first bad field.
    pub fn into_record(self) -> Result<ProbabilityRecord, EstimationError> {
        let prior = parse_probability("prior", &self.prior)?;
        let likelihood = parse_probability("likelihood", &self.likelihood)?;
        let alt_likelihood =
            parse_probability("alternativeLikelihood", &self.alternative_likelihood)?;

        let rationale = Rationale {
            prior_reasoning: self.prior_chain_of_thought,
            likelihood_reasoning: self.likelihood_chain_of_thought,
            alt_likelihood_reasoning: self.alternative_likelihood_chain_of_thought,
            posterior_reasoning: String::new(),
            population_noun: self.population_noun.unwrap_or_default(),
            population_description: self.short_description_of_population.unwrap_or_default(),
            captions: QuadrantCaptions {
                hypothesis_evidence: self.hypothesis_evidence.unwrap_or_default(),
                hypothesis_not_evidence: self.hypothesis_not_evidence.unwrap_or_default(),
                not_hypothesis_evidence: self.not_hypothesis_evidence.unwrap_or_default(),
                not_hypothesis_not_evidence: self.not_hypothesis_not_evidence.unwrap_or_default(),
            },
        };

        Ok(ProbabilityRecord::new(prior, likelihood, alt_likelihood, rationale)?)
    }
}
