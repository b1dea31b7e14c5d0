//! The fixed estimation prompt.
//!
//! The hypothesis and evidence are embedded verbatim inside double quotes.
//! Everything else is constant so identical inputs always produce identical
//! requests (and identical cache keys).

const PROMPT_TEMPLATE: &str = r#"You will be estimating the likelihood, the prior, and the probability of simply observing the evidence, for a hypothesis given some evidence.

In Bayesian inference, the likelihood is the probability of the evidence occurring if the hypothesis is true. In other words, assuming the hypothesis is 100% true, what is the probability that we would observe this evidence?

In Bayesian inference, the prior probability is the probability you would assign to this hypothesis being true before seeing any specific evidence for or against it. To estimate the prior, carefully consider how plausible this hypothesis is based on your general knowledge about how the world works.

In Bayesian inference, the alternative likelihood is the probability of the evidence occurring if the hypothesis is false. In other words, assuming the hypothesis is 100% false, what is the probability that we would still observe this evidence? Think about the probability of simply observing this evidence in the real world, without any additional context, beliefs or hypotheses. If you randomly sampled situations from the real world, in what percentage of them would you expect to observe the evidence exactly as stated?

The hypothesis is:
"{hypothesis}"

The evidence is:
"{evidence}"

Carefully consider the provided hypothesis and evidence. Think through how to estimate each probability step-by-step:

1. Analyze the hypothesis and its assumptions.
2. Evaluate the evidence in the context of the hypothesis.
3. Use relevant statistical methods or knowledge to estimate the likelihood, the prior and the probability of simply observing this evidence.

Provide your reasoning for each probability:

- Prior probability: Explain why you assigned this prior probability.
- Likelihood: Explain why you assigned this likelihood.
- Alternative likelihood: Explain why you assigned this alternative likelihood.

Report every probability as a decimal string between 0 and 1.
"#;

/// Build the estimation prompt for one scenario.
pub fn build_prompt(hypothesis: &str, evidence: &str) -> String {
    // Evidence first: its placeholder sits after the hypothesis one, so
    // neither user text can be expanded by the other replacement.
    PROMPT_TEMPLATE
        .replacen("{evidence}", evidence, 1)
        .replacen("{hypothesis}", hypothesis, 1)
}
