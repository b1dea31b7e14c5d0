//! "Reasoning" view: the estimator's chain of thought for each input.

use crate::types::ProbabilityRecord;

use super::colors::Palette;

/// Wrap `text` to `width` columns on whitespace.
fn wrap(text: &str, width: usize) -> Vec<String> {
    let mut lines = Vec::new();
    let mut line = String::new();
    for word in text.split_whitespace() {
        if !line.is_empty() && line.chars().count() + 1 + word.chars().count() > width {
            lines.push(std::mem::take(&mut line));
        }
        if !line.is_empty() {
            line.push(' ');
        }
        line.push_str(word);
    }
    if !line.is_empty() {
        lines.push(line);
    }
    lines
}

pub struct ReasoningRenderer {
    palette: Palette,
    width: usize,
}

impl ReasoningRenderer {
    pub fn new(palette: Palette) -> Self {
        Self { palette, width: 88 }
    }

    pub fn render(&self, record: &ProbabilityRecord) -> String {
        let rationale = record.rationale();
        let mut sections = vec![
            ("Prior", rationale.prior_reasoning.as_str()),
            ("Likelihood", rationale.likelihood_reasoning.as_str()),
            ("Alternative Likelihood", rationale.alt_likelihood_reasoning.as_str()),
        ];
        if !rationale.posterior_reasoning.is_empty() {
            sections.push(("Posterior", rationale.posterior_reasoning.as_str()));
        }

        let mut out = String::new();
        out.push_str(&self.palette.heading("Reasoning"));
        out.push('\n');

        if !rationale.population_noun.is_empty() || !rationale.population_description.is_empty() {
            out.push_str(&self.palette.dim(&format!(
                "Population: {} ({})",
                rationale.population_noun, rationale.population_description
            )));
            out.push('\n');
        }

        for (title, text) in sections {
            out.push_str(&self.palette.term(title));
            out.push('\n');
            if text.trim().is_empty() {
                out.push_str(&format!("  {}\n", self.palette.dim("(none)")));
                continue;
            }
            for line in wrap(text, self.width) {
                out.push_str("  ");
                out.push_str(&line);
                out.push('\n');
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Rationale;

    #[test]
    fn test_wrap() {
        assert_eq!(wrap("a bb ccc dddd", 6), vec!["a bb", "ccc", "dddd"]);
        assert!(wrap("   ", 10).is_empty());
    }

    #[test]
    fn test_sections() {
        let record = ProbabilityRecord::default().with_rationale(Rationale {
            prior_reasoning: "Librarians are rare compared to farmers.".into(),
            population_noun: "people".into(),
            population_description: "all working adults".into(),
            ..Default::default()
        });
        let out = ReasoningRenderer::new(Palette::new(false)).render(&record);
        assert!(out.starts_with("Reasoning\n"));
        assert!(out.contains("Population: people (all working adults)"));
        assert!(out.contains("  Librarians are rare compared to farmers."));
        assert!(out.contains("Alternative Likelihood\n  (none)"));
        assert!(!out.contains("Posterior"));
    }
}
