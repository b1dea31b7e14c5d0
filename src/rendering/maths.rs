//! "Maths" view: the five probabilities as a table, then the two-step
//! derivation of the posterior.

use crate::engine::{Derivation, Notation};
use crate::types::ProbabilityRecord;

use super::colors::Palette;

/// One row of the probability table.
#[derive(Debug, Clone, PartialEq)]
pub struct TermRow {
    pub term: &'static str,
    pub name: &'static str,
    pub description: &'static str,
    /// Two decimals.
    pub value: String,
}

/// Rows in display order: the three inputs, then the two derived values.
pub fn term_rows(record: &ProbabilityRecord) -> Vec<TermRow> {
    let row = |term: &'static str, name: &'static str, description: &'static str, value: f64| TermRow {
        term,
        name,
        description,
        value: format!("{:.2}", value),
    };
    vec![
        row(
            "P(E|H)",
            "Likelihood",
            "Probability of Evidence given the Hypothesis holds",
            record.likelihood(),
        ),
        row(
            "P(E|¬H)",
            "Alternative Likelihood",
            "Probability of Evidence given the Hypothesis is false",
            record.alt_likelihood(),
        ),
        row("P(H)", "Prior", "Initial Probability of Hypothesis", record.prior()),
        row(
            "P(E)",
            "Marginal",
            "Probability of Evidence occurring no matter the Hypothesis",
            record.marginal(),
        ),
        row(
            "P(H|E)",
            "Posterior",
            "Our updated belief in the Hypothesis given the Evidence",
            record.posterior(),
        ),
    ]
}

fn pad(text: &str, width: usize) -> String {
    let len = text.chars().count();
    format!("{}{}", text, " ".repeat(width.saturating_sub(len)))
}

pub struct MathsRenderer {
    palette: Palette,
}

impl MathsRenderer {
    pub fn new(palette: Palette) -> Self {
        Self { palette }
    }

    pub fn render(&self, record: &ProbabilityRecord) -> String {
        let mut out = String::new();
        out.push_str(&self.palette.heading("Maths"));
        out.push('\n');
        out.push_str(&self.render_table(record));
        out.push('\n');
        out.push_str(&self.render_steps(&Derivation::from_record(record)));
        out
    }

    fn render_table(&self, record: &ProbabilityRecord) -> String {
        let rows = term_rows(record);
        let headers = ["Term", "Name", "Description", "Value"];
        let widths = [
            rows.iter().map(|r| r.term.chars().count()).max().unwrap_or(0).max(4),
            rows.iter().map(|r| r.name.chars().count()).max().unwrap_or(0).max(4),
            rows.iter().map(|r| r.description.chars().count()).max().unwrap_or(0).max(11),
            5,
        ];

        let mut lines = Vec::with_capacity(rows.len() + 2);
        lines.push(self.palette.dim(&format!(
            "{}  {}  {}  {:>5}",
            pad(headers[0], widths[0]),
            pad(headers[1], widths[1]),
            pad(headers[2], widths[2]),
            headers[3]
        )));
        lines.push(self.palette.dim(&"─".repeat(widths.iter().sum::<usize>() + 6)));

        for row in rows {
            lines.push(format!(
                "{}  {}  {}  {}",
                self.palette.term(&pad(row.term, widths[0])),
                pad(row.name, widths[1]),
                self.palette.dim(&pad(row.description, widths[2])),
                self.palette.value(&format!("{:>5}", row.value)),
            ));
        }
        lines.join("\n") + "\n"
    }

    fn render_steps(&self, derivation: &Derivation) -> String {
        let mut out = String::new();
        out.push_str(&self.palette.heading("Step 1: Calculate P(E)"));
        out.push('\n');
        for line in derivation.marginal_steps(Notation::Plain) {
            out.push_str("  ");
            out.push_str(&line);
            out.push('\n');
        }
        out.push_str(&self.palette.heading("Step 2: Calculate the Posterior P(H|E)"));
        out.push('\n');
        for line in derivation.posterior_steps(Notation::Plain) {
            out.push_str("  ");
            out.push_str(&line);
            out.push('\n');
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Rationale;

    fn record() -> ProbabilityRecord {
        ProbabilityRecord::new(0.6, 0.8, 0.1, Rationale::default()).unwrap()
    }

    #[test]
    fn test_rows_in_display_order() {
        let rows = term_rows(&record());
        let names: Vec<_> = rows.iter().map(|r| r.name).collect();
        assert_eq!(
            names,
            ["Likelihood", "Alternative Likelihood", "Prior", "Marginal", "Posterior"]
        );
        assert_eq!(rows[2].value, "0.60");
        assert_eq!(rows[3].value, "0.52");
        assert_eq!(rows[4].value, "0.92");
    }

    #[test]
    fn test_plain_render() {
        let out = MathsRenderer::new(Palette::new(false)).render(&record());
        assert!(out.starts_with("Maths\n"));
        assert!(out.contains("Step 1: Calculate P(E)"));
        assert!(out.contains("P(E) = 0.80 · 0.60 + 0.10 · 0.40"));
        assert!(out.contains("P(E) = 0.48 + 0.04"));
        assert!(out.contains("P(H|E) = 0.92"));
        assert!(!out.contains("\x1b["));
    }
}
