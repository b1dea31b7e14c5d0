//! Terminal rendering - from a probability record to text output.
//!
//! Three views, matching the panels of the explorer:
//! - Maths: term table and the two-step derivation
//! - Geometry: the 2x2 probability grid with a captioned legend
//! - Reasoning: the estimator's chain of thought
//!
//! All views honor `Palette` so output can be piped without ANSI codes.

mod colors;
mod grid;
mod maths;
mod reasoning;

pub use colors::{Palette, Region};
pub use grid::GridRenderer;
pub use maths::{term_rows, MathsRenderer, TermRow};
pub use reasoning::ReasoningRenderer;

use crate::types::{ProbabilityRecord, Scenario};

/// Full report: scenario header followed by every view.
pub struct ReportRenderer {
    palette: Palette,
}

impl ReportRenderer {
    pub fn new(color: bool) -> Self {
        Self {
            palette: Palette::new(color),
        }
    }

    pub fn palette(&self) -> Palette {
        self.palette
    }

    pub fn render(&self, scenario: &Scenario, record: &ProbabilityRecord, note: Option<&str>) -> String {
        let mut sections = vec![self.render_header(scenario, note)];
        sections.push(MathsRenderer::new(self.palette).render(record));
        sections.push(GridRenderer::new(self.palette).render(record));
        sections.push(ReasoningRenderer::new(self.palette).render(record));
        sections.join("\n")
    }

    fn render_header(&self, scenario: &Scenario, note: Option<&str>) -> String {
        let mut out = format!(
            "{} {}\n{} {}\n",
            self.palette.heading("Hypothesis:"),
            scenario.hypothesis,
            self.palette.heading("Evidence:"),
            scenario.evidence
        );
        if let Some(note) = note {
            out.push_str(&self.palette.dim(note));
            out.push('\n');
        }
        out
    }
}
