//! ANSI color utilities for the probability views.
//!
//! Each joint region of the hypothesis × evidence grid has a fixed color so
//! the grid, the geometry table and the captions stay visually linked:
//! - H ∧ E: purple (the mass that survives into the posterior numerator)
//! - H ∧ ¬E: red
//! - ¬H ∧ E: blue
//! - ¬H ∧ ¬E: amber
//!
//! Color scheme optimized for both light and dark terminals:
//! - High contrast for headings and values
//! - Muted colors for descriptions and captions

use owo_colors::{OwoColorize, Style};

use crate::engine::Quadrants;
use crate::types::QuadrantCaptions;

/// One of the four joint regions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Region {
    HypothesisEvidence,
    HypothesisNotEvidence,
    NotHypothesisEvidence,
    NotHypothesisNotEvidence,
}

impl Region {
    pub const ALL: [Region; 4] = [
        Region::HypothesisEvidence,
        Region::HypothesisNotEvidence,
        Region::NotHypothesisEvidence,
        Region::NotHypothesisNotEvidence,
    ];

    /// Short label for legends.
    pub fn label(&self) -> &'static str {
        match self {
            Region::HypothesisEvidence => "H ∧ E",
            Region::HypothesisNotEvidence => "H ∧ ¬E",
            Region::NotHypothesisEvidence => "¬H ∧ E",
            Region::NotHypothesisNotEvidence => "¬H ∧ ¬E",
        }
    }

    /// The product whose area this region is.
    pub fn term(&self) -> &'static str {
        match self {
            Region::HypothesisEvidence => "P(E|H) · P(H)",
            Region::HypothesisNotEvidence => "P(¬E|H) · P(H)",
            Region::NotHypothesisEvidence => "P(E|¬H) · P(¬H)",
            Region::NotHypothesisNotEvidence => "P(¬E|¬H) · P(¬H)",
        }
    }

    pub fn style(&self) -> Style {
        match self {
            Region::HypothesisEvidence => Style::new().bright_magenta().bold(),
            Region::HypothesisNotEvidence => Style::new().red(),
            Region::NotHypothesisEvidence => Style::new().bright_blue().bold(),
            Region::NotHypothesisNotEvidence => Style::new().yellow(),
        }
    }

    pub fn area(&self, quadrants: &Quadrants) -> f64 {
        match self {
            Region::HypothesisEvidence => quadrants.hypothesis_evidence,
            Region::HypothesisNotEvidence => quadrants.hypothesis_not_evidence,
            Region::NotHypothesisEvidence => quadrants.not_hypothesis_evidence,
            Region::NotHypothesisNotEvidence => quadrants.not_hypothesis_not_evidence,
        }
    }

    pub fn caption<'a>(&self, captions: &'a QuadrantCaptions) -> &'a str {
        match self {
            Region::HypothesisEvidence => &captions.hypothesis_evidence,
            Region::HypothesisNotEvidence => &captions.hypothesis_not_evidence,
            Region::NotHypothesisEvidence => &captions.not_hypothesis_evidence,
            Region::NotHypothesisNotEvidence => &captions.not_hypothesis_not_evidence,
        }
    }
}

/// Applies styles, or passes text through untouched when color is off
/// (piping to files or LLMs that don't handle ANSI well).
#[derive(Debug, Clone, Copy)]
pub struct Palette {
    enabled: bool,
}

impl Palette {
    pub fn new(enabled: bool) -> Self {
        Self { enabled }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn paint(&self, text: &str, style: Style) -> String {
        if self.enabled {
            text.style(style).to_string()
        } else {
            text.to_string()
        }
    }

    /// Section headings (bold blue)
    pub fn heading(&self, text: &str) -> String {
        self.paint(text, Style::new().bright_blue().bold())
    }

    /// Probability notation like `P(E|H)` (cyan)
    pub fn term(&self, text: &str) -> String {
        self.paint(text, Style::new().cyan())
    }

    /// Numeric values (bold)
    pub fn value(&self, text: &str) -> String {
        self.paint(text, Style::new().bold())
    }

    /// Secondary text
    pub fn dim(&self, text: &str) -> String {
        self.paint(text, Style::new().dimmed())
    }

    pub fn region(&self, text: &str, region: Region) -> String {
        self.paint(text, region.style())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_region_areas() {
        let q = Quadrants::from_inputs(0.5, 0.5, 0.5);
        for region in Region::ALL {
            assert_eq!(region.area(&q), 0.25);
        }
    }

    #[test]
    fn test_plain_palette_passes_through() {
        let palette = Palette::new(false);
        assert_eq!(palette.heading("Maths"), "Maths");
        assert_eq!(palette.region("24%", Region::HypothesisEvidence), "24%");
    }

    #[test]
    fn test_colored_palette_emits_ansi() {
        let palette = Palette::new(true);
        let painted = palette.region("24%", Region::NotHypothesisEvidence);
        assert!(painted.contains("\x1b["));
        assert!(painted.contains("24%"));
    }
}
