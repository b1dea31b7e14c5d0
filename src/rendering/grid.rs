//! "Geometry" view: the unit square drawn as a character grid.
//!
//! Columns are split by P(H); each column is split by its likelihood, with
//! the evidence-observed region at the bottom:
//!
//! ```text
//! ░░░░░░░░░░░░··························
//! ░░░ 6% ░░░░········ 63% ··············
//! ▓▓▓▓▓▓▓▓▓▓▓▓··························
//! ▓▓▓ 24% ▓▓▓▓▒▒▒▒▒▒▒▒▒ 7% ▒▒▒▒▒▒▒▒▒▒▒▒▒
//! ```
//!
//! Proportions come from `PanelLayout`, so the degenerate case (both
//! likelihoods zero) draws four equal regions.

use crate::engine::{PanelLayout, Quadrants};
use crate::types::ProbabilityRecord;

use super::colors::{Palette, Region};

const DEFAULT_WIDTH: usize = 48;
const DEFAULT_HEIGHT: usize = 12;

impl Region {
    /// Fill glyph, distinct per region so the grid reads without color.
    fn glyph(&self) -> char {
        match self {
            Region::HypothesisEvidence => '▓',
            Region::HypothesisNotEvidence => '░',
            Region::NotHypothesisEvidence => '▒',
            Region::NotHypothesisNotEvidence => '·',
        }
    }
}

/// Rectangle of cells `[col_start, col_end) × [row_start, row_end)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Span {
    col_start: usize,
    col_end: usize,
    row_start: usize,
    row_end: usize,
}

impl Span {
    fn is_empty(&self) -> bool {
        self.col_start >= self.col_end || self.row_start >= self.row_end
    }

    fn width(&self) -> usize {
        self.col_end.saturating_sub(self.col_start)
    }
}

fn scaled(percent: f64, extent: usize) -> usize {
    ((percent / 100.0) * extent as f64).round().clamp(0.0, extent as f64) as usize
}

pub struct GridRenderer {
    palette: Palette,
    width: usize,
    height: usize,
}

impl GridRenderer {
    pub fn new(palette: Palette) -> Self {
        Self {
            palette,
            width: DEFAULT_WIDTH,
            height: DEFAULT_HEIGHT,
        }
    }

    pub fn with_size(mut self, width: usize, height: usize) -> Self {
        self.width = width.max(2);
        self.height = height.max(2);
        self
    }

    fn spans(&self, layout: &PanelLayout) -> [(Region, Span); 4] {
        let split = scaled(layout.hypothesis[0], self.width);
        let left_top = scaled(layout.likelihood[0], self.height);
        let right_top = scaled(layout.alt_likelihood[0], self.height);
        let (w, h) = (self.width, self.height);
        [
            (
                Region::HypothesisNotEvidence,
                Span { col_start: 0, col_end: split, row_start: 0, row_end: left_top },
            ),
            (
                Region::HypothesisEvidence,
                Span { col_start: 0, col_end: split, row_start: left_top, row_end: h },
            ),
            (
                Region::NotHypothesisNotEvidence,
                Span { col_start: split, col_end: w, row_start: 0, row_end: right_top },
            ),
            (
                Region::NotHypothesisEvidence,
                Span { col_start: split, col_end: w, row_start: right_top, row_end: h },
            ),
        ]
    }

    /// The grid alone, one line per row.
    pub fn render_grid(&self, record: &ProbabilityRecord) -> String {
        let layout = PanelLayout::from_record(record);
        let shown = layout.displayed_percentages();
        let spans = self.spans(&layout);

        // (glyph, region, is_label) per cell
        let mut cells = vec![vec![(' ', Region::NotHypothesisNotEvidence, false); self.width]; self.height];
        for (region, span) in spans {
            for row in cells.iter_mut().take(span.row_end).skip(span.row_start) {
                for cell in row.iter_mut().take(span.col_end).skip(span.col_start) {
                    *cell = (region.glyph(), region, false);
                }
            }
        }

        for (region, span) in spans {
            let label = format!(" {:.0}% ", region.area(&shown));
            let len = label.chars().count();
            if span.is_empty() || span.width() < len {
                continue;
            }
            let row = span.row_start + (span.row_end - span.row_start) / 2;
            let start = span.col_start + (span.width() - len) / 2;
            for (offset, c) in label.chars().enumerate() {
                cells[row][start + offset] = (c, region, true);
            }
        }

        let mut lines = Vec::with_capacity(self.height);
        for row in &cells {
            let mut line = String::new();
            let mut run = String::new();
            let mut current: Option<(Region, bool)> = None;
            for &(c, region, is_label) in row {
                if current != Some((region, is_label)) {
                    if let Some((r, l)) = current {
                        line.push_str(&self.paint_run(&run, r, l));
                    }
                    run.clear();
                    current = Some((region, is_label));
                }
                run.push(c);
            }
            if let Some((r, l)) = current {
                line.push_str(&self.paint_run(&run, r, l));
            }
            lines.push(line);
        }
        lines.join("\n")
    }

    fn paint_run(&self, run: &str, region: Region, is_label: bool) -> String {
        if is_label {
            self.palette.value(run)
        } else {
            self.palette.region(run, region)
        }
    }

    /// Axis line, grid and a legend with captions.
    pub fn render(&self, record: &ProbabilityRecord) -> String {
        let mut out = String::new();
        out.push_str(&self.palette.heading("Geometry"));
        out.push('\n');
        out.push_str(&self.palette.dim(&format!(
            "P(H) = {:.2}   P(¬H) = {:.2}   P(E|H) = {:.2}   P(E|¬H) = {:.2}",
            record.prior(),
            1.0 - record.prior(),
            record.likelihood(),
            record.alt_likelihood()
        )));
        out.push('\n');
        out.push_str(&self.render_grid(record));
        out.push('\n');
        out.push_str(&self.render_legend(record));
        out
    }

    fn render_legend(&self, record: &ProbabilityRecord) -> String {
        let exact = Quadrants::from_record(record).percentages();
        let captions = &record.rationale().captions;
        let mut lines = Vec::new();
        for region in Region::ALL {
            let mut line = format!(
                "{} {:<7} {:<17} {:>7}",
                self.palette.region(&region.glyph().to_string().repeat(2), region),
                region.label(),
                region.term(),
                format!("{:.2}%", region.area(&exact)),
            );
            let caption = region.caption(captions);
            if !caption.is_empty() {
                line.push_str("  ");
                line.push_str(&self.palette.dim(caption));
            }
            lines.push(line);
        }
        lines.join("\n") + "\n"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{QuadrantCaptions, Rationale};

    fn record(prior: f64, likelihood: f64, alt: f64) -> ProbabilityRecord {
        ProbabilityRecord::new(prior, likelihood, alt, Rationale::default()).unwrap()
    }

    fn count(grid: &str, glyph: char) -> usize {
        grid.chars().filter(|&c| c == glyph).count()
    }

    #[test]
    fn test_grid_dimensions() {
        let grid = GridRenderer::new(Palette::new(false))
            .with_size(40, 10)
            .render_grid(&record(0.3, 0.8, 0.1));
        let lines: Vec<_> = grid.lines().collect();
        assert_eq!(lines.len(), 10);
        assert!(lines.iter().all(|l| l.chars().count() == 40));
    }

    #[test]
    fn test_even_split_labels() {
        let grid = GridRenderer::new(Palette::new(false))
            .with_size(40, 10)
            .render_grid(&record(0.5, 0.5, 0.5));
        assert_eq!(grid.matches("25%").count(), 4);
    }

    #[test]
    fn test_degenerate_draws_four_equal_regions() {
        let grid = GridRenderer::new(Palette::new(false))
            .with_size(40, 10)
            .render_grid(&record(0.3, 0.0, 0.0));
        assert_eq!(grid.matches("25%").count(), 4);
        assert!(count(&grid, '▓') > 0);
        assert!(count(&grid, '▒') > 0);
    }

    #[test]
    fn test_region_proportions() {
        let grid = GridRenderer::new(Palette::new(false))
            .with_size(100, 10)
            .render_grid(&record(1.0, 1.0, 0.0));
        // Whole square is H ∧ E apart from its label
        assert_eq!(count(&grid, '░'), 0);
        assert_eq!(count(&grid, '▒'), 0);
        assert!(grid.contains("100%"));
    }

    #[test]
    fn test_legend_includes_captions() {
        let r = record(0.3, 0.8, 0.1).with_rationale(Rationale {
            captions: QuadrantCaptions {
                hypothesis_evidence: "Shy librarians".into(),
                ..Default::default()
            },
            ..Default::default()
        });
        let out = GridRenderer::new(Palette::new(false)).render(&r);
        assert!(out.starts_with("Geometry\n"));
        assert!(out.contains("24.00%"));
        assert!(out.contains("Shy librarians"));
    }
}
