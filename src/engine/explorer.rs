//! Edit session over one estimation result.
//!
//! Captures the record as it arrived from the estimator and tracks the
//! user's edits on a separate current record, so `reset` can always return
//! to the estimated numbers and rationale.

use crate::types::{ProbabilityField, ProbabilityRecord};

use super::bayes::recompute;
use super::quadrants::{PanelGroup, PanelLayout, Quadrants};

#[derive(Debug, Clone)]
pub struct Explorer {
    snapshot: ProbabilityRecord,
    current: ProbabilityRecord,
    edits: usize,
}

impl Explorer {
    pub fn new(record: ProbabilityRecord) -> Self {
        Self {
            current: record.clone(),
            snapshot: record,
            edits: 0,
        }
    }

    /// Record as it was when the estimation arrived.
    pub fn snapshot(&self) -> &ProbabilityRecord {
        &self.snapshot
    }

    pub fn current(&self) -> &ProbabilityRecord {
        &self.current
    }

    /// Number of edits applied since creation or the last reset.
    pub fn edits(&self) -> usize {
        self.edits
    }

    pub fn is_modified(&self) -> bool {
        self.current != self.snapshot
    }

    pub fn edit(&mut self, field: ProbabilityField, value: f64) -> &ProbabilityRecord {
        self.current = recompute(&self.current, field, value);
        self.edits += 1;
        &self.current
    }

    /// Apply a panel drag (sizes in percent or fractions).
    pub fn drag(&mut self, group: PanelGroup, sizes: [f64; 2]) -> &ProbabilityRecord {
        let (field, value) = PanelLayout::drag(group, sizes);
        self.edit(field, value)
    }

    /// Discard all edits.
    pub fn reset(&mut self) -> &ProbabilityRecord {
        self.current = self.snapshot.clone();
        self.edits = 0;
        &self.current
    }

    pub fn quadrants(&self) -> Quadrants {
        Quadrants::from_record(&self.current)
    }

    pub fn layout(&self) -> PanelLayout {
        PanelLayout::from_record(&self.current)
    }
}
