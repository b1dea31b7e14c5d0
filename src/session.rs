//! Stateful exploration over one estimated scenario.
//!
//! `Workbench` is the Presentation Layer's single entry point: it submits a
//! scenario through the estimator, keeps the resulting `Explorer`, and
//! answers every edit, drag and reset with a fresh `ExplorerView`. The CLI
//! and the MCP server both drive it.

use parking_lot::Mutex;
use schemars::JsonSchema;
use serde::Serialize;
use thiserror::Error;

use crate::cache::{maintenance, CacheError, ResultCache};
use crate::engine::{Derivation, Explorer, PanelGroup, PanelLayout, ProbabilityField, Quadrants};
use crate::estimate::{EstimationSource, Estimator, LlmClient};
use crate::types::{ProbabilityRecord, Scenario, ScenarioError};

#[derive(Debug, Error)]
pub enum SessionError {
    #[error(transparent)]
    Scenario(#[from] ScenarioError),

    #[error("nothing to explore yet: estimate a scenario first")]
    NoScenario,

    #[error(transparent)]
    Cache(#[from] CacheError),
}

/// Everything a front end needs to draw the current state.
#[derive(Debug, Clone, Serialize, JsonSchema)]
pub struct ExplorerView {
    pub scenario: Scenario,
    pub source: EstimationSource,
    /// Estimation failure message, when `source` is `failed`.
    pub error: Option<String>,
    pub record: ProbabilityRecord,
    /// Exact region areas in percent.
    pub quadrants: Quadrants,
    /// Panel sizes in percent.
    pub layout: PanelLayout,
    /// Region areas as drawn (25% each in the degenerate case).
    pub displayed: Quadrants,
    pub derivation: Derivation,
    /// Edits since the estimation arrived or the last reset.
    pub edits: usize,
    pub modified: bool,
}

/// Scenarios offered for selection.
#[derive(Debug, Clone, Serialize, JsonSchema)]
pub struct ScenarioList {
    /// Previously estimated, from the result cache.
    pub cached: Vec<Scenario>,
    /// Built-in starting points.
    pub examples: Vec<Scenario>,
}

struct Session {
    scenario: Scenario,
    source: EstimationSource,
    error: Option<String>,
    explorer: Explorer,
}

impl Session {
    fn view(&self) -> ExplorerView {
        let record = self.explorer.current().clone();
        let layout = self.explorer.layout();
        ExplorerView {
            scenario: self.scenario.clone(),
            source: self.source,
            error: self.error.clone(),
            quadrants: self.explorer.quadrants().percentages(),
            displayed: layout.displayed_percentages(),
            layout,
            derivation: Derivation::from_record(&record),
            edits: self.explorer.edits(),
            modified: self.explorer.is_modified(),
            record,
        }
    }
}

pub struct Workbench<L, C> {
    estimator: Estimator<L, C>,
    session: Mutex<Option<Session>>,
}

impl<L: LlmClient, C: ResultCache> Workbench<L, C> {
    pub fn new(estimator: Estimator<L, C>) -> Self {
        Self {
            estimator,
            session: Mutex::new(None),
        }
    }

    pub fn estimator(&self) -> &Estimator<L, C> {
        &self.estimator
    }

    /// Validate and estimate a scenario, replacing any current exploration.
    ///
    /// A failed estimation still opens a session over the zeroed record, so
    /// the front end can show the error next to an empty grid.
    pub async fn estimate(
        &self,
        hypothesis: &str,
        evidence: &str,
    ) -> Result<ExplorerView, SessionError> {
        let scenario = Scenario::validated(hypothesis, evidence)?;
        let estimation = self.estimator.estimate(&scenario).await;

        let session = Session {
            scenario,
            source: estimation.source(),
            error: estimation.error().map(|e| e.to_string()),
            explorer: Explorer::new(estimation.into_record()),
        };
        let view = session.view();
        *self.session.lock() = Some(session);
        Ok(view)
    }

    pub fn view(&self) -> Result<ExplorerView, SessionError> {
        self.with_session(|_| ())
    }

    pub fn edit(&self, field: ProbabilityField, value: f64) -> Result<ExplorerView, SessionError> {
        self.with_session(|explorer| {
            explorer.edit(field, value);
        })
    }

    pub fn drag(&self, group: PanelGroup, sizes: [f64; 2]) -> Result<ExplorerView, SessionError> {
        self.with_session(|explorer| {
            explorer.drag(group, sizes);
        })
    }

    pub fn reset(&self) -> Result<ExplorerView, SessionError> {
        self.with_session(|explorer| {
            explorer.reset();
        })
    }

    fn with_session(
        &self,
        apply: impl FnOnce(&mut Explorer),
    ) -> Result<ExplorerView, SessionError> {
        let mut guard = self.session.lock();
        let session = guard.as_mut().ok_or(SessionError::NoScenario)?;
        apply(&mut session.explorer);
        Ok(session.view())
    }

    pub async fn list_scenarios(&self) -> Result<ScenarioList, SessionError> {
        let cached = maintenance::list_scenarios(self.estimator.cache()).await?;
        Ok(ScenarioList {
            cached,
            examples: Scenario::examples(),
        })
    }

    /// Drop every cached result. The open session, if any, is kept.
    pub async fn flush_cache(&self) -> Result<usize, SessionError> {
        Ok(maintenance::flush(self.estimator.cache()).await?)
    }
}
