//! Session state management
//!
//! The session owns the single current-result-set reference, the active
//! view, and the chart surface. Components stay pure functions of the data
//! they are handed; this is the only place mutation happens.

use crate::result::{QueryResponse, ResultSet};
use crate::EngineError;

/// Which of the result views is currently shown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ActiveView {
    #[default]
    Table,
    Chart,
    Statistics,
    Report,
}

/// Per-session state driven by user actions on a single logical thread.
#[derive(Debug, Default)]
pub struct SessionState {
    current: Option<ResultSet>,
    active_view: ActiveView,
}

impl SessionState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply a completed query response. A response carrying an error field
    /// leaves all prior state untouched and surfaces the message verbatim.
    pub fn apply_response(&mut self, response: QueryResponse) -> Result<(), EngineError> {
        if let Some(message) = response.error {
            return Err(EngineError::Upstream(message));
        }
        tracing::debug!(
            rows = response.results.len(),
            columns = response.columns.len(),
            "replacing current result set"
        );
        self.current = Some(ResultSet::new(response.columns, response.results));
        Ok(())
    }

    /// The current result set, if any query has completed.
    pub fn results(&self) -> Option<&ResultSet> {
        self.current.as_ref()
    }

    pub fn active_view(&self) -> ActiveView {
        self.active_view
    }

    /// Transition to another view. All pairwise show/hide behavior follows
    /// from this single enum.
    pub fn show(&mut self, view: ActiveView) {
        self.active_view = view;
    }
}

/// Holds at most one live chart instance per rendering surface. The old
/// instance is dropped before the replacement is constructed, so repeated
/// re-renders never leak renderer resources.
#[derive(Debug, Default)]
pub struct ChartSurface<C> {
    current: Option<C>,
}

impl<C> ChartSurface<C> {
    pub fn new() -> Self {
        Self { current: None }
    }

    /// Tear down the previous instance, then build and mount the new one.
    pub fn mount_with(&mut self, build: impl FnOnce() -> C) -> &mut C {
        self.current = None;
        self.current.insert(build())
    }

    pub fn clear(&mut self) {
        self.current = None;
    }

    pub fn current(&self) -> Option<&C> {
        self.current.as_ref()
    }
}
