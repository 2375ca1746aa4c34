// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use crate::pipeline::recompute;
use crate::{
    ColumnDescriptor, ContactMap, Debouncer, PlatformFilter, Projection, Row, SearchColumn,
    ViewCommand, ViewEvent, ViewMode, ViewState, project,
};
use std::time::{Duration, Instant};

/// Receives every projection the controller produces.
pub trait ProjectionSink {
    fn publish(&mut self, projection: &Projection);
}

/// Discards projections; for callers that only pull via `projection()`.
impl ProjectionSink for () {
    fn publish(&mut self, _projection: &Projection) {}
}

/// Keeps every projection in publish order.
impl ProjectionSink for Vec<Projection> {
    fn publish(&mut self, projection: &Projection) {
        self.push(projection.clone());
    }
}

/// Sole owner of the table view state. Mutations go through the methods
/// below; each one that changes what is visible recomputes the filters and
/// publishes the new projection to the sink.
pub struct ViewController<K> {
    state: ViewState,
    sink: K,
    search: Debouncer<String>,
}

impl<K: ProjectionSink> ViewController<K> {
    pub fn new(sink: K, search_delay: Duration) -> Self {
        Self {
            state: ViewState::default(),
            sink,
            search: Debouncer::new(search_delay),
        }
    }

    pub fn state(&self) -> &ViewState {
        &self.state
    }

    pub fn sink(&self) -> &K {
        &self.sink
    }

    pub fn sink_mut(&mut self) -> &mut K {
        &mut self.sink
    }

    pub fn projection(&self) -> Projection {
        project(&self.state)
    }

    /// Replaces the state with a fresh one for `table`. Contact names survive
    /// table switches.
    pub fn load_table(
        &mut self,
        table: impl Into<String>,
        rows: Vec<Row>,
        columns: Vec<ColumnDescriptor>,
    ) {
        self.search.cancel();
        let contacts = std::mem::take(&mut self.state.contacts);
        self.state = ViewState::for_table(table, rows, columns, contacts);
        tracing::debug!(
            table = self.state.table.as_deref().unwrap_or_default(),
            rows = self.state.rows.len(),
            mode = self.state.view_mode.as_str(),
            "table loaded"
        );
        self.refresh();
    }

    pub fn set_contacts(&mut self, contacts: ContactMap) {
        self.state.contacts = contacts;
        if self.state.table.is_some() {
            self.refresh();
        }
    }

    pub fn set_view_mode(&mut self, mode: ViewMode) -> Vec<ViewEvent> {
        self.apply(ViewCommand::SetViewMode(mode))
    }

    pub fn toggle_view_mode(&mut self) -> Vec<ViewEvent> {
        self.apply(ViewCommand::ToggleViewMode)
    }

    pub fn set_platform_filter(&mut self, platform: PlatformFilter) -> Vec<ViewEvent> {
        self.apply(ViewCommand::SetPlatform(platform))
    }

    pub fn set_search_column(&mut self, column: SearchColumn) -> Vec<ViewEvent> {
        self.apply(ViewCommand::SetSearchColumn(column))
    }

    pub fn cycle_search_column(&mut self) -> Vec<ViewEvent> {
        self.apply(ViewCommand::CycleSearchColumn)
    }

    /// Debounced: the term is applied by [`Self::flush_search`] once input has
    /// been quiet for the configured delay.
    pub fn set_search_term(&mut self, term: impl Into<String>, now: Instant) {
        let token = self.search.schedule(term.into(), now);
        tracing::trace!(token, "search recompute scheduled");
    }

    /// Applies a pending search term whose deadline has passed. Returns
    /// whether a recompute ran.
    pub fn flush_search(&mut self, now: Instant) -> bool {
        let Some(term) = self.search.poll(now) else {
            return false;
        };
        self.commit_search(term);
        true
    }

    pub fn next_deadline(&self) -> Option<Instant> {
        self.search.deadline()
    }

    /// The term typed so far, including one still waiting on the debounce.
    pub fn search_input(&self) -> &str {
        self.search
            .peek()
            .map(String::as_str)
            .unwrap_or(self.state.search_term.as_str())
    }

    pub fn clear_filter(&mut self) -> Vec<ViewEvent> {
        self.search.cancel();
        self.apply(ViewCommand::ClearFilter)
    }

    fn commit_search(&mut self, term: String) {
        let events = self.state.dispatch(ViewCommand::SetSearchTerm(term));
        tracing::debug!(term = %self.state.search_term, "search term applied");
        if events.iter().any(ViewEvent::needs_recompute) {
            self.refresh();
        }
    }

    fn apply(&mut self, command: ViewCommand) -> Vec<ViewEvent> {
        // A pending term is folded in so the immediate recompute sees it.
        let folded = match self.search.cancel() {
            Some(term) => {
                self.state.search_term = term;
                true
            }
            None => false,
        };
        let events = self.state.dispatch(command);
        if folded || events.iter().any(ViewEvent::needs_recompute) {
            self.refresh();
        }
        events
    }

    fn refresh(&mut self) {
        recompute(&mut self.state);
        let projection = project(&self.state);
        self.sink.publish(&projection);
    }
}
