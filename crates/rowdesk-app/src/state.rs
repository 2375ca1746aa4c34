// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use crate::{
    ColumnDescriptor, ContactMap, PlatformFilter, Row, SESSION_COLUMN, SearchColumn, ViewMode,
    has_column,
};

/// Everything the table view knows about the loaded page.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ViewState {
    pub table: Option<String>,
    pub rows: Vec<Row>,
    pub columns: Vec<ColumnDescriptor>,
    pub contacts: ContactMap,
    pub view_mode: ViewMode,
    pub active_platform: PlatformFilter,
    pub search_term: String,
    pub search_column: SearchColumn,
    /// Present only while a platform chip or search term narrows the view.
    pub filtered_rows: Option<Vec<Row>>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ViewCommand {
    SetViewMode(ViewMode),
    ToggleViewMode,
    SetPlatform(PlatformFilter),
    SetSearchTerm(String),
    SetSearchColumn(SearchColumn),
    CycleSearchColumn,
    ClearFilter,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ViewEvent {
    ViewModeChanged(ViewMode),
    ViewModeUnavailable,
    PlatformChanged(PlatformFilter),
    SearchTermChanged(String),
    SearchColumnChanged(SearchColumn),
    FilterCleared,
}

impl ViewEvent {
    /// Events after which the filtered rows must be rebuilt right away.
    pub const fn needs_recompute(&self) -> bool {
        matches!(
            self,
            Self::ViewModeChanged(_)
                | Self::PlatformChanged(_)
                | Self::SearchTermChanged(_)
                | Self::SearchColumnChanged(_)
                | Self::FilterCleared
        )
    }
}

impl ViewState {
    /// Fresh state for a newly loaded table. Tables with a session column open
    /// in conversations mode and search that column by default.
    pub fn for_table(
        table: impl Into<String>,
        rows: Vec<Row>,
        columns: Vec<ColumnDescriptor>,
        contacts: ContactMap,
    ) -> Self {
        let has_sessions = has_column(&columns, SESSION_COLUMN);
        Self {
            table: Some(table.into()),
            rows,
            columns,
            contacts,
            view_mode: if has_sessions {
                ViewMode::Conversations
            } else {
                ViewMode::All
            },
            active_platform: PlatformFilter::All,
            search_term: String::new(),
            search_column: if has_sessions {
                SearchColumn::Column(SESSION_COLUMN.to_owned())
            } else {
                SearchColumn::AllColumns
            },
            filtered_rows: None,
        }
    }

    pub fn has_session_column(&self) -> bool {
        has_column(&self.columns, SESSION_COLUMN)
    }

    /// Whether any non-default filter narrows the base view.
    pub fn filter_active(&self) -> bool {
        !self.active_platform.is_all() || !self.search_term.trim().is_empty()
    }

    pub fn dispatch(&mut self, command: ViewCommand) -> Vec<ViewEvent> {
        match command {
            ViewCommand::SetViewMode(mode) => self.set_view_mode(mode),
            ViewCommand::ToggleViewMode => self.set_view_mode(self.view_mode.toggled()),
            ViewCommand::SetPlatform(platform) => {
                self.active_platform = platform;
                vec![ViewEvent::PlatformChanged(platform)]
            }
            ViewCommand::SetSearchTerm(term) => {
                self.search_term = term.clone();
                vec![ViewEvent::SearchTermChanged(term)]
            }
            ViewCommand::SetSearchColumn(column) => {
                self.search_column = column.clone();
                vec![ViewEvent::SearchColumnChanged(column)]
            }
            ViewCommand::CycleSearchColumn => {
                self.search_column = self.search_column.cycled(&self.columns);
                vec![ViewEvent::SearchColumnChanged(self.search_column.clone())]
            }
            ViewCommand::ClearFilter => {
                self.active_platform = PlatformFilter::All;
                self.search_term.clear();
                self.filtered_rows = None;
                vec![ViewEvent::FilterCleared]
            }
        }
    }

    fn set_view_mode(&mut self, mode: ViewMode) -> Vec<ViewEvent> {
        if mode == ViewMode::Conversations && !self.has_session_column() {
            return vec![ViewEvent::ViewModeUnavailable];
        }
        self.view_mode = mode;
        vec![ViewEvent::ViewModeChanged(mode)]
    }
}
