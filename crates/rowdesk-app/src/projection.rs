// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use crate::pipeline::{base_rows, filter_platform};
use crate::{Row, ViewMode, ViewState};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CountLabel {
    Rows,
    Contacts,
}

impl CountLabel {
    pub const fn for_mode(mode: ViewMode) -> Self {
        match mode {
            ViewMode::All => Self::Rows,
            ViewMode::Conversations => Self::Contacts,
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Rows => "rows",
            Self::Contacts => "contacts",
        }
    }
}

/// What the renderer shows for the current state.
#[derive(Debug, Clone, PartialEq)]
pub struct Projection {
    pub display_rows: Vec<Row>,
    pub shown: usize,
    /// Base view after dedup and platform filtering, before the search term.
    pub total: usize,
    pub label: CountLabel,
    pub filtered: bool,
}

impl Projection {
    pub fn row_count_text(&self) -> String {
        if self.filtered {
            format!("{} {} (filtered)", self.shown, self.label.as_str())
        } else {
            format!("{} {}", self.total, self.label.as_str())
        }
    }

    pub fn result_count_text(&self) -> String {
        if self.filtered {
            format!("{} of {}", self.shown, self.total)
        } else {
            String::new()
        }
    }
}

/// `total` is the base view after dedup and the platform chip, so "shown of
/// total" only reflects the search term. It is not the deduplicated count.
pub fn project(state: &ViewState) -> Projection {
    let base = base_rows(state);
    let total = if state.active_platform.is_all() {
        base.len()
    } else {
        filter_platform(&base, state.active_platform).len()
    };
    let display_rows = match &state.filtered_rows {
        Some(rows) => rows.clone(),
        None => base.into_owned(),
    };

    Projection {
        shown: display_rows.len(),
        display_rows,
        total,
        label: CountLabel::for_mode(state.view_mode),
        filtered: state.filtered_rows.is_some(),
    }
}
