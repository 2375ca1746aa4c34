// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

//! Dedup, platform and free-text stages, always applied in that order.

use crate::search::{matches_normalized, normalize_term};
use crate::{
    ContactMap, PlatformFilter, Row, SearchColumn, ViewMode, ViewState, classify, dedupe,
    session_key,
};
use std::borrow::Cow;

/// Stage one: conversations mode collapses rows per session.
pub fn base_rows(state: &ViewState) -> Cow<'_, [Row]> {
    match state.view_mode {
        ViewMode::Conversations => Cow::Owned(dedupe(&state.rows)),
        ViewMode::All => Cow::Borrowed(&state.rows),
    }
}

/// Stage two. Rows without a session classify as `Other`.
pub fn filter_platform(rows: &[Row], platform: PlatformFilter) -> Vec<Row> {
    if platform.is_all() {
        return rows.to_vec();
    }
    rows.iter()
        .filter(|row| {
            let session = session_key(row).unwrap_or_default();
            platform.admits(classify(&session))
        })
        .cloned()
        .collect()
}

/// Stage three.
pub fn filter_search(
    rows: Vec<Row>,
    term: &str,
    column: &SearchColumn,
    contacts: &ContactMap,
) -> Vec<Row> {
    let needle = normalize_term(term);
    if needle.is_empty() {
        return rows;
    }
    rows.into_iter()
        .filter(|row| matches_normalized(row, &needle, column, contacts))
        .collect()
}

/// Runs all three stages without touching `state`.
pub fn run(state: &ViewState) -> Vec<Row> {
    let base = base_rows(state);
    let platform_filtered = filter_platform(&base, state.active_platform);
    filter_search(
        platform_filtered,
        &state.search_term,
        &state.search_column,
        &state.contacts,
    )
}

/// Runs the pipeline and caches the result in `state.filtered_rows` when a
/// filter is active, clearing it otherwise.
pub fn recompute(state: &mut ViewState) -> Vec<Row> {
    let result = run(state);
    state.filtered_rows = if state.filter_active() {
        Some(result.clone())
    } else {
        None
    };
    result
}
