// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use crate::model::{Row, session_key, truthy_id};
use std::collections::HashMap;

/// Collapses rows into one winner per session, most recent first.
///
/// The first row seen for a session is its initial winner. A later row only
/// takes over when both its id and the winner's id are truthy numbers and the
/// later id is strictly greater, so a session whose first row has no usable
/// id keeps that row. Rows without a session are dropped. Winners are sorted
/// by id descending with missing ids ranked as zero; ties keep the order in
/// which their sessions first appeared.
pub fn dedupe(rows: &[Row]) -> Vec<Row> {
    let mut slots: HashMap<String, usize> = HashMap::new();
    let mut winners: Vec<&Row> = Vec::new();

    for row in rows {
        let Some(session) = session_key(row) else {
            continue;
        };
        match slots.get(&session) {
            Some(&slot) => {
                if replaces(row, winners[slot]) {
                    winners[slot] = row;
                }
            }
            None => {
                slots.insert(session, winners.len());
                winners.push(row);
            }
        }
    }

    winners.sort_by(|left, right| sort_rank(right).total_cmp(&sort_rank(left)));
    winners.into_iter().cloned().collect()
}

fn replaces(candidate: &Row, winner: &Row) -> bool {
    match (truthy_id(candidate), truthy_id(winner)) {
        (Some(candidate), Some(winner)) => candidate > winner,
        _ => false,
    }
}

fn sort_rank(row: &Row) -> f64 {
    truthy_id(row).unwrap_or(0.0)
}
