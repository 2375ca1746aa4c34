// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use crate::{ColumnDescriptor, ContactMap, Row};
use anyhow::{Context, Result};
use serde::{Deserialize, Deserializer};
use serde_json::Value;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct TableSummary {
    pub table_name: String,
    #[serde(default, deserialize_with = "deserialize_count")]
    pub row_count: Option<i64>,
    #[serde(default, deserialize_with = "deserialize_count")]
    pub column_count: Option<i64>,
}

impl TableSummary {
    pub fn new(table_name: impl Into<String>) -> Self {
        Self {
            table_name: table_name.into(),
            row_count: None,
            column_count: None,
        }
    }
}

/// Counts arrive as numbers or, for bigint aggregates, as numeric strings.
pub fn deserialize_count<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<Value>::deserialize(deserializer)? {
        Some(Value::Number(number)) => number.as_i64(),
        Some(Value::String(text)) => text.trim().parse().ok(),
        _ => None,
    })
}

/// Read side of the backing store. Implementations return already decoded
/// collections; the view engine does no validation of its own.
pub trait DataSource {
    fn list_tables(&mut self) -> Result<Vec<TableSummary>>;
    fn fetch_columns(&mut self, table: &str) -> Result<Vec<ColumnDescriptor>>;
    fn fetch_rows(&mut self, table: &str) -> Result<Vec<Row>>;
    fn fetch_contact_map(&mut self) -> Result<ContactMap>;
}

#[derive(Debug, Clone, PartialEq)]
pub struct TablePage {
    pub table: String,
    pub columns: Vec<ColumnDescriptor>,
    pub rows: Vec<Row>,
}

pub fn load_page<S: DataSource + ?Sized>(source: &mut S, table: &str) -> Result<TablePage> {
    let columns = source
        .fetch_columns(table)
        .with_context(|| format!("fetch columns for table {table}"))?;
    let rows = source
        .fetch_rows(table)
        .with_context(|| format!("fetch rows for table {table}"))?;
    tracing::debug!(table, rows = rows.len(), columns = columns.len(), "loaded table page");
    Ok(TablePage {
        table: table.to_owned(),
        columns,
        rows,
    })
}

/// The contacts table is optional; any failure degrades to an empty map.
pub fn load_contacts_or_empty<S: DataSource + ?Sized>(source: &mut S) -> ContactMap {
    match source.fetch_contact_map() {
        Ok(contacts) => contacts,
        Err(error) => {
            tracing::warn!("contact names unavailable: {error:#}");
            ContactMap::new()
        }
    }
}
