// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use crate::config::Config;
use anyhow::{Context, Result};
use rowdesk_app::{ColumnDescriptor, ContactMap, DataSource, Row, TableSummary};
use rowdesk_testkit::{DemoSource, HistorySeed};

/// Where rows come from: the admin webhook, or seeded in-memory tables for `--demo`.
#[derive(Debug)]
pub enum Backend {
    Api(rowdesk_api::Client),
    Demo(DemoSource),
}

impl Backend {
    pub fn from_config(config: &Config, demo: bool) -> Result<Self> {
        if demo {
            return Ok(Self::Demo(DemoSource::seeded(&HistorySeed::default())));
        }

        let token = config.api_token();
        let client = rowdesk_api::Client::new(
            config.api_base_url(),
            token.as_deref(),
            config.api_timeout()?,
        )
        .context("invalid [api] config; fix base_url/timeout values")?
        .with_contacts_table(config.contacts_table());
        Ok(Self::Api(client))
    }

    pub fn describe(&self) -> String {
        match self {
            Self::Api(client) => format!(
                "api {} (token: {}, contacts: {})",
                client.base_url(),
                if client.has_token() { "set" } else { "none" },
                client.contacts_table()
            ),
            Self::Demo(_) => "demo data (in-memory)".to_owned(),
        }
    }

    /// One-shot startup check used by `--check`.
    pub fn check(&mut self) -> Result<String> {
        let description = self.describe();
        let summary = match self {
            Self::Api(client) => {
                let stats = client.ping()?;
                format!(
                    "{} tables, {} rows, {} columns, size {}",
                    count_text(stats.total_tables),
                    count_text(stats.total_rows),
                    count_text(stats.total_columns),
                    stats.db_size.as_deref().unwrap_or("unknown")
                )
            }
            Self::Demo(source) => {
                let tables = source.list_tables()?;
                let rows: i64 = tables.iter().filter_map(|table| table.row_count).sum();
                format!("{} tables, {} rows", tables.len(), rows)
            }
        };
        tracing::info!(backend = %description, %summary, "startup check passed");
        Ok(format!("ok: {description}\n{summary}"))
    }
}

fn count_text(count: Option<i64>) -> String {
    count.map_or_else(|| "?".to_owned(), |count| count.to_string())
}

impl DataSource for Backend {
    fn list_tables(&mut self) -> Result<Vec<TableSummary>> {
        match self {
            Self::Api(client) => DataSource::list_tables(client),
            Self::Demo(source) => source.list_tables(),
        }
    }

    fn fetch_columns(&mut self, table: &str) -> Result<Vec<ColumnDescriptor>> {
        match self {
            Self::Api(client) => client.fetch_columns(table),
            Self::Demo(source) => source.fetch_columns(table),
        }
    }

    fn fetch_rows(&mut self, table: &str) -> Result<Vec<Row>> {
        match self {
            Self::Api(client) => client.fetch_rows(table),
            Self::Demo(source) => source.fetch_rows(table),
        }
    }

    fn fetch_contact_map(&mut self) -> Result<ContactMap> {
        match self {
            Self::Api(client) => client.fetch_contact_map(),
            Self::Demo(source) => source.fetch_contact_map(),
        }
    }
}
