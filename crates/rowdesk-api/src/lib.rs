// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

//! Client for the admin webhook. Every call is a POST to
//! `<base>?action=<name>&<params>` carrying the same params in a JSON body.

use anyhow::{Context, Result, anyhow, bail};
use reqwest::StatusCode;
use reqwest::blocking::Client as HttpClient;
use rowdesk_app::{
    ColumnDescriptor, ContactMap, DataSource, Row, TableSummary, deserialize_count,
};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use std::time::Duration;
use url::Url;

pub const DEFAULT_CONTACTS_TABLE: &str = "contacts";

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct DatabaseStats {
    #[serde(default, deserialize_with = "deserialize_count")]
    pub total_tables: Option<i64>,
    #[serde(default, deserialize_with = "deserialize_count")]
    pub total_rows: Option<i64>,
    #[serde(default, deserialize_with = "deserialize_count")]
    pub total_columns: Option<i64>,
    #[serde(default)]
    pub db_size: Option<String>,
}

#[derive(Debug, Clone)]
pub struct Client {
    base_url: Url,
    token: Option<String>,
    contacts_table: String,
    timeout: Duration,
    http: HttpClient,
}

impl Client {
    /// A query string already on `base_url` is dropped; actions bring their own.
    pub fn new(base_url: &str, token: Option<&str>, timeout: Duration) -> Result<Self> {
        let trimmed = base_url
            .split('?')
            .next()
            .unwrap_or_default()
            .trim()
            .trim_end_matches('/');
        if trimmed.is_empty() {
            bail!("api.base_url must not be empty");
        }
        let base_url =
            Url::parse(trimmed).with_context(|| format!("parse api.base_url {trimmed:?}"))?;

        let http = HttpClient::builder()
            .timeout(timeout)
            .build()
            .context("build HTTP client")?;

        Ok(Self {
            base_url,
            token: token
                .map(str::trim)
                .filter(|token| !token.is_empty())
                .map(str::to_owned),
            contacts_table: DEFAULT_CONTACTS_TABLE.to_owned(),
            timeout,
            http,
        })
    }

    pub fn with_contacts_table(mut self, table: impl Into<String>) -> Self {
        self.contacts_table = table.into();
        self
    }

    pub fn base_url(&self) -> &str {
        self.base_url.as_str()
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub fn contacts_table(&self) -> &str {
        &self.contacts_table
    }

    pub fn has_token(&self) -> bool {
        self.token.is_some()
    }

    /// Runs one action and returns its result as a list; a bare object
    /// response becomes a one-element list.
    pub fn call(&self, action: &str, params: &[(&str, &str)]) -> Result<Vec<Value>> {
        let mut url = self.base_url.clone();
        {
            let mut query = url.query_pairs_mut();
            query.append_pair("action", action);
            for (key, value) in params {
                query.append_pair(key, value);
            }
        }

        let mut body = Map::new();
        for (key, value) in params {
            body.insert((*key).to_owned(), Value::String((*value).to_owned()));
        }
        body.insert("action".to_owned(), Value::String(action.to_owned()));

        let mut request = self.http.post(url).json(&body);
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }
        let response = request
            .send()
            .map_err(|error| connection_error(self.base_url.as_str(), error))?;

        let status = response.status();
        tracing::debug!(action, status = status.as_u16(), "api call");
        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            return Err(unauthorized(status.as_u16()));
        }
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(clean_error_response(status, &body));
        }

        let payload: Value = response
            .json()
            .with_context(|| format!("decode {action} response"))?;
        let items = into_items(payload);
        if items
            .first()
            .and_then(|first| first.get("error"))
            .and_then(Value::as_str)
            == Some("unauthorized")
        {
            return Err(unauthorized(status.as_u16()));
        }
        Ok(items)
    }

    pub fn stats(&self) -> Result<DatabaseStats> {
        let mut stats: Vec<DatabaseStats> = self.call_as("stats", &[])?;
        if stats.is_empty() {
            bail!("stats response was empty");
        }
        Ok(stats.swap_remove(0))
    }

    /// Reachability and credential check.
    pub fn ping(&self) -> Result<DatabaseStats> {
        self.stats()
    }

    pub fn list_tables(&self) -> Result<Vec<TableSummary>> {
        self.call_as("tables", &[])
    }

    pub fn columns(&self, table: &str) -> Result<Vec<ColumnDescriptor>> {
        self.call_as("columns", &[("table", table)])
    }

    pub fn rows(&self, table: &str) -> Result<Vec<Row>> {
        self.call_as("data", &[("table", table)])
    }

    pub fn contact_map(&self) -> Result<ContactMap> {
        let rows = self
            .rows(&self.contacts_table)
            .with_context(|| format!("load contacts table {}", self.contacts_table))?;
        Ok(ContactMap::from_contact_rows(&rows))
    }

    fn call_as<T: DeserializeOwned>(&self, action: &str, params: &[(&str, &str)]) -> Result<Vec<T>> {
        let items = self.call(action, params)?;
        serde_json::from_value(Value::Array(items))
            .with_context(|| format!("decode {action} response"))
    }
}

impl DataSource for Client {
    fn list_tables(&mut self) -> Result<Vec<TableSummary>> {
        Client::list_tables(self)
    }

    fn fetch_columns(&mut self, table: &str) -> Result<Vec<ColumnDescriptor>> {
        self.columns(table)
    }

    fn fetch_rows(&mut self, table: &str) -> Result<Vec<Row>> {
        self.rows(table)
    }

    fn fetch_contact_map(&mut self) -> Result<ContactMap> {
        self.contact_map()
    }
}

fn into_items(payload: Value) -> Vec<Value> {
    match payload {
        Value::Array(items) => items,
        Value::Null => Vec::new(),
        other => vec![other],
    }
}

fn unauthorized(status: u16) -> anyhow::Error {
    anyhow!("unauthorized ({status}) -- set api.token or ROWDESK_API_TOKEN")
}

fn connection_error(base_url: &str, error: reqwest::Error) -> anyhow::Error {
    anyhow!(
        "cannot reach {} -- check that the webhook workflow is active ({})",
        base_url,
        error
    )
}

fn clean_error_response(status: StatusCode, body: &str) -> anyhow::Error {
    if let Ok(parsed) = serde_json::from_str::<ErrorEnvelope>(body)
        && let Some(message) = parsed.message.or(parsed.error)
        && !message.is_empty()
    {
        return anyhow!("server error ({}): {}", status.as_u16(), message);
    }

    if !body.is_empty() && body.len() < 100 && !body.contains('{') {
        return anyhow!("server error ({}): {}", status.as_u16(), body.trim());
    }

    anyhow!("server returned {}", status.as_u16())
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    error: Option<String>,
}
