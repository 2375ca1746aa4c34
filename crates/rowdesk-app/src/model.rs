// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

pub const ID_COLUMN: &str = "id";
pub const SESSION_COLUMN: &str = "session_id";
pub const DISPLAY_NAME_COLUMN: &str = "display_name";

/// Placeholder the backend writes for contacts it could not name.
pub const PLACEHOLDER_CONTACT_NAME: &str = "Cliente";

/// One fetched row, keyed by column name in the order the API returned them.
pub type Row = Map<String, Value>;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnDescriptor {
    #[serde(rename = "column_name")]
    pub name: String,
    #[serde(default)]
    pub data_type: String,
    #[serde(
        rename = "is_nullable",
        default = "nullable_default",
        deserialize_with = "deserialize_nullable"
    )]
    pub nullable: bool,
}

impl ColumnDescriptor {
    pub fn new(name: impl Into<String>, data_type: impl Into<String>, nullable: bool) -> Self {
        Self {
            name: name.into(),
            data_type: data_type.into(),
            nullable,
        }
    }
}

const fn nullable_default() -> bool {
    true
}

fn deserialize_nullable<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Nullable {
        Flag(bool),
        Text(String),
    }

    Ok(match Option::<Nullable>::deserialize(deserializer)? {
        Some(Nullable::Flag(flag)) => flag,
        Some(Nullable::Text(text)) => !text.trim().eq_ignore_ascii_case("no"),
        None => true,
    })
}

pub fn has_column(columns: &[ColumnDescriptor], name: &str) -> bool {
    columns.iter().any(|column| column.name == name)
}

/// Display names keyed by session identifier.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ContactMap {
    names: BTreeMap<String, String>,
}

impl ContactMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds the map from rows of the contacts table, skipping rows without a
    /// session, without a name, or still carrying the placeholder name.
    pub fn from_contact_rows(rows: &[Row]) -> Self {
        let mut contacts = Self::new();
        for row in rows {
            let Some(session) = session_key(row) else {
                continue;
            };
            let Some(name) = row.get(DISPLAY_NAME_COLUMN).and_then(Value::as_str) else {
                continue;
            };
            if name.trim().is_empty() || name == PLACEHOLDER_CONTACT_NAME {
                continue;
            }
            contacts.insert(session, name);
        }
        contacts
    }

    pub fn insert(&mut self, session_id: impl Into<String>, name: impl Into<String>) {
        self.names.insert(session_id.into(), name.into());
    }

    pub fn display_name(&self, session_id: &str) -> Option<&str> {
        self.names.get(session_id).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

impl<K, V> FromIterator<(K, V)> for ContactMap
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut contacts = Self::new();
        for (session_id, name) in iter {
            contacts.insert(session_id, name);
        }
        contacts
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ViewMode {
    #[default]
    All,
    Conversations,
}

impl ViewMode {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::All => "all",
            Self::Conversations => "conversations",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "all" => Some(Self::All),
            "conversations" => Some(Self::Conversations),
            _ => None,
        }
    }

    pub const fn toggled(self) -> Self {
        match self {
            Self::All => Self::Conversations,
            Self::Conversations => Self::All,
        }
    }
}

/// Which fields a free-text term is matched against.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum SearchColumn {
    #[default]
    AllColumns,
    Column(String),
}

impl SearchColumn {
    pub fn label(&self) -> &str {
        match self {
            Self::AllColumns => "all columns",
            Self::Column(name) => name,
        }
    }

    /// Steps through `AllColumns` followed by every descriptor, wrapping.
    pub fn cycled(&self, columns: &[ColumnDescriptor]) -> Self {
        let current = match self {
            Self::AllColumns => None,
            Self::Column(name) => columns.iter().position(|column| &column.name == name),
        };
        let next = match current {
            None => 0,
            Some(index) => index + 1,
        };
        match columns.get(next) {
            Some(column) => Self::Column(column.name.clone()),
            None => Self::AllColumns,
        }
    }
}

/// Non-empty session identifier of a row. Numeric identifiers are keyed by
/// their decimal text.
pub fn session_key(row: &Row) -> Option<String> {
    match row.get(SESSION_COLUMN)? {
        Value::String(value) if !value.is_empty() => Some(value.clone()),
        Value::Number(value) => Some(value.to_string()),
        _ => None,
    }
}

/// Row id when it is a truthy number: present, numeric, non-zero. Numeric
/// strings count, since some drivers ship bigint ids as text.
pub fn truthy_id(row: &Row) -> Option<f64> {
    let value = match row.get(ID_COLUMN)? {
        Value::Number(number) => number.as_f64()?,
        Value::String(text) => text.trim().parse::<f64>().ok()?,
        _ => return None,
    };
    if value == 0.0 || value.is_nan() {
        return None;
    }
    Some(value)
}

#[cfg(test)]
mod tests {
    use super::{ColumnDescriptor, ContactMap, Row, SearchColumn, ViewMode, session_key, truthy_id};
    use serde_json::json;

    fn row(value: serde_json::Value) -> Row {
        match value {
            serde_json::Value::Object(map) => map,
            other => panic!("expected object, got {other}"),
        }
    }

    #[test]
    fn column_descriptor_decodes_api_shape() {
        let columns: Vec<ColumnDescriptor> = serde_json::from_value(json!([
            {"column_name": "id", "data_type": "integer", "is_nullable": "NO"},
            {"column_name": "session_id", "data_type": "character varying", "is_nullable": "YES"},
            {"column_name": "message", "data_type": "jsonb", "is_nullable": true},
            {"column_name": "created_at"},
        ]))
        .expect("columns decode");

        assert_eq!(columns[0], ColumnDescriptor::new("id", "integer", false));
        assert!(columns[1].nullable);
        assert!(columns[2].nullable);
        assert_eq!(columns[3].data_type, "");
        assert!(columns[3].nullable);
    }

    #[test]
    fn contact_map_skips_placeholder_and_blank_names() {
        let rows = vec![
            row(json!({"session_id": "messenger_1", "display_name": "Ana"})),
            row(json!({"session_id": "messenger_2", "display_name": "Cliente"})),
            row(json!({"session_id": "messenger_3", "display_name": "  "})),
            row(json!({"session_id": "", "display_name": "Nobody"})),
            row(json!({"session_id": "+5215550000", "display_name": null})),
        ];

        let contacts = ContactMap::from_contact_rows(&rows);
        assert_eq!(contacts.len(), 1);
        assert_eq!(contacts.display_name("messenger_1"), Some("Ana"));
        assert_eq!(contacts.display_name("messenger_2"), None);
    }

    #[test]
    fn session_key_accepts_strings_and_numbers() {
        assert_eq!(
            session_key(&row(json!({"session_id": "+52A"}))),
            Some("+52A".to_owned())
        );
        assert_eq!(
            session_key(&row(json!({"session_id": 42}))),
            Some("42".to_owned())
        );
        assert_eq!(session_key(&row(json!({"session_id": ""}))), None);
        assert_eq!(session_key(&row(json!({"session_id": null}))), None);
        assert_eq!(session_key(&row(json!({"id": 1}))), None);
    }

    #[test]
    fn truthy_id_rejects_zero_null_and_text() {
        assert_eq!(truthy_id(&row(json!({"id": 7}))), Some(7.0));
        assert_eq!(truthy_id(&row(json!({"id": "12"}))), Some(12.0));
        assert_eq!(truthy_id(&row(json!({"id": 0}))), None);
        assert_eq!(truthy_id(&row(json!({"id": null}))), None);
        assert_eq!(truthy_id(&row(json!({"id": "abc"}))), None);
        assert_eq!(truthy_id(&row(json!({}))), None);
    }

    #[test]
    fn search_column_cycles_through_descriptors_and_wraps() {
        let columns = vec![
            ColumnDescriptor::new("id", "integer", false),
            ColumnDescriptor::new("session_id", "text", true),
        ];

        let first = SearchColumn::AllColumns.cycled(&columns);
        assert_eq!(first, SearchColumn::Column("id".to_owned()));
        let second = first.cycled(&columns);
        assert_eq!(second, SearchColumn::Column("session_id".to_owned()));
        assert_eq!(second.cycled(&columns), SearchColumn::AllColumns);
        assert_eq!(
            SearchColumn::Column("gone".to_owned()).cycled(&columns),
            SearchColumn::Column("id".to_owned())
        );
    }

    #[test]
    fn view_mode_round_trips_labels() {
        for mode in [ViewMode::All, ViewMode::Conversations] {
            assert_eq!(ViewMode::parse(mode.as_str()), Some(mode));
        }
        assert_eq!(ViewMode::All.toggled(), ViewMode::Conversations);
        assert_eq!(ViewMode::parse("threads"), None);
    }
}
