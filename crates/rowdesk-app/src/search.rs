// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use crate::model::{ContactMap, Row, SearchColumn, session_key};
use serde_json::Value;
use std::borrow::Cow;

/// Whether `row` matches the free-text `term`.
///
/// The term is trimmed and lower-cased; an empty term matches every row. A
/// contact display name containing the term matches no matter which column
/// is selected.
pub fn matches(row: &Row, term: &str, column: &SearchColumn, contacts: &ContactMap) -> bool {
    let needle = normalize_term(term);
    matches_normalized(row, &needle, column, contacts)
}

pub fn normalize_term(term: &str) -> String {
    term.trim().to_lowercase()
}

pub(crate) fn matches_normalized(
    row: &Row,
    needle: &str,
    column: &SearchColumn,
    contacts: &ContactMap,
) -> bool {
    if needle.is_empty() {
        return true;
    }

    let contact_hit = session_key(row)
        .and_then(|session| contacts.display_name(&session).map(str::to_lowercase))
        .is_some_and(|name| name.contains(needle));
    if contact_hit {
        return true;
    }

    match column {
        SearchColumn::AllColumns => row.values().any(|value| contains(value, needle)),
        SearchColumn::Column(name) => row.get(name).is_some_and(|value| contains(value, needle)),
    }
}

fn contains(value: &Value, needle: &str) -> bool {
    value_text(value).to_lowercase().contains(needle)
}

/// Text a field is searched by. Nested arrays and objects are serialised as
/// compact JSON so text inside chat payloads stays searchable.
pub fn value_text(value: &Value) -> Cow<'_, str> {
    match value {
        Value::Null => Cow::Borrowed(""),
        Value::String(text) => Cow::Borrowed(text.as_str()),
        Value::Bool(flag) => Cow::Owned(flag.to_string()),
        Value::Number(number) => Cow::Owned(number.to_string()),
        Value::Array(_) | Value::Object(_) => Cow::Owned(value.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::{matches, value_text};
    use crate::model::{ContactMap, Row, SearchColumn};
    use serde_json::{Value, json};

    fn row(value: Value) -> Row {
        match value {
            Value::Object(map) => map,
            other => panic!("expected object, got {other}"),
        }
    }

    fn column(name: &str) -> SearchColumn {
        SearchColumn::Column(name.to_owned())
    }

    #[test]
    fn empty_term_matches_everything() {
        let contacts = ContactMap::new();
        assert!(matches(
            &row(json!({})),
            "",
            &SearchColumn::AllColumns,
            &contacts
        ));
        assert!(matches(
            &row(json!({"a": 1})),
            "   ",
            &column("missing"),
            &contacts
        ));
    }

    #[test]
    fn search_is_case_insensitive() {
        let contacts = ContactMap::new();
        let alice = row(json!({"name": "Alice"}));
        assert!(matches(&alice, "ALICE", &SearchColumn::AllColumns, &contacts));
        assert!(matches(&alice, "lic", &column("name"), &contacts));
    }

    #[test]
    fn column_scope_ignores_other_fields() {
        let contacts = ContactMap::new();
        let candidate = row(json!({"session_id": "+5215550001", "note": "refund"}));
        assert!(!matches(&candidate, "refund", &column("session_id"), &contacts));
        assert!(matches(&candidate, "refund", &column("note"), &contacts));
        assert!(!matches(&candidate, "refund", &column("missing"), &contacts));
    }

    #[test]
    fn contact_name_matches_regardless_of_column() {
        let contacts: ContactMap = [("messenger_7", "María López")].into_iter().collect();
        let candidate = row(json!({"session_id": "messenger_7", "id": 3}));
        assert!(matches(&candidate, "maría", &column("id"), &contacts));
        assert!(!matches(&candidate, "pedro", &column("id"), &contacts));
    }

    #[test]
    fn numbers_booleans_and_nulls_stringify() {
        let contacts = ContactMap::new();
        let candidate = row(json!({"id": 1234, "active": true, "deleted_at": null}));
        assert!(matches(&candidate, "23", &column("id"), &contacts));
        assert!(matches(&candidate, "TRUE", &SearchColumn::AllColumns, &contacts));
        assert!(!matches(&candidate, "null", &SearchColumn::AllColumns, &contacts));
    }

    #[test]
    fn nested_payload_text_is_searchable() {
        let contacts = ContactMap::new();
        let candidate = row(json!({
            "message": {"type": "human", "data": {"content": "Quiero una cotización"}}
        }));
        assert!(matches(
            &candidate,
            "cotización",
            &SearchColumn::AllColumns,
            &contacts
        ));
        assert!(matches(&candidate, "human", &column("message"), &contacts));
    }

    #[test]
    fn value_text_uses_compact_json_for_nested_values() {
        assert_eq!(value_text(&json!({"a": [1, 2]})), r#"{"a":[1,2]}"#);
        assert_eq!(value_text(&json!(null)), "");
        assert_eq!(value_text(&json!(2.5)), "2.5");
    }
}
