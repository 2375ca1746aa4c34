// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

//! Cell text for the table grid.

use crate::search::value_text;
use crate::{ContactMap, Platform, SESSION_COLUMN, classify};
use serde_json::{Map, Value};
use time::format_description::well_known::Rfc3339;
use time::macros::format_description;
use time::{Date, Month, OffsetDateTime, PrimitiveDateTime};

const CELL_MAX_CHARS: usize = 80;
const CHAT_CONTENT_MAX_CHARS: usize = 60;
const PLAIN_CONTENT_MAX_CHARS: usize = 70;
const DATE_COLUMN_HINTS: [&str; 7] = [
    "created_at",
    "updated_at",
    "deleted_at",
    "timestamp",
    "date",
    "last_message_at",
    "fecha",
];

pub fn cell_text(column: &str, value: &Value, contacts: &ContactMap) -> String {
    if value.is_null() {
        return "null".to_owned();
    }
    if is_date_column(column, value)
        && let Some(text) = value.as_str()
        && let Some(friendly) = friendly_date(text)
    {
        return friendly;
    }
    if column == SESSION_COLUMN {
        return session_label(&value_text(value), contacts);
    }
    match value {
        Value::Object(object) => message_summary(object),
        Value::Array(items) if items.len() > 3 => format!("[{} items]", items.len()),
        _ => truncate(&value_text(value), CELL_MAX_CHARS),
    }
}

/// Human label for a session id: phone numbers are grouped, social ids show
/// the contact name (or the platform) followed by the numeric id.
pub fn session_label(session_id: &str, contacts: &ContactMap) -> String {
    let platform = classify(session_id);
    match platform {
        Platform::WhatsApp => format_phone_number(session_id),
        Platform::Messenger | Platform::Instagram => {
            let prefix_len = platform.prefix().map(str::len).unwrap_or(0);
            let number = session_id.get(prefix_len..).unwrap_or_default();
            let name = contacts
                .display_name(session_id)
                .unwrap_or(platform.label());
            format!("{name} #{number}")
        }
        Platform::Other => session_id.to_owned(),
    }
}

/// `+529982404479` becomes `+52 998 240 4479`; other numbers longer than
/// eight digits are grouped from the right.
pub fn format_phone_number(phone: &str) -> String {
    let cleaned: String = phone
        .chars()
        .filter(|ch| ch.is_ascii_digit() || *ch == '+')
        .collect();
    let len = cleaned.len();

    if cleaned.starts_with("+52") && len >= 13 {
        return format!(
            "{} {} {} {}",
            &cleaned[..3],
            &cleaned[3..6],
            &cleaned[6..9],
            &cleaned[9..]
        );
    }
    if len > 8 {
        let area = len.saturating_sub(10);
        let exchange = len.saturating_sub(7);
        let line = len - 4;
        return format!(
            "{} {} {} {}",
            &cleaned[..area],
            &cleaned[area..exchange],
            &cleaned[exchange..line],
            &cleaned[line..]
        )
        .trim_start()
        .to_owned();
    }
    phone.to_owned()
}

pub fn is_date_column(column: &str, value: &Value) -> bool {
    let column = column.to_lowercase();
    if DATE_COLUMN_HINTS.iter().any(|hint| column.contains(hint)) {
        return true;
    }
    value.as_str().is_some_and(looks_like_iso_datetime)
}

/// `YYYY-MM-DDTHH:MM` prefix.
fn looks_like_iso_datetime(text: &str) -> bool {
    let bytes = text.as_bytes();
    if bytes.len() < 16 {
        return false;
    }
    bytes[..16].iter().enumerate().all(|(index, byte)| match index {
        4 | 7 => *byte == b'-',
        10 => *byte == b'T',
        13 => *byte == b':',
        _ => byte.is_ascii_digit(),
    })
}

/// `16 Oct 2026, 3:04 PM`, in the offset the timestamp carries.
pub fn friendly_date(text: &str) -> Option<String> {
    let text = text.trim();
    let datetime = if let Ok(parsed) = OffsetDateTime::parse(text, &Rfc3339) {
        PrimitiveDateTime::new(parsed.date(), parsed.time())
    } else if let Ok(parsed) = PrimitiveDateTime::parse(
        text,
        format_description!("[year]-[month]-[day]T[hour]:[minute]:[second].[subsecond]"),
    ) {
        parsed
    } else if let Ok(parsed) = PrimitiveDateTime::parse(
        text,
        format_description!("[year]-[month]-[day]T[hour]:[minute]:[second]"),
    ) {
        parsed
    } else if let Ok(parsed) = PrimitiveDateTime::parse(
        text,
        format_description!("[year]-[month]-[day] [hour]:[minute]:[second]"),
    ) {
        parsed
    } else {
        let date = Date::parse(text, format_description!("[year]-[month]-[day]")).ok()?;
        return Some(format!(
            "{} {} {}",
            date.day(),
            month_abbrev(date.month()),
            date.year()
        ));
    };

    let hour = datetime.hour();
    let meridiem = if hour >= 12 { "PM" } else { "AM" };
    let hour12 = match hour % 12 {
        0 => 12,
        other => other,
    };
    Some(format!(
        "{} {} {}, {}:{:02} {}",
        datetime.day(),
        month_abbrev(datetime.month()),
        datetime.year(),
        hour12,
        datetime.minute(),
        meridiem
    ))
}

const fn month_abbrev(month: Month) -> &'static str {
    match month {
        Month::January => "Jan",
        Month::February => "Feb",
        Month::March => "Mar",
        Month::April => "Apr",
        Month::May => "May",
        Month::June => "Jun",
        Month::July => "Jul",
        Month::August => "Aug",
        Month::September => "Sep",
        Month::October => "Oct",
        Month::November => "Nov",
        Month::December => "Dec",
    }
}

/// Chat memory stores messages as `{type, data: {content}}`.
fn message_summary(object: &Map<String, Value>) -> String {
    let chat_content = object
        .get("data")
        .and_then(|data| data.get("content"))
        .filter(|content| is_truthy(content));
    if let Some(content) = chat_content {
        let speaker = match object.get("type").and_then(Value::as_str) {
            Some("human") => "customer",
            _ => "agent",
        };
        return format!(
            "{speaker}: {}",
            truncate(&value_text(content), CHAT_CONTENT_MAX_CHARS)
        );
    }
    if let Some(content) = object.get("content").filter(|content| is_truthy(content)) {
        return truncate(&value_text(content), PLAIN_CONTENT_MAX_CHARS);
    }
    if object.len() <= 3 {
        return truncate(&Value::Object(object.clone()).to_string(), CELL_MAX_CHARS);
    }
    format!("{{{} fields}}", object.len())
}

fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(flag) => *flag,
        Value::String(text) => !text.is_empty(),
        Value::Number(number) => number.as_f64().is_some_and(|n| n != 0.0),
        Value::Array(_) | Value::Object(_) => true,
    }
}

pub fn truncate(value: &str, max_chars: usize) -> String {
    let mut chars = value.chars();
    let truncated: String = chars.by_ref().take(max_chars).collect();
    if chars.next().is_some() {
        format!("{truncated}…")
    } else {
        truncated
    }
}
