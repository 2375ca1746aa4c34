// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Context, Result, anyhow};
use rowdesk_app::{
    ColumnDescriptor, ContactMap, DataSource, PLACEHOLDER_CONTACT_NAME, Platform, Row,
    TableSummary,
};
use serde_json::{Value, json};
use std::collections::BTreeMap;
use std::path::PathBuf;
use time::format_description::well_known::Rfc3339;
use time::macros::datetime;
use time::{Duration, OffsetDateTime};

pub const CHAT_HISTORY_TABLE: &str = "n8n_chat_histories";
pub const CONTACTS_TABLE: &str = "contacts";
pub const ORDERS_TABLE: &str = "orders";

const FIRST_NAMES: [&str; 16] = [
    "Lucía", "Mateo", "Valeria", "Santiago", "Camila", "Diego", "Renata", "Emiliano", "Ximena",
    "Andrés", "Regina", "Leonardo", "Mariana", "Iker", "Sofía", "Joaquín",
];
const LAST_NAMES: [&str; 14] = [
    "Pérez", "García", "Hernández", "López", "Martínez", "Ramírez", "Flores", "Cruz", "Morales",
    "Ortiz", "Reyes", "Vargas", "Castillo", "Núñez",
];

const CUSTOMER_LINES: [&str; 12] = [
    "Hola, buenas tardes",
    "¿Cuál es el precio del tour a Isla Mujeres?",
    "¿Tienen disponibilidad para el sábado?",
    "Somos 4 adultos y 2 niños",
    "¿Incluye transporte desde el hotel?",
    "Quiero cambiar la fecha de mi reservación",
    "¿Aceptan pago con tarjeta?",
    "Gracias, lo voy a pensar",
    "¿A qué hora es la salida?",
    "Necesito factura",
    "¿Dónde los encuentro?",
    "Perfecto, reservo para mañana",
];
const AGENT_LINES: [&str; 10] = [
    "¡Hola! Con gusto te ayudo. ¿Para qué fecha te interesa?",
    "El precio por adulto es de $1,450 MXN e incluye comida.",
    "Sí, tenemos lugares disponibles para esa fecha.",
    "El transporte está incluido desde hoteles en zona hotelera.",
    "Aceptamos tarjeta, transferencia y efectivo.",
    "La salida es a las 8:00 AM desde el muelle.",
    "Te comparto el enlace de pago para confirmar tu lugar.",
    "Listo, tu reservación quedó confirmada.",
    "Claro, ¿me compartes tu RFC y correo para la factura?",
    "Con gusto, cualquier duda aquí estamos.",
];
const ORDER_STATUSES: [&str; 4] = ["pending", "paid", "cancelled", "refunded"];
const ORDER_PRODUCTS: [&str; 6] = [
    "Tour Isla Mujeres",
    "Snorkel Musa",
    "Cenote Tour",
    "Chichén Itzá",
    "Catamarán",
    "Nado con delfines",
];

#[derive(Debug, Clone)]
struct DeterministicRng {
    state: u64,
}

impl DeterministicRng {
    fn new(seed: u64) -> Self {
        let mut state = seed ^ 0x9E37_79B9_7F4A_7C15;
        if state == 0 {
            state = 0xA409_3822_299F_31D0;
        }
        Self { state }
    }

    fn next_u64(&mut self) -> u64 {
        self.state = self
            .state
            .wrapping_mul(6_364_136_223_846_793_005)
            .wrapping_add(1_442_695_040_888_963_407);

        let mut x = self.state;
        x ^= x >> 13;
        x ^= x << 7;
        x ^= x >> 17;
        x
    }

    fn int_n(&mut self, n: usize) -> usize {
        if n <= 1 {
            return 0;
        }
        (self.next_u64() % (n as u64)) as usize
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Speaker {
    Customer,
    Agent,
}

impl Speaker {
    pub const fn message_type(self) -> &'static str {
        match self {
            Self::Customer => "human",
            Self::Agent => "ai",
        }
    }

    const fn next(self) -> Self {
        match self {
            Self::Customer => Self::Agent,
            Self::Agent => Self::Customer,
        }
    }
}

/// Shape of a generated chat history.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HistorySeed {
    pub seed: u64,
    pub sessions: usize,
    /// Each session gets between one and this many messages.
    pub max_messages: usize,
}

impl Default for HistorySeed {
    fn default() -> Self {
        Self {
            seed: 42,
            sessions: 24,
            max_messages: 6,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ChatHistory {
    /// Rows in insertion order; ids ascend with time.
    pub rows: Vec<Row>,
    /// Distinct session ids in first-seen order.
    pub sessions: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct ChatFaker {
    rng: DeterministicRng,
}

impl ChatFaker {
    pub fn new(seed: u64) -> Self {
        let normalized = if seed == 0 { 1 } else { seed };
        Self {
            rng: DeterministicRng::new(normalized),
        }
    }

    pub fn int_n(&mut self, n: usize) -> usize {
        self.rng.int_n(n)
    }

    /// WhatsApp-heavy mix with a few ids no platform claims.
    pub fn platform(&mut self) -> Platform {
        match self.rng.int_n(8) {
            0..=2 => Platform::WhatsApp,
            3 | 4 => Platform::Messenger,
            5 | 6 => Platform::Instagram,
            _ => Platform::Other,
        }
    }

    pub fn session_id(&mut self, platform: Platform) -> String {
        match platform {
            Platform::WhatsApp => format!("+52998{}", self.digits(8)),
            Platform::Messenger => format!("messenger_{}", self.digits(16)),
            Platform::Instagram => format!("instagram_{}", self.digits(17)),
            Platform::Other => format!("web_{}", self.digits(6)),
        }
    }

    pub fn customer_name(&mut self) -> String {
        format!("{} {}", self.pick(&FIRST_NAMES), self.pick(&LAST_NAMES))
    }

    /// A chat-memory payload as the automation backend stores it.
    pub fn message(&mut self, speaker: Speaker) -> Value {
        let content = match speaker {
            Speaker::Customer => self.pick(&CUSTOMER_LINES),
            Speaker::Agent => self.pick(&AGENT_LINES),
        };
        json!({
            "type": speaker.message_type(),
            "data": {
                "content": content,
                "additional_kwargs": {},
                "response_metadata": {},
            },
        })
    }

    pub fn chat_history(&mut self, seed: &HistorySeed) -> ChatHistory {
        let mut sessions = Vec::with_capacity(seed.sessions);
        while sessions.len() < seed.sessions {
            let platform = self.platform();
            let session = self.session_id(platform);
            if !sessions.contains(&session) {
                sessions.push(session);
            }
        }

        let mut remaining: Vec<usize> = sessions
            .iter()
            .map(|_| 1 + self.rng.int_n(seed.max_messages.max(1)))
            .collect();
        let mut speakers = vec![Speaker::Customer; sessions.len()];
        let mut open: Vec<usize> = (0..sessions.len()).collect();
        let mut rows = Vec::new();
        let mut at = reference_now();
        let mut id = 0_i64;

        while !open.is_empty() {
            let slot = self.rng.int_n(open.len());
            let index = open[slot];
            id += 1;
            at += Duration::seconds(30 + self.rng.int_n(7_200) as i64);

            let speaker = speakers[index];
            speakers[index] = speaker.next();
            rows.push(row(json!({
                "id": id,
                "session_id": sessions[index],
                "message": self.message(speaker),
                "created_at": timestamp(at),
            })));

            remaining[index] -= 1;
            if remaining[index] == 0 {
                open.swap_remove(slot);
            }
        }

        ChatHistory { rows, sessions }
    }

    /// One contact per session. Some carry the backend's placeholder name or
    /// no name at all.
    pub fn contact_rows(&mut self, sessions: &[String]) -> Vec<Row> {
        sessions
            .iter()
            .enumerate()
            .map(|(index, session)| {
                let display_name = match self.rng.int_n(20) {
                    0..=11 => Value::String(self.customer_name()),
                    12..=16 => Value::String(PLACEHOLDER_CONTACT_NAME.to_owned()),
                    _ => Value::Null,
                };
                row(json!({
                    "id": index + 1,
                    "session_id": session,
                    "display_name": display_name,
                    "created_at": timestamp(reference_now() - Duration::days(index as i64)),
                }))
            })
            .collect()
    }

    /// A table without sessions, for the plain row view.
    pub fn order_rows(&mut self, count: usize) -> Vec<Row> {
        (0..count)
            .map(|index| {
                let quantity = 1 + self.rng.int_n(6);
                let cents = 89_000 + self.rng.int_n(300_000);
                row(json!({
                    "id": index + 1,
                    "customer": self.customer_name(),
                    "product": self.pick(&ORDER_PRODUCTS),
                    "total": format!("{}.{:02}", cents / 100, cents % 100),
                    "status": self.pick(&ORDER_STATUSES),
                    "details": {
                        "quantity": quantity,
                        "currency": "MXN",
                        "channel": "whatsapp",
                        "coupon": Value::Null,
                    },
                    "created_at": timestamp(reference_now() + Duration::hours(index as i64 * 5)),
                }))
            })
            .collect()
    }

    fn pick<'a>(&mut self, items: &'a [&'a str]) -> &'a str {
        items[self.rng.int_n(items.len())]
    }

    fn digits(&mut self, count: usize) -> String {
        (0..count)
            .map(|_| char::from(b'0' + self.rng.int_n(10) as u8))
            .collect()
    }
}

pub fn chat_history_columns() -> Vec<ColumnDescriptor> {
    vec![
        ColumnDescriptor::new("id", "integer", false),
        ColumnDescriptor::new("session_id", "character varying", false),
        ColumnDescriptor::new("message", "jsonb", false),
        ColumnDescriptor::new("created_at", "timestamp with time zone", true),
    ]
}

pub fn contact_columns() -> Vec<ColumnDescriptor> {
    vec![
        ColumnDescriptor::new("id", "integer", false),
        ColumnDescriptor::new("session_id", "character varying", false),
        ColumnDescriptor::new("display_name", "text", true),
        ColumnDescriptor::new("created_at", "timestamp with time zone", true),
    ]
}

pub fn order_columns() -> Vec<ColumnDescriptor> {
    vec![
        ColumnDescriptor::new("id", "integer", false),
        ColumnDescriptor::new("customer", "text", false),
        ColumnDescriptor::new("product", "text", false),
        ColumnDescriptor::new("total", "numeric", false),
        ColumnDescriptor::new("status", "text", false),
        ColumnDescriptor::new("details", "jsonb", true),
        ColumnDescriptor::new("created_at", "timestamp with time zone", true),
    ]
}

#[derive(Debug, Clone, PartialEq)]
pub struct DemoTable {
    pub columns: Vec<ColumnDescriptor>,
    pub rows: Vec<Row>,
}

/// In-memory backing store.
#[derive(Debug, Clone, Default)]
pub struct DemoSource {
    tables: BTreeMap<String, DemoTable>,
    contacts_table: String,
}

impl DemoSource {
    pub fn new(contacts_table: impl Into<String>) -> Self {
        Self {
            tables: BTreeMap::new(),
            contacts_table: contacts_table.into(),
        }
    }

    /// Chat history, matching contacts, and an orders table.
    pub fn seeded(seed: &HistorySeed) -> Self {
        let mut faker = ChatFaker::new(seed.seed);
        let history = faker.chat_history(seed);
        let contacts = faker.contact_rows(&history.sessions);
        let orders = faker.order_rows(seed.sessions);

        let mut source = Self::new(CONTACTS_TABLE);
        source.insert_table(CHAT_HISTORY_TABLE, chat_history_columns(), history.rows);
        source.insert_table(CONTACTS_TABLE, contact_columns(), contacts);
        source.insert_table(ORDERS_TABLE, order_columns(), orders);
        source
    }

    pub fn insert_table(
        &mut self,
        name: impl Into<String>,
        columns: Vec<ColumnDescriptor>,
        rows: Vec<Row>,
    ) {
        self.tables.insert(name.into(), DemoTable { columns, rows });
    }

    pub fn table(&self, name: &str) -> Option<&DemoTable> {
        self.tables.get(name)
    }

    fn require(&self, name: &str) -> Result<&DemoTable> {
        self.tables
            .get(name)
            .ok_or_else(|| anyhow!("relation \"{name}\" does not exist"))
    }
}

impl DataSource for DemoSource {
    fn list_tables(&mut self) -> Result<Vec<TableSummary>> {
        Ok(self
            .tables
            .iter()
            .map(|(name, table)| TableSummary {
                table_name: name.clone(),
                row_count: Some(table.rows.len() as i64),
                column_count: Some(table.columns.len() as i64),
            })
            .collect())
    }

    fn fetch_columns(&mut self, table: &str) -> Result<Vec<ColumnDescriptor>> {
        Ok(self.require(table)?.columns.clone())
    }

    fn fetch_rows(&mut self, table: &str) -> Result<Vec<Row>> {
        Ok(self.require(table)?.rows.clone())
    }

    fn fetch_contact_map(&mut self) -> Result<ContactMap> {
        let table = self
            .require(&self.contacts_table)
            .context("load contacts table")?;
        Ok(ContactMap::from_contact_rows(&table.rows))
    }
}

/// Non-object values yield an empty row.
pub fn row(value: Value) -> Row {
    match value {
        Value::Object(map) => map,
        _ => Row::new(),
    }
}

pub fn rows(values: impl IntoIterator<Item = Value>) -> Vec<Row> {
    values.into_iter().map(row).collect()
}

pub fn temp_config_path() -> Result<(tempfile::TempDir, PathBuf)> {
    let dir = tempfile::tempdir().context("create temp dir")?;
    let config_path = dir.path().join("config.toml");
    Ok((dir, config_path))
}

pub fn fixture_datetime() -> &'static str {
    "2026-02-19T12:34:56Z"
}

fn reference_now() -> OffsetDateTime {
    datetime!(2026-02-19 12:34:56 UTC)
}

fn timestamp(at: OffsetDateTime) -> String {
    at.format(&Rfc3339)
        .unwrap_or_else(|_| fixture_datetime().to_owned())
}
