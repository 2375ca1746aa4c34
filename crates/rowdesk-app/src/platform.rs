// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use serde::{Deserialize, Serialize};

const WHATSAPP_PREFIX: &str = "+";
const MESSENGER_PREFIX: &str = "messenger_";
const INSTAGRAM_PREFIX: &str = "instagram_";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Platform {
    WhatsApp,
    Messenger,
    Instagram,
    Other,
}

impl Platform {
    pub const fn label(self) -> &'static str {
        match self {
            Self::WhatsApp => "WhatsApp",
            Self::Messenger => "Messenger",
            Self::Instagram => "Instagram",
            Self::Other => "other",
        }
    }

    /// Prefix that marks this platform in a session identifier.
    pub const fn prefix(self) -> Option<&'static str> {
        match self {
            Self::WhatsApp => Some(WHATSAPP_PREFIX),
            Self::Messenger => Some(MESSENGER_PREFIX),
            Self::Instagram => Some(INSTAGRAM_PREFIX),
            Self::Other => None,
        }
    }
}

pub fn classify(session_id: &str) -> Platform {
    if session_id.starts_with(WHATSAPP_PREFIX) {
        Platform::WhatsApp
    } else if starts_with_ignore_case(session_id, MESSENGER_PREFIX) {
        Platform::Messenger
    } else if starts_with_ignore_case(session_id, INSTAGRAM_PREFIX) {
        Platform::Instagram
    } else {
        Platform::Other
    }
}

fn starts_with_ignore_case(value: &str, prefix: &str) -> bool {
    value
        .as_bytes()
        .get(..prefix.len())
        .is_some_and(|head| head.eq_ignore_ascii_case(prefix.as_bytes()))
}

/// The platform chip selected in the filter bar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlatformFilter {
    #[default]
    All,
    WhatsApp,
    Messenger,
    Instagram,
}

impl PlatformFilter {
    pub const ALL: [Self; 4] = [Self::All, Self::WhatsApp, Self::Messenger, Self::Instagram];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::All => "all",
            Self::WhatsApp => "whatsapp",
            Self::Messenger => "messenger",
            Self::Instagram => "instagram",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "all" => Some(Self::All),
            "whatsapp" => Some(Self::WhatsApp),
            "messenger" => Some(Self::Messenger),
            "instagram" => Some(Self::Instagram),
            _ => None,
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::All => "All",
            Self::WhatsApp => Platform::WhatsApp.label(),
            Self::Messenger => Platform::Messenger.label(),
            Self::Instagram => Platform::Instagram.label(),
        }
    }

    pub const fn is_all(self) -> bool {
        matches!(self, Self::All)
    }

    /// `Other` sessions only pass the `All` chip.
    pub const fn admits(self, platform: Platform) -> bool {
        matches!(
            (self, platform),
            (Self::All, _)
                | (Self::WhatsApp, Platform::WhatsApp)
                | (Self::Messenger, Platform::Messenger)
                | (Self::Instagram, Platform::Instagram)
        )
    }
}
