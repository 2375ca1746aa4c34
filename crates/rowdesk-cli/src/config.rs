// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Context, Result, anyhow, bail};
use serde::Deserialize;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const APP_NAME: &str = "rowdesk";
pub const CONFIG_PATH_ENV: &str = "ROWDESK_CONFIG_PATH";
pub const API_TOKEN_ENV: &str = "ROWDESK_API_TOKEN";

const CONFIG_VERSION: i64 = 1;
const DEFAULT_API_BASE_URL: &str = "http://localhost:5678/webhook/admin-api";
const DEFAULT_API_TIMEOUT: &str = "10s";
const DEFAULT_CONTACTS_TABLE: &str = "contacts";
const DEFAULT_SEARCH_DEBOUNCE: &str = "200ms";

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub version: i64,
    #[serde(default)]
    pub api: Api,
    #[serde(default)]
    pub ui: Ui,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            version: CONFIG_VERSION,
            api: Api::default(),
            ui: Ui::default(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Api {
    pub base_url: Option<String>,
    pub token: Option<String>,
    pub timeout: Option<String>,
    pub contacts_table: Option<String>,
}

impl Default for Api {
    fn default() -> Self {
        Self {
            base_url: Some(DEFAULT_API_BASE_URL.to_owned()),
            token: None,
            timeout: Some(DEFAULT_API_TIMEOUT.to_owned()),
            contacts_table: Some(DEFAULT_CONTACTS_TABLE.to_owned()),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Ui {
    pub search_debounce: Option<String>,
    pub default_table: Option<String>,
}

impl Default for Ui {
    fn default() -> Self {
        Self {
            search_debounce: Some(DEFAULT_SEARCH_DEBOUNCE.to_owned()),
            default_table: None,
        }
    }
}

impl Config {
    pub fn default_path() -> Result<PathBuf> {
        if let Some(path) = env::var_os(CONFIG_PATH_ENV) {
            return Ok(PathBuf::from(path));
        }

        let config_root = dirs::config_dir().ok_or_else(|| {
            anyhow!("cannot resolve config directory; set {CONFIG_PATH_ENV} to the config file")
        })?;

        let app_dir = config_root.join(APP_NAME);
        fs::create_dir_all(&app_dir)
            .with_context(|| format!("create config directory {}", app_dir.display()))?;
        Ok(app_dir.join("config.toml"))
    }

    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let raw = fs::read_to_string(path)
            .with_context(|| format!("read config file {}", path.display()))?;
        let value: toml::Value = toml::from_str(&raw)
            .with_context(|| format!("parse TOML config {}", path.display()))?;

        let version = value
            .get("version")
            .and_then(toml::Value::as_integer)
            .ok_or_else(|| {
                anyhow!(
                    "config file {} has no version. Add `version = 1` and put values under [api] and [ui]",
                    path.display()
                )
            })?;

        if version != CONFIG_VERSION {
            bail!(
                "unsupported config version {} in {}; expected version = 1",
                version,
                path.display()
            );
        }

        let config: Config = value
            .try_into()
            .with_context(|| format!("decode config {}", path.display()))?;
        config.validate(path)?;
        Ok(config)
    }

    fn validate(&self, path: &Path) -> Result<()> {
        if let Some(base_url) = &self.api.base_url {
            let trimmed = base_url.trim();
            if !(trimmed.starts_with("http://") || trimmed.starts_with("https://")) {
                bail!(
                    "api.base_url in {} must be an http(s) URL, got {:?}",
                    path.display(),
                    base_url
                );
            }
        }

        if let Some(timeout) = &self.api.timeout {
            let parsed = parse_duration(timeout)
                .with_context(|| format!("api.timeout in {}", path.display()))?;
            if parsed <= Duration::ZERO {
                bail!(
                    "api.timeout in {} must be positive, got {}",
                    path.display(),
                    timeout
                );
            }
        }

        if let Some(table) = &self.api.contacts_table
            && table.trim().is_empty()
        {
            bail!("api.contacts_table in {} must not be empty", path.display());
        }

        if let Some(debounce) = &self.ui.search_debounce {
            parse_duration(debounce)
                .with_context(|| format!("ui.search_debounce in {}", path.display()))?;
        }

        Ok(())
    }

    pub fn api_base_url(&self) -> &str {
        self.api
            .base_url
            .as_deref()
            .unwrap_or(DEFAULT_API_BASE_URL)
            .trim()
            .trim_end_matches('/')
    }

    /// `ROWDESK_API_TOKEN` wins over the file so tokens can stay out of it.
    pub fn api_token(&self) -> Option<String> {
        env::var(API_TOKEN_ENV)
            .ok()
            .filter(|token| !token.trim().is_empty())
            .or_else(|| {
                self.api
                    .token
                    .clone()
                    .filter(|token| !token.trim().is_empty())
            })
    }

    pub fn api_timeout(&self) -> Result<Duration> {
        parse_duration(self.api.timeout.as_deref().unwrap_or(DEFAULT_API_TIMEOUT))
    }

    pub fn contacts_table(&self) -> &str {
        self.api
            .contacts_table
            .as_deref()
            .unwrap_or(DEFAULT_CONTACTS_TABLE)
            .trim()
    }

    pub fn search_debounce(&self) -> Result<Duration> {
        parse_duration(
            self.ui
                .search_debounce
                .as_deref()
                .unwrap_or(DEFAULT_SEARCH_DEBOUNCE),
        )
    }

    pub fn default_table(&self) -> Option<&str> {
        self.ui
            .default_table
            .as_deref()
            .map(str::trim)
            .filter(|table| !table.is_empty())
    }

    pub fn example_config(path: &Path) -> String {
        format!(
            "# rowdesk config\n# Place this file at: {}\n\nversion = 1\n\n[api]\nbase_url = \"{}\"\n# Optional. {} overrides this value.\n# token = \"...\"\ntimeout = \"{}\"\ncontacts_table = \"{}\"\n\n[ui]\nsearch_debounce = \"{}\"\n# Optional. Defaults to the first table the API lists.\n# default_table = \"n8n_chat_histories\"\n",
            path.display(),
            DEFAULT_API_BASE_URL,
            API_TOKEN_ENV,
            DEFAULT_API_TIMEOUT,
            DEFAULT_CONTACTS_TABLE,
            DEFAULT_SEARCH_DEBOUNCE,
        )
    }
}

fn parse_duration(raw: &str) -> Result<Duration> {
    let raw = raw.trim();
    if let Some(value) = raw.strip_suffix("ms") {
        let millis: u64 = value
            .parse()
            .with_context(|| format!("invalid duration {raw:?}"))?;
        return Ok(Duration::from_millis(millis));
    }
    if let Some(value) = raw.strip_suffix('s') {
        let secs: u64 = value
            .parse()
            .with_context(|| format!("invalid duration {raw:?}"))?;
        return Ok(Duration::from_secs(secs));
    }
    if let Some(value) = raw.strip_suffix('m') {
        let mins: u64 = value
            .parse()
            .with_context(|| format!("invalid duration {raw:?}"))?;
        return Ok(Duration::from_secs(mins * 60));
    }

    bail!("invalid duration {raw:?}; use one of: <N>ms, <N>s, <N>m (for example 200ms or 10s)")
}

#[cfg(test)]
mod tests {
    use super::{API_TOKEN_ENV, CONFIG_PATH_ENV, Config, parse_duration};
    use anyhow::Result;
    use std::path::PathBuf;
    use std::sync::{Mutex, OnceLock};
    use std::time::Duration;

    fn write_config(content: &str) -> Result<(tempfile::TempDir, PathBuf)> {
        let (temp, path) = rowdesk_testkit::temp_config_path()?;
        std::fs::write(&path, content)?;
        Ok((temp, path))
    }

    fn env_lock() -> std::sync::MutexGuard<'static, ()> {
        static ENV_LOCK: OnceLock<Mutex<()>> = OnceLock::new();
        match ENV_LOCK.get_or_init(|| Mutex::new(())).lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    #[test]
    fn missing_config_uses_defaults() -> Result<()> {
        let temp = tempfile::tempdir()?;
        let config = Config::load(&temp.path().join("missing.toml"))?;
        assert_eq!(config.version, 1);
        assert_eq!(
            config.api_base_url(),
            "http://localhost:5678/webhook/admin-api"
        );
        assert_eq!(config.api_timeout()?, Duration::from_secs(10));
        assert_eq!(config.search_debounce()?, Duration::from_millis(200));
        assert_eq!(config.contacts_table(), "contacts");
        assert_eq!(config.default_table(), None);
        Ok(())
    }

    #[test]
    fn unversioned_config_is_rejected_with_actionable_message() -> Result<()> {
        let (_temp, path) = write_config("[api]\nbase_url = \"http://example.test\"\n")?;
        let error = Config::load(&path).expect_err("unversioned config should fail");
        let message = error.to_string();
        assert!(message.contains("version = 1"));
        assert!(message.contains("[api] and [ui]"));
        Ok(())
    }

    #[test]
    fn v1_config_parses() -> Result<()> {
        let (_temp, path) = write_config(
            "version = 1\n[api]\nbase_url = \"https://n8n.example.com/webhook/admin-api/\"\ntimeout = \"3s\"\ncontacts_table = \"people\"\n[ui]\nsearch_debounce = \"350ms\"\ndefault_table = \"n8n_chat_histories\"\n",
        )?;

        let config = Config::load(&path)?;
        assert_eq!(
            config.api_base_url(),
            "https://n8n.example.com/webhook/admin-api"
        );
        assert_eq!(config.api_timeout()?, Duration::from_secs(3));
        assert_eq!(config.contacts_table(), "people");
        assert_eq!(config.search_debounce()?, Duration::from_millis(350));
        assert_eq!(config.default_table(), Some("n8n_chat_histories"));
        Ok(())
    }

    #[test]
    fn malformed_config_returns_parse_error() -> Result<()> {
        let (_temp, path) = write_config("{{not toml")?;
        let error = Config::load(&path).expect_err("malformed config should fail");
        assert!(error.to_string().contains("parse TOML config"));
        Ok(())
    }

    #[test]
    fn unsupported_config_version_is_rejected() -> Result<()> {
        let (_temp, path) = write_config("version = 2\n")?;
        let error = Config::load(&path).expect_err("v2 config should fail");
        assert!(error.to_string().contains("unsupported config version 2"));
        Ok(())
    }

    #[test]
    fn non_http_base_url_is_rejected() -> Result<()> {
        let (_temp, path) = write_config("version = 1\n[api]\nbase_url = \"localhost:5678\"\n")?;
        let error = Config::load(&path).expect_err("bare host should fail");
        assert!(error.to_string().contains("api.base_url"));
        Ok(())
    }

    #[test]
    fn zero_timeout_is_rejected() -> Result<()> {
        let (_temp, path) = write_config("version = 1\n[api]\ntimeout = \"0s\"\n")?;
        let error = Config::load(&path).expect_err("zero timeout should fail");
        assert!(error.to_string().contains("must be positive"));
        Ok(())
    }

    #[test]
    fn bad_debounce_names_the_key() -> Result<()> {
        let (_temp, path) = write_config("version = 1\n[ui]\nsearch_debounce = \"soon\"\n")?;
        let error = Config::load(&path).expect_err("bad debounce should fail");
        assert!(format!("{error:#}").contains("ui.search_debounce"));
        Ok(())
    }

    #[test]
    fn blank_contacts_table_is_rejected() -> Result<()> {
        let (_temp, path) = write_config("version = 1\n[api]\ncontacts_table = \"  \"\n")?;
        let error = Config::load(&path).expect_err("blank table should fail");
        assert!(error.to_string().contains("api.contacts_table"));
        Ok(())
    }

    #[test]
    fn token_env_overrides_config_value() -> Result<()> {
        let _guard = env_lock();
        let (_temp, path) = write_config("version = 1\n[api]\ntoken = \"from-file\"\n")?;
        let config = Config::load(&path)?;

        // SAFETY: test-only process-local env mutation.
        unsafe {
            std::env::remove_var(API_TOKEN_ENV);
        }
        assert_eq!(config.api_token().as_deref(), Some("from-file"));

        // SAFETY: test-only process-local env mutation.
        unsafe {
            std::env::set_var(API_TOKEN_ENV, "from-env");
        }
        let resolved = config.api_token();
        // SAFETY: test cleanup for process-local env mutation.
        unsafe {
            std::env::remove_var(API_TOKEN_ENV);
        }
        assert_eq!(resolved.as_deref(), Some("from-env"));
        Ok(())
    }

    #[test]
    fn default_path_honors_env_override() -> Result<()> {
        let _guard = env_lock();
        let temp = tempfile::tempdir()?;
        let override_path = temp.path().join("custom-config.toml");
        // SAFETY: test-only process-local env mutation.
        unsafe {
            std::env::set_var(CONFIG_PATH_ENV, &override_path);
        }
        let resolved = Config::default_path()?;
        // SAFETY: test cleanup for process-local env mutation.
        unsafe {
            std::env::remove_var(CONFIG_PATH_ENV);
        }
        assert_eq!(resolved, override_path);
        Ok(())
    }

    #[test]
    fn durations_parse_ms_seconds_and_minutes() -> Result<()> {
        assert_eq!(parse_duration("500ms")?, Duration::from_millis(500));
        assert_eq!(parse_duration(" 5s ")?, Duration::from_secs(5));
        assert_eq!(parse_duration("2m")?, Duration::from_secs(120));
        assert_eq!(parse_duration("0ms")?, Duration::ZERO);
        Ok(())
    }

    #[test]
    fn durations_reject_unknown_units() {
        let error = parse_duration("oops").expect_err("invalid duration should fail");
        assert!(error.to_string().contains("invalid duration"));
    }

    #[test]
    fn example_config_loads_cleanly() -> Result<()> {
        let (_temp, path) = rowdesk_testkit::temp_config_path()?;
        let example = Config::example_config(&path);
        assert!(example.contains("version = 1"));
        assert!(example.contains("[api]"));
        assert!(example.contains("[ui]"));

        std::fs::write(&path, &example)?;
        let config = Config::load(&path)?;
        assert_eq!(config.search_debounce()?, Duration::from_millis(200));
        Ok(())
    }
}
