//! Settings: defaults, then an optional TOML file, then environment
//! variables (a `.env` file is loaded into the environment beforehand).

use anyhow::{Context, Result, bail};
use chrono_tz::Tz;
use finbot_core::time::{DEFAULT_TIMEZONE, parse_timezone};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use crate::telegram::DEFAULT_API_BASE;

pub const DEFAULT_CONFIG_FILE: &str = "finbot.toml";
pub const DEFAULT_CREDENTIALS_FILE: &str = "config/credentials.json";

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub telegram: TelegramSection,
    pub sheets: SheetsSection,
    pub server: ServerSection,
    pub bot: BotSection,
    pub log: LogSection,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct TelegramSection {
    pub token: String,
    pub api_base: String,
    /// Long-poll wait in seconds.
    pub poll_timeout_secs: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LedgerBackend {
    Sheets,
    /// Rows are kept in memory and lost on exit.
    Memory,
}

impl FromStr for LedgerBackend {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "sheets" => Ok(LedgerBackend::Sheets),
            "memory" => Ok(LedgerBackend::Memory),
            other => bail!("unknown ledger backend {other:?} (expected sheets or memory)"),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SheetsSection {
    pub backend: LedgerBackend,
    pub spreadsheet_id: String,
    pub sheet_name: String,
    pub credentials_file: PathBuf,
    /// Base64 service-account JSON; written to `credentials_file` at startup.
    pub credentials_base64: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerSection {
    pub host: String,
    pub port: u16,
    /// Public base URL; when set, serve mode registers `<url>/webhook`.
    pub public_url: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct BotSection {
    pub timezone: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LogSection {
    /// EnvFilter directive; RUST_LOG wins when set.
    pub filter: String,
    pub file: Option<PathBuf>,
}

impl Default for TelegramSection {
    fn default() -> Self {
        Self {
            token: String::new(),
            api_base: DEFAULT_API_BASE.to_string(),
            poll_timeout_secs: 30,
        }
    }
}

impl Default for SheetsSection {
    fn default() -> Self {
        Self {
            backend: LedgerBackend::Sheets,
            spreadsheet_id: String::new(),
            sheet_name: String::new(),
            credentials_file: PathBuf::from(DEFAULT_CREDENTIALS_FILE),
            credentials_base64: None,
        }
    }
}

impl Default for ServerSection {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 5000,
            public_url: None,
        }
    }
}

impl Default for BotSection {
    fn default() -> Self {
        Self {
            timezone: DEFAULT_TIMEZONE.to_string(),
        }
    }
}

impl Default for LogSection {
    fn default() -> Self {
        Self {
            filter: "info,finbot=debug".to_string(),
            file: None,
        }
    }
}

impl Config {
    /// Load from `path`, or `./finbot.toml` when present, then apply the
    /// process environment.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let file = path.map(Path::to_path_buf).or_else(|| {
            let p = PathBuf::from(DEFAULT_CONFIG_FILE);
            p.exists().then_some(p)
        });

        let mut cfg = match file {
            Some(p) => Self::from_file(&p)?,
            None => Self::default(),
        };
        cfg.apply_env(|key| std::env::var(key).ok())?;
        Ok(cfg)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let s = fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
        toml::from_str(&s).with_context(|| format!("parse {}", path.display()))
    }

    /// Override fields from environment variables. Empty values are ignored.
    pub fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) -> Result<()> {
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(v) = var("TELEGRAM_BOT_TOKEN") {
            self.telegram.token = v;
        }
        if let Some(v) = var("GOOGLE_SHEET_ID") {
            self.sheets.spreadsheet_id = v;
        }
        if let Some(v) = var("GOOGLE_SHEET_NAME") {
            self.sheets.sheet_name = v;
        }
        if let Some(v) = var("GOOGLE_SERVICE_ACCOUNT_FILE") {
            self.sheets.credentials_file = PathBuf::from(v);
        }
        if let Some(v) = var("GOOGLE_CREDENTIALS_BASE64") {
            self.sheets.credentials_base64 = Some(v);
        }
        if let Some(v) = var("LEDGER_BACKEND") {
            self.sheets.backend = v.parse()?;
        }
        if let Some(v) = var("BOT_TIMEZONE") {
            self.bot.timezone = v;
        }
        if let Some(v) = var("HOST") {
            self.server.host = v;
        }
        if let Some(v) = var("PORT") {
            self.server.port = v
                .trim()
                .parse()
                .with_context(|| format!("PORT must be a port number, got {v:?}"))?;
        }
        if let Some(v) = var("WEBHOOK_BASE_URL").or_else(|| var("RENDER_EXTERNAL_URL")) {
            self.server.public_url = Some(v);
        }
        if let Some(v) = var("LOG_FILE") {
            self.log.file = Some(PathBuf::from(v));
        }
        Ok(())
    }

    /// Startup checks for running the bot. Returns the parsed timezone.
    pub fn validate(&self) -> Result<Tz> {
        if self.telegram.token.trim().is_empty() {
            bail!("TELEGRAM_BOT_TOKEN is not set");
        }
        if self.sheets.backend == LedgerBackend::Sheets {
            if self.sheets.spreadsheet_id.trim().is_empty() {
                bail!("GOOGLE_SHEET_ID is not set");
            }
            if self.sheets.sheet_name.trim().is_empty() {
                bail!("GOOGLE_SHEET_NAME is not set");
            }
        }
        self.timezone()
    }

    pub fn timezone(&self) -> Result<Tz> {
        parse_timezone(&self.bot.timezone).context("BOT_TIMEZONE")
    }

    /// `<public url>/webhook`, when a public URL is configured.
    pub fn webhook_url(&self) -> Option<String> {
        self.server
            .public_url
            .as_deref()
            .map(|base| format!("{}/webhook", base.trim_end_matches('/')))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    fn ready() -> Config {
        let mut cfg = Config::default();
        cfg.apply_env(env(&[
            ("TELEGRAM_BOT_TOKEN", "123:abc"),
            ("GOOGLE_SHEET_ID", "sheet-id"),
            ("GOOGLE_SHEET_NAME", "Gastos"),
        ]))
        .unwrap();
        cfg
    }

    #[test]
    fn test_defaults() {
        let cfg = Config::default();
        assert_eq!(cfg.server.port, 5000);
        assert_eq!(cfg.server.host, "0.0.0.0");
        assert_eq!(cfg.bot.timezone, "America/Sao_Paulo");
        assert_eq!(cfg.sheets.backend, LedgerBackend::Sheets);
        assert_eq!(
            cfg.sheets.credentials_file,
            PathBuf::from("config/credentials.json")
        );
        assert_eq!(cfg.telegram.api_base, "https://api.telegram.org");
    }

    #[test]
    fn test_env_overrides() {
        let mut cfg = Config::default();
        cfg.apply_env(env(&[
            ("TELEGRAM_BOT_TOKEN", "123:abc"),
            ("PORT", "8443"),
            ("LEDGER_BACKEND", "Memory"),
            ("BOT_TIMEZONE", "Europe/Lisbon"),
            ("LOG_FILE", "logs/bot.log"),
            ("GOOGLE_CREDENTIALS_BASE64", "e30="),
        ]))
        .unwrap();

        assert_eq!(cfg.telegram.token, "123:abc");
        assert_eq!(cfg.server.port, 8443);
        assert_eq!(cfg.sheets.backend, LedgerBackend::Memory);
        assert_eq!(cfg.bot.timezone, "Europe/Lisbon");
        assert_eq!(cfg.log.file, Some(PathBuf::from("logs/bot.log")));
        assert_eq!(cfg.sheets.credentials_base64.as_deref(), Some("e30="));
    }

    #[test]
    fn test_empty_env_values_ignored() {
        let mut cfg = Config::default();
        cfg.apply_env(env(&[("PORT", ""), ("HOST", "  ")])).unwrap();
        assert_eq!(cfg.server.port, 5000);
        assert_eq!(cfg.server.host, "0.0.0.0");
    }

    #[test]
    fn test_bad_env_values() {
        let mut cfg = Config::default();
        assert!(cfg.apply_env(env(&[("PORT", "http")])).is_err());
        assert!(cfg.apply_env(env(&[("LEDGER_BACKEND", "csv")])).is_err());
    }

    #[test]
    fn test_public_url_fallback() {
        let mut cfg = Config::default();
        cfg.apply_env(env(&[("RENDER_EXTERNAL_URL", "https://finbot.onrender.com/")]))
            .unwrap();
        assert_eq!(
            cfg.webhook_url().as_deref(),
            Some("https://finbot.onrender.com/webhook")
        );

        cfg.apply_env(env(&[
            ("WEBHOOK_BASE_URL", "https://bot.example.com"),
            ("RENDER_EXTERNAL_URL", "https://finbot.onrender.com"),
        ]))
        .unwrap();
        assert_eq!(
            cfg.webhook_url().as_deref(),
            Some("https://bot.example.com/webhook")
        );
    }

    #[test]
    fn test_validate() {
        assert!(ready().validate().is_ok());

        let mut no_token = ready();
        no_token.telegram.token.clear();
        assert!(no_token.validate().is_err());

        let mut no_sheet = ready();
        no_sheet.sheets.sheet_name.clear();
        assert!(no_sheet.validate().is_err());

        no_sheet.sheets.backend = LedgerBackend::Memory;
        assert!(no_sheet.validate().is_ok());

        let mut bad_tz = ready();
        bad_tz.bot.timezone = "Mars/Olympus".to_string();
        assert!(bad_tz.validate().is_err());
    }

    #[test]
    fn test_toml_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("finbot.toml");
        fs::write(
            &path,
            r#"
[telegram]
token = "from-file"

[sheets]
backend = "memory"

[server]
port = 9000
public_url = "https://bot.example.com"
"#,
        )
        .unwrap();

        let mut cfg = Config::from_file(&path).unwrap();
        assert_eq!(cfg.telegram.token, "from-file");
        assert_eq!(cfg.telegram.poll_timeout_secs, 30);
        assert_eq!(cfg.sheets.backend, LedgerBackend::Memory);
        assert_eq!(cfg.server.port, 9000);
        assert_eq!(cfg.server.host, "0.0.0.0");

        cfg.apply_env(env(&[("TELEGRAM_BOT_TOKEN", "from-env")])).unwrap();
        assert_eq!(cfg.telegram.token, "from-env");
    }
}
