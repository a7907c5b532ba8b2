use std::io::ErrorKind;
use std::path::Path;
use std::path::PathBuf;

use anyhow::Context;
use toml_edit::DocumentMut;
use toml_edit::Item as TomlItem;
use tutor_protocol::ChatId;
use tutor_protocol::UserId;
use tutor_tui::EndpointConfig;
use tutor_tui::Session;

const BASE_URL_KEY: &str = "base_url";
const USER_ID_KEY: &str = "user_id";
const CHAT_ID_KEY: &str = "chat_id";

/// Values read from `config.toml`. Every key is optional.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FileConfig {
    pub base_url: Option<String>,
    pub user_id: Option<UserId>,
    pub chat_id: Option<ChatId>,
}

#[derive(Debug, Clone)]
pub struct ConfigStore {
    path: PathBuf,
}

impl ConfigStore {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    pub fn new_default() -> anyhow::Result<Self> {
        let Some(home) = dirs::home_dir() else {
            anyhow::bail!("cannot determine home directory for config path");
        };
        Ok(Self::new(default_config_path(&home)))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Reads the config file. A missing file yields the defaults.
    ///
    /// Content that is not valid TOML is scanned line by line for top-level keys instead.
    pub fn load(&self) -> anyhow::Result<FileConfig> {
        let Some(content) = read_document_string(&self.path)? else {
            return Ok(FileConfig::default());
        };

        let raw = match content.parse::<DocumentMut>() {
            Ok(doc) => read_document(&doc),
            Err(_) => parse_fallback(&content),
        };
        raw.into_file_config()
    }
}

/// Merges command-line values over the file config. `None` everywhere means the built-in default.
pub fn resolve_base_url(flag: Option<&str>, file: &FileConfig) -> String {
    flag.or(file.base_url.as_deref())
        .unwrap_or(EndpointConfig::DEFAULT_BASE_URL)
        .to_string()
}

/// Seeds the session. Each identifier resolves independently; the flag wins over the file.
pub fn resolve_session(
    user_id: Option<UserId>,
    chat_id: Option<ChatId>,
    file: &FileConfig,
) -> Session {
    Session::with_ids(user_id.or(file.user_id), chat_id.or(file.chat_id))
}

fn default_config_path(home: &Path) -> PathBuf {
    home.join(".tutor-orchestrator").join("config.toml")
}

/// Values as written in the file, before validation.
#[derive(Debug, Default)]
struct RawConfig {
    base_url: Option<String>,
    user_id: Option<String>,
    chat_id: Option<String>,
}

impl RawConfig {
    fn set(&mut self, key: &str, value: String) {
        match key {
            BASE_URL_KEY => self.base_url = Some(value),
            USER_ID_KEY => self.user_id = Some(value),
            CHAT_ID_KEY => self.chat_id = Some(value),
            _ => {}
        }
    }

    fn into_file_config(self) -> anyhow::Result<FileConfig> {
        let user_id = self
            .user_id
            .map(|raw| raw.parse::<UserId>())
            .transpose()
            .with_context(|| format!("read `{USER_ID_KEY}`"))?;
        let chat_id = self
            .chat_id
            .map(|raw| raw.parse::<ChatId>())
            .transpose()
            .with_context(|| format!("read `{CHAT_ID_KEY}`"))?;
        Ok(FileConfig {
            base_url: self.base_url,
            user_id,
            chat_id,
        })
    }
}

fn read_document(doc: &DocumentMut) -> RawConfig {
    let mut raw = RawConfig::default();
    for key in [BASE_URL_KEY, USER_ID_KEY, CHAT_ID_KEY] {
        if let Some(value) = read_scalar(doc, key) {
            raw.set(key, value);
        }
    }
    raw
}

/// Strings are taken verbatim; integers are rendered so identifiers validate uniformly.
fn read_scalar(doc: &DocumentMut, key: &str) -> Option<String> {
    let value = doc.get(key).and_then(TomlItem::as_value)?;
    value
        .as_str()
        .map(str::to_string)
        .or_else(|| value.as_integer().map(|n| n.to_string()))
}

fn parse_fallback(contents: &str) -> RawConfig {
    let mut raw = RawConfig::default();

    for line in contents.lines() {
        let trimmed = line.trim_start();
        // Only top-level keys count; stop at the first table header.
        if trimmed.starts_with('[') {
            break;
        }
        let Some(line) = strip_toml_comment(trimmed) else {
            continue;
        };
        let Some((key, value)) = line.split_once('=') else {
            continue;
        };
        let value = value.trim();
        let value = value
            .strip_prefix('"')
            .and_then(|rest| rest.strip_suffix('"'))
            .unwrap_or(value);
        raw.set(key.trim(), value.to_string());
    }

    raw
}

fn strip_toml_comment(line: &str) -> Option<&str> {
    let line = line.split_once('#').map_or(line, |(head, _)| head).trim();
    if line.is_empty() { None } else { Some(line) }
}

fn read_document_string(path: &Path) -> anyhow::Result<Option<String>> {
    match std::fs::read_to_string(path) {
        Ok(contents) => Ok(Some(contents)),
        Err(err) if err.kind() == ErrorKind::NotFound => Ok(None),
        Err(err) => Err(anyhow::Error::new(err).context("read config.toml")),
    }
}
