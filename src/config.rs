use serde::Deserialize;
use std::fmt;
use std::fs;
use std::path::Path;

use crate::error::{Error, Result};

/// Compiled-in defaults, checked by build.rs.
const DEFAULT_CONFIG: &str = include_str!("default_config.toml");

/// Environment variable holding the integration secret.
pub const NOTION_KEY_VAR: &str = "NOTION_KEY";
/// Environment variable holding the target page id.
pub const PAGE_ID_VAR: &str = "PAGE_ID";
/// Notion page ids are 32 hex characters without dashes.
pub const PAGE_ID_LEN: usize = 32;

#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct Config {
    pub api: ApiConfig,
    pub output: OutputConfig,
}

#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct ApiConfig {
    pub base_url: String,
    pub notion_version: String,
}

#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct OutputConfig {
    pub page_url: String,
}

impl OutputConfig {
    /// Browser link for a page.
    pub fn page_link(&self, page_id: &str) -> String {
        format!("{}/{}", self.page_url.trim_end_matches('/'), page_id)
    }
}

impl Config {
    /// The configuration shipped with the binary.
    pub fn compiled_default() -> Self {
        toml::from_str(DEFAULT_CONFIG).expect("default_config.toml is validated by build.rs")
    }

    /// Load a config file on top of the compiled defaults. Keys the file
    /// does not set keep their default values.
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("{}: {}", path.display(), e)))?;
        Self::from_override(&content)
            .map_err(|e| Error::Config(format!("{}: {}", path.display(), e)))
    }

    /// Load `path` if given, otherwise the compiled defaults.
    pub fn load_or_default(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::load(path),
            None => Ok(Self::compiled_default()),
        }
    }

    fn from_override(content: &str) -> std::result::Result<Self, toml::de::Error> {
        let mut merged: toml::Table = DEFAULT_CONFIG.parse()?;
        let overrides: toml::Table = content.parse()?;
        merge_tables(&mut merged, overrides);
        toml::Value::Table(merged).try_into()
    }
}

fn merge_tables(base: &mut toml::Table, overrides: toml::Table) {
    for (key, value) in overrides {
        if let toml::Value::Table(section) = value {
            if let Some(toml::Value::Table(base_section)) = base.get_mut(&key) {
                merge_tables(base_section, section);
                continue;
            }
            base.insert(key, toml::Value::Table(section));
        } else {
            base.insert(key, value);
        }
    }
}

/// The secret and target page for one run, resolved once at startup.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub notion_key: String,
    pub page_id: String,
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("notion_key", &"<redacted>")
            .field("page_id", &self.page_id)
            .finish()
    }
}

impl Credentials {
    /// Command line values win over `env`. Empty values count as missing.
    pub fn resolve(
        notion_key: Option<String>,
        page_id: Option<String>,
        env: impl Fn(&str) -> Option<String>,
    ) -> Result<Self> {
        let pick = |cli: Option<String>, var: &str| {
            cli.filter(|v| !v.is_empty())
                .or_else(|| env(var).filter(|v| !v.is_empty()))
        };

        let (Some(notion_key), Some(page_id)) =
            (pick(notion_key, NOTION_KEY_VAR), pick(page_id, PAGE_ID_VAR))
        else {
            return Err(Error::MissingCredentials);
        };

        validate_page_id(&page_id)?;

        Ok(Self {
            notion_key,
            page_id,
        })
    }

    /// Resolve against the process environment.
    pub fn from_env(notion_key: Option<String>, page_id: Option<String>) -> Result<Self> {
        Self::resolve(notion_key, page_id, |var| std::env::var(var).ok())
    }
}

/// Only the length is checked; whether the page exists is up to Notion.
pub fn validate_page_id(page_id: &str) -> Result<()> {
    let len = page_id.chars().count();
    if len != PAGE_ID_LEN {
        return Err(Error::InvalidPageId(format!(
            "expected {} characters, got {}",
            PAGE_ID_LEN, len
        )));
    }
    Ok(())
}
