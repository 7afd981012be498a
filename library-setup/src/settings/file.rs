//! Reader and writer for `KEY = "VALUE"` config files

use super::keys::REQUIRED_KEYS;
use crate::error::{BootstrapError, Result};
use std::fs;
use std::path::Path;

const BOM: char = '\u{feff}';

/// Ordered key/value pairs read from a config file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConfigFile {
    entries: Vec<(String, String)>,
}

impl ConfigFile {
    /// Parse file contents. Comments, blank lines and lines without `=` are ignored.
    pub fn parse(content: &str) -> Self {
        let mut file = Self::default();
        for line in content.trim_start_matches(BOM).lines() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let Some((key, value)) = line.split_once('=') else {
                continue;
            };
            let key = key.trim();
            if key.is_empty() {
                continue;
            }
            file.set(key, unquote(value.trim()));
        }
        file
    }

    /// Read and parse a config file from disk.
    pub fn load(path: &Path) -> Result<Self> {
        let content =
            fs::read_to_string(path).map_err(|e| BootstrapError::io("read", path, e))?;
        Ok(Self::parse(&content))
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Insert or replace a value, keeping the key's original position.
    pub fn set(&mut self, key: &str, value: impl Into<String>) {
        let value = value.into();
        match self.entries.iter_mut().find(|(k, _)| k == key) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((key.to_string(), value)),
        }
    }

    /// Render with required keys first, then any extra keys in file order.
    pub fn render(&self) -> String {
        let mut out = String::new();
        for key in REQUIRED_KEYS {
            let value = self.get(key.name).unwrap_or_default();
            out.push_str(&format!("{} = \"{}\"\n", key.name, value));
        }
        for (key, value) in &self.entries {
            if REQUIRED_KEYS.iter().any(|k| k.name == key.as_str()) {
                continue;
            }
            out.push_str(&format!("{} = \"{}\"\n", key, value));
        }
        out
    }

    /// Write the whole file atomically via a sibling temp file and rename.
    pub fn save(&self, path: &Path) -> Result<()> {
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "config".to_string());
        let tmp = path.with_file_name(format!(".{}.tmp", file_name));

        fs::write(&tmp, self.render()).map_err(|e| BootstrapError::io("write", &tmp, e))?;
        fs::rename(&tmp, path).map_err(|e| {
            let _ = fs::remove_file(&tmp);
            BootstrapError::io("replace", path, e)
        })
    }
}

fn unquote(value: &str) -> &str {
    for quote in ['"', '\''] {
        if value.len() >= 2 && value.starts_with(quote) && value.ends_with(quote) {
            return &value[1..value.len() - 1];
        }
    }
    value
}
