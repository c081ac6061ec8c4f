//! INI configuration model
//!
//! Sections and entries keep insertion order so the exported file reads the
//! same way it was built.

use crate::{
    config::ConfigExport,
    error::{Error, Result},
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::io::Write;
use std::path::Path;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IniSection {
    pub name: String,
    #[serde(default)]
    pub entries: Vec<(String, String)>,
}

impl IniSection {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            entries: Vec::new(),
        }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into();
        let value = value.into();
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((key, value)),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IniConfig {
    #[serde(default)]
    pub sections: Vec<IniSection>,
}

impl IniConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.sections.is_empty()
    }

    pub fn section(&self, name: &str) -> Option<&IniSection> {
        self.sections.iter().find(|s| s.name == name)
    }

    fn section_mut(&mut self, name: &str) -> &mut IniSection {
        let index = match self.sections.iter().position(|s| s.name == name) {
            Some(index) => index,
            None => {
                self.sections.push(IniSection::new(name));
                self.sections.len() - 1
            }
        };
        &mut self.sections[index]
    }

    pub fn get(&self, section: &str, key: &str) -> Option<&str> {
        self.section(section).and_then(|s| s.get(key))
    }

    /// Insert or replace `key` in `section`, creating the section if needed.
    pub fn set(&mut self, section: &str, key: impl Into<String>, value: impl Into<String>) {
        self.section_mut(section).set(key, value);
    }

    pub fn with(mut self, section: &str, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.set(section, key, value);
        self
    }

    /// Parse INI text. Comments start with `#` or `;`, entries use `=` or `:`.
    pub fn parse(text: &str) -> Result<Self> {
        let mut config = IniConfig::new();
        let mut current: Option<String> = None;

        for (index, raw) in text.lines().enumerate() {
            let line_no = index + 1;
            let line = raw.trim();

            if line.is_empty() || line.starts_with('#') || line.starts_with(';') {
                continue;
            }

            if let Some(rest) = line.strip_prefix('[') {
                let (name, trailing) = rest.split_once(']').ok_or_else(|| {
                    Error::ConfigError(format!("line {line_no}: unterminated section header"))
                })?;
                let trailing = trailing.trim_start();
                if !trailing.is_empty() && !trailing.starts_with(['#', ';']) {
                    return Err(Error::ConfigError(format!(
                        "line {line_no}: unexpected `{trailing}` after section header"
                    )));
                }
                let name = name.trim();
                if name.is_empty() {
                    return Err(Error::ConfigError(format!(
                        "line {line_no}: empty section name"
                    )));
                }
                config.section_mut(name);
                current = Some(name.to_string());
                continue;
            }

            let Some(split) = line.find(['=', ':']) else {
                return Err(Error::ConfigError(format!(
                    "line {line_no}: expected `key = value`, got `{line}`"
                )));
            };
            let key = line[..split].trim();
            let value = line[split + 1..].trim();
            if key.is_empty() {
                return Err(Error::ConfigError(format!("line {line_no}: missing key")));
            }

            let Some(section) = current.as_deref() else {
                return Err(Error::ConfigError(format!(
                    "line {line_no}: entry `{key}` appears before any section"
                )));
            };
            config.set(section, key, value);
        }

        Ok(config)
    }

    /// Check that every name, key and value survives being written as one INI
    /// line and read back unchanged.
    pub fn validate(&self) -> Result<()> {
        for section in &self.sections {
            let name = section.name.as_str();
            if name.trim().is_empty() || name.contains(['\n', '\r', ']']) {
                return Err(Error::ConfigError(format!(
                    "invalid section name {name:?}"
                )));
            }

            for (key, value) in &section.entries {
                if key.trim().is_empty() || key.contains(['\n', '\r', '=', ':']) {
                    return Err(Error::ConfigError(format!(
                        "invalid key {key:?} in section `{name}`"
                    )));
                }
                if key.trim_start().starts_with(['[', '#', ';']) {
                    return Err(Error::ConfigError(format!(
                        "key {key:?} in section `{name}` would read back as a header or comment"
                    )));
                }
                if value.contains(['\n', '\r']) {
                    return Err(Error::ConfigError(format!(
                        "value of `{name}.{key}` must be a single line"
                    )));
                }
            }
        }
        Ok(())
    }

    /// Build a config from a JSON object of objects, `{"section": {"key": scalar}}`.
    pub fn from_json_value(value: &Value) -> Result<Self> {
        let Value::Object(sections) = value else {
            return Err(Error::ConfigError(
                "JSON config must be an object of sections".to_string(),
            ));
        };

        let mut config = IniConfig::new();
        for (name, entries) in sections {
            let Value::Object(entries) = entries else {
                return Err(Error::ConfigError(format!(
                    "section `{name}` must be an object"
                )));
            };
            let section = config.section_mut(name);
            for (key, value) in entries {
                let value = match value {
                    Value::String(s) => s.clone(),
                    Value::Null => String::new(),
                    Value::Bool(_) | Value::Number(_) => value.to_string(),
                    Value::Array(_) | Value::Object(_) => {
                        return Err(Error::ConfigError(format!(
                            "`{name}.{key}` must be a scalar value"
                        )));
                    }
                };
                section.set(key.clone(), value);
            }
        }
        config.validate()?;
        Ok(config)
    }

    /// Load from disk; `.json` files are read as JSON, anything else as INI.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let is_json = path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| e.eq_ignore_ascii_case("json"));

        if is_json {
            let value: Value = serde_json::from_str(&contents)?;
            Self::from_json_value(&value)
        } else {
            Self::parse(&contents)
        }
    }

    /// Rendered INI text; empty when [`IniConfig::validate`] fails.
    pub fn to_ini_string(&self) -> String {
        let mut out = Vec::new();
        // Writing into a Vec cannot fail, validation is the only error
        let _ = self.export_to(&mut out);
        String::from_utf8_lossy(&out).into_owned()
    }
}

impl ConfigExport for IniConfig {
    fn export_to(&self, writer: &mut dyn Write) -> Result<()> {
        self.validate()?;
        for section in &self.sections {
            writeln!(writer, "[{}]", section.name)?;
            for (key, value) in &section.entries {
                writeln!(writer, "{key} = {value}")?;
            }
            writeln!(writer)?;
        }
        writer.flush()?;
        Ok(())
    }
}
