//! Startup configuration for Gantry.
//!
//! The engine consumes a flat string-to-string mapping, read once at
//! bootstrap. [`Settings`] builds that mapping from in-memory pairs, a TOML
//! file (nested tables flatten to dotted keys), and prefixed environment
//! variables, with later sources overriding earlier ones.

mod error;

pub use error::{ConfigError, Result};

use std::collections::HashMap;
use std::path::Path;

/// Environment variables prefixed with this overlay file/pair settings.
pub const ENV_PREFIX: &str = "GANTRY_";

/// A flat string-to-string configuration mapping.
#[derive(Debug, Clone, Default)]
pub struct Settings {
    values: HashMap<String, String>,
}

impl Settings {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds settings from key/value pairs.
    pub fn from_pairs<K, V, I>(pairs: I) -> Self
    where
        K: Into<String>,
        V: Into<String>,
        I: IntoIterator<Item = (K, V)>,
    {
        let mut settings = Self::new();
        for (key, value) in pairs {
            settings.set(key, value);
        }
        settings
    }

    /// Sets one value, replacing any previous one.
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.values.insert(key.into(), value.into());
    }

    /// Loads a TOML file over the current values. Nested tables flatten to
    /// dotted keys; scalar values stringify.
    pub fn load_file(&mut self, path: impl AsRef<Path>) -> Result<()> {
        let text = std::fs::read_to_string(path.as_ref())
            .map_err(|e| ConfigError::LoadError(format!("{}: {e}", path.as_ref().display())))?;
        self.load_toml_str(&text)
    }

    /// Loads TOML text over the current values.
    pub fn load_toml_str(&mut self, text: &str) -> Result<()> {
        let table: toml::Table = text
            .parse()
            .map_err(|e| ConfigError::ParseError(format!("invalid TOML: {e}")))?;
        flatten_table(&mut self.values, "", &table)
    }

    /// Overlays `GANTRY_`-prefixed process environment variables; the prefix
    /// is stripped and the rest lower-cased, so `GANTRY_SCAN_ROOT` becomes
    /// `scan_root`.
    pub fn load_env(&mut self) {
        self.overlay_env(std::env::vars(), ENV_PREFIX);
    }

    /// Overlays explicit environment-style pairs under `prefix`.
    pub fn overlay_env<I>(&mut self, vars: I, prefix: &str)
    where
        I: IntoIterator<Item = (String, String)>,
    {
        for (key, value) in vars {
            if let Some(stripped) = key.strip_prefix(prefix) {
                self.set(stripped.to_lowercase(), value);
            }
        }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }

    pub fn get_or<'a>(&'a self, key: &str, default: &'a str) -> &'a str {
        self.get(key).unwrap_or(default)
    }

    pub fn get_int(&self, key: &str) -> Result<i64> {
        let raw = self
            .get(key)
            .ok_or_else(|| ConfigError::KeyNotFound(key.to_string()))?;
        raw.parse()
            .map_err(|_| ConfigError::ParseError(format!("`{key}` is not an integer: `{raw}`")))
    }

    pub fn get_bool(&self, key: &str) -> Result<bool> {
        let raw = self
            .get(key)
            .ok_or_else(|| ConfigError::KeyNotFound(key.to_string()))?;
        match raw {
            "true" | "1" => Ok(true),
            "false" | "0" => Ok(false),
            other => Err(ConfigError::ParseError(format!(
                "`{key}` is not a boolean: `{other}`"
            ))),
        }
    }

    pub fn has(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    /// The flat mapping, as the engine's bootstrap consumes it.
    pub fn values(&self) -> &HashMap<String, String> {
        &self.values
    }
}

fn flatten_table(
    values: &mut HashMap<String, String>,
    prefix: &str,
    table: &toml::Table,
) -> Result<()> {
    for (key, value) in table {
        let flat_key = if prefix.is_empty() {
            key.clone()
        } else {
            format!("{prefix}.{key}")
        };
        match value {
            toml::Value::String(s) => {
                values.insert(flat_key, s.clone());
            }
            toml::Value::Integer(i) => {
                values.insert(flat_key, i.to_string());
            }
            toml::Value::Float(f) => {
                values.insert(flat_key, f.to_string());
            }
            toml::Value::Boolean(b) => {
                values.insert(flat_key, b.to_string());
            }
            toml::Value::Datetime(dt) => {
                values.insert(flat_key, dt.to_string());
            }
            toml::Value::Table(nested) => {
                flatten_table(values, &flat_key, nested)?;
            }
            toml::Value::Array(_) => {
                return Err(ConfigError::ParseError(format!(
                    "`{flat_key}`: arrays are not supported in flat settings"
                )));
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pairs_round_trip() {
        let settings = Settings::from_pairs([("scan_root", "demo_app"), ("port", "8080")]);
        assert_eq!(settings.get("scan_root"), Some("demo_app"));
        assert_eq!(settings.get_int("port").unwrap(), 8080);
        assert!(!settings.has("missing"));
    }

    #[test]
    fn toml_tables_flatten_to_dotted_keys() {
        let mut settings = Settings::new();
        settings
            .load_toml_str(
                r#"
                scan_root = "demo_app"
                port = 8080

                [server]
                context_path = "/app"
                verbose = true
                "#,
            )
            .unwrap();

        assert_eq!(settings.get("scan_root"), Some("demo_app"));
        assert_eq!(settings.get("port"), Some("8080"));
        assert_eq!(settings.get("server.context_path"), Some("/app"));
        assert!(settings.get_bool("server.verbose").unwrap());
    }

    #[test]
    fn toml_arrays_are_rejected() {
        let mut settings = Settings::new();
        let err = settings.load_toml_str("roots = [\"a\", \"b\"]").unwrap_err();
        assert!(matches!(err, ConfigError::ParseError(_)));
    }

    #[test]
    fn env_overlay_strips_prefix_and_wins() {
        let mut settings = Settings::from_pairs([("scan_root", "from_file")]);
        settings.overlay_env(
            [
                ("GANTRY_SCAN_ROOT".to_string(), "from_env".to_string()),
                ("UNRELATED".to_string(), "ignored".to_string()),
            ],
            ENV_PREFIX,
        );

        assert_eq!(settings.get("scan_root"), Some("from_env"));
        assert!(!settings.has("unrelated"));
    }

    #[test]
    fn typed_getters_report_bad_values() {
        let settings = Settings::from_pairs([("port", "eighty")]);
        assert!(matches!(
            settings.get_int("port"),
            Err(ConfigError::ParseError(_))
        ));
        assert!(matches!(
            settings.get_int("absent"),
            Err(ConfigError::KeyNotFound(_))
        ));
    }
}
