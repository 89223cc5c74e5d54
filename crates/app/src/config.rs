//! Application configuration loaded from environment variables.

use std::str::FromStr;

use views::{Field, ListViewConfig};

/// How rendered rows are written to stdout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    #[default]
    Html,
    Json,
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "html" => Ok(OutputFormat::Html),
            "json" => Ok(OutputFormat::Json),
            other => Err(format!("unknown output format {other:?}")),
        }
    }
}

/// Application configuration with sensible defaults.
///
/// Reads from environment variables:
/// - `PERSON_LIST_CONTAINER` — render target id (default: `"person-table"`)
/// - `PERSON_LIST_REMOVE_CLASS` — remove control class (default: `"remove-person"`)
/// - `PERSON_LIST_FIELDS` — comma separated columns (default: `name,birthYear,removeAction`)
/// - `PERSON_LIST_FORMAT` — `html` or `json` (default: `html`)
/// - `PERSON_LIST_SEED` — start with the sample person (default: `true`)
/// - `RUST_LOG` — tracing filter directive (default: `"info"`)
///
/// Unparseable values fall back to their defaults with a warning.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub view: ListViewConfig,
    pub format: OutputFormat,
    pub seed: bool,
    pub log_level: String,
}

impl Config {
    /// Loads configuration from environment variables, falling back to defaults.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Loads configuration from an arbitrary key lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();

        let mut view = defaults.view;
        if let Some(container) = lookup("PERSON_LIST_CONTAINER") {
            view.container_id = container;
        }
        if let Some(class) = lookup("PERSON_LIST_REMOVE_CLASS") {
            view.remove_action_class = class;
        }
        if let Some(fields) = lookup("PERSON_LIST_FIELDS") {
            match Field::parse_list(&fields) {
                Ok(parsed) if !parsed.is_empty() => view.fields = parsed,
                Ok(_) => tracing::warn!("PERSON_LIST_FIELDS is empty, using defaults"),
                Err(err) => tracing::warn!(error = %err, "ignoring PERSON_LIST_FIELDS"),
            }
        }

        let format = lookup("PERSON_LIST_FORMAT")
            .and_then(|value| {
                value
                    .parse::<OutputFormat>()
                    .map_err(|err| tracing::warn!(error = %err, "ignoring PERSON_LIST_FORMAT"))
                    .ok()
            })
            .unwrap_or(defaults.format);

        let seed = lookup("PERSON_LIST_SEED")
            .and_then(|value| parse_flag(&value))
            .unwrap_or(defaults.seed);

        Self {
            view,
            format,
            seed,
            log_level: lookup("RUST_LOG").unwrap_or(defaults.log_level),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            view: ListViewConfig::default(),
            format: OutputFormat::Html,
            seed: true,
            log_level: "info".to_string(),
        }
    }
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_default_values() {
        let config = Config::default();
        assert_eq!(config.view, ListViewConfig::default());
        assert_eq!(config.format, OutputFormat::Html);
        assert!(config.seed);
        assert_eq!(config.log_level, "info");
    }

    #[test]
    fn test_empty_lookup_gives_defaults() {
        let config = Config::from_lookup(|_| None);
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_overrides() {
        let config = Config::from_lookup(lookup_from(&[
            ("PERSON_LIST_CONTAINER", "people"),
            ("PERSON_LIST_REMOVE_CLASS", "drop"),
            ("PERSON_LIST_FIELDS", "name,removeButton"),
            ("PERSON_LIST_FORMAT", "JSON"),
            ("PERSON_LIST_SEED", "no"),
            ("RUST_LOG", "debug"),
        ]));

        assert_eq!(config.view.container_id, "people");
        assert_eq!(config.view.remove_action_class, "drop");
        assert_eq!(config.view.fields, vec![Field::Name, Field::RemoveAction]);
        assert_eq!(config.format, OutputFormat::Json);
        assert!(!config.seed);
        assert_eq!(config.log_level, "debug");
    }

    #[test]
    fn test_invalid_values_fall_back() {
        let config = Config::from_lookup(lookup_from(&[
            ("PERSON_LIST_FIELDS", "name,age"),
            ("PERSON_LIST_FORMAT", "xml"),
            ("PERSON_LIST_SEED", "maybe"),
        ]));

        assert_eq!(config.view.fields, Field::defaults());
        assert_eq!(config.format, OutputFormat::Html);
        assert!(config.seed);
    }
}
