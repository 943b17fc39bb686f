// Versioned TOML settings document.
//
//   configVersion = "2.0.0"
//
//   [settings]
//   allowSuperCruise = "true"
//   combatZoneRadius = "15000"

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::domain::errors::SettingsError;
use crate::domain::ports::{SettingsRepository, SettingsStore};
use crate::domain::settings::StoredSettings;

#[derive(Serialize)]
struct DocumentOut<'a> {
    #[serde(rename = "configVersion")]
    config_version: &'a str,
    settings: &'a BTreeMap<String, String>,
}

#[derive(Deserialize)]
struct DocumentIn {
    #[serde(rename = "configVersion")]
    config_version: String,
    #[serde(default)]
    settings: BTreeMap<String, toml::Value>,
}

pub fn encode_settings(settings: &StoredSettings) -> Result<String, SettingsError> {
    let document = DocumentOut {
        config_version: &settings.config_version,
        settings: &settings.values,
    };
    toml::to_string_pretty(&document).map_err(|e| SettingsError::Encode(e.to_string()))
}

/// Decodes a document. Hand-edited scalars are accepted and kept as text;
/// arrays and tables under `[settings]` are dropped.
pub fn decode_settings(text: &str) -> Result<StoredSettings, SettingsError> {
    let document: DocumentIn =
        toml::from_str(text).map_err(|e| SettingsError::Parse(e.to_string()))?;

    let mut values = BTreeMap::new();
    for (name, value) in document.settings {
        let raw = match value {
            toml::Value::String(text) => text,
            toml::Value::Integer(number) => number.to_string(),
            toml::Value::Float(number) => number.to_string(),
            toml::Value::Boolean(flag) => flag.to_string(),
            other => {
                warn!(setting = %name, kind = other.type_str(), "ignoring non-scalar setting");
                continue;
            }
        };
        values.insert(name, raw);
    }

    Ok(StoredSettings {
        config_version: document.config_version,
        values,
    })
}

/// Settings repository storing a TOML document in a raw store.
pub struct TomlSettingsRepository<S> {
    store: S,
}

impl<S: SettingsStore> TomlSettingsRepository<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }
}

impl<S: SettingsStore> SettingsRepository for TomlSettingsRepository<S> {
    fn load(&self) -> Result<Option<StoredSettings>, SettingsError> {
        match self.store.load()? {
            Some(text) => decode_settings(&text).map(Some),
            None => Ok(None),
        }
    }

    fn save(&self, settings: &StoredSettings) -> Result<(), SettingsError> {
        let text = encode_settings(settings)?;
        self.store.save(&text)
    }
}
