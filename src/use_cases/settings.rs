// Flat key/value settings surface and the load/save policy around it.

use std::sync::{PoisonError, RwLock};

use tracing::{debug, info, warn};

use crate::domain::errors::SettingsError;
use crate::domain::notifications::MessageColor;
use crate::domain::ports::{NotificationSink, SettingsRepository};
use crate::domain::settings::{CONFIG_VERSION, Settings, SettingsCatalog, StoredSettings};

pub const SETTINGS_RESET_NOTICE: &str =
    "Error reading Combat Interdiction settings, settings have been reset.";

/// What happened while loading persisted settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadOutcome {
    // Stored values were applied; `rejected` lists names that kept their default.
    Loaded { applied: usize, rejected: Vec<String> },
    // Nothing was stored yet; defaults were written.
    Created,
    // The stored version differs; defaults were written over it.
    VersionReset { found: String },
    // The document could not be read; defaults are in effect.
    Corrupt,
}

/// Validated access to the gameplay settings.
#[derive(Debug)]
pub struct SettingsService {
    catalog: SettingsCatalog,
    values: RwLock<Settings>,
}

impl Default for SettingsService {
    fn default() -> Self {
        Self::new()
    }
}

impl SettingsService {
    pub fn new() -> Self {
        Self {
            catalog: SettingsCatalog::standard(),
            values: RwLock::new(Settings::default()),
        }
    }

    pub fn catalog(&self) -> &SettingsCatalog {
        &self.catalog
    }

    pub fn list_setting_names(&self) -> Vec<String> {
        self.catalog.names()
    }

    pub fn get_setting(&self, name: &str) -> Option<String> {
        let spec = self.catalog.find(name)?;
        Some(self.snapshot().get(spec.key).to_string())
    }

    // Validates and stores a value. On rejection the current value is kept.
    pub fn update_setting(&self, name: &str, value: &str) -> bool {
        let Some(spec) = self.catalog.find(name) else {
            debug!(setting = name, "unknown setting");
            return false;
        };
        let Some(parsed) = spec.limits.parse(value) else {
            warn!(setting = name, value, limits = ?spec.limits, "setting value rejected");
            return false;
        };

        // A panicked writer leaves whole values behind, never a torn one.
        let mut values = self.values.write().unwrap_or_else(PoisonError::into_inner);
        let stored = values.set(spec.key, parsed);
        if stored {
            debug!(setting = name, value = %parsed, "setting updated");
        }
        stored
    }

    pub fn reset_to_defaults(&self) {
        *self.values.write().unwrap_or_else(PoisonError::into_inner) = Settings::default();
    }

    // Copy of the current values, taken once per pass so a pass sees one consistent set.
    pub fn snapshot(&self) -> Settings {
        self.values
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn to_stored(&self) -> StoredSettings {
        let values = self.snapshot();
        StoredSettings {
            config_version: CONFIG_VERSION.to_string(),
            values: self
                .catalog
                .iter()
                .map(|spec| (spec.name.clone(), values.get(spec.key).to_string()))
                .collect(),
        }
    }

    // Loads persisted settings, falling back to defaults on any problem.
    pub fn load(
        &self,
        repository: &dyn SettingsRepository,
        sink: &dyn NotificationSink,
    ) -> LoadOutcome {
        self.reset_to_defaults();

        let stored = match repository.load() {
            Ok(Some(stored)) => stored,
            Ok(None) => {
                info!("no stored settings, writing defaults");
                self.save_or_log(repository);
                return LoadOutcome::Created;
            }
            Err(e) => {
                warn!(error = %e, "settings could not be read, using defaults");
                sink.notify_local(SETTINGS_RESET_NOTICE, MessageColor::White);
                return LoadOutcome::Corrupt;
            }
        };

        if stored.config_version != CONFIG_VERSION {
            info!(
                found = %stored.config_version,
                expected = CONFIG_VERSION,
                "settings version changed, resetting to defaults"
            );
            self.save_or_log(repository);
            return LoadOutcome::VersionReset {
                found: stored.config_version,
            };
        }

        let mut applied = 0;
        let mut rejected = Vec::new();
        for (name, value) in &stored.values {
            if self.catalog.find(name).is_none() {
                debug!(setting = %name, "ignoring unknown stored setting");
                continue;
            }
            if self.update_setting(name, value) {
                applied += 1;
            } else {
                rejected.push(name.clone());
            }
        }
        info!(applied, rejected = rejected.len(), "settings loaded");
        LoadOutcome::Loaded { applied, rejected }
    }

    pub fn save(&self, repository: &dyn SettingsRepository) -> Result<(), SettingsError> {
        repository.save(&self.to_stored())
    }

    fn save_or_log(&self, repository: &dyn SettingsRepository) {
        if let Err(e) = self.save(repository) {
            warn!(error = %e, "failed to save settings");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interface_adapters::memory_host::{MemoryHost, MemorySettingsRepository};

    #[test]
    fn when_default_is_written_back_then_get_returns_the_default() {
        let service = SettingsService::new();

        for spec in service.catalog().iter() {
            let rendered = spec.default.to_string();
            assert!(service.update_setting(&spec.name, &rendered), "{}", spec.name);
            assert_eq!(service.get_setting(&spec.name), Some(rendered));
        }
    }

    #[test]
    fn when_value_is_rejected_then_previous_value_is_kept() {
        let service = SettingsService::new();
        assert!(service.update_setting("combatZoneRadius", "20000"));

        assert!(!service.update_setting("combatZoneRadius", "10"));
        assert!(!service.update_setting("combatZoneRadius", "far"));
        assert!(!service.update_setting("noSuchSetting", "1"));

        assert_eq!(service.get_setting("combatZoneRadius").as_deref(), Some("20000"));
    }

    #[test]
    fn when_reset_then_defaults_are_restored() {
        let service = SettingsService::new();
        service.update_setting("allowSuperCruise", "false");

        service.reset_to_defaults();

        assert_eq!(service.get_setting("allowSuperCruise").as_deref(), Some("true"));
    }

    #[test]
    fn when_nothing_is_stored_then_defaults_are_saved() {
        let repository = MemorySettingsRepository::default();
        let host = MemoryHost::new();
        let service = SettingsService::new();

        let outcome = service.load(&repository, &host);

        assert_eq!(outcome, LoadOutcome::Created);
        let saved = repository.stored().expect("defaults should be saved");
        assert_eq!(saved.config_version, CONFIG_VERSION);
        assert_eq!(saved.values.len(), service.catalog().len());
    }

    #[test]
    fn when_version_differs_then_values_are_ignored_and_defaults_saved() {
        let mut stored = SettingsService::new().to_stored();
        stored.config_version = "1.0.3".to_string();
        stored
            .values
            .insert("smallGridMaxSpeed".to_string(), "100".to_string());
        let repository = MemorySettingsRepository::with_stored(stored);
        let service = SettingsService::new();

        let outcome = service.load(&repository, &MemoryHost::new());

        assert!(matches!(outcome, LoadOutcome::VersionReset { .. }));
        assert_eq!(service.snapshot().small_grid_max_speed, 250.0);
        let saved = repository.stored().expect("saved");
        assert_eq!(saved.config_version, CONFIG_VERSION);
    }

    #[test]
    fn when_stored_values_are_partly_invalid_then_valid_ones_apply() {
        let mut stored = StoredSettings {
            config_version: CONFIG_VERSION.to_string(),
            ..StoredSettings::default()
        };
        stored.values.insert("smallGridMaxSpeed".into(), "300".into());
        stored.values.insert("largeGridMaxSpeed".into(), "9000".into());
        stored.values.insert("retiredSetting".into(), "1".into());
        let repository = MemorySettingsRepository::with_stored(stored);
        let service = SettingsService::new();

        let outcome = service.load(&repository, &MemoryHost::new());

        assert_eq!(
            outcome,
            LoadOutcome::Loaded {
                applied: 1,
                rejected: vec!["largeGridMaxSpeed".to_string()],
            }
        );
        let values = service.snapshot();
        assert_eq!(values.small_grid_max_speed, 300.0);
        assert_eq!(values.large_grid_max_speed, 150.0);
    }

    #[test]
    fn when_document_is_corrupt_then_player_is_notified_once() {
        let repository = MemorySettingsRepository::default().with_load_failure();
        let host = MemoryHost::new();
        let service = SettingsService::new();

        let outcome = service.load(&repository, &host);

        assert_eq!(outcome, LoadOutcome::Corrupt);
        assert_eq!(host.local_notices(), vec![SETTINGS_RESET_NOTICE.to_string()]);
    }
}
