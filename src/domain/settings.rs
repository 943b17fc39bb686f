// Domain layer: named, typed and bounded gameplay parameters.

use std::collections::{BTreeMap, HashMap};
use std::fmt;

use super::physics::SpeedLimits;
use super::ship::{PropulsionClass, SizeClass};

/// Version tag written into the settings document; a mismatch resets to defaults.
pub const CONFIG_VERSION: &str = "2.0.0";

/// Persisted form of the settings: a version tag plus raw name/value pairs.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct StoredSettings {
    pub config_version: String,
    pub values: BTreeMap<String, String>,
}

/// Size class crossed with propulsion class; each has its own flight profile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FlightClass {
    SmallIon,
    SmallGas,
    LargeIon,
    LargeGas,
}

impl FlightClass {
    pub const ALL: [FlightClass; 4] = [
        FlightClass::SmallIon,
        FlightClass::SmallGas,
        FlightClass::LargeIon,
        FlightClass::LargeGas,
    ];

    pub fn new(size: SizeClass, propulsion: PropulsionClass) -> Self {
        match (size, propulsion) {
            (SizeClass::Small, PropulsionClass::IonAtmospheric) => FlightClass::SmallIon,
            (SizeClass::Small, PropulsionClass::GasBased) => FlightClass::SmallGas,
            (SizeClass::Large, PropulsionClass::IonAtmospheric) => FlightClass::LargeIon,
            (SizeClass::Large, PropulsionClass::GasBased) => FlightClass::LargeGas,
        }
    }

    // Setting name prefix; "Jet" marks gas-based propulsion.
    pub fn prefix(self) -> &'static str {
        match self {
            FlightClass::SmallIon => "smallGrid",
            FlightClass::SmallGas => "smallGridJet",
            FlightClass::LargeIon => "largeGrid",
            FlightClass::LargeGas => "largeGridJet",
        }
    }

    fn index(self) -> usize {
        match self {
            FlightClass::SmallIon => 0,
            FlightClass::SmallGas => 1,
            FlightClass::LargeIon => 2,
            FlightClass::LargeGas => 3,
        }
    }

    fn default_profile(self) -> FlightProfile {
        match self {
            FlightClass::SmallIon => FlightProfile {
                drag_coefficient: 0.047,
                base_weight: 15_000.0,
                base_twr: 1.0,
                minimum_twr: 0.3,
                maximum_twr: 2.5,
                speed_factor: 1.0,
                weight_factor: 0.15,
                base_turn_rate: 30.0,
                base_turn_rate_speed: 100.0,
                minimum_turn_rate: 10.0,
                maximum_turn_rate: 40.0,
                turn_rate_speed_factor: 0.5,
                turn_rate_weight_factor: 0.25,
            },
            FlightClass::SmallGas => FlightProfile {
                drag_coefficient: 0.047,
                base_weight: 15_000.0,
                base_twr: 1.4,
                minimum_twr: 0.4,
                maximum_twr: 3.0,
                speed_factor: 2.0,
                weight_factor: 0.12,
                base_turn_rate: 35.0,
                base_turn_rate_speed: 150.0,
                minimum_turn_rate: 12.0,
                maximum_turn_rate: 45.0,
                turn_rate_speed_factor: 0.5,
                turn_rate_weight_factor: 0.2,
            },
            FlightClass::LargeIon => FlightProfile {
                drag_coefficient: 0.105,
                base_weight: 500_000.0,
                base_twr: 0.5,
                minimum_twr: 0.1,
                maximum_twr: 1.5,
                speed_factor: 2.5,
                weight_factor: 0.1,
                base_turn_rate: 12.0,
                base_turn_rate_speed: 60.0,
                minimum_turn_rate: 3.0,
                maximum_turn_rate: 20.0,
                turn_rate_speed_factor: 0.4,
                turn_rate_weight_factor: 0.3,
            },
            FlightClass::LargeGas => FlightProfile {
                drag_coefficient: 0.105,
                base_weight: 500_000.0,
                base_twr: 0.8,
                minimum_twr: 0.15,
                maximum_twr: 2.0,
                speed_factor: 3.0,
                weight_factor: 0.1,
                base_turn_rate: 15.0,
                base_turn_rate_speed: 80.0,
                minimum_turn_rate: 4.0,
                maximum_turn_rate: 25.0,
                turn_rate_speed_factor: 0.4,
                turn_rate_weight_factor: 0.3,
            },
        }
    }
}

/// Coefficients for one flight class. Turn rates are in degrees per second.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FlightProfile {
    pub drag_coefficient: f32,
    pub base_weight: f32,
    pub base_twr: f32,
    pub minimum_twr: f32,
    pub maximum_twr: f32,
    pub speed_factor: f32,
    pub weight_factor: f32,
    pub base_turn_rate: f32,
    pub base_turn_rate_speed: f32,
    pub minimum_turn_rate: f32,
    pub maximum_turn_rate: f32,
    pub turn_rate_speed_factor: f32,
    pub turn_rate_weight_factor: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProfileField {
    DragCoefficient,
    BaseWeight,
    BaseTwr,
    MinimumTwr,
    MaximumTwr,
    SpeedFactor,
    WeightFactor,
    BaseTurnRate,
    BaseTurnRateSpeed,
    MinimumTurnRate,
    MaximumTurnRate,
    TurnRateSpeedFactor,
    TurnRateWeightFactor,
}

impl ProfileField {
    pub const ALL: [ProfileField; 13] = [
        ProfileField::DragCoefficient,
        ProfileField::BaseWeight,
        ProfileField::BaseTwr,
        ProfileField::MinimumTwr,
        ProfileField::MaximumTwr,
        ProfileField::SpeedFactor,
        ProfileField::WeightFactor,
        ProfileField::BaseTurnRate,
        ProfileField::BaseTurnRateSpeed,
        ProfileField::MinimumTurnRate,
        ProfileField::MaximumTurnRate,
        ProfileField::TurnRateSpeedFactor,
        ProfileField::TurnRateWeightFactor,
    ];

    pub fn suffix(self) -> &'static str {
        match self {
            ProfileField::DragCoefficient => "DragCoefficient",
            ProfileField::BaseWeight => "BaseWeight",
            ProfileField::BaseTwr => "BaseTwr",
            ProfileField::MinimumTwr => "MinimumTwr",
            ProfileField::MaximumTwr => "MaximumTwr",
            ProfileField::SpeedFactor => "SpeedFactor",
            ProfileField::WeightFactor => "WeightFactor",
            ProfileField::BaseTurnRate => "BaseTurnRate",
            ProfileField::BaseTurnRateSpeed => "BaseTurnRateSpeed",
            ProfileField::MinimumTurnRate => "MinimumTurnRate",
            ProfileField::MaximumTurnRate => "MaximumTurnRate",
            ProfileField::TurnRateSpeedFactor => "TurnRateSpeedFactor",
            ProfileField::TurnRateWeightFactor => "TurnRateWeightFactor",
        }
    }

    fn limits(self) -> SettingLimits {
        let (min, max) = match self {
            ProfileField::DragCoefficient => (0.001, 10.0),
            ProfileField::BaseWeight => (100.0, 100_000_000.0),
            ProfileField::BaseTwr | ProfileField::MinimumTwr | ProfileField::MaximumTwr => {
                (0.01, 50.0)
            }
            ProfileField::SpeedFactor => (0.01, 100.0),
            ProfileField::WeightFactor => (0.0, 1.0),
            ProfileField::BaseTurnRate | ProfileField::MaximumTurnRate => (1.0, 360.0),
            ProfileField::MinimumTurnRate => (0.0, 360.0),
            ProfileField::BaseTurnRateSpeed => (1.0, 600.0),
            ProfileField::TurnRateSpeedFactor | ProfileField::TurnRateWeightFactor => (0.0, 5.0),
        };
        SettingLimits::Float { min, max }
    }

    fn get(self, profile: &FlightProfile) -> f32 {
        match self {
            ProfileField::DragCoefficient => profile.drag_coefficient,
            ProfileField::BaseWeight => profile.base_weight,
            ProfileField::BaseTwr => profile.base_twr,
            ProfileField::MinimumTwr => profile.minimum_twr,
            ProfileField::MaximumTwr => profile.maximum_twr,
            ProfileField::SpeedFactor => profile.speed_factor,
            ProfileField::WeightFactor => profile.weight_factor,
            ProfileField::BaseTurnRate => profile.base_turn_rate,
            ProfileField::BaseTurnRateSpeed => profile.base_turn_rate_speed,
            ProfileField::MinimumTurnRate => profile.minimum_turn_rate,
            ProfileField::MaximumTurnRate => profile.maximum_turn_rate,
            ProfileField::TurnRateSpeedFactor => profile.turn_rate_speed_factor,
            ProfileField::TurnRateWeightFactor => profile.turn_rate_weight_factor,
        }
    }

    fn slot(self, profile: &mut FlightProfile) -> &mut f32 {
        match self {
            ProfileField::DragCoefficient => &mut profile.drag_coefficient,
            ProfileField::BaseWeight => &mut profile.base_weight,
            ProfileField::BaseTwr => &mut profile.base_twr,
            ProfileField::MinimumTwr => &mut profile.minimum_twr,
            ProfileField::MaximumTwr => &mut profile.maximum_twr,
            ProfileField::SpeedFactor => &mut profile.speed_factor,
            ProfileField::WeightFactor => &mut profile.weight_factor,
            ProfileField::BaseTurnRate => &mut profile.base_turn_rate,
            ProfileField::BaseTurnRateSpeed => &mut profile.base_turn_rate_speed,
            ProfileField::MinimumTurnRate => &mut profile.minimum_turn_rate,
            ProfileField::MaximumTurnRate => &mut profile.maximum_turn_rate,
            ProfileField::TurnRateSpeedFactor => &mut profile.turn_rate_speed_factor,
            ProfileField::TurnRateWeightFactor => &mut profile.turn_rate_weight_factor,
        }
    }
}

/// Identifies one parameter of the catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SettingKey {
    AllowSuperCruise,
    GlobalSmallGridMaxSpeed,
    GlobalLargeGridMaxSpeed,
    SmallGridMaxSpeed,
    LargeGridMaxSpeed,
    MinimumGridVolume,
    SmallGridBoostSpeedMultiplier,
    LargeGridBoostSpeedMultiplier,
    LargeGridBoostTwr,
    InterdictionDuration,
    CombatZoneRadius,
    Profile(FlightClass, ProfileField),
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SettingValue {
    Bool(bool),
    Int(i32),
    Float(f32),
}

impl fmt::Display for SettingValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SettingValue::Bool(value) => write!(f, "{value}"),
            SettingValue::Int(value) => write!(f, "{value}"),
            // Shortest representation that parses back to the same f32.
            SettingValue::Float(value) => write!(f, "{value}"),
        }
    }
}

/// Kind and inclusive bounds of a parameter.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SettingLimits {
    Bool,
    Int { min: i32, max: i32 },
    Float { min: f32, max: f32 },
}

impl SettingLimits {
    // Parses and validates a raw value. `None` when it has the wrong kind or is out of bounds.
    pub fn parse(&self, raw: &str) -> Option<SettingValue> {
        let raw = raw.trim();
        match *self {
            SettingLimits::Bool => {
                if raw.eq_ignore_ascii_case("true") {
                    Some(SettingValue::Bool(true))
                } else if raw.eq_ignore_ascii_case("false") {
                    Some(SettingValue::Bool(false))
                } else {
                    None
                }
            }
            SettingLimits::Int { min, max } => raw
                .parse::<i32>()
                .ok()
                .filter(|value| (min..=max).contains(value))
                .map(SettingValue::Int),
            SettingLimits::Float { min, max } => raw
                .parse::<f32>()
                .ok()
                .filter(|value| value.is_finite() && (min..=max).contains(value))
                .map(SettingValue::Float),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SettingSpec {
    pub name: String,
    pub key: SettingKey,
    pub limits: SettingLimits,
    pub default: SettingValue,
}

/// Ordered list of every parameter with its name, bounds and default.
#[derive(Debug, Clone)]
pub struct SettingsCatalog {
    specs: Vec<SettingSpec>,
    by_name: HashMap<String, usize>,
}

impl SettingsCatalog {
    pub fn standard() -> Self {
        let globals = [
            ("allowSuperCruise", SettingKey::AllowSuperCruise, SettingLimits::Bool),
            (
                "globalSmallGridMaxSpeed",
                SettingKey::GlobalSmallGridMaxSpeed,
                SettingLimits::Float { min: 5.0, max: 600.0 },
            ),
            (
                "globalLargeGridMaxSpeed",
                SettingKey::GlobalLargeGridMaxSpeed,
                SettingLimits::Float { min: 5.0, max: 600.0 },
            ),
            (
                "smallGridMaxSpeed",
                SettingKey::SmallGridMaxSpeed,
                SettingLimits::Float { min: 5.0, max: 600.0 },
            ),
            (
                "largeGridMaxSpeed",
                SettingKey::LargeGridMaxSpeed,
                SettingLimits::Float { min: 5.0, max: 600.0 },
            ),
            (
                "minimumGridVolume",
                SettingKey::MinimumGridVolume,
                SettingLimits::Float {
                    min: 0.125,
                    max: 10_000_000_000.0,
                },
            ),
            (
                "smallGridBoostSpeedMultiplier",
                SettingKey::SmallGridBoostSpeedMultiplier,
                SettingLimits::Float { min: 1.0, max: 20.0 },
            ),
            (
                "largeGridBoostSpeedMultiplier",
                SettingKey::LargeGridBoostSpeedMultiplier,
                SettingLimits::Float { min: 1.0, max: 20.0 },
            ),
            (
                "largeGridBoostTwr",
                SettingKey::LargeGridBoostTwr,
                SettingLimits::Float { min: 1.0, max: 50.0 },
            ),
            (
                "interdictionDuration",
                SettingKey::InterdictionDuration,
                SettingLimits::Int { min: 0, max: 300 },
            ),
            (
                "combatZoneRadius",
                SettingKey::CombatZoneRadius,
                SettingLimits::Float {
                    min: 500.0,
                    max: 1_000_000.0,
                },
            ),
        ];

        let defaults = Settings::default();
        let mut specs: Vec<SettingSpec> = globals
            .into_iter()
            .map(|(name, key, limits)| SettingSpec {
                name: name.to_string(),
                key,
                limits,
                default: defaults.get(key),
            })
            .collect();

        for class in FlightClass::ALL {
            for field in ProfileField::ALL {
                let key = SettingKey::Profile(class, field);
                specs.push(SettingSpec {
                    name: format!("{}{}", class.prefix(), field.suffix()),
                    key,
                    limits: field.limits(),
                    default: defaults.get(key),
                });
            }
        }

        let by_name = specs
            .iter()
            .enumerate()
            .map(|(index, spec)| (spec.name.clone(), index))
            .collect();
        Self { specs, by_name }
    }

    pub fn find(&self, name: &str) -> Option<&SettingSpec> {
        self.by_name.get(name).map(|index| &self.specs[*index])
    }

    pub fn iter(&self) -> impl Iterator<Item = &SettingSpec> {
        self.specs.iter()
    }

    pub fn names(&self) -> Vec<String> {
        self.specs.iter().map(|spec| spec.name.clone()).collect()
    }

    pub fn len(&self) -> usize {
        self.specs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.specs.is_empty()
    }
}

/// Current values of every gameplay parameter.
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub allow_super_cruise: bool,
    pub global_small_grid_max_speed: f32,
    pub global_large_grid_max_speed: f32,
    pub small_grid_max_speed: f32,
    pub large_grid_max_speed: f32,
    pub minimum_grid_volume: f32,
    pub small_grid_boost_speed_multiplier: f32,
    pub large_grid_boost_speed_multiplier: f32,
    pub large_grid_boost_twr: f32,
    // Seconds a ship stays in combat after the last qualifying hit.
    pub interdiction_duration: i32,
    pub combat_zone_radius: f32,
    profiles: [FlightProfile; 4],
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            allow_super_cruise: true,
            global_small_grid_max_speed: 500.0,
            global_large_grid_max_speed: 500.0,
            small_grid_max_speed: 250.0,
            large_grid_max_speed: 150.0,
            minimum_grid_volume: 1.5 * 1.5 * 10.0,
            small_grid_boost_speed_multiplier: 1.45,
            large_grid_boost_speed_multiplier: 6.5,
            large_grid_boost_twr: 3.5,
            interdiction_duration: 120,
            combat_zone_radius: 15_000.0,
            profiles: FlightClass::ALL.map(FlightClass::default_profile),
        }
    }
}

impl Settings {
    pub fn profile(&self, class: FlightClass) -> &FlightProfile {
        &self.profiles[class.index()]
    }

    pub fn profile_mut(&mut self, class: FlightClass) -> &mut FlightProfile {
        &mut self.profiles[class.index()]
    }

    pub fn get(&self, key: SettingKey) -> SettingValue {
        match key {
            SettingKey::AllowSuperCruise => SettingValue::Bool(self.allow_super_cruise),
            SettingKey::GlobalSmallGridMaxSpeed => SettingValue::Float(self.global_small_grid_max_speed),
            SettingKey::GlobalLargeGridMaxSpeed => SettingValue::Float(self.global_large_grid_max_speed),
            SettingKey::SmallGridMaxSpeed => SettingValue::Float(self.small_grid_max_speed),
            SettingKey::LargeGridMaxSpeed => SettingValue::Float(self.large_grid_max_speed),
            SettingKey::MinimumGridVolume => SettingValue::Float(self.minimum_grid_volume),
            SettingKey::SmallGridBoostSpeedMultiplier => {
                SettingValue::Float(self.small_grid_boost_speed_multiplier)
            }
            SettingKey::LargeGridBoostSpeedMultiplier => {
                SettingValue::Float(self.large_grid_boost_speed_multiplier)
            }
            SettingKey::LargeGridBoostTwr => SettingValue::Float(self.large_grid_boost_twr),
            SettingKey::InterdictionDuration => SettingValue::Int(self.interdiction_duration),
            SettingKey::CombatZoneRadius => SettingValue::Float(self.combat_zone_radius),
            SettingKey::Profile(class, field) => SettingValue::Float(field.get(self.profile(class))),
        }
    }

    // Stores a value of the matching kind. Returns false on a kind mismatch.
    pub fn set(&mut self, key: SettingKey, value: SettingValue) -> bool {
        match (key, value) {
            (SettingKey::AllowSuperCruise, SettingValue::Bool(value)) => {
                self.allow_super_cruise = value
            }
            (SettingKey::InterdictionDuration, SettingValue::Int(value)) => {
                self.interdiction_duration = value
            }
            (SettingKey::Profile(class, field), SettingValue::Float(value)) => {
                *field.slot(self.profile_mut(class)) = value
            }
            (key, SettingValue::Float(value)) => match self.float_slot(key) {
                Some(slot) => *slot = value,
                None => return false,
            },
            _ => return false,
        }
        true
    }

    fn float_slot(&mut self, key: SettingKey) -> Option<&mut f32> {
        let slot = match key {
            SettingKey::GlobalSmallGridMaxSpeed => &mut self.global_small_grid_max_speed,
            SettingKey::GlobalLargeGridMaxSpeed => &mut self.global_large_grid_max_speed,
            SettingKey::SmallGridMaxSpeed => &mut self.small_grid_max_speed,
            SettingKey::LargeGridMaxSpeed => &mut self.large_grid_max_speed,
            SettingKey::MinimumGridVolume => &mut self.minimum_grid_volume,
            SettingKey::SmallGridBoostSpeedMultiplier => &mut self.small_grid_boost_speed_multiplier,
            SettingKey::LargeGridBoostSpeedMultiplier => &mut self.large_grid_boost_speed_multiplier,
            SettingKey::LargeGridBoostTwr => &mut self.large_grid_boost_twr,
            SettingKey::CombatZoneRadius => &mut self.combat_zone_radius,
            SettingKey::AllowSuperCruise
            | SettingKey::InterdictionDuration
            | SettingKey::Profile(..) => return None,
        };
        Some(slot)
    }

    // Absolute speed ceiling for the size class.
    pub fn max_speed(&self, size: SizeClass) -> f32 {
        match size {
            SizeClass::Small => self.small_grid_max_speed,
            SizeClass::Large => self.large_grid_max_speed,
        }
    }

    pub fn boost_speed_multiplier(&self, size: SizeClass) -> f32 {
        match size {
            SizeClass::Small => self.small_grid_boost_speed_multiplier,
            SizeClass::Large => self.large_grid_boost_speed_multiplier,
        }
    }

    pub fn interdiction_ticks(&self, ticks_per_second: u32) -> u32 {
        u32::try_from(self.interdiction_duration)
            .unwrap_or(0)
            .saturating_mul(ticks_per_second)
    }

    // Engine-wide limits installed while the session runs.
    pub fn world_speed_limits(&self) -> SpeedLimits {
        SpeedLimits {
            small: self.global_small_grid_max_speed,
            large: self.global_large_grid_max_speed,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn when_catalog_is_built_then_names_are_unique_and_cover_every_profile() {
        let catalog = SettingsCatalog::standard();

        assert_eq!(catalog.len(), 11 + 4 * 13);
        assert_eq!(catalog.by_name.len(), catalog.len());
        assert!(catalog.find("smallGridJetDragCoefficient").is_some());
        assert!(catalog.find("largeGridTurnRateWeightFactor").is_some());
        assert!(catalog.find("nope").is_none());
    }

    #[test]
    fn when_default_is_rendered_then_it_parses_back_to_the_same_value() {
        let catalog = SettingsCatalog::standard();

        for spec in catalog.iter() {
            let rendered = spec.default.to_string();
            assert_eq!(spec.limits.parse(&rendered), Some(spec.default), "{}", spec.name);
        }
    }

    #[test]
    fn when_value_is_out_of_bounds_or_wrong_kind_then_parse_rejects_it() {
        let radius = SettingLimits::Float {
            min: 500.0,
            max: 1_000_000.0,
        };
        let duration = SettingLimits::Int { min: 0, max: 300 };

        assert_eq!(radius.parse("499.9"), None);
        assert_eq!(radius.parse("NaN"), None);
        assert_eq!(radius.parse("abc"), None);
        assert_eq!(radius.parse(" 750 "), Some(SettingValue::Float(750.0)));
        assert_eq!(duration.parse("301"), None);
        assert_eq!(duration.parse("1.5"), None);
        assert_eq!(SettingLimits::Bool.parse("TRUE"), Some(SettingValue::Bool(true)));
        assert_eq!(SettingLimits::Bool.parse("yes"), None);
    }

    #[test]
    fn when_value_kind_does_not_match_key_then_set_is_refused() {
        let mut settings = Settings::default();

        assert!(!settings.set(SettingKey::AllowSuperCruise, SettingValue::Float(1.0)));
        assert!(!settings.set(SettingKey::SmallGridMaxSpeed, SettingValue::Int(10)));
        assert!(settings.set(SettingKey::SmallGridMaxSpeed, SettingValue::Float(10.0)));
        assert_eq!(settings.small_grid_max_speed, 10.0);
    }

    #[test]
    fn when_profile_field_is_set_then_only_that_class_changes() {
        let mut settings = Settings::default();
        let key = SettingKey::Profile(FlightClass::LargeGas, ProfileField::BaseTwr);

        assert!(settings.set(key, SettingValue::Float(1.25)));

        assert_eq!(settings.profile(FlightClass::LargeGas).base_twr, 1.25);
        assert_eq!(settings.profile(FlightClass::LargeIon).base_twr, 0.5);
    }

    #[test]
    fn when_duration_is_converted_then_ticks_scale_with_rate() {
        let settings = Settings::default();

        assert_eq!(settings.interdiction_ticks(60), 120 * 60);
    }
}
