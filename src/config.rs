//! Runtime gameplay configuration loaded from `assets/field.toml`.
//!
//! [`GameConfig`] is a Bevy [`Resource`] that mirrors every constant in
//! [`crate::constants`].  At startup, [`load_game_config`] reads
//! `assets/field.toml` and overlays any values present in the file on top of
//! the active variant preset.  Missing keys keep the preset value, so a
//! minimal TOML can override just the constants you care about.
//!
//! ## Variants
//!
//! | Preset            | Steering          | Pickups | Magic drain | Target palette |
//! |-------------------|-------------------|---------|-------------|----------------|
//! | `coal_field`      | pointer + keys    | 100     | on          | green only     |
//! | `asteroid_field`  | keys only         | 0       | off         | five colours   |
//!
//! A `variant = "asteroid_field"` line in the file switches the preset before
//! the remaining keys are applied.
//!
//! ## Tuning workflow
//!
//! 1. Edit `assets/field.toml`.
//! 2. Restart the game — no recompilation required.
//!
//! Keep `src/constants.rs` in sync: it remains the **authoritative default**
//! source used by `GameConfig::default()`.

use crate::constants::*;
use crate::error::ConfigError;
use crate::input::SteeringMode;
use bevy::prelude::*;
use serde::{Deserialize, Serialize};

/// Which flavour of the field game to run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldVariant {
    /// Coal field with the lost present and a stardust-fed magic meter.
    #[default]
    #[serde(alias = "coal")]
    CoalField,
    /// Plain asteroid field: keyboard turning, free scans, no pickups.
    #[serde(alias = "asteroid")]
    AsteroidField,
}

impl FieldVariant {
    /// Parse the short names accepted by the `COALFIELD_VARIANT` environment variable.
    pub fn from_name(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "coal" | "coal_field" => Some(FieldVariant::CoalField),
            "asteroid" | "asteroids" | "asteroid_field" => Some(FieldVariant::AsteroidField),
            _ => None,
        }
    }
}

/// A colour the target may be painted, with the word used for it in the clue.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NamedColor {
    pub name: String,
    /// `0xRRGGBB`
    pub hex: u32,
}

impl NamedColor {
    pub fn new(name: &str, hex: u32) -> Self {
        Self {
            name: name.to_string(),
            hex,
        }
    }

    pub fn color(&self) -> Color {
        hex_color(self.hex)
    }
}

/// Convert a `0xRRGGBB` integer into an sRGB [`Color`].
pub fn hex_color(hex: u32) -> Color {
    Color::srgb_u8(
        ((hex >> 16) & 0xff) as u8,
        ((hex >> 8) & 0xff) as u8,
        (hex & 0xff) as u8,
    )
}

/// Runtime-tunable gameplay configuration.
///
/// All fields default to the corresponding compile-time constant from
/// `src/constants.rs`.  Override any subset by setting the value in
/// `assets/field.toml`.
#[derive(Resource, Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    pub variant: FieldVariant,
    pub steering: SteeringMode,

    // ── Field Layout ─────────────────────────────────────────────────────────
    pub decoy_count: usize,
    pub pickup_count: usize,
    pub spawn_radius: f32,
    pub spawn_inner_radius: f32,
    pub player_start_z: f32,
    pub decoy_scale_min: f32,
    pub decoy_scale_max: f32,
    pub decoy_saturation: f32,
    pub decoy_lightness: f32,
    pub target_scale_min: f32,
    pub target_scale_max: f32,
    pub size_small_below: f32,
    pub size_medium_below: f32,

    // ── Steering ─────────────────────────────────────────────────────────────
    pub yaw_speed: f32,
    pub pitch_speed: f32,
    pub steering_lerp: f32,
    pub discrete_turn_rate: f32,
    pub turn_epsilon: f32,
    pub movement_speed: f32,

    // ── Magic Economy ────────────────────────────────────────────────────────
    pub max_magic: f32,
    pub magic_depletion_rate: f32,
    pub scan_cost: f32,
    pub pickup_replenish: f32,

    // ── Collision ────────────────────────────────────────────────────────────
    pub collection_threshold: f32,
    pub collision_threshold: f32,
    pub collision_cooldown: f32,
    pub collision_penalty: f32,
    pub knockback_distance: f32,
    pub decoy_grid_cell_size: f32,

    // ── Feedback ─────────────────────────────────────────────────────────────
    pub flash_duration: f32,
    pub flash_color: u32,
    pub status_message_duration: f32,
    pub glow_base: f32,
    pub glow_spike_factor: f32,
    pub glow_spike_duration: f32,
    pub controls_hint_duration: f32,

    // ── Target ───────────────────────────────────────────────────────────────
    pub target_name: String,
    pub target_colors: Vec<NamedColor>,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            variant: FieldVariant::CoalField,
            steering: SteeringMode::Smoothed,
            // Field Layout
            decoy_count: DECOY_COUNT,
            pickup_count: PICKUP_COUNT,
            spawn_radius: SPAWN_RADIUS,
            spawn_inner_radius: SPAWN_INNER_RADIUS,
            player_start_z: PLAYER_START_Z,
            decoy_scale_min: DECOY_SCALE_MIN,
            decoy_scale_max: DECOY_SCALE_MAX,
            decoy_saturation: DECOY_SATURATION,
            decoy_lightness: DECOY_LIGHTNESS,
            target_scale_min: TARGET_SCALE_MIN,
            target_scale_max: TARGET_SCALE_MAX,
            size_small_below: SIZE_SMALL_BELOW,
            size_medium_below: SIZE_MEDIUM_BELOW,
            // Steering
            yaw_speed: YAW_SPEED,
            pitch_speed: PITCH_SPEED,
            steering_lerp: STEERING_LERP,
            discrete_turn_rate: DISCRETE_TURN_RATE,
            turn_epsilon: TURN_EPSILON,
            movement_speed: MOVEMENT_SPEED,
            // Magic Economy
            max_magic: MAX_MAGIC,
            magic_depletion_rate: MAGIC_DEPLETION_RATE,
            scan_cost: SCAN_COST,
            pickup_replenish: PICKUP_REPLENISH,
            // Collision
            collection_threshold: COLLECTION_THRESHOLD,
            collision_threshold: COLLISION_THRESHOLD,
            collision_cooldown: COLLISION_COOLDOWN,
            collision_penalty: COLLISION_PENALTY,
            knockback_distance: KNOCKBACK_DISTANCE,
            decoy_grid_cell_size: DECOY_GRID_CELL_SIZE,
            // Feedback
            flash_duration: FLASH_DURATION,
            flash_color: FLASH_COLOR_HEX,
            status_message_duration: STATUS_MESSAGE_DURATION,
            glow_base: GLOW_BASE,
            glow_spike_factor: GLOW_SPIKE_FACTOR,
            glow_spike_duration: GLOW_SPIKE_DURATION,
            controls_hint_duration: CONTROLS_HINT_DURATION,
            // Target
            target_name: TARGET_NAME.to_string(),
            target_colors: vec![NamedColor::new(TARGET_COLOR_NAME, TARGET_COLOR_HEX)],
        }
    }
}

impl GameConfig {
    /// The coal-field preset (identical to `Default`).
    pub fn coal_field() -> Self {
        Self::default()
    }

    /// The asteroid-field preset: keyboard-only turning, no stardust, and a
    /// meter that never drains.
    pub fn asteroid_field() -> Self {
        Self {
            variant: FieldVariant::AsteroidField,
            steering: SteeringMode::Discrete,
            pickup_count: 0,
            magic_depletion_rate: 0.0,
            scan_cost: 0.0,
            collision_penalty: 0.0,
            target_name: "the target".to_string(),
            target_colors: vec![
                NamedColor::new("red", 0xff2020),
                NamedColor::new("blue", 0x2060ff),
                NamedColor::new("green", 0x00ff00),
                NamedColor::new("yellow", 0xffe020),
                NamedColor::new("purple", 0xb030ff),
            ],
            ..Self::default()
        }
    }

    pub fn preset(variant: FieldVariant) -> Self {
        match variant {
            FieldVariant::CoalField => Self::coal_field(),
            FieldVariant::AsteroidField => Self::asteroid_field(),
        }
    }

    /// Overlay the keys of a TOML document on top of `base`.
    ///
    /// A `variant` key in the document swaps `base` for that variant's preset
    /// first; every other key then replaces the preset value.
    pub fn overlay_toml(
        base: &GameConfig,
        contents: &str,
        path: &str,
    ) -> Result<Self, ConfigError> {
        let parse_err = |message: String| ConfigError::Parse {
            path: path.to_string(),
            message,
        };

        let overrides: toml::Table =
            toml::from_str(contents).map_err(|e: toml::de::Error| parse_err(e.to_string()))?;

        let preset = match overrides.get("variant") {
            Some(value) => {
                let variant: FieldVariant = value
                    .clone()
                    .try_into()
                    .map_err(|e: toml::de::Error| parse_err(e.to_string()))?;
                if variant == base.variant {
                    base.clone()
                } else {
                    Self::preset(variant)
                }
            }
            None => base.clone(),
        };

        let mut merged = match toml::Value::try_from(&preset) {
            Ok(toml::Value::Table(table)) => table,
            Ok(_) => return Err(parse_err("preset did not serialise to a table".to_string())),
            Err(e) => return Err(parse_err(e.to_string())),
        };
        for (key, value) in overrides {
            merged.insert(key, value);
        }

        let config: GameConfig = toml::Value::Table(merged)
            .try_into()
            .map_err(|e: toml::de::Error| parse_err(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Reject values that would break the gameplay invariants.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let positive = [
            ("max_magic", self.max_magic),
            ("collection_threshold", self.collection_threshold),
            ("collision_threshold", self.collision_threshold),
            ("spawn_radius", self.spawn_radius),
            ("decoy_grid_cell_size", self.decoy_grid_cell_size),
        ];
        for (name, value) in positive {
            if !(value > 0.0) {
                return Err(ConfigError::Invalid {
                    name,
                    value,
                    expected: "(0, ∞)",
                });
            }
        }

        let non_negative = [
            ("magic_depletion_rate", self.magic_depletion_rate),
            ("scan_cost", self.scan_cost),
            ("pickup_replenish", self.pickup_replenish),
            ("collision_penalty", self.collision_penalty),
            ("collision_cooldown", self.collision_cooldown),
        ];
        for (name, value) in non_negative {
            if !(value >= 0.0) {
                return Err(ConfigError::Invalid {
                    name,
                    value,
                    expected: "[0, ∞)",
                });
            }
        }

        if !(self.steering_lerp > 0.0 && self.steering_lerp <= 1.0) {
            return Err(ConfigError::Invalid {
                name: "steering_lerp",
                value: self.steering_lerp,
                expected: "(0, 1]",
            });
        }
        if self.decoy_grid_cell_size < self.collision_threshold {
            return Err(ConfigError::Invalid {
                name: "decoy_grid_cell_size",
                value: self.decoy_grid_cell_size,
                expected: "[collision_threshold, ∞)",
            });
        }
        if self.target_colors.is_empty() {
            return Err(ConfigError::Invalid {
                name: "target_colors",
                value: 0.0,
                expected: "at least one colour",
            });
        }
        Ok(())
    }
}

/// Startup system: attempt to load `assets/field.toml` and overlay the
/// `GameConfig` resource with any values present in the file.
///
/// Missing keys retain the preset values.  Parse and validation errors are
/// logged but do not abort the game.  A missing file is not an error.
pub fn load_game_config(mut config: ResMut<GameConfig>) {
    let path = CONFIG_PATH;
    let contents = match std::fs::read_to_string(path) {
        Ok(contents) => contents,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            info!("No {path} found; using the {:?} preset", config.variant);
            return;
        }
        Err(e) => {
            let err = ConfigError::Read {
                path: path.to_string(),
                source: e,
            };
            warn!("{err}; using the {:?} preset", config.variant);
            return;
        }
    };

    match GameConfig::overlay_toml(&config, &contents, path) {
        Ok(loaded) => {
            *config = loaded;
            info!("✓ Loaded field config from {path} ({:?})", config.variant);
        }
        Err(e) => warn!("{e}; using the {:?} preset", config.variant),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_valid_coal_field() {
        let config = GameConfig::default();
        assert_eq!(config.variant, FieldVariant::CoalField);
        assert_eq!(config.decoy_count, 400);
        assert_eq!(config.pickup_count, 100);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn asteroid_preset_is_valid_and_keyboard_only() {
        let config = GameConfig::asteroid_field();
        assert_eq!(config.steering, SteeringMode::Discrete);
        assert_eq!(config.pickup_count, 0);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn overlay_replaces_only_named_keys() {
        let base = GameConfig::default();
        let loaded = GameConfig::overlay_toml(&base, "scan_cost = 20.0\ndecoy_count = 12\n", "test")
            .expect("overlay should parse");
        assert_eq!(loaded.scan_cost, 20.0);
        assert_eq!(loaded.decoy_count, 12);
        assert_eq!(loaded.max_magic, base.max_magic);
        assert_eq!(loaded.target_colors, base.target_colors);
    }

    #[test]
    fn overlay_variant_key_switches_preset() {
        let base = GameConfig::default();
        let loaded = GameConfig::overlay_toml(&base, "variant = \"asteroid_field\"\ndecoy_count = 50\n", "test")
            .expect("overlay should parse");
        assert_eq!(loaded.variant, FieldVariant::AsteroidField);
        assert_eq!(loaded.steering, SteeringMode::Discrete);
        assert_eq!(loaded.pickup_count, 0);
        assert_eq!(loaded.decoy_count, 50);
    }

    #[test]
    fn overlay_rejects_malformed_toml() {
        let base = GameConfig::default();
        let result = GameConfig::overlay_toml(&base, "scan_cost = = 3", "test");
        assert!(matches!(result, Err(ConfigError::Parse { .. })));
    }

    #[test]
    fn overlay_rejects_out_of_range_lerp() {
        let base = GameConfig::default();
        let result = GameConfig::overlay_toml(&base, "steering_lerp = 1.5", "test");
        assert!(matches!(
            result,
            Err(ConfigError::Invalid {
                name: "steering_lerp",
                ..
            })
        ));
    }

    #[test]
    fn variant_names_parse() {
        assert_eq!(FieldVariant::from_name("Asteroid"), Some(FieldVariant::AsteroidField));
        assert_eq!(FieldVariant::from_name("coal"), Some(FieldVariant::CoalField));
        assert_eq!(FieldVariant::from_name("lava"), None);
    }

    #[test]
    fn hex_color_splits_channels() {
        let srgba = hex_color(0xff8000).to_srgba();
        assert!((srgba.red - 1.0).abs() < 1e-6);
        assert!((srgba.green - 128.0 / 255.0).abs() < 1e-6);
        assert!(srgba.blue.abs() < 1e-6);
    }
}
