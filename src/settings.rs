//! Simulation settings
//!
//! Sub-stepping, collision and vehicle tuning. Loaded from JSON; every field
//! has a default.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::consts::*;
use crate::error::{Error, Result};

/// Sub-stepping presets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum StepPreset {
    Fast,
    #[default]
    Balanced,
    Precise,
}

impl StepPreset {
    pub fn as_str(&self) -> &'static str {
        match self {
            StepPreset::Fast => "Fast",
            StepPreset::Balanced => "Balanced",
            StepPreset::Precise => "Precise",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "fast" => Some(StepPreset::Fast),
            "balanced" | "default" => Some(StepPreset::Balanced),
            "precise" => Some(StepPreset::Precise),
            _ => None,
        }
    }

    /// Coarse time slices per frame for this preset
    pub fn sub_updates(&self) -> u32 {
        match self {
            StepPreset::Fast => 1,
            StepPreset::Balanced => SUB_UPDATES,
            StepPreset::Precise => 4,
        }
    }

    /// Collision refinement passes per sub-update
    pub fn max_simulation_steps(&self) -> u32 {
        match self {
            StepPreset::Fast => 8,
            StepPreset::Balanced => MAX_SIMULATION_STEPS,
            StepPreset::Precise => 24,
        }
    }
}

/// Which vehicle integration strategy steered bodies use
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum SteeringMode {
    /// Front and rear wheel contact points advanced independently
    #[default]
    TwoAxle,
    /// Velocity rotated directly by the yaw rate of the steer angle
    Simple,
}

/// Vehicle handling
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SteeringSettings {
    pub mode: SteeringMode,
    /// Steer angle at full input and zero speed (radians)
    pub max_steer: f32,
    /// Fraction of steering authority lost at top speed
    pub steer_falloff: f32,
    pub max_speed: f32,
    pub max_accel: f32,
    /// Heading is recovered from velocity only above this speed
    pub heading_threshold: f32,
    /// Fraction of speed lost per second with no throttle
    pub coast_drag: f32,
    /// Wheelbase as a multiple of body radius
    pub wheelbase_factor: f32,
}

impl Default for SteeringSettings {
    fn default() -> Self {
        Self {
            mode: SteeringMode::TwoAxle,
            max_steer: MAX_STEER_ANGLE,
            steer_falloff: STEER_FALLOFF,
            max_speed: MAX_SPEED,
            max_accel: MAX_ACCEL,
            heading_threshold: HEADING_SPEED_THRESHOLD,
            coast_drag: COAST_DRAG,
            wheelbase_factor: WHEELBASE_FACTOR,
        }
    }
}

/// Simulation settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub preset: StepPreset,

    // === Sub-stepping ===
    /// Coarse time slices per frame
    pub sub_updates: u32,
    /// Collision refinement passes per sub-update
    pub max_simulation_steps: u32,

    // === Collision ===
    /// Restitution along the collision normal (0 = plastic, 1 = elastic)
    pub collision_efficiency: f32,
    /// Mass multiplier applied to wall phantoms
    pub wall_mass_multiplier: f32,
    /// Altitude above ground at which walls are ignored
    pub wall_fly_height: f32,

    // === Terrain ===
    pub gravity: f32,
    pub bump_slope: f32,
    pub bump_penalty: f32,
    pub min_speed_penalty: f32,
    pub passive_drag: f32,

    // === Vehicles ===
    pub steering: SteeringSettings,

    // === Path followers ===
    pub arrive_radius: f32,
    pub avoid_duration: f32,
    pub path_throttle: f32,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            preset: StepPreset::Balanced,

            sub_updates: SUB_UPDATES,
            max_simulation_steps: MAX_SIMULATION_STEPS,

            collision_efficiency: COLLISION_EFFICIENCY,
            wall_mass_multiplier: WALL_MASS_MULTIPLIER,
            wall_fly_height: WALL_FLY_HEIGHT,

            gravity: GRAVITY,
            bump_slope: BUMP_SLOPE,
            bump_penalty: BUMP_PENALTY,
            min_speed_penalty: MIN_SPEED_PENALTY,
            passive_drag: PASSIVE_DRAG,

            steering: SteeringSettings::default(),

            arrive_radius: ARRIVE_RADIUS,
            avoid_duration: AVOID_DURATION,
            path_throttle: PATH_THROTTLE,
        }
    }
}

impl Settings {
    /// Create settings from a preset
    pub fn from_preset(preset: StepPreset) -> Self {
        let mut settings = Self::default();
        settings.apply_preset(preset);
        settings
    }

    /// Apply a preset (overwrites the sub-stepping counts)
    pub fn apply_preset(&mut self, preset: StepPreset) {
        self.preset = preset;
        self.sub_updates = preset.sub_updates();
        self.max_simulation_steps = preset.max_simulation_steps();
    }

    /// Check that the values can drive a simulation
    pub fn validate(&self) -> Result<()> {
        if self.sub_updates == 0 {
            return Err(Error::InvalidSettings("sub_updates must be at least 1".into()));
        }
        if self.max_simulation_steps == 0 {
            return Err(Error::InvalidSettings(
                "max_simulation_steps must be at least 1".into(),
            ));
        }
        if !(0.0..=1.0).contains(&self.collision_efficiency) {
            return Err(Error::InvalidSettings(format!(
                "collision_efficiency {} outside [0, 1]",
                self.collision_efficiency
            )));
        }
        if self.wall_mass_multiplier <= 0.0 {
            return Err(Error::InvalidSettings(
                "wall_mass_multiplier must be positive".into(),
            ));
        }
        if self.steering.max_speed <= 0.0 || self.steering.wheelbase_factor <= 0.0 {
            return Err(Error::InvalidSettings(
                "steering max_speed and wheelbase_factor must be positive".into(),
            ));
        }
        if !(0.0..=1.0).contains(&self.min_speed_penalty) {
            return Err(Error::InvalidSettings(format!(
                "min_speed_penalty {} outside [0, 1]",
                self.min_speed_penalty
            )));
        }
        Ok(())
    }

    /// Parse and validate settings from JSON
    pub fn from_json(json: &str) -> Result<Self> {
        let settings: Settings = serde_json::from_str(json)?;
        settings.validate()?;
        Ok(settings)
    }

    /// Load settings from a JSON file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let json = std::fs::read_to_string(path.as_ref())?;
        let settings = Self::from_json(&json)?;
        log::info!("Loaded settings from {}", path.as_ref().display());
        Ok(settings)
    }

    /// Load settings, falling back to defaults on any failure
    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        match Self::load(path.as_ref()) {
            Ok(settings) => settings,
            Err(e) => {
                log::warn!(
                    "Using default settings ({}: {})",
                    path.as_ref().display(),
                    e
                );
                Self::default()
            }
        }
    }

    /// Serialize to pretty JSON
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_validate() {
        let settings = Settings::default();
        assert!(settings.validate().is_ok());
        assert_eq!(settings.sub_updates, 2);
        assert_eq!(settings.max_simulation_steps, 15);
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let settings = Settings::from_json(r#"{ "sub_updates": 3 }"#).unwrap();
        assert_eq!(settings.sub_updates, 3);
        assert_eq!(settings.max_simulation_steps, MAX_SIMULATION_STEPS);
        assert_eq!(settings.steering.mode, SteeringMode::TwoAxle);
    }

    #[test]
    fn test_invalid_settings_rejected() {
        let err = Settings::from_json(r#"{ "max_simulation_steps": 0 }"#).unwrap_err();
        assert!(matches!(err, Error::InvalidSettings(_)));

        let err = Settings::from_json(r#"{ "collision_efficiency": 1.5 }"#).unwrap_err();
        assert!(matches!(err, Error::InvalidSettings(_)));

        let err = Settings::from_json("{ not json").unwrap_err();
        assert!(matches!(err, Error::Json(_)));
    }

    #[test]
    fn test_preset() {
        let settings = Settings::from_preset(StepPreset::Precise);
        assert_eq!(settings.sub_updates, 4);
        assert_eq!(settings.max_simulation_steps, 24);
        assert_eq!(StepPreset::from_str("FAST"), Some(StepPreset::Fast));
        assert_eq!(StepPreset::from_str("ludicrous"), None);
    }

    #[test]
    fn test_json_round_trip_keeps_steering_mode() {
        let mut settings = Settings::default();
        settings.steering.mode = SteeringMode::Simple;
        let json = settings.to_json().unwrap();
        let parsed = Settings::from_json(&json).unwrap();
        assert_eq!(parsed.steering.mode, SteeringMode::Simple);
    }

    #[test]
    fn test_load_missing_file_falls_back() {
        let settings = Settings::load_or_default("/definitely/not/here.json");
        assert_eq!(settings.sub_updates, SUB_UPDATES);
        assert!(matches!(
            Settings::load("/definitely/not/here.json"),
            Err(Error::Io(_))
        ));
    }
}
