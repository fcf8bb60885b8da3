// src/config.rs - Engine configuration: defaults, JSON loading, validation
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::info;

use crate::fingers::FingerThresholds;
use crate::recognizer::GestureThresholds;
use crate::smoothing::{PointerConfig, SmootherConfig};
use crate::state::StabilityConfig;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config JSON in {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid config value: {0}")]
    Invalid(String),
}

/// Every tunable of the engine. Missing sections and fields take their defaults.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub fingers: FingerThresholds,
    pub gestures: GestureThresholds,
    pub stability: StabilityConfig,
    pub smoothing: SmootherConfig,
    pub pointer: PointerConfig,
}

impl EngineConfig {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config: Self = serde_json::from_str(&text).map_err(|source| ConfigError::Json {
            path: path.to_path_buf(),
            source,
        })?;
        config.validate()?;
        info!("Loaded config from {}", path.display());
        Ok(config)
    }

    /// `<config dir>/hand_gesture/config.json`, when the platform has one.
    pub fn default_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("", "", "hand_gesture")
            .map(|dirs| dirs.config_dir().join("config.json"))
    }

    /// Loads from `path` (or the default location); defaults when no file exists.
    pub fn load_or_default(path: Option<&Path>) -> Result<Self, ConfigError> {
        let path = match path {
            Some(p) => Some(p.to_path_buf()),
            None => Self::default_path(),
        };
        match path {
            Some(p) if p.exists() => Self::load(&p),
            _ => {
                info!("No config file found, using defaults");
                Ok(Self::default())
            }
        }
    }

    pub fn to_json(&self) -> Result<String, ConfigError> {
        serde_json::to_string_pretty(self).map_err(|source| ConfigError::Json {
            path: PathBuf::new(),
            source,
        })
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let s = &self.smoothing;
        positive("smoothing.frequency", s.frequency)?;
        positive("smoothing.min_cutoff", s.min_cutoff)?;
        positive("smoothing.d_cutoff", s.d_cutoff)?;
        non_negative("smoothing.beta", s.beta)?;
        non_negative("smoothing.deadzone", s.deadzone)?;
        positive("smoothing.width", s.width)?;
        positive("smoothing.height", s.height)?;
        unit_fraction("smoothing.deadzone_keep", s.deadzone_keep)?;
        unit_fraction("smoothing.edge_min_factor", s.edge_min_factor)?;
        if !(s.edge_margin > 0.0 && s.edge_margin < 0.5) {
            return Err(invalid("smoothing.edge_margin", s.edge_margin, "must be in (0, 0.5)"));
        }

        positive("pointer.sensitivity", self.pointer.sensitivity)?;
        non_negative("stability.min_hold_seconds", self.stability.min_hold_seconds)?;

        let f = &self.fingers;
        for (name, value) in [
            ("fingers.extended_angle", f.extended_angle),
            ("fingers.curled_pip_angle", f.curled_pip_angle),
            ("fingers.thumb_extended_angle", f.thumb_extended_angle),
        ] {
            degrees(name, value)?;
        }
        positive("fingers.thumb_index_mcp_min", f.thumb_index_mcp_min)?;

        let g = &self.gestures;
        for (name, value) in [
            ("gestures.l_thumb_angle", g.l_thumb_angle),
            ("gestures.rock_straight_thumb_angle", g.rock_straight_thumb_angle),
            ("gestures.rock_index_pip_min", g.rock_index_pip_min),
            ("gestures.index_up_angle", g.index_up_angle),
        ] {
            degrees(name, value)?;
        }
        for (name, value) in [
            ("gestures.ok_distance", g.ok_distance),
            ("gestures.ok_middle_ratio", g.ok_middle_ratio),
            ("gestures.pinch_distance", g.pinch_distance),
        ] {
            positive(name, value)?;
        }
        if g.grab_min_curled == 0 || g.grab_min_curled > 4 {
            return Err(ConfigError::Invalid(format!(
                "gestures.grab_min_curled = {} must be in 1..=4",
                g.grab_min_curled
            )));
        }
        Ok(())
    }
}

fn invalid(name: &str, value: f64, rule: &str) -> ConfigError {
    ConfigError::Invalid(format!("{} = {} {}", name, value, rule))
}

fn positive(name: &str, value: f64) -> Result<(), ConfigError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(invalid(name, value, "must be positive"))
    }
}

fn non_negative(name: &str, value: f64) -> Result<(), ConfigError> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(invalid(name, value, "must be non-negative"))
    }
}

fn unit_fraction(name: &str, value: f64) -> Result<(), ConfigError> {
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(invalid(name, value, "must be in [0, 1]"))
    }
}

fn degrees(name: &str, value: f64) -> Result<(), ConfigError> {
    if (0.0..=180.0).contains(&value) {
        Ok(())
    } else {
        Err(invalid(name, value, "must be in [0, 180] degrees"))
    }
}
