use std::{fs, path::Path};

use anyhow::{Context, Result};
use serde::Deserialize;

/// Tunable game parameters with defaults matching the classic round.
///
/// An optional JSON file can override any subset of fields; everything
/// not mentioned keeps its default.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    pub window_width: u32,
    pub window_height: u32,
    pub assets_dir: String,
    /// Horizontal player speed in pixels per second.
    pub player_speed: f32,
    /// Downward speed of player laser blasts in pixels per second.
    pub player_shot_speed: f32,
    /// Upward speed of enemy laser blasts in pixels per second.
    pub enemy_shot_speed: f32,
    /// Horizontal marching speed of the swarm in pixels per second.
    pub swarm_speed: f32,
    /// Vertical step toward the player on each wall bounce, in pixels.
    pub swarm_step: f32,
    pub grid_rows: usize,
    pub grid_cols: usize,
    /// Distance between neighboring enemies (and the grid margin), in pixels.
    pub grid_spacing: f32,
    /// Seconds between enemy laser blasts.
    pub fire_interval: f32,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            window_width: 1920,
            window_height: 1080,
            assets_dir: "assets".into(),
            player_speed: 450.0,
            player_shot_speed: 400.0,
            enemy_shot_speed: 300.0,
            swarm_speed: 300.0,
            swarm_step: 20.0,
            grid_rows: 4,
            grid_cols: 8,
            grid_spacing: 120.0,
            fire_interval: 0.5,
        }
    }
}

impl GameConfig {
    /// Load configuration overrides from a JSON file.
    ///
    /// A missing file yields the defaults; a file that exists but fails to
    /// parse is an error, since silently ignoring a typo'd config is worse
    /// than refusing to start.
    pub fn load_or_default(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(path)
            .with_context(|| format!("failed to read config file {}", path.display()))?;
        let config = serde_json::from_str(&contents)
            .with_context(|| format!("failed to parse config file {}", path.display()))?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_classic_round() {
        let config = GameConfig::default();
        assert_eq!(config.window_width, 1920);
        assert_eq!(config.window_height, 1080);
        assert_eq!(config.grid_rows, 4);
        assert_eq!(config.grid_cols, 8);
        assert_eq!(config.fire_interval, 0.5);
    }

    #[test]
    fn partial_override_keeps_remaining_defaults() {
        let config: GameConfig =
            serde_json::from_str(r#"{ "swarm_speed": 500.0, "grid_rows": 2 }"#)
                .expect("valid override");
        assert_eq!(config.swarm_speed, 500.0);
        assert_eq!(config.grid_rows, 2);
        assert_eq!(config.player_speed, 450.0);
        assert_eq!(config.grid_cols, 8);
    }

    #[test]
    fn missing_file_yields_defaults() {
        let config = GameConfig::load_or_default("does-not-exist.json").expect("defaults");
        assert_eq!(config.window_width, 1920);
    }
}
