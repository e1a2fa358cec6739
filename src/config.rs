//! Tunable game constants.
//!
//! Defaults describe the 800×480 apartment game.  Any subset of the
//! fields may be overridden from a RON file; missing fields keep their
//! default value.

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    pub viewport_width: f32,
    pub viewport_height: f32,
    /// Top of the ground band in screen pixels.
    pub ground_y: f32,
    /// Pseudo-3D depth of the floor; sprites sink this far into the band.
    pub floor_offset: f32,
    pub player_width: f32,
    pub player_height: f32,
    pub player_y_offset: f32,
    /// Horizontal pixels per step.
    pub player_speed: f32,
    pub gravity: f32,
    pub jump_speed: f32,
    pub spring_jump_speed: f32,
    /// Divisor applied to `player_speed` while overlapping water.
    pub water_slowdown: f32,
    pub spawn_x: f32,
    /// Distance from the level end at which the level counts as reached.
    pub end_margin: f32,
    /// Background scroll factor relative to the camera.
    pub parallax: f32,
    pub alpha_threshold: u8,
    pub walk_frame_ms: u64,
    pub jump_frame_ms: u64,
    pub fight_duration_ms: u64,
    /// How many times the fight frame set cycles during one fight.
    pub fight_cycles: u32,
    pub completion_pause_ms: u64,
    pub transition_ms: u64,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            viewport_width: 800.0,
            viewport_height: 480.0,
            ground_y: 420.0,
            floor_offset: 25.0,
            player_width: 52.0,
            player_height: 84.0,
            player_y_offset: 20.0,
            player_speed: 5.0,
            gravity: 0.5,
            jump_speed: -11.0,
            spring_jump_speed: -18.0,
            water_slowdown: 2.0,
            spawn_x: 50.0,
            end_margin: 10.0,
            parallax: 0.7,
            alpha_threshold: 10,
            walk_frame_ms: 120,
            jump_frame_ms: 80,
            fight_duration_ms: 2000,
            fight_cycles: 4,
            completion_pause_ms: 1000,
            transition_ms: 4000,
        }
    }
}

impl GameConfig {
    pub fn from_ron_str(source: &str) -> Result<Self, ConfigError> {
        Ok(ron::from_str(source)?)
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let source = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_ron_str(&source)
    }

    /// The y coordinate at which a standing player rests on the floor.
    pub fn ground_rest_y(&self) -> f32 {
        self.ground_y - self.player_height + self.floor_offset + self.player_y_offset
    }

    pub fn max_player_x(&self, level_length: f32) -> f32 {
        (level_length - self.player_width).max(0.0)
    }

    pub fn walk_interval(&self) -> Duration {
        Duration::from_millis(self.walk_frame_ms)
    }

    pub fn jump_interval(&self) -> Duration {
        Duration::from_millis(self.jump_frame_ms)
    }

    pub fn fight_duration(&self) -> Duration {
        Duration::from_millis(self.fight_duration_ms)
    }

    pub fn completion_pause(&self) -> Duration {
        Duration::from_millis(self.completion_pause_ms)
    }

    pub fn transition_duration(&self) -> Duration {
        Duration::from_millis(self.transition_ms)
    }

    /// Speed for a frame spent overlapping water.
    pub fn water_speed(&self) -> f32 {
        (self.player_speed / self.water_slowdown).max(1.0)
    }
}
