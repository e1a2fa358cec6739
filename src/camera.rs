//! Horizontal camera window.

use crate::config::GameConfig;

/// Scroll offset that keeps the player centred, clamped to the level.
/// Levels narrower than the viewport never scroll.
pub fn offset(player_x: f32, level_length: f32, config: &GameConfig) -> f32 {
    let centred = player_x - config.viewport_width / 2.0 + config.player_width / 2.0;
    centred.min(level_length - config.viewport_width).max(0.0)
}

/// Offset applied to background layers.
pub fn parallax_offset(offset: f32, config: &GameConfig) -> f32 {
    offset * config.parallax
}
