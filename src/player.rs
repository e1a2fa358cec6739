//! Input-driven player state machine and animation.

use std::time::Duration;

use crate::assets::{Assets, SpriteHandle};
use crate::config::GameConfig;
use crate::entities::{Facing, Player, PlayerState};
use crate::input::InputState;
use crate::physics;

/// Apply one frame of commands in fixed priority: horizontal movement,
/// idle fallback, crouch, jump.  A jump in progress is never overridden.
pub fn apply_input(
    player: &Player,
    input: &InputState,
    speed: f32,
    level_length: f32,
    config: &GameConfig,
) -> Player {
    let mut next = player.clone();
    let jumping = player.state == PlayerState::Jump;

    match input.horizontal() {
        Some(Facing::Left) => {
            next.x = (next.x - speed).max(0.0);
            next.facing = Facing::Left;
            if !jumping {
                next.state = PlayerState::Walk;
            }
        }
        Some(Facing::Right) => {
            next.x = (next.x + speed).min(config.max_player_x(level_length));
            next.facing = Facing::Right;
            if !jumping {
                next.state = PlayerState::Walk;
            }
        }
        None if !jumping => next.state = PlayerState::Idle,
        None => {}
    }

    if input.crouch && !jumping {
        next.state = PlayerState::Crouch;
    }

    if input.jump && !jumping && physics::is_grounded(&next, config) {
        next.vy = config.jump_speed;
        next.state = PlayerState::Jump;
    }

    next
}

/// Advance the walk or jump frame when its interval has passed.
/// `clock` is the current simulation time.
pub fn animate(
    player: &Player,
    clock: Duration,
    walk_frames: usize,
    jump_frames: usize,
    config: &GameConfig,
) -> Player {
    let mut next = player.clone();
    match player.state {
        PlayerState::Walk if clock.saturating_sub(player.walk_timer) > config.walk_interval() => {
            next.walk_frame = (player.walk_frame + 1) % walk_frames.max(1);
            next.walk_timer = clock;
        }
        PlayerState::Jump if clock.saturating_sub(player.jump_timer) > config.jump_interval() => {
            next.jump_frame = (player.jump_frame + 1) % jump_frames.max(1);
            next.jump_timer = clock;
        }
        _ => {}
    }
    next
}

/// The animation frame to draw (and to collide with) for the current state.
/// Idle reuses the first walk frame.
pub fn current_sprite<'a>(player: &Player, assets: &'a Assets) -> &'a SpriteHandle {
    match player.state {
        PlayerState::Walk => &assets.walk[player.walk_frame % assets.walk.len()],
        PlayerState::Jump => &assets.jump[player.jump_frame % assets.jump.len()],
        PlayerState::Crouch => &assets.crouch[0],
        PlayerState::Idle => &assets.walk[0],
    }
}
