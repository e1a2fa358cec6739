//! Vertical gravity integration with a ground clamp.

use crate::config::GameConfig;
use crate::entities::{Player, PlayerState};

/// Advance the player's vertical motion by one step.
///
/// `horizontal_held` decides what a landing jump resolves to: walk while a
/// move command is held, idle otherwise.
pub fn integrate(player: &Player, horizontal_held: bool, config: &GameConfig) -> Player {
    let rest = config.ground_rest_y();
    let mut next = Player {
        prev_y: player.y,
        y: player.y + player.vy,
        vy: player.vy + config.gravity,
        ..player.clone()
    };

    if next.y >= rest {
        next.y = rest;
        next.vy = 0.0;
        if next.state == PlayerState::Jump {
            next.state = if horizontal_held {
                PlayerState::Walk
            } else {
                PlayerState::Idle
            };
        }
    }
    next
}

/// Resting exactly on the ground line (the clamp makes this an exact test).
pub fn is_grounded(player: &Player, config: &GameConfig) -> bool {
    player.y >= config.ground_rest_y()
}
