//! The per-frame simulation step.
//!
//! `step` takes an immutable reference to the current `World` and returns a
//! brand-new `World`.  Nothing outside the returned value is mutated except
//! the obstacles' shared alpha-mask caches, which are filled on first use.

use std::time::Duration;

use crate::assets::Assets;
use crate::collision;
use crate::config::GameConfig;
use crate::encounter;
use crate::entities::{GameStatus, World};
use crate::input::InputState;
use crate::level;
use crate::physics;
use crate::player;

/// Advance the simulation by `dt`.
///
/// Order within a frame:
///
/// 1. an active encounter freezes movement and only advances itself;
/// 2. obstacle collisions at the current position (spring, hazard, water);
/// 3. commands, at the speed the collision pass allows;
/// 4. gravity and the ground clamp;
/// 5. enemy overlap, then level completion;
/// 6. animation frames.
///
/// A world that is not `Playing` is returned unchanged.
pub fn step(
    world: &World,
    input: &InputState,
    dt: Duration,
    config: &GameConfig,
    assets: &Assets,
) -> World {
    if world.status != GameStatus::Playing {
        return world.clone();
    }
    let mut next = World {
        clock: world.clock + dt,
        frame: world.frame + 1,
        ..world.clone()
    };

    if next.fight.is_active() {
        return encounter::advance(next, input, config);
    }

    let sprite = player::current_sprite(&next.player, assets);
    let outcome = collision::resolve(&next.player, &next.obstacles, sprite, config);
    let speed = if outcome.slowed {
        config.water_speed()
    } else {
        config.player_speed
    };

    let moved = player::apply_input(&outcome.player, input, speed, next.level_length, config);
    next.player = physics::integrate(&moved, input.horizontal().is_some(), config);

    next = encounter::detect(next, config);
    next = level::check_completion(next, config);

    next.player = player::animate(
        &next.player,
        next.clock,
        assets.walk.len(),
        assets.jump.len(),
        config,
    );
    next
}
