//! Enemy encounters: overlap prompt, scripted fight, resolution.
//!
//! Phases only move forward: none → prompted → fighting → none, or
//! none → prompted → none when the player flees.  Enemy lifecycles are
//! only ever changed away from `Alive`.

use std::time::Duration;

use log::{debug, info};

use crate::collision::player_body;
use crate::config::GameConfig;
use crate::entities::{EnemyId, FightState, GameStatus, Lifecycle, World};
use crate::input::InputState;

/// Enter the prompt when the player's standing box overlaps a live enemy.
/// Ignored while another encounter is active.
pub fn detect(mut world: World, config: &GameConfig) -> World {
    if world.fight.is_active() {
        return world;
    }
    let body = player_body(&world.player, config);
    if let Some(enemy) = world
        .roster
        .iter()
        .find(|e| e.is_alive() && body.overlaps(&e.rect))
    {
        debug!("enemy {} blocks the way", enemy.id);
        world.fight = FightState::Prompted { enemy: enemy.id };
    }
    world
}

/// Advance an active encounter by one step.  `world.clock` must already
/// hold the current simulation time.
pub fn advance(mut world: World, input: &InputState, config: &GameConfig) -> World {
    match world.fight {
        FightState::None => {}
        FightState::Prompted { enemy } => {
            if input.fight {
                let unwinnable = world.enemy(enemy).is_some_and(|e| e.unwinnable);
                if unwinnable {
                    info!("fought unwinnable enemy {}; game lost", enemy);
                    world.status = GameStatus::Lost;
                } else {
                    debug!("fight with enemy {} starts", enemy);
                    world.fight = FightState::Fighting {
                        enemy,
                        started_at: world.clock,
                    };
                }
            } else if input.flee {
                debug!("player flees from enemy {}", enemy);
                retire(&mut world, enemy, Lifecycle::Escaped);
                world.fight = FightState::None;
            }
        }
        FightState::Fighting { enemy, started_at } => {
            if world.clock.saturating_sub(started_at) > config.fight_duration() {
                debug!("enemy {} defeated", enemy);
                retire(&mut world, enemy, Lifecycle::Defeated);
                world.fight = FightState::None;
            }
        }
    }
    world
}

fn retire(world: &mut World, id: EnemyId, outcome: Lifecycle) {
    if let Some(enemy) = world.enemy_mut(id) {
        if enemy.is_alive() {
            enemy.lifecycle = outcome;
        }
    }
}

/// Index into the fight frame set for the running fight animation.  The set
/// cycles `fight_cycles` times over the fight duration.
pub fn fight_frame(
    fight: &FightState,
    clock: Duration,
    config: &GameConfig,
    frames: usize,
) -> Option<usize> {
    let FightState::Fighting { started_at, .. } = fight else {
        return None;
    };
    if frames == 0 {
        return None;
    }
    let elapsed = clock.saturating_sub(*started_at).as_secs_f64();
    let duration = config.fight_duration().as_secs_f64().max(f64::EPSILON);
    let cycle = frames as f64 * config.fight_cycles as f64;
    Some(((elapsed / duration) * cycle).floor() as usize % frames)
}
