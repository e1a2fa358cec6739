//! Draw-list production.
//!
//! `compose` turns a read-only view of the world into an ordered list of
//! screen-space draw commands plus one status line.  No simulation logic is
//! performed here; backends only need to fill rectangles and blit sprites.

use crate::assets::{Assets, SpriteHandle};
use crate::camera;
use crate::config::GameConfig;
use crate::encounter;
use crate::entities::{Facing, FightState, GameStatus, PlayerState, Rect, Rgb, World};
use crate::player;

/// Draw order, back to front.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub enum Layer {
    Sky,
    Background,
    Ground,
    Obstacle,
    Enemy,
    Player,
    FightOverlay,
}

#[derive(Clone, Debug)]
pub enum DrawCommand {
    Fill {
        layer: Layer,
        rect: Rect,
        color: Rgb,
    },
    Sprite {
        layer: Layer,
        sprite: SpriteHandle,
        rect: Rect,
        /// Draw horizontally flipped.
        mirrored: bool,
    },
}

impl DrawCommand {
    pub fn layer(&self) -> Layer {
        match self {
            DrawCommand::Fill { layer, .. } | DrawCommand::Sprite { layer, .. } => *layer,
        }
    }

    pub fn rect(&self) -> Rect {
        match self {
            DrawCommand::Fill { rect, .. } | DrawCommand::Sprite { rect, .. } => *rect,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum StatusLine {
    /// Regular play: state name and rounded world coordinates.
    Coordinates { state: PlayerState, x: i32, y: i32 },
    LevelComplete,
    EncounterPrompt,
}

impl StatusLine {
    pub fn text(&self) -> String {
        match self {
            StatusLine::Coordinates { state, x, y } => {
                format!("State: {}  |  X: {}  Y: {}", state.name(), x, y)
            }
            StatusLine::LevelComplete => "LEVEL COMPLETE!".to_string(),
            StatusLine::EncounterPrompt => "Enemy blocks the way! [F] Fight  [R] Run".to_string(),
        }
    }
}

#[derive(Clone, Debug)]
pub struct Frame {
    pub camera: f32,
    pub commands: Vec<DrawCommand>,
    pub status: StatusLine,
}

/// Fight animation placement relative to the player's draw position.
const FIGHT_OVERLAY: Rect = Rect::new(-40.0, -80.0, 180.0, 140.0);

pub fn compose(world: &World, assets: &Assets, config: &GameConfig) -> Frame {
    let p = &world.player;
    let cam = camera::offset(p.x, world.level_length, config);
    let bg_cam = camera::parallax_offset(cam, config);
    let fighting = matches!(world.fight, FightState::Fighting { .. });
    let mut commands = Vec::new();

    commands.push(DrawCommand::Fill {
        layer: Layer::Sky,
        rect: Rect::new(0.0, 0.0, config.viewport_width, config.viewport_height),
        color: world.sky,
    });

    for bg in &world.backgrounds {
        commands.push(DrawCommand::Sprite {
            layer: Layer::Background,
            sprite: bg.sprite.clone(),
            rect: Rect { x: bg.rect.x - bg_cam, ..bg.rect },
            mirrored: false,
        });
    }

    commands.push(DrawCommand::Fill {
        layer: Layer::Ground,
        rect: Rect::new(
            0.0,
            config.ground_y,
            config.viewport_width,
            config.viewport_height - config.ground_y,
        ),
        color: world.ground,
    });

    for obs in &world.obstacles {
        commands.push(DrawCommand::Sprite {
            layer: Layer::Obstacle,
            sprite: obs.sprite.clone(),
            rect: Rect { x: obs.rect.x - cam, ..obs.rect },
            mirrored: false,
        });
    }

    if !fighting {
        for enemy in world.roster.iter().filter(|e| e.is_alive()) {
            commands.push(DrawCommand::Sprite {
                layer: Layer::Enemy,
                sprite: enemy.sprite.clone(),
                rect: Rect { x: enemy.rect.x - cam, ..enemy.rect },
                mirrored: false,
            });
        }
    }

    let draw_x = p.x - cam;
    match encounter::fight_frame(&world.fight, world.clock, config, assets.fight.len()) {
        Some(frame) => commands.push(DrawCommand::Sprite {
            layer: Layer::FightOverlay,
            sprite: assets.fight[frame].clone(),
            rect: Rect::new(
                draw_x + FIGHT_OVERLAY.x,
                p.y + FIGHT_OVERLAY.y,
                FIGHT_OVERLAY.w,
                FIGHT_OVERLAY.h,
            ),
            mirrored: false,
        }),
        None => {
            let rect = if p.state == PlayerState::Crouch {
                let half = config.player_height * 0.5;
                Rect::new(draw_x, p.y + half, config.player_width, half)
            } else {
                Rect::new(draw_x, p.y, config.player_width, config.player_height)
            };
            commands.push(DrawCommand::Sprite {
                layer: Layer::Player,
                sprite: player::current_sprite(p, assets).clone(),
                rect,
                mirrored: p.facing == Facing::Left,
            });
        }
    }

    let status = match (&world.status, &world.fight) {
        (GameStatus::LevelComplete { .. }, _) => StatusLine::LevelComplete,
        (_, FightState::Prompted { .. }) => StatusLine::EncounterPrompt,
        _ => StatusLine::Coordinates {
            state: p.state,
            x: p.x.round() as i32,
            y: p.y.round() as i32,
        },
    };

    Frame {
        camera: cam,
        commands,
        status,
    }
}
