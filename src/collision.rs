//! Two-phase collision detection against static obstacles.
//!
//! The broad phase is a strict rectangle overlap test.  Only when it passes
//! are the alpha masks of both sprites compared, and only over the
//! intersection of the two rectangles.  A contact is confirmed where both
//! masks exceed the alpha threshold at the same absolute pixel, so
//! transparent padding around a sprite never collides.

use log::debug;

use crate::assets::Sprite;
use crate::config::GameConfig;
use crate::entities::{Obstacle, ObstacleKind, Player, PlayerState, Rect};

// ── Alpha mask ────────────────────────────────────────────────────────────────

/// The alpha channel of a sprite rasterized at its draw size.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AlphaMask {
    width: u32,
    height: u32,
    alpha: Vec<u8>,
}

impl AlphaMask {
    /// Nearest-neighbour scale of the sprite's alpha to `w × h` pixels.
    pub fn rasterize(sprite: &Sprite, w: f32, h: f32) -> Self {
        let width = w.round().max(0.0) as u32;
        let height = h.round().max(0.0) as u32;
        let mut alpha = Vec::with_capacity((width * height) as usize);
        for y in 0..height {
            let sy = (y as u64 * sprite.height() as u64 / height as u64) as u32;
            for x in 0..width {
                let sx = (x as u64 * sprite.width() as u64 / width as u64) as u32;
                alpha.push(sprite.alpha(sx, sy));
            }
        }
        Self {
            width,
            height,
            alpha,
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Alpha at a local pixel; anything outside the mask is transparent.
    pub fn alpha(&self, x: i64, y: i64) -> u8 {
        if x < 0 || y < 0 || x >= self.width as i64 || y >= self.height as i64 {
            return 0;
        }
        self.alpha[(y as u32 * self.width + x as u32) as usize]
    }
}

// ── Narrow phase ──────────────────────────────────────────────────────────────

/// Pixel-accurate test between two placed masks.  Returns `false` without
/// reading either mask when the rectangles do not overlap.
pub fn pixel_collision(
    a: &Rect,
    a_mask: &AlphaMask,
    b: &Rect,
    b_mask: &AlphaMask,
    threshold: u8,
) -> bool {
    let Some(region) = a.intersection(b) else {
        return false;
    };
    let mut y = region.y;
    while y < region.bottom() {
        let mut x = region.x;
        while x < region.right() {
            let a_alpha = a_mask.alpha((x - a.x).floor() as i64, (y - a.y).floor() as i64);
            let b_alpha = b_mask.alpha((x - b.x).floor() as i64, (y - b.y).floor() as i64);
            if a_alpha > threshold && b_alpha > threshold {
                return true;
            }
            x += 1.0;
        }
        y += 1.0;
    }
    false
}

// ── Player hitbox ─────────────────────────────────────────────────────────────

/// The player's collision box.  Crouching halves the height and moves the
/// box down so the feet stay in place.
pub fn player_hitbox(player: &Player, config: &GameConfig) -> Rect {
    if player.state == PlayerState::Crouch {
        let half = config.player_height * 0.5;
        Rect::new(player.x, player.y + half, config.player_width, half)
    } else {
        Rect::new(player.x, player.y, config.player_width, config.player_height)
    }
}

/// The standing box, used for enemy overlap regardless of crouching.
pub fn player_body(player: &Player, config: &GameConfig) -> Rect {
    Rect::new(player.x, player.y, config.player_width, config.player_height)
}

// ── Resolution ────────────────────────────────────────────────────────────────

/// What happened to the player this frame.
#[derive(Clone, Debug, PartialEq)]
pub struct CollisionOutcome {
    pub player: Player,
    /// Horizontal speed is reduced for this frame only.
    pub slowed: bool,
    /// Index and kind of the obstacle that was resolved, if any.
    pub resolved: Option<(usize, ObstacleKind)>,
}

/// True when, between the previous and the current position, the foot line
/// moved down across the spring's top edge.
pub fn spring_triggered(player: &Player, spring: &Rect, config: &GameConfig) -> bool {
    let foot = player.y + config.player_height;
    let prev_foot = player.prev_y + config.player_height;
    let top = spring.y;
    player.vy >= 0.0 && prev_foot <= top && top <= foot
}

/// Test the player against every obstacle in order and apply the first
/// qualifying resolution.  `sprite` is the player's current animation frame.
pub fn resolve(
    player: &Player,
    obstacles: &[Obstacle],
    sprite: &Sprite,
    config: &GameConfig,
) -> CollisionOutcome {
    let hitbox = player_hitbox(player, config);
    let mut player_mask: Option<AlphaMask> = None;

    for (index, obstacle) in obstacles.iter().enumerate() {
        if obstacle.kind == ObstacleKind::Spring {
            // Springs skip the pixel test: crossing the top edge is enough.
            if hitbox.overlaps_horizontally(&obstacle.rect)
                && spring_triggered(player, &obstacle.rect, config)
            {
                debug!("spring at x={} launches player", obstacle.rect.x);
                let launched = Player {
                    y: obstacle.rect.y - config.player_height,
                    vy: config.spring_jump_speed,
                    state: PlayerState::Jump,
                    ..player.clone()
                };
                return CollisionOutcome {
                    player: launched,
                    slowed: false,
                    resolved: Some((index, obstacle.kind)),
                };
            }
            continue;
        }

        if !hitbox.overlaps(&obstacle.rect) {
            continue;
        }
        let mask = player_mask
            .get_or_insert_with(|| AlphaMask::rasterize(sprite, hitbox.w, hitbox.h));
        if !pixel_collision(&hitbox, mask, &obstacle.rect, obstacle.mask(), config.alpha_threshold)
        {
            continue;
        }

        match obstacle.kind {
            ObstacleKind::Spike | ObstacleKind::Rotating => {
                debug!("hazard {:?} at x={} resets player", obstacle.kind, obstacle.rect.x);
                let rest = config.ground_rest_y();
                let reset = Player {
                    x: config.spawn_x,
                    y: rest,
                    prev_y: rest,
                    vy: 0.0,
                    ..player.clone()
                };
                return CollisionOutcome {
                    player: reset,
                    slowed: false,
                    resolved: Some((index, obstacle.kind)),
                };
            }
            ObstacleKind::Water => {
                return CollisionOutcome {
                    player: player.clone(),
                    slowed: true,
                    resolved: Some((index, obstacle.kind)),
                };
            }
            ObstacleKind::Spring => continue,
        }
    }

    CollisionOutcome {
        player: player.clone(),
        slowed: false,
        resolved: None,
    }
}
