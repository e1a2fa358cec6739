//! All simulation entity types: pure data, no logic.

use std::cell::OnceCell;
use std::rc::Rc;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::assets::SpriteHandle;
use crate::collision::AlphaMask;

// ── Geometry ──────────────────────────────────────────────────────────────────

/// Axis-aligned rectangle in world pixels.  The y axis points down.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub w: f32,
    pub h: f32,
}

impl Rect {
    pub const fn new(x: f32, y: f32, w: f32, h: f32) -> Self {
        Self { x, y, w, h }
    }

    pub fn right(&self) -> f32 {
        self.x + self.w
    }

    pub fn bottom(&self) -> f32 {
        self.y + self.h
    }

    /// Strict overlap test.  Rectangles that merely touch (zero-area
    /// intersection) do not overlap.
    pub fn overlaps(&self, other: &Rect) -> bool {
        self.x < other.right()
            && other.x < self.right()
            && self.y < other.bottom()
            && other.y < self.bottom()
    }

    pub fn overlaps_horizontally(&self, other: &Rect) -> bool {
        self.x < other.right() && other.x < self.right()
    }

    /// The shared region of two rectangles, or `None` when it has no area.
    pub fn intersection(&self, other: &Rect) -> Option<Rect> {
        let x_min = self.x.max(other.x);
        let y_min = self.y.max(other.y);
        let x_max = self.right().min(other.right());
        let y_max = self.bottom().min(other.bottom());
        if x_min >= x_max || y_min >= y_max {
            return None;
        }
        Some(Rect::new(x_min, y_min, x_max - x_min, y_max - y_min))
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rgb(pub u8, pub u8, pub u8);

// ── Player ────────────────────────────────────────────────────────────────────

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PlayerState {
    Idle,
    Walk,
    Jump,
    Crouch,
}

impl PlayerState {
    pub fn name(&self) -> &'static str {
        match self {
            PlayerState::Idle => "idle",
            PlayerState::Walk => "walk",
            PlayerState::Jump => "jump",
            PlayerState::Crouch => "crouch",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Facing {
    Left,
    Right,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Player {
    pub x: f32,
    pub y: f32,
    pub vy: f32,
    /// `y` before the most recent gravity integration.  The spring test
    /// compares the foot line at both positions.
    pub prev_y: f32,
    pub state: PlayerState,
    pub facing: Facing,
    pub walk_frame: usize,
    /// Simulation time of the last walk frame advance.
    pub walk_timer: Duration,
    pub jump_frame: usize,
    /// Simulation time of the last jump frame advance.
    pub jump_timer: Duration,
}

impl Player {
    /// A player standing idle at `(x, ground_rest_y)`.
    pub fn spawn(x: f32, ground_rest_y: f32) -> Self {
        Self {
            x,
            y: ground_rest_y,
            vy: 0.0,
            prev_y: ground_rest_y,
            state: PlayerState::Idle,
            facing: Facing::Right,
            walk_frame: 0,
            walk_timer: Duration::ZERO,
            jump_frame: 0,
            jump_timer: Duration::ZERO,
        }
    }
}

// ── Obstacles ─────────────────────────────────────────────────────────────────

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ObstacleKind {
    #[serde(alias = "spikes")]
    Spike,
    Rotating,
    #[serde(alias = "springs")]
    Spring,
    Water,
}

impl ObstacleKind {
    pub fn is_hazard(&self) -> bool {
        matches!(self, ObstacleKind::Spike | ObstacleKind::Rotating)
    }
}

/// Alpha buffer shared between clones of the same obstacle.  Filled on first
/// narrow-phase use and kept until the level is rebuilt.
pub type MaskCache = Rc<OnceCell<AlphaMask>>;

#[derive(Clone, Debug)]
pub struct Obstacle {
    pub kind: ObstacleKind,
    pub rect: Rect,
    pub sprite: SpriteHandle,
    pub mask: MaskCache,
}

impl Obstacle {
    pub fn new(kind: ObstacleKind, rect: Rect, sprite: SpriteHandle) -> Self {
        Self {
            kind,
            rect,
            sprite,
            mask: Rc::new(OnceCell::new()),
        }
    }

    /// Alpha mask of the sprite at its draw size, rasterized on first call.
    pub fn mask(&self) -> &AlphaMask {
        self.mask
            .get_or_init(|| AlphaMask::rasterize(&self.sprite, self.rect.w, self.rect.h))
    }

    pub fn is_mask_cached(&self) -> bool {
        self.mask.get().is_some()
    }
}

// ── Enemies ───────────────────────────────────────────────────────────────────

pub type EnemyId = u32;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Lifecycle {
    Alive,
    Defeated,
    Escaped,
}

#[derive(Clone, Debug)]
pub struct Enemy {
    pub id: EnemyId,
    pub rect: Rect,
    pub sprite: SpriteHandle,
    /// Fighting this enemy loses the game; fleeing is the only way past.
    pub unwinnable: bool,
    pub lifecycle: Lifecycle,
}

impl Enemy {
    pub fn is_alive(&self) -> bool {
        self.lifecycle == Lifecycle::Alive
    }
}

// ── Encounter ─────────────────────────────────────────────────────────────────

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum FightState {
    #[default]
    None,
    /// Gameplay frozen, waiting for a fight or flee command.
    Prompted { enemy: EnemyId },
    /// Scripted fight animation running since `started_at` (simulation time).
    Fighting { enemy: EnemyId, started_at: Duration },
}

impl FightState {
    pub fn is_active(&self) -> bool {
        !matches!(self, FightState::None)
    }
}

// ── Background ────────────────────────────────────────────────────────────────

#[derive(Clone, Debug)]
pub struct Background {
    pub sprite: SpriteHandle,
    pub rect: Rect,
}

// ── Master state ──────────────────────────────────────────────────────────────

#[derive(Clone, Debug, PartialEq)]
pub enum GameStatus {
    Playing,
    /// Simulation frozen until the shell acknowledges the transition.
    LevelComplete {
        transition: Option<String>,
        completed_at: Duration,
    },
    /// Terminal: the player fought an unwinnable enemy.
    Lost,
    /// Every level in the table has been completed and acknowledged.
    Won,
}

/// The entire simulation state of one level instance.  Cloneable so the
/// step function can return a new copy without mutating the original.
#[derive(Clone, Debug)]
pub struct World {
    pub player: Player,
    pub obstacles: Vec<Obstacle>,
    pub roster: Vec<Enemy>,
    pub backgrounds: Vec<Background>,
    pub fight: FightState,
    pub status: GameStatus,
    pub level: u32,
    pub level_length: f32,
    pub sky: Rgb,
    pub ground: Rgb,
    pub transition: Option<String>,
    /// Simulation time elapsed in this level instance.
    pub clock: Duration,
    pub frame: u64,
}

impl World {
    pub fn enemy(&self, id: EnemyId) -> Option<&Enemy> {
        self.roster.iter().find(|e| e.id == id)
    }

    pub fn enemy_mut(&mut self, id: EnemyId) -> Option<&mut Enemy> {
        self.roster.iter_mut().find(|e| e.id == id)
    }
}
