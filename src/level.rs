//! Level layouts and level-to-level progression.
//!
//! Layouts are plain data: a [`LevelTable`] maps level numbers to immutable
//! [`LevelConfig`] records, so adding a level never touches simulation code.
//! A config is turned into a fresh [`World`] on every level (re)load.

use std::collections::BTreeMap;
use std::ops::Bound;
use std::path::Path;
use std::time::Duration;

use log::info;
use serde::{Deserialize, Serialize};

use crate::assets::Assets;
use crate::config::GameConfig;
use crate::entities::{
    Background, Enemy, FightState, GameStatus, Lifecycle, Obstacle, ObstacleKind, Player, Rect,
    Rgb, World,
};
use crate::error::{AssetError, ConfigError};

// ── Layout records ────────────────────────────────────────────────────────────

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BackgroundPlacement {
    pub sprite: String,
    pub rect: Rect,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ObstacleSpec {
    pub kind: ObstacleKind,
    pub sprite: String,
    pub rect: Rect,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct EnemySpec {
    pub sprite: String,
    pub rect: Rect,
    #[serde(default)]
    pub unwinnable: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Palette {
    pub sky: Rgb,
    pub ground: Rgb,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LevelConfig {
    pub number: u32,
    pub length: f32,
    pub palette: Palette,
    #[serde(default)]
    pub backgrounds: Vec<BackgroundPlacement>,
    #[serde(default)]
    pub obstacles: Vec<ObstacleSpec>,
    #[serde(default)]
    pub enemies: Vec<EnemySpec>,
    /// Asset id of the cutscene shown after this level, if any.
    #[serde(default)]
    pub transition: Option<String>,
}

// ── Level table ───────────────────────────────────────────────────────────────

/// Ordered, non-empty lookup from level number to layout.
#[derive(Clone, Debug, PartialEq)]
pub struct LevelTable {
    levels: BTreeMap<u32, LevelConfig>,
}

impl LevelTable {
    pub fn new(levels: Vec<LevelConfig>) -> Result<Self, ConfigError> {
        if levels.is_empty() {
            return Err(ConfigError::NoLevels);
        }
        Ok(Self {
            levels: levels.into_iter().map(|l| (l.number, l)).collect(),
        })
    }

    /// Parse a RON list of level configs.
    pub fn from_ron_str(source: &str) -> Result<Self, ConfigError> {
        let levels: Vec<LevelConfig> = ron::from_str(source)?;
        Self::new(levels)
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let source = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_ron_str(&source)
    }

    pub fn first(&self) -> &LevelConfig {
        // `new` rejects empty tables.
        self.levels.values().next().expect("level table is never empty")
    }

    pub fn get(&self, number: u32) -> Option<&LevelConfig> {
        self.levels.get(&number)
    }

    pub fn next_after(&self, number: u32) -> Option<&LevelConfig> {
        self.levels
            .range((Bound::Excluded(number), Bound::Unbounded))
            .next()
            .map(|(_, level)| level)
    }

    pub fn iter(&self) -> impl Iterator<Item = &LevelConfig> {
        self.levels.values()
    }

    pub fn len(&self) -> usize {
        self.levels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.levels.is_empty()
    }

    /// The three built-in levels: apartment, street, park.
    pub fn standard(config: &GameConfig) -> Self {
        let floor = |above: f32| config.ground_y - above + config.floor_offset;
        let width = config.viewport_width;
        let obstacle = |kind, sprite: &str, x, above, w, h| ObstacleSpec {
            kind,
            sprite: sprite.to_string(),
            rect: Rect::new(x, floor(above), w, h),
        };

        let level1 = LevelConfig {
            number: 1,
            length: width * 2.0,
            palette: Palette {
                sky: Rgb(0xe8, 0xd2, 0xb0),
                ground: Rgb(0x64, 0x32, 0x00),
            },
            backgrounds: place(&[
                ("sprites/background/level1/1plant.png", [80.0, 355.0, 45.0, 65.0]),
                ("sprites/background/level1/2schrankgross.png", [230.0, 300.0, 110.0, 120.0]),
                ("sprites/background/level1/3guitar.png", [370.0, 350.0, 40.0, 70.0]),
                ("sprites/background/level1/4drawing.png", [520.0, 280.0, 70.0, 70.0]),
                ("sprites/background/level1/5lamp.png", [600.0, 360.0, 45.0, 60.0]),
                ("sprites/background/level1/6window.png", [680.0, 250.0, 140.0, 140.0]),
                ("sprites/background/level1/7schrank.png", [870.0, 350.0, 50.0, 70.0]),
                ("sprites/background/level1/8vinyl.png", [955.0, 360.0, 60.0, 60.0]),
            ]),
            obstacles: vec![
                obstacle(ObstacleKind::Spike, "sprites/obstacles/level1/spikes/spike1.png", 340.0, 50.0, 100.0, 80.0),
                obstacle(ObstacleKind::Spring, "sprites/obstacles/level1/spring/spring1.png", 720.0, 22.0, 40.0, 28.0),
                obstacle(ObstacleKind::Rotating, "sprites/obstacles/level1/rotating/rotating1.png", 1000.0, 70.0, 100.0, 100.0),
                obstacle(ObstacleKind::Water, "sprites/obstacles/level1/water/water1.png", 770.0, 80.0, 120.0, 120.0),
            ],
            enemies: vec![EnemySpec {
                sprite: "sprites/enemies/level1/enemy1.png".to_string(),
                rect: Rect::new(width * 2.0 - 120.0, floor(90.0), 90.0, 115.0),
                unwinnable: false,
            }],
            transition: Some("level1to2.mp4".to_string()),
        };

        let level2 = LevelConfig {
            number: 2,
            length: width * 3.0,
            palette: Palette {
                sky: Rgb(0xb8, 0xea, 0xff),
                ground: Rgb(0x3e, 0x69, 0x39),
            },
            backgrounds: place(&[
                ("sprites/background/level2/bg1.png", [100.0, 330.0, 80.0, 80.0]),
                ("sprites/background/level2/bg2.png", [500.0, 290.0, 110.0, 110.0]),
            ]),
            obstacles: vec![
                obstacle(ObstacleKind::Spring, "sprites/obstacles/level1/spring/spring1.png", 380.0, 22.0, 40.0, 28.0),
                obstacle(ObstacleKind::Water, "sprites/obstacles/level1/water/water1.png", 600.0, 80.0, 120.0, 120.0),
                obstacle(ObstacleKind::Spike, "sprites/obstacles/level1/spikes/spike1.png", 950.0, 50.0, 100.0, 80.0),
                obstacle(ObstacleKind::Rotating, "sprites/obstacles/level1/rotating/rotating1.png", 1250.0, 70.0, 120.0, 100.0),
            ],
            enemies: vec![EnemySpec {
                sprite: "sprites/enemies/level2/enemy1.png".to_string(),
                rect: Rect::new(width * 3.0 - 100.0, floor(100.0), 100.0, 120.0),
                unwinnable: false,
            }],
            transition: Some("level2to3.mp4".to_string()),
        };

        let level3 = LevelConfig {
            number: 3,
            length: width * 4.0,
            palette: Palette {
                sky: Rgb(0x34, 0x98, 0xdb),
                ground: Rgb(0x8b, 0x45, 0x13),
            },
            backgrounds: place(&[
                ("sprites/background/level3/baumback1.png", [150.0, 345.0, 50.0, 80.0]),
                ("sprites/background/level3/baummid1.png", [150.0, 322.0, 100.0, 100.0]),
                ("sprites/background/level3/baumfront1.png", [270.0, 310.0, 90.0, 120.0]),
                ("sprites/background/level3/baumfront1.png", [200.0, 310.0, 90.0, 120.0]),
                ("sprites/background/level3/baumfront1.png", [250.0, 310.0, 90.0, 120.0]),
                ("sprites/background/level3/buschback1.png", [700.0, 340.0, 80.0, 80.0]),
                ("sprites/background/level3/buschmid1.png", [700.0, 320.0, 90.0, 120.0]),
                ("sprites/background/level3/buschfront1.png", [700.0, 340.0, 80.0, 80.0]),
                ("sprites/background/level3/buschfront2.png", [700.0, 320.0, 90.0, 120.0]),
                ("sprites/background/level3/baummid2.png", [700.0, 310.0, 90.0, 120.0]),
                ("sprites/background/level3/baumfront2.png", [700.0, 340.0, 80.0, 80.0]),
                ("sprites/background/level3/baumfront3.png", [700.0, 310.0, 90.0, 120.0]),
                ("sprites/background/level3/buschback2.png", [700.0, 310.0, 90.0, 120.0]),
                ("sprites/background/level3/buschmid2.png", [700.0, 340.0, 80.0, 80.0]),
                ("sprites/background/level3/buschfront3.png", [700.0, 340.0, 80.0, 80.0]),
                ("sprites/background/level3/buschfront4.png", [700.0, 320.0, 90.0, 120.0]),
                ("sprites/background/level3/baummid3.png", [700.0, 340.0, 80.0, 80.0]),
                ("sprites/background/level3/baumfront4.png", [700.0, 340.0, 80.0, 80.0]),
                ("sprites/background/level3/buschfront5.png", [700.0, 340.0, 80.0, 80.0]),
                ("sprites/background/level3/buschfront6.png", [700.0, 340.0, 80.0, 80.0]),
                ("sprites/background/level3/bankfront.png", [50.0, 340.0, 80.0, 80.0]),
                ("sprites/background/level3/buben.png", [1000.0, 320.0, 90.0, 120.0]),
                ("sprites/background/level3/dogfront.png", [1050.0, 340.0, 80.0, 80.0]),
            ]),
            obstacles: vec![
                obstacle(ObstacleKind::Spike, "sprites/obstacles/level3/muell1.png", 200.0, 60.0, 45.0, 80.0),
                obstacle(ObstacleKind::Spike, "sprites/obstacles/level3/muell2.png", 650.0, 50.0, 55.0, 100.0),
                obstacle(ObstacleKind::Spike, "sprites/obstacles/level3/muell3.png", 1000.0, 50.0, 55.0, 100.0),
            ],
            enemies: vec![EnemySpec {
                sprite: "sprites/enemies/level3/enemy1.png".to_string(),
                rect: Rect::new(width * 4.0 - 150.0, floor(110.0), 120.0, 130.0),
                unwinnable: true,
            }],
            transition: None,
        };

        Self {
            levels: [level1, level2, level3]
                .into_iter()
                .map(|l| (l.number, l))
                .collect(),
        }
    }
}

fn place(entries: &[(&str, [f32; 4])]) -> Vec<BackgroundPlacement> {
    entries
        .iter()
        .map(|(sprite, [x, y, w, h])| BackgroundPlacement {
            sprite: sprite.to_string(),
            rect: Rect::new(*x, *y, *w, *h),
        })
        .collect()
}

// ── Level instances ───────────────────────────────────────────────────────────

/// A fresh instance of `level`: player at spawn, every enemy alive, no
/// encounter, empty mask caches.
pub fn build_world(
    level: &LevelConfig,
    assets: &Assets,
    config: &GameConfig,
) -> Result<World, AssetError> {
    let backgrounds = level
        .backgrounds
        .iter()
        .map(|b| {
            Ok(Background {
                sprite: assets.sprite(&b.sprite)?,
                rect: b.rect,
            })
        })
        .collect::<Result<Vec<_>, AssetError>>()?;
    let obstacles = level
        .obstacles
        .iter()
        .map(|o| Ok(Obstacle::new(o.kind, o.rect, assets.sprite(&o.sprite)?)))
        .collect::<Result<Vec<_>, AssetError>>()?;
    let roster = level
        .enemies
        .iter()
        .enumerate()
        .map(|(i, e)| {
            Ok(Enemy {
                id: i as u32,
                rect: e.rect,
                sprite: assets.sprite(&e.sprite)?,
                unwinnable: e.unwinnable,
                lifecycle: Lifecycle::Alive,
            })
        })
        .collect::<Result<Vec<_>, AssetError>>()?;

    info!(
        "level {} loaded: length {}, {} obstacles, {} enemies",
        level.number,
        level.length,
        obstacles.len(),
        roster.len()
    );

    Ok(World {
        player: Player::spawn(config.spawn_x, config.ground_rest_y()),
        obstacles,
        roster,
        backgrounds,
        fight: FightState::None,
        status: GameStatus::Playing,
        level: level.number,
        level_length: level.length,
        sky: level.palette.sky,
        ground: level.palette.ground,
        transition: level.transition.clone(),
        clock: Duration::ZERO,
        frame: 0,
    })
}

/// The player has reached the end margin and no tracked enemy is alive.
pub fn is_complete(world: &World, config: &GameConfig) -> bool {
    let reached = world.player.x + config.player_width >= world.level_length - config.end_margin;
    reached && world.roster.iter().all(|e| !e.is_alive())
}

/// Freeze the level once it is complete.
pub fn check_completion(mut world: World, config: &GameConfig) -> World {
    if world.status == GameStatus::Playing && !world.fight.is_active() && is_complete(&world, config)
    {
        info!("level {} complete", world.level);
        world.status = GameStatus::LevelComplete {
            transition: world.transition.clone(),
            completed_at: world.clock,
        };
    }
    world
}

/// Move past a completed level: load the next one, or finish the game when
/// there is none.  Any other status is returned unchanged.
pub fn acknowledge(
    world: &World,
    levels: &LevelTable,
    assets: &Assets,
    config: &GameConfig,
) -> Result<World, AssetError> {
    if !matches!(world.status, GameStatus::LevelComplete { .. }) {
        return Ok(world.clone());
    }
    match levels.next_after(world.level) {
        Some(next) => build_world(next, assets, config),
        None => {
            info!("all {} levels complete", levels.len());
            Ok(World {
                status: GameStatus::Won,
                ..world.clone()
            })
        }
    }
}

/// Start over from the first level.
pub fn restart(
    levels: &LevelTable,
    assets: &Assets,
    config: &GameConfig,
) -> Result<World, AssetError> {
    build_world(levels.first(), assets, config)
}
