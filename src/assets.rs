//! Preloaded sprite provider.
//!
//! Every sprite a game session can reference is listed in an
//! [`AssetManifest`] and loaded up front.  Loading is all-or-nothing: the
//! first file that fails to read or decode aborts the load.

use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::path::Path;
use std::rc::Rc;

use log::{debug, info};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::entities::{ObstacleKind, Rgb};
use crate::error::AssetError;
use crate::level::LevelTable;

pub type SpriteHandle = Rc<Sprite>;

// ── Sprite ────────────────────────────────────────────────────────────────────

/// A decoded RGBA8 image.
#[derive(Clone, PartialEq)]
pub struct Sprite {
    name: String,
    width: u32,
    height: u32,
    rgba: Vec<u8>,
    tint: Rgb,
}

impl fmt::Debug for Sprite {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Sprite")
            .field("name", &self.name)
            .field("width", &self.width)
            .field("height", &self.height)
            .finish()
    }
}

impl Sprite {
    /// `rgba` must hold exactly `width * height * 4` bytes.
    pub fn from_rgba(name: impl Into<String>, width: u32, height: u32, rgba: Vec<u8>) -> Self {
        debug_assert_eq!(rgba.len(), (width * height * 4) as usize);
        let tint = mean_opaque_color(&rgba);
        Self {
            name: name.into(),
            width,
            height,
            rgba,
            tint,
        }
    }

    /// A fully opaque single-colour sprite.
    pub fn solid(name: impl Into<String>, width: u32, height: u32, color: Rgb) -> Self {
        let pixel = [color.0, color.1, color.2, 255];
        let rgba = pixel.repeat((width * height) as usize);
        Self::from_rgba(name, width, height, rgba)
    }

    pub fn decode(name: impl Into<String>, bytes: &[u8]) -> Result<Self, image::ImageError> {
        let rgba = image::load_from_memory(bytes)?.to_rgba8();
        let (width, height) = rgba.dimensions();
        Ok(Self::from_rgba(name, width, height, rgba.into_raw()))
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Mean colour of the opaque pixels, used by coarse renderers.
    pub fn tint(&self) -> Rgb {
        self.tint
    }

    /// Alpha at a source pixel; out-of-range reads are transparent.
    pub fn alpha(&self, x: u32, y: u32) -> u8 {
        if x >= self.width || y >= self.height {
            return 0;
        }
        self.rgba[((y * self.width + x) * 4 + 3) as usize]
    }
}

fn mean_opaque_color(rgba: &[u8]) -> Rgb {
    let (mut r, mut g, mut b, mut n) = (0u64, 0u64, 0u64, 0u64);
    for px in rgba.chunks_exact(4).filter(|px| px[3] > 0) {
        r += px[0] as u64;
        g += px[1] as u64;
        b += px[2] as u64;
        n += 1;
    }
    if n == 0 {
        return Rgb::default();
    }
    Rgb((r / n) as u8, (g / n) as u8, (b / n) as u8)
}

// ── Manifest ──────────────────────────────────────────────────────────────────

/// What a scenery sprite is used for.  Only consulted when generating
/// placeholder art.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SpriteRole {
    Background,
    Obstacle(ObstacleKind),
    Enemy,
}

const PLAYER_WALK_PATHS: [&str; 6] = [
    "sprites/player/walk/walk1.png",
    "sprites/player/walk/walk2.png",
    "sprites/player/walk/walk3.png",
    "sprites/player/walk/walk4.png",
    "sprites/player/walk/walk5.png",
    "sprites/player/walk/walk6.png",
];
const PLAYER_JUMP_PATHS: [&str; 6] = [
    "sprites/player/jump/jump1.png",
    "sprites/player/jump/jump2.png",
    "sprites/player/jump/jump3.png",
    "sprites/player/jump/jump4.png",
    "sprites/player/jump/jump5.png",
    "sprites/player/jump/jump6.png",
];
const PLAYER_CROUCH_PATHS: [&str; 1] = ["sprites/player/crouch/crouch1.png"];
const FIGHT_PATHS: [&str; 3] = [
    "sprites/fight/fight1.png",
    "sprites/fight/fight2.png",
    "sprites/fight/fight3.png",
];

/// Every sprite path a session needs, grouped by role.  Paths are relative
/// to the asset root and double as lookup keys.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct AssetManifest {
    pub walk: Vec<String>,
    pub jump: Vec<String>,
    pub crouch: Vec<String>,
    pub fight: Vec<String>,
    pub scenery: BTreeMap<String, SpriteRole>,
}

impl AssetManifest {
    /// The standard player/fight animation sets plus every sprite the level
    /// table references.
    pub fn for_levels(levels: &LevelTable) -> Self {
        let mut scenery = BTreeMap::new();
        for level in levels.iter() {
            for bg in &level.backgrounds {
                scenery.insert(bg.sprite.clone(), SpriteRole::Background);
            }
            for obs in &level.obstacles {
                scenery.insert(obs.sprite.clone(), SpriteRole::Obstacle(obs.kind));
            }
            for enemy in &level.enemies {
                scenery.insert(enemy.sprite.clone(), SpriteRole::Enemy);
            }
        }
        Self {
            walk: owned(&PLAYER_WALK_PATHS),
            jump: owned(&PLAYER_JUMP_PATHS),
            crouch: owned(&PLAYER_CROUCH_PATHS),
            fight: owned(&FIGHT_PATHS),
            scenery,
        }
    }

    /// All distinct paths, animation sets first.
    pub fn paths(&self) -> Vec<&str> {
        let mut out: Vec<&str> = Vec::new();
        let animated = self.walk.iter().chain(&self.jump).chain(&self.crouch).chain(&self.fight);
        for path in animated.chain(self.scenery.keys()) {
            if !out.contains(&path.as_str()) {
                out.push(path.as_str());
            }
        }
        out
    }
}

fn owned(paths: &[&str]) -> Vec<String> {
    paths.iter().map(|p| p.to_string()).collect()
}

// ── Asset set ─────────────────────────────────────────────────────────────────

/// Preloaded drawable handles grouped by role.
#[derive(Clone, Debug)]
pub struct Assets {
    sprites: HashMap<String, SpriteHandle>,
    pub walk: Vec<SpriteHandle>,
    pub jump: Vec<SpriteHandle>,
    pub crouch: Vec<SpriteHandle>,
    pub fight: Vec<SpriteHandle>,
}

impl Assets {
    /// Read and decode every manifest entry under `root`.
    pub fn load(manifest: &AssetManifest, root: &Path) -> Result<Self, AssetError> {
        let mut sprites = HashMap::new();
        for key in manifest.paths() {
            let path = root.join(key);
            let bytes = std::fs::read(&path).map_err(|source| AssetError::Io {
                path: path.clone(),
                source,
            })?;
            let sprite =
                Sprite::decode(key, &bytes).map_err(|source| AssetError::Decode { path, source })?;
            sprites.insert(key.to_string(), Rc::new(sprite));
        }
        info!("loaded {} sprites from {}", sprites.len(), root.display());
        Self::assemble(manifest, sprites)
    }

    /// Procedural stand-in art with transparent padding, so the pixel test
    /// behaves as it would with the real sprites.  Colours come from an RNG
    /// seeded by the sprite path and are stable between runs.
    pub fn placeholder(manifest: &AssetManifest) -> Result<Self, AssetError> {
        Self::generate(manifest, |path, role| {
            let mut rng = StdRng::seed_from_u64(path_seed(path));
            let base = match role {
                Role::Walk | Role::Jump | Role::Crouch => Rgb(230, 90, 60),
                Role::Fight => Rgb(250, 220, 60),
                Role::Scenery(SpriteRole::Enemy) => Rgb(120, 40, 160),
                Role::Scenery(SpriteRole::Obstacle(ObstacleKind::Water)) => Rgb(40, 120, 220),
                Role::Scenery(SpriteRole::Obstacle(ObstacleKind::Spring)) => Rgb(90, 200, 90),
                Role::Scenery(SpriteRole::Obstacle(_)) => Rgb(150, 150, 150),
                Role::Scenery(SpriteRole::Background) => Rgb(160, 120, 80),
            };
            let mut jitter = |c: u8| c.saturating_add_signed(rng.gen_range(-24i8..=24));
            let color = Rgb(jitter(base.0), jitter(base.1), jitter(base.2));
            silhouette(path, role, color)
        })
    }

    /// Every sprite fully opaque: collisions then match bounding boxes.
    pub fn opaque(manifest: &AssetManifest) -> Result<Self, AssetError> {
        Self::generate(manifest, |path, _| Sprite::solid(path, 8, 8, Rgb(200, 200, 200)))
    }

    fn generate(
        manifest: &AssetManifest,
        mut make: impl FnMut(&str, Role) -> Sprite,
    ) -> Result<Self, AssetError> {
        let mut sprites = HashMap::new();
        let sets = [
            (&manifest.walk, Role::Walk),
            (&manifest.jump, Role::Jump),
            (&manifest.crouch, Role::Crouch),
            (&manifest.fight, Role::Fight),
        ];
        for (paths, role) in sets {
            for path in paths {
                sprites.insert(path.clone(), Rc::new(make(path, role)));
            }
        }
        for (path, role) in &manifest.scenery {
            sprites
                .entry(path.clone())
                .or_insert_with(|| Rc::new(make(path, Role::Scenery(*role))));
        }
        debug!("generated {} placeholder sprites", sprites.len());
        Self::assemble(manifest, sprites)
    }

    fn assemble(
        manifest: &AssetManifest,
        sprites: HashMap<String, SpriteHandle>,
    ) -> Result<Self, AssetError> {
        let set = |paths: &[String], role: &'static str| -> Result<Vec<SpriteHandle>, AssetError> {
            if paths.is_empty() {
                return Err(AssetError::EmptyRole(role));
            }
            paths
                .iter()
                .map(|p| sprites.get(p).cloned().ok_or_else(|| AssetError::Missing(p.clone())))
                .collect()
        };
        Ok(Self {
            walk: set(&manifest.walk, "walk")?,
            jump: set(&manifest.jump, "jump")?,
            crouch: set(&manifest.crouch, "crouch")?,
            fight: set(&manifest.fight, "fight")?,
            sprites,
        })
    }

    pub fn sprite(&self, key: &str) -> Result<SpriteHandle, AssetError> {
        self.sprites
            .get(key)
            .cloned()
            .ok_or_else(|| AssetError::Missing(key.to_string()))
    }

    pub fn len(&self) -> usize {
        self.sprites.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sprites.is_empty()
    }
}

// ── Placeholder art ───────────────────────────────────────────────────────────

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Role {
    Walk,
    Jump,
    Crouch,
    Fight,
    Scenery(SpriteRole),
}

const PLACEHOLDER_SIZE: u32 = 32;

fn path_seed(path: &str) -> u64 {
    // FNV-1a
    path.bytes()
        .fold(0xcbf2_9ce4_8422_2325, |h, b| (h ^ b as u64).wrapping_mul(0x0100_0000_01b3))
}

fn silhouette(path: &str, role: Role, color: Rgb) -> Sprite {
    let n = PLACEHOLDER_SIZE;
    let half = n as f32 / 2.0;
    let opaque = |x: u32, y: u32| -> bool {
        let (fx, fy) = (x as f32 + 0.5, y as f32 + 0.5);
        match role {
            // Body with transparent side padding and headroom.
            Role::Walk | Role::Jump | Role::Crouch | Role::Scenery(SpriteRole::Enemy) => {
                x >= n / 5 && x < n - n / 5 && y >= n / 10
            }
            Role::Fight => (fx - half).hypot(fy - half) <= half,
            Role::Scenery(SpriteRole::Obstacle(ObstacleKind::Spike)) => {
                // Three teeth.
                let tooth = n as f32 / 3.0;
                let local = fx % tooth;
                let peak = 1.0 - (local - tooth / 2.0).abs() / (tooth / 2.0);
                n as f32 - fy <= peak * n as f32
            }
            Role::Scenery(SpriteRole::Obstacle(ObstacleKind::Rotating)) => {
                (fx - half).hypot(fy - half) <= half * 0.9
            }
            Role::Scenery(SpriteRole::Obstacle(ObstacleKind::Water)) => y >= n / 3,
            Role::Scenery(SpriteRole::Obstacle(ObstacleKind::Spring))
            | Role::Scenery(SpriteRole::Background) => true,
        }
    };
    let mut rgba = Vec::with_capacity((n * n * 4) as usize);
    for y in 0..n {
        for x in 0..n {
            let a = if opaque(x, y) { 255 } else { 0 };
            rgba.extend_from_slice(&[color.0, color.1, color.2, a]);
        }
    }
    Sprite::from_rgba(path, n, n, rgba)
}
