use std::collections::{BTreeMap, HashSet};
use std::path::Path;

use image::{Rgba, RgbaImage};

use side_scroller::assets::*;
use side_scroller::config::GameConfig;
use side_scroller::entities::{ObstacleKind, Rgb};
use side_scroller::error::AssetError;
use side_scroller::level::LevelTable;

fn small_manifest() -> AssetManifest {
    AssetManifest {
        walk: vec!["player/walk.png".to_string()],
        jump: vec!["player/jump.png".to_string()],
        crouch: vec!["player/crouch.png".to_string()],
        fight: vec!["fight.png".to_string()],
        scenery: BTreeMap::from([
            ("bg.png".to_string(), SpriteRole::Background),
            ("spike.png".to_string(), SpriteRole::Obstacle(ObstacleKind::Spike)),
        ]),
    }
}

fn write_png(root: &Path, key: &str, pixel: [u8; 4]) {
    let path = root.join(key);
    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    RgbaImage::from_pixel(4, 3, Rgba(pixel)).save(&path).unwrap();
}

// ── Manifest ──────────────────────────────────────────────────────────────────

#[test]
fn manifest_covers_every_level_sprite() {
    let levels = LevelTable::standard(&GameConfig::default());
    let manifest = AssetManifest::for_levels(&levels);
    assert_eq!(manifest.walk.len(), 6);
    assert_eq!(manifest.jump.len(), 6);
    assert_eq!(manifest.crouch.len(), 1);
    assert_eq!(manifest.fight.len(), 3);
    for level in levels.iter() {
        for obs in &level.obstacles {
            assert_eq!(manifest.scenery.get(&obs.sprite), Some(&SpriteRole::Obstacle(obs.kind)));
        }
        for enemy in &level.enemies {
            assert_eq!(manifest.scenery.get(&enemy.sprite), Some(&SpriteRole::Enemy));
        }
    }
}

#[test]
fn manifest_paths_are_distinct() {
    let manifest = AssetManifest::for_levels(&LevelTable::standard(&GameConfig::default()));
    let paths = manifest.paths();
    let unique: HashSet<&str> = paths.iter().copied().collect();
    assert_eq!(unique.len(), paths.len());
    assert_eq!(paths[0], "sprites/player/walk/walk1.png");
}

// ── Loading ───────────────────────────────────────────────────────────────────

#[test]
fn load_decodes_every_file() {
    let dir = tempfile::tempdir().unwrap();
    let manifest = small_manifest();
    for key in manifest.paths() {
        write_png(dir.path(), key, [200, 100, 0, 255]);
    }
    let assets = Assets::load(&manifest, dir.path()).unwrap();
    assert_eq!(assets.len(), 6);
    let bg = assets.sprite("bg.png").unwrap();
    assert_eq!((bg.width(), bg.height()), (4, 3));
    assert_eq!(bg.alpha(0, 0), 255);
    assert_eq!(bg.tint(), Rgb(200, 100, 0));
    assert_eq!(assets.walk.len(), 1);
}

#[test]
fn missing_file_fails_whole_load() {
    let dir = tempfile::tempdir().unwrap();
    let manifest = small_manifest();
    for key in manifest.paths().into_iter().filter(|k| *k != "spike.png") {
        write_png(dir.path(), key, [0, 0, 0, 255]);
    }
    let err = Assets::load(&manifest, dir.path()).unwrap_err();
    assert!(matches!(err, AssetError::Io { ref path, .. } if path.ends_with("spike.png")));
}

#[test]
fn corrupt_file_fails_whole_load() {
    let dir = tempfile::tempdir().unwrap();
    let manifest = small_manifest();
    for key in manifest.paths() {
        write_png(dir.path(), key, [0, 0, 0, 255]);
    }
    std::fs::write(dir.path().join("bg.png"), b"not a png").unwrap();
    let err = Assets::load(&manifest, dir.path()).unwrap_err();
    assert!(matches!(err, AssetError::Decode { .. }));
}

#[test]
fn empty_animation_set_is_rejected() {
    let manifest = AssetManifest {
        walk: vec![],
        ..small_manifest()
    };
    assert!(matches!(
        Assets::opaque(&manifest),
        Err(AssetError::EmptyRole("walk"))
    ));
}

#[test]
fn unknown_key_is_missing() {
    let assets = Assets::opaque(&small_manifest()).unwrap();
    assert!(matches!(assets.sprite("nope.png"), Err(AssetError::Missing(_))));
}

// ── Placeholder art ───────────────────────────────────────────────────────────

#[test]
fn placeholder_covers_manifest() {
    let manifest = AssetManifest::for_levels(&LevelTable::standard(&GameConfig::default()));
    let assets = Assets::placeholder(&manifest).unwrap();
    assert_eq!(assets.len(), manifest.paths().len());
    for key in manifest.paths() {
        assert!(assets.sprite(key).is_ok(), "missing {}", key);
    }
}

#[test]
fn placeholder_is_deterministic() {
    let manifest = small_manifest();
    let a = Assets::placeholder(&manifest).unwrap();
    let b = Assets::placeholder(&manifest).unwrap();
    for key in manifest.paths() {
        assert_eq!(a.sprite(key).unwrap(), b.sprite(key).unwrap());
    }
}

#[test]
fn placeholder_has_transparent_padding() {
    let assets = Assets::placeholder(&small_manifest()).unwrap();
    let walk = &assets.walk[0];
    assert_eq!(walk.alpha(0, 0), 0);
    assert_eq!(walk.alpha(walk.width() / 2, walk.height() - 1), 255);
    let spike = assets.sprite("spike.png").unwrap();
    assert_eq!(spike.alpha(0, 0), 0);
    let bg = assets.sprite("bg.png").unwrap();
    assert_eq!(bg.alpha(0, 0), 255);
}

#[test]
fn sprite_alpha_outside_is_zero() {
    let s = Sprite::solid("s", 2, 2, Rgb(1, 2, 3));
    assert_eq!(s.alpha(1, 1), 255);
    assert_eq!(s.alpha(2, 0), 0);
    assert_eq!(s.tint(), Rgb(1, 2, 3));
    assert_eq!(s.name(), "s");
}
