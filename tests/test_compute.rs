use std::time::Duration;

use side_scroller::assets::{AssetManifest, Assets};
use side_scroller::compute::step;
use side_scroller::config::GameConfig;
use side_scroller::entities::*;
use side_scroller::input::InputState;
use side_scroller::level::{build_world, restart, LevelConfig, LevelTable, ObstacleSpec, Palette};

const DT: Duration = Duration::from_millis(16);

fn make_world() -> (World, Assets, GameConfig) {
    let config = GameConfig::default();
    let levels = LevelTable::standard(&config);
    let assets = Assets::opaque(&AssetManifest::for_levels(&levels)).unwrap();
    let world = restart(&levels, &assets, &config).unwrap();
    (world, assets, config)
}

fn right() -> InputState {
    InputState {
        move_right: true,
        ..InputState::default()
    }
}

/// A level with one obstacle and nothing else.
fn world_with(kind: ObstacleKind, rect: Rect) -> (World, Assets, GameConfig) {
    let config = GameConfig::default();
    let level = LevelConfig {
        number: 1,
        length: 1600.0,
        palette: Palette {
            sky: Rgb(0, 0, 0),
            ground: Rgb(1, 1, 1),
        },
        backgrounds: vec![],
        obstacles: vec![ObstacleSpec {
            kind,
            sprite: "obstacle.png".to_string(),
            rect,
        }],
        enemies: vec![],
        transition: None,
    };
    let table = LevelTable::new(vec![level.clone()]).unwrap();
    let assets = Assets::opaque(&AssetManifest::for_levels(&table)).unwrap();
    let world = build_world(&level, &assets, &config).unwrap();
    (world, assets, config)
}

// ── Bookkeeping ───────────────────────────────────────────────────────────────

#[test]
fn step_advances_clock_and_frame() {
    let (w, assets, config) = make_world();
    let next = step(&w, &InputState::default(), DT, &config, &assets);
    assert_eq!(next.clock, DT);
    assert_eq!(next.frame, 1);
    // Input is not mutated, the old world is untouched.
    assert_eq!(w.frame, 0);
}

#[test]
fn idle_step_changes_nothing_else() {
    let (w, assets, config) = make_world();
    let next = step(&w, &InputState::default(), DT, &config, &assets);
    assert_eq!(next.player, w.player);
    assert_eq!(next.fight, FightState::None);
    assert_eq!(next.status, GameStatus::Playing);
}

#[test]
fn won_world_is_frozen() {
    let (mut w, assets, config) = make_world();
    w.status = GameStatus::Won;
    let next = step(&w, &right(), DT, &config, &assets);
    assert_eq!(next.player, w.player);
    assert_eq!(next.frame, w.frame);
}

// ── Movement through the level ────────────────────────────────────────────────

#[test]
fn walking_into_first_spike_resets_to_spawn() {
    let (mut w, assets, config) = make_world();
    for _ in 0..48 {
        w = step(&w, &right(), DT, &config, &assets);
    }
    assert_eq!(w.player.x, 290.0);
    assert_eq!(w.player.state, PlayerState::Walk);

    // 290 + 52 reaches into the spike at 340.
    w = step(&w, &right(), DT, &config, &assets);
    assert_eq!(w.player.x, 55.0);
    assert_eq!(w.player.y, 381.0);
}

#[test]
fn water_slows_for_one_frame_only() {
    let (mut w, assets, config) = world_with(ObstacleKind::Water, Rect::new(-100.0, 381.0, 106.0, 84.0));
    w.player.x = 5.0;
    let w1 = step(&w, &right(), DT, &config, &assets);
    assert_eq!(w1.player.x, 7.5);
    let w2 = step(&w1, &right(), DT, &config, &assets);
    assert_eq!(w2.player.x, 12.5);
}

#[test]
fn landing_on_spring_launches_high() {
    let (mut w, assets, config) = world_with(ObstacleKind::Spring, Rect::new(100.0, 423.0, 40.0, 28.0));
    // Foot line 2px above the spring top, falling at 5px/frame.
    w.player.x = 100.0;
    w.player.y = 423.0 - 84.0 - 2.0;
    w.player.vy = 5.0;
    w.player.state = PlayerState::Jump;
    let w1 = step(&w, &InputState::default(), DT, &config, &assets);
    // Integration crossed the top; the spring fires on the next step.
    assert_eq!(w1.player.prev_y, 337.0);
    assert_eq!(w1.player.y, 342.0);
    let w2 = step(&w1, &InputState::default(), DT, &config, &assets);
    assert_eq!(w2.player.state, PlayerState::Jump);
    assert_eq!(w2.player.prev_y, 339.0);
    assert_eq!(w2.player.y, 339.0 - 18.0);
    assert_eq!(w2.player.vy, -17.5);
}

#[test]
fn jump_lands_back_on_ground() {
    let (mut w, assets, config) = make_world();
    let jump = InputState {
        jump: true,
        ..InputState::default()
    };
    w = step(&w, &jump, DT, &config, &assets);
    assert_eq!(w.player.state, PlayerState::Jump);
    assert!(w.player.y < 381.0);
    for _ in 0..60 {
        w = step(&w, &InputState::default(), DT, &config, &assets);
    }
    assert_eq!(w.player.y, 381.0);
    assert_eq!(w.player.state, PlayerState::Idle);
}

#[test]
fn reaching_the_end_completes_level() {
    let (mut w, assets, config) = make_world();
    w.roster[0].lifecycle = Lifecycle::Defeated;
    w.player.x = 1535.0;
    w = step(&w, &right(), DT, &config, &assets);
    assert_eq!(w.player.x, 1540.0);
    assert_eq!(
        w.status,
        GameStatus::LevelComplete {
            transition: Some("level1to2.mp4".to_string()),
            completed_at: DT,
        }
    );
}
