use std::time::Duration;

use side_scroller::assets::{AssetManifest, Assets};
use side_scroller::config::GameConfig;
use side_scroller::entities::*;
use side_scroller::input::Command;
use side_scroller::level::{EnemySpec, LevelConfig, LevelTable, Palette};
use side_scroller::scheduler::*;

fn ms(n: u64) -> Duration {
    Duration::from_millis(n)
}

/// Levels short enough that the spawn point already counts as the end.
fn short_level(number: u32, transition: Option<&str>) -> LevelConfig {
    LevelConfig {
        number,
        length: 100.0,
        palette: Palette {
            sky: Rgb(0, 0, 0),
            ground: Rgb(1, 1, 1),
        },
        backgrounds: vec![],
        obstacles: vec![],
        enemies: vec![],
        transition: transition.map(str::to_string),
    }
}

fn make_scheduler(levels: Vec<LevelConfig>) -> FrameScheduler {
    let config = GameConfig::default();
    let levels = LevelTable::new(levels).unwrap();
    let assets = Assets::opaque(&AssetManifest::for_levels(&levels)).unwrap();
    FrameScheduler::new(config, levels, assets).unwrap()
}

fn two_short_levels() -> FrameScheduler {
    make_scheduler(vec![short_level(1, Some("cut.mp4")), short_level(2, None)])
}

fn start(s: &mut FrameScheduler) -> FrameTicket {
    s.dismiss_overlay(ms(0)).unwrap().expect("intro dismissal resumes")
}

// ── Start-up and overlays ─────────────────────────────────────────────────────

#[test]
fn starts_behind_intro() {
    let s = two_short_levels();
    assert_eq!(s.overlay(), Some(&Overlay::Intro));
    assert_eq!(s.world().level, 1);
    assert!(s.is_live());
}

#[test]
fn dismissing_intro_starts_the_loop() {
    let mut s = two_short_levels();
    let ticket = start(&mut s);
    assert_eq!(s.overlay(), None);
    assert!(s.on_frame(ticket, ms(16)).is_some());
    assert_eq!(s.world().frame, 1);
}

#[test]
fn dismiss_without_overlay_does_nothing() {
    let mut s = two_short_levels();
    start(&mut s);
    assert!(s.dismiss_overlay(ms(5)).unwrap().is_none());
}

// ── Level completion flow ─────────────────────────────────────────────────────

#[test]
fn completion_pauses_then_shows_transition() {
    let mut s = two_short_levels();
    let ticket = start(&mut s);
    let ticket = s.on_frame(ticket, ms(16)).unwrap();
    assert!(matches!(s.world().status, GameStatus::LevelComplete { .. }));
    assert_eq!(
        s.drain_events(),
        vec![SchedulerEvent::LevelComplete {
            level: 1,
            transition: Some("cut.mp4".to_string())
        }]
    );

    // Frozen, still on screen during the pause.
    assert!(s.poll_timers(ms(500)).unwrap().is_none());
    assert_eq!(s.overlay(), None);

    assert!(s.poll_timers(ms(1016)).unwrap().is_none());
    assert_eq!(
        s.overlay(),
        Some(&Overlay::Transition {
            asset: Some("cut.mp4".to_string())
        })
    );

    // The pre-suspension ticket is stale now.
    assert!(s.on_frame(ticket, ms(1032)).is_none());
}

#[test]
fn skipping_transition_loads_next_level() {
    let mut s = two_short_levels();
    let ticket = start(&mut s);
    s.on_frame(ticket, ms(16));
    s.poll_timers(ms(1016)).unwrap();

    let resumed = s.dismiss_overlay(ms(1500)).unwrap();
    assert!(resumed.is_some());
    assert_eq!(s.overlay(), None);
    assert_eq!(s.world().level, 2);
    assert_eq!(s.world().status, GameStatus::Playing);
}

#[test]
fn transition_ends_on_its_own() {
    let mut s = two_short_levels();
    let ticket = start(&mut s);
    s.on_frame(ticket, ms(16));
    s.poll_timers(ms(1016)).unwrap();

    assert!(s.poll_timers(ms(3000)).unwrap().is_none());
    let resumed = s.poll_timers(ms(1016 + 4000)).unwrap();
    assert!(resumed.is_some());
    assert_eq!(s.world().level, 2);
}

#[test]
fn skipped_transition_timer_is_discarded() {
    let mut long = short_level(2, None);
    long.length = 1600.0;
    let mut s = make_scheduler(vec![short_level(1, Some("cut.mp4")), long]);
    let ticket = start(&mut s);
    s.on_frame(ticket, ms(16));
    s.poll_timers(ms(1016)).unwrap();
    let ticket = s.dismiss_overlay(ms(1500)).unwrap().unwrap();

    // The end-of-transition timer from the skipped overlay must not fire.
    let ticket = s.on_frame(ticket, ms(1516));
    assert!(ticket.is_some());
    assert!(s.poll_timers(ms(1016 + 4000)).unwrap().is_none());
    assert_eq!(s.overlay(), None);
    assert_eq!(s.world().level, 2);
    assert_eq!(s.world().status, GameStatus::Playing);
}

#[test]
fn finishing_last_level_wins() {
    let mut s = two_short_levels();
    let t = start(&mut s);
    s.on_frame(t, ms(16));
    s.poll_timers(ms(1016)).unwrap();
    let t = s.dismiss_overlay(ms(1100)).unwrap().unwrap();

    // Level 2 completes on its first step as well.
    s.on_frame(t, ms(1116));
    s.poll_timers(ms(2116)).unwrap();
    assert_eq!(s.overlay(), Some(&Overlay::Transition { asset: None }));
    s.drain_events();

    assert!(s.dismiss_overlay(ms(2200)).unwrap().is_none());
    assert_eq!(s.overlay(), Some(&Overlay::Won));
    assert_eq!(s.world().status, GameStatus::Won);
    assert_eq!(s.drain_events(), vec![SchedulerEvent::Won]);

    // Play again from the top.
    assert!(s.dismiss_overlay(ms(2300)).unwrap().is_some());
    assert_eq!(s.world().level, 1);
    assert_eq!(s.world().status, GameStatus::Playing);
}

// ── Encounters ────────────────────────────────────────────────────────────────

fn guarded_level(unwinnable: bool) -> FrameScheduler {
    let config = GameConfig::default();
    let mut level = short_level(1, None);
    level.length = 1600.0;
    level.enemies.push(EnemySpec {
        sprite: "enemy.png".to_string(),
        rect: Rect::new(80.0, config.ground_rest_y(), 90.0, 84.0),
        unwinnable,
    });
    make_scheduler(vec![level])
}

#[test]
fn one_shot_commands_are_consumed() {
    let mut s = guarded_level(false);
    let t = start(&mut s);
    let t = s.on_frame(t, ms(16)).unwrap();
    assert_eq!(s.world().fight, FightState::Prompted { enemy: 0 });

    s.input_mut().set(Command::Flee, true);
    s.on_frame(t, ms(32)).unwrap();
    assert!(!s.input_mut().flee);
    assert_eq!(s.world().roster[0].lifecycle, Lifecycle::Escaped);
    assert_eq!(
        s.drain_events(),
        vec![SchedulerEvent::EncounterResolved { level: 1 }]
    );
}

#[test]
fn losing_suspends_behind_overlay() {
    let mut s = guarded_level(true);
    let t = start(&mut s);
    let t = s.on_frame(t, ms(16)).unwrap();

    s.input_mut().set(Command::Fight, true);
    assert!(s.on_frame(t, ms(32)).is_none());
    assert_eq!(s.overlay(), Some(&Overlay::Lost));
    assert_eq!(s.world().status, GameStatus::Lost);
    assert_eq!(s.drain_events(), vec![SchedulerEvent::Lost { level: 1 }]);
    assert!(s.on_frame(t, ms(48)).is_none());

    // Retry restarts the first level.
    assert!(s.dismiss_overlay(ms(100)).unwrap().is_some());
    assert_eq!(s.world().status, GameStatus::Playing);
    assert!(s.world().roster[0].is_alive());
}

// ── Teardown ──────────────────────────────────────────────────────────────────

#[test]
fn teardown_cancels_everything() {
    let mut s = two_short_levels();
    let t = start(&mut s);
    s.on_frame(t, ms(16));
    s.teardown();

    assert!(!s.is_live());
    assert!(s.on_frame(t, ms(32)).is_none());
    assert!(s.poll_timers(ms(10_000)).unwrap().is_none());
    assert_eq!(s.overlay(), None);
    assert!(s.dismiss_overlay(ms(10_000)).unwrap().is_none());
}

#[test]
fn frame_reflects_world() {
    let mut s = two_short_levels();
    let t = start(&mut s);
    s.on_frame(t, ms(16));
    let frame = s.frame();
    assert_eq!(frame.camera, 0.0);
    assert!(!frame.commands.is_empty());
}
