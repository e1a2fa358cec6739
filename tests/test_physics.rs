use side_scroller::config::GameConfig;
use side_scroller::entities::*;
use side_scroller::input::InputState;
use side_scroller::physics::{integrate, is_grounded};
use side_scroller::player::apply_input;

fn standing() -> (Player, GameConfig) {
    let config = GameConfig::default();
    (Player::spawn(50.0, config.ground_rest_y()), config)
}

// ── integrate ─────────────────────────────────────────────────────────────────

#[test]
fn gravity_applies_after_position_update() {
    let (mut p, config) = standing();
    p.y -= 50.0;
    let p1 = integrate(&p, false, &config);
    assert_eq!(p1.y, p.y); // vy was 0
    assert_eq!(p1.vy, 0.5);
    let p2 = integrate(&p1, false, &config);
    assert_eq!(p2.y, p.y + 0.5);
    assert_eq!(p2.vy, 1.0);
}

#[test]
fn integrate_records_previous_y() {
    let (mut p, config) = standing();
    p.y = 300.0;
    p.vy = 4.0;
    let next = integrate(&p, false, &config);
    assert_eq!(next.prev_y, 300.0);
    assert_eq!(next.y, 304.0);
}

#[test]
fn standing_player_stays_on_ground() {
    let (p, config) = standing();
    let next = integrate(&p, false, &config);
    assert_eq!(next.y, 381.0);
    assert_eq!(next.vy, 0.0);
    assert!(is_grounded(&next, &config));
}

#[test]
fn landing_clamps_and_zeroes_velocity() {
    let (mut p, config) = standing();
    p.y = config.ground_rest_y() - 1.0;
    p.vy = 5.0;
    p.state = PlayerState::Jump;
    let next = integrate(&p, false, &config);
    assert_eq!(next.y, config.ground_rest_y());
    assert_eq!(next.vy, 0.0);
    assert_eq!(next.state, PlayerState::Idle);
}

#[test]
fn landing_while_moving_resolves_to_walk() {
    let (mut p, config) = standing();
    p.y = config.ground_rest_y() - 1.0;
    p.vy = 5.0;
    p.state = PlayerState::Jump;
    let next = integrate(&p, true, &config);
    assert_eq!(next.state, PlayerState::Walk);
}

#[test]
fn airborne_player_is_not_grounded() {
    let (mut p, config) = standing();
    p.y -= 0.5;
    assert!(!is_grounded(&p, &config));
}

// ── Full jump arc ─────────────────────────────────────────────────────────────

#[test]
fn jump_arc_returns_to_ground() {
    let (p, config) = standing();
    let jump = InputState {
        jump: true,
        ..InputState::default()
    };
    let mut p = apply_input(&p, &jump, config.player_speed, 1600.0, &config);
    assert_eq!(p.vy, -11.0);

    let mut apex = p.y;
    let mut frames = 0;
    loop {
        p = integrate(&p, false, &config);
        apex = apex.min(p.y);
        frames += 1;
        if p.state != PlayerState::Jump || frames > 100 {
            break;
        }
    }
    assert!(frames <= 60, "jump took {} frames", frames);
    assert_eq!(p.y, config.ground_rest_y());
    assert_eq!(p.state, PlayerState::Idle);
    // 11 + 10.5 + … + 0.5 = 126.5
    assert!((config.ground_rest_y() - apex - 126.5).abs() < 1e-3);
}
