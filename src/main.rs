mod display;

use std::collections::HashMap;
use std::io::{stdout, BufWriter, Write};
use std::path::Path;
use std::sync::mpsc;
use std::thread;
use std::time::{Duration, Instant};

use anyhow::Context;
use crossterm::{
    cursor,
    event::{
        self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers, KeyboardEnhancementFlags,
        PopKeyboardEnhancementFlags, PushKeyboardEnhancementFlags,
    },
    terminal, ExecutableCommand,
};
use env_logger::Env;
use log::{info, warn};

use side_scroller::assets::{AssetManifest, Assets};
use side_scroller::config::GameConfig;
use side_scroller::input::{decode_key, Command};
use side_scroller::level::LevelTable;
use side_scroller::scheduler::{FrameScheduler, FrameTicket, Overlay};

const FRAME: Duration = Duration::from_millis(16); // ≈60 FPS

const CONFIG_PATH: &str = "side_scroller.ron";
const LEVELS_PATH: &str = "levels.ron";

// ── Held-key tracking ─────────────────────────────────────────────────────────

/// A command counts as held if its key was seen within this many frames.
/// Classic terminals only send repeated `Press` events; 8 frames @ 60 FPS
/// (≈133 ms) outlasts the OS repeat interval.
const HOLD_WINDOW: u64 = 8;

const HELD_COMMANDS: [Command; 4] = [
    Command::MoveLeft,
    Command::MoveRight,
    Command::Crouch,
    Command::Jump,
];

fn is_held(key_frame: &HashMap<Command, u64>, command: &Command, frame: u64) -> bool {
    key_frame
        .get(command)
        .map(|&last| frame.saturating_sub(last) <= HOLD_WINDOW)
        .unwrap_or(false)
}

fn is_quit(code: &KeyCode, modifiers: KeyModifiers) -> bool {
    match code {
        KeyCode::Char('q') | KeyCode::Char('Q') | KeyCode::Esc => true,
        KeyCode::Char('c') => modifiers.contains(KeyModifiers::CONTROL),
        _ => false,
    }
}

fn dismisses(overlay: &Overlay, code: &KeyCode) -> bool {
    match code {
        KeyCode::Enter | KeyCode::Char(' ') => true,
        KeyCode::Char('r') | KeyCode::Char('R') => *overlay == Overlay::Lost,
        _ => false,
    }
}

// ── Startup ───────────────────────────────────────────────────────────────────

fn load_config() -> GameConfig {
    let path = Path::new(CONFIG_PATH);
    if !path.exists() {
        return GameConfig::default();
    }
    match GameConfig::load(path) {
        Ok(config) => {
            info!("loaded config from {}", CONFIG_PATH);
            config
        }
        Err(err) => {
            warn!("ignoring {}: {}; using defaults", CONFIG_PATH, err);
            GameConfig::default()
        }
    }
}

fn load_levels(config: &GameConfig) -> anyhow::Result<LevelTable> {
    let path = Path::new(LEVELS_PATH);
    if path.exists() {
        LevelTable::load(path).with_context(|| format!("reading {}", LEVELS_PATH))
    } else {
        Ok(LevelTable::standard(config))
    }
}

/// Decode the art pack under the directory given as the first argument, or
/// fall back to generated placeholder art.
fn load_assets(manifest: &AssetManifest) -> anyhow::Result<Assets> {
    match std::env::args_os().nth(1) {
        Some(root) => {
            let root = Path::new(&root);
            Assets::load(manifest, root)
                .with_context(|| format!("loading sprites from {}", root.display()))
        }
        None => Ok(Assets::placeholder(manifest)?),
    }
}

// ── Game loop ─────────────────────────────────────────────────────────────────

/// Drives the scheduler until the player quits.
///
/// Input model: held commands are tracked in `key_frame` (command → frame the
/// key was last seen) and written into the scheduler's input snapshot once
/// per frame.  Fight and flee are one-shot and written on press.  While an
/// overlay is up, keys only dismiss it.
fn run<W: Write>(
    out: &mut W,
    rx: &mpsc::Receiver<Event>,
    scheduler: &mut FrameScheduler,
) -> anyhow::Result<()> {
    let start = Instant::now();
    let mut key_frame: HashMap<Command, u64> = HashMap::new();
    let mut ticket: Option<FrameTicket> = None;
    let mut frame: u64 = 0;

    loop {
        let frame_start = Instant::now();
        let now = start.elapsed();
        frame += 1;

        // ── Drain all pending input events (non-blocking) ─────────────────────
        while let Ok(event) = rx.try_recv() {
            let Event::Key(KeyEvent {
                code,
                kind,
                modifiers,
                ..
            }) = event
            else {
                continue;
            };
            match kind {
                KeyEventKind::Press => {
                    if is_quit(&code, modifiers) {
                        return Ok(());
                    }
                    if let Some(overlay) = scheduler.overlay() {
                        if dismisses(overlay, &code) {
                            if let Some(resumed) = scheduler.dismiss_overlay(now)? {
                                ticket = Some(resumed);
                                key_frame.clear();
                            }
                        }
                        continue;
                    }
                    match decode_key(&code) {
                        Some(command) if command.is_one_shot() => {
                            scheduler.input_mut().set(command, true);
                        }
                        Some(command) => {
                            key_frame.insert(command, frame);
                        }
                        None => {}
                    }
                }
                KeyEventKind::Repeat => {
                    if let Some(command) = decode_key(&code).filter(|c| !c.is_one_shot()) {
                        key_frame.insert(command, frame);
                    }
                }
                KeyEventKind::Release => {
                    if let Some(command) = decode_key(&code) {
                        key_frame.remove(&command);
                    }
                }
            }
        }

        if scheduler.overlay().is_none() {
            let input = scheduler.input_mut();
            for command in HELD_COMMANDS {
                input.set(command, is_held(&key_frame, &command, frame));
            }
        }

        if let Some(resumed) = scheduler.poll_timers(now)? {
            ticket = Some(resumed);
        }
        if let Some(current) = ticket.take() {
            ticket = scheduler.on_frame(current, now);
        }
        for event in scheduler.drain_events() {
            info!("{:?}", event);
        }

        match scheduler.overlay() {
            Some(overlay) => display::render_overlay(out, overlay, scheduler.world())?,
            None => display::render(out, &scheduler.frame(), scheduler.config())?,
        }

        let elapsed = frame_start.elapsed();
        if elapsed < FRAME {
            thread::sleep(FRAME - elapsed);
        }
    }
}

// ── Entry point ───────────────────────────────────────────────────────────────

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(Env::default().default_filter_or("warn")).init();

    let config = load_config();
    let levels = load_levels(&config)?;
    let assets = load_assets(&AssetManifest::for_levels(&levels))?;
    let mut scheduler = FrameScheduler::new(config, levels, assets)?;

    let mut out = BufWriter::new(stdout());

    terminal::enable_raw_mode()?;
    out.execute(terminal::EnterAlternateScreen)?;
    out.execute(cursor::Hide)?;

    // Key-release events where the terminal supports them; others fall back
    // to the hold window.
    let keyboard_enhanced = out
        .execute(PushKeyboardEnhancementFlags(
            KeyboardEnhancementFlags::REPORT_EVENT_TYPES,
        ))
        .is_ok();

    let (tx, rx) = mpsc::channel::<Event>();
    thread::spawn(move || {
        while let Ok(ev) = event::read() {
            if tx.send(ev).is_err() {
                break; // receiver dropped → program exiting
            }
        }
    });

    let result = run(&mut out, &rx, &mut scheduler);
    scheduler.teardown();

    // Always restore the terminal
    if keyboard_enhanced {
        let _ = out.execute(PopKeyboardEnhancementFlags);
    }
    let _ = out.execute(cursor::Show);
    let _ = out.execute(terminal::LeaveAlternateScreen);
    let _ = terminal::disable_raw_mode();

    result
}
