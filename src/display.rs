//! Rendering layer. All terminal I/O lives here.
//!
//! The library hands over a screen-space draw list; this module scales it to
//! the terminal grid, one coloured cell per block of world pixels.  No game
//! logic is performed here.

use std::io::Write;

use crossterm::{
    cursor,
    style::{self, Color, Print},
    terminal,
    QueueableCommand,
};
use side_scroller::config::GameConfig;
use side_scroller::entities::{Rgb, World};
use side_scroller::render::{DrawCommand, Frame, StatusLine};
use side_scroller::scheduler::Overlay;

// ── Colour palette ────────────────────────────────────────────────────────────

const C_STATUS: Color = Color::White;
const C_BANNER: Color = Color::Black;
const C_PROMPT: Color = Color::Yellow;
const C_HINT: Color = Color::DarkGrey;
const C_TITLE: Color = Color::Cyan;
const C_LOST: Color = Color::Red;
const C_WON: Color = Color::Green;

const BANNER_BG: Rgb = Rgb(240, 240, 240);

fn term_color(c: Rgb) -> Color {
    Color::Rgb {
        r: c.0,
        g: c.1,
        b: c.2,
    }
}

// ── Public entry points ───────────────────────────────────────────────────────

/// Render one gameplay frame.
pub fn render<W: Write>(out: &mut W, frame: &Frame, config: &GameConfig) -> std::io::Result<()> {
    let (width, height) = terminal::size()?;
    let rows = height.saturating_sub(2);
    out.queue(terminal::Clear(terminal::ClearType::All))?;

    let mut grid = rasterize(frame, config, width, rows);
    if frame.status == StatusLine::LevelComplete {
        grid.iter_mut().for_each(|cell| *cell = Some(BANNER_BG));
    }
    draw_grid(out, &grid, width, rows)?;

    match &frame.status {
        StatusLine::Coordinates { .. } => {
            out.queue(cursor::MoveTo(1, 0))?;
            out.queue(style::SetForegroundColor(C_STATUS))?;
            out.queue(Print(frame.status.text()))?;
        }
        StatusLine::LevelComplete => {
            out.queue(style::SetBackgroundColor(term_color(BANNER_BG)))?;
            draw_centered(out, width, 1 + rows / 2, &frame.status.text(), C_BANNER)?;
        }
        StatusLine::EncounterPrompt => {
            out.queue(style::SetBackgroundColor(Color::Black))?;
            draw_centered(out, width, 1 + rows / 2, &frame.status.text(), C_PROMPT)?;
        }
    }

    draw_controls_hint(out, height)?;

    // Cursor off the playfield
    out.queue(style::ResetColor)?;
    out.queue(cursor::MoveTo(0, height.saturating_sub(1)))?;
    out.flush()?;
    Ok(())
}

/// Render a full-screen shell overlay.
pub fn render_overlay<W: Write>(
    out: &mut W,
    overlay: &Overlay,
    world: &World,
) -> std::io::Result<()> {
    let (width, height) = terminal::size()?;
    out.queue(style::ResetColor)?;
    out.queue(terminal::Clear(terminal::ClearType::All))?;

    let level_line = format!("Level {} complete", world.level);
    let cutscene_line = match overlay {
        Overlay::Transition { asset: Some(asset) } => format!("Now playing: {}", asset),
        _ => String::new(),
    };
    let lines: Vec<(&str, Color)> = match overlay {
        Overlay::Intro => vec![
            ("╔════════════════════════╗", C_TITLE),
            ("║     APARTMENT  RUN     ║", C_TITLE),
            ("╚════════════════════════╝", C_TITLE),
            ("← → / A D : Move   ↓ : Crouch   SPACE : Jump", C_HINT),
            ("Springs launch you, water slows you, spikes send you back.", C_HINT),
            ("Enemies: [F] fight  [R] run", C_HINT),
            ("ENTER - Play   Q - Quit", Color::White),
        ],
        Overlay::Transition { .. } => vec![
            (level_line.as_str(), C_TITLE),
            (cutscene_line.as_str(), C_HINT),
            ("ENTER - Skip", Color::White),
        ],
        Overlay::Lost => vec![
            ("╔════════════════════╗", C_LOST),
            ("║     YOU  LOST      ║", C_LOST),
            ("╚════════════════════╝", C_LOST),
            ("That one could not be beaten. Running was the answer.", C_HINT),
            ("R - Play Again   Q - Quit", Color::White),
        ],
        Overlay::Won => vec![
            ("╔════════════════════╗", C_WON),
            ("║      YOU  WIN      ║", C_WON),
            ("╚════════════════════╝", C_WON),
            ("ENTER - Play Again   Q - Quit", Color::White),
        ],
    };

    let start_row = (height / 2).saturating_sub(lines.len() as u16 / 2);
    for (i, (msg, color)) in lines.iter().enumerate() {
        draw_centered(out, width, start_row + i as u16, msg, *color)?;
    }

    out.queue(style::ResetColor)?;
    out.queue(cursor::MoveTo(0, height.saturating_sub(1)))?;
    out.flush()?;
    Ok(())
}

// ── Rasterization ─────────────────────────────────────────────────────────────

/// Paint the draw list into a `width × rows` grid, sampling each command at
/// cell centres.  Transparent sprite pixels leave the cell untouched.
fn rasterize(frame: &Frame, config: &GameConfig, width: u16, rows: u16) -> Vec<Option<Rgb>> {
    let (w, h) = (width as usize, rows as usize);
    let mut grid = vec![None; w * h];
    if w == 0 || h == 0 {
        return grid;
    }
    let px_w = config.viewport_width / w as f32;
    let px_h = config.viewport_height / h as f32;

    for command in &frame.commands {
        let rect = command.rect();
        if rect.w <= 0.0 || rect.h <= 0.0 {
            continue;
        }
        let col_min = (rect.x / px_w).floor().max(0.0) as usize;
        let col_max = ((rect.right() / px_w).ceil().max(0.0) as usize).min(w);
        let row_min = (rect.y / px_h).floor().max(0.0) as usize;
        let row_max = ((rect.bottom() / px_h).ceil().max(0.0) as usize).min(h);

        for row in row_min..row_max {
            let cy = (row as f32 + 0.5) * px_h;
            if cy < rect.y || cy >= rect.bottom() {
                continue;
            }
            for col in col_min..col_max {
                let cx = (col as f32 + 0.5) * px_w;
                if cx < rect.x || cx >= rect.right() {
                    continue;
                }
                let color = match command {
                    DrawCommand::Fill { color, .. } => Some(*color),
                    DrawCommand::Sprite {
                        sprite, mirrored, ..
                    } => {
                        let mut u = (cx - rect.x) / rect.w;
                        if *mirrored {
                            u = 1.0 - u;
                        }
                        let v = (cy - rect.y) / rect.h;
                        let sx = (u * sprite.width() as f32) as u32;
                        let sy = (v * sprite.height() as f32) as u32;
                        (sprite.alpha(sx, sy) > config.alpha_threshold).then(|| sprite.tint())
                    }
                };
                if color.is_some() {
                    grid[row * w + col] = color;
                }
            }
        }
    }
    grid
}

/// Emit the grid starting at terminal row 1, batching runs of equal colour.
fn draw_grid<W: Write>(
    out: &mut W,
    grid: &[Option<Rgb>],
    width: u16,
    rows: u16,
) -> std::io::Result<()> {
    let w = width as usize;
    for row in 0..rows as usize {
        out.queue(cursor::MoveTo(0, row as u16 + 1))?;
        let cells = &grid[row * w..(row + 1) * w];
        let mut start = 0;
        while start < cells.len() {
            let color = cells[start];
            let run = cells[start..].iter().take_while(|c| **c == color).count();
            match color {
                Some(c) => out.queue(style::SetBackgroundColor(term_color(c)))?,
                None => out.queue(style::SetBackgroundColor(Color::Reset))?,
            };
            out.queue(Print(" ".repeat(run)))?;
            start += run;
        }
    }
    out.queue(style::ResetColor)?;
    Ok(())
}

fn draw_centered<W: Write>(
    out: &mut W,
    width: u16,
    row: u16,
    msg: &str,
    color: Color,
) -> std::io::Result<()> {
    let col = (width / 2).saturating_sub(msg.chars().count() as u16 / 2);
    out.queue(cursor::MoveTo(col, row))?;
    out.queue(style::SetForegroundColor(color))?;
    out.queue(Print(msg))?;
    Ok(())
}

// ── Controls hint (last row) ──────────────────────────────────────────────────

fn draw_controls_hint<W: Write>(out: &mut W, height: u16) -> std::io::Result<()> {
    out.queue(style::ResetColor)?;
    out.queue(cursor::MoveTo(1, height.saturating_sub(1)))?;
    out.queue(style::SetForegroundColor(C_HINT))?;
    out.queue(Print("← → / A D : Move   ↓ : Crouch   SPACE : Jump   F/R : Fight/Run   Q : Quit"))?;
    Ok(())
}
