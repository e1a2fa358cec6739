//! Logical input commands.
//!
//! Physical keys are decoded exactly once, here, into the fixed command set
//! the simulation understands.  Movement commands are level-triggered (held);
//! `fight` and `flee` are one-shot and are cleared after the step that
//! consumes them.

use crossterm::event::KeyCode;

use crate::entities::Facing;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Command {
    MoveLeft,
    MoveRight,
    Crouch,
    Jump,
    Fight,
    Flee,
}

impl Command {
    pub fn is_one_shot(&self) -> bool {
        matches!(self, Command::Fight | Command::Flee)
    }
}

/// Map a raw key to its command, if it has one.
pub fn decode_key(code: &KeyCode) -> Option<Command> {
    match code {
        KeyCode::Left | KeyCode::Char('a') | KeyCode::Char('A') => Some(Command::MoveLeft),
        KeyCode::Right | KeyCode::Char('d') | KeyCode::Char('D') => Some(Command::MoveRight),
        KeyCode::Down | KeyCode::Char('s') | KeyCode::Char('S') => Some(Command::Crouch),
        KeyCode::Char(' ') | KeyCode::Up | KeyCode::Char('w') | KeyCode::Char('W') => {
            Some(Command::Jump)
        }
        KeyCode::Char('f') | KeyCode::Char('F') => Some(Command::Fight),
        KeyCode::Char('r') | KeyCode::Char('R') => Some(Command::Flee),
        _ => None,
    }
}

/// Snapshot of the logical commands for one step.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct InputState {
    pub move_left: bool,
    pub move_right: bool,
    pub crouch: bool,
    pub jump: bool,
    pub fight: bool,
    pub flee: bool,
}

impl InputState {
    pub fn set(&mut self, command: Command, active: bool) {
        match command {
            Command::MoveLeft => self.move_left = active,
            Command::MoveRight => self.move_right = active,
            Command::Crouch => self.crouch = active,
            Command::Jump => self.jump = active,
            Command::Fight => self.fight = active,
            Command::Flee => self.flee = active,
        }
    }

    /// Requested horizontal direction.  Left wins when both are held.
    pub fn horizontal(&self) -> Option<Facing> {
        if self.move_left {
            Some(Facing::Left)
        } else if self.move_right {
            Some(Facing::Right)
        } else {
            None
        }
    }

    /// Clear the one-shot commands once a step has seen them.
    pub fn consume_one_shots(&mut self) {
        self.fight = false;
        self.flee = false;
    }
}
