//! Frame scheduling, overlays and timers.
//!
//! The scheduler owns the one `World` value and runs one simulation step per
//! display refresh.  Each step is triggered by a [`FrameTicket`] and hands
//! back the ticket for the next refresh, the way a re-arming animation-frame
//! callback works.  Tickets and timers carry the generation they were issued
//! in; suspending, resuming or tearing down bumps the generation, so a stale
//! ticket or timer is a no-op.

use std::time::Duration;

use log::{info, warn};

use crate::assets::Assets;
use crate::compute;
use crate::config::GameConfig;
use crate::entities::{GameStatus, World};
use crate::error::AssetError;
use crate::input::InputState;
use crate::level::{self, LevelTable};
use crate::render::{self, Frame};

/// Full-screen shell screens.  The simulation is suspended while one is up.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Overlay {
    Intro,
    Transition { asset: Option<String> },
    Lost,
    Won,
}

/// Discrete signals for the surrounding shell.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SchedulerEvent {
    LevelComplete { level: u32, transition: Option<String> },
    EncounterResolved { level: u32 },
    Lost { level: u32 },
    Won,
}

/// Permission to run exactly one step.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FrameTicket {
    generation: u64,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum TimerKind {
    /// Post-completion pause is over; show the transition.
    ShowTransition,
    /// The transition has played out.
    EndTransition,
}

#[derive(Clone, Copy, Debug)]
struct Timer {
    due: Duration,
    generation: u64,
    kind: TimerKind,
}

pub struct FrameScheduler {
    world: World,
    levels: LevelTable,
    assets: Assets,
    config: GameConfig,
    input: InputState,
    live: bool,
    generation: u64,
    overlay: Option<Overlay>,
    timers: Vec<Timer>,
    events: Vec<SchedulerEvent>,
    last_step: Option<Duration>,
}

impl FrameScheduler {
    /// Build the first level and wait behind the intro overlay.
    pub fn new(config: GameConfig, levels: LevelTable, assets: Assets) -> Result<Self, AssetError> {
        let world = level::restart(&levels, &assets, &config)?;
        Ok(Self {
            world,
            levels,
            assets,
            config,
            input: InputState::default(),
            live: true,
            generation: 0,
            overlay: Some(Overlay::Intro),
            timers: Vec::new(),
            events: Vec::new(),
            last_step: None,
        })
    }

    pub fn world(&self) -> &World {
        &self.world
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn overlay(&self) -> Option<&Overlay> {
        self.overlay.as_ref()
    }

    pub fn is_live(&self) -> bool {
        self.live
    }

    /// The input snapshot the next step will read.  Written by the input
    /// handler between steps.
    pub fn input_mut(&mut self) -> &mut InputState {
        &mut self.input
    }

    pub fn drain_events(&mut self) -> Vec<SchedulerEvent> {
        std::mem::take(&mut self.events)
    }

    /// Read-only draw list for the current world.
    pub fn frame(&self) -> Frame {
        render::compose(&self.world, &self.assets, &self.config)
    }

    fn arm(&self) -> FrameTicket {
        FrameTicket {
            generation: self.generation,
        }
    }

    fn is_current(&self, generation: u64) -> bool {
        self.live && generation == self.generation
    }

    /// Run one step for `ticket` at wall time `now`.  Returns the ticket for
    /// the next refresh, or `None` when the loop stops (stale ticket,
    /// teardown, or an overlay took over).
    pub fn on_frame(&mut self, ticket: FrameTicket, now: Duration) -> Option<FrameTicket> {
        if !self.is_current(ticket.generation) {
            warn!("discarding stale frame ticket {}", ticket.generation);
            return None;
        }
        if self.overlay.is_some() {
            return None;
        }

        let dt = self.last_step.map_or(Duration::ZERO, |last| now.saturating_sub(last));
        self.last_step = Some(now);

        let before = self.world.clone();
        self.world = compute::step(&before, &self.input, dt, &self.config, &self.assets);
        self.input.consume_one_shots();

        let level = self.world.level;
        if before.fight.is_active()
            && !self.world.fight.is_active()
            && self.world.status == GameStatus::Playing
        {
            self.events.push(SchedulerEvent::EncounterResolved { level });
        }
        if before.status != self.world.status {
            match &self.world.status {
                GameStatus::LevelComplete { transition, .. } => {
                    self.events.push(SchedulerEvent::LevelComplete {
                        level,
                        transition: transition.clone(),
                    });
                    self.timers.push(Timer {
                        due: now + self.config.completion_pause(),
                        generation: self.generation,
                        kind: TimerKind::ShowTransition,
                    });
                }
                GameStatus::Lost => {
                    self.events.push(SchedulerEvent::Lost { level });
                    self.suspend(Overlay::Lost, now);
                    return None;
                }
                GameStatus::Playing | GameStatus::Won => {}
            }
        }

        Some(self.arm())
    }

    /// Fire every due timer.  Returns a ticket when a timer resumed the loop.
    pub fn poll_timers(&mut self, now: Duration) -> Result<Option<FrameTicket>, AssetError> {
        let (due, pending): (Vec<Timer>, Vec<Timer>) =
            self.timers.drain(..).partition(|t| t.due <= now);
        self.timers = pending;

        let mut resumed = None;
        for timer in due {
            if !self.is_current(timer.generation) {
                warn!("discarding stale {:?} timer", timer.kind);
                continue;
            }
            match timer.kind {
                TimerKind::ShowTransition => {
                    let asset = match &self.world.status {
                        GameStatus::LevelComplete { transition, .. } => transition.clone(),
                        _ => continue,
                    };
                    self.suspend(Overlay::Transition { asset }, now);
                }
                TimerKind::EndTransition => {
                    if matches!(self.overlay, Some(Overlay::Transition { .. })) {
                        resumed = self.dismiss_overlay(now)?;
                    }
                }
            }
        }
        Ok(resumed)
    }

    /// Acknowledge the current overlay (play, skip, retry).  Returns the
    /// ticket that restarts the loop, or `None` when nothing resumed.
    pub fn dismiss_overlay(&mut self, now: Duration) -> Result<Option<FrameTicket>, AssetError> {
        if !self.live {
            return Ok(None);
        }
        let Some(overlay) = self.overlay.take() else {
            return Ok(None);
        };
        match overlay {
            Overlay::Intro | Overlay::Lost | Overlay::Won => {
                info!("starting from level {}", self.levels.first().number);
                self.world = level::restart(&self.levels, &self.assets, &self.config)?;
            }
            Overlay::Transition { .. } => {
                self.world =
                    level::acknowledge(&self.world, &self.levels, &self.assets, &self.config)?;
                if self.world.status == GameStatus::Won {
                    self.events.push(SchedulerEvent::Won);
                    self.suspend(Overlay::Won, now);
                    return Ok(None);
                }
            }
        }
        Ok(Some(self.resume(now)))
    }

    fn suspend(&mut self, overlay: Overlay, now: Duration) {
        self.generation += 1;
        if matches!(overlay, Overlay::Transition { .. }) {
            self.timers.push(Timer {
                due: now + self.config.transition_duration(),
                generation: self.generation,
                kind: TimerKind::EndTransition,
            });
        }
        self.overlay = Some(overlay);
    }

    fn resume(&mut self, now: Duration) -> FrameTicket {
        self.generation += 1;
        self.overlay = None;
        self.input = InputState::default();
        self.last_step = Some(now);
        self.arm()
    }

    /// Stop the loop for good.  Outstanding tickets and timers become no-ops.
    pub fn teardown(&mut self) {
        self.live = false;
        self.generation += 1;
        self.timers.clear();
    }
}
