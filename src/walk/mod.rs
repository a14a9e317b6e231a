//! Walk controller: locomotion animation sequencing plus window movement.
//!
//! A walk is a Start clip chained into an unbounded run of Loop clips while a
//! recurring timer nudges the character window every tick. Every continuation
//! captures a generation token at issuance; bumping the token on start/stop
//! makes superseded callbacks fall through harmlessly, so overlapping key
//! presses can never interleave two animation chains.

#[cfg(test)]
mod tests;

use std::cell::RefCell;
use std::rc::Rc;
use std::time::Duration;

use log::debug;

use crate::config::WalkConfig;
use crate::host::{AnimationHost, ClipSelector, Mood, MoodSource, Phase, WindowMover};
use crate::input::Direction;
use crate::sched::{Scheduler, TimerId};

/// Which way the character sprite faces.
///
/// Updated only by horizontal walks and kept across stops, so a climb after a
/// leftward walk still uses the left-facing clip variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Facing {
    #[default]
    Left,
    Right,
}

impl Facing {
    fn as_str(self) -> &'static str {
        match self {
            Facing::Left => "left",
            Facing::Right => "right",
        }
    }
}

struct State {
    walking: bool,
    direction: Option<Direction>,
    last_direction: Option<Direction>,
    facing: Facing,
    token: u64,
    move_timer: Option<TimerId>,
}

struct Shared {
    host: Rc<dyn AnimationHost>,
    mover: Rc<dyn WindowMover>,
    mood: Rc<dyn MoodSource>,
    sched: Rc<dyn Scheduler>,
    config: WalkConfig,
    state: RefCell<State>,
}

/// Drives walk/climb/fall animation chains and per-tick window movement.
pub struct WalkController {
    shared: Rc<Shared>,
}

impl WalkController {
    pub fn new(
        host: Rc<dyn AnimationHost>,
        mover: Rc<dyn WindowMover>,
        mood: Rc<dyn MoodSource>,
        sched: Rc<dyn Scheduler>,
        config: WalkConfig,
    ) -> Self {
        Self {
            shared: Rc::new(Shared {
                host,
                mover,
                mood,
                sched,
                config,
                state: RefCell::new(State {
                    walking: false,
                    direction: None,
                    last_direction: None,
                    facing: Facing::default(),
                    token: 0,
                    move_timer: None,
                }),
            }),
        }
    }

    /// Begins (or redirects) a walk in `direction` on the next scheduler turn.
    ///
    /// Starting the direction that is already walking is a no-op. Any other
    /// start supersedes the active chain via a fresh generation token.
    pub fn start(&self, direction: Direction) {
        let shared = self.shared.clone();
        self.shared
            .sched
            .defer(Box::new(move || Shared::start_now(&shared, direction)));
    }

    /// Ends the active walk on the next scheduler turn: stops the move timer,
    /// plays the closing clip for the last walking direction, then returns
    /// the character to the neutral pose. No-op while not walking.
    pub fn stop(&self) {
        let shared = self.shared.clone();
        self.shared
            .sched
            .defer(Box::new(move || Shared::stop_now(&shared)));
    }

    /// Re-issues the Start→Loop chain for the current direction and mood
    /// without touching the move timer. Used when the mood changes mid-walk
    /// so the clip variant follows. No-op while not walking.
    pub fn refresh_anim(&self) {
        let shared = self.shared.clone();
        self.shared
            .sched
            .defer(Box::new(move || Shared::refresh_now(&shared)));
    }

    pub fn is_walking(&self) -> bool {
        self.shared.state.borrow().walking
    }

    pub fn direction(&self) -> Option<Direction> {
        self.shared.state.borrow().direction
    }
}

impl Shared {
    fn start_now(shared: &Rc<Shared>, direction: Direction) {
        let token = {
            let mut state = shared.state.borrow_mut();
            if state.walking && state.direction == Some(direction) {
                debug!("walk start ignored, already walking {:?}", direction);
                return;
            }
            state.token += 1;
            state.walking = true;
            state.direction = Some(direction);
            state.last_direction = Some(direction);
            match direction {
                Direction::Left => state.facing = Facing::Left,
                Direction::Right => state.facing = Facing::Right,
                _ => {}
            }
            state.token
        };
        debug!("walk starting {:?}", direction);

        // Reset to the neutral pose first; the walk chain and the move timer
        // begin only once that reset clip has finished.
        let cont = shared.clone();
        shared.host.play(
            ClipSelector::Neutral,
            Phase::Single,
            Box::new(move || {
                if cont.state.borrow().token != token {
                    return;
                }
                Shared::start_move_timer(&cont);
                Shared::play_start_then_loop(&cont, token);
            }),
        );
    }

    fn stop_now(shared: &Rc<Shared>) {
        let (token, last, facing) = {
            let mut state = shared.state.borrow_mut();
            if !state.walking {
                debug!("walk stop ignored, not walking");
                return;
            }
            state.walking = false;
            state.direction = None;
            state.token += 1;
            if let Some(id) = state.move_timer.take() {
                shared.sched.cancel(id);
            }
            (state.token, state.last_direction, state.facing)
        };

        let Some(last) = last else {
            shared.host.reset_neutral();
            return;
        };

        let name = clip_name(last, facing, shared.mood.mood());
        debug!("walk stopping, closing with '{name}'");
        let cont = shared.clone();
        shared.host.play(
            ClipSelector::Named(name),
            Phase::End,
            Box::new(move || {
                if cont.state.borrow().token != token {
                    return;
                }
                cont.host.reset_neutral();
            }),
        );
    }

    fn refresh_now(shared: &Rc<Shared>) {
        let token = {
            let mut state = shared.state.borrow_mut();
            if !state.walking {
                return;
            }
            state.token += 1;
            state.token
        };
        debug!("walk animation refresh");
        Shared::play_start_then_loop(shared, token);
    }

    fn start_move_timer(shared: &Rc<Shared>) {
        let mut state = shared.state.borrow_mut();
        if let Some(id) = state.move_timer.take() {
            shared.sched.cancel(id);
        }
        let weak = Rc::downgrade(shared);
        let id = shared.sched.every(
            Duration::from_millis(shared.config.interval_ms),
            Box::new(move || {
                if let Some(shared) = weak.upgrade() {
                    Shared::move_tick(&shared);
                }
            }),
        );
        state.move_timer = Some(id);
    }

    fn move_tick(shared: &Rc<Shared>) {
        let direction = {
            let state = shared.state.borrow();
            if !state.walking {
                return;
            }
            match state.direction {
                Some(direction) => direction,
                None => return,
            }
        };

        let (dx, dy) = match direction {
            Direction::Left => (-shared.horizontal_speed(), 0),
            Direction::Right => (shared.horizontal_speed(), 0),
            Direction::Up => (0, -shared.config.step_px),
            Direction::Down => (0, shared.config.step_px),
        };
        shared.mover.translate(dx, dy);
    }

    fn horizontal_speed(&self) -> i32 {
        match self.mood.mood() {
            Mood::Happy => self.config.speed_happy,
            Mood::Normal => self.config.speed_normal,
            Mood::PoorCondition | Mood::Ill => self.config.speed_poor,
        }
    }

    fn play_start_then_loop(shared: &Rc<Shared>, token: u64) {
        let name = {
            let state = shared.state.borrow();
            let Some(direction) = state.direction else {
                return;
            };
            clip_name(direction, state.facing, shared.mood.mood())
        };
        debug!("walk chain entering '{name}'");

        let cont = shared.clone();
        let loop_name = name.clone();
        shared.host.play(
            ClipSelector::Named(name),
            Phase::Start,
            Box::new(move || {
                Shared::play_loop(&cont, token, loop_name);
            }),
        );
    }

    fn play_loop(shared: &Rc<Shared>, token: u64, name: String) {
        {
            let state = shared.state.borrow();
            if state.token != token || !state.walking {
                return;
            }
        }

        let cont = shared.clone();
        let next = name.clone();
        shared.host.play(
            ClipSelector::Named(name),
            Phase::Loop,
            Box::new(move || {
                Shared::play_loop(&cont, token, next);
            }),
        );
    }
}

/// Selects the clip name for a walk in `direction`.
///
/// Vertical movement maps to climb/fall variants; horizontal movement picks
/// the walk clip with a mood suffix (happy walks faster, ailing walks slow).
fn clip_name(direction: Direction, facing: Facing, mood: Mood) -> String {
    let lr = facing.as_str();
    match direction {
        Direction::Up => format!("climb.{lr}"),
        Direction::Down => format!("fall.{lr}"),
        Direction::Left | Direction::Right => {
            let suffix = match mood {
                Mood::Happy => ".faster",
                Mood::PoorCondition | Mood::Ill => ".slow",
                Mood::Normal => "",
            };
            format!("walk.{lr}{suffix}")
        }
    }
}
