//! Hold-disambiguation arbitration for the Down/Up keys.
//!
//! Down and Up each carry two meanings: a tap toggles posture, a hold means
//! "walk that way". The posture toggle is applied optimistically on key-down;
//! this arbiter races a single-shot timer against the key release. If the key
//! is still held and still the locked direction when the timer fires, the
//! press escalates into a walk (undoing a sit first when needed).

use std::cell::RefCell;
use std::rc::Rc;
use std::time::Duration;

use log::debug;

use super::Direction;
use crate::posture::PostureController;
use crate::sched::{Scheduler, TimerId};
use crate::walk::WalkController;

/// Predicate supplied by the dispatcher: is the armed key still pressed and
/// still the locked direction?
pub type StillHeld = Box<dyn Fn() -> bool>;

struct State {
    armed: Option<Direction>,
    walking_by_hold: bool,
    timer: Option<TimerId>,
}

struct Shared {
    walk: Rc<WalkController>,
    posture: Rc<PostureController>,
    sched: Rc<dyn Scheduler>,
    hold_ms: u64,
    state: RefCell<State>,
}

pub struct HoldArbiter {
    shared: Rc<Shared>,
}

impl HoldArbiter {
    pub fn new(
        walk: Rc<WalkController>,
        posture: Rc<PostureController>,
        sched: Rc<dyn Scheduler>,
        hold_ms: u64,
    ) -> Self {
        Self {
            shared: Rc::new(Shared {
                walk,
                posture,
                sched,
                hold_ms,
                state: RefCell::new(State {
                    armed: None,
                    walking_by_hold: false,
                    timer: None,
                }),
            }),
        }
    }

    /// Arms the escalation timer for `direction`, replacing any prior arm.
    pub fn arm(&self, direction: Direction, still_held: StillHeld) {
        let mut state = self.shared.state.borrow_mut();
        if let Some(id) = state.timer.take() {
            self.shared.sched.cancel(id);
        }
        state.armed = Some(direction);
        state.walking_by_hold = false;

        let weak = Rc::downgrade(&self.shared);
        let id = self.shared.sched.after(
            Duration::from_millis(self.shared.hold_ms),
            Box::new(move || {
                if let Some(shared) = weak.upgrade() {
                    Shared::fire(&shared, direction, &still_held);
                }
            }),
        );
        state.timer = Some(id);
    }

    /// Disarms the timer and reports whether the hold had already escalated
    /// into a walk. Called when the armed key is released.
    pub fn reset(&self) -> bool {
        let mut state = self.shared.state.borrow_mut();
        if let Some(id) = state.timer.take() {
            self.shared.sched.cancel(id);
        }
        state.armed = None;
        std::mem::take(&mut state.walking_by_hold)
    }
}

impl Shared {
    fn fire(shared: &Rc<Shared>, direction: Direction, still_held: &dyn Fn() -> bool) {
        {
            let mut state = shared.state.borrow_mut();
            state.timer = None;
            if state.armed != Some(direction) {
                return;
            }
            if !still_held() {
                return;
            }
            state.walking_by_hold = true;
        }
        debug!("hold escalated {:?} into a walk", direction);

        // A held Down while sitting means "fall": undo the sit first.
        if direction == Direction::Down && shared.posture.is_running() {
            shared.posture.stop();
        }
        shared.walk.start(direction);
    }
}
