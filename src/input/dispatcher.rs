//! Key event dispatch with the direction lock.
//!
//! The dispatcher owns the pressed-key set and the single locked direction.
//! The first mapped key to go down takes the lock; every other direction is
//! suppressed until its key is pressed again after the lock clears. Routing
//! depends on the configured profile: walk-only treats all four directions as
//! walks, posture-hold gives Down/Up their sit/stand meaning.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use log::debug;

use super::events::{Direction, KeyEvent};
use super::hold::HoldArbiter;
use crate::config::InputProfile;
use crate::posture::PostureController;
use crate::walk::WalkController;

struct DispatchState {
    pressed: Vec<(String, Direction)>,
    active: Option<Direction>,
}

struct Shared {
    walk: Rc<WalkController>,
    posture: Rc<PostureController>,
    hold: HoldArbiter,
    bindings: HashMap<String, Direction>,
    profile: InputProfile,
    state: RefCell<DispatchState>,
}

/// Routes raw key transitions into the walk and posture controllers.
pub struct InputDispatcher {
    shared: Rc<Shared>,
}

impl InputDispatcher {
    pub fn new(
        walk: Rc<WalkController>,
        posture: Rc<PostureController>,
        hold: HoldArbiter,
        bindings: HashMap<String, Direction>,
        profile: InputProfile,
    ) -> Self {
        Self {
            shared: Rc::new(Shared {
                walk,
                posture,
                hold,
                bindings,
                profile,
                state: RefCell::new(DispatchState {
                    pressed: Vec::new(),
                    active: None,
                }),
            }),
        }
    }

    /// Handles a key-down transition. Auto-repeats and unmapped keys are
    /// inert; a mapped key is recorded and, when no direction holds the
    /// lock, takes it and is routed per the profile.
    pub fn key_down(&self, event: &KeyEvent) {
        if event.is_repeat {
            return;
        }
        let key = normalize(&event.key);
        let Some(&direction) = self.shared.bindings.get(&key) else {
            debug!("ignoring unmapped key '{key}'");
            return;
        };

        {
            let mut state = self.shared.state.borrow_mut();
            if state.pressed.iter().any(|(pressed, _)| *pressed == key) {
                return;
            }
            state.pressed.push((key, direction));
            if state.active.is_some() {
                debug!("direction lock held, suppressing {:?}", direction);
                return;
            }
            state.active = Some(direction);
        }
        debug!("direction lock taken by {:?}", direction);

        match self.shared.profile {
            InputProfile::WalkOnly => self.shared.walk.start(direction),
            InputProfile::PostureHold => match direction {
                Direction::Left | Direction::Right => self.shared.walk.start(direction),
                Direction::Down => {
                    self.shared.posture.start();
                    self.arm_hold(direction);
                }
                Direction::Up => {
                    self.shared.posture.stop();
                    self.arm_hold(direction);
                }
            },
        }
    }

    /// Handles a key-up transition. Releasing a suppressed key only shrinks
    /// the pressed set; releasing the locked key clears the lock and either
    /// promotes a remaining key (walk-only) or winds down per the hold state
    /// (posture-hold).
    pub fn key_up(&self, key: &str) {
        let key = normalize(key);
        let released = {
            let mut state = self.shared.state.borrow_mut();
            let Some(position) = state
                .pressed
                .iter()
                .position(|(pressed, _)| *pressed == key)
            else {
                return;
            };
            let (_, direction) = state.pressed.remove(position);
            if state.active != Some(direction) {
                return;
            }
            direction
        };

        match self.shared.profile {
            InputProfile::WalkOnly => {
                let promoted = {
                    let mut state = self.shared.state.borrow_mut();
                    let promoted = state.pressed.last().map(|(_, direction)| *direction);
                    state.active = promoted;
                    promoted
                };
                match promoted {
                    Some(direction) => {
                        debug!("promoting most recent press {:?}", direction);
                        self.shared.walk.start(direction);
                    }
                    None => self.shared.walk.stop(),
                }
            }
            InputProfile::PostureHold => {
                let escalated = self.shared.hold.reset();
                if released.is_horizontal() || escalated {
                    self.shared.walk.stop();
                }
                self.shared.state.borrow_mut().active = None;
            }
        }
    }

    /// Locked direction, if any. Exposed for the simulator's state dumps.
    pub fn active(&self) -> Option<Direction> {
        self.shared.state.borrow().active
    }

    fn arm_hold(&self, direction: Direction) {
        let weak = Rc::downgrade(&self.shared);
        self.shared.hold.arm(
            direction,
            Box::new(move || {
                let Some(shared) = weak.upgrade() else {
                    return false;
                };
                let state = shared.state.borrow();
                state.active == Some(direction)
                    && state.pressed.iter().any(|(_, held)| *held == direction)
            }),
        );
    }
}

fn normalize(key: &str) -> String {
    key.trim().to_lowercase()
}
