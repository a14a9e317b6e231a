//! Wiring for a complete coordinator instance.
//!
//! A [`PetSession`] owns the dispatcher and both controllers, built from a
//! validated [`Config`] and the host collaborators. Hosts construct one at
//! startup and feed it raw key transitions; everything else runs on the
//! scheduler they supplied.

use std::rc::Rc;

use log::info;

use crate::config::{Config, KeybindingError};
use crate::host::{AnimationHost, ClipCatalog, MoodSource, WindowMover};
use crate::input::{Direction, HoldArbiter, InputDispatcher, KeyEvent};
use crate::posture::PostureController;
use crate::rng::RandomSource;
use crate::sched::Scheduler;
use crate::walk::WalkController;

pub struct PetSession {
    dispatcher: InputDispatcher,
    walk: Rc<WalkController>,
    posture: Rc<PostureController>,
}

impl PetSession {
    /// Builds the full controller stack from `config`.
    ///
    /// # Errors
    /// Returns an error when the configured keybindings do not form a valid
    /// lookup table.
    pub fn new(
        config: &Config,
        host: Rc<dyn AnimationHost>,
        mover: Rc<dyn WindowMover>,
        mood: Rc<dyn MoodSource>,
        catalog: Rc<dyn ClipCatalog>,
        sched: Rc<dyn Scheduler>,
        rng: Box<dyn RandomSource>,
    ) -> Result<Self, KeybindingError> {
        let bindings = config.keybindings.build_direction_map()?;

        let walk = Rc::new(WalkController::new(
            host.clone(),
            mover,
            mood.clone(),
            sched.clone(),
            config.walk.clone(),
        ));
        let posture = Rc::new(PostureController::new(
            host, mood, catalog, sched.clone(), rng,
        ));
        let hold = HoldArbiter::new(walk.clone(), posture.clone(), sched, config.hold.hold_ms);
        let dispatcher = InputDispatcher::new(
            walk.clone(),
            posture.clone(),
            hold,
            bindings,
            config.input.profile,
        );

        info!("session ready ({:?} profile)", config.input.profile);
        Ok(Self {
            dispatcher,
            walk,
            posture,
        })
    }

    pub fn key_down(&self, event: &KeyEvent) {
        self.dispatcher.key_down(event);
    }

    pub fn key_up(&self, key: &str) {
        self.dispatcher.key_up(key);
    }

    /// Re-issues the walk animation for the current mood. Hosts call this
    /// when the character's mood changes mid-walk.
    pub fn refresh_walk_anim(&self) {
        self.walk.refresh_anim();
    }

    pub fn active_direction(&self) -> Option<Direction> {
        self.dispatcher.active()
    }

    pub fn is_walking(&self) -> bool {
        self.walk.is_walking()
    }

    pub fn walk_direction(&self) -> Option<Direction> {
        self.walk.direction()
    }

    pub fn is_posture_running(&self) -> bool {
        self.posture.is_running()
    }
}
