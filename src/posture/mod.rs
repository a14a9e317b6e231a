//! Posture controller: the sit/stand idle animation state machine.
//!
//! A posture session opens with a randomly selected stage-one clip and then
//! loops it, rolling against the clip's configured duration threshold on
//! every cycle. As cycles accumulate the roll range widens, so the chance of
//! ending grows. An expiring stage-one loop either closes the session or
//! branches into a nested stage-two sequence; stage two always drains back
//! into the stage-one loop, never straight to the neutral pose. Generation
//! tokens gate every continuation, exactly as in the walk controller.


use std::cell::RefCell;
use std::rc::Rc;

use log::{debug, info};

use crate::host::{AnimationHost, ClipCatalog, ClipSelector, IdleStage, MoodSource, Phase};
use crate::rng::RandomSource;
use crate::sched::Scheduler;

struct State {
    running: bool,
    clip: Option<String>,
    stage: IdleStage,
    loop_count: i64,
    stage_two_entries: i64,
    token: u64,
}

struct Shared {
    host: Rc<dyn AnimationHost>,
    mood: Rc<dyn MoodSource>,
    catalog: Rc<dyn ClipCatalog>,
    sched: Rc<dyn Scheduler>,
    rng: RefCell<Box<dyn RandomSource>>,
    state: RefCell<State>,
}

/// Drives the two-stage idle posture sequence.
pub struct PostureController {
    shared: Rc<Shared>,
}

impl PostureController {
    pub fn new(
        host: Rc<dyn AnimationHost>,
        mood: Rc<dyn MoodSource>,
        catalog: Rc<dyn ClipCatalog>,
        sched: Rc<dyn Scheduler>,
        rng: Box<dyn RandomSource>,
    ) -> Self {
        Self {
            shared: Rc::new(Shared {
                host,
                mood,
                catalog,
                sched,
                rng: RefCell::new(rng),
                state: RefCell::new(State {
                    running: false,
                    clip: None,
                    stage: IdleStage::One,
                    loop_count: 0,
                    stage_two_entries: 0,
                    token: 0,
                }),
            }),
        }
    }

    /// Opens a posture session on the next scheduler turn, or resumes the
    /// active one.
    ///
    /// Resuming resets the loop counter and re-enters the recorded clip's
    /// Loop phase at the recorded stage without replaying its Start; the
    /// generation token is left alone so the session identity is preserved.
    pub fn start(&self) {
        let shared = self.shared.clone();
        self.shared
            .sched
            .defer(Box::new(move || Shared::start_now(&shared)));
    }

    /// Closes the active session on the next scheduler turn: plays the
    /// recorded clip's End phase at the last-active stage, then returns to
    /// the neutral pose. With nothing recorded yet the reset is immediate.
    /// No-op while not running.
    pub fn stop(&self) {
        let shared = self.shared.clone();
        self.shared
            .sched
            .defer(Box::new(move || Shared::stop_now(&shared)));
    }

    pub fn is_running(&self) -> bool {
        self.shared.state.borrow().running
    }
}

impl Shared {
    fn start_now(shared: &Rc<Shared>) {
        let token = {
            let mut state = shared.state.borrow_mut();
            if state.running {
                state.loop_count = 0;
                let token = state.token;
                let clip = state.clip.clone();
                let stage = state.stage;
                drop(state);

                let Some(name) = clip else {
                    return;
                };
                debug!("posture resume, looping '{name}' at {stage:?}");
                let cont = shared.clone();
                shared.host.play(
                    ClipSelector::Idle { name, stage },
                    Phase::Loop,
                    Box::new(move || Shared::loop_tick(&cont, token)),
                );
                return;
            }

            state.running = true;
            state.token += 1;
            state.clip = None;
            state.stage = IdleStage::One;
            state.loop_count = 0;
            state.stage_two_entries = 0;
            state.token
        };

        let mood = shared.mood.mood();
        let candidates = shared.catalog.idle_clips(IdleStage::One, mood);
        if !candidates.is_empty() {
            let index = shared.rng.borrow_mut().below(candidates.len() as i64) as usize;
            let name = candidates[index].name.clone();
            shared.state.borrow_mut().clip = Some(name.clone());
            info!("posture session starting with '{name}'");

            let cont = shared.clone();
            shared.host.play(
                ClipSelector::Idle {
                    name,
                    stage: IdleStage::One,
                },
                Phase::Start,
                Box::new(move || Shared::loop_tick(&cont, token)),
            );
        } else if let Some(name) = shared.catalog.stage_clip_name(IdleStage::One) {
            // No eligible named clips; let the host pick its canonical
            // stage-one clip but keep looping under the catalog's name.
            shared.state.borrow_mut().clip = Some(name.clone());
            debug!("posture catalog empty, using stage clip '{name}'");

            let cont = shared.clone();
            shared.host.play(
                ClipSelector::Stage(IdleStage::One),
                Phase::Start,
                Box::new(move || Shared::loop_tick(&cont, token)),
            );
        } else {
            debug!("posture session has no idle clips, closing immediately");
            let cont = shared.clone();
            shared.host.play(
                ClipSelector::Stage(IdleStage::One),
                Phase::Start,
                Box::new(move || {
                    if cont.state.borrow().token != token {
                        return;
                    }
                    Shared::finish_session(&cont);
                }),
            );
        }
    }

    fn stop_now(shared: &Rc<Shared>) {
        let (token, clip, stage) = {
            let mut state = shared.state.borrow_mut();
            if !state.running {
                debug!("posture stop ignored, not running");
                return;
            }
            state.running = false;
            state.token += 1;
            (state.token, state.clip.take(), state.stage)
        };

        let Some(name) = clip else {
            shared.host.reset_neutral();
            return;
        };

        debug!("posture stopping, closing '{name}' at {stage:?}");
        let cont = shared.clone();
        shared.host.play(
            ClipSelector::Idle { name, stage },
            Phase::End,
            Box::new(move || {
                if cont.state.borrow().token != token {
                    return;
                }
                cont.host.reset_neutral();
            }),
        );
    }

    /// One cycle of the idle loop at the current stage.
    ///
    /// The roll range is the number of cycles so far, so `below(1)` on the
    /// first cycle always continues and the odds of expiry rise with every
    /// later cycle.
    fn loop_tick(shared: &Rc<Shared>, token: u64) {
        let (name, stage, draw, threshold) = {
            let mut state = shared.state.borrow_mut();
            if state.token != token || !state.running {
                return;
            }
            let Some(name) = state.clip.clone() else {
                return;
            };
            state.loop_count += 1;
            let draw = shared.rng.borrow_mut().below(state.loop_count);
            (name.clone(), state.stage, draw, shared.catalog.clip_duration(&name))
        };

        if draw <= threshold {
            let cont = shared.clone();
            shared.host.play(
                ClipSelector::Idle { name, stage },
                Phase::Loop,
                Box::new(move || Shared::loop_tick(&cont, token)),
            );
            return;
        }

        match stage {
            IdleStage::One => Shared::expire_stage_one(shared, token, name),
            IdleStage::Two => Shared::expire_stage_two(shared, token, name),
        }
    }

    /// Stage-one expiry: branch into stage two or close the session.
    ///
    /// The branch draw widens by one for every stage-two visit already made,
    /// so repeat visits get progressively less likely.
    fn expire_stage_one(shared: &Rc<Shared>, token: u64, name: String) {
        let branch = {
            let state = shared.state.borrow();
            shared.rng.borrow_mut().below(2 + state.stage_two_entries)
        };

        if branch == 0 {
            {
                let mut state = shared.state.borrow_mut();
                state.loop_count = 0;
                state.stage_two_entries += 1;
                state.stage = IdleStage::Two;
            }
            debug!("posture entering stage two of '{name}'");
            let cont = shared.clone();
            shared.host.play(
                ClipSelector::Idle {
                    name,
                    stage: IdleStage::Two,
                },
                Phase::Start,
                Box::new(move || Shared::loop_tick(&cont, token)),
            );
            return;
        }

        debug!("posture stage one expired, closing '{name}'");
        let cont = shared.clone();
        shared.host.play(
            ClipSelector::Idle {
                name,
                stage: IdleStage::One,
            },
            Phase::End,
            Box::new(move || {
                if cont.state.borrow().token != token {
                    return;
                }
                Shared::finish_session(&cont);
            }),
        );
    }

    /// Stage-two expiry always drains back into the stage-one loop.
    fn expire_stage_two(shared: &Rc<Shared>, token: u64, name: String) {
        shared.state.borrow_mut().loop_count = 0;
        debug!("posture stage two expired, returning to stage one");
        let cont = shared.clone();
        shared.host.play(
            ClipSelector::Idle {
                name,
                stage: IdleStage::Two,
            },
            Phase::End,
            Box::new(move || {
                {
                    let mut state = cont.state.borrow_mut();
                    if state.token != token {
                        return;
                    }
                    state.stage = IdleStage::One;
                }
                Shared::loop_tick(&cont, token);
            }),
        );
    }

    fn finish_session(shared: &Rc<Shared>) {
        {
            let mut state = shared.state.borrow_mut();
            state.running = false;
            state.clip = None;
        }
        info!("posture session finished");
        shared.host.reset_neutral();
    }
}
