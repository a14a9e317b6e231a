//! Scripted host collaborators used by the simulator.
//!
//! Every side effect the controllers produce is appended to a shared trace,
//! timestamped with the virtual clock. Animation completions are modelled as
//! one-shot timers so clip playback takes simulated time instead of finishing
//! instantly.

use std::cell::{Cell, RefCell};
use std::rc::Rc;
use std::time::Duration;

use crate::host::{
    AnimationHost, ClipCatalog, ClipDescriptor, ClipSelector, Completion, IdleStage, Mood,
    MoodSource, Phase, WindowMover,
};
use crate::sched::{ManualScheduler, Scheduler};

/// Shared, timestamped log of host side effects.
#[derive(Clone)]
pub struct Trace {
    sched: Rc<ManualScheduler>,
    lines: Rc<RefCell<Vec<String>>>,
}

impl Trace {
    pub fn new(sched: Rc<ManualScheduler>) -> Self {
        Self {
            sched,
            lines: Rc::new(RefCell::new(Vec::new())),
        }
    }

    pub fn record(&self, message: &str) {
        let now = self.sched.now().as_millis();
        self.lines.borrow_mut().push(format!("[{now:>6}ms] {message}"));
    }

    pub fn lines(&self) -> Vec<String> {
        self.lines.borrow().clone()
    }
}

/// Animation host that logs plays and completes them after a fixed delay.
pub struct ScriptedHost {
    sched: Rc<ManualScheduler>,
    clip_ms: u64,
    trace: Trace,
}

impl ScriptedHost {
    pub fn new(sched: Rc<ManualScheduler>, clip_ms: u64, trace: Trace) -> Self {
        Self {
            sched,
            clip_ms,
            trace,
        }
    }
}

impl AnimationHost for ScriptedHost {
    fn play(&self, clip: ClipSelector, phase: Phase, on_complete: Completion) {
        self.trace.record(&format!("play {clip} {phase}"));
        self.sched
            .after(Duration::from_millis(self.clip_ms), on_complete);
    }

    fn reset_neutral(&self) {
        self.trace.record("neutral");
    }
}

/// Window mover that logs each translation.
pub struct ScriptedMover {
    trace: Trace,
}

impl ScriptedMover {
    pub fn new(trace: Trace) -> Self {
        Self { trace }
    }
}

impl WindowMover for ScriptedMover {
    fn translate(&self, dx: i32, dy: i32) {
        self.trace.record(&format!("move {dx} {dy}"));
    }
}

/// Mood source the script can mutate mid-run.
pub struct ScriptedMood {
    current: Cell<Mood>,
}

impl ScriptedMood {
    pub fn new(initial: Mood) -> Self {
        Self {
            current: Cell::new(initial),
        }
    }

    pub fn set(&self, mood: Mood) {
        self.current.set(mood);
    }
}

impl MoodSource for ScriptedMood {
    fn mood(&self) -> Mood {
        self.current.get()
    }
}

/// Small built-in clip catalog so posture sessions have something to pick.
pub struct ScriptedCatalog;

impl ClipCatalog for ScriptedCatalog {
    fn idle_clips(&self, stage: IdleStage, _mood: Mood) -> Vec<ClipDescriptor> {
        let names: &[&str] = match stage {
            IdleStage::One => &["sit.calm", "sit.groom"],
            IdleStage::Two => &["doze.curl"],
        };
        names
            .iter()
            .map(|name| ClipDescriptor {
                name: (*name).to_string(),
            })
            .collect()
    }

    fn stage_clip_name(&self, stage: IdleStage) -> Option<String> {
        match stage {
            IdleStage::One => Some("sit.plain".to_string()),
            IdleStage::Two => Some("doze.plain".to_string()),
        }
    }

    fn clip_duration(&self, _name: &str) -> i64 {
        4
    }
}
