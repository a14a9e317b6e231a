//! Narrow interfaces to the external animation/display host.
//!
//! The coordinator never renders anything itself; it drives a host that plays
//! named animation clips, moves the character window, and reports the
//! character's current mood. These traits are the entire surface the
//! controllers are allowed to touch, which keeps the whole subsystem testable
//! without a live host.

use std::fmt;

/// Segment of a multi-part animation sequence for one logical action.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Entry segment played once when an action begins.
    Start,
    /// Repeatable middle segment; callers chain one Loop into the next.
    Loop,
    /// Closing segment played once when an action ends.
    End,
    /// Self-contained one-shot clip.
    Single,
}

/// The character's current condition, as reported by the host.
///
/// Mood influences which walk clip variant is selected and how fast the
/// window moves per tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mood {
    Happy,
    Normal,
    PoorCondition,
    Ill,
}

/// Which of the two nested idle stages a posture clip belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdleStage {
    /// Outer sit-down stage; sessions enter and leave through it.
    One,
    /// Inner stage, always nested inside stage one.
    Two,
}

/// How a play request identifies the clip to run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClipSelector {
    /// The host's neutral/default pose clip.
    Neutral,
    /// A fully named clip (walk/climb/fall variants).
    Named(String),
    /// A named idle clip at a specific stage.
    Idle { name: String, stage: IdleStage },
    /// Stage-only request; the host picks its canonical clip for the stage.
    /// Used when the catalog has no eligible named candidates.
    Stage(IdleStage),
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Phase::Start => "start",
            Phase::Loop => "loop",
            Phase::End => "end",
            Phase::Single => "single",
        };
        f.write_str(label)
    }
}

impl fmt::Display for IdleStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            IdleStage::One => "one",
            IdleStage::Two => "two",
        };
        f.write_str(label)
    }
}

impl fmt::Display for ClipSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ClipSelector::Neutral => f.write_str("default"),
            ClipSelector::Named(name) => f.write_str(name),
            ClipSelector::Idle { name, stage } => write!(f, "{name}#stage-{stage}"),
            ClipSelector::Stage(stage) => write!(f, "stage-{stage}"),
        }
    }
}

/// An idle clip eligible for randomized selection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClipDescriptor {
    pub name: String,
}

/// Completion continuation for an animation play request.
pub type Completion = Box<dyn FnOnce()>;

/// Plays animation clips and reports their completion.
///
/// `play` may be invoked again before a previous completion fires; the host
/// does not cancel anything on the caller's behalf. Callers gate every
/// continuation on their own generation token.
pub trait AnimationHost {
    /// Plays `clip` at `phase` and invokes `on_complete` exactly once when
    /// the clip finishes.
    fn play(&self, clip: ClipSelector, phase: Phase, on_complete: Completion);

    /// Immediately displays the neutral/default pose. No callback.
    fn reset_neutral(&self);
}

/// Applies pixel offsets to the character window. Fire-and-forget.
pub trait WindowMover {
    fn translate(&self, dx: i32, dy: i32);
}

/// Synchronous access to the character's current mood.
pub trait MoodSource {
    fn mood(&self) -> Mood;
}

/// Clip metadata used by the posture controller's randomized selection.
pub trait ClipCatalog {
    /// Eligible idle clips for `stage`, filtered to the current `mood`.
    fn idle_clips(&self, stage: IdleStage, mood: Mood) -> Vec<ClipDescriptor>;

    /// The catalog's canonical clip name for `stage`, if it has one.
    /// Consulted when `idle_clips` returns no candidates.
    fn stage_clip_name(&self, stage: IdleStage) -> Option<String>;

    /// Configured duration threshold for `name`, used by the probabilistic
    /// loop-continuation test.
    fn clip_duration(&self, name: &str) -> i64;
}
