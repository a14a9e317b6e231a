use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::rc::Rc;
use std::time::Duration;

use super::*;
use crate::host::Completion;
use crate::sched::ManualScheduler;

/// Records every play request and holds the completions so tests decide
/// exactly when each clip "finishes".
struct FakeHost {
    plays: RefCell<Vec<(ClipSelector, Phase)>>,
    completions: RefCell<VecDeque<Completion>>,
    neutral_resets: Cell<usize>,
}

impl FakeHost {
    fn new() -> Self {
        Self {
            plays: RefCell::new(Vec::new()),
            completions: RefCell::new(VecDeque::new()),
            neutral_resets: Cell::new(0),
        }
    }

    fn play_log(&self) -> Vec<(ClipSelector, Phase)> {
        self.plays.borrow().clone()
    }

    fn complete_next(&self) {
        let completion = self
            .completions
            .borrow_mut()
            .pop_front()
            .expect("a pending completion");
        completion();
    }
}

impl AnimationHost for FakeHost {
    fn play(&self, clip: ClipSelector, phase: Phase, on_complete: Completion) {
        self.plays.borrow_mut().push((clip, phase));
        self.completions.borrow_mut().push_back(on_complete);
    }

    fn reset_neutral(&self) {
        self.neutral_resets.set(self.neutral_resets.get() + 1);
    }
}

struct FakeMover {
    moves: RefCell<Vec<(i32, i32)>>,
}

impl FakeMover {
    fn new() -> Self {
        Self {
            moves: RefCell::new(Vec::new()),
        }
    }
}

impl WindowMover for FakeMover {
    fn translate(&self, dx: i32, dy: i32) {
        self.moves.borrow_mut().push((dx, dy));
    }
}

struct FakeMood {
    current: Cell<Mood>,
}

impl MoodSource for FakeMood {
    fn mood(&self) -> Mood {
        self.current.get()
    }
}

struct Fixture {
    host: Rc<FakeHost>,
    mover: Rc<FakeMover>,
    mood: Rc<FakeMood>,
    sched: Rc<ManualScheduler>,
    walk: WalkController,
}

fn fixture() -> Fixture {
    let host = Rc::new(FakeHost::new());
    let mover = Rc::new(FakeMover::new());
    let mood = Rc::new(FakeMood {
        current: Cell::new(Mood::Normal),
    });
    let sched = Rc::new(ManualScheduler::new());
    let walk = WalkController::new(
        host.clone(),
        mover.clone(),
        mood.clone(),
        sched.clone(),
        WalkConfig::default(),
    );
    Fixture {
        host,
        mover,
        mood,
        sched,
        walk,
    }
}

fn named(name: &str) -> ClipSelector {
    ClipSelector::Named(name.to_string())
}

#[test]
fn start_plays_neutral_then_chains_start_and_loops() {
    let f = fixture();
    f.walk.start(Direction::Left);
    f.sched.run_until_idle();
    assert!(f.walk.is_walking());
    assert_eq!(f.walk.direction(), Some(Direction::Left));
    assert_eq!(f.host.play_log(), vec![(ClipSelector::Neutral, Phase::Single)]);

    f.host.complete_next();
    assert_eq!(f.host.play_log()[1], (named("walk.left"), Phase::Start));

    f.host.complete_next();
    assert_eq!(f.host.play_log()[2], (named("walk.left"), Phase::Loop));

    // Loops keep chaining until something bumps the token.
    f.host.complete_next();
    assert_eq!(f.host.play_log()[3], (named("walk.left"), Phase::Loop));
}

#[test]
fn starting_same_direction_again_is_a_noop() {
    let f = fixture();
    f.walk.start(Direction::Left);
    f.sched.run_until_idle();
    f.walk.start(Direction::Left);
    f.sched.run_until_idle();
    assert_eq!(f.host.play_log().len(), 1);

    // The original chain is still live.
    f.host.complete_next();
    assert_eq!(f.host.play_log()[1], (named("walk.left"), Phase::Start));
}

#[test]
fn redirect_supersedes_the_old_chain() {
    let f = fixture();
    f.walk.start(Direction::Left);
    f.sched.run_until_idle();
    f.host.complete_next();
    assert_eq!(f.host.play_log()[1], (named("walk.left"), Phase::Start));

    f.walk.start(Direction::Right);
    f.sched.run_until_idle();
    assert_eq!(f.host.play_log()[2], (ClipSelector::Neutral, Phase::Single));

    // The stale Start completion fires after the redirect and must not loop.
    f.host.complete_next();
    assert_eq!(f.host.play_log().len(), 3);

    f.host.complete_next();
    assert_eq!(f.host.play_log()[3], (named("walk.right"), Phase::Start));
}

#[test]
fn move_ticks_follow_mood_speed_and_direction_sign() {
    let f = fixture();
    f.walk.start(Direction::Left);
    f.sched.run_until_idle();
    f.host.complete_next();

    f.sched.advance(Duration::from_millis(60));
    assert_eq!(*f.mover.moves.borrow(), vec![(-10, 0)]);

    f.mood.current.set(Mood::Happy);
    f.sched.advance(Duration::from_millis(60));
    assert_eq!(f.mover.moves.borrow()[1], (-15, 0));

    f.mood.current.set(Mood::Ill);
    f.sched.advance(Duration::from_millis(60));
    assert_eq!(f.mover.moves.borrow()[2], (-5, 0));
}

#[test]
fn vertical_walks_use_the_fixed_step() {
    let f = fixture();
    f.walk.start(Direction::Up);
    f.sched.run_until_idle();
    f.host.complete_next();
    assert_eq!(f.host.play_log()[1], (named("climb.left"), Phase::Start));

    f.sched.advance(Duration::from_millis(60));
    assert_eq!(*f.mover.moves.borrow(), vec![(0, -10)]);

    f.walk.start(Direction::Down);
    f.sched.run_until_idle();
    f.host.complete_next();
    f.sched.advance(Duration::from_millis(60));
    assert_eq!(f.mover.moves.borrow()[1], (0, 10));
}

#[test]
fn stop_closes_with_end_clip_then_neutral_reset() {
    let f = fixture();
    f.walk.start(Direction::Left);
    f.sched.run_until_idle();
    f.host.complete_next();
    f.host.complete_next();

    f.walk.stop();
    f.sched.run_until_idle();
    assert!(!f.walk.is_walking());
    assert_eq!(f.walk.direction(), None);
    assert_eq!(f.host.play_log()[3], (named("walk.left"), Phase::End));

    // Move timer is gone.
    let before = f.mover.moves.borrow().len();
    f.sched.advance(Duration::from_millis(300));
    assert_eq!(f.mover.moves.borrow().len(), before);

    // Pending Loop completion from before the stop is stale.
    f.host.complete_next();
    assert_eq!(f.host.play_log().len(), 4);

    f.host.complete_next();
    assert_eq!(f.host.neutral_resets.get(), 1);
}

#[test]
fn stop_while_idle_is_a_noop() {
    let f = fixture();
    f.walk.stop();
    f.sched.run_until_idle();
    assert!(f.host.play_log().is_empty());
    assert_eq!(f.host.neutral_resets.get(), 0);
}

#[test]
fn facing_persists_across_stops() {
    let f = fixture();
    f.walk.start(Direction::Right);
    f.sched.run_until_idle();
    f.host.complete_next();
    assert_eq!(f.host.play_log()[1], (named("walk.right"), Phase::Start));

    f.walk.stop();
    f.sched.run_until_idle();
    f.host.complete_next();
    f.host.complete_next();

    f.walk.start(Direction::Up);
    f.sched.run_until_idle();
    f.host.complete_next();
    // Climb after a rightward walk keeps the right-facing variant.
    assert_eq!(f.host.play_log()[4], (named("climb.right"), Phase::Start));
}

#[test]
fn happy_and_ailing_moods_pick_suffixed_walk_clips() {
    let f = fixture();
    f.mood.current.set(Mood::Happy);
    f.walk.start(Direction::Left);
    f.sched.run_until_idle();
    f.host.complete_next();
    assert_eq!(
        f.host.play_log()[1],
        (named("walk.left.faster"), Phase::Start)
    );

    f.mood.current.set(Mood::PoorCondition);
    f.walk.refresh_anim();
    f.sched.run_until_idle();
    assert_eq!(
        f.host.play_log()[2],
        (named("walk.left.slow"), Phase::Start)
    );
}

#[test]
fn refresh_reissues_chain_without_rearming_the_timer() {
    let f = fixture();
    f.walk.start(Direction::Left);
    f.sched.run_until_idle();
    f.host.complete_next();
    f.host.complete_next();

    f.walk.refresh_anim();
    f.sched.run_until_idle();
    assert_eq!(f.host.play_log()[3], (named("walk.left"), Phase::Start));

    // Stale Loop completion from the superseded chain falls through.
    f.host.complete_next();
    assert_eq!(f.host.play_log().len(), 4);

    // One tick per interval, so the timer was not doubled up.
    f.sched.advance(Duration::from_millis(60));
    assert_eq!(f.mover.moves.borrow().len(), 1);
}

#[test]
fn refresh_while_idle_is_a_noop() {
    let f = fixture();
    f.walk.refresh_anim();
    f.sched.run_until_idle();
    assert!(f.host.play_log().is_empty());
}
