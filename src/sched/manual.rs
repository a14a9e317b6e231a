use std::cell::RefCell;
use std::cmp::Ordering;
use std::collections::{BinaryHeap, HashSet};
use std::time::Duration;

use super::{Scheduler, Task, Tick, TimerId};

enum Job {
    Once(Task),
    Repeating { interval: Duration, tick: Tick },
}

struct Entry {
    deadline: Duration,
    seq: u64,
    id: TimerId,
    job: Job,
}

impl PartialEq for Entry {
    fn eq(&self, other: &Self) -> bool {
        self.deadline == other.deadline && self.seq == other.seq
    }
}

impl Eq for Entry {}

impl PartialOrd for Entry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Entry {
    // Inverted so the BinaryHeap pops the earliest deadline first; ties run
    // in submission order.
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .deadline
            .cmp(&self.deadline)
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

struct Inner {
    now: Duration,
    next_seq: u64,
    next_id: u64,
    queue: BinaryHeap<Entry>,
    cancelled: HashSet<TimerId>,
}

/// Deterministic scheduler driven by a virtual clock.
///
/// Nothing runs until the clock is advanced, so tests and the CLI simulator
/// control exactly which continuations have fired at any point. Callbacks may
/// re-enter the scheduler (defer, arm, or cancel) while they run.
pub struct ManualScheduler {
    inner: RefCell<Inner>,
}

enum Popped {
    Run(Entry),
    Skip,
    Done,
}

impl ManualScheduler {
    pub fn new() -> Self {
        Self {
            inner: RefCell::new(Inner {
                now: Duration::ZERO,
                next_seq: 0,
                next_id: 0,
                queue: BinaryHeap::new(),
                cancelled: HashSet::new(),
            }),
        }
    }

    /// Current virtual time.
    pub fn now(&self) -> Duration {
        self.inner.borrow().now
    }

    /// Advances the virtual clock by `delta`, running every due job in
    /// deadline order along the way.
    pub fn advance(&self, delta: Duration) {
        let target = self.inner.borrow().now + delta;
        self.drain(target);
        self.inner.borrow_mut().now = target;
    }

    /// Runs all jobs already due at the current virtual time, including jobs
    /// they schedule for the same instant.
    pub fn run_until_idle(&self) {
        let target = self.inner.borrow().now;
        self.drain(target);
    }

    fn drain(&self, target: Duration) {
        loop {
            let popped = {
                let mut inner = self.inner.borrow_mut();
                match inner.queue.peek() {
                    Some(entry) if entry.deadline <= target => {
                        let entry = inner.queue.pop().expect("peeked entry");
                        if inner.now < entry.deadline {
                            inner.now = entry.deadline;
                        }
                        if inner.cancelled.remove(&entry.id) {
                            Popped::Skip
                        } else {
                            Popped::Run(entry)
                        }
                    }
                    _ => Popped::Done,
                }
            };

            match popped {
                Popped::Done => return,
                Popped::Skip => continue,
                Popped::Run(entry) => match entry.job {
                    Job::Once(task) => task(),
                    Job::Repeating { interval, mut tick } => {
                        tick();
                        let mut inner = self.inner.borrow_mut();
                        // The tick may have cancelled its own timer.
                        if !inner.cancelled.remove(&entry.id) {
                            let seq = inner.next_seq;
                            inner.next_seq += 1;
                            inner.queue.push(Entry {
                                deadline: entry.deadline + interval,
                                seq,
                                id: entry.id,
                                job: Job::Repeating { interval, tick },
                            });
                        }
                    }
                },
            }
        }
    }

    fn push(&self, delay: Duration, job: Job) -> TimerId {
        let mut inner = self.inner.borrow_mut();
        let id = TimerId(inner.next_id);
        inner.next_id += 1;
        let seq = inner.next_seq;
        inner.next_seq += 1;
        let deadline = inner.now + delay;
        inner.queue.push(Entry {
            deadline,
            seq,
            id,
            job,
        });
        id
    }
}

impl Default for ManualScheduler {
    fn default() -> Self {
        Self::new()
    }
}

impl Scheduler for ManualScheduler {
    fn defer(&self, task: Task) {
        self.push(Duration::ZERO, Job::Once(task));
    }

    fn after(&self, delay: Duration, task: Task) -> TimerId {
        self.push(delay, Job::Once(task))
    }

    fn every(&self, interval: Duration, tick: Tick) -> TimerId {
        self.push(interval, Job::Repeating { interval, tick })
    }

    fn cancel(&self, id: TimerId) {
        self.inner.borrow_mut().cancelled.insert(id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn log_push(log: &Rc<RefCell<Vec<&'static str>>>, label: &'static str) -> Task {
        let log = log.clone();
        Box::new(move || log.borrow_mut().push(label))
    }

    #[test]
    fn defer_runs_in_submission_order() {
        let sched = ManualScheduler::new();
        let log = Rc::new(RefCell::new(Vec::new()));
        sched.defer(log_push(&log, "a"));
        sched.defer(log_push(&log, "b"));
        sched.defer(log_push(&log, "c"));
        sched.run_until_idle();
        assert_eq!(*log.borrow(), vec!["a", "b", "c"]);
    }

    #[test]
    fn after_fires_only_once_deadline_reached() {
        let sched = ManualScheduler::new();
        let log = Rc::new(RefCell::new(Vec::new()));
        sched.after(Duration::from_millis(100), log_push(&log, "late"));
        sched.advance(Duration::from_millis(99));
        assert!(log.borrow().is_empty());
        sched.advance(Duration::from_millis(1));
        assert_eq!(*log.borrow(), vec!["late"]);
    }

    #[test]
    fn cancelled_timer_never_fires() {
        let sched = ManualScheduler::new();
        let log = Rc::new(RefCell::new(Vec::new()));
        let id = sched.after(Duration::from_millis(50), log_push(&log, "x"));
        sched.cancel(id);
        sched.advance(Duration::from_millis(200));
        assert!(log.borrow().is_empty());
    }

    #[test]
    fn every_repeats_until_cancelled() {
        let sched = ManualScheduler::new();
        let count = Rc::new(RefCell::new(0));
        let c = count.clone();
        let id = sched.every(
            Duration::from_millis(60),
            Box::new(move || *c.borrow_mut() += 1),
        );
        sched.advance(Duration::from_millis(200));
        assert_eq!(*count.borrow(), 3);
        sched.cancel(id);
        sched.advance(Duration::from_millis(200));
        assert_eq!(*count.borrow(), 3);
    }

    #[test]
    fn tick_may_cancel_its_own_timer() {
        let sched = Rc::new(ManualScheduler::new());
        let count = Rc::new(RefCell::new(0));
        let id_slot: Rc<RefCell<Option<TimerId>>> = Rc::new(RefCell::new(None));
        let c = count.clone();
        let slot = id_slot.clone();
        let s = sched.clone();
        let id = sched.every(
            Duration::from_millis(10),
            Box::new(move || {
                *c.borrow_mut() += 1;
                if let Some(id) = *slot.borrow() {
                    s.cancel(id);
                }
            }),
        );
        *id_slot.borrow_mut() = Some(id);
        sched.advance(Duration::from_millis(100));
        assert_eq!(*count.borrow(), 1);
    }

    #[test]
    fn callbacks_can_schedule_more_work_at_the_same_instant() {
        let sched = Rc::new(ManualScheduler::new());
        let log = Rc::new(RefCell::new(Vec::new()));
        let inner_log = log.clone();
        let s = sched.clone();
        sched.defer(Box::new(move || {
            inner_log.borrow_mut().push("outer");
            let l = inner_log.clone();
            s.defer(Box::new(move || l.borrow_mut().push("inner")));
        }));
        sched.run_until_idle();
        assert_eq!(*log.borrow(), vec!["outer", "inner"]);
    }
}
