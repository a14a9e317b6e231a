//! Scripted CLI simulation.
//!
//! Runs a plain-text event script through the real dispatcher and controllers
//! against scripted host collaborators and the deterministic scheduler, and
//! returns a timestamped trace of every animation and window-move side effect.

pub mod host;
pub mod script;

// Re-export commonly used types at module level
pub use host::{ScriptedCatalog, ScriptedHost, ScriptedMood, ScriptedMover, Trace};
pub use script::{parse_script, ScriptError, ScriptStep};

use std::rc::Rc;

use anyhow::Context;

use crate::config::Config;
use crate::host::Mood;
use crate::input::KeyEvent;
use crate::rng::SmallRngSource;
use crate::sched::ManualScheduler;
use crate::session::PetSession;

/// Executes `script` against a fresh session built from `config`.
///
/// `seed` fixes the random source so runs are reproducible; without it each
/// run draws from OS entropy. `clip_ms` is the simulated duration of every
/// animation clip.
///
/// # Errors
/// Returns an error when the script does not parse or the configured
/// keybindings are invalid.
pub fn run_script(
    config: &Config,
    script: &str,
    seed: Option<u64>,
    clip_ms: u64,
) -> anyhow::Result<Vec<String>> {
    let steps = parse_script(script).context("failed to parse script")?;

    let sched = Rc::new(ManualScheduler::new());
    let trace = Trace::new(sched.clone());
    let host = Rc::new(ScriptedHost::new(sched.clone(), clip_ms, trace.clone()));
    let mover = Rc::new(ScriptedMover::new(trace.clone()));
    let mood = Rc::new(ScriptedMood::new(Mood::Normal));
    let catalog = Rc::new(ScriptedCatalog);
    let rng = match seed {
        Some(seed) => Box::new(SmallRngSource::seeded(seed)),
        None => Box::new(SmallRngSource::new()),
    };

    let session = PetSession::new(
        config,
        host,
        mover,
        mood.clone(),
        catalog,
        sched.clone(),
        rng,
    )
    .context("invalid keybinding configuration")?;

    for step in steps {
        match step {
            ScriptStep::Press(key) => {
                session.key_down(&KeyEvent::new(&key));
                sched.run_until_idle();
            }
            ScriptStep::Release(key) => {
                session.key_up(&key);
                sched.run_until_idle();
            }
            ScriptStep::Repeat(key) => {
                session.key_down(&KeyEvent::repeat(&key));
                sched.run_until_idle();
            }
            ScriptStep::Wait(delta) => {
                sched.advance(delta);
            }
            ScriptStep::Mood(new_mood) => {
                mood.set(new_mood);
                session.refresh_walk_anim();
                sched.run_until_idle();
            }
        }
    }

    Ok(trace.lines())
}
