use std::fs;
use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;

use petstride::config::{Config, InputProfile};
use petstride::sim;

const VERSION: &str = concat!(
    env!("CARGO_PKG_VERSION"),
    " (",
    env!("PETSTRIDE_GIT_HASH"),
    ")"
);

#[derive(Parser, Debug)]
#[command(name = "petstride")]
#[command(version = VERSION, about = "Keyboard-driven desktop pet locomotion coordinator")]
struct Cli {
    /// Run a scripted simulation from this event script file
    #[arg(long, short = 's', value_name = "FILE")]
    script: Option<PathBuf>,

    /// Seed for the random source (omit for OS entropy)
    #[arg(long, value_name = "SEED")]
    seed: Option<u64>,

    /// Simulated duration of every animation clip in milliseconds
    #[arg(long, value_name = "MS", default_value_t = 200)]
    clip_ms: u64,

    /// Override the input profile (walk-only or posture-hold)
    #[arg(long, short = 'p', value_name = "PROFILE")]
    profile: Option<String>,
}

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let cli = Cli::parse();

    let mut config = Config::load()?;
    if let Some(profile) = &cli.profile {
        config.input.profile = parse_profile(profile)?;
    }

    if let Some(path) = &cli.script {
        let script = fs::read_to_string(path)
            .with_context(|| format!("failed to read script: {}", path.display()))?;
        let trace = sim::run_script(&config, &script, cli.seed, cli.clip_ms)?;
        for line in trace {
            println!("{line}");
        }
    } else {
        // No script: show usage
        println!("petstride: Keyboard-driven desktop pet locomotion coordinator");
        println!();
        println!("Usage:");
        println!("  petstride --script walk.txt    Run a scripted simulation");
        println!("  petstride --help               Show help");
        println!();
        println!("Script commands (one per line, '#' starts a comment):");
        println!("  press <key>      Key goes down");
        println!("  release <key>    Key comes up");
        println!("  repeat <key>     Auto-repeat event (ignored by the dispatcher)");
        println!("  wait <ms>        Advance the virtual clock");
        println!("  mood <m>         Change the mood (happy, normal, poor, ill)");
        println!();
        println!("Options:");
        println!("  --seed <n>       Fix the random source for reproducible runs");
        println!("  --clip-ms <n>    Simulated clip duration (default 200)");
        println!("  --profile <p>    walk-only or posture-hold");
    }

    Ok(())
}

fn parse_profile(value: &str) -> anyhow::Result<InputProfile> {
    match value {
        "walk-only" => Ok(InputProfile::WalkOnly),
        "posture-hold" => Ok(InputProfile::PostureHold),
        other => Err(anyhow::anyhow!(
            "unknown profile '{other}' (expected walk-only or posture-hold)"
        )),
    }
}
