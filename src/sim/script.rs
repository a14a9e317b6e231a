//! Parser for plain-text simulation scripts.
//!
//! Scripts are line-oriented: one command per line, `#` starts a comment,
//! blank lines are skipped. Commands:
//!
//! ```text
//! press a        # key goes down
//! release a      # key comes up
//! repeat a       # auto-repeat event (should be inert)
//! wait 500       # advance the virtual clock by 500 ms
//! mood happy     # change the reported mood (happy/normal/poor/ill)
//! ```

use std::time::Duration;

use thiserror::Error;

use crate::host::Mood;

/// One parsed simulation command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScriptStep {
    Press(String),
    Release(String),
    Repeat(String),
    Wait(Duration),
    Mood(Mood),
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ScriptError {
    #[error("line {line}: unknown command '{command}'")]
    UnknownCommand { line: usize, command: String },

    #[error("line {line}: '{command}' needs an argument")]
    MissingArgument { line: usize, command: String },

    #[error("line {line}: invalid duration '{value}'")]
    InvalidDuration { line: usize, value: String },

    #[error("line {line}: unknown mood '{value}' (expected happy, normal, poor or ill)")]
    UnknownMood { line: usize, value: String },
}

/// Parses `input` into an ordered list of steps.
///
/// # Errors
/// Returns the first malformed line encountered.
pub fn parse_script(input: &str) -> Result<Vec<ScriptStep>, ScriptError> {
    let mut steps = Vec::new();

    for (index, raw) in input.lines().enumerate() {
        let line = index + 1;
        let text = match raw.split_once('#') {
            Some((before, _)) => before,
            None => raw,
        }
        .trim();
        if text.is_empty() {
            continue;
        }

        let mut parts = text.split_whitespace();
        let command = parts.next().unwrap_or_default().to_lowercase();
        let argument = parts.next();

        let step = match command.as_str() {
            "press" | "release" | "repeat" => {
                let key = argument
                    .ok_or(ScriptError::MissingArgument {
                        line,
                        command: command.clone(),
                    })?
                    .to_string();
                match command.as_str() {
                    "press" => ScriptStep::Press(key),
                    "release" => ScriptStep::Release(key),
                    _ => ScriptStep::Repeat(key),
                }
            }
            "wait" => {
                let value = argument.ok_or(ScriptError::MissingArgument {
                    line,
                    command: command.clone(),
                })?;
                let ms: u64 = value.parse().map_err(|_| ScriptError::InvalidDuration {
                    line,
                    value: value.to_string(),
                })?;
                ScriptStep::Wait(Duration::from_millis(ms))
            }
            "mood" => {
                let value = argument.ok_or(ScriptError::MissingArgument {
                    line,
                    command: command.clone(),
                })?;
                let mood = match value.to_lowercase().as_str() {
                    "happy" => Mood::Happy,
                    "normal" => Mood::Normal,
                    "poor" => Mood::PoorCondition,
                    "ill" => Mood::Ill,
                    _ => {
                        return Err(ScriptError::UnknownMood {
                            line,
                            value: value.to_string(),
                        });
                    }
                };
                ScriptStep::Mood(mood)
            }
            _ => {
                return Err(ScriptError::UnknownCommand {
                    line,
                    command: command.clone(),
                });
            }
        };
        steps.push(step);
    }

    Ok(steps)
}
