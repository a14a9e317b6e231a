//! Keybinding configuration types and parsing.
//!
//! Maps named keyboard keys to the four movement directions. Key names are
//! matched case-insensitively, so "A", "a", and "Left" all work as users
//! would expect.

use crate::input::Direction;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use thiserror::Error;

/// Errors produced while building the key lookup table.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum KeybindingError {
    #[error("empty key name bound to {0:?}")]
    EmptyKey(Direction),

    #[error("key '{key}' bound to both {first:?} and {second:?}")]
    Duplicate {
        key: String,
        first: Direction,
        second: Direction,
    },
}

/// Configuration for direction keybindings.
///
/// Each direction can have multiple keys. Users specify them in config.toml as:
/// ```toml
/// [keybindings]
/// left = ["A", "Left"]
/// right = ["D", "Right"]
/// up = ["W", "Up"]
/// down = ["S", "Down"]
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KeybindingsConfig {
    #[serde(default = "default_left")]
    pub left: Vec<String>,

    #[serde(default = "default_right")]
    pub right: Vec<String>,

    #[serde(default = "default_up")]
    pub up: Vec<String>,

    #[serde(default = "default_down")]
    pub down: Vec<String>,
}

impl Default for KeybindingsConfig {
    fn default() -> Self {
        Self {
            left: default_left(),
            right: default_right(),
            up: default_up(),
            down: default_down(),
        }
    }
}

impl KeybindingsConfig {
    /// Build a lookup map from normalized key names to directions.
    /// Returns an error on empty key names or keys bound to two directions.
    pub fn build_direction_map(&self) -> Result<HashMap<String, Direction>, KeybindingError> {
        let mut map = HashMap::new();

        let mut insert_binding = |key: &str, direction: Direction| -> Result<(), KeybindingError> {
            let normalized = key.trim().to_lowercase();
            if normalized.is_empty() {
                return Err(KeybindingError::EmptyKey(direction));
            }
            if let Some(existing) = map.insert(normalized.clone(), direction) {
                if existing != direction {
                    return Err(KeybindingError::Duplicate {
                        key: normalized,
                        first: existing,
                        second: direction,
                    });
                }
            }
            Ok(())
        };

        for key in &self.left {
            insert_binding(key, Direction::Left)?;
        }

        for key in &self.right {
            insert_binding(key, Direction::Right)?;
        }

        for key in &self.up {
            insert_binding(key, Direction::Up)?;
        }

        for key in &self.down {
            insert_binding(key, Direction::Down)?;
        }

        Ok(map)
    }
}

// =============================================================================
// Default keybinding functions (WASD plus arrow keys)
// =============================================================================

fn default_left() -> Vec<String> {
    vec!["A".to_string(), "Left".to_string()]
}

fn default_right() -> Vec<String> {
    vec!["D".to_string(), "Right".to_string()]
}

fn default_up() -> Vec<String> {
    vec!["W".to_string(), "Up".to_string()]
}

fn default_down() -> Vec<String> {
    vec!["S".to_string(), "Down".to_string()]
}
