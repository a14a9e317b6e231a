//! Configuration type definitions.

use super::enums::InputProfile;
use serde::{Deserialize, Serialize};

/// Walk movement settings.
///
/// Controls how far and how often the character window moves per timer tick
/// while a walk is active. Horizontal speeds are per-tick distances selected
/// by the character's current mood.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WalkConfig {
    /// Move timer interval in milliseconds (valid range: 16 - 1000)
    #[serde(default = "default_interval_ms")]
    pub interval_ms: u64,

    /// Vertical step in pixels per tick for climb/fall (valid range: 1 - 100)
    #[serde(default = "default_step_px")]
    pub step_px: i32,

    /// Horizontal pixels per tick when the mood is happy (valid range: 1 - 100)
    #[serde(default = "default_speed_happy")]
    pub speed_happy: i32,

    /// Horizontal pixels per tick when the mood is normal (valid range: 1 - 100)
    #[serde(default = "default_speed_normal")]
    pub speed_normal: i32,

    /// Horizontal pixels per tick in poor condition or illness (valid range: 1 - 100)
    #[serde(default = "default_speed_poor")]
    pub speed_poor: i32,
}

impl Default for WalkConfig {
    fn default() -> Self {
        Self {
            interval_ms: default_interval_ms(),
            step_px: default_step_px(),
            speed_happy: default_speed_happy(),
            speed_normal: default_speed_normal(),
            speed_poor: default_speed_poor(),
        }
    }
}

/// Hold-disambiguation settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HoldConfig {
    /// How long a Down/Up key must stay held before the press escalates from
    /// a posture toggle into a walk, in milliseconds (valid range: 100 - 10000)
    #[serde(default = "default_hold_ms")]
    pub hold_ms: u64,
}

impl Default for HoldConfig {
    fn default() -> Self {
        Self {
            hold_ms: default_hold_ms(),
        }
    }
}

/// Input dispatch settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InputConfig {
    /// Dispatch profile: "walk-only" routes every direction to the walk
    /// controller, "posture-hold" adds sit/stand handling on Down/Up
    #[serde(default)]
    pub profile: InputProfile,
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            profile: InputProfile::default(),
        }
    }
}

// =============================================================================
// Default value functions
// =============================================================================

fn default_interval_ms() -> u64 {
    60
}

fn default_step_px() -> i32 {
    10
}

fn default_speed_happy() -> i32 {
    15
}

fn default_speed_normal() -> i32 {
    10
}

fn default_speed_poor() -> i32 {
    5
}

fn default_hold_ms() -> u64 {
    1000
}
