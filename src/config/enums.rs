//! Configuration enum types.

use serde::{Deserialize, Serialize};

/// Input dispatch profile.
///
/// Selects how the dispatcher routes direction keys to the controllers.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "kebab-case")]
pub enum InputProfile {
    /// Every direction key drives the walk controller. Releasing the active
    /// key promotes the most recently pressed remaining key, if any.
    WalkOnly,
    /// Left/Right drive the walk controller; Down/Up toggle the posture
    /// controller and escalate into a walk when held. No promotion on release.
    #[default]
    PostureHold,
}
