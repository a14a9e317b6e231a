//! Raw input event types delivered by the host keyboard hook.

/// One of the four movement directions a key can be bound to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    Left,
    Right,
    Up,
    Down,
}

impl Direction {
    /// True for Left/Right, the directions that drive horizontal walks.
    pub fn is_horizontal(self) -> bool {
        matches!(self, Direction::Left | Direction::Right)
    }
}

/// A key-down transition as reported by the host.
///
/// Hosts deliver auto-repeat events while a key stays held; the dispatcher
/// ignores everything but the first transition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyEvent {
    pub key: String,
    pub is_repeat: bool,
}

impl KeyEvent {
    pub fn new(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            is_repeat: false,
        }
    }

    pub fn repeat(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            is_repeat: true,
        }
    }
}
