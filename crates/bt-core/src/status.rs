#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Result of ticking a node once.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Status {
    Running,
    Success,
    Failure,
}

impl From<bool> for Status {
    fn from(value: bool) -> Self {
        if value {
            Status::Success
        } else {
            Status::Failure
        }
    }
}

impl Status {
    #[inline]
    pub fn is_running(self) -> bool {
        matches!(self, Status::Running)
    }

    /// `Success` or `Failure`: the activation episode ends on this tick.
    #[inline]
    pub fn is_terminal(self) -> bool {
        !self.is_running()
    }
}
