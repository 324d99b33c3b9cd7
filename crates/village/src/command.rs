use crate::geom::Vec2;

/// Player orders waiting to be picked up by command-driven villagers.
///
/// Only the most recent move point is kept; issuing a new one replaces it.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct CommandBus {
    last_move_point: Option<Vec2>,
}

impl CommandBus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn issue_move(&mut self, point: Vec2) {
        tracing::debug!(x = point.x, y = point.y, "move command issued");
        self.last_move_point = Some(point);
    }

    pub fn clear(&mut self) {
        self.last_move_point = None;
    }

    pub fn last_move_point(&self) -> Option<Vec2> {
        self.last_move_point
    }
}
