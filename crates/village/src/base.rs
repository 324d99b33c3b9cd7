use serde::Serialize;

use crate::geom::Vec2;

/// The village base enemies try to reach. The game is lost at 0 HP.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BaseHealth {
    position: Vec2,
    radius: f32,
    max_health: i32,
    current: i32,
    #[serde(skip)]
    changed: bool,
}

impl BaseHealth {
    pub fn new(position: Vec2, radius: f32, max_health: i32) -> Self {
        let max_health = max_health.max(1);
        Self {
            position,
            radius,
            max_health,
            current: max_health,
            changed: false,
        }
    }

    pub fn position(&self) -> Vec2 {
        self.position
    }

    pub fn radius(&self) -> f32 {
        self.radius
    }

    pub fn current(&self) -> i32 {
        self.current
    }

    pub fn max_health(&self) -> i32 {
        self.max_health
    }

    pub fn is_destroyed(&self) -> bool {
        self.current <= 0
    }

    /// Apply damage; ignored for non-positive amounts or a destroyed base.
    pub fn take_damage(&mut self, amount: i32) {
        if amount <= 0 || self.is_destroyed() {
            return;
        }
        self.current = (self.current - amount).max(0);
        self.changed = true;
        tracing::info!(damage = amount, hp = self.current, max = self.max_health, "base damaged");
        if self.is_destroyed() {
            tracing::info!("base destroyed");
        }
    }

    pub fn heal(&mut self, amount: i32) {
        if amount <= 0 || self.is_destroyed() {
            return;
        }
        self.current = (self.current + amount).min(self.max_health);
        self.changed = true;
    }

    pub fn take_changed(&mut self) -> bool {
        std::mem::take(&mut self.changed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn damage_clamps_at_zero_and_stops_applying() {
        let mut base = BaseHealth::new(Vec2::ZERO, 0.5, 10);
        base.take_damage(4);
        assert_eq!(base.current(), 6);
        assert!(base.take_changed());

        base.take_damage(50);
        assert_eq!(base.current(), 0);
        assert!(base.is_destroyed());
        base.take_changed();

        base.take_damage(1);
        base.heal(5);
        assert_eq!(base.current(), 0);
        assert!(!base.take_changed());
    }

    #[test]
    fn heal_caps_at_max() {
        let mut base = BaseHealth::new(Vec2::ZERO, 0.5, 10);
        base.take_damage(3);
        base.heal(10);
        assert_eq!(base.current(), 10);
    }
}
