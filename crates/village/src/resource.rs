use bt_core::DeterministicRng;
use serde::Serialize;

use crate::config::ResourceConfig;
use crate::entity::{ResourceId, ResourceKind};
use crate::geom::Vec2;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "snake_case", tag = "state")]
pub enum ResourceState {
    Available,
    /// Hidden until `remaining` seconds have passed.
    Respawning { remaining: f32 },
    /// Depleted for good (respawn disabled).
    Gone,
}

/// A harvestable node. Any number of villagers may work it at once, but only
/// the first to finish gets the yield.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResourceNode {
    id: ResourceId,
    kind: ResourceKind,
    position: Vec2,
    interaction_radius: f32,
    min_duration: f32,
    max_duration: f32,
    respawn: Option<(f32, f32)>,
    consumed: bool,
    harvesters: u32,
    state: ResourceState,
}

impl ResourceNode {
    pub fn new(id: ResourceId, kind: ResourceKind, position: Vec2, config: &ResourceConfig) -> Self {
        Self {
            id,
            kind,
            position,
            interaction_radius: config.interaction_radius,
            min_duration: config.min_harvest_duration,
            max_duration: config.max_harvest_duration,
            respawn: config
                .respawn
                .then_some((config.respawn_min, config.respawn_max)),
            consumed: false,
            harvesters: 0,
            state: ResourceState::Available,
        }
    }

    pub fn id(&self) -> ResourceId {
        self.id
    }

    pub fn kind(&self) -> ResourceKind {
        self.kind
    }

    pub fn position(&self) -> Vec2 {
        self.position
    }

    pub fn interaction_radius(&self) -> f32 {
        self.interaction_radius
    }

    pub fn state(&self) -> ResourceState {
        self.state
    }

    pub fn harvesters(&self) -> u32 {
        self.harvesters
    }

    pub fn is_depleted(&self) -> bool {
        self.consumed || self.state != ResourceState::Available
    }

    pub fn next_harvest_duration(&self, rng: &mut impl DeterministicRng) -> f32 {
        rng.next_range_f32(self.min_duration, self.max_duration)
    }

    /// Claim the yield. Only the first caller after a (re)spawn succeeds.
    pub fn try_consume(&mut self) -> bool {
        if self.is_depleted() {
            return false;
        }
        self.consumed = true;
        true
    }

    pub fn register_harvester(&mut self) {
        self.harvesters = self.harvesters.saturating_add(1);
    }

    pub fn unregister_harvester(&mut self) {
        self.harvesters = self.harvesters.saturating_sub(1);
    }

    /// Hide the node after its yield was taken, scheduling a respawn if enabled.
    pub fn deplete(&mut self, rng: &mut impl DeterministicRng) {
        if self.state != ResourceState::Available {
            return;
        }
        self.state = match self.respawn {
            Some((min, max)) => ResourceState::Respawning {
                remaining: rng.next_range_f32(min, max),
            },
            None => ResourceState::Gone,
        };
    }

    /// Advance the respawn timer. Returns `true` on the frame the node comes back.
    pub fn update(&mut self, dt: f32) -> bool {
        let ResourceState::Respawning { remaining } = self.state else {
            return false;
        };
        let remaining = remaining - dt;
        if remaining > 0.0 {
            self.state = ResourceState::Respawning { remaining };
            return false;
        }
        self.state = ResourceState::Available;
        self.consumed = false;
        self.harvesters = 0;
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bt_core::SplitMix64;

    fn node(respawn: bool) -> ResourceNode {
        let config = ResourceConfig {
            respawn,
            respawn_min: 1.0,
            respawn_max: 1.0,
            ..ResourceConfig::default()
        };
        ResourceNode::new(ResourceId(0), ResourceKind::Wood, Vec2::ZERO, &config)
    }

    #[test]
    fn only_first_consumer_wins() {
        let mut n = node(true);
        assert!(n.try_consume());
        assert!(!n.try_consume());
        assert!(n.is_depleted());
    }

    #[test]
    fn respawns_after_timer() {
        let mut rng = SplitMix64::new(1);
        let mut n = node(true);
        n.register_harvester();
        assert!(n.try_consume());
        n.deplete(&mut rng);
        assert_eq!(n.state(), ResourceState::Respawning { remaining: 1.0 });

        assert!(!n.update(0.6));
        assert!(n.is_depleted());
        assert!(n.update(0.6));
        assert!(!n.is_depleted());
        assert_eq!(n.harvesters(), 0);
    }

    #[test]
    fn without_respawn_stays_gone() {
        let mut rng = SplitMix64::new(1);
        let mut n = node(false);
        assert!(n.try_consume());
        n.deplete(&mut rng);
        assert_eq!(n.state(), ResourceState::Gone);
        assert!(!n.update(100.0));
        assert!(n.is_depleted());
    }

    #[test]
    fn harvest_duration_within_range() {
        let mut rng = SplitMix64::new(9);
        let n = node(true);
        for _ in 0..64 {
            let d = n.next_harvest_duration(&mut rng);
            assert!((2.0..=3.0).contains(&d));
        }
    }
}
