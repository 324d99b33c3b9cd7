//! World access for brain leaves.
//!
//! Leaves never touch a concrete world type. They go through these extension
//! traits over [`WorldView`]/[`WorldMut`], so a brain runs the same against
//! [`VillageWorld`](crate::VillageWorld) and against a test double.

use bt_core::{WorldMut, WorldView};

use crate::entity::{EntityId, ResourceId, ResourceKind};
use crate::geom::Vec2;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResourceSighting {
    pub id: ResourceId,
    pub kind: ResourceKind,
    pub position: Vec2,
    pub interaction_radius: f32,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TargetSighting {
    pub id: EntityId,
    pub position: Vec2,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BaseSighting {
    pub position: Vec2,
    pub radius: f32,
    pub destroyed: bool,
}

/// Read-only queries.
pub trait Perception: WorldView<Agent = EntityId> {
    fn position(&self, agent: EntityId) -> Option<Vec2>;

    /// Point the agent is currently walking to, if any.
    fn move_target(&self, agent: EntityId) -> Option<Vec2>;

    /// Nearest non-depleted resource within `radius` of `origin`.
    fn nearest_resource(&self, origin: Vec2, radius: f32) -> Option<ResourceSighting>;

    /// `None` once the resource is depleted (or never existed).
    fn resource(&self, id: ResourceId) -> Option<ResourceSighting>;

    /// Nearest living enemy within `radius` of `origin`.
    fn nearest_enemy(&self, origin: Vec2, radius: f32) -> Option<TargetSighting>;

    /// `None` once the enemy is dead.
    fn enemy(&self, id: EntityId) -> Option<TargetSighting>;

    fn base(&self) -> BaseSighting;

    fn waypoint(&self, index: usize) -> Option<Vec2>;

    fn waypoint_arrive_radius(&self) -> f32;

    /// Latest player move order.
    fn move_command(&self) -> Option<Vec2>;

    fn is_harvesting(&self, agent: EntityId) -> bool;
}

/// Movement orders; the world integrates them after the trees ran.
pub trait Locomotion: WorldMut + Perception {
    fn set_target(&mut self, agent: EntityId, point: Vec2);

    /// Walk to `slot` and harvest `resource` once in reach.
    fn set_harvest_target(&mut self, agent: EntityId, resource: ResourceId, slot: Vec2);

    fn halt(&mut self, agent: EntityId);
}

pub trait Combat: WorldMut + Perception {
    /// Damage the base and remove the attacker. Returns `false` if the
    /// attacker already struck or is gone.
    fn strike_base(&mut self, attacker: EntityId, damage: i32) -> bool;

    /// Returns `false` if the target is already dead.
    fn damage_enemy(&mut self, target: EntityId, amount: i32) -> bool;
}
