//! Enemy: walk the path, then charge the base and strike it once.
//!
//! Movement leaves re-check the base every tick because a running branch is
//! not preempted by the selector; once the base is down every enemy stops
//! where it stands.

use bt::{action, condition, selector, sequence, Node, Status};
use bt_core::{BbKey, Blackboard};

use crate::adapters::{Combat, Locomotion};
use crate::config::EnemyConfig;
use crate::entity::EntityId;

/// Index of the next waypoint to reach.
pub const WAYPOINT_INDEX: BbKey<usize> = BbKey::new("enemy.waypoint_index");

const MIN_ARRIVE_RADIUS: f32 = 0.01;

pub fn enemy_tree<W>(config: &EnemyConfig) -> Node<W>
where
    W: Locomotion + Combat + 'static,
{
    let damage = config.collision_damage;
    let contact_radius = config.contact_radius;

    selector(vec![
        sequence(vec![
            condition(|_ctx, _agent, world: &W, _bb| world.base().destroyed).labeled("base_destroyed"),
            action(|_ctx, agent, world: &mut W, _bb| {
                world.halt(agent);
                Status::Running
            })
            .labeled("halt"),
        ])
        .labeled("stand_down"),
        sequence(vec![
            condition(|_ctx, _agent, world: &W, bb| world.waypoint(next_waypoint(bb)).is_some())
                .labeled("has_waypoint"),
            action(|_ctx, agent, world: &mut W, bb| follow_path(agent, world, bb)).labeled("follow_path"),
        ])
        .labeled("path"),
        action(move |_ctx, agent, world: &mut W, _bb| charge_base(agent, world, damage, contact_radius))
            .labeled("charge_base"),
    ])
    .labeled("enemy")
}

fn next_waypoint(bb: &Blackboard) -> usize {
    bb.get(WAYPOINT_INDEX).copied().unwrap_or(0)
}

fn follow_path<W: Locomotion>(agent: EntityId, world: &mut W, bb: &mut Blackboard) -> Status {
    if world.base().destroyed {
        world.halt(agent);
        return Status::Failure;
    }
    let index = next_waypoint(bb);
    let (Some(position), Some(waypoint)) = (world.position(agent), world.waypoint(index)) else {
        return Status::Failure;
    };

    if position.distance(waypoint) <= world.waypoint_arrive_radius().max(MIN_ARRIVE_RADIUS) {
        bb.insert(WAYPOINT_INDEX, index + 1);
        return Status::Success;
    }
    world.set_target(agent, waypoint);
    Status::Running
}

/// Head for the base; on contact deal `damage` once, which also kills the enemy.
fn charge_base<W: Locomotion + Combat>(
    agent: EntityId,
    world: &mut W,
    damage: i32,
    contact_radius: f32,
) -> Status {
    let base = world.base();
    if base.destroyed {
        world.halt(agent);
        return Status::Failure;
    }
    let Some(position) = world.position(agent) else {
        return Status::Failure;
    };

    if position.distance(base.position) <= base.radius + contact_radius {
        world.halt(agent);
        return if world.strike_base(agent, damage) {
            Status::Success
        } else {
            Status::Failure
        };
    }
    world.set_target(agent, base.position);
    Status::Running
}
