//! Autonomous villager: harvest what is nearby, otherwise idle and wander.
//!
//! Priority order (memory selector, so a running branch is resumed rather
//! than preempted):
//! 1. already harvesting: stay `Running` until the harvest ends;
//! 2. scan for the nearest resource, walk to a slot around it, harvest;
//! 3. wait `idle_time`, then walk to a random point nearby. A patrol that
//!    gets redirected by a group order fails, so the next activation starts
//!    over from the top.

use bt::{action, selector, sequence, wait_seconds, Node, Status};
use bt_core::{BbKey, Blackboard, TickContext};

use crate::adapters::{Locomotion, Perception};
use crate::config::VillagerConfig;
use crate::entity::{EntityId, ResourceId};
use crate::geom::{random_in_unit_circle, Vec2};

pub const TARGET_RESOURCE: BbKey<ResourceId> = BbKey::new("villager.target_resource");
pub const TARGET_SLOT: BbKey<Vec2> = BbKey::new("villager.target_slot");
pub const PATROL_POINT: BbKey<Vec2> = BbKey::new("villager.patrol_point");

const PATROL_RNG_STREAM: u64 = 0x5041_5452_4F4C;
const MIN_RING_RADIUS: f32 = 0.5;
const RING_MARGIN: f32 = 0.2;

#[derive(Debug, Clone, Copy)]
struct Patrol {
    wander_radius: f32,
    min_move_dist: f32,
    arrive_radius: f32,
}

pub fn auto_harvest_tree<W>(config: &VillagerConfig) -> Node<W>
where
    W: Locomotion + 'static,
{
    let scan_radius = config.scan_radius;
    let patrol = Patrol {
        wander_radius: config.wander_radius,
        min_move_dist: config.min_move_dist,
        arrive_radius: config.patrol_arrive_radius,
    };

    selector(vec![
        action(|_ctx, agent, world: &mut W, _bb| {
            if world.is_harvesting(agent) {
                Status::Running
            } else {
                Status::Failure
            }
        })
        .labeled("if_harvesting"),
        sequence(vec![
            action(move |_ctx, agent, world: &mut W, bb| {
                scan_nearest_resource(agent, world, bb, scan_radius)
            })
            .labeled("scan_nearest_resource"),
            action(|_ctx, agent, world: &mut W, bb| go_and_harvest(agent, world, bb))
                .labeled("go_and_harvest"),
        ])
        .labeled("harvest"),
        sequence(vec![
            wait_seconds(config.idle_time).labeled("idle"),
            action(move |ctx, agent, world: &mut W, bb| do_patrol(ctx, agent, world, bb, patrol))
                .labeled("patrol"),
        ])
        .labeled("wander"),
    ])
    .labeled("villager_auto")
}

/// Pick the nearest live resource and a slot on a ring around it, on the
/// side facing the villager.
fn scan_nearest_resource<W: Perception>(
    agent: EntityId,
    world: &W,
    bb: &mut Blackboard,
    scan_radius: f32,
) -> Status {
    bb.remove(TARGET_RESOURCE.name());

    let Some(position) = world.position(agent) else {
        return Status::Failure;
    };
    let Some(found) = world.nearest_resource(position, scan_radius) else {
        return Status::Failure;
    };

    let ring = found.interaction_radius.max(MIN_RING_RADIUS) + RING_MARGIN;
    let dir = (position - found.position).normalized_or(Vec2::RIGHT);
    bb.insert(TARGET_SLOT, found.position + dir * ring);
    bb.insert(TARGET_RESOURCE, found.id);
    Status::Success
}

/// `Running` until the harvest starts; `Failure` if the resource disappears first.
fn go_and_harvest<W: Locomotion>(agent: EntityId, world: &mut W, bb: &mut Blackboard) -> Status {
    if world.is_harvesting(agent) {
        return Status::Success;
    }
    let (Some(&resource), Some(&slot)) = (bb.get(TARGET_RESOURCE), bb.get(TARGET_SLOT)) else {
        return Status::Failure;
    };
    if world.resource(resource).is_none() {
        return Status::Failure;
    }

    world.set_harvest_target(agent, resource, slot);
    Status::Running
}

fn do_patrol<W: Locomotion>(
    ctx: &TickContext,
    agent: EntityId,
    world: &mut W,
    bb: &mut Blackboard,
    patrol: Patrol,
) -> Status {
    let Some(position) = world.position(agent) else {
        return Status::Failure;
    };

    if let Some(&point) = bb.get(PATROL_POINT) {
        if position.distance(point) <= patrol.arrive_radius {
            bb.remove(PATROL_POINT.name());
            return Status::Success;
        }
        if world.move_target(agent) == Some(point) {
            return Status::Running;
        }
        // Redirected by a group order, or halted short of the point.
        bb.remove(PATROL_POINT.name());
        return Status::Failure;
    }
    if world.move_target(agent).is_some() {
        // Let an order in progress finish before wandering off.
        return Status::Running;
    }

    let mut rng = ctx.frame_rng_for_agent(agent, PATROL_RNG_STREAM);
    let mut offset = random_in_unit_circle(&mut rng) * patrol.wander_radius;
    if offset.length() < patrol.min_move_dist {
        offset = offset.normalized_or(Vec2::RIGHT) * patrol.min_move_dist;
    }
    let point = position + offset;
    bb.insert(PATROL_POINT, point);
    world.set_target(agent, point);
    Status::Running
}
