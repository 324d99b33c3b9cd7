use bt::{action, sequence, wait_seconds, Node, Status};
use bt_core::{BbKey, Blackboard};

use crate::adapters::Combat;
use crate::config::TowerConfig;
use crate::entity::EntityId;

/// Enemy the tower is currently shooting at.
pub const TOWER_TARGET: BbKey<EntityId> = BbKey::new("tower.target");

const MIN_FIRE_RATE: f32 = 0.01;

/// Acquire → fire → cool down.
///
/// A target is kept while it stays alive and in range. Shots hit instantly.
/// The first shot goes out on the tick a target is acquired.
pub fn tower_tree<W>(config: &TowerConfig) -> Node<W>
where
    W: Combat + 'static,
{
    let range = config.range;
    let damage = config.damage;
    let cooldown = 1.0 / config.fire_rate.max(MIN_FIRE_RATE);

    sequence(vec![
        action(move |_ctx, agent, world: &mut W, bb| acquire_target(agent, world, bb, range))
            .labeled("acquire_target"),
        action(move |_ctx, _agent, world: &mut W, bb| fire(world, bb, damage)).labeled("fire"),
        wait_seconds(cooldown).labeled("cooldown"),
    ])
    .labeled("tower")
}

fn acquire_target<W: Combat>(agent: EntityId, world: &W, bb: &mut Blackboard, range: f32) -> Status {
    let Some(position) = world.position(agent) else {
        return Status::Failure;
    };

    let current = bb
        .get(TOWER_TARGET)
        .and_then(|&id| world.enemy(id))
        .filter(|enemy| enemy.position.distance(position) <= range);
    if current.is_some() {
        return Status::Success;
    }

    match world.nearest_enemy(position, range) {
        Some(enemy) => {
            tracing::debug!(tower = %agent, target = %enemy.id, "target acquired");
            bb.insert(TOWER_TARGET, enemy.id);
            Status::Success
        }
        None => {
            bb.remove(TOWER_TARGET.name());
            Status::Failure
        }
    }
}

fn fire<W: Combat>(world: &mut W, bb: &mut Blackboard, damage: i32) -> Status {
    let Some(&target) = bb.get(TOWER_TARGET) else {
        return Status::Failure;
    };
    if world.damage_enemy(target, damage) {
        Status::Success
    } else {
        bb.remove(TOWER_TARGET.name());
        Status::Failure
    }
}
