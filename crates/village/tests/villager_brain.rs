use bt::{Status, TreeRunner};
use bt_core::FrameClock;
use village::brain::villager::{PATROL_POINT, TARGET_RESOURCE, TARGET_SLOT};
use village::brain::{auto_harvest_tree, command_follow_tree};
use village::config::{ResourcePlacement, VillageConfig};
use village::{Perception, ResourceId, ResourceKind, Vec2, VillageWorld};

const DT: f32 = 0.1;

fn empty_config() -> VillageConfig {
    let mut config = VillageConfig::default();
    config.world.resources.clear();
    config.world.towers.clear();
    config.world.initial_villagers = 0;
    config.spawner.villagers.enabled = false;
    config.spawner.waves.enabled = false;
    config
}

fn drive(world: &mut VillageWorld, runner: &mut TreeRunner<VillageWorld>, clock: &mut FrameClock) -> Status {
    let ctx = clock.advance(DT);
    let status = runner.tick(&ctx, world);
    world.integrate(ctx.dt_seconds);
    status
}

#[test]
fn villager_walks_to_ring_slot_and_harvests_nearest_resource() {
    let mut config = empty_config();
    config.world.resources = vec![
        ResourcePlacement::new(ResourceKind::Stone, Vec2::new(-5.0, 0.0)),
        ResourcePlacement::new(ResourceKind::Wood, Vec2::new(3.0, 0.0)),
    ];
    let mut world = VillageWorld::new(&config);
    let villager = world.spawn_villager(Vec2::ZERO);
    let mut runner = TreeRunner::from_root(villager, auto_harvest_tree(&config.villager));
    let mut clock = FrameClock::new(1);

    assert_eq!(drive(&mut world, &mut runner, &mut clock), Status::Running);
    assert_eq!(runner.blackboard().get(TARGET_RESOURCE), Some(&ResourceId(1)));
    let slot = *runner.blackboard().get(TARGET_SLOT).unwrap();
    assert!(slot.distance(Vec2::new(2.2, 0.0)) < 1e-4, "{slot:?}");

    let mut saw_harvest = false;
    for _ in 0..60 {
        drive(&mut world, &mut runner, &mut clock);
        saw_harvest |= world.is_harvesting(villager);
        if world.inventory().wood() == 1 {
            break;
        }
    }

    assert!(saw_harvest);
    assert_eq!(world.inventory().wood(), 1);
    assert_eq!(world.inventory().stone(), 0);
    assert!(world.resource_node(ResourceId(1)).unwrap().is_depleted());
    assert!(!world.is_harvesting(villager));
    assert_eq!(world.stats().harvests, 1);
}

#[test]
fn idle_villager_waits_then_patrols_nearby() {
    let config = empty_config();
    let mut world = VillageWorld::new(&config);
    let villager = world.spawn_villager(Vec2::ZERO);
    let mut runner = TreeRunner::from_root(villager, auto_harvest_tree(&config.villager));
    let mut clock = FrameClock::new(2);

    for _ in 0..9 {
        assert_eq!(drive(&mut world, &mut runner, &mut clock), Status::Running);
        assert!(!runner.blackboard().contains(PATROL_POINT));
    }

    // idle_time (1s) elapses on the 10th frame; patrol picks its point the same tick.
    assert_eq!(drive(&mut world, &mut runner, &mut clock), Status::Running);
    let point = *runner.blackboard().get(PATROL_POINT).unwrap();
    let dist = point.distance(Vec2::ZERO);
    assert!((0.5 - 1e-4..=3.0 + 1e-4).contains(&dist), "{dist}");

    let mut arrived = false;
    for _ in 0..40 {
        if drive(&mut world, &mut runner, &mut clock) == Status::Success {
            arrived = true;
            break;
        }
    }
    assert!(arrived);
    assert!(!runner.blackboard().contains(PATROL_POINT));
    assert!(world.position(villager).unwrap().distance(point) <= 0.25);
}

#[test]
fn resources_out_of_scan_range_are_ignored() {
    let mut config = empty_config();
    config.villager.scan_radius = 2.0;
    config.world.resources = vec![ResourcePlacement::new(ResourceKind::Wood, Vec2::new(4.0, 0.0))];
    let mut world = VillageWorld::new(&config);
    let villager = world.spawn_villager(Vec2::ZERO);
    let mut runner = TreeRunner::from_root(villager, auto_harvest_tree(&config.villager));
    let mut clock = FrameClock::new(3);

    drive(&mut world, &mut runner, &mut clock);
    assert!(!runner.blackboard().contains(TARGET_RESOURCE));
    assert_eq!(world.villager(villager).unwrap().harvest_target(), None);
}

#[test]
fn command_villager_follows_latest_move_point() {
    let config = empty_config();
    let mut world = VillageWorld::new(&config);
    let villager = world.spawn_villager(Vec2::ZERO);
    let mut runner = TreeRunner::from_root(villager, command_follow_tree());
    let mut clock = FrameClock::new(4);

    assert_eq!(drive(&mut world, &mut runner, &mut clock), Status::Failure);
    assert_eq!(world.position(villager), Some(Vec2::ZERO));

    world.commands_mut().issue_move(Vec2::new(2.0, 1.0));
    for _ in 0..20 {
        assert_eq!(drive(&mut world, &mut runner, &mut clock), Status::Success);
    }
    assert!(world.position(villager).unwrap().distance(Vec2::new(2.0, 1.0)) <= 0.1 + 1e-4);

    world.commands_mut().issue_move(Vec2::new(-1.0, 0.0));
    drive(&mut world, &mut runner, &mut clock);
    assert!(world.villager(villager).unwrap().target().is_some());
}

#[test]
fn group_harvest_order_spreads_villagers_around_the_resource() {
    let mut config = empty_config();
    config.world.resources = vec![ResourcePlacement::new(ResourceKind::Stone, Vec2::new(5.0, 5.0))];
    let mut world = VillageWorld::new(&config);
    let ids: Vec<_> = (0..4)
        .map(|i| {
            let angle = std::f32::consts::FRAC_PI_2 * i as f32;
            world.spawn_villager(Vec2::new(5.0 + 2.0 * angle.cos(), 5.0 + 2.0 * angle.sin()))
        })
        .collect();

    assert_eq!(world.send_group_to_harvest(ResourceId(0)).unwrap(), 4);
    for id in &ids {
        let villager = world.villager(*id).unwrap();
        assert_eq!(villager.harvest_target(), Some(ResourceId(0)));
        let slot = villager.target().unwrap();
        assert!((slot.distance(Vec2::new(5.0, 5.0)) - 0.8).abs() < 1e-4);
    }

    for _ in 0..10 {
        world.integrate(DT);
    }
    assert!(ids.iter().all(|id| world.is_harvesting(*id)));
    assert_eq!(world.resource_node(ResourceId(0)).unwrap().harvesters(), 4);
    assert!(world.send_group_to_harvest(ResourceId(7)).is_err());
}

#[test]
fn group_move_skips_villagers_that_are_harvesting() {
    let mut config = empty_config();
    config.world.resources = vec![ResourcePlacement::new(ResourceKind::Wood, Vec2::new(0.0, 0.5))];
    let mut world = VillageWorld::new(&config);
    // The first ring slot is (0.8, 0.5), already within reach of `busy`.
    let busy = world.spawn_villager(Vec2::new(0.8, 0.6));
    let idle = world.spawn_villager(Vec2::new(4.0, 0.0));

    assert_eq!(world.send_group_to_harvest(ResourceId(0)).unwrap(), 2);
    world.integrate(DT);
    assert!(world.is_harvesting(busy));

    assert_eq!(world.send_all_to_move(Vec2::new(-3.0, -3.0)), 1);
    assert_eq!(world.villager(idle).unwrap().harvest_target(), None);
    assert!(world.villager(idle).unwrap().target().is_some());
}

#[test]
fn group_move_during_patrol_abandons_the_patrol_and_resumes_harvesting() {
    let mut config = empty_config();
    // Keeps the first patrol leg well beyond one frame of walking.
    config.villager.min_move_dist = 1.5;
    config.world.resources = vec![ResourcePlacement::new(ResourceKind::Wood, Vec2::new(20.0, 1.0))];
    let mut world = VillageWorld::new(&config);
    let villager = world.spawn_villager(Vec2::ZERO);
    let mut runner = TreeRunner::from_root(villager, auto_harvest_tree(&config.villager));
    let mut clock = FrameClock::new(5);

    for _ in 0..10 {
        drive(&mut world, &mut runner, &mut clock);
    }
    let patrol_point = *runner.blackboard().get(PATROL_POINT).unwrap();

    assert_eq!(world.send_all_to_move(Vec2::new(20.0, 0.0)), 1);
    assert_eq!(drive(&mut world, &mut runner, &mut clock), Status::Failure);
    assert!(!runner.blackboard().contains(PATROL_POINT));
    assert_ne!(world.villager(villager).unwrap().target(), Some(patrol_point));

    for _ in 0..400 {
        drive(&mut world, &mut runner, &mut clock);
        if world.inventory().wood() == 1 {
            break;
        }
    }
    assert_eq!(world.inventory().wood(), 1);
    // Ring slot (0.8) plus the mover's stop radius around it (0.6).
    assert!(world.position(villager).unwrap().distance(Vec2::new(20.0, 1.0)) <= 1.4 + 1e-3);
}
