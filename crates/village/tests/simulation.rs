use bt_tools::TraceLog;
use village::config::{BrainKind, Order, ScheduledOrder, VillageConfig, WaveConfig};
use village::{
    AgentKind, EntityId, Perception, ResourceId, ResourceKind, Simulation, TowerPurchase, Vec2,
    VillageError,
};

const DT: f32 = 0.02;

/// No agents, no spawners: tests add what they need.
fn quiet_config() -> VillageConfig {
    let mut config = VillageConfig::default();
    config.world.initial_villagers = 0;
    config.world.towers.clear();
    config.spawner.villagers.enabled = false;
    config.spawner.waves.enabled = false;
    config
}

fn seconds(s: f32) -> u64 {
    (s / DT).round() as u64
}

#[test]
fn villagers_harvest_into_the_inventory() {
    let mut config = quiet_config();
    config.world.initial_villagers = 3;
    let mut sim = Simulation::new(config).unwrap();
    assert_eq!(sim.world().villager_count(), 3);
    assert_eq!(sim.runner_count(), 3);

    let report = sim.run(seconds(20.0), DT);
    assert!(report.wood + report.stone >= 1, "{report:?}");
    assert_eq!(report.harvests, u64::from(report.wood + report.stone));
    assert_eq!(report.frames, seconds(20.0));
}

#[test]
fn tower_and_base_account_for_every_enemy() {
    let mut config = quiet_config();
    config.world.towers = vec![Vec2::new(3.0, 0.0)];
    config.spawner.waves.enabled = true;
    let mut sim = Simulation::new(config).unwrap();

    let report = sim.run(seconds(60.0), DT);
    assert!(report.waves_finished);
    assert_eq!(report.enemies_spawned, 5);
    assert_eq!(report.enemies_alive, 0);
    assert!(report.enemies_killed >= 1, "{report:?}");
    assert_eq!(report.enemies_killed + report.base_strikes, 5);
    assert_eq!(report.base_health, 100 - 5 * report.base_strikes as i32);
    // Dead enemies are reaped together with their trees.
    assert_eq!(sim.runner_count(), 1);
}

#[test]
fn undefended_base_falls_and_the_rest_stand_down() {
    let mut config = quiet_config();
    config.base.max_health = 10;
    config.spawner.waves.enabled = true;
    config.spawner.waves.waves = vec![WaveConfig {
        count: 3,
        spawn_interval: 0.5,
        start_delay: 0.5,
    }];
    let mut sim = Simulation::new(config).unwrap();

    let report = sim.run(seconds(30.0), DT);
    assert!(report.base_destroyed);
    assert_eq!(report.base_health, 0);
    assert_eq!(report.base_strikes, 2);
    assert_eq!(report.enemies_alive, 1);

    let (survivor, _) = sim.world().enemies().next().unwrap();
    let parked = sim.world().position(survivor);
    for _ in 0..50 {
        sim.step(DT);
    }
    assert_eq!(sim.world().position(survivor), parked);
}

#[test]
fn same_seed_same_outcome() {
    let mut config = VillageConfig::default();
    config.seed = 7;
    let mut a = Simulation::new(config.clone()).unwrap();
    let mut b = Simulation::new(config).unwrap();

    let first = a.run(seconds(30.0), DT);
    let second = b.run(seconds(30.0), DT);
    assert_eq!(first, second);

    let positions = |sim: &Simulation| -> Vec<(EntityId, Vec2)> {
        sim.world().villagers().map(|(id, v)| (id, v.position())).collect()
    };
    assert_eq!(positions(&a), positions(&b));
}

#[test]
fn villager_spawner_stops_at_max_alive() {
    let mut config = quiet_config();
    config.spawner.villagers.enabled = true;
    config.spawner.villagers.interval = 1.0;
    config.spawner.villagers.max_alive = 2;
    let mut sim = Simulation::new(config).unwrap();

    let report = sim.run(seconds(10.0), DT);
    assert_eq!(report.villagers_spawned, 2);
    assert_eq!(report.villagers, 2);
}

#[test]
fn despawn_removes_agent_and_tree() {
    let mut config = quiet_config();
    config.world.initial_villagers = 2;
    let mut sim = Simulation::new(config).unwrap();
    sim.step(DT);

    let (id, _) = sim.world().villagers().next().unwrap();
    assert_eq!(sim.despawn(id).unwrap(), AgentKind::Villager);
    assert!(sim.runner(id).is_none());
    assert_eq!(sim.world().villager_count(), 1);

    match sim.despawn(id) {
        Err(VillageError::UnknownEntity(missing)) => assert_eq!(missing, id),
        other => panic!("expected unknown entity, got {other:?}"),
    }
}

#[test]
fn traced_agent_records_node_events() {
    let mut config = quiet_config();
    config.world.initial_villagers = 1;
    config.world.resources.clear();
    let mut sim = Simulation::new(config).unwrap();
    let (id, _) = sim.world().villagers().next().unwrap();

    assert!(sim.trace_log(id).is_none());
    sim.trace_agent(id).unwrap();
    sim.step(DT);

    let log: &TraceLog = sim.trace_log(id).unwrap();
    assert_eq!(log.count("bt.node.start", "villager_auto"), 1);
    assert_eq!(log.count("bt.node.stop", "scan_nearest_resource"), 1);
    assert_eq!(log.count("bt.node.start", "idle"), 1);
    assert_eq!(log.count("bt.node.stop", "idle"), 0);

    assert!(sim.trace_agent(EntityId(999)).is_err());
}

#[test]
fn zero_and_negative_frames_do_not_advance_time() {
    let mut config = quiet_config();
    config.spawner.waves.enabled = true;
    let mut sim = Simulation::new(config).unwrap();

    for _ in 0..100 {
        sim.step(-1.0);
        sim.step(0.0);
    }
    let report = sim.report();
    assert_eq!(report.frames, 200);
    assert_eq!(report.elapsed_seconds, 0.0);
    assert_eq!(report.enemies_spawned, 0);
}

#[test]
fn invalid_config_is_rejected() {
    let mut config = VillageConfig::default();
    config.villager.move_speed = 0.0;
    assert!(matches!(
        Simulation::new(config),
        Err(VillageError::InvalidConfig { .. })
    ));
}

#[test]
fn report_serializes_to_json() {
    let mut sim = Simulation::new(quiet_config()).unwrap();
    sim.step(DT);

    let value = serde_json::to_value(sim.report()).unwrap();
    assert_eq!(value["frames"], 1);
    assert_eq!(value["base_health"], 100);
    assert_eq!(value["base_destroyed"], false);
    assert_eq!(value["villagers"], 0);
}

#[test]
fn towers_are_bought_slot_by_slot_with_wood_and_stone() {
    let mut config = quiet_config();
    config.world.tower_slots = vec![Vec2::new(3.0, 2.5), Vec2::new(3.0, -2.5)];
    let mut sim = Simulation::new(config).unwrap();
    assert_eq!(sim.try_activate_next_tower(), TowerPurchase::NotEnoughResources);
    assert_eq!(sim.world().tower_count(), 0);

    sim.world_mut().inventory_mut().add(ResourceKind::Wood, 4);
    sim.world_mut().inventory_mut().add(ResourceKind::Stone, 1);
    let TowerPurchase::Built(first) = sim.try_activate_next_tower() else {
        panic!("first tower should be affordable");
    };
    assert_eq!(sim.world().position(first), Some(Vec2::new(3.0, 2.5)));
    assert_eq!(sim.world().inventory().wood(), 2);
    assert_eq!(sim.world().inventory().stone(), 0);
    assert_eq!(sim.runner_count(), 1);
    assert_eq!(sim.remaining_tower_slots(), 1);

    // Short on stone: nothing is spent.
    assert_eq!(sim.try_activate_next_tower(), TowerPurchase::NotEnoughResources);
    assert_eq!(sim.world().inventory().wood(), 2);

    sim.world_mut().inventory_mut().add(ResourceKind::Stone, 1);
    let TowerPurchase::Built(second) = sim.try_activate_next_tower() else {
        panic!("second tower should be affordable");
    };
    assert_eq!(sim.world().position(second), Some(Vec2::new(3.0, -2.5)));

    sim.world_mut().inventory_mut().add(ResourceKind::Wood, 10);
    sim.world_mut().inventory_mut().add(ResourceKind::Stone, 10);
    assert_eq!(sim.try_activate_next_tower(), TowerPurchase::NoSlotsLeft);
    assert_eq!(sim.world().inventory().wood(), 10);
    assert_eq!(sim.report().towers_built, 2);
    assert_eq!(sim.report().towers, 2);
}

#[test]
fn auto_build_spends_harvests_on_towers() {
    let mut config = quiet_config();
    config.world.initial_villagers = 3;
    config.tower.auto_build = true;
    let mut sim = Simulation::new(config).unwrap();

    let report = sim.run(seconds(30.0), DT);
    assert!(report.towers_built >= 1, "{report:?}");
    assert_eq!(report.towers as u64, report.towers_built);
    assert_eq!(
        report.harvests,
        u64::from(report.wood + report.stone) + 3 * report.towers_built
    );
}

#[test]
fn scripted_orders_fire_in_time_order() {
    let mut config = quiet_config();
    config.world.initial_villagers = 1;
    config.villager.brain = BrainKind::Command;
    config.orders = vec![
        ScheduledOrder {
            at: 1.0,
            order: Order::Move {
                point: Vec2::new(-2.0, 1.0),
            },
        },
        ScheduledOrder {
            at: 0.5,
            order: Order::Move {
                point: Vec2::new(2.0, 1.0),
            },
        },
    ];
    let mut sim = Simulation::new(config).unwrap();
    let villager = EntityId(1);

    sim.run(seconds(0.2), DT);
    assert_eq!(sim.world().commands().last_move_point(), None);
    assert_eq!(sim.world().position(villager), Some(Vec2::new(0.8, 0.0)));

    sim.run(seconds(0.6), DT);
    assert_eq!(sim.world().commands().last_move_point(), Some(Vec2::new(2.0, 1.0)));

    sim.run(seconds(2.2), DT);
    assert_eq!(sim.world().commands().last_move_point(), Some(Vec2::new(-2.0, 1.0)));
    let position = sim.world().position(villager).unwrap();
    assert!(position.distance(Vec2::new(-2.0, 1.0)) <= 0.1 + 1e-4, "{position:?}");
}

#[test]
fn build_tower_order_uses_the_stockpile() {
    let mut config = quiet_config();
    config.orders = vec![ScheduledOrder {
        at: 0.1,
        order: Order::BuildTower,
    }];
    let mut sim = Simulation::new(config).unwrap();
    sim.world_mut().inventory_mut().add(ResourceKind::Wood, 2);
    sim.world_mut().inventory_mut().add(ResourceKind::Stone, 1);

    let report = sim.run(seconds(0.5), DT);
    assert_eq!(report.towers_built, 1);
    assert_eq!((report.wood, report.stone), (0, 0));
}

#[test]
fn group_harvest_order_must_name_a_known_resource() {
    let mut config = quiet_config();
    config.orders = vec![ScheduledOrder {
        at: 1.0,
        order: Order::GroupHarvest {
            resource: ResourceId(9),
        },
    }];
    assert!(matches!(
        Simulation::new(config),
        Err(VillageError::InvalidConfig {
            field: "orders.resource",
            ..
        })
    ));
}
