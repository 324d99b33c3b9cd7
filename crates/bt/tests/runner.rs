use bt::{action, condition, selector, sequence, tick_runners, Node, Status, TreeFactory, TreeRunner};
use bt_core::{TickContext, WorldMut, WorldView};

#[derive(Debug, Default)]
struct World {
    ticked: Vec<u64>,
}

impl WorldView for World {
    type Agent = u64;
}

impl WorldMut for World {}

fn ctx(tick: u64) -> TickContext {
    TickContext {
        tick,
        dt_seconds: 0.1,
        seed: 0,
    }
}

const COUNT: &str = "count";

/// Writer and reader share the runner's blackboard.
fn counter_tree() -> Node<World> {
    sequence(vec![
        action(|_ctx, agent, world: &mut World, bb| {
            world.ticked.push(agent);
            let next = bb.try_get::<u32>(COUNT).copied().unwrap_or(0) + 1;
            bb.set(COUNT, next);
            Status::Success
        }),
        condition(|_ctx, _agent, _world: &World, bb| {
            bb.try_get::<u32>(COUNT).copied().unwrap_or(0) >= 3
        }),
    ])
}

#[test]
fn runner_builds_from_factory_and_shares_blackboard_between_nodes() {
    let mut runner: TreeRunner<World> = TreeRunner::new(1, &counter_tree);
    let mut world = World::default();

    assert_eq!(runner.tick(&ctx(0), &mut world), Status::Failure);
    assert_eq!(runner.tick(&ctx(1), &mut world), Status::Failure);
    assert_eq!(runner.tick(&ctx(2), &mut world), Status::Success);

    assert_eq!(runner.last_status(), Some(Status::Success));
    assert_eq!(runner.ticks(), 3);
    assert_eq!(runner.blackboard().try_get::<u32>(COUNT).copied(), Some(3));
}

#[test]
fn each_runner_gets_its_own_graph_and_blackboard() {
    let factory = counter_tree;
    let mut a: TreeRunner<World> = TreeRunner::new(1, &factory);
    let mut b: TreeRunner<World> = TreeRunner::new(2, &factory);
    let mut world = World::default();

    a.tick(&ctx(0), &mut world);
    a.tick(&ctx(1), &mut world);
    b.tick(&ctx(1), &mut world);

    assert_eq!(a.blackboard().try_get::<u32>(COUNT).copied(), Some(2));
    assert_eq!(b.blackboard().try_get::<u32>(COUNT).copied(), Some(1));
}

#[test]
fn tick_runners_visits_agents_in_stable_order() {
    let factory = || {
        action(|_ctx, agent, world: &mut World, _bb| {
            world.ticked.push(agent);
            Status::Running
        })
    };
    let mut runners: Vec<TreeRunner<World>> = vec![
        TreeRunner::new(30, &factory),
        TreeRunner::new(10, &factory),
        TreeRunner::new(20, &factory),
    ];
    let mut world = World::default();

    tick_runners(&ctx(0), &mut world, &mut runners);
    tick_runners(&ctx(1), &mut world, &mut runners);

    assert_eq!(world.ticked, vec![10, 20, 30, 10, 20, 30]);
}

#[test]
fn missing_blackboard_entry_is_a_normal_failure_branch() {
    const TARGET: &str = "target";

    let root = selector(vec![
        condition(|_ctx, _agent, _world: &World, bb| bb.has(TARGET)),
        action(|_ctx, _agent, _world: &mut World, bb| {
            bb.set(TARGET, 99u64);
            Status::Running
        }),
    ]);
    let mut runner = TreeRunner::from_root(1, root);
    let mut world = World::default();

    assert_eq!(runner.tick(&ctx(0), &mut world), Status::Running);
    assert_eq!(runner.blackboard().try_get::<u64>(TARGET).copied(), Some(99));
    // Wrong type is absent, not a panic.
    assert_eq!(runner.blackboard().try_get::<u32>(TARGET), None);
}

#[test]
fn closures_implement_tree_factory() {
    fn build_with(factory: &dyn TreeFactory<World>) -> Node<World> {
        factory.build()
    }

    let node = build_with(&|| action(|_ctx, _agent, _world: &mut World, _bb| Status::Success));
    assert_eq!(node.kind(), "action");
}
