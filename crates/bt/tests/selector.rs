use bt::{action, empty_action, selector, sequence, Node, Status, TreeRunner};
use bt_core::{TickContext, WorldMut, WorldView};

#[derive(Debug, Default)]
struct World {
    log: Vec<&'static str>,
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

fn scripted(name: &'static str, script: &[Status]) -> Node<World> {
    let mut script = script.to_vec().into_iter();
    action(move |_ctx, _agent, world: &mut World, _bb| {
        world.log.push(name);
        script.next().unwrap_or(Status::Failure)
    })
    .labeled(name)
}

fn always(name: &'static str, status: Status) -> Node<World> {
    action(move |_ctx, _agent, world: &mut World, _bb| {
        world.log.push(name);
        status
    })
    .labeled(name)
}

#[test]
fn selector_stops_at_first_success_in_one_tick() {
    let root = selector(vec![
        always("fail", Status::Failure),
        always("win", Status::Success),
        always("never", Status::Success),
    ]);
    let mut runner = TreeRunner::from_root(1, root);
    let mut world = World::default();

    assert_eq!(runner.tick(&ctx(0), &mut world), Status::Success);
    assert_eq!(world.log, vec!["fail", "win"]);
}

#[test]
fn selector_resumes_running_child_without_rechecking_higher_priorities() {
    let root = selector(vec![
        always("busy", Status::Failure),
        scripted("patrol", &[Status::Running, Status::Running, Status::Success]),
        always("idle", Status::Success),
    ]);
    let mut runner = TreeRunner::from_root(1, root);
    let mut world = World::default();

    assert_eq!(runner.tick(&ctx(0), &mut world), Status::Running);
    assert_eq!(world.log, vec!["busy", "patrol"]);

    world.log.clear();
    assert_eq!(runner.tick(&ctx(1), &mut world), Status::Running);
    assert_eq!(world.log, vec!["patrol"]);

    world.log.clear();
    assert_eq!(runner.tick(&ctx(2), &mut world), Status::Success);
    assert_eq!(world.log, vec!["patrol"]);

    // Fresh activation: back to the highest priority.
    world.log.clear();
    runner.tick(&ctx(3), &mut world);
    assert_eq!(world.log.first(), Some(&"busy"));
}

#[test]
fn selector_fails_when_every_child_fails() {
    let root = selector(vec![
        always("a", Status::Failure),
        always("b", Status::Failure),
    ]);
    let mut runner = TreeRunner::from_root(1, root);
    let mut world = World::default();

    assert_eq!(runner.tick(&ctx(0), &mut world), Status::Failure);
    assert_eq!(world.log, vec!["a", "b"]);

    world.log.clear();
    assert_eq!(runner.tick(&ctx(1), &mut world), Status::Failure);
    assert_eq!(world.log, vec!["a", "b"]);
}

#[test]
fn selector_advances_past_running_child_that_later_fails() {
    let root = selector(vec![
        scripted("harvesting", &[Status::Running, Status::Failure]),
        always("scan", Status::Success),
    ]);
    let mut runner = TreeRunner::from_root(1, root);
    let mut world = World::default();

    assert_eq!(runner.tick(&ctx(0), &mut world), Status::Running);
    world.log.clear();

    assert_eq!(runner.tick(&ctx(1), &mut world), Status::Success);
    assert_eq!(world.log, vec!["harvesting", "scan"]);
}

#[test]
fn selector_over_sequences_falls_through_failed_branch() {
    let root = selector(vec![
        sequence(vec![always("scan", Status::Failure), always("harvest", Status::Success)]),
        sequence(vec![always("wait", Status::Success), always("patrol", Status::Running)]),
    ]);
    let mut runner = TreeRunner::from_root(1, root);
    let mut world = World::default();

    assert_eq!(runner.tick(&ctx(0), &mut world), Status::Running);
    assert_eq!(world.log, vec!["scan", "wait", "patrol"]);
}

#[test]
fn empty_selector_and_empty_action_fail() {
    let mut world = World::default();

    let mut empty = TreeRunner::from_root(1, selector::<World>(Vec::new()));
    assert_eq!(empty.tick(&ctx(0), &mut world), Status::Failure);

    let mut no_fn = TreeRunner::from_root(2, empty_action::<World>());
    for tick in 0..3 {
        assert_eq!(no_fn.tick(&ctx(tick), &mut world), Status::Failure);
    }
}
