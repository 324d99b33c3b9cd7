use bt_core::{AgentId, Blackboard, Status, TickContext, WorldMut};
use bt_tools::{emit as trace_emit, TraceEvent};

use crate::node::Node;

/// Builds the node graph for one agent.
///
/// Construction must be side-effect free apart from allocating nodes; every
/// call returns a fresh graph that is never shared with another agent.
pub trait TreeFactory<W>
where
    W: WorldMut + 'static,
{
    fn build(&self) -> Node<W>;
}

impl<W, F> TreeFactory<W> for F
where
    W: WorldMut + 'static,
    F: Fn() -> Node<W>,
{
    fn build(&self) -> Node<W> {
        self()
    }
}

/// Per-agent driver: one tree, one blackboard, ticked once per frame.
///
/// The runner owns the blackboard for its whole lifetime and lends it to every
/// node on each tick, so all nodes of the tree see the same context and it
/// cannot be swapped out mid-lifetime.
pub struct TreeRunner<W>
where
    W: WorldMut + 'static,
{
    agent: W::Agent,
    root: Node<W>,
    blackboard: Blackboard,
    last: Option<Status>,
    ticks: u64,
}

impl<W> TreeRunner<W>
where
    W: WorldMut + 'static,
{
    pub fn new(agent: W::Agent, factory: &impl TreeFactory<W>) -> Self {
        Self::from_root(agent, factory.build())
    }

    pub fn from_root(agent: W::Agent, root: Node<W>) -> Self {
        Self {
            agent,
            root,
            blackboard: Blackboard::new(),
            last: None,
            ticks: 0,
        }
    }

    pub fn agent(&self) -> W::Agent {
        self.agent
    }

    pub fn root(&self) -> &Node<W> {
        &self.root
    }

    pub fn blackboard(&self) -> &Blackboard {
        &self.blackboard
    }

    pub fn blackboard_mut(&mut self) -> &mut Blackboard {
        &mut self.blackboard
    }

    /// Root status from the most recent tick.
    pub fn last_status(&self) -> Option<Status> {
        self.last
    }

    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    pub fn tick(&mut self, ctx: &TickContext, world: &mut W) -> Status {
        let status = self
            .root
            .tick(ctx, self.agent, world, &mut self.blackboard);
        if self.last != Some(status) {
            tracing::debug!(
                agent = self.agent.stable_id(),
                tick = ctx.tick,
                ?status,
                "root status changed"
            );
        }
        self.last = Some(status);
        self.ticks = self.ticks.saturating_add(1);
        status
    }

    /// Stop the active path (running `on_stop` innermost first) before teardown.
    ///
    /// After an abort the next tick starts a fresh activation from the root.
    pub fn abort(&mut self, ctx: &TickContext, world: &mut W) {
        if !self.root.is_active() {
            return;
        }
        tracing::debug!(agent = self.agent.stable_id(), tick = ctx.tick, "abort tree");
        trace_emit(
            &mut self.blackboard,
            TraceEvent::new(ctx.tick, "bt.abort").with_a(self.agent.stable_id()),
        );
        self.root
            .abort(ctx, self.agent, world, &mut self.blackboard);
        self.last = self.root.status();
    }
}

/// Tick every runner once, in stable agent order.
pub fn tick_runners<W>(ctx: &TickContext, world: &mut W, runners: &mut [TreeRunner<W>])
where
    W: WorldMut + 'static,
{
    runners.sort_by_key(|r| r.agent.stable_id());
    for runner in runners.iter_mut() {
        runner.tick(ctx, world);
    }
}
