use std::borrow::Cow;

use bt_core::{Blackboard, Status, TickContext, WorldMut};
use bt_tools::{emit as trace_emit, enabled as trace_enabled, TraceEvent};

/// Behaviour of a single node; the lifecycle around it is driven by [`Node`].
///
/// Hooks receive the frame context, the owning agent, the world and the
/// tree's blackboard. `on_update` may mutate only the node's own state, the
/// blackboard, and the world through the game layer's adapters.
pub trait BtNode<W>: 'static
where
    W: WorldMut + 'static,
{
    /// First tick of an activation episode, before `on_update`.
    fn on_start(
        &mut self,
        _ctx: &TickContext,
        _agent: W::Agent,
        _world: &mut W,
        _blackboard: &mut Blackboard,
    ) {
    }

    fn on_update(
        &mut self,
        ctx: &TickContext,
        agent: W::Agent,
        world: &mut W,
        blackboard: &mut Blackboard,
    ) -> Status;

    /// Called right after `on_update` returned `Success` or `Failure`, or on abort.
    fn on_stop(
        &mut self,
        _ctx: &TickContext,
        _agent: W::Agent,
        _world: &mut W,
        _blackboard: &mut Blackboard,
    ) {
    }

    /// Abort whichever children are mid-activation. Leaves have none.
    fn abort_children(
        &mut self,
        _ctx: &TickContext,
        _agent: W::Agent,
        _world: &mut W,
        _blackboard: &mut Blackboard,
    ) {
    }

    fn kind(&self) -> &'static str;
}

/// A tree node: a [`BtNode`] plus its lifecycle bookkeeping.
///
/// `started` is true for the whole activation episode, i.e. from the tick
/// that ran `on_start` until the tick that returned a terminal status.
pub struct Node<W>
where
    W: WorldMut + 'static,
{
    behavior: Box<dyn BtNode<W>>,
    label: Cow<'static, str>,
    status: Option<Status>,
    started: bool,
}

impl<W> Node<W>
where
    W: WorldMut + 'static,
{
    pub fn new(behavior: impl BtNode<W>) -> Self {
        Self::from_boxed(Box::new(behavior))
    }

    pub fn from_boxed(behavior: Box<dyn BtNode<W>>) -> Self {
        let label = Cow::Borrowed(behavior.kind());
        Self {
            behavior,
            label,
            status: None,
            started: false,
        }
    }

    /// Name used in traces and logs. Defaults to the node kind.
    pub fn labeled(mut self, label: impl Into<Cow<'static, str>>) -> Self {
        self.label = label.into();
        self
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn kind(&self) -> &'static str {
        self.behavior.kind()
    }

    /// Status returned by the most recent tick (`None` before the first one).
    pub fn status(&self) -> Option<Status> {
        self.status
    }

    /// Whether the node is inside an activation episode.
    pub fn is_active(&self) -> bool {
        self.started
    }

    pub fn tick(
        &mut self,
        ctx: &TickContext,
        agent: W::Agent,
        world: &mut W,
        blackboard: &mut Blackboard,
    ) -> Status {
        if !self.started {
            tracing::trace!(node = %self.label, tick = ctx.tick, "start");
            self.trace(blackboard, TraceEvent::new(ctx.tick, "bt.node.start"));
            self.behavior.on_start(ctx, agent, world, blackboard);
            self.started = true;
        }

        let status = self.behavior.on_update(ctx, agent, world, blackboard);
        self.status = Some(status);

        if status.is_terminal() {
            self.behavior.on_stop(ctx, agent, world, blackboard);
            self.started = false;
            tracing::trace!(node = %self.label, tick = ctx.tick, ?status, "stop");
            self.trace(
                blackboard,
                TraceEvent::new(ctx.tick, "bt.node.stop").with_a((status == Status::Success) as u64),
            );
        }

        status
    }

    /// End the current activation episode early.
    ///
    /// Runs `on_stop` along the active path, innermost node first, and leaves
    /// every node on it ready for a fresh `on_start`. The aborted node records
    /// `Failure` as its last status. No-op when the node is not active.
    pub fn abort(
        &mut self,
        ctx: &TickContext,
        agent: W::Agent,
        world: &mut W,
        blackboard: &mut Blackboard,
    ) {
        if !self.started {
            return;
        }

        self.behavior.abort_children(ctx, agent, world, blackboard);
        self.behavior.on_stop(ctx, agent, world, blackboard);
        self.started = false;
        self.status = Some(Status::Failure);
        tracing::trace!(node = %self.label, tick = ctx.tick, "abort");
        self.trace(blackboard, TraceEvent::new(ctx.tick, "bt.node.abort"));
    }

    fn trace(&self, blackboard: &mut Blackboard, event: TraceEvent) {
        if trace_enabled(blackboard) {
            trace_emit(blackboard, event.with_label(self.label.clone()));
        }
    }
}

impl<W> std::fmt::Debug for Node<W>
where
    W: WorldMut + 'static,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Node")
            .field("kind", &self.kind())
            .field("label", &self.label)
            .field("status", &self.status)
            .field("started", &self.started)
            .finish()
    }
}
