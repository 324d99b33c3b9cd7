use bt_core::{Blackboard, Status, TickContext, WorldMut, WorldView};

use crate::node::BtNode;

/// Decision function wrapped by [`Action`].
pub type ActionFn<W> = dyn FnMut(&TickContext, <W as WorldView>::Agent, &mut W, &mut Blackboard) -> Status;

/// Leaf that delegates to a game-supplied decision function.
///
/// The function runs once per `on_update` and its status is returned as-is.
/// There is no per-activation reset; a function that needs one keeps its
/// state on the blackboard or the agent. An action built without a function
/// always fails.
pub struct Action<W>
where
    W: WorldMut + 'static,
{
    act: Option<Box<ActionFn<W>>>,
}

impl<W> Action<W>
where
    W: WorldMut + 'static,
{
    pub fn new(
        act: impl FnMut(&TickContext, W::Agent, &mut W, &mut Blackboard) -> Status + 'static,
    ) -> Self {
        Self {
            act: Some(Box::new(act)),
        }
    }

    pub fn empty() -> Self {
        Self { act: None }
    }

    pub fn is_empty(&self) -> bool {
        self.act.is_none()
    }
}

impl<W> BtNode<W> for Action<W>
where
    W: WorldMut + 'static,
{
    fn on_update(
        &mut self,
        ctx: &TickContext,
        agent: W::Agent,
        world: &mut W,
        blackboard: &mut Blackboard,
    ) -> Status {
        match self.act.as_mut() {
            Some(act) => act(ctx, agent, world, blackboard),
            None => Status::Failure,
        }
    }

    fn kind(&self) -> &'static str {
        "action"
    }
}

/// Read-only predicate leaf: `true` is `Success`, `false` is `Failure`.
pub struct Condition<F> {
    cond: F,
}

impl<F> Condition<F> {
    pub fn new(cond: F) -> Self {
        Self { cond }
    }
}

impl<F, W> BtNode<W> for Condition<F>
where
    F: FnMut(&TickContext, W::Agent, &W, &Blackboard) -> bool + 'static,
    W: WorldMut + 'static,
{
    fn on_update(
        &mut self,
        ctx: &TickContext,
        agent: W::Agent,
        world: &mut W,
        blackboard: &mut Blackboard,
    ) -> Status {
        Status::from((self.cond)(ctx, agent, &*world, &*blackboard))
    }

    fn kind(&self) -> &'static str {
        "condition"
    }
}

/// Timed gate: `Running` until the accumulated frame time reaches `duration`.
///
/// Never fails. Elapsed time resets on every activation, and negative frame
/// deltas count as zero.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WaitSeconds {
    duration: f32,
    elapsed: f64,
}

impl WaitSeconds {
    pub fn new(seconds: f32) -> Self {
        Self {
            duration: seconds,
            elapsed: 0.0,
        }
    }
}

impl<W> BtNode<W> for WaitSeconds
where
    W: WorldMut + 'static,
{
    fn on_start(
        &mut self,
        _ctx: &TickContext,
        _agent: W::Agent,
        _world: &mut W,
        _blackboard: &mut Blackboard,
    ) {
        self.elapsed = 0.0;
    }

    fn on_update(
        &mut self,
        ctx: &TickContext,
        _agent: W::Agent,
        _world: &mut W,
        _blackboard: &mut Blackboard,
    ) -> Status {
        self.elapsed += ctx.dt_seconds.max(0.0) as f64;
        if self.elapsed >= self.duration as f64 {
            Status::Success
        } else {
            Status::Running
        }
    }

    fn kind(&self) -> &'static str {
        "wait_seconds"
    }
}
