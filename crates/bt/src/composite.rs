//! Composite nodes with memory.
//!
//! Both composites keep a cursor that survives across ticks while the node is
//! `Running`; the cursor only resets in `on_start`, i.e. when a new activation
//! begins.

use bt_core::{Blackboard, Status, TickContext, WorldMut};

use crate::node::{BtNode, Node};

/// Ticks children in order until one fails ("AND").
///
/// - `Success`: advance and tick the next child in the same tick.
/// - `Running`: return `Running`; the same child is resumed next tick.
/// - `Failure`: return `Failure`; the next activation restarts at child 0.
///
/// Past the last child the sequence succeeds, so an empty sequence succeeds.
pub struct Sequence<W>
where
    W: WorldMut + 'static,
{
    children: Vec<Node<W>>,
    index: usize,
}

impl<W> Sequence<W>
where
    W: WorldMut + 'static,
{
    pub fn new(children: Vec<Node<W>>) -> Self {
        Self { children, index: 0 }
    }
}

impl<W> BtNode<W> for Sequence<W>
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
        self.index = 0;
    }

    fn on_update(
        &mut self,
        ctx: &TickContext,
        agent: W::Agent,
        world: &mut W,
        blackboard: &mut Blackboard,
    ) -> Status {
        while self.index < self.children.len() {
            let status = self.children[self.index].tick(ctx, agent, world, blackboard);
            match status {
                Status::Success => self.index += 1,
                Status::Running | Status::Failure => return status,
            }
        }
        Status::Success
    }

    fn abort_children(
        &mut self,
        ctx: &TickContext,
        agent: W::Agent,
        world: &mut W,
        blackboard: &mut Blackboard,
    ) {
        if let Some(child) = self.children.get_mut(self.index) {
            child.abort(ctx, agent, world, blackboard);
        }
    }

    fn kind(&self) -> &'static str {
        "sequence"
    }
}

/// Ticks children in order until one does not fail ("OR" / priority fallback).
///
/// Children are listed in descending priority. The first child that returns
/// `Running` or `Success` decides the result; if every child fails, so does
/// the selector (an empty selector fails). A `Running` child is resumed next
/// tick without re-checking the higher-priority children before it.
pub struct Selector<W>
where
    W: WorldMut + 'static,
{
    children: Vec<Node<W>>,
    index: usize,
}

impl<W> Selector<W>
where
    W: WorldMut + 'static,
{
    pub fn new(children: Vec<Node<W>>) -> Self {
        Self { children, index: 0 }
    }
}

impl<W> BtNode<W> for Selector<W>
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
        self.index = 0;
    }

    fn on_update(
        &mut self,
        ctx: &TickContext,
        agent: W::Agent,
        world: &mut W,
        blackboard: &mut Blackboard,
    ) -> Status {
        while self.index < self.children.len() {
            let status = self.children[self.index].tick(ctx, agent, world, blackboard);
            match status {
                Status::Failure => self.index += 1,
                Status::Running | Status::Success => return status,
            }
        }
        Status::Failure
    }

    fn abort_children(
        &mut self,
        ctx: &TickContext,
        agent: W::Agent,
        world: &mut W,
        blackboard: &mut Blackboard,
    ) {
        if let Some(child) = self.children.get_mut(self.index) {
            child.abort(ctx, agent, world, blackboard);
        }
    }

    fn kind(&self) -> &'static str {
        "selector"
    }
}
