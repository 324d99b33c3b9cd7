//! Shorthand constructors for building trees.
//!
//! Instead of `Node::new(Sequence::new(vec![...]))` write `sequence(vec![...])`.

use bt_core::{Blackboard, Status, TickContext, WorldMut};

use crate::{Action, Condition, Node, Selector, Sequence, WaitSeconds};

#[inline]
pub fn sequence<W>(children: Vec<Node<W>>) -> Node<W>
where
    W: WorldMut + 'static,
{
    Node::new(Sequence::new(children))
}

#[inline]
pub fn selector<W>(children: Vec<Node<W>>) -> Node<W>
where
    W: WorldMut + 'static,
{
    Node::new(Selector::new(children))
}

#[inline]
pub fn wait_seconds<W>(seconds: f32) -> Node<W>
where
    W: WorldMut + 'static,
{
    Node::new(WaitSeconds::new(seconds))
}

#[inline]
pub fn action<W, F>(act: F) -> Node<W>
where
    W: WorldMut + 'static,
    F: FnMut(&TickContext, W::Agent, &mut W, &mut Blackboard) -> Status + 'static,
{
    Node::new(Action::new(act))
}

/// An action with no decision function; it always fails.
#[inline]
pub fn empty_action<W>() -> Node<W>
where
    W: WorldMut + 'static,
{
    Node::new(Action::empty())
}

#[inline]
pub fn condition<W, F>(cond: F) -> Node<W>
where
    W: WorldMut + 'static,
    F: FnMut(&TickContext, W::Agent, &W, &Blackboard) -> bool + 'static,
{
    Node::new(Condition::new(cond))
}
