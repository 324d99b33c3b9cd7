#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use std::borrow::Cow;

use bt_core::{BbKey, Blackboard};

/// One node or runner event (`bt.node.start`, `bt.node.stop`, `bt.abort`, ...).
///
/// `label` names the node that produced it, when the node has one; `a` and `b`
/// carry tag-specific numbers such as the agent id.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct TraceEvent {
    pub tick: u64,
    pub tag: Cow<'static, str>,
    pub label: Option<Cow<'static, str>>,
    pub a: u64,
    pub b: u64,
}

impl TraceEvent {
    pub fn new(tick: u64, tag: impl Into<Cow<'static, str>>) -> Self {
        Self {
            tick,
            tag: tag.into(),
            label: None,
            a: 0,
            b: 0,
        }
    }

    pub fn with_label(mut self, label: impl Into<Cow<'static, str>>) -> Self {
        self.label = Some(label.into());
        self
    }

    pub fn with_a(mut self, a: u64) -> Self {
        self.a = a;
        self
    }

    pub fn with_b(mut self, b: u64) -> Self {
        self.b = b;
        self
    }
}

/// Streaming destination for events, installed under [`TRACE_SINK`].
pub trait TraceSink {
    fn emit(&mut self, event: TraceEvent);
}

#[derive(Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct TraceLog {
    pub events: Vec<TraceEvent>,
}

impl TraceLog {
    pub fn push(&mut self, event: TraceEvent) {
        self.events.push(event);
    }

    /// Events with the given tag, in emission order.
    pub fn tagged<'a>(&'a self, tag: &'a str) -> impl Iterator<Item = &'a TraceEvent> + 'a {
        self.events.iter().filter(move |e| e.tag == tag)
    }

    pub fn count(&self, tag: &str, label: &str) -> usize {
        self.tagged(tag)
            .filter(|e| e.label.as_deref() == Some(label))
            .count()
    }
}

/// Blackboard key for collecting events in-memory.
pub const TRACE_LOG: BbKey<TraceLog> = BbKey::new("bt.trace.log");
/// Blackboard key for streaming events into a user-provided sink.
pub const TRACE_SINK: BbKey<Box<dyn TraceSink>> = BbKey::new("bt.trace.sink");

/// Record `event` on whichever of [`TRACE_LOG`] / [`TRACE_SINK`] is present.
pub fn emit(blackboard: &mut Blackboard, event: TraceEvent) {
    if let Some(log) = blackboard.get_mut(TRACE_LOG) {
        log.push(event.clone());
    }
    if let Some(sink) = blackboard.get_mut(TRACE_SINK) {
        sink.emit(event);
    }
}

/// True when at least one trace destination is installed.
pub fn enabled(blackboard: &Blackboard) -> bool {
    blackboard.contains(TRACE_LOG) || blackboard.contains(TRACE_SINK)
}
