use crate::AgentId;

/// Read-only world access.
///
/// The core crate does not prescribe which queries a world must expose; the
/// game layer defines extension traits (perception, locomotion, combat) on top.
pub trait WorldView {
    type Agent: AgentId;
}

/// Write access / effect sink.
pub trait WorldMut: WorldView {}
