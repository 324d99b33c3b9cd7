use serde::{Deserialize, Serialize};

use crate::entity::ResourceKind;

/// Village stockpile.
///
/// `changed` is raised by every successful [`add`](Inventory::add) or
/// [`try_spend`](Inventory::try_spend) and cleared by [`take_changed`](Inventory::take_changed); a HUD polls it
/// instead of subscribing to an event.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Inventory {
    wood: u32,
    stone: u32,
    #[serde(skip)]
    changed: bool,
}

impl Inventory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, kind: ResourceKind, amount: u32) {
        if amount == 0 {
            return;
        }
        let slot = self.slot_mut(kind);
        *slot = slot.saturating_add(amount);
        self.changed = true;
    }

    /// Pay `wood` and `stone` together, or nothing at all if either is short.
    pub fn try_spend(&mut self, wood: u32, stone: u32) -> bool {
        if self.wood < wood || self.stone < stone {
            return false;
        }
        self.wood -= wood;
        self.stone -= stone;
        if wood > 0 || stone > 0 {
            self.changed = true;
        }
        true
    }

    pub fn get(&self, kind: ResourceKind) -> u32 {
        match kind {
            ResourceKind::Wood => self.wood,
            ResourceKind::Stone => self.stone,
        }
    }

    pub fn wood(&self) -> u32 {
        self.wood
    }

    pub fn stone(&self) -> u32 {
        self.stone
    }

    /// Returns whether the counts changed since the last call.
    pub fn take_changed(&mut self) -> bool {
        std::mem::take(&mut self.changed)
    }

    fn slot_mut(&mut self, kind: ResourceKind) -> &mut u32 {
        match kind {
            ResourceKind::Wood => &mut self.wood,
            ResourceKind::Stone => &mut self.stone,
        }
    }
}
