//! The two containers that hold the player's items: the merge board (`Grid`) and
//! the overflow list (`Inventory`).
//!
//! Both are owned jointly with the placement system, which is the only thing that
//! ever adds items. The quest core reads them, toggles `completed` flags and
//! removes items it consumed. `ResourceStore` is the one interface the matcher and
//! the consumer code talk to, so neither cares which container it is scanning.

use {
    bevy::prelude::*,
    item_components::{InventoryEntry, ItemIdentity, LifecycleState, Slot},
    serde::{Deserialize, Serialize},
};

pub const DEFAULT_GRID_WIDTH: u32 = 7;
pub const DEFAULT_GRID_HEIGHT: u32 = 9;

pub struct ContainerResourcesPlugin;

impl Plugin for ContainerResourcesPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<Grid>()
            .init_resource::<Inventory>()
            .register_type::<Grid>()
            .register_type::<Inventory>();
    }
}

/// Container-agnostic access used by the matcher and by need consumption.
pub trait ResourceStore {
    /// Indices of items equal to `identity`, in scan order.
    ///
    /// `state` filters by lifecycle state on containers that track one and is
    /// ignored by containers that don't.
    fn find_matching<'a>(
        &'a self,
        identity: &'a ItemIdentity,
        state: Option<LifecycleState>,
    ) -> Box<dyn Iterator<Item = usize> + 'a>;

    fn set_completed(&mut self, index: usize, completed: bool);

    /// Resets every `completed` flag.
    fn clear_completed(&mut self);

    /// Removes the items at `indices`. Indices are positions reported by
    /// `find_matching` before any removal.
    fn take(&mut self, indices: &[usize]);

    fn completed_count(&self) -> usize;

    /// Flags up to `limit` matching items (all of them for `None`) and returns
    /// how many were flagged.
    fn flag_matching(
        &mut self,
        identity: &ItemIdentity,
        state: Option<LifecycleState>,
        limit: Option<u32>,
    ) -> u32 {
        let limit = limit.map_or(usize::MAX, |l| l as usize);
        let indices: Vec<usize> = self.find_matching(identity, state).take(limit).collect();
        for &index in &indices {
            self.set_completed(index, true);
        }
        indices.len() as u32
    }

    /// Removes the first `limit` matching items and returns how many were removed.
    fn remove_matching(
        &mut self,
        identity: &ItemIdentity,
        state: Option<LifecycleState>,
        limit: u32,
    ) -> u32 {
        if limit == 0 {
            return 0;
        }
        let indices: Vec<usize> = self
            .find_matching(identity, state)
            .take(limit as usize)
            .collect();
        self.take(&indices);
        indices.len() as u32
    }
}

/// The merge board. Slots are stored row-major, so iterating `slots` scans row by
/// row, left to right.
#[derive(Resource, Reflect, Debug, Clone, PartialEq, Serialize, Deserialize)]
#[reflect(Resource)]
pub struct Grid {
    pub width: u32,
    pub height: u32,
    pub slots: Vec<Slot>,
}

impl Default for Grid {
    fn default() -> Self {
        Self::new(DEFAULT_GRID_WIDTH, DEFAULT_GRID_HEIGHT)
    }
}

impl Grid {
    /// Empty board; each slot's position order is its row-major index.
    pub fn new(width: u32, height: u32) -> Self {
        let slots = (0..width * height).map(Slot::empty).collect();
        Self {
            width,
            height,
            slots,
        }
    }

    fn index_of(&self, x: u32, y: u32) -> Option<usize> {
        (x < self.width && y < self.height).then(|| (y * self.width + x) as usize)
    }

    pub fn slot(&self, x: u32, y: u32) -> Option<&Slot> {
        self.index_of(x, y).and_then(|i| self.slots.get(i))
    }

    /// Puts an item into a cell, keeping the cell's position order. Used by the
    /// placement side and by tests; the quest core never calls it.
    pub fn place(&mut self, x: u32, y: u32, identity: ItemIdentity, state: LifecycleState) -> bool {
        let Some(slot) = self.index_of(x, y).and_then(|i| self.slots.get_mut(i)) else {
            return false;
        };
        slot.item = Some(identity);
        slot.state = state;
        slot.completed = false;
        true
    }

    pub fn occupied(&self) -> impl Iterator<Item = (usize, &Slot)> {
        self.slots.iter().enumerate().filter(|(_, s)| !s.is_empty())
    }
}

impl ResourceStore for Grid {
    fn find_matching<'a>(
        &'a self,
        identity: &'a ItemIdentity,
        state: Option<LifecycleState>,
    ) -> Box<dyn Iterator<Item = usize> + 'a> {
        Box::new(self.slots.iter().enumerate().filter_map(move |(index, slot)| {
            let same_item = slot.item.as_ref() == Some(identity);
            let state_ok = state.is_none_or(|wanted| slot.state == wanted);
            (same_item && state_ok).then_some(index)
        }))
    }

    fn set_completed(&mut self, index: usize, completed: bool) {
        if let Some(slot) = self.slots.get_mut(index) {
            slot.completed = completed;
        }
    }

    fn clear_completed(&mut self) {
        for slot in &mut self.slots {
            slot.completed = false;
        }
    }

    fn take(&mut self, indices: &[usize]) {
        for &index in indices {
            if let Some(slot) = self.slots.get_mut(index) {
                slot.clear();
            }
        }
    }

    fn completed_count(&self) -> usize {
        self.slots.iter().filter(|s| s.completed).count()
    }
}

/// Items kept off the board, in the order they were stored.
#[derive(Resource, Reflect, Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[reflect(Resource)]
pub struct Inventory {
    pub entries: Vec<InventoryEntry>,
}

impl Inventory {
    pub fn push(&mut self, identity: ItemIdentity) {
        self.entries.push(identity.into());
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl ResourceStore for Inventory {
    fn find_matching<'a>(
        &'a self,
        identity: &'a ItemIdentity,
        _state: Option<LifecycleState>,
    ) -> Box<dyn Iterator<Item = usize> + 'a> {
        Box::new(
            self.entries
                .iter()
                .enumerate()
                .filter_map(move |(index, entry)| (&entry.identity == identity).then_some(index)),
        )
    }

    fn set_completed(&mut self, index: usize, completed: bool) {
        if let Some(entry) = self.entries.get_mut(index) {
            entry.completed = completed;
        }
    }

    fn clear_completed(&mut self) {
        for entry in &mut self.entries {
            entry.completed = false;
        }
    }

    fn take(&mut self, indices: &[usize]) {
        let mut sorted = indices.to_vec();
        sorted.sort_unstable();
        sorted.dedup();
        // back to front so earlier indices stay valid
        for index in sorted.into_iter().rev() {
            if index < self.entries.len() {
                self.entries.remove(index);
            }
        }
    }

    fn completed_count(&self) -> usize {
        self.entries.iter().filter(|e| e.completed).count()
    }
}
