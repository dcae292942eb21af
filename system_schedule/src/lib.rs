use bevy::prelude::*;

/// Frame ordering for the quest core. Observers handle inbound signals on the
/// turn they arrive; these sets only order the per-frame bookkeeping.
#[derive(SystemSet, Debug, Hash, PartialEq, Eq, Clone)]
pub enum QuestSchedule {
    /// Pull newly loaded reference data in.
    SyncDefinitions,
    /// Write dirty keys to the store.
    Persist,
}
