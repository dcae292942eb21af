use {bevy::prelude::*, std::collections::BTreeSet};

/// Keys of the persisted key/value contract.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum PersistKey {
    ActiveObjectiveGroups,
    FinishedTaskRecords,
    GridContainer,
    InventoryContainer,
    DefaultObjectiveSeeded,
    WalletBalance,
    BonusQueue,
}

impl PersistKey {
    pub const ALL: [PersistKey; 7] = [
        PersistKey::ActiveObjectiveGroups,
        PersistKey::FinishedTaskRecords,
        PersistKey::GridContainer,
        PersistKey::InventoryContainer,
        PersistKey::DefaultObjectiveSeeded,
        PersistKey::WalletBalance,
        PersistKey::BonusQueue,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            PersistKey::ActiveObjectiveGroups => "activeObjectiveGroups",
            PersistKey::FinishedTaskRecords => "finishedTaskRecords",
            PersistKey::GridContainer => "gridContainer",
            PersistKey::InventoryContainer => "inventoryContainer",
            PersistKey::DefaultObjectiveSeeded => "defaultObjectiveSeeded",
            PersistKey::WalletBalance => "walletBalance",
            PersistKey::BonusQueue => "bonusQueue",
        }
    }
}

/// Keys whose in-memory value changed since the last successful write.
#[derive(Resource, Debug, Default)]
pub struct DirtyKeys {
    keys: BTreeSet<PersistKey>,
}

impl DirtyKeys {
    pub fn mark(&mut self, key: PersistKey) {
        self.keys.insert(key);
    }

    pub fn mark_all(&mut self, keys: impl IntoIterator<Item = PersistKey>) {
        self.keys.extend(keys);
    }

    pub fn contains(&self, key: PersistKey) -> bool {
        self.keys.contains(&key)
    }

    pub fn take(&mut self) -> Vec<PersistKey> {
        std::mem::take(&mut self.keys).into_iter().collect()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }
}
