//! Persistence of the quest state.
//!
//! This crate provides:
//! - a `KeyValueStore` seam with a RON file backend and an in-memory backend
//! - write-behind of every `DirtyKeys` entry once per frame, in `PostUpdate`
//! - restoring all persisted keys when the game enters `GameState::Restoring`
//!
//! A failed write keeps its key dirty, so it is retried on the next frame.

mod store;

pub use store::*;

use {
    bevy::{ecs::system::SystemParam, prelude::*},
    container_resources::{Grid, Inventory},
    quest_resources::{
        BonusQueue, BootFlags, DirtyKeys, FinishedTaskLog, ObjectiveGroups, PersistKey,
        QuestConfig,
    },
    ron::ser::PrettyConfig,
    serde::{Serialize, de::DeserializeOwned},
    states::GameState,
    system_schedule::QuestSchedule,
    thiserror::Error,
    wallet::Wallet,
};

#[derive(Debug, Error)]
pub enum PersistenceError {
    #[error("failed to read '{key}'")]
    Read {
        key: String,
        source: std::io::Error,
    },
    #[error("failed to write '{key}'")]
    Write {
        key: String,
        source: std::io::Error,
    },
    #[error("failed to encode '{key}'")]
    Encode { key: String, source: ron::Error },
    #[error("failed to decode '{key}'")]
    Decode {
        key: String,
        source: ron::error::SpannedError,
    },
}

pub struct SaveLoadPlugin;

impl Plugin for SaveLoadPlugin {
    fn build(&self, app: &mut App) {
        app.configure_sets(PostUpdate, QuestSchedule::Persist)
            .add_systems(
                OnEnter(GameState::Restoring),
                (
                    open_file_store.run_if(not(resource_exists::<SaveStore>)),
                    restore_saved_state,
                )
                    .chain(),
            )
            .add_systems(
                PostUpdate,
                flush_pending_writes
                    .in_set(QuestSchedule::Persist)
                    .run_if(in_state(GameState::Running).and(resource_exists::<SaveStore>)),
            );
    }
}

/// Read access to every persisted resource.
#[derive(SystemParam)]
pub struct PersistedState<'w> {
    groups: Res<'w, ObjectiveGroups>,
    finished: Res<'w, FinishedTaskLog>,
    grid: Res<'w, Grid>,
    inventory: Res<'w, Inventory>,
    boot: Res<'w, BootFlags>,
    wallet: Res<'w, Wallet>,
    bonuses: Res<'w, BonusQueue>,
}

impl PersistedState<'_> {
    pub fn encode(&self, key: PersistKey) -> Result<String, PersistenceError> {
        match key {
            PersistKey::ActiveObjectiveGroups => encode(key, &*self.groups),
            PersistKey::FinishedTaskRecords => encode(key, &*self.finished),
            PersistKey::GridContainer => encode(key, &*self.grid),
            PersistKey::InventoryContainer => encode(key, &*self.inventory),
            PersistKey::DefaultObjectiveSeeded => encode(key, &self.boot.default_objective_seeded),
            PersistKey::WalletBalance => encode(key, &*self.wallet),
            PersistKey::BonusQueue => encode(key, &*self.bonuses),
        }
    }
}

fn encode<T: Serialize>(key: PersistKey, value: &T) -> Result<String, PersistenceError> {
    ron::ser::to_string_pretty(value, PrettyConfig::default()).map_err(|source| {
        PersistenceError::Encode {
            key: key.as_str().to_string(),
            source,
        }
    })
}

fn load<T: DeserializeOwned>(
    store: &dyn KeyValueStore,
    key: PersistKey,
) -> Result<Option<T>, PersistenceError> {
    let Some(raw) = store.read(key.as_str())? else {
        return Ok(None);
    };
    ron::from_str(&raw)
        .map(Some)
        .map_err(|source| PersistenceError::Decode {
            key: key.as_str().to_string(),
            source,
        })
}

/// Writes every dirty key. Keys that fail stay dirty for the next frame.
pub fn flush_pending_writes(
    mut dirty: ResMut<DirtyKeys>,
    mut store: ResMut<SaveStore>,
    state: PersistedState,
) {
    if dirty.is_empty() {
        return;
    }

    for key in dirty.take() {
        let written = state
            .encode(key)
            .and_then(|value| store.0.write(key.as_str(), &value));
        match written {
            Ok(()) => debug!(key = key.as_str(), "persisted"),
            Err(err) => {
                error!(
                    key = key.as_str(),
                    %err,
                    cause = ?std::error::Error::source(&err),
                    "failed to persist, will retry"
                );
                dirty.mark(key);
            }
        }
    }
}

fn open_file_store(mut commands: Commands, config: Res<QuestConfig>) {
    info!(dir = %config.save_dir, "opening save store");
    commands.insert_resource(SaveStore::new(RonFileStore::new(&config.save_dir)));
}

/// Everything read back from the store. Keys that are missing or unreadable are
/// `None` and keep their fresh default.
struct Snapshot {
    groups: Option<ObjectiveGroups>,
    finished: Option<FinishedTaskLog>,
    grid: Option<Grid>,
    inventory: Option<Inventory>,
    seeded: Option<bool>,
    wallet: Option<Wallet>,
    bonuses: Option<BonusQueue>,
}

impl Snapshot {
    fn read(store: &dyn KeyValueStore) -> Self {
        Self {
            groups: read_or_warn(store, PersistKey::ActiveObjectiveGroups),
            finished: read_or_warn(store, PersistKey::FinishedTaskRecords),
            grid: read_or_warn(store, PersistKey::GridContainer),
            inventory: read_or_warn(store, PersistKey::InventoryContainer),
            seeded: read_or_warn(store, PersistKey::DefaultObjectiveSeeded),
            wallet: read_or_warn(store, PersistKey::WalletBalance),
            bonuses: read_or_warn(store, PersistKey::BonusQueue),
        }
    }
}

fn read_or_warn<T: DeserializeOwned>(store: &dyn KeyValueStore, key: PersistKey) -> Option<T> {
    match load(store, key) {
        Ok(value) => value,
        Err(err) => {
            warn!(key = key.as_str(), %err, "saved value unusable, starting fresh");
            None
        }
    }
}

/// Exclusive system that replaces the persisted resources with their saved values.
pub fn restore_saved_state(world: &mut World) {
    let Some(store) = world.get_resource::<SaveStore>() else {
        warn!("no save store, nothing to restore");
        return;
    };
    let snapshot = Snapshot::read(store.0.as_ref());

    let mut restored = 0;
    if let Some(groups) = snapshot.groups {
        world.insert_resource(groups);
        restored += 1;
    }
    if let Some(finished) = snapshot.finished {
        world.insert_resource(finished);
        restored += 1;
    }
    if let Some(grid) = snapshot.grid {
        world.insert_resource(grid);
        restored += 1;
    }
    if let Some(inventory) = snapshot.inventory {
        world.insert_resource(inventory);
        restored += 1;
    }
    if let Some(seeded) = snapshot.seeded {
        world.resource_mut::<BootFlags>().default_objective_seeded = seeded;
        restored += 1;
    }
    if let Some(wallet) = snapshot.wallet {
        world.insert_resource(wallet);
        restored += 1;
    }
    if let Some(bonuses) = snapshot.bonuses {
        world.insert_resource(bonuses);
        restored += 1;
    }

    info!(restored, "saved state restored");
}

#[cfg(test)]
mod tests {
    use {
        super::*,
        bevy::state::app::StatesPlugin,
        container_resources::ContainerResourcesPlugin,
        item_components::{ItemIdentity, ItemKind, LifecycleState},
        quest_resources::{ObjectiveGroup, QuestResourcesPlugin},
        std::sync::{Arc, Mutex},
        wallet::WalletPlugin,
    };

    /// Memory store whose writes can be switched off; the inner map is shared
    /// with the test so it can be inspected after the app took ownership.
    #[derive(Clone, Default)]
    struct SharedStore {
        values: Arc<Mutex<MemoryStore>>,
        failing: Arc<Mutex<bool>>,
    }

    impl KeyValueStore for SharedStore {
        fn read(&self, key: &str) -> Result<Option<String>, PersistenceError> {
            self.values.lock().unwrap().read(key)
        }

        fn write(&mut self, key: &str, value: &str) -> Result<(), PersistenceError> {
            if *self.failing.lock().unwrap() {
                return Err(PersistenceError::Write {
                    key: key.to_string(),
                    source: std::io::Error::other("disk full"),
                });
            }
            self.values.lock().unwrap().write(key, value)
        }
    }

    fn app_with(store: SharedStore) -> App {
        let mut app = App::new();
        app.add_plugins((
            MinimalPlugins,
            StatesPlugin,
            WalletPlugin,
            ContainerResourcesPlugin,
            QuestResourcesPlugin,
            SaveLoadPlugin,
        ))
        .init_state::<GameState>()
        .insert_resource(SaveStore::new(store));
        app
    }

    fn run_state(app: &mut App, state: GameState) {
        app.world_mut()
            .resource_mut::<NextState<GameState>>()
            .set(state);
        app.update();
    }

    #[test]
    fn test_dirty_keys_are_written_once_running() {
        let store = SharedStore::default();
        let mut app = app_with(store.clone());
        run_state(&mut app, GameState::Running);

        app.world_mut().resource_mut::<Wallet>().credit("coin", 12);
        app.world_mut()
            .resource_mut::<DirtyKeys>()
            .mark(PersistKey::WalletBalance);
        app.update();

        assert!(app.world().resource::<DirtyKeys>().is_empty());
        let raw = store.read("walletBalance").unwrap().unwrap();
        let wallet: Wallet = ron::from_str(&raw).unwrap();
        assert_eq!(wallet.balance("coin"), 12);
        assert!(store.read("gridContainer").unwrap().is_none());
    }

    #[test]
    fn test_failed_write_keeps_key_dirty() {
        let store = SharedStore::default();
        *store.failing.lock().unwrap() = true;
        let mut app = app_with(store.clone());
        run_state(&mut app, GameState::Running);

        app.world_mut()
            .resource_mut::<DirtyKeys>()
            .mark(PersistKey::FinishedTaskRecords);
        app.update();
        assert!(app.world().resource::<DirtyKeys>().contains(PersistKey::FinishedTaskRecords));

        *store.failing.lock().unwrap() = false;
        app.update();
        assert!(app.world().resource::<DirtyKeys>().is_empty());
        assert!(store.read("finishedTaskRecords").unwrap().is_some());
    }

    #[test]
    fn test_restore_round_trip() {
        let store = SharedStore::default();
        let mut source = app_with(store.clone());
        run_state(&mut source, GameState::Running);
        {
            let world = source.world_mut();
            world.resource_mut::<FinishedTaskLog>().record("kitchen", "T1");
            world
                .resource_mut::<ObjectiveGroups>()
                .groups
                .push(ObjectiveGroup::new("kitchen", 2));
            world.resource_mut::<Grid>().place(
                1,
                1,
                ItemIdentity::new("gold", ItemKind::Placeable, 2),
                LifecycleState::Boxed,
            );
            world.resource_mut::<BootFlags>().default_objective_seeded = true;
            world.resource_mut::<DirtyKeys>().mark_all(PersistKey::ALL);
        }
        source.update();

        let mut restored = app_with(store);
        run_state(&mut restored, GameState::Restoring);

        let world = restored.world();
        assert!(world.resource::<FinishedTaskLog>().contains("kitchen", "T1"));
        assert_eq!(world.resource::<ObjectiveGroups>().groups.len(), 1);
        assert_eq!(
            world.resource::<Grid>().slot(1, 1).unwrap().state,
            LifecycleState::Boxed
        );
        assert!(world.resource::<BootFlags>().default_objective_seeded);
        assert!(world.resource::<DirtyKeys>().is_empty());
    }

    #[test]
    fn test_corrupt_value_falls_back_to_default() {
        let store = SharedStore::default();
        store
            .values
            .lock()
            .unwrap()
            .write("finishedTaskRecords", "not ron at all (")
            .unwrap();
        store
            .values
            .lock()
            .unwrap()
            .write("defaultObjectiveSeeded", "true")
            .unwrap();

        let mut app = app_with(store);
        run_state(&mut app, GameState::Restoring);

        assert!(app.world().resource::<FinishedTaskLog>().is_empty());
        assert!(app.world().resource::<BootFlags>().default_objective_seeded);
    }
}
