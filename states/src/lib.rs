use bevy::prelude::*;

#[derive(States, Default, Debug, Clone, PartialEq, Eq, Hash)]
pub enum GameState {
    /// Area definitions and config are being loaded.
    #[default]
    Loading,
    /// Persisted progress is read back and the first objective seeded.
    Restoring,
    Running,
}
