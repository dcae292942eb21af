use {
    bevy::prelude::*,
    container_resources::ContainerResourcesPlugin,
    item_components::ItemComponentsPlugin,
    loading::LoadingManagerPlugin,
    quest_assets::QuestAssetsPlugin,
    quests::QuestsPlugin,
    save_load::SaveLoadPlugin,
    states::GameState,
    wallet::WalletPlugin,
};

mod systems;

pub struct CorePlugin;

impl Plugin for CorePlugin {
    fn build(&self, app: &mut App) {
        app.init_state::<GameState>()
            .add_plugins((
                ItemComponentsPlugin,
                ContainerResourcesPlugin,
                WalletPlugin,
                QuestAssetsPlugin,
                QuestsPlugin,
                SaveLoadPlugin,
                LoadingManagerPlugin,
            ))
            .add_systems(
                OnEnter(GameState::Restoring),
                systems::seed_and_start.after(save_load::restore_saved_state),
            )
            .add_systems(OnEnter(GameState::Running), systems::log_running);
    }
}
