use {
    bevy::{log::LogPlugin, prelude::*, state::app::StatesPlugin},
    core::CorePlugin,
};

fn main() {
    App::new()
        .add_plugins((
            MinimalPlugins,
            LogPlugin {
                filter: "error,loading=debug,\
                    quests=debug,\
                    save_load=debug,\
                    wallet=debug,\
                    core=info"
                    .into(),
                level: bevy::log::Level::TRACE,
                ..Default::default()
            },
            AssetPlugin::default(),
            StatesPlugin,
        ))
        .add_plugins(CorePlugin)
        .run();
}
