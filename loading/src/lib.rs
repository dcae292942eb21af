mod resources;

use {
    crate::resources::AreasFolderHandle,
    bevy::{asset::LoadedFolder, prelude::*},
    quest_assets::AreaDefinition,
    quest_resources::{AreaCatalog, QuestConfig},
    states::GameState,
    std::{fs, io::ErrorKind, path::Path},
    system_schedule::QuestSchedule,
};

/// Config file read at startup. Missing file means defaults.
pub const CONFIG_PATH: &str = "assets/quests.config.ron";
/// Asset folder holding one `*.area.ron` per area.
pub const AREAS_FOLDER: &str = "areas";

pub struct LoadingManagerPlugin;

impl Plugin for LoadingManagerPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<LoadingStatus>()
            .configure_sets(Update, QuestSchedule::SyncDefinitions)
            .add_systems(Startup, (load_quest_config, load_area_assets))
            .add_systems(
                Update,
                check_areas_loaded
                    .in_set(QuestSchedule::SyncDefinitions)
                    .run_if(in_state(GameState::Loading)),
            );
    }
}

#[derive(Resource, Default)]
pub struct LoadingStatus {
    pub current_phase: String,
    pub detail: String,
}

/// Parses the quest config; missing fields fall back to their defaults.
pub fn parse_config(raw: &str) -> Result<QuestConfig, ron::error::SpannedError> {
    ron::from_str(raw)
}

fn read_config(path: &Path) -> QuestConfig {
    let raw = match fs::read_to_string(path) {
        Ok(raw) => raw,
        Err(err) if err.kind() == ErrorKind::NotFound => {
            info!(path = %path.display(), "no quest config, using defaults");
            return QuestConfig::default();
        }
        Err(err) => {
            warn!(path = %path.display(), %err, "quest config unreadable, using defaults");
            return QuestConfig::default();
        }
    };

    parse_config(&raw).unwrap_or_else(|err| {
        warn!(path = %path.display(), %err, "quest config invalid, using defaults");
        QuestConfig::default()
    })
}

fn load_quest_config(mut commands: Commands) {
    let config = read_config(Path::new(CONFIG_PATH));
    info!(
        starting_area = %config.starting_area,
        max_displayed_indicator = config.max_displayed_indicator,
        save_dir = %config.save_dir,
        "quest config loaded"
    );
    commands.insert_resource(config);
}

fn load_area_assets(
    mut cmd: Commands,
    asset_server: Res<AssetServer>,
    mut status: ResMut<LoadingStatus>,
) {
    info!("started loading area definitions");
    status.current_phase = "Loading Assets".into();
    status.detail = "Loading area definitions...".into();

    let handle = asset_server.load_folder(AREAS_FOLDER);
    cmd.insert_resource(AreasFolderHandle(handle));
}

/// Moves every loaded area definition into the catalog, then starts restoring.
fn check_areas_loaded(
    mut next_state: ResMut<NextState<GameState>>,
    mut catalog: ResMut<AreaCatalog>,
    mut status: ResMut<LoadingStatus>,
    asset_server: Res<AssetServer>,
    areas_folder: Res<AreasFolderHandle>,
    folders: Res<Assets<LoadedFolder>>,
    areas: Res<Assets<AreaDefinition>>,
) {
    if !asset_server.is_loaded_with_dependencies(areas_folder.0.id()) {
        return;
    }
    let Some(folder) = folders.get(areas_folder.0.id()) else {
        return;
    };

    for untyped_handle in folder.handles.iter().cloned() {
        let id = untyped_handle.id();
        let Ok(handle) = untyped_handle.try_typed::<AreaDefinition>() else {
            warn!(path = ?asset_server.get_path(id), "not an area definition, skipping");
            continue;
        };
        let Some(area) = areas.get(&handle) else {
            continue;
        };
        if area.first_task_step().is_none() {
            warn!(area_id = %area.id, "area has no task steps");
        }
        debug!(area_id = %area.id, steps = area.steps.len(), "area registered");
        catalog.insert(area.clone());
    }

    info!(areas = catalog.len(), "area definitions loaded");
    status.current_phase = "Restoring".into();
    status.detail = format!("{} areas", catalog.len());
    next_state.set(GameState::Restoring);
}
