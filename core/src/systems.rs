use {
    bevy::prelude::*,
    quest_resources::{AreaCatalog, ObjectiveGroups},
    quests::{QuestWorld, emit},
    states::GameState,
};

/// Hands out the first objective on a fresh save, rescans the restored
/// containers and lets the game run.
pub fn seed_and_start(
    mut quests: QuestWorld,
    mut commands: Commands,
    mut next_state: ResMut<NextState<GameState>>,
) {
    let mut ctx = quests.context();
    match ctx.seed_default_objective() {
        Ok(true) => info!("fresh save, default objective seeded"),
        Ok(false) => debug!("default objective seeded on an earlier boot"),
        Err(err) => error!(%err, "could not seed the default objective"),
    }
    let report = ctx.refresh();
    debug!(ready = report.ready_tasks, "restored containers matched");
    emit(&mut commands, ctx.finish());

    next_state.set(GameState::Running);
}

pub fn log_running(catalog: Res<AreaCatalog>, groups: Res<ObjectiveGroups>) {
    info!(
        areas = catalog.len(),
        active_groups = groups.groups.len(),
        active_objectives = groups.task_count(),
        "quest core running"
    );
}
