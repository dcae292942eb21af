use {
    crate::{QuestError, QuestWorld, emit},
    bevy::prelude::*,
    quest_events::*,
    quest_resources::CompletionGate,
};

/// Observer: the placement system changed the board or the inventory.
pub fn on_container_mutated(
    trigger: On<ContainerMutated>,
    mut quests: QuestWorld,
    mut commands: Commands,
) {
    let mut ctx = quests.context();
    let report = ctx.refresh();
    trace!(container = ?trigger.event().container, ready = report.ready_tasks, "containers rescanned");
    emit(&mut commands, ctx.finish());
}

/// Observer: the player tapped an objective card.
pub fn on_objective_tapped(
    trigger: On<ObjectiveTapped>,
    mut quests: QuestWorld,
    mut commands: Commands,
) {
    let event = trigger.event();
    let mut ctx = quests.context();

    match ctx.complete_objective(&event.group_id, &event.task_id) {
        Ok(progress) => debug!(group_id = %event.group_id, task_id = %event.task_id, ?progress, "objective tapped"),
        Err(err) => log_rejected(&err, "tap ignored"),
    }
    emit(&mut commands, ctx.finish());
}

/// Observer: the selection system confirmed the target of a parked objective.
pub fn on_selection_confirmed(
    trigger: On<SelectionConfirmed>,
    mut quests: QuestWorld,
    mut commands: Commands,
) {
    let event = trigger.event();
    resume(&mut quests, &mut commands, &event.group_id, &event.task_id, CompletionGate::Selection);
}

/// Observer: the removal effect on a filth target finished playing.
pub fn on_removal_effect_finished(
    trigger: On<RemovalEffectFinished>,
    mut quests: QuestWorld,
    mut commands: Commands,
) {
    let event = trigger.event();
    resume(&mut quests, &mut commands, &event.group_id, &event.task_id, CompletionGate::Removal);
}

pub fn on_removal_effect_cancelled(trigger: On<RemovalEffectCancelled>, mut quests: QuestWorld) {
    let event = trigger.event();
    if !quests.context().cancel_removal(&event.group_id, &event.task_id) {
        debug!(group_id = %event.group_id, task_id = %event.task_id, "nothing parked to cancel");
    }
}

/// Observer: a conversation or room unlock is done, keep walking from it.
pub fn on_step_resolved(
    trigger: On<StepResolved>,
    mut quests: QuestWorld,
    mut commands: Commands,
) {
    let event = trigger.event();
    let mut ctx = quests.context();

    if let Err(err) = ctx.resolve_step(&event.area_id, &event.step_id) {
        log_rejected(&err, "step resolution ignored");
    }
    emit(&mut commands, ctx.finish());
}

pub fn on_enqueue_request(
    trigger: On<EnqueueObjectiveRequest>,
    mut quests: QuestWorld,
    mut commands: Commands,
) {
    let event = trigger.event();
    let mut ctx = quests.context();

    match ctx.try_enqueue(&event.area_id, &event.task_id) {
        Ok(outcome) => debug!(area_id = %event.area_id, task_id = %event.task_id, ?outcome, "enqueue requested"),
        Err(err) => log_rejected(&err, "enqueue request ignored"),
    }
    emit(&mut commands, ctx.finish());
}

fn resume(
    quests: &mut QuestWorld,
    commands: &mut Commands,
    group_id: &str,
    task_id: &str,
    gate: CompletionGate,
) {
    let mut ctx = quests.context();
    if let Err(err) = ctx.resume_completion(group_id, task_id, gate) {
        log_rejected(&err, "completion not resumed");
    }
    emit(commands, ctx.finish());
}

fn log_rejected(err: &QuestError, what: &str) {
    warn!(%err, lookup = err.is_lookup_failure(), "{what}");
}
