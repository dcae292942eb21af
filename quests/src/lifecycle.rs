//! Objective lifecycle: enqueueing, completing and seeding objectives.
//!
//! Completion is split in two halves around the collaborator that has to answer
//! first. `complete_objective` validates the tap and parks the continuation;
//! `resume_completion` picks it up exactly once and performs the mutation.

use {
    crate::{QuestContext, QuestError, QuestSignal},
    bevy::prelude::*,
    container_resources::ResourceStore,
    item_components::{ItemAmount, LifecycleState},
    quest_assets::{TERMINAL_STEP_ID, TargetKind},
    quest_events::{ObjectiveAdded, ObjectiveCompleted, RemovalEffectRequested, SelectionRequested},
    quest_resources::{CompletionGate, Need, PersistKey, Task},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnqueueOutcome {
    Enqueued,
    AlreadyActive,
    AlreadyFinished,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompletionProgress {
    /// Waiting for the collaborator behind the gate.
    Parked(CompletionGate),
    /// A completion for this objective is already parked; the tap is ignored.
    AlreadyPending,
    /// No collaborator involved, the objective is done.
    Completed,
}

impl QuestContext<'_> {
    /// Activates `task_id` of `area_id` unless it is already active or finished.
    ///
    /// The group is created on first use with the area's countable task total.
    /// Triggers persistence of the active groups and a matcher pass.
    pub fn try_enqueue(&mut self, area_id: &str, task_id: &str) -> Result<EnqueueOutcome, QuestError> {
        if self.groups.is_active(area_id, task_id) {
            debug!(%area_id, %task_id, "objective already active, skipping enqueue");
            return Ok(EnqueueOutcome::AlreadyActive);
        }
        if self.finished.contains(area_id, task_id) {
            debug!(%area_id, %task_id, "objective already finished, skipping enqueue");
            return Ok(EnqueueOutcome::AlreadyFinished);
        }

        let area = self
            .catalog
            .get(area_id)
            .ok_or_else(|| QuestError::UnknownArea(area_id.to_string()))?;
        let step = area
            .step(task_id)
            .ok_or_else(|| QuestError::unknown_step(area_id, task_id))?;
        let template = step.task().ok_or_else(|| QuestError::NotATask {
            area_id: area_id.to_string(),
            step_id: task_id.to_string(),
        })?;

        self.groups
            .get_or_create(area_id, area.countable_task_count())
            .tasks
            .push(Task::from_template(task_id, template));
        info!(%area_id, %task_id, "objective enqueued");

        self.signal(QuestSignal::ObjectiveAdded(ObjectiveAdded {
            group_id: area_id.to_string(),
            task_id: task_id.to_string(),
        }));
        self.dirty.mark(PersistKey::ActiveObjectiveGroups);
        self.refresh();
        Ok(EnqueueOutcome::Enqueued)
    }

    /// Entry point for a tapped objective.
    ///
    /// Filth targets wait for the removal effect, other targets for the
    /// selection confirmation; objectives without a target complete right away.
    pub fn complete_objective(
        &mut self,
        group_id: &str,
        task_id: &str,
    ) -> Result<CompletionProgress, QuestError> {
        let task = self
            .groups
            .find_task(group_id, task_id)
            .ok_or_else(|| QuestError::not_active(group_id, task_id))?;

        if self.pending.is_parked(group_id, task_id) {
            debug!(%group_id, %task_id, "completion already pending");
            return Ok(CompletionProgress::AlreadyPending);
        }
        if !task.is_ready() {
            return Err(QuestError::ObjectiveNotReady {
                group_id: group_id.to_string(),
                task_id: task_id.to_string(),
            });
        }

        let Some(target) = task.target.clone() else {
            self.finish_completion(group_id, task_id)?;
            return Ok(CompletionProgress::Completed);
        };

        let gate = match target.kind {
            TargetKind::Filth => CompletionGate::Removal,
            TargetKind::Decoration => CompletionGate::Selection,
        };
        self.pending.park(group_id, task_id, gate);
        debug!(%group_id, %task_id, ?gate, target = %target.name, "completion parked");

        let (group_id, task_id) = (group_id.to_string(), task_id.to_string());
        self.signal(match gate {
            CompletionGate::Removal => QuestSignal::RemovalEffectRequested(RemovalEffectRequested {
                group_id,
                task_id,
                target,
            }),
            CompletionGate::Selection => QuestSignal::SelectionRequested(SelectionRequested {
                group_id,
                task_id,
                target,
            }),
        });
        Ok(CompletionProgress::Parked(gate))
    }

    /// Picks up a parked completion once its collaborator answered.
    pub fn resume_completion(
        &mut self,
        group_id: &str,
        task_id: &str,
        gate: CompletionGate,
    ) -> Result<(), QuestError> {
        if !self.pending.take(group_id, task_id, gate) {
            return Err(QuestError::NoPendingCompletion {
                group_id: group_id.to_string(),
                task_id: task_id.to_string(),
                gate,
            });
        }
        self.finish_completion(group_id, task_id)
    }

    /// Drops a parked removal. Nothing else is touched, so tapping again is safe.
    pub fn cancel_removal(&mut self, group_id: &str, task_id: &str) -> bool {
        let dropped = self.pending.take(group_id, task_id, CompletionGate::Removal);
        if dropped {
            info!(%group_id, %task_id, "removal cancelled, objective stays active");
        }
        dropped
    }

    fn finish_completion(&mut self, group_id: &str, task_id: &str) -> Result<(), QuestError> {
        // the containers may have changed while the collaborator was busy
        self.refresh();
        let task = self
            .groups
            .find_task(group_id, task_id)
            .cloned()
            .ok_or_else(|| QuestError::not_active(group_id, task_id))?;
        if !task.is_ready() {
            return Err(QuestError::ObjectiveNotReady {
                group_id: group_id.to_string(),
                task_id: task_id.to_string(),
            });
        }

        if task.is_terminal() {
            return self.finish_area(group_id, task);
        }

        let consumed: Vec<ItemAmount> = task.needs.iter().map(|need| self.consume(need)).collect();

        if let Some(group) = self.groups.get_mut(group_id) {
            group.remove_task(task_id);
            group.completed_count += 1;
        }
        self.finished.record(group_id, task_id);
        self.dirty.mark_all([
            PersistKey::ActiveObjectiveGroups,
            PersistKey::FinishedTaskRecords,
            PersistKey::GridContainer,
            PersistKey::InventoryContainer,
        ]);
        info!(%group_id, %task_id, "objective completed");

        self.signal(QuestSignal::ObjectiveCompleted(ObjectiveCompleted {
            group_id: group_id.to_string(),
            task_id: task_id.to_string(),
            consumed,
        }));
        self.dispatch_rewards(&task.rewards, group_id, task_id);
        self.refresh();

        self.on_step_completed(group_id, task_id)
    }

    /// Terminal objective: the group is discarded and the next areas open.
    fn finish_area(&mut self, group_id: &str, task: Task) -> Result<(), QuestError> {
        if let Some(group) = self.groups.get_mut(group_id) {
            group.completed_count += 1;
        }
        self.finished.record(group_id, TERMINAL_STEP_ID);
        self.groups.remove(group_id);
        self.pending.forget_group(group_id);
        self.dirty.mark_all([
            PersistKey::ActiveObjectiveGroups,
            PersistKey::FinishedTaskRecords,
        ]);
        info!(%group_id, "area finished");

        self.signal(QuestSignal::ObjectiveCompleted(ObjectiveCompleted {
            group_id: group_id.to_string(),
            task_id: task.id.clone(),
            consumed: Vec::new(),
        }));
        self.dispatch_rewards(&task.rewards, group_id, &task.id);

        let advanced = self.on_area_terminal(group_id);
        self.refresh();
        advanced
    }

    /// Removes one need's items: board slots first, the rest from the inventory.
    fn consume(&mut self, need: &Need) -> ItemAmount {
        let from_grid =
            self.grid
                .remove_matching(&need.identity, Some(LifecycleState::Default), need.amount);
        let from_inventory =
            self.inventory
                .remove_matching(&need.identity, None, need.amount - from_grid);
        trace!(need = %need.identity, from_grid, from_inventory, "need consumed");

        ItemAmount {
            identity: need.identity.clone(),
            amount: from_grid + from_inventory,
        }
    }

    /// Hands out the starting area's first task on the very first boot.
    /// Returns whether anything was seeded.
    pub fn seed_default_objective(&mut self) -> Result<bool, QuestError> {
        if self.boot.default_objective_seeded {
            return Ok(false);
        }

        let area_id = self.config.starting_area.as_str();
        let area = self
            .catalog
            .get(area_id)
            .ok_or_else(|| QuestError::UnknownArea(area_id.to_string()))?;
        let first = area
            .first_task_step()
            .ok_or_else(|| QuestError::EmptyArea(area_id.to_string()))?;

        self.try_enqueue(area_id, &first.id)?;
        self.boot.default_objective_seeded = true;
        self.dirty.mark(PersistKey::DefaultObjectiveSeeded);
        info!(%area_id, task_id = %first.id, "default objective seeded");
        Ok(true)
    }
}
