//! Progression graph traversal: which steps open after a step is done.
//!
//! Eligibility is derived from the finished log only, never from counters, so a
//! walk can be repeated after a crash without skipping or duplicating steps.

use {
    crate::{QuestContext, QuestError, QuestSignal},
    bevy::prelude::*,
    quest_assets::{AreaDefinition, StepDefinition, StepKind, TERMINAL_STEP_ID},
    quest_events::{AreaAdvanced, ConversationRequested, RoomUnlockRequested},
    quest_resources::{AreaCatalog, FinishedTaskLog},
};

/// Whether `step_id` of `area` may open right now.
///
/// - the terminal step opens once every other task step of the area is finished
/// - a step with required ids opens once all of them are finished
/// - any other step opens unconditionally
pub fn is_step_eligible(area: &AreaDefinition, finished: &FinishedTaskLog, step_id: &str) -> bool {
    if step_id == TERMINAL_STEP_ID {
        return area
            .task_steps()
            .filter(|step| !step.is_terminal())
            .all(|step| finished.contains(&area.id, &step.id));
    }

    let Some(step) = area.step(step_id) else {
        return false;
    };
    step.required_ids
        .iter()
        .all(|required| finished.contains(&area.id, required))
}

/// Successors of `step_id` that are eligible, in `next_ids` order.
pub fn eligible_successors<'a>(
    catalog: &'a AreaCatalog,
    finished: &FinishedTaskLog,
    area_id: &str,
    step_id: &str,
) -> Result<Vec<&'a StepDefinition>, QuestError> {
    let area = catalog
        .get(area_id)
        .ok_or_else(|| QuestError::UnknownArea(area_id.to_string()))?;
    let step = area
        .step(step_id)
        .ok_or_else(|| QuestError::unknown_step(area_id, step_id))?;

    let mut eligible = Vec::new();
    for next_id in &step.next_ids {
        let Some(next) = area.step(next_id) else {
            warn!(%area_id, %step_id, %next_id, "successor is not defined in the area");
            continue;
        };
        if is_step_eligible(area, finished, next_id) {
            eligible.push(next);
        } else {
            trace!(%area_id, %next_id, "successor not eligible yet");
        }
    }
    Ok(eligible)
}

/// Whether the step that follows a just-finished one is a conversation.
pub fn next_is_conversation(
    catalog: &AreaCatalog,
    finished: &FinishedTaskLog,
    area_id: &str,
    step_id: &str,
) -> bool {
    // the terminal step's successors are areas, not steps
    if step_id == TERMINAL_STEP_ID {
        return false;
    }
    eligible_successors(catalog, finished, area_id, step_id)
        .map(|steps| steps.iter().any(|s| s.is_conversation()))
        .unwrap_or(false)
}

impl QuestContext<'_> {
    /// Opens every eligible successor of a finished step: tasks are enqueued,
    /// conversations and room unlocks are handed to their collaborators.
    pub fn on_step_completed(&mut self, area_id: &str, step_id: &str) -> Result<(), QuestError> {
        let catalog = self.catalog;
        let successors = eligible_successors(catalog, self.finished, area_id, step_id)?;
        debug!(%area_id, %step_id, count = successors.len(), "walking successors");

        for step in successors {
            match &step.kind {
                StepKind::Task(_) => {
                    if let Err(err) = self.try_enqueue(area_id, &step.id) {
                        warn!(%area_id, step_id = %step.id, %err, "could not enqueue successor");
                    }
                }
                StepKind::Conversation { dialogue_id } => {
                    info!(%area_id, step_id = %step.id, %dialogue_id, "conversation requested");
                    self.signal(QuestSignal::ConversationRequested(ConversationRequested {
                        area_id: area_id.to_string(),
                        step_id: step.id.clone(),
                        dialogue_id: dialogue_id.clone(),
                    }));
                }
                StepKind::RoomUnlock { room_id } => {
                    info!(%area_id, step_id = %step.id, %room_id, "room unlock requested");
                    self.signal(QuestSignal::RoomUnlockRequested(RoomUnlockRequested {
                        area_id: area_id.to_string(),
                        step_id: step.id.clone(),
                        room_id: room_id.clone(),
                    }));
                }
            }
        }
        Ok(())
    }

    /// Continues from a conversation or room unlock whose collaborator is done.
    /// Task steps only advance through completion, so they are rejected here.
    pub fn resolve_step(&mut self, area_id: &str, step_id: &str) -> Result<(), QuestError> {
        let catalog = self.catalog;
        let step = catalog
            .get(area_id)
            .ok_or_else(|| QuestError::UnknownArea(area_id.to_string()))?
            .step(step_id)
            .ok_or_else(|| QuestError::unknown_step(area_id, step_id))?;
        if step.is_task() {
            return Err(QuestError::NotResolvable {
                area_id: area_id.to_string(),
                step_id: step_id.to_string(),
            });
        }
        self.on_step_completed(area_id, step_id)
    }

    /// Called once the terminal step of `area_id` is done: every area named by
    /// the terminal step gets its first task step enqueued.
    pub fn on_area_terminal(&mut self, area_id: &str) -> Result<(), QuestError> {
        let catalog = self.catalog;
        let area = catalog
            .get(area_id)
            .ok_or_else(|| QuestError::UnknownArea(area_id.to_string()))?;
        let terminal = area
            .terminal_step()
            .ok_or_else(|| QuestError::unknown_step(area_id, TERMINAL_STEP_ID))?;

        for next_area_id in &terminal.next_ids {
            let Some(first) = catalog.get(next_area_id).and_then(|a| a.first_task_step()) else {
                warn!(%area_id, %next_area_id, "next area is unknown or has no task step");
                continue;
            };

            match self.try_enqueue(next_area_id, &first.id) {
                Ok(outcome) => {
                    info!(from = %area_id, to = %next_area_id, ?outcome, "area advanced");
                    self.signal(QuestSignal::AreaAdvanced(AreaAdvanced {
                        from_area: area_id.to_string(),
                        to_area: next_area_id.clone(),
                    }));
                }
                Err(err) => warn!(%area_id, %next_area_id, %err, "could not open next area"),
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use {super::*, crate::test_support::*};

    #[test]
    fn test_terminal_needs_every_task_finished() {
        let catalog = catalog_with(vec![kitchen()]);
        let area = catalog.get("kitchen").unwrap();
        let mut finished = FinishedTaskLog::default();

        finished.record("kitchen", "T1");
        assert!(!is_step_eligible(area, &finished, TERMINAL_STEP_ID));

        finished.record("kitchen", "T2");
        assert!(is_step_eligible(area, &finished, TERMINAL_STEP_ID));
    }

    #[test]
    fn test_terminal_ignores_other_areas() {
        let catalog = catalog_with(vec![kitchen()]);
        let area = catalog.get("kitchen").unwrap();
        let mut finished = FinishedTaskLog::default();
        finished.record("garden", "T1");
        finished.record("garden", "T2");

        assert!(!is_step_eligible(area, &finished, TERMINAL_STEP_ID));
    }

    #[test]
    fn test_required_ids_are_and_gated() {
        let catalog = catalog_with(vec![workshop()]);
        let area = catalog.get("workshop").unwrap();
        let mut finished = FinishedTaskLog::default();

        finished.record("workshop", "A");
        assert!(!is_step_eligible(area, &finished, "C"));

        finished.record("workshop", "B");
        assert!(is_step_eligible(area, &finished, "C"));
    }

    #[test]
    fn test_eligible_successors_keep_order() {
        let catalog = catalog_with(vec![workshop()]);
        let finished = FinishedTaskLog::default();

        let steps = eligible_successors(&catalog, &finished, "workshop", "start").unwrap();
        let ids: Vec<&str> = steps.iter().map(|s| s.id.as_str()).collect();
        assert_eq!(ids, vec!["A", "B"]);
    }

    #[test]
    fn test_eligible_successors_unknown_ids() {
        let catalog = catalog_with(vec![workshop()]);
        let finished = FinishedTaskLog::default();

        assert_eq!(
            eligible_successors(&catalog, &finished, "attic", "start").unwrap_err(),
            QuestError::UnknownArea("attic".to_string())
        );
        assert!(
            eligible_successors(&catalog, &finished, "workshop", "nope")
                .unwrap_err()
                .is_lookup_failure()
        );
    }

    #[test]
    fn test_next_is_conversation() {
        let catalog = catalog_with(vec![kitchen()]);
        let mut finished = FinishedTaskLog::default();
        finished.record("kitchen", "T1");

        assert!(next_is_conversation(&catalog, &finished, "kitchen", "T1"));
        assert!(!next_is_conversation(&catalog, &finished, "kitchen", "T2"));
        assert!(!next_is_conversation(&catalog, &finished, "kitchen", TERMINAL_STEP_ID));
    }

    #[test]
    fn test_next_area_opens_first_task_only() {
        let mut fx = Fixture::new(vec![workshop(), attic()]);

        let (result, signals) = fx.run(|ctx| ctx.on_area_terminal("workshop"));
        result.unwrap();

        assert!(fx.groups.is_active("attic", "dust"));
        assert!(!fx.groups.is_active("attic", "shelves"));
        assert_eq!(fx.groups.task_count(), 1);
        // the leading conversation is skipped, not requested
        assert!(!signals.iter().any(|s| matches!(s, QuestSignal::ConversationRequested(_))));
        assert!(signals.iter().any(|s| matches!(
            s,
            QuestSignal::AreaAdvanced(e) if e.from_area == "workshop" && e.to_area == "attic"
        )));
    }

    #[test]
    fn test_resolve_step_rejects_tasks() {
        let mut fx = Fixture::new(vec![workshop()]);

        let (result, signals) = fx.run(|ctx| ctx.resolve_step("workshop", "start"));

        assert!(matches!(result, Err(QuestError::NotResolvable { .. })));
        assert!(!result.unwrap_err().is_lookup_failure());
        assert!(signals.is_empty());
        assert_eq!(fx.groups.task_count(), 0);
    }

    #[test]
    fn test_resolve_step_walks_from_conversation() {
        let mut fx = Fixture::new(vec![kitchen()]);
        fx.finished.record("kitchen", "T1");

        fx.run(|ctx| ctx.resolve_step("kitchen", "intro_chat")).0.unwrap();

        assert!(fx.groups.is_active("kitchen", "T2"));
    }
}
