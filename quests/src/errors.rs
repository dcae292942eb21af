use {quest_resources::CompletionGate, thiserror::Error};

/// Everything that can go wrong in a quest operation. None of these are fatal:
/// the observer that received the signal logs the error and the operation is a
/// no-op.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QuestError {
    #[error("area '{0}' is not in the catalog")]
    UnknownArea(String),
    #[error("area '{0}' has no task steps")]
    EmptyArea(String),
    #[error("step '{step_id}' does not exist in area '{area_id}'")]
    UnknownStep { area_id: String, step_id: String },
    #[error("step '{step_id}' in area '{area_id}' is not a task")]
    NotATask { area_id: String, step_id: String },
    #[error("step '{step_id}' in area '{area_id}' is a task, it resolves by completion")]
    NotResolvable { area_id: String, step_id: String },
    #[error("objective '{task_id}' is not active in group '{group_id}'")]
    ObjectiveNotActive { group_id: String, task_id: String },
    #[error("objective '{task_id}' in group '{group_id}' still misses items")]
    ObjectiveNotReady { group_id: String, task_id: String },
    #[error("no completion of '{task_id}' in group '{group_id}' waits for {gate:?}")]
    NoPendingCompletion {
        group_id: String,
        task_id: String,
        gate: CompletionGate,
    },
}

impl QuestError {
    /// Unknown ids in the reference data, as opposed to a bad state transition.
    pub fn is_lookup_failure(&self) -> bool {
        matches!(
            self,
            QuestError::UnknownArea(_)
                | QuestError::EmptyArea(_)
                | QuestError::UnknownStep { .. }
                | QuestError::NotATask { .. }
        )
    }

    pub(crate) fn unknown_step(area_id: &str, step_id: &str) -> Self {
        QuestError::UnknownStep {
            area_id: area_id.to_string(),
            step_id: step_id.to_string(),
        }
    }

    pub(crate) fn not_active(group_id: &str, task_id: &str) -> Self {
        QuestError::ObjectiveNotActive {
            group_id: group_id.to_string(),
            task_id: task_id.to_string(),
        }
    }
}
