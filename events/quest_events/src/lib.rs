//! Signals exchanged between the quest core and its collaborators.
//!
//! Every type here is an **Observer** event: raise it with `commands.trigger` (or
//! `world.trigger`) and it is handled on the same turn.

use {bevy::prelude::*, item_components::ItemAmount, quest_assets::TargetRef};

pub struct QuestEventsPlugin;

impl Plugin for QuestEventsPlugin {
    fn build(&self, app: &mut App) {
        app.register_type::<ContainerMutated>()
            .register_type::<ObjectiveTapped>()
            .register_type::<IndicatorCountChanged>()
            .register_type::<RewardGranted>()
            .register_type::<AreaAdvanced>();
    }
}

// ============================================================================
// Inbound
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Reflect)]
pub enum ContainerKind {
    Grid,
    Inventory,
}

/// Raised by the placement system after it placed, merged or removed an item.
///
/// # Observers
/// - `quests::systems::on_container_mutated`: runs a full matcher pass and
///   refreshes the attention indicator.
#[derive(Event, Debug, Clone, Reflect)]
pub struct ContainerMutated {
    pub container: ContainerKind,
}

/// The player tapped an objective card.
///
/// # Observers
/// - `quests::systems::on_objective_tapped`: validates the objective and parks
///   the completion until its target collaborator answers.
#[derive(Event, Debug, Clone, Reflect)]
pub struct ObjectiveTapped {
    pub group_id: String,
    pub task_id: String,
}

/// The selection system confirmed the objective's target.
#[derive(Event, Debug, Clone)]
pub struct SelectionConfirmed {
    pub group_id: String,
    pub task_id: String,
}

/// The removal effect on a filth target played to the end.
#[derive(Event, Debug, Clone)]
pub struct RemovalEffectFinished {
    pub group_id: String,
    pub task_id: String,
}

/// The removal effect was interrupted. The objective stays active.
#[derive(Event, Debug, Clone)]
pub struct RemovalEffectCancelled {
    pub group_id: String,
    pub task_id: String,
}

/// A conversation or room unlock handed out by the walker is done; progression
/// continues from that step.
#[derive(Event, Debug, Clone)]
pub struct StepResolved {
    pub area_id: String,
    pub step_id: String,
}

/// Asks the core to activate a task directly (tutorial scripts, debug tools).
#[derive(Event, Debug, Clone)]
pub struct EnqueueObjectiveRequest {
    pub area_id: String,
    pub task_id: String,
}

// ============================================================================
// Outbound
// ============================================================================

#[derive(Event, Debug, Clone)]
pub struct ObjectiveAdded {
    pub group_id: String,
    pub task_id: String,
}

/// Raised after the objective's items were consumed and it was written to the
/// finished log, before any successor is enqueued.
#[derive(Event, Debug, Clone)]
pub struct ObjectiveCompleted {
    pub group_id: String,
    pub task_id: String,
    pub consumed: Vec<ItemAmount>,
}

/// Result of a matcher pass; the board renderer only redraws highlights when
/// `any_completed` is set.
#[derive(Event, Debug, Clone, Copy)]
pub struct HighlightsRefreshed {
    pub any_completed: bool,
}

/// Attention badge on the objectives button.
#[derive(Event, Debug, Clone, Copy, PartialEq, Eq, Reflect)]
pub struct IndicatorCountChanged {
    pub count: u32,
    /// The count is above what the badge can display.
    pub overflowed: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Reflect)]
pub enum RewardDelivery {
    /// Credited without any popup, the next step is a conversation.
    Silent,
    /// Credited and shown as a flying gain.
    Shown,
    /// Queued as a bonus item waiting for placement.
    Deferred,
}

#[derive(Event, Debug, Clone, Reflect)]
pub struct RewardGranted {
    pub group_id: String,
    pub task_id: String,
    pub reward: ItemAmount,
    pub delivery: RewardDelivery,
}

/// An area was finished and `to_area` received its first objective.
#[derive(Event, Debug, Clone, Reflect)]
pub struct AreaAdvanced {
    pub from_area: String,
    pub to_area: String,
}

#[derive(Event, Debug, Clone)]
pub struct ConversationRequested {
    pub area_id: String,
    pub step_id: String,
    pub dialogue_id: String,
}

#[derive(Event, Debug, Clone)]
pub struct RoomUnlockRequested {
    pub area_id: String,
    pub step_id: String,
    pub room_id: String,
}

/// Start the removal effect on a filth target, answer with
/// `RemovalEffectFinished` or `RemovalEffectCancelled`.
#[derive(Event, Debug, Clone)]
pub struct RemovalEffectRequested {
    pub group_id: String,
    pub task_id: String,
    pub target: TargetRef,
}

/// Let the player pick the objective's target, answer with `SelectionConfirmed`.
#[derive(Event, Debug, Clone)]
pub struct SelectionRequested {
    pub group_id: String,
    pub task_id: String,
    pub target: TargetRef,
}
