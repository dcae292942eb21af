//! Quest core: matches active objectives against the player's containers,
//! completes them and walks each area's progression graph.

mod context;
mod errors;
mod lifecycle;
mod matcher;
mod rewards;
pub mod systems;
pub mod walker;

#[cfg(test)]
mod test_support;

pub use {context::*, errors::*, lifecycle::*, matcher::MatchReport, rewards::delivery_for};

use {
    bevy::prelude::*, quest_events::QuestEventsPlugin, quest_resources::QuestResourcesPlugin,
    systems::*,
};

/// Registers the quest resources, events and observers.
///
/// Expects `Wallet`, `Grid` and `Inventory` to be provided by their own plugins.
pub struct QuestsPlugin;

impl Plugin for QuestsPlugin {
    fn build(&self, app: &mut App) {
        app.add_plugins((QuestResourcesPlugin, QuestEventsPlugin))
            .add_observer(on_container_mutated)
            .add_observer(on_objective_tapped)
            .add_observer(on_selection_confirmed)
            .add_observer(on_removal_effect_finished)
            .add_observer(on_removal_effect_cancelled)
            .add_observer(on_step_resolved)
            .add_observer(on_enqueue_request);
    }
}
