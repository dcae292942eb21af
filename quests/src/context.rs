//! The injected context every quest operation runs against.
//!
//! Observers build a `QuestContext` from the `QuestWorld` system param, run one
//! operation, then hand the collected outbound signals to `emit`. Tests build the
//! same context from plain owned values.

use {
    bevy::{ecs::system::SystemParam, prelude::*},
    container_resources::{Grid, Inventory},
    quest_events::*,
    quest_resources::{
        AreaCatalog, BonusQueue, BootFlags, DirtyKeys, FinishedTaskLog, NoteIndicator,
        ObjectiveGroups, PendingCompletions, QuestConfig,
    },
    wallet::Wallet,
};

/// Outbound signal produced during an operation, raised once it has finished.
#[derive(Debug, Clone)]
pub enum QuestSignal {
    ObjectiveAdded(ObjectiveAdded),
    ObjectiveCompleted(ObjectiveCompleted),
    HighlightsRefreshed(HighlightsRefreshed),
    IndicatorCountChanged(IndicatorCountChanged),
    RewardGranted(RewardGranted),
    AreaAdvanced(AreaAdvanced),
    ConversationRequested(ConversationRequested),
    RoomUnlockRequested(RoomUnlockRequested),
    RemovalEffectRequested(RemovalEffectRequested),
    SelectionRequested(SelectionRequested),
}

/// Mutable state of the quest core plus read-only reference data.
pub struct QuestContext<'a> {
    pub catalog: &'a AreaCatalog,
    pub config: &'a QuestConfig,
    pub groups: &'a mut ObjectiveGroups,
    pub finished: &'a mut FinishedTaskLog,
    pub grid: &'a mut Grid,
    pub inventory: &'a mut Inventory,
    pub wallet: &'a mut Wallet,
    pub bonuses: &'a mut BonusQueue,
    pub pending: &'a mut PendingCompletions,
    pub indicator: &'a mut NoteIndicator,
    pub boot: &'a mut BootFlags,
    pub dirty: &'a mut DirtyKeys,
    pub(crate) outbox: Vec<QuestSignal>,
}

impl QuestContext<'_> {
    /// Ends the operation and returns the signals it produced, in order.
    pub fn finish(self) -> Vec<QuestSignal> {
        self.outbox
    }

    pub(crate) fn signal(&mut self, signal: QuestSignal) {
        self.outbox.push(signal);
    }
}

#[derive(SystemParam)]
pub struct QuestWorld<'w> {
    catalog: Res<'w, AreaCatalog>,
    config: Res<'w, QuestConfig>,
    groups: ResMut<'w, ObjectiveGroups>,
    finished: ResMut<'w, FinishedTaskLog>,
    grid: ResMut<'w, Grid>,
    inventory: ResMut<'w, Inventory>,
    wallet: ResMut<'w, Wallet>,
    bonuses: ResMut<'w, BonusQueue>,
    pending: ResMut<'w, PendingCompletions>,
    indicator: ResMut<'w, NoteIndicator>,
    boot: ResMut<'w, BootFlags>,
    dirty: ResMut<'w, DirtyKeys>,
}

impl QuestWorld<'_> {
    pub fn context(&mut self) -> QuestContext<'_> {
        QuestContext {
            catalog: &*self.catalog,
            config: &*self.config,
            groups: &mut *self.groups,
            finished: &mut *self.finished,
            grid: &mut *self.grid,
            inventory: &mut *self.inventory,
            wallet: &mut *self.wallet,
            bonuses: &mut *self.bonuses,
            pending: &mut *self.pending,
            indicator: &mut *self.indicator,
            boot: &mut *self.boot,
            dirty: &mut *self.dirty,
            outbox: Vec::new(),
        }
    }
}

/// Raises the collected signals as observer events.
pub fn emit(commands: &mut Commands, signals: Vec<QuestSignal>) {
    for signal in signals {
        match signal {
            QuestSignal::ObjectiveAdded(event) => commands.trigger(event),
            QuestSignal::ObjectiveCompleted(event) => commands.trigger(event),
            QuestSignal::HighlightsRefreshed(event) => commands.trigger(event),
            QuestSignal::IndicatorCountChanged(event) => commands.trigger(event),
            QuestSignal::RewardGranted(event) => commands.trigger(event),
            QuestSignal::AreaAdvanced(event) => commands.trigger(event),
            QuestSignal::ConversationRequested(event) => commands.trigger(event),
            QuestSignal::RoomUnlockRequested(event) => commands.trigger(event),
            QuestSignal::RemovalEffectRequested(event) => commands.trigger(event),
            QuestSignal::SelectionRequested(event) => commands.trigger(event),
        }
    }
}
