mod indicator;
mod persistence;

pub use indicator::*;
pub use persistence::*;

use {
    bevy::{platform::collections::HashMap, prelude::*},
    item_components::{ItemAmount, ItemIdentity},
    quest_assets::{AreaDefinition, TERMINAL_STEP_ID, TargetRef, TaskTemplate},
    serde::{Deserialize, Serialize},
};

pub struct QuestResourcesPlugin;

impl Plugin for QuestResourcesPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<AreaCatalog>()
            .init_resource::<ObjectiveGroups>()
            .init_resource::<FinishedTaskLog>()
            .init_resource::<PendingCompletions>()
            .init_resource::<BonusQueue>()
            .init_resource::<BootFlags>()
            .init_resource::<NoteIndicator>()
            .init_resource::<DirtyKeys>()
            .init_resource::<QuestConfig>()
            .register_type::<ObjectiveGroups>()
            .register_type::<FinishedTaskLog>()
            .register_type::<BonusQueue>()
            .register_type::<BootFlags>();
    }
}

// ============================================================================
// Reference data
// ============================================================================

/// All loaded area definitions by id. Read-only once loading is done.
#[derive(Resource, Default)]
pub struct AreaCatalog {
    pub areas: HashMap<String, AreaDefinition>,
}

impl AreaCatalog {
    pub fn insert(&mut self, area: AreaDefinition) {
        self.areas.insert(area.id.clone(), area);
    }

    pub fn get(&self, area_id: &str) -> Option<&AreaDefinition> {
        self.areas.get(area_id)
    }

    pub fn len(&self) -> usize {
        self.areas.len()
    }

    pub fn is_empty(&self) -> bool {
        self.areas.is_empty()
    }
}

// ============================================================================
// Active objectives
// ============================================================================

/// One required item of an active objective.
#[derive(Debug, Clone, PartialEq, Eq, Reflect, Serialize, Deserialize)]
pub struct Need {
    pub identity: ItemIdentity,
    pub amount: u32,
    /// Matches found by the last matcher pass, never above `amount`.
    #[serde(default)]
    pub satisfied_count: u32,
}

impl Need {
    pub fn is_satisfied(&self) -> bool {
        self.satisfied_count == self.amount
    }
}

impl From<&ItemAmount> for Need {
    fn from(value: &ItemAmount) -> Self {
        Self {
            identity: value.identity.clone(),
            amount: value.amount,
            satisfied_count: 0,
        }
    }
}

/// An active, player-facing objective.
#[derive(Debug, Clone, PartialEq, Eq, Reflect, Serialize, Deserialize)]
pub struct Task {
    pub id: String,
    pub needs: Vec<Need>,
    pub rewards: Vec<ItemAmount>,
    pub target: Option<TargetRef>,
    #[serde(default)]
    pub satisfied_need_count: u32,
}

impl Task {
    pub fn from_template(id: &str, template: &TaskTemplate) -> Self {
        Self {
            id: id.to_string(),
            needs: template.needs.iter().map(Need::from).collect(),
            rewards: template.rewards.clone(),
            target: template.target.clone(),
            satisfied_need_count: 0,
        }
    }

    /// Every need is covered by the containers as of the last matcher pass.
    pub fn is_ready(&self) -> bool {
        self.satisfied_need_count as usize == self.needs.len()
    }

    pub fn is_terminal(&self) -> bool {
        self.id == TERMINAL_STEP_ID
    }
}

/// The active objectives of one area.
#[derive(Debug, Clone, PartialEq, Eq, Reflect, Serialize, Deserialize)]
pub struct ObjectiveGroup {
    /// Same as the area id.
    pub id: String,
    pub tasks: Vec<Task>,
    pub total_task_count: u32,
    pub completed_count: u32,
}

impl ObjectiveGroup {
    pub fn new(id: &str, total_task_count: u32) -> Self {
        Self {
            id: id.to_string(),
            tasks: Vec::new(),
            total_task_count,
            completed_count: 0,
        }
    }

    pub fn task(&self, task_id: &str) -> Option<&Task> {
        self.tasks.iter().find(|t| t.id == task_id)
    }

    pub fn contains(&self, task_id: &str) -> bool {
        self.task(task_id).is_some()
    }

    pub fn remove_task(&mut self, task_id: &str) -> Option<Task> {
        let index = self.tasks.iter().position(|t| t.id == task_id)?;
        Some(self.tasks.remove(index))
    }

    pub fn ready_count(&self) -> u32 {
        self.tasks.iter().filter(|t| t.is_ready()).count() as u32
    }
}

/// Every area that currently has at least one objective, in activation order.
#[derive(Resource, Reflect, Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[reflect(Resource)]
pub struct ObjectiveGroups {
    pub groups: Vec<ObjectiveGroup>,
}

impl ObjectiveGroups {
    pub fn get(&self, group_id: &str) -> Option<&ObjectiveGroup> {
        self.groups.iter().find(|g| g.id == group_id)
    }

    pub fn get_mut(&mut self, group_id: &str) -> Option<&mut ObjectiveGroup> {
        self.groups.iter_mut().find(|g| g.id == group_id)
    }

    /// Returns the group, creating it with `total_task_count` if it is missing.
    pub fn get_or_create(&mut self, group_id: &str, total_task_count: u32) -> &mut ObjectiveGroup {
        let index = match self.groups.iter().position(|g| g.id == group_id) {
            Some(index) => index,
            None => {
                self.groups.push(ObjectiveGroup::new(group_id, total_task_count));
                self.groups.len() - 1
            }
        };
        &mut self.groups[index]
    }

    pub fn remove(&mut self, group_id: &str) -> Option<ObjectiveGroup> {
        let index = self.groups.iter().position(|g| g.id == group_id)?;
        Some(self.groups.remove(index))
    }

    pub fn is_active(&self, group_id: &str, task_id: &str) -> bool {
        self.get(group_id).is_some_and(|g| g.contains(task_id))
    }

    pub fn find_task(&self, group_id: &str, task_id: &str) -> Option<&Task> {
        self.get(group_id).and_then(|g| g.task(task_id))
    }

    pub fn tasks(&self) -> impl Iterator<Item = &Task> {
        self.groups.iter().flat_map(|g| g.tasks.iter())
    }

    pub fn tasks_mut(&mut self) -> impl Iterator<Item = &mut Task> {
        self.groups.iter_mut().flat_map(|g| g.tasks.iter_mut())
    }

    pub fn task_count(&self) -> usize {
        self.tasks().count()
    }
}

// ============================================================================
// Finished log
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Hash, Reflect, Serialize, Deserialize)]
pub struct FinishedTaskRecord {
    pub group_id: String,
    pub task_id: String,
}

/// Append-only record of every objective ever completed. Graph eligibility is
/// derived from this log alone.
#[derive(Resource, Reflect, Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[reflect(Resource)]
pub struct FinishedTaskLog {
    records: Vec<FinishedTaskRecord>,
}

impl FinishedTaskLog {
    pub fn contains(&self, group_id: &str, task_id: &str) -> bool {
        self.records
            .iter()
            .any(|r| r.group_id == group_id && r.task_id == task_id)
    }

    /// Appends the pair unless it is already recorded. Returns whether it was new.
    pub fn record(&mut self, group_id: &str, task_id: &str) -> bool {
        if self.contains(group_id, task_id) {
            return false;
        }
        self.records.push(FinishedTaskRecord {
            group_id: group_id.to_string(),
            task_id: task_id.to_string(),
        });
        true
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

// ============================================================================
// Completion continuations
// ============================================================================

/// Which collaborator a parked completion waits for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompletionGate {
    Removal,
    Selection,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingCompletion {
    pub group_id: String,
    pub task_id: String,
    pub gate: CompletionGate,
}

/// Completions waiting for a collaborator callback. Kept in memory only: after a
/// restart the objective is simply still active and can be tapped again.
#[derive(Resource, Debug, Default)]
pub struct PendingCompletions {
    entries: Vec<PendingCompletion>,
}

impl PendingCompletions {
    pub fn is_parked(&self, group_id: &str, task_id: &str) -> bool {
        self.entries
            .iter()
            .any(|p| p.group_id == group_id && p.task_id == task_id)
    }

    /// Parks a completion. Returns `false` if one is already parked for the pair.
    pub fn park(&mut self, group_id: &str, task_id: &str, gate: CompletionGate) -> bool {
        if self.is_parked(group_id, task_id) {
            return false;
        }
        self.entries.push(PendingCompletion {
            group_id: group_id.to_string(),
            task_id: task_id.to_string(),
            gate,
        });
        true
    }

    /// Takes the parked completion if it waits on `gate`. Each parked value can
    /// be taken once.
    pub fn take(&mut self, group_id: &str, task_id: &str, gate: CompletionGate) -> bool {
        let Some(index) = self
            .entries
            .iter()
            .position(|p| p.group_id == group_id && p.task_id == task_id && p.gate == gate)
        else {
            return false;
        };
        self.entries.remove(index);
        true
    }

    /// Drops everything parked for a group, used when the group is discarded.
    pub fn forget_group(&mut self, group_id: &str) {
        self.entries.retain(|p| p.group_id != group_id);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

// ============================================================================
// Bonus queue and boot flags
// ============================================================================

/// Non-currency rewards waiting to be placed on the board by the player.
#[derive(Resource, Reflect, Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[reflect(Resource)]
pub struct BonusQueue {
    pub entries: Vec<ItemAmount>,
}

impl BonusQueue {
    pub fn push(&mut self, reward: ItemAmount) {
        self.entries.push(reward);
    }

    /// Oldest bonus first.
    pub fn take_next(&mut self) -> Option<ItemAmount> {
        (!self.entries.is_empty()).then(|| self.entries.remove(0))
    }
}

#[derive(Resource, Reflect, Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[reflect(Resource)]
pub struct BootFlags {
    /// The starting area's first objective was handed out once already.
    pub default_objective_seeded: bool,
}

// ============================================================================
// Configuration
// ============================================================================

#[derive(Resource, Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct QuestConfig {
    /// Area whose first task is seeded on the very first boot.
    pub starting_area: String,
    /// Largest number the attention badge can show.
    pub max_displayed_indicator: u32,
    /// Directory the key/value store writes to.
    pub save_dir: String,
}

impl Default for QuestConfig {
    fn default() -> Self {
        Self {
            starting_area: "kitchen".to_string(),
            max_displayed_indicator: 9,
            save_dir: "saves".to_string(),
        }
    }
}
