use {
    bevy::prelude::*,
    bevy_common_assets::ron::RonAssetPlugin,
    item_components::ItemAmount,
    serde::{Deserialize, Serialize},
};

/// Step id that closes an area. Eligible only once every other task of the area
/// is finished; its `next_ids` name the areas that open afterwards.
pub const TERMINAL_STEP_ID: &str = "Last";

pub struct QuestAssetsPlugin;

impl Plugin for QuestAssetsPlugin {
    fn build(&self, app: &mut App) {
        app.add_plugins(RonAssetPlugin::<AreaDefinition>::new(&["area.ron"]));
    }
}

/// A progression unit (a room of the house) and its ordered steps.
#[derive(Asset, TypePath, Debug, Clone, Deserialize)]
pub struct AreaDefinition {
    /// Unique key, also used as the objective group id (e.g. "kitchen").
    pub id: String,
    pub steps: Vec<StepDefinition>,
}

impl AreaDefinition {
    pub fn step(&self, step_id: &str) -> Option<&StepDefinition> {
        self.steps.iter().find(|s| s.id == step_id)
    }

    pub fn task_steps(&self) -> impl Iterator<Item = &StepDefinition> {
        self.steps.iter().filter(|s| s.is_task())
    }

    /// Task steps that count towards area progress, i.e. all of them except the
    /// terminal one. This is the only place the group's total is derived from.
    pub fn countable_task_count(&self) -> u32 {
        self.task_steps().filter(|s| !s.is_terminal()).count() as u32
    }

    pub fn first_task_step(&self) -> Option<&StepDefinition> {
        self.task_steps().next()
    }

    pub fn terminal_step(&self) -> Option<&StepDefinition> {
        self.step(TERMINAL_STEP_ID)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct StepDefinition {
    pub id: String,
    pub kind: StepKind,
    /// Successor step ids. On the terminal step these are area ids instead.
    #[serde(default)]
    pub next_ids: Vec<String>,
    /// Task ids of this area that must all be finished before the step opens.
    #[serde(default)]
    pub required_ids: Vec<String>,
}

impl StepDefinition {
    pub fn is_task(&self) -> bool {
        matches!(self.kind, StepKind::Task(_))
    }

    pub fn is_conversation(&self) -> bool {
        matches!(self.kind, StepKind::Conversation { .. })
    }

    pub fn is_terminal(&self) -> bool {
        self.id == TERMINAL_STEP_ID
    }

    pub fn task(&self) -> Option<&TaskTemplate> {
        match &self.kind {
            StepKind::Task(template) => Some(template),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub enum StepKind {
    /// A player-facing objective.
    Task(TaskTemplate),
    /// Handed to the dialogue player.
    Conversation { dialogue_id: String },
    /// Handed to whatever opens new rooms.
    RoomUnlock { room_id: String },
}

/// What an objective asks for and what it pays out.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TaskTemplate {
    #[serde(default)]
    pub needs: Vec<ItemAmount>,
    #[serde(default)]
    pub rewards: Vec<ItemAmount>,
    /// Scene object the objective acts on. Without one the objective completes
    /// on the same turn it is tapped.
    #[serde(default)]
    pub target: Option<TargetRef>,
}

#[derive(Debug, Clone, PartialEq, Eq, Reflect, Serialize, Deserialize)]
pub struct TargetRef {
    pub kind: TargetKind,
    pub name: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Reflect, Serialize, Deserialize)]
pub enum TargetKind {
    /// Dirt to be cleaned; completion waits for the removal effect.
    Filth,
    /// Furniture to be placed or restored; completion waits for the player to
    /// confirm a selection.
    Decoration,
}
