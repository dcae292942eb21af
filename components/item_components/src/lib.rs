use {
    bevy::prelude::*,
    serde::{Deserialize, Serialize},
    std::fmt,
};

pub struct ItemComponentsPlugin;

impl Plugin for ItemComponentsPlugin {
    fn build(&self, app: &mut App) {
        app.register_type::<ItemIdentity>()
            .register_type::<ItemAmount>()
            .register_type::<Slot>()
            .register_type::<InventoryEntry>();
    }
}

/// Broad category of an item. Currency-like items go to the wallet when granted,
/// everything else has to be placed on the board.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Reflect, Serialize, Deserialize,
)]
pub enum ItemKind {
    Currency,
    #[default]
    Placeable,
    Generator,
}

/// The five fields that make two items "the same" item.
///
/// Needs, rewards, grid slots and inventory entries all carry one of these. Two
/// identities are equal only when every field matches; there is no partial or
/// wildcard matching.
#[derive(
    Debug, Clone, Default, PartialEq, Eq, Hash, Reflect, Serialize, Deserialize,
)]
pub struct ItemIdentity {
    /// Sprite / prefab key, e.g. "coin" or "teapot_3".
    pub visual_id: String,
    pub kind: ItemKind,
    /// Merge chain the item belongs to.
    pub group: u32,
    pub sub_group_a: u32,
    pub sub_group_b: u32,
}

impl ItemIdentity {
    pub fn new(visual_id: impl Into<String>, kind: ItemKind, group: u32) -> Self {
        Self {
            visual_id: visual_id.into(),
            kind,
            group,
            sub_group_a: 0,
            sub_group_b: 0,
        }
    }

    pub fn with_sub_groups(mut self, sub_group_a: u32, sub_group_b: u32) -> Self {
        self.sub_group_a = sub_group_a;
        self.sub_group_b = sub_group_b;
        self
    }

    pub fn is_currency(&self) -> bool {
        self.kind == ItemKind::Currency
    }
}

impl fmt::Display for ItemIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}({:?}:{}/{}/{})",
            self.visual_id, self.kind, self.group, self.sub_group_a, self.sub_group_b
        )
    }
}

/// An identity together with a count. Used for need definitions and rewards.
#[derive(Debug, Clone, PartialEq, Eq, Reflect, Serialize, Deserialize)]
pub struct ItemAmount {
    pub identity: ItemIdentity,
    pub amount: u32,
}

/// State of an item sitting on the board. Only `Default` items count towards needs.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Reflect, Serialize, Deserialize,
)]
pub enum LifecycleState {
    #[default]
    Default,
    /// Covered by fog / cobweb, not yet usable.
    Locked,
    /// Visible but still inside a box that has to be opened first.
    Boxed,
}

/// One cell of the board.
#[derive(Debug, Clone, Default, PartialEq, Reflect, Serialize, Deserialize)]
pub struct Slot {
    /// `None` for an empty cell.
    pub item: Option<ItemIdentity>,
    pub state: LifecycleState,
    /// Stable ordering key owned by the placement system. Never rewritten here.
    pub position_order: u32,
    /// Set by the matcher when the item counts towards an active objective.
    #[serde(default)]
    pub completed: bool,
}

impl Slot {
    pub fn empty(position_order: u32) -> Self {
        Self {
            position_order,
            ..default()
        }
    }

    pub fn is_empty(&self) -> bool {
        self.item.is_none()
    }

    /// Empties the cell in place. The position order stays untouched.
    pub fn clear(&mut self) {
        self.item = None;
        self.state = LifecycleState::Default;
        self.completed = false;
    }
}

#[derive(Debug, Clone, PartialEq, Reflect, Serialize, Deserialize)]
pub struct InventoryEntry {
    pub identity: ItemIdentity,
    #[serde(default)]
    pub completed: bool,
}

impl From<ItemIdentity> for InventoryEntry {
    fn from(identity: ItemIdentity) -> Self {
        Self {
            identity,
            completed: false,
        }
    }
}
