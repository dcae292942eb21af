use {
    crate::{QuestContext, QuestSignal},
    container_resources::{Grid, Inventory},
    item_components::{ItemAmount, ItemIdentity, ItemKind, LifecycleState},
    quest_assets::{AreaDefinition, StepDefinition, StepKind, TargetKind, TargetRef, TaskTemplate},
    quest_resources::*,
    wallet::Wallet,
};

pub fn gold() -> ItemIdentity {
    ItemIdentity::new("gold", ItemKind::Placeable, 2)
}

pub fn cup() -> ItemIdentity {
    ItemIdentity::new("cup", ItemKind::Placeable, 1)
}

fn amount(identity: ItemIdentity, amount: u32) -> ItemAmount {
    ItemAmount { identity, amount }
}

fn coins(n: u32) -> ItemAmount {
    amount(ItemIdentity::new("coin", ItemKind::Currency, 0), n)
}

fn task(id: &str, template: TaskTemplate, next_ids: &[&str], required_ids: &[&str]) -> StepDefinition {
    StepDefinition {
        id: id.to_string(),
        kind: StepKind::Task(template),
        next_ids: next_ids.iter().map(|s| s.to_string()).collect(),
        required_ids: required_ids.iter().map(|s| s.to_string()).collect(),
    }
}

fn target(kind: TargetKind, name: &str) -> Option<TargetRef> {
    Some(TargetRef {
        kind,
        name: name.to_string(),
    })
}

pub fn catalog_with(areas: Vec<AreaDefinition>) -> AreaCatalog {
    let mut catalog = AreaCatalog::default();
    for area in areas {
        catalog.insert(area);
    }
    catalog
}

/// T1 (gold x3, no target) opens a conversation, which opens T2 (cup x1 on a
/// filth target). Last waits for both and leads to the garden.
pub fn kitchen() -> AreaDefinition {
    AreaDefinition {
        id: "kitchen".to_string(),
        steps: vec![
            task(
                "T1",
                TaskTemplate {
                    needs: vec![amount(gold(), 3)],
                    rewards: vec![
                        coins(50),
                        amount(ItemIdentity::new("teapot", ItemKind::Placeable, 4), 1),
                    ],
                    target: None,
                },
                &["intro_chat", "Last"],
                &[],
            ),
            StepDefinition {
                id: "intro_chat".to_string(),
                kind: StepKind::Conversation {
                    dialogue_id: "granny_hello".to_string(),
                },
                next_ids: vec!["T2".to_string()],
                required_ids: Vec::new(),
            },
            task(
                "T2",
                TaskTemplate {
                    needs: vec![amount(cup(), 1)],
                    rewards: vec![coins(20)],
                    target: target(TargetKind::Filth, "stain_01"),
                },
                &["Last"],
                &["T1"],
            ),
            task(
                "Last",
                TaskTemplate {
                    rewards: vec![amount(ItemIdentity::new("gem", ItemKind::Currency, 0), 5)],
                    ..Default::default()
                },
                &["garden"],
                &[],
            ),
        ],
    }
}

pub fn garden() -> AreaDefinition {
    AreaDefinition {
        id: "garden".to_string(),
        steps: vec![
            task(
                "G1",
                TaskTemplate {
                    needs: vec![amount(cup(), 2)],
                    rewards: vec![coins(10)],
                    target: target(TargetKind::Decoration, "bench"),
                },
                &["Last"],
                &[],
            ),
            task("Last", TaskTemplate::default(), &[], &[]),
        ],
    }
}

/// `start` fans out to A and B, C joins them and unlocks the attic. Last leads
/// to the attic area.
pub fn workshop() -> AreaDefinition {
    let free = || TaskTemplate::default();
    AreaDefinition {
        id: "workshop".to_string(),
        steps: vec![
            task("start", free(), &["A", "B"], &[]),
            task("A", free(), &["C"], &[]),
            task("B", free(), &["C"], &[]),
            task("C", free(), &["attic_door", "Last"], &["A", "B"]),
            StepDefinition {
                id: "attic_door".to_string(),
                kind: StepKind::RoomUnlock {
                    room_id: "attic".to_string(),
                },
                next_ids: Vec::new(),
                required_ids: Vec::new(),
            },
            task("Last", free(), &["attic"], &[]),
        ],
    }
}

/// Opens with a conversation, then two tasks in a row.
pub fn attic() -> AreaDefinition {
    let free = || TaskTemplate::default();
    AreaDefinition {
        id: "attic".to_string(),
        steps: vec![
            StepDefinition {
                id: "greeting".to_string(),
                kind: StepKind::Conversation {
                    dialogue_id: "attic_ghost".to_string(),
                },
                next_ids: vec!["dust".to_string()],
                required_ids: Vec::new(),
            },
            task("dust", free(), &["shelves"], &[]),
            task("shelves", free(), &["Last"], &[]),
            task("Last", free(), &[], &[]),
        ],
    }
}

/// Owned quest state, the same resources `QuestWorld` borrows from the ECS.
pub struct Fixture {
    pub catalog: AreaCatalog,
    pub config: QuestConfig,
    pub groups: ObjectiveGroups,
    pub finished: FinishedTaskLog,
    pub grid: Grid,
    pub inventory: Inventory,
    pub wallet: Wallet,
    pub bonuses: BonusQueue,
    pub pending: PendingCompletions,
    pub indicator: NoteIndicator,
    pub boot: BootFlags,
    pub dirty: DirtyKeys,
}

impl Fixture {
    pub fn new(areas: Vec<AreaDefinition>) -> Self {
        Self {
            catalog: catalog_with(areas),
            config: QuestConfig::default(),
            groups: ObjectiveGroups::default(),
            finished: FinishedTaskLog::default(),
            grid: Grid::default(),
            inventory: Inventory::default(),
            wallet: Wallet::default(),
            bonuses: BonusQueue::default(),
            pending: PendingCompletions::default(),
            indicator: NoteIndicator::default(),
            boot: BootFlags::default(),
            dirty: DirtyKeys::default(),
        }
    }

    pub fn ctx(&mut self) -> QuestContext<'_> {
        QuestContext {
            catalog: &self.catalog,
            config: &self.config,
            groups: &mut self.groups,
            finished: &mut self.finished,
            grid: &mut self.grid,
            inventory: &mut self.inventory,
            wallet: &mut self.wallet,
            bonuses: &mut self.bonuses,
            pending: &mut self.pending,
            indicator: &mut self.indicator,
            boot: &mut self.boot,
            dirty: &mut self.dirty,
            outbox: Vec::new(),
        }
    }

    /// Runs one operation and returns its result with the signals it raised.
    pub fn run<R>(&mut self, op: impl FnOnce(&mut QuestContext<'_>) -> R) -> (R, Vec<QuestSignal>) {
        let mut ctx = self.ctx();
        let result = op(&mut ctx);
        (result, ctx.finish())
    }

    /// Gold on the first `n` cells of the top row.
    pub fn place_gold(&mut self, n: u32) {
        for x in 0..n {
            self.grid.place(x, 0, gold(), LifecycleState::Default);
        }
    }

    /// T1 finished, one cup on the board and T2 active and ready.
    pub fn enqueue_ready_t2(&mut self) {
        self.finished.record("kitchen", "T1");
        self.grid.place(0, 1, cup(), LifecycleState::Default);
        let (outcome, _) = self.run(|ctx| ctx.try_enqueue("kitchen", "T2"));
        outcome.unwrap();
        assert!(self.groups.find_task("kitchen", "T2").unwrap().is_ready());
    }
}
