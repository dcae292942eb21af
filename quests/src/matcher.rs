//! Need satisfaction: how many of each required item the player currently holds.

use {
    crate::{QuestContext, QuestSignal},
    bevy::prelude::*,
    container_resources::{Grid, Inventory, ResourceStore},
    item_components::LifecycleState,
    quest_events::{HighlightsRefreshed, IndicatorCountChanged},
    quest_resources::{Need, ObjectiveGroups},
};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MatchReport {
    /// At least one slot or inventory entry is flagged after the pass.
    pub any_completed: bool,
    /// Active objectives whose needs are all covered.
    pub ready_tasks: u32,
}

/// Full matcher pass over both containers.
///
/// Flags are reset first, then every need of every active objective is matched
/// against the board (row-major, `Default` slots only) and then the inventory.
/// All matching board slots are flagged; inventory entries are only flagged for
/// what the board left unmet. Running it twice without container changes gives
/// the same result.
pub fn recompute(
    groups: &mut ObjectiveGroups,
    grid: &mut Grid,
    inventory: &mut Inventory,
) -> MatchReport {
    grid.clear_completed();
    inventory.clear_completed();

    let mut ready_tasks = 0;
    for task in groups.tasks_mut() {
        let mut satisfied = 0;
        for need in &mut task.needs {
            satisfy_need(need, grid, inventory);
            if need.is_satisfied() {
                satisfied += 1;
            }
        }
        task.satisfied_need_count = satisfied;
        if task.is_ready() {
            ready_tasks += 1;
        }
    }

    MatchReport {
        any_completed: grid.completed_count() + inventory.completed_count() > 0,
        ready_tasks,
    }
}

fn satisfy_need(need: &mut Need, grid: &mut Grid, inventory: &mut Inventory) {
    let on_board = grid.flag_matching(&need.identity, Some(LifecycleState::Default), None);
    let missing = need.amount.saturating_sub(on_board);
    let in_inventory = if missing > 0 {
        inventory.flag_matching(&need.identity, None, Some(missing))
    } else {
        0
    };
    need.satisfied_count = (on_board + in_inventory).min(need.amount);
}

impl QuestContext<'_> {
    /// Matcher pass over the context's containers. Raises `HighlightsRefreshed`.
    pub fn recompute(&mut self) -> MatchReport {
        let report = recompute(self.groups, self.grid, self.inventory);
        trace!(
            any_completed = report.any_completed,
            ready_tasks = report.ready_tasks,
            "matcher pass"
        );
        self.signal(QuestSignal::HighlightsRefreshed(HighlightsRefreshed {
            any_completed: report.any_completed,
        }));
        report
    }

    /// Number of objectives whose needs are all covered. Raises
    /// `IndicatorCountChanged` when the badge total moved.
    pub fn check_note_indicator(&mut self) -> u32 {
        let update = self
            .indicator
            .check(self.groups, self.config.max_displayed_indicator);
        if update.changed {
            debug!(count = update.count, overflowed = update.overflowed, "indicator changed");
            self.signal(QuestSignal::IndicatorCountChanged(IndicatorCountChanged {
                count: update.count,
                overflowed: update.overflowed,
            }));
        }
        update.count
    }

    /// Matcher pass followed by an indicator check. Runs after every container
    /// mutation, enqueue and completion.
    pub fn refresh(&mut self) -> MatchReport {
        let report = self.recompute();
        self.check_note_indicator();
        report
    }
}

#[cfg(test)]
mod tests {
    use {
        super::*,
        item_components::{ItemAmount, ItemIdentity, ItemKind},
        quest_assets::TaskTemplate,
        quest_resources::{ObjectiveGroup, Task},
    };

    fn gold() -> ItemIdentity {
        ItemIdentity::new("gold", ItemKind::Placeable, 2)
    }

    fn groups_needing(needs: &[(ItemIdentity, u32)]) -> ObjectiveGroups {
        let template = TaskTemplate {
            needs: needs
                .iter()
                .map(|(identity, amount)| ItemAmount {
                    identity: identity.clone(),
                    amount: *amount,
                })
                .collect(),
            ..default()
        };
        let mut group = ObjectiveGroup::new("kitchen", 1);
        group.tasks.push(Task::from_template("T1", &template));
        ObjectiveGroups {
            groups: vec![group],
        }
    }

    #[test]
    fn test_board_then_inventory_is_capped() {
        let mut groups = groups_needing(&[(gold(), 3)]);
        let mut grid = Grid::new(3, 3);
        grid.place(0, 0, gold(), LifecycleState::Default);
        grid.place(2, 2, gold(), LifecycleState::Default);
        let mut inventory = Inventory::default();
        for _ in 0..5 {
            inventory.push(gold());
        }

        let report = recompute(&mut groups, &mut grid, &mut inventory);

        let task = &groups.groups[0].tasks[0];
        assert_eq!(task.needs[0].satisfied_count, 3);
        assert_eq!(task.satisfied_need_count, 1);
        assert_eq!(grid.completed_count(), 2);
        assert_eq!(inventory.completed_count(), 1);
        assert!(inventory.entries[0].completed);
        assert!(report.any_completed);
        assert_eq!(report.ready_tasks, 1);
    }

    #[test]
    fn test_all_board_matches_flagged_past_amount() {
        let mut groups = groups_needing(&[(gold(), 2)]);
        let mut grid = Grid::new(4, 1);
        for x in 0..4 {
            grid.place(x, 0, gold(), LifecycleState::Default);
        }
        let mut inventory = Inventory::default();
        inventory.push(gold());

        recompute(&mut groups, &mut grid, &mut inventory);

        assert_eq!(groups.groups[0].tasks[0].needs[0].satisfied_count, 2);
        assert_eq!(grid.completed_count(), 4);
        assert_eq!(inventory.completed_count(), 0);
    }

    #[test]
    fn test_locked_and_boxed_slots_do_not_count() {
        let mut groups = groups_needing(&[(gold(), 2)]);
        let mut grid = Grid::new(3, 1);
        grid.place(0, 0, gold(), LifecycleState::Locked);
        grid.place(1, 0, gold(), LifecycleState::Boxed);
        grid.place(2, 0, gold(), LifecycleState::Default);
        let mut inventory = Inventory::default();

        let report = recompute(&mut groups, &mut grid, &mut inventory);

        let task = &groups.groups[0].tasks[0];
        assert_eq!(task.needs[0].satisfied_count, 1);
        assert_eq!(task.satisfied_need_count, 0);
        assert_eq!(report.ready_tasks, 0);
        assert!(grid.slots[2].completed);
        assert!(!grid.slots[0].completed);
    }

    #[test]
    fn test_stale_flags_are_cleared() {
        let mut groups = groups_needing(&[(gold(), 1)]);
        let mut grid = Grid::new(2, 1);
        grid.place(0, 0, gold(), LifecycleState::Default);
        let mut inventory = Inventory::default();

        recompute(&mut groups, &mut grid, &mut inventory);
        assert!(grid.slots[0].completed);

        grid.slots[0].clear();
        grid.place(1, 0, ItemIdentity::new("cup", ItemKind::Placeable, 1), LifecycleState::Default);
        grid.slots[1].completed = true;

        let report = recompute(&mut groups, &mut grid, &mut inventory);

        assert_eq!(grid.completed_count(), 0);
        assert!(!report.any_completed);
        assert_eq!(groups.groups[0].tasks[0].needs[0].satisfied_count, 0);
    }

    #[test]
    fn test_recompute_is_idempotent() {
        let cup = ItemIdentity::new("cup", ItemKind::Placeable, 1);
        let mut groups = groups_needing(&[(gold(), 2), (cup.clone(), 1)]);
        let mut grid = Grid::new(3, 1);
        grid.place(0, 0, gold(), LifecycleState::Default);
        grid.place(1, 0, cup, LifecycleState::Default);
        let mut inventory = Inventory::default();
        inventory.push(gold());

        let first = recompute(&mut groups, &mut grid, &mut inventory);
        let snapshot = (groups.clone(), grid.clone(), inventory.clone());
        let second = recompute(&mut groups, &mut grid, &mut inventory);

        assert_eq!(first, second);
        assert_eq!((groups, grid, inventory), snapshot);
    }

    #[test]
    fn test_identity_must_match_on_every_field() {
        let mut groups = groups_needing(&[(gold(), 1)]);
        let mut grid = Grid::new(2, 1);
        grid.place(0, 0, gold().with_sub_groups(0, 1), LifecycleState::Default);
        let mut inventory = Inventory::default();
        inventory.push(ItemIdentity::new("gold", ItemKind::Currency, 2));

        recompute(&mut groups, &mut grid, &mut inventory);

        assert_eq!(groups.groups[0].tasks[0].needs[0].satisfied_count, 0);
    }
}
