use {
    crate::ObjectiveGroups,
    bevy::{platform::collections::HashMap, prelude::*},
};

/// Amounts currently shown on the attention badge, per objective group.
#[derive(Resource, Debug, Default)]
pub struct NoteIndicator {
    displayed: HashMap<String, u32>,
    total: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IndicatorUpdate {
    /// Ready objectives across all groups.
    pub count: u32,
    pub overflowed: bool,
    /// The total differs from what was displayed before this check.
    pub changed: bool,
}

impl NoteIndicator {
    /// Recounts ready objectives. A group's displayed amount is only rewritten
    /// when it differs from the fresh amount, so a group is never counted twice.
    pub fn check(&mut self, groups: &ObjectiveGroups, max_displayed: u32) -> IndicatorUpdate {
        for group in &groups.groups {
            let fresh = group.ready_count();
            if self.displayed.get(&group.id) == Some(&fresh) {
                continue;
            }
            trace!(group_id = %group.id, fresh, "indicator amount updated");
            self.displayed.insert(group.id.clone(), fresh);
        }
        self.displayed.retain(|id, _| groups.get(id).is_some());

        let count = self.displayed.values().sum();
        let changed = count != self.total;
        self.total = count;

        IndicatorUpdate {
            count,
            overflowed: count > max_displayed,
            changed,
        }
    }

    pub fn displayed_for(&self, group_id: &str) -> u32 {
        self.displayed.get(group_id).copied().unwrap_or(0)
    }
}
