use {
    crate::{QuestContext, QuestSignal, walker::next_is_conversation},
    bevy::prelude::*,
    item_components::ItemAmount,
    quest_events::{RewardDelivery, RewardGranted},
    quest_resources::PersistKey,
};

/// How a reward reaches the player.
///
/// Currency goes straight into the wallet, silently when a conversation is about
/// to start. Everything else becomes a bonus waiting for placement.
pub fn delivery_for(reward: &ItemAmount, next_is_conversation: bool) -> RewardDelivery {
    match (reward.identity.is_currency(), next_is_conversation) {
        (true, true) => RewardDelivery::Silent,
        (true, false) => RewardDelivery::Shown,
        (false, _) => RewardDelivery::Deferred,
    }
}

impl QuestContext<'_> {
    /// Hands out the rewards of a just-completed objective.
    pub fn dispatch_rewards(&mut self, rewards: &[ItemAmount], group_id: &str, task_id: &str) {
        if rewards.is_empty() {
            return;
        }
        let conversation = next_is_conversation(self.catalog, self.finished, group_id, task_id);

        for reward in rewards {
            let delivery = delivery_for(reward, conversation);
            match delivery {
                RewardDelivery::Silent | RewardDelivery::Shown => {
                    self.wallet.credit(&reward.identity.visual_id, reward.amount);
                    self.dirty.mark(PersistKey::WalletBalance);
                }
                RewardDelivery::Deferred => {
                    self.bonuses.push(reward.clone());
                    self.dirty.mark(PersistKey::BonusQueue);
                }
            }
            debug!(%group_id, %task_id, reward = %reward.identity, amount = reward.amount, ?delivery, "reward granted");

            self.signal(QuestSignal::RewardGranted(RewardGranted {
                group_id: group_id.to_string(),
                task_id: task_id.to_string(),
                reward: reward.clone(),
                delivery,
            }));
        }
    }
}
