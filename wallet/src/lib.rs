use {
    bevy::prelude::*,
    serde::{Deserialize, Serialize},
    std::collections::HashMap,
};

/// Currency balances keyed by the currency's visual id ("coin", "gem", ...).
#[derive(Resource, Reflect, Default, Debug, Clone, PartialEq, Serialize, Deserialize)]
#[reflect(Resource, Default)]
pub struct Wallet {
    pub resources: HashMap<String, u32>,
}

impl Wallet {
    pub fn credit(&mut self, currency: &str, amount: u32) -> u32 {
        let balance = self.resources.entry(currency.to_string()).or_insert(0);
        *balance = balance.saturating_add(amount);
        debug!(%currency, amount, balance = *balance, "wallet credited");
        *balance
    }

    pub fn balance(&self, currency: &str) -> u32 {
        self.resources.get(currency).copied().unwrap_or(0)
    }
}

pub struct WalletPlugin;

impl Plugin for WalletPlugin {
    fn build(&self, app: &mut App) {
        app.register_type::<Wallet>().init_resource::<Wallet>();
    }
}
