//! Mutable per-save progress of a dealer.

use crate::catalog::{DebtParams, Dealer, ShippingTier};
use crate::unlock::{compute_unlocked, UnlockedSnapshot};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Reputation never drops below this value.
pub const MIN_REPUTATION: i32 = 1;

/// Lifecycle of a dealer's debt.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DebtPhase {
    /// The dealer never carried debt.
    NoDebt,
    /// Balance outstanding; subscribed to the weekly tick.
    Active,
    /// Balance paid off.
    Cleared,
}

/// Outstanding balance of a dealer's debt.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct DebtState {
    /// Original principal; zero means no debt was ever configured.
    #[serde(with = "rust_decimal::serde::str")]
    pub principal: Decimal,
    #[serde(with = "rust_decimal::serde::str")]
    pub remaining: Decimal,
    #[serde(with = "rust_decimal::serde::str")]
    pub paid_this_week: Decimal,
}

impl DebtState {
    pub fn from_params(params: Option<&DebtParams>) -> Self {
        let total = params.map(|p| p.total_debt).unwrap_or(Decimal::ZERO);
        Self {
            principal: total,
            remaining: total,
            paid_this_week: Decimal::ZERO,
        }
    }

    pub fn phase(&self) -> DebtPhase {
        if self.principal <= Decimal::ZERO {
            DebtPhase::NoDebt
        } else if self.remaining > Decimal::ZERO {
            DebtPhase::Active
        } else {
            DebtPhase::Cleared
        }
    }
}

/// Per-dealer progress, persisted by the save layer.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DealerState {
    /// Always >= [`MIN_REPUTATION`].
    pub reputation: i32,
    /// Index into the dealer's shipping tiers.
    pub shipping_tier: usize,
    pub deals_completed: u32,
    pub debt: DebtState,
    pub initialized: bool,
    /// Revealed to the player (unlock requirements met at some point).
    pub unlocked: bool,
    pub intro_done: bool,
    /// Day on which the reward was last claimed.
    pub last_reward_day: Option<u32>,
    /// Recomputed from the catalog, never persisted.
    #[serde(skip)]
    pub snapshot: UnlockedSnapshot,
}

impl DealerState {
    /// Fresh state for a dealer at the start of a save.
    pub fn new(dealer: &Dealer) -> Self {
        Self {
            reputation: MIN_REPUTATION,
            shipping_tier: 0,
            deals_completed: 0,
            debt: DebtState::from_params(dealer.debt.as_ref()),
            initialized: true,
            unlocked: dealer.unlock_requirements.is_empty(),
            intro_done: false,
            last_reward_day: None,
            snapshot: compute_unlocked(dealer, MIN_REPUTATION),
        }
    }

    /// Re-attach a loaded state to its catalog entry: clamp indices and
    /// recompute the unlocked snapshot.
    pub fn reinitialize(&mut self, dealer: &Dealer) {
        self.reputation = self.reputation.max(MIN_REPUTATION);
        self.shipping_tier = clamp_tier(self.shipping_tier, dealer.shippings.len());
        self.initialized = true;
        if dealer.unlock_requirements.is_empty() {
            self.unlocked = true;
        }
        self.refresh_unlocks(dealer);
    }

    /// Rebuild the unlocked snapshot from scratch.
    pub fn refresh_unlocks(&mut self, dealer: &Dealer) {
        self.snapshot = compute_unlocked(dealer, self.reputation);
    }

    /// Apply a reputation delta, clamped at [`MIN_REPUTATION`]. Returns the new value.
    pub fn change_reputation(&mut self, dealer: &Dealer, delta: i32) -> i32 {
        self.reputation = self.reputation.saturating_add(delta).max(MIN_REPUTATION);
        self.refresh_unlocks(dealer);
        self.reputation
    }

    /// Set the shipping tier, clamped to the dealer's tier list.
    pub fn set_shipping_tier(&mut self, dealer: &Dealer, tier: usize) {
        self.shipping_tier = clamp_tier(tier, dealer.shippings.len());
    }

    pub fn current_shipping<'a>(&self, dealer: &'a Dealer) -> Option<&'a ShippingTier> {
        dealer.shippings.get(self.shipping_tier)
    }

    pub fn reward_claimed_on(&self, day: u32) -> bool {
        self.last_reward_day == Some(day)
    }
}

fn clamp_tier(tier: usize, count: usize) -> usize {
    tier.min(count.saturating_sub(1))
}
