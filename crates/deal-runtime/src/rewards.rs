//! Once-per-day dealer favors.
//!
//! Claiming checks eligibility, spends the reputation cost right away and
//! yields a [`RewardTicket`]; the effect itself lands after a delay through
//! the roster's timer queue.

use deal_core::{Dealer, DealerState, RewardDescriptor, RewardKind};
use std::time::Duration;
use thiserror::Error;

/// Delay between claiming a reward and its effect.
pub const DEFAULT_REWARD_DELAY: Duration = Duration::from_secs(10);

#[derive(Debug, Error, PartialEq)]
pub enum RewardError {
    #[error("{0} offers no reward")]
    NoReward(String),
    #[error("{0} already granted a reward today")]
    AlreadyClaimed(String),
    #[error("reputation {have} is below the required {need}")]
    InsufficientReputation { have: i32, need: i32 },
    #[error("reward of {0} has an empty effect")]
    EmptyEffect(String),
}

/// A claimed reward waiting for its delay.
#[derive(Clone, Debug, PartialEq)]
pub struct RewardTicket {
    pub dealer: String,
    pub effect: RewardKind,
    /// Reputation deducted on claim.
    pub rep_cost: i32,
    /// Scheduler time at which the effect fires.
    pub fires_at: Duration,
}

/// Reputation needed to claim: the unlock threshold, and never less than the cost.
pub fn required_reputation(reward: &RewardDescriptor) -> i32 {
    reward.unlock_rep.max(reward.rep_cost)
}

/// Check whether the dealer's reward may be claimed on `today`.
pub fn check_claim<'a>(
    dealer: &'a Dealer,
    state: &DealerState,
    today: u32,
) -> Result<&'a RewardDescriptor, RewardError> {
    let reward = dealer
        .reward
        .as_ref()
        .ok_or_else(|| RewardError::NoReward(dealer.name.clone()))?;
    if state.reward_claimed_on(today) {
        return Err(RewardError::AlreadyClaimed(dealer.name.clone()));
    }
    let need = required_reputation(reward);
    if state.reputation < need {
        return Err(RewardError::InsufficientReputation {
            have: state.reputation,
            need,
        });
    }
    let empty = match &reward.effect {
        RewardKind::Console { command } => command.trim().is_empty(),
        RewardKind::Item { item, quantity } => item.trim().is_empty() || *quantity == 0,
        RewardKind::Cash { .. } | RewardKind::Xp { .. } => false,
    };
    if empty {
        return Err(RewardError::EmptyEffect(dealer.name.clone()));
    }
    Ok(reward)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;

    fn dealer(effect: RewardKind) -> Dealer {
        Dealer {
            name: "Brad".into(),
            reward: Some(RewardDescriptor {
                unlock_rep: 20,
                rep_cost: 5,
                effect,
            }),
            ..Dealer::default()
        }
    }

    #[test]
    fn claim_rules() {
        let d = dealer(RewardKind::Cash {
            amount: Decimal::new(500, 0),
        });
        let mut st = DealerState::new(&d);
        assert_eq!(
            check_claim(&d, &st, 3),
            Err(RewardError::InsufficientReputation { have: 1, need: 20 })
        );
        st.reputation = 20;
        assert!(check_claim(&d, &st, 3).is_ok());
        st.last_reward_day = Some(3);
        assert_eq!(
            check_claim(&d, &st, 3),
            Err(RewardError::AlreadyClaimed("Brad".into()))
        );
        assert!(check_claim(&d, &st, 4).is_ok());
    }

    #[test]
    fn empty_effects_are_rejected() {
        let d = dealer(RewardKind::Console {
            command: "  ".into(),
        });
        let mut st = DealerState::new(&d);
        st.reputation = 50;
        assert_eq!(
            check_claim(&d, &st, 0),
            Err(RewardError::EmptyEffect("Brad".into()))
        );
        let none = Dealer::default();
        assert!(matches!(
            check_claim(&none, &DealerState::new(&none), 0),
            Err(RewardError::NoReward(_))
        ));
    }

    #[test]
    fn cost_above_unlock_raises_the_bar() {
        let r = RewardDescriptor {
            unlock_rep: 5,
            rep_cost: 30,
            effect: RewardKind::Xp { amount: 100 },
        };
        assert_eq!(required_reputation(&r), 30);
    }
}
