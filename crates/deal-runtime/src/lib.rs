#![deny(warnings)]

//! Day-by-day runtime of the dealer network.
//!
//! A [`Roster`] owns the catalog, every dealer's progress, the calendar,
//! today's quest offers, the active quest, delayed effects and the outbox of
//! dealer messages. Hosts drive it with [`Roster::advance_day`] at the day
//! boundary and [`Roster::advance_realtime`] from their frame loop.

pub mod clock;
pub mod messaging;
pub mod rewards;
mod roster;
pub mod scheduler;

pub use clock::{weekday_of, Clock};
pub use messaging::{MessageKind, MessageParams, Notice};
pub use rewards::{RewardError, RewardTicket, DEFAULT_REWARD_DELAY};
pub use roster::*;

use deal_core::ValidationError;
use deal_econ::debt::DebtError;
use deal_econ::EconError;
use deal_quest::{DeliveryError, QuestError};
use thiserror::Error;

/// Errors surfaced by roster operations. All of them leave the roster unchanged.
#[derive(Debug, Error, PartialEq)]
pub enum RuntimeError {
    #[error("roster is not initialized")]
    NotReady,
    #[error("unknown dealer {0}")]
    UnknownDealer(String),
    #[error("{0} is still locked")]
    DealerLocked(String),
    #[error("no offer with index {0}")]
    UnknownOffer(u32),
    #[error("another quest is already active")]
    QuestInProgress,
    #[error("no active quest")]
    NoActiveQuest,
    #[error("{0} accepts no gifts")]
    NoGift(String),
    #[error("{0} is already at the top shipping tier")]
    MaxShippingTier(String),
    #[error("reputation {have} is below the required {need}")]
    InsufficientReputation { have: i32, need: i32 },
    #[error(transparent)]
    Econ(#[from] EconError),
    #[error(transparent)]
    Debt(#[from] DebtError),
    #[error(transparent)]
    Quest(#[from] QuestError),
    #[error(transparent)]
    Delivery(#[from] DeliveryError),
    #[error(transparent)]
    Reward(#[from] RewardError),
    #[error(transparent)]
    Invalid(#[from] ValidationError),
}
