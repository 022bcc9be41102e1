#![deny(warnings)]

//! Economic models for the dealer network.
//!
//! This crate provides:
//! - the [`Economy`] seam through which cash moves in and out of the player's wallet
//! - display-friendly reward rounding
//! - the weekly debt amortization schedule (see [`debt`])

pub mod debt;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors produced by economic helpers.
#[derive(Debug, Error, PartialEq)]
pub enum EconError {
    /// The wallet cannot cover a cost.
    #[error("insufficient funds: need {needed}, have {available}")]
    InsufficientFunds { needed: Decimal, available: Decimal },
    /// Costs must be non-negative.
    #[error("negative cost {0}")]
    NegativeCost(Decimal),
}

/// Player cash as seen by the simulation.
///
/// Calls are synchronous and the service is assumed always available.
pub trait Economy {
    fn balance(&self) -> Decimal;
    fn change_balance(&mut self, delta: Decimal);
}

/// Plain in-memory wallet.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Wallet {
    pub cash: Decimal,
}

impl Wallet {
    pub fn new(cash: Decimal) -> Self {
        Self { cash }
    }
}

impl Economy for Wallet {
    fn balance(&self) -> Decimal {
        self.cash
    }

    fn change_balance(&mut self, delta: Decimal) {
        self.cash += delta;
    }
}

/// Deduct `cost` if the wallet can cover it.
///
/// Example:
/// let mut w = Wallet::new(Decimal::new(100, 0));
/// charge(&mut w, Decimal::new(40, 0)).unwrap();
/// assert_eq!(w.cash, Decimal::new(60, 0));
pub fn charge<E: Economy + ?Sized>(economy: &mut E, cost: Decimal) -> Result<(), EconError> {
    if cost < Decimal::ZERO {
        return Err(EconError::NegativeCost(cost));
    }
    let available = economy.balance();
    if available < cost {
        return Err(EconError::InsufficientFunds {
            needed: cost,
            available,
        });
    }
    economy.change_balance(-cost);
    Ok(())
}

/// Round a positive value up so that only the leading half of its digits
/// (rounded up) are significant: 1234 -> 1300, 98765 -> 98800, 7 -> 7.
///
/// Non-positive values are returned unchanged. The function is idempotent.
pub fn round_to_half_msd(value: i64) -> i64 {
    if value <= 0 {
        return value;
    }
    let digits = value.ilog10() + 1;
    let keep = digits.div_ceil(2);
    let unit = 10i128.pow(digits - keep);
    let v = i128::from(value);
    let rounded = (v + unit - 1) / unit * unit;
    i64::try_from(rounded).unwrap_or(i64::MAX)
}

/// Round a float reward to the nearest integer, then to half-MSD.
pub fn round_reward(value: f32) -> i64 {
    // `as` saturates and maps NaN to 0.
    round_to_half_msd(value.round() as i64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn rounds_to_half_msd() {
        assert_eq!(round_to_half_msd(1234), 1300);
        assert_eq!(round_to_half_msd(1300), 1300);
        assert_eq!(round_to_half_msd(1201), 1300);
        assert_eq!(round_to_half_msd(98765), 98800);
        assert_eq!(round_to_half_msd(123), 130);
        assert_eq!(round_to_half_msd(7), 7);
        assert_eq!(round_to_half_msd(9999), 10000);
        assert_eq!(round_to_half_msd(0), 0);
        assert_eq!(round_to_half_msd(-42), -42);
        assert_eq!(round_to_half_msd(i64::MAX), i64::MAX);
    }

    #[test]
    fn round_reward_handles_floats() {
        assert_eq!(round_reward(1233.6), 1300);
        assert_eq!(round_reward(f32::NAN), 0);
        assert_eq!(round_reward(4.4), 4);
    }

    #[test]
    fn charge_checks_balance() {
        let mut w = Wallet::new(Decimal::new(100, 0));
        charge(&mut w, Decimal::new(40, 0)).unwrap();
        assert_eq!(w.cash, Decimal::new(60, 0));
        let err = charge(&mut w, Decimal::new(61, 0)).unwrap_err();
        assert_eq!(
            err,
            EconError::InsufficientFunds {
                needed: Decimal::new(61, 0),
                available: Decimal::new(60, 0)
            }
        );
        assert_eq!(w.cash, Decimal::new(60, 0));
        assert!(charge(&mut w, Decimal::new(-1, 0)).is_err());
    }

    proptest! {
        #[test]
        fn half_msd_is_idempotent(v in 0i64..10_000_000_000) {
            let once = round_to_half_msd(v);
            prop_assert_eq!(round_to_half_msd(once), once);
            prop_assert!(once >= v);
        }
    }
}
