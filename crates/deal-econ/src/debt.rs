//! Weekly debt amortization.
//!
//! Each in-game week a quota `dayMultiple * nearestWeek(elapsedDays)^dayExponent`
//! falls due, less whatever the player already paid that week and capped at
//! the outstanding balance. The quota is taken from the wallet, then the rest
//! of the balance compounds: `remaining = floor(remaining * (1 + rate))`.
//! A wallet that cannot cover the quota is a default, which the host treats
//! as fatal to the player character.

use crate::Economy;
use deal_core::{DebtParams, DebtState};
use rust_decimal::prelude::FromPrimitive;
use rust_decimal::Decimal;
use thiserror::Error;
use tracing::{debug, warn};

/// Errors produced by the debt helpers.
#[derive(Debug, Error, PartialEq)]
pub enum DebtError {
    /// No outstanding balance.
    #[error("no outstanding debt")]
    NoDebt,
    /// Payments must be strictly positive.
    #[error("payment must be positive, got {0}")]
    NonPositiveAmount(Decimal),
    /// The wallet cannot cover a manual payment.
    #[error("insufficient funds: need {needed}, have {available}")]
    InsufficientFunds { needed: Decimal, available: Decimal },
    /// The quota formula produced a value Decimal cannot represent.
    #[error("non-finite quota")]
    NonFinite,
}

/// What the weekly tick did.
#[derive(Clone, Debug, PartialEq)]
pub enum WeeklyOutcome {
    /// Nothing left to pay; the dealer should stop ticking.
    Cleared,
    /// The quota was collected and interest applied.
    Settled(WeeklyStatement),
    /// The wallet could not cover the quota. Interest still compounds.
    Defaulted {
        due: Decimal,
        balance: Decimal,
        remaining: Decimal,
    },
}

/// Status line data after a successful weekly collection.
#[derive(Clone, Debug, PartialEq)]
pub struct WeeklyStatement {
    /// Collected by this tick.
    pub collected: Decimal,
    /// Total paid during the week, manual payments included.
    pub paid_this_week: Decimal,
    /// Balance after interest.
    pub remaining: Decimal,
    /// Quota of the coming week.
    pub next_quota: Decimal,
}

/// Result of a manual payment.
#[derive(Clone, Debug, PartialEq)]
pub struct Payment {
    /// Amount actually applied (capped at the balance).
    pub applied: Decimal,
    pub remaining: Decimal,
    pub cleared: bool,
}

/// Smallest multiple of 7 strictly greater than `elapsed_days`.
///
/// nearest_week(0) == 7, nearest_week(6) == 7, nearest_week(7) == 14.
pub fn nearest_week(elapsed_days: u32) -> u32 {
    (elapsed_days / 7 + 1).saturating_mul(7)
}

/// Gross weekly quota before manual payments and the balance cap.
pub fn gross_quota(params: &DebtParams, elapsed_days: u32) -> Result<Decimal, DebtError> {
    let week = f64::from(nearest_week(elapsed_days));
    let factor = week.powf(params.day_exponent);
    if !factor.is_finite() {
        return Err(DebtError::NonFinite);
    }
    let factor = Decimal::from_f64(factor).ok_or(DebtError::NonFinite)?;
    params
        .day_multiple
        .checked_mul(factor)
        .map(|q| q.round_dp(2))
        .ok_or(DebtError::NonFinite)
}

/// Amount collected by the weekly tick: `max(0, quota - paidThisWeek)`,
/// capped at the remaining balance.
pub fn weekly_due(
    params: &DebtParams,
    debt: &DebtState,
    elapsed_days: u32,
) -> Result<Decimal, DebtError> {
    let quota = gross_quota(params, elapsed_days)?;
    let due = (quota - debt.paid_this_week).max(Decimal::ZERO);
    Ok(due.min(debt.remaining.max(Decimal::ZERO)))
}

/// `floor(remaining * (1 + rate))`.
pub fn apply_interest(remaining: Decimal, rate: Decimal) -> Decimal {
    if remaining <= Decimal::ZERO {
        return Decimal::ZERO;
    }
    remaining
        .checked_mul(Decimal::ONE + rate)
        .unwrap_or(Decimal::MAX)
        .floor()
}

/// Whether manual payments already cover this week's quota. Purely informational.
pub fn quota_met(
    params: &DebtParams,
    debt: &DebtState,
    elapsed_days: u32,
) -> Result<bool, DebtError> {
    let quota = gross_quota(params, elapsed_days)?.min(debt.remaining + debt.paid_this_week);
    Ok(debt.paid_this_week >= quota)
}

/// Player-initiated payment of `amount`, applied immediately.
pub fn pay<E: Economy + ?Sized>(
    debt: &mut DebtState,
    economy: &mut E,
    amount: Decimal,
) -> Result<Payment, DebtError> {
    if amount <= Decimal::ZERO {
        return Err(DebtError::NonPositiveAmount(amount));
    }
    if debt.remaining <= Decimal::ZERO {
        return Err(DebtError::NoDebt);
    }
    let applied = amount.min(debt.remaining);
    let available = economy.balance();
    if available < applied {
        return Err(DebtError::InsufficientFunds {
            needed: applied,
            available,
        });
    }
    economy.change_balance(-applied);
    debt.remaining = if applied >= debt.remaining {
        Decimal::ZERO
    } else {
        debt.remaining - applied
    };
    debt.paid_this_week += applied;
    debug!(%applied, remaining = %debt.remaining, "manual debt payment");
    Ok(Payment {
        applied,
        remaining: debt.remaining,
        cleared: debt.remaining.is_zero(),
    })
}

/// Run the weekly collection for one dealer.
pub fn weekly_tick<E: Economy + ?Sized>(
    params: &DebtParams,
    debt: &mut DebtState,
    economy: &mut E,
    elapsed_days: u32,
) -> Result<WeeklyOutcome, DebtError> {
    if debt.remaining <= Decimal::ZERO {
        debt.remaining = Decimal::ZERO;
        debt.paid_this_week = Decimal::ZERO;
        return Ok(WeeklyOutcome::Cleared);
    }
    let due = weekly_due(params, debt, elapsed_days)?;
    let balance = economy.balance();
    if balance < due {
        debt.remaining = apply_interest(debt.remaining, params.interest_rate);
        debt.paid_this_week = Decimal::ZERO;
        warn!(%due, %balance, remaining = %debt.remaining, "weekly debt quota defaulted");
        return Ok(WeeklyOutcome::Defaulted {
            due,
            balance,
            remaining: debt.remaining,
        });
    }
    economy.change_balance(-due);
    let after_payment = (debt.remaining - due).max(Decimal::ZERO);
    debt.remaining = apply_interest(after_payment, params.interest_rate);
    let paid_this_week = debt.paid_this_week + due;
    debt.paid_this_week = Decimal::ZERO;
    let next_quota = gross_quota(params, elapsed_days.saturating_add(7))?.min(debt.remaining);
    debug!(%due, remaining = %debt.remaining, %next_quota, "weekly debt collected");
    Ok(WeeklyOutcome::Settled(WeeklyStatement {
        collected: due,
        paid_this_week,
        remaining: debt.remaining,
        next_quota,
    }))
}
