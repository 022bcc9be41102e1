//! Dealer messages shown to the player.
//!
//! Each dealer may ship dialogue lines per [`MessageKind`]; one line is picked
//! at random and `{placeholder}` tokens are filled from [`MessageParams`].
//! Kinds without catalog lines fall back to a built-in template. Unknown
//! placeholders are left untouched.

use deal_core::Dealer;
use deal_quest::QuestDescriptor;
use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt::Display;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MessageKind {
    Accept,
    Success,
    Fail,
    Expire,
    Reward,
    Unlock,
    Debt,
    DebtCleared,
    DebtDefault,
    Gift,
    Refresh,
    Shipping,
    Declined,
}

impl MessageKind {
    /// Key of the kind in a dealer's `dialogue` table.
    pub fn as_str(&self) -> &'static str {
        match self {
            MessageKind::Accept => "accept",
            MessageKind::Success => "success",
            MessageKind::Fail => "fail",
            MessageKind::Expire => "expire",
            MessageKind::Reward => "reward",
            MessageKind::Unlock => "unlock",
            MessageKind::Debt => "debt",
            MessageKind::DebtCleared => "debt_cleared",
            MessageKind::DebtDefault => "debt_default",
            MessageKind::Gift => "gift",
            MessageKind::Refresh => "refresh",
            MessageKind::Shipping => "shipping",
            MessageKind::Declined => "declined",
        }
    }

    fn fallback(&self) -> &'static str {
        match self {
            MessageKind::Accept => {
                "Bring me {amount}x {quality} {product}. Must have: {effects}. Nice to have: {optionalEffects}."
            }
            MessageKind::Success => "Pleasure doing business. ${paid} is yours.",
            MessageKind::Fail => "You never showed with the {product}. That costs you.",
            MessageKind::Expire => "Too slow. The {product} deal is off.",
            MessageKind::Reward => "Consider it done.",
            MessageKind::Unlock => "Heard about you. {dealer} is open for business.",
            MessageKind::Debt => {
                "Paid ${paid} this week. You still owe ${remaining}. Next week: ${quota}."
            }
            MessageKind::DebtCleared => "We're square.",
            MessageKind::DebtDefault => "You were ${quota} short. You know what happens now.",
            MessageKind::Gift => "Appreciate it.",
            MessageKind::Refresh => "Fine, here's something else.",
            MessageKind::Shipping => "Upgraded to {tier}.",
            MessageKind::Declined => "Come back when you have ${quota}.",
        }
    }
}

/// A rendered message from a dealer.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Notice {
    pub dealer: String,
    pub kind: MessageKind,
    pub text: String,
}

/// Placeholder values for one message.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct MessageParams {
    values: Vec<(&'static str, String)>,
}

impl MessageParams {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set `{key}`; a later value for the same key wins.
    pub fn with(mut self, key: &'static str, value: impl Display) -> Self {
        self.values.retain(|(k, _)| *k != key);
        self.values.push((key, value.to_string()));
        self
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.values
            .iter()
            .find(|(k, _)| *k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Quest placeholders: product, quality, amount and both effect lists.
    pub fn for_quest(quest: &QuestDescriptor) -> Self {
        Self::new()
            .with("dealer", &quest.dealer)
            .with("product", &quest.product)
            .with("quality", &quest.quality)
            .with("amount", quest.amount)
            .with("effects", join_or_none(&quest.necessary_names()))
            .with("optionalEffects", join_or_none(&quest.optional_names()))
    }
}

fn join_or_none(names: &[String]) -> String {
    if names.is_empty() {
        "none".to_string()
    } else {
        names.join(", ")
    }
}

/// Substitute every known `{key}` in `template`.
pub fn render(template: &str, params: &MessageParams) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;
    while let Some(open) = rest.find('{') {
        out.push_str(&rest[..open]);
        let tail = &rest[open..];
        match tail.find('}') {
            Some(close) => {
                let key = &tail[1..close];
                match params.get(key) {
                    Some(v) => out.push_str(v),
                    None => out.push_str(&tail[..=close]),
                }
                rest = &tail[close + 1..];
            }
            None => {
                out.push_str(tail);
                rest = "";
            }
        }
    }
    out.push_str(rest);
    out
}

/// Pick a line for `kind` from the dealer's dialogue and render it.
pub fn compose<R: Rng + ?Sized>(
    dealer: &Dealer,
    kind: MessageKind,
    params: MessageParams,
    rng: &mut R,
) -> Notice {
    let params = params.with("dealer", &dealer.name);
    let template = dealer
        .dialogue
        .get(kind.as_str())
        .and_then(|lines| lines.choose(rng))
        .map(String::as_str)
        .unwrap_or_else(|| kind.fallback());
    Notice {
        dealer: dealer.name.clone(),
        kind,
        text: render(template, &params),
    }
}
