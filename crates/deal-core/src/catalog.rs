//! Catalog data model: dealers, products and the global bonus tables.
//!
//! Everything here is immutable once loaded. Mutable per-save progress lives
//! in [`crate::DealerState`].

use chrono::Weekday;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use thiserror::Error;

/// Effect name that is resolved at quest time to a random global effect.
pub const RANDOM_EFFECT: &str = "Random";

/// Validation errors for catalog invariants.
#[derive(Debug, Error, PartialEq)]
pub enum ValidationError {
    /// A parallel name/value bonus table has mismatched lengths.
    #[error("bonus table {table} has {names} names but {values} values")]
    MismatchedBonusTable {
        table: &'static str,
        names: usize,
        values: usize,
    },
    /// `randomNumberRanges` must hold 0 or 8 values.
    #[error("randomNumberRanges must hold 8 values, found {0}")]
    RandomRangeCount(usize),
    /// A random range has min > max.
    #[error("random range {0} has min greater than max")]
    InvertedRange(usize),
    /// Numeric field must be finite.
    #[error("non-finite numeric value in {0}")]
    NonFinite(String),
    /// Monetary values must be non-negative.
    #[error("negative monetary value in {0}")]
    NegativeMoney(String),
    /// Reputation costs and grants must be non-negative.
    #[error("negative reputation value in {0}")]
    NegativeReputation(String),
    /// Dealer names must be non-empty.
    #[error("dealer with empty name")]
    EmptyName,
    /// Two dealers share a name.
    #[error("duplicate dealer: {0}")]
    DuplicateDealer(String),
    /// An unlock requirement points at a dealer that does not exist.
    #[error("dealer {dealer} requires unknown dealer {required}")]
    DependencyNotFound { dealer: String, required: String },
    /// Shipping amounts are inconsistent.
    #[error("shipping tier {tier} of {dealer} has invalid amounts")]
    InvalidShipping { dealer: String, tier: String },
}

/// Gate on another dealer's reputation.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UnlockRequirement {
    /// Dealer whose reputation is checked.
    pub name: String,
    /// Minimum reputation that dealer must reach.
    pub min_rep: i32,
}

/// Deal template, stored on the wire as `[dealTime, dealTimeMult, moneyPenalty, repPenalty]`.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(from = "[f32; 4]", into = "[f32; 4]")]
pub struct DealTemplate {
    /// Days the player has to deliver.
    pub deal_time: f32,
    /// Reward multiplier attached to this deal length.
    pub deal_time_mult: f32,
    /// Cash lost on failure.
    pub money_penalty: f32,
    /// Reputation lost on failure.
    pub rep_penalty: f32,
}

impl From<[f32; 4]> for DealTemplate {
    fn from(v: [f32; 4]) -> Self {
        Self {
            deal_time: v[0],
            deal_time_mult: v[1],
            money_penalty: v[2],
            rep_penalty: v[3],
        }
    }
}

impl From<DealTemplate> for [f32; 4] {
    fn from(d: DealTemplate) -> Self {
        [d.deal_time, d.deal_time_mult, d.money_penalty, d.rep_penalty]
    }
}

/// Per-shipping-tier scaling of a deal template's four fields.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(from = "[f32; 4]", into = "[f32; 4]")]
pub struct DealModifier {
    pub time: f32,
    pub time_mult: f32,
    pub money_penalty: f32,
    pub rep_penalty: f32,
}

impl Default for DealModifier {
    fn default() -> Self {
        Self {
            time: 1.0,
            time_mult: 1.0,
            money_penalty: 1.0,
            rep_penalty: 1.0,
        }
    }
}

impl From<[f32; 4]> for DealModifier {
    fn from(v: [f32; 4]) -> Self {
        Self {
            time: v[0],
            time_mult: v[1],
            money_penalty: v[2],
            rep_penalty: v[3],
        }
    }
}

impl From<DealModifier> for [f32; 4] {
    fn from(m: DealModifier) -> Self {
        [m.time, m.time_mult, m.money_penalty, m.rep_penalty]
    }
}

impl DealModifier {
    /// Scale a template field by field.
    pub fn apply(&self, deal: &DealTemplate) -> DealTemplate {
        DealTemplate {
            deal_time: deal.deal_time * self.time,
            deal_time_mult: deal.deal_time_mult * self.time_mult,
            money_penalty: deal.money_penalty * self.money_penalty,
            rep_penalty: deal.rep_penalty * self.rep_penalty,
        }
    }
}

/// How likely an effect is to be requested, and in which role.
///
/// The catalog accepts the legacy scalar encoding (`p > 1` is a required
/// roll with chance `p - 1`, `0 < p <= 1` an optional roll with chance `p`)
/// or the tagged `{"required": c}` / `{"optional": c}` form.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(from = "RawChance", into = "RawChance")]
pub enum EffectChance {
    /// Rolled as a necessary effect.
    Required(f32),
    /// Rolled as an optional bonus effect.
    Optional(f32),
    /// Never requested.
    Never,
}

impl EffectChance {
    /// Decode the legacy single-scalar form.
    pub fn from_scalar(p: f32) -> Self {
        if !p.is_finite() || p <= 0.0 {
            EffectChance::Never
        } else if p > 1.0 {
            EffectChance::Required((p - 1.0).min(1.0))
        } else {
            EffectChance::Optional(p)
        }
    }

    /// Probability of the roll succeeding, in [0, 1].
    pub fn chance(&self) -> f32 {
        match self {
            EffectChance::Required(c) | EffectChance::Optional(c) => *c,
            EffectChance::Never => 0.0,
        }
    }
}

#[derive(Serialize, Deserialize)]
#[serde(untagged)]
enum RawChance {
    Scalar(f32),
    Tagged(TaggedChance),
}

#[derive(Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
enum TaggedChance {
    Required(f32),
    Optional(f32),
}

fn unit(c: f32) -> f32 {
    if c.is_finite() {
        c.clamp(0.0, 1.0)
    } else {
        0.0
    }
}

impl From<RawChance> for EffectChance {
    fn from(raw: RawChance) -> Self {
        match raw {
            RawChance::Scalar(p) => EffectChance::from_scalar(p),
            RawChance::Tagged(TaggedChance::Required(c)) => EffectChance::Required(unit(c)),
            RawChance::Tagged(TaggedChance::Optional(c)) => EffectChance::Optional(unit(c)),
        }
    }
}

impl From<EffectChance> for RawChance {
    fn from(c: EffectChance) -> Self {
        match c {
            EffectChance::Required(c) => RawChance::Tagged(TaggedChance::Required(c)),
            EffectChance::Optional(c) => RawChance::Tagged(TaggedChance::Optional(c)),
            EffectChance::Never => RawChance::Scalar(0.0),
        }
    }
}

/// Quality grade of a product.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Quality {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub unlock_rep: i32,
    #[serde(default)]
    pub dollar_mult: f32,
}

/// Effect a buyer may ask for.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Effect {
    /// Effect name, or [`RANDOM_EFFECT`].
    pub name: String,
    #[serde(default)]
    pub unlock_rep: i32,
    pub probability: EffectChance,
    #[serde(default)]
    pub dollar_mult: f32,
}

impl Effect {
    pub fn is_random(&self) -> bool {
        self.name == RANDOM_EFFECT
    }
}

fn one() -> f32 {
    1.0
}

/// Product a dealer buys.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Drug {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub unlock_rep: i32,
    /// Base price per unit.
    pub base_dollar: f32,
    pub base_rep: f32,
    pub base_xp: f32,
    #[serde(default = "one")]
    pub rep_mult: f32,
    #[serde(default = "one")]
    pub xp_mult: f32,
    #[serde(default)]
    pub qualities: Vec<Quality>,
    #[serde(default)]
    pub effects: Vec<Effect>,
}

/// Purchasable delivery-size tier.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShippingTier {
    pub name: String,
    #[serde(default)]
    pub cost: Decimal,
    #[serde(default)]
    pub unlock_rep: i32,
    pub min_amount: u32,
    #[serde(default)]
    pub step_amount: u32,
    pub max_amount: u32,
    #[serde(default)]
    pub deal_modifier: DealModifier,
}

impl ShippingTier {
    /// Number of whole steps between min and max, 0 when the range is degenerate.
    pub fn steps(&self) -> u32 {
        if self.step_amount == 0 || self.max_amount <= self.min_amount {
            return 0;
        }
        (self.max_amount - self.min_amount) / self.step_amount
    }
}

/// What a claimed reward does once its delay elapses.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RewardKind {
    /// Credit cash to the player.
    Cash { amount: Decimal },
    /// Grant player experience.
    Xp { amount: u32 },
    /// Spawn an item in the player's inventory.
    Item { item: String, quantity: u32 },
    /// Raw host console command.
    Console { command: String },
}

/// Once-per-day favor a dealer grants for reputation.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RewardDescriptor {
    #[serde(default)]
    pub unlock_rep: i32,
    #[serde(default)]
    pub rep_cost: i32,
    pub effect: RewardKind,
}

/// Weekly repayment schedule of a dealer's debt.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DebtParams {
    pub total_debt: Decimal,
    pub interest_rate: Decimal,
    pub day_multiple: Decimal,
    pub day_exponent: f64,
}

/// Cash-for-reputation gift.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GiftParams {
    pub cost: Decimal,
    pub rep: i32,
}

/// A buyer NPC and everything it offers.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Dealer {
    pub name: String,
    #[serde(default)]
    pub image: String,
    #[serde(default)]
    pub tier: u32,
    #[serde(default)]
    pub unlock_requirements: Vec<UnlockRequirement>,
    /// Weekdays on which the dealer posts deals; empty means every day.
    #[serde(default)]
    pub deal_days: Vec<Weekday>,
    #[serde(default)]
    pub curfew_deal: bool,
    #[serde(default)]
    pub deals: Vec<DealTemplate>,
    #[serde(default)]
    pub refresh_cost: Decimal,
    #[serde(default)]
    pub reward: Option<RewardDescriptor>,
    /// Log base of the reputation bonus on delivery size; <= 1 disables it.
    #[serde(default)]
    pub rep_log_base: f32,
    #[serde(default)]
    pub drugs: Vec<Drug>,
    #[serde(default)]
    pub shippings: Vec<ShippingTier>,
    #[serde(default)]
    pub dialogue: BTreeMap<String, Vec<String>>,
    #[serde(default)]
    pub debt: Option<DebtParams>,
    #[serde(default)]
    pub gift: Option<GiftParams>,
}

impl Dealer {
    /// Whether the dealer posts deals on `day`.
    pub fn deals_on(&self, day: Weekday) -> bool {
        self.deal_days.is_empty() || self.deal_days.contains(&day)
    }
}

/// Inclusive `[min, max]` range for one random draw.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DrawRange {
    pub min: f32,
    pub max: f32,
}

impl DrawRange {
    pub const UNIT: DrawRange = DrawRange { min: 1.0, max: 1.0 };
}

/// The four random draws of quest generation.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RandomRanges {
    /// r1: scales every effect multiplier.
    pub effect: DrawRange,
    /// r2: scales reputation reward and penalty.
    pub rep: DrawRange,
    /// r3: scales XP reward.
    pub xp: DrawRange,
    /// r4: scales cash reward and penalty.
    pub dollar: DrawRange,
}

impl Default for RandomRanges {
    fn default() -> Self {
        Self {
            effect: DrawRange::UNIT,
            rep: DrawRange::UNIT,
            xp: DrawRange::UNIT,
            dollar: DrawRange::UNIT,
        }
    }
}

impl RandomRanges {
    /// Build from the flat 8-value list of the catalog file.
    pub fn from_flat(values: &[f32]) -> Result<Self, ValidationError> {
        if values.is_empty() {
            return Ok(Self::default());
        }
        if values.len() != 8 {
            return Err(ValidationError::RandomRangeCount(values.len()));
        }
        if values.iter().any(|v| !v.is_finite()) {
            return Err(ValidationError::NonFinite("randomNumberRanges".into()));
        }
        let pair = |i: usize| -> Result<DrawRange, ValidationError> {
            let (min, max) = (values[2 * i], values[2 * i + 1]);
            if min > max {
                return Err(ValidationError::InvertedRange(i));
            }
            Ok(DrawRange { min, max })
        };
        Ok(Self {
            effect: pair(0)?,
            rep: pair(1)?,
            xp: pair(2)?,
            dollar: pair(3)?,
        })
    }
}

/// Full catalog as found in a data file.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Catalog {
    #[serde(default)]
    pub effects_name: Vec<String>,
    #[serde(default)]
    pub effects_dollar_mult: Vec<f32>,
    #[serde(default)]
    pub quality_types: Vec<String>,
    #[serde(default)]
    pub qualities_dollar_mult: Vec<f32>,
    #[serde(default)]
    pub random_number_ranges: Vec<f32>,
    #[serde(default)]
    pub dealers: Vec<Dealer>,
}

impl Catalog {
    /// Parse a catalog from JSON text. Does not validate.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    pub fn dealer(&self, name: &str) -> Option<&Dealer> {
        self.dealers.iter().find(|d| d.name == name)
    }

    /// Global effect names, used to resolve [`RANDOM_EFFECT`].
    pub fn effect_names(&self) -> &[String] {
        &self.effects_name
    }

    /// Global bonus added to an effect's own multiplier; 0 when absent.
    pub fn effect_bonus(&self, name: &str) -> f32 {
        lookup(&self.effects_name, &self.effects_dollar_mult, name)
    }

    /// Global bonus added to a quality's own multiplier; 0 when absent.
    pub fn quality_bonus(&self, kind: &str) -> f32 {
        lookup(&self.quality_types, &self.qualities_dollar_mult, kind)
    }

    /// Random draw ranges; falls back to unit ranges if the table is malformed.
    pub fn ranges(&self) -> RandomRanges {
        RandomRanges::from_flat(&self.random_number_ranges).unwrap_or_default()
    }

    /// Merge another catalog into this one. Dealers and bonus entries whose
    /// names already exist are kept from `self`. Returns the skipped dealer names.
    pub fn merge(&mut self, other: Catalog) -> Vec<String> {
        let mut skipped = Vec::new();
        for (name, value) in other.effects_name.into_iter().zip(other.effects_dollar_mult) {
            if !self.effects_name.contains(&name) {
                self.effects_name.push(name);
                self.effects_dollar_mult.push(value);
            }
        }
        for (kind, value) in other
            .quality_types
            .into_iter()
            .zip(other.qualities_dollar_mult)
        {
            if !self.quality_types.contains(&kind) {
                self.quality_types.push(kind);
                self.qualities_dollar_mult.push(value);
            }
        }
        if self.random_number_ranges.is_empty() {
            self.random_number_ranges = other.random_number_ranges;
        }
        for dealer in other.dealers {
            if self.dealer(&dealer.name).is_some() {
                skipped.push(dealer.name);
            } else {
                self.dealers.push(dealer);
            }
        }
        skipped
    }

    /// Validate the catalog, including cross-dealer unlock requirements.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.effects_name.len() != self.effects_dollar_mult.len() {
            return Err(ValidationError::MismatchedBonusTable {
                table: "effects",
                names: self.effects_name.len(),
                values: self.effects_dollar_mult.len(),
            });
        }
        if self.quality_types.len() != self.qualities_dollar_mult.len() {
            return Err(ValidationError::MismatchedBonusTable {
                table: "qualities",
                names: self.quality_types.len(),
                values: self.qualities_dollar_mult.len(),
            });
        }
        finite("effectsDollarMult", &self.effects_dollar_mult)?;
        finite("qualitiesDollarMult", &self.qualities_dollar_mult)?;
        RandomRanges::from_flat(&self.random_number_ranges)?;

        let mut names: BTreeSet<&str> = BTreeSet::new();
        for d in &self.dealers {
            validate_dealer(d)?;
            if !names.insert(d.name.as_str()) {
                return Err(ValidationError::DuplicateDealer(d.name.clone()));
            }
        }
        for d in &self.dealers {
            for req in &d.unlock_requirements {
                if !names.contains(req.name.as_str()) {
                    return Err(ValidationError::DependencyNotFound {
                        dealer: d.name.clone(),
                        required: req.name.clone(),
                    });
                }
            }
        }
        Ok(())
    }
}

fn lookup(names: &[String], values: &[f32], key: &str) -> f32 {
    names
        .iter()
        .position(|n| n == key)
        .and_then(|i| values.get(i).copied())
        .unwrap_or(0.0)
}

fn finite(field: &str, values: &[f32]) -> Result<(), ValidationError> {
    if values.iter().all(|v| v.is_finite()) {
        Ok(())
    } else {
        Err(ValidationError::NonFinite(field.to_string()))
    }
}

/// Validate one dealer record in isolation.
pub fn validate_dealer(d: &Dealer) -> Result<(), ValidationError> {
    if d.name.trim().is_empty() {
        return Err(ValidationError::EmptyName);
    }
    if d.refresh_cost < Decimal::ZERO {
        return Err(ValidationError::NegativeMoney(format!("{}.refreshCost", d.name)));
    }
    if !d.rep_log_base.is_finite() {
        return Err(ValidationError::NonFinite(format!("{}.repLogBase", d.name)));
    }
    for deal in &d.deals {
        finite(&format!("{}.deals", d.name), &<[f32; 4]>::from(*deal))?;
    }
    for drug in &d.drugs {
        let field = format!("{}.{}", d.name, drug.kind);
        finite(
            &field,
            &[
                drug.base_dollar,
                drug.base_rep,
                drug.base_xp,
                drug.rep_mult,
                drug.xp_mult,
            ],
        )?;
        let q: Vec<f32> = drug.qualities.iter().map(|q| q.dollar_mult).collect();
        finite(&field, &q)?;
        let e: Vec<f32> = drug.effects.iter().map(|e| e.dollar_mult).collect();
        finite(&field, &e)?;
    }
    for s in &d.shippings {
        let bad_range = s.min_amount > s.max_amount;
        let bad_step = s.max_amount > s.min_amount && s.step_amount == 0;
        if bad_range || bad_step {
            return Err(ValidationError::InvalidShipping {
                dealer: d.name.clone(),
                tier: s.name.clone(),
            });
        }
        if s.cost < Decimal::ZERO {
            return Err(ValidationError::NegativeMoney(format!("{}.{}", d.name, s.name)));
        }
        finite(&format!("{}.{}", d.name, s.name), &<[f32; 4]>::from(s.deal_modifier))?;
    }
    if let Some(debt) = &d.debt {
        if debt.total_debt < Decimal::ZERO
            || debt.interest_rate < Decimal::ZERO
            || debt.day_multiple < Decimal::ZERO
        {
            return Err(ValidationError::NegativeMoney(format!("{}.debt", d.name)));
        }
        if !debt.day_exponent.is_finite() {
            return Err(ValidationError::NonFinite(format!("{}.debt", d.name)));
        }
    }
    if let Some(gift) = &d.gift {
        if gift.cost < Decimal::ZERO {
            return Err(ValidationError::NegativeMoney(format!("{}.gift", d.name)));
        }
        if gift.rep < 0 {
            return Err(ValidationError::NegativeReputation(format!("{}.gift", d.name)));
        }
    }
    if let Some(reward) = &d.reward {
        if reward.unlock_rep < 0 || reward.rep_cost < 0 {
            return Err(ValidationError::NegativeReputation(format!("{}.reward", d.name)));
        }
    }
    Ok(())
}
