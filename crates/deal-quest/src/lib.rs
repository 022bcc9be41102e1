#![deny(warnings)]

//! Procedural delivery quests.
//!
//! A quest is rolled from a dealer's unlocked products, its current shipping
//! tier, one of its deal templates and four random scale draws configured
//! in the catalog (`r1` effects, `r2` reputation, `r3` XP, `r4` cash).

use deal_core::{
    Catalog, Dealer, DealerState, DrawRange, Drug, EffectChance, ShippingTier, RANDOM_EFFECT,
};
use deal_econ::round_reward;
use rand::seq::SliceRandom;
use rand::Rng;
use rust_decimal::prelude::FromPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

/// Reasons a quest cannot be generated.
#[derive(Debug, Error, PartialEq)]
pub enum QuestError {
    #[error("{dealer} has not unlocked {drug}")]
    DrugLocked { dealer: String, drug: String },
    #[error("{drug} of {dealer} has no unlocked quality")]
    NoQualities { dealer: String, drug: String },
    #[error("{0} has no deal templates")]
    NoDeals(String),
    #[error("{dealer} has no shipping tier {tier}")]
    InvalidShippingTier { dealer: String, tier: usize },
}

/// Reasons a delivery does not satisfy a quest.
#[derive(Debug, Error, PartialEq)]
pub enum DeliveryError {
    #[error("wrong product: expected {expected}, got {got}")]
    WrongProduct { expected: String, got: String },
    #[error("wrong quality: expected {expected}, got {got}")]
    WrongQuality { expected: String, got: String },
    #[error("short delivery: need {need}, got {got}")]
    ShortAmount { need: u32, got: u32 },
    #[error("missing required effect {0}")]
    MissingEffect(String),
}

/// An effect chosen for a quest with its final multiplier.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct EffectPick {
    pub name: String,
    /// `(own + global bonus) * r1`. The quest's dollar bounds are scaled by
    /// `1 + dollar_mult`, not by this value directly.
    pub dollar_mult: f32,
}

/// A generated delivery task.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct QuestDescriptor {
    /// Stable index for UI binding.
    pub index: u32,
    pub dealer: String,
    pub product: String,
    pub quality: String,
    /// `quality.dollarMult + global quality bonus`.
    pub quality_mult: f32,
    pub amount: u32,
    pub necessary_effects: Vec<EffectPick>,
    pub optional_effects: Vec<EffectPick>,
    /// Base price per unit.
    pub dollar: i64,
    pub rep: i64,
    pub xp: i64,
    pub dollar_mult_min: f32,
    pub dollar_mult_max: f32,
    /// Days allowed for the delivery.
    pub deal_time: f32,
    pub deal_time_mult: f32,
    pub money_penalty: i64,
    pub rep_penalty: i32,
    pub curfew: bool,
}

/// What the player hands over.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Delivery {
    pub product: String,
    pub quality: String,
    pub amount: u32,
    pub effects: Vec<String>,
}

/// Rewards earned by a satisfying delivery.
#[derive(Clone, Debug, PartialEq)]
pub struct QuestReward {
    pub cash: Decimal,
    pub rep: i32,
    pub xp: u32,
    pub dollar_mult: f32,
}

fn names(picks: &[EffectPick]) -> Vec<String> {
    picks.iter().map(|p| p.name.clone()).collect()
}

impl QuestDescriptor {
    pub fn necessary_names(&self) -> Vec<String> {
        names(&self.necessary_effects)
    }

    pub fn optional_names(&self) -> Vec<String> {
        names(&self.optional_effects)
    }

    /// Deadline in whole days after acceptance (at least one).
    pub fn deadline_days(&self) -> u32 {
        let days = self.deal_time.ceil();
        if days.is_finite() && days >= 1.0 {
            days as u32
        } else {
            1
        }
    }

    /// Check a delivery and price it.
    ///
    /// The multiplier is the necessary product times the factors of the
    /// optional effects actually delivered, so it lies in
    /// `[dollar_mult_min, dollar_mult_max]`.
    pub fn settle(&self, delivery: &Delivery) -> Result<QuestReward, DeliveryError> {
        if delivery.product != self.product {
            return Err(DeliveryError::WrongProduct {
                expected: self.product.clone(),
                got: delivery.product.clone(),
            });
        }
        if delivery.quality != self.quality {
            return Err(DeliveryError::WrongQuality {
                expected: self.quality.clone(),
                got: delivery.quality.clone(),
            });
        }
        if delivery.amount < self.amount {
            return Err(DeliveryError::ShortAmount {
                need: self.amount,
                got: delivery.amount,
            });
        }
        if let Some(missing) = self
            .necessary_effects
            .iter()
            .find(|e| !delivery.effects.contains(&e.name))
        {
            return Err(DeliveryError::MissingEffect(missing.name.clone()));
        }
        let bonus: f32 = self
            .optional_effects
            .iter()
            .filter(|e| delivery.effects.contains(&e.name))
            .map(|e| 1.0 + e.dollar_mult)
            .product();
        let dollar_mult = self.dollar_mult_min * bonus;
        let cash = f64::from(dollar_mult) * self.dollar as f64 * f64::from(self.amount);
        let cash = Decimal::from_f64(cash)
            .map(|c| c.round_dp(2).max(Decimal::ZERO))
            .unwrap_or(Decimal::ZERO);
        Ok(QuestReward {
            cash,
            rep: i32::try_from(self.rep).unwrap_or(i32::MAX),
            xp: u32::try_from(self.xp.max(0)).unwrap_or(u32::MAX),
            dollar_mult,
        })
    }
}

/// Reputation bonus on delivery size: `max(0, log_base(rep + 1) - 4)`, 0 when `base <= 1`.
pub fn log_bonus(reputation: i32, base: f32) -> f32 {
    if base.is_nan() || base <= 1.0 {
        return 0.0;
    }
    let v = (reputation.max(0) as f32 + 1.0).log(base) - 4.0;
    if v.is_finite() {
        v.max(0.0)
    } else {
        0.0
    }
}

/// Delivery amount for a shipping tier: `min + round(step * (1 + bonus)) * stepAmount`,
/// never past the last whole step below `max`.
pub fn pick_amount<R: Rng + ?Sized>(tier: &ShippingTier, bonus: f32, rng: &mut R) -> u32 {
    let steps = tier.steps();
    if steps == 0 {
        return tier.min_amount;
    }
    let step = rng.gen_range(0..=steps);
    let scaled = (step as f32 * (1.0 + bonus.max(0.0))).round();
    // `as` saturates on overflow.
    let scaled = (scaled as u32).min(steps);
    tier.min_amount + scaled * tier.step_amount
}

/// One uniform draw from an inclusive range.
pub fn draw<R: Rng + ?Sized>(range: DrawRange, rng: &mut R) -> f32 {
    if range.min >= range.max {
        range.min
    } else {
        rng.gen_range(range.min..=range.max)
    }
}

/// Uniformly pick one of the unlocked products of a dealer.
pub fn choose_product<'a, R: Rng + ?Sized>(
    state: &'a DealerState,
    rng: &mut R,
) -> Option<&'a Drug> {
    state.snapshot.drugs.choose(rng)
}

enum Slot {
    Necessary,
    Optional,
}

/// Generate one quest for `drug_type` from a dealer's current unlocks.
///
/// Both dollar bounds start at `(1 + quality mult) * deal time mult * r4`.
/// Every picked effect then scales them by
/// `1 + (own + global bonus) * r1`: necessary effects scale both bounds,
/// optional ones only the max.
pub fn generate_quest<R: Rng + ?Sized>(
    catalog: &Catalog,
    dealer: &Dealer,
    state: &DealerState,
    drug_type: &str,
    index: u32,
    rng: &mut R,
) -> Result<QuestDescriptor, QuestError> {
    let drug = state
        .snapshot
        .drug(drug_type)
        .ok_or_else(|| QuestError::DrugLocked {
            dealer: dealer.name.clone(),
            drug: drug_type.to_string(),
        })?;
    if drug.qualities.is_empty() {
        return Err(QuestError::NoQualities {
            dealer: dealer.name.clone(),
            drug: drug.kind.clone(),
        });
    }
    let tier = state
        .current_shipping(dealer)
        .ok_or(QuestError::InvalidShippingTier {
            dealer: dealer.name.clone(),
            tier: state.shipping_tier,
        })?;
    if dealer.deals.is_empty() {
        return Err(QuestError::NoDeals(dealer.name.clone()));
    }

    let ranges = catalog.ranges();
    let r1 = draw(ranges.effect, rng);
    let r2 = draw(ranges.rep, rng);
    let r3 = draw(ranges.xp, rng);
    let r4 = draw(ranges.dollar, rng);

    let amount = pick_amount(tier, log_bonus(state.reputation, dealer.rep_log_base), rng);

    let quality = drug
        .qualities
        .choose(rng)
        .ok_or_else(|| QuestError::NoQualities {
            dealer: dealer.name.clone(),
            drug: drug.kind.clone(),
        })?;
    let quality_mult = quality.dollar_mult + catalog.quality_bonus(&quality.kind);

    let mut necessary: Vec<EffectPick> = Vec::new();
    let mut optional: Vec<EffectPick> = Vec::new();
    let mut min_mult = 1.0f32;
    let mut max_mult = 1.0f32;
    for effect in &drug.effects {
        let slot = match effect.probability {
            EffectChance::Required(_) => Slot::Necessary,
            EffectChance::Optional(_) => Slot::Optional,
            EffectChance::Never => continue,
        };
        if rng.gen::<f32>() >= effect.probability.chance() {
            continue;
        }
        let taken = |n: &str| necessary.iter().chain(optional.iter()).any(|p| p.name == n);
        let name = if effect.is_random() {
            let pool: Vec<&String> = catalog
                .effect_names()
                .iter()
                .filter(|n| n.as_str() != RANDOM_EFFECT && !taken(n))
                .collect();
            match pool.choose(rng) {
                Some(n) => (*n).clone(),
                None => {
                    debug!(dealer = %dealer.name, "no unused effect left for random pick");
                    continue;
                }
            }
        } else if taken(&effect.name) {
            continue;
        } else {
            effect.name.clone()
        };
        let mult = (effect.dollar_mult + catalog.effect_bonus(&name)) * r1;
        let factor = 1.0 + mult;
        let pick = EffectPick {
            name,
            dollar_mult: mult,
        };
        match slot {
            Slot::Necessary => {
                min_mult *= factor;
                max_mult *= factor;
                necessary.push(pick);
            }
            Slot::Optional => {
                max_mult *= factor;
                optional.push(pick);
            }
        }
    }

    let template = dealer
        .deals
        .choose(rng)
        .ok_or_else(|| QuestError::NoDeals(dealer.name.clone()))?;
    let deal = tier.deal_modifier.apply(template);

    let base = (1.0 + quality_mult) * deal.deal_time_mult * r4;
    let quest = QuestDescriptor {
        index,
        dealer: dealer.name.clone(),
        product: drug.kind.clone(),
        quality: quality.kind.clone(),
        quality_mult,
        amount,
        necessary_effects: necessary,
        optional_effects: optional,
        dollar: round_reward(drug.base_dollar * r4),
        rep: round_reward(drug.base_rep * drug.rep_mult * r2),
        xp: round_reward(drug.base_xp * drug.xp_mult * r3),
        dollar_mult_min: base * min_mult,
        dollar_mult_max: base * max_mult,
        deal_time: deal.deal_time,
        deal_time_mult: deal.deal_time_mult,
        money_penalty: round_reward(deal.money_penalty * r4),
        rep_penalty: (deal.rep_penalty * r2).round() as i32,
        curfew: dealer.curfew_deal,
    };
    debug!(
        dealer = %quest.dealer,
        product = %quest.product,
        amount = quest.amount,
        min = quest.dollar_mult_min,
        max = quest.dollar_mult_max,
        "quest generated"
    );
    Ok(quest)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    const CATALOG: &str = r#"{
        "effectsName": ["Calming", "Energizing", "Sneaky", "Glowing"],
        "effectsDollarMult": [0.1, 0.2, 0.3, 0.4],
        "qualityTypes": ["Poor", "Premium"],
        "qualitiesDollarMult": [0.0, 0.5],
        "randomNumberRanges": [0.9, 1.1, 0.8, 1.2, 0.9, 1.1, 0.95, 1.05],
        "dealers": [{
            "name": "Brad",
            "repLogBase": 2,
            "deals": [[2, 1.0, 100, 5], [1, 1.5, 200, 10]],
            "drugs": [{
                "type": "weed", "baseDollar": 12, "baseRep": 10, "baseXp": 20,
                "qualities": [
                    {"type": "Poor", "dollarMult": 0.0},
                    {"type": "Premium", "dollarMult": 0.4}
                ],
                "effects": [
                    {"name": "Calming", "probability": 2.0, "dollarMult": 0.2},
                    {"name": "Energizing", "probability": 1.0, "dollarMult": 0.0},
                    {"name": "Random", "probability": 1.0, "dollarMult": 0.1}
                ]
            }, {
                "type": "shrooms", "baseDollar": 30, "baseRep": 20, "baseXp": 30
            }],
            "shippings": [
                {"name": "Pocket", "minAmount": 5, "stepAmount": 5, "maxAmount": 22},
                {"name": "Fixed", "minAmount": 10, "stepAmount": 10, "maxAmount": 10,
                 "dealModifier": [2, 1, 3, 1]}
            ]
        }]
    }"#;

    fn setup() -> (Catalog, DealerState) {
        let catalog = Catalog::from_json(CATALOG).unwrap();
        catalog.validate().unwrap();
        let state = DealerState::new(&catalog.dealers[0]);
        (catalog, state)
    }

    #[test]
    fn log_bonus_kicks_in_past_threshold() {
        assert_eq!(log_bonus(1, 0.0), 0.0);
        assert_eq!(log_bonus(1, 1.0), 0.0);
        assert_eq!(log_bonus(14, 2.0), 0.0);
        assert!((log_bonus(63, 2.0) - 2.0).abs() < 1e-5);
    }

    #[test]
    fn degenerate_tier_forces_min() {
        let (catalog, _) = setup();
        let fixed = &catalog.dealers[0].shippings[1];
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        for _ in 0..20 {
            assert_eq!(pick_amount(fixed, 5.0, &mut rng), 10);
        }
    }

    #[test]
    fn generates_deterministic_quest() {
        let (catalog, state) = setup();
        let dealer = &catalog.dealers[0];
        let q1 = generate_quest(&catalog, dealer, &state, "weed", 3, &mut ChaCha8Rng::seed_from_u64(7)).unwrap();
        let q2 = generate_quest(&catalog, dealer, &state, "weed", 3, &mut ChaCha8Rng::seed_from_u64(7)).unwrap();
        assert_eq!(q1, q2);
        assert_eq!(q1.index, 3);
        assert_eq!(q1.dealer, "Brad");
        assert_eq!(q1.product, "weed");
        // Calming is always required, Energizing and the random pick always optional.
        assert_eq!(q1.necessary_names(), vec!["Calming".to_string()]);
        assert_eq!(q1.optional_effects.len(), 2);
        assert!(q1.optional_names().contains(&"Energizing".to_string()));
        assert!(!q1.optional_names().contains(&"Calming".to_string()));
        assert!(q1.dollar_mult_max >= q1.dollar_mult_min);
        assert!(q1.dollar_mult_min > 0.0);
        // 10 * [0.8, 1.2] rounded to half-MSD.
        assert!([8, 9, 10, 20].contains(&q1.rep));
        assert!(q1.deal_time == 2.0 || q1.deal_time == 1.0);
    }

    #[test]
    fn shipping_modifier_scales_deal() {
        let (catalog, mut state) = setup();
        let dealer = &catalog.dealers[0];
        state.set_shipping_tier(dealer, 1);
        let q = generate_quest(&catalog, dealer, &state, "weed", 0, &mut ChaCha8Rng::seed_from_u64(3)).unwrap();
        assert_eq!(q.amount, 10);
        assert!(q.deal_time == 4.0 || q.deal_time == 2.0);
        assert!(q.money_penalty >= 280);
    }

    #[test]
    fn locked_or_empty_products_fail() {
        let (catalog, state) = setup();
        let dealer = &catalog.dealers[0];
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        assert_eq!(
            generate_quest(&catalog, dealer, &state, "meth", 0, &mut rng),
            Err(QuestError::DrugLocked {
                dealer: "Brad".into(),
                drug: "meth".into()
            })
        );
        assert_eq!(
            generate_quest(&catalog, dealer, &state, "shrooms", 0, &mut rng),
            Err(QuestError::NoQualities {
                dealer: "Brad".into(),
                drug: "shrooms".into()
            })
        );
        let mut no_deals = dealer.clone();
        no_deals.deals.clear();
        assert_eq!(
            generate_quest(&catalog, &no_deals, &state, "weed", 0, &mut rng),
            Err(QuestError::NoDeals("Brad".into()))
        );
    }

    #[test]
    fn random_effect_skipped_when_pool_exhausted() {
        let (mut catalog, state) = setup();
        catalog.effects_name = vec!["Calming".into(), "Energizing".into()];
        catalog.effects_dollar_mult = vec![0.1, 0.2];
        let dealer = catalog.dealers[0].clone();
        let q = generate_quest(&catalog, &dealer, &state, "weed", 0, &mut ChaCha8Rng::seed_from_u64(11)).unwrap();
        let all: Vec<String> = q.necessary_names().into_iter().chain(q.optional_names()).collect();
        let mut dedup = all.clone();
        dedup.sort();
        dedup.dedup();
        assert_eq!(all.len(), dedup.len());
    }

    #[test]
    fn settle_prices_optional_effects() {
        let (catalog, state) = setup();
        let dealer = &catalog.dealers[0];
        let q = generate_quest(&catalog, dealer, &state, "weed", 0, &mut ChaCha8Rng::seed_from_u64(5)).unwrap();
        let mut delivery = Delivery {
            product: "weed".into(),
            quality: q.quality.clone(),
            amount: q.amount,
            effects: q.necessary_names(),
        };
        let bare = q.settle(&delivery).unwrap();
        assert!((bare.dollar_mult - q.dollar_mult_min).abs() < 1e-4);
        delivery.effects.extend(q.optional_names());
        let full = q.settle(&delivery).unwrap();
        assert!((full.dollar_mult - q.dollar_mult_max).abs() < 1e-3);
        assert!(full.cash >= bare.cash);
        assert_eq!(full.rep as i64, q.rep);

        delivery.effects.clear();
        assert_eq!(
            q.settle(&delivery),
            Err(DeliveryError::MissingEffect("Calming".into()))
        );
        delivery.amount = 0;
        assert!(matches!(q.settle(&delivery), Err(DeliveryError::ShortAmount { .. })));
        delivery.quality = "Nope".into();
        assert!(matches!(q.settle(&delivery), Err(DeliveryError::WrongQuality { .. })));
    }

    proptest! {
        #[test]
        fn amount_stays_on_grid(min in 0u32..100,
                                step in 1u32..50,
                                span in 0u32..500,
                                bonus in 0.0f32..5.0,
                                seed in any::<u64>()) {
            let tier = ShippingTier {
                name: "T".into(),
                cost: Decimal::ZERO,
                unlock_rep: 0,
                min_amount: min,
                step_amount: step,
                max_amount: min + span,
                deal_modifier: Default::default(),
            };
            let mut rng = ChaCha8Rng::seed_from_u64(seed);
            let amount = pick_amount(&tier, bonus, &mut rng);
            prop_assert!(amount >= tier.min_amount);
            prop_assert!(amount <= tier.max_amount);
            prop_assert_eq!((amount - tier.min_amount) % tier.step_amount, 0);
        }

        #[test]
        fn generated_quests_respect_tier(seed in any::<u64>(), rep in 1i32..100_000) {
            let (catalog, mut state) = setup();
            let dealer = &catalog.dealers[0];
            state.change_reputation(dealer, rep);
            let tier = &dealer.shippings[0];
            let mut rng = ChaCha8Rng::seed_from_u64(seed);
            let q = generate_quest(&catalog, dealer, &state, "weed", 0, &mut rng).unwrap();
            prop_assert!(q.amount >= tier.min_amount && q.amount <= tier.max_amount);
            prop_assert_eq!((q.amount - tier.min_amount) % tier.step_amount, 0);
            prop_assert!(q.dollar_mult_max >= q.dollar_mult_min);
        }
    }
}
