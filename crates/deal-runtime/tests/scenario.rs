use chrono::Weekday;
use deal_core::{Catalog, DebtPhase};
use deal_econ::debt::WeeklyOutcome;
use deal_econ::Wallet;
use deal_quest::Delivery;
use deal_runtime::{HostCommand, MessageKind, Roster, RosterConfig};
use modkit::PackLoader;
use proptest::prelude::*;
use rust_decimal::Decimal;
use std::path::PathBuf;
use std::time::Duration;

const ONE_DEALER: &str = r#"{
    "qualityTypes": ["Standard"],
    "qualitiesDollarMult": [0.0],
    "randomNumberRanges": [1, 1, 1, 1, 1, 1, 1, 1],
    "dealers": [{
        "name": "Brad",
        "deals": [[1, 1.0, 50, 2]],
        "drugs": [{
            "type": "weed", "unlockRep": 0, "baseDollar": 10, "baseRep": 4, "baseXp": 10,
            "qualities": [{"type": "Standard", "unlockRep": 0, "dollarMult": 0.1}]
        }],
        "shippings": [{"name": "Pocket", "minAmount": 10, "stepAmount": 10, "maxAmount": 10}],
        "debt": {"totalDebt": 1000, "interestRate": 0.1, "dayMultiple": 10, "dayExponent": 1}
    }]
}"#;

fn roster(json: &str, seed: u64) -> Roster {
    let catalog = Catalog::from_json(json).unwrap();
    let mut r = Roster::new(
        catalog,
        RosterConfig {
            rng_seed: seed,
            ..RosterConfig::default()
        },
    )
    .unwrap();
    r.initialize(None);
    r
}

fn bundled() -> Catalog {
    let root = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../../assets/catalog");
    PackLoader::new(root, "empire.json").load().unwrap()
}

#[test]
fn first_week_of_debt() {
    let mut r = roster(ONE_DEALER, 7);
    let mut wallet = Wallet::new(Decimal::new(100, 0));
    let remaining = |r: &Roster| r.dealer_state("Brad").unwrap().debt.remaining;
    assert_eq!(remaining(&r), Decimal::new(1000, 0));

    for _ in 0..6 {
        let report = r.advance_day(&mut wallet).unwrap();
        assert!(report.debt.is_empty());
    }
    assert_eq!(r.clock().weekday(), Weekday::Sun);
    let report = r.advance_day(&mut wallet).unwrap();
    assert_eq!(report.day, 7);
    assert_eq!(report.weekday, Weekday::Mon);
    assert_eq!(remaining(&r), Decimal::new(1023, 0));
    assert_eq!(wallet.cash, Decimal::new(30, 0));
    match &report.debt[0].outcome {
        WeeklyOutcome::Settled(s) => assert_eq!(s.collected, Decimal::new(70, 0)),
        other => panic!("unexpected {other:?}"),
    }
    assert!(report.commands.is_empty());

    // Week two wants 140; the wallet only holds 30.
    let mut last = None;
    for _ in 0..7 {
        last = Some(r.advance_day(&mut wallet).unwrap());
    }
    let report = last.unwrap();
    assert_eq!(
        report.commands,
        vec![HostCommand::KillPlayer {
            dealer: "Brad".into()
        }]
    );
    assert_eq!(remaining(&r), Decimal::new(1125, 0));
    assert_eq!(wallet.cash, Decimal::new(30, 0));
    assert!(r
        .drain_notices()
        .iter()
        .any(|n| n.kind == MessageKind::DebtDefault));
}

#[test]
fn manual_payments_clear_debt() {
    let mut r = roster(ONE_DEALER, 1);
    let mut wallet = Wallet::new(Decimal::new(2000, 0));
    assert!(!r.debt_quota_met("Brad").unwrap());
    r.pay_debt("Brad", Decimal::new(70, 0), &mut wallet).unwrap();
    assert!(r.debt_quota_met("Brad").unwrap());
    let p = r.pay_debt("Brad", Decimal::new(5000, 0), &mut wallet).unwrap();
    assert!(p.cleared);
    assert_eq!(p.applied, Decimal::new(930, 0));
    assert_eq!(wallet.cash, Decimal::new(1000, 0));
    assert_eq!(
        r.dealer_state("Brad").unwrap().debt.phase(),
        DebtPhase::Cleared
    );
    for _ in 0..7 {
        assert!(r.advance_day(&mut wallet).unwrap().debt.is_empty());
    }
    assert_eq!(wallet.cash, Decimal::new(1000, 0));
}

#[test]
fn quest_pays_quality_scaled_cash() {
    let mut r = roster(ONE_DEALER, 3);
    let mut wallet = Wallet::default();
    let offer = r.offers()[0].clone();
    assert_eq!(offer.amount, 10);
    assert_eq!(offer.quality_mult, 0.1);
    r.accept_quest(offer.index).unwrap();
    let s = r
        .complete_active(
            &Delivery {
                product: "weed".into(),
                quality: "Standard".into(),
                amount: 12,
                effects: vec![],
            },
            &mut wallet,
        )
        .unwrap();
    // 1.1 * 10 * 10
    assert_eq!(s.cash, Decimal::new(110, 0));
    assert_eq!(s.reputation, 5);
}

#[test]
fn bundled_catalog_runs_a_month() {
    let mut r = Roster::new(bundled(), RosterConfig::default()).unwrap();
    r.initialize(None);
    let mut wallet = Wallet::new(Decimal::new(1_000_000, 0));
    for _ in 0..30 {
        let report = r.advance_day(&mut wallet).unwrap();
        assert!(report.commands.is_empty());
        r.advance_realtime(Duration::from_secs(1), &mut wallet);
    }
    assert_eq!(r.today(), 30);
    assert!(wallet.cash < Decimal::new(1_000_000, 0));
    assert!(!r.drain_notices().is_empty());
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(24))]

    #[test]
    fn offers_respect_dealer_rules(seed in any::<u64>(), days in 1u32..21, gifts in 0usize..6) {
        let catalog = bundled();
        let mut r = Roster::new(catalog.clone(), RosterConfig { rng_seed: seed, ..RosterConfig::default() }).unwrap();
        r.initialize(None);
        let mut wallet = Wallet::new(Decimal::new(10_000_000, 0));
        for _ in 0..gifts {
            for d in &catalog.dealers {
                let _ = r.give_gift(&d.name, &mut wallet);
            }
        }
        for _ in 0..days {
            r.advance_day(&mut wallet).unwrap();
            let weekday = r.clock().weekday();
            for q in r.offers() {
                let dealer = catalog.dealer(&q.dealer).unwrap();
                let state = r.dealer_state(&q.dealer).unwrap();
                prop_assert!(state.unlocked);
                prop_assert!(dealer.deals_on(weekday));
                let tier = state.current_shipping(dealer).unwrap();
                prop_assert!(q.amount >= tier.min_amount && q.amount <= tier.max_amount);
                prop_assert!(q.dollar_mult_min <= q.dollar_mult_max);
            }
            for d in &catalog.dealers {
                prop_assert!(r.dealer_state(&d.name).unwrap().reputation >= 1);
            }
        }
    }
}
