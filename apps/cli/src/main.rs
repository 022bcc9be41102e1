#![deny(warnings)]

//! Headless autopilot: loads the catalog packs, plays a number of days and
//! prints a summary.

use anyhow::{Context, Result};
use deal_econ::{Economy, Wallet};
use deal_quest::Delivery;
use deal_runtime::{HostCommand, Roster, RosterConfig};
use modkit::PackLoader;
use rust_decimal::Decimal;
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;
use tracing::{debug, info, warn};
use tracing_subscriber::EnvFilter;

struct Args {
    catalog: PathBuf,
    base: String,
    days: u32,
    seed: u64,
    cash: Decimal,
    load: Option<String>,
    save: Option<String>,
    json: bool,
}

fn parse_args() -> Args {
    let mut args = Args {
        catalog: PathBuf::from("assets/catalog"),
        base: "empire.json".to_string(),
        days: 28,
        seed: 42,
        cash: Decimal::new(5_000, 0),
        load: None,
        save: None,
        json: false,
    };
    let mut it = std::env::args().skip(1);
    while let Some(arg) = it.next() {
        match arg.as_str() {
            "--catalog" => {
                if let Some(v) = it.next() {
                    args.catalog = PathBuf::from(v);
                }
            }
            "--base" => {
                if let Some(v) = it.next() {
                    args.base = v;
                }
            }
            "--days" => args.days = it.next().and_then(|s| s.parse().ok()).unwrap_or(args.days),
            "--seed" => args.seed = it.next().and_then(|s| s.parse().ok()).unwrap_or(args.seed),
            "--cash" => {
                args.cash = it
                    .next()
                    .and_then(|s| Decimal::from_str(&s).ok())
                    .unwrap_or(args.cash)
            }
            "--load" => args.load = it.next(),
            "--save" => args.save = it.next(),
            "--json" => args.json = true,
            other => warn!(arg = other, "ignoring unknown argument"),
        }
    }
    args
}

#[derive(Debug, Default, Serialize)]
struct DealerSummary {
    reputation: i32,
    shipping_tier: usize,
    deals_completed: u32,
    unlocked: bool,
    debt_remaining: String,
}

#[derive(Debug, Default, Serialize)]
struct Summary {
    days: u32,
    cash: String,
    quests_completed: u32,
    quests_expired: u32,
    xp: u64,
    items: u32,
    console: Vec<String>,
    killed_by: Option<String>,
    dealers: BTreeMap<String, DealerSummary>,
}

/// Deliver exactly what the active quest asks for, optional effects included.
fn perfect_delivery(roster: &Roster) -> Option<Delivery> {
    let q = &roster.active_quest()?.quest;
    let mut effects = q.necessary_names();
    effects.extend(q.optional_names());
    Some(Delivery {
        product: q.product.clone(),
        quality: q.quality.clone(),
        amount: q.amount,
        effects,
    })
}

fn run_day(roster: &mut Roster, wallet: &mut Wallet, summary: &mut Summary) -> Result<()> {
    if roster.active_quest().is_none() {
        if let Some(index) = roster.offers().first().map(|q| q.index) {
            roster.accept_quest(index)?;
        }
    }
    if let Some(delivery) = perfect_delivery(roster) {
        let s = roster.complete_active(&delivery, wallet)?;
        summary.quests_completed += 1;
        summary.xp += u64::from(s.xp);
    }

    let names: Vec<String> = roster.catalog().dealers.iter().map(|d| d.name.clone()).collect();
    for name in &names {
        if !roster.dealer_state(name).is_some_and(|s| s.unlocked) {
            continue;
        }
        if let Err(e) = roster.claim_reward(name) {
            debug!(dealer = %name, error = %e, "no reward");
        }
        if roster.upgrade_shipping(name, wallet).is_ok() {
            info!(dealer = %name, "autopilot upgraded shipping");
        }
    }

    let commands = roster.advance_realtime(Duration::from_secs(60), wallet);
    apply_commands(commands, summary);

    let report = roster.advance_day(wallet)?;
    if report.expired.is_some() {
        summary.quests_expired += 1;
    }
    apply_commands(report.commands, summary);
    for notice in roster.drain_notices() {
        info!(dealer = %notice.dealer, kind = notice.kind.as_str(), "{}", notice.text);
    }
    Ok(())
}

fn apply_commands(commands: Vec<HostCommand>, summary: &mut Summary) {
    for cmd in commands {
        match cmd {
            HostCommand::GrantXp(xp) => summary.xp += u64::from(xp),
            HostCommand::GiveItem { quantity, .. } => summary.items += quantity,
            HostCommand::Console(c) => summary.console.push(c),
            HostCommand::KillPlayer { dealer } => summary.killed_by = Some(dealer),
        }
    }
}

/// `RUST_LOG` directives, `info` when unset or unparsable.
fn log_filter(directives: Option<&str>) -> EnvFilter {
    directives
        .and_then(|d| EnvFilter::try_new(d).ok())
        .unwrap_or_else(|| EnvFilter::new("info"))
}

fn main() -> Result<()> {
    let rust_log = std::env::var(EnvFilter::DEFAULT_ENV).ok();
    tracing_subscriber::fmt()
        .with_env_filter(log_filter(rust_log.as_deref()))
        .init();

    let args = parse_args();
    info!(
        build = env!("GIT_SHA"),
        built = env!("BUILD_DATE"),
        days = args.days,
        seed = args.seed,
        "starting CLI"
    );

    let mut loader = PackLoader::new(&args.catalog, &args.base);
    let catalog = loader
        .load()
        .with_context(|| format!("loading catalog from {}", args.catalog.display()))?;
    let mut roster = Roster::new(
        catalog,
        RosterConfig {
            rng_seed: args.seed,
            ..RosterConfig::default()
        },
    )?;
    let save = match &args.load {
        Some(slot) => Some(persistence::load_any(&persistence::default_save_path(slot))?),
        None => None,
    };
    roster.initialize(save);

    let mut wallet = Wallet::new(args.cash);
    let mut summary = Summary::default();
    for _ in 0..args.days {
        run_day(&mut roster, &mut wallet, &mut summary)?;
        if let Some(dealer) = &summary.killed_by {
            warn!(dealer = %dealer, day = roster.today(), "debt defaulted, player killed");
            break;
        }
    }

    summary.days = roster.today();
    summary.cash = wallet.balance().to_string();
    for dealer in &roster.catalog().dealers {
        if let Some(st) = roster.dealer_state(&dealer.name) {
            summary.dealers.insert(
                dealer.name.clone(),
                DealerSummary {
                    reputation: st.reputation,
                    shipping_tier: st.shipping_tier,
                    deals_completed: st.deals_completed,
                    unlocked: st.unlocked,
                    debt_remaining: st.debt.remaining.to_string(),
                },
            );
        }
    }

    if let Some(slot) = &args.save {
        persistence::save_binary(&persistence::default_save_path(slot), &roster.save_state())?;
    }

    if args.json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        println!(
            "KPI | day: {} | cash: ${} | quests: {} done, {} expired | xp: {} | items: {}",
            summary.days,
            summary.cash,
            summary.quests_completed,
            summary.quests_expired,
            summary.xp,
            summary.items
        );
        for (name, d) in &summary.dealers {
            println!(
                "  {name}: rep {} | tier {} | deals {} | debt ${}{}",
                d.reputation,
                d.shipping_tier,
                d.deals_completed,
                d.debt_remaining,
                if d.unlocked { "" } else { " | locked" }
            );
        }
        if let Some(dealer) = &summary.killed_by {
            println!("Killed by {dealer} over an unpaid debt.");
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tracing::level_filters::LevelFilter;
    use tracing_subscriber::{Layer, Registry};

    fn ceiling(filter: &EnvFilter) -> Option<LevelFilter> {
        <EnvFilter as Layer<Registry>>::max_level_hint(filter)
    }

    #[test]
    fn log_level_follows_rust_log() {
        assert_eq!(ceiling(&log_filter(None)), Some(LevelFilter::INFO));
        assert_eq!(ceiling(&log_filter(Some("warn"))), Some(LevelFilter::WARN));
        assert_eq!(ceiling(&log_filter(Some("debug"))), Some(LevelFilter::DEBUG));
    }
}
