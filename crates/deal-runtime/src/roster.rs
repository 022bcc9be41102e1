use crate::clock::Clock;
use crate::messaging::{compose, MessageKind, MessageParams, Notice};
use crate::rewards::{check_claim, RewardTicket, DEFAULT_REWARD_DELAY};
use crate::scheduler::Scheduler;
use crate::RuntimeError;
use chrono::Weekday;
use deal_core::{requirements_met, Catalog, DealerState, Dealer, DebtPhase, RewardKind};
use deal_econ::debt::{self, DebtError, Payment, WeeklyOutcome};
use deal_econ::{charge, EconError, Economy};
use deal_quest::{choose_product, generate_quest, Delivery, QuestDescriptor};
use rand::Rng;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Construction parameters of a [`Roster`].
#[derive(Clone, Debug, PartialEq)]
pub struct RosterConfig {
    pub rng_seed: u64,
    /// Delay between claiming a reward and its effect.
    pub reward_delay: Duration,
    /// Delay between a quest expiring and its penalty.
    pub penalty_delay: Duration,
}

impl Default for RosterConfig {
    fn default() -> Self {
        Self {
            rng_seed: 0,
            reward_delay: DEFAULT_REWARD_DELAY,
            penalty_delay: DEFAULT_REWARD_DELAY,
        }
    }
}

/// The accepted quest and its deadline.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ActiveQuest {
    pub quest: QuestDescriptor,
    pub accepted_day: u32,
    /// Last day on which the delivery is still accepted.
    pub deadline_day: u32,
}

/// Serializable progress of a roster.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct SaveState {
    pub elapsed_days: u32,
    pub dealers: BTreeMap<String, DealerState>,
    pub active: Option<ActiveQuest>,
    pub next_quest_index: u32,
}

/// Side effects the host has to carry out.
#[derive(Clone, Debug, PartialEq)]
pub enum HostCommand {
    GrantXp(u32),
    GiveItem { item: String, quantity: u32 },
    Console(String),
    /// A debt quota defaulted.
    KillPlayer { dealer: String },
}

/// Weekly debt result of one dealer.
#[derive(Clone, Debug, PartialEq)]
pub struct DebtEvent {
    pub dealer: String,
    pub outcome: WeeklyOutcome,
}

/// Everything that happened at one day boundary.
#[derive(Clone, Debug, PartialEq)]
pub struct DayReport {
    /// The day that just started.
    pub day: u32,
    pub weekday: Weekday,
    pub debt: Vec<DebtEvent>,
    pub unlocked: Vec<String>,
    /// Index of the quest that ran past its deadline.
    pub expired: Option<u32>,
    pub offers: usize,
    pub commands: Vec<HostCommand>,
}

/// Payout of a completed quest. Cash is already credited; XP is for the host.
#[derive(Clone, Debug, PartialEq)]
pub struct Settlement {
    pub dealer: String,
    pub quest: u32,
    pub cash: Decimal,
    pub rep: i32,
    pub xp: u32,
    /// Reputation after the gain.
    pub reputation: i32,
}

#[derive(Clone, Debug, PartialEq)]
enum Deferred {
    Reward { dealer: String, effect: RewardKind },
    Penalty {
        quest: QuestDescriptor,
        money: Decimal,
        rep: i32,
    },
}

type ReadyCallback = Box<dyn FnOnce(&Roster)>;

/// Owner of all dealer network state.
pub struct Roster {
    catalog: Catalog,
    config: RosterConfig,
    states: BTreeMap<String, DealerState>,
    clock: Clock,
    rng: ChaCha8Rng,
    offers: Vec<QuestDescriptor>,
    active: Option<ActiveQuest>,
    next_quest_index: u32,
    scheduler: Scheduler<Deferred>,
    notices: Vec<Notice>,
    ready: bool,
    on_ready: Vec<ReadyCallback>,
}

fn entry<'a>(
    catalog: &'a Catalog,
    states: &'a mut BTreeMap<String, DealerState>,
    name: &str,
) -> Result<(&'a Dealer, &'a mut DealerState), RuntimeError> {
    let dealer = catalog
        .dealer(name)
        .ok_or_else(|| RuntimeError::UnknownDealer(name.to_string()))?;
    let state = states
        .get_mut(name)
        .ok_or_else(|| RuntimeError::UnknownDealer(name.to_string()))?;
    Ok((dealer, state))
}

/// Roll one offer for a dealer, choosing uniformly among unlocked products.
fn roll_offer<R: Rng + ?Sized>(
    catalog: &Catalog,
    dealer: &Dealer,
    state: &DealerState,
    index: u32,
    rng: &mut R,
) -> Option<QuestDescriptor> {
    let drug = match choose_product(state, rng) {
        Some(d) => d.kind.clone(),
        None => {
            debug!(dealer = %dealer.name, "no unlocked product, no offer");
            return None;
        }
    };
    match generate_quest(catalog, dealer, state, &drug, index, rng) {
        Ok(q) => Some(q),
        Err(e) => {
            warn!(dealer = %dealer.name, error = %e, "quest generation failed");
            None
        }
    }
}

fn declined<R: Rng + ?Sized>(dealer: &Dealer, err: &EconError, rng: &mut R) -> Notice {
    let needed = match err {
        EconError::InsufficientFunds { needed, .. } => *needed,
        EconError::NegativeCost(c) => *c,
    };
    compose(
        dealer,
        MessageKind::Declined,
        MessageParams::new().with("quota", needed),
        rng,
    )
}

impl Roster {
    pub fn new(catalog: Catalog, config: RosterConfig) -> Result<Self, RuntimeError> {
        catalog.validate()?;
        Ok(Self {
            rng: ChaCha8Rng::seed_from_u64(config.rng_seed),
            catalog,
            config,
            states: BTreeMap::new(),
            clock: Clock::default(),
            offers: Vec::new(),
            active: None,
            next_quest_index: 0,
            scheduler: Scheduler::new(),
            notices: Vec::new(),
            ready: false,
            on_ready: Vec::new(),
        })
    }

    /// Build dealer states (fresh or from a save) and post today's offers.
    /// Does nothing when already initialized.
    pub fn initialize(&mut self, save: Option<SaveState>) {
        if self.ready {
            debug!("roster already initialized");
            return;
        }
        let mut save = save.unwrap_or_default();
        self.clock = Clock::new(save.elapsed_days);
        self.next_quest_index = save.next_quest_index;
        self.states.clear();
        for dealer in &self.catalog.dealers {
            let state = match save.dealers.remove(&dealer.name) {
                Some(mut st) => {
                    st.reinitialize(dealer);
                    st
                }
                None => DealerState::new(dealer),
            };
            self.states.insert(dealer.name.clone(), state);
        }
        for name in save.dealers.keys() {
            warn!(dealer = %name, "saved dealer is not in the catalog, dropping");
        }
        self.active = save
            .active
            .take()
            .filter(|a| self.states.contains_key(&a.quest.dealer));

        self.unlock_sweep();
        self.generate_offers();
        self.ready = true;
        info!(
            dealers = self.states.len(),
            day = self.clock.elapsed_days,
            offers = self.offers.len(),
            "roster ready"
        );
        for callback in std::mem::take(&mut self.on_ready) {
            callback(&*self);
        }
    }

    /// Run `callback` once the roster is ready; immediately if it already is.
    pub fn on_ready<F>(&mut self, callback: F)
    where
        F: FnOnce(&Roster) + 'static,
    {
        if self.ready {
            callback(&*self);
        } else {
            self.on_ready.push(Box::new(callback));
        }
    }

    /// Drop all progress. Queued readiness callbacks are kept.
    pub fn reset(&mut self) {
        self.states.clear();
        self.clock = Clock::default();
        self.offers.clear();
        self.active = None;
        self.next_quest_index = 0;
        self.scheduler.clear();
        self.notices.clear();
        self.ready = false;
        info!("roster reset");
    }

    /// Swap in a new catalog, keeping the progress of dealers it still has.
    pub fn reload_catalog(&mut self, catalog: Catalog) -> Result<(), RuntimeError> {
        catalog.validate()?;
        let save = self.save_state();
        self.catalog = catalog;
        self.ready = false;
        self.initialize(Some(save));
        Ok(())
    }

    pub fn is_ready(&self) -> bool {
        self.ready
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn config(&self) -> &RosterConfig {
        &self.config
    }

    pub fn clock(&self) -> Clock {
        self.clock
    }

    pub fn today(&self) -> u32 {
        self.clock.elapsed_days
    }

    pub fn dealer_state(&self, name: &str) -> Option<&DealerState> {
        self.states.get(name)
    }

    pub fn offers(&self) -> &[QuestDescriptor] {
        &self.offers
    }

    pub fn active_quest(&self) -> Option<&ActiveQuest> {
        self.active.as_ref()
    }

    /// Delayed effects not yet fired.
    pub fn pending_effects(&self) -> usize {
        self.scheduler.pending()
    }

    fn ensure_ready(&self) -> Result<(), RuntimeError> {
        if self.ready {
            Ok(())
        } else {
            Err(RuntimeError::NotReady)
        }
    }

    /// Reveal every dealer whose requirements are now met.
    fn unlock_sweep(&mut self) -> Vec<String> {
        let reps: BTreeMap<String, i32> = self
            .states
            .iter()
            .map(|(n, s)| (n.clone(), s.reputation))
            .collect();
        let mut newly = Vec::new();
        for dealer in &self.catalog.dealers {
            let Some(state) = self.states.get_mut(&dealer.name) else {
                continue;
            };
            if state.unlocked || !state.initialized {
                continue;
            }
            if requirements_met(dealer, |n| reps.get(n).copied()) {
                state.unlocked = true;
                info!(dealer = %dealer.name, "dealer unlocked");
                self.notices.push(compose(
                    dealer,
                    MessageKind::Unlock,
                    MessageParams::new(),
                    &mut self.rng,
                ));
                newly.push(dealer.name.clone());
            }
        }
        newly
    }

    /// Replace today's offers with one per eligible dealer.
    fn generate_offers(&mut self) {
        self.offers.clear();
        let weekday = self.clock.weekday();
        for dealer in &self.catalog.dealers {
            let Some(state) = self.states.get(&dealer.name) else {
                continue;
            };
            if !state.initialized || !state.unlocked || !dealer.deals_on(weekday) {
                continue;
            }
            let index = self.next_quest_index;
            if let Some(quest) = roll_offer(&self.catalog, dealer, state, index, &mut self.rng) {
                self.next_quest_index += 1;
                self.offers.push(quest);
            }
        }
    }

    /// Weekly collection for every dealer with an outstanding debt.
    fn weekly_debt<E: Economy + ?Sized>(&mut self, economy: &mut E) -> Vec<DebtEvent> {
        let day = self.clock.elapsed_days;
        let mut events = Vec::new();
        for dealer in &self.catalog.dealers {
            let Some(params) = dealer.debt.as_ref() else {
                continue;
            };
            let Some(state) = self.states.get_mut(&dealer.name) else {
                continue;
            };
            if state.debt.phase() != DebtPhase::Active {
                continue;
            }
            let outcome = match debt::weekly_tick(params, &mut state.debt, &mut *economy, day) {
                Ok(o) => o,
                Err(e) => {
                    warn!(dealer = %dealer.name, error = %e, "weekly debt tick failed");
                    continue;
                }
            };
            let notice = match &outcome {
                WeeklyOutcome::Settled(s) if s.remaining.is_zero() => {
                    compose(dealer, MessageKind::DebtCleared, MessageParams::new(), &mut self.rng)
                }
                WeeklyOutcome::Settled(s) => compose(
                    dealer,
                    MessageKind::Debt,
                    MessageParams::new()
                        .with("paid", s.paid_this_week)
                        .with("remaining", s.remaining)
                        .with("quota", s.next_quota),
                    &mut self.rng,
                ),
                WeeklyOutcome::Defaulted { due, remaining, .. } => compose(
                    dealer,
                    MessageKind::DebtDefault,
                    MessageParams::new()
                        .with("quota", due)
                        .with("remaining", remaining),
                    &mut self.rng,
                ),
                WeeklyOutcome::Cleared => {
                    compose(dealer, MessageKind::DebtCleared, MessageParams::new(), &mut self.rng)
                }
            };
            self.notices.push(notice);
            events.push(DebtEvent {
                dealer: dealer.name.clone(),
                outcome,
            });
        }
        events
    }

    /// Drop the active quest once its deadline has passed and schedule the penalty.
    fn expire_active(&mut self) -> Option<u32> {
        let today = self.clock.elapsed_days;
        if !self.active.as_ref().is_some_and(|a| today > a.deadline_day) {
            return None;
        }
        let active = self.active.take()?;
        let quest = active.quest;
        warn!(
            dealer = %quest.dealer,
            quest = quest.index,
            deadline = active.deadline_day,
            "quest expired"
        );
        self.scheduler.schedule(
            self.config.penalty_delay,
            Deferred::Penalty {
                money: Decimal::from(quest.money_penalty.max(0)),
                rep: quest.rep_penalty.max(0),
                quest: quest.clone(),
            },
        );
        if let Some(dealer) = self.catalog.dealer(&quest.dealer) {
            self.notices.push(compose(
                dealer,
                MessageKind::Expire,
                MessageParams::for_quest(&quest),
                &mut self.rng,
            ));
        }
        Some(quest.index)
    }

    /// Finish the current day and start the next one.
    pub fn advance_day<E: Economy + ?Sized>(
        &mut self,
        economy: &mut E,
    ) -> Result<DayReport, RuntimeError> {
        self.ensure_ready()?;
        let debt = if self.clock.closes_week() {
            self.weekly_debt(economy)
        } else {
            Vec::new()
        };
        let commands = debt
            .iter()
            .filter(|e| matches!(e.outcome, WeeklyOutcome::Defaulted { .. }))
            .map(|e| HostCommand::KillPlayer {
                dealer: e.dealer.clone(),
            })
            .collect();

        self.clock.advance();
        let unlocked = self.unlock_sweep();
        let expired = self.expire_active();
        self.generate_offers();
        let report = DayReport {
            day: self.clock.elapsed_days,
            weekday: self.clock.weekday(),
            debt,
            unlocked,
            expired,
            offers: self.offers.len(),
            commands,
        };
        info!(
            day = report.day,
            weekday = ?report.weekday,
            offers = report.offers,
            "day started"
        );
        Ok(report)
    }

    /// Take an offer as the active quest.
    pub fn accept_quest(&mut self, index: u32) -> Result<&ActiveQuest, RuntimeError> {
        self.ensure_ready()?;
        if self.active.is_some() {
            return Err(RuntimeError::QuestInProgress);
        }
        let pos = self
            .offers
            .iter()
            .position(|q| q.index == index)
            .ok_or(RuntimeError::UnknownOffer(index))?;
        let quest = self.offers.remove(pos);
        let today = self.clock.elapsed_days;
        if let Some(dealer) = self.catalog.dealer(&quest.dealer) {
            self.notices.push(compose(
                dealer,
                MessageKind::Accept,
                MessageParams::for_quest(&quest),
                &mut self.rng,
            ));
        }
        info!(dealer = %quest.dealer, quest = quest.index, amount = quest.amount, "quest accepted");
        Ok(self.active.insert(ActiveQuest {
            deadline_day: today.saturating_add(quest.deadline_days()),
            accepted_day: today,
            quest,
        }))
    }

    /// Abandon the active quest without penalty.
    pub fn cancel_active(&mut self) -> Option<ActiveQuest> {
        let cancelled = self.active.take();
        if let Some(a) = &cancelled {
            info!(dealer = %a.quest.dealer, quest = a.quest.index, "quest cancelled");
        }
        cancelled
    }

    /// Hand in a delivery for the active quest.
    pub fn complete_active<E: Economy + ?Sized>(
        &mut self,
        delivery: &Delivery,
        economy: &mut E,
    ) -> Result<Settlement, RuntimeError> {
        self.ensure_ready()?;
        let active = self.active.as_ref().ok_or(RuntimeError::NoActiveQuest)?;
        let reward = active.quest.settle(delivery)?;
        let name = active.quest.dealer.clone();
        let index = active.quest.index;
        let params = MessageParams::for_quest(&active.quest).with("paid", reward.cash);
        let (dealer, state) = entry(&self.catalog, &mut self.states, &name)?;

        economy.change_balance(reward.cash);
        let reputation = state.change_reputation(dealer, reward.rep);
        state.deals_completed += 1;
        self.notices.push(compose(
            dealer,
            MessageKind::Success,
            params,
            &mut self.rng,
        ));
        self.active = None;
        info!(dealer = %name, quest = index, cash = %reward.cash, reputation, "quest completed");
        self.unlock_sweep();
        Ok(Settlement {
            dealer: name,
            quest: index,
            cash: reward.cash,
            rep: reward.rep,
            xp: reward.xp,
            reputation,
        })
    }

    /// Pay the dealer's refresh cost for a new offer. Returns its index.
    pub fn refresh_offers<E: Economy + ?Sized>(
        &mut self,
        name: &str,
        economy: &mut E,
    ) -> Result<Option<u32>, RuntimeError> {
        self.ensure_ready()?;
        let (dealer, state) = entry(&self.catalog, &mut self.states, name)?;
        if !state.unlocked {
            return Err(RuntimeError::DealerLocked(name.to_string()));
        }
        if let Err(e) = charge(economy, dealer.refresh_cost) {
            self.notices.push(declined(dealer, &e, &mut self.rng));
            return Err(e.into());
        }
        self.offers.retain(|q| q.dealer != name);
        let index = self.next_quest_index;
        let quest = roll_offer(&self.catalog, dealer, state, index, &mut self.rng);
        let fresh = quest.as_ref().map(|q| q.index);
        if let Some(q) = quest {
            self.next_quest_index += 1;
            self.offers.push(q);
        }
        self.notices.push(compose(
            dealer,
            MessageKind::Refresh,
            MessageParams::new(),
            &mut self.rng,
        ));
        debug!(dealer = %name, cost = %dealer.refresh_cost, "offers refreshed");
        Ok(fresh)
    }

    /// Move to the next shipping tier. Returns the new tier index.
    pub fn upgrade_shipping<E: Economy + ?Sized>(
        &mut self,
        name: &str,
        economy: &mut E,
    ) -> Result<usize, RuntimeError> {
        self.ensure_ready()?;
        let (dealer, state) = entry(&self.catalog, &mut self.states, name)?;
        let next = state.shipping_tier + 1;
        let tier = dealer
            .shippings
            .get(next)
            .ok_or_else(|| RuntimeError::MaxShippingTier(name.to_string()))?;
        if state.reputation < tier.unlock_rep {
            return Err(RuntimeError::InsufficientReputation {
                have: state.reputation,
                need: tier.unlock_rep,
            });
        }
        if let Err(e) = charge(economy, tier.cost) {
            self.notices.push(declined(dealer, &e, &mut self.rng));
            return Err(e.into());
        }
        state.set_shipping_tier(dealer, next);
        self.notices.push(compose(
            dealer,
            MessageKind::Shipping,
            MessageParams::new().with("tier", &tier.name),
            &mut self.rng,
        ));
        info!(dealer = %name, tier = %tier.name, "shipping upgraded");
        Ok(state.shipping_tier)
    }

    /// Buy reputation with the dealer's gift. Returns the new reputation.
    pub fn give_gift<E: Economy + ?Sized>(
        &mut self,
        name: &str,
        economy: &mut E,
    ) -> Result<i32, RuntimeError> {
        self.ensure_ready()?;
        let (dealer, state) = entry(&self.catalog, &mut self.states, name)?;
        let gift = dealer
            .gift
            .as_ref()
            .ok_or_else(|| RuntimeError::NoGift(name.to_string()))?;
        if let Err(e) = charge(economy, gift.cost) {
            self.notices.push(declined(dealer, &e, &mut self.rng));
            return Err(e.into());
        }
        let reputation = state.change_reputation(dealer, gift.rep);
        self.notices.push(compose(
            dealer,
            MessageKind::Gift,
            MessageParams::new(),
            &mut self.rng,
        ));
        debug!(dealer = %name, reputation, "gift given");
        self.unlock_sweep();
        Ok(reputation)
    }

    /// Pay toward a dealer's debt right away.
    pub fn pay_debt<E: Economy + ?Sized>(
        &mut self,
        name: &str,
        amount: Decimal,
        economy: &mut E,
    ) -> Result<Payment, RuntimeError> {
        self.ensure_ready()?;
        let (dealer, state) = entry(&self.catalog, &mut self.states, name)?;
        let payment = match debt::pay(&mut state.debt, economy, amount) {
            Ok(p) => p,
            Err(DebtError::InsufficientFunds { needed, available }) => {
                let e = EconError::InsufficientFunds { needed, available };
                self.notices.push(declined(dealer, &e, &mut self.rng));
                return Err(DebtError::InsufficientFunds { needed, available }.into());
            }
            Err(e) => return Err(e.into()),
        };
        if payment.cleared {
            info!(dealer = %name, "debt cleared");
            self.notices.push(compose(
                dealer,
                MessageKind::DebtCleared,
                MessageParams::new(),
                &mut self.rng,
            ));
        }
        Ok(payment)
    }

    /// Whether this week's quota is already covered by manual payments.
    pub fn debt_quota_met(&self, name: &str) -> Result<bool, RuntimeError> {
        let dealer = self
            .catalog
            .dealer(name)
            .ok_or_else(|| RuntimeError::UnknownDealer(name.to_string()))?;
        let state = self
            .states
            .get(name)
            .ok_or_else(|| RuntimeError::UnknownDealer(name.to_string()))?;
        let params = dealer.debt.as_ref().ok_or(DebtError::NoDebt)?;
        Ok(debt::quota_met(params, &state.debt, self.clock.elapsed_days)?)
    }

    /// Claim the dealer's daily favor. The effect fires after the reward delay.
    pub fn claim_reward(&mut self, name: &str) -> Result<RewardTicket, RuntimeError> {
        self.ensure_ready()?;
        let today = self.clock.elapsed_days;
        let (dealer, state) = entry(&self.catalog, &mut self.states, name)?;
        let reward = check_claim(dealer, state, today)?;
        state.change_reputation(dealer, reward.rep_cost.saturating_neg());
        state.last_reward_day = Some(today);
        let fires_at = self.scheduler.schedule(
            self.config.reward_delay,
            Deferred::Reward {
                dealer: name.to_string(),
                effect: reward.effect.clone(),
            },
        );
        self.notices.push(compose(
            dealer,
            MessageKind::Reward,
            MessageParams::new(),
            &mut self.rng,
        ));
        info!(dealer = %name, rep_cost = reward.rep_cost, "reward claimed");
        Ok(RewardTicket {
            dealer: name.to_string(),
            effect: reward.effect.clone(),
            rep_cost: reward.rep_cost,
            fires_at,
        })
    }

    /// Mark the dealer's introduction as seen.
    pub fn mark_intro_done(&mut self, name: &str) -> Result<(), RuntimeError> {
        let state = self
            .states
            .get_mut(name)
            .ok_or_else(|| RuntimeError::UnknownDealer(name.to_string()))?;
        state.intro_done = true;
        Ok(())
    }

    /// Advance the timer queue. Cash and penalties are applied here; the
    /// rest is returned for the host.
    pub fn advance_realtime<E: Economy + ?Sized>(
        &mut self,
        dt: Duration,
        economy: &mut E,
    ) -> Vec<HostCommand> {
        let mut commands = Vec::new();
        for task in self.scheduler.advance(dt) {
            match task {
                Deferred::Reward { dealer, effect } => {
                    debug!(dealer = %dealer, ?effect, "reward fired");
                    match effect {
                        RewardKind::Cash { amount } => economy.change_balance(amount),
                        RewardKind::Xp { amount } => commands.push(HostCommand::GrantXp(amount)),
                        RewardKind::Item { item, quantity } => {
                            commands.push(HostCommand::GiveItem { item, quantity })
                        }
                        RewardKind::Console { command } => {
                            commands.push(HostCommand::Console(command))
                        }
                    }
                }
                Deferred::Penalty { quest, money, rep } => {
                    economy.change_balance(-money);
                    if let Ok((d, state)) = entry(&self.catalog, &mut self.states, &quest.dealer) {
                        state.change_reputation(d, -rep);
                        self.notices.push(compose(
                            d,
                            MessageKind::Fail,
                            MessageParams::for_quest(&quest),
                            &mut self.rng,
                        ));
                    }
                    warn!(dealer = %quest.dealer, quest = quest.index, %money, rep, "quest penalty applied");
                }
            }
        }
        commands
    }

    /// Take every message produced since the last call.
    pub fn drain_notices(&mut self) -> Vec<Notice> {
        std::mem::take(&mut self.notices)
    }

    pub fn save_state(&self) -> SaveState {
        SaveState {
            elapsed_days: self.clock.elapsed_days,
            dealers: self.states.clone(),
            active: self.active.clone(),
            next_quest_index: self.next_quest_index,
        }
    }
}
