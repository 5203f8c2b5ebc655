//! Agents: automated seat controllers used to drive simulated play.
//!
//! A [`SeatAgent`] looks at a table snapshot and proposes an action for the seat whose
//! turn it is. [`simulate_hands`] feeds those proposals through a [`TableService`]
//! exactly like remote clients would, settles each showdown with random eligible
//! winners and deals the next hand.

use crate::action::{Action, ActionRequest, CompareResult, Expected, SettleRequest};
use crate::clock::Clock;
use crate::error::{TableError, TableResult};
use crate::pot::build_pots;
use crate::rules::GameRules;
use crate::service::TableService;
use crate::store::TableStore;
use crate::table::{Identity, SeatId, Stage, Table, TableId};
use rand::seq::IndexedRandom;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// Upper bound on seat actions in one simulated hand.
const MAX_ACTIONS_PER_HAND: usize = 2_000;

/// A controller that picks an action for the seat to act.
pub trait SeatAgent {
    fn decide(&mut self, table: &Table, seat: usize) -> Action;

    /// Pick a winner selection for each pot of a showdown.
    fn pick_winners(&mut self, table: &Table) -> TableResult<Vec<Vec<SeatId>>>;
}

/// Tendencies of a [`RandomAgent`], each a probability in `0.0..=1.0`.
#[derive(Debug, Clone, PartialEq)]
pub struct AgentProfile {
    pub fold: f64,
    pub raise: f64,
    pub all_in: f64,
    pub see: f64,
    pub compare: f64,
    pub split: f64,
}

impl Default for AgentProfile {
    fn default() -> Self {
        Self { fold: 0.15, raise: 0.2, all_in: 0.02, see: 0.3, compare: 0.25, split: 0.1 }
    }
}

/// Seeded agent that plays plausible but random actions.
#[derive(Debug, Clone)]
pub struct RandomAgent {
    profile: AgentProfile,
    rng: ChaCha8Rng,
}

impl RandomAgent {
    pub fn new(seed: u64) -> Self {
        Self::with_profile(seed, AgentProfile::default())
    }

    pub fn with_profile(seed: u64, profile: AgentProfile) -> Self {
        Self { profile, rng: ChaCha8Rng::seed_from_u64(seed) }
    }

    fn roll(&mut self, p: f64) -> bool {
        self.rng.random_bool(p.clamp(0.0, 1.0))
    }

    fn texas(&mut self, table: &Table, seat: usize, bb: u64) -> Action {
        let s = &table.seats[seat];
        let current = table.current_bet();
        let owed = current.saturating_sub(s.bet);
        if self.roll(self.profile.all_in) {
            return Action::AllIn;
        }
        if owed > 0 && table.active_count() > 1 && self.roll(self.profile.fold) {
            return Action::Fold;
        }
        if self.roll(self.profile.raise) {
            let steps = self.rng.random_range(1..=3);
            return Action::Raise { to: current + bb.max(1) * steps };
        }
        if owed > 0 {
            Action::Call
        } else {
            Action::Check
        }
    }

    fn zhajinhua(&mut self, table: &Table, seat: usize) -> Action {
        let GameRules::Zhajinhua(rules) = &table.rules else {
            return Action::Call;
        };
        let round = match table.stage {
            Stage::Betting(n) => n,
            _ => table.round_id,
        };
        let s = &table.seats[seat];
        if !s.seen && round >= rules.min_see_round && self.roll(self.profile.see) {
            return Action::See;
        }
        if s.seen && round >= rules.compare_allowed_after && self.roll(self.profile.compare) {
            let others: Vec<&SeatId> = table
                .seats
                .iter()
                .enumerate()
                .filter(|&(i, o)| i != seat && o.in_hand())
                .map(|(_, o)| &o.id)
                .collect();
            if let Some(target) = others.choose(&mut self.rng) {
                let result = if self.rng.random_bool(0.5) {
                    CompareResult::Win
                } else {
                    CompareResult::Lose
                };
                return Action::Compare { target: (*target).clone(), result };
            }
        }
        if table.active_count() > 1 && self.roll(self.profile.fold) {
            return Action::Fold;
        }
        if self.roll(self.profile.raise) {
            let current = rules.base_bet.max(table.current_bet());
            return Action::Raise { to: current + rules.base_bet };
        }
        Action::Call
    }
}

impl SeatAgent for RandomAgent {
    fn decide(&mut self, table: &Table, seat: usize) -> Action {
        match &table.rules {
            GameRules::Texas(r) => self.texas(table, seat, r.blinds.bb),
            GameRules::Zhajinhua(_) => self.zhajinhua(table, seat),
        }
    }

    fn pick_winners(&mut self, table: &Table) -> TableResult<Vec<Vec<SeatId>>> {
        let pots = build_pots(&table.seats)?;
        let mut picks = Vec::with_capacity(pots.len());
        for pot in &pots {
            let mut chosen: Vec<SeatId> = Vec::new();
            if let Some(first) = pot.eligible.choose(&mut self.rng) {
                chosen.push(first.clone());
            }
            if pot.eligible.len() > 1 && self.roll(self.profile.split) {
                chosen = pot.eligible.clone();
            }
            picks.push(chosen);
        }
        Ok(picks)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SimulationReport {
    pub hands: usize,
    pub actions: usize,
    /// Actions the agent proposed that the engine rejected.
    pub rejected: usize,
    pub chips_before: u64,
    pub chips_after: u64,
}

/// Play up to `hands` full hands on an already created table.
///
/// The table is started if still in the lobby. Stops early once fewer than two
/// seats have chips.
pub fn simulate_hands<S: TableStore, C: Clock>(
    service: &TableService<S, C>,
    id: &TableId,
    host: &Identity,
    agent: &mut dyn SeatAgent,
    hands: usize,
) -> TableResult<SimulationReport> {
    let mut table = service.table(id)?;
    let mut report = SimulationReport { chips_before: table.chips_in_play(), ..Default::default() };
    if table.status == crate::table::TableStatus::Lobby {
        table = service.start(host, id)?;
    }

    while report.hands < hands {
        let mut steps = 0;
        while !table.stage.is_showdown() {
            steps += 1;
            if steps > MAX_ACTIONS_PER_HAND {
                tracing::warn!(table = %id, "hand did not finish, giving up");
                return Err(TableError::RoundOver);
            }
            table = play_turn(service, &table, agent, &mut report)?;
        }

        let winners = match agent.pick_winners(&table) {
            Ok(w) => w,
            // nobody put chips in (blind seats busted); the hand cannot be settled
            Err(TableError::NoPot) => break,
            Err(err) => return Err(err),
        };
        let settle = SettleRequest {
            table_id: id.clone(),
            expected: Expected::of(&table),
            winners_by_pot: winners,
        };
        table = service.settle(host, &settle)?;
        report.hands += 1;

        if table.seats.iter().filter(|s| s.stack > 0 && !s.left).count() < 2 {
            break;
        }
        if report.hands < hands {
            table = service.reset_round(host, id, &Expected::of(&table))?;
        }
    }
    report.chips_after = table.chips_in_play();
    tracing::info!(
        table = %id,
        hands = report.hands,
        actions = report.actions,
        "simulation finished"
    );
    Ok(report)
}

/// Ask the agent for the seat to act; fall back to call and then fold if rejected.
fn play_turn<S: TableStore, C: Clock>(
    service: &TableService<S, C>,
    table: &Table,
    agent: &mut dyn SeatAgent,
    report: &mut SimulationReport,
) -> TableResult<Table> {
    let seat = table.turn_index;
    let owner = table.seats[seat].owner.clone().ok_or(TableError::SeatUnbound)?;
    let proposed = agent.decide(table, seat);
    let mut last_err = TableError::InvalidAction;
    for action in [proposed, Action::Call, Action::Check, Action::Fold] {
        let req =
            ActionRequest { table_id: table.id.clone(), action, expected: Expected::of(table) };
        match service.act(&owner, &req) {
            Ok(next) => {
                report.actions += 1;
                return Ok(next);
            }
            Err(err) => {
                report.rejected += 1;
                last_err = err;
            }
        }
    }
    Err(last_err)
}
