//! Zhajinhua (three-card brag) chip rules.
//!
//! Chips are tracked twice: `bet` holds the nominal stake that seats compare against,
//! `hand_bet` the real chips removed from the stack. A seat that has seen its cards
//! pays double real chips for every nominal chip.

use crate::action::{Action, CompareResult};
use crate::engine::{close_betting_round, first_to_act_after, RoundEngine};
use crate::error::{TableError, TableResult};
use crate::rules::{GameRules, ZhajinhuaRules};
use crate::table::{LogEntry, LogKind, Seat, SeatStatus, Stage, Table};

#[derive(Debug, Clone, Copy, Default)]
pub struct Zhajinhua;

fn rules(table: &Table) -> ZhajinhuaRules {
    match &table.rules {
        GameRules::Zhajinhua(r) => r.clone(),
        GameRules::Texas(_) => ZhajinhuaRules::default(),
    }
}

fn betting_round(table: &Table) -> u32 {
    match table.stage {
        Stage::Betting(n) => n,
        _ => table.round_id,
    }
}

/// Nominal bet every seat has to match this round; never below the base bet.
pub fn current_bet(table: &Table) -> u64 {
    rules(table).base_bet.max(table.current_bet())
}

/// Pay `nominal` chips, doubled for a seen seat and capped at the stack.
/// Returns the real chips paid.
pub fn pay_nominal(seat: &mut Seat, nominal: u64) -> u64 {
    let want = if seat.seen { nominal.saturating_mul(2) } else { nominal };
    pay_real(seat, want)
}

fn pay_real(seat: &mut Seat, real: u64) -> u64 {
    let paid = real.min(seat.stack);
    seat.stack -= paid;
    seat.bet += if seat.seen { paid / 2 } else { paid };
    seat.hand_bet += paid;
    if seat.stack == 0 {
        seat.status = SeatStatus::AllIn;
    }
    paid
}

/// Whether the dark-compare restriction blocks a compare right now.
fn dark_compare_blocked(table: &Table, rules: &ZhajinhuaRules) -> bool {
    if !rules.compare_requires_all_seen {
        return false;
    }
    let in_hand: Vec<&Seat> = table.seats.iter().filter(|s| s.in_hand()).collect();
    if in_hand.iter().all(|s| s.seen) {
        return false;
    }
    !(in_hand.len() == 2 && rules.allow_heads_up_mixed_compare)
}

impl Zhajinhua {
    fn pay_antes(&self, table: &mut Table, base: u64, now: u64) {
        let active = table.active_count() as u64;
        let sponsor = table
            .next_ante_sponsor
            .take()
            .and_then(|id| table.seat_index(&id))
            .filter(|&i| table.seats[i].is_active());

        let payers: Vec<usize> = match sponsor {
            Some(i) => vec![i],
            None => (0..table.seats.len()).filter(|&i| table.seats[i].is_active()).collect(),
        };
        let due = if sponsor.is_some() { base.saturating_mul(active) } else { base };
        for i in payers {
            let seat = &mut table.seats[i];
            // antes go straight to the hand total; the round bet starts at zero
            let paid = due.min(seat.stack);
            seat.stack -= paid;
            seat.hand_bet += paid;
            if seat.stack == 0 {
                seat.status = SeatStatus::AllIn;
            }
            let mut entry = LogEntry::new(now, Some(seat.id.clone()), LogKind::Ante).amount(paid);
            if sponsor.is_some() {
                entry = entry.note("sponsor");
            }
            table.record(entry);
        }
    }
}

impl RoundEngine for Zhajinhua {
    fn start_hand(&self, table: &mut Table, now: u64) {
        let base = rules(table).base_bet;
        self.pay_antes(table, base, now);
        let len = table.seats.len();
        table.dealer_index = table.dealer_index.min(len.saturating_sub(1));
        table.stage = Stage::Betting(1);
        table.round_id = 1;
        table.turn_index = first_to_act_after(table, table.dealer_index);
    }

    fn resolve_timeout(&self, _table: &Table, _seat: usize) -> Action {
        Action::Fold
    }

    fn validate(&self, table: &Table, seat: usize, action: &Action) -> TableResult<()> {
        let r = rules(table);
        let s = &table.seats[seat];
        let round = betting_round(table);
        match action {
            Action::Fold | Action::Call => Ok(()),
            Action::See if round < r.min_see_round || s.seen => Err(TableError::CannotSee),
            Action::See => Ok(()),
            Action::Raise { to } => {
                let min = current_bet(table) + r.base_bet;
                if *to < min || *to < s.bet {
                    return Err(TableError::RaiseTooLow { min: min.max(s.bet), got: *to });
                }
                Ok(())
            }
            Action::AllIn if s.stack == 0 => Err(TableError::NoStack),
            Action::AllIn => Ok(()),
            Action::Compare { target, .. } => {
                if !s.seen || round < r.compare_allowed_after {
                    return Err(TableError::CannotCompare);
                }
                if dark_compare_blocked(table, &r) {
                    return Err(TableError::CannotCompareDark);
                }
                match table.seat_index(target) {
                    Some(t) if t != seat && table.seats[t].in_hand() => Ok(()),
                    _ => Err(TableError::InvalidTarget),
                }
            }
            Action::Check | Action::Timeout => Err(TableError::InvalidAction),
        }
    }

    fn apply(&self, table: &mut Table, seat: usize, action: &Action, now: u64) -> LogEntry {
        let current = current_bet(table);
        let round = betting_round(table);
        let target_idx = match action {
            Action::Compare { target, .. } => table.seat_index(target),
            _ => None,
        };

        let s = &mut table.seats[seat];
        let call_need = current.saturating_sub(s.bet);
        let (kind, paid) = match action {
            Action::Fold => {
                s.status = SeatStatus::Fold;
                (LogKind::Fold, 0)
            }
            Action::See => {
                s.seen = true;
                (LogKind::See, 0)
            }
            Action::Call => (LogKind::Call, pay_nominal(s, call_need)),
            Action::Raise { to } => {
                let delta = to - s.bet;
                (LogKind::Raise, pay_nominal(s, delta))
            }
            Action::AllIn => {
                let stack = s.stack;
                (LogKind::AllIn, pay_real(s, stack))
            }
            Action::Compare { result, .. } => {
                let paid = pay_nominal(s, call_need);
                if *result == CompareResult::Lose {
                    s.status = SeatStatus::Fold;
                }
                (LogKind::Compare, paid)
            }
            // rejected by validate
            Action::Check | Action::Timeout => (LogKind::Check, 0),
        };
        s.acted_round = round;
        let mut entry = LogEntry::new(now, Some(s.id.clone()), kind).amount(paid).bet(s.bet);

        if let Action::Compare { target, result } = action {
            if *result == CompareResult::Win {
                if let Some(t) = target_idx {
                    table.seats[t].status = SeatStatus::Fold;
                }
            }
            entry.target = Some(target.clone());
            entry.result = Some(*result);
        }
        entry
    }

    fn next_round(&self, table: &mut Table) {
        let r = rules(table);
        let next = betting_round(table) + 1;
        close_betting_round(table);
        table.round_id = next;
        if next >= r.max_rounds {
            table.stage = Stage::Showdown;
            table.settled = false;
            table.turn_index =
                table.seats.iter().position(|s| s.in_hand()).unwrap_or(table.turn_index);
            return;
        }
        table.stage = Stage::Betting(next);
        table.turn_index = first_to_act_after(table, table.dealer_index);
    }

    fn sync_pot(&self, table: &mut Table) {
        table.pot = table.seats.iter().map(|s| s.hand_bet).sum();
    }
}
