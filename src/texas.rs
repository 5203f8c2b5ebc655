//! Texas Hold'em chip rules: blinds, fixed street sequence, no-limit raises.

use crate::action::Action;
use crate::engine::{close_betting_round, first_to_act_after, RoundEngine};
use crate::error::{TableError, TableResult};
use crate::rules::{Blinds, GameRules};
use crate::table::{index_by_offset, LogEntry, LogKind, Seat, SeatStatus, Stage, Table};

#[derive(Debug, Clone, Copy, Default)]
pub struct Texas;

/// Street that follows `stage`.
pub fn next_stage(stage: Stage) -> Stage {
    match stage {
        Stage::Preflop => Stage::Flop,
        Stage::Flop => Stage::Turn,
        Stage::Turn => Stage::River,
        Stage::River | Stage::Showdown | Stage::Betting(_) => Stage::Showdown,
    }
}

fn blinds(table: &Table) -> Blinds {
    match &table.rules {
        GameRules::Texas(r) => r.blinds,
        GameRules::Zhajinhua(_) => Blinds::default(),
    }
}

/// Move up to `amount` from stack into the round bet. Returns chips actually paid.
fn pay(seat: &mut Seat, amount: u64) -> u64 {
    let paid = amount.min(seat.stack);
    seat.stack -= paid;
    seat.bet += paid;
    seat.hand_bet += paid;
    if seat.stack == 0 {
        seat.status = SeatStatus::AllIn;
    }
    paid
}

fn post_blind(table: &mut Table, idx: usize, amount: u64, now: u64) {
    let seat = &mut table.seats[idx];
    if seat.stack == 0 {
        return;
    }
    let paid = pay(seat, amount);
    let entry =
        LogEntry::new(now, Some(seat.id.clone()), LogKind::Blind).amount(paid).bet(seat.bet);
    table.record(entry);
}

impl RoundEngine for Texas {
    fn start_hand(&self, table: &mut Table, now: u64) {
        let len = table.seats.len();
        let dealer = table.dealer_index.min(len.saturating_sub(1));
        let sb = index_by_offset(len, dealer, 1);
        let bb = index_by_offset(len, dealer, 2);
        let Blinds { sb: small, bb: big } = blinds(table);
        post_blind(table, bb, big, now);
        post_blind(table, sb, small, now);

        table.dealer_index = dealer;
        table.stage = Stage::Preflop;
        table.turn_index = table.next_active_index(bb);
    }

    fn resolve_timeout(&self, table: &Table, seat: usize) -> Action {
        if table.current_bet() > table.seats[seat].bet {
            Action::Fold
        } else {
            Action::Check
        }
    }

    fn validate(&self, table: &Table, seat: usize, action: &Action) -> TableResult<()> {
        let s = &table.seats[seat];
        let current = table.current_bet();
        match action {
            Action::Fold | Action::Call => Ok(()),
            Action::Check if current > s.bet => Err(TableError::NeedCall),
            Action::Check => Ok(()),
            Action::Raise { to } if *to < current || *to < s.bet => {
                Err(TableError::RaiseTooLow { min: current.max(s.bet), got: *to })
            }
            Action::Raise { .. } => Ok(()),
            Action::AllIn if s.stack == 0 => Err(TableError::NoStack),
            Action::AllIn => Ok(()),
            Action::See | Action::Compare { .. } | Action::Timeout => {
                Err(TableError::InvalidAction)
            }
        }
    }

    fn apply(&self, table: &mut Table, seat: usize, action: &Action, now: u64) -> LogEntry {
        let current = table.current_bet();
        let round_id = table.round_id;
        let s = &mut table.seats[seat];
        let (kind, paid) = match action {
            Action::Fold => {
                s.status = SeatStatus::Fold;
                (LogKind::Fold, 0)
            }
            Action::Check => (LogKind::Check, 0),
            Action::Call => (LogKind::Call, pay(s, current.saturating_sub(s.bet))),
            Action::Raise { to } => {
                let delta = to - s.bet;
                (LogKind::Raise, pay(s, delta))
            }
            Action::AllIn => {
                let stack = s.stack;
                (LogKind::AllIn, pay(s, stack))
            }
            // rejected by validate
            Action::See | Action::Compare { .. } | Action::Timeout => (LogKind::Check, 0),
        };
        s.acted_round = round_id;
        LogEntry::new(now, Some(s.id.clone()), kind).amount(paid).bet(s.bet)
    }

    fn next_round(&self, table: &mut Table) {
        let pooled = close_betting_round(table);
        table.pot += pooled;
        table.stage = next_stage(table.stage);
        table.round_id += 1;
        let len = table.seats.len();
        let sb = index_by_offset(len, table.dealer_index, 1);
        table.turn_index = first_to_act_after(table, sb);
        if table.stage.is_showdown() {
            table.settled = false;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::action::Expected;
    use crate::engine::{apply_action, start};
    use crate::rules::TexasRules;
    use crate::table::{Identity, TableStatus};

    fn table(stacks: &[u64]) -> Table {
        let rules = GameRules::Texas(TexasRules { action_timeout_sec: 0, ..TexasRules::default() });
        let mut t = Table::new("t1", rules, None);
        for (i, &stack) in stacks.iter().enumerate() {
            let n = i + 1;
            let owner = Some(format!("o{n}").into());
            t.add_seat(Seat::new(format!("p{n}"), "", owner, stack)).unwrap();
        }
        start(&t, &"anyone".into(), 0).unwrap()
    }

    fn act(t: &Table, action: Action) -> TableResult<Table> {
        let owner: Identity = t.seats[t.turn_index].owner.clone().unwrap();
        apply_action(t, &owner, &action, &Expected::of(t), 0)
    }

    #[test]
    fn blinds_post_and_first_turn_follows_big_blind() {
        let t = table(&[1000, 1000, 1000, 1000]);
        assert_eq!(t.status, TableStatus::Active);
        assert_eq!((t.seats[1].bet, t.seats[2].bet), (10, 20));
        assert_eq!(t.seats[2].hand_bet, 20);
        assert_eq!(t.turn_index, 3);
        assert_eq!(t.stage, Stage::Preflop);
        assert_eq!(t.turn_expires_at, None);
    }

    #[test]
    fn short_blind_goes_all_in_and_empty_seat_is_skipped() {
        let t = table(&[1000, 0, 15]);
        assert_eq!(t.seats[1].status, SeatStatus::Out);
        assert_eq!(t.seats[1].bet, 0);
        assert_eq!(t.seats[2].bet, 15);
        assert_eq!(t.seats[2].status, SeatStatus::AllIn);
        assert_eq!(t.turn_index, 0);
    }

    #[test]
    fn check_needs_matched_bet_and_raise_has_floor() {
        let t = table(&[1000, 1000, 1000]);
        assert_eq!(act(&t, Action::Check).unwrap_err(), TableError::NeedCall);
        assert_eq!(
            act(&t, Action::Raise { to: 15 }).unwrap_err(),
            TableError::RaiseTooLow { min: 20, got: 15 }
        );
        assert_eq!(act(&t, Action::See).unwrap_err(), TableError::InvalidAction);
    }

    #[test]
    fn preflop_completes_when_big_blind_checks() {
        let t = table(&[1000, 1000, 1000]);
        let t = act(&t, Action::Call).unwrap();
        let t = act(&t, Action::Call).unwrap();
        assert_eq!(t.stage, Stage::Preflop);
        assert_eq!(t.turn_index, 2);
        let t = act(&t, Action::Check).unwrap();
        assert_eq!(t.stage, Stage::Flop);
        assert_eq!(t.pot, 60);
        assert!(t.seats.iter().all(|s| s.bet == 0 && s.acted_round == 0));
        // small blind opens post-flop betting
        assert_eq!(t.turn_index, 1);
        assert_eq!(t.round_id, 2);
    }

    #[test]
    fn call_is_capped_by_stack() {
        let t = table(&[1000, 1000, 1000]);
        let t = act(&t, Action::Raise { to: 500 }).unwrap();
        let mut short = t.clone();
        short.seats[1].stack = 100;
        let t = act(&short, Action::Call).unwrap();
        assert_eq!(t.seats[1].stack, 0);
        assert_eq!(t.seats[1].bet, 110);
        assert_eq!(t.seats[1].status, SeatStatus::AllIn);
    }

    #[test]
    fn street_sequence_ends_at_showdown() {
        assert_eq!(next_stage(Stage::Preflop), Stage::Flop);
        assert_eq!(next_stage(Stage::River), Stage::Showdown);
        assert_eq!(next_stage(Stage::Showdown), Stage::Showdown);
    }
}
