//! Showdown settlement: pay each pot to its selected winners and reset the hand.

use crate::action::Expected;
use crate::error::{TableError, TableResult};
use crate::pot::{build_pots, Pot};
use crate::table::{Identity, LogEntry, LogKind, SeatId, SeatStatus, Table};
use std::collections::HashMap;

/// Split `amount` between `winners`. The first `amount % n` winners receive one extra chip.
pub fn split_pot(amount: u64, winners: &[SeatId]) -> Vec<(SeatId, u64)> {
    if winners.is_empty() {
        return Vec::new();
    }
    let n = winners.len() as u64;
    let share = amount / n;
    let mut remainder = amount % n;
    winners
        .iter()
        .map(|w| {
            let bonus = u64::from(remainder > 0);
            remainder -= bonus;
            (w.clone(), share + bonus)
        })
        .collect()
}

/// Winners of `pot` from a caller selection: eligible only, de-duplicated, in
/// selection order.
fn pot_winners(pot: &Pot, selection: &[SeatId]) -> Vec<SeatId> {
    let mut winners: Vec<SeatId> = Vec::with_capacity(selection.len());
    for id in selection {
        if pot.eligible.contains(id) && !winners.contains(id) {
            winners.push(id.clone());
        }
    }
    winners
}

/// Total award per seat for the given pots and per-pot selections.
pub fn distribute(
    pots: &[Pot],
    winners_by_pot: &[Vec<SeatId>],
) -> TableResult<HashMap<SeatId, u64>> {
    if winners_by_pot.is_empty() {
        return Err(TableError::NoWinners);
    }
    let mut awards: HashMap<SeatId, u64> = HashMap::new();
    for (i, pot) in pots.iter().enumerate() {
        let selection = winners_by_pot.get(i).map(Vec::as_slice).unwrap_or_default();
        let winners = pot_winners(pot, selection);
        if winners.is_empty() {
            return Err(TableError::NoPotWinner { pot: i });
        }
        for (id, amount) in split_pot(pot.amount, &winners) {
            *awards.entry(id).or_default() += amount;
        }
    }
    Ok(awards)
}

/// Host settles a showdown with one winner selection per pot.
pub fn settle(
    table: &Table,
    caller: &Identity,
    expected: &Expected,
    winners_by_pot: &[Vec<SeatId>],
    now: u64,
) -> TableResult<Table> {
    table.ensure_started()?;
    expected.check(table)?;
    table.ensure_host(caller)?;
    if !table.stage.is_showdown() {
        return Err(TableError::NotShowdown);
    }
    if table.settled {
        return Err(TableError::Settled);
    }
    if winners_by_pot.is_empty() {
        return Err(TableError::NoWinners);
    }
    let pots = build_pots(&table.seats)?;
    let awards = distribute(&pots, winners_by_pot)?;

    let mut next = table.clone();
    for seat in &mut next.seats {
        let award = awards.get(&seat.id).copied().unwrap_or(0);
        seat.stack += award;
        seat.bet = 0;
        seat.hand_bet = 0;
        seat.status = if seat.left {
            SeatStatus::Fold
        } else if seat.stack == 0 {
            SeatStatus::Out
        } else {
            SeatStatus::Active
        };
    }
    let entries: Vec<LogEntry> = next
        .seats
        .iter()
        .filter_map(|s| {
            let award = *awards.get(&s.id)?;
            Some(LogEntry::new(now, Some(s.id.clone()), LogKind::Payout).amount(award))
        })
        .collect();
    next.log.extend(entries);
    next.pot = 0;
    next.settled = true;
    next.turn_expires_at = None;
    Ok(next)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::Seat;

    fn ids(v: &[&str]) -> Vec<SeatId> {
        v.iter().map(|&s| SeatId::from(s)).collect()
    }

    #[test]
    fn remainder_goes_to_earliest_selected() {
        let awards = split_pot(10, &ids(&["c", "a", "b"]));
        assert_eq!(awards, vec![("c".into(), 4), ("a".into(), 3), ("b".into(), 3)]);
        assert!(split_pot(10, &[]).is_empty());
    }

    #[test]
    fn selection_is_filtered_and_deduplicated() {
        let pot = Pot { amount: 9, eligible: ids(&["a", "b"]) };
        assert_eq!(pot_winners(&pot, &ids(&["z", "b", "b", "a"])), ids(&["b", "a"]));
    }

    #[test]
    fn every_pot_needs_a_winner() {
        let pots = vec![
            Pot { amount: 30, eligible: ids(&["a", "b"]) },
            Pot { amount: 10, eligible: ids(&["a"]) },
        ];
        assert_eq!(distribute(&pots, &[]).unwrap_err(), TableError::NoWinners);
        assert_eq!(
            distribute(&pots, &[ids(&["b"])]).unwrap_err(),
            TableError::NoPotWinner { pot: 1 }
        );
        assert_eq!(
            distribute(&pots, &[ids(&["b"]), ids(&["b"])]).unwrap_err(),
            TableError::NoPotWinner { pot: 1 }
        );
        let awards = distribute(&pots, &[ids(&["a", "b"]), ids(&["a"])]).unwrap();
        assert_eq!(awards[&SeatId::from("a")], 25);
        assert_eq!(awards[&SeatId::from("b")], 15);
    }

    #[test]
    fn settled_seats_reset_by_stack_and_departure() {
        let mut t = Table::new("t1", crate::rules::GameRules::texas(), None);
        t.status = crate::table::TableStatus::Active;
        t.stage = crate::table::Stage::Showdown;
        for (id, stack, hand_bet) in [("a", 0, 50), ("b", 0, 50), ("c", 100, 50)] {
            let mut s = Seat::new(id, id, None, stack);
            s.hand_bet = hand_bet;
            t.seats.push(s);
        }
        t.seats[2].left = true;
        t.seats[2].status = SeatStatus::Fold;
        t.pot = 150;

        let done = settle(&t, &"any".into(), &Expected::default(), &[ids(&["a"])], 5).unwrap();
        assert_eq!(done.seats[0].stack, 150);
        assert_eq!(done.seats[0].status, SeatStatus::Active);
        assert_eq!(done.seats[1].status, SeatStatus::Out);
        assert_eq!(done.seats[2].status, SeatStatus::Fold);
        assert!(done.settled);
        assert_eq!(done.pot, 0);
        assert!(done.seats.iter().all(|s| s.bet == 0 && s.hand_bet == 0));

        let again = settle(&done, &"any".into(), &Expected::default(), &[ids(&["a"])], 6);
        assert_eq!(again.unwrap_err(), TableError::Settled);
    }
}
