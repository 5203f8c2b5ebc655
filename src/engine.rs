//! Turn and round engine.
//!
//! Every operation here is a pure step `(&Table, request) -> Result<Table, TableError>`:
//! work happens on a clone that is only returned on success, so a rejected request
//! leaves the caller's table untouched. Variant rules plug in through [`RoundEngine`].

use crate::action::{Action, Expected};
use crate::error::{TableError, TableResult};
use crate::rules::Variant;
use crate::table::{
    index_by_offset, Identity, LogEntry, LogKind, Seat, SeatId, SeatStatus, Stage, Table,
    TableStatus,
};
use crate::texas::Texas;
use crate::zhajinhua::Zhajinhua;

/// Rule set of one game variant.
pub trait RoundEngine {
    /// Deal a new hand on a table whose seats have already been reset.
    fn start_hand(&self, table: &mut Table, now: u64);

    /// Concrete action the seat at `seat` takes when its deadline passes.
    fn resolve_timeout(&self, table: &Table, seat: usize) -> Action;

    /// Variant legality checks for `action` by the seat at `seat`.
    fn validate(&self, table: &Table, seat: usize, action: &Action) -> TableResult<()>;

    /// Move chips and statuses for an already validated action.
    fn apply(&self, table: &mut Table, seat: usize, action: &Action, now: u64) -> LogEntry;

    /// Close the current betting round and open the next one (or showdown).
    fn next_round(&self, table: &mut Table);

    /// Recompute derived totals after chips moved.
    fn sync_pot(&self, _table: &mut Table) {}
}

pub fn rules_for(variant: Variant) -> &'static dyn RoundEngine {
    match variant {
        Variant::Texas => &Texas,
        Variant::Zhajinhua => &Zhajinhua,
    }
}

/// Apply one seat action requested by `caller`.
pub fn apply_action(
    table: &Table,
    caller: &Identity,
    action: &Action,
    expected: &Expected,
    now: u64,
) -> TableResult<Table> {
    table.ensure_started()?;
    expected.check(table)?;
    if table.stage.is_showdown() {
        return Err(TableError::RoundOver);
    }
    if table.seats.is_empty() {
        return Err(TableError::NotActive);
    }
    let turn = table.turn_index.min(table.seats.len() - 1);
    let seat = &table.seats[turn];
    if !seat.is_active() {
        return Err(TableError::NotActive);
    }
    let owner = seat.owner.as_ref().ok_or(TableError::SeatUnbound)?;

    let engine = rules_for(table.variant());
    let resolved = if matches!(action, Action::Timeout) {
        // anyone may flag an expired turn
        match table.turn_expires_at {
            Some(deadline) if now >= deadline => engine.resolve_timeout(table, turn),
            _ => return Err(TableError::NotTimeout),
        }
    } else {
        if owner != caller {
            return Err(TableError::NotOwner);
        }
        if matches!(action, Action::Fold) && table.active_count() <= 1 {
            return Err(TableError::LastPlayer);
        }
        action.clone()
    };
    engine.validate(table, turn, &resolved)?;

    let mut next = table.clone();
    let mut entry = engine.apply(&mut next, turn, &resolved, now);
    if matches!(action, Action::Timeout) {
        entry = entry.note("timeout");
    }
    next.record(entry);
    after_action(engine, &mut next, turn, now);
    Ok(next)
}

/// Shared round-advancement rule run after every committed seat action.
fn after_action(engine: &dyn RoundEngine, table: &mut Table, actor: usize, now: u64) {
    if hand_is_decided(table) {
        force_showdown(table, actor);
    } else if table.auto_stage && round_is_complete(table) {
        engine.next_round(table);
        table.record(LogEntry::new(now, None, LogKind::StageAdvance).note(table.stage.label()));
    } else {
        table.turn_index = table.next_active_index(actor);
    }
    engine.sync_pot(table);
    refresh_deadline(table, now);
}

/// One contestant left, or nobody can act any more.
pub(crate) fn hand_is_decided(table: &Table) -> bool {
    let in_hand = table.in_hand_count();
    in_hand <= 1 || table.active_count() == 0
}

/// Every active seat matched the current bet and acted in this round.
pub(crate) fn round_is_complete(table: &Table) -> bool {
    let current = table.current_bet();
    table
        .seats
        .iter()
        .filter(|s| s.is_active())
        .all(|s| s.bet == current && s.acted_round == table.round_id)
}

/// Zero round-scoped fields and re-derive in-hand statuses. Returns the chips that
/// were sitting in `bet`.
pub(crate) fn close_betting_round(table: &mut Table) -> u64 {
    let mut pooled = 0;
    for seat in &mut table.seats {
        pooled += seat.bet;
        seat.bet = 0;
        seat.acted_round = 0;
        if seat.in_hand() {
            seat.status = if seat.stack > 0 { SeatStatus::Active } else { SeatStatus::AllIn };
        }
    }
    pooled
}

/// Jump straight to showdown. Live bets are pooled so settlement sees each chip once.
pub(crate) fn force_showdown(table: &mut Table, fallback_turn: usize) {
    let pooled = close_betting_round(table);
    if table.variant() == Variant::Texas {
        table.pot += pooled;
    }
    table.stage = Stage::Showdown;
    table.round_id += 1;
    table.settled = false;
    table.turn_index = table.seats.iter().position(|s| s.in_hand()).unwrap_or(fallback_turn);
}

pub(crate) fn refresh_deadline(table: &mut Table, now: u64) {
    let has_turn = table.active_count() > 0;
    table.turn_expires_at = table.turn_deadline(now, has_turn);
}

/// Reset seats and deal a hand with the variant rules; settle immediately if the
/// deal leaves nobody able to act.
fn deal(table: &mut Table, now: u64) {
    for seat in &mut table.seats {
        seat.reset_for_hand();
    }
    table.pot = 0;
    table.settled = false;
    table.round_id = 1;
    let engine = rules_for(table.variant());
    engine.start_hand(table, now);
    engine.sync_pot(table);
    if hand_is_decided(table) {
        let turn = table.turn_index;
        force_showdown(table, turn);
    }
    refresh_deadline(table, now);
}

/// Host starts a seated lobby table and deals the first hand.
pub fn start(table: &Table, caller: &Identity, now: u64) -> TableResult<Table> {
    if table.status != TableStatus::Lobby {
        return Err(TableError::RoomStarted);
    }
    table.ensure_host(caller)?;
    if table.seats.len() < 2 {
        return Err(TableError::NeedPlayers);
    }
    let mut next = table.clone();
    next.status = TableStatus::Active;
    next.dealer_index = 0;
    next.log.clear();
    deal(&mut next, now);
    Ok(next)
}

/// Host deals the next hand after a settled showdown. Seats that left are dropped and
/// the dealer button moves to the next remaining seat.
pub fn reset_round(
    table: &Table,
    caller: &Identity,
    expected: &Expected,
    now: u64,
) -> TableResult<Table> {
    table.ensure_started()?;
    expected.check(table)?;
    if !table.stage.is_showdown() || !table.settled {
        return Err(TableError::NotSettled);
    }
    table.ensure_host(caller)?;

    let mut next = table.clone();
    let len = next.seats.len();
    let start = next.dealer_index.min(len.saturating_sub(1));
    let next_dealer: Option<SeatId> = (1..=len)
        .map(|offset| &next.seats[(start + offset) % len])
        .find(|s| !s.left)
        .map(|s| s.id.clone());
    next.seats.retain(|s| !s.left);
    if next.seats.len() < 2 {
        return Err(TableError::NeedPlayers);
    }
    next.dealer_index = next_dealer.and_then(|id| next.seat_index(&id)).unwrap_or(0);
    deal(&mut next, now);
    Ok(next)
}

/// Host closes the current betting round by hand when auto-advance is off.
pub fn advance_stage(
    table: &Table,
    caller: &Identity,
    expected: &Expected,
    now: u64,
) -> TableResult<Table> {
    table.ensure_started()?;
    expected.check(table)?;
    table.ensure_host(caller)?;
    if table.stage.is_showdown() {
        return Err(TableError::RoundOver);
    }
    let current = table.current_bet();
    let active: Vec<&Seat> = table.seats.iter().filter(|s| s.is_active()).collect();
    if active.iter().any(|s| s.bet != current) {
        return Err(TableError::NotEqual);
    }
    if active.iter().any(|s| s.acted_round != table.round_id) {
        return Err(TableError::NotActed);
    }

    let mut next = table.clone();
    let engine = rules_for(next.variant());
    if hand_is_decided(&next) {
        let turn = next.turn_index;
        force_showdown(&mut next, turn);
    } else {
        engine.next_round(&mut next);
    }
    engine.sync_pot(&mut next);
    next.record(LogEntry::new(now, None, LogKind::StageAdvance).note(next.stage.label()));
    refresh_deadline(&mut next, now);
    Ok(next)
}

/// A participant walks away. In the lobby the seat is removed; during play it folds,
/// is flagged `left` and dropped at the next deal. The host has to stay.
pub fn leave_seat(table: &Table, caller: &Identity, now: u64) -> TableResult<Table> {
    if table.host.as_ref() == Some(caller) {
        return Err(TableError::HostCannotLeave);
    }
    let idx = table.seat_of(caller).ok_or(TableError::NotFound)?;
    let mut next = table.clone();
    if next.status == TableStatus::Lobby {
        next.seats.remove(idx);
        let last = next.seats.len().saturating_sub(1);
        next.dealer_index = next.dealer_index.min(last);
        next.turn_index = next.turn_index.min(last);
        return Ok(next);
    }
    if next.seats[idx].left {
        return Ok(next);
    }

    let seat = &mut next.seats[idx];
    seat.status = SeatStatus::Fold;
    seat.left = true;
    let id = seat.id.clone();
    next.record(LogEntry::new(now, Some(id), LogKind::Leave));

    if !next.stage.is_showdown() {
        if hand_is_decided(&next) {
            force_showdown(&mut next, idx);
        } else if next.turn_index == idx {
            next.turn_index = next.next_active_index(idx);
        }
        rules_for(next.variant()).sync_pot(&mut next);
        refresh_deadline(&mut next, now);
    }
    Ok(next)
}

pub fn set_auto_stage(table: &Table, caller: &Identity, enabled: bool) -> TableResult<Table> {
    table.ensure_host(caller)?;
    let mut next = table.clone();
    next.auto_stage = enabled;
    Ok(next)
}

/// Name the seat that pays every ante of the next zhajinhua deal, or clear it.
pub fn set_next_ante_sponsor(
    table: &Table,
    caller: &Identity,
    sponsor: Option<SeatId>,
) -> TableResult<Table> {
    table.ensure_host(caller)?;
    if table.variant() != Variant::Zhajinhua {
        return Err(TableError::InvalidAction);
    }
    if let Some(id) = &sponsor {
        if table.seat_index(id).is_none() {
            return Err(TableError::InvalidTarget);
        }
    }
    let mut next = table.clone();
    next.next_ante_sponsor = sponsor;
    Ok(next)
}

/// First active seat at or after `anchor`, wrapping around.
pub(crate) fn first_to_act_after(table: &Table, anchor: usize) -> usize {
    let len = table.seats.len();
    table.next_active_index(index_by_offset(len, anchor, -1))
}
