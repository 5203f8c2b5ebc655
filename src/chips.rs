//! Rebuys and host chip corrections. These are the only operations that change the
//! number of chips on the table.

use crate::action::{AdjustMode, ChipAdjust};
use crate::error::{TableError, TableResult};
use crate::table::{Identity, LogEntry, LogKind, SeatId, SeatStatus, Table};

/// Top up a seat between hands. The seat's owner or the host may request it.
pub fn rebuy(
    table: &Table,
    caller: &Identity,
    seat: &SeatId,
    amount: i64,
    now: u64,
) -> TableResult<Table> {
    if !table.settled {
        return Err(TableError::NotSettled);
    }
    let amount = u64::try_from(amount).ok().filter(|&a| a > 0).ok_or(TableError::InvalidRebuy)?;
    let limit = table.rules.rebuy_limit();
    if limit > 0 && amount > limit {
        return Err(TableError::RebuyTooLarge { limit });
    }
    let idx = table.seat_index(seat).ok_or(TableError::InvalidTarget)?;
    let owns = table.seats[idx].owner.as_ref() == Some(caller);
    if !owns && !table.is_host(caller) {
        return Err(TableError::NotOwner);
    }

    let mut next = table.clone();
    let s = &mut next.seats[idx];
    s.stack += amount;
    if s.status == SeatStatus::Out && !s.left {
        s.status = SeatStatus::Active;
    }
    let entry = LogEntry::new(now, Some(s.id.clone()), LogKind::Rebuy).amount(amount);
    next.record(entry);
    Ok(next)
}

/// Host adds or removes chips from a seat's stack to fix the score.
pub fn adjust_chips(
    table: &Table,
    caller: &Identity,
    adjust: &ChipAdjust,
    now: u64,
) -> TableResult<Table> {
    table.ensure_host(caller)?;
    let idx = table.seat_index(&adjust.target).ok_or(TableError::InvalidTarget)?;
    let stack = table.seats[idx].stack;
    let new_stack = match adjust.mode {
        AdjustMode::Add => stack.checked_add(adjust.amount).ok_or(TableError::InvalidAmount)?,
        AdjustMode::Sub => stack.checked_sub(adjust.amount).ok_or(TableError::StackNegative)?,
    };

    let mut next = table.clone();
    let s = &mut next.seats[idx];
    s.stack = new_stack;
    let mut entry =
        LogEntry::new(now, Some(s.id.clone()), LogKind::ChipAdjust).amount(adjust.amount);
    entry.note = Some(match adjust.mode {
        AdjustMode::Add if adjust.note.is_empty() => "add".to_owned(),
        AdjustMode::Sub if adjust.note.is_empty() => "sub".to_owned(),
        AdjustMode::Add => format!("add: {}", adjust.note),
        AdjustMode::Sub => format!("sub: {}", adjust.note),
    });
    next.record(entry);
    Ok(next)
}
