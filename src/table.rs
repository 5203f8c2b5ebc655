//! Table and seat data model.
//!
//! A [`Table`] is one authoritative snapshot: lobby seating, the live hand, and the
//! append-only action log. All engine operations read a `&Table` and return a new one.

use crate::action::CompareResult;
use crate::error::{TableError, TableResult};
use crate::rules::{GameRules, Variant};
use serde::{Deserialize, Serialize};
use std::fmt;

macro_rules! string_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub String);

        impl $name {
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<&str> for $name {
            fn from(value: &str) -> Self {
                Self(value.to_owned())
            }
        }

        impl From<String> for $name {
            fn from(value: String) -> Self {
                Self(value)
            }
        }
    };
}

string_id!(
    /// Key of a table in the persistence layer.
    TableId
);
string_id!(
    /// Stable id of a seat within its table.
    SeatId
);
string_id!(
    /// Caller identity as supplied by the identity provider.
    Identity
);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TableStatus {
    Lobby,
    Active,
}

/// Phase token of the current hand.
///
/// Texas walks `Preflop → Flop → Turn → River → Showdown`; zhajinhua counts
/// `Betting(1), Betting(2), …` until showdown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Stage {
    Preflop,
    Flop,
    Turn,
    River,
    Betting(u32),
    Showdown,
}

impl Stage {
    pub fn is_showdown(self) -> bool {
        matches!(self, Stage::Showdown)
    }

    pub fn label(self) -> String {
        match self {
            Stage::Preflop => "preflop".into(),
            Stage::Flop => "flop".into(),
            Stage::Turn => "turn".into(),
            Stage::River => "river".into(),
            Stage::Betting(n) => format!("betting-{n}"),
            Stage::Showdown => "showdown".into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SeatStatus {
    Active,
    Fold,
    AllIn,
    /// No chips and not dealt into the hand.
    Out,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Seat {
    pub id: SeatId,
    pub name: String,
    pub owner: Option<Identity>,
    pub stack: u64,
    /// Nominal chips wagered in the current round.
    pub bet: u64,
    /// Real chips moved out of the stack during the whole hand.
    pub hand_bet: u64,
    pub acted_round: u32,
    pub status: SeatStatus,
    /// Occupant exited mid-hand; dropped when the next hand is dealt.
    #[serde(default)]
    pub left: bool,
    #[serde(default)]
    pub seen: bool,
}

impl Seat {
    pub fn new(
        id: impl Into<SeatId>,
        name: impl Into<String>,
        owner: Option<Identity>,
        stack: u64,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            owner,
            stack,
            bet: 0,
            hand_bet: 0,
            acted_round: 0,
            status: SeatStatus::Active,
            left: false,
            seen: false,
        }
    }

    pub fn is_active(&self) -> bool {
        matches!(self.status, SeatStatus::Active)
    }

    /// Still contesting the pot (active or all-in).
    pub fn in_hand(&self) -> bool {
        !matches!(self.status, SeatStatus::Fold | SeatStatus::Out)
    }

    /// Chips this seat has put toward the pots of the current hand.
    pub fn contribution(&self) -> u64 {
        self.hand_bet + self.bet
    }

    pub(crate) fn reset_for_hand(&mut self) {
        self.bet = 0;
        self.hand_bet = 0;
        self.acted_round = 0;
        self.seen = false;
        self.status = if self.stack > 0 { SeatStatus::Active } else { SeatStatus::Out };
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[non_exhaustive]
pub enum LogKind {
    Blind,
    Ante,
    Fold,
    Check,
    Call,
    Raise,
    AllIn,
    See,
    Compare,
    Leave,
    StageAdvance,
    Payout,
    Rebuy,
    ChipAdjust,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogEntry {
    pub ts: u64,
    pub seat: Option<SeatId>,
    pub kind: LogKind,
    pub amount: Option<u64>,
    pub bet: Option<u64>,
    pub target: Option<SeatId>,
    pub result: Option<CompareResult>,
    pub note: Option<String>,
}

impl LogEntry {
    pub fn new(ts: u64, seat: Option<SeatId>, kind: LogKind) -> Self {
        Self { ts, seat, kind, amount: None, bet: None, target: None, result: None, note: None }
    }

    pub fn amount(mut self, amount: u64) -> Self {
        self.amount = Some(amount);
        self
    }

    pub fn bet(mut self, bet: u64) -> Self {
        self.bet = Some(bet);
        self
    }

    pub fn note(mut self, note: impl Into<String>) -> Self {
        self.note = Some(note.into());
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Table {
    pub id: TableId,
    pub status: TableStatus,
    pub rules: GameRules,
    pub stage: Stage,
    /// Round counter compared against `Seat::acted_round`.
    pub round_id: u32,
    pub dealer_index: usize,
    pub turn_index: usize,
    /// Chips already pooled from completed rounds (zhajinhua: the whole hand).
    pub pot: u64,
    pub turn_expires_at: Option<u64>,
    pub settled: bool,
    pub auto_stage: bool,
    pub host: Option<Identity>,
    pub next_ante_sponsor: Option<SeatId>,
    pub seats: Vec<Seat>,
    pub log: Vec<LogEntry>,
    /// Bumped by the store on every committed transaction.
    pub revision: u64,
}

impl Table {
    pub fn new(id: impl Into<TableId>, rules: GameRules, host: Option<Identity>) -> Self {
        let stage = match rules.variant() {
            Variant::Texas => Stage::Preflop,
            Variant::Zhajinhua => Stage::Betting(1),
        };
        Self {
            id: id.into(),
            status: TableStatus::Lobby,
            rules,
            stage,
            round_id: 1,
            dealer_index: 0,
            turn_index: 0,
            pot: 0,
            turn_expires_at: None,
            settled: false,
            auto_stage: true,
            host,
            next_ante_sponsor: None,
            seats: Vec::new(),
            log: Vec::new(),
            revision: 0,
        }
    }

    /// Seat a participant with the rules' starting stack. Lobby only.
    pub fn seat(
        &mut self,
        id: impl Into<SeatId>,
        name: impl Into<String>,
        owner: Option<Identity>,
    ) -> TableResult<&mut Seat> {
        let stack = self.rules.starting_stack();
        self.add_seat(Seat::new(id, name, owner, stack))
    }

    pub fn add_seat(&mut self, seat: Seat) -> TableResult<&mut Seat> {
        if self.status != TableStatus::Lobby {
            return Err(TableError::RoomStarted);
        }
        if self.seats.len() >= self.rules.max_seats() {
            return Err(TableError::RoomFull);
        }
        if self.seat_index(&seat.id).is_some() {
            return Err(TableError::DuplicateSeat);
        }
        self.seats.push(seat);
        let last = self.seats.len() - 1;
        Ok(&mut self.seats[last])
    }

    pub fn variant(&self) -> Variant {
        self.rules.variant()
    }

    pub fn seat_index(&self, id: &SeatId) -> Option<usize> {
        self.seats.iter().position(|s| &s.id == id)
    }

    pub fn seat_by_id(&self, id: &SeatId) -> Option<&Seat> {
        self.seats.iter().find(|s| &s.id == id)
    }

    /// Seat owned by `caller`, if any.
    pub fn seat_of(&self, caller: &Identity) -> Option<usize> {
        self.seats.iter().position(|s| s.owner.as_ref() == Some(caller))
    }

    /// Highest nominal bet of the current round.
    pub fn current_bet(&self) -> u64 {
        current_bet(&self.seats)
    }

    pub fn next_active_index(&self, start: usize) -> usize {
        next_active_index(&self.seats, start)
    }

    pub fn active_count(&self) -> usize {
        self.seats.iter().filter(|s| s.is_active()).count()
    }

    pub fn in_hand_count(&self) -> usize {
        self.seats.iter().filter(|s| s.in_hand()).count()
    }

    /// Chips owned by seats or committed to the hand. Only rebuys and chip
    /// adjustments change this.
    pub fn chips_in_play(&self) -> u64 {
        self.seats.iter().map(|s| s.stack + s.hand_bet).sum()
    }

    /// No host configured means anyone may run host operations.
    pub fn is_host(&self, caller: &Identity) -> bool {
        self.host.as_ref().map_or(true, |h| h == caller)
    }

    pub(crate) fn ensure_host(&self, caller: &Identity) -> TableResult<()> {
        if self.is_host(caller) {
            Ok(())
        } else {
            Err(TableError::NotHost)
        }
    }

    pub(crate) fn ensure_started(&self) -> TableResult<()> {
        if self.status == TableStatus::Active {
            Ok(())
        } else {
            Err(TableError::NotStarted)
        }
    }

    /// Deadline for the seat to act, if timeouts are configured and someone can act.
    pub(crate) fn turn_deadline(&self, now: u64, has_turn: bool) -> Option<u64> {
        let timeout = self.rules.action_timeout_sec();
        if timeout == 0 || self.stage.is_showdown() || !has_turn {
            return None;
        }
        Some(now.saturating_add(timeout.saturating_mul(1000)))
    }

    pub(crate) fn record(&mut self, entry: LogEntry) {
        self.log.push(entry);
    }
}

pub fn current_bet(seats: &[Seat]) -> u64 {
    seats.iter().map(|s| s.bet).max().unwrap_or(0)
}

/// First active seat strictly after `start`, wrapping around. Returns `start`
/// unchanged when no seat is active.
pub fn next_active_index(seats: &[Seat], start: usize) -> usize {
    if seats.is_empty() {
        return 0;
    }
    let n = seats.len();
    for offset in 1..=n {
        let i = (start + offset) % n;
        if seats[i].is_active() {
            return i;
        }
    }
    start
}

/// `base + offset` wrapped into `0..len`.
pub fn index_by_offset(len: usize, base: usize, offset: isize) -> usize {
    if len == 0 {
        return 0;
    }
    let len = len as isize;
    (base as isize + offset).rem_euclid(len) as usize
}
