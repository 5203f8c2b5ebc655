//! Error taxonomy shared by every table operation.
//!
//! Each variant maps to a short machine-readable code (see [`TableError::code`]) that
//! clients use to pick user messaging. Conflicts are the only retryable family.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[non_exhaustive]
pub enum ErrorFamily {
    /// Caller is not allowed to act right now; surfaced verbatim.
    Precondition,
    /// The caller's concurrency token is stale; refresh and maybe retry.
    Conflict,
    /// Malformed or illegal input.
    Rule,
    /// Table lookup and lobby/lifecycle failures.
    Lifecycle,
}

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum TableError {
    // precondition / ownership
    #[error("table has not started")]
    NotStarted,
    #[error("hand is already at showdown")]
    RoundOver,
    #[error("seat to act is not active")]
    NotActive,
    #[error("seat to act is not bound to a participant")]
    SeatUnbound,
    #[error("caller does not own the seat to act")]
    NotOwner,
    #[error("last active seat cannot fold")]
    LastPlayer,
    #[error("seat has no chips left")]
    NoStack,
    #[error("only the host may do this")]
    NotHost,
    #[error("the host cannot leave the table")]
    HostCannotLeave,
    #[error("turn deadline has not passed")]
    NotTimeout,

    // concurrency conflicts
    #[error("turn changed since last observed")]
    TurnChanged,
    #[error("round changed since last observed")]
    RoundChanged,
    #[error("settlement state changed since last observed")]
    SettledChanged,

    // rule violations
    #[error("a call is owed")]
    NeedCall,
    #[error("raise target too low: need at least {min}, got {got}")]
    RaiseTooLow { min: u64, got: u64 },
    #[error("raise target missing or malformed")]
    InvalidRaise,
    #[error("unknown or unsupported action")]
    InvalidAction,
    #[error("cards cannot be seen yet")]
    CannotSee,
    #[error("compare is not allowed yet")]
    CannotCompare,
    #[error("compare is not allowed while seats are still unseen")]
    CannotCompareDark,
    #[error("compare needs a target seat")]
    NoTarget,
    #[error("target seat is not valid")]
    InvalidTarget,
    #[error("there is nothing to settle")]
    NoPot,
    #[error("no winners supplied")]
    NoWinners,
    #[error("pot {pot} has no eligible winner selected")]
    NoPotWinner { pot: usize },
    #[error("hand is not settled")]
    NotSettled,
    #[error("rebuy amount must be positive")]
    InvalidRebuy,
    #[error("rebuy exceeds limit {limit}")]
    RebuyTooLarge { limit: u64 },
    #[error("adjust mode must be add or sub")]
    InvalidMode,
    #[error("amount must be a positive integer")]
    InvalidAmount,
    #[error("stack would become negative")]
    StackNegative,
    #[error("active bets are not equal")]
    NotEqual,
    #[error("not every active seat has acted")]
    NotActed,
    #[error("hand has not reached showdown")]
    NotShowdown,
    #[error("hand is already settled")]
    Settled,

    // lifecycle
    #[error("table not found")]
    NotFound,
    #[error("table id already in use")]
    TableExists,
    #[error("table already started")]
    RoomStarted,
    #[error("table is full")]
    RoomFull,
    #[error("at least two seats are required")]
    NeedPlayers,
    #[error("seat id already taken")]
    DuplicateSeat,
    #[error("invalid rules: {0}")]
    InvalidRules(String),
}

impl TableError {
    /// Stable machine-readable code.
    pub fn code(&self) -> &'static str {
        match self {
            TableError::NotStarted => "NOT_STARTED",
            TableError::RoundOver => "ROUND_OVER",
            TableError::NotActive => "NOT_ACTIVE",
            TableError::SeatUnbound => "SEAT_UNBOUND",
            TableError::NotOwner => "NOT_OWNER",
            TableError::LastPlayer => "LAST_PLAYER",
            TableError::NoStack => "NO_STACK",
            TableError::NotHost => "NOT_HOST",
            TableError::HostCannotLeave => "HOST_CANNOT_LEAVE",
            TableError::NotTimeout => "NOT_TIMEOUT",
            TableError::TurnChanged => "TURN_CHANGED",
            TableError::RoundChanged => "ROUND_CHANGED",
            TableError::SettledChanged => "SETTLED_CHANGED",
            TableError::NeedCall => "NEED_CALL",
            TableError::RaiseTooLow { .. } => "RAISE_TOO_LOW",
            TableError::InvalidRaise => "INVALID_RAISE",
            TableError::InvalidAction => "INVALID_ACTION",
            TableError::CannotSee => "CANNOT_SEE",
            TableError::CannotCompare => "CANNOT_COMPARE",
            TableError::CannotCompareDark => "CANNOT_COMPARE_DARK",
            TableError::NoTarget => "NO_TARGET",
            TableError::InvalidTarget => "INVALID_TARGET",
            TableError::NoPot => "NO_POT",
            TableError::NoWinners => "NO_WINNERS",
            TableError::NoPotWinner { .. } => "NO_POT_WINNER",
            TableError::NotSettled => "NOT_SETTLED",
            TableError::InvalidRebuy => "INVALID_REBUY",
            TableError::RebuyTooLarge { .. } => "REBUY_TOO_LARGE",
            TableError::InvalidMode => "INVALID_MODE",
            TableError::InvalidAmount => "INVALID_AMOUNT",
            TableError::StackNegative => "STACK_NEGATIVE",
            TableError::NotEqual => "NOT_EQUAL",
            TableError::NotActed => "NOT_ACTED",
            TableError::NotShowdown => "NOT_SHOWDOWN",
            TableError::Settled => "SETTLED",
            TableError::NotFound => "NOT_FOUND",
            TableError::TableExists => "TABLE_EXISTS",
            TableError::RoomStarted => "ROOM_STARTED",
            TableError::RoomFull => "ROOM_FULL",
            TableError::NeedPlayers => "NEED_PLAYERS",
            TableError::DuplicateSeat => "DUPLICATE_SEAT",
            TableError::InvalidRules(_) => "INVALID_RULES",
        }
    }

    pub fn family(&self) -> ErrorFamily {
        match self {
            TableError::NotStarted
            | TableError::RoundOver
            | TableError::NotActive
            | TableError::SeatUnbound
            | TableError::NotOwner
            | TableError::LastPlayer
            | TableError::NoStack
            | TableError::NotHost
            | TableError::HostCannotLeave
            | TableError::NotTimeout => ErrorFamily::Precondition,
            TableError::TurnChanged | TableError::RoundChanged | TableError::SettledChanged => {
                ErrorFamily::Conflict
            }
            TableError::NotFound
            | TableError::TableExists
            | TableError::RoomStarted
            | TableError::RoomFull
            | TableError::NeedPlayers
            | TableError::DuplicateSeat
            | TableError::InvalidRules(_) => ErrorFamily::Lifecycle,
            _ => ErrorFamily::Rule,
        }
    }

    /// Conflicts may succeed after the caller refreshes its token.
    pub fn is_retryable(&self) -> bool {
        matches!(self.family(), ErrorFamily::Conflict)
    }
}

pub type TableResult<T> = Result<T, TableError>;
