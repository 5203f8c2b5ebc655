//! Requests accepted by the engine.
//!
//! Clients send loosely-typed payloads ([`RawActionRequest`]); they are validated once
//! into the strongly-typed [`Action`] before the engine sees them.

use crate::error::{TableError, TableResult};
use crate::table::{SeatId, Stage, Table, TableId};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Outcome of a zhajinhua compare, as reported by the challenger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CompareResult {
    Win,
    #[default]
    Lose,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Action {
    Fold,
    Check,
    Call,
    /// Raise the seat's round bet to `to` (nominal chips).
    Raise { to: u64 },
    AllIn,
    See,
    Compare { target: SeatId, result: CompareResult },
    /// Deadline passed; resolved by the rule set into a concrete action.
    Timeout,
}

impl Action {
    pub fn name(&self) -> &'static str {
        match self {
            Action::Fold => "fold",
            Action::Check => "check",
            Action::Call => "call",
            Action::Raise { .. } => "raise",
            Action::AllIn => "allin",
            Action::See => "see",
            Action::Compare { .. } => "compare",
            Action::Timeout => "timeout",
        }
    }
}

/// Caller's last observed `(turn, stage, settled)`. Absent fields are not checked.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Expected {
    #[serde(default)]
    pub turn_index: Option<usize>,
    #[serde(default)]
    pub round: Option<Stage>,
    #[serde(default)]
    pub settled: Option<bool>,
}

impl Expected {
    /// Full token describing `table` as it is now.
    pub fn of(table: &Table) -> Self {
        Self {
            turn_index: Some(table.turn_index),
            round: Some(table.stage),
            settled: Some(table.settled),
        }
    }

    pub fn check(&self, table: &Table) -> TableResult<()> {
        if self.turn_index.is_some_and(|t| t != table.turn_index) {
            return Err(TableError::TurnChanged);
        }
        if self.round.is_some_and(|r| r != table.stage) {
            return Err(TableError::RoundChanged);
        }
        if self.settled.is_some_and(|s| s != table.settled) {
            return Err(TableError::SettledChanged);
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionRequest {
    pub table_id: TableId,
    pub action: Action,
    #[serde(default)]
    pub expected: Expected,
}

/// Wire shape of an action request before validation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawActionRequest {
    pub table_id: String,
    pub action_type: String,
    #[serde(default)]
    pub raise_to: Option<i64>,
    #[serde(default)]
    pub target_id: Option<String>,
    #[serde(default)]
    pub result: Option<CompareResult>,
    #[serde(default)]
    pub expected: Expected,
}

impl TryFrom<RawActionRequest> for ActionRequest {
    type Error = TableError;

    fn try_from(raw: RawActionRequest) -> Result<Self, Self::Error> {
        let action = match raw.action_type.as_str() {
            "fold" => Action::Fold,
            "check" => Action::Check,
            "call" => Action::Call,
            "raise" => match raw.raise_to {
                Some(to) if to > 0 => Action::Raise { to: to as u64 },
                _ => return Err(TableError::InvalidRaise),
            },
            "allin" => Action::AllIn,
            "see" => Action::See,
            "compare" => match raw.target_id {
                Some(target) if !target.trim().is_empty() => Action::Compare {
                    target: SeatId(target),
                    result: raw.result.unwrap_or_default(),
                },
                _ => return Err(TableError::NoTarget),
            },
            "timeout" => Action::Timeout,
            _ => return Err(TableError::InvalidAction),
        };
        Ok(ActionRequest { table_id: TableId(raw.table_id), action, expected: raw.expected })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SettleRequest {
    pub table_id: TableId,
    #[serde(default)]
    pub expected: Expected,
    /// One selection per pot, in pot-construction order.
    pub winners_by_pot: Vec<Vec<SeatId>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RebuyRequest {
    pub table_id: TableId,
    pub seat: SeatId,
    pub amount: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AdjustMode {
    Add,
    Sub,
}

impl FromStr for AdjustMode {
    type Err = TableError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "add" => Ok(AdjustMode::Add),
            "sub" => Ok(AdjustMode::Sub),
            _ => Err(TableError::InvalidMode),
        }
    }
}

pub const ADJUST_NOTE_MAX_CHARS: usize = 50;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChipAdjustRequest {
    pub table_id: TableId,
    pub target: SeatId,
    pub mode: String,
    /// Kept as a raw JSON number so fractional or negative input is rejected, not truncated.
    pub amount: serde_json::Number,
    #[serde(default)]
    pub note: Option<String>,
}

/// Validated chip adjustment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChipAdjust {
    pub target: SeatId,
    pub mode: AdjustMode,
    pub amount: u64,
    pub note: String,
}

impl ChipAdjustRequest {
    pub fn validate(&self) -> TableResult<ChipAdjust> {
        let mode: AdjustMode = self.mode.parse()?;
        let amount = match self.amount.as_u64() {
            Some(a) if a > 0 => a,
            _ => return Err(TableError::InvalidAmount),
        };
        let note = self
            .note
            .as_deref()
            .map(|n| n.trim().chars().take(ADJUST_NOTE_MAX_CHARS).collect())
            .unwrap_or_default();
        Ok(ChipAdjust { target: self.target.clone(), mode, amount, note })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::GameRules;

    fn raw(kind: &str) -> RawActionRequest {
        RawActionRequest { table_id: "t1".into(), action_type: kind.into(), ..Default::default() }
    }

    #[test]
    fn raw_actions_are_validated() {
        assert_eq!(ActionRequest::try_from(raw("call")).unwrap().action, Action::Call);
        assert_eq!(ActionRequest::try_from(raw("bet")).unwrap_err(), TableError::InvalidAction);
        assert_eq!(ActionRequest::try_from(raw("raise")).unwrap_err(), TableError::InvalidRaise);

        let mut r = raw("raise");
        r.raise_to = Some(-5);
        assert_eq!(ActionRequest::try_from(r).unwrap_err(), TableError::InvalidRaise);

        assert_eq!(ActionRequest::try_from(raw("compare")).unwrap_err(), TableError::NoTarget);
        let mut c = raw("compare");
        c.target_id = Some("p2".into());
        assert_eq!(
            ActionRequest::try_from(c).unwrap().action,
            Action::Compare { target: "p2".into(), result: CompareResult::Lose }
        );
    }

    #[test]
    fn expected_token_reports_first_mismatch() {
        let table = Table::new("t1", GameRules::texas(), None);
        assert!(Expected::default().check(&table).is_ok());
        assert!(Expected::of(&table).check(&table).is_ok());

        let stale = Expected { turn_index: Some(3), round: Some(Stage::Flop), settled: None };
        assert_eq!(stale.check(&table).unwrap_err(), TableError::TurnChanged);
        let stale = Expected { round: Some(Stage::Flop), ..Expected::of(&table) };
        assert_eq!(stale.check(&table).unwrap_err(), TableError::RoundChanged);
        let stale = Expected { settled: Some(true), ..Expected::of(&table) };
        assert_eq!(stale.check(&table).unwrap_err(), TableError::SettledChanged);
    }

    #[test]
    fn chip_adjust_input_rules() {
        let req = |mode: &str, amount: &str, note: Option<&str>| ChipAdjustRequest {
            table_id: "t1".into(),
            target: "p1".into(),
            mode: mode.into(),
            amount: serde_json::from_str(amount).unwrap(),
            note: note.map(str::to_owned),
        };
        assert_eq!(req("mul", "5", None).validate().unwrap_err(), TableError::InvalidMode);
        assert_eq!(req("add", "0", None).validate().unwrap_err(), TableError::InvalidAmount);
        assert_eq!(req("add", "2.5", None).validate().unwrap_err(), TableError::InvalidAmount);
        assert_eq!(req("sub", "-3", None).validate().unwrap_err(), TableError::InvalidAmount);

        let long = "x".repeat(80);
        let ok = req("sub", "30", Some(&format!("  {long}  "))).validate().unwrap();
        assert_eq!(ok.mode, AdjustMode::Sub);
        assert_eq!(ok.amount, 30);
        assert_eq!(ok.note.chars().count(), ADJUST_NOTE_MAX_CHARS);
    }

    #[test]
    fn actions_round_trip_through_json() {
        let a: Action = serde_json::from_str(r#"{"type":"raise","to":40}"#).unwrap();
        assert_eq!(a, Action::Raise { to: 40 });
        let a: Action = serde_json::from_str(r#"{"type":"allin"}"#).unwrap();
        assert_eq!(a.name(), "allin");
    }
}
