//! Per-hand rule configuration for both game variants.
//!
//! Clients submit a loosely-filled [`RulesConfig`]; [`RulesConfig::normalize`] turns it
//! into the immutable [`GameRules`] stored on the table. Missing or zero numeric fields
//! fall back to the defaults below.

use crate::error::TableError;
use serde::{Deserialize, Serialize};

pub const DEFAULT_SMALL_BLIND: u64 = 10;
pub const DEFAULT_BIG_BLIND: u64 = 20;
pub const DEFAULT_STACK: u64 = 2000;
pub const DEFAULT_ACTION_TIMEOUT_SEC: u64 = 60;
pub const TEXAS_MAX_SEATS: usize = 9;

pub const DEFAULT_BASE_BET: u64 = 10;
pub const DEFAULT_BUY_IN: u64 = 2000;
pub const DEFAULT_MAX_ROUNDS: u32 = 20;
pub const DEFAULT_MIN_SEE_ROUND: u32 = 3;
pub const DEFAULT_COMPARE_ALLOWED_AFTER: u32 = 3;
pub const ZHJ_MAX_SEATS: usize = 12;

const MIN_SEATS: usize = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Variant {
    Texas,
    Zhajinhua,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Blinds {
    pub sb: u64,
    pub bb: u64,
}

impl Default for Blinds {
    fn default() -> Self {
        Self { sb: DEFAULT_SMALL_BLIND, bb: DEFAULT_BIG_BLIND }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TexasRules {
    pub blinds: Blinds,
    pub stack: u64,
    pub max_seats: usize,
    pub action_timeout_sec: u64,
}

impl Default for TexasRules {
    fn default() -> Self {
        Self {
            blinds: Blinds::default(),
            stack: DEFAULT_STACK,
            max_seats: TEXAS_MAX_SEATS,
            action_timeout_sec: DEFAULT_ACTION_TIMEOUT_SEC,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ZhajinhuaRules {
    pub base_bet: u64,
    pub buy_in: u64,
    pub max_seats: usize,
    pub max_rounds: u32,
    pub min_see_round: u32,
    pub compare_allowed_after: u32,
    pub rebuy_limit: u64,
    pub action_timeout_sec: u64,
    /// Refuse compares while any seat still in the hand has not seen its cards.
    pub compare_requires_all_seen: bool,
    /// Lets a seen seat compare an unseen one when only two remain in the hand.
    pub allow_heads_up_mixed_compare: bool,
}

impl Default for ZhajinhuaRules {
    fn default() -> Self {
        Self {
            base_bet: DEFAULT_BASE_BET,
            buy_in: DEFAULT_BUY_IN,
            max_seats: ZHJ_MAX_SEATS,
            max_rounds: DEFAULT_MAX_ROUNDS,
            min_see_round: DEFAULT_MIN_SEE_ROUND,
            compare_allowed_after: DEFAULT_COMPARE_ALLOWED_AFTER,
            rebuy_limit: DEFAULT_BUY_IN,
            action_timeout_sec: DEFAULT_ACTION_TIMEOUT_SEC,
            compare_requires_all_seen: false,
            allow_heads_up_mixed_compare: true,
        }
    }
}

/// Immutable rule set carried by a table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "variant", rename_all = "lowercase")]
pub enum GameRules {
    Texas(TexasRules),
    Zhajinhua(ZhajinhuaRules),
}

impl GameRules {
    pub fn texas() -> Self {
        GameRules::Texas(TexasRules::default())
    }

    pub fn zhajinhua() -> Self {
        GameRules::Zhajinhua(ZhajinhuaRules::default())
    }

    /// Parse a raw JSON config and normalize it.
    pub fn from_json(raw: &str) -> Result<Self, TableError> {
        let config: RulesConfig =
            serde_json::from_str(raw).map_err(|e| TableError::InvalidRules(e.to_string()))?;
        Ok(config.normalize())
    }

    pub fn variant(&self) -> Variant {
        match self {
            GameRules::Texas(_) => Variant::Texas,
            GameRules::Zhajinhua(_) => Variant::Zhajinhua,
        }
    }

    pub fn max_seats(&self) -> usize {
        match self {
            GameRules::Texas(r) => r.max_seats,
            GameRules::Zhajinhua(r) => r.max_seats,
        }
    }

    /// Starting stack for a newly seated participant.
    pub fn starting_stack(&self) -> u64 {
        match self {
            GameRules::Texas(r) => r.stack,
            GameRules::Zhajinhua(r) => r.buy_in,
        }
    }

    /// Largest single rebuy; zero means unlimited.
    pub fn rebuy_limit(&self) -> u64 {
        match self {
            GameRules::Texas(r) => r.stack,
            GameRules::Zhajinhua(r) => {
                if r.rebuy_limit > 0 {
                    r.rebuy_limit
                } else {
                    r.buy_in
                }
            }
        }
    }

    pub fn action_timeout_sec(&self) -> u64 {
        match self {
            GameRules::Texas(r) => r.action_timeout_sec,
            GameRules::Zhajinhua(r) => r.action_timeout_sec,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlindsConfig {
    pub sb: Option<u64>,
    pub bb: Option<u64>,
}

/// Raw, partially-filled rules as submitted by a client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "variant", rename_all = "lowercase")]
pub enum RulesConfig {
    Texas {
        #[serde(default)]
        blinds: Option<BlindsConfig>,
        #[serde(default)]
        stack: Option<u64>,
        #[serde(default)]
        max_seats: Option<usize>,
        #[serde(default)]
        action_timeout_sec: Option<u64>,
    },
    Zhajinhua {
        #[serde(default)]
        base_bet: Option<u64>,
        #[serde(default)]
        buy_in: Option<u64>,
        #[serde(default)]
        max_seats: Option<usize>,
        #[serde(default)]
        max_rounds: Option<u32>,
        #[serde(default)]
        min_see_round: Option<u32>,
        #[serde(default)]
        compare_allowed_after: Option<u32>,
        #[serde(default)]
        action_timeout_sec: Option<u64>,
        #[serde(default)]
        compare_requires_all_seen: Option<bool>,
        #[serde(default)]
        allow_heads_up_mixed_compare: Option<bool>,
    },
}

fn or_default<T: PartialEq + Default>(value: Option<T>, fallback: T) -> T {
    match value {
        Some(v) if v != T::default() => v,
        _ => fallback,
    }
}

impl RulesConfig {
    pub fn normalize(self) -> GameRules {
        match self {
            RulesConfig::Texas { blinds, stack, max_seats, action_timeout_sec } => {
                let blinds = blinds.unwrap_or_default();
                GameRules::Texas(TexasRules {
                    blinds: Blinds {
                        sb: blinds.sb.unwrap_or(DEFAULT_SMALL_BLIND),
                        bb: blinds.bb.unwrap_or(DEFAULT_BIG_BLIND),
                    },
                    stack: or_default(stack, DEFAULT_STACK),
                    max_seats: or_default(max_seats, TEXAS_MAX_SEATS)
                        .clamp(MIN_SEATS, TEXAS_MAX_SEATS),
                    // zero is meaningful here: it disables turn deadlines
                    action_timeout_sec: action_timeout_sec.unwrap_or(DEFAULT_ACTION_TIMEOUT_SEC),
                })
            }
            RulesConfig::Zhajinhua {
                base_bet,
                buy_in,
                max_seats,
                max_rounds,
                min_see_round,
                compare_allowed_after,
                action_timeout_sec,
                compare_requires_all_seen,
                allow_heads_up_mixed_compare,
            } => {
                let buy_in = or_default(buy_in, DEFAULT_BUY_IN);
                GameRules::Zhajinhua(ZhajinhuaRules {
                    base_bet: or_default(base_bet, DEFAULT_BASE_BET),
                    buy_in,
                    max_seats: or_default(max_seats, ZHJ_MAX_SEATS).clamp(MIN_SEATS, ZHJ_MAX_SEATS),
                    max_rounds: or_default(max_rounds, DEFAULT_MAX_ROUNDS),
                    min_see_round: or_default(min_see_round, DEFAULT_MIN_SEE_ROUND),
                    compare_allowed_after: or_default(
                        compare_allowed_after,
                        DEFAULT_COMPARE_ALLOWED_AFTER,
                    ),
                    rebuy_limit: buy_in,
                    action_timeout_sec: action_timeout_sec.unwrap_or(DEFAULT_ACTION_TIMEOUT_SEC),
                    compare_requires_all_seen: compare_requires_all_seen.unwrap_or(false),
                    allow_heads_up_mixed_compare: allow_heads_up_mixed_compare.unwrap_or(true),
                })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zhajinhua_seats_are_clamped_and_rebuy_follows_buy_in() {
        let rules = GameRules::from_json(
            r#"{"variant":"zhajinhua","base_bet":5,"buy_in":1000,"max_seats":20}"#,
        )
        .unwrap();
        let GameRules::Zhajinhua(r) = rules else { panic!("expected zhajinhua rules") };
        assert_eq!(r.max_seats, 12);
        assert_eq!(r.base_bet, 5);
        assert_eq!(r.rebuy_limit, 1000);
        assert_eq!(r.max_rounds, DEFAULT_MAX_ROUNDS);
    }

    #[test]
    fn texas_keeps_explicit_blinds_and_zero_timeout() {
        let rules = GameRules::from_json(
            r#"{"variant":"texas","blinds":{"sb":5,"bb":10},"stack":1500,"action_timeout_sec":0}"#,
        )
        .unwrap();
        let GameRules::Texas(r) = rules else { panic!("expected texas rules") };
        assert_eq!(r.blinds, Blinds { sb: 5, bb: 10 });
        assert_eq!(r.stack, 1500);
        assert_eq!(r.action_timeout_sec, 0);
        assert_eq!(r.max_seats, 9);
    }

    #[test]
    fn zero_fields_fall_back_to_defaults() {
        let rules = RulesConfig::Texas {
            blinds: None,
            stack: Some(0),
            max_seats: Some(1),
            action_timeout_sec: None,
        }
        .normalize();
        assert_eq!(rules.starting_stack(), DEFAULT_STACK);
        assert_eq!(rules.max_seats(), 2);
        assert_eq!(rules.action_timeout_sec(), DEFAULT_ACTION_TIMEOUT_SEC);
    }

    #[test]
    fn malformed_json_is_invalid_rules() {
        let err = GameRules::from_json(r#"{"variant":"omaha"}"#).unwrap_err();
        assert_eq!(err.code(), "INVALID_RULES");
    }
}
