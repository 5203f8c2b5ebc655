//! Side-pot construction.

use crate::error::{TableError, TableResult};
use crate::table::{Seat, SeatId};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pot {
    pub amount: u64,
    /// Seats that may win this pot, sorted by id.
    pub eligible: Vec<SeatId>,
}

/// Split every seat's `hand_bet + bet` into layered pots.
///
/// Each distinct contribution level forms a layer. Layers nobody in the hand can win
/// are folded into the previous pot, or into the next winnable one when there is no
/// previous pot. Consecutive layers with the same eligible seats collapse into one pot.
/// Money no contributor can win goes to a final pot open to every seat still in the
/// hand, or to every contributor once nobody is left in the hand.
pub fn build_pots(seats: &[Seat]) -> TableResult<Vec<Pot>> {
    let mut levels: Vec<u64> =
        seats.iter().map(Seat::contribution).filter(|&c| c > 0).collect();
    if levels.is_empty() {
        return Err(TableError::NoPot);
    }
    levels.sort_unstable();
    levels.dedup();

    let mut pots: Vec<Pot> = Vec::new();
    let mut prev = 0;
    // dead money seen before the first winnable layer
    let mut carried = 0;
    for level in levels {
        let participants: Vec<&Seat> = seats.iter().filter(|s| s.contribution() >= level).collect();
        let amount = (level - prev) * participants.len() as u64;
        prev = level;

        let mut eligible: Vec<SeatId> =
            participants.iter().filter(|s| s.in_hand()).map(|s| s.id.clone()).collect();
        eligible.sort();

        if eligible.is_empty() {
            match pots.last_mut() {
                Some(last) => last.amount += amount,
                None => carried += amount,
            }
            continue;
        }
        let amount = amount + std::mem::take(&mut carried);
        if let Some(last) = pots.last_mut().filter(|p| p.eligible == eligible) {
            last.amount += amount;
            continue;
        }
        pots.push(Pot { amount, eligible });
    }

    if carried > 0 {
        let in_hand = seats.iter().any(Seat::in_hand);
        let mut eligible: Vec<SeatId> = seats
            .iter()
            .filter(|s| if in_hand { s.in_hand() } else { s.contribution() > 0 })
            .map(|s| s.id.clone())
            .collect();
        eligible.sort();
        pots.push(Pot { amount: carried, eligible });
    }
    Ok(pots)
}
