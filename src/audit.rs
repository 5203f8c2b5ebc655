//! Audit trail for money movements.
//!
//! Settlement payouts, rebuys and chip adjustments are re-emitted as `tracing` events
//! under the `audit` target so they can be routed to a dedicated sink.

use crate::table::{Identity, LogEntry, LogKind, Table};

pub const TARGET: &str = "audit";

/// Whether a log entry records chips created, destroyed or paid out.
pub fn is_audited(kind: LogKind) -> bool {
    matches!(kind, LogKind::Payout | LogKind::Rebuy | LogKind::ChipAdjust)
}

/// Emit audit events for entries appended since the log held `prior_len` entries.
pub fn record_new_entries(table: &Table, prior_len: usize, caller: &Identity) -> usize {
    let fresh: Vec<&LogEntry> =
        table.log.iter().skip(prior_len).filter(|e| is_audited(e.kind)).collect();
    for entry in &fresh {
        let seat = entry.seat.as_ref().map(|s| s.as_str()).unwrap_or("-");
        tracing::info!(
            target: TARGET,
            table = %table.id,
            revision = table.revision,
            caller = %caller,
            seat,
            kind = ?entry.kind,
            amount = entry.amount.unwrap_or(0),
            note = entry.note.as_deref().unwrap_or(""),
            "chip movement"
        );
    }
    fresh.len()
}
