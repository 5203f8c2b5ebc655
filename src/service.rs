//! Action applier: runs every table mutation as one atomic store transaction.

use crate::action::{
    ActionRequest, ChipAdjustRequest, Expected, RawActionRequest, RebuyRequest, SettleRequest,
};
use crate::audit;
use crate::chips;
use crate::clock::{Clock, SystemClock};
use crate::engine;
use crate::error::TableResult;
use crate::settlement;
use crate::store::{MemoryStore, TableStore};
use crate::table::{Identity, SeatId, Stage, Table, TableId};
use tracing::{debug, info};

pub struct TableService<S = MemoryStore, C = SystemClock> {
    store: S,
    clock: C,
}

impl Default for TableService {
    fn default() -> Self {
        Self::new(MemoryStore::new(), SystemClock)
    }
}

impl<S: TableStore, C: Clock> TableService<S, C> {
    pub fn new(store: S, clock: C) -> Self {
        Self { store, clock }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    pub fn create_table(&self, table: Table) -> TableResult<()> {
        info!(
            table = %table.id,
            variant = ?table.variant(),
            seats = table.seats.len(),
            "table created"
        );
        self.store.insert(table)
    }

    pub fn table(&self, id: &TableId) -> TableResult<Table> {
        self.store.get(id)
    }

    fn commit<F>(
        &self,
        op: &'static str,
        id: &TableId,
        caller: &Identity,
        mut f: F,
    ) -> TableResult<Table>
    where
        F: FnMut(&Table, u64) -> TableResult<Table>,
    {
        let now = self.clock.now_ms();
        let span = tracing::debug_span!("table_op", table = %id, op, caller = %caller);
        let _guard = span.enter();

        let mut prior: Option<(usize, Stage, bool)> = None;
        let result = self.store.transact(id, &mut |t| {
            prior = Some((t.log.len(), t.stage, t.settled));
            f(t, now)
        });

        match &result {
            Ok(table) => {
                let (log_len, stage, settled) = prior.unwrap_or((0, table.stage, table.settled));
                audit::record_new_entries(table, log_len, caller);
                if table.stage != stage {
                    info!(stage = %table.stage.label(), pot = table.pot, "stage changed");
                }
                if table.settled && !settled {
                    info!(revision = table.revision, "hand settled");
                }
                debug!(revision = table.revision, turn = table.turn_index, "committed");
            }
            Err(err) => debug!(code = err.code(), retryable = err.is_retryable(), "rejected"),
        }
        result
    }

    pub fn start(&self, caller: &Identity, id: &TableId) -> TableResult<Table> {
        self.commit("start", id, caller, |t, now| engine::start(t, caller, now))
    }

    pub fn act(&self, caller: &Identity, req: &ActionRequest) -> TableResult<Table> {
        self.commit(req.action.name(), &req.table_id, caller, |t, now| {
            engine::apply_action(t, caller, &req.action, &req.expected, now)
        })
    }

    /// Validate a wire payload and apply it.
    pub fn act_raw(&self, caller: &Identity, raw: RawActionRequest) -> TableResult<Table> {
        let req = ActionRequest::try_from(raw).map_err(|err| {
            debug!(code = err.code(), "malformed action");
            err
        })?;
        self.act(caller, &req)
    }

    pub fn settle(&self, caller: &Identity, req: &SettleRequest) -> TableResult<Table> {
        self.commit("settle", &req.table_id, caller, |t, now| {
            settlement::settle(t, caller, &req.expected, &req.winners_by_pot, now)
        })
    }

    pub fn advance_stage(
        &self,
        caller: &Identity,
        id: &TableId,
        expected: &Expected,
    ) -> TableResult<Table> {
        self.commit("advance_stage", id, caller, |t, now| {
            engine::advance_stage(t, caller, expected, now)
        })
    }

    pub fn reset_round(
        &self,
        caller: &Identity,
        id: &TableId,
        expected: &Expected,
    ) -> TableResult<Table> {
        self.commit("reset_round", id, caller, |t, now| {
            engine::reset_round(t, caller, expected, now)
        })
    }

    pub fn leave(&self, caller: &Identity, id: &TableId) -> TableResult<Table> {
        self.commit("leave", id, caller, |t, now| engine::leave_seat(t, caller, now))
    }

    pub fn set_auto_stage(
        &self,
        caller: &Identity,
        id: &TableId,
        enabled: bool,
    ) -> TableResult<Table> {
        self.commit("set_auto_stage", id, caller, |t, _| {
            engine::set_auto_stage(t, caller, enabled)
        })
    }

    pub fn set_next_ante_sponsor(
        &self,
        caller: &Identity,
        id: &TableId,
        sponsor: Option<SeatId>,
    ) -> TableResult<Table> {
        self.commit("set_next_ante_sponsor", id, caller, |t, _| {
            engine::set_next_ante_sponsor(t, caller, sponsor.clone())
        })
    }

    pub fn rebuy(&self, caller: &Identity, req: &RebuyRequest) -> TableResult<Table> {
        self.commit("rebuy", &req.table_id, caller, |t, now| {
            chips::rebuy(t, caller, &req.seat, req.amount, now)
        })
    }

    pub fn adjust_chips(&self, caller: &Identity, req: &ChipAdjustRequest) -> TableResult<Table> {
        let adjust = req.validate()?;
        self.commit("adjust_chips", &req.table_id, caller, |t, now| {
            chips::adjust_chips(t, caller, &adjust, now)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::action::Action;
    use crate::clock::ManualClock;
    use crate::error::TableError;
    use crate::rules::GameRules;

    fn service() -> TableService<MemoryStore, ManualClock> {
        let svc = TableService::new(MemoryStore::new(), ManualClock::new(1_000));
        let mut t = Table::new("t1", GameRules::texas(), Some("host".into()));
        for i in 1..=3 {
            t.seat(format!("p{i}"), "", Some(format!("o{i}").into())).unwrap();
        }
        svc.create_table(t).unwrap();
        svc
    }

    #[test]
    fn stale_token_is_rejected_without_commit() {
        let svc = service();
        let id = TableId::from("t1");
        let started = svc.start(&"host".into(), &id).unwrap();
        assert_eq!(started.revision, 1);

        let token = Expected::of(&started);
        let call =
            ActionRequest { table_id: id.clone(), action: Action::Call, expected: token.clone() };
        svc.act(&"o1".into(), &call).unwrap();

        let stale = ActionRequest { table_id: id.clone(), action: Action::Call, expected: token };
        assert_eq!(svc.act(&"o2".into(), &stale).unwrap_err(), TableError::TurnChanged);
        assert_eq!(svc.table(&id).unwrap().revision, 2);
    }

    #[test]
    fn timeout_uses_service_clock() {
        let svc = service();
        let id = TableId::from("t1");
        svc.start(&"host".into(), &id).unwrap();
        let raw = RawActionRequest {
            table_id: "t1".into(),
            action_type: "timeout".into(),
            ..Default::default()
        };
        assert_eq!(svc.act_raw(&"o3".into(), raw.clone()).unwrap_err(), TableError::NotTimeout);

        svc.clock().advance(60_000);
        let after = svc.act_raw(&"o3".into(), raw).unwrap();
        assert_eq!(after.seats[0].status, crate::table::SeatStatus::Fold);
    }

    #[test]
    fn unknown_table_is_not_found() {
        let svc = service();
        assert_eq!(svc.leave(&"o1".into(), &"zz".into()).unwrap_err(), TableError::NotFound);
    }
}
