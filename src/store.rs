//! Persistence boundary: read a table, or atomically read-modify-write it.

use crate::error::{TableError, TableResult};
use crate::table::{Table, TableId};
use dashmap::DashMap;

pub trait TableStore: Send + Sync {
    fn get(&self, id: &TableId) -> TableResult<Table>;

    /// Store a new table. Fails if the id is taken.
    fn insert(&self, table: Table) -> TableResult<()>;

    /// Run `f` against the current table under exclusive access. The returned table
    /// replaces the stored one only if `f` succeeds; the revision is bumped on commit.
    fn transact(
        &self,
        id: &TableId,
        f: &mut dyn FnMut(&Table) -> TableResult<Table>,
    ) -> TableResult<Table>;
}

/// In-process store keyed by table id. Each table sits behind its own shard lock,
/// so transactions on different tables never contend.
#[derive(Debug, Default)]
pub struct MemoryStore {
    tables: DashMap<TableId, Table>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.tables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }
}

impl TableStore for MemoryStore {
    fn get(&self, id: &TableId) -> TableResult<Table> {
        self.tables.get(id).map(|t| t.clone()).ok_or(TableError::NotFound)
    }

    fn insert(&self, table: Table) -> TableResult<()> {
        use dashmap::mapref::entry::Entry;
        match self.tables.entry(table.id.clone()) {
            Entry::Occupied(_) => Err(TableError::TableExists),
            Entry::Vacant(slot) => {
                slot.insert(table);
                Ok(())
            }
        }
    }

    fn transact(
        &self,
        id: &TableId,
        f: &mut dyn FnMut(&Table) -> TableResult<Table>,
    ) -> TableResult<Table> {
        let mut slot = self.tables.get_mut(id).ok_or(TableError::NotFound)?;
        let mut next = f(&slot)?;
        next.revision = slot.revision + 1;
        *slot = next.clone();
        Ok(next)
    }
}
