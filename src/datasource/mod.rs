// Table data source: one table opened for one statement, with a
// partition- and index-aware cursor, insert paths, and sequence and
// auto-increment access.

pub mod row_buffer;

use std::sync::Arc;
use std::time::Duration;

use crate::binder::statement::BoundBaseTable;
use crate::catalog::{Catalog, DcLock};
use crate::core::alter::AlterTableInfo;
use crate::core::column::Column;
use crate::core::error::EngineError;
use crate::core::index::Index;
use crate::core::table_info::partition_high_bound_us;
use crate::core::value::Value;
use crate::kernel::{
    KernelError, ScanAction, ScanCondition, ScanEdge, StorageKernel, err_code,
};

pub use row_buffer::RowBuffer;

/// Poll budget while waiting for a freshly added partition to show up in
/// the dictionary cache.
const WAIT_REFRESH_DC: usize = 100;
const REFRESH_POLL_INTERVAL: Duration = Duration::from_millis(1);

/// Per-column bounds gathered from a statement's filter, in index column
/// order.
#[derive(Debug, Clone)]
pub struct ColumnBounds {
    pub column: String,
    pub lower: Option<Value>,
    pub upper: Option<Value>,
}

/// Cursor progress. `InPartition(i)` indexes the metadata partition list;
/// unpartitioned scans only ever use `InPartition(0)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanState {
    NotStarted,
    InPartition(usize),
    Done,
}

pub struct TableDataSource<K: StorageKernel> {
    kernel: Arc<K>,
    dc_lock: DcLock,
    table: BoundBaseTable,
    action: ScanAction,
    cursor_idx: usize,
    index_slot: Option<u32>,
    index_parted: bool,
    conditions: Vec<ScanCondition>,
    state: ScanState,
}

impl<K: StorageKernel> TableDataSource<K> {
    pub fn new(
        catalog: &Catalog<K>,
        table: BoundBaseTable,
        action: ScanAction,
        cursor_idx: usize,
    ) -> Self {
        Self {
            kernel: Arc::clone(catalog.kernel()),
            dc_lock: catalog.dc_lock(),
            table,
            action,
            cursor_idx,
            index_slot: None,
            index_parted: false,
            conditions: Vec::new(),
            state: ScanState::NotStarted,
        }
    }

    #[must_use]
    pub fn table(&self) -> &BoundBaseTable {
        &self.table
    }

    #[must_use]
    pub const fn state(&self) -> ScanState {
        self.state
    }

    #[must_use]
    pub fn conditions(&self) -> &[ScanCondition] {
        &self.conditions
    }

    /// Arms an index scan. Bounds are cast to the key column types; both
    /// bounds make an equality edge, a lone lower bound scans from it, a
    /// lone upper bound scans up to it. A bound that fails to cast
    /// silently falls back to a full scan.
    pub fn set_index_scan(&mut self, index: &Index, bounds: &[ColumnBounds]) {
        let mut conditions = Vec::with_capacity(bounds.len());
        for b in bounds {
            let Some(col) = self.table.info.column_by_name(&b.column) else {
                return;
            };
            let cast = |v: &Option<Value>| -> Result<Option<Value>, EngineError> {
                v.as_ref().map(|v| v.try_cast(&col.logical_type)).transpose()
            };
            let (lower, upper) = match (cast(&b.lower), cast(&b.upper)) {
                (Ok(l), Ok(u)) => (l, u),
                _ => {
                    tracing::debug!(
                        column = %b.column,
                        "index bound does not cast to the key type, falling back to full scan"
                    );
                    return;
                }
            };
            let edge = match (&lower, &upper) {
                (Some(_), Some(_)) => ScanEdge::Eq,
                (Some(_), None) => ScanEdge::Ge,
                (None, Some(_)) => ScanEdge::Le,
                (None, None) => break,
            };
            conditions.push(ScanCondition {
                col_slot: col.slot,
                col_type: col.logical_type.id,
                edge,
                lower,
                upper,
            });
        }
        if !conditions.is_empty() {
            self.index_slot = Some(index.slot);
            self.index_parted = index.parted;
            self.conditions = conditions;
        }
    }

    /// A partitioned table is walked partition by partition, except when
    /// scanning through a global (non-local) index, which spans the table.
    #[must_use]
    pub fn need_partition_scan(&self) -> bool {
        self.table.info.is_parted() && (self.index_slot.is_none() || self.index_parted)
    }

    /// Next row, or `None` when the scan is exhausted. Partitioned tables
    /// are walked in metadata order; after the last partition the cursor
    /// is parked back on partition 0.
    pub fn next(&mut self) -> Result<Option<RowBuffer>, EngineError> {
        if self.need_partition_scan() {
            self.partition_next()
        } else {
            self.common_next()
        }
    }

    fn common_next(&mut self) -> Result<Option<RowBuffer>, EngineError> {
        match self.state {
            ScanState::NotStarted => {
                self.open_cursor()?;
                self.state = ScanState::InPartition(0);
            }
            ScanState::InPartition(_) => {}
            ScanState::Done => return Ok(None),
        }
        if self.kernel.cursor_next(self.cursor_idx)? {
            self.state = ScanState::Done;
            return Ok(None);
        }
        self.fetch_row().map(Some)
    }

    fn partition_next(&mut self) -> Result<Option<RowBuffer>, EngineError> {
        loop {
            match self.state {
                ScanState::NotStarted => {
                    if self.part_count() == 0 {
                        self.state = ScanState::Done;
                        return Ok(None);
                    }
                    self.enter_partition(0)?;
                    self.state = ScanState::InPartition(0);
                }
                ScanState::InPartition(i) => {
                    if !self.kernel.cursor_next(self.cursor_idx)? {
                        return self.fetch_row().map(Some);
                    }
                    let next = i + 1;
                    if next < self.part_count() {
                        self.enter_partition(next)?;
                        self.state = ScanState::InPartition(next);
                    } else {
                        // park on partition 0 so a reopened scan starts clean
                        self.kernel.set_partition(self.cursor_idx, 0)?;
                        self.state = ScanState::Done;
                        return Ok(None);
                    }
                }
                ScanState::Done => return Ok(None),
            }
        }
    }

    fn part_count(&self) -> usize {
        self.table
            .info
            .partition
            .as_ref()
            .map_or(0, |d| d.partitions.len())
    }

    fn enter_partition(&mut self, metadata_idx: usize) -> Result<(), EngineError> {
        let part_no = self
            .table
            .info
            .partition
            .as_ref()
            .and_then(|d| d.partitions.get(metadata_idx))
            .map(|p| p.part_no)
            .ok_or_else(|| {
                EngineError::Executor(format!(
                    "partition index {metadata_idx} out of range for table {}",
                    self.table.info.name
                ))
            })?;
        self.kernel.set_partition(self.cursor_idx, part_no)?;
        self.open_cursor()
    }

    fn open_cursor(&self) -> Result<(), EngineError> {
        self.kernel
            .open_table(&self.table.schema, &self.table.bound_name)?;
        self.kernel.open_cursor(
            &self.table.info.name,
            self.index_slot,
            &self.conditions,
            self.action,
            self.cursor_idx,
        )?;
        Ok(())
    }

    fn fetch_row(&self) -> Result<RowBuffer, EngineError> {
        let cells = self
            .kernel
            .cursor_fetch(self.cursor_idx, &self.table.info.columns)?;
        Ok(RowBuffer::pack(&cells))
    }

    pub fn insert(&self, row: &[Column]) -> Result<(), EngineError> {
        self.kernel
            .open_table(&self.table.schema, &self.table.bound_name)?;
        self.kernel.insert_row(&self.table.info.name, row)?;
        Ok(())
    }

    /// Batch insert with one retry. A stale dictionary cache or a
    /// not-yet-ready partition invalidates the partition number; the
    /// retry refreshes table metadata under the dc lock and resubmits
    /// the same rows exactly once.
    pub fn batch_insert(
        &mut self,
        rows: &[Vec<Column>],
        part_name: Option<&str>,
        part_no: Option<u32>,
        ignore_conflict: bool,
    ) -> Result<u64, EngineError> {
        let kernel = Arc::clone(&self.kernel);
        let table_name = self.table.info.name.clone();
        retry_once(
            part_no,
            |part| kernel.batch_insert(&table_name, rows, *part, ignore_conflict),
            |err| {
                if !matches!(
                    err.code,
                    err_code::DC_INVALIDATED | err_code::PARTITION_NOT_READY
                ) {
                    return Err(err.clone().into());
                }
                tracing::warn!(
                    table = %self.table.info.name,
                    code = err.code,
                    "batch insert hit stale partition metadata, refreshing and retrying"
                );
                let dc_lock = Arc::clone(&self.dc_lock);
                let _guard = dc_lock
                    .lock()
                    .unwrap_or_else(std::sync::PoisonError::into_inner);
                self.kernel
                    .open_table(&self.table.schema, &self.table.bound_name)?;
                let Some(name) = part_name else {
                    return Err(err.clone().into());
                };
                let part = self.refresh_partition(name)?.ok_or_else(|| {
                    EngineError::Executor(format!(
                        "partition {name} disappeared during retry"
                    ))
                })?;
                Ok(Some(part))
            },
        )
    }

    /// Re-reads table metadata from the kernel and returns the partition
    /// number matching `part_name`, updating the cached snapshot.
    pub fn refresh_partition(&mut self, part_name: &str) -> Result<Option<u32>, EngineError> {
        let info = self
            .kernel
            .get_table_info(&self.table.schema, &self.table.bound_name)?;
        self.table.info = info;
        Ok(self
            .table
            .info
            .partition_by_name(part_name)
            .map(|p| p.part_no))
    }

    /// Creates the partition covering `part_key` (named
    /// `<table>_<part_key>`) and waits until the dictionary cache serves
    /// it. Another session creating it first is fine.
    pub fn auto_add_partition(&mut self, part_key: &str) -> Result<u32, EngineError> {
        let part_name = format!("{}_{}", self.table.info.name, part_key);
        let hibound_us = partition_high_bound_us(part_key)?;
        {
            let dc_lock = Arc::clone(&self.dc_lock);
            let _guard = dc_lock
                .lock()
                .unwrap_or_else(std::sync::PoisonError::into_inner);
            let result = self.kernel.alter_table(
                &self.table.schema,
                &self.table.bound_name,
                &AlterTableInfo::AddPartition {
                    part_name: part_name.clone(),
                    hibound_us,
                },
            );
            match result {
                Ok(()) => {}
                Err(e) if e.code == err_code::DUPLICATE_PART_NAME => {
                    tracing::warn!(
                        partition = %part_name,
                        "partition already created by another session"
                    );
                }
                Err(e) => return Err(e.into()),
            }
        }
        for _ in 0..WAIT_REFRESH_DC {
            if let Some(part_no) = self.refresh_partition(&part_name)? {
                return Ok(part_no);
            }
            std::thread::sleep(REFRESH_POLL_INTERVAL);
        }
        Err(EngineError::Executor(format!(
            "partition {part_name} did not appear after refresh"
        )))
    }

    pub fn delete(&self) -> Result<(), EngineError> {
        self.kernel.delete_by_cursor(self.cursor_idx)?;
        Ok(())
    }

    pub fn update(&self, columns: &[Column]) -> Result<(), EngineError> {
        self.kernel.update_by_cursor(self.cursor_idx, columns)?;
        Ok(())
    }

    pub fn rows(&self) -> Result<i64, EngineError> {
        Ok(self.kernel.row_count(&self.table.info.name)?)
    }

    pub fn seq_next_value(&self, name: &str) -> Result<i64, EngineError> {
        Ok(self.kernel.seq_next_value(&self.table.schema, name)?)
    }

    /// Current sequence value; a sequence never advanced in this session
    /// falls back to advancing it.
    pub fn seq_curr_value(&self, name: &str) -> Result<i64, EngineError> {
        match self.kernel.seq_curr_value(&self.table.schema, name) {
            Ok(v) => Ok(v),
            Err(e) if e.code == err_code::OBJECT_NOT_FOUND => self.seq_next_value(name),
            Err(e) => Err(e.into()),
        }
    }

    pub fn auto_increment_next(&self) -> Result<i64, EngineError> {
        Ok(self.kernel.auto_increment_next(&self.table.info.name)?)
    }

    pub fn auto_increment_advance(&self, value: i64) -> Result<(), EngineError> {
        Ok(self
            .kernel
            .auto_increment_advance(&self.table.info.name, value)?)
    }
}

/// Runs `op`, and on failure consults `recover` for a fresh argument and
/// runs `op` exactly once more. `recover` decides which errors are
/// retryable by returning them unchanged otherwise.
pub fn retry_once<A, T>(
    arg: A,
    mut op: impl FnMut(&A) -> Result<T, KernelError>,
    recover: impl FnOnce(&KernelError) -> Result<A, EngineError>,
) -> Result<T, EngineError> {
    match op(&arg) {
        Ok(v) => Ok(v),
        Err(e) => {
            let arg = recover(&e)?;
            op(&arg).map_err(Into::into)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::data_type::{LogicalType, TypeId};
    use crate::core::table_info::{PartType, PartitionDesc};
    use crate::kernel::{CreateTableDef, MemoryKernel};

    fn scan_table(catalog: &Catalog<MemoryKernel>) -> BoundBaseTable {
        let mut id = Column::new("id", LogicalType::integer());
        id.slot = 0;
        let mut ts = Column::new("ts", LogicalType::timestamp());
        ts.slot = 1;
        let def = CreateTableDef {
            name: "events".to_string(),
            columns: vec![id, ts],
            constraints: Vec::new(),
            indexes: Vec::new(),
            partition: None,
            is_timescale: false,
            retention: None,
            comment: None,
        };
        catalog.create_table(None, &def, false).unwrap();
        let info = catalog.get_table(None, "events").unwrap().unwrap();
        BoundBaseTable {
            schema: "sys".to_string(),
            bound_name: "events".to_string(),
            info,
        }
    }

    fn id_index() -> Index {
        Index {
            name: "ix_events_id".to_string(),
            table: "events".to_string(),
            columns: vec!["id".to_string()],
            slot: 0,
            is_unique: false,
            is_primary: false,
            parted: false,
        }
    }

    #[test]
    fn index_bounds_pick_the_scan_edge() {
        let catalog = Catalog::new(Arc::new(MemoryKernel::new()), "sys");
        let table = scan_table(&catalog);
        let edge_for = |lower: Option<Value>, upper: Option<Value>| {
            let mut source =
                TableDataSource::new(&catalog, table.clone(), ScanAction::Select, 0);
            source.set_index_scan(
                &id_index(),
                &[ColumnBounds {
                    column: "id".to_string(),
                    lower,
                    upper,
                }],
            );
            source.conditions().first().map(|c| c.edge)
        };
        assert_eq!(
            edge_for(Some(Value::Int(1)), Some(Value::Int(1))),
            Some(ScanEdge::Eq)
        );
        assert_eq!(edge_for(Some(Value::Int(1)), None), Some(ScanEdge::Ge));
        assert_eq!(edge_for(None, Some(Value::Int(9))), Some(ScanEdge::Le));
    }

    #[test]
    fn uncastable_bound_falls_back_to_full_scan() {
        let catalog = Catalog::new(Arc::new(MemoryKernel::new()), "sys");
        let table = scan_table(&catalog);
        let mut source = TableDataSource::new(&catalog, table, ScanAction::Select, 0);
        source.set_index_scan(
            &id_index(),
            &[ColumnBounds {
                column: "id".to_string(),
                lower: Some(Value::Text("not a number".to_string())),
                upper: None,
            }],
        );
        assert!(source.conditions().is_empty());
    }

    #[test]
    fn partition_scan_follows_the_index_locality() {
        let catalog = Catalog::new(Arc::new(MemoryKernel::new()), "sys");
        let mut table = scan_table(&catalog);
        table.info.partition = Some(PartitionDesc {
            part_type: PartType::Range,
            key_slot: 1,
            key_type: TypeId::Timestamp,
            interval: "1d".to_string(),
            auto_addpart: true,
            is_crosspart: false,
            partitions: Vec::new(),
        });

        let source = TableDataSource::new(&catalog, table.clone(), ScanAction::Select, 0);
        assert!(source.need_partition_scan());

        // a global index spans every partition in one cursor
        let mut source = TableDataSource::new(&catalog, table.clone(), ScanAction::Select, 0);
        source.set_index_scan(
            &id_index(),
            &[ColumnBounds {
                column: "id".to_string(),
                lower: Some(Value::Int(1)),
                upper: Some(Value::Int(1)),
            }],
        );
        assert!(!source.need_partition_scan());

        // a local index does not
        let mut local = id_index();
        local.parted = true;
        let mut source = TableDataSource::new(&catalog, table, ScanAction::Select, 0);
        source.set_index_scan(
            &local,
            &[ColumnBounds {
                column: "id".to_string(),
                lower: Some(Value::Int(1)),
                upper: Some(Value::Int(1)),
            }],
        );
        assert!(source.need_partition_scan());
    }

    #[test]
    fn empty_partition_list_ends_the_scan_immediately() {
        let catalog = Catalog::new(Arc::new(MemoryKernel::new()), "sys");
        let mut table = scan_table(&catalog);
        table.info.partition = Some(PartitionDesc {
            part_type: PartType::Range,
            key_slot: 1,
            key_type: TypeId::Timestamp,
            interval: "1d".to_string(),
            auto_addpart: true,
            is_crosspart: false,
            partitions: Vec::new(),
        });
        let mut source = TableDataSource::new(&catalog, table, ScanAction::Select, 0);
        assert!(source.next().unwrap().is_none());
        assert_eq!(source.state(), ScanState::Done);
    }

    #[test]
    fn retry_once_retries_exactly_once() {
        let mut calls = 0;
        let out: Result<i32, EngineError> = retry_once(
            1,
            |_| {
                calls += 1;
                if calls == 1 {
                    Err(KernelError::new(err_code::DC_INVALIDATED, "stale"))
                } else {
                    Ok(42)
                }
            },
            |_| Ok(2),
        );
        assert_eq!(out.unwrap(), 42);
        assert_eq!(calls, 2);
    }

    #[test]
    fn retry_once_propagates_second_failure() {
        let mut calls = 0;
        let out: Result<i32, EngineError> = retry_once(
            (),
            |()| {
                calls += 1;
                Err(KernelError::new(err_code::PARTITION_NOT_READY, "not ready"))
            },
            |_| Ok(()),
        );
        assert!(out.is_err());
        assert_eq!(calls, 2);
    }

    #[test]
    fn retry_once_respects_non_retryable_errors() {
        let mut calls = 0;
        let out: Result<i32, EngineError> = retry_once(
            (),
            |()| {
                calls += 1;
                Err(KernelError::new(err_code::DUPLICATE_KEY, "dup"))
            },
            |e| Err(e.clone().into()),
        );
        assert!(out.is_err());
        assert_eq!(calls, 1);
    }
}
