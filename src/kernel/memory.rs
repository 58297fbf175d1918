// In-memory kernel: a reference implementation of the storage boundary.
// Single process, no persistence. Backs the test suite and embedded
// scratch sessions.

use std::cmp::Ordering;
use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering as AtomicOrdering};

use crate::core::alter::AlterTableInfo;
use crate::core::column::Column;
use crate::core::index::Index;
use crate::core::table_info::{PartitionInfo, TableInfo};
use crate::core::value::Value;
use crate::kernel::{
    CreateTableDef, KernelError, ObjectKind, ObjectPrivilege, ScanAction, ScanCondition, ScanEdge,
    SequenceDef, StorageKernel, SysPrivilege, err_code,
};

#[derive(Debug, Clone)]
struct StoredRow {
    part_no: u32,
    values: Vec<Value>,
}

#[derive(Debug)]
struct StoredTable {
    info: TableInfo,
    rows: BTreeMap<u64, StoredRow>,
    next_row_id: u64,
    next_part_no: u32,
    auto_increment: i64,
}

#[derive(Debug)]
struct SeqState {
    def: SequenceDef,
    current: Option<i64>,
}

#[derive(Debug, Default)]
struct Cursor {
    /// Snapshot of (row id, values) taken at open time.
    rows: Vec<(u64, Vec<Value>)>,
    table: String,
    /// Position after the last `cursor_next`; 0 means not advanced yet.
    pos: usize,
}

#[derive(Default)]
struct Inner {
    tables: HashMap<String, StoredTable>,
    synonyms: HashMap<String, String>,
    sequences: HashMap<String, SeqState>,
    views: HashSet<String>,
    users: Vec<String>,
    cursors: HashMap<usize, Cursor>,
    /// Pending partition position per cursor index, consumed by `open_cursor`.
    part_position: HashMap<usize, u32>,
    denied_sys: HashSet<(String, String)>,
    denied_obj: HashSet<(String, String, String, String)>,
    /// One-shot fault injected into the next `batch_insert`.
    fail_next_batch: Option<i32>,
    /// Partition names reported missing until `reveal_partitions` is called.
    hidden_partitions: HashSet<String>,
}

/// In-memory [`StorageKernel`]. All state lives behind one mutex; the
/// trait takes `&self` so sessions can share it through an `Arc`.
#[derive(Default)]
pub struct MemoryKernel {
    inner: Mutex<Inner>,
    batch_calls: AtomicUsize,
}

impl MemoryKernel {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn key(user: &str, table: &str) -> String {
        format!("{}.{}", user.to_ascii_lowercase(), table.to_ascii_lowercase())
    }

    /// Number of `batch_insert` calls the kernel has seen.
    #[must_use]
    pub fn batch_insert_calls(&self) -> usize {
        self.batch_calls.load(AtomicOrdering::SeqCst)
    }

    /// Makes the next `batch_insert` fail once with the given code.
    pub fn inject_batch_error(&self, code: i32) {
        self.lock().fail_next_batch = Some(code);
    }

    /// Registers `name` as a synonym resolving to `target` (both keyed
    /// as `user.object`).
    pub fn create_synonym(&self, user: &str, name: &str, target_user: &str, target: &str) {
        let mut inner = self.lock();
        let from = Self::key(user, name);
        let to = Self::key(target_user, target);
        inner.synonyms.insert(from, to);
    }

    pub fn deny_sys_privilege(&self, user: &str, privilege: SysPrivilege) {
        self.lock()
            .denied_sys
            .insert((user.to_string(), format!("{privilege:?}")));
    }

    pub fn deny_privilege(&self, user: &str, owner: &str, object: &str, privilege: ObjectPrivilege) {
        self.lock().denied_obj.insert((
            user.to_string(),
            owner.to_string(),
            object.to_string(),
            format!("{privilege:?}"),
        ));
    }

    /// Hides a partition from `get_table_info` until revealed; models the
    /// window where another session added it but the dictionary cache has
    /// not caught up.
    pub fn hide_partition(&self, part_name: &str) {
        self.lock().hidden_partitions.insert(part_name.to_string());
    }

    pub fn reveal_partitions(&self) {
        self.lock().hidden_partitions.clear();
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(std::sync::PoisonError::into_inner)
    }
}

impl Inner {
    fn resolve_key(&self, user: &str, table: &str) -> String {
        let key = MemoryKernel::key(user, table);
        self.synonyms.get(&key).cloned().unwrap_or(key)
    }

    fn table(&self, user: &str, table: &str) -> Result<&StoredTable, KernelError> {
        let key = self.resolve_key(user, table);
        self.tables.get(&key).ok_or_else(|| {
            KernelError::new(err_code::OBJECT_NOT_FOUND, format!("table {table} not found"))
        })
    }

    fn table_mut(&mut self, user: &str, table: &str) -> Result<&mut StoredTable, KernelError> {
        let key = self.resolve_key(user, table);
        self.tables.get_mut(&key).ok_or_else(|| {
            KernelError::new(err_code::OBJECT_NOT_FOUND, format!("table {table} not found"))
        })
    }

    fn intern_user(&mut self, name: &str) -> u32 {
        if let Some(pos) = self.users.iter().position(|u| u == name) {
            return pos as u32;
        }
        self.users.push(name.to_string());
        (self.users.len() - 1) as u32
    }

    /// Tables are stored under their owner; a bare name search scans all
    /// owners. Sessions address tables as `user.table` through the
    /// catalog, so collisions cannot happen here.
    fn find_table_key(&self, table: &str) -> Option<String> {
        let suffix = format!(".{}", table.to_ascii_lowercase());
        self.tables.keys().find(|k| k.ends_with(&suffix)).cloned()
    }
}

fn value_cmp(a: &Value, b: &Value) -> Option<Ordering> {
    match (a, b) {
        (Value::Int(x), Value::Int(y)) => Some(x.cmp(y)),
        (Value::Real(x), Value::Real(y)) => x.partial_cmp(y),
        (Value::Int(x), Value::Real(y)) => (*x as f64).partial_cmp(y),
        (Value::Real(x), Value::Int(y)) => x.partial_cmp(&(*y as f64)),
        (Value::Decimal(x), Value::Decimal(y)) => Some(x.cmp(y)),
        (Value::Text(x), Value::Text(y)) => Some(x.cmp(y)),
        (Value::Boolean(x), Value::Boolean(y)) => Some(x.cmp(y)),
        (Value::Timestamp(x), Value::Timestamp(y)) => Some(x.cmp(y)),
        (Value::Date(x), Value::Date(y)) => Some(x.cmp(y)),
        _ => None,
    }
}

fn matches_conditions(row: &[Value], conditions: &[ScanCondition]) -> bool {
    conditions.iter().all(|cond| {
        let Some(cell) = row.get(cond.col_slot as usize) else {
            return false;
        };
        if cell.is_null() {
            return false;
        }
        let ge_lower = cond.lower.as_ref().is_none_or(|low| {
            matches!(value_cmp(cell, low), Some(Ordering::Greater | Ordering::Equal))
        });
        let le_upper = cond.upper.as_ref().is_none_or(|up| {
            matches!(value_cmp(cell, up), Some(Ordering::Less | Ordering::Equal))
        });
        match cond.edge {
            ScanEdge::Eq => ge_lower && le_upper,
            ScanEdge::Ge => ge_lower,
            ScanEdge::Le => le_upper,
        }
    })
}

fn row_from_columns(columns: &[Column], width: usize) -> Vec<Value> {
    let mut values = vec![Value::Null; width];
    for col in columns {
        if let (Some(v), true) = (&col.crud_value, (col.slot as usize) < width) {
            values[col.slot as usize] = v.clone();
        }
    }
    values
}

fn duplicate_key(table: &StoredTable, values: &[Value]) -> bool {
    let key_slots: Vec<usize> = table
        .info
        .columns
        .iter()
        .filter(|c| c.is_primary || c.is_unique)
        .map(|c| c.slot as usize)
        .collect();
    if key_slots.is_empty() {
        return false;
    }
    table.rows.values().any(|row| {
        key_slots
            .iter()
            .all(|&s| row.values.get(s) == values.get(s) && values.get(s).is_some_and(|v| !v.is_null()))
    })
}

impl StorageKernel for MemoryKernel {
    fn open_table(&self, user: &str, table: &str) -> Result<(), KernelError> {
        self.lock().table(user, table).map(|_| ())
    }

    fn open_cursor(
        &self,
        table: &str,
        _index_slot: Option<u32>,
        conditions: &[ScanCondition],
        _action: ScanAction,
        cursor_idx: usize,
    ) -> Result<(), KernelError> {
        let mut inner = self.lock();
        let part = inner.part_position.get(&cursor_idx).copied();
        let key = inner.find_table_key(table).ok_or_else(|| {
            KernelError::new(err_code::OBJECT_NOT_FOUND, format!("table {table} not found"))
        })?;
        let stored = &inner.tables[&key];
        let parted = stored.info.is_parted();
        let rows: Vec<(u64, Vec<Value>)> = stored
            .rows
            .iter()
            .filter(|(_, row)| !parted || part.is_none_or(|p| row.part_no == p))
            .filter(|(_, row)| matches_conditions(&row.values, conditions))
            .map(|(id, row)| (*id, row.values.clone()))
            .collect();
        inner.cursors.insert(
            cursor_idx,
            Cursor {
                rows,
                table: key,
                pos: 0,
            },
        );
        Ok(())
    }

    fn set_partition(&self, cursor_idx: usize, part_no: u32) -> Result<(), KernelError> {
        self.lock().part_position.insert(cursor_idx, part_no);
        Ok(())
    }

    fn cursor_next(&self, cursor_idx: usize) -> Result<bool, KernelError> {
        let mut inner = self.lock();
        let cursor = inner
            .cursors
            .get_mut(&cursor_idx)
            .ok_or_else(|| KernelError::new(err_code::OBJECT_NOT_FOUND, "cursor not open"))?;
        if cursor.pos >= cursor.rows.len() {
            return Ok(true);
        }
        cursor.pos += 1;
        Ok(false)
    }

    fn cursor_fetch(
        &self,
        cursor_idx: usize,
        columns: &[Column],
    ) -> Result<Vec<Option<Value>>, KernelError> {
        let inner = self.lock();
        let cursor = inner
            .cursors
            .get(&cursor_idx)
            .ok_or_else(|| KernelError::new(err_code::OBJECT_NOT_FOUND, "cursor not open"))?;
        let (_, row) = cursor
            .rows
            .get(cursor.pos.wrapping_sub(1))
            .ok_or_else(|| KernelError::new(err_code::OBJECT_NOT_FOUND, "cursor not positioned"))?;
        Ok(columns
            .iter()
            .map(|c| {
                row.get(c.slot as usize)
                    .filter(|v| !v.is_null())
                    .cloned()
            })
            .collect())
    }

    fn insert_row(&self, table: &str, row: &[Column]) -> Result<(), KernelError> {
        self.batch_insert(table, &[row.to_vec()], None, false)
            .map(|_| ())
    }

    fn batch_insert(
        &self,
        table: &str,
        rows: &[Vec<Column>],
        part_no: Option<u32>,
        ignore_conflict: bool,
    ) -> Result<u64, KernelError> {
        self.batch_calls.fetch_add(1, AtomicOrdering::SeqCst);
        let mut inner = self.lock();
        if let Some(code) = inner.fail_next_batch.take() {
            return Err(KernelError::new(code, "injected batch failure"));
        }
        let key = inner.find_table_key(table).ok_or_else(|| {
            KernelError::new(err_code::OBJECT_NOT_FOUND, format!("table {table} not found"))
        })?;
        let stored = inner
            .tables
            .get_mut(&key)
            .ok_or_else(|| KernelError::new(err_code::OBJECT_NOT_FOUND, "table vanished"))?;
        if let Some(p) = part_no {
            let known = stored
                .info
                .partition
                .as_ref()
                .is_some_and(|d| d.partitions.iter().any(|part| part.part_no == p));
            if !known {
                return Err(KernelError::new(
                    err_code::PARTITION_NOT_READY,
                    format!("partition {p} not ready"),
                ));
            }
        }
        let width = stored.info.columns.len();
        let mut inserted = 0;
        for row in rows {
            let values = row_from_columns(row, width);
            if duplicate_key(stored, &values) {
                if ignore_conflict {
                    continue;
                }
                return Err(KernelError::new(err_code::DUPLICATE_KEY, "duplicate key"));
            }
            let id = stored.next_row_id;
            stored.next_row_id += 1;
            stored.rows.insert(
                id,
                StoredRow {
                    part_no: part_no.unwrap_or(0),
                    values,
                },
            );
            inserted += 1;
        }
        Ok(inserted)
    }

    fn update_by_cursor(&self, cursor_idx: usize, columns: &[Column]) -> Result<(), KernelError> {
        let mut inner = self.lock();
        let (table, row_id) = {
            let cursor = inner
                .cursors
                .get(&cursor_idx)
                .ok_or_else(|| KernelError::new(err_code::OBJECT_NOT_FOUND, "cursor not open"))?;
            let (id, _) = cursor.rows.get(cursor.pos.wrapping_sub(1)).ok_or_else(|| {
                KernelError::new(err_code::OBJECT_NOT_FOUND, "cursor not positioned")
            })?;
            (cursor.table.clone(), *id)
        };
        let stored = inner
            .tables
            .get_mut(&table)
            .ok_or_else(|| KernelError::new(err_code::OBJECT_NOT_FOUND, "table vanished"))?;
        if let Some(row) = stored.rows.get_mut(&row_id) {
            for col in columns {
                if let Some(v) = &col.crud_value {
                    if let Some(cell) = row.values.get_mut(col.slot as usize) {
                        *cell = v.clone();
                    }
                }
            }
        }
        Ok(())
    }

    fn delete_by_cursor(&self, cursor_idx: usize) -> Result<(), KernelError> {
        let mut inner = self.lock();
        let (table, row_id) = {
            let cursor = inner
                .cursors
                .get(&cursor_idx)
                .ok_or_else(|| KernelError::new(err_code::OBJECT_NOT_FOUND, "cursor not open"))?;
            let (id, _) = cursor.rows.get(cursor.pos.wrapping_sub(1)).ok_or_else(|| {
                KernelError::new(err_code::OBJECT_NOT_FOUND, "cursor not positioned")
            })?;
            (cursor.table.clone(), *id)
        };
        if let Some(stored) = inner.tables.get_mut(&table) {
            stored.rows.remove(&row_id);
        }
        Ok(())
    }

    fn row_count(&self, table: &str) -> Result<i64, KernelError> {
        let inner = self.lock();
        let key = inner.find_table_key(table).ok_or_else(|| {
            KernelError::new(err_code::OBJECT_NOT_FOUND, format!("table {table} not found"))
        })?;
        Ok(inner.tables[&key].rows.len() as i64)
    }

    fn get_table_info(&self, user: &str, table: &str) -> Result<TableInfo, KernelError> {
        let inner = self.lock();
        let stored = inner.table(user, table)?;
        let mut info = stored.info.clone();
        if !inner.hidden_partitions.is_empty() {
            if let Some(desc) = &mut info.partition {
                desc.partitions
                    .retain(|p| !inner.hidden_partitions.contains(&p.name));
            }
        }
        Ok(info)
    }

    fn create_table(&self, user: &str, def: &CreateTableDef) -> Result<(), KernelError> {
        let mut inner = self.lock();
        let key = Self::key(user, &def.name);
        if inner.tables.contains_key(&key) {
            return Err(KernelError::new(
                err_code::DUPLICATE_OBJECT,
                format!("table {} already exists", def.name),
            ));
        }
        let user_id = inner.intern_user(user);
        let info = TableInfo {
            user: user.to_string(),
            user_id,
            name: def.name.clone(),
            space: crate::core::table_info::SpaceKind::Users,
            columns: def.columns.clone(),
            indexes: def.indexes.clone(),
            constraints: def.constraints.clone(),
            partition: def.partition.clone(),
            is_timescale: def.is_timescale,
            retention: def.retention.clone(),
            comment: def.comment.clone(),
        };
        inner.tables.insert(
            key,
            StoredTable {
                info,
                rows: BTreeMap::new(),
                next_row_id: 0,
                next_part_no: 0,
                auto_increment: 0,
            },
        );
        Ok(())
    }

    fn create_index(&self, user: &str, index: &Index) -> Result<(), KernelError> {
        let mut inner = self.lock();
        let stored = inner.table_mut(user, &index.table)?;
        if stored.info.indexes.iter().any(|i| i.name == index.name) {
            return Err(KernelError::new(
                err_code::DUPLICATE_OBJECT,
                format!("index {} already exists", index.name),
            ));
        }
        let mut index = index.clone();
        index.slot = stored.info.indexes.len() as u32;
        stored.info.indexes.push(index);
        Ok(())
    }

    fn alter_table(
        &self,
        user: &str,
        table: &str,
        info: &AlterTableInfo,
    ) -> Result<(), KernelError> {
        let mut inner = self.lock();
        let key = inner.resolve_key(user, table);
        // renames move the entry to a new key, everything else edits in place
        if let AlterTableInfo::RenameTable { new_name } = info {
            let new_key = Self::key(user, new_name);
            if inner.tables.contains_key(&new_key) {
                return Err(KernelError::new(
                    err_code::DUPLICATE_OBJECT,
                    format!("table {new_name} already exists"),
                ));
            }
            let mut stored = inner.tables.remove(&key).ok_or_else(|| {
                KernelError::new(err_code::OBJECT_NOT_FOUND, format!("table {table} not found"))
            })?;
            stored.info.name = new_name.clone();
            inner.tables.insert(new_key, stored);
            return Ok(());
        }
        let stored = inner.tables.get_mut(&key).ok_or_else(|| {
            KernelError::new(err_code::OBJECT_NOT_FOUND, format!("table {table} not found"))
        })?;
        match info {
            AlterTableInfo::AddColumn { column } => {
                let mut column = column.clone();
                column.slot = stored.info.columns.len() as u16;
                stored.info.columns.push(column);
                for row in stored.rows.values_mut() {
                    row.values.push(Value::Null);
                }
            }
            AlterTableInfo::DropColumn { column } => {
                stored
                    .info
                    .columns
                    .retain(|c| !c.name.eq_ignore_ascii_case(column));
            }
            AlterTableInfo::ModifyColumn { column } => {
                if let Some(slot) = stored
                    .info
                    .columns
                    .iter()
                    .position(|c| c.name.eq_ignore_ascii_case(&column.name))
                {
                    let mut column = column.clone();
                    column.slot = slot as u16;
                    stored.info.columns[slot] = column;
                }
            }
            AlterTableInfo::RenameColumn { old_name, new_name } => {
                if let Some(col) = stored
                    .info
                    .columns
                    .iter_mut()
                    .find(|c| c.name.eq_ignore_ascii_case(old_name))
                {
                    col.name = new_name.clone();
                }
            }
            AlterTableInfo::AddPartition {
                part_name,
                hibound_us,
            } => {
                let next_no = stored.next_part_no;
                let Some(desc) = stored.info.partition.as_mut() else {
                    return Err(KernelError::new(
                        err_code::OBJECT_NOT_FOUND,
                        format!("table {table} is not partitioned"),
                    ));
                };
                if desc.partitions.iter().any(|p| p.name == *part_name) {
                    return Err(KernelError::new(
                        err_code::DUPLICATE_PART_NAME,
                        format!("partition {part_name} already exists"),
                    ));
                }
                desc.partitions.push(PartitionInfo {
                    name: part_name.clone(),
                    part_no: next_no,
                    hibound_us: *hibound_us,
                });
                stored.next_part_no += 1;
            }
            AlterTableInfo::DropPartition { part_name } => {
                if let Some(desc) = stored.info.partition.as_mut() {
                    let before = desc.partitions.len();
                    desc.partitions.retain(|p| p.name != *part_name);
                    if desc.partitions.len() == before {
                        return Err(KernelError::new(
                            err_code::OBJECT_NOT_FOUND,
                            format!("partition {part_name} not found"),
                        ));
                    }
                }
            }
            AlterTableInfo::AddConstraint {
                name,
                ctype,
                columns,
            } => {
                stored.info.constraints.push(
                    crate::core::constraints::Constraint::key(
                        *ctype,
                        name.clone(),
                        columns.clone(),
                    ),
                );
            }
            AlterTableInfo::SetComment { comment } => {
                stored.info.comment = Some(comment.clone());
            }
            AlterTableInfo::RenameTable { .. } => unreachable!(),
        }
        Ok(())
    }

    fn create_sequence(&self, user: &str, def: &SequenceDef) -> Result<(), KernelError> {
        let mut inner = self.lock();
        let key = Self::key(user, &def.name);
        if inner.sequences.contains_key(&key) {
            return Err(KernelError::new(
                err_code::DUPLICATE_OBJECT,
                format!("sequence {} already exists", def.name),
            ));
        }
        inner.sequences.insert(
            key,
            SeqState {
                def: def.clone(),
                current: None,
            },
        );
        Ok(())
    }

    fn create_view(
        &self,
        user: &str,
        name: &str,
        _columns: &[Column],
        _query_text: &str,
    ) -> Result<(), KernelError> {
        let mut inner = self.lock();
        let key = Self::key(user, name);
        if !inner.views.insert(key) {
            return Err(KernelError::new(
                err_code::DUPLICATE_OBJECT,
                format!("view {name} already exists"),
            ));
        }
        Ok(())
    }

    fn drop_object(&self, user: &str, name: &str, kind: ObjectKind) -> Result<(), KernelError> {
        let mut inner = self.lock();
        let key = Self::key(user, name);
        let missing = || {
            KernelError::new(
                err_code::OBJECT_NOT_FOUND,
                format!("{kind:?} {name} not found"),
            )
        };
        match kind {
            ObjectKind::Table => inner.tables.remove(&key).map(|_| ()).ok_or_else(missing),
            ObjectKind::Sequence => inner.sequences.remove(&key).map(|_| ()).ok_or_else(missing),
            ObjectKind::View => {
                if inner.views.remove(&key) {
                    Ok(())
                } else {
                    Err(missing())
                }
            }
            ObjectKind::Synonym => inner.synonyms.remove(&key).map(|_| ()).ok_or_else(missing),
            ObjectKind::Index => {
                for stored in inner.tables.values_mut() {
                    let before = stored.info.indexes.len();
                    stored.info.indexes.retain(|i| !i.name.eq_ignore_ascii_case(name));
                    if stored.info.indexes.len() != before {
                        return Ok(());
                    }
                }
                Err(missing())
            }
        }
    }

    fn sequence_exists(&self, user: &str, name: &str) -> Result<bool, KernelError> {
        Ok(self.lock().sequences.contains_key(&Self::key(user, name)))
    }

    fn seq_next_value(&self, user: &str, name: &str) -> Result<i64, KernelError> {
        let mut inner = self.lock();
        let key = Self::key(user, name);
        let seq = inner.sequences.get_mut(&key).ok_or_else(|| {
            KernelError::new(err_code::OBJECT_NOT_FOUND, format!("sequence {name} not found"))
        })?;
        let next = match seq.current {
            None => seq.def.start_value,
            Some(cur) => {
                let next = cur + seq.def.increment;
                if next > seq.def.max_value || next < seq.def.min_value {
                    if !seq.def.cycle {
                        return Err(KernelError::new(
                            err_code::OBJECT_NOT_FOUND,
                            format!("sequence {name} exhausted"),
                        ));
                    }
                    if seq.def.increment > 0 { seq.def.min_value } else { seq.def.max_value }
                } else {
                    next
                }
            }
        };
        seq.current = Some(next);
        Ok(next)
    }

    fn seq_curr_value(&self, user: &str, name: &str) -> Result<i64, KernelError> {
        let inner = self.lock();
        let key = Self::key(user, name);
        let seq = inner.sequences.get(&key).ok_or_else(|| {
            KernelError::new(err_code::OBJECT_NOT_FOUND, format!("sequence {name} not found"))
        })?;
        seq.current.ok_or_else(|| {
            KernelError::new(
                err_code::OBJECT_NOT_FOUND,
                format!("sequence {name} not advanced in this session"),
            )
        })
    }

    fn auto_increment_next(&self, table: &str) -> Result<i64, KernelError> {
        let mut inner = self.lock();
        let key = inner.find_table_key(table).ok_or_else(|| {
            KernelError::new(err_code::OBJECT_NOT_FOUND, format!("table {table} not found"))
        })?;
        let stored = inner
            .tables
            .get_mut(&key)
            .ok_or_else(|| KernelError::new(err_code::OBJECT_NOT_FOUND, "table vanished"))?;
        stored.auto_increment += 1;
        Ok(stored.auto_increment)
    }

    fn auto_increment_advance(&self, table: &str, value: i64) -> Result<(), KernelError> {
        let mut inner = self.lock();
        let key = inner.find_table_key(table).ok_or_else(|| {
            KernelError::new(err_code::OBJECT_NOT_FOUND, format!("table {table} not found"))
        })?;
        let stored = inner
            .tables
            .get_mut(&key)
            .ok_or_else(|| KernelError::new(err_code::OBJECT_NOT_FOUND, "table vanished"))?;
        stored.auto_increment = stored.auto_increment.max(value);
        Ok(())
    }

    fn begin(&self) -> Result<(), KernelError> {
        Ok(())
    }

    fn commit(&self) -> Result<(), KernelError> {
        Ok(())
    }

    fn rollback(&self) -> Result<(), KernelError> {
        Ok(())
    }

    fn check_sys_privilege(
        &self,
        user: &str,
        privilege: SysPrivilege,
    ) -> Result<bool, KernelError> {
        Ok(!self
            .lock()
            .denied_sys
            .contains(&(user.to_string(), format!("{privilege:?}"))))
    }

    fn check_privilege(
        &self,
        user: &str,
        owner: &str,
        object: &str,
        privilege: ObjectPrivilege,
    ) -> Result<bool, KernelError> {
        Ok(!self.lock().denied_obj.contains(&(
            user.to_string(),
            owner.to_string(),
            object.to_string(),
            format!("{privilege:?}"),
        )))
    }

    fn user_name(&self, user_id: u32) -> Result<String, KernelError> {
        self.lock()
            .users
            .get(user_id as usize)
            .cloned()
            .ok_or_else(|| {
                KernelError::new(err_code::OBJECT_NOT_FOUND, format!("user {user_id} not found"))
            })
    }
}
