/// INSERT execution: defaults, auto-increment, partition routing and
/// batched submission to the kernel.
use std::collections::HashMap;

use rust_decimal::Decimal;

use crate::binder::default_value::{eval_volatile_default, parse_function_default};
use crate::binder::expression::BoundExpression;
use crate::binder::statement::InsertStatement;
use crate::catalog::Catalog;
use crate::core::column::{Column, DefaultValue};
use crate::core::data_type::TypeId;
use crate::core::error::EngineError;
use crate::core::value::Value;
use crate::datasource::TableDataSource;
use crate::executor::RecordBatch;
use crate::kernel::{ScanAction, StorageKernel};

pub const PAGE_SIZE: usize = 8192;
/// Largest single row the kernel accepts, one page minus its header.
pub const MAX_ROW_SIZE: usize = PAGE_SIZE - 256;
pub const MIN_ROW_SIZE: usize = 16;
/// Kernel batch API takes at most this many rows per call.
pub const MAX_BATCH_ROW_COUNT: usize = 255;
/// Staged rows across all partitions before a forced flush.
pub const MAX_LOOP_BATCH_SIZE: usize = MAX_BATCH_ROW_COUNT * 10;

/// Rows staged for one partition.
struct PartGroup {
    part_no: Option<u32>,
    part_name: Option<String>,
    rows: Vec<Vec<Column>>,
}

pub struct InsertExec<'a, K: StorageKernel> {
    source: TableDataSource<K>,
    stmt: &'a InsertStatement,
}

impl<'a, K: StorageKernel> InsertExec<'a, K> {
    pub fn new(catalog: &Catalog<K>, stmt: &'a InsertStatement) -> Self {
        let source = TableDataSource::new(catalog, stmt.table.clone(), ScanAction::Select, 0);
        Self { source, stmt }
    }

    pub fn execute(&mut self) -> Result<RecordBatch, EngineError> {
        let table_name = self.stmt.table.info.name.clone();
        let parted = self.stmt.table.info.is_parted();
        let part_desc = self.stmt.table.info.partition.clone();
        let auto_slot = self
            .stmt
            .table
            .info
            .auto_increment_column()
            .map(|c| c.slot);

        let mut groups: Vec<PartGroup> = Vec::new();
        let mut group_index: HashMap<String, usize> = HashMap::new();
        let mut staged = 0usize;
        let mut affected = 0u64;
        let mut last_insert_rowid = 0i64;
        // crosspart tables route every row where the first row went
        let mut fixed_key: Option<String> = None;

        let rows = self.stmt.rows.clone();
        for row_exprs in &rows {
            let row = self.materialize_row(row_exprs, auto_slot, &mut last_insert_rowid)?;

            let group_key = if parted {
                let desc = part_desc.as_ref().ok_or_else(|| {
                    EngineError::Executor("partitioned table without partition metadata".into())
                })?;
                let key = match &fixed_key {
                    Some(k) => k.clone(),
                    None => {
                        let key = partition_key_of(&row, desc.key_slot, desc.interval_is_hour())?;
                        if desc.is_crosspart {
                            fixed_key = Some(key.clone());
                        }
                        key
                    }
                };
                key
            } else {
                String::new()
            };

            let idx = match group_index.get(&group_key) {
                Some(&idx) => idx,
                None => {
                    let (part_no, part_name) = if parted {
                        let part_name = format!("{table_name}_{group_key}");
                        (Some(self.resolve_partition(&group_key)?), Some(part_name))
                    } else {
                        (None, None)
                    };
                    groups.push(PartGroup {
                        part_no,
                        part_name,
                        rows: Vec::new(),
                    });
                    group_index.insert(group_key, groups.len() - 1);
                    groups.len() - 1
                }
            };
            groups[idx].rows.push(row);
            staged += 1;

            if staged >= MAX_LOOP_BATCH_SIZE {
                affected += self.flush_groups(&mut groups)?;
                staged = 0;
            }
        }
        affected += self.flush_groups(&mut groups)?;

        Ok(RecordBatch {
            affected_rows: affected,
            last_insert_rowid,
            ..RecordBatch::default()
        })
    }

    /// Builds the full staged row: evaluates the statement's expressions,
    /// fills defaults and auto-increment, casts everything to column types.
    fn materialize_row(
        &mut self,
        exprs: &[BoundExpression],
        auto_slot: Option<u16>,
        last_insert_rowid: &mut i64,
    ) -> Result<Vec<Column>, EngineError> {
        if exprs.len() != self.stmt.bound_columns.len() {
            return Err(EngineError::Executor(format!(
                "row has {} values but {} columns were bound",
                exprs.len(),
                self.stmt.bound_columns.len()
            )));
        }
        let mut row: Vec<Column> = self.stmt.table.info.columns.clone();

        let bound_columns = self.stmt.bound_columns.clone();
        for (col, expr) in bound_columns.iter().zip(exprs) {
            let value = self.eval_insert_expr(expr)?;
            row[col.slot as usize].crud_value = Some(value);
        }
        let bound_defaults = self.stmt.bound_defaults.clone();
        for col in &bound_defaults {
            let value = self.resolve_default(col)?;
            row[col.slot as usize].crud_value = Some(value);
        }
        for col in &self.stmt.unbound_columns {
            row[col.slot as usize].crud_value = Some(Value::Null);
        }

        if let Some(slot) = auto_slot {
            let staged = row[slot as usize]
                .crud_value
                .clone()
                .unwrap_or(Value::Null);
            let value = match staged {
                Value::Null => self.source.auto_increment_next()?,
                supplied => {
                    let v = supplied
                        .try_cast(&row[slot as usize].logical_type)?
                        .as_int()
                        .ok_or_else(|| {
                            EngineError::Executor(
                                "auto-increment value must be an integer".into(),
                            )
                        })?;
                    // the counter only ever moves forward
                    self.source.auto_increment_advance(v)?;
                    v
                }
            };
            row[slot as usize].crud_value = Some(Value::Int(value));
            *last_insert_rowid = value;
        }

        for col in &mut row {
            let staged = col.crud_value.take().unwrap_or(Value::Null);
            if staged.is_null() && !col.nullable && !col.is_auto_increment {
                return Err(EngineError::Executor(format!(
                    "null value in column {} violates not-null constraint",
                    col.name
                )));
            }
            let cast = staged.try_cast(&col.logical_type).map_err(|e| match e {
                EngineError::OutOfRange(m) => {
                    EngineError::OutOfRange(format!("column {}: {m}", col.name))
                }
                other => other,
            })?;
            col.crud_value = Some(cast);
        }
        Ok(row)
    }

    fn eval_insert_expr(&self, expr: &BoundExpression) -> Result<Value, EngineError> {
        match expr {
            BoundExpression::Constant(v) => Ok(v.clone()),
            BoundExpression::Function { name, .. } => eval_volatile_default(name),
            BoundExpression::SeqFunc { func, sequence } => {
                let v = if func == "currval" {
                    self.source.seq_curr_value(sequence)?
                } else {
                    self.source.seq_next_value(sequence)?
                };
                Ok(Value::Int(v))
            }
            other => Err(EngineError::Executor(format!(
                "expression {other:?} cannot appear in VALUES"
            ))),
        }
    }

    fn resolve_default(&self, col: &Column) -> Result<Value, EngineError> {
        let value = match &col.default {
            None => Value::Null,
            Some(DefaultValue::Literal(v)) => v.clone(),
            Some(DefaultValue::Function(text)) => {
                let (func, arg) = parse_function_default(text);
                match (func, arg) {
                    ("nextval", Some(seq)) => Value::Int(self.source.seq_next_value(seq)?),
                    ("currval", Some(seq)) => Value::Int(self.source.seq_curr_value(seq)?),
                    (other, None) => eval_volatile_default(other)?,
                    _ => {
                        return Err(EngineError::Executor(format!(
                            "malformed function default: {text}"
                        )));
                    }
                }
            }
        };
        value.try_cast(&col.logical_type)
    }

    /// Partition number for a key, creating the partition when the table
    /// auto-adds them.
    fn resolve_partition(&mut self, part_key: &str) -> Result<u32, EngineError> {
        let part_name = format!("{}_{}", self.source.table().info.name, part_key);
        if let Some(part) = self.source.table().info.partition_by_name(&part_name) {
            return Ok(part.part_no);
        }
        let auto_addpart = self
            .source
            .table()
            .info
            .partition
            .as_ref()
            .is_some_and(|d| d.auto_addpart);
        if auto_addpart {
            return self.source.auto_add_partition(part_key);
        }
        Err(EngineError::Executor(format!(
            "no partition of {} covers key {part_key}",
            self.source.table().info.name
        )))
    }

    fn flush_groups(&mut self, groups: &mut Vec<PartGroup>) -> Result<u64, EngineError> {
        let mut affected = 0;
        for group in groups.iter_mut() {
            affected += self.flush_group(group)?;
        }
        groups.retain(|g| !g.rows.is_empty());
        Ok(affected)
    }

    /// Submits one partition's staged rows, respecting the row-count cap
    /// and the byte budget. LOB rows always travel alone.
    fn flush_group(&mut self, group: &mut PartGroup) -> Result<u64, EngineError> {
        let ignore = self.stmt.ignore_conflict;
        let mut affected = 0u64;
        let mut batch: Vec<Vec<Column>> = Vec::new();
        let mut batch_bytes = 0usize;
        let staged = std::mem::take(&mut group.rows);
        for row in staged {
            let (size, has_lob) = estimate_row_size(&row);
            if size > MAX_ROW_SIZE {
                return Err(EngineError::OutOfRange(format!(
                    "row of {size} bytes exceeds the {MAX_ROW_SIZE} byte limit"
                )));
            }
            if has_lob {
                affected += Self::submit(&mut self.source, &mut batch, group, ignore)?;
                batch_bytes = 0;
                let mut single = vec![row];
                affected += Self::submit(&mut self.source, &mut single, group, ignore)?;
                continue;
            }
            if batch.len() == MAX_BATCH_ROW_COUNT || batch_bytes + size > MAX_ROW_SIZE {
                affected += Self::submit(&mut self.source, &mut batch, group, ignore)?;
                batch_bytes = 0;
            }
            batch_bytes += size;
            batch.push(row);
        }
        affected += Self::submit(&mut self.source, &mut batch, group, ignore)?;
        Ok(affected)
    }

    fn submit(
        source: &mut TableDataSource<K>,
        batch: &mut Vec<Vec<Column>>,
        group: &PartGroup,
        ignore: bool,
    ) -> Result<u64, EngineError> {
        if batch.is_empty() {
            return Ok(0);
        }
        let inserted =
            source.batch_insert(batch, group.part_name.as_deref(), group.part_no, ignore)?;
        batch.clear();
        Ok(inserted)
    }
}

/// Formats a partition key for a row: timestamps and dates render as
/// `YYYYMMDD`, plus the hour for hour-interval tables; anything else uses
/// its text form.
fn partition_key_of(row: &[Column], key_slot: u16, hour: bool) -> Result<String, EngineError> {
    let col = row.get(key_slot as usize).ok_or_else(|| {
        EngineError::Executor(format!("partition key slot {key_slot} out of range"))
    })?;
    let value = col.crud_value.clone().unwrap_or(Value::Null);
    let fmt = if hour { "%Y%m%d%H" } else { "%Y%m%d" };
    match value {
        Value::Timestamp(t) => Ok(t.format(fmt).to_string()),
        Value::Date(d) => Ok(d.format(fmt).to_string()),
        Value::Null => Err(EngineError::Executor(
            "partition key value cannot be null".into(),
        )),
        other => Ok(other.to_string()),
    }
}

const fn align4(n: usize) -> usize {
    (n + 3) & !3
}

/// Kernel storage estimate for one staged row. The 8-byte row header is
/// always there; LOB columns store a 64-byte locator.
fn estimate_row_size(row: &[Column]) -> (usize, bool) {
    let mut size = 8usize;
    let mut has_lob = false;
    for col in row {
        let value = col.crud_value.as_ref();
        if value.is_none_or(Value::is_null) {
            continue;
        }
        match col.logical_type.id {
            TypeId::Blob | TypeId::Clob => {
                size += 64;
                has_lob = true;
            }
            TypeId::Varchar | TypeId::Char => {
                let len = value.and_then(|v| v.as_text().map(str::len)).unwrap_or(0);
                size += align4(len + 2);
            }
            TypeId::Decimal => {
                let stored = match value {
                    Some(Value::Decimal(d)) => decimal_stored_size(d),
                    _ => 8,
                };
                size += stored;
            }
            _ => size += align4(col.logical_type.width as usize),
        }
    }
    (size.max(MIN_ROW_SIZE), has_lob)
}

/// Compact decimal encoding: 4 bytes when the mantissa fits 4, 8 when it
/// fits 8, otherwise the full form with a 2-byte header, 4-aligned.
fn decimal_stored_size(d: &Decimal) -> usize {
    let mantissa = d.mantissa().unsigned_abs();
    let bytes = ((128 - mantissa.leading_zeros() as usize) + 7) / 8;
    match bytes {
        0..=4 => 4,
        5..=8 => 8,
        n => align4(n + 2),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::data_type::LogicalType;

    fn staged(ty: LogicalType, v: Value) -> Column {
        let mut col = Column::new("c", ty);
        col.crud_value = Some(v);
        col
    }

    #[test]
    fn row_size_has_a_floor() {
        let row = vec![staged(LogicalType::boolean(), Value::Boolean(true))];
        let (size, lob) = estimate_row_size(&row);
        assert_eq!(size, MIN_ROW_SIZE);
        assert!(!lob);
    }

    #[test]
    fn string_sizes_are_aligned() {
        let row = vec![staged(LogicalType::varchar(32), Value::Text("abcde".into()))];
        // 8 header + align4(5 + 2) = 8 + 8
        assert_eq!(estimate_row_size(&row).0, 16);
    }

    #[test]
    fn lob_rows_are_flagged_and_cost_a_locator() {
        let row = vec![staged(
            LogicalType::new(TypeId::Blob, 8),
            Value::Bytes(vec![0u8; 1000]),
        )];
        let (size, lob) = estimate_row_size(&row);
        assert_eq!(size, 8 + 64);
        assert!(lob);
    }

    #[test]
    fn decimal_storage_tiers() {
        assert_eq!(decimal_stored_size(&Decimal::from(1)), 4);
        assert_eq!(decimal_stored_size(&Decimal::from(u32::MAX as i64 + 1)), 8);
        // 87-bit mantissa: 11 bytes + 2 header, 4-aligned
        assert_eq!(
            decimal_stored_size(&"123456789012345678901234567".parse().unwrap()),
            16
        );
    }

    #[test]
    fn null_values_cost_nothing() {
        let row = vec![
            staged(LogicalType::integer(), Value::Int(5)),
            Column::new("n", LogicalType::varchar(100)),
        ];
        // 8 header + align4(4)
        assert_eq!(estimate_row_size(&row).0, MIN_ROW_SIZE);
    }

    #[test]
    fn partition_keys_follow_the_interval() {
        let ts = crate::core::value::parse_timestamp("2024-06-01 13:45:00").unwrap();
        let row = vec![staged(LogicalType::timestamp(), Value::Timestamp(ts))];
        assert_eq!(partition_key_of(&row, 0, false).unwrap(), "20240601");
        assert_eq!(partition_key_of(&row, 0, true).unwrap(), "2024060113");
    }
}
