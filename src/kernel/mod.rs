// Storage-kernel boundary: the narrow call surface the semantic and
// execution layers sit on. The kernel owns pages, transactions and
// physical cursors; everything above it owns names, types and rows.

pub mod memory;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::core::alter::AlterTableInfo;
use crate::core::column::Column;
use crate::core::constraints::Constraint;
use crate::core::data_type::TypeId;
use crate::core::index::Index;
use crate::core::table_info::{PartitionDesc, TableInfo};
use crate::core::value::Value;

pub use memory::MemoryKernel;

/// Kernel failures carry a numeric code; a handful of codes drive
/// recovery decisions above the boundary.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("kernel error {code}: {message}")]
pub struct KernelError {
    pub code: i32,
    pub message: String,
}

impl KernelError {
    #[must_use]
    pub fn new(code: i32, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }
}

pub mod err_code {
    pub const OBJECT_NOT_FOUND: i32 = 711;
    pub const DUPLICATE_OBJECT: i32 = 716;
    pub const DUPLICATE_PART_NAME: i32 = 745;
    /// Cached dictionary entry went stale under concurrent DDL.
    pub const DC_INVALIDATED: i32 = 743;
    /// Target partition exists in metadata but is not yet usable.
    pub const PARTITION_NOT_READY: i32 = 761;
    pub const DUPLICATE_KEY: i32 = 754;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanAction {
    Select,
    Update,
    Delete,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanEdge {
    Eq,
    Ge,
    Le,
}

/// One per-column predicate pushed down to an index scan.
#[derive(Debug, Clone, PartialEq)]
pub struct ScanCondition {
    pub col_slot: u16,
    pub col_type: TypeId,
    pub edge: ScanEdge,
    pub lower: Option<Value>,
    pub upper: Option<Value>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ObjectKind {
    Table,
    Index,
    View,
    Sequence,
    Synonym,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SysPrivilege {
    CreateTable,
    CreateIndex,
    CreateSequence,
    CreateView,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ObjectPrivilege {
    Select,
    Insert,
    Update,
    Delete,
    Alter,
    Drop,
}

/// Table definition handed to the kernel on CREATE TABLE.
#[derive(Debug, Clone)]
pub struct CreateTableDef {
    pub name: String,
    pub columns: Vec<Column>,
    pub constraints: Vec<Constraint>,
    pub indexes: Vec<Index>,
    pub partition: Option<PartitionDesc>,
    pub is_timescale: bool,
    pub retention: Option<String>,
    pub comment: Option<String>,
}

#[derive(Debug, Clone)]
pub struct SequenceDef {
    pub name: String,
    pub increment: i64,
    pub min_value: i64,
    pub max_value: i64,
    pub start_value: i64,
    pub cycle: bool,
}

/// The storage kernel. Implementations keep their own session state and
/// take `&self`; cursors are addressed by a caller-chosen index so one
/// statement can hold several open at once.
pub trait StorageKernel {
    fn open_table(&self, user: &str, table: &str) -> Result<(), KernelError>;

    fn open_cursor(
        &self,
        table: &str,
        index_slot: Option<u32>,
        conditions: &[ScanCondition],
        action: ScanAction,
        cursor_idx: usize,
    ) -> Result<(), KernelError>;

    /// Positions the cursor on a partition before `open_cursor`. Partition 0
    /// also serves as the reset position when a scan finishes.
    fn set_partition(&self, cursor_idx: usize, part_no: u32) -> Result<(), KernelError>;

    /// Advances the cursor; `Ok(true)` means end of data.
    fn cursor_next(&self, cursor_idx: usize) -> Result<bool, KernelError>;

    fn cursor_fetch(
        &self,
        cursor_idx: usize,
        columns: &[Column],
    ) -> Result<Vec<Option<Value>>, KernelError>;

    fn insert_row(&self, table: &str, row: &[Column]) -> Result<(), KernelError>;

    fn batch_insert(
        &self,
        table: &str,
        rows: &[Vec<Column>],
        part_no: Option<u32>,
        ignore_conflict: bool,
    ) -> Result<u64, KernelError>;

    fn update_by_cursor(&self, cursor_idx: usize, columns: &[Column]) -> Result<(), KernelError>;

    fn delete_by_cursor(&self, cursor_idx: usize) -> Result<(), KernelError>;

    fn row_count(&self, table: &str) -> Result<i64, KernelError>;

    fn get_table_info(&self, user: &str, table: &str) -> Result<TableInfo, KernelError>;

    fn create_table(&self, user: &str, def: &CreateTableDef) -> Result<(), KernelError>;

    fn create_index(&self, user: &str, index: &Index) -> Result<(), KernelError>;

    fn alter_table(
        &self,
        user: &str,
        table: &str,
        info: &AlterTableInfo,
    ) -> Result<(), KernelError>;

    fn create_sequence(&self, user: &str, def: &SequenceDef) -> Result<(), KernelError>;

    fn create_view(
        &self,
        user: &str,
        name: &str,
        columns: &[Column],
        query_text: &str,
    ) -> Result<(), KernelError>;

    fn drop_object(&self, user: &str, name: &str, kind: ObjectKind) -> Result<(), KernelError>;

    fn sequence_exists(&self, user: &str, name: &str) -> Result<bool, KernelError>;

    fn seq_next_value(&self, user: &str, name: &str) -> Result<i64, KernelError>;

    /// Fails with `OBJECT_NOT_FOUND` when the sequence has not been
    /// advanced in this session yet.
    fn seq_curr_value(&self, user: &str, name: &str) -> Result<i64, KernelError>;

    fn auto_increment_next(&self, table: &str) -> Result<i64, KernelError>;

    /// Raises the auto-increment high-water mark; never lowers it.
    fn auto_increment_advance(&self, table: &str, value: i64) -> Result<(), KernelError>;

    fn begin(&self) -> Result<(), KernelError>;
    fn commit(&self) -> Result<(), KernelError>;
    fn rollback(&self) -> Result<(), KernelError>;

    fn check_sys_privilege(&self, user: &str, privilege: SysPrivilege)
    -> Result<bool, KernelError>;

    fn check_privilege(
        &self,
        user: &str,
        owner: &str,
        object: &str,
        privilege: ObjectPrivilege,
    ) -> Result<bool, KernelError>;

    fn user_name(&self, user_id: u32) -> Result<String, KernelError>;
}
