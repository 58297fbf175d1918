use std::collections::HashMap;

use crate::ast::TxnKind;
use crate::binder::expression::BoundExpression;
use crate::core::alter::AlterTableInfo;
use crate::core::column::Column;
use crate::core::constraints::Constraint;
use crate::core::index::Index;
use crate::core::table_info::{PartitionDesc, TableInfo};
use crate::core::value::Value;
use crate::kernel::ObjectKind;

/// How a statement touches one table. Keyed by table name in
/// [`StatementProps`]; timescale tables get relaxed consistency on read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableAccess {
    pub name: String,
    pub is_timescale: bool,
}

/// Side band every bound statement carries: which tables it reads and
/// which it modifies.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StatementProps {
    pub read_tables: HashMap<String, TableAccess>,
    pub modify_tables: HashMap<String, TableAccess>,
}

impl StatementProps {
    pub fn add(&mut self, name: &str, is_timescale: bool, modifies: bool) {
        let access = TableAccess {
            name: name.to_string(),
            is_timescale,
        };
        if modifies {
            self.modify_tables.insert(name.to_string(), access);
        } else {
            self.read_tables.insert(name.to_string(), access);
        }
    }

    #[must_use]
    pub fn touches_timescale(&self) -> bool {
        self.read_tables
            .values()
            .chain(self.modify_tables.values())
            .any(|a| a.is_timescale)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatementKind {
    CreateTable,
    Alter,
    CreateIndex,
    CreateSequence,
    Insert,
    Delete,
    Update,
    Copy,
    Set,
    Show,
    Drop,
    Transaction,
}

/// A statement after binding: the node plus its access properties.
#[derive(Debug, Clone, PartialEq)]
pub struct BoundStatement {
    pub props: StatementProps,
    pub node: BoundNode,
}

impl BoundStatement {
    #[must_use]
    pub const fn kind(&self) -> StatementKind {
        match &self.node {
            BoundNode::CreateTable(_) => StatementKind::CreateTable,
            BoundNode::Alter(_) => StatementKind::Alter,
            BoundNode::CreateIndex(_) => StatementKind::CreateIndex,
            BoundNode::CreateSequence(_) => StatementKind::CreateSequence,
            BoundNode::Insert(_) => StatementKind::Insert,
            BoundNode::Delete(_) => StatementKind::Delete,
            BoundNode::Update(_) => StatementKind::Update,
            BoundNode::Copy(_) => StatementKind::Copy,
            BoundNode::Set(_) => StatementKind::Set,
            BoundNode::Show(_) => StatementKind::Show,
            BoundNode::Drop(_) => StatementKind::Drop,
            BoundNode::Transaction(_) => StatementKind::Transaction,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum BoundNode {
    CreateTable(CreateStatement),
    Alter(AlterStatement),
    CreateIndex(CreateIndexStatement),
    CreateSequence(CreateSequenceStatement),
    Insert(InsertStatement),
    Delete(DeleteStatement),
    Update(UpdateStatement),
    Copy(CopyStatement),
    Set(SetStatement),
    Show(ShowStatement),
    Drop(DropStatement),
    Transaction(TransactionStatement),
}

/// A base table a DML statement resolved to. `bound_name` is the name
/// the SQL used; it differs from `info.name` when a synonym was crossed.
#[derive(Debug, Clone, PartialEq)]
pub struct BoundBaseTable {
    pub schema: String,
    pub bound_name: String,
    pub info: TableInfo,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CreateStatement {
    pub schema: Option<String>,
    pub table_name: String,
    pub columns: Vec<Column>,
    pub constraints: Vec<Constraint>,
    pub partition: Option<PartitionDesc>,
    pub is_timescale: bool,
    pub retention: Option<String>,
    pub comment: Option<String>,
    pub ignore_conflict: bool,
}

impl CreateStatement {
    #[must_use]
    pub fn retention(&self) -> &str {
        self.retention.as_deref().unwrap_or_default()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct AlterStatement {
    pub schema: Option<String>,
    pub table: String,
    /// `None` when the statement parsed but carried no action.
    pub info: Option<AlterTableInfo>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CreateIndexStatement {
    pub schema: Option<String>,
    pub index: Index,
    pub ignore_conflict: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CreateSequenceStatement {
    pub schema: Option<String>,
    pub name: String,
    pub increment: i64,
    pub min_value: i64,
    pub max_value: i64,
    pub start_value: i64,
    pub cycle: bool,
    pub ignore_conflict: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct InsertStatement {
    pub table: BoundBaseTable,
    /// Target columns in statement order.
    pub bound_columns: Vec<Column>,
    /// Columns omitted by the statement that carry a default.
    pub bound_defaults: Vec<Column>,
    /// Columns omitted by the statement with no default; NULL or
    /// auto-increment fills them.
    pub unbound_columns: Vec<Column>,
    pub rows: Vec<Vec<BoundExpression>>,
    pub ignore_conflict: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DeleteStatement {
    pub table: BoundBaseTable,
    pub filter: Option<BoundExpression>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct UpdateStatement {
    pub table: BoundBaseTable,
    pub assignments: Vec<(Column, BoundExpression)>,
    pub filter: Option<BoundExpression>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CopyStatement {
    pub table: BoundBaseTable,
    /// Empty means every table column, in definition order.
    pub columns: Vec<String>,
    pub is_from: bool,
    pub file_path: String,
    pub format: String,
    pub delimiter: char,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SetVariable {
    AutoCommit,
    MaxConnections,
    SynchronousCommit,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SetStatement {
    pub variable: SetVariable,
    pub value: Value,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ShowStatement {
    Variable(String),
    Table(BoundBaseTable),
}

#[derive(Debug, Clone, PartialEq)]
pub struct DropStatement {
    pub schema: Option<String>,
    pub name: String,
    pub kind: ObjectKind,
    pub if_exists: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TransactionStatement {
    pub kind: TxnKind,
}
