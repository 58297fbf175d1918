/// Executor module - physical execution of bound statements
///
/// Structure:
/// - insert_exec: INSERT with defaults, auto-increment and partition batching
/// - dml: DELETE / UPDATE scans over a table data source
/// - ddl: CREATE / ALTER / DROP delegating to the catalog
/// - misc: SET / SHOW / transaction control
pub mod ddl;
pub mod dml;
pub mod insert_exec;
pub mod misc;

use crate::binder::statement::{BoundNode, BoundStatement};
use crate::catalog::Catalog;
use crate::core::error::EngineError;
use crate::core::schema::Schema;
use crate::core::value::Value;
use crate::kernel::StorageKernel;

pub use ddl::DdlExecutor;
pub use dml::DmlExecutor;
pub use insert_exec::InsertExec;
pub use misc::SessionExecutor;

/// Result of one statement: output rows plus the usual side counters.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct RecordBatch {
    pub schema: Schema,
    pub rows: Vec<Vec<Value>>,
    pub affected_rows: u64,
    pub last_insert_rowid: i64,
}

impl RecordBatch {
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn affected(n: u64) -> Self {
        Self {
            affected_rows: n,
            ..Self::default()
        }
    }
}

/// Session variables settable through SET.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionVars {
    pub auto_commit: bool,
    pub max_connections: i64,
    pub synchronous_commit: String,
}

impl Default for SessionVars {
    fn default() -> Self {
        Self {
            auto_commit: true,
            max_connections: 128,
            synchronous_commit: "on".to_string(),
        }
    }
}

pub struct QueryExecutor;

impl QueryExecutor {
    /// Executes one bound statement against the session's catalog.
    pub fn execute<K: StorageKernel>(
        catalog: &Catalog<K>,
        vars: &mut SessionVars,
        stmt: &BoundStatement,
    ) -> Result<RecordBatch, EngineError> {
        match &stmt.node {
            BoundNode::CreateTable(s) => DdlExecutor::create_table(catalog, s),
            BoundNode::Alter(s) => DdlExecutor::alter_table(catalog, s),
            BoundNode::CreateIndex(s) => DdlExecutor::create_index(catalog, s),
            BoundNode::CreateSequence(s) => DdlExecutor::create_sequence(catalog, s),
            BoundNode::Drop(s) => DdlExecutor::drop_object(catalog, s),
            BoundNode::Insert(s) => InsertExec::new(catalog, s).execute(),
            BoundNode::Delete(s) => DmlExecutor::delete(catalog, s),
            BoundNode::Update(s) => DmlExecutor::update(catalog, s),
            BoundNode::Copy(_) => Err(EngineError::NotImplemented(
                "COPY execution runs in the client shell".into(),
            )),
            BoundNode::Set(s) => SessionExecutor::set(vars, s),
            BoundNode::Show(s) => SessionExecutor::show(vars, s),
            BoundNode::Transaction(s) => SessionExecutor::transaction(catalog, s),
        }
    }
}
