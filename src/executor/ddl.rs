/// DDL execution: CREATE TABLE / INDEX / SEQUENCE, ALTER TABLE and DROP
/// delegate to the catalog once the binder has validated them.
use crate::binder::statement::{
    AlterStatement, CreateIndexStatement, CreateSequenceStatement, CreateStatement, DropStatement,
};
use crate::catalog::Catalog;
use crate::core::error::EngineError;
use crate::executor::RecordBatch;
use crate::kernel::{CreateTableDef, SequenceDef, StorageKernel};

pub struct DdlExecutor;

impl DdlExecutor {
    pub fn create_table<K: StorageKernel>(
        catalog: &Catalog<K>,
        stmt: &CreateStatement,
    ) -> Result<RecordBatch, EngineError> {
        let def = CreateTableDef {
            name: stmt.table_name.clone(),
            columns: stmt.columns.clone(),
            constraints: stmt.constraints.clone(),
            indexes: Vec::new(),
            partition: stmt.partition.clone(),
            is_timescale: stmt.is_timescale,
            retention: stmt.retention.clone(),
            comment: stmt.comment.clone(),
        };
        catalog.create_table(stmt.schema.as_deref(), &def, stmt.ignore_conflict)?;
        tracing::info!(table = %stmt.table_name, "created table");
        Ok(RecordBatch::empty())
    }

    pub fn alter_table<K: StorageKernel>(
        catalog: &Catalog<K>,
        stmt: &AlterStatement,
    ) -> Result<RecordBatch, EngineError> {
        // a bare ALTER TABLE with no action is a no-op
        let Some(info) = &stmt.info else {
            return Ok(RecordBatch::empty());
        };
        catalog.alter_table(stmt.schema.as_deref(), &stmt.table, info)?;
        Ok(RecordBatch::empty())
    }

    pub fn create_index<K: StorageKernel>(
        catalog: &Catalog<K>,
        stmt: &CreateIndexStatement,
    ) -> Result<RecordBatch, EngineError> {
        catalog.create_index(stmt.schema.as_deref(), &stmt.index, stmt.ignore_conflict)?;
        Ok(RecordBatch::empty())
    }

    pub fn create_sequence<K: StorageKernel>(
        catalog: &Catalog<K>,
        stmt: &CreateSequenceStatement,
    ) -> Result<RecordBatch, EngineError> {
        let def = SequenceDef {
            name: stmt.name.clone(),
            increment: stmt.increment,
            min_value: stmt.min_value,
            max_value: stmt.max_value,
            start_value: stmt.start_value,
            cycle: stmt.cycle,
        };
        catalog.create_sequence(stmt.schema.as_deref(), &def, stmt.ignore_conflict)?;
        Ok(RecordBatch::empty())
    }

    pub fn drop_object<K: StorageKernel>(
        catalog: &Catalog<K>,
        stmt: &DropStatement,
    ) -> Result<RecordBatch, EngineError> {
        catalog.drop_object(stmt.schema.as_deref(), &stmt.name, stmt.kind, stmt.if_exists)?;
        Ok(RecordBatch::empty())
    }
}
