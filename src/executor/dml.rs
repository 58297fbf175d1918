/// DELETE and UPDATE: cursor scans over a table data source, with the
/// bound filter evaluated per row.
use crate::binder::statement::{DeleteStatement, UpdateStatement};
use crate::catalog::Catalog;
use crate::core::error::EngineError;
use crate::core::value::Value;
use crate::datasource::TableDataSource;
use crate::executor::RecordBatch;
use crate::kernel::{ScanAction, StorageKernel};

pub struct DmlExecutor;

impl DmlExecutor {
    pub fn delete<K: StorageKernel>(
        catalog: &Catalog<K>,
        stmt: &DeleteStatement,
    ) -> Result<RecordBatch, EngineError> {
        let columns = stmt.table.info.columns.clone();
        let mut source = TableDataSource::new(catalog, stmt.table.clone(), ScanAction::Delete, 0);
        let mut affected = 0u64;
        while let Some(buf) = source.next()? {
            let row = buf.decode_row(&columns)?;
            if let Some(filter) = &stmt.filter
                && !filter.matches(&row)?
            {
                continue;
            }
            source.delete()?;
            affected += 1;
        }
        tracing::debug!(table = %stmt.table.info.name, rows = affected, "delete finished");
        Ok(RecordBatch::affected(affected))
    }

    pub fn update<K: StorageKernel>(
        catalog: &Catalog<K>,
        stmt: &UpdateStatement,
    ) -> Result<RecordBatch, EngineError> {
        let columns = stmt.table.info.columns.clone();
        let mut source = TableDataSource::new(catalog, stmt.table.clone(), ScanAction::Update, 0);
        let mut affected = 0u64;
        while let Some(buf) = source.next()? {
            let row = buf.decode_row(&columns)?;
            if let Some(filter) = &stmt.filter
                && !filter.matches(&row)?
            {
                continue;
            }
            let mut staged = Vec::with_capacity(stmt.assignments.len());
            for (col, expr) in &stmt.assignments {
                let value = expr.evaluate(&row)?;
                if value.is_null() && !col.nullable {
                    return Err(EngineError::Executor(format!(
                        "null value in column {} violates not-null constraint",
                        col.name
                    )));
                }
                let cast = value.try_cast(&col.logical_type)?;
                staged.push(col.with_crud(cast));
            }
            source.update(&staged)?;
            affected += 1;
        }
        tracing::debug!(table = %stmt.table.info.name, rows = affected, "update finished");
        Ok(RecordBatch::affected(affected))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::binder::expression::BoundExpression;
    use crate::core::column::Column;
    use crate::core::data_type::LogicalType;

    #[test]
    fn update_rejects_null_for_not_null_column() {
        let mut col = Column::new("qty", LogicalType::integer());
        col.nullable = false;
        let expr = BoundExpression::Constant(Value::Null);
        // mirrors the per-assignment check in update()
        let value = expr.evaluate(&[]).unwrap();
        assert!(value.is_null() && !col.nullable);
    }
}
