// INSERT / DELETE / UPDATE binding.

use crate::ast::{DeleteStmt, InsertStmt, OnConflict, UpdateStmt};
use crate::binder::Binder;
use crate::binder::expression::BoundExpression;
use crate::binder::statement::{
    BoundBaseTable, DeleteStatement, InsertStatement, UpdateStatement,
};
use crate::core::column::Column;
use crate::core::error::EngineError;
use crate::kernel::{ObjectPrivilege, StorageKernel};

impl<K: StorageKernel> Binder<'_, K> {
    pub(crate) fn bind_insert(
        &mut self,
        stmt: &InsertStmt,
    ) -> Result<InsertStatement, EngineError> {
        if stmt.on_conflict == OnConflict::Replace {
            return Err(EngineError::NotImplemented(
                "INSERT OR REPLACE is not supported".into(),
            ));
        }
        let table = self.bind_base_table(stmt.schema.as_deref(), &stmt.table)?;
        Self::check_not_system(&table.info)?;
        self.verify_dml_privilege(&table, ObjectPrivilege::Insert, "insert")?;
        self.add_related_table(&table.info, true);

        let bound_columns = Self::bind_insert_columns(&table, &stmt.columns)?;
        let mut bound_defaults = Vec::new();
        let mut unbound_columns = Vec::new();
        for col in &table.info.columns {
            if bound_columns.iter().any(|c| c.slot == col.slot) {
                continue;
            }
            if col.has_default() {
                bound_defaults.push(col.clone());
            } else {
                if !col.nullable && !col.is_auto_increment {
                    return Err(EngineError::Binder(format!(
                        "column {} has no default and cannot be null",
                        col.name
                    )));
                }
                unbound_columns.push(col.clone());
            }
        }

        if stmt.rows.is_empty() {
            return Err(EngineError::Binder("INSERT needs at least one row".into()));
        }
        let mut rows = Vec::with_capacity(stmt.rows.len());
        for row in &stmt.rows {
            if row.len() != bound_columns.len() {
                return Err(EngineError::Binder(format!(
                    "row has {} values but {} columns were named",
                    row.len(),
                    bound_columns.len()
                )));
            }
            let bound: Result<Vec<BoundExpression>, EngineError> =
                row.iter().map(|e| self.bind_expression(e)).collect();
            rows.push(bound?);
        }

        Ok(InsertStatement {
            table,
            bound_columns,
            bound_defaults,
            unbound_columns,
            rows,
            ignore_conflict: stmt.on_conflict == OnConflict::Ignore,
        })
    }

    fn bind_insert_columns(
        table: &BoundBaseTable,
        names: &[String],
    ) -> Result<Vec<Column>, EngineError> {
        if names.is_empty() {
            return Ok(table.info.columns.clone());
        }
        let mut out: Vec<Column> = Vec::with_capacity(names.len());
        for name in names {
            let col = table.info.column_by_name(name).ok_or_else(|| {
                EngineError::Binder(format!(
                    "column {name} does not exist in table {}",
                    table.info.name
                ))
            })?;
            if out.iter().any(|c| c.slot == col.slot) {
                return Err(EngineError::Binder(format!(
                    "column {name} is named more than once"
                )));
            }
            out.push(col.clone());
        }
        Ok(out)
    }

    pub(crate) fn bind_delete(
        &mut self,
        stmt: &DeleteStmt,
    ) -> Result<DeleteStatement, EngineError> {
        let table = self.bind_base_table(stmt.schema.as_deref(), &stmt.table)?;
        Self::check_not_system(&table.info)?;
        self.verify_dml_privilege(&table, ObjectPrivilege::Delete, "delete")?;
        self.add_related_table(&table.info, true);
        self.ctx
            .add_table_binding(table.bound_name.clone(), table.info.columns.clone())?;
        let filter = stmt
            .filter
            .as_ref()
            .map(|f| self.bind_expression(f))
            .transpose()?;
        Ok(DeleteStatement { table, filter })
    }

    pub(crate) fn bind_update(
        &mut self,
        stmt: &UpdateStmt,
    ) -> Result<UpdateStatement, EngineError> {
        let table = self.bind_base_table(stmt.schema.as_deref(), &stmt.table)?;
        Self::check_not_system(&table.info)?;
        self.verify_dml_privilege(&table, ObjectPrivilege::Update, "update")?;
        self.add_related_table(&table.info, true);
        self.ctx
            .add_table_binding(table.bound_name.clone(), table.info.columns.clone())?;

        if stmt.assignments.is_empty() {
            return Err(EngineError::Binder("UPDATE needs at least one SET".into()));
        }
        let mut assignments = Vec::with_capacity(stmt.assignments.len());
        for (name, expr) in &stmt.assignments {
            let col = table.info.column_by_name(name).ok_or_else(|| {
                EngineError::Binder(format!(
                    "column {name} does not exist in table {}",
                    table.info.name
                ))
            })?;
            if assignments.iter().any(|(c, _): &(Column, _)| c.slot == col.slot) {
                return Err(EngineError::Binder(format!(
                    "column {name} is assigned more than once"
                )));
            }
            let mut bound = self.bind_expression(expr)?;
            // literals take the column type at bind time
            if let BoundExpression::Constant(v) = &bound {
                bound = BoundExpression::Constant(v.try_cast(&col.logical_type)?);
            }
            assignments.push((col.clone(), bound));
        }
        let filter = stmt
            .filter
            .as_ref()
            .map(|f| self.bind_expression(f))
            .transpose()?;
        Ok(UpdateStatement {
            table,
            assignments,
            filter,
        })
    }

    fn verify_dml_privilege(
        &self,
        table: &BoundBaseTable,
        privilege: ObjectPrivilege,
        verb: &str,
    ) -> Result<(), EngineError> {
        if !self
            .catalog
            .verify_table_privilege(&table.info, &table.bound_name, privilege)?
        {
            return Err(EngineError::Permission(format!(
                "{}.{} {verb} permission denied",
                table.schema, table.bound_name
            )));
        }
        Ok(())
    }
}
