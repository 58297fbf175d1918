// ALTER TABLE and RENAME binding.

use crate::ast::{
    AlterCommand, AlterTableStmt, AlterTarget, RenameStmt, RenameTarget, TableConstraintAst,
};
use crate::binder::Binder;
use crate::binder::default_value::bind_default;
use crate::binder::statement::{AlterStatement, BoundBaseTable};
use crate::core::alter::AlterTableInfo;
use crate::core::constraints::ConstraintType;
use crate::core::error::EngineError;
use crate::core::table_info::{PART_NAME_BUFFER_SIZE, PART_SUFFIX_DAY_LEN, PART_SUFFIX_HOUR_LEN,
    partition_high_bound_us};
use crate::kernel::{ObjectPrivilege, StorageKernel};

impl<K: StorageKernel> Binder<'_, K> {
    pub(crate) fn bind_alter_table(
        &mut self,
        stmt: &AlterTableStmt,
    ) -> Result<AlterStatement, EngineError> {
        if stmt.target == AlterTarget::View {
            return Err(EngineError::NotImplemented(
                "ALTER VIEW is not supported".into(),
            ));
        }
        let table = self.bind_base_table(stmt.schema.as_deref(), &stmt.table)?;
        Self::check_not_system(&table.info)?;
        self.verify_alter_privilege(&table)?;
        self.add_related_table(&table.info, true);

        if let Some(comment) = &stmt.comment {
            if !stmt.commands.is_empty() {
                return Err(EngineError::Binder(
                    "COMMENT cannot be combined with other alterations".into(),
                ));
            }
            return Ok(AlterStatement {
                schema: stmt.schema.clone(),
                table: table.info.name.clone(),
                info: Some(AlterTableInfo::SetComment {
                    comment: comment.clone(),
                }),
            });
        }

        let info = match stmt.commands.as_slice() {
            [] => None,
            [command] => Some(self.bind_alter_command(stmt, &table, command)?),
            _ => {
                return Err(EngineError::NotImplemented(
                    "ALTER TABLE takes one action per statement".into(),
                ));
            }
        };
        Ok(AlterStatement {
            schema: stmt.schema.clone(),
            table: table.info.name.clone(),
            info,
        })
    }

    fn bind_alter_command(
        &mut self,
        stmt: &AlterTableStmt,
        table: &BoundBaseTable,
        command: &AlterCommand,
    ) -> Result<AlterTableInfo, EngineError> {
        let info = &table.info;
        match command {
            AlterCommand::AddColumn(def) => {
                let slot = info.columns.len() as u16;
                let column = self.bind_column_def(stmt.schema.as_deref(), def, slot)?;
                if info.column_by_name(&column.name).is_some() {
                    return Err(EngineError::Binder(format!(
                        "column {} already exists",
                        column.name
                    )));
                }
                if info.is_timescale && (column.is_primary || column.is_unique) {
                    return Err(EngineError::Binder(
                        "timescale table cannot have primary key or unique constraints".into(),
                    ));
                }
                if column.is_auto_increment {
                    return Err(EngineError::Binder(
                        "cannot add an auto-increment column to an existing table".into(),
                    ));
                }
                Ok(AlterTableInfo::AddColumn { column })
            }
            AlterCommand::DropColumn(name) => {
                let column = info
                    .column_by_name(name)
                    .ok_or_else(|| {
                        EngineError::Binder(format!("column {name} does not exist"))
                    })?
                    .name
                    .clone();
                if info.columns.len() == 1 {
                    return Err(EngineError::Binder(
                        "cannot drop the only column of a table".into(),
                    ));
                }
                Ok(AlterTableInfo::DropColumn { column })
            }
            AlterCommand::SetDefault { column, default } => {
                let mut col = info
                    .column_by_name(column)
                    .ok_or_else(|| {
                        EngineError::Binder(format!("column {column} does not exist"))
                    })?
                    .clone();
                match default {
                    Some(expr) => bind_default(self.catalog, stmt.schema.as_deref(), &mut col, expr)?,
                    None => col.default = None,
                }
                Ok(AlterTableInfo::ModifyColumn { column: col })
            }
            AlterCommand::AlterColumnType { column, def } => {
                let old = info.column_by_name(column).ok_or_else(|| {
                    EngineError::Binder(format!("column {column} does not exist"))
                })?;
                let mut new_col = self.bind_column_def(stmt.schema.as_deref(), def, old.slot)?;
                if !new_col.name.eq_ignore_ascii_case(column) {
                    return Err(EngineError::Binder(
                        "ALTER COLUMN TYPE cannot rename the column".into(),
                    ));
                }
                if info.is_timescale && (new_col.is_primary || new_col.is_unique) {
                    return Err(EngineError::Binder(
                        "timescale table cannot have primary key or unique constraints".into(),
                    ));
                }
                new_col.slot = old.slot;
                Ok(AlterTableInfo::ModifyColumn { column: new_col })
            }
            AlterCommand::AddConstraint(constraint) => {
                let (name, ctype, columns) = match constraint {
                    TableConstraintAst::PrimaryKey { name, columns } => {
                        (name.clone(), ConstraintType::Primary, columns)
                    }
                    TableConstraintAst::Unique { name, columns } => {
                        (name.clone(), ConstraintType::Unique, columns)
                    }
                    _ => {
                        return Err(EngineError::NotImplemented(
                            "only PRIMARY KEY and UNIQUE can be added after creation".into(),
                        ));
                    }
                };
                if info.is_timescale {
                    return Err(EngineError::Binder(
                        "timescale table cannot have primary key or unique constraints".into(),
                    ));
                }
                let mut bound = Vec::with_capacity(columns.len());
                for c in columns {
                    let col = info.column_by_name(c).ok_or_else(|| {
                        EngineError::Binder(format!("key column {c} does not exist"))
                    })?;
                    bound.push(col.name.clone());
                }
                Ok(AlterTableInfo::AddConstraint {
                    name,
                    ctype,
                    columns: bound,
                })
            }
            AlterCommand::AttachPartition(part_name) => {
                self.bind_add_partition(info, part_name)
            }
            AlterCommand::DetachPartition(part_name) => {
                if !info.is_parted() {
                    return Err(EngineError::Binder(format!(
                        "table {} is not partitioned",
                        info.name
                    )));
                }
                if info.partition_by_name(part_name).is_none() {
                    return Err(EngineError::Binder(format!(
                        "partition {part_name} does not exist"
                    )));
                }
                Ok(AlterTableInfo::DropPartition {
                    part_name: part_name.to_ascii_lowercase(),
                })
            }
        }
    }

    /// ADD PARTITION takes the partition name `<table>_<suffix>` and derives
    /// the high bound from the suffix; the suffix length must match the
    /// table interval (8 digits for `1d`, 10 for `1h`).
    fn bind_add_partition(
        &self,
        info: &crate::core::table_info::TableInfo,
        part_name: &str,
    ) -> Result<AlterTableInfo, EngineError> {
        if part_name.len() >= PART_NAME_BUFFER_SIZE {
            return Err(EngineError::Binder(format!(
                "partition name '{part_name}' is too long"
            )));
        }
        let Some(desc) = &info.partition else {
            return Err(EngineError::Binder(format!(
                "table {} is not partitioned",
                info.name
            )));
        };
        if desc.interval.is_empty() {
            return Err(EngineError::Binder(
                "only interval partitioned tables accept ADD PARTITION".into(),
            ));
        }
        let suffix = part_name
            .strip_prefix(&format!("{}_", info.name))
            .ok_or_else(|| {
                EngineError::Binder(format!(
                    "partition name must be {}_<time suffix>",
                    info.name
                ))
            })?;
        let expected_len = if desc.interval_is_hour() {
            PART_SUFFIX_HOUR_LEN
        } else {
            PART_SUFFIX_DAY_LEN
        };
        if suffix.len() != expected_len {
            return Err(EngineError::Binder(format!(
                "partition suffix '{suffix}' does not match the table interval {}",
                desc.interval
            )));
        }
        let hibound_us = partition_high_bound_us(suffix)?;
        Ok(AlterTableInfo::AddPartition {
            part_name: part_name.to_string(),
            hibound_us,
        })
    }

    pub(crate) fn bind_rename(
        &mut self,
        stmt: &RenameStmt,
    ) -> Result<AlterStatement, EngineError> {
        let table = self.bind_base_table(stmt.schema.as_deref(), &stmt.table)?;
        Self::check_not_system(&table.info)?;
        self.verify_alter_privilege(&table)?;
        self.add_related_table(&table.info, true);
        let info = match &stmt.target {
            RenameTarget::Table { new_name } => {
                Self::bind_name(new_name)?;
                AlterTableInfo::RenameTable {
                    new_name: new_name.to_ascii_lowercase(),
                }
            }
            RenameTarget::Column { old_name, new_name } => {
                let old = table.info.column_by_name(old_name).ok_or_else(|| {
                    EngineError::Binder(format!("column {old_name} does not exist"))
                })?;
                Self::bind_name(new_name)?;
                if table.info.column_by_name(new_name).is_some() {
                    return Err(EngineError::Binder(format!(
                        "column {new_name} already exists"
                    )));
                }
                AlterTableInfo::RenameColumn {
                    old_name: old.name.clone(),
                    new_name: new_name.to_ascii_lowercase(),
                }
            }
        };
        Ok(AlterStatement {
            schema: stmt.schema.clone(),
            table: table.info.name.clone(),
            info: Some(info),
        })
    }

    fn verify_alter_privilege(&self, table: &BoundBaseTable) -> Result<(), EngineError> {
        if !self
            .catalog
            .verify_table_privilege(&table.info, &table.bound_name, ObjectPrivilege::Alter)?
        {
            return Err(EngineError::Permission(format!(
                "{}.{} alter permission denied",
                table.schema, table.bound_name
            )));
        }
        Ok(())
    }
}
