// CREATE TABLE / INDEX / SEQUENCE binding.

use crate::ast::{
    ColumnConstraintAst, ColumnDefAst, CreateIndexStmt, CreateSequenceStmt, CreateTableStmt,
    Expr, OnConflict, PartitionStrategy, RefActionAst, TableConstraintAst,
};
use crate::binder::Binder;
use crate::binder::default_value::bind_default;
use crate::binder::statement::{CreateIndexStatement, CreateSequenceStatement, CreateStatement};
use crate::binder::transform_typename::transform_type_name;
use crate::core::column::Column;
use crate::core::constraints::{Constraint, ConstraintType, RefAction};
use crate::core::error::EngineError;
use crate::core::index::Index;
use crate::core::table_info::{PartType, PartitionDesc};
use crate::core::value::Value;
use crate::kernel::{StorageKernel, SysPrivilege};

/// Default retention for timescale tables that do not name one.
pub const RETENTION_DEFAULT: &str = "7d";

impl<K: StorageKernel> Binder<'_, K> {
    pub(crate) fn bind_create_table(
        &mut self,
        stmt: &CreateTableStmt,
    ) -> Result<CreateStatement, EngineError> {
        if !self.catalog.has_sys_privilege(SysPrivilege::CreateTable)? {
            return Err(EngineError::Permission(format!(
                "user {} has no create table privilege",
                self.catalog.user()
            )));
        }
        if stmt.on_conflict == OnConflict::Replace {
            return Err(EngineError::NotImplemented(
                "CREATE OR REPLACE TABLE is not supported".into(),
            ));
        }
        if stmt.temporary {
            return Err(EngineError::NotImplemented(
                "temporary tables are not supported".into(),
            ));
        }
        if stmt.inherits {
            return Err(EngineError::NotImplemented(
                "INHERITS is not supported".into(),
            ));
        }
        Self::bind_name(&stmt.name)?;
        let table_name = stmt.name.to_ascii_lowercase();
        if stmt.columns.is_empty() {
            return Err(EngineError::Binder(format!(
                "table {table_name} must have at least one column"
            )));
        }

        let mut columns = Vec::with_capacity(stmt.columns.len());
        for (slot, def) in stmt.columns.iter().enumerate() {
            let col = self.bind_column_def(stmt.schema.as_deref(), def, slot as u16)?;
            if columns
                .iter()
                .any(|c: &Column| c.name.eq_ignore_ascii_case(&col.name))
            {
                return Err(EngineError::Binder(format!(
                    "duplicate column name: {}",
                    col.name
                )));
            }
            columns.push(col);
        }
        if columns.iter().filter(|c| c.is_auto_increment).count() > 1 {
            return Err(EngineError::Binder(
                "a table can have at most one auto-increment column".into(),
            ));
        }

        // column-level PRIMARY KEY / UNIQUE become single-column constraints,
        // same as their table-level spellings
        let mut constraints = Vec::new();
        for col in &columns {
            if col.is_primary {
                constraints.push(Constraint::key(
                    ConstraintType::Primary,
                    None,
                    vec![col.name.clone()],
                ));
            }
            if col.is_unique {
                constraints.push(Constraint::key(
                    ConstraintType::Unique,
                    None,
                    vec![col.name.clone()],
                ));
            }
        }
        for constraint in &stmt.constraints {
            constraints.push(Self::bind_table_constraint(&mut columns, constraint)?);
        }
        if constraints
            .iter()
            .filter(|c| c.ctype == ConstraintType::Primary)
            .count()
            > 1
        {
            return Err(EngineError::Binder(
                "a table can have at most one primary key".into(),
            ));
        }

        let partition = stmt
            .partition_by
            .as_ref()
            .map(|spec| Self::bind_partition(stmt, &columns, spec))
            .transpose()?;

        if stmt.timescale {
            if partition.is_none() {
                return Err(EngineError::Binder(
                    "timescale table must be range partitioned".into(),
                ));
            }
            let keyed = constraints
                .iter()
                .any(|c| matches!(c.ctype, ConstraintType::Primary | ConstraintType::Unique));
            if keyed {
                return Err(EngineError::Binder(
                    "timescale table cannot have primary key or unique constraints".into(),
                ));
            }
        }

        let retention = match &stmt.retention {
            Some(r) => {
                if !stmt.timescale {
                    return Err(EngineError::Binder(
                        "retention requires a timescale table".into(),
                    ));
                }
                if !is_valid_retention(r) {
                    return Err(EngineError::Binder(format!(
                        "invalid retention '{r}', expected <n>h or <n>d"
                    )));
                }
                Some(r.clone())
            }
            None if stmt.timescale => Some(RETENTION_DEFAULT.to_string()),
            None => None,
        };

        self.props.add(&table_name, stmt.timescale, true);
        Ok(CreateStatement {
            schema: stmt.schema.clone(),
            table_name,
            columns,
            constraints,
            partition,
            is_timescale: stmt.timescale,
            retention,
            comment: stmt.comment.clone(),
            ignore_conflict: stmt.on_conflict == OnConflict::Ignore,
        })
    }

    pub(crate) fn bind_column_def(
        &self,
        schema: Option<&str>,
        def: &ColumnDefAst,
        slot: u16,
    ) -> Result<Column, EngineError> {
        if def.collate.is_some() {
            return Err(EngineError::NotImplemented(
                "COLLATE is not supported".into(),
            ));
        }
        if def.generated {
            return Err(EngineError::NotImplemented(
                "generated columns are not supported".into(),
            ));
        }
        let name = def.name.trim();
        Self::bind_name(name)?;
        let mut col = Column::new(name.to_ascii_lowercase(), transform_type_name(&def.type_name)?);
        col.slot = slot;

        for constraint in &def.constraints {
            match constraint {
                ColumnConstraintAst::NotNull => col.nullable = false,
                ColumnConstraintAst::Null => col.nullable = true,
                ColumnConstraintAst::Default(expr) => {
                    bind_default(self.catalog, schema, &mut col, expr)?;
                }
                ColumnConstraintAst::PrimaryKey => {
                    col.is_primary = true;
                    col.nullable = false;
                }
                ColumnConstraintAst::Unique => col.is_unique = true,
                ColumnConstraintAst::AutoIncrement => {
                    if !col.logical_type.id.is_integer() {
                        return Err(EngineError::Binder(format!(
                            "auto-increment column {} must have an integer type",
                            col.name
                        )));
                    }
                    col.is_auto_increment = true;
                }
                ColumnConstraintAst::Comment(expr) => {
                    let Expr::Literal(Value::Text(text)) = expr else {
                        return Err(EngineError::Binder(
                            "column comment must be a string literal".into(),
                        ));
                    };
                    col.comment = Some(text.clone());
                }
                ColumnConstraintAst::Check(_) => {
                    return Err(EngineError::NotImplemented(
                        "CHECK constraints are not supported".into(),
                    ));
                }
                ColumnConstraintAst::References { .. } => {
                    return Err(EngineError::NotImplemented(
                        "column-level REFERENCES is not supported, use a table constraint".into(),
                    ));
                }
            }
        }
        if col.is_auto_increment && col.has_default() {
            return Err(EngineError::Binder(format!(
                "auto-increment column {} cannot have a default value",
                col.name
            )));
        }
        Ok(col)
    }

    fn bind_table_constraint(
        columns: &mut [Column],
        constraint: &TableConstraintAst,
    ) -> Result<Constraint, EngineError> {
        match constraint {
            TableConstraintAst::PrimaryKey { name, columns: keys } => {
                let keys = Self::mark_key_columns(columns, keys, true)?;
                Ok(Constraint::key(ConstraintType::Primary, name.clone(), keys))
            }
            TableConstraintAst::Unique { name, columns: keys } => {
                let keys = Self::mark_key_columns(columns, keys, false)?;
                Ok(Constraint::key(ConstraintType::Unique, name.clone(), keys))
            }
            TableConstraintAst::ForeignKey {
                name,
                columns: keys,
                ref_schema,
                ref_table,
                ref_columns,
                on_update,
                on_delete,
            } => {
                for key in keys {
                    if !columns.iter().any(|c| c.name.eq_ignore_ascii_case(key)) {
                        return Err(EngineError::Binder(format!(
                            "foreign key column {key} does not exist"
                        )));
                    }
                }
                let on_update = match on_update {
                    RefActionAst::NoAction | RefActionAst::Restrict => RefAction::Restrict,
                    _ => {
                        return Err(EngineError::Binder(
                            "only NO ACTION and RESTRICT are supported for ON UPDATE".into(),
                        ));
                    }
                };
                let on_delete = match on_delete {
                    RefActionAst::NoAction | RefActionAst::Restrict => RefAction::Restrict,
                    RefActionAst::Cascade => RefAction::Cascade,
                    RefActionAst::SetNull => RefAction::SetNull,
                    RefActionAst::SetDefault => {
                        return Err(EngineError::Binder(
                            "ON DELETE SET DEFAULT is not supported".into(),
                        ));
                    }
                };
                Constraint::foreign_key(
                    name.clone(),
                    keys.iter().map(|k| k.to_ascii_lowercase()).collect(),
                    ref_schema.clone(),
                    ref_table.to_ascii_lowercase(),
                    ref_columns.iter().map(|k| k.to_ascii_lowercase()).collect(),
                    on_update,
                    on_delete,
                )
            }
            TableConstraintAst::Check(_) => Err(EngineError::NotImplemented(
                "CHECK constraints are not supported".into(),
            )),
        }
    }

    fn mark_key_columns(
        columns: &mut [Column],
        keys: &[String],
        primary: bool,
    ) -> Result<Vec<String>, EngineError> {
        let mut out = Vec::with_capacity(keys.len());
        for key in keys {
            let col = columns
                .iter_mut()
                .find(|c| c.name.eq_ignore_ascii_case(key))
                .ok_or_else(|| {
                    EngineError::Binder(format!("key column {key} does not exist"))
                })?;
            if primary {
                col.is_primary = true;
                col.nullable = false;
            } else {
                col.is_unique = true;
            }
            out.push(col.name.clone());
        }
        Ok(out)
    }

    fn bind_partition(
        stmt: &CreateTableStmt,
        columns: &[Column],
        spec: &crate::ast::PartitionSpecAst,
    ) -> Result<PartitionDesc, EngineError> {
        if spec.strategy != PartitionStrategy::Range {
            return Err(EngineError::Binder(
                "only RANGE partitioning is supported".into(),
            ));
        }
        if !stmt.timescale {
            return Err(EngineError::Binder(
                "partitioned tables must be timescale tables".into(),
            ));
        }
        let [key_name] = spec.columns.as_slice() else {
            return Err(EngineError::Binder(
                "range partitioning takes exactly one key column".into(),
            ));
        };
        let key = columns
            .iter()
            .find(|c| c.name.eq_ignore_ascii_case(key_name))
            .ok_or_else(|| {
                EngineError::Binder(format!("partition key column {key_name} does not exist"))
            })?;
        if key.logical_type.id != crate::core::data_type::TypeId::Timestamp {
            return Err(EngineError::Binder(format!(
                "partition key column {key_name} must have type timestamp"
            )));
        }
        let Some(interval) = &stmt.interval else {
            return Err(EngineError::Binder(
                "timescale table requires an interval of 1h or 1d".into(),
            ));
        };
        if !is_valid_interval(interval) {
            return Err(EngineError::Binder(format!(
                "invalid interval '{interval}', expected 1h or 1d"
            )));
        }
        Ok(PartitionDesc {
            part_type: PartType::Range,
            key_slot: key.slot,
            key_type: key.logical_type.id,
            interval: interval.to_ascii_lowercase(),
            auto_addpart: stmt.auto_addpart,
            is_crosspart: stmt.crosspart,
            partitions: Vec::new(),
        })
    }

    pub(crate) fn bind_create_index(
        &mut self,
        stmt: &CreateIndexStmt,
    ) -> Result<CreateIndexStatement, EngineError> {
        if !self.catalog.has_sys_privilege(SysPrivilege::CreateIndex)? {
            return Err(EngineError::Permission(format!(
                "user {} has no create index privilege",
                self.catalog.user()
            )));
        }
        Self::bind_name(&stmt.name)?;
        let table = self.bind_base_table(stmt.schema.as_deref(), &stmt.table)?;
        Self::check_not_system(&table.info)?;
        if stmt.columns.is_empty() {
            return Err(EngineError::Binder(
                "an index needs at least one column".into(),
            ));
        }
        for name in &stmt.columns {
            let col = table.info.column_by_name(name).ok_or_else(|| {
                EngineError::Binder(format!(
                    "column {name} does not exist in table {}",
                    table.info.name
                ))
            })?;
            if col.logical_type.id.is_lob() {
                return Err(EngineError::Binder(format!(
                    "cannot index LOB column {name}"
                )));
            }
        }
        if stmt.unique && table.info.is_timescale {
            return Err(EngineError::Binder(
                "unique index is not supported on a timescale table".into(),
            ));
        }
        let mut index = Index::new(
            stmt.name.to_ascii_lowercase(),
            table.info.name.clone(),
            stmt.columns.iter().map(|c| c.to_ascii_lowercase()).collect(),
        );
        index.is_unique = stmt.unique;
        index.parted = table.info.is_parted();
        self.add_related_table(&table.info, true);
        Ok(CreateIndexStatement {
            schema: stmt.schema.clone(),
            index,
            ignore_conflict: stmt.on_conflict == OnConflict::Ignore,
        })
    }

    pub(crate) fn bind_create_sequence(
        &mut self,
        stmt: &CreateSequenceStmt,
    ) -> Result<CreateSequenceStatement, EngineError> {
        if !self.catalog.has_sys_privilege(SysPrivilege::CreateSequence)? {
            return Err(EngineError::Permission(format!(
                "user {} has no create sequence privilege",
                self.catalog.user()
            )));
        }
        if stmt.temporary {
            return Err(EngineError::NotImplemented(
                "temporary sequences are not supported".into(),
            ));
        }
        Self::bind_name(&stmt.name)?;

        let mut increment: Option<i64> = None;
        let mut min_value: Option<i64> = None;
        let mut max_value: Option<i64> = None;
        let mut start_value: Option<i64> = None;
        let mut cycle: Option<bool> = None;
        let mut seen: Vec<String> = Vec::new();
        for opt in &stmt.options {
            let name = opt.name.to_ascii_lowercase();
            if seen.contains(&name) {
                return Err(EngineError::Syntax(format!(
                    "duplicate sequence option: {name}"
                )));
            }
            seen.push(name.clone());
            match name.as_str() {
                "increment" => {
                    let v = opt.value.ok_or_else(|| {
                        EngineError::Syntax("INCREMENT needs a value".into())
                    })?;
                    if v == 0 {
                        return Err(EngineError::Syntax("INCREMENT must not be zero".into()));
                    }
                    increment = Some(v);
                }
                "minvalue" => min_value = if opt.no_value { None } else { opt.value },
                "maxvalue" => max_value = if opt.no_value { None } else { opt.value },
                "start" => {
                    start_value = Some(opt.value.ok_or_else(|| {
                        EngineError::Syntax("START needs a value".into())
                    })?);
                }
                "cycle" => cycle = Some(!opt.no_value),
                other => {
                    return Err(EngineError::Syntax(format!(
                        "unknown sequence option: {other}"
                    )));
                }
            }
        }
        let increment = increment.unwrap_or(1);
        let ascending = increment > 0;
        let min_value = min_value.unwrap_or(if ascending { 1 } else { i64::MIN + 1 });
        let max_value = max_value.unwrap_or(if ascending { i64::MAX - 1 } else { -1 });
        let start_value = start_value.unwrap_or(if ascending { min_value } else { max_value });
        if min_value >= max_value {
            return Err(EngineError::Binder(format!(
                "MINVALUE {min_value} must be below MAXVALUE {max_value}"
            )));
        }
        if start_value < min_value || start_value > max_value {
            return Err(EngineError::Binder(format!(
                "START {start_value} is outside [{min_value}, {max_value}]"
            )));
        }
        Ok(CreateSequenceStatement {
            schema: stmt.schema.clone(),
            name: stmt.name.to_ascii_lowercase(),
            increment,
            min_value,
            max_value,
            start_value,
            cycle: cycle.unwrap_or(false),
            ignore_conflict: stmt.on_conflict == OnConflict::Ignore,
        })
    }
}

fn is_valid_interval(s: &str) -> bool {
    let b = s.as_bytes();
    b.len() == 2 && b[0] == b'1' && matches!(b[1].to_ascii_lowercase(), b'h' | b'd')
}

/// `[1-9][0-9]*` followed by `h` or `d`.
fn is_valid_retention(s: &str) -> bool {
    let b = s.as_bytes();
    if b.len() < 2 {
        return false;
    }
    let (digits, unit) = b.split_at(b.len() - 1);
    matches!(unit[0].to_ascii_lowercase(), b'h' | b'd')
        && digits[0] != b'0'
        && digits.iter().all(u8::is_ascii_digit)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn interval_accepts_exactly_1h_and_1d() {
        assert!(is_valid_interval("1h"));
        assert!(is_valid_interval("1D"));
        assert!(!is_valid_interval("2h"));
        assert!(!is_valid_interval("1m"));
        assert!(!is_valid_interval("10h"));
    }

    #[test]
    fn retention_accepts_positive_hours_and_days() {
        assert!(is_valid_retention("7d"));
        assert!(is_valid_retention("48h"));
        assert!(is_valid_retention("365d"));
        assert!(!is_valid_retention("0d"));
        assert!(!is_valid_retention("07d"));
        assert!(!is_valid_retention("7w"));
        assert!(!is_valid_retention("d"));
    }
}
