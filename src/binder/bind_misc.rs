// SET / SHOW / DROP / transaction binding.

use crate::ast::{DropStmt, SetStmt, ShowKind, ShowStmt, TransactionStmt, VarScope};
use crate::binder::Binder;
use crate::binder::statement::{
    DropStatement, SetStatement, SetVariable, ShowStatement, TransactionStatement,
};
use crate::core::error::EngineError;
use crate::core::value::Value;
use crate::kernel::{ObjectKind, ObjectPrivilege, StorageKernel};

pub const MIN_CONNECTIONS: i64 = 1;
pub const MAX_CONNECTIONS: i64 = 1024;

impl<K: StorageKernel> Binder<'_, K> {
    pub(crate) fn bind_set(&mut self, stmt: &SetStmt) -> Result<SetStatement, EngineError> {
        let name = stmt.name.to_ascii_lowercase();
        if name.is_empty() {
            return Err(EngineError::Syntax("SET needs a variable name".into()));
        }
        match name.as_str() {
            "auto_commit" => {
                if stmt.scope == VarScope::Global {
                    return Err(EngineError::Binder(
                        "auto_commit is a session variable".into(),
                    ));
                }
                let value = Self::single_arg(stmt)?;
                let flag = match value {
                    Value::Boolean(b) => *b,
                    Value::Text(s) => match s.to_ascii_lowercase().as_str() {
                        "true" | "on" => true,
                        "false" | "off" => false,
                        _ => {
                            return Err(EngineError::Binder(format!(
                                "invalid auto_commit value: {s}"
                            )));
                        }
                    },
                    other => {
                        return Err(EngineError::Binder(format!(
                            "invalid auto_commit value: {other}"
                        )));
                    }
                };
                Ok(SetStatement {
                    variable: SetVariable::AutoCommit,
                    value: Value::Boolean(flag),
                })
            }
            "max_connections" => {
                if stmt.scope != VarScope::Global {
                    return Err(EngineError::Binder(
                        "max_connections is a global variable".into(),
                    ));
                }
                let value = Self::single_arg(stmt)?;
                let n = value.as_int().ok_or_else(|| {
                    EngineError::Binder(format!("invalid max_connections value: {value}"))
                })?;
                if !(MIN_CONNECTIONS..=MAX_CONNECTIONS).contains(&n) {
                    return Err(EngineError::OutOfRange(format!(
                        "max_connections {n} outside [{MIN_CONNECTIONS}, {MAX_CONNECTIONS}]"
                    )));
                }
                Ok(SetStatement {
                    variable: SetVariable::MaxConnections,
                    value: Value::Int(n),
                })
            }
            "synchronous_commit" => {
                let value = Self::single_arg(stmt)?;
                let Some(text) = value.as_text() else {
                    return Err(EngineError::Binder(format!(
                        "invalid synchronous_commit value: {value}"
                    )));
                };
                let lowered = text.to_ascii_lowercase();
                if lowered != "on" && lowered != "off" {
                    return Err(EngineError::Binder(format!(
                        "synchronous_commit must be on or off, got {text}"
                    )));
                }
                Ok(SetStatement {
                    variable: SetVariable::SynchronousCommit,
                    value: Value::Text(lowered),
                })
            }
            other => Err(EngineError::Binder(format!(
                "variable {other} cannot be set"
            ))),
        }
    }

    fn single_arg(stmt: &SetStmt) -> Result<&Value, EngineError> {
        match stmt.args.as_slice() {
            [v] => Ok(v),
            _ => Err(EngineError::Syntax(format!(
                "SET {} takes exactly one value",
                stmt.name
            ))),
        }
    }

    pub(crate) fn bind_show(&mut self, stmt: &ShowStmt) -> Result<ShowStatement, EngineError> {
        match &stmt.kind {
            ShowKind::Variable(name) => {
                let lowered = name.to_ascii_lowercase();
                match lowered.as_str() {
                    "auto_commit" | "max_connections" | "synchronous_commit" => {
                        Ok(ShowStatement::Variable(lowered))
                    }
                    other => Err(EngineError::Binder(format!("unknown variable: {other}"))),
                }
            }
            ShowKind::Table { schema, table } => {
                let table = self.bind_base_table(schema.as_deref(), table)?;
                self.add_related_table(&table.info, false);
                Ok(ShowStatement::Table(table))
            }
        }
    }

    pub(crate) fn bind_drop(&mut self, stmt: &DropStmt) -> Result<DropStatement, EngineError> {
        Self::bind_name(&stmt.name)?;
        let name = stmt.name.to_ascii_lowercase();
        if stmt.kind == ObjectKind::Table {
            // a missing table is the executor's problem when IF EXISTS is set
            if let Some(info) = self.catalog.get_table(stmt.schema.as_deref(), &name)? {
                Self::check_not_system(&info)?;
                if !self
                    .catalog
                    .verify_table_privilege(&info, &name, ObjectPrivilege::Drop)?
                {
                    return Err(EngineError::Permission(format!(
                        "{name} drop permission denied"
                    )));
                }
                self.add_related_table(&info, true);
            }
        }
        Ok(DropStatement {
            schema: stmt.schema.clone(),
            name,
            kind: stmt.kind,
            if_exists: stmt.if_exists,
        })
    }

    pub(crate) fn bind_transaction(&mut self, stmt: &TransactionStmt) -> TransactionStatement {
        TransactionStatement { kind: stmt.kind }
    }
}
