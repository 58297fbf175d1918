/// Session control: SET, SHOW and transaction statements.
use crate::ast::TxnKind;
use crate::binder::statement::{SetStatement, SetVariable, ShowStatement, TransactionStatement};
use crate::catalog::Catalog;
use crate::core::column::Column;
use crate::core::data_type::LogicalType;
use crate::core::error::EngineError;
use crate::core::schema::Schema;
use crate::core::value::Value;
use crate::executor::{RecordBatch, SessionVars};
use crate::kernel::StorageKernel;

pub struct SessionExecutor;

impl SessionExecutor {
    pub fn set(vars: &mut SessionVars, stmt: &SetStatement) -> Result<RecordBatch, EngineError> {
        match stmt.variable {
            SetVariable::AutoCommit => {
                vars.auto_commit = stmt.value.as_bool().ok_or_else(|| {
                    EngineError::Executor("auto_commit expects a boolean".into())
                })?;
            }
            SetVariable::MaxConnections => {
                vars.max_connections = stmt.value.as_int().ok_or_else(|| {
                    EngineError::Executor("max_connections expects an integer".into())
                })?;
            }
            SetVariable::SynchronousCommit => {
                vars.synchronous_commit = stmt
                    .value
                    .as_text()
                    .ok_or_else(|| {
                        EngineError::Executor("synchronous_commit expects on or off".into())
                    })?
                    .to_string();
            }
        }
        Ok(RecordBatch::empty())
    }

    pub fn show(vars: &SessionVars, stmt: &ShowStatement) -> Result<RecordBatch, EngineError> {
        match stmt {
            ShowStatement::Variable(name) => {
                let value = match name.as_str() {
                    "auto_commit" => Value::Boolean(vars.auto_commit),
                    "max_connections" => Value::Int(vars.max_connections),
                    "synchronous_commit" => Value::Text(vars.synchronous_commit.clone()),
                    other => {
                        return Err(EngineError::Executor(format!(
                            "unknown variable: {other}"
                        )));
                    }
                };
                Ok(RecordBatch {
                    schema: variable_schema(),
                    rows: vec![vec![Value::Text(name.clone()), value]],
                    ..RecordBatch::default()
                })
            }
            ShowStatement::Table(table) => {
                let rows = table
                    .info
                    .columns
                    .iter()
                    .map(|c| {
                        vec![
                            Value::Text(c.name.clone()),
                            Value::Text(c.logical_type.to_string()),
                            Value::Boolean(c.nullable),
                        ]
                    })
                    .collect();
                Ok(RecordBatch {
                    schema: describe_schema(),
                    rows,
                    ..RecordBatch::default()
                })
            }
        }
    }

    pub fn transaction<K: StorageKernel>(
        catalog: &Catalog<K>,
        stmt: &TransactionStatement,
    ) -> Result<RecordBatch, EngineError> {
        let kernel = catalog.kernel();
        match stmt.kind {
            TxnKind::Begin => kernel.begin()?,
            TxnKind::Commit => kernel.commit()?,
            TxnKind::Rollback => kernel.rollback()?,
        }
        Ok(RecordBatch::empty())
    }
}

fn variable_schema() -> Schema {
    Schema::from_columns(&[
        Column::new("name", LogicalType::varchar(64)),
        column_at("value", LogicalType::varchar(64), 1),
    ])
}

fn describe_schema() -> Schema {
    Schema::from_columns(&[
        Column::new("column", LogicalType::varchar(64)),
        column_at("type", LogicalType::varchar(64), 1),
        column_at("nullable", LogicalType::boolean(), 2),
    ])
}

fn column_at(name: &str, ty: LogicalType, slot: u16) -> Column {
    let mut col = Column::new(name, ty);
    col.slot = slot;
    col
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_updates_the_session() {
        let mut vars = SessionVars::default();
        let stmt = SetStatement {
            variable: SetVariable::AutoCommit,
            value: Value::Boolean(false),
        };
        SessionExecutor::set(&mut vars, &stmt).unwrap();
        assert!(!vars.auto_commit);
    }

    #[test]
    fn show_variable_returns_one_row() {
        let vars = SessionVars::default();
        let batch =
            SessionExecutor::show(&vars, &ShowStatement::Variable("max_connections".into()))
                .unwrap();
        assert_eq!(batch.rows, vec![vec![
            Value::Text("max_connections".into()),
            Value::Int(128),
        ]]);
    }

    #[test]
    fn show_unknown_variable_is_an_error() {
        let vars = SessionVars::default();
        assert!(SessionExecutor::show(&vars, &ShowStatement::Variable("nope".into())).is_err());
    }
}
