// Binder: turns parsed statements into bound statements by resolving
// names against the catalog, validating types and constraints, and
// checking privileges. One binder instance binds one statement.

pub mod bind_alter;
pub mod bind_copy;
pub mod bind_create;
pub mod bind_dml;
pub mod bind_misc;
pub mod context;
pub mod default_value;
pub mod expression;
pub mod statement;
pub mod transform_typename;

use crate::ast::{BinaryOp, Expr, Statement};
use crate::catalog::Catalog;
use crate::core::data_type::MAX_NAME_LEN;
use crate::core::error::EngineError;
use crate::core::table_info::{SpaceKind, TableInfo};
use crate::kernel::StorageKernel;

pub use context::BinderContext;
pub use expression::BoundExpression;
pub use statement::{
    AlterStatement, BoundBaseTable, BoundNode, BoundStatement, CopyStatement,
    CreateIndexStatement, CreateSequenceStatement, CreateStatement, DeleteStatement,
    DropStatement, InsertStatement, SetStatement, SetVariable, ShowStatement, StatementKind,
    StatementProps, TransactionStatement, UpdateStatement,
};
pub use transform_typename::transform_type_name;

pub struct Binder<'a, K: StorageKernel> {
    pub(crate) catalog: &'a Catalog<K>,
    pub(crate) ctx: BinderContext,
    pub(crate) props: StatementProps,
}

impl<'a, K: StorageKernel> Binder<'a, K> {
    pub fn new(catalog: &'a Catalog<K>) -> Self {
        Self {
            catalog,
            ctx: BinderContext::new(),
            props: StatementProps::default(),
        }
    }

    pub fn bind(&mut self, stmt: &Statement) -> Result<BoundStatement, EngineError> {
        let node = match stmt {
            Statement::CreateTable(s) => BoundNode::CreateTable(self.bind_create_table(s)?),
            Statement::AlterTable(s) => BoundNode::Alter(self.bind_alter_table(s)?),
            Statement::Rename(s) => BoundNode::Alter(self.bind_rename(s)?),
            Statement::CreateIndex(s) => BoundNode::CreateIndex(self.bind_create_index(s)?),
            Statement::CreateSequence(s) => {
                BoundNode::CreateSequence(self.bind_create_sequence(s)?)
            }
            Statement::Insert(s) => BoundNode::Insert(self.bind_insert(s)?),
            Statement::Delete(s) => BoundNode::Delete(self.bind_delete(s)?),
            Statement::Update(s) => BoundNode::Update(self.bind_update(s)?),
            Statement::Copy(s) => BoundNode::Copy(self.bind_copy(s)?),
            Statement::Set(s) => BoundNode::Set(self.bind_set(s)?),
            Statement::Show(s) => BoundNode::Show(self.bind_show(s)?),
            Statement::Drop(s) => BoundNode::Drop(self.bind_drop(s)?),
            Statement::Transaction(s) => BoundNode::Transaction(self.bind_transaction(s)),
        };
        Ok(BoundStatement {
            props: std::mem::take(&mut self.props),
            node,
        })
    }

    /// Identifier rules: non-empty, shorter than [`MAX_NAME_LEN`], first
    /// character not a digit, only ASCII alphanumerics and underscore.
    pub(crate) fn bind_name(name: &str) -> Result<(), EngineError> {
        if name.is_empty() {
            return Err(EngineError::Binder("name cannot be empty".into()));
        }
        if name.len() >= MAX_NAME_LEN {
            return Err(EngineError::Binder(format!(
                "name '{name}' is longer than {MAX_NAME_LEN} characters"
            )));
        }
        let mut chars = name.chars();
        if chars.next().is_some_and(|c| c.is_ascii_digit()) {
            return Err(EngineError::Binder(format!(
                "name '{name}' cannot start with a digit"
            )));
        }
        if !name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
            return Err(EngineError::Binder(format!(
                "name '{name}' contains invalid characters"
            )));
        }
        Ok(())
    }

    pub(crate) fn bind_base_table(
        &mut self,
        schema: Option<&str>,
        name: &str,
    ) -> Result<BoundBaseTable, EngineError> {
        let info = self
            .catalog
            .get_table(schema, name)?
            .ok_or_else(|| EngineError::Catalog(format!("table {name} does not exist")))?;
        Ok(BoundBaseTable {
            schema: self.catalog.schema_or_session(schema).to_string(),
            bound_name: name.to_string(),
            info,
        })
    }

    pub(crate) fn check_not_system(info: &TableInfo) -> Result<(), EngineError> {
        if info.space == SpaceKind::System {
            return Err(EngineError::Binder(format!(
                "cannot modify system table {}",
                info.name
            )));
        }
        Ok(())
    }

    pub(crate) fn add_related_table(&mut self, info: &TableInfo, modifies: bool) {
        self.props.add(&info.name, info.is_timescale, modifies);
    }

    pub(crate) fn bind_expression(&self, expr: &Expr) -> Result<BoundExpression, EngineError> {
        match expr {
            Expr::Literal(v) => Ok(BoundExpression::Constant(v.clone())),
            Expr::Column(parts) => self.bind_column_ref(parts),
            Expr::Function { name, args } => self.bind_function(name, args),
            Expr::Binary { op, left, right } => {
                let left = Box::new(self.bind_expression(left)?);
                let right = Box::new(self.bind_expression(right)?);
                match op {
                    BinaryOp::And | BinaryOp::Or => Ok(BoundExpression::Logical {
                        op: *op,
                        left,
                        right,
                    }),
                    _ => Ok(BoundExpression::Comparison {
                        op: *op,
                        left,
                        right,
                    }),
                }
            }
        }
    }

    fn bind_column_ref(&self, parts: &[String]) -> Result<BoundExpression, EngineError> {
        let (binding, column) = match parts {
            [column] => {
                let binding = self.ctx.binding_by_column(column)?.ok_or_else(|| {
                    EngineError::Binder(format!("column {column} does not exist"))
                })?;
                (binding, column)
            }
            [table, column] => {
                let binding = self.ctx.binding(table).ok_or_else(|| {
                    EngineError::Binder(format!("table {table} is not in scope"))
                })?;
                (binding, column)
            }
            _ => {
                return Err(EngineError::Binder(format!(
                    "invalid column reference: {}",
                    parts.join(".")
                )));
            }
        };
        let col = binding
            .columns
            .iter()
            .find(|c| c.name.eq_ignore_ascii_case(column))
            .ok_or_else(|| {
                EngineError::Binder(format!(
                    "column {column} does not exist in table {}",
                    binding.alias
                ))
            })?;
        Ok(BoundExpression::ColumnRef {
            table: binding.alias.clone(),
            column: col.name.clone(),
            logical_type: col.logical_type,
            slot: col.slot,
        })
    }

    fn bind_function(&self, name: &str, args: &[Expr]) -> Result<BoundExpression, EngineError> {
        let lowered = name.to_ascii_lowercase();
        match lowered.as_str() {
            "nextval" | "currval" => {
                let seq = match args {
                    [Expr::Literal(crate::core::value::Value::Text(s))] => s.clone(),
                    [Expr::Column(parts)] if parts.len() == 1 => parts[0].clone(),
                    _ => {
                        return Err(EngineError::Binder(format!(
                            "{lowered} takes one sequence name argument"
                        )));
                    }
                };
                if !self.catalog.sequence_exists(None, &seq)? {
                    return Err(EngineError::Catalog(format!(
                        "sequence {seq} does not exist"
                    )));
                }
                Ok(BoundExpression::SeqFunc {
                    func: lowered,
                    sequence: seq,
                })
            }
            "now" | "current_date" | "random" => {
                if !args.is_empty() {
                    return Err(EngineError::Binder(format!(
                        "function {lowered} takes no arguments"
                    )));
                }
                Ok(BoundExpression::Function {
                    name: lowered,
                    args: Vec::new(),
                })
            }
            _ => Err(EngineError::NotImplemented(format!(
                "function {name} is not supported"
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_follow_identifier_rules() {
        assert!(Binder::<crate::kernel::MemoryKernel>::bind_name("orders_2024").is_ok());
        assert!(Binder::<crate::kernel::MemoryKernel>::bind_name("_hidden").is_ok());
        assert!(Binder::<crate::kernel::MemoryKernel>::bind_name("").is_err());
        assert!(Binder::<crate::kernel::MemoryKernel>::bind_name("1st").is_err());
        assert!(Binder::<crate::kernel::MemoryKernel>::bind_name("bad-name").is_err());
        assert!(Binder::<crate::kernel::MemoryKernel>::bind_name(&"x".repeat(64)).is_err());
        assert!(Binder::<crate::kernel::MemoryKernel>::bind_name(&"x".repeat(63)).is_ok());
    }
}
