use std::cmp::Ordering;

use crate::ast::BinaryOp;
use crate::core::data_type::LogicalType;
use crate::core::error::EngineError;
use crate::core::value::Value;

/// Resolved scalar expression. Column references carry the slot they
/// resolved to, so evaluation never looks names up again.
#[derive(Debug, Clone, PartialEq)]
pub enum BoundExpression {
    Constant(Value),
    ColumnRef {
        table: String,
        column: String,
        logical_type: LogicalType,
        slot: u16,
    },
    /// Volatile function call kept for write-time evaluation.
    Function {
        name: String,
        args: Vec<BoundExpression>,
    },
    /// `nextval(seq)` / `currval(seq)`.
    SeqFunc {
        func: String,
        sequence: String,
    },
    Comparison {
        op: BinaryOp,
        left: Box<BoundExpression>,
        right: Box<BoundExpression>,
    },
    Logical {
        op: BinaryOp,
        left: Box<BoundExpression>,
        right: Box<BoundExpression>,
    },
}

impl BoundExpression {
    /// Evaluates against one row laid out in slot order. Comparisons with
    /// NULL on either side are false, matching SQL filter semantics.
    pub fn evaluate(&self, row: &[Value]) -> Result<Value, EngineError> {
        match self {
            Self::Constant(v) => Ok(v.clone()),
            Self::ColumnRef { slot, column, .. } => row
                .get(*slot as usize)
                .cloned()
                .ok_or_else(|| EngineError::Executor(format!("row has no slot for column {column}"))),
            Self::Function { name, .. } | Self::SeqFunc { func: name, .. } => Err(
                EngineError::Executor(format!("function {name} cannot run in a row filter")),
            ),
            Self::Comparison { op, left, right } => {
                let l = left.evaluate(row)?;
                let r = right.evaluate(row)?;
                if l.is_null() || r.is_null() {
                    return Ok(Value::Boolean(false));
                }
                let Some(ord) = compare_values(&l, &r) else {
                    return Err(EngineError::Executor(format!(
                        "cannot compare {:?} with {:?}",
                        l.type_id(),
                        r.type_id()
                    )));
                };
                let hit = match op {
                    BinaryOp::Eq => ord == Ordering::Equal,
                    BinaryOp::NotEq => ord != Ordering::Equal,
                    BinaryOp::Lt => ord == Ordering::Less,
                    BinaryOp::LtEq => ord != Ordering::Greater,
                    BinaryOp::Gt => ord == Ordering::Greater,
                    BinaryOp::GtEq => ord != Ordering::Less,
                    BinaryOp::And | BinaryOp::Or => {
                        return Err(EngineError::Executor(
                            "logical operator in comparison node".into(),
                        ));
                    }
                };
                Ok(Value::Boolean(hit))
            }
            Self::Logical { op, left, right } => {
                let l = left.evaluate(row)?.as_bool().unwrap_or(false);
                let r = right.evaluate(row)?.as_bool().unwrap_or(false);
                let hit = match op {
                    BinaryOp::And => l && r,
                    BinaryOp::Or => l || r,
                    _ => {
                        return Err(EngineError::Executor(
                            "comparison operator in logical node".into(),
                        ));
                    }
                };
                Ok(Value::Boolean(hit))
            }
        }
    }

    /// True when a filter accepts the row.
    pub fn matches(&self, row: &[Value]) -> Result<bool, EngineError> {
        Ok(self.evaluate(row)?.as_bool().unwrap_or(false))
    }
}

pub(crate) fn compare_values(a: &Value, b: &Value) -> Option<Ordering> {
    match (a, b) {
        (Value::Int(x), Value::Int(y)) => Some(x.cmp(y)),
        (Value::Real(x), Value::Real(y)) => x.partial_cmp(y),
        (Value::Int(x), Value::Real(y)) => (*x as f64).partial_cmp(y),
        (Value::Real(x), Value::Int(y)) => x.partial_cmp(&(*y as f64)),
        (Value::Decimal(x), Value::Decimal(y)) => Some(x.cmp(y)),
        (Value::Text(x), Value::Text(y)) => Some(x.cmp(y)),
        (Value::Boolean(x), Value::Boolean(y)) => Some(x.cmp(y)),
        (Value::Timestamp(x), Value::Timestamp(y)) => Some(x.cmp(y)),
        (Value::Date(x), Value::Date(y)) => Some(x.cmp(y)),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn col(slot: u16) -> BoundExpression {
        BoundExpression::ColumnRef {
            table: "t".into(),
            column: "c".into(),
            logical_type: LogicalType::integer(),
            slot,
        }
    }

    fn cmp(op: BinaryOp, left: BoundExpression, right: BoundExpression) -> BoundExpression {
        BoundExpression::Comparison {
            op,
            left: Box::new(left),
            right: Box::new(right),
        }
    }

    #[test]
    fn comparison_with_null_is_false() {
        let filter = cmp(BinaryOp::Eq, col(0), BoundExpression::Constant(Value::Int(1)));
        assert!(!filter.matches(&[Value::Null]).unwrap());
        assert!(filter.matches(&[Value::Int(1)]).unwrap());
    }

    #[test]
    fn logical_and_combines_comparisons() {
        let filter = BoundExpression::Logical {
            op: BinaryOp::And,
            left: Box::new(cmp(
                BinaryOp::GtEq,
                col(0),
                BoundExpression::Constant(Value::Int(10)),
            )),
            right: Box::new(cmp(
                BinaryOp::Lt,
                col(0),
                BoundExpression::Constant(Value::Int(20)),
            )),
        };
        assert!(filter.matches(&[Value::Int(15)]).unwrap());
        assert!(!filter.matches(&[Value::Int(20)]).unwrap());
    }
}
