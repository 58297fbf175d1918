use std::cell::Cell;
use std::time::{SystemTime, UNIX_EPOCH};

use chrono::Utc;

use crate::ast::Expr;
use crate::catalog::Catalog;
use crate::core::column::{Column, DefaultValue};
use crate::core::error::EngineError;
use crate::core::value::Value;
use crate::kernel::StorageKernel;

/// Function defaults evaluated fresh on every write.
const VOLATILE_DEFAULTS: &[&str] = &["now", "current_date", "random"];

/// Binds a column DEFAULT expression. A literal is cast to the column
/// type and stored; an allow-listed function call is stored by name and
/// resolved at write time. A bare NULL clears rather than sets the
/// default and forces the column nullable.
pub fn bind_default<K: StorageKernel>(
    catalog: &Catalog<K>,
    schema: Option<&str>,
    column: &mut Column,
    expr: &Expr,
) -> Result<(), EngineError> {
    match expr {
        Expr::Literal(Value::Null) => {
            column.nullable = true;
            column.default = None;
            Ok(())
        }
        Expr::Literal(v) => {
            let cast = v.try_cast(&column.logical_type)?;
            column.default = Some(DefaultValue::Literal(cast));
            Ok(())
        }
        Expr::Function { name, args } => {
            let lowered = name.to_ascii_lowercase();
            if lowered == "nextval" || lowered == "currval" {
                let seq = seq_arg(args).ok_or_else(|| {
                    EngineError::Binder(format!("{lowered} takes one sequence name argument"))
                })?;
                if !catalog.sequence_exists(schema, &seq)? {
                    return Err(EngineError::Catalog(format!(
                        "sequence {seq} does not exist"
                    )));
                }
                column.default = Some(DefaultValue::Function(format!("{lowered}({seq})")));
                return Ok(());
            }
            if VOLATILE_DEFAULTS.contains(&lowered.as_str()) {
                if !args.is_empty() {
                    return Err(EngineError::Binder(format!(
                        "default function {lowered} takes no arguments"
                    )));
                }
                column.default = Some(DefaultValue::Function(lowered));
                return Ok(());
            }
            Err(EngineError::Catalog(format!(
                "function {name} cannot be used as a column default"
            )))
        }
        _ => Err(EngineError::Catalog(
            "unsupported default value expression".into(),
        )),
    }
}

fn seq_arg(args: &[Expr]) -> Option<String> {
    match args {
        [Expr::Literal(Value::Text(s))] => Some(s.clone()),
        [Expr::Column(parts)] if parts.len() == 1 => Some(parts[0].clone()),
        _ => None,
    }
}

/// Splits a stored function default into `(func, Some(seq))` for sequence
/// calls, `(func, None)` otherwise.
#[must_use]
pub fn parse_function_default(text: &str) -> (&str, Option<&str>) {
    match text.split_once('(') {
        Some((func, rest)) => (func, Some(rest.trim_end_matches(')'))),
        None => (text, None),
    }
}

/// Evaluates a non-sequence function default. Sequence calls go through
/// the data source, which owns kernel access.
pub fn eval_volatile_default(func: &str) -> Result<Value, EngineError> {
    match func {
        "now" => Ok(Value::Timestamp(Utc::now().naive_utc())),
        "current_date" => Ok(Value::Date(Utc::now().date_naive())),
        "random" => Ok(Value::Int(next_random())),
        other => Err(EngineError::Executor(format!(
            "unknown function default: {other}"
        ))),
    }
}

thread_local! {
    static RANDOM_STATE: Cell<u64> = Cell::new(
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map_or(0x9e37_79b9_7f4a_7c15, |d| d.as_nanos() as u64)
            | 1,
    );
}

// xorshift64*, good enough for a column default
fn next_random() -> i64 {
    RANDOM_STATE.with(|state| {
        let mut x = state.get();
        x ^= x >> 12;
        x ^= x << 25;
        x ^= x >> 27;
        state.set(x);
        (x.wrapping_mul(0x2545_f491_4f6c_dd1d) >> 1) as i64
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn function_default_text_splits_back() {
        assert_eq!(parse_function_default("now"), ("now", None));
        assert_eq!(
            parse_function_default("nextval(order_seq)"),
            ("nextval", Some("order_seq"))
        );
    }

    #[test]
    fn volatile_defaults_evaluate() {
        assert!(matches!(
            eval_volatile_default("now").unwrap(),
            Value::Timestamp(_)
        ));
        assert!(matches!(
            eval_volatile_default("current_date").unwrap(),
            Value::Date(_)
        ));
        assert!(matches!(
            eval_volatile_default("random").unwrap(),
            Value::Int(_)
        ));
        assert!(eval_volatile_default("uuid").is_err());
    }

    #[test]
    fn random_default_varies() {
        let a = next_random();
        let b = next_random();
        assert_ne!(a, b);
    }
}
