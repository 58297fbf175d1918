use serde::{Deserialize, Serialize};

use crate::core::error::EngineError;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum ConstraintType {
    Primary,
    Unique,
    ForeignKey,
}

/// Referential action of a foreign key. `SET DEFAULT` and `ON UPDATE`
/// actions other than restrict are rejected at bind time.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub enum RefAction {
    #[default]
    Restrict,
    Cascade,
    SetNull,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Constraint {
    pub ctype: ConstraintType,
    pub name: Option<String>,
    pub columns: Vec<String>,
    pub ref_schema: Option<String>,
    pub ref_table: Option<String>,
    pub ref_columns: Vec<String>,
    pub on_update: RefAction,
    pub on_delete: RefAction,
}

impl Constraint {
    #[must_use]
    pub fn key(ctype: ConstraintType, name: Option<String>, columns: Vec<String>) -> Self {
        Self {
            ctype,
            name,
            columns,
            ref_schema: None,
            ref_table: None,
            ref_columns: Vec::new(),
            on_update: RefAction::Restrict,
            on_delete: RefAction::Restrict,
        }
    }

    pub fn foreign_key(
        name: Option<String>,
        columns: Vec<String>,
        ref_schema: Option<String>,
        ref_table: String,
        ref_columns: Vec<String>,
        on_update: RefAction,
        on_delete: RefAction,
    ) -> Result<Self, EngineError> {
        if columns.len() != ref_columns.len() {
            return Err(EngineError::Binder(format!(
                "foreign key column count {} does not match referenced column count {}",
                columns.len(),
                ref_columns.len()
            )));
        }
        Ok(Self {
            ctype: ConstraintType::ForeignKey,
            name,
            columns,
            ref_schema,
            ref_table: Some(ref_table),
            ref_columns,
            on_update,
            on_delete,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn foreign_key_requires_matching_column_counts() {
        let err = Constraint::foreign_key(
            None,
            vec!["a".into(), "b".into()],
            None,
            "parent".into(),
            vec!["id".into()],
            RefAction::Restrict,
            RefAction::Cascade,
        );
        assert!(err.is_err());
    }
}
