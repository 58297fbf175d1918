use serde::{Deserialize, Serialize};

use crate::core::data_type::LogicalType;
use crate::core::value::Value;

/// Default-value payload of a column. A literal is stored pre-cast to the
/// column type; a function default keeps the call text (`now`,
/// `current_date`, `random`, `nextval(seq)`, `currval(seq)`) and is
/// resolved at write time.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub enum DefaultValue {
    Literal(Value),
    Function(String),
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Column {
    pub name: String,
    pub logical_type: LogicalType,
    /// Ordinal position inside the table definition.
    pub slot: u16,
    pub nullable: bool,
    pub is_primary: bool,
    pub is_unique: bool,
    pub is_auto_increment: bool,
    pub default: Option<DefaultValue>,
    pub comment: Option<String>,
    /// Staged value for the row being written or fetched. Not part of the
    /// table definition.
    #[serde(skip)]
    pub crud_value: Option<Value>,
}

impl Column {
    #[must_use]
    pub fn new(name: impl Into<String>, logical_type: LogicalType) -> Self {
        Self {
            name: name.into(),
            logical_type,
            slot: 0,
            nullable: true,
            is_primary: false,
            is_unique: false,
            is_auto_increment: false,
            default: None,
            comment: None,
            crud_value: None,
        }
    }

    #[must_use]
    pub const fn has_default(&self) -> bool {
        self.default.is_some()
    }

    #[must_use]
    pub fn with_crud(&self, value: Value) -> Self {
        let mut col = self.clone();
        col.crud_value = Some(value);
        col
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::data_type::TypeId;

    #[test]
    fn new_column_is_nullable_without_default() {
        let col = Column::new("amount", LogicalType::decimal(18, 4));
        assert!(col.nullable);
        assert!(!col.has_default());
        assert_eq!(col.logical_type.id, TypeId::Decimal);
    }

    #[test]
    fn with_crud_does_not_touch_the_definition() {
        let col = Column::new("id", LogicalType::integer());
        let staged = col.with_crud(Value::Int(7));
        assert_eq!(staged.crud_value, Some(Value::Int(7)));
        assert_eq!(col.crud_value, None);
    }
}
