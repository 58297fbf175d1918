// Module declarations
pub mod alter;
pub mod column;
pub mod constraints;
pub mod data_type;
pub mod error;
pub mod index;
pub mod schema;
pub mod table_info;
pub mod value;

// Re-exports for convenience
pub use alter::AlterTableInfo;
pub use column::{Column, DefaultValue};
pub use constraints::{Constraint, ConstraintType, RefAction};
pub use data_type::{LogicalType, TypeId};
pub use error::EngineError;
pub use index::Index;
pub use schema::{Schema, SchemaColumn};
pub use table_info::{PartType, PartitionDesc, PartitionInfo, SpaceKind, TableInfo};
pub use value::Value;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_value_display() {
        assert_eq!(Value::Null.to_string(), "NULL");
        assert_eq!(Value::Int(42).to_string(), "42");
        assert_eq!(Value::Real(3.14).to_string(), "3.14");
        assert_eq!(Value::Text("hello".to_string()).to_string(), "hello");
        assert_eq!(Value::Boolean(true).to_string(), "true");
    }

    #[test]
    fn test_value_as_int() {
        assert_eq!(Value::Int(42).as_int(), Some(42));
        assert_eq!(Value::Text("hello".to_string()).as_int(), None);
        assert_eq!(Value::Null.as_int(), None);
    }

    #[test]
    fn test_value_as_text() {
        assert_eq!(Value::Text("hello".to_string()).as_text(), Some("hello"));
        assert_eq!(Value::Int(42).as_text(), None);
    }

    #[test]
    fn test_table_info_column_lookup() {
        let info = TableInfo {
            user: "sys".into(),
            user_id: 0,
            name: "users".into(),
            space: SpaceKind::Users,
            columns: vec![
                Column::new("id", LogicalType::integer()),
                Column::new("name", LogicalType::varchar(32)),
            ],
            indexes: vec![],
            constraints: vec![],
            partition: None,
            is_timescale: false,
            retention: None,
            comment: None,
        };
        assert!(info.column_by_name("NAME").is_some());
        assert!(info.column_by_name("age").is_none());
        assert!(info.auto_increment_column().is_none());
    }
}
