use serde::{Deserialize, Serialize};

use crate::core::column::Column;
use crate::core::data_type::LogicalType;

/// One output column of a statement result.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SchemaColumn {
    pub name: String,
    pub logical_type: LogicalType,
    pub slot: u16,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Schema {
    pub columns: Vec<SchemaColumn>,
}

impl Schema {
    #[must_use]
    pub fn from_columns(columns: &[Column]) -> Self {
        Self {
            columns: columns
                .iter()
                .map(|c| SchemaColumn {
                    name: c.name.clone(),
                    logical_type: c.logical_type,
                    slot: c.slot,
                })
                .collect(),
        }
    }

    #[must_use]
    pub fn slot_of(&self, name: &str) -> Option<u16> {
        self.columns
            .iter()
            .find(|c| c.name.eq_ignore_ascii_case(name))
            .map(|c| c.slot)
    }
}
