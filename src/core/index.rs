use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Index {
    pub name: String,
    pub table: String,
    pub columns: Vec<String>,
    /// Kernel-assigned position among the table's indexes.
    pub slot: u32,
    pub is_unique: bool,
    pub is_primary: bool,
    /// Local index on a partitioned table.
    pub parted: bool,
}

impl Index {
    #[must_use]
    pub fn new(name: impl Into<String>, table: impl Into<String>, columns: Vec<String>) -> Self {
        Self {
            name: name.into(),
            table: table.into(),
            columns,
            slot: 0,
            is_unique: false,
            is_primary: false,
            parted: false,
        }
    }
}
