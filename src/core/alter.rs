use serde::{Deserialize, Serialize};

use crate::core::column::Column;
use crate::core::constraints::ConstraintType;

/// Exactly one alteration per statement; the variant is the payload.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub enum AlterTableInfo {
    AddColumn {
        column: Column,
    },
    DropColumn {
        column: String,
    },
    ModifyColumn {
        column: Column,
    },
    RenameColumn {
        old_name: String,
        new_name: String,
    },
    RenameTable {
        new_name: String,
    },
    AddPartition {
        part_name: String,
        /// Exclusive high bound in epoch microseconds.
        hibound_us: i64,
    },
    DropPartition {
        part_name: String,
    },
    AddConstraint {
        name: Option<String>,
        ctype: ConstraintType,
        columns: Vec<String>,
    },
    SetComment {
        comment: String,
    },
}
