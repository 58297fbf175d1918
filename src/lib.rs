// EmberDB - embedded partitioned relational engine in Rust
// Binder, catalog and execution layers over a pluggable storage kernel

// Clippy configuration - allow non-critical warnings
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::cast_sign_loss)]
#![allow(clippy::cast_possible_wrap)]
#![allow(clippy::too_many_lines)]
#![allow(clippy::match_same_arms)]
#![allow(clippy::option_if_let_else)]
#![allow(clippy::cognitive_complexity)]
#![allow(clippy::significant_drop_tightening)]
#![allow(clippy::module_name_repetitions)]

// Core types: values, columns, table metadata, errors
pub mod core;

// Parsed statement shapes handed to the binder
pub mod ast;

// Semantic analysis: names, types, defaults, privileges
pub mod binder;

// Schema operations over the storage kernel, with dictionary-cache locking
pub mod catalog;

// Partition- and index-aware row access
pub mod datasource;

// Physical execution of bound statements
pub mod executor;

// Storage kernel trait and the in-memory reference kernel
pub mod kernel;

// Re-export commonly used types for convenience
pub use crate::core::column::Column;
pub use crate::core::data_type::{LogicalType, TypeId};
pub use crate::core::error::EngineError;
pub use crate::core::table_info::TableInfo;
pub use crate::core::value::Value;
pub use binder::Binder;
pub use catalog::Catalog;
pub use datasource::TableDataSource;
pub use executor::{QueryExecutor, RecordBatch, SessionVars};
pub use kernel::{MemoryKernel, StorageKernel};
