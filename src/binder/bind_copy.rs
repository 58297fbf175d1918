// COPY binding: csv only, with FORMAT and DELIMITER options.

use crate::ast::CopyStmt;
use crate::binder::Binder;
use crate::binder::statement::CopyStatement;
use crate::core::error::EngineError;
use crate::core::value::Value;
use crate::kernel::{ObjectPrivilege, StorageKernel};

const STDIN_PATH: &str = "/dev/stdin";
const STDOUT_PATH: &str = "/dev/stdout";

impl<K: StorageKernel> Binder<'_, K> {
    pub(crate) fn bind_copy(&mut self, stmt: &CopyStmt) -> Result<CopyStatement, EngineError> {
        let table = self.bind_base_table(stmt.schema.as_deref(), &stmt.table)?;
        let privilege = if stmt.is_from {
            ObjectPrivilege::Insert
        } else {
            ObjectPrivilege::Select
        };
        if !self
            .catalog
            .verify_table_privilege(&table.info, &table.bound_name, privilege)?
        {
            return Err(EngineError::Permission(format!(
                "{}.{} copy permission denied",
                table.schema, table.bound_name
            )));
        }
        self.add_related_table(&table.info, stmt.is_from);

        let mut columns = Vec::with_capacity(stmt.columns.len());
        for name in &stmt.columns {
            let col = table.info.column_by_name(name).ok_or_else(|| {
                EngineError::Binder(format!(
                    "column {name} does not exist in table {}",
                    table.info.name
                ))
            })?;
            columns.push(col.name.clone());
        }

        // an explicit path wins; otherwise the standard streams
        let file_path = stmt.filename.clone().unwrap_or_else(|| {
            if stmt.is_from {
                STDIN_PATH.to_string()
            } else {
                STDOUT_PATH.to_string()
            }
        });
        let mut format = format_of_path(&file_path);
        let mut delimiter = ',';

        let mut seen: Vec<String> = Vec::new();
        for opt in &stmt.options {
            let name = opt.name.to_ascii_lowercase();
            if seen.contains(&name) {
                return Err(EngineError::Binder(format!("duplicate option: {name}")));
            }
            seen.push(name.clone());
            match name.as_str() {
                "format" => {
                    let Some(Value::Text(arg)) = &opt.arg else {
                        return Err(EngineError::Binder(
                            "FORMAT needs a string argument".into(),
                        ));
                    };
                    format = arg.to_ascii_lowercase();
                }
                "delimiter" => {
                    let Some(Value::Text(arg)) = &opt.arg else {
                        return Err(EngineError::Binder(
                            "DELIMITER needs a string argument".into(),
                        ));
                    };
                    let mut chars = arg.chars();
                    match (chars.next(), chars.next()) {
                        (Some(c), None) => delimiter = c,
                        _ => {
                            return Err(EngineError::Binder(
                                "DELIMITER must be a single character".into(),
                            ));
                        }
                    }
                }
                other => {
                    return Err(EngineError::Binder(format!("unsupported option: {other}")));
                }
            }
        }
        if format != "csv" {
            return Err(EngineError::NotImplemented(format!(
                "unsupported file format: {format}"
            )));
        }

        Ok(CopyStatement {
            table,
            columns,
            is_from: stmt.is_from,
            file_path,
            format,
            delimiter,
        })
    }
}

/// Extension-derived format; anything without a known extension is csv.
fn format_of_path(path: &str) -> String {
    std::path::Path::new(path)
        .extension()
        .and_then(|e| e.to_str())
        .map_or_else(|| "csv".to_string(), str::to_ascii_lowercase)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn format_falls_back_to_csv() {
        assert_eq!(format_of_path("/dev/stdin"), "csv");
        assert_eq!(format_of_path("data"), "csv");
        assert_eq!(format_of_path("data.CSV"), "csv");
        assert_eq!(format_of_path("data.json"), "json");
    }
}
