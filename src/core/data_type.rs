use serde::{Deserialize, Serialize};

use crate::core::error::EngineError;

/// Hard upper bound on identifier length (tables, columns, indexes, partitions).
pub const MAX_NAME_LEN: usize = 64;
/// Width a bare `VARCHAR` gets, and the ceiling for an explicit one.
pub const VARCHAR_SIZE_DEFAULT: u32 = 65535;
pub const DECIMAL_PRECISION_DEFAULT: u8 = 18;
pub const DECIMAL_SCALE_DEFAULT: u8 = 4;
pub const DECIMAL_PRECISION_MIN: u8 = 1;
pub const DECIMAL_PRECISION_MAX: u8 = 38;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum TypeId {
    TinyInt,
    SmallInt,
    Integer,
    BigInt,
    Real,
    Double,
    Decimal,
    Varchar,
    Char,
    Boolean,
    Timestamp,
    Date,
    Blob,
    Clob,
    Unknown,
}

impl TypeId {
    #[must_use]
    pub const fn is_integer(self) -> bool {
        matches!(
            self,
            Self::TinyInt | Self::SmallInt | Self::Integer | Self::BigInt
        )
    }

    #[must_use]
    pub const fn is_lob(self) -> bool {
        matches!(self, Self::Blob | Self::Clob)
    }
}

/// Fully resolved column type: a `TypeId` plus storage width and, for
/// decimals, precision and scale.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct LogicalType {
    pub id: TypeId,
    pub width: u32,
    pub precision: u8,
    pub scale: u8,
}

impl LogicalType {
    #[must_use]
    pub const fn new(id: TypeId, width: u32) -> Self {
        Self {
            id,
            width,
            precision: 0,
            scale: 0,
        }
    }

    #[must_use]
    pub const fn decimal(precision: u8, scale: u8) -> Self {
        Self {
            id: TypeId::Decimal,
            width: 8,
            precision,
            scale,
        }
    }

    #[must_use]
    pub const fn varchar(width: u32) -> Self {
        Self::new(TypeId::Varchar, width)
    }

    #[must_use]
    pub const fn integer() -> Self {
        Self::new(TypeId::Integer, 4)
    }

    #[must_use]
    pub const fn bigint() -> Self {
        Self::new(TypeId::BigInt, 8)
    }

    #[must_use]
    pub const fn timestamp() -> Self {
        Self::new(TypeId::Timestamp, 8)
    }

    #[must_use]
    pub const fn boolean() -> Self {
        Self::new(TypeId::Boolean, 1)
    }

    #[must_use]
    pub const fn unknown() -> Self {
        Self::new(TypeId::Unknown, 0)
    }
}

impl std::fmt::Display for LogicalType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.id {
            TypeId::TinyInt => write!(f, "TINYINT"),
            TypeId::SmallInt => write!(f, "SMALLINT"),
            TypeId::Integer => write!(f, "INTEGER"),
            TypeId::BigInt => write!(f, "BIGINT"),
            TypeId::Real => write!(f, "REAL"),
            TypeId::Double => write!(f, "DOUBLE"),
            TypeId::Decimal => write!(f, "DECIMAL({},{})", self.precision, self.scale),
            TypeId::Varchar => write!(f, "VARCHAR({})", self.width),
            TypeId::Char => write!(f, "CHAR({})", self.width),
            TypeId::Boolean => write!(f, "BOOLEAN"),
            TypeId::Timestamp => write!(f, "TIMESTAMP"),
            TypeId::Date => write!(f, "DATE"),
            TypeId::Blob => write!(f, "BLOB"),
            TypeId::Clob => write!(f, "CLOB"),
            TypeId::Unknown => write!(f, "UNKNOWN"),
        }
    }
}

/// Every SQL type name the engine accepts, with its canonical `TypeId`
/// and default storage width. Aliases share an entry per row.
pub const TYPE_NAME_TABLE: &[(&str, TypeId, u32)] = &[
    ("tinyint", TypeId::TinyInt, 1),
    ("int1", TypeId::TinyInt, 1),
    ("smallint", TypeId::SmallInt, 2),
    ("int2", TypeId::SmallInt, 2),
    ("int", TypeId::Integer, 4),
    ("int4", TypeId::Integer, 4),
    ("integer", TypeId::Integer, 4),
    ("bigint", TypeId::BigInt, 8),
    ("int8", TypeId::BigInt, 8),
    ("real", TypeId::Real, 4),
    ("float4", TypeId::Real, 4),
    ("float", TypeId::Double, 8),
    ("float8", TypeId::Double, 8),
    ("double", TypeId::Double, 8),
    ("decimal", TypeId::Decimal, 8),
    ("numeric", TypeId::Decimal, 8),
    ("number", TypeId::Decimal, 8),
    ("varchar", TypeId::Varchar, VARCHAR_SIZE_DEFAULT),
    ("string", TypeId::Varchar, VARCHAR_SIZE_DEFAULT),
    ("text", TypeId::Varchar, VARCHAR_SIZE_DEFAULT),
    ("char", TypeId::Char, VARCHAR_SIZE_DEFAULT),
    ("bpchar", TypeId::Char, VARCHAR_SIZE_DEFAULT),
    ("bool", TypeId::Boolean, 1),
    ("boolean", TypeId::Boolean, 1),
    ("timestamp", TypeId::Timestamp, 8),
    ("datetime", TypeId::Timestamp, 8),
    ("date", TypeId::Date, 8),
    ("blob", TypeId::Blob, 8),
    ("clob", TypeId::Clob, 8),
];

/// Looks a SQL type name up in the closed name table.
pub fn lookup_type_name(name: &str) -> Result<(TypeId, u32), EngineError> {
    let lowered = name.to_ascii_lowercase();
    TYPE_NAME_TABLE
        .iter()
        .find(|(n, _, _)| *n == lowered)
        .map(|(_, id, width)| (*id, *width))
        .ok_or_else(|| EngineError::Binder(format!("unknown type name: {name}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn type_name_table_resolves_aliases() {
        for (alias, expected) in [
            ("int", TypeId::Integer),
            ("int4", TypeId::Integer),
            ("INTEGER", TypeId::Integer),
            ("numeric", TypeId::Decimal),
            ("number", TypeId::Decimal),
            ("string", TypeId::Varchar),
            ("bool", TypeId::Boolean),
            ("datetime", TypeId::Timestamp),
        ] {
            let (id, _) = lookup_type_name(alias).unwrap();
            assert_eq!(id, expected, "alias {alias}");
        }
    }

    #[test]
    fn unknown_type_name_is_rejected() {
        assert!(lookup_type_name("point").is_err());
    }

    #[test]
    fn bare_varchar_gets_default_width() {
        let (id, width) = lookup_type_name("varchar").unwrap();
        assert_eq!(id, TypeId::Varchar);
        assert_eq!(width, VARCHAR_SIZE_DEFAULT);
    }

    #[test]
    fn integer_predicate_covers_all_widths() {
        assert!(TypeId::TinyInt.is_integer());
        assert!(TypeId::BigInt.is_integer());
        assert!(!TypeId::Decimal.is_integer());
        assert!(!TypeId::Varchar.is_integer());
    }
}
