use bytes::{Buf, BufMut, Bytes, BytesMut};
use chrono::{NaiveDate, NaiveDateTime};
use rust_decimal::Decimal;
use rust_decimal::prelude::{FromPrimitive, ToPrimitive};
use serde::{Deserialize, Serialize};

use crate::core::data_type::{LogicalType, TypeId};
use crate::core::error::EngineError;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub enum Value {
    Null,
    // All integer widths travel as i64; the target type bounds them on cast.
    Int(i64),
    Real(f64),
    Decimal(Decimal),
    Text(String),
    Boolean(bool),
    Date(NaiveDate),
    Timestamp(NaiveDateTime),
    Bytes(Vec<u8>),
}

impl Value {
    #[must_use]
    pub const fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    #[must_use]
    pub const fn as_int(&self) -> Option<i64> {
        match self {
            Self::Int(i) => Some(*i),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            _ => None,
        }
    }

    #[must_use]
    pub const fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Boolean(b) => Some(*b),
            _ => None,
        }
    }

    /// The natural type of a literal, before any column context is known.
    #[must_use]
    pub const fn type_id(&self) -> TypeId {
        match self {
            Self::Null => TypeId::Unknown,
            Self::Int(_) => TypeId::BigInt,
            Self::Real(_) => TypeId::Double,
            Self::Decimal(_) => TypeId::Decimal,
            Self::Text(_) => TypeId::Varchar,
            Self::Boolean(_) => TypeId::Boolean,
            Self::Date(_) => TypeId::Date,
            Self::Timestamp(_) => TypeId::Timestamp,
            Self::Bytes(_) => TypeId::Blob,
        }
    }

    /// Casts the value to a column type, range- and length-checking on the way.
    /// NULL casts to NULL of any type.
    pub fn try_cast(&self, target: &LogicalType) -> Result<Self, EngineError> {
        if self.is_null() {
            return Ok(Self::Null);
        }
        match target.id {
            TypeId::TinyInt => self.cast_int_range(i64::from(i8::MIN), i64::from(i8::MAX)),
            TypeId::SmallInt => self.cast_int_range(i64::from(i16::MIN), i64::from(i16::MAX)),
            TypeId::Integer => self.cast_int_range(i64::from(i32::MIN), i64::from(i32::MAX)),
            TypeId::BigInt => self.cast_int_range(i64::MIN, i64::MAX),
            TypeId::Real | TypeId::Double => self.cast_real(),
            TypeId::Decimal => self.cast_decimal(target),
            TypeId::Varchar | TypeId::Char => self.cast_string(target),
            TypeId::Boolean => self.cast_bool(),
            TypeId::Timestamp => self.cast_timestamp(),
            TypeId::Date => self.cast_date(),
            TypeId::Blob | TypeId::Clob => match self {
                Self::Bytes(_) => Ok(self.clone()),
                Self::Text(s) => Ok(Self::Bytes(s.clone().into_bytes())),
                other => Err(cast_error(other, target.id)),
            },
            TypeId::Unknown => Ok(self.clone()),
        }
    }

    fn cast_int_range(&self, min: i64, max: i64) -> Result<Self, EngineError> {
        let v = match self {
            Self::Int(i) => *i,
            Self::Boolean(b) => i64::from(*b),
            Self::Real(r) => {
                if !r.is_finite() {
                    return Err(EngineError::OutOfRange(format!(
                        "cannot cast {r} to an integer type"
                    )));
                }
                r.round() as i64
            }
            Self::Decimal(d) => d.round().to_i64().ok_or_else(|| {
                EngineError::OutOfRange(format!("decimal {d} out of integer range"))
            })?,
            Self::Text(s) => s.trim().parse::<i64>().map_err(|_| {
                EngineError::Binder(format!("invalid integer literal: '{s}'"))
            })?,
            other => return Err(cast_error(other, TypeId::BigInt)),
        };
        if v < min || v > max {
            return Err(EngineError::OutOfRange(format!(
                "value {v} out of range [{min}, {max}]"
            )));
        }
        Ok(Self::Int(v))
    }

    fn cast_real(&self) -> Result<Self, EngineError> {
        let v = match self {
            Self::Int(i) => *i as f64,
            Self::Real(r) => *r,
            Self::Decimal(d) => d.to_f64().ok_or_else(|| {
                EngineError::OutOfRange(format!("decimal {d} not representable as double"))
            })?,
            Self::Text(s) => s.trim().parse::<f64>().map_err(|_| {
                EngineError::Binder(format!("invalid float literal: '{s}'"))
            })?,
            other => return Err(cast_error(other, TypeId::Double)),
        };
        Ok(Self::Real(v))
    }

    fn cast_decimal(&self, target: &LogicalType) -> Result<Self, EngineError> {
        let d = match self {
            Self::Int(i) => Decimal::from(*i),
            Self::Real(r) => Decimal::from_f64(*r).ok_or_else(|| {
                EngineError::OutOfRange(format!("double {r} not representable as decimal"))
            })?,
            Self::Decimal(d) => *d,
            Self::Text(s) => s.trim().parse::<Decimal>().map_err(|_| {
                EngineError::Binder(format!("invalid decimal literal: '{s}'"))
            })?,
            other => return Err(cast_error(other, TypeId::Decimal)),
        };
        let d = if target.scale > 0 || target.precision > 0 {
            d.round_dp(u32::from(target.scale))
        } else {
            d
        };
        Ok(Self::Decimal(d))
    }

    fn cast_string(&self, target: &LogicalType) -> Result<Self, EngineError> {
        let s = match self {
            Self::Text(s) => s.clone(),
            other => other.to_string(),
        };
        if target.width > 0 && s.chars().count() as u32 > target.width {
            return Err(EngineError::OutOfRange(format!(
                "string of length {} exceeds column width {}",
                s.chars().count(),
                target.width
            )));
        }
        Ok(Self::Text(s))
    }

    fn cast_bool(&self) -> Result<Self, EngineError> {
        match self {
            Self::Boolean(b) => Ok(Self::Boolean(*b)),
            Self::Int(i) => Ok(Self::Boolean(*i != 0)),
            Self::Text(s) => match s.to_ascii_lowercase().as_str() {
                "true" | "t" | "on" | "1" => Ok(Self::Boolean(true)),
                "false" | "f" | "off" | "0" => Ok(Self::Boolean(false)),
                _ => Err(EngineError::Binder(format!(
                    "invalid boolean literal: '{s}'"
                ))),
            },
            other => Err(cast_error(other, TypeId::Boolean)),
        }
    }

    fn cast_timestamp(&self) -> Result<Self, EngineError> {
        match self {
            Self::Timestamp(t) => Ok(Self::Timestamp(*t)),
            Self::Date(d) => Ok(Self::Timestamp(d.and_hms_opt(0, 0, 0).unwrap_or_default())),
            Self::Text(s) => parse_timestamp(s.trim()).map(Self::Timestamp),
            other => Err(cast_error(other, TypeId::Timestamp)),
        }
    }

    fn cast_date(&self) -> Result<Self, EngineError> {
        match self {
            Self::Date(d) => Ok(Self::Date(*d)),
            Self::Timestamp(t) => Ok(Self::Date(t.date())),
            Self::Text(s) => NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d")
                .map(Self::Date)
                .map_err(|_| EngineError::Binder(format!("invalid date literal: '{s}'"))),
            other => Err(cast_error(other, TypeId::Date)),
        }
    }

    /// Encodes the value into a wire item for the row buffer.
    pub fn encode(&self, buf: &mut BytesMut) {
        match self {
            Self::Null => {}
            Self::Int(i) => buf.put_i64_le(*i),
            Self::Real(r) => buf.put_f64_le(*r),
            Self::Decimal(d) => buf.put_slice(d.to_string().as_bytes()),
            Self::Text(s) => buf.put_slice(s.as_bytes()),
            Self::Boolean(b) => buf.put_u8(u8::from(*b)),
            Self::Date(d) => buf.put_i64_le(micros_of(
                &d.and_hms_opt(0, 0, 0).unwrap_or_default(),
            )),
            Self::Timestamp(t) => buf.put_i64_le(micros_of(t)),
            Self::Bytes(b) => buf.put_slice(b),
        }
    }

    /// Decodes a wire item produced by [`Value::encode`].
    pub fn decode(mut data: Bytes, ty: &LogicalType) -> Result<Self, EngineError> {
        let short = || {
            EngineError::Executor(format!(
                "row item too short for type {:?}",
                ty.id
            ))
        };
        match ty.id {
            TypeId::TinyInt | TypeId::SmallInt | TypeId::Integer | TypeId::BigInt => {
                if data.len() < 8 {
                    return Err(short());
                }
                Ok(Self::Int(data.get_i64_le()))
            }
            TypeId::Real | TypeId::Double => {
                if data.len() < 8 {
                    return Err(short());
                }
                Ok(Self::Real(data.get_f64_le()))
            }
            TypeId::Decimal => {
                let s = String::from_utf8(data.to_vec())
                    .map_err(|_| EngineError::Executor("bad decimal row item".into()))?;
                s.parse::<Decimal>()
                    .map(Self::Decimal)
                    .map_err(|_| EngineError::Executor("bad decimal row item".into()))
            }
            TypeId::Varchar | TypeId::Char => String::from_utf8(data.to_vec())
                .map(Self::Text)
                .map_err(|_| EngineError::Executor("row item is not valid utf-8".into())),
            TypeId::Boolean => {
                if data.is_empty() {
                    return Err(short());
                }
                Ok(Self::Boolean(data.get_u8() != 0))
            }
            TypeId::Timestamp => {
                if data.len() < 8 {
                    return Err(short());
                }
                Ok(Self::Timestamp(timestamp_of_micros(data.get_i64_le())))
            }
            TypeId::Date => {
                if data.len() < 8 {
                    return Err(short());
                }
                Ok(Self::Date(timestamp_of_micros(data.get_i64_le()).date()))
            }
            TypeId::Blob | TypeId::Clob => Ok(Self::Bytes(data.to_vec())),
            TypeId::Unknown => Ok(Self::Bytes(data.to_vec())),
        }
    }
}

fn cast_error(value: &Value, target: TypeId) -> EngineError {
    EngineError::Binder(format!(
        "cannot cast {:?} value to {target:?}",
        value.type_id()
    ))
}

/// Accepts timestamps with or without a time part, fractional seconds optional.
pub fn parse_timestamp(s: &str) -> Result<NaiveDateTime, EngineError> {
    for fmt in ["%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S%.f"] {
        if let Ok(t) = NaiveDateTime::parse_from_str(s, fmt) {
            return Ok(t);
        }
    }
    if let Ok(d) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        return Ok(d.and_hms_opt(0, 0, 0).unwrap_or_default());
    }
    Err(EngineError::Binder(format!(
        "invalid timestamp literal: '{s}'"
    )))
}

#[must_use]
pub fn micros_of(t: &NaiveDateTime) -> i64 {
    t.and_utc().timestamp_micros()
}

#[must_use]
pub fn timestamp_of_micros(us: i64) -> NaiveDateTime {
    chrono::DateTime::from_timestamp_micros(us)
        .map(|t| t.naive_utc())
        .unwrap_or_default()
}

impl std::fmt::Display for Value {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Null => write!(f, "NULL"),
            Self::Int(i) => write!(f, "{i}"),
            Self::Real(r) => write!(f, "{r}"),
            Self::Decimal(d) => write!(f, "{d}"),
            Self::Text(s) => write!(f, "{s}"),
            Self::Boolean(b) => write!(f, "{b}"),
            Self::Date(d) => write!(f, "{}", d.format("%Y-%m-%d")),
            Self::Timestamp(t) => write!(f, "{}", t.format("%Y-%m-%d %H:%M:%S")),
            Self::Bytes(b) => write!(f, "<{} bytes>", b.len()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::data_type::LogicalType;

    #[test]
    fn null_casts_to_anything() {
        assert_eq!(
            Value::Null.try_cast(&LogicalType::integer()).unwrap(),
            Value::Null
        );
        assert_eq!(
            Value::Null.try_cast(&LogicalType::varchar(10)).unwrap(),
            Value::Null
        );
    }

    #[test]
    fn tinyint_range_is_enforced() {
        let ty = LogicalType::new(TypeId::TinyInt, 1);
        assert_eq!(Value::Int(127).try_cast(&ty).unwrap(), Value::Int(127));
        assert!(Value::Int(128).try_cast(&ty).is_err());
        assert!(Value::Int(-129).try_cast(&ty).is_err());
    }

    #[test]
    fn string_width_is_enforced() {
        let ty = LogicalType::varchar(5);
        assert!(Value::Text("hello".into()).try_cast(&ty).is_ok());
        assert!(Value::Text("hello!".into()).try_cast(&ty).is_err());
    }

    #[test]
    fn text_parses_to_timestamp_and_date() {
        let ts = Value::Text("2024-06-01 12:30:00".into())
            .try_cast(&LogicalType::timestamp())
            .unwrap();
        assert!(matches!(ts, Value::Timestamp(_)));
        let bare_date = Value::Text("2024-06-01".into())
            .try_cast(&LogicalType::timestamp())
            .unwrap();
        match bare_date {
            Value::Timestamp(t) => assert_eq!(t.format("%H%M%S").to_string(), "000000"),
            other => panic!("expected timestamp, got {other:?}"),
        }
    }

    #[test]
    fn decimal_cast_rounds_to_scale() {
        let ty = LogicalType::decimal(10, 2);
        let v = Value::Text("3.14159".into()).try_cast(&ty).unwrap();
        assert_eq!(v, Value::Decimal("3.14".parse().unwrap()));
    }

    #[test]
    fn encode_decode_round_trip_for_timestamp() {
        let t = parse_timestamp("2024-06-01 08:00:00").unwrap();
        let mut buf = BytesMut::new();
        Value::Timestamp(t).encode(&mut buf);
        let back = Value::decode(buf.freeze(), &LogicalType::timestamp()).unwrap();
        assert_eq!(back, Value::Timestamp(t));
    }
}
