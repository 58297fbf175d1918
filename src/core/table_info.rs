use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::core::column::Column;
use crate::core::constraints::Constraint;
use crate::core::data_type::TypeId;
use crate::core::error::EngineError;
use crate::core::index::Index;
use crate::core::value::micros_of;

/// Partition-name suffix lengths: `YYYYMMDD` for day interval,
/// `YYYYMMDDHH` for hour interval.
pub const PART_SUFFIX_DAY_LEN: usize = 8;
pub const PART_SUFFIX_HOUR_LEN: usize = 10;
/// Kernel-side buffer for partition names, bounds the accepted length.
pub const PART_NAME_BUFFER_SIZE: usize = 64;

pub const MICROS_PER_HOUR: i64 = 3_600 * 1_000_000;
pub const MICROS_PER_DAY: i64 = 24 * MICROS_PER_HOUR;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum PartType {
    Range,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum SpaceKind {
    Users,
    System,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PartitionInfo {
    pub name: String,
    /// Kernel partition number, used to address cursors.
    pub part_no: u32,
    /// Exclusive high bound in epoch microseconds.
    pub hibound_us: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PartitionDesc {
    pub part_type: PartType,
    pub key_slot: u16,
    pub key_type: TypeId,
    /// `1d` or `1h`.
    pub interval: String,
    pub auto_addpart: bool,
    pub is_crosspart: bool,
    pub partitions: Vec<PartitionInfo>,
}

impl PartitionDesc {
    #[must_use]
    pub fn interval_is_hour(&self) -> bool {
        self.interval.eq_ignore_ascii_case("1h")
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TableInfo {
    /// Owning user / schema name.
    pub user: String,
    pub user_id: u32,
    pub name: String,
    pub space: SpaceKind,
    pub columns: Vec<Column>,
    pub indexes: Vec<Index>,
    pub constraints: Vec<Constraint>,
    pub partition: Option<PartitionDesc>,
    pub is_timescale: bool,
    pub retention: Option<String>,
    pub comment: Option<String>,
}

impl TableInfo {
    #[must_use]
    pub fn column_by_name(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name.eq_ignore_ascii_case(name))
    }

    #[must_use]
    pub fn auto_increment_column(&self) -> Option<&Column> {
        self.columns.iter().find(|c| c.is_auto_increment)
    }

    #[must_use]
    pub fn is_parted(&self) -> bool {
        self.partition.is_some()
    }

    #[must_use]
    pub fn partition_by_name(&self, part_name: &str) -> Option<&PartitionInfo> {
        self.partition
            .as_ref()?
            .partitions
            .iter()
            .find(|p| p.name.eq_ignore_ascii_case(part_name))
    }
}

/// Parses a partition-name time suffix. Suffix length selects the format:
/// 8 digits parse as a date, 10 digits as date plus hour.
pub fn parse_partition_suffix(suffix: &str) -> Result<NaiveDateTime, EngineError> {
    let bad = || {
        EngineError::Binder(format!(
            "invalid partition time suffix '{suffix}', expected YYYYMMDD or YYYYMMDDHH"
        ))
    };
    if !suffix.bytes().all(|b| b.is_ascii_digit()) {
        return Err(bad());
    }
    match suffix.len() {
        PART_SUFFIX_DAY_LEN => NaiveDate::parse_from_str(suffix, "%Y%m%d")
            .map(|d| d.and_hms_opt(0, 0, 0).unwrap_or_default())
            .map_err(|_| bad()),
        PART_SUFFIX_HOUR_LEN => {
            NaiveDateTime::parse_from_str(suffix, "%Y%m%d%H").map_err(|_| bad())
        }
        _ => Err(bad()),
    }
}

/// Exclusive high bound of the partition named by `suffix`: the parsed
/// time plus one interval, in epoch microseconds.
pub fn partition_high_bound_us(suffix: &str) -> Result<i64, EngineError> {
    let start = micros_of(&parse_partition_suffix(suffix)?);
    let step = if suffix.len() == PART_SUFFIX_HOUR_LEN {
        MICROS_PER_HOUR
    } else {
        MICROS_PER_DAY
    };
    Ok(start + step)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn day_suffix_high_bound_is_next_midnight() {
        let hibound = partition_high_bound_us("20240601").unwrap();
        let next = micros_of(&parse_partition_suffix("20240602").unwrap());
        assert_eq!(hibound, next);
    }

    #[test]
    fn hour_suffix_high_bound_is_next_hour() {
        let hibound = partition_high_bound_us("2024060123").unwrap();
        let next = micros_of(&parse_partition_suffix("20240602").unwrap());
        assert_eq!(hibound, next);
    }

    #[test]
    fn non_digit_and_odd_length_suffixes_are_rejected() {
        assert!(parse_partition_suffix("2024-6-1").is_err());
        assert!(parse_partition_suffix("202406").is_err());
        assert!(parse_partition_suffix("20240601234").is_err());
    }

    #[test]
    fn partition_lookup_is_exact_not_substring() {
        let info = TableInfo {
            user: "sys".into(),
            user_id: 0,
            name: "metrics".into(),
            space: SpaceKind::Users,
            columns: Vec::new(),
            indexes: Vec::new(),
            constraints: Vec::new(),
            partition: Some(PartitionDesc {
                part_type: PartType::Range,
                key_slot: 0,
                key_type: TypeId::Timestamp,
                interval: "1d".into(),
                auto_addpart: false,
                is_crosspart: false,
                partitions: vec![PartitionInfo {
                    name: "metrics_20240601".into(),
                    part_no: 0,
                    hibound_us: partition_high_bound_us("20240601").unwrap(),
                }],
            }),
            is_timescale: true,
            retention: None,
            comment: None,
        };
        assert!(info.partition_by_name("metrics_20240601").is_some());
        assert!(info.partition_by_name("METRICS_20240601").is_some());
        assert!(info.partition_by_name("metrics_2024060").is_none());
        assert!(info.partition_by_name("20240601").is_none());
    }
}
