use bytes::{BufMut, Bytes, BytesMut};

use crate::core::column::Column;
use crate::core::error::EngineError;
use crate::core::value::Value;

/// Length sentinel marking a NULL item.
const NULL_LEN: u32 = u32::MAX;

/// One fetched row, packed as length-prefixed items in column order.
/// Each item is `[u32 len][payload]`; NULL is the sentinel length with
/// no payload. An offset index gives O(1) field access.
#[derive(Debug, Default, Clone)]
pub struct RowBuffer {
    data: BytesMut,
    // (payload offset, payload len); NULL_LEN marks null
    index: Vec<(usize, u32)>,
}

impl RowBuffer {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Packs kernel fetch output; `None` cells become NULL items.
    #[must_use]
    pub fn pack(cells: &[Option<Value>]) -> Self {
        let mut buf = Self::new();
        for cell in cells {
            buf.push(cell.as_ref());
        }
        buf
    }

    pub fn push(&mut self, value: Option<&Value>) {
        match value {
            None => {
                self.data.put_u32_le(NULL_LEN);
                self.index.push((self.data.len(), NULL_LEN));
            }
            Some(Value::Null) => {
                self.data.put_u32_le(NULL_LEN);
                self.index.push((self.data.len(), NULL_LEN));
            }
            Some(v) => {
                let len_pos = self.data.len();
                self.data.put_u32_le(0);
                let start = self.data.len();
                v.encode(&mut self.data);
                let len = (self.data.len() - start) as u32;
                self.data[len_pos..start].copy_from_slice(&len.to_le_bytes());
                self.index.push((start, len));
            }
        }
    }

    #[must_use]
    pub fn column_count(&self) -> usize {
        self.index.len()
    }

    #[must_use]
    pub fn is_null(&self, i: usize) -> bool {
        self.index.get(i).is_none_or(|(_, len)| *len == NULL_LEN)
    }

    /// Decodes field `i` with the type of `column`.
    pub fn field(&self, i: usize, column: &Column) -> Result<Value, EngineError> {
        let (offset, len) = self.index.get(i).ok_or_else(|| {
            EngineError::Executor(format!("row has {} fields, asked for {i}", self.index.len()))
        })?;
        if *len == NULL_LEN {
            return Ok(Value::Null);
        }
        let payload = Bytes::copy_from_slice(&self.data[*offset..*offset + *len as usize]);
        Value::decode(payload, &column.logical_type)
    }

    /// Decodes the whole row against the table's column list.
    pub fn decode_row(&self, columns: &[Column]) -> Result<Vec<Value>, EngineError> {
        columns
            .iter()
            .enumerate()
            .map(|(i, c)| self.field(i, c))
            .collect()
    }

    /// Raw wire image of the row.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::data_type::LogicalType;

    #[test]
    fn pack_and_decode_round_trip() {
        let columns = vec![
            Column::new("id", LogicalType::integer()),
            Column::new("name", LogicalType::varchar(32)),
            Column::new("score", LogicalType::new(crate::core::data_type::TypeId::Double, 8)),
        ];
        let buf = RowBuffer::pack(&[
            Some(Value::Int(7)),
            None,
            Some(Value::Real(0.5)),
        ]);
        assert_eq!(buf.column_count(), 3);
        assert!(buf.is_null(1));
        let row = buf.decode_row(&columns).unwrap();
        assert_eq!(row, vec![Value::Int(7), Value::Null, Value::Real(0.5)]);
    }

    #[test]
    fn items_are_length_prefixed() {
        let buf = RowBuffer::pack(&[Some(Value::Int(1))]);
        // u32 length prefix then 8 payload bytes
        assert_eq!(buf.as_bytes().len(), 4 + 8);
        assert_eq!(&buf.as_bytes()[..4], &8u32.to_le_bytes());
    }
}
