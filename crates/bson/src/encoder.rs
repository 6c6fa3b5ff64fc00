//! BSON document encoder.
//!
//! BSON is a little-endian binary format. All multi-byte integers are
//! written in little-endian byte order.

use crate::values::{BsonObjectId, BsonValue, Document};

/// Encodes a BSON document (an ordered list of key/value elements) to bytes.
///
/// The top level must always be a document; BSON has no scalar top-level
/// encoding.
#[derive(Debug, Default)]
pub struct BsonEncoder {
    buf: Vec<u8>,
}

impl BsonEncoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Encodes a BSON document to bytes.
    pub fn encode(&mut self, document: &Document) -> Vec<u8> {
        self.buf.clear();
        self.write_document(document);
        std::mem::take(&mut self.buf)
    }

    fn write_document(&mut self, document: &Document) {
        let start = self.reserve_length();
        for (key, value) in document {
            self.write_element(key, value);
        }
        self.buf.push(0);
        self.patch_length(start);
    }

    fn write_array(&mut self, values: &[BsonValue]) {
        let start = self.reserve_length();
        for (i, value) in values.iter().enumerate() {
            self.write_element(&i.to_string(), value);
        }
        self.buf.push(0);
        self.patch_length(start);
    }

    fn reserve_length(&mut self) -> usize {
        let start = self.buf.len();
        self.buf.extend_from_slice(&[0u8; 4]);
        start
    }

    /// Back-fills an i32 length covering everything from `start` to the end.
    fn patch_length(&mut self, start: usize) {
        let len = (self.buf.len() - start) as i32;
        self.buf[start..start + 4].copy_from_slice(&len.to_le_bytes());
    }

    fn write_element(&mut self, key: &str, value: &BsonValue) {
        self.buf.push(value.bson_type().as_u8());
        self.write_cstring(key);
        match value {
            BsonValue::Double(f) => self.buf.extend_from_slice(&f.to_le_bytes()),
            BsonValue::String(s) | BsonValue::JavaScriptCode(s) | BsonValue::Symbol(s) => {
                self.write_string(s)
            }
            BsonValue::Document(fields) => self.write_document(fields),
            BsonValue::Array(values) => self.write_array(values),
            BsonValue::Binary(bin) => {
                self.buf
                    .extend_from_slice(&(bin.data.len() as i32).to_le_bytes());
                self.buf.push(bin.subtype);
                self.buf.extend_from_slice(&bin.data);
            }
            BsonValue::Undefined | BsonValue::Null | BsonValue::MinKey | BsonValue::MaxKey => {}
            BsonValue::ObjectId(id) => self.write_object_id(id),
            BsonValue::Boolean(b) => self.buf.push(u8::from(*b)),
            BsonValue::DateTime(ms) => self.buf.extend_from_slice(&ms.to_le_bytes()),
            BsonValue::Regex { pattern, options } => {
                self.write_cstring(pattern);
                self.write_cstring(options);
            }
            BsonValue::DbPointer(ptr) => {
                self.write_string(&ptr.name);
                self.write_object_id(&ptr.id);
            }
            BsonValue::JavaScriptCodeWithScope(cws) => {
                let start = self.reserve_length();
                self.write_string(&cws.code);
                self.write_document(&cws.scope);
                self.patch_length(start);
            }
            BsonValue::Int32(i) => self.buf.extend_from_slice(&i.to_le_bytes()),
            BsonValue::Timestamp(ts) => {
                self.buf.extend_from_slice(&ts.increment.to_le_bytes());
                self.buf.extend_from_slice(&ts.time.to_le_bytes());
            }
            BsonValue::Int64(i) => self.buf.extend_from_slice(&i.to_le_bytes()),
            BsonValue::Decimal128(dec) => self.buf.extend_from_slice(&dec.data),
        }
    }

    /// Writes a null-terminated C-string. Stops at any null byte in the input.
    fn write_cstring(&mut self, s: &str) {
        self.buf
            .extend(s.bytes().take_while(|&byte| byte != 0));
        self.buf.push(0);
    }

    /// Writes a BSON string: little-endian i32 (byte_count+1) + UTF-8 bytes + null byte.
    fn write_string(&mut self, s: &str) {
        let bytes = s.as_bytes();
        self.buf
            .extend_from_slice(&((bytes.len() as i32) + 1).to_le_bytes());
        self.buf.extend_from_slice(bytes);
        self.buf.push(0);
    }

    fn write_object_id(&mut self, id: &BsonObjectId) {
        // Timestamp: 4 bytes big-endian
        self.buf.extend_from_slice(&id.timestamp.to_be_bytes());
        // Process: 5 bytes (low 4 bytes LE + 1 high byte)
        self.buf
            .extend_from_slice(&(id.process as u32).to_le_bytes());
        self.buf.push((id.process >> 32) as u8);
        // Counter: 3 bytes big-endian
        self.buf.extend_from_slice(&id.counter.to_be_bytes()[1..]);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_document() {
        let bytes = BsonEncoder::new().encode(&Vec::new());
        assert_eq!(bytes, vec![5, 0, 0, 0, 0]);
    }

    #[test]
    fn int32_element() {
        let doc = vec![("a".to_string(), BsonValue::Int32(1))];
        let bytes = BsonEncoder::new().encode(&doc);
        assert_eq!(
            bytes,
            vec![12, 0, 0, 0, 0x10, b'a', 0, 1, 0, 0, 0, 0]
        );
    }

    #[test]
    fn timestamp_writes_increment_first() {
        let doc = vec![(
            "t".to_string(),
            BsonValue::Timestamp(crate::BsonTimestamp {
                time: 2,
                increment: 1,
            }),
        )];
        let bytes = BsonEncoder::new().encode(&doc);
        assert_eq!(&bytes[7..15], &[1, 0, 0, 0, 2, 0, 0, 0]);
    }
}
