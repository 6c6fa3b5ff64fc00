//! BSON value types.

use crate::types::BsonType;

/// An ordered list of key/value elements. BSON documents preserve insertion
/// order and may in principle repeat keys, so a vector is used rather than a map.
pub type Document = Vec<(String, BsonValue)>;

/// Binary subtype for generic binary data.
pub const BINARY_SUBTYPE_GENERIC: u8 = 0x00;

/// BSON ObjectId (12 bytes: 4-byte timestamp + 5-byte process ID + 3-byte counter).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BsonObjectId {
    pub timestamp: u32,
    pub process: u64,
    pub counter: u32,
}

/// BSON DBPointer (deprecated BSON type).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BsonDbPointer {
    pub name: String,
    pub id: BsonObjectId,
}

/// BSON JavaScript code with scope (deprecated).
#[derive(Debug, Clone, PartialEq)]
pub struct BsonJavascriptCodeWithScope {
    pub code: String,
    pub scope: Document,
}

/// BSON Timestamp: seconds since the epoch paired with an ordinal increment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BsonTimestamp {
    pub time: u32,
    pub increment: u32,
}

/// BSON Decimal128 (16-byte IEEE 754 decimal floating-point), kept opaque.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BsonDecimal128 {
    pub data: [u8; 16],
}

/// BSON Binary data (subtype + raw bytes).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BsonBinary {
    pub subtype: u8,
    pub data: Vec<u8>,
}

/// A BSON value that can appear as a document element.
#[derive(Debug, Clone, PartialEq)]
pub enum BsonValue {
    Double(f64),
    String(String),
    Document(Document),
    Array(Vec<BsonValue>),
    Binary(BsonBinary),
    Undefined,
    ObjectId(BsonObjectId),
    Boolean(bool),
    /// Milliseconds since the Unix epoch.
    DateTime(i64),
    Null,
    Regex { pattern: String, options: String },
    DbPointer(BsonDbPointer),
    JavaScriptCode(String),
    Symbol(String),
    JavaScriptCodeWithScope(BsonJavascriptCodeWithScope),
    Int32(i32),
    Timestamp(BsonTimestamp),
    Int64(i64),
    Decimal128(BsonDecimal128),
    MinKey,
    MaxKey,
}

impl BsonValue {
    /// The element type tag this value is written with.
    pub fn bson_type(&self) -> BsonType {
        match self {
            BsonValue::Double(_) => BsonType::Double,
            BsonValue::String(_) => BsonType::String,
            BsonValue::Document(_) => BsonType::EmbeddedDocument,
            BsonValue::Array(_) => BsonType::Array,
            BsonValue::Binary(_) => BsonType::Binary,
            BsonValue::Undefined => BsonType::Undefined,
            BsonValue::ObjectId(_) => BsonType::ObjectId,
            BsonValue::Boolean(_) => BsonType::Boolean,
            BsonValue::DateTime(_) => BsonType::DateTime,
            BsonValue::Null => BsonType::Null,
            BsonValue::Regex { .. } => BsonType::Regex,
            BsonValue::DbPointer(_) => BsonType::DbPointer,
            BsonValue::JavaScriptCode(_) => BsonType::JavaScript,
            BsonValue::Symbol(_) => BsonType::Symbol,
            BsonValue::JavaScriptCodeWithScope(_) => BsonType::CodeWithScope,
            BsonValue::Int32(_) => BsonType::Int32,
            BsonValue::Timestamp(_) => BsonType::Timestamp,
            BsonValue::Int64(_) => BsonType::Int64,
            BsonValue::Decimal128(_) => BsonType::Decimal128,
            BsonValue::MinKey => BsonType::MinKey,
            BsonValue::MaxKey => BsonType::MaxKey,
        }
    }

    /// Generic-subtype binary value.
    pub fn binary(data: impl Into<Vec<u8>>) -> Self {
        BsonValue::Binary(BsonBinary {
            subtype: BINARY_SUBTYPE_GENERIC,
            data: data.into(),
        })
    }
}
