//! BSON (Binary JSON) document layer used by the protobson codecs.
//!
//! Provides the element value model, a byte-level document encoder and
//! decoder, and the `ValueReader` / `ValueWriter` cursor traits through which
//! every codec reads or writes exactly one BSON value.

pub mod decoder;
pub mod encoder;
pub mod error;
pub mod reader;
pub mod types;
pub mod values;
pub mod writer;

pub use decoder::BsonDecoder;
pub use encoder::BsonEncoder;
pub use error::BsonError;
pub use reader::{BsonValueReader, ValueReader};
pub use types::BsonType;
pub use values::{
    BsonBinary, BsonDbPointer, BsonDecimal128, BsonJavascriptCodeWithScope, BsonObjectId,
    BsonTimestamp, BsonValue, Document, BINARY_SUBTYPE_GENERIC,
};
pub use writer::{BsonValueWriter, ValueWriter};

/// Encodes a document to its BSON byte representation.
pub fn to_vec(document: &Document) -> Vec<u8> {
    BsonEncoder::new().encode(document)
}

/// Decodes a BSON byte buffer into a document.
pub fn from_slice(data: &[u8]) -> Result<Document, BsonError> {
    BsonDecoder::new(data).decode()
}
