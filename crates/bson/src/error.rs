//! BSON error type.

use thiserror::Error;

use crate::types::BsonType;

/// Error type for BSON document and value cursor operations.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum BsonError {
    #[error("unexpected end of input")]
    UnexpectedEof,
    #[error("unsupported BSON element type: 0x{0:02x}")]
    UnsupportedType(u8),
    #[error("invalid UTF-8")]
    InvalidUtf8,
    #[error("invalid document length {0}")]
    InvalidLength(i32),
    #[error("cannot read {expected} from a value of type {actual}")]
    TypeMismatch { expected: BsonType, actual: BsonType },
    #[error("value cursor already consumed")]
    Exhausted,
    #[error("value cursor already written")]
    AlreadyWritten,
    #[error("no value was written")]
    NothingWritten,
}
