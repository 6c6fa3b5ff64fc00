//! Codec error type.

use std::num::ParseIntError;

use protobson_bson::{BsonError, BsonType};
use thiserror::Error;

use crate::text::{ParseBoolError, ParseDurationError, ParseNumberError};
use crate::value::{FieldValue, TypeKey};

/// Errors raised while encoding or decoding a value.
///
/// Every error is terminal for the encode/decode call that raised it.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum CodecError {
    /// The value handed to a codec is not the kind the codec handles.
    #[error("{name} can only encode valid {expected}, but got {received}")]
    ValueEncoder {
        name: &'static str,
        expected: TypeKey,
        received: String,
    },
    /// The decode target handed to a codec is not the kind the codec handles.
    #[error("{name} can only decode valid and settable {expected}, but got {received}")]
    ValueDecoder {
        name: &'static str,
        expected: TypeKey,
        received: String,
    },
    #[error("cannot decode {bson_type} into {target}")]
    UnsupportedSourceType { bson_type: BsonType, target: TypeKey },
    #[error(transparent)]
    ParseInt(#[from] ParseIntError),
    #[error(transparent)]
    ParseNumber(#[from] ParseNumberError),
    #[error(transparent)]
    ParseBool(#[from] ParseBoolError),
    #[error(transparent)]
    ParseDuration(#[from] ParseDurationError),
    #[error(transparent)]
    ParseTime(#[from] chrono::ParseError),
    #[error("unknown time zone {id:?}: {reason}")]
    UnknownTimeZone { id: String, reason: String },
    #[error("invalid date time: {0}")]
    InvalidDateTime(String),
    #[error("invalid timestamp: {0}")]
    InvalidTimestamp(String),
    #[error("{value} overflows {target}")]
    Overflow { value: String, target: &'static str },
    #[error("cannot truncate {value} to {target} unless truncation is enabled")]
    Truncation { value: f64, target: &'static str },
    #[error("no encoder found for {0}")]
    NoEncoder(TypeKey),
    #[error("no decoder found for {0}")]
    NoDecoder(TypeKey),
    #[error("duplicated key {key} in {message}")]
    DuplicateKey { key: String, message: &'static str },
    #[error("inline field {field} of {message} must be a message")]
    InvalidInline {
        field: &'static str,
        message: &'static str,
    },
    #[error("field {field} of {message} rejected a {received} value")]
    FieldMismatch {
        field: &'static str,
        message: &'static str,
        received: TypeKey,
    },
    #[error("error decoding key {}: {source}", keys.join("."))]
    Decode {
        keys: Vec<String>,
        source: Box<CodecError>,
    },
    #[error(transparent)]
    Stream(#[from] BsonError),
}

impl CodecError {
    pub(crate) fn encoder(name: &'static str, expected: TypeKey, received: &FieldValue) -> Self {
        CodecError::ValueEncoder {
            name,
            expected,
            received: received.describe(),
        }
    }

    pub(crate) fn decoder(name: &'static str, expected: TypeKey, received: &FieldValue) -> Self {
        CodecError::ValueDecoder {
            name,
            expected,
            received: received.describe(),
        }
    }

    pub(crate) fn unsupported(bson_type: BsonType, target: TypeKey) -> Self {
        CodecError::UnsupportedSourceType { bson_type, target }
    }

    /// Prefixes the key path of a structural decode failure.
    pub(crate) fn in_key(self, key: &str) -> Self {
        match self {
            CodecError::Decode { mut keys, source } => {
                keys.insert(0, key.to_owned());
                CodecError::Decode { keys, source }
            }
            other => CodecError::Decode {
                keys: vec![key.to_owned()],
                source: Box::new(other),
            },
        }
    }

    /// The innermost error, unwrapping structural key annotations.
    pub fn root_cause(&self) -> &CodecError {
        match self {
            CodecError::Decode { source, .. } => source.root_cause(),
            other => other,
        }
    }
}

pub type Result<T> = std::result::Result<T, CodecError>;
