//! BSON codecs for protocol buffer messages.
//!
//! The crate converts between [`ProtoMessage`] values and BSON documents.
//! Well-known wrapper types keep the difference between an unset wrapper
//! (`null`) and a set zero value; `google.protobuf.Duration`,
//! `google.protobuf.Timestamp` and `google.type.DateTime` get dedicated
//! codecs; any other message is mapped field by field with keys derived from
//! its protobuf metadata.
//!
//! Every entry point takes the [`Registry`] to use explicitly:
//!
//! ```ignore
//! let registry = protobson::default_registry();
//! let doc = protobson::to_document(registry, &user)?;
//! let back: User = protobson::from_document(registry, doc)?;
//! ```

pub mod codec;
pub mod error;
pub mod googleapis;
pub mod options;
pub mod registry;
pub mod structs;
pub mod text;
pub mod value;

use protobson_bson::{BsonError, BsonType, BsonValue, BsonValueReader, BsonValueWriter, Document};

pub use codec::{
    BoolValueCodec, BytesValueCodec, DecodeContext, DoubleValueCodec, DurationCodec,
    EncodeContext, FloatValueCodec, Int32ValueCodec, Int64ValueCodec, MessageCodec,
    PrimitiveCodec, StringValueCodec, TimestampCodec, UInt32ValueCodec, UInt64ValueCodec,
    ValueCodec,
};
pub use error::{CodecError, Result};
pub use googleapis::{DateTime, DateTimeCodec, TimeOffset, TimeZone};
pub use options::{
    MessageCodecOptions, ProtobsonOptions, StructCodecOptions, TimestampCodecOptions,
    TimestampFormat,
};
pub use registry::{default_registry, Registry, RegistryBuilder};
pub use structs::{StructCodec, StructTags};
pub use value::{
    FieldDescriptor, FieldKind, FieldValue, MessageClone, MessageDescriptor, ProtoMessage, TypeKey,
};

/// Encodes `msg` to a BSON document with the codec registered for its type.
pub fn to_document(registry: &Registry, msg: &dyn ProtoMessage) -> Result<Document> {
    let key = TypeKey::Message(msg.descriptor().full_name);
    let ctx = EncodeContext::new(registry);
    let mut vw = BsonValueWriter::new();
    registry.lookup_encoder(key)?.encode_value(
        &ctx,
        &mut vw,
        &FieldValue::Message(Some(msg.clone_message())),
    )?;
    match vw.into_value()? {
        BsonValue::Document(doc) => Ok(doc),
        other => Err(CodecError::Stream(BsonError::TypeMismatch {
            expected: BsonType::EmbeddedDocument,
            actual: other.bson_type(),
        })),
    }
}

/// Encodes `msg` to BSON bytes.
pub fn to_vec(registry: &Registry, msg: &dyn ProtoMessage) -> Result<Vec<u8>> {
    Ok(protobson_bson::to_vec(&to_document(registry, msg)?))
}

/// Decodes a document into a new `M`.
pub fn from_document<M>(registry: &Registry, doc: Document) -> Result<M>
where
    M: ProtoMessage + Default + Clone + 'static,
{
    let mut value = FieldValue::Message(Some(Box::new(M::default())));
    let key = value.type_key();
    let source = BsonValue::Document(doc);
    let mut vr = BsonValueReader::new(&source);
    registry
        .lookup_decoder(key)?
        .decode_value(&DecodeContext::new(registry), &mut vr, &mut value)?;
    let received = value.describe();
    match value {
        FieldValue::Message(Some(msg)) => msg
            .into_any()
            .downcast::<M>()
            .map(|msg| *msg)
            .map_err(|_| CodecError::ValueDecoder {
                name: "from_document",
                expected: key,
                received,
            }),
        _ => Err(CodecError::ValueDecoder {
            name: "from_document",
            expected: key,
            received,
        }),
    }
}

/// Decodes BSON bytes into a new `M`.
pub fn from_slice<M>(registry: &Registry, data: &[u8]) -> Result<M>
where
    M: ProtoMessage + Default + Clone + 'static,
{
    from_document(registry, protobson_bson::from_slice(data)?)
}
