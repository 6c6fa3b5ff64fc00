use protobson_bson::{BsonType, ValueReader, ValueWriter};

use super::{DecodeContext, EncodeContext, ValueCodec};
use crate::error::{CodecError, Result};
use crate::options::MessageCodecOptions;
use crate::structs::{
    json_fallback_struct_tag_parser, proto_names_fallback_struct_tag_parser, StructCodec,
};
use crate::value::{FieldValue, TypeKey};

/// Codec for any protobuf message, registered as the registry's message hook.
///
/// Fields are keyed by their document annotation when present, otherwise by
/// their protobuf JSON name (or declared name with `useProtoNames`), falling
/// back to the lower-cased identifier.
#[derive(Debug, Clone)]
pub struct MessageCodec {
    structs: StructCodec,
}

impl MessageCodec {
    pub fn new(opts: &MessageCodecOptions) -> Self {
        let parser = if opts.proto_names() {
            proto_names_fallback_struct_tag_parser
        } else {
            json_fallback_struct_tag_parser
        };
        Self {
            structs: StructCodec::new(parser, &opts.struct_codec),
        }
    }

    pub fn struct_codec(&self) -> &StructCodec {
        &self.structs
    }
}

impl Default for MessageCodec {
    fn default() -> Self {
        Self::new(&MessageCodecOptions::default())
    }
}

impl ValueCodec for MessageCodec {
    fn encode_value(
        &self,
        ctx: &EncodeContext<'_>,
        vw: &mut dyn ValueWriter,
        value: &FieldValue,
    ) -> Result<()> {
        let FieldValue::Message(msg) = value else {
            return Err(CodecError::encoder(
                "MessageCodec.EncodeValue",
                TypeKey::Message("proto.Message"),
                value,
            ));
        };
        match msg {
            None => {
                vw.write_null()?;
                Ok(())
            }
            Some(msg) => self.structs.encode_message(ctx, vw, msg.as_ref()),
        }
    }

    /// Decodes into the message held by `value`, which must be set.
    fn decode_value(
        &self,
        ctx: &DecodeContext<'_>,
        vr: &mut dyn ValueReader,
        value: &mut FieldValue,
    ) -> Result<()> {
        let FieldValue::Message(slot) = value else {
            return Err(CodecError::decoder(
                "MessageCodec.DecodeValue",
                TypeKey::Message("proto.Message"),
                value,
            ));
        };
        let Some(msg) = slot else {
            return Err(CodecError::ValueDecoder {
                name: "MessageCodec.DecodeValue",
                expected: TypeKey::Message("proto.Message"),
                received: "unset message".to_owned(),
            });
        };
        match vr.bson_type() {
            BsonType::Null => {
                vr.read_null()?;
                *slot = None;
            }
            BsonType::Undefined => {
                vr.read_undefined()?;
                *slot = Some((msg.descriptor().new)());
            }
            _ => self.structs.decode_message(ctx, vr, msg.as_mut())?,
        }
        Ok(())
    }
}
