//! Structural message codec: maps a message's declared fields to the keys
//! of an embedded document.

mod codec;
mod tags;

pub use codec::StructCodec;
pub use tags::{
    default_struct_tag_parser, json_fallback_struct_tag_parser, parse_bson_tag,
    parse_protobuf_tag, proto_names_fallback_struct_tag_parser, StructTagParser, StructTags,
};
