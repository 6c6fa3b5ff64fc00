//! Codec configuration.
//!
//! Every option is an `Option` so that several option sets can be merged
//! with the last explicitly set value winning. Options deserialize from
//! camelCase keys, e.g. `{"useProtoNames": true, "structCodec":
//! {"decodeZeroStruct": true}}`.

use serde::{Deserialize, Serialize};

/// Options for the structural codec that backs [`crate::MessageCodec`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct StructCodecOptions {
    /// Reset every field to its zero value before decoding. Defaults to false.
    pub decode_zero_struct: Option<bool>,
    /// Treat a set message whose fields all hold zero values as empty for
    /// `omitempty`. Defaults to false.
    pub encode_omit_default_struct: Option<bool>,
    /// When inlined fields share a key, keep the shallowest one instead of
    /// failing. Defaults to true.
    pub overwrite_duplicated_inlined_fields: Option<bool>,
}

impl StructCodecOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_decode_zero_struct(mut self, b: bool) -> Self {
        self.decode_zero_struct = Some(b);
        self
    }

    pub fn set_encode_omit_default_struct(mut self, b: bool) -> Self {
        self.encode_omit_default_struct = Some(b);
        self
    }

    pub fn set_overwrite_duplicated_inlined_fields(mut self, b: bool) -> Self {
        self.overwrite_duplicated_inlined_fields = Some(b);
        self
    }

    pub fn merge<'a>(opts: impl IntoIterator<Item = &'a StructCodecOptions>) -> Self {
        let mut out = Self::default();
        for opt in opts {
            if opt.decode_zero_struct.is_some() {
                out.decode_zero_struct = opt.decode_zero_struct;
            }
            if opt.encode_omit_default_struct.is_some() {
                out.encode_omit_default_struct = opt.encode_omit_default_struct;
            }
            if opt.overwrite_duplicated_inlined_fields.is_some() {
                out.overwrite_duplicated_inlined_fields = opt.overwrite_duplicated_inlined_fields;
            }
        }
        out
    }

    pub(crate) fn decode_zero(&self) -> bool {
        self.decode_zero_struct.unwrap_or(false)
    }

    pub(crate) fn omit_default(&self) -> bool {
        self.encode_omit_default_struct.unwrap_or(false)
    }

    pub(crate) fn overwrite_inlined(&self) -> bool {
        self.overwrite_duplicated_inlined_fields.unwrap_or(true)
    }
}

/// Options for [`crate::MessageCodec`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct MessageCodecOptions {
    /// Key fields by their declared protobuf name instead of their JSON name.
    /// Defaults to false.
    pub use_proto_names: Option<bool>,
    pub struct_codec: StructCodecOptions,
}

impl MessageCodecOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_use_proto_names(mut self, b: bool) -> Self {
        self.use_proto_names = Some(b);
        self
    }

    pub fn set_struct_codec(mut self, opts: StructCodecOptions) -> Self {
        self.struct_codec = opts;
        self
    }

    pub fn merge<'a>(opts: impl IntoIterator<Item = &'a MessageCodecOptions>) -> Self {
        let mut use_proto_names = None;
        let mut structs = Vec::new();
        for opt in opts {
            if opt.use_proto_names.is_some() {
                use_proto_names = opt.use_proto_names;
            }
            structs.push(&opt.struct_codec);
        }
        Self {
            use_proto_names,
            struct_codec: StructCodecOptions::merge(structs),
        }
    }

    pub(crate) fn proto_names(&self) -> bool {
        self.use_proto_names.unwrap_or(false)
    }
}

/// Wire form written by [`crate::TimestampCodec`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum TimestampFormat {
    /// BSON UTC datetime, millisecond precision.
    #[default]
    DateTime,
    /// BSON timestamp: seconds as time, nanos as increment.
    Timestamp,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TimestampCodecOptions {
    pub format: Option<TimestampFormat>,
}

impl TimestampCodecOptions {
    pub fn merge<'a>(opts: impl IntoIterator<Item = &'a TimestampCodecOptions>) -> Self {
        let format = opts.into_iter().filter_map(|o| o.format).last();
        Self { format }
    }
}

/// Top-level configuration for [`crate::Registry::from_options`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ProtobsonOptions {
    pub message: MessageCodecOptions,
    pub timestamp: TimestampCodecOptions,
}
