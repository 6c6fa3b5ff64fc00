//! Immutable table from [`TypeKey`] to codec.
//!
//! A [`Registry`] is assembled once with a [`RegistryBuilder`] and then
//! shared read-only by every encode and decode call that is handed it.
//! Message types without an exact entry fall through to the hook codecs.

use std::collections::HashMap;
use std::sync::{Arc, OnceLock};

use tracing::debug;

use crate::codec::{
    BoolValueCodec, BytesValueCodec, DoubleValueCodec, DurationCodec, FloatValueCodec,
    Int32ValueCodec, Int64ValueCodec, MessageCodec, PrimitiveCodec, StringValueCodec,
    TimestampCodec, UInt32ValueCodec, UInt64ValueCodec, ValueCodec,
};
use crate::error::{CodecError, Result};
use crate::googleapis::DateTimeCodec;
use crate::options::ProtobsonOptions;
use crate::value::TypeKey;

const PRIMITIVE_KEYS: [TypeKey; 9] = [
    TypeKey::Bool,
    TypeKey::Int32,
    TypeKey::Int64,
    TypeKey::UInt32,
    TypeKey::UInt64,
    TypeKey::Float,
    TypeKey::Double,
    TypeKey::String,
    TypeKey::Bytes,
];

#[derive(Debug, Default)]
pub struct RegistryBuilder {
    encoders: HashMap<TypeKey, Arc<dyn ValueCodec>>,
    decoders: HashMap<TypeKey, Arc<dyn ValueCodec>>,
    hook_encoder: Option<Arc<dyn ValueCodec>>,
    hook_decoder: Option<Arc<dyn ValueCodec>>,
}

impl RegistryBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `codec` as both encoder and decoder for `key`, replacing any
    /// earlier registration.
    pub fn register_codec(self, key: TypeKey, codec: impl ValueCodec + 'static) -> Self {
        let codec: Arc<dyn ValueCodec> = Arc::new(codec);
        self.register_encoder(key, codec.clone())
            .register_decoder(key, codec)
    }

    pub fn register_encoder(mut self, key: TypeKey, codec: Arc<dyn ValueCodec>) -> Self {
        if self.encoders.insert(key, codec).is_some() {
            debug!(%key, "replaced encoder");
        }
        self
    }

    pub fn register_decoder(mut self, key: TypeKey, codec: Arc<dyn ValueCodec>) -> Self {
        if self.decoders.insert(key, codec).is_some() {
            debug!(%key, "replaced decoder");
        }
        self
    }

    /// Encoder for message types without an exact registration.
    pub fn register_hook_encoder(mut self, codec: impl ValueCodec + 'static) -> Self {
        if self.hook_encoder.replace(Arc::new(codec)).is_some() {
            debug!("replaced message hook encoder");
        }
        self
    }

    /// Decoder for message types without an exact registration.
    pub fn register_hook_decoder(mut self, codec: impl ValueCodec + 'static) -> Self {
        if self.hook_decoder.replace(Arc::new(codec)).is_some() {
            debug!("replaced message hook decoder");
        }
        self
    }

    pub fn build(self) -> Registry {
        debug!(
            encoders = self.encoders.len(),
            decoders = self.decoders.len(),
            hooks = self.hook_encoder.is_some() as u8 + self.hook_decoder.is_some() as u8,
            "built codec registry"
        );
        Registry {
            encoders: self.encoders,
            decoders: self.decoders,
            hook_encoder: self.hook_encoder,
            hook_decoder: self.hook_decoder,
        }
    }
}

#[derive(Debug)]
pub struct Registry {
    encoders: HashMap<TypeKey, Arc<dyn ValueCodec>>,
    decoders: HashMap<TypeKey, Arc<dyn ValueCodec>>,
    hook_encoder: Option<Arc<dyn ValueCodec>>,
    hook_decoder: Option<Arc<dyn ValueCodec>>,
}

impl Registry {
    pub fn builder() -> RegistryBuilder {
        RegistryBuilder::new()
    }

    /// Registry with every supported type bound to its codec.
    pub fn from_options(opts: &ProtobsonOptions) -> Registry {
        Self::builder_from_options(opts).build()
    }

    /// The builder behind [`Registry::from_options`], for callers that add
    /// their own codecs on top.
    pub fn builder_from_options(opts: &ProtobsonOptions) -> RegistryBuilder {
        let primitive: Arc<dyn ValueCodec> = Arc::new(PrimitiveCodec::new());
        let mut builder = RegistryBuilder::new();
        for key in PRIMITIVE_KEYS {
            builder = builder
                .register_encoder(key, primitive.clone())
                .register_decoder(key, primitive.clone());
        }
        builder
            .register_codec(TypeKey::BoolValue, BoolValueCodec::new())
            .register_codec(TypeKey::BytesValue, BytesValueCodec::new())
            .register_codec(TypeKey::DoubleValue, DoubleValueCodec::new())
            .register_codec(TypeKey::FloatValue, FloatValueCodec::new())
            .register_codec(TypeKey::Int32Value, Int32ValueCodec::new())
            .register_codec(TypeKey::Int64Value, Int64ValueCodec::new())
            .register_codec(TypeKey::StringValue, StringValueCodec::new())
            .register_codec(TypeKey::UInt32Value, UInt32ValueCodec::new())
            .register_codec(TypeKey::UInt64Value, UInt64ValueCodec::new())
            .register_codec(TypeKey::Duration, DurationCodec::new())
            .register_codec(
                TypeKey::Timestamp,
                TimestampCodec::with_options(&opts.timestamp),
            )
            .register_codec(TypeKey::DateTime, DateTimeCodec::new())
            .register_hook_encoder(MessageCodec::new(&opts.message))
            .register_hook_decoder(MessageCodec::new(&opts.message))
    }

    pub fn lookup_encoder(&self, key: TypeKey) -> Result<&dyn ValueCodec> {
        lookup(&self.encoders, self.hook_encoder.as_ref(), key).ok_or(CodecError::NoEncoder(key))
    }

    pub fn lookup_decoder(&self, key: TypeKey) -> Result<&dyn ValueCodec> {
        lookup(&self.decoders, self.hook_decoder.as_ref(), key).ok_or(CodecError::NoDecoder(key))
    }
}

fn lookup<'a>(
    exact: &'a HashMap<TypeKey, Arc<dyn ValueCodec>>,
    hook: Option<&'a Arc<dyn ValueCodec>>,
    key: TypeKey,
) -> Option<&'a dyn ValueCodec> {
    if let Some(codec) = exact.get(&key) {
        return Some(codec.as_ref());
    }
    match key {
        TypeKey::Message(_) => hook.map(|codec| codec.as_ref()),
        _ => None,
    }
}

/// The registry built from default options, created on first use.
pub fn default_registry() -> &'static Registry {
    static REGISTRY: OnceLock<Registry> = OnceLock::new();
    REGISTRY.get_or_init(|| Registry::from_options(&ProtobsonOptions::default()))
}
