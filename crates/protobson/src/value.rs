//! The closed value model the codecs operate on.
//!
//! Message types describe themselves through a static [`MessageDescriptor`]
//! and expose their fields as [`FieldValue`]s. Registry lookups are keyed by
//! [`TypeKey`], derived from a field's [`FieldKind`].

use std::any::Any;
use std::fmt;

use prost_types::{Duration, Timestamp};

use crate::googleapis::DateTime;

/// Registry key: one entry per supported concrete type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TypeKey {
    Bool,
    Int32,
    Int64,
    UInt32,
    UInt64,
    Float,
    Double,
    String,
    Bytes,
    BoolValue,
    BytesValue,
    DoubleValue,
    FloatValue,
    Int32Value,
    Int64Value,
    StringValue,
    UInt32Value,
    UInt64Value,
    Duration,
    Timestamp,
    DateTime,
    /// A message type, by fully-qualified protobuf name.
    Message(&'static str),
    Repeated,
}

impl TypeKey {
    pub fn name(&self) -> &'static str {
        match self {
            TypeKey::Bool => "bool",
            TypeKey::Int32 => "int32",
            TypeKey::Int64 => "int64",
            TypeKey::UInt32 => "uint32",
            TypeKey::UInt64 => "uint64",
            TypeKey::Float => "float",
            TypeKey::Double => "double",
            TypeKey::String => "string",
            TypeKey::Bytes => "bytes",
            TypeKey::BoolValue => "google.protobuf.BoolValue",
            TypeKey::BytesValue => "google.protobuf.BytesValue",
            TypeKey::DoubleValue => "google.protobuf.DoubleValue",
            TypeKey::FloatValue => "google.protobuf.FloatValue",
            TypeKey::Int32Value => "google.protobuf.Int32Value",
            TypeKey::Int64Value => "google.protobuf.Int64Value",
            TypeKey::StringValue => "google.protobuf.StringValue",
            TypeKey::UInt32Value => "google.protobuf.UInt32Value",
            TypeKey::UInt64Value => "google.protobuf.UInt64Value",
            TypeKey::Duration => "google.protobuf.Duration",
            TypeKey::Timestamp => "google.protobuf.Timestamp",
            TypeKey::DateTime => "google.type.DateTime",
            TypeKey::Message(name) => name,
            TypeKey::Repeated => "repeated",
        }
    }
}

impl fmt::Display for TypeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Declared type of a message field.
#[derive(Debug, Clone, Copy)]
pub enum FieldKind {
    Bool,
    Int32,
    Int64,
    UInt32,
    UInt64,
    Float,
    Double,
    String,
    Bytes,
    BoolValue,
    BytesValue,
    DoubleValue,
    FloatValue,
    Int32Value,
    Int64Value,
    StringValue,
    UInt32Value,
    UInt64Value,
    Duration,
    Timestamp,
    DateTime,
    Message(&'static MessageDescriptor),
    Repeated(&'static FieldKind),
}

impl FieldKind {
    pub fn type_key(&self) -> TypeKey {
        match self {
            FieldKind::Bool => TypeKey::Bool,
            FieldKind::Int32 => TypeKey::Int32,
            FieldKind::Int64 => TypeKey::Int64,
            FieldKind::UInt32 => TypeKey::UInt32,
            FieldKind::UInt64 => TypeKey::UInt64,
            FieldKind::Float => TypeKey::Float,
            FieldKind::Double => TypeKey::Double,
            FieldKind::String => TypeKey::String,
            FieldKind::Bytes => TypeKey::Bytes,
            FieldKind::BoolValue => TypeKey::BoolValue,
            FieldKind::BytesValue => TypeKey::BytesValue,
            FieldKind::DoubleValue => TypeKey::DoubleValue,
            FieldKind::FloatValue => TypeKey::FloatValue,
            FieldKind::Int32Value => TypeKey::Int32Value,
            FieldKind::Int64Value => TypeKey::Int64Value,
            FieldKind::StringValue => TypeKey::StringValue,
            FieldKind::UInt32Value => TypeKey::UInt32Value,
            FieldKind::UInt64Value => TypeKey::UInt64Value,
            FieldKind::Duration => TypeKey::Duration,
            FieldKind::Timestamp => TypeKey::Timestamp,
            FieldKind::DateTime => TypeKey::DateTime,
            FieldKind::Message(desc) => TypeKey::Message(desc.full_name),
            FieldKind::Repeated(_) => TypeKey::Repeated,
        }
    }

    pub fn is_message(&self) -> bool {
        matches!(self, FieldKind::Message(_))
    }
}

/// Static schema of a message type.
#[derive(Debug)]
pub struct MessageDescriptor {
    /// Fully-qualified protobuf name, e.g. `example.v1.User`.
    pub full_name: &'static str,
    pub fields: &'static [FieldDescriptor],
    /// Creates an empty instance.
    pub new: fn() -> Box<dyn ProtoMessage>,
}

/// Static schema of one message field.
#[derive(Debug)]
pub struct FieldDescriptor {
    /// Declared field identifier; lower-cased, it is the default document key.
    pub name: &'static str,
    pub kind: FieldKind,
    /// Document annotation, e.g. `"bar,omitempty"` or `"-"`.
    pub bson: Option<&'static str>,
    /// Protobuf field metadata, e.g. `"bytes,1,opt,name=foo_bar,json=fooBar,proto3"`.
    pub protobuf: Option<&'static str>,
}

impl FieldDescriptor {
    pub const fn new(name: &'static str, kind: FieldKind) -> Self {
        Self {
            name,
            kind,
            bson: None,
            protobuf: None,
        }
    }

    pub const fn bson(mut self, tag: &'static str) -> Self {
        self.bson = Some(tag);
        self
    }

    pub const fn protobuf(mut self, tag: &'static str) -> Self {
        self.protobuf = Some(tag);
        self
    }
}

/// Cloning and downcasting for boxed messages; implemented for every
/// `ProtoMessage + Clone`.
pub trait MessageClone {
    fn clone_message(&self) -> Box<dyn ProtoMessage>;
    fn into_any(self: Box<Self>) -> Box<dyn Any>;
}

impl<T: ProtoMessage + Clone + 'static> MessageClone for T {
    fn clone_message(&self) -> Box<dyn ProtoMessage> {
        Box::new(self.clone())
    }

    fn into_any(self: Box<Self>) -> Box<dyn Any> {
        self
    }
}

/// The protocol message capability: field enumeration plus typed access.
///
/// `get_field` and `set_field` take the field's index in
/// `descriptor().fields`. `set_field` returns `false` when the index is out
/// of range or the value has the wrong variant.
pub trait ProtoMessage: MessageClone + fmt::Debug + Send + Sync {
    fn descriptor(&self) -> &'static MessageDescriptor;
    fn get_field(&self, index: usize) -> Option<FieldValue>;
    fn set_field(&mut self, index: usize, value: FieldValue) -> bool;
}

impl Clone for Box<dyn ProtoMessage> {
    fn clone(&self) -> Self {
        self.clone_message()
    }
}

impl PartialEq for Box<dyn ProtoMessage> {
    fn eq(&self, other: &Self) -> bool {
        let (a, b) = (self.descriptor(), other.descriptor());
        a.full_name == b.full_name
            && (0..a.fields.len()).all(|i| self.get_field(i) == other.get_field(i))
    }
}

/// A field value crossing the codec boundary.
///
/// Wrapper variants hold an `Option`: `None` is an unset wrapper, distinct
/// from a set wrapper holding the zero value.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Bool(bool),
    Int32(i32),
    Int64(i64),
    UInt32(u32),
    UInt64(u64),
    Float(f32),
    Double(f64),
    String(String),
    Bytes(Vec<u8>),
    BoolValue(Option<bool>),
    BytesValue(Option<Vec<u8>>),
    DoubleValue(Option<f64>),
    FloatValue(Option<f32>),
    Int32Value(Option<i32>),
    Int64Value(Option<i64>),
    StringValue(Option<String>),
    UInt32Value(Option<u32>),
    UInt64Value(Option<u64>),
    Duration(Option<Duration>),
    Timestamp(Option<Timestamp>),
    DateTime(Option<DateTime>),
    Message(Option<Box<dyn ProtoMessage>>),
    Repeated(Vec<FieldValue>),
}

impl FieldValue {
    /// The zero value of a field of `kind`: zero scalars, unset wrappers and
    /// messages, empty lists.
    pub fn default_for(kind: &FieldKind) -> FieldValue {
        match kind {
            FieldKind::Bool => FieldValue::Bool(false),
            FieldKind::Int32 => FieldValue::Int32(0),
            FieldKind::Int64 => FieldValue::Int64(0),
            FieldKind::UInt32 => FieldValue::UInt32(0),
            FieldKind::UInt64 => FieldValue::UInt64(0),
            FieldKind::Float => FieldValue::Float(0.0),
            FieldKind::Double => FieldValue::Double(0.0),
            FieldKind::String => FieldValue::String(String::new()),
            FieldKind::Bytes => FieldValue::Bytes(Vec::new()),
            FieldKind::BoolValue => FieldValue::BoolValue(None),
            FieldKind::BytesValue => FieldValue::BytesValue(None),
            FieldKind::DoubleValue => FieldValue::DoubleValue(None),
            FieldKind::FloatValue => FieldValue::FloatValue(None),
            FieldKind::Int32Value => FieldValue::Int32Value(None),
            FieldKind::Int64Value => FieldValue::Int64Value(None),
            FieldKind::StringValue => FieldValue::StringValue(None),
            FieldKind::UInt32Value => FieldValue::UInt32Value(None),
            FieldKind::UInt64Value => FieldValue::UInt64Value(None),
            FieldKind::Duration => FieldValue::Duration(None),
            FieldKind::Timestamp => FieldValue::Timestamp(None),
            FieldKind::DateTime => FieldValue::DateTime(None),
            FieldKind::Message(_) => FieldValue::Message(None),
            FieldKind::Repeated(_) => FieldValue::Repeated(Vec::new()),
        }
    }

    /// Type key of the value's variant.
    pub fn type_key(&self) -> TypeKey {
        match self {
            FieldValue::Bool(_) => TypeKey::Bool,
            FieldValue::Int32(_) => TypeKey::Int32,
            FieldValue::Int64(_) => TypeKey::Int64,
            FieldValue::UInt32(_) => TypeKey::UInt32,
            FieldValue::UInt64(_) => TypeKey::UInt64,
            FieldValue::Float(_) => TypeKey::Float,
            FieldValue::Double(_) => TypeKey::Double,
            FieldValue::String(_) => TypeKey::String,
            FieldValue::Bytes(_) => TypeKey::Bytes,
            FieldValue::BoolValue(_) => TypeKey::BoolValue,
            FieldValue::BytesValue(_) => TypeKey::BytesValue,
            FieldValue::DoubleValue(_) => TypeKey::DoubleValue,
            FieldValue::FloatValue(_) => TypeKey::FloatValue,
            FieldValue::Int32Value(_) => TypeKey::Int32Value,
            FieldValue::Int64Value(_) => TypeKey::Int64Value,
            FieldValue::StringValue(_) => TypeKey::StringValue,
            FieldValue::UInt32Value(_) => TypeKey::UInt32Value,
            FieldValue::UInt64Value(_) => TypeKey::UInt64Value,
            FieldValue::Duration(_) => TypeKey::Duration,
            FieldValue::Timestamp(_) => TypeKey::Timestamp,
            FieldValue::DateTime(_) => TypeKey::DateTime,
            FieldValue::Message(Some(m)) => TypeKey::Message(m.descriptor().full_name),
            FieldValue::Message(None) => TypeKey::Message("<unset message>"),
            FieldValue::Repeated(_) => TypeKey::Repeated,
        }
    }

    /// Short description used in type-gate errors.
    pub(crate) fn describe(&self) -> String {
        match self {
            FieldValue::Message(None) => "unset message".to_owned(),
            other => other.type_key().to_string(),
        }
    }
}
