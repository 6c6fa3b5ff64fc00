use protobson_bson::{
    BsonType, BsonValue, BsonValueReader, BsonValueWriter, Document, ValueReader, ValueWriter,
};
use tracing::trace;

use super::tags::{StructTagParser, StructTags};
use crate::codec::{DecodeContext, EncodeContext};
use crate::error::{CodecError, Result};
use crate::options::StructCodecOptions;
use crate::value::{FieldKind, FieldValue, MessageDescriptor, ProtoMessage, TypeKey};

/// One document key of a message, possibly reached through inline fields.
#[derive(Debug)]
struct FieldEntry {
    key: String,
    /// Field indices from the outer message down to the field itself.
    path: Vec<usize>,
    kind: &'static FieldKind,
    tags: StructTags,
}

/// Encodes messages as embedded documents and decodes them back, one
/// document key per non-skipped field.
#[derive(Debug, Clone)]
pub struct StructCodec {
    parser: StructTagParser,
    options: StructCodecOptions,
}

impl StructCodec {
    pub fn new(parser: StructTagParser, options: &StructCodecOptions) -> Self {
        Self {
            parser,
            options: *options,
        }
    }

    pub fn options(&self) -> &StructCodecOptions {
        &self.options
    }

    fn describe(&self, desc: &'static MessageDescriptor) -> Result<Vec<FieldEntry>> {
        let mut entries = Vec::new();
        self.collect(desc, &mut Vec::new(), &mut entries)?;

        // Among duplicated keys the shallowest field wins, provided it is the
        // only one at its depth.
        let mut groups: Vec<Vec<FieldEntry>> = Vec::new();
        for entry in entries {
            match groups.iter_mut().find(|g| g[0].key == entry.key) {
                Some(group) => group.push(entry),
                None => groups.push(vec![entry]),
            }
        }
        let mut out = Vec::with_capacity(groups.len());
        for mut group in groups {
            if group.len() > 1 {
                let shallowest = group.iter().map(|e| e.path.len()).min().unwrap_or(0);
                let dominant = group.iter().filter(|e| e.path.len() == shallowest).count();
                if dominant > 1 || !self.options.overwrite_inlined() {
                    return Err(CodecError::DuplicateKey {
                        key: group.swap_remove(0).key,
                        message: desc.full_name,
                    });
                }
                group.retain(|e| e.path.len() == shallowest);
            }
            out.extend(group);
        }
        Ok(out)
    }

    fn collect(
        &self,
        desc: &'static MessageDescriptor,
        prefix: &mut Vec<usize>,
        out: &mut Vec<FieldEntry>,
    ) -> Result<()> {
        for (index, field) in desc.fields.iter().enumerate() {
            let mut tags = (self.parser)(field);
            if tags.skip {
                continue;
            }
            if tags.name.is_empty() {
                tags.name = field.name.to_lowercase();
            }
            prefix.push(index);
            if tags.inline {
                let FieldKind::Message(inner) = field.kind else {
                    return Err(CodecError::InvalidInline {
                        field: field.name,
                        message: desc.full_name,
                    });
                };
                self.collect(inner, prefix, out)?;
            } else {
                out.push(FieldEntry {
                    key: tags.name.clone(),
                    path: prefix.clone(),
                    kind: &field.kind,
                    tags,
                });
            }
            prefix.pop();
        }
        Ok(())
    }

    /// Writes `msg` as an embedded document.
    pub fn encode_message(
        &self,
        ctx: &EncodeContext<'_>,
        vw: &mut dyn ValueWriter,
        msg: &dyn ProtoMessage,
    ) -> Result<()> {
        let doc = self.encode_document(ctx, msg)?;
        vw.write_document(doc)?;
        Ok(())
    }

    pub(crate) fn encode_document(
        &self,
        ctx: &EncodeContext<'_>,
        msg: &dyn ProtoMessage,
    ) -> Result<Document> {
        let mut doc = Document::new();
        for entry in self.describe(msg.descriptor())? {
            let Some(value) = lookup_path(msg, &entry.path, entry.kind) else {
                trace!(key = %entry.key, "inline parent unset, field skipped");
                continue;
            };
            if entry.tags.omit_empty && is_empty(&value, self.options.omit_default()) {
                continue;
            }
            let ctx = ctx.with_min_size(entry.tags.min_size);
            let encoded = encode_field(&ctx, entry.kind, &value)?;
            doc.push((entry.key, encoded));
        }
        Ok(doc)
    }

    /// Reads an embedded document into `msg`. Fields without a matching key
    /// keep their current value unless `decodeZeroStruct` is set.
    pub fn decode_message(
        &self,
        ctx: &DecodeContext<'_>,
        vr: &mut dyn ValueReader,
        msg: &mut dyn ProtoMessage,
    ) -> Result<()> {
        let desc = msg.descriptor();
        let doc = match vr.bson_type() {
            BsonType::EmbeddedDocument => vr.read_document()?,
            other => return Err(CodecError::unsupported(other, TypeKey::Message(desc.full_name))),
        };
        self.decode_document(ctx, &doc, msg)
    }

    pub(crate) fn decode_document(
        &self,
        ctx: &DecodeContext<'_>,
        doc: &Document,
        msg: &mut dyn ProtoMessage,
    ) -> Result<()> {
        let desc = msg.descriptor();
        let entries = self.describe(desc)?;
        if self.options.decode_zero() {
            for (index, field) in desc.fields.iter().enumerate() {
                msg.set_field(index, FieldValue::default_for(&field.kind));
            }
        }
        for (key, value) in doc {
            let entry = entries.iter().find(|e| e.key == *key).or_else(|| {
                let lower = key.to_lowercase();
                entries.iter().find(|e| e.key == lower)
            });
            let Some(entry) = entry else {
                trace!(%key, message = desc.full_name, "no field for key, skipped");
                continue;
            };
            let ctx = ctx.with_truncate(entry.tags.truncate);
            decode_path(&ctx, msg, &entry.path, entry.kind, value).map_err(|err| err.in_key(key))?;
        }
        Ok(())
    }
}

/// The value at `path`, or `None` when an inline parent is unset.
fn lookup_path(msg: &dyn ProtoMessage, path: &[usize], kind: &FieldKind) -> Option<FieldValue> {
    match path {
        [] => None,
        [last] => Some(
            msg.get_field(*last)
                .unwrap_or_else(|| FieldValue::default_for(kind)),
        ),
        [first, rest @ ..] => match msg.get_field(*first) {
            Some(FieldValue::Message(Some(inner))) => lookup_path(&*inner, rest, kind),
            _ => None,
        },
    }
}

fn is_empty(value: &FieldValue, omit_default_struct: bool) -> bool {
    match value {
        FieldValue::Bool(b) => !b,
        FieldValue::Int32(v) => *v == 0,
        FieldValue::Int64(v) => *v == 0,
        FieldValue::UInt32(v) => *v == 0,
        FieldValue::UInt64(v) => *v == 0,
        FieldValue::Float(v) => *v == 0.0,
        FieldValue::Double(v) => *v == 0.0,
        FieldValue::String(s) => s.is_empty(),
        FieldValue::Bytes(b) => b.is_empty(),
        FieldValue::BoolValue(v) => v.is_none(),
        FieldValue::BytesValue(v) => v.is_none(),
        FieldValue::DoubleValue(v) => v.is_none(),
        FieldValue::FloatValue(v) => v.is_none(),
        FieldValue::Int32Value(v) => v.is_none(),
        FieldValue::Int64Value(v) => v.is_none(),
        FieldValue::StringValue(v) => v.is_none(),
        FieldValue::UInt32Value(v) => v.is_none(),
        FieldValue::UInt64Value(v) => v.is_none(),
        FieldValue::Duration(v) => v.is_none(),
        FieldValue::Timestamp(v) => v.is_none(),
        FieldValue::DateTime(v) => v.is_none(),
        FieldValue::Message(None) => true,
        FieldValue::Message(Some(m)) => omit_default_struct && is_default_message(m.as_ref()),
        FieldValue::Repeated(items) => items.is_empty(),
    }
}

fn is_default_message(msg: &dyn ProtoMessage) -> bool {
    msg.descriptor().fields.iter().enumerate().all(|(index, field)| {
        msg.get_field(index)
            .map_or(true, |value| value == FieldValue::default_for(&field.kind))
    })
}

fn encode_field(ctx: &EncodeContext<'_>, kind: &FieldKind, value: &FieldValue) -> Result<BsonValue> {
    if let (FieldKind::Repeated(elem), FieldValue::Repeated(items)) = (kind, value) {
        let values = items
            .iter()
            .map(|item| encode_field(ctx, elem, item))
            .collect::<Result<Vec<_>>>()?;
        return Ok(BsonValue::Array(values));
    }
    let codec = ctx.registry.lookup_encoder(kind.type_key())?;
    let mut vw = BsonValueWriter::new();
    codec.encode_value(ctx, &mut vw, value)?;
    Ok(vw.into_value()?)
}

/// A decode target for `kind` seeded from the field's current value. Unset
/// messages get a fresh instance so the message codec has something to fill.
fn decode_target(kind: &FieldKind, current: Option<FieldValue>) -> FieldValue {
    match (kind, current) {
        (FieldKind::Message(desc), None | Some(FieldValue::Message(None))) => {
            FieldValue::Message(Some((desc.new)()))
        }
        (_, Some(value)) if value.type_key() == kind.type_key() => value,
        (FieldKind::Message(desc), Some(_)) => FieldValue::Message(Some((desc.new)())),
        _ => FieldValue::default_for(kind),
    }
}

fn decode_field(
    ctx: &DecodeContext<'_>,
    kind: &FieldKind,
    source: &BsonValue,
    target: &mut FieldValue,
) -> Result<()> {
    if let FieldKind::Repeated(elem) = kind {
        let items = match source {
            BsonValue::Array(values) => values
                .iter()
                .enumerate()
                .map(|(i, v)| {
                    let mut item = decode_target(elem, None);
                    decode_field(ctx, elem, v, &mut item)
                        .map(|()| item)
                        .map_err(|err| err.in_key(&i.to_string()))
                })
                .collect::<Result<Vec<_>>>()?,
            BsonValue::Null | BsonValue::Undefined => Vec::new(),
            other => return Err(CodecError::unsupported(other.bson_type(), TypeKey::Repeated)),
        };
        *target = FieldValue::Repeated(items);
        return Ok(());
    }
    let codec = ctx.registry.lookup_decoder(kind.type_key())?;
    let mut vr = BsonValueReader::new(source);
    codec.decode_value(ctx, &mut vr, target)
}

fn decode_path(
    ctx: &DecodeContext<'_>,
    msg: &mut dyn ProtoMessage,
    path: &[usize],
    kind: &'static FieldKind,
    source: &BsonValue,
) -> Result<()> {
    let desc = msg.descriptor();
    let Some((&index, rest)) = path.split_first() else {
        return Ok(());
    };
    let field = &desc.fields[index];
    let value = if rest.is_empty() {
        let mut target = decode_target(kind, msg.get_field(index));
        decode_field(ctx, kind, source, &mut target)?;
        target
    } else {
        let mut parent = match (decode_target(&field.kind, msg.get_field(index)), field.kind) {
            (FieldValue::Message(Some(parent)), _) => parent,
            (_, FieldKind::Message(inner)) => (inner.new)(),
            _ => {
                return Err(CodecError::InvalidInline {
                    field: field.name,
                    message: desc.full_name,
                })
            }
        };
        decode_path(ctx, parent.as_mut(), rest, kind, source)?;
        FieldValue::Message(Some(parent))
    };
    let received = value.type_key();
    if !msg.set_field(index, value) {
        return Err(CodecError::FieldMismatch {
            field: field.name,
            message: desc.full_name,
            received,
        });
    }
    Ok(())
}
