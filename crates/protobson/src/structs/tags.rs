//! Field tag resolution.
//!
//! A parser turns a [`FieldDescriptor`] into [`StructTags`]: the document key
//! plus the structural flags. The document annotation (`bson`) always takes
//! precedence; the two fallback parsers differ only in how they name a field
//! from its protobuf metadata when no annotation is present.

use crate::value::FieldDescriptor;

/// Resolved document key and structural flags of one field.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StructTags {
    pub name: String,
    pub skip: bool,
    pub omit_empty: bool,
    pub min_size: bool,
    pub truncate: bool,
    pub inline: bool,
}

/// Field tag parser used by the structural codec.
pub type StructTagParser = fn(&FieldDescriptor) -> StructTags;

/// Parses a document annotation such as `"bar,omitempty,minsize"`.
///
/// `"-"` marks the field as skipped. An empty name segment keeps `key`.
pub fn parse_bson_tag(key: &str, tag: &str) -> StructTags {
    if tag == "-" {
        return StructTags {
            skip: true,
            ..StructTags::default()
        };
    }
    let mut st = StructTags {
        name: key.to_owned(),
        ..StructTags::default()
    };
    for (idx, part) in tag.split(',').enumerate() {
        if idx == 0 {
            if !part.is_empty() {
                st.name = part.to_owned();
            }
            continue;
        }
        match part {
            "omitempty" => st.omit_empty = true,
            "minsize" => st.min_size = true,
            "truncate" => st.truncate = true,
            "inline" => st.inline = true,
            _ => {}
        }
    }
    st
}

/// Extracts the field name from protobuf metadata such as
/// `"bytes,1,opt,name=foo_bar,json=fooBar,proto3"`.
///
/// Positional segments and unknown keys are ignored. The `json` alias is
/// preferred unless `use_proto_names` is set; a missing key yields an empty
/// name.
pub fn parse_protobuf_tag(tag: &str, use_proto_names: bool) -> StructTags {
    let mut name = None;
    let mut json = None;
    for prop in tag.split(',') {
        let (k, v) = prop.split_once('=').unwrap_or((prop, ""));
        match k {
            "name" => name = Some(v),
            "json" => json = Some(v),
            _ => {}
        }
    }
    let chosen = match json {
        Some(json) if !use_proto_names => json,
        _ => name.unwrap_or(""),
    };
    StructTags {
        name: chosen.to_owned(),
        ..StructTags::default()
    }
}

/// Names a field after its annotation, or its lower-cased identifier.
pub fn default_struct_tag_parser(field: &FieldDescriptor) -> StructTags {
    let key = field.name.to_lowercase();
    match field.bson {
        Some(tag) => parse_bson_tag(&key, tag),
        None => StructTags {
            name: key,
            ..StructTags::default()
        },
    }
}

fn fallback(field: &FieldDescriptor, use_proto_names: bool) -> StructTags {
    match (field.bson, field.protobuf) {
        (None, Some(tag)) => parse_protobuf_tag(tag, use_proto_names),
        _ => default_struct_tag_parser(field),
    }
}

/// The default parser of [`crate::MessageCodec`]: the annotation if present,
/// else the protobuf JSON name, else the declared name, else the lower-cased
/// identifier.
pub fn json_fallback_struct_tag_parser(field: &FieldDescriptor) -> StructTags {
    fallback(field, false)
}

/// Like [`json_fallback_struct_tag_parser`] but prefers the declared protobuf
/// name over the JSON name.
pub fn proto_names_fallback_struct_tag_parser(field: &FieldDescriptor) -> StructTags {
    fallback(field, true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::FieldKind;

    fn tags(name: &str) -> StructTags {
        StructTags {
            name: name.to_owned(),
            ..StructTags::default()
        }
    }

    fn all_options(name: &str) -> StructTags {
        StructTags {
            name: name.to_owned(),
            omit_empty: true,
            min_size: true,
            truncate: true,
            inline: true,
            ..StructTags::default()
        }
    }

    fn skipped() -> StructTags {
        StructTags {
            skip: true,
            ..StructTags::default()
        }
    }

    #[test]
    fn parser_matrix() {
        const FOO: FieldDescriptor = FieldDescriptor::new("Foo", FieldKind::String);
        const FOO_BAR: FieldDescriptor = FieldDescriptor::new("FooBar", FieldKind::Bytes);

        let cases: Vec<(&str, FieldDescriptor, StructTags)> = vec![
            ("empty", FOO, tags("foo")),
            ("bson name", FOO.bson("bar"), tags("bar")),
            ("bson dash", FOO.bson("-"), skipped()),
            ("bson all options", FOO.bson("bar,omitempty,minsize,truncate,inline"), all_options("bar")),
            ("bson all options default name", FOO.bson(",omitempty,minsize,truncate,inline"), all_options("foo")),
            (
                "bson wins over protobuf",
                FOO_BAR.bson("barfoo").protobuf("bytes,3,opt,name=bar_foo,json=barFoo,proto3"),
                tags("barfoo"),
            ),
            (
                "bson dash wins over protobuf",
                FOO_BAR.bson("-").protobuf("bytes,3,opt,name=bar_foo,json=barFoo,proto3"),
                skipped(),
            ),
            ("protobuf without json", FOO_BAR.protobuf("bytes,1,opt,name=foo_bar,proto3"), tags("foo_bar")),
        ];
        for (label, field, want) in cases {
            assert_eq!(json_fallback_struct_tag_parser(&field), want, "json: {label}");
            assert_eq!(proto_names_fallback_struct_tag_parser(&field), want, "proto: {label}");
        }
    }

    #[test]
    fn json_and_proto_names_diverge() {
        let field = FieldDescriptor::new("FooBar", FieldKind::Bytes)
            .protobuf("bytes,1,opt,name=foo_bar,json=fooBar,proto3");
        assert_eq!(json_fallback_struct_tag_parser(&field), tags("fooBar"));
        assert_eq!(proto_names_fallback_struct_tag_parser(&field), tags("foo_bar"));
        assert_eq!(default_struct_tag_parser(&field), tags("foobar"));
    }

    #[test]
    fn protobuf_tag_is_total() {
        assert_eq!(parse_protobuf_tag("", false), tags(""));
        assert_eq!(parse_protobuf_tag("varint,7,rep,packed", false), tags(""));
        assert_eq!(parse_protobuf_tag("json=x,weird=a=b,,name=y", true), tags("y"));
        assert_eq!(parse_protobuf_tag("json=x,weird=a=b,,name=y", false), tags("x"));
    }
}
