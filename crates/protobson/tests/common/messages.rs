//! Hand-written messages in the shape generated protobuf code takes.

use prost_types::{Duration, Timestamp};
use protobson::{
    FieldDescriptor, FieldKind, FieldValue, MessageClone, MessageDescriptor, ProtoMessage,
};

fn downcast<T: Clone + 'static>(msg: Option<Box<dyn ProtoMessage>>) -> Result<Option<T>, ()> {
    match msg {
        None => Ok(None),
        Some(msg) => msg.into_any().downcast::<T>().map(|m| Some(*m)).map_err(|_| ()),
    }
}

fn boxed<T: ProtoMessage + Clone + 'static>(msg: &Option<T>) -> FieldValue {
    FieldValue::Message(msg.clone().map(|m| Box::new(m) as Box<dyn ProtoMessage>))
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Address {
    pub street: String,
    pub zip_code: Option<String>,
}

fn new_address() -> Box<dyn ProtoMessage> {
    Box::new(Address::default())
}

static ADDRESS_FIELDS: [FieldDescriptor; 2] = [
    FieldDescriptor::new("Street", FieldKind::String).protobuf("bytes,1,opt,name=street,proto3"),
    FieldDescriptor::new("ZipCode", FieldKind::StringValue)
        .protobuf("bytes,2,opt,name=zip_code,json=zipCode,proto3"),
];

pub static ADDRESS: MessageDescriptor = MessageDescriptor {
    full_name: "example.v1.Address",
    fields: &ADDRESS_FIELDS,
    new: new_address,
};

static ADDRESS_KIND: FieldKind = FieldKind::Message(&ADDRESS);
static STRING_KIND: FieldKind = FieldKind::String;

impl ProtoMessage for Address {
    fn descriptor(&self) -> &'static MessageDescriptor {
        &ADDRESS
    }

    fn get_field(&self, index: usize) -> Option<FieldValue> {
        Some(match index {
            0 => FieldValue::String(self.street.clone()),
            1 => FieldValue::StringValue(self.zip_code.clone()),
            _ => return None,
        })
    }

    fn set_field(&mut self, index: usize, value: FieldValue) -> bool {
        match (index, value) {
            (0, FieldValue::String(v)) => self.street = v,
            (1, FieldValue::StringValue(v)) => self.zip_code = v,
            _ => return false,
        }
        true
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Audit {
    pub source: String,
    pub revision: i64,
}

fn new_audit() -> Box<dyn ProtoMessage> {
    Box::new(Audit::default())
}

static AUDIT_FIELDS: [FieldDescriptor; 2] = [
    FieldDescriptor::new("Source", FieldKind::String).protobuf("bytes,1,opt,name=source,proto3"),
    FieldDescriptor::new("Revision", FieldKind::Int64).protobuf("varint,2,opt,name=revision,proto3"),
];

pub static AUDIT: MessageDescriptor = MessageDescriptor {
    full_name: "example.v1.Audit",
    fields: &AUDIT_FIELDS,
    new: new_audit,
};

impl ProtoMessage for Audit {
    fn descriptor(&self) -> &'static MessageDescriptor {
        &AUDIT
    }

    fn get_field(&self, index: usize) -> Option<FieldValue> {
        Some(match index {
            0 => FieldValue::String(self.source.clone()),
            1 => FieldValue::Int64(self.revision),
            _ => return None,
        })
    }

    fn set_field(&mut self, index: usize, value: FieldValue) -> bool {
        match (index, value) {
            (0, FieldValue::String(v)) => self.source = v,
            (1, FieldValue::Int64(v)) => self.revision = v,
            _ => return false,
        }
        true
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct User {
    pub name: String,
    pub display_name: String,
    pub age: Option<u32>,
    pub nickname: Option<String>,
    pub home: Option<Address>,
    pub tags: Vec<String>,
    pub created_at: Option<Timestamp>,
    pub ttl: Option<Duration>,
    pub secret: String,
    pub score: i64,
    pub addresses: Vec<Address>,
    pub audit: Option<Audit>,
}

fn new_user() -> Box<dyn ProtoMessage> {
    Box::new(User::default())
}

static USER_FIELDS: [FieldDescriptor; 12] = [
    FieldDescriptor::new("Name", FieldKind::String).protobuf("bytes,1,opt,name=name,proto3"),
    FieldDescriptor::new("DisplayName", FieldKind::String)
        .protobuf("bytes,2,opt,name=display_name,json=displayName,proto3"),
    FieldDescriptor::new("Age", FieldKind::UInt32Value).protobuf("bytes,3,opt,name=age,proto3"),
    FieldDescriptor::new("Nickname", FieldKind::StringValue)
        .bson("nick,omitempty")
        .protobuf("bytes,4,opt,name=nickname,proto3"),
    FieldDescriptor::new("Home", FieldKind::Message(&ADDRESS)).protobuf("bytes,5,opt,name=home,proto3"),
    FieldDescriptor::new("Tags", FieldKind::Repeated(&STRING_KIND))
        .protobuf("bytes,6,rep,name=tags,proto3"),
    FieldDescriptor::new("CreatedAt", FieldKind::Timestamp)
        .protobuf("bytes,7,opt,name=created_at,json=createdAt,proto3"),
    FieldDescriptor::new("Ttl", FieldKind::Duration).protobuf("bytes,8,opt,name=ttl,proto3"),
    FieldDescriptor::new("Secret", FieldKind::String)
        .bson("-")
        .protobuf("bytes,9,opt,name=secret,proto3"),
    FieldDescriptor::new("Score", FieldKind::Int64).bson("score,minsize"),
    FieldDescriptor::new("Addresses", FieldKind::Repeated(&ADDRESS_KIND))
        .protobuf("bytes,11,rep,name=addresses,proto3"),
    FieldDescriptor::new("Audit", FieldKind::Message(&AUDIT)).bson(",inline"),
];

pub static USER: MessageDescriptor = MessageDescriptor {
    full_name: "example.v1.User",
    fields: &USER_FIELDS,
    new: new_user,
};

impl ProtoMessage for User {
    fn descriptor(&self) -> &'static MessageDescriptor {
        &USER
    }

    fn get_field(&self, index: usize) -> Option<FieldValue> {
        Some(match index {
            0 => FieldValue::String(self.name.clone()),
            1 => FieldValue::String(self.display_name.clone()),
            2 => FieldValue::UInt32Value(self.age),
            3 => FieldValue::StringValue(self.nickname.clone()),
            4 => boxed(&self.home),
            5 => FieldValue::Repeated(self.tags.iter().cloned().map(FieldValue::String).collect()),
            6 => FieldValue::Timestamp(self.created_at.clone()),
            7 => FieldValue::Duration(self.ttl.clone()),
            8 => FieldValue::String(self.secret.clone()),
            9 => FieldValue::Int64(self.score),
            10 => FieldValue::Repeated(
                self.addresses
                    .iter()
                    .map(|a| FieldValue::Message(Some(Box::new(a.clone()))))
                    .collect(),
            ),
            11 => boxed(&self.audit),
            _ => return None,
        })
    }

    fn set_field(&mut self, index: usize, value: FieldValue) -> bool {
        match (index, value) {
            (0, FieldValue::String(v)) => self.name = v,
            (1, FieldValue::String(v)) => self.display_name = v,
            (2, FieldValue::UInt32Value(v)) => self.age = v,
            (3, FieldValue::StringValue(v)) => self.nickname = v,
            (4, FieldValue::Message(v)) => match downcast(v) {
                Ok(v) => self.home = v,
                Err(()) => return false,
            },
            (5, FieldValue::Repeated(items)) => {
                let mut tags = Vec::with_capacity(items.len());
                for item in items {
                    let FieldValue::String(tag) = item else {
                        return false;
                    };
                    tags.push(tag);
                }
                self.tags = tags;
            }
            (6, FieldValue::Timestamp(v)) => self.created_at = v,
            (7, FieldValue::Duration(v)) => self.ttl = v,
            (8, FieldValue::String(v)) => self.secret = v,
            (9, FieldValue::Int64(v)) => self.score = v,
            (10, FieldValue::Repeated(items)) => {
                let mut addresses = Vec::with_capacity(items.len());
                for item in items {
                    let FieldValue::Message(msg) = item else {
                        return false;
                    };
                    match downcast::<Address>(msg) {
                        Ok(Some(a)) => addresses.push(a),
                        _ => return false,
                    }
                }
                self.addresses = addresses;
            }
            (11, FieldValue::Message(v)) => match downcast(v) {
                Ok(v) => self.audit = v,
                Err(()) => return false,
            },
            _ => return false,
        }
        true
    }
}

/// A message whose inlined child declares a key the parent also uses.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Shadowed {
    pub name: String,
    pub inner: Option<Audit>,
    pub label: Option<Label>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Label {
    pub name: String,
}

fn new_label() -> Box<dyn ProtoMessage> {
    Box::new(Label::default())
}

static LABEL_FIELDS: [FieldDescriptor; 1] =
    [FieldDescriptor::new("Name", FieldKind::String).protobuf("bytes,1,opt,name=name,proto3")];

pub static LABEL: MessageDescriptor = MessageDescriptor {
    full_name: "example.v1.Label",
    fields: &LABEL_FIELDS,
    new: new_label,
};

impl ProtoMessage for Label {
    fn descriptor(&self) -> &'static MessageDescriptor {
        &LABEL
    }

    fn get_field(&self, index: usize) -> Option<FieldValue> {
        (index == 0).then(|| FieldValue::String(self.name.clone()))
    }

    fn set_field(&mut self, index: usize, value: FieldValue) -> bool {
        match (index, value) {
            (0, FieldValue::String(v)) => self.name = v,
            _ => return false,
        }
        true
    }
}

fn new_shadowed() -> Box<dyn ProtoMessage> {
    Box::new(Shadowed::default())
}

static SHADOWED_FIELDS: [FieldDescriptor; 3] = [
    FieldDescriptor::new("Name", FieldKind::String).protobuf("bytes,1,opt,name=name,proto3"),
    FieldDescriptor::new("Inner", FieldKind::Message(&AUDIT)).bson("inner,omitempty"),
    FieldDescriptor::new("Label", FieldKind::Message(&LABEL)).bson(",inline"),
];

pub static SHADOWED: MessageDescriptor = MessageDescriptor {
    full_name: "example.v1.Shadowed",
    fields: &SHADOWED_FIELDS,
    new: new_shadowed,
};

/// Two inlined children share a key with a field declared after them.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Layered {
    pub primary: Option<Label>,
    pub secondary: Option<Label>,
    pub name: String,
}

fn new_layered() -> Box<dyn ProtoMessage> {
    Box::new(Layered::default())
}

static LAYERED_FIELDS: [FieldDescriptor; 3] = [
    FieldDescriptor::new("Primary", FieldKind::Message(&LABEL)).bson(",inline"),
    FieldDescriptor::new("Secondary", FieldKind::Message(&LABEL)).bson(",inline"),
    FieldDescriptor::new("Name", FieldKind::String).protobuf("bytes,3,opt,name=name,proto3"),
];

pub static LAYERED: MessageDescriptor = MessageDescriptor {
    full_name: "example.v1.Layered",
    fields: &LAYERED_FIELDS,
    new: new_layered,
};

impl ProtoMessage for Layered {
    fn descriptor(&self) -> &'static MessageDescriptor {
        &LAYERED
    }

    fn get_field(&self, index: usize) -> Option<FieldValue> {
        Some(match index {
            0 => boxed(&self.primary),
            1 => boxed(&self.secondary),
            2 => FieldValue::String(self.name.clone()),
            _ => return None,
        })
    }

    fn set_field(&mut self, index: usize, value: FieldValue) -> bool {
        match (index, value) {
            (0, FieldValue::Message(v)) => match downcast(v) {
                Ok(v) => self.primary = v,
                Err(()) => return false,
            },
            (1, FieldValue::Message(v)) => match downcast(v) {
                Ok(v) => self.secondary = v,
                Err(()) => return false,
            },
            (2, FieldValue::String(v)) => self.name = v,
            _ => return false,
        }
        true
    }
}

impl ProtoMessage for Shadowed {
    fn descriptor(&self) -> &'static MessageDescriptor {
        &SHADOWED
    }

    fn get_field(&self, index: usize) -> Option<FieldValue> {
        Some(match index {
            0 => FieldValue::String(self.name.clone()),
            1 => boxed(&self.inner),
            2 => boxed(&self.label),
            _ => return None,
        })
    }

    fn set_field(&mut self, index: usize, value: FieldValue) -> bool {
        match (index, value) {
            (0, FieldValue::String(v)) => self.name = v,
            (1, FieldValue::Message(v)) => match downcast(v) {
                Ok(v) => self.inner = v,
                Err(()) => return false,
            },
            (2, FieldValue::Message(v)) => match downcast(v) {
                Ok(v) => self.label = v,
                Err(()) => return false,
            },
            _ => return false,
        }
        true
    }
}

/// A message that tries to inline a scalar.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BadInline {
    pub count: i32,
}

fn new_bad_inline() -> Box<dyn ProtoMessage> {
    Box::new(BadInline::default())
}

static BAD_INLINE_FIELDS: [FieldDescriptor; 1] =
    [FieldDescriptor::new("Count", FieldKind::Int32).bson("count,inline")];

pub static BAD_INLINE: MessageDescriptor = MessageDescriptor {
    full_name: "example.v1.BadInline",
    fields: &BAD_INLINE_FIELDS,
    new: new_bad_inline,
};

impl ProtoMessage for BadInline {
    fn descriptor(&self) -> &'static MessageDescriptor {
        &BAD_INLINE
    }

    fn get_field(&self, index: usize) -> Option<FieldValue> {
        (index == 0).then_some(FieldValue::Int32(self.count))
    }

    fn set_field(&mut self, index: usize, value: FieldValue) -> bool {
        match (index, value) {
            (0, FieldValue::Int32(v)) => self.count = v,
            _ => return false,
        }
        true
    }
}
