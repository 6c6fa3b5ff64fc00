use proptest::prelude::*;
use protobson::{default_registry, DecodeContext, EncodeContext, FieldValue, Result, ValueCodec};
use protobson_bson::{BsonValue, BsonValueReader, BsonValueWriter};

fn encode(value: &FieldValue) -> Result<BsonValue> {
    let registry = default_registry();
    let mut vw = BsonValueWriter::new();
    registry.lookup_encoder(value.type_key())?.encode_value(
        &EncodeContext::new(registry),
        &mut vw,
        value,
    )?;
    Ok(vw.into_value()?)
}

fn decode(source: &BsonValue, target: FieldValue) -> Result<FieldValue> {
    let registry = default_registry();
    let mut value = target;
    registry.lookup_decoder(value.type_key())?.decode_value(
        &DecodeContext::new(registry),
        &mut BsonValueReader::new(source),
        &mut value,
    )?;
    Ok(value)
}

/// Unset wrappers of every kind, paired with their set zero value.
fn unset_and_zero() -> Vec<(FieldValue, FieldValue)> {
    vec![
        (FieldValue::BoolValue(None), FieldValue::BoolValue(Some(false))),
        (FieldValue::BytesValue(None), FieldValue::BytesValue(Some(Vec::new()))),
        (FieldValue::DoubleValue(None), FieldValue::DoubleValue(Some(0.0))),
        (FieldValue::FloatValue(None), FieldValue::FloatValue(Some(0.0))),
        (FieldValue::Int32Value(None), FieldValue::Int32Value(Some(0))),
        (FieldValue::Int64Value(None), FieldValue::Int64Value(Some(0))),
        (FieldValue::StringValue(None), FieldValue::StringValue(Some(String::new()))),
        (FieldValue::UInt32Value(None), FieldValue::UInt32Value(Some(0))),
        (FieldValue::UInt64Value(None), FieldValue::UInt64Value(Some(0))),
        (FieldValue::Duration(None), FieldValue::Duration(Some(Default::default()))),
        (FieldValue::Timestamp(None), FieldValue::Timestamp(Some(Default::default()))),
    ]
}

#[test]
fn null_is_absent_and_undefined_is_zero() {
    for (unset, zero) in unset_and_zero() {
        assert_eq!(encode(&unset), Ok(BsonValue::Null), "{unset:?}");
        assert_eq!(decode(&BsonValue::Null, zero.clone()), Ok(unset.clone()));
        assert_eq!(decode(&BsonValue::Undefined, unset.clone()), Ok(zero.clone()));
    }
}

#[test]
fn hello_world_bytes() {
    let hello = b"Hello, World!".to_vec();
    assert_eq!(hello.len(), 13);
    assert_eq!(
        encode(&FieldValue::BytesValue(Some(hello.clone()))),
        Ok(BsonValue::binary(hello.clone()))
    );
    assert_eq!(
        decode(&BsonValue::String("Hello, World!".into()), FieldValue::BytesValue(None)),
        Ok(FieldValue::BytesValue(Some(hello)))
    );
}

fn wrapper() -> impl Strategy<Value = FieldValue> {
    prop_oneof![
        any::<bool>().prop_map(|v| FieldValue::BoolValue(Some(v))),
        any::<Vec<u8>>().prop_map(|v| FieldValue::BytesValue(Some(v))),
        any::<f64>()
            .prop_filter("NaN never compares equal", |v| !v.is_nan())
            .prop_map(|v| FieldValue::DoubleValue(Some(v))),
        any::<f32>()
            .prop_filter("NaN never compares equal", |v| !v.is_nan())
            .prop_map(|v| FieldValue::FloatValue(Some(v))),
        any::<i32>().prop_map(|v| FieldValue::Int32Value(Some(v))),
        any::<i64>().prop_map(|v| FieldValue::Int64Value(Some(v))),
        ".*".prop_map(|v| FieldValue::StringValue(Some(v))),
        any::<u32>().prop_map(|v| FieldValue::UInt32Value(Some(v))),
        any::<u64>().prop_map(|v| FieldValue::UInt64Value(Some(v))),
    ]
}

proptest! {
    #[test]
    fn wrappers_round_trip(value in wrapper()) {
        let encoded = encode(&value).unwrap();
        let target = match &value {
            FieldValue::BoolValue(_) => FieldValue::BoolValue(None),
            FieldValue::BytesValue(_) => FieldValue::BytesValue(None),
            FieldValue::DoubleValue(_) => FieldValue::DoubleValue(None),
            FieldValue::FloatValue(_) => FieldValue::FloatValue(None),
            FieldValue::Int32Value(_) => FieldValue::Int32Value(None),
            FieldValue::Int64Value(_) => FieldValue::Int64Value(None),
            FieldValue::StringValue(_) => FieldValue::StringValue(None),
            FieldValue::UInt32Value(_) => FieldValue::UInt32Value(None),
            _ => FieldValue::UInt64Value(None),
        };
        prop_assert_eq!(decode(&encoded, target), Ok(value));
    }

    #[test]
    fn numeric_wrappers_accept_their_text_form(v in any::<u64>()) {
        prop_assert_eq!(
            decode(&BsonValue::String(v.to_string()), FieldValue::UInt64Value(None)),
            Ok(FieldValue::UInt64Value(Some(v)))
        );
    }
}
