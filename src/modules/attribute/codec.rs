// Copyright © 2025 rustmailer.com
// Licensed under RustMailer License Agreement v1.0
// Unauthorized copying, modification, or distribution is prohibited.

//! Self-describing text form of attribute values:
//! `{"S":"…"}`, `{"N":"…"}`, `{"BOOL":true}`, `{"B":"<base64>"}`, `{"NULL":true}`,
//! `{"L":[…]}`, `{"M":{…}}`, `{"SS":[…]}`, `{"NS":[…]}`, `{"BS":[…]}`.

use serde_json::{Map, Value};

use crate::{
    base64_decode, base64_encode,
    modules::{
        attribute::{AttributeValue, Item},
        error::{code::ErrorCode, MailboxResult},
    },
    raise_error,
};

pub fn encode(value: &AttributeValue) -> String {
    to_json(value).to_string()
}

/// Encodes a whole row as an `M` value.
pub fn encode_item(item: &Item) -> String {
    to_json(&AttributeValue::M(item.clone())).to_string()
}

pub fn decode(text: &str) -> MailboxResult<AttributeValue> {
    let value: Value = serde_json::from_str(text)
        .map_err(|e| raise_error!(format!("malformed attribute: {}", e), ErrorCode::DecodeError))?;
    from_json(&value)
}

/// Decodes an `M` value into a row.
pub fn decode_item(text: &str) -> MailboxResult<Item> {
    match decode(text)? {
        AttributeValue::M(item) => Ok(item),
        _ => Err(raise_error!(
            "expected an M attribute".into(),
            ErrorCode::DecodeError
        )),
    }
}

pub fn to_json(value: &AttributeValue) -> Value {
    let (tag, inner) = match value {
        AttributeValue::S(s) => ("S", Value::String(s.clone())),
        AttributeValue::N(n) => ("N", Value::String(n.clone())),
        AttributeValue::Bool(b) => ("BOOL", Value::Bool(*b)),
        AttributeValue::B(bytes) => ("B", Value::String(base64_encode!(bytes))),
        AttributeValue::Null(b) => ("NULL", Value::Bool(*b)),
        AttributeValue::L(list) => ("L", Value::Array(list.iter().map(to_json).collect())),
        AttributeValue::M(map) => (
            "M",
            Value::Object(map.iter().map(|(k, v)| (k.clone(), to_json(v))).collect()),
        ),
        AttributeValue::Ss(list) => (
            "SS",
            Value::Array(list.iter().cloned().map(Value::String).collect()),
        ),
        AttributeValue::Ns(list) => (
            "NS",
            Value::Array(list.iter().cloned().map(Value::String).collect()),
        ),
        AttributeValue::Bs(list) => (
            "BS",
            Value::Array(
                list.iter()
                    .map(|bytes| Value::String(base64_encode!(bytes)))
                    .collect(),
            ),
        ),
    };
    let mut object = Map::with_capacity(1);
    object.insert(tag.to_string(), inner);
    Value::Object(object)
}

pub fn from_json(value: &Value) -> MailboxResult<AttributeValue> {
    let object = value.as_object().ok_or_else(|| {
        raise_error!(
            format!("attribute must be an object, got {}", value),
            ErrorCode::DecodeError
        )
    })?;
    if object.len() != 1 {
        return Err(raise_error!(
            format!("attribute must have exactly one tag, got {}", object.len()),
            ErrorCode::DecodeError
        ));
    }
    let (tag, inner) = object
        .iter()
        .next()
        .ok_or_else(|| raise_error!("empty attribute".into(), ErrorCode::DecodeError))?;
    match tag.as_str() {
        "S" => Ok(AttributeValue::S(expect_string(tag, inner)?)),
        "N" => Ok(AttributeValue::N(expect_string(tag, inner)?)),
        "BOOL" => Ok(AttributeValue::Bool(expect_bool(tag, inner)?)),
        "NULL" => Ok(AttributeValue::Null(expect_bool(tag, inner)?)),
        "B" => Ok(AttributeValue::B(decode_binary(&expect_string(tag, inner)?)?)),
        "L" => Ok(AttributeValue::L(
            expect_array(tag, inner)?
                .iter()
                .map(from_json)
                .collect::<MailboxResult<Vec<_>>>()?,
        )),
        "M" => {
            let map = inner.as_object().ok_or_else(|| {
                raise_error!("M must hold an object".into(), ErrorCode::DecodeError)
            })?;
            let mut item = Item::new();
            for (k, v) in map {
                item.insert(k.clone(), from_json(v)?);
            }
            Ok(AttributeValue::M(item))
        }
        "SS" => Ok(AttributeValue::Ss(string_array(tag, inner)?)),
        "NS" => Ok(AttributeValue::Ns(string_array(tag, inner)?)),
        "BS" => Ok(AttributeValue::Bs(
            string_array(tag, inner)?
                .iter()
                .map(|s| decode_binary(s))
                .collect::<MailboxResult<Vec<_>>>()?,
        )),
        other => Err(raise_error!(
            format!("unknown attribute tag '{}'", other),
            ErrorCode::DecodeError
        )),
    }
}

fn expect_string(tag: &str, value: &Value) -> MailboxResult<String> {
    value.as_str().map(str::to_string).ok_or_else(|| {
        raise_error!(
            format!("{} must hold a string", tag),
            ErrorCode::DecodeError
        )
    })
}

fn expect_bool(tag: &str, value: &Value) -> MailboxResult<bool> {
    value.as_bool().ok_or_else(|| {
        raise_error!(
            format!("{} must hold a boolean", tag),
            ErrorCode::DecodeError
        )
    })
}

fn expect_array<'a>(tag: &str, value: &'a Value) -> MailboxResult<&'a Vec<Value>> {
    value.as_array().ok_or_else(|| {
        raise_error!(
            format!("{} must hold an array", tag),
            ErrorCode::DecodeError
        )
    })
}

fn string_array(tag: &str, value: &Value) -> MailboxResult<Vec<String>> {
    expect_array(tag, value)?
        .iter()
        .map(|v| expect_string(tag, v))
        .collect()
}

fn decode_binary(text: &str) -> MailboxResult<Vec<u8>> {
    base64_decode!(text)
        .map_err(|e| raise_error!(format!("malformed base64: {}", e), ErrorCode::DecodeError))
}
