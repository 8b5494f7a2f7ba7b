// Copyright © 2025 rustmailer.com
// Licensed under RustMailer License Agreement v1.0
// Unauthorized copying, modification, or distribution is prohibited.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

pub mod codec;
pub mod cursor;
#[cfg(test)]
mod tests;

/// A tagged attribute value as stored in the metadata table.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum AttributeValue {
    S(String),
    /// Numbers keep their decimal text form.
    N(String),
    Bool(bool),
    B(Vec<u8>),
    Null(bool),
    L(Vec<AttributeValue>),
    M(BTreeMap<String, AttributeValue>),
    Ss(Vec<String>),
    Ns(Vec<String>),
    Bs(Vec<Vec<u8>>),
}

/// One stored row: attribute name to value.
pub type Item = BTreeMap<String, AttributeValue>;

impl AttributeValue {
    pub fn as_s(&self) -> Option<&str> {
        match self {
            AttributeValue::S(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            AttributeValue::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_l(&self) -> Option<&[AttributeValue]> {
        match self {
            AttributeValue::L(list) => Some(list),
            _ => None,
        }
    }

    pub fn as_m(&self) -> Option<&BTreeMap<String, AttributeValue>> {
        match self {
            AttributeValue::M(map) => Some(map),
            _ => None,
        }
    }

    /// String list, accepting both `L` of `S` and `SS`.
    pub fn as_string_list(&self) -> Option<Vec<String>> {
        match self {
            AttributeValue::Ss(list) => Some(list.clone()),
            AttributeValue::L(list) => Some(
                list.iter()
                    .filter_map(|v| v.as_s().map(str::to_string))
                    .collect(),
            ),
            _ => None,
        }
    }

    pub fn string_list<S: Into<String>>(list: impl IntoIterator<Item = S>) -> Self {
        AttributeValue::L(
            list.into_iter()
                .map(|s| AttributeValue::S(s.into()))
                .collect(),
        )
    }
}

impl From<&str> for AttributeValue {
    fn from(s: &str) -> Self {
        AttributeValue::S(s.to_string())
    }
}

impl From<String> for AttributeValue {
    fn from(s: String) -> Self {
        AttributeValue::S(s)
    }
}

impl From<bool> for AttributeValue {
    fn from(b: bool) -> Self {
        AttributeValue::Bool(b)
    }
}

/// Typed accessors over a stored row.
pub trait ItemExt {
    fn get_s(&self, name: &str) -> Option<&str>;
    fn get_string(&self, name: &str) -> String;
    fn get_list(&self, name: &str) -> Vec<String>;
    fn has(&self, name: &str) -> bool;
}

impl ItemExt for Item {
    fn get_s(&self, name: &str) -> Option<&str> {
        self.get(name).and_then(AttributeValue::as_s)
    }

    fn get_string(&self, name: &str) -> String {
        self.get_s(name).unwrap_or_default().to_string()
    }

    fn get_list(&self, name: &str) -> Vec<String> {
        self.get(name)
            .and_then(AttributeValue::as_string_list)
            .unwrap_or_default()
    }

    fn has(&self, name: &str) -> bool {
        self.contains_key(name)
    }
}
