// Copyright © 2025 rustmailer.com
// Licensed under RustMailer License Agreement v1.0
// Unauthorized copying, modification, or distribution is prohibited.

use std::fmt;

use crate::modules::attribute::{AttributeValue, Item};

/// Condition expression evaluated against the current state of a row. A missing
/// row has no attributes.
#[derive(Debug, Clone, PartialEq)]
pub enum Condition {
    AttributeExists(String),
    AttributeNotExists(String),
    BeginsWith(String, String),
    Equals(String, AttributeValue),
    And(Vec<Condition>),
    Or(Vec<Condition>),
    Not(Box<Condition>),
}

impl Condition {
    pub fn exists(name: &str) -> Self {
        Condition::AttributeExists(name.to_string())
    }

    pub fn not_exists(name: &str) -> Self {
        Condition::AttributeNotExists(name.to_string())
    }

    pub fn begins_with(name: &str, prefix: impl Into<String>) -> Self {
        Condition::BeginsWith(name.to_string(), prefix.into())
    }

    pub fn equals(name: &str, value: impl Into<AttributeValue>) -> Self {
        Condition::Equals(name.to_string(), value.into())
    }

    pub fn and(self, other: Condition) -> Self {
        match self {
            Condition::And(mut all) => {
                all.push(other);
                Condition::And(all)
            }
            this => Condition::And(vec![this, other]),
        }
    }

    pub fn or(self, other: Condition) -> Self {
        match self {
            Condition::Or(mut any) => {
                any.push(other);
                Condition::Or(any)
            }
            this => Condition::Or(vec![this, other]),
        }
    }

    pub fn negate(self) -> Self {
        Condition::Not(Box::new(self))
    }

    pub fn evaluate(&self, item: Option<&Item>) -> bool {
        let attribute = |name: &str| item.and_then(|item| item.get(name));
        match self {
            Condition::AttributeExists(name) => attribute(name).is_some(),
            Condition::AttributeNotExists(name) => attribute(name).is_none(),
            Condition::BeginsWith(name, prefix) => attribute(name)
                .and_then(AttributeValue::as_s)
                .is_some_and(|value| value.starts_with(prefix.as_str())),
            Condition::Equals(name, expected) => attribute(name) == Some(expected),
            Condition::And(all) => all.iter().all(|c| c.evaluate(item)),
            Condition::Or(any) => any.iter().any(|c| c.evaluate(item)),
            Condition::Not(inner) => !inner.evaluate(item),
        }
    }
}

impl fmt::Display for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Condition::AttributeExists(name) => write!(f, "attribute_exists({})", name),
            Condition::AttributeNotExists(name) => write!(f, "attribute_not_exists({})", name),
            Condition::BeginsWith(name, prefix) => write!(f, "begins_with({}, {:?})", name, prefix),
            Condition::Equals(name, value) => write!(f, "{} = {:?}", name, value),
            Condition::And(all) => join(f, all, "AND"),
            Condition::Or(any) => join(f, any, "OR"),
            Condition::Not(inner) => write!(f, "NOT {}", inner),
        }
    }
}

fn join(f: &mut fmt::Formatter<'_>, parts: &[Condition], op: &str) -> fmt::Result {
    write!(f, "(")?;
    for (i, part) in parts.iter().enumerate() {
        if i > 0 {
            write!(f, " {} ", op)?;
        }
        write!(f, "{}", part)?;
    }
    write!(f, ")")
}

#[derive(Debug, Clone, PartialEq)]
pub enum UpdateAction {
    Set(String, AttributeValue),
    SetIfNotExists(String, AttributeValue),
    Remove(String),
    /// Appends to a list attribute, creating it when absent.
    AppendToList(String, Vec<AttributeValue>),
}

/// An ordered set of update actions applied to one row.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Update {
    pub actions: Vec<UpdateAction>,
}

impl Update {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(mut self, name: &str, value: impl Into<AttributeValue>) -> Self {
        self.actions
            .push(UpdateAction::Set(name.to_string(), value.into()));
        self
    }

    pub fn set_if_not_exists(mut self, name: &str, value: impl Into<AttributeValue>) -> Self {
        self.actions
            .push(UpdateAction::SetIfNotExists(name.to_string(), value.into()));
        self
    }

    pub fn remove(mut self, name: &str) -> Self {
        self.actions.push(UpdateAction::Remove(name.to_string()));
        self
    }

    pub fn append(mut self, name: &str, values: Vec<AttributeValue>) -> Self {
        self.actions
            .push(UpdateAction::AppendToList(name.to_string(), values));
        self
    }

    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }

    pub fn apply(&self, item: &mut Item) {
        for action in &self.actions {
            match action {
                UpdateAction::Set(name, value) => {
                    item.insert(name.clone(), value.clone());
                }
                UpdateAction::SetIfNotExists(name, value) => {
                    item.entry(name.clone()).or_insert_with(|| value.clone());
                }
                UpdateAction::Remove(name) => {
                    item.remove(name);
                }
                UpdateAction::AppendToList(name, values) => match item.get_mut(name) {
                    Some(AttributeValue::L(list)) => list.extend(values.iter().cloned()),
                    _ => {
                        item.insert(name.clone(), AttributeValue::L(values.clone()));
                    }
                },
            }
        }
    }
}
