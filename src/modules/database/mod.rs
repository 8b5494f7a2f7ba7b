// Copyright © 2025 rustmailer.com
// Licensed under RustMailer License Agreement v1.0
// Unauthorized copying, modification, or distribution is prohibited.

//! Typed operations over the metadata table.
//!
//! The table holds every record kind under a single `MessageID` key space. Two
//! secondary indices exist: the time index (`TypeYearMonth` + `DateTime`) used by
//! listings and the original index (`OriginalMessageID`) used for reply matching.

use async_trait::async_trait;

use crate::modules::{attribute::Item, error::MailboxResult};

pub use condition::{Condition, Update, UpdateAction};

pub mod condition;
pub mod manager;
pub mod schema;
pub mod table;
#[cfg(test)]
mod tests;

#[derive(Debug, Clone)]
pub struct QueryRequest {
    pub index_name: String,
    /// Value of the index partition attribute.
    pub partition_value: String,
    pub ascending: bool,
    /// Maximum number of index entries evaluated, applied before `filter`.
    pub limit: Option<usize>,
    pub exclusive_start_key: Option<Item>,
    pub filter: Option<Condition>,
}

impl QueryRequest {
    pub fn new(index_name: impl Into<String>, partition_value: impl Into<String>) -> Self {
        Self {
            index_name: index_name.into(),
            partition_value: partition_value.into(),
            ascending: true,
            limit: None,
            exclusive_start_key: None,
            filter: None,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct QueryOutput {
    pub items: Vec<Item>,
    /// Present when the query stopped before the end of the partition.
    pub last_evaluated_key: Option<Item>,
}

/// One action of a multi-row transaction.
#[derive(Debug, Clone)]
pub enum TransactItem {
    Put {
        item: Item,
        condition: Option<Condition>,
    },
    Update {
        message_id: String,
        update: Update,
        condition: Option<Condition>,
    },
    Delete {
        message_id: String,
        condition: Option<Condition>,
    },
    ConditionCheck {
        message_id: String,
        condition: Condition,
    },
}

impl TransactItem {
    pub fn put(item: Item, condition: Option<Condition>) -> Self {
        TransactItem::Put { item, condition }
    }

    pub fn update(message_id: impl Into<String>, update: Update, condition: Option<Condition>) -> Self {
        TransactItem::Update {
            message_id: message_id.into(),
            update,
            condition,
        }
    }

    pub fn delete(message_id: impl Into<String>, condition: Option<Condition>) -> Self {
        TransactItem::Delete {
            message_id: message_id.into(),
            condition,
        }
    }

    pub fn condition_check(message_id: impl Into<String>, condition: Condition) -> Self {
        TransactItem::ConditionCheck {
            message_id: message_id.into(),
            condition,
        }
    }
}

/// The verbs the mailbox needs from its key/value table.
///
/// Conditional failures surface as `ConditionalCheckFailed` for single-row writes
/// and `TransactionCanceled` for transactions; throughput limits as
/// `TooManyRequests`; a missing row on `get_item` as `NotFound`.
#[async_trait]
pub trait MetadataStore: Send + Sync {
    async fn get_item(&self, message_id: &str) -> MailboxResult<Item>;

    async fn put_item(&self, item: Item, condition: Option<Condition>) -> MailboxResult<()>;

    /// Applies `update` and returns the row as stored afterwards. A missing row is
    /// created from its key, so callers guard with a condition.
    async fn update_item(
        &self,
        message_id: &str,
        update: Update,
        condition: Option<Condition>,
    ) -> MailboxResult<Item>;

    async fn delete_item(&self, message_id: &str, condition: Option<Condition>)
        -> MailboxResult<()>;

    async fn query(&self, request: QueryRequest) -> MailboxResult<QueryOutput>;

    /// Returns the rows that exist, in the order requested.
    async fn batch_get(&self, message_ids: &[String]) -> MailboxResult<Vec<Item>>;

    /// Evaluates every condition first; commits all actions or none.
    async fn transact_write(&self, actions: Vec<TransactItem>) -> MailboxResult<()>;
}
