// Copyright © 2025 rustmailer.com
// Licensed under RustMailer License Agreement v1.0
// Unauthorized copying, modification, or distribution is prohibited.

use std::sync::Arc;

use async_trait::async_trait;
use itertools::Itertools;
use native_db::*;
use native_model::{native_model, Model};
use serde::{Deserialize, Serialize};
use tracing::debug;
use transaction::RwTransaction;

use crate::{
    modules::{
        attribute::{AttributeValue, Item, ItemExt},
        database::{
            schema::{
                DATE_TIME, MESSAGE_ID, ORIGINAL_MESSAGE_ID, TIME_INDEX_PROJECTION,
                TYPE_YEAR_MONTH,
            },
            Condition, MetadataStore, QueryOutput, QueryRequest, TransactItem, Update,
        },
        error::{code::ErrorCode, MailboxError, MailboxResult},
    },
    raise_error,
};

const KEY_SEPARATOR: char = '|';

/// One row of the metadata table.
///
/// `time_key` and `original_key` materialise the two secondary indices; rows that
/// lack the indexed attributes carry an empty key and never match a query.
#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[native_model(id = 1, version = 1)]
#[native_db]
pub struct StoredItem {
    #[primary_key]
    pub message_id: String,
    #[secondary_key]
    pub time_key: String,
    #[secondary_key]
    pub original_key: String,
    pub attributes: Item,
}

impl StoredItem {
    pub fn from_item(attributes: Item) -> MailboxResult<Self> {
        let message_id = attributes
            .get_s(MESSAGE_ID)
            .filter(|id| !id.is_empty())
            .ok_or_else(|| {
                raise_error!(
                    format!("item is missing the key attribute {}", MESSAGE_ID),
                    ErrorCode::InvalidInput
                )
            })?
            .to_string();
        let time_key = match (
            attributes.get_s(TYPE_YEAR_MONTH),
            attributes.get_s(DATE_TIME),
        ) {
            (Some(ym), Some(dt)) => time_key(ym, dt, &message_id),
            _ => String::new(),
        };
        let original_key = attributes.get_string(ORIGINAL_MESSAGE_ID);
        Ok(Self {
            message_id,
            time_key,
            original_key,
            attributes,
        })
    }
}

fn time_key(type_year_month: &str, date_time: &str, message_id: &str) -> String {
    format!(
        "{}{}{}{}{}",
        type_year_month, KEY_SEPARATOR, date_time, KEY_SEPARATOR, message_id
    )
}

fn key_item(message_id: &str) -> Item {
    let mut item = Item::new();
    item.insert(MESSAGE_ID.into(), AttributeValue::S(message_id.to_string()));
    item
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum IndexKind {
    Time,
    Original,
}

/// Metadata table backed by an embedded native_db database.
pub struct NativeTable {
    db: Arc<Database<'static>>,
    time_index: String,
    original_index: String,
}

impl NativeTable {
    pub fn new(
        db: Arc<Database<'static>>,
        time_index: impl Into<String>,
        original_index: impl Into<String>,
    ) -> Self {
        Self {
            db,
            time_index: time_index.into(),
            original_index: original_index.into(),
        }
    }

    fn index_kind(&self, index_name: &str) -> MailboxResult<IndexKind> {
        if index_name == self.time_index {
            Ok(IndexKind::Time)
        } else if index_name == self.original_index {
            Ok(IndexKind::Original)
        } else {
            Err(raise_error!(
                format!("unknown index '{}'", index_name),
                ErrorCode::InvalidInput
            ))
        }
    }

    async fn execute(
        &self,
        actions: Vec<TransactItem>,
        failure: ErrorCode,
    ) -> MailboxResult<Vec<Option<Item>>> {
        let db = self.db.clone();
        tokio::task::spawn_blocking(move || {
            let rw = db
                .rw_transaction()
                .map_err(|e| raise_error!(format!("{:#?}", e), ErrorCode::InternalError))?;

            let ids = actions
                .iter()
                .map(action_key)
                .collect::<MailboxResult<Vec<_>>>()?;
            if let Some(id) = ids.iter().duplicates().next() {
                return Err(raise_error!(
                    format!("transaction touches item '{}' more than once", id),
                    ErrorCode::InvalidInput
                ));
            }
            let current = ids
                .iter()
                .map(|id| load(&rw, id))
                .collect::<MailboxResult<Vec<_>>>()?;

            let reasons: Vec<&str> = actions
                .iter()
                .zip(current.iter())
                .map(|(action, stored)| {
                    let passed = action_condition(action)
                        .map_or(true, |c| c.evaluate(stored.as_ref().map(|s| &s.attributes)));
                    if passed {
                        "None"
                    } else {
                        "ConditionalCheckFailed"
                    }
                })
                .collect();
            if reasons.iter().any(|r| *r != "None") {
                // the read-write transaction is dropped without commit
                return Err(condition_failure(failure, &reasons));
            }

            let mut results = Vec::with_capacity(actions.len());
            for (action, stored) in actions.into_iter().zip(current) {
                results.push(apply(&rw, action, stored)?);
            }
            rw.commit()
                .map_err(|e| raise_error!(format!("{:#?}", e), ErrorCode::InternalError))?;
            Ok(results)
        })
        .await
        .map_err(|e| raise_error!(format!("{:#?}", e), ErrorCode::InternalError))?
    }
}

fn condition_failure(failure: ErrorCode, reasons: &[&str]) -> MailboxError {
    match failure {
        ErrorCode::TransactionCanceled => raise_error!(
            format!(
                "Transaction cancelled, please refer cancellation reasons for specific reasons [{}]",
                reasons.join(", ")
            ),
            ErrorCode::TransactionCanceled
        ),
        code => raise_error!("The conditional request failed".into(), code),
    }
}

fn action_key(action: &TransactItem) -> MailboxResult<String> {
    match action {
        TransactItem::Put { item, .. } => StoredItem::from_item(item.clone()).map(|s| s.message_id),
        TransactItem::Update { message_id, .. }
        | TransactItem::Delete { message_id, .. }
        | TransactItem::ConditionCheck { message_id, .. } => Ok(message_id.clone()),
    }
}

fn action_condition(action: &TransactItem) -> Option<&Condition> {
    match action {
        TransactItem::Put { condition, .. }
        | TransactItem::Update { condition, .. }
        | TransactItem::Delete { condition, .. } => condition.as_ref(),
        TransactItem::ConditionCheck { condition, .. } => Some(condition),
    }
}

fn load(rw: &RwTransaction, message_id: &str) -> MailboxResult<Option<StoredItem>> {
    rw.get()
        .primary::<StoredItem>(message_id.to_string())
        .map_err(|e| raise_error!(format!("{:#?}", e), ErrorCode::InternalError))
}

fn store(rw: &RwTransaction, old: Option<StoredItem>, new: StoredItem) -> MailboxResult<()> {
    match old {
        Some(old) => rw
            .update(old, new)
            .map_err(|e| raise_error!(format!("{:#?}", e), ErrorCode::InternalError)),
        None => rw
            .insert(new)
            .map_err(|e| raise_error!(format!("{:#?}", e), ErrorCode::InternalError)),
    }
}

fn apply(
    rw: &RwTransaction,
    action: TransactItem,
    stored: Option<StoredItem>,
) -> MailboxResult<Option<Item>> {
    match action {
        TransactItem::Put { item, .. } => {
            let new = StoredItem::from_item(item)?;
            let attributes = new.attributes.clone();
            store(rw, stored, new)?;
            Ok(Some(attributes))
        }
        TransactItem::Update {
            message_id, update, ..
        } => {
            let mut attributes = stored
                .as_ref()
                .map(|s| s.attributes.clone())
                .unwrap_or_else(|| key_item(&message_id));
            update.apply(&mut attributes);
            // the key attribute cannot be removed or rewritten
            attributes.insert(MESSAGE_ID.into(), AttributeValue::S(message_id));
            let new = StoredItem::from_item(attributes)?;
            let attributes = new.attributes.clone();
            store(rw, stored, new)?;
            Ok(Some(attributes))
        }
        TransactItem::Delete { .. } => {
            if let Some(old) = stored {
                rw.remove(old)
                    .map_err(|e| raise_error!(format!("{:#?}", e), ErrorCode::InternalError))?;
            }
            Ok(None)
        }
        TransactItem::ConditionCheck { .. } => Ok(None),
    }
}

fn project(stored: &StoredItem, kind: IndexKind) -> Item {
    let mut projected = key_item(&stored.message_id);
    let names: &[&str] = match kind {
        IndexKind::Time => &[TYPE_YEAR_MONTH, DATE_TIME],
        IndexKind::Original => &[ORIGINAL_MESSAGE_ID],
    };
    let extra: &[&str] = match kind {
        IndexKind::Time => TIME_INDEX_PROJECTION,
        IndexKind::Original => &[],
    };
    for name in names.iter().chain(extra.iter()) {
        if let Some(value) = stored.attributes.get(*name) {
            projected.insert(name.to_string(), value.clone());
        }
    }
    projected
}

/// Position of an index entry, comparable within one partition.
fn index_position(stored: &StoredItem, kind: IndexKind) -> String {
    match kind {
        IndexKind::Time => stored.time_key.clone(),
        IndexKind::Original => stored.message_id.clone(),
    }
}

fn start_position(key: &Item, kind: IndexKind) -> MailboxResult<String> {
    let message_id = key.get_s(MESSAGE_ID).ok_or_else(|| {
        raise_error!(
            "exclusive start key is missing MessageID".into(),
            ErrorCode::InvalidInput
        )
    })?;
    match kind {
        IndexKind::Time => match (key.get_s(TYPE_YEAR_MONTH), key.get_s(DATE_TIME)) {
            (Some(ym), Some(dt)) => Ok(time_key(ym, dt, message_id)),
            _ => Err(raise_error!(
                "exclusive start key is missing the time index keys".into(),
                ErrorCode::InvalidInput
            )),
        },
        IndexKind::Original => Ok(message_id.to_string()),
    }
}

/// Reads up to `limit` entries of one partition in scan order, starting after
/// `start`. The flag reports whether the scan stopped with entries left.
fn read_page<I, E>(
    entries: I,
    kind: IndexKind,
    request: &QueryRequest,
    start: Option<&str>,
) -> MailboxResult<(Vec<StoredItem>, bool)>
where
    I: Iterator<Item = Result<StoredItem, E>>,
    E: std::fmt::Debug,
{
    let mut page = Vec::new();
    for entry in entries {
        let stored = entry.map_err(|e| raise_error!(format!("{:#?}", e), ErrorCode::InternalError))?;
        if kind == IndexKind::Original && stored.original_key != request.partition_value {
            continue;
        }
        if let Some(start) = start {
            let position = index_position(&stored, kind);
            let after_start = if request.ascending {
                position.as_str() > start
            } else {
                position.as_str() < start
            };
            if !after_start {
                continue;
            }
        }
        if request.limit.is_some_and(|limit| page.len() >= limit) {
            return Ok((page, true));
        }
        page.push(stored);
    }
    Ok((page, false))
}

fn index_key(stored: &StoredItem, kind: IndexKind) -> Item {
    let mut key = key_item(&stored.message_id);
    let names: &[&str] = match kind {
        IndexKind::Time => &[TYPE_YEAR_MONTH, DATE_TIME],
        IndexKind::Original => &[ORIGINAL_MESSAGE_ID],
    };
    for name in names {
        if let Some(value) = stored.attributes.get(*name) {
            key.insert(name.to_string(), value.clone());
        }
    }
    key
}

#[async_trait]
impl MetadataStore for NativeTable {
    async fn get_item(&self, message_id: &str) -> MailboxResult<Item> {
        let db = self.db.clone();
        let key = message_id.to_string();
        let found = tokio::task::spawn_blocking(move || {
            let r_transaction = db
                .r_transaction()
                .map_err(|e| raise_error!(format!("{:#?}", e), ErrorCode::InternalError))?;
            r_transaction
                .get()
                .primary::<StoredItem>(key)
                .map_err(|e| raise_error!(format!("{:#?}", e), ErrorCode::InternalError))
        })
        .await
        .map_err(|e| raise_error!(format!("{:#?}", e), ErrorCode::InternalError))??;
        found.map(|stored| stored.attributes).ok_or_else(|| {
            raise_error!(
                format!("item '{}' not found", message_id),
                ErrorCode::NotFound
            )
        })
    }

    async fn put_item(&self, item: Item, condition: Option<Condition>) -> MailboxResult<()> {
        self.execute(
            vec![TransactItem::put(item, condition)],
            ErrorCode::ConditionalCheckFailed,
        )
        .await?;
        Ok(())
    }

    async fn update_item(
        &self,
        message_id: &str,
        update: Update,
        condition: Option<Condition>,
    ) -> MailboxResult<Item> {
        let mut results = self
            .execute(
                vec![TransactItem::update(message_id, update, condition)],
                ErrorCode::ConditionalCheckFailed,
            )
            .await?;
        results.pop().flatten().ok_or_else(|| {
            raise_error!(
                "update returned no item".into(),
                ErrorCode::InternalError
            )
        })
    }

    async fn delete_item(
        &self,
        message_id: &str,
        condition: Option<Condition>,
    ) -> MailboxResult<()> {
        self.execute(
            vec![TransactItem::delete(message_id, condition)],
            ErrorCode::ConditionalCheckFailed,
        )
        .await?;
        Ok(())
    }

    async fn query(&self, request: QueryRequest) -> MailboxResult<QueryOutput> {
        let kind = self.index_kind(&request.index_name)?;
        let start = request
            .exclusive_start_key
            .as_ref()
            .map(|key| start_position(key, kind))
            .transpose()?;
        let db = self.db.clone();
        tokio::task::spawn_blocking(move || {
            let r_transaction = db
                .r_transaction()
                .map_err(|e| raise_error!(format!("{:#?}", e), ErrorCode::InternalError))?;
            let scan = match kind {
                IndexKind::Time => r_transaction
                    .scan()
                    .secondary::<StoredItem>(StoredItemKey::time_key),
                IndexKind::Original => r_transaction
                    .scan()
                    .secondary::<StoredItem>(StoredItemKey::original_key),
            }
            .map_err(|e| raise_error!(format!("{:#?}", e), ErrorCode::InternalError))?;
            let prefix = match kind {
                IndexKind::Time => format!("{}{}", request.partition_value, KEY_SEPARATOR),
                IndexKind::Original => request.partition_value.clone(),
            };
            let iter = scan
                .start_with(prefix)
                .map_err(|e| raise_error!(format!("{:#?}", e), ErrorCode::InternalError))?;

            let (scanned, more) = if request.ascending {
                read_page(iter, kind, &request, start.as_deref())
            } else {
                read_page(iter.rev(), kind, &request, start.as_deref())
            }?;
            let last_evaluated_key = match (more, scanned.last()) {
                (true, Some(last)) => Some(index_key(last, kind)),
                _ => None,
            };

            let items: Vec<Item> = scanned
                .iter()
                .map(|stored| project(stored, kind))
                .filter(|item| {
                    request
                        .filter
                        .as_ref()
                        .map_or(true, |filter| filter.evaluate(Some(item)))
                })
                .collect();
            debug!(
                index = %request.index_name,
                partition = %request.partition_value,
                scanned = scanned.len(),
                returned = items.len(),
                "query completed"
            );
            Ok(QueryOutput {
                items,
                last_evaluated_key,
            })
        })
        .await
        .map_err(|e| raise_error!(format!("{:#?}", e), ErrorCode::InternalError))?
    }

    async fn batch_get(&self, message_ids: &[String]) -> MailboxResult<Vec<Item>> {
        let db = self.db.clone();
        let keys = message_ids.to_vec();
        tokio::task::spawn_blocking(move || {
            let r_transaction = db
                .r_transaction()
                .map_err(|e| raise_error!(format!("{:#?}", e), ErrorCode::InternalError))?;
            let mut items = Vec::with_capacity(keys.len());
            for key in keys {
                let found: Option<StoredItem> = r_transaction
                    .get()
                    .primary(key)
                    .map_err(|e| raise_error!(format!("{:#?}", e), ErrorCode::InternalError))?;
                if let Some(stored) = found {
                    items.push(stored.attributes);
                }
            }
            Ok(items)
        })
        .await
        .map_err(|e| raise_error!(format!("{:#?}", e), ErrorCode::InternalError))?
    }

    async fn transact_write(&self, actions: Vec<TransactItem>) -> MailboxResult<()> {
        if actions.is_empty() {
            return Ok(());
        }
        self.execute(actions, ErrorCode::TransactionCanceled).await?;
        Ok(())
    }
}
