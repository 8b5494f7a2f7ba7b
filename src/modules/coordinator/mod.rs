// Copyright © 2025 rustmailer.com
// Licensed under RustMailer License Agreement v1.0
// Unauthorized copying, modification, or distribution is prohibited.

//! Multi-row writes.
//!
//! Every state change that touches more than one row is collected into a
//! [`WriteBatch`] and committed as one conditional transaction, so a thread and
//! its members never disagree about membership.

use chrono::Utc;
use tracing::debug;

use crate::modules::{
    attribute::{AttributeValue, Item},
    database::{schema::*, Condition, MetadataStore, TransactItem, Update, UpdateAction},
    error::MailboxResult,
    format::{format_date_time, format_rfc3339, EmailType},
    thread::resolver::ThreadDecision,
};


#[derive(Debug, Default)]
pub struct WriteBatch {
    actions: Vec<TransactItem>,
}

impl WriteBatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, action: TransactItem) {
        self.actions.push(action);
    }

    pub fn len(&self) -> usize {
        self.actions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }

    pub fn actions(&self) -> &[TransactItem] {
        &self.actions
    }

    /// Adds the writes that store the new email `item` under `decision`.
    ///
    /// The email is only written when its key is free.
    pub fn insert_email(&mut self, decision: &ThreadDecision, mut item: Item) {
        let message_id = match item.get(MESSAGE_ID).and_then(AttributeValue::as_s) {
            Some(id) => id.to_string(),
            None => String::new(),
        };
        let now = format_rfc3339(&Utc::now());
        let new_email = Condition::not_exists(MESSAGE_ID);

        match decision {
            ThreadDecision::None => {
                self.push(TransactItem::put(item, Some(new_email)));
            }
            ThreadDecision::Exists {
                thread_id,
                previous_message_id,
            } => {
                item.insert(THREAD_ID.into(), thread_id.as_str().into());
                item.insert(IS_THREAD_LATEST.into(), true.into());
                self.push(TransactItem::put(item, Some(new_email)));
                self.push(TransactItem::update(
                    thread_id,
                    Update::new()
                        .append(EMAIL_IDS, vec![message_id.as_str().into()])
                        .set(TIME_UPDATED, now),
                    Some(
                        Condition::exists(MESSAGE_ID)
                            .and(Condition::begins_with(TYPE_YEAR_MONTH, EmailType::Thread.prefix())),
                    ),
                ));
                self.push(TransactItem::update(
                    previous_message_id,
                    Update::new().remove(IS_THREAD_LATEST),
                    Some(Condition::exists(MESSAGE_ID)),
                ));
            }
            ThreadDecision::Create {
                thread_id,
                creating_email_id,
                creating_subject,
                creating_time,
            } => {
                self.push(TransactItem::update(
                    creating_email_id,
                    Update::new().set(THREAD_ID, thread_id.as_str()),
                    Some(Condition::not_exists(THREAD_ID).and(Condition::exists(MESSAGE_ID))),
                ));
                item.insert(THREAD_ID.into(), thread_id.as_str().into());
                item.insert(IS_THREAD_LATEST.into(), true.into());
                self.push(TransactItem::put(item, Some(new_email)));

                let mut thread = Item::new();
                thread.insert(MESSAGE_ID.into(), thread_id.as_str().into());
                thread.insert(
                    TYPE_YEAR_MONTH.into(),
                    EmailType::Thread.type_year_month(creating_time).into(),
                );
                thread.insert(DATE_TIME.into(), format_date_time(creating_time).into());
                thread.insert(SUBJECT.into(), creating_subject.as_str().into());
                thread.insert(
                    EMAIL_IDS.into(),
                    AttributeValue::string_list([creating_email_id.as_str(), message_id.as_str()]),
                );
                thread.insert(TIME_UPDATED.into(), now.into());
                self.push(TransactItem::put(
                    thread,
                    Some(Condition::not_exists(MESSAGE_ID)),
                ));
            }
        }
    }

    /// Clears the `DraftID` slot of `thread_id` while it still names `draft_id`,
    /// folding into an update of that thread already in the batch.
    pub fn release_draft(&mut self, thread_id: &str, draft_id: &str) {
        let owned = Condition::equals(DRAFT_ID, draft_id);
        for action in self.actions.iter_mut() {
            if let TransactItem::Update {
                message_id,
                update,
                condition,
            } = action
            {
                if message_id == thread_id {
                    update
                        .actions
                        .push(UpdateAction::Remove(DRAFT_ID.to_string()));
                    *condition = Some(match condition.take() {
                        Some(existing) => existing.and(owned),
                        None => owned,
                    });
                    return;
                }
            }
        }
        self.push(TransactItem::update(
            thread_id,
            Update::new().remove(DRAFT_ID),
            Some(owned),
        ));
    }

    /// Commits the batch. A lone put is written as a single conditional put.
    pub async fn commit(mut self, store: &dyn MetadataStore) -> MailboxResult<()> {
        debug!("Committing {} write(s)", self.actions.len());
        match self.actions.as_slice() {
            [] => Ok(()),
            [TransactItem::Put { .. }] => match self.actions.pop() {
                Some(TransactItem::Put { item, condition }) => store.put_item(item, condition).await,
                _ => Ok(()),
            },
            _ => store.transact_write(self.actions).await,
        }
    }
}
