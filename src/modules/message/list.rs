// Copyright © 2025 rustmailer.com
// Licensed under RustMailer License Agreement v1.0
// Unauthorized copying, modification, or distribution is prohibited.

use chrono::{Datelike, Utc};
use poem_openapi::{Enum, Object};
use serde::{Deserialize, Serialize};

use crate::{
    modules::{
        attribute::{
            cursor::{Cursor, QueryInfo},
            Item, ItemExt,
        },
        context::MailboxContext,
        database::{schema::*, Condition, QueryRequest},
        error::{code::ErrorCode, MailboxResult},
        format::EmailType,
        message::{effective_times, email_kind},
    },
    raise_error,
};

const DEFAULT_PAGE_SIZE: u32 = 100;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize, Enum)]
#[oai(rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    Asc,
    #[default]
    Desc,
}

impl SortOrder {
    fn as_str(&self) -> &'static str {
        match self {
            SortOrder::Asc => "asc",
            SortOrder::Desc => "desc",
        }
    }
}

/// Which trashed emails a listing returns.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize, Enum)]
#[oai(rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum ShowTrash {
    #[default]
    Exclude,
    Include,
    Only,
}

impl ShowTrash {
    fn filter(&self) -> Option<Condition> {
        match self {
            ShowTrash::Exclude => Some(Condition::not_exists(TRASHED_TIME)),
            ShowTrash::Include => None,
            ShowTrash::Only => Some(Condition::exists(TRASHED_TIME)),
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ListRequest {
    /// `inbox`, `sent` or `draft`.
    pub r#type: String,
    pub year: Option<i32>,
    pub month: Option<u32>,
    pub order: Option<SortOrder>,
    pub page_size: Option<u32>,
    pub next_cursor: Option<String>,
    pub show_trash: Option<ShowTrash>,
}

/// One row of a listing, as projected by the time index.
#[derive(Clone, Debug, Default, Eq, PartialEq, Deserialize, Serialize, Object)]
#[serde(rename_all = "camelCase")]
#[oai(rename_all = "camelCase")]
pub struct EmailSummary {
    #[serde(rename = "messageID")]
    #[oai(rename = "messageID")]
    pub message_id: String,
    #[serde(rename = "type")]
    #[oai(rename = "type")]
    pub kind: String,
    pub subject: String,
    pub from: Vec<String>,
    pub to: Vec<String>,
    pub time_received: Option<String>,
    pub time_sent: Option<String>,
    pub time_updated: Option<String>,
    pub unread: bool,
    pub trashed_time: Option<String>,
}

impl EmailSummary {
    fn from_item(item: &Item) -> MailboxResult<Self> {
        let kind = email_kind(item)?;
        let (time_received, time_sent, time_updated) = effective_times(kind, item);
        Ok(Self {
            message_id: item.get_string(MESSAGE_ID),
            kind: kind.to_string(),
            subject: item.get_string(SUBJECT),
            from: item.get_list(FROM),
            to: item.get_list(TO),
            time_received,
            time_sent,
            time_updated,
            unread: item.has(UNREAD),
            trashed_time: item.get_s(TRASHED_TIME).map(str::to_string),
        })
    }
}

#[derive(Clone, Debug, Default, Eq, PartialEq, Deserialize, Serialize, Object)]
#[serde(rename_all = "camelCase")]
#[oai(rename_all = "camelCase")]
pub struct ListResult {
    pub count: u32,
    pub items: Vec<EmailSummary>,
    /// Present when more items follow; pass back unchanged with the same parameters.
    pub next_cursor: Option<String>,
    pub has_more: bool,
}

fn list_type(value: &str) -> MailboxResult<EmailType> {
    match value.trim() {
        "inbox" => Ok(EmailType::Inbox),
        "sent" => Ok(EmailType::Sent),
        "draft" => Ok(EmailType::Draft),
        other => Err(raise_error!(
            format!("type must be one of inbox, sent, draft; got '{}'", other),
            ErrorCode::InvalidInput
        )),
    }
}

/// `GET /emails`: one page of a month of one email kind.
pub async fn list_emails(ctx: &MailboxContext, request: &ListRequest) -> MailboxResult<ListResult> {
    let kind = list_type(&request.r#type)?;
    let now = Utc::now();
    let year = request.year.unwrap_or(now.year());
    let month = request.month.unwrap_or(now.month());
    if !(1000..=9999).contains(&year) {
        return Err(raise_error!(
            format!("year {} is out of range", year),
            ErrorCode::InvalidInput
        ));
    }
    if !(1..=12).contains(&month) {
        return Err(raise_error!(
            format!("month {} is out of range", month),
            ErrorCode::InvalidInput
        ));
    }
    let order = request.order.unwrap_or_default();
    let page_size = request.page_size.unwrap_or(DEFAULT_PAGE_SIZE);

    let query_info = QueryInfo {
        r#type: kind.to_string(),
        year,
        month,
        order: order.as_str().to_string(),
    };
    let start_key = match request
        .next_cursor
        .as_deref()
        .map(str::trim)
        .filter(|c| !c.is_empty())
    {
        Some(text) => {
            let cursor = Cursor::decode(text)?;
            cursor.ensure_matches(&query_info)?;
            Some(cursor.last_evaluated_key)
        }
        None => None,
    };

    let mut query = QueryRequest::new(
        &ctx.env.time_index,
        format!("{}#{:04}-{:02}", kind, year, month),
    );
    query.ascending = order == SortOrder::Asc;
    query.limit = (page_size > 0).then_some(page_size as usize);
    query.exclusive_start_key = start_key;
    query.filter = request.show_trash.unwrap_or_default().filter();

    let output = ctx.store.query(query).await?;
    let items = output
        .items
        .iter()
        .map(EmailSummary::from_item)
        .collect::<MailboxResult<Vec<_>>>()?;
    let next_cursor = output
        .last_evaluated_key
        .filter(|key| !key.is_empty())
        .map(|key| Cursor::new(query_info, key).encode());
    Ok(ListResult {
        count: items.len() as u32,
        has_more: next_cursor.is_some(),
        items,
        next_cursor,
    })
}
