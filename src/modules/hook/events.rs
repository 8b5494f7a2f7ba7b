// Copyright © 2025 rustmailer.com
// Licensed under RustMailer License Agreement v1.0
// Unauthorized copying, modification, or distribution is prohibited.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::{
    modules::{
        error::{code::ErrorCode, MailboxResult},
        format::rfc3339_now,
    },
    raise_error,
};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventKind {
    Email,
    Thread,
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EventKind::Email => write!(f, "email"),
            EventKind::Thread => write!(f, "thread"),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventAction {
    Received,
    Sent,
    Trashed,
    Untrashed,
    Deleted,
    Read,
    Unread,
    Reparsed,
    Saved,
    Created,
}

impl fmt::Display for EventAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            EventAction::Received => "received",
            EventAction::Sent => "sent",
            EventAction::Trashed => "trashed",
            EventAction::Untrashed => "untrashed",
            EventAction::Deleted => "deleted",
            EventAction::Read => "read",
            EventAction::Unread => "unread",
            EventAction::Reparsed => "reparsed",
            EventAction::Saved => "saved",
            EventAction::Created => "created",
        };
        write!(f, "{}", name)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventTarget {
    pub id: String,
}

/// Payload sent to the queue and the webhook.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MailboxEvent {
    pub event: EventKind,
    pub action: EventAction,
    /// RFC3339 time the event was produced.
    pub timestamp: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<EventTarget>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub thread: Option<EventTarget>,
}

impl MailboxEvent {
    pub fn email(action: EventAction, message_id: impl Into<String>) -> Self {
        Self {
            event: EventKind::Email,
            action,
            timestamp: rfc3339_now(),
            email: Some(EventTarget {
                id: message_id.into(),
            }),
            thread: None,
        }
    }

    pub fn thread(action: EventAction, thread_id: impl Into<String>) -> Self {
        Self {
            event: EventKind::Thread,
            action,
            timestamp: rfc3339_now(),
            email: None,
            thread: Some(EventTarget {
                id: thread_id.into(),
            }),
        }
    }

    pub fn target_id(&self) -> &str {
        self.email
            .as_ref()
            .or(self.thread.as_ref())
            .map(|t| t.id.as_str())
            .unwrap_or_default()
    }

    pub fn to_json_value(&self) -> MailboxResult<serde_json::Value> {
        serde_json::to_value(self)
            .map_err(|e| raise_error!(format!("{:#?}", e), ErrorCode::InternalError))
    }
}

impl fmt::Display for MailboxEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{} ({})", self.event, self.action, self.target_id())
    }
}
