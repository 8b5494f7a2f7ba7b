// Copyright © 2025 rustmailer.com
// Licensed under RustMailer License Agreement v1.0
// Unauthorized copying, modification, or distribution is prohibited.

use serde_json::{json, Value};

use crate::{
    base64_decode_url_safe, base64_encode_url_safe,
    modules::{
        attribute::{
            codec::{from_json, to_json},
            AttributeValue, Item,
        },
        error::{code::ErrorCode, MailboxResult},
    },
    raise_error,
};

/// The list parameters a cursor was issued for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryInfo {
    pub r#type: String,
    pub year: i32,
    pub month: u32,
    pub order: String,
}

/// Continuation token of a list query: the store's last evaluated key plus the
/// parameters it belongs to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cursor {
    pub query_info: QueryInfo,
    pub last_evaluated_key: Item,
}

impl Cursor {
    pub fn new(query_info: QueryInfo, last_evaluated_key: Item) -> Self {
        Self {
            query_info,
            last_evaluated_key,
        }
    }

    pub fn encode(&self) -> String {
        let value = json!({
            "queryInfo": {
                "type": self.query_info.r#type,
                "year": self.query_info.year,
                "month": self.query_info.month,
                "order": self.query_info.order,
            },
            "lastEvaluatedKey": to_json(&AttributeValue::M(self.last_evaluated_key.clone())),
        });
        base64_encode_url_safe!(value.to_string())
    }

    pub fn decode(text: &str) -> MailboxResult<Self> {
        let bytes = base64_decode_url_safe!(text.trim()).map_err(|e| {
            raise_error!(format!("malformed cursor: {}", e), ErrorCode::DecodeError)
        })?;
        let value: Value = serde_json::from_slice(&bytes).map_err(|e| {
            raise_error!(format!("malformed cursor: {}", e), ErrorCode::DecodeError)
        })?;

        let info = value.get("queryInfo").ok_or_else(|| {
            raise_error!("cursor is missing queryInfo".into(), ErrorCode::DecodeError)
        })?;
        let query_info = QueryInfo {
            r#type: info
                .get("type")
                .and_then(Value::as_str)
                .map(str::to_string)
                .ok_or_else(|| malformed("queryInfo.type"))?,
            year: info
                .get("year")
                .and_then(Value::as_i64)
                .and_then(|y| i32::try_from(y).ok())
                .ok_or_else(|| malformed("queryInfo.year"))?,
            month: info
                .get("month")
                .and_then(Value::as_u64)
                .and_then(|m| u32::try_from(m).ok())
                .ok_or_else(|| malformed("queryInfo.month"))?,
            order: info
                .get("order")
                .and_then(Value::as_str)
                .map(str::to_string)
                .ok_or_else(|| malformed("queryInfo.order"))?,
        };

        let key = value
            .get("lastEvaluatedKey")
            .ok_or_else(|| malformed("lastEvaluatedKey"))?;
        let last_evaluated_key = match from_json(key)? {
            AttributeValue::M(item) => item,
            _ => return Err(malformed("lastEvaluatedKey")),
        };

        Ok(Self {
            query_info,
            last_evaluated_key,
        })
    }

    /// Rejects a cursor presented with parameters other than the ones it was issued for.
    pub fn ensure_matches(&self, query_info: &QueryInfo) -> MailboxResult<()> {
        if &self.query_info != query_info {
            return Err(raise_error!(
                "nextCursor does not match the query parameters".into(),
                ErrorCode::QueryNotMatch
            ));
        }
        Ok(())
    }
}

fn malformed(field: &str) -> crate::modules::error::MailboxError {
    raise_error!(
        format!("malformed cursor: invalid {}", field),
        ErrorCode::DecodeError
    )
}
