// Copyright © 2025 rustmailer.com
// Licensed under RustMailer License Agreement v1.0
// Unauthorized copying, modification, or distribution is prohibited.

//! Time, key and address formatting shared by every record kind.
//!
//! Records are partitioned by `TypeYearMonth` (`inbox#2024-01`) and sorted inside
//! the partition by `DateTime` (`DD-HH:MM:SS`, UTC). Together the two keys carry
//! the full effective time of a record, see [`rejoin_date`].

use std::{fmt, str::FromStr, sync::LazyLock};

use chrono::{DateTime, Datelike, FixedOffset, SecondsFormat, Utc};
use regex::Regex;

use crate::{
    modules::error::{code::ErrorCode, MailboxError, MailboxResult},
    raise_error,
};

#[cfg(test)]
mod tests;

pub const DRAFT_ID_PREFIX: &str = "draft-";

static DRAFT_ID_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^draft-[0-9a-f]{32}$").expect("valid draft id pattern"));
static THREAD_ID_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[0-9a-f]{32}$").expect("valid thread id pattern"));
static ADDRESS_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"^(?P<name>.*?)\s*<(?P<addr>[^<>]*)>\s*$"#).expect("valid address pattern")
});
static DATE_COMMENT_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s*\([^()]*\)\s*$").expect("valid date comment pattern"));

/// The record kinds stored in the table, discriminated by the `TypeYearMonth` prefix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EmailType {
    Inbox,
    Sent,
    Draft,
    Thread,
}

impl EmailType {
    pub fn as_str(&self) -> &'static str {
        match self {
            EmailType::Inbox => "inbox",
            EmailType::Sent => "sent",
            EmailType::Draft => "draft",
            EmailType::Thread => "thread",
        }
    }

    /// The partition prefix, e.g. `inbox#`.
    pub fn prefix(&self) -> String {
        format!("{}#", self.as_str())
    }

    pub fn type_year_month<Tz: chrono::TimeZone>(&self, t: &DateTime<Tz>) -> String {
        let utc = t.with_timezone(&Utc);
        format!("{}#{:04}-{:02}", self.as_str(), utc.year(), utc.month())
    }

    /// True for kinds that are email records (not thread headers).
    pub fn is_email(&self) -> bool {
        !matches!(self, EmailType::Thread)
    }
}

impl fmt::Display for EmailType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EmailType {
    type Err = MailboxError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "inbox" => Ok(EmailType::Inbox),
            "sent" => Ok(EmailType::Sent),
            "draft" => Ok(EmailType::Draft),
            "thread" => Ok(EmailType::Thread),
            other => Err(raise_error!(
                format!("invalid email type '{}'", other),
                ErrorCode::InvalidEmailType
            )),
        }
    }
}

/// A decoded `TypeYearMonth` partition key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TypeYearMonth {
    pub kind: EmailType,
    pub year: i32,
    pub month: u32,
}

impl TypeYearMonth {
    pub fn year_month(&self) -> String {
        format!("{:04}-{:02}", self.year, self.month)
    }
}

impl fmt::Display for TypeYearMonth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}#{}", self.kind, self.year_month())
    }
}

/// Parses an RFC 5322 `Date` header into an RFC 3339 string, keeping its offset.
/// Returns an empty string when the header cannot be parsed.
pub fn format_date(s: &str) -> String {
    parse_mail_date(s)
        .map(|date| date.to_rfc3339_opts(SecondsFormat::Secs, true))
        .unwrap_or_default()
}

pub fn parse_mail_date(s: &str) -> Option<DateTime<FixedOffset>> {
    let trimmed = s.trim();
    if trimmed.is_empty() {
        return None;
    }
    if let Ok(date) = DateTime::parse_from_rfc2822(trimmed) {
        return Some(date);
    }
    // "Tue, 1 Jul 2003 10:52:37 +0200 (CEST)" and friends
    let stripped = DATE_COMMENT_PATTERN.replace(trimmed, "");
    DateTime::parse_from_rfc2822(stripped.trim()).ok()
}

/// Produces `kind#YYYY-MM` for the UTC year and month of `t`.
pub fn format_type_year_month<Tz: chrono::TimeZone>(
    kind: &str,
    t: &DateTime<Tz>,
) -> MailboxResult<String> {
    let kind = EmailType::from_str(kind)?;
    Ok(kind.type_year_month(t))
}

/// Produces the `DD-HH:MM:SS` sort key in UTC.
pub fn format_date_time<Tz: chrono::TimeZone>(t: &DateTime<Tz>) -> String {
    t.with_timezone(&Utc).format("%d-%H:%M:%S").to_string()
}

pub fn format_rfc3339<Tz: chrono::TimeZone>(t: &DateTime<Tz>) -> String
where
    Tz::Offset: fmt::Display,
{
    t.to_rfc3339_opts(SecondsFormat::Secs, true)
}

pub fn rfc3339_now() -> String {
    format_rfc3339(&Utc::now())
}

pub fn extract_type_year_month(s: &str) -> MailboxResult<TypeYearMonth> {
    let (kind, year_month) = s.split_once('#').ok_or_else(|| {
        raise_error!(
            format!("invalid TypeYearMonth '{}'", s),
            ErrorCode::InvalidFormat
        )
    })?;
    let kind = EmailType::from_str(kind)?;
    let (year, month) = year_month.split_once('-').ok_or_else(|| {
        raise_error!(
            format!("invalid TypeYearMonth '{}'", s),
            ErrorCode::InvalidFormat
        )
    })?;
    if month.contains('-') {
        return Err(raise_error!(
            format!("invalid TypeYearMonth '{}'", s),
            ErrorCode::InvalidFormat
        ));
    }
    let year = year
        .parse::<i32>()
        .ok()
        .filter(|year| (1000..=9999).contains(year))
        .ok_or_else(|| {
            raise_error!(format!("invalid year '{}'", year), ErrorCode::InvalidEmailYear)
        })?;
    let month = month
        .parse::<u32>()
        .ok()
        .filter(|month| (1..=12).contains(month))
        .ok_or_else(|| {
            raise_error!(
                format!("invalid month '{}'", month),
                ErrorCode::InvalidEmailMonth
            )
        })?;
    Ok(TypeYearMonth { kind, year, month })
}

/// Rebuilds an RFC 3339 UTC timestamp from the partition and sort keys.
///
/// `ym` may be a full `TypeYearMonth` (`inbox#2024-01`) or just `2024-01`.
pub fn rejoin_date(ym: &str, dt: &str) -> String {
    let year_month = ym.rsplit_once('#').map(|(_, ym)| ym).unwrap_or(ym);
    format!("{}-{}Z", year_month, dt.replacen('-', "T", 1))
}

/// Parses a rejoined partition/sort key pair back into a timestamp.
pub fn parse_rejoined(ym: &str, dt: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(&rejoin_date(ym, dt))
        .ok()
        .map(|t| t.with_timezone(&Utc))
}

/// Canonicalises one address header value.
///
/// Accepts `"Name" <addr>`, `Name <addr>`, `<addr>` and bare `addr`. With
/// `omit_name` only the address is returned, otherwise `Name <addr>` (or the bare
/// address when there is no display name).
pub fn clean_address(s: &str, omit_name: bool) -> String {
    let (name, addr) = split_address(s);
    if omit_name || name.is_empty() {
        addr.to_string()
    } else {
        format!("{} <{}>", name, addr)
    }
}

/// Splits an address header value into its display name (possibly empty) and address.
pub fn split_address(s: &str) -> (&str, &str) {
    let trimmed = s.trim();
    let (name, addr) = match ADDRESS_PATTERN.captures(trimmed) {
        Some(caps) => (
            caps.name("name").map(|m| m.as_str()).unwrap_or_default(),
            caps.name("addr").map(|m| m.as_str()).unwrap_or_default(),
        ),
        None => ("", trimmed),
    };
    (unquote(name.trim()), addr.trim())
}

fn unquote(s: &str) -> &str {
    s.strip_prefix('"')
        .and_then(|s| s.strip_suffix('"'))
        .unwrap_or(s)
        .trim()
}

/// Canonicalises every entry of an address list, dropping empty ones.
pub fn clean_addresses<S: AsRef<str>>(list: &[S], omit_name: bool) -> Vec<String> {
    list.iter()
        .map(|s| clean_address(s.as_ref(), omit_name))
        .filter(|s| !s.is_empty())
        .collect()
}

pub fn generate_draft_id() -> String {
    format!("{}{}", DRAFT_ID_PREFIX, uuid::Uuid::new_v4().simple())
}

pub fn generate_thread_id() -> String {
    uuid::Uuid::new_v4().simple().to_string()
}

pub fn is_draft_id(id: &str) -> bool {
    DRAFT_ID_PATTERN.is_match(id)
}

pub fn is_thread_id(id: &str) -> bool {
    THREAD_ID_PATTERN.is_match(id)
}
