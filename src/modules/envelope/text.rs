// Copyright © 2025 rustmailer.com
// Licensed under RustMailer License Agreement v1.0
// Unauthorized copying, modification, or distribution is prohibited.

use std::str::FromStr;

use poem_openapi::Enum;
use serde::{Deserialize, Serialize};

use crate::{
    modules::error::{code::ErrorCode, MailboxError},
    raise_error,
};

const TEXT_WIDTH: usize = 80;

/// When to derive the text body from the HTML body.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize, Enum, clap::ValueEnum,
)]
#[oai(rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum GenerateText {
    /// Only when the text body is empty.
    #[default]
    Auto,
    /// Always, replacing any text body.
    On,
    Off,
}

impl FromStr for GenerateText {
    type Err = MailboxError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "auto" => Ok(GenerateText::Auto),
            "on" => Ok(GenerateText::On),
            "off" => Ok(GenerateText::Off),
            other => Err(raise_error!(
                format!("generateText must be one of auto, on, off; got '{}'", other),
                ErrorCode::InvalidInput
            )),
        }
    }
}

impl GenerateText {
    /// Returns the text body to store for the given bodies.
    pub fn apply(&self, text: &str, html: &str) -> String {
        let generate = match self {
            GenerateText::Auto => text.trim().is_empty(),
            GenerateText::On => true,
            GenerateText::Off => false,
        };
        if generate && !html.trim().is_empty() {
            html_to_text(html)
        } else {
            text.to_string()
        }
    }
}

pub fn html_to_text(html: &str) -> String {
    html2text::from_read(html.as_bytes(), TEXT_WIDTH)
        .trim_end()
        .to_string()
}
