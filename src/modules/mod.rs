// Copyright © 2025 rustmailer.com
// Licensed under RustMailer License Agreement v1.0
// Unauthorized copying, modification, or distribution is prohibited.

pub mod attribute;
pub mod common;
pub mod context;
pub mod coordinator;
pub mod database;
pub mod envelope;
pub mod error;
pub mod format;
pub mod hook;
pub mod logger;
pub mod message;
pub mod rest;
pub mod settings;
pub mod smtp;
pub mod storage;
pub mod thread;
pub mod utils;
