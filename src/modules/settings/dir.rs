// Copyright © 2025 rustmailer.com
// Licensed under RustMailer License Agreement v1.0
// Unauthorized copying, modification, or distribution is prohibited.

use crate::modules::context::Initialize;
use crate::modules::settings::cli::SETTINGS;
use crate::{
    modules::error::{code::ErrorCode, MailboxResult},
    raise_error,
};
use std::path::PathBuf;
use std::sync::LazyLock;

const LOG_DIR: &str = "logs";
const BLOB_DIR: &str = "blobs";

pub static DATA_DIR_MANAGER: LazyLock<DataDirManager> = LazyLock::new(|| {
    DataDirManager::new(
        PathBuf::from(&SETTINGS.rustmailbox_root_dir),
        &SETTINGS.dynamodb_table,
        &SETTINGS.s3_bucket,
    )
});

#[derive(Debug)]
pub struct DataDirManager {
    pub root_dir: PathBuf,
    /// Metadata table file, named after the table.
    pub meta_db: PathBuf,
    /// Blob store directory, named after the bucket.
    pub blob_dir: PathBuf,
    pub log_dir: PathBuf,
}

impl Initialize for DataDirManager {
    async fn initialize() -> MailboxResult<()> {
        std::fs::create_dir_all(&DATA_DIR_MANAGER.root_dir)
            .map_err(|e| raise_error!(format!("{:#?}", e), ErrorCode::InternalError))?;
        std::fs::create_dir_all(&DATA_DIR_MANAGER.blob_dir)
            .map_err(|e| raise_error!(format!("{:#?}", e), ErrorCode::InternalError))?;
        std::fs::create_dir_all(&DATA_DIR_MANAGER.log_dir)
            .map_err(|e| raise_error!(format!("{:#?}", e), ErrorCode::InternalError))?;
        Ok(())
    }
}

impl DataDirManager {
    pub fn new(root_dir: PathBuf, table: &str, bucket: &str) -> Self {
        Self {
            meta_db: root_dir.join(format!("{}.db", table)),
            blob_dir: root_dir.join(BLOB_DIR).join(bucket),
            log_dir: root_dir.join(LOG_DIR),
            root_dir,
        }
    }
}
